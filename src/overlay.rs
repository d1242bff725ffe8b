//! Debug overlay
//!
//! Shows frame timing and exposes the two scene-size knobs. Edits land in
//! `OverlayParams` and take effect the next time the scene is built.

use crate::consts::{MAX_INSTANCES, MAX_PARTICLES, MIN_INSTANCES, MIN_PARTICLES};

/// Timing of the frame just simulated
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTiming {
    /// Seconds since the previous frame
    pub delta: f32,
    /// Seconds since the session started
    pub elapsed: f32,
    pub frame_index: u64,
    pub live_bodies: usize,
    pub live_particles: usize,
}

impl FrameTiming {
    pub fn fps(&self) -> f32 {
        if self.delta > 0.0 { 1.0 / self.delta } else { 0.0 }
    }
}

/// Scene parameters adjustable at runtime, always kept in range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayParams {
    instance_count: u32,
    particle_count: u32,
}

impl Default for OverlayParams {
    fn default() -> Self {
        Self::new(MAX_INSTANCES, MAX_PARTICLES)
    }
}

impl OverlayParams {
    pub fn new(instance_count: u32, particle_count: u32) -> Self {
        let mut params = Self {
            instance_count: MIN_INSTANCES,
            particle_count: MIN_PARTICLES,
        };
        params.set_instance_count(instance_count);
        params.set_particle_count(particle_count);
        params
    }

    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }

    pub fn particle_count(&self) -> u32 {
        self.particle_count
    }

    pub fn set_instance_count(&mut self, count: u32) {
        self.instance_count = count.clamp(MIN_INSTANCES, MAX_INSTANCES);
    }

    pub fn set_particle_count(&mut self, count: u32) {
        self.particle_count = count.clamp(MIN_PARTICLES, MAX_PARTICLES);
    }
}

/// Overlay drawn after the scene each frame
pub trait Overlay {
    fn frame(&mut self, timing: FrameTiming, params: &mut OverlayParams);
}

/// Overlay that never touches the parameters
#[derive(Debug, Default)]
pub struct NoOverlay;

impl Overlay for NoOverlay {
    fn frame(&mut self, _timing: FrameTiming, _params: &mut OverlayParams) {}
}

/// Logs a timing summary at a fixed interval
#[derive(Debug)]
pub struct LogOverlay {
    interval: f32,
    since_report: f32,
    frames: u32,
}

impl Default for LogOverlay {
    fn default() -> Self {
        Self::new(5.0)
    }
}

impl LogOverlay {
    pub fn new(interval: f32) -> Self {
        Self {
            interval,
            since_report: 0.0,
            frames: 0,
        }
    }
}

impl Overlay for LogOverlay {
    fn frame(&mut self, timing: FrameTiming, params: &mut OverlayParams) {
        self.since_report += timing.delta;
        self.frames += 1;
        if self.since_report < self.interval {
            return;
        }
        let avg_ms = self.since_report * 1000.0 / self.frames as f32;
        log::info!(
            "{:.1} ms/frame ({:.0} fps), {} bodies, {} particles, instances {} / particle pool {}",
            avg_ms,
            1000.0 / avg_ms,
            timing.live_bodies,
            timing.live_particles,
            params.instance_count(),
            params.particle_count()
        );
        self.since_report = 0.0;
        self.frames = 0;
    }
}
