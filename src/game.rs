//! Per-frame orchestration
//!
//! `Game` owns the session and the world and runs one frame at a time:
//! input, camera, physics, then draws in a fixed order (lanes, dynamic
//! bodies with their particles, background) followed by the overlay.

use std::time::{SystemTime, UNIX_EPOCH};

use glam::{DVec2, Vec4};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::PARTICLES_PER_BODY;
use crate::overlay::{FrameTiming, Overlay};
use crate::renderer::{
    FrameUniforms, InstancedDraw, MeshDraw, MeshKind, ParticleInstance, RenderBackend, TextureSlot,
};
use crate::scene::{Background, background, body_transform, normal_matrix, plane_model};
use crate::settings::Settings;
use crate::sim::{
    BodyRegistry, InputEvent, ParticlePool, PhysicsStepper, Session, ShotContext, Trigger,
    VisualKind, build_level, shoot,
};

const CLEAR_COLOR: Vec4 = Vec4::new(0.0, 0.0, 0.3, 1.0);
/// Texture repeat on pins and balls
const OBJECT_REPEAT: f32 = 1.0;
const LANE_REPEAT: f32 = 1.0;

/// Where the frame loop is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FramePhase {
    /// Nothing rendered yet; the first frame centers the cursor
    AwaitingFirstFrame,
    Running,
}

/// What the platform has to do after a frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameOutput {
    /// Move the OS cursor here (window pixels)
    pub warp_cursor: Option<DVec2>,
    /// Close the window and stop the loop
    pub exit: bool,
}

pub struct Game {
    settings: Settings,
    session: Session,
    registry: BodyRegistry,
    stepper: PhysicsStepper,
    particles: ParticlePool,
    background: Background,
    phase: FramePhase,
    /// Seeds each scene initialization
    rng: Pcg32,
    frame_index: u64,
    /// Background matrices changed since the last upload
    instances_dirty: bool,
}

impl Game {
    pub fn new(settings: Settings) -> Self {
        let seed = settings.seed.unwrap_or_else(time_seed);
        log::info!("Session seed: {seed}");

        let mut game = Self {
            session: Session::new(&settings),
            registry: BodyRegistry::new(),
            stepper: PhysicsStepper::new(),
            particles: ParticlePool::new(1, 0),
            background: Background::default(),
            phase: FramePhase::AwaitingFirstFrame,
            rng: Pcg32::seed_from_u64(seed),
            frame_index: 0,
            instances_dirty: true,
            settings,
        };
        game.restart();
        game
    }

    /// Rebuild the scene with the current overlay parameters
    pub fn restart(&mut self) {
        let params = self.session.overlay;

        self.registry = BodyRegistry::new();
        self.stepper = PhysicsStepper::new();
        build_level(&mut self.registry, &self.settings);

        self.particles = ParticlePool::new(params.particle_count() as usize, self.rng.random());
        let mut layout_rng = Pcg32::seed_from_u64(self.rng.random());
        self.background = Background::generate(params.instance_count() as usize, &mut layout_rng);
        self.instances_dirty = true;

        log::info!(
            "Scene initialized: {} bodies, {} particles, {} background instances",
            self.registry.len(),
            self.particles.capacity(),
            self.background.len()
        );
    }

    /// Queue platform input for the next frame
    pub fn push_input(&mut self, event: InputEvent) {
        self.session.push_event(event);
    }

    /// Run one frame of `dt` seconds and submit it to `backend`
    pub fn frame(
        &mut self,
        dt: f32,
        backend: &mut dyn RenderBackend,
        overlay: &mut dyn Overlay,
    ) -> Result<FrameOutput, wgpu::SurfaceError> {
        let mut output = FrameOutput::default();
        if self.session.close_requested {
            output.exit = true;
            return Ok(output);
        }

        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        self.session.elapsed += dt;

        // === Input ===
        let triggers = self.session.poll_input();
        if self.session.close_requested {
            output.exit = true;
            return Ok(output);
        }
        // Warp after polling so a pending resize is already applied
        if self.phase == FramePhase::AwaitingFirstFrame {
            self.phase = FramePhase::Running;
            let center = self.session.viewport.center();
            self.session.cursor.reset_origin(center);
            output.warp_cursor = Some(center);
        }
        for trigger in triggers {
            match trigger {
                Trigger::Shoot => self.shoot(),
                Trigger::Restart => self.restart(),
            }
        }
        self.session.apply_movement(dt);
        self.session.advance_spin(dt);

        // === Physics ===
        self.stepper.step(&mut self.registry, dt);

        // === Draw ===
        let view = self.session.camera.view_matrix();
        if self.instances_dirty {
            backend.upload_instances(self.background.matrices());
            self.instances_dirty = false;
        }
        backend.begin_frame(&FrameUniforms {
            view,
            projection: self.session.projection(),
            camera_pos: self.session.camera.position,
            lights: self.settings.lights,
            shading: self.session.shading,
            wireframe: self.session.wireframe,
            clear_color: CLEAR_COLOR,
        });

        let lane_material = self.settings.material.matte();
        for lane in 0..self.settings.lanes.count {
            let model = plane_model(&self.settings.lanes, lane);
            backend.draw_mesh(
                MeshKind::Cube,
                &MeshDraw {
                    model,
                    normal: normal_matrix(view, model),
                    texture: TextureSlot::Floor,
                    repeat: LANE_REPEAT,
                    material: lane_material,
                },
            );
        }

        let mut live_bodies = 0;
        for handle in self.registry.snapshot() {
            let Some(info) = self.registry.info(handle) else {
                continue;
            };
            if info.is_static() {
                continue;
            }
            let Some(body) = body_transform(&self.registry, handle, view) else {
                continue;
            };
            if body.culled() {
                log::debug!("{:?} fell out of play at y = {:.2}", body.kind, body.position.y);
                self.registry.mark_for_removal(handle);
                continue;
            }
            live_bodies += 1;

            for _ in 0..PARTICLES_PER_BODY {
                self.particles.spawn(body.position, body.velocity, body.kind.into());
            }
            self.particles.tick(dt);
            let sprites: Vec<ParticleInstance> =
                self.particles.live_particles().map(ParticleInstance::from).collect();
            backend.draw_particles(&sprites);

            let (mesh, texture) = body_mesh(body.kind);
            backend.draw_mesh(
                mesh,
                &MeshDraw {
                    model: body.model,
                    normal: body.normal,
                    texture,
                    repeat: OBJECT_REPEAT,
                    material: self.settings.material,
                },
            );
        }
        let removed = self.registry.flush_removals();
        if removed > 0 {
            log::debug!("Removed {removed} bodies, {} left", self.registry.len());
        }

        backend.draw_instanced(
            MeshKind::Cube,
            &InstancedDraw {
                model: background::shared_model(self.session.spin_angle),
                color: background::color(self.session.elapsed),
                count: self.background.len() as u32,
            },
        );

        // === Overlay ===
        overlay.frame(
            FrameTiming {
                delta: dt,
                elapsed: self.session.elapsed,
                frame_index: self.frame_index,
                live_bodies,
                live_particles: self.particles.live_count(),
            },
            &mut self.session.overlay,
        );

        self.frame_index += 1;
        backend.end_frame()?;
        Ok(output)
    }

    fn shoot(&mut self) {
        let shot = ShotContext {
            camera_pos: self.session.camera.position,
            cursor: self.session.cursor.position,
            viewport: self.session.viewport,
            view: self.session.camera.view_matrix(),
            projection: self.session.projection(),
            ball_size: self.settings.ball_size,
        };
        shoot(&mut self.registry, &shot);
    }

    /// Release the physics world ahead of shutdown
    pub fn teardown(&mut self) {
        self.session.close_requested = true;
        self.registry.clear();
        log::info!("Session closed after {} frames", self.frame_index);
    }

    pub fn phase(&self) -> FramePhase {
        self.phase
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn registry(&self) -> &BodyRegistry {
        &self.registry
    }

    pub fn particles(&self) -> &ParticlePool {
        &self.particles
    }

    pub fn background(&self) -> &Background {
        &self.background
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}

/// Mesh and texture a dynamic body is drawn with
fn body_mesh(kind: VisualKind) -> (MeshKind, TextureSlot) {
    match kind {
        VisualKind::Ball => (MeshKind::Sphere, TextureSlot::Ball),
        VisualKind::Pin => (MeshKind::Cube, TextureSlot::Pin),
        // Lanes are static and drawn from layout; a movable plane keeps the floor look
        VisualKind::Plane => (MeshKind::Cube, TextureSlot::Floor),
    }
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::NoOverlay;
    use crate::renderer::{DrawCommand, RecordingBackend};
    use crate::sim::Action;

    fn game() -> Game {
        Game::new(Settings {
            seed: Some(42),
            instance_count: 200,
            particle_count: 50,
            ..Settings::default()
        })
    }

    fn run(game: &mut Game, backend: &mut RecordingBackend, dt: f32) -> FrameOutput {
        game.frame(dt, backend, &mut NoOverlay).unwrap()
    }

    #[test]
    fn test_first_frame_warps_cursor_once() {
        let mut g = game();
        let mut backend = RecordingBackend::new();
        assert_eq!(g.phase(), FramePhase::AwaitingFirstFrame);

        let out = run(&mut g, &mut backend, 1.0 / 60.0);
        assert_eq!(out.warp_cursor, Some(DVec2::new(600.0, 450.0)));
        assert_eq!(g.phase(), FramePhase::Running);

        let out = run(&mut g, &mut backend, 1.0 / 60.0);
        assert_eq!(out.warp_cursor, None);
    }

    #[test]
    fn test_background_uploaded_once_per_scene() {
        let mut g = game();
        let mut backend = RecordingBackend::new();
        run(&mut g, &mut backend, 0.01);
        run(&mut g, &mut backend, 0.01);
        assert_eq!(backend.upload_count(), 1);
        assert_eq!(backend.instances().len(), 200);

        g.session_mut().overlay.set_instance_count(300);
        g.push_input(InputEvent::Action {
            action: Action::Restart,
            pressed: true,
        });
        run(&mut g, &mut backend, 0.01);
        assert_eq!(backend.upload_count(), 2);
        assert_eq!(backend.instances().len(), 300);
    }

    #[test]
    fn test_frame_draw_order() {
        let mut g = game();
        let mut backend = RecordingBackend::new();
        run(&mut g, &mut backend, 1.0 / 60.0);

        let cmds = backend.commands();
        assert!(matches!(cmds.first(), Some(DrawCommand::Begin(_))));
        assert!(matches!(cmds.last(), Some(DrawCommand::End)));
        // Three lanes come first, with the floor texture
        for cmd in &cmds[1..4] {
            let DrawCommand::Mesh(MeshKind::Cube, draw) = cmd else {
                panic!("expected lane, got {cmd:?}");
            };
            assert_eq!(draw.texture, TextureSlot::Floor);
        }
        // 30 pins, each preceded by a particle batch
        let body_cmds = &cmds[4..4 + 60];
        for pair in body_cmds.chunks(2) {
            assert!(matches!(pair[0], DrawCommand::Particles(_)));
            assert!(matches!(
                pair[1],
                DrawCommand::Mesh(MeshKind::Cube, MeshDraw { texture: TextureSlot::Pin, .. })
            ));
        }
        assert!(matches!(cmds[64], DrawCommand::Instanced(MeshKind::Cube, _)));
        assert_eq!(cmds.len(), 66);
    }

    #[test]
    fn test_quit_ends_loop() {
        let mut g = game();
        let mut backend = RecordingBackend::new();
        run(&mut g, &mut backend, 0.01);
        g.push_input(InputEvent::Action {
            action: Action::Quit,
            pressed: true,
        });
        let out = run(&mut g, &mut backend, 0.01);
        assert!(out.exit);
        assert_eq!(backend.frame_count(), 1);
        let out = run(&mut g, &mut backend, 0.01);
        assert!(out.exit);
        assert_eq!(backend.frame_count(), 1);
    }

    #[test]
    fn test_shoot_adds_ball() {
        let mut g = game();
        let mut backend = RecordingBackend::new();
        run(&mut g, &mut backend, 0.01);
        g.push_input(InputEvent::Action {
            action: Action::Shoot,
            pressed: true,
        });
        backend.clear();
        run(&mut g, &mut backend, 0.01);
        assert_eq!(g.registry().len(), 34);
        assert_eq!(backend.meshes(MeshKind::Sphere).count(), 1);
    }

    #[test]
    fn test_body_mesh_per_kind() {
        assert_eq!(body_mesh(VisualKind::Ball), (MeshKind::Sphere, TextureSlot::Ball));
        assert_eq!(body_mesh(VisualKind::Pin), (MeshKind::Cube, TextureSlot::Pin));
        assert_eq!(body_mesh(VisualKind::Plane), (MeshKind::Cube, TextureSlot::Floor));
    }

    #[test]
    fn test_teardown_clears_world() {
        let mut g = game();
        g.teardown();
        assert!(g.registry().is_empty());
        let mut backend = RecordingBackend::new();
        assert!(run(&mut g, &mut backend, 0.01).exit);
    }
}
