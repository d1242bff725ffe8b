//! Physics stepping
//!
//! Advances the rapier world once per rendered frame. Frame spikes are
//! clamped so a long frame never turns into one huge, unstable step.

use rapier3d::prelude::*;

use super::bodies::BodyRegistry;
use crate::consts::{GRAVITY, MAX_STEP_SECONDS, PHYSICS_SUBSTEPS};

/// Clamp a requested frame delta to what the solver is allowed to take
#[inline]
pub fn clamp_delta(requested: f32) -> f32 {
    if requested > 0.0 {
        requested.min(MAX_STEP_SECONDS)
    } else {
        // Covers zero, negative and NaN
        0.0
    }
}

/// Solver state that persists between frames
pub struct PhysicsStepper {
    gravity: Vector<Real>,
    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    ccd_solver: CCDSolver,
    substeps: u32,
}

impl Default for PhysicsStepper {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsStepper {
    pub fn new() -> Self {
        Self {
            gravity: vector![0.0, GRAVITY, 0.0],
            params: IntegrationParameters::default(),
            pipeline: PhysicsPipeline::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            ccd_solver: CCDSolver::new(),
            substeps: PHYSICS_SUBSTEPS,
        }
    }

    pub fn substeps(&self) -> u32 {
        self.substeps
    }

    /// Advance every body by `requested` seconds (clamped), split into
    /// `substeps` equal steps of `dt / substeps`. The sub-step length
    /// follows the frame delta; there is no fixed internal step and no
    /// accumulator carrying leftover time. A zero delta leaves the world
    /// untouched.
    pub fn step(&mut self, world: &mut BodyRegistry, requested: f32) {
        let dt = clamp_delta(requested);
        if dt <= 0.0 {
            return;
        }

        self.params.dt = dt / self.substeps as f32;
        for _ in 0..self.substeps {
            self.pipeline.step(
                &self.gravity,
                &self.params,
                &mut world.islands,
                &mut self.broad_phase,
                &mut self.narrow_phase,
                &mut world.bodies,
                &mut world.colliders,
                &mut world.impulse_joints,
                &mut world.multibody_joints,
                &mut self.ccd_solver,
                None,
                &(),
                &(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::consts::CULL_HEIGHT;
    use crate::sim::bodies::{BodyDesc, BodyShape, VisualKind};

    fn sphere(position: Vec3) -> BodyDesc {
        BodyDesc {
            shape: BodyShape::Sphere,
            kind: VisualKind::Ball,
            position,
            size: Vec3::splat(0.16),
            rotation: Vec3::ZERO,
            mass: 2.85,
            friction: 0.2,
            restitution: 0.2,
        }
    }

    fn lane() -> BodyDesc {
        BodyDesc {
            shape: BodyShape::Box,
            kind: VisualKind::Plane,
            position: Vec3::new(0.0, -1.0, 4.0),
            size: Vec3::new(2.0, 0.1, 11.0),
            rotation: Vec3::ZERO,
            mass: 0.0,
            friction: 0.2,
            restitution: 0.2,
        }
    }

    #[test]
    fn test_clamp_delta() {
        assert_eq!(clamp_delta(0.001), 0.001);
        assert_eq!(clamp_delta(0.5), MAX_STEP_SECONDS);
        assert_eq!(clamp_delta(0.0), 0.0);
        assert_eq!(clamp_delta(-1.0), 0.0);
        assert_eq!(clamp_delta(f32::NAN), 0.0);
    }

    #[test]
    fn test_zero_delta_is_idempotent() {
        let mut world = BodyRegistry::new();
        let mut stepper = PhysicsStepper::new();
        let ball = world.create(&sphere(Vec3::new(0.0, 5.0, 0.0)));
        world.apply_impulse(ball, Vec3::new(1.0, 0.0, 0.0));

        let before = (world.transform_of(ball), world.velocity_of(ball));
        stepper.step(&mut world, 0.0);
        let after = (world.transform_of(ball), world.velocity_of(ball));
        assert_eq!(before, after);
    }

    #[test]
    fn test_static_body_never_moves() {
        let mut world = BodyRegistry::new();
        let mut stepper = PhysicsStepper::new();
        let plane = world.create(&lane());
        // Something resting on it
        world.create(&sphere(Vec3::new(0.0, -0.7, 4.0)));

        let before = world.transform_of(plane);
        for _ in 0..120 {
            stepper.step(&mut world, 1.0 / 60.0);
        }
        assert_eq!(world.transform_of(plane), before);
        assert_eq!(world.velocity_of(plane), Some(Vec3::ZERO));
    }

    #[test]
    fn test_free_fall_strictly_decreases_until_culled() {
        let mut world = BodyRegistry::new();
        let mut stepper = PhysicsStepper::new();
        let ball = world.create(&sphere(Vec3::new(0.0, 5.0, 0.0)));

        let mut last_y = world.transform_of(ball).unwrap().0.y;
        let mut steps = 0;
        while last_y >= CULL_HEIGHT {
            stepper.step(&mut world, 1.0 / 60.0);
            let y = world.transform_of(ball).unwrap().0.y;
            assert!(y < last_y, "step {steps}: {y} !< {last_y}");
            last_y = y;
            steps += 1;
            assert!(steps < 1000, "ball never left play");
        }
        assert!(last_y < CULL_HEIGHT);
    }

    #[test]
    fn test_substeps_split_delta_evenly() {
        let mut world = BodyRegistry::new();
        let mut stepper = PhysicsStepper::new();
        world.create(&sphere(Vec3::new(0.0, 5.0, 0.0)));
        stepper.step(&mut world, 0.01);
        assert!((stepper.params.dt - 0.01 / PHYSICS_SUBSTEPS as f32).abs() < 1e-9);
        stepper.step(&mut world, 1.0);
        assert!((stepper.params.dt - MAX_STEP_SECONDS / PHYSICS_SUBSTEPS as f32).abs() < 1e-9);
    }

    #[test]
    fn test_large_delta_is_clamped() {
        let mut spiky = BodyRegistry::new();
        let mut smooth = BodyRegistry::new();
        let a = spiky.create(&sphere(Vec3::new(0.0, 5.0, 0.0)));
        let b = smooth.create(&sphere(Vec3::new(0.0, 5.0, 0.0)));

        PhysicsStepper::new().step(&mut spiky, 2.0);
        PhysicsStepper::new().step(&mut smooth, MAX_STEP_SECONDS);

        let ya = spiky.transform_of(a).unwrap().0.y;
        let yb = smooth.transform_of(b).unwrap().0.y;
        assert!((ya - yb).abs() < 1e-6);
    }
}
