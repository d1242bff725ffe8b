//! Shooting: cursor to world-space launch impulse
//!
//! The cursor is un-projected from the viewport back into the world; the
//! ball is spawned under the camera and kicked along that ray.

use glam::{DVec2, Mat4, Vec2, Vec3};

use super::bodies::{BodyDesc, BodyHandle, BodyRegistry, BodyShape, VisualKind};
use super::state::Viewport;
use crate::consts::{BALL_LAUNCH_HEIGHT, BALL_MASS, SHOOT_SPEED};

/// Initial ball rotation (Euler radians)
const BALL_ROTATION: Vec3 = Vec3::new(10.0, 0.0, 3.0);
const BALL_FRICTION: f32 = 0.2;
const BALL_RESTITUTION: f32 = 0.2;

/// Viewport pixels (origin top-left) to normalized device coordinates
pub fn cursor_to_ndc(cursor: DVec2, viewport: Viewport) -> Vec2 {
    let w = viewport.width.max(1) as f64;
    let h = viewport.height.max(1) as f64;
    Vec2::new(
        (cursor.x / w * 2.0 - 1.0) as f32,
        (1.0 - cursor.y / h * 2.0) as f32,
    )
}

/// World-space unit direction of the ray through the cursor
pub fn unproject_direction(
    cursor: DVec2,
    viewport: Viewport,
    view: Mat4,
    projection: Mat4,
) -> Vec3 {
    let ndc = cursor_to_ndc(cursor, viewport);
    let unproject = (projection * view).inverse();
    // Depth range is [0, 1]
    let near = unproject.project_point3(ndc.extend(0.0));
    let far = unproject.project_point3(ndc.extend(1.0));
    (far - near).normalize_or_zero()
}

/// Body description of a freshly launched ball
pub fn ball_desc(camera_pos: Vec3, ball_size: Vec3) -> BodyDesc {
    BodyDesc {
        shape: BodyShape::Sphere,
        kind: VisualKind::Ball,
        position: Vec3::new(camera_pos.x, BALL_LAUNCH_HEIGHT, camera_pos.z),
        size: ball_size,
        rotation: BALL_ROTATION,
        mass: BALL_MASS,
        friction: BALL_FRICTION,
        restitution: BALL_RESTITUTION,
    }
}

/// Everything the bridge reads at the moment of the shot
#[derive(Debug, Clone, Copy)]
pub struct ShotContext {
    pub camera_pos: Vec3,
    pub cursor: DVec2,
    pub viewport: Viewport,
    pub view: Mat4,
    pub projection: Mat4,
    pub ball_size: Vec3,
}

impl ShotContext {
    /// Impulse applied to the new ball
    pub fn impulse(&self) -> Vec3 {
        unproject_direction(self.cursor, self.viewport, self.view, self.projection) * SHOOT_SPEED
    }
}

/// Spawn a ball and launch it toward the cursor
pub fn shoot(registry: &mut BodyRegistry, shot: &ShotContext) -> BodyHandle {
    let ball = registry.create(&ball_desc(shot.camera_pos, shot.ball_size));
    let impulse = shot.impulse();
    registry.apply_impulse(ball, impulse);
    log::debug!("Ball launched with impulse {impulse:?}");
    ball
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::camera::Camera;
    use crate::sim::state::projection_matrix;

    const VIEWPORT: Viewport = Viewport {
        width: 1200,
        height: 900,
    };

    fn center() -> DVec2 {
        DVec2::new(600.0, 450.0)
    }

    #[test]
    fn test_ndc_corners() {
        assert_eq!(cursor_to_ndc(DVec2::ZERO, VIEWPORT), Vec2::new(-1.0, 1.0));
        assert_eq!(cursor_to_ndc(DVec2::new(1200.0, 900.0), VIEWPORT), Vec2::new(1.0, -1.0));
        assert_eq!(cursor_to_ndc(center(), VIEWPORT), Vec2::ZERO);
    }

    #[test]
    fn test_center_cursor_follows_camera_forward() {
        let camera = Camera::new(Vec3::new(5.0, 1.0, 12.0), true);
        let dir = unproject_direction(
            center(),
            VIEWPORT,
            camera.view_matrix(),
            projection_matrix(VIEWPORT),
        );
        assert!((dir - camera.front()).length() < 1e-3, "{dir:?}");
    }

    #[test]
    fn test_center_cursor_follows_turned_camera() {
        let mut camera = Camera::new(Vec3::ZERO, false);
        camera.process_look(120.0, -40.0);
        let dir = unproject_direction(
            center(),
            VIEWPORT,
            camera.view_matrix(),
            projection_matrix(VIEWPORT),
        );
        assert!((dir - camera.front()).length() < 1e-3, "{dir:?} vs {:?}", camera.front());
    }

    #[test]
    fn test_cursor_right_of_center_aims_right() {
        let camera = Camera::new(Vec3::ZERO, true);
        let dir = unproject_direction(
            DVec2::new(1000.0, 450.0),
            VIEWPORT,
            camera.view_matrix(),
            projection_matrix(VIEWPORT),
        );
        assert!(dir.x > 0.0);
        assert!(dir.z < 0.0);
    }

    #[test]
    fn test_shoot_spawns_moving_ball_under_camera() {
        let camera = Camera::new(Vec3::new(5.0, 1.0, 12.0), true);
        let mut registry = BodyRegistry::new();
        let shot = ShotContext {
            camera_pos: camera.position,
            cursor: center(),
            viewport: VIEWPORT,
            view: camera.view_matrix(),
            projection: projection_matrix(VIEWPORT),
            ball_size: Vec3::splat(0.16),
        };
        let ball = shoot(&mut registry, &shot);

        let info = registry.info(ball).unwrap();
        assert_eq!(info.kind, VisualKind::Ball);
        assert_eq!(info.mass, BALL_MASS);

        let (pos, _) = registry.transform_of(ball).unwrap();
        assert_eq!(pos, Vec3::new(5.0, BALL_LAUNCH_HEIGHT, 12.0));

        let vel = registry.velocity_of(ball).unwrap();
        assert!(vel.z < 0.0, "ball should head down the lane: {vel:?}");
    }

    #[test]
    fn test_impulse_magnitude() {
        let camera = Camera::new(Vec3::ZERO, true);
        let shot = ShotContext {
            camera_pos: camera.position,
            cursor: DVec2::new(100.0, 800.0),
            viewport: VIEWPORT,
            view: camera.view_matrix(),
            projection: projection_matrix(VIEWPORT),
            ball_size: Vec3::splat(0.16),
        };
        assert!((shot.impulse().length() - SHOOT_SPEED).abs() < 1e-3);
    }
}
