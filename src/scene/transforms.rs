//! Per-frame model and normal matrices

use glam::{Mat3, Mat4, Quat, Vec3};

use crate::consts::CULL_HEIGHT;
use crate::settings::LaneLayout;
use crate::sim::bodies::{BodyHandle, BodyRegistry, VisualKind};
use crate::sim::level::lane_center;

/// World pose scaled to the body's visual size. Meshes are unit sized
/// (half extent / radius 1).
#[inline]
pub fn model_matrix(position: Vec3, rotation: Quat, size: Vec3) -> Mat4 {
    Mat4::from_rotation_translation(rotation, position) * Mat4::from_scale(size)
}

/// Inverse transpose of the view-space upper 3x3
#[inline]
pub fn normal_matrix(view: Mat4, model: Mat4) -> Mat3 {
    Mat3::from_mat4(view * model).inverse().transpose()
}

/// Lane surfaces are drawn from layout data, not from the physics world
pub fn plane_model(lanes: &LaneLayout, index: u32) -> Mat4 {
    Mat4::from_translation(lane_center(lanes, index)) * Mat4::from_scale(lanes.size)
}

/// Bodies below the cull height leave play. Exactly at the limit stays.
#[inline]
pub fn is_culled(y: f32) -> bool {
    y < CULL_HEIGHT
}

/// Everything the frame loop needs to draw and emit from one body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyTransform {
    pub handle: BodyHandle,
    pub kind: VisualKind,
    pub position: Vec3,
    pub velocity: Vec3,
    pub model: Mat4,
    pub normal: Mat3,
}

impl BodyTransform {
    pub fn culled(&self) -> bool {
        is_culled(self.position.y)
    }
}

/// Read a body's current pose. `None` for destroyed handles.
pub fn body_transform(registry: &BodyRegistry, handle: BodyHandle, view: Mat4) -> Option<BodyTransform> {
    let info = registry.info(handle)?;
    let (position, rotation) = registry.transform_of(handle)?;
    let velocity = registry.velocity_of(handle)?;
    let model = model_matrix(position, rotation, info.size);
    Some(BodyTransform {
        handle,
        kind: info.kind,
        position,
        velocity,
        model,
        normal: normal_matrix(view, model),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::bodies::{BodyDesc, BodyShape};
    use proptest::prelude::*;

    #[test]
    fn test_model_matrix_scales_then_places() {
        let m = model_matrix(Vec3::new(1.0, 2.0, 3.0), Quat::IDENTITY, Vec3::new(0.5, 2.0, 1.0));
        let corner = m.transform_point3(Vec3::ONE);
        assert!((corner - Vec3::new(1.5, 4.0, 4.0)).length() < 1e-6);
    }

    #[test]
    fn test_normal_matrix_identity_view() {
        let model = model_matrix(Vec3::ZERO, Quat::IDENTITY, Vec3::new(2.0, 1.0, 1.0));
        let n = normal_matrix(Mat4::IDENTITY, model);
        // Non-uniform scale shrinks the normal along the stretched axis
        let nx = n * Vec3::X;
        assert!((nx - Vec3::new(0.5, 0.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_cull_boundary() {
        assert!(!is_culled(CULL_HEIGHT));
        assert!(is_culled(CULL_HEIGHT - 0.001));
        assert!(!is_culled(0.0));
    }

    #[test]
    fn test_plane_models_follow_lanes() {
        let lanes = LaneLayout::default();
        let m = plane_model(&lanes, 1);
        assert!((m.transform_point3(Vec3::ZERO) - Vec3::new(5.0, -1.0, 4.0)).length() < 1e-6);
        assert!((m.transform_vector3(Vec3::ONE) - lanes.size).length() < 1e-6);
    }

    #[test]
    fn test_body_transform_of_destroyed_body() {
        let mut registry = BodyRegistry::new();
        let h = registry.create(&BodyDesc {
            shape: BodyShape::Sphere,
            kind: VisualKind::Ball,
            position: Vec3::new(0.0, -8.0, 0.0),
            size: Vec3::splat(0.16),
            rotation: Vec3::ZERO,
            mass: 1.0,
            friction: 0.2,
            restitution: 0.2,
        });
        let t = body_transform(&registry, h, Mat4::IDENTITY).unwrap();
        assert_eq!(t.kind, VisualKind::Ball);
        assert!(t.culled());

        registry.destroy(h);
        assert!(body_transform(&registry, h, Mat4::IDENTITY).is_none());
    }

    proptest! {
        #[test]
        fn prop_cull_iff_below_limit(y in -100.0f32..100.0) {
            prop_assert_eq!(is_culled(y), y < -7.0);
        }
    }
}
