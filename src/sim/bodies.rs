//! Rigid body registry
//!
//! Thin ownership layer over the rapier body/collider sets. Keeps handles in
//! insertion order (static lanes first) and tags every body with what it is
//! drawn as, so the render pass never has to infer pins from balls by index.

use std::collections::HashMap;

use glam::{EulerRot, Quat, Vec3};
use rapier3d::na::{Isometry3, Quaternion, Translation3, UnitQuaternion};
use rapier3d::prelude::*;
use serde::{Deserialize, Serialize};

/// Collision shape of a body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyShape {
    /// Box with half extents = size
    Box,
    /// Sphere with radius = size.x
    Sphere,
}

/// What a body is drawn as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VisualKind {
    Plane,
    Pin,
    Ball,
}

/// Stable identity of a body in the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(RigidBodyHandle);

/// Everything needed to create a body
#[derive(Debug, Clone, Copy)]
pub struct BodyDesc {
    pub shape: BodyShape,
    pub kind: VisualKind,
    pub position: Vec3,
    pub size: Vec3,
    /// Euler angles (radians, XYZ)
    pub rotation: Vec3,
    /// 0 = static, never moves
    pub mass: f32,
    pub friction: f32,
    pub restitution: f32,
}

/// Creation-time properties kept alongside the rapier body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyInfo {
    pub shape: BodyShape,
    pub kind: VisualKind,
    pub size: Vec3,
    pub mass: f32,
}

impl BodyInfo {
    /// Static bodies never move and are exempt from culling
    #[inline]
    pub fn is_static(&self) -> bool {
        self.mass <= 0.0
    }
}

/// Owns every rigid body in the world
pub struct BodyRegistry {
    pub(super) bodies: RigidBodySet,
    pub(super) colliders: ColliderSet,
    pub(super) islands: IslandManager,
    pub(super) impulse_joints: ImpulseJointSet,
    pub(super) multibody_joints: MultibodyJointSet,
    /// Insertion order
    order: Vec<BodyHandle>,
    info: HashMap<BodyHandle, BodyInfo>,
    /// Removals requested during an iteration pass
    pending_removal: Vec<BodyHandle>,
}

impl Default for BodyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BodyRegistry {
    pub fn new() -> Self {
        Self {
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            islands: IslandManager::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            order: Vec::new(),
            info: HashMap::new(),
            pending_removal: Vec::new(),
        }
    }

    /// Create a body and its collider, returning its handle
    pub fn create(&mut self, desc: &BodyDesc) -> BodyHandle {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            desc.rotation.x,
            desc.rotation.y,
            desc.rotation.z,
        );
        let pose = Isometry3::from_parts(
            Translation3::new(desc.position.x, desc.position.y, desc.position.z),
            to_unit_quaternion(rotation),
        );

        let is_static = desc.mass <= 0.0;
        let builder = if is_static {
            RigidBodyBuilder::fixed()
        } else {
            RigidBodyBuilder::dynamic()
        };
        let rb_handle = self.bodies.insert(builder.position(pose).build());

        let collider = match desc.shape {
            BodyShape::Box => ColliderBuilder::cuboid(desc.size.x, desc.size.y, desc.size.z),
            BodyShape::Sphere => ColliderBuilder::ball(desc.size.x),
        }
        .friction(desc.friction)
        .restitution(desc.restitution);
        let collider = if is_static {
            collider
        } else {
            collider.mass(desc.mass)
        };
        self.colliders
            .insert_with_parent(collider.build(), rb_handle, &mut self.bodies);

        let handle = BodyHandle(rb_handle);
        self.order.push(handle);
        self.info.insert(
            handle,
            BodyInfo {
                shape: desc.shape,
                kind: desc.kind,
                size: desc.size,
                mass: desc.mass.max(0.0),
            },
        );
        handle
    }

    /// Remove a body immediately. Must not be called while iterating `all()`;
    /// use `mark_for_removal` from inside a pass instead.
    pub fn destroy(&mut self, handle: BodyHandle) -> bool {
        if self.info.remove(&handle).is_none() {
            return false;
        }
        self.order.retain(|h| *h != handle);
        self.bodies.remove(
            handle.0,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
        true
    }

    /// Queue a body for removal at the next `flush_removals`
    pub fn mark_for_removal(&mut self, handle: BodyHandle) {
        if self.info.contains_key(&handle) && !self.pending_removal.contains(&handle) {
            self.pending_removal.push(handle);
        }
    }

    /// Apply queued removals, returning how many bodies were destroyed
    pub fn flush_removals(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending_removal);
        pending.into_iter().filter(|h| self.destroy(*h)).count()
    }

    /// World position and rotation
    pub fn transform_of(&self, handle: BodyHandle) -> Option<(Vec3, Quat)> {
        self.live_body(handle).map(|rb| {
            let pose = rb.position();
            let t = pose.translation.vector;
            let r = pose.rotation;
            (
                Vec3::new(t.x, t.y, t.z),
                Quat::from_xyzw(r.i, r.j, r.k, r.w),
            )
        })
    }

    /// Linear velocity
    pub fn velocity_of(&self, handle: BodyHandle) -> Option<Vec3> {
        self.live_body(handle).map(|rb| {
            let v = rb.linvel();
            Vec3::new(v.x, v.y, v.z)
        })
    }

    /// Instantaneous change of momentum, waking the body
    pub fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec3) -> bool {
        if !self.info.contains_key(&handle) {
            return false;
        }
        match self.bodies.get_mut(handle.0) {
            Some(rb) => {
                rb.apply_impulse(vector![impulse.x, impulse.y, impulse.z], true);
                true
            }
            None => false,
        }
    }

    /// Creation-time properties
    pub fn info(&self, handle: BodyHandle) -> Option<&BodyInfo> {
        self.info.get(&handle)
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.info.contains_key(&handle)
    }

    /// Handles in insertion order
    pub fn all(&self) -> &[BodyHandle] {
        &self.order
    }

    /// Copy of the handle list, safe to iterate while queueing removals
    pub fn snapshot(&self) -> Vec<BodyHandle> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Drop every body (teardown / scene re-init)
    pub fn clear(&mut self) {
        for handle in std::mem::take(&mut self.order) {
            self.bodies.remove(
                handle.0,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            );
        }
        self.info.clear();
        self.pending_removal.clear();
    }

    fn live_body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        if self.info.contains_key(&handle) {
            self.bodies.get(handle.0)
        } else {
            None
        }
    }
}

fn to_unit_quaternion(q: Quat) -> UnitQuaternion<Real> {
    UnitQuaternion::from_quaternion(Quaternion::new(q.w, q.x, q.y, q.z))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ball_at(position: Vec3) -> BodyDesc {
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

    #[test]
    fn test_create_keeps_insertion_order() {
        let mut registry = BodyRegistry::new();
        let a = registry.create(&ball_at(Vec3::ZERO));
        let b = registry.create(&ball_at(Vec3::X));
        let c = registry.create(&ball_at(Vec3::Y));
        assert_eq!(registry.all(), &[a, b, c]);

        registry.destroy(b);
        assert_eq!(registry.all(), &[a, c]);
    }

    #[test]
    fn test_transform_readout() {
        let mut registry = BodyRegistry::new();
        let h = registry.create(&ball_at(Vec3::new(1.0, 2.0, 3.0)));
        let (pos, rot) = registry.transform_of(h).unwrap();
        assert!((pos - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-6);
        assert!(rot.angle_between(Quat::IDENTITY) < 1e-5);
        assert_eq!(registry.velocity_of(h), Some(Vec3::ZERO));
    }

    #[test]
    fn test_rotation_is_applied() {
        let mut registry = BodyRegistry::new();
        let mut desc = ball_at(Vec3::ZERO);
        desc.rotation = Vec3::new(0.0, std::f32::consts::FRAC_PI_2, 0.0);
        let h = registry.create(&desc);
        let (_, rot) = registry.transform_of(h).unwrap();
        let expected = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        assert!(rot.angle_between(expected) < 1e-4);
    }

    #[test]
    fn test_destroyed_handle_is_invalid() {
        let mut registry = BodyRegistry::new();
        let h = registry.create(&ball_at(Vec3::ZERO));
        assert!(registry.destroy(h));
        assert!(!registry.contains(h));
        assert!(registry.transform_of(h).is_none());
        assert!(registry.velocity_of(h).is_none());
        assert!(!registry.destroy(h));
    }

    #[test]
    fn test_deferred_removal_during_iteration() {
        let mut registry = BodyRegistry::new();
        let handles: Vec<_> = (0..4)
            .map(|i| registry.create(&ball_at(Vec3::X * i as f32)))
            .collect();

        for handle in registry.snapshot() {
            registry.mark_for_removal(handle);
            // Still readable until the pass ends
            assert!(registry.transform_of(handle).is_some());
        }
        assert_eq!(registry.len(), 4);

        assert_eq!(registry.flush_removals(), 4);
        assert!(registry.is_empty());
        assert!(handles.iter().all(|h| !registry.contains(*h)));
    }

    #[test]
    fn test_mark_twice_removes_once() {
        let mut registry = BodyRegistry::new();
        let h = registry.create(&ball_at(Vec3::ZERO));
        registry.mark_for_removal(h);
        registry.mark_for_removal(h);
        assert_eq!(registry.flush_removals(), 1);
    }

    #[test]
    fn test_zero_mass_is_static() {
        let mut registry = BodyRegistry::new();
        let mut desc = ball_at(Vec3::ZERO);
        desc.shape = BodyShape::Box;
        desc.kind = VisualKind::Plane;
        desc.mass = 0.0;
        let h = registry.create(&desc);
        assert!(registry.info(h).unwrap().is_static());
    }

    #[test]
    fn test_impulse_sets_velocity() {
        let mut registry = BodyRegistry::new();
        let h = registry.create(&ball_at(Vec3::ZERO));
        assert!(registry.apply_impulse(h, Vec3::new(2.85, 0.0, 0.0)));
        let v = registry.velocity_of(h).unwrap();
        assert!(v.x > 0.0, "v = {v:?}");
        assert!(v.y.abs() < 1e-6 && v.z.abs() < 1e-6);
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut registry = BodyRegistry::new();
        registry.create(&ball_at(Vec3::ZERO));
        registry.create(&ball_at(Vec3::ONE));
        registry.clear();
        assert!(registry.is_empty());
    }
}
