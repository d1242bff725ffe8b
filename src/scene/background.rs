//! Instanced background
//!
//! Thousands of small cubes arranged in a large X behind the lanes. The
//! per-instance matrices are generated once per scene; only the shared
//! model (spin) and color change per frame.

use glam::{Mat4, Vec3, Vec4};
use rand::Rng;

/// Max random displacement from the X arms
const SPREAD: f32 = 6.0;
/// How far each arm advances per instance
const ARM_STEP: f32 = 0.0165;
const ARM_START: f32 = 90.0;
const ARM_INSET: f32 = 5.0;
const BASE_HEIGHT: f32 = -33.0;
/// Distance of the pattern behind the origin
const DEPTH: f32 = -50.0;

/// Generated instance layout
#[derive(Debug, Clone, Default)]
pub struct Background {
    matrices: Vec<Mat4>,
}

impl Background {
    /// Lay out `count` instances. Even instances run left to right, odd ones
    /// right to left, crossing in the middle.
    pub fn generate(count: usize, rng: &mut impl Rng) -> Self {
        let axis = Vec3::new(0.4, 0.6, 0.8).normalize();
        let mut matrices = Vec::with_capacity(count);
        for i in 0..count {
            let step = ARM_STEP * i as f32;
            let d = displacement(rng);
            let x = if i % 2 == 0 {
                -ARM_START + step + d + ARM_INSET
            } else {
                ARM_START - step - d - ARM_INSET
            };
            let d = displacement(rng);
            let y = BASE_HEIGHT + step + d;
            let z = d * 2.0;

            let scale = rng.random_range(0..40) as f32 / 100.0 + 0.1;
            let angle = (rng.random_range(0..360) as f32).to_radians();

            matrices.push(
                Mat4::from_translation(Vec3::new(x, y, z))
                    * Mat4::from_scale(Vec3::splat(scale))
                    * Mat4::from_axis_angle(axis, angle),
            );
        }
        Self { matrices }
    }

    pub fn matrices(&self) -> &[Mat4] {
        &self.matrices
    }

    pub fn len(&self) -> usize {
        self.matrices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }
}

/// Displacement in [-6, 6) with 0.01 resolution
fn displacement(rng: &mut impl Rng) -> f32 {
    let steps = (2.0 * SPREAD * 100.0) as u32;
    rng.random_range(0..steps) as f32 / 100.0 - SPREAD
}

/// Model shared by every instance this frame
pub fn shared_model(spin_degrees: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(0.0, 0.0, DEPTH)) * Mat4::from_rotation_z(spin_degrees.to_radians())
}

/// Red/blue color cycle
pub fn color(elapsed: f32) -> Vec4 {
    let half = elapsed / 2.0;
    Vec4::new(half.sin().abs(), 0.0, half.cos().abs(), 1.0)
}
