//! Scene content: lanes and pin racks
//!
//! Lanes are created first so the static bodies lead the registry order,
//! followed by one triangular rack of pins per lane.

use glam::Vec3;

use super::bodies::{BodyDesc, BodyRegistry, BodyShape, VisualKind};
use crate::settings::{LaneLayout, PinLayout, Settings};

/// Spacing between neighbouring pins in a row
const PIN_SPACING: f32 = 0.5;
/// Distance between rack rows along Z
const ROW_SPACING: f32 = 0.5;
/// Z of the back row
const RACK_BACK_Z: f32 = -3.0;

/// Center of lane `index`
pub fn lane_center(lanes: &LaneLayout, index: u32) -> Vec3 {
    lanes.position + Vec3::new(lanes.spacing * index as f32, 0.0, 0.0)
}

/// Pin positions of a rack centered on `lane_x`. The widest row sits at the
/// back, each following row is one pin shorter and shifted half a gap.
pub fn rack_positions(pins: &PinLayout, lane_x: f32) -> Vec<Vec3> {
    let rows = pins.rows;
    let first_x = -(rows.saturating_sub(1) as f32) * PIN_SPACING / 2.0;
    let mut positions = Vec::with_capacity(pins.pins_per_lane() as usize);
    for row in 0..rows {
        let row_x = first_x + row as f32 * PIN_SPACING / 2.0;
        let z = RACK_BACK_Z + row as f32 * ROW_SPACING;
        for col in 0..(rows - row) {
            positions.push(Vec3::new(lane_x + row_x + col as f32 * PIN_SPACING, 0.0, z));
        }
    }
    positions
}

/// Populate an empty registry with every lane and pin
pub fn build_level(registry: &mut BodyRegistry, settings: &Settings) {
    let lanes = &settings.lanes;
    let pins = &settings.pins;

    for lane in 0..lanes.count {
        registry.create(&BodyDesc {
            shape: BodyShape::Box,
            kind: VisualKind::Plane,
            position: lane_center(lanes, lane),
            size: lanes.size,
            rotation: Vec3::ZERO,
            mass: 0.0,
            friction: lanes.friction,
            restitution: lanes.restitution,
        });
    }

    for lane in 0..lanes.count {
        let lane_x = lanes.spacing * lane as f32;
        let mass = pins.base_mass + pins.mass_step * lane as f32;
        for position in rack_positions(pins, lane_x) {
            registry.create(&BodyDesc {
                shape: BodyShape::Box,
                kind: VisualKind::Pin,
                position,
                size: pins.size,
                rotation: Vec3::ZERO,
                mass,
                friction: pins.friction,
                restitution: pins.restitution,
            });
        }
    }

    log::info!(
        "Level built: {} lanes, {} pins",
        lanes.count,
        lanes.count * pins.pins_per_lane()
    );
}
