//! First-person camera
//!
//! Yaw/pitch camera that can be locked to the ground plane, in which case
//! forward/back movement ignores pitch and the height never changes.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Movement directions driven by held actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMove {
    Forward,
    Backward,
    Left,
    Right,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    pub position: Vec3,
    /// Degrees; -90 looks down -Z
    pub yaw: f32,
    /// Degrees, clamped to ±89
    pub pitch: f32,
    /// Units per second
    pub speed: f32,
    /// Degrees per cursor pixel
    pub sensitivity: f32,
    /// Keep movement on the horizontal plane
    pub on_ground: bool,

    front: Vec3,
    world_front: Vec3,
    right: Vec3,
    up: Vec3,
}

const WORLD_UP: Vec3 = Vec3::Y;
const PITCH_LIMIT: f32 = 89.0;

impl Camera {
    pub fn new(position: Vec3, on_ground: bool) -> Self {
        let mut camera = Self {
            position,
            yaw: -90.0,
            pitch: 0.0,
            speed: 3.0,
            sensitivity: 0.25,
            on_ground,
            front: Vec3::NEG_Z,
            world_front: Vec3::NEG_Z,
            right: Vec3::X,
            up: Vec3::Y,
        };
        camera.update_vectors();
        camera
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    /// Move along the camera axes for `dt` seconds
    pub fn process_move(&mut self, direction: CameraMove, dt: f32) {
        let velocity = self.speed * dt;
        let forward = if self.on_ground {
            self.world_front
        } else {
            self.front
        };
        match direction {
            CameraMove::Forward => self.position += forward * velocity,
            CameraMove::Backward => self.position -= forward * velocity,
            CameraMove::Left => self.position -= self.right * velocity,
            CameraMove::Right => self.position += self.right * velocity,
        }
    }

    /// Rotate by a cursor offset in pixels (y positive = look up)
    pub fn process_look(&mut self, x_offset: f32, y_offset: f32) {
        self.yaw += x_offset * self.sensitivity;
        self.pitch = (self.pitch + y_offset * self.sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.update_vectors();
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();
        self.right = self.front.cross(WORLD_UP).normalize();
        self.world_front = WORLD_UP.cross(self.right).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}
