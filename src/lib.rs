//! Space Bowling - a 3D bowling game with rigid-body physics
//!
//! Core modules:
//! - `sim`: Physics world, particles, camera and input state
//! - `scene`: Physics-to-render transform bridging and culling
//! - `game`: Per-frame orchestration
//! - `renderer`: WebGPU rendering pipeline behind a backend trait
//! - `platform`: Native window/input shell
//! - `settings`: Startup configuration

pub mod error;
pub mod game;
pub mod overlay;
pub mod platform;
pub mod renderer;
pub mod scene;
pub mod settings;
pub mod sim;

pub use error::{InitError, SettingsError, TextureError};
pub use game::{FrameOutput, FramePhase, Game};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Largest delta handed to the physics world in one frame
    pub const MAX_STEP_SECONDS: f32 = 1.0 / 60.0;
    /// Internal solver sub-steps per frame
    pub const PHYSICS_SUBSTEPS: u32 = 10;
    /// World gravity (m/s²)
    pub const GRAVITY: f32 = -9.82;

    /// Bodies below this height leave play
    pub const CULL_HEIGHT: f32 = -7.0;

    /// Particles emitted per live dynamic body per frame
    pub const PARTICLES_PER_BODY: usize = 2;
    /// Particle lifetime at spawn (seconds)
    pub const PARTICLE_LIFE: f32 = 1.0;
    /// Fraction of the source velocity inherited by a particle
    pub const PARTICLE_SPEED_FACTOR: f32 = 0.1;
    /// Alpha lost per second
    pub const PARTICLE_FADE_RATE: f32 = 2.5;

    /// Ball launch speed (units/s)
    pub const SHOOT_SPEED: f32 = 40.0;
    /// Ball mass (kg), a regulation bowling ball
    pub const BALL_MASS: f32 = 2.85;
    /// Launch height, close to the lane surface
    pub const BALL_LAUNCH_HEIGHT: f32 = -0.6;

    /// Background spin speed (degrees/s)
    pub const SPIN_SPEED: f32 = 30.0;

    /// Overlay parameter ranges
    pub const MIN_INSTANCES: u32 = 100;
    pub const MAX_INSTANCES: u32 = 10_000;
    pub const MIN_PARTICLES: u32 = 10;
    pub const MAX_PARTICLES: u32 = 500;
}
