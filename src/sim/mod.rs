//! Simulation module
//!
//! Physics world, particles, camera and input state. Nothing in here talks
//! to the GPU or the window; the frame loop in `game` wires it together.

pub mod bodies;
pub mod camera;
pub mod input;
pub mod level;
pub mod particles;
pub mod shoot;
pub mod state;
pub mod step;

pub use bodies::{BodyDesc, BodyHandle, BodyInfo, BodyRegistry, BodyShape, VisualKind};
pub use camera::{Camera, CameraMove};
pub use input::{Action, ActionState, CursorState, InputEvent};
pub use level::build_level;
pub use particles::{Particle, ParticlePool, ParticleTint};
pub use shoot::{ShotContext, shoot, unproject_direction};
pub use state::{Session, Trigger, Viewport, projection_matrix};
pub use step::{PhysicsStepper, clamp_delta};
