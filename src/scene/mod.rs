//! Physics-to-render bridging
//!
//! Turns body poses into model/normal matrices, decides what falls out of
//! play, and lays out the instanced background.

pub mod background;
pub mod transforms;

pub use background::Background;
pub use transforms::{BodyTransform, body_transform, is_culled, model_matrix, normal_matrix, plane_model};
