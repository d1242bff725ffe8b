//! Platform layer
//!
//! Owns the window and event loop, turns OS input into `InputEvent`s and
//! paces frames. Everything below this layer is platform independent.

pub mod keymap;
pub mod native;

pub use keymap::{KeyBinding, map_key};
pub use native::run;
