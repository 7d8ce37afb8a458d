//! Platform layer
//!
//! Window, keyboard and frame timing on top of winit.

pub mod clock;
pub mod input;
pub mod runtime;

pub use clock::FixedStep;
pub use input::{InputState, Key, map_key};
pub use runtime::run;
