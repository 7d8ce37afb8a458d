//! Rendering module
//!
//! [`RenderableObject`]s talk to a [`RenderBackend`]; [`RenderState`] is the
//! wgpu implementation, which also loads assets.

pub mod backend;
pub mod camera;
pub mod pipeline;
pub mod renderable;
pub mod scene;
pub mod vertex;

#[cfg(test)]
pub(crate) mod testing;

pub use backend::{DrawCommand, FrameRecorder, Layer, ObjectUniforms, RenderBackend};
pub use camera::Camera;
pub use pipeline::RenderState;
pub use renderable::{Material, RenderableObject};
pub use scene::Scene;
pub use vertex::Vertex;
