//! Asset handles and loading
//!
//! Backends hand out opaque handles for meshes, textures and shader programs.
//! A handle can only come from a successful load, so a renderable object never
//! holds a missing mesh or program.

pub mod mesh;
pub mod shader;
pub mod texture;

use std::path::Path;

pub use mesh::MeshData;
pub use shader::ProgramSource;
pub use texture::TextureData;

/// Handle to uploaded geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle {
    id: u32,
    index_count: u32,
}

impl MeshHandle {
    pub const fn new(id: u32, index_count: u32) -> Self {
        Self { id, index_count }
    }

    /// Backend-local slot
    pub fn index(&self) -> usize {
        self.id as usize
    }

    /// Number of indices to draw
    pub fn index_count(&self) -> u32 {
        self.index_count
    }
}

/// Handle to an uploaded texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(u32);

impl TextureHandle {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Handle to a compiled and linked shader program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProgramHandle(u32);

impl ProgramHandle {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Asset loading failures
///
/// All of these are fatal at startup: assets ship with the game, so retrying
/// cannot change the outcome.
#[derive(thiserror::Error, Debug)]
pub enum AssetError {
    /// Geometry or image could not be read or is malformed
    #[error("failed to load {resource}: {reason}")]
    AssetLoad { resource: String, reason: String },

    /// Shader source does not parse or validate
    #[error("failed to compile shader program '{program}': {message}")]
    Compile { program: String, message: String },

    /// Shader stages or bindings do not fit together
    #[error("failed to link shader program '{program}': {message}")]
    Link { program: String, message: String },
}

impl AssetError {
    pub fn load(resource: impl Into<String>, reason: impl ToString) -> Self {
        AssetError::AssetLoad {
            resource: resource.into(),
            reason: reason.to_string(),
        }
    }

    /// Name of the resource that failed
    pub fn resource(&self) -> &str {
        match self {
            AssetError::AssetLoad { resource, .. } => resource,
            AssetError::Compile { program, .. } | AssetError::Link { program, .. } => program,
        }
    }
}

/// Turns asset descriptions into backend handles
pub trait AssetLoader {
    /// Upload geometry
    fn load_mesh(&mut self, label: &str, mesh: &MeshData) -> Result<MeshHandle, AssetError>;

    /// Decode an image file and upload it
    fn load_texture(&mut self, path: &Path) -> Result<TextureHandle, AssetError>;

    /// Compile and link a shader program
    fn build_program(&mut self, source: &ProgramSource) -> Result<ProgramHandle, AssetError>;
}
