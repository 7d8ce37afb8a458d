//! Test doubles for the backend and loader traits

use std::path::{Path, PathBuf};

use super::backend::{Layer, ObjectUniforms, RenderBackend};
use crate::assets::{
    AssetError, AssetLoader, MeshData, MeshHandle, ProgramHandle, ProgramSource, TextureHandle,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    BindProgram(ProgramHandle, Layer),
    UploadUniforms,
    BindTexture(Option<TextureHandle>),
    BindMesh(MeshHandle),
    DrawIndexed,
    Unbind,
}

/// Records every backend call in order
#[derive(Debug, Default)]
pub struct CallLog {
    pub calls: Vec<Call>,
}

impl RenderBackend for CallLog {
    fn bind_program(&mut self, program: ProgramHandle, layer: Layer) {
        self.calls.push(Call::BindProgram(program, layer));
    }

    fn upload_uniforms(&mut self, _uniforms: &ObjectUniforms) {
        self.calls.push(Call::UploadUniforms);
    }

    fn bind_texture(&mut self, texture: Option<TextureHandle>) {
        self.calls.push(Call::BindTexture(texture));
    }

    fn bind_mesh(&mut self, mesh: MeshHandle) {
        self.calls.push(Call::BindMesh(mesh));
    }

    fn draw_indexed(&mut self) {
        self.calls.push(Call::DrawIndexed);
    }

    fn unbind(&mut self) {
        self.calls.push(Call::Unbind);
    }
}

/// Hands out sequential handles without touching the filesystem or a GPU
#[derive(Debug, Default)]
pub struct MockLoader {
    pub meshes: Vec<String>,
    pub textures: Vec<PathBuf>,
    pub programs: Vec<String>,
    /// File name whose load fails
    pub fail_texture: Option<String>,
}

impl AssetLoader for MockLoader {
    fn load_mesh(&mut self, label: &str, mesh: &MeshData) -> Result<MeshHandle, AssetError> {
        mesh.validate(label)?;
        self.meshes.push(label.to_string());
        Ok(MeshHandle::new(
            self.meshes.len() as u32 - 1,
            mesh.index_count(),
        ))
    }

    fn load_texture(&mut self, path: &Path) -> Result<TextureHandle, AssetError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        if self.fail_texture.as_deref() == Some(name.as_str()) {
            return Err(AssetError::load(path.display().to_string(), "file not found"));
        }
        self.textures.push(path.to_path_buf());
        Ok(TextureHandle::new(self.textures.len() as u32 - 1))
    }

    fn build_program(&mut self, source: &ProgramSource) -> Result<ProgramHandle, AssetError> {
        self.programs.push(source.name.clone());
        Ok(ProgramHandle::new(self.programs.len() as u32 - 1))
    }
}
