//! Drawable objects
//!
//! A [`RenderableObject`] owns the handles it draws with plus its material and
//! model transform. Pooled entities share one object and update `model` before
//! each draw.

use glam::{Mat4, Vec3};

use super::backend::{Layer, ObjectUniforms, RenderBackend};
use super::camera::Camera;
use crate::assets::{MeshHandle, ProgramHandle, TextureHandle};
use crate::consts::LIGHT_POS;

/// Phong material
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            ambient: Vec3::ZERO,
            diffuse: Vec3::ONE,
            specular: Vec3::ZERO,
            shininess: 1.0,
        }
    }
}

impl Material {
    pub const BALLOON: Material = Material {
        ambient: Vec3::new(0.1, 0.0, 0.0),
        diffuse: Vec3::new(1.0, 0.0, 0.0),
        specular: Vec3::new(0.2, 0.2, 0.2),
        shininess: 8.0,
    };

    pub const PROJECTILE: Material = Material {
        ambient: Vec3::ZERO,
        diffuse: Vec3::new(0.5, 0.5, 0.0),
        specular: Vec3::new(0.5, 0.5, 0.5),
        shininess: 8.0,
    };
}

#[derive(Debug, Clone)]
pub struct RenderableObject {
    program: ProgramHandle,
    mesh: MeshHandle,
    texture: Option<TextureHandle>,
    layer: Layer,
    pub material: Material,
    pub model: Mat4,
}

impl RenderableObject {
    pub fn new(program: ProgramHandle, mesh: MeshHandle, layer: Layer) -> Self {
        Self {
            program,
            mesh,
            texture: None,
            layer,
            material: Material::default(),
            model: Mat4::IDENTITY,
        }
    }

    pub fn with_texture(mut self, texture: TextureHandle) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    pub fn program(&self) -> ProgramHandle {
        self.program
    }

    pub fn mesh(&self) -> MeshHandle {
        self.mesh
    }

    pub fn texture(&self) -> Option<TextureHandle> {
        self.texture
    }

    pub fn layer(&self) -> Layer {
        self.layer
    }

    /// Place the object at a world position
    pub fn set_translation(&mut self, position: Vec3) {
        self.model = Mat4::from_translation(position);
    }

    /// Uniform block for the current model matrix
    pub fn uniforms(&self, camera: &Camera) -> ObjectUniforms {
        let mv = camera.view * self.model;
        let mvp = camera.projection * mv;
        let normal = mv.inverse().transpose();
        let light = camera.to_view(LIGHT_POS);

        ObjectUniforms {
            mv: mv.to_cols_array_2d(),
            mvp: mvp.to_cols_array_2d(),
            normal: normal.to_cols_array_2d(),
            light_pos: light.extend(1.0).to_array(),
            ambient: self.material.ambient.extend(1.0).to_array(),
            diffuse: self.material.diffuse.extend(1.0).to_array(),
            specular: self.material.specular.extend(self.material.shininess).to_array(),
            flags: [u32::from(self.texture.is_some()), 0, 0, 0],
        }
    }

    /// Issue one draw; the backend is left with nothing bound
    pub fn draw<B: RenderBackend + ?Sized>(&self, backend: &mut B, camera: &Camera) {
        backend.bind_program(self.program, self.layer);
        backend.upload_uniforms(&self.uniforms(camera));
        backend.bind_texture(self.texture);
        backend.bind_mesh(self.mesh);
        backend.draw_indexed();
        backend.unbind();
    }
}
