//! Graphics backend interface
//!
//! A renderable object drives a backend through a fixed sequence of calls:
//! bind program, upload uniforms, bind texture, bind mesh, draw, unbind.
//! [`FrameRecorder`] turns that sequence into a list of self-contained draw
//! commands that a GPU backend replays inside a single render pass.

use bytemuck::{Pod, Zeroable};

use crate::assets::{MeshHandle, ProgramHandle, TextureHandle};

/// Render state a draw is submitted with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Layer {
    /// Depth test and depth writes off, drawn behind everything
    Background,
    /// Depth tested 3D geometry
    #[default]
    Scene,
    /// Depth off with alpha blending, drawn over everything
    Overlay,
}

impl Layer {
    pub const ALL: [Layer; 3] = [Layer::Background, Layer::Scene, Layer::Overlay];

    pub fn index(self) -> usize {
        match self {
            Layer::Background => 0,
            Layer::Scene => 1,
            Layer::Overlay => 2,
        }
    }
}

/// Per-object shader uniforms, laid out to match `ObjectUniforms` in WGSL
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ObjectUniforms {
    pub mv: [[f32; 4]; 4],
    pub mvp: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 4],
    pub light_pos: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    /// w = shininess
    pub specular: [f32; 4],
    /// x = textured
    pub flags: [u32; 4],
}

impl ObjectUniforms {
    pub fn is_textured(&self) -> bool {
        self.flags[0] != 0
    }
}

/// Low-level draw interface
pub trait RenderBackend {
    fn bind_program(&mut self, program: ProgramHandle, layer: Layer);
    fn upload_uniforms(&mut self, uniforms: &ObjectUniforms);
    /// `None` binds the blank white texture
    fn bind_texture(&mut self, texture: Option<TextureHandle>);
    fn bind_mesh(&mut self, mesh: MeshHandle);
    fn draw_indexed(&mut self);
    fn unbind(&mut self);
}

/// Everything needed to replay one draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub program: ProgramHandle,
    pub layer: Layer,
    pub uniforms: ObjectUniforms,
    pub texture: Option<TextureHandle>,
    pub mesh: MeshHandle,
}

#[derive(Debug, Default)]
struct Bindings {
    program: Option<(ProgramHandle, Layer)>,
    uniforms: Option<ObjectUniforms>,
    texture: Option<TextureHandle>,
    mesh: Option<MeshHandle>,
}

/// Collects draw commands for one frame
#[derive(Debug, Default)]
pub struct FrameRecorder {
    bound: Bindings,
    draws: Vec<DrawCommand>,
    rejected: usize,
}

impl FrameRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draws(&self) -> &[DrawCommand] {
        &self.draws
    }

    /// Draw calls dropped because program, uniforms or mesh were not bound
    pub fn rejected(&self) -> usize {
        self.rejected
    }

    pub fn is_unbound(&self) -> bool {
        self.bound.program.is_none()
            && self.bound.uniforms.is_none()
            && self.bound.texture.is_none()
            && self.bound.mesh.is_none()
    }

    /// Hand over this frame's commands and start a new frame
    pub fn take_draws(&mut self) -> Vec<DrawCommand> {
        self.bound = Bindings::default();
        self.rejected = 0;
        std::mem::take(&mut self.draws)
    }
}

impl RenderBackend for FrameRecorder {
    fn bind_program(&mut self, program: ProgramHandle, layer: Layer) {
        self.bound.program = Some((program, layer));
    }

    fn upload_uniforms(&mut self, uniforms: &ObjectUniforms) {
        self.bound.uniforms = Some(*uniforms);
    }

    fn bind_texture(&mut self, texture: Option<TextureHandle>) {
        self.bound.texture = texture;
    }

    fn bind_mesh(&mut self, mesh: MeshHandle) {
        self.bound.mesh = Some(mesh);
    }

    fn draw_indexed(&mut self) {
        let (Some((program, layer)), Some(uniforms), Some(mesh)) =
            (self.bound.program, self.bound.uniforms, self.bound.mesh)
        else {
            log::debug!("draw_indexed with incomplete bindings, skipped");
            self.rejected += 1;
            return;
        };
        self.draws.push(DrawCommand {
            program,
            layer,
            uniforms,
            texture: self.bound.texture,
            mesh,
        });
    }

    fn unbind(&mut self) {
        self.bound = Bindings::default();
    }
}
