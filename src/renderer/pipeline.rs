//! WebGPU render backend
//!
//! Draw calls are recorded through [`RenderBackend`] during the frame and
//! replayed in one render pass by [`RenderState::render`]. Every draw gets its
//! own slot in a dynamic-offset uniform buffer.

use std::num::NonZeroU64;
use std::path::Path;

use wgpu::util::DeviceExt;

use super::backend::{DrawCommand, FrameRecorder, Layer, ObjectUniforms, RenderBackend};
use super::vertex::Vertex;
use crate::assets::shader::{FRAGMENT_ENTRY, VERTEX_ENTRY, validate_program};
use crate::assets::texture::decode_png;
use crate::assets::{
    AssetError, AssetLoader, MeshData, MeshHandle, ProgramHandle, ProgramSource, TextureData,
    TextureHandle,
};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
/// Uniform slots allocated up front; grows on demand
const INITIAL_DRAW_CAPACITY: usize = 64;
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.02,
    g: 0.02,
    b: 0.05,
    a: 1.0,
};

/// One program compiled for every layer
struct GpuProgram {
    name: String,
    pipelines: [wgpu::RenderPipeline; 3],
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

/// Main render state
pub struct RenderState {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    /// Viewport size in pixels
    pub size: (u32, u32),

    depth_view: wgpu::TextureView,

    object_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    sampler: wgpu::Sampler,

    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniform_stride: u64,
    draw_capacity: usize,

    blank_texture: wgpu::BindGroup,
    programs: Vec<GpuProgram>,
    meshes: Vec<GpuMesh>,
    textures: Vec<wgpu::BindGroup>,

    frame: FrameRecorder,
}

impl RenderState {
    pub async fn new(
        surface: wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
        vsync: bool,
    ) -> anyhow::Result<Self> {
        use anyhow::Context;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("balloon-shooter-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await
            .context("failed to create wgpu device")?;

        let surface_caps = surface.get_capabilities(adapter);
        log::info!("Surface formats: {:?}", surface_caps.formats);
        log::info!("Surface present modes: {:?}", surface_caps.present_modes);

        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface is not supported by the adapter")?;
        log::info!("Using surface format: {:?}", surface_format);

        let width = width.max(1);
        let height = height.max(1);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: if vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_view = create_depth_view(&device, width, height);

        let uniform_size = std::mem::size_of::<ObjectUniforms>() as u64;
        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("object_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(uniform_size),
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&object_layout, &texture_layout],
            immediate_size: 0,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("texture_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let alignment = u64::from(device.limits().min_uniform_buffer_offset_alignment);
        let uniform_stride = uniform_size.div_ceil(alignment) * alignment;
        let (uniform_buffer, uniform_bind_group) = create_uniform_slots(
            &device,
            &object_layout,
            uniform_stride,
            INITIAL_DRAW_CAPACITY,
        );

        let blank_texture = upload_texture(
            &device,
            &queue,
            &texture_layout,
            &sampler,
            "blank_texture",
            &TextureData::white(),
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size: (width, height),
            depth_view,
            object_layout,
            texture_layout,
            pipeline_layout,
            sampler,
            uniform_buffer,
            uniform_bind_group,
            uniform_stride,
            draw_capacity: INITIAL_DRAW_CAPACITY,
            blank_texture,
            programs: Vec::new(),
            meshes: Vec::new(),
            textures: Vec::new(),
            frame: FrameRecorder::new(),
        })
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            self.size = (new_width, new_height);
            self.config.width = new_width;
            self.config.height = new_height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = create_depth_view(&self.device, new_width, new_height);
        }
    }

    /// Reapply the current configuration after a lost or outdated surface
    pub fn reconfigure(&mut self) {
        self.resize(self.size.0, self.size.1);
    }

    /// Submit the draws recorded since the last frame and present
    pub fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let skipped = self.frame.rejected();
        if skipped > 0 {
            log::warn!("{skipped} draw calls with incomplete bindings skipped this frame");
        }
        let draws = self.frame.take_draws();
        self.ensure_capacity(draws.len());
        self.write_uniforms(&draws);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            for (slot, draw) in draws.iter().enumerate() {
                let (Some(program), Some(mesh)) = (
                    self.programs.get(draw.program.index()),
                    self.meshes.get(draw.mesh.index()),
                ) else {
                    log::warn!("Draw {slot} refers to an unknown program or mesh");
                    continue;
                };
                let texture = draw
                    .texture
                    .and_then(|t| self.textures.get(t.index()))
                    .unwrap_or(&self.blank_texture);
                let offset = (slot as u64 * self.uniform_stride) as wgpu::DynamicOffset;

                render_pass.set_pipeline(&program.pipelines[draw.layer.index()]);
                render_pass.set_bind_group(0, &self.uniform_bind_group, &[offset]);
                render_pass.set_bind_group(1, texture, &[]);
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn ensure_capacity(&mut self, draws: usize) {
        if draws <= self.draw_capacity {
            return;
        }
        let capacity = draws.next_power_of_two();
        log::debug!("Growing uniform slots {} -> {capacity}", self.draw_capacity);
        let (buffer, bind_group) = create_uniform_slots(
            &self.device,
            &self.object_layout,
            self.uniform_stride,
            capacity,
        );
        self.uniform_buffer = buffer;
        self.uniform_bind_group = bind_group;
        self.draw_capacity = capacity;
    }

    fn write_uniforms(&self, draws: &[DrawCommand]) {
        if draws.is_empty() {
            return;
        }
        let stride = self.uniform_stride as usize;
        let mut staging = vec![0u8; draws.len() * stride];
        for (slot, draw) in staging.chunks_exact_mut(stride).zip(draws) {
            let bytes = bytemuck::bytes_of(&draw.uniforms);
            slot[..bytes.len()].copy_from_slice(bytes);
        }
        self.queue.write_buffer(&self.uniform_buffer, 0, &staging);
    }

    fn create_pipeline(
        &self,
        label: &str,
        shader: &wgpu::ShaderModule,
        layer: Layer,
    ) -> wgpu::RenderPipeline {
        let (depth_write_enabled, depth_compare, blend) = match layer {
            Layer::Background => (false, wgpu::CompareFunction::Always, None),
            Layer::Scene => (true, wgpu::CompareFunction::Less, None),
            Layer::Overlay => (
                false,
                wgpu::CompareFunction::Always,
                Some(wgpu::BlendState::ALPHA_BLENDING),
            ),
        };

        self.device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&format!("{label}_{layer:?}")),
                layout: Some(&self.pipeline_layout),
                vertex: wgpu::VertexState {
                    module: shader,
                    entry_point: Some(VERTEX_ENTRY),
                    buffers: &[Vertex::desc()],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: shader,
                    entry_point: Some(FRAGMENT_ENTRY),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.config.format,
                        blend,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    strip_index_format: None,
                    front_face: wgpu::FrontFace::Ccw,
                    cull_mode: None,
                    polygon_mode: wgpu::PolygonMode::Fill,
                    unclipped_depth: false,
                    conservative: false,
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled,
                    depth_compare,
                    stencil: wgpu::StencilState::default(),
                    bias: wgpu::DepthBiasState::default(),
                }),
                multisample: wgpu::MultisampleState::default(),
                multiview_mask: None,
                cache: None,
            })
    }
}

impl AssetLoader for RenderState {
    fn load_mesh(&mut self, label: &str, mesh: &MeshData) -> Result<MeshHandle, AssetError> {
        mesh.validate(label)?;

        let vertex_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label}_vertices")),
                contents: bytemuck::cast_slice(&mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        let index_buffer = self
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{label}_indices")),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });

        let handle = MeshHandle::new(self.meshes.len() as u32, mesh.index_count());
        self.meshes.push(GpuMesh {
            vertex_buffer,
            index_buffer,
            index_count: mesh.index_count(),
        });
        log::debug!(
            "Uploaded mesh '{label}' ({} vertices, {} indices)",
            mesh.vertices.len(),
            mesh.indices.len()
        );
        Ok(handle)
    }

    fn load_texture(&mut self, path: &Path) -> Result<TextureHandle, AssetError> {
        let data = decode_png(path)?;
        let label = path.display().to_string();
        let bind_group = upload_texture(
            &self.device,
            &self.queue,
            &self.texture_layout,
            &self.sampler,
            &label,
            &data,
        );
        self.textures.push(bind_group);
        log::info!("Loaded texture {label} ({}x{})", data.width, data.height);
        Ok(TextureHandle::new(self.textures.len() as u32 - 1))
    }

    fn build_program(&mut self, source: &ProgramSource) -> Result<ProgramHandle, AssetError> {
        validate_program(source)?;

        let shader = self
            .device
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&source.name),
                source: wgpu::ShaderSource::Wgsl(source.wgsl.as_str().into()),
            });
        let pipelines = Layer::ALL.map(|layer| self.create_pipeline(&source.name, &shader, layer));

        self.programs.push(GpuProgram {
            name: source.name.clone(),
            pipelines,
        });
        log::info!("Built shader program '{}'", source.name);
        Ok(ProgramHandle::new(self.programs.len() as u32 - 1))
    }
}

impl RenderBackend for RenderState {
    fn bind_program(&mut self, program: ProgramHandle, layer: Layer) {
        if program.index() >= self.programs.len() {
            log::warn!("Binding unknown program {program:?}");
        }
        self.frame.bind_program(program, layer);
    }

    fn upload_uniforms(&mut self, uniforms: &ObjectUniforms) {
        self.frame.upload_uniforms(uniforms);
    }

    fn bind_texture(&mut self, texture: Option<TextureHandle>) {
        self.frame.bind_texture(texture);
    }

    fn bind_mesh(&mut self, mesh: MeshHandle) {
        self.frame.bind_mesh(mesh);
    }

    fn draw_indexed(&mut self) {
        self.frame.draw_indexed();
    }

    fn unbind(&mut self) {
        self.frame.unbind();
    }
}

impl std::fmt::Debug for RenderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderState")
            .field("size", &self.size)
            .field("format", &self.config.format)
            .field(
                "programs",
                &self.programs.iter().map(|p| &p.name).collect::<Vec<_>>(),
            )
            .field("meshes", &self.meshes.len())
            .field("textures", &self.textures.len())
            .finish()
    }
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

fn create_uniform_slots(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    stride: u64,
    capacity: usize,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("object_uniforms"),
        size: stride * capacity as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("object_bind_group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: NonZeroU64::new(std::mem::size_of::<ObjectUniforms>() as u64),
            }),
        }],
    });
    (buffer, bind_group)
}

fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    label: &str,
    data: &TextureData,
) -> wgpu::BindGroup {
    let size = wgpu::Extent3d {
        width: data.width,
        height: data.height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &data.pixels,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(data.bytes_per_row()),
            rows_per_image: Some(data.height),
        },
        size,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(label),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
        ],
    })
}
