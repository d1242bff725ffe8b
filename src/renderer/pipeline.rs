//! WebGPU render pipeline setup
//!
//! Draw calls are collected on the CPU between `begin_frame` and
//! `end_frame`, then replayed into a single render pass. Lit meshes share
//! one uniform buffer indexed with dynamic offsets.

use std::collections::HashMap;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4};
use wgpu::util::DeviceExt;
use winit::window::Window;

use super::shapes::{self, MeshData};
use super::texture::{self, GpuTexture};
use super::vertex::{InstanceRaw, MeshVertex, ParticleInstance};
use super::{FrameUniforms, InstancedDraw, MeshDraw, MeshKind, RenderBackend, TextureSlot};
use crate::error::InitError;
use crate::settings::Settings;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const SPHERE_SEGMENTS: u32 = 32;
const SPHERE_RINGS: u32 = 16;
/// Lit draws the uniform buffer holds before it has to grow
const INITIAL_DRAW_CAPACITY: usize = 64;
const INITIAL_PARTICLE_CAPACITY: usize = 512;

// ============================================================================
// GPU DATA STRUCTURES (must match shaders)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct FrameRaw {
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    lights: [[f32; 4]; 3],
    viewport: [f32; 2],
    shading: u32,
    _pad: u32,
}

impl FrameRaw {
    fn new(frame: &FrameUniforms, size: (u32, u32)) -> Self {
        Self {
            view: frame.view.to_cols_array_2d(),
            projection: frame.projection.to_cols_array_2d(),
            camera_pos: frame.camera_pos.extend(1.0).to_array(),
            lights: frame.lights.map(|l| l.extend(1.0).to_array()),
            viewport: [size.0 as f32, size.1 as f32],
            shading: frame.shading.index(),
            _pad: 0,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct DrawRaw {
    model: [[f32; 4]; 4],
    // mat3x3 columns are padded to vec4
    normal: [[f32; 4]; 3],
    ambient_color: [f32; 4],
    specular_color: [f32; 4],
    kd: f32,
    ks: f32,
    ka: f32,
    shininess: f32,
    roughness: f32,
    f0: f32,
    repeat: f32,
    _pad: f32,
}

impl From<&MeshDraw> for DrawRaw {
    fn from(draw: &MeshDraw) -> Self {
        let n: Mat3 = draw.normal;
        let m = &draw.material;
        Self {
            model: draw.model.to_cols_array_2d(),
            normal: [
                n.x_axis.extend(0.0).to_array(),
                n.y_axis.extend(0.0).to_array(),
                n.z_axis.extend(0.0).to_array(),
            ],
            ambient_color: m.ambient_color.extend(1.0).to_array(),
            specular_color: m.specular_color.extend(1.0).to_array(),
            kd: m.kd,
            ks: m.ks,
            ka: m.ka,
            shininess: m.shininess,
            roughness: m.roughness,
            f0: m.f0,
            repeat: draw.repeat,
            _pad: 0.0,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct BatchRaw {
    model: [[f32; 4]; 4],
    color: [f32; 4],
}

// ============================================================================
// RENDER STATE
// ============================================================================

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn new(device: &wgpu::Device, mesh: &MeshData, label: &str) -> Self {
        Self {
            vertex_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(&mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            }),
            index_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            }),
            index_count: mesh.index_count(),
        }
    }
}

/// Recorded draw, replayed in `end_frame`
enum Pass {
    Mesh {
        mesh: MeshKind,
        texture: TextureSlot,
        slot: usize,
    },
    Particles {
        first: u32,
        count: u32,
    },
    Instanced {
        mesh: MeshKind,
        count: u32,
    },
}

pub struct WgpuRenderer {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    /// Viewport size in pixels
    pub size: (u32, u32),

    depth_view: wgpu::TextureView,

    lit_pipeline: wgpu::RenderPipeline,
    /// Only when the adapter supports line polygon mode
    wireframe_pipeline: Option<wgpu::RenderPipeline>,
    particle_pipeline: wgpu::RenderPipeline,
    instance_pipeline: wgpu::RenderPipeline,

    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,

    draw_layout: wgpu::BindGroupLayout,
    draw_buffer: wgpu::Buffer,
    draw_bind_group: wgpu::BindGroup,
    draw_stride: u64,
    draw_capacity: usize,

    batch_buffer: wgpu::Buffer,
    batch_bind_group: wgpu::BindGroup,

    textures: HashMap<TextureSlot, wgpu::BindGroup>,
    meshes: HashMap<MeshKind, GpuMesh>,

    instance_buffer: wgpu::Buffer,
    instance_capacity: usize,

    particle_buffer: wgpu::Buffer,
    particle_capacity: usize,

    // Current frame
    frame: Option<FrameUniforms>,
    passes: Vec<Pass>,
    draws: Vec<DrawRaw>,
    particles: Vec<ParticleInstance>,
    batch: Option<BatchRaw>,
}

impl WgpuRenderer {
    /// Open the GPU for `window` and build every pipeline
    pub async fn new(window: Arc<Window>, settings: &Settings) -> Result<Self, InitError> {
        let size = window.inner_size();
        let (width, height) = (size.width.max(1), size.height.max(1));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let wireframe_supported = adapter
            .features()
            .contains(wgpu::Features::POLYGON_MODE_LINE);
        if !wireframe_supported {
            log::warn!("Adapter lacks line polygon mode, wireframe toggle disabled");
        }

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("space-bowling-device"),
                required_features: if wireframe_supported {
                    wgpu::Features::POLYGON_MODE_LINE
                } else {
                    wgpu::Features::empty()
                },
                required_limits: wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits()),
                memory_hints: Default::default(),
                trace: Default::default(),
                experimental_features: Default::default(),
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(InitError::NoSurfaceFormat)?;
        log::info!("Using surface format: {:?}", surface_format);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
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

        // === Shaders ===
        let lit_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("illumination_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/illumination.wgsl").into()),
        });
        let particle_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("particle_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/particle.wgsl").into()),
        });
        let instance_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("instance_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/instance.wgsl").into()),
        });

        // === Bind group layouts ===
        let frame_layout = uniform_layout(&device, "frame_layout", false);
        let draw_layout = uniform_layout(&device, "draw_layout", true);
        let batch_layout = uniform_layout(&device, "batch_layout", false);
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("texture_layout"),
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

        // === Buffers ===
        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("frame"),
            size: std::mem::size_of::<FrameRaw>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame_bind_group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_buffer.as_entire_binding(),
            }],
        });

        let draw_stride = align_to(
            std::mem::size_of::<DrawRaw>() as u64,
            device.limits().min_uniform_buffer_offset_alignment as u64,
        );
        let (draw_buffer, draw_bind_group) =
            create_draw_buffer(&device, &draw_layout, draw_stride, INITIAL_DRAW_CAPACITY);

        let batch_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("batch"),
            size: std::mem::size_of::<BatchRaw>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let batch_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("batch_bind_group"),
            layout: &batch_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: batch_buffer.as_entire_binding(),
            }],
        });

        let instance_buffer = create_vertex_buffer::<InstanceRaw>(&device, "instances", 1);
        let particle_buffer =
            create_vertex_buffer::<ParticleInstance>(&device, "particles", INITIAL_PARTICLE_CAPACITY);

        // === Textures ===
        let mut textures = HashMap::new();
        for slot in TextureSlot::ALL {
            let path = match slot {
                TextureSlot::Pin => &settings.textures.pin,
                TextureSlot::Floor => &settings.textures.floor,
                TextureSlot::Ball => &settings.textures.ball,
            };
            let image = texture::decode_or_fallback(path);
            let gpu = GpuTexture::upload(&device, &queue, &image, &format!("{slot:?}"));
            let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("texture_bind_group"),
                layout: &texture_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(&gpu.view),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::Sampler(&gpu.sampler),
                    },
                ],
            });
            textures.insert(slot, bind_group);
        }

        // === Meshes ===
        let mut meshes = HashMap::new();
        meshes.insert(MeshKind::Cube, GpuMesh::new(&device, &shapes::cube(), "cube"));
        meshes.insert(
            MeshKind::Sphere,
            GpuMesh::new(&device, &shapes::uv_sphere(SPHERE_SEGMENTS, SPHERE_RINGS), "sphere"),
        );

        // === Pipelines ===
        let lit_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("lit_pipeline_layout"),
            bind_group_layouts: &[&frame_layout, &draw_layout, &texture_layout],
            immediate_size: 0,
        });
        let particle_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("particle_pipeline_layout"),
            bind_group_layouts: &[&frame_layout],
            immediate_size: 0,
        });
        let instance_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("instance_pipeline_layout"),
            bind_group_layouts: &[&frame_layout, &batch_layout],
            immediate_size: 0,
        });

        let lit = PipelineSpec {
            label: "lit_pipeline",
            layout: &lit_layout,
            shader: &lit_shader,
            buffers: &[MeshVertex::desc()],
            format: config.format,
            blend: Some(wgpu::BlendState::ALPHA_BLENDING),
            depth_write: true,
            polygon_mode: wgpu::PolygonMode::Fill,
        };
        let lit_pipeline = lit.build(&device);
        let wireframe_pipeline = wireframe_supported.then(|| {
            PipelineSpec {
                label: "wireframe_pipeline",
                polygon_mode: wgpu::PolygonMode::Line,
                ..lit
            }
            .build(&device)
        });

        let particle_pipeline = PipelineSpec {
            label: "particle_pipeline",
            layout: &particle_layout,
            shader: &particle_shader,
            buffers: &[ParticleInstance::desc()],
            format: config.format,
            // Additive
            blend: Some(wgpu::BlendState {
                color: wgpu::BlendComponent {
                    src_factor: wgpu::BlendFactor::SrcAlpha,
                    dst_factor: wgpu::BlendFactor::One,
                    operation: wgpu::BlendOperation::Add,
                },
                alpha: wgpu::BlendComponent::OVER,
            }),
            depth_write: false,
            polygon_mode: wgpu::PolygonMode::Fill,
        }
        .build(&device);

        let instance_pipeline = PipelineSpec {
            label: "instance_pipeline",
            layout: &instance_layout,
            shader: &instance_shader,
            buffers: &[MeshVertex::desc(), InstanceRaw::desc()],
            format: config.format,
            blend: None,
            depth_write: true,
            polygon_mode: wgpu::PolygonMode::Fill,
        }
        .build(&device);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size: (width, height),
            depth_view,
            lit_pipeline,
            wireframe_pipeline,
            particle_pipeline,
            instance_pipeline,
            frame_buffer,
            frame_bind_group,
            draw_layout,
            draw_buffer,
            draw_bind_group,
            draw_stride,
            draw_capacity: INITIAL_DRAW_CAPACITY,
            batch_buffer,
            batch_bind_group,
            textures,
            meshes,
            instance_buffer,
            instance_capacity: 1,
            particle_buffer,
            particle_capacity: INITIAL_PARTICLE_CAPACITY,
            frame: None,
            passes: Vec::new(),
            draws: Vec::new(),
            particles: Vec::new(),
            batch: None,
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

    /// Grow GPU buffers to fit this frame's data and upload it
    fn upload_frame(&mut self, frame: &FrameUniforms) {
        self.queue.write_buffer(
            &self.frame_buffer,
            0,
            bytemuck::bytes_of(&FrameRaw::new(frame, self.size)),
        );

        if self.draws.len() > self.draw_capacity {
            let capacity = self.draws.len().next_power_of_two();
            let (buffer, bind_group) =
                create_draw_buffer(&self.device, &self.draw_layout, self.draw_stride, capacity);
            self.draw_buffer = buffer;
            self.draw_bind_group = bind_group;
            self.draw_capacity = capacity;
            log::debug!("Draw uniform buffer grown to {capacity}");
        }
        for (i, draw) in self.draws.iter().enumerate() {
            self.queue.write_buffer(
                &self.draw_buffer,
                i as u64 * self.draw_stride,
                bytemuck::bytes_of(draw),
            );
        }

        if self.particles.len() > self.particle_capacity {
            let capacity = self.particles.len().next_power_of_two();
            self.particle_buffer =
                create_vertex_buffer::<ParticleInstance>(&self.device, "particles", capacity);
            self.particle_capacity = capacity;
        }
        if !self.particles.is_empty() {
            self.queue
                .write_buffer(&self.particle_buffer, 0, bytemuck::cast_slice(&self.particles));
        }

        if let Some(batch) = &self.batch {
            self.queue
                .write_buffer(&self.batch_buffer, 0, bytemuck::bytes_of(batch));
        }
    }

    fn clear_recording(&mut self) {
        self.passes.clear();
        self.draws.clear();
        self.particles.clear();
        self.batch = None;
    }
}

impl RenderBackend for WgpuRenderer {
    fn begin_frame(&mut self, frame: &FrameUniforms) {
        self.clear_recording();
        self.frame = Some(*frame);
    }

    fn draw_mesh(&mut self, mesh: MeshKind, draw: &MeshDraw) {
        self.passes.push(Pass::Mesh {
            mesh,
            texture: draw.texture,
            slot: self.draws.len(),
        });
        self.draws.push(DrawRaw::from(draw));
    }

    fn draw_particles(&mut self, particles: &[ParticleInstance]) {
        if particles.is_empty() {
            return;
        }
        self.passes.push(Pass::Particles {
            first: self.particles.len() as u32,
            count: particles.len() as u32,
        });
        self.particles.extend_from_slice(particles);
    }

    fn upload_instances(&mut self, matrices: &[Mat4]) {
        let raw: Vec<InstanceRaw> = matrices.iter().map(InstanceRaw::from).collect();
        if raw.len() > self.instance_capacity {
            self.instance_buffer = create_vertex_buffer::<InstanceRaw>(&self.device, "instances", raw.len());
            self.instance_capacity = raw.len();
        }
        if !raw.is_empty() {
            self.queue
                .write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&raw));
        }
        log::info!("Uploaded {} background instances", raw.len());
    }

    fn draw_instanced(&mut self, mesh: MeshKind, draw: &InstancedDraw) {
        self.batch = Some(BatchRaw {
            model: draw.model.to_cols_array_2d(),
            color: draw.color.to_array(),
        });
        self.passes.push(Pass::Instanced {
            mesh,
            count: draw.count.min(self.instance_capacity as u32),
        });
    }

    fn end_frame(&mut self) -> Result<(), wgpu::SurfaceError> {
        let Some(frame) = self.frame.take() else {
            return Ok(());
        };
        self.upload_frame(&frame);

        let result = self.encode_and_present(&frame);
        self.clear_recording();
        result
    }
}

impl WgpuRenderer {
    fn encode_and_present(&mut self, frame: &FrameUniforms) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render_encoder"),
            });

        let lit_pipeline = match (&self.wireframe_pipeline, frame.wireframe) {
            (Some(wireframe), true) => wireframe,
            _ => &self.lit_pipeline,
        };

        {
            let c = frame.clear_color;
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: c.x as f64,
                            g: c.y as f64,
                            b: c.z as f64,
                            a: c.w as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            render_pass.set_bind_group(0, &self.frame_bind_group, &[]);

            for pass in &self.passes {
                match *pass {
                    Pass::Mesh {
                        mesh,
                        texture,
                        slot,
                    } => {
                        let (Some(gpu), Some(tex)) = (self.meshes.get(&mesh), self.textures.get(&texture))
                        else {
                            continue;
                        };
                        render_pass.set_pipeline(lit_pipeline);
                        render_pass.set_bind_group(
                            1,
                            &self.draw_bind_group,
                            &[(slot as u64 * self.draw_stride) as u32],
                        );
                        render_pass.set_bind_group(2, tex, &[]);
                        render_pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
                        render_pass.set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                        render_pass.draw_indexed(0..gpu.index_count, 0, 0..1);
                    }
                    Pass::Particles { first, count } => {
                        render_pass.set_pipeline(&self.particle_pipeline);
                        render_pass.set_vertex_buffer(0, self.particle_buffer.slice(..));
                        render_pass.draw(0..6, first..first + count);
                    }
                    Pass::Instanced { mesh, count } => {
                        let Some(gpu) = self.meshes.get(&mesh) else {
                            continue;
                        };
                        render_pass.set_pipeline(&self.instance_pipeline);
                        render_pass.set_bind_group(1, &self.batch_bind_group, &[]);
                        render_pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
                        render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                        render_pass.set_index_buffer(gpu.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                        render_pass.draw_indexed(0..gpu.index_count, 0, 0..count);
                    }
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Everything that differs between the render pipelines
#[derive(Clone, Copy)]
struct PipelineSpec<'a> {
    label: &'a str,
    layout: &'a wgpu::PipelineLayout,
    shader: &'a wgpu::ShaderModule,
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
    depth_write: bool,
    polygon_mode: wgpu::PolygonMode,
}

impl PipelineSpec<'_> {
    fn build(&self, device: &wgpu::Device) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(self.label),
            layout: Some(self.layout),
            vertex: wgpu::VertexState {
                module: self.shader,
                entry_point: Some("vs_main"),
                buffers: self.buffers,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: self.shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.format,
                    blend: self.blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: self.polygon_mode,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: self.depth_write,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }
}

fn uniform_layout(device: &wgpu::Device, label: &str, dynamic: bool) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: dynamic,
                min_binding_size: None,
            },
            count: None,
        }],
    })
}

fn create_draw_buffer(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    stride: u64,
    capacity: usize,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("draws"),
        size: stride * capacity as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("draw_bind_group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: wgpu::BufferSize::new(std::mem::size_of::<DrawRaw>() as u64),
            }),
        }],
    });
    (buffer, bind_group)
}

fn create_vertex_buffer<T: Pod>(device: &wgpu::Device, label: &str, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some(label),
        size: (std::mem::size_of::<T>() * capacity.max(1)) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
    device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some("depth"),
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
        })
        .create_view(&wgpu::TextureViewDescriptor::default())
}

fn align_to(value: u64, alignment: u64) -> u64 {
    let alignment = alignment.max(1);
    value.div_ceil(alignment) * alignment
}
