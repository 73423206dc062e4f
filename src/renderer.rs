use anyhow::Result;
use glam::Mat4;
use std::sync::Arc;
use wgpu::util::DeviceExt;
use wgpu::{BindGroup, BindGroupLayout, Buffer, Device, RenderPipeline, Texture, TextureView};

use crate::core::gpu_context::GpuContext;
use crate::environment::Environment;
use crate::model::SceneModel;
use crate::traits::{FrameView, RenderSurface};
use crate::types::{CameraUniform, ModelUniform, Vertex};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

struct GpuPrimitive {
    vertex_buffer: Buffer,
    index_buffer: Buffer,
    index_count: u32,
}

/// One draw: a mesh placed by a node's world transform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct DrawItem {
    node: usize,
    mesh: usize,
}

/// Renders the scene into an offscreen color target
///
/// The compositor samples [`GpuSceneSurface::output_view`] when presenting.
pub struct GpuSceneSurface {
    gpu: Arc<GpuContext>,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
    color_texture: Texture,
    color_view: TextureView,
    depth_view: TextureView,
    pipeline: RenderPipeline,
    bind_group_layout: BindGroupLayout,
    camera_buffer: Buffer,
    environment_buffer: Buffer,
    model_buffer: Buffer,
    model_capacity: usize,
    bind_group: BindGroup,
    meshes: Vec<Vec<GpuPrimitive>>,
    draws: Vec<DrawItem>,
    background: wgpu::Color,
    released: bool,
}

impl GpuSceneSurface {
    pub fn new(gpu: Arc<GpuContext>, format: wgpu::TextureFormat, width: u32, height: u32) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let device = gpu.device();

        let (color_texture, color_view) = Self::create_color_target(device, format, width, height);
        let depth_view = Self::create_depth_target(device, width, height);

        let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Camera Buffer"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let environment_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Environment Buffer"),
            contents: bytemuck::cast_slice(&[Environment::default().to_uniform()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let model_capacity = 1;
        let model_buffer = Self::create_model_buffer(device, model_capacity);

        let bind_group_layout = Self::create_bind_group_layout(device);
        let bind_group = Self::create_bind_group(
            device,
            &bind_group_layout,
            &camera_buffer,
            &environment_buffer,
            &model_buffer,
        );
        let pipeline = Self::create_pipeline(device, &bind_group_layout, format);

        Self {
            gpu,
            format,
            width,
            height,
            color_texture,
            color_view,
            depth_view,
            pipeline,
            bind_group_layout,
            camera_buffer,
            environment_buffer,
            model_buffer,
            model_capacity,
            bind_group,
            meshes: Vec::new(),
            draws: Vec::new(),
            background: Environment::default().clear_color(),
            released: false,
        }
    }

    /// Color target holding the last rendered frame
    pub fn output_view(&self) -> Option<&TextureView> {
        (!self.released).then_some(&self.color_view)
    }

    fn ensure_model_capacity(&mut self, count: usize) {
        if count <= self.model_capacity {
            return;
        }
        let device = self.gpu.device();
        self.model_capacity = count.next_power_of_two();
        self.model_buffer = Self::create_model_buffer(device, self.model_capacity);
        self.bind_group = Self::create_bind_group(
            device,
            &self.bind_group_layout,
            &self.camera_buffer,
            &self.environment_buffer,
            &self.model_buffer,
        );
        log::debug!("Model buffer grown to {} entries", self.model_capacity);
    }

    fn create_color_target(
        device: &Device,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> (Texture, TextureView) {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Scene Color Target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    fn create_depth_target(device: &Device, width: u32, height: u32) -> TextureView {
        device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("Scene Depth Target"),
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

    fn create_model_buffer(device: &Device, capacity: usize) -> Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Model Transforms"),
            size: (capacity.max(1) * std::mem::size_of::<ModelUniform>()) as u64,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    fn create_bind_group_layout(device: &Device) -> BindGroupLayout {
        let uniform = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Scene Bind Group Layout"),
            entries: &[
                uniform(0),
                uniform(1),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        })
    }

    fn create_bind_group(
        device: &Device,
        layout: &BindGroupLayout,
        camera: &Buffer,
        environment: &Buffer,
        models: &Buffer,
    ) -> BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Scene Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: environment.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: models.as_entire_binding(),
                },
            ],
        })
    }

    fn create_pipeline(
        device: &Device,
        layout: &BindGroupLayout,
        format: wgpu::TextureFormat,
    ) -> RenderPipeline {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("scene.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[layout],
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Scene Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                // Book pages are single-sided sheets
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }
}

impl RenderSurface for GpuSceneSurface {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || (width, height) == (self.width, self.height) {
            return;
        }
        self.width = width;
        self.height = height;

        let device = self.gpu.device();
        let (color_texture, color_view) = Self::create_color_target(device, self.format, width, height);
        self.color_texture = color_texture;
        self.color_view = color_view;
        self.depth_view = Self::create_depth_target(device, width, height);
    }

    fn set_environment(&mut self, environment: &Environment) {
        self.background = environment.clear_color();
        self.gpu.queue().write_buffer(
            &self.environment_buffer,
            0,
            bytemuck::cast_slice(&[environment.to_uniform()]),
        );
    }

    fn upload_model(&mut self, model: &SceneModel) -> Result<()> {
        let device = self.gpu.device();

        self.meshes = model
            .meshes
            .iter()
            .map(|mesh| {
                mesh.primitives
                    .iter()
                    .filter(|p| !p.indices.is_empty())
                    .map(|p| GpuPrimitive {
                        vertex_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                            label: Some("Mesh Vertices"),
                            contents: bytemuck::cast_slice(&p.vertices),
                            usage: wgpu::BufferUsages::VERTEX,
                        }),
                        index_buffer: device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                            label: Some("Mesh Indices"),
                            contents: bytemuck::cast_slice(&p.indices),
                            usage: wgpu::BufferUsages::INDEX,
                        }),
                        index_count: p.indices.len() as u32,
                    })
                    .collect()
            })
            .collect();

        self.draws = model
            .mesh_instances()
            .into_iter()
            .map(|(node, mesh)| DrawItem { node, mesh })
            .collect();
        self.ensure_model_capacity(self.draws.len());

        log::info!(
            "Uploaded {} meshes, {} draws",
            self.meshes.len(),
            self.draws.len()
        );
        Ok(())
    }

    fn render(&mut self, view: &FrameView<'_>) -> Result<()> {
        if self.released {
            return Ok(());
        }

        let queue = self.gpu.queue();
        queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[view.camera.to_uniform(view.frame.time)]),
        );
        let models = model_uniforms(&self.draws, view.node_transforms);
        if !models.is_empty() {
            queue.write_buffer(&self.model_buffer, 0, bytemuck::cast_slice(&models));
        }

        let mut encoder = self
            .gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.background),
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
            });

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &self.bind_group, &[]);

            for (instance, draw) in self.draws.iter().enumerate() {
                let Some(primitives) = self.meshes.get(draw.mesh) else {
                    continue;
                };
                let instance = instance as u32;
                for primitive in primitives {
                    pass.set_vertex_buffer(0, primitive.vertex_buffer.slice(..));
                    pass.set_index_buffer(primitive.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(0..primitive.index_count, 0, instance..instance + 1);
                }
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.meshes.clear();
        self.draws.clear();
        self.color_texture.destroy();
        self.model_buffer.destroy();
        log::debug!("Scene surface released");
    }
}

/// Per-draw transforms in draw order; nodes without a transform stay in place
fn model_uniforms(draws: &[DrawItem], node_transforms: &[Mat4]) -> Vec<ModelUniform> {
    draws
        .iter()
        .map(|draw| {
            let matrix = node_transforms
                .get(draw.node)
                .copied()
                .unwrap_or(Mat4::IDENTITY);
            ModelUniform::from_matrix(matrix)
        })
        .collect()
}
