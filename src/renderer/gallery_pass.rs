use anyhow::{Context, Result};
use glam::{Mat4, Vec3};
use std::sync::Arc;

use super::DEPTH_FORMAT;
use crate::material_registry::{MaterialDefinition, Shading};
use crate::mesh::MeshVertex;
use crate::scene::SceneLighting;

const INITIAL_DRAW_CAPACITY: u64 = 32;

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub(super) struct GalleryFrameData {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    pub light_dir: [f32; 4],
    pub light_color: [f32; 4],
    pub ambient_color: [f32; 4],
}

impl GalleryFrameData {
    pub fn new(view_proj: Mat4, camera_pos: Vec3, lighting: &SceneLighting) -> Self {
        let light = lighting.directional_color * lighting.directional_intensity;
        let ambient = lighting.ambient_color * lighting.ambient_intensity;
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            camera_pos: camera_pos.extend(1.0).to_array(),
            light_dir: lighting.directional_direction.normalize_or_zero().extend(0.0).to_array(),
            light_color: light.extend(1.0).to_array(),
            ambient_color: ambient.extend(1.0).to_array(),
        }
    }
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub(super) struct GalleryDrawData {
    pub model: [[f32; 4]; 4],
    pub base_color: [f32; 4],
    pub material: [f32; 4],
    pub uv: [f32; 4],
}

impl GalleryDrawData {
    pub fn new(model: Mat4, definition: &MaterialDefinition) -> Self {
        let (roughness, metalness, lit) = match definition.shading {
            Shading::Standard { roughness, metalness } => (roughness, metalness, 1.0),
            Shading::Unlit => (1.0, 0.0, 0.0),
        };
        Self {
            model: model.to_cols_array_2d(),
            base_color: definition.base_color,
            material: [roughness, metalness, lit, 0.0],
            uv: [definition.uv_repeat[0], definition.uv_repeat[1], 0.0, 0.0],
        }
    }
}

pub(super) struct GalleryPass {
    opaque_pipeline: wgpu::RenderPipeline,
    transparent_pipeline: wgpu::RenderPipeline,
    frame_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    draw_bgl: wgpu::BindGroupLayout,
    draw_buffer: wgpu::Buffer,
    draw_bind_group: wgpu::BindGroup,
    draw_capacity: u64,
    draw_stride: u64,
    material_bgl: Arc<wgpu::BindGroupLayout>,
    staging: Vec<u8>,
}

impl GalleryPass {
    pub fn new(device: &wgpu::Device, color_format: wgpu::TextureFormat) -> Result<Self> {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Gallery Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../../assets/shaders/gallery.wgsl").into()),
        });

        let frame_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Gallery Frame BGL"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let draw_size = std::mem::size_of::<GalleryDrawData>() as u64;
        let draw_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Gallery Draw BGL"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(draw_size),
                },
                count: None,
            }],
        });
        let material_bgl = Arc::new(device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Gallery Material BGL"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
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
        }));

        let frame_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Gallery Frame Buffer"),
            size: std::mem::size_of::<GalleryFrameData>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Gallery Frame BG"),
            layout: &frame_bgl,
            entries: &[wgpu::BindGroupEntry { binding: 0, resource: frame_buffer.as_entire_binding() }],
        });

        let alignment = device.limits().min_uniform_buffer_offset_alignment.max(1) as u64;
        let draw_stride = draw_size.div_ceil(alignment) * alignment;
        let (draw_buffer, draw_bind_group) =
            create_draw_buffer(device, &draw_bgl, INITIAL_DRAW_CAPACITY, draw_stride, draw_size);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Gallery Pipeline Layout"),
            bind_group_layouts: &[&frame_bgl, &draw_bgl, material_bgl.as_ref()],
            push_constant_ranges: &[],
        });
        let opaque_pipeline =
            create_pipeline(device, &pipeline_layout, &shader, color_format, None, "Gallery Opaque Pipeline");
        let transparent_pipeline = create_pipeline(
            device,
            &pipeline_layout,
            &shader,
            color_format,
            Some(wgpu::BlendState::ALPHA_BLENDING),
            "Gallery Transparent Pipeline",
        );

        Ok(Self {
            opaque_pipeline,
            transparent_pipeline,
            frame_buffer,
            frame_bind_group,
            draw_bgl,
            draw_buffer,
            draw_bind_group,
            draw_capacity: INITIAL_DRAW_CAPACITY,
            draw_stride,
            material_bgl,
            staging: Vec::new(),
        })
    }

    pub fn material_layout(&self) -> &wgpu::BindGroupLayout {
        self.material_bgl.as_ref()
    }

    pub fn pipeline(&self, transparent: bool) -> &wgpu::RenderPipeline {
        if transparent {
            &self.transparent_pipeline
        } else {
            &self.opaque_pipeline
        }
    }

    pub fn frame_bind_group(&self) -> &wgpu::BindGroup {
        &self.frame_bind_group
    }

    pub fn draw_bind_group(&self) -> &wgpu::BindGroup {
        &self.draw_bind_group
    }

    pub fn draw_offset(&self, index: usize) -> Result<u32> {
        u32::try_from(index as u64 * self.draw_stride).context("Draw uniform offset exceeds u32")
    }

    /// Uploads frame constants and one aligned uniform block per draw.
    pub fn write_uniforms(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        frame: &GalleryFrameData,
        draws: &[GalleryDrawData],
    ) {
        queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(frame));
        if draws.is_empty() {
            return;
        }
        let needed = draws.len() as u64;
        if needed > self.draw_capacity {
            let mut capacity = self.draw_capacity.max(1);
            while capacity < needed {
                capacity *= 2;
            }
            let draw_size = std::mem::size_of::<GalleryDrawData>() as u64;
            let (buffer, bind_group) =
                create_draw_buffer(device, &self.draw_bgl, capacity, self.draw_stride, draw_size);
            self.draw_buffer = buffer;
            self.draw_bind_group = bind_group;
            self.draw_capacity = capacity;
        }
        let stride = self.draw_stride as usize;
        self.staging.clear();
        self.staging.resize(stride * draws.len(), 0);
        for (index, draw) in draws.iter().enumerate() {
            let start = index * stride;
            let bytes = bytemuck::bytes_of(draw);
            self.staging[start..start + bytes.len()].copy_from_slice(bytes);
        }
        queue.write_buffer(&self.draw_buffer, 0, &self.staging);
    }
}

fn create_draw_buffer(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    capacity: u64,
    stride: u64,
    draw_size: u64,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Gallery Draw Buffer"),
        size: capacity * stride,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Gallery Draw BG"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: wgpu::BufferSize::new(draw_size),
            }),
        }],
    });
    (buffer, bind_group)
}

fn create_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    color_format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[MeshVertex::layout()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: Some(blend.unwrap_or(wgpu::BlendState::REPLACE)),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}
