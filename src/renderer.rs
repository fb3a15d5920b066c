mod egui_pass;
mod gallery_pass;
mod window_surface;

use anyhow::{anyhow, Context, Result};
use glam::{Mat4, Vec3};
use std::sync::Arc;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::Window;

use egui_wgpu::{Renderer as EguiRenderer, ScreenDescriptor};

use crate::config::WindowConfig;
use crate::material_registry::{MaterialGpu, MaterialRegistry};
use crate::mesh::Mesh;
use crate::mesh_registry::MeshRegistry;
use crate::scene::{DrawItem, SceneLighting};

use gallery_pass::{GalleryDrawData, GalleryFrameData, GalleryPass};
pub use window_surface::{is_fatal_surface_error, FatalSurfaceError, SurfaceFrame, WindowSurface};

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const CLEAR_COLOR: wgpu::Color = wgpu::Color { r: 0.02, g: 0.02, b: 0.03, a: 1.0 };

pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

/// Camera and lights shared by every draw in a frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameView {
    pub view_proj: Mat4,
    pub camera_position: Vec3,
    pub lighting: SceneLighting,
}

pub struct Renderer {
    surface: WindowSurface,
    gallery: Option<GalleryPass>,
    disposed: bool,
}

impl Renderer {
    pub fn new(window_cfg: &WindowConfig) -> Self {
        Self { surface: WindowSurface::new(window_cfg), gallery: None, disposed: false }
    }

    pub fn ensure_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        self.surface.ensure_window(event_loop)?;
        self.disposed = false;
        Ok(())
    }

    pub fn init_gallery_pipeline(&mut self) -> Result<()> {
        if self.gallery.is_some() {
            return Ok(());
        }
        let format = self.surface.surface_format()?;
        let pass = GalleryPass::new(self.surface.device()?, format)?;
        self.gallery = Some(pass);
        Ok(())
    }

    pub fn device_and_queue(&self) -> Result<(&wgpu::Device, &wgpu::Queue)> {
        self.surface.device_and_queue()
    }

    pub fn device(&self) -> Result<&wgpu::Device> {
        self.surface.device()
    }

    pub fn queue(&self) -> Result<&wgpu::Queue> {
        self.surface.queue()
    }

    pub fn surface_format(&self) -> Result<wgpu::TextureFormat> {
        self.surface.surface_format()
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.surface.size()
    }

    pub fn pixels_per_point(&self) -> f32 {
        self.window().map(|window| window.scale_factor() as f32).unwrap_or(1.0)
    }

    pub fn window(&self) -> Option<&Window> {
        self.surface.window()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.surface.resize(new_size);
    }

    pub fn material_layout(&self) -> Result<&wgpu::BindGroupLayout> {
        self.gallery.as_ref().map(GalleryPass::material_layout).context("Gallery pipeline not initialized")
    }

    pub fn create_gpu_mesh(&self, mesh: &Mesh) -> Result<GpuMesh> {
        let device = self.surface.device()?;
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Ok(GpuMesh { vertex_buffer, index_buffer, index_count: mesh.index_count() })
    }

    /// Renders the draw list into the next surface frame. The frame is returned unpresented
    /// so the overlay can be drawn on top.
    pub fn render_frame(
        &mut self,
        view: &FrameView,
        draws: &[DrawItem],
        meshes: &mut MeshRegistry,
        materials: &mut MaterialRegistry,
    ) -> Result<SurfaceFrame> {
        if self.disposed {
            return Err(anyhow!("Renderer has been disposed"));
        }

        let mut prepared: Vec<(&DrawItem, Arc<MaterialGpu>)> = Vec::with_capacity(draws.len());
        let mut uniforms = Vec::with_capacity(draws.len());
        {
            let (device, queue) = self.surface.device_and_queue()?;
            let layout = self.material_layout()?;
            for item in draws {
                if let Err(err) = meshes.ensure_gpu(&item.mesh_key, self) {
                    log::warn!("[renderer] skipping draw: {err:?}");
                    continue;
                }
                let Some(definition) = materials.definition(&item.material_key).cloned() else {
                    log::warn!("[renderer] skipping draw: material '{}' missing", item.material_key);
                    continue;
                };
                match materials.prepare_material_gpu(&item.material_key, device, queue, layout) {
                    Ok(gpu) => {
                        uniforms.push(GalleryDrawData::new(item.model, &definition));
                        prepared.push((item, gpu));
                    }
                    Err(err) => log::warn!("[renderer] skipping draw: {err:?}"),
                }
            }
        }

        let frame = self.surface.acquire_surface_frame()?;
        let (device, queue) = self.surface.device_and_queue()?;
        let depth_view = self.surface.depth_view()?;
        let gallery = self.gallery.as_mut().context("Gallery pipeline not initialized")?;
        gallery.write_uniforms(
            device,
            queue,
            &GalleryFrameData::new(view.view_proj, view.camera_position, &view.lighting),
            &uniforms,
        );

        let mut encoder =
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some("Gallery Encoder") });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Gallery Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: frame.view(),
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations { load: wgpu::LoadOp::Clear(CLEAR_COLOR), store: wgpu::StoreOp::Store },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            pass.set_bind_group(0, gallery.frame_bind_group(), &[]);
            for (index, (item, material)) in prepared.iter().enumerate() {
                let Some(mesh) = meshes.gpu_mesh(&item.mesh_key) else {
                    continue;
                };
                pass.set_pipeline(gallery.pipeline(item.transparent));
                pass.set_bind_group(1, gallery.draw_bind_group(), &[gallery.draw_offset(index)?]);
                pass.set_bind_group(2, material.bind_group(), &[]);
                pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }
        queue.submit(std::iter::once(encoder.finish()));
        Ok(frame)
    }

    pub fn render_egui(
        &self,
        painter: &mut EguiRenderer,
        paint_jobs: &[egui::ClippedPrimitive],
        screen: &ScreenDescriptor,
        frame: SurfaceFrame,
    ) -> Result<()> {
        let (device, queue) = self.surface.device_and_queue()?;
        egui_pass::render(device, queue, painter, paint_jobs, screen, frame)
    }

    /// Releases pipelines, the device and the window surface. No frame renders afterwards.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.gallery = None;
        self.surface.release();
        self.disposed = true;
        log::debug!("[renderer] disposed");
    }
}
