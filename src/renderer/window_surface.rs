use crate::config::WindowConfig;
use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use winit::dpi::PhysicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Fullscreen, Window};

use super::DEPTH_FORMAT;

/// Swapchain image acquired for one frame. Dropping it without `present` discards the frame.
#[derive(Debug)]
pub struct SurfaceFrame {
    view: wgpu::TextureView,
    texture: wgpu::SurfaceTexture,
}

impl SurfaceFrame {
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn present(self) {
        self.texture.present();
    }
}

/// Surface failure the window cannot recover from; the app should shut down.
#[derive(Debug)]
pub struct FatalSurfaceError(wgpu::SurfaceError);

impl std::fmt::Display for FatalSurfaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Surface {}", self.0)
    }
}

impl std::error::Error for FatalSurfaceError {}

/// True when `err` came from a surface failure that frames cannot recover from.
pub fn is_fatal_surface_error(err: &anyhow::Error) -> bool {
    err.downcast_ref::<FatalSurfaceError>().is_some()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SurfaceRecovery {
    Reconfigure,
    SkipFrame,
    Fatal,
}

impl SurfaceRecovery {
    fn for_error(error: &wgpu::SurfaceError) -> Self {
        match error {
            wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => Self::Reconfigure,
            wgpu::SurfaceError::Timeout | wgpu::SurfaceError::Other => Self::SkipFrame,
            wgpu::SurfaceError::OutOfMemory => Self::Fatal,
        }
    }
}

struct DepthTarget {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl DepthTarget {
    fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Gallery Depth"),
            size: wgpu::Extent3d { width: width.max(1), height: height.max(1), depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self { _texture: texture, view }
    }
}

/// Everything that only exists once the window has a GPU surface.
struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth: DepthTarget,
}

impl GpuState {
    async fn new(window: Arc<Window>, vsync: bool) -> Result<Self> {
        let size = window.inner_size();
        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window).context("Failed to create WGPU surface")?;
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("Failed to request WGPU adapter")?;
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Gallery Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_webgl2_defaults().using_resolution(adapter.limits()),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::default(),
            })
            .await
            .context("Failed to request WGPU device")?;

        let caps = surface.get_capabilities(&adapter);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: choose_surface_format(&caps.formats)?,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: present_mode_for(vsync, &caps.present_modes),
            alpha_mode: caps.alpha_modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        let depth = DepthTarget::new(&device, config.width, config.height);

        let info = adapter.get_info();
        log::info!(
            "[renderer] {} via {:?}, {:?} {}x{} {:?}",
            info.name,
            info.backend,
            config.format,
            config.width,
            config.height,
            config.present_mode
        );
        Ok(Self { surface, device, queue, config, depth })
    }

    fn reconfigure(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width;
        self.config.height = size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth = DepthTarget::new(&self.device, size.width, size.height);
    }
}

/// The gallery window and its presentation surface. Created lazily on `resumed`.
pub struct WindowSurface {
    settings: WindowConfig,
    size: PhysicalSize<u32>,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
}

impl WindowSurface {
    pub fn new(window_cfg: &WindowConfig) -> Self {
        Self {
            settings: window_cfg.clone(),
            size: PhysicalSize::new(window_cfg.width, window_cfg.height),
            window: None,
            gpu: None,
        }
    }

    pub fn ensure_window(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        if self.window.is_some() {
            return Ok(());
        }
        let mut attrs =
            Window::default_attributes().with_title(self.settings.title.clone()).with_inner_size(self.size);
        if self.settings.fullscreen {
            attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }
        let window = Arc::new(event_loop.create_window(attrs).context("Failed to create window")?);
        let gpu = pollster::block_on(GpuState::new(window.clone(), self.settings.vsync))?;
        self.size = PhysicalSize::new(gpu.config.width, gpu.config.height);
        self.gpu = Some(gpu);
        self.window = Some(window);
        Ok(())
    }

    fn gpu(&self) -> Result<&GpuState> {
        self.gpu.as_ref().context("GPU surface not initialized")
    }

    pub fn device_and_queue(&self) -> Result<(&wgpu::Device, &wgpu::Queue)> {
        let gpu = self.gpu()?;
        Ok((&gpu.device, &gpu.queue))
    }

    pub fn device(&self) -> Result<&wgpu::Device> {
        Ok(&self.gpu()?.device)
    }

    pub fn queue(&self) -> Result<&wgpu::Queue> {
        Ok(&self.gpu()?.queue)
    }

    pub fn depth_view(&self) -> Result<&wgpu::TextureView> {
        Ok(&self.gpu()?.depth.view)
    }

    pub fn surface_format(&self) -> Result<wgpu::TextureFormat> {
        Ok(self.gpu()?.config.format)
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn window(&self) -> Option<&Window> {
        self.window.as_deref()
    }

    /// Records the new size and reconfigures the surface. A zero-area size (minimised window)
    /// keeps the old swapchain until the window is restored.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        self.size = new_size;
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        if let Some(gpu) = self.gpu.as_mut() {
            gpu.reconfigure(new_size);
        }
    }

    pub fn acquire_surface_frame(&mut self) -> Result<SurfaceFrame> {
        let gpu = self.gpu()?;
        let error = match gpu.surface.get_current_texture() {
            Ok(texture) => {
                let view = texture.texture.create_view(&wgpu::TextureViewDescriptor::default());
                return Ok(SurfaceFrame { view, texture });
            }
            Err(error) => error,
        };
        match SurfaceRecovery::for_error(&error) {
            SurfaceRecovery::Reconfigure => {
                self.resize(self.size);
                Err(anyhow!("Surface {error}; reconfigured, frame skipped"))
            }
            SurfaceRecovery::SkipFrame => Err(anyhow!("Surface {error}; frame skipped")),
            SurfaceRecovery::Fatal => Err(anyhow::Error::new(FatalSurfaceError(error))),
        }
    }

    /// Drops the GPU surface, device and window. A later `ensure_window` starts over.
    pub fn release(&mut self) {
        self.gpu = None;
        self.window = None;
    }
}

fn present_mode_for(vsync: bool, supported: &[wgpu::PresentMode]) -> wgpu::PresentMode {
    if vsync {
        return wgpu::PresentMode::Fifo;
    }
    [wgpu::PresentMode::Mailbox, wgpu::PresentMode::Immediate]
        .into_iter()
        .find(|mode| supported.contains(mode))
        .unwrap_or(wgpu::PresentMode::Fifo)
}

fn choose_surface_format(formats: &[wgpu::TextureFormat]) -> Result<wgpu::TextureFormat> {
    formats
        .iter()
        .copied()
        .find(|format| format.is_srgb())
        .or_else(|| formats.first().copied())
        .context("Surface reports no supported formats")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vsync_always_uses_fifo() {
        let modes = [wgpu::PresentMode::Immediate, wgpu::PresentMode::Fifo];
        assert_eq!(present_mode_for(true, &modes), wgpu::PresentMode::Fifo);
        assert_eq!(present_mode_for(false, &modes), wgpu::PresentMode::Immediate);
        assert_eq!(
            present_mode_for(false, &[wgpu::PresentMode::Immediate, wgpu::PresentMode::Mailbox]),
            wgpu::PresentMode::Mailbox
        );
        assert_eq!(present_mode_for(false, &[]), wgpu::PresentMode::Fifo);
    }

    #[test]
    fn surface_format_prefers_srgb() {
        let formats = [wgpu::TextureFormat::Bgra8Unorm, wgpu::TextureFormat::Bgra8UnormSrgb];
        assert_eq!(choose_surface_format(&formats).expect("format"), wgpu::TextureFormat::Bgra8UnormSrgb);
        assert_eq!(
            choose_surface_format(&[wgpu::TextureFormat::Rgba8Unorm]).expect("format"),
            wgpu::TextureFormat::Rgba8Unorm
        );
        assert!(choose_surface_format(&[]).is_err());
    }

    #[test]
    fn lost_surfaces_are_reconfigured() {
        assert_eq!(SurfaceRecovery::for_error(&wgpu::SurfaceError::Lost), SurfaceRecovery::Reconfigure);
        assert_eq!(SurfaceRecovery::for_error(&wgpu::SurfaceError::Outdated), SurfaceRecovery::Reconfigure);
        assert_eq!(SurfaceRecovery::for_error(&wgpu::SurfaceError::Timeout), SurfaceRecovery::SkipFrame);
        assert_eq!(SurfaceRecovery::for_error(&wgpu::SurfaceError::OutOfMemory), SurfaceRecovery::Fatal);
    }

    #[test]
    fn only_out_of_memory_is_fatal() {
        let fatal = anyhow::Error::new(FatalSurfaceError(wgpu::SurfaceError::OutOfMemory));
        assert!(is_fatal_surface_error(&fatal));
        assert!(is_fatal_surface_error(&fatal.context("frame failed")));
        assert!(!is_fatal_surface_error(&anyhow!("Surface timed out; frame skipped")));
    }

    #[test]
    fn resize_without_gpu_only_tracks_size() {
        let mut surface = WindowSurface::new(&WindowConfig::default());
        assert_eq!(surface.size(), PhysicalSize::new(1280, 720));
        surface.resize(PhysicalSize::new(800, 600));
        assert_eq!(surface.size(), PhysicalSize::new(800, 600));
        assert!(surface.depth_view().is_err());
        assert!(surface.acquire_surface_frame().is_err());
    }
}
