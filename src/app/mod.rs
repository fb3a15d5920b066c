mod runtime_loop;

use crate::artwork;
use crate::camera3d::{Camera3D, OrbitControls};
use crate::catalog::GalleryManifest;
use crate::config::{AppConfig, AppConfigOverrides};
use crate::input::{Input, InputEvent};
use crate::interaction::{ClickOutcome, InteractionLayer};
use crate::material_registry::MaterialRegistry;
use crate::mesh_registry::MeshRegistry;
use crate::overlay::{show_overlay, OverlayActions};
use crate::renderer::{is_fatal_surface_error, FrameView, Renderer};
use crate::room;
use crate::scene::GalleryScene;
use crate::selection::SelectionState;

use runtime_loop::{GalleryHost, RenderLoop};

use anyhow::{Context, Result};
use glam::Vec2;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};

// egui
use egui::Context as EguiCtx;
use egui_wgpu::{Renderer as EguiRenderer, RendererOptions, ScreenDescriptor};
use egui_winit::State as EguiWinit;

const CONFIG_PATH: &str = "config/app.json";

pub async fn run() -> Result<()> {
    run_with_overrides(AppConfigOverrides::default()).await
}

pub async fn run_with_overrides(overrides: AppConfigOverrides) -> Result<()> {
    let mut config = AppConfig::load_or_default(CONFIG_PATH);
    if !overrides.is_empty() {
        log::info!("[config] CLI overrides: {}", overrides.applied_fields().join(", "));
        config.apply_overrides(&overrides);
    }
    let event_loop = EventLoop::new().context("Failed to create winit event loop")?;
    let mut app = App::new(config);
    event_loop.run_app(&mut app).context("Event loop execution failed")?;
    Ok(())
}

pub struct App {
    renderer: Renderer,
    scene: GalleryScene,
    meshes: MeshRegistry,
    materials: MaterialRegistry,
    manifest: GalleryManifest,
    camera: Camera3D,
    controls: OrbitControls,
    input: Input,
    interaction: InteractionLayer,
    selection: SelectionState,
    render_loop: RenderLoop,
    populated: bool,
    should_close: bool,

    // egui
    egui_ctx: EguiCtx,
    egui_winit: Option<EguiWinit>,
    egui_renderer: Option<EguiRenderer>,
    egui_screen: Option<ScreenDescriptor>,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        let manifest = GalleryManifest::load_or_builtin(config.gallery.manifest.as_deref());
        Self {
            renderer: Renderer::new(&config.window),
            scene: GalleryScene::new(),
            meshes: MeshRegistry::new(),
            materials: MaterialRegistry::new(config.gallery.asset_root.clone()),
            manifest,
            camera: Camera3D::from_config(&config.camera),
            controls: OrbitControls::new(config.controls.clone()),
            input: Input::new(),
            interaction: InteractionLayer::new(),
            selection: SelectionState::default(),
            render_loop: RenderLoop::new(),
            populated: false,
            should_close: false,
            egui_ctx: EguiCtx::default(),
            egui_winit: None,
            egui_renderer: None,
            egui_screen: None,
        }
    }

    pub fn scene(&self) -> &GalleryScene {
        &self.scene
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn camera(&self) -> &Camera3D {
        &self.camera
    }

    /// Builds the room and hangs the manifest's artworks. Runs once per app.
    pub fn populate_scene(&mut self) {
        if self.populated {
            return;
        }
        room::build_room(&mut self.scene, &mut self.meshes, &mut self.materials);
        artwork::populate(&mut self.scene, &self.manifest, &mut self.meshes, &mut self.materials);
        self.populated = true;
    }

    fn mount(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        self.renderer.ensure_window(event_loop)?;
        self.renderer.init_gallery_pipeline()?;
        self.populate_scene();

        let keys: Vec<String> = self.meshes.keys().map(str::to_string).collect();
        for key in keys {
            self.meshes.ensure_gpu(&key, &self.renderer)?;
        }

        if self.egui_winit.is_none() {
            if let Some(window) = self.renderer.window() {
                let state = EguiWinit::new(
                    self.egui_ctx.clone(),
                    egui::ViewportId::ROOT,
                    window,
                    Some(self.renderer.pixels_per_point()),
                    window.theme(),
                    None,
                );
                self.egui_winit = Some(state);
            }
        }
        if self.egui_renderer.is_none() {
            let device = self.renderer.device()?;
            let format = self.renderer.surface_format()?;
            self.egui_renderer = Some(EguiRenderer::new(device, format, RendererOptions::default()));
        }
        let size = self.renderer.size();
        self.egui_screen = Some(ScreenDescriptor {
            size_in_pixels: [size.width, size.height],
            pixels_per_point: self.renderer.pixels_per_point(),
        });

        self.interaction.attach();
        if let Some(window) = self.renderer.window() {
            window.request_redraw();
        }
        Ok(())
    }

    fn process_click(&mut self) {
        let Some(screen) = self.input.take_click() else {
            return;
        };
        if self.egui_ctx.is_pointer_over_area() {
            return;
        }
        let outcome = self.interaction.handle_click(
            screen,
            self.renderer.size(),
            &self.camera,
            &mut self.scene,
            &self.meshes,
            &mut self.selection,
        );
        if outcome == ClickOutcome::Missed {
            log::debug!("[interaction] click at ({:.0}, {:.0}) hit nothing", screen.x, screen.y);
        }
    }

    fn draw_frame(&mut self) -> Result<()> {
        let size = self.renderer.size();
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }
        let view = FrameView {
            view_proj: self.camera.view_projection(size),
            camera_position: self.camera.position,
            lighting: self.scene.lighting(),
        };
        let draws = self.scene.draw_list(&self.materials, self.camera.position);
        let frame = self.renderer.render_frame(&view, &draws, &mut self.meshes, &mut self.materials)?;

        let raw_input = {
            let (Some(window), Some(state)) = (self.renderer.window(), self.egui_winit.as_mut()) else {
                frame.present();
                return Ok(());
            };
            state.take_egui_input(window)
        };
        let mut actions = OverlayActions::default();
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            actions = show_overlay(ctx, &mut self.selection, &self.scene);
        });
        actions.apply(&mut self.selection, &mut self.scene);

        let egui::FullOutput { platform_output, textures_delta, shapes, pixels_per_point, .. } = full_output;
        if let (Some(window), Some(state)) = (self.renderer.window(), self.egui_winit.as_mut()) {
            state.handle_platform_output(window, platform_output);
        }

        let (Some(painter), Some(screen)) = (self.egui_renderer.as_mut(), self.egui_screen.as_mut()) else {
            frame.present();
            return Ok(());
        };
        screen.pixels_per_point = pixels_per_point;
        {
            let (device, queue) = self.renderer.device_and_queue()?;
            for (id, delta) in &textures_delta.set {
                painter.update_texture(device, queue, *id, delta);
            }
        }
        let paint_jobs = self.egui_ctx.tessellate(shapes, pixels_per_point);
        self.renderer.render_egui(painter, &paint_jobs, screen, frame)?;
        for id in &textures_delta.free {
            painter.free_texture(id);
        }
        Ok(())
    }

    fn shutdown(&mut self) {
        let mut render_loop = self.render_loop;
        render_loop.teardown(self);
        self.render_loop = render_loop;
    }
}

impl GalleryHost for App {
    fn update_controls(&mut self) {
        let height = self.renderer.size().height as f32;
        let rotate = self.input.take_rotate_drag();
        if rotate != Vec2::ZERO {
            self.controls.rotate(rotate, height);
        }
        let pan = self.input.take_pan_drag();
        if pan != Vec2::ZERO {
            self.controls.pan(pan, height, &self.camera);
        }
        if let Some(steps) = self.input.consume_wheel_delta() {
            self.controls.dolly(steps);
        }
        self.controls.update(&mut self.camera);
    }

    fn render_frame(&mut self) {
        if let Err(err) = self.draw_frame() {
            if is_fatal_surface_error(&err) {
                log::error!("[renderer] {err}; closing");
                self.should_close = true;
            } else {
                log::error!("[renderer] frame failed: {err:?}");
            }
        }
    }

    fn dispose_controls(&mut self) {
        self.controls.dispose();
    }

    fn dispose_renderer(&mut self) {
        self.egui_renderer = None;
        self.egui_winit = None;
        self.egui_screen = None;
        self.meshes.release_gpu();
        self.materials.release_gpu();
        self.renderer.dispose();
    }

    fn remove_click_listener(&mut self) {
        self.interaction.detach();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if !self.render_loop.is_running() {
            return;
        }
        if let Err(err) = self.mount(event_loop) {
            log::error!("[app] initialization failed: {err:?}");
            self.should_close = true;
        }
    }

    fn window_event(&mut self, _el: &ActiveEventLoop, id: winit::window::WindowId, event: WindowEvent) {
        // egui wants the events too
        let mut consumed = false;
        let input_event = InputEvent::from_window_event(&event);
        let is_cursor_event = matches!(&input_event, InputEvent::CursorPos { .. } | InputEvent::CursorLeft);
        if let (Some(window), Some(state)) = (self.renderer.window(), self.egui_winit.as_mut()) {
            if id == window.id() {
                let resp = state.on_window_event(window, &event);
                if resp.consumed {
                    consumed = true;
                }
            }
        }
        let is_release = matches!(&input_event, InputEvent::MouseButton { pressed: false, .. });
        if consumed && is_release {
            // release the drag without turning it into a click
            self.input.cancel_press();
            self.input.push(input_event);
        } else if !consumed || is_cursor_event {
            self.input.push(input_event);
        }

        match &event {
            WindowEvent::CloseRequested => self.should_close = true,
            WindowEvent::Resized(size) => {
                self.renderer.resize(*size);
                if let Some(screen) = &mut self.egui_screen {
                    screen.size_in_pixels = [size.width, size.height];
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(screen) = &mut self.egui_screen {
                    screen.pixels_per_point = *scale_factor as f32;
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.input.take_escape() {
            self.should_close = true;
        }
        if self.should_close {
            self.shutdown();
            event_loop.exit();
            return;
        }
        if self.renderer.window().is_none() {
            return;
        }

        self.process_click();
        let mut render_loop = self.render_loop;
        render_loop.frame(self);
        self.render_loop = render_loop;

        for event in self.scene.drain_events() {
            log::debug!("[event] {event}");
        }
        if let Some(window) = self.renderer.window() {
            window.request_redraw();
        }
        self.input.clear_frame();
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.shutdown();
    }
}
