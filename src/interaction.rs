use bevy_ecs::prelude::Entity;
use glam::Vec2;
use winit::dpi::PhysicalSize;

use crate::camera3d::{aspect_of, Camera3D};
use crate::events::GalleryEvent;
use crate::mesh_registry::MeshRegistry;
use crate::scene::GalleryScene;
use crate::selection::SelectionState;

/// Maximum pointer travel, in pixels, between press and release for the gesture to count as a click.
pub const CLICK_DRAG_TOLERANCE: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The layer was not listening.
    Ignored,
    /// The ray hit no artwork; selection is unchanged.
    Missed,
    Selected(Entity),
}

/// Click listener for the gallery viewport.
#[derive(Debug, Default)]
pub struct InteractionLayer {
    listening: bool,
    attach_count: u32,
    detach_count: u32,
}

impl InteractionLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&mut self) {
        if !self.listening {
            self.listening = true;
            self.attach_count += 1;
            log::debug!("[interaction] click listener attached");
        }
    }

    /// Removes the listener. Repeated calls are no-ops.
    pub fn detach(&mut self) {
        if self.listening {
            self.listening = false;
            self.detach_count += 1;
            log::debug!("[interaction] click listener removed");
        }
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn attach_count(&self) -> u32 {
        self.attach_count
    }

    pub fn detach_count(&self) -> u32 {
        self.detach_count
    }

    /// Casts a ray through the clicked pixel and selects the nearest artwork it hits.
    pub fn handle_click(
        &self,
        screen: Vec2,
        viewport: PhysicalSize<u32>,
        camera: &Camera3D,
        scene: &mut GalleryScene,
        meshes: &MeshRegistry,
        selection: &mut SelectionState,
    ) -> ClickOutcome {
        if !self.listening {
            return ClickOutcome::Ignored;
        }
        let Some(ndc) = screen_to_ndc(screen, viewport) else {
            return ClickOutcome::Ignored;
        };
        let hit = camera
            .ndc_ray(ndc, aspect_of(viewport))
            .and_then(|(origin, dir)| scene.pick_artwork(origin, dir, meshes));
        match hit {
            Some(entity) if selection.select(entity, scene) => ClickOutcome::Selected(entity),
            _ => {
                scene.push_event(GalleryEvent::ClickMissed { ndc_x: ndc.x, ndc_y: ndc.y });
                ClickOutcome::Missed
            }
        }
    }
}

/// Pixel coordinates (origin top-left) to normalized device coordinates in [-1, 1], +Y up.
pub fn screen_to_ndc(screen: Vec2, viewport: PhysicalSize<u32>) -> Option<Vec2> {
    if viewport.width == 0 || viewport.height == 0 {
        return None;
    }
    Some(Vec2::new(
        screen.x / viewport.width as f32 * 2.0 - 1.0,
        -(screen.y / viewport.height as f32) * 2.0 + 1.0,
    ))
}
