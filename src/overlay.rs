use egui::{Align2, Color32, RichText};

use crate::scene::GalleryScene;
use crate::selection::SelectionState;

pub const OVERLAY_WIDTH: f32 = 300.0;
const OVERLAY_FILL: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 128);

/// Buttons pressed on the overlay during one frame.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OverlayActions {
    pub visible: bool,
    pub save: bool,
    pub close: bool,
}

impl OverlayActions {
    /// Save runs before close so both in one frame keep the edit.
    pub fn apply(self, selection: &mut SelectionState, scene: &mut GalleryScene) {
        if self.save {
            selection.save(scene);
        }
        if self.close {
            selection.close(scene);
        }
    }
}

/// Caption panel for the selected artwork. The heading and description show the stored
/// caption; the text fields edit the draft.
pub fn show_overlay(ctx: &egui::Context, selection: &mut SelectionState, scene: &GalleryScene) -> OverlayActions {
    let mut actions = OverlayActions::default();
    let SelectionState::Selected { artwork, draft } = selection else {
        return actions;
    };
    let Some(caption) = scene.caption(*artwork) else {
        return actions;
    };
    let created_by = scene.artwork(*artwork).map(|art| art.created_by.as_str()).unwrap_or("");

    actions.visible = true;
    egui::Window::new("Artwork")
        .id(egui::Id::new("artwork_overlay"))
        .title_bar(false)
        .resizable(false)
        .collapsible(false)
        .anchor(Align2::CENTER_CENTER, [0.0, 0.0])
        .default_width(OVERLAY_WIDTH)
        .frame(egui::Frame::window(&ctx.style()).fill(OVERLAY_FILL))
        .show(ctx, |ui| {
            ui.set_width(OVERLAY_WIDTH);
            ui.heading(RichText::new(&caption.name).color(Color32::WHITE));
            if !created_by.is_empty() {
                ui.label(RichText::new(format!("by {created_by}")).italics().color(Color32::LIGHT_GRAY));
            }
            ui.label(RichText::new(&caption.description).color(Color32::WHITE));
            ui.separator();
            ui.label("Name");
            ui.text_edit_singleline(&mut draft.name);
            ui.label("Description");
            ui.text_edit_multiline(&mut draft.description);
            ui.horizontal(|ui| {
                if ui.button("Save").clicked() {
                    actions.save = true;
                }
                if ui.button("Close").clicked() {
                    actions.close = true;
                }
            });
        });
    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Wall;
    use crate::scene::{Artwork, Caption, Transform3D};
    use bevy_ecs::prelude::Entity;

    fn scene_with_artwork() -> (GalleryScene, Entity) {
        let mut scene = GalleryScene::new();
        let artwork = Artwork { slot: 0, image: "a.jpg".into(), wall: Wall::Back, created_by: "Hokusai".into() };
        let entity = scene.spawn_artwork(
            artwork,
            "artwork",
            "artwork::a.jpg",
            Transform3D::default(),
            Caption::new("The Great Wave", "Woodblock print"),
        );
        (scene, entity)
    }

    fn run_frame(ctx: &egui::Context, selection: &mut SelectionState, scene: &GalleryScene) -> OverlayActions {
        let mut actions = OverlayActions::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            actions = show_overlay(ctx, selection, scene);
        });
        actions
    }

    #[test]
    fn hidden_while_idle() {
        let (scene, _) = scene_with_artwork();
        let ctx = egui::Context::default();
        let mut selection = SelectionState::Idle;
        assert_eq!(run_frame(&ctx, &mut selection, &scene), OverlayActions::default());
    }

    #[test]
    fn shown_while_selected_without_touching_the_draft() {
        let (mut scene, entity) = scene_with_artwork();
        let ctx = egui::Context::default();
        let mut selection = SelectionState::default();
        selection.select(entity, &mut scene);
        selection.edit_name("draft only");
        let actions = run_frame(&ctx, &mut selection, &scene);
        assert!(actions.visible);
        assert!(!actions.save && !actions.close);
        assert_eq!(selection.draft().map(|d| d.name.as_str()), Some("draft only"));
        assert_eq!(scene.caption(entity).map(|c| c.name.as_str()), Some("The Great Wave"));
    }

    #[test]
    fn save_then_close_keeps_the_edit() {
        let (mut scene, entity) = scene_with_artwork();
        let mut selection = SelectionState::default();
        selection.select(entity, &mut scene);
        selection.edit_description("Edo period");
        OverlayActions { visible: true, save: true, close: true }.apply(&mut selection, &mut scene);
        assert!(selection.is_idle());
        assert_eq!(scene.caption(entity).map(|c| c.description.as_str()), Some("Edo period"));
    }

    #[test]
    fn panel_is_half_transparent_black() {
        assert_eq!(OVERLAY_FILL.to_array(), [0, 0, 0, 128]);
    }
}
