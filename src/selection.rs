use bevy_ecs::prelude::Entity;

use crate::events::GalleryEvent;
use crate::scene::{Caption, GalleryScene};

/// Editable copy of a caption. Changes stay here until saved.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CaptionDraft {
    pub name: String,
    pub description: String,
}

impl From<&Caption> for CaptionDraft {
    fn from(caption: &Caption) -> Self {
        Self { name: caption.name.clone(), description: caption.description.clone() }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SelectionState {
    #[default]
    Idle,
    Selected {
        artwork: Entity,
        draft: CaptionDraft,
    },
}

impl SelectionState {
    /// Selects `artwork`, replacing any previous selection and discarding its draft.
    /// Returns false when the entity has no caption.
    pub fn select(&mut self, artwork: Entity, scene: &mut GalleryScene) -> bool {
        let Some(caption) = scene.caption(artwork) else {
            log::warn!("[selection] entity {} has no caption; ignoring", artwork.index());
            return false;
        };
        let draft = CaptionDraft::from(caption);
        log::info!("[selection] selected '{}'", draft.name);
        *self = SelectionState::Selected { artwork, draft };
        scene.push_event(GalleryEvent::ArtworkSelected { entity: artwork });
        true
    }

    pub fn selected(&self) -> Option<Entity> {
        match self {
            SelectionState::Selected { artwork, .. } => Some(*artwork),
            SelectionState::Idle => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, SelectionState::Idle)
    }

    pub fn draft(&self) -> Option<&CaptionDraft> {
        match self {
            SelectionState::Selected { draft, .. } => Some(draft),
            SelectionState::Idle => None,
        }
    }

    pub fn draft_mut(&mut self) -> Option<&mut CaptionDraft> {
        match self {
            SelectionState::Selected { draft, .. } => Some(draft),
            SelectionState::Idle => None,
        }
    }

    pub fn edit_name(&mut self, name: impl Into<String>) {
        if let Some(draft) = self.draft_mut() {
            draft.name = name.into();
        }
    }

    pub fn edit_description(&mut self, description: impl Into<String>) {
        if let Some(draft) = self.draft_mut() {
            draft.description = description.into();
        }
    }

    /// Writes the draft's name and description into the selected artwork's caption.
    /// The selection stays open. Does nothing while idle.
    pub fn save(&mut self, scene: &mut GalleryScene) -> bool {
        let SelectionState::Selected { artwork, draft } = self else {
            return false;
        };
        if !scene.update_caption(*artwork, &draft.name, &draft.description) {
            log::warn!("[selection] artwork {} vanished before save", artwork.index());
            return false;
        }
        log::info!("[selection] saved caption '{}'", draft.name);
        scene.push_event(GalleryEvent::CaptionSaved { entity: *artwork, name: draft.name.clone() });
        true
    }

    /// Returns to idle. Unsaved draft edits are dropped.
    pub fn close(&mut self, scene: &mut GalleryScene) {
        if let SelectionState::Selected { artwork, .. } = std::mem::take(self) {
            log::info!("[selection] closed");
            scene.push_event(GalleryEvent::SelectionClosed { entity: artwork });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Wall;
    use crate::scene::{Artwork, Transform3D};

    fn scene_with_artwork() -> (GalleryScene, Entity) {
        let mut scene = GalleryScene::new();
        let artwork = Artwork { slot: 0, image: "a.jpg".into(), wall: Wall::Front, created_by: "Leonardo".into() };
        let entity = scene.spawn_artwork(
            artwork,
            "artwork",
            "artwork::a.jpg",
            Transform3D::default(),
            Caption::new("Mona Lisa", "Portrait"),
        );
        (scene, entity)
    }

    #[test]
    fn edits_touch_only_the_draft_until_saved() {
        let (mut scene, entity) = scene_with_artwork();
        let mut selection = SelectionState::default();
        assert!(selection.select(entity, &mut scene));
        selection.edit_name("La Gioconda");
        assert_eq!(scene.caption(entity).map(|c| c.name.as_str()), Some("Mona Lisa"));
        assert!(selection.save(&mut scene));
        assert_eq!(scene.caption(entity), Some(&Caption::new("La Gioconda", "Portrait")));
        assert_eq!(selection.selected(), Some(entity));
    }

    #[test]
    fn close_discards_unsaved_edits() {
        let (mut scene, entity) = scene_with_artwork();
        let mut selection = SelectionState::default();
        selection.select(entity, &mut scene);
        selection.edit_description("changed");
        selection.close(&mut scene);
        assert!(selection.is_idle());
        assert_eq!(scene.caption(entity).map(|c| c.description.as_str()), Some("Portrait"));
        assert!(!selection.save(&mut scene));
    }

    #[test]
    fn reselecting_resets_the_draft() {
        let (mut scene, entity) = scene_with_artwork();
        let mut selection = SelectionState::default();
        selection.select(entity, &mut scene);
        selection.edit_name("scratch");
        selection.select(entity, &mut scene);
        assert_eq!(selection.draft().map(|d| d.name.as_str()), Some("Mona Lisa"));
    }

    #[test]
    fn edits_while_idle_are_ignored() {
        let mut selection = SelectionState::default();
        selection.edit_name("nobody");
        assert_eq!(selection, SelectionState::Idle);
        assert!(selection.draft().is_none());
    }
}
