use bevy_ecs::prelude::{Entity, Resource};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum GalleryEvent {
    ArtworkPlaced { entity: Entity, slot: usize, image: String },
    ArtworkSelected { entity: Entity },
    ClickMissed { ndc_x: f32, ndc_y: f32 },
    CaptionSaved { entity: Entity, name: String },
    SelectionClosed { entity: Entity },
}

impl fmt::Display for GalleryEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GalleryEvent::ArtworkPlaced { entity, slot, image } => {
                write!(f, "ArtworkPlaced entity={} slot={} image={}", entity.index(), slot, image)
            }
            GalleryEvent::ArtworkSelected { entity } => {
                write!(f, "ArtworkSelected entity={}", entity.index())
            }
            GalleryEvent::ClickMissed { ndc_x, ndc_y } => {
                write!(f, "ClickMissed ndc=({ndc_x:.3}, {ndc_y:.3})")
            }
            GalleryEvent::CaptionSaved { entity, name } => {
                write!(f, "CaptionSaved entity={} name={}", entity.index(), name)
            }
            GalleryEvent::SelectionClosed { entity } => {
                write!(f, "SelectionClosed entity={}", entity.index())
            }
        }
    }
}

#[derive(Default, Resource)]
pub struct EventBus {
    events: Vec<GalleryEvent>,
}

impl EventBus {
    pub fn push(&mut self, event: GalleryEvent) {
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<GalleryEvent> {
        self.events.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_empties_the_bus_in_order() {
        let mut bus = EventBus::default();
        let entity = Entity::from_raw(3);
        bus.push(GalleryEvent::ArtworkSelected { entity });
        bus.push(GalleryEvent::SelectionClosed { entity });
        let drained = bus.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].to_string(), "ArtworkSelected entity=3");
        assert!(bus.drain().is_empty());
    }
}
