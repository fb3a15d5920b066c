use bevy_ecs::prelude::*;
use glam::{Mat4, Quat, Vec3};
use std::collections::HashMap;

use crate::catalog::Wall;
use crate::events::{EventBus, GalleryEvent};
use crate::material_registry::MaterialRegistry;
use crate::mesh_registry::MeshRegistry;
use crate::picking::ray_hit_obb;

// ---------- Components ----------
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Transform3D {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform3D {
    fn default() -> Self {
        Self { translation: Vec3::ZERO, rotation: Quat::IDENTITY, scale: Vec3::ONE }
    }
}

impl Transform3D {
    pub fn from_translation_rotation(translation: Vec3, rotation: Quat) -> Self {
        Self { translation, rotation, scale: Vec3::ONE }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

#[derive(Component, Clone, Debug)]
pub struct MeshRef {
    pub key: String,
}

#[derive(Component, Clone, Debug)]
pub struct SurfaceMaterial {
    pub key: String,
}

#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceKind {
    Floor,
    Ceiling,
    Wall(Wall),
    Artwork,
}

/// Catalog facts about a hung artwork that never change after placement.
#[derive(Component, Clone, Debug)]
pub struct Artwork {
    pub slot: usize,
    pub image: String,
    pub wall: Wall,
    pub created_by: String,
}

// ---------- Resources ----------
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caption {
    pub name: String,
    pub description: String,
}

impl Caption {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self { name: name.into(), description: description.into() }
    }
}

/// Display captions keyed by artwork entity, kept apart from render data.
#[derive(Resource, Default, Debug)]
pub struct CaptionStore {
    captions: HashMap<Entity, Caption>,
}

impl CaptionStore {
    pub fn get(&self, entity: Entity) -> Option<&Caption> {
        self.captions.get(&entity)
    }

    pub fn insert(&mut self, entity: Entity, caption: Caption) {
        self.captions.insert(entity, caption);
    }

    /// Overwrites name and description of an existing caption.
    pub fn update(&mut self, entity: Entity, name: &str, description: &str) -> bool {
        match self.captions.get_mut(&entity) {
            Some(caption) => {
                caption.name = name.to_string();
                caption.description = description.to_string();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.captions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.captions.is_empty()
    }
}

#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct SceneLighting {
    pub ambient_color: Vec3,
    pub ambient_intensity: f32,
    /// Direction the light travels, normalized.
    pub directional_direction: Vec3,
    pub directional_color: Vec3,
    pub directional_intensity: f32,
}

impl Default for SceneLighting {
    fn default() -> Self {
        Self {
            ambient_color: Vec3::ONE,
            ambient_intensity: 0.0,
            directional_direction: Vec3::NEG_Y,
            directional_color: Vec3::ONE,
            directional_intensity: 0.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct DrawItem {
    pub entity: Entity,
    pub mesh_key: String,
    pub material_key: String,
    pub model: Mat4,
    pub transparent: bool,
}

// ---------- Scene context ----------
pub struct GalleryScene {
    pub world: World,
}

impl Default for GalleryScene {
    fn default() -> Self {
        Self::new()
    }
}

impl GalleryScene {
    pub fn new() -> Self {
        let mut world = World::new();
        world.insert_resource(CaptionStore::default());
        world.insert_resource(SceneLighting::default());
        world.insert_resource(EventBus::default());
        Self { world }
    }

    pub fn spawn_surface(
        &mut self,
        kind: SurfaceKind,
        mesh_key: &str,
        material_key: &str,
        transform: Transform3D,
    ) -> Entity {
        self.world
            .spawn((
                transform,
                kind,
                MeshRef { key: mesh_key.to_string() },
                SurfaceMaterial { key: material_key.to_string() },
            ))
            .id()
    }

    pub fn spawn_artwork(
        &mut self,
        artwork: Artwork,
        mesh_key: &str,
        material_key: &str,
        transform: Transform3D,
        caption: Caption,
    ) -> Entity {
        let entity = self.spawn_surface(SurfaceKind::Artwork, mesh_key, material_key, transform);
        let event = GalleryEvent::ArtworkPlaced { entity, slot: artwork.slot, image: artwork.image.clone() };
        self.world.entity_mut(entity).insert(artwork);
        self.world.resource_mut::<CaptionStore>().insert(entity, caption);
        self.push_event(event);
        entity
    }

    pub fn push_event(&mut self, event: GalleryEvent) {
        self.world.resource_mut::<EventBus>().push(event);
    }

    pub fn drain_events(&mut self) -> Vec<GalleryEvent> {
        self.world.resource_mut::<EventBus>().drain()
    }

    pub fn set_lighting(&mut self, lighting: SceneLighting) {
        self.world.insert_resource(lighting);
    }

    pub fn lighting(&self) -> SceneLighting {
        *self.world.resource::<SceneLighting>()
    }

    pub fn surfaces(&mut self) -> Vec<(Entity, SurfaceKind)> {
        let mut query = self.world.query::<(Entity, &SurfaceKind)>();
        query.iter(&self.world).map(|(entity, kind)| (entity, *kind)).collect()
    }

    /// Artwork entities in placement-slot order.
    pub fn artworks(&mut self) -> Vec<Entity> {
        let mut query = self.world.query::<(Entity, &Artwork)>();
        let mut slots: Vec<(usize, Entity)> =
            query.iter(&self.world).map(|(entity, artwork)| (artwork.slot, entity)).collect();
        slots.sort_by_key(|(slot, _)| *slot);
        slots.into_iter().map(|(_, entity)| entity).collect()
    }

    pub fn artwork(&self, entity: Entity) -> Option<&Artwork> {
        self.world.get::<Artwork>(entity)
    }

    pub fn transform(&self, entity: Entity) -> Option<Transform3D> {
        self.world.get::<Transform3D>(entity).copied()
    }

    pub fn caption(&self, entity: Entity) -> Option<&Caption> {
        self.world.resource::<CaptionStore>().get(entity)
    }

    pub fn update_caption(&mut self, entity: Entity, name: &str, description: &str) -> bool {
        self.world.resource_mut::<CaptionStore>().update(entity, name, description)
    }

    pub fn captions(&self) -> &CaptionStore {
        self.world.resource::<CaptionStore>()
    }

    pub fn artwork_at(&mut self, position: Vec3) -> Option<Entity> {
        let mut query = self.world.query_filtered::<(Entity, &Transform3D), With<Artwork>>();
        query
            .iter(&self.world)
            .find(|(_, transform)| transform.translation.distance(position) < 1e-3)
            .map(|(entity, _)| entity)
    }

    /// Nearest artwork hit by the ray. Room surfaces never block the pick.
    pub fn pick_artwork(&mut self, origin: Vec3, direction: Vec3, meshes: &MeshRegistry) -> Option<Entity> {
        let dir = direction.normalize_or_zero();
        if dir.length_squared() <= f32::EPSILON {
            return None;
        }
        let mut query = self.world.query_filtered::<(Entity, &Transform3D, &MeshRef), With<Artwork>>();
        let mut closest: Option<(Entity, f32)> = None;
        for (entity, transform, mesh_ref) in query.iter(&self.world) {
            let Some(bounds) = meshes.mesh_bounds(&mesh_ref.key) else {
                continue;
            };
            if let Some(distance) = ray_hit_obb(origin, dir, transform, bounds) {
                match closest {
                    Some((_, best)) if distance >= best => {}
                    _ => closest = Some((entity, distance)),
                }
            }
        }
        closest.map(|(entity, _)| entity)
    }

    /// Opaque surfaces first, then transparent ones sorted back to front from `eye`.
    pub fn draw_list(&mut self, materials: &MaterialRegistry, eye: Vec3) -> Vec<DrawItem> {
        let mut query = self.world.query::<(Entity, &Transform3D, &MeshRef, &SurfaceMaterial)>();
        let mut opaque = Vec::new();
        let mut transparent = Vec::new();
        for (entity, transform, mesh_ref, material) in query.iter(&self.world) {
            let is_transparent =
                materials.definition(&material.key).map(|def| def.transparent).unwrap_or(false);
            let item = DrawItem {
                entity,
                mesh_key: mesh_ref.key.clone(),
                material_key: material.key.clone(),
                model: transform.matrix(),
                transparent: is_transparent,
            };
            if is_transparent {
                transparent.push((transform.translation.distance_squared(eye), item));
            } else {
                opaque.push(item);
            }
        }
        transparent.sort_by(|a, b| b.0.total_cmp(&a.0));
        opaque.extend(transparent.into_iter().map(|(_, item)| item));
        opaque
    }

    /// Despawns every surface and forgets all captions.
    pub fn clear(&mut self) {
        let entities: Vec<Entity> = {
            let mut query = self.world.query_filtered::<Entity, With<SurfaceKind>>();
            query.iter(&self.world).collect()
        };
        self.world.insert_resource(CaptionStore::default());
        for entity in entities {
            self.world.despawn(entity);
        }
    }
}
