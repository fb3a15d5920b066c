use bevy_ecs::prelude::Entity;
use glam::{Quat, Vec3};

use crate::catalog::{GalleryManifest, Wall, DEFAULT_ARTWORK_DESCRIPTION, DEFAULT_ARTWORK_NAME};
use crate::material_registry::{MaterialDefinition, MaterialRegistry};
use crate::mesh::Mesh;
use crate::mesh_registry::MeshRegistry;
use crate::scene::{Artwork, Caption, GalleryScene, Transform3D};

pub const ARTWORK_SIZE: f32 = 100.0;
pub const MESH_ARTWORK: &str = "artwork";

/// Everything needed to hang one picture.
#[derive(Clone, Debug)]
pub struct ArtworkRequest<'a> {
    pub slot: usize,
    pub position: Vec3,
    pub image: &'a str,
    pub name: Option<&'a str>,
    pub description: Option<&'a str>,
    pub created_by: &'a str,
    pub wall: Wall,
}

pub fn material_key(image: &str) -> String {
    format!("artwork::{image}")
}

/// Hangs a 100x100 unlit quad showing `request.image`, turned to face into the room
/// from its wall. Name and description fall back to the catalog defaults.
pub fn place_artwork(
    scene: &mut GalleryScene,
    meshes: &mut MeshRegistry,
    materials: &mut MaterialRegistry,
    request: ArtworkRequest<'_>,
) -> Entity {
    meshes.ensure_mesh(MESH_ARTWORK, || Mesh::plane(ARTWORK_SIZE, ARTWORK_SIZE));

    let key = material_key(request.image);
    if !materials.has(&key) {
        materials.register(MaterialDefinition::unlit(key.clone()).with_texture(request.image).with_transparency(true));
    }

    let transform = Transform3D::from_translation_rotation(
        request.position,
        Quat::from_rotation_y(request.wall.artwork_yaw()),
    );
    let caption = Caption::new(
        request.name.unwrap_or(DEFAULT_ARTWORK_NAME),
        request.description.unwrap_or(DEFAULT_ARTWORK_DESCRIPTION),
    );
    let artwork = Artwork {
        slot: request.slot,
        image: request.image.to_string(),
        wall: request.wall,
        created_by: request.created_by.to_string(),
    };
    scene.spawn_artwork(artwork, MESH_ARTWORK, &key, transform, caption)
}

/// Places one artwork per manifest entry, in manifest order.
pub fn populate(
    scene: &mut GalleryScene,
    manifest: &GalleryManifest,
    meshes: &mut MeshRegistry,
    materials: &mut MaterialRegistry,
) -> Vec<Entity> {
    let placed: Vec<Entity> = manifest
        .entries
        .iter()
        .enumerate()
        .map(|(slot, entry)| {
            place_artwork(
                scene,
                meshes,
                materials,
                ArtworkRequest {
                    slot,
                    position: entry.placement.position(),
                    image: &entry.image,
                    name: entry.name(),
                    description: entry.description(),
                    created_by: entry.created_by(),
                    wall: entry.placement.wall,
                },
            )
        })
        .collect();
    log::info!("[gallery] hung {} artworks", placed.len());
    placed
}
