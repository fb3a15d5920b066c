use bevy_ecs::prelude::Entity;
use glam::{Quat, Vec3};
use std::f32::consts::{FRAC_PI_2, PI};

use crate::catalog::Wall;
use crate::material_registry::{MaterialDefinition, MaterialRegistry};
use crate::mesh::Mesh;
use crate::mesh_registry::MeshRegistry;
use crate::scene::{GalleryScene, SceneLighting, SurfaceKind, Transform3D};

pub const ROOM_WIDTH: f32 = 400.0;
pub const ROOM_DEPTH: f32 = 500.0;
pub const ROOM_HEIGHT: f32 = 200.0;
pub const FLOOR_TEXTURE: &str = "textures/floor.jpg";
pub const WALL_TEXTURE: &str = "textures/wall.jpg";
pub const FLOOR_TEXTURE_REPEAT: f32 = 10.0;

const FLOOR_ELEVATION: f32 = 0.1;
const CEILING_COLOR: u32 = 0xeeeeee;
const AMBIENT_COLOR: u32 = 0x404040;

pub const MESH_SLAB: &str = "room::slab";
pub const MESH_END_WALL: &str = "room::end_wall";
pub const MESH_SIDE_WALL: &str = "room::side_wall";
pub const MATERIAL_FLOOR: &str = "room::floor";
pub const MATERIAL_WALL: &str = "room::wall";
pub const MATERIAL_CEILING: &str = "room::ceiling";

/// Ambient fill plus one white directional light shining from (5, 10, 5) toward the origin.
pub fn gallery_lighting() -> SceneLighting {
    SceneLighting {
        ambient_color: hex_to_vec3(AMBIENT_COLOR),
        ambient_intensity: 1.0,
        directional_direction: -Vec3::new(5.0, 10.0, 5.0).normalize(),
        directional_color: Vec3::ONE,
        directional_intensity: 1.0,
    }
}

/// Spawns floor, ceiling and the four walls, and installs the room lighting.
/// Returns the spawned surfaces in that order.
pub fn build_room(
    scene: &mut GalleryScene,
    meshes: &mut MeshRegistry,
    materials: &mut MaterialRegistry,
) -> Vec<Entity> {
    meshes.ensure_mesh(MESH_SLAB, || Mesh::plane(ROOM_WIDTH, ROOM_DEPTH));
    meshes.ensure_mesh(MESH_END_WALL, || Mesh::plane(ROOM_WIDTH, ROOM_HEIGHT));
    meshes.ensure_mesh(MESH_SIDE_WALL, || Mesh::plane(ROOM_DEPTH, ROOM_HEIGHT));

    materials.register(
        MaterialDefinition::standard(MATERIAL_FLOOR, 0.8, 0.2)
            .with_texture(FLOOR_TEXTURE)
            .with_uv_repeat(FLOOR_TEXTURE_REPEAT, FLOOR_TEXTURE_REPEAT),
    );
    materials.register(MaterialDefinition::standard(MATERIAL_WALL, 0.6, 0.1).with_texture(WALL_TEXTURE));
    materials
        .register(MaterialDefinition::standard(MATERIAL_CEILING, 0.8, 0.1).with_base_color_hex(CEILING_COLOR));

    let half_height = ROOM_HEIGHT * 0.5;
    let half_width = ROOM_WIDTH * 0.5;
    let half_depth = ROOM_DEPTH * 0.5;
    let mut surfaces = Vec::with_capacity(6);

    surfaces.push(scene.spawn_surface(
        SurfaceKind::Floor,
        MESH_SLAB,
        MATERIAL_FLOOR,
        Transform3D::from_translation_rotation(
            Vec3::new(0.0, FLOOR_ELEVATION, 0.0),
            Quat::from_rotation_x(-FRAC_PI_2),
        ),
    ));
    surfaces.push(scene.spawn_surface(
        SurfaceKind::Ceiling,
        MESH_SLAB,
        MATERIAL_CEILING,
        Transform3D::from_translation_rotation(Vec3::new(0.0, ROOM_HEIGHT, 0.0), Quat::from_rotation_x(FRAC_PI_2)),
    ));

    let walls = [
        (Wall::Front, MESH_END_WALL, Vec3::new(0.0, half_height, half_depth), 0.0),
        (Wall::Back, MESH_END_WALL, Vec3::new(0.0, half_height, -half_depth), PI),
        (Wall::Left, MESH_SIDE_WALL, Vec3::new(-half_width, half_height, 0.0), FRAC_PI_2),
        (Wall::Right, MESH_SIDE_WALL, Vec3::new(half_width, half_height, 0.0), -FRAC_PI_2),
    ];
    for (wall, mesh_key, translation, yaw) in walls {
        surfaces.push(scene.spawn_surface(
            SurfaceKind::Wall(wall),
            mesh_key,
            MATERIAL_WALL,
            Transform3D::from_translation_rotation(translation, Quat::from_rotation_y(yaw)),
        ));
    }

    scene.set_lighting(gallery_lighting());
    log::debug!("[room] built {} surfaces", surfaces.len());
    surfaces
}

fn hex_to_vec3(rgb: u32) -> Vec3 {
    Vec3::new(
        ((rgb >> 16) & 0xff) as f32 / 255.0,
        ((rgb >> 8) & 0xff) as f32 / 255.0,
        (rgb & 0xff) as f32 / 255.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn build() -> (GalleryScene, MeshRegistry, MaterialRegistry, Vec<Entity>) {
        let dir = tempdir().expect("temp dir");
        let mut scene = GalleryScene::new();
        let mut meshes = MeshRegistry::new();
        let mut materials = MaterialRegistry::new(dir.path());
        let surfaces = build_room(&mut scene, &mut meshes, &mut materials);
        (scene, meshes, materials, surfaces)
    }

    #[test]
    fn room_has_six_surfaces_with_fixed_dimensions() {
        let (mut scene, meshes, _, surfaces) = build();
        assert_eq!(surfaces.len(), 6);
        assert_eq!(scene.surfaces().len(), 6);
        assert_eq!(meshes.mesh_bounds(MESH_SLAB).map(|b| b.size()), Some(Vec3::new(400.0, 500.0, 0.0)));
        assert_eq!(meshes.mesh_bounds(MESH_END_WALL).map(|b| b.size()), Some(Vec3::new(400.0, 200.0, 0.0)));
        assert_eq!(meshes.mesh_bounds(MESH_SIDE_WALL).map(|b| b.size()), Some(Vec3::new(500.0, 200.0, 0.0)));
    }

    #[test]
    fn floor_is_horizontal_and_tiled() {
        let (scene, _, materials, surfaces) = build();
        let floor = scene.transform(surfaces[0]).expect("floor transform");
        assert!((floor.translation.y - 0.1).abs() < 1e-6);
        let normal = floor.rotation * Vec3::Z;
        assert!((normal - Vec3::Y).length() < 1e-5, "floor should face up, got {normal}");
        let def = materials.definition(MATERIAL_FLOOR).expect("floor material");
        assert_eq!(def.uv_repeat, [10.0, 10.0]);
        assert_eq!(def.texture.as_deref(), Some(FLOOR_TEXTURE));
    }

    #[test]
    fn walls_enclose_the_footprint() {
        let (scene, _, _, surfaces) = build();
        let expected = [
            Vec3::new(0.0, 100.0, 250.0),
            Vec3::new(0.0, 100.0, -250.0),
            Vec3::new(-200.0, 100.0, 0.0),
            Vec3::new(200.0, 100.0, 0.0),
        ];
        for (entity, position) in surfaces[2..].iter().zip(expected) {
            let transform = scene.transform(*entity).expect("wall transform");
            assert!(transform.translation.distance(position) < 1e-4);
        }
        let left = scene.transform(surfaces[4]).expect("left wall");
        assert!(((left.rotation * Vec3::Z) - Vec3::X).length() < 1e-5, "left wall faces into the room");
    }

    #[test]
    fn lighting_matches_gallery_setup() {
        let (scene, _, _, _) = build();
        let lighting = scene.lighting();
        assert!((lighting.ambient_color.x - 64.0 / 255.0).abs() < 1e-6);
        assert_eq!(lighting.directional_intensity, 1.0);
        assert!(lighting.directional_direction.y < 0.0);
    }
}
