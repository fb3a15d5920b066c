use glam::Vec3;
use virtual_gallery::artwork;
use virtual_gallery::catalog::{
    artwork_image_paths, builtin_artworks, builtin_placements, ArtworkInfo, GalleryManifest, Wall,
    DEFAULT_ARTWORK_DESCRIPTION, DEFAULT_ARTWORK_NAME,
};
use virtual_gallery::events::GalleryEvent;
use virtual_gallery::material_registry::{MaterialRegistry, Shading};
use virtual_gallery::mesh_registry::MeshRegistry;
use virtual_gallery::room;
use virtual_gallery::scene::{GalleryScene, SurfaceKind};

fn furnished_gallery(root: &std::path::Path) -> (GalleryScene, MeshRegistry, MaterialRegistry) {
    let mut scene = GalleryScene::new();
    let mut meshes = MeshRegistry::new();
    let mut materials = MaterialRegistry::new(root);
    room::build_room(&mut scene, &mut meshes, &mut materials);
    artwork::populate(&mut scene, &GalleryManifest::builtin(), &mut meshes, &mut materials);
    (scene, meshes, materials)
}

#[test]
fn builtin_gallery_hangs_fourteen_artworks_in_a_six_sided_room() {
    let dir = tempfile::tempdir().expect("temp dir");
    let (mut scene, _meshes, materials) = furnished_gallery(dir.path());

    let surfaces = scene.surfaces();
    let room_surfaces = surfaces.iter().filter(|(_, kind)| *kind != SurfaceKind::Artwork).count();
    assert_eq!(room_surfaces, 6);
    assert_eq!(scene.artworks().len(), 14);
    assert_eq!(scene.captions().len(), 14);

    let placed = scene
        .drain_events()
        .into_iter()
        .filter(|event| matches!(event, GalleryEvent::ArtworkPlaced { .. }))
        .count();
    assert_eq!(placed, 14);

    for wall in [Wall::Front, Wall::Back, Wall::Left, Wall::Right] {
        assert!(surfaces.iter().any(|(_, kind)| *kind == SurfaceKind::Wall(wall)), "missing {} wall", wall.label());
    }
    let floor = materials.definition(room::MATERIAL_FLOOR).expect("floor material");
    assert!(matches!(floor.shading, Shading::Standard { .. }));
}

#[test]
fn every_artwork_sits_inside_the_room() {
    let dir = tempfile::tempdir().expect("temp dir");
    let (mut scene, _meshes, _materials) = furnished_gallery(dir.path());
    for entity in scene.artworks() {
        let position = scene.transform(entity).expect("artwork transform").translation;
        assert!(position.x.abs() < room::ROOM_WIDTH * 0.5, "x out of room: {position}");
        assert!(position.z.abs() < room::ROOM_DEPTH * 0.5, "z out of room: {position}");
        assert!(position.y > 0.0 && position.y < room::ROOM_HEIGHT, "y out of room: {position}");
    }
}

#[test]
fn artworks_draw_after_the_opaque_room() {
    let dir = tempfile::tempdir().expect("temp dir");
    let (mut scene, _meshes, materials) = furnished_gallery(dir.path());
    let draws = scene.draw_list(&materials, Vec3::new(20.0, 100.0, 200.0));
    assert_eq!(draws.len(), 20);
    let first_transparent = draws.iter().position(|item| item.transparent).expect("artworks are transparent");
    assert_eq!(first_transparent, 6);
    assert!(draws[first_transparent..].iter().all(|item| item.transparent));
}

#[test]
fn every_slot_carries_the_catalog_caption_at_its_index() {
    let dir = tempfile::tempdir().expect("temp dir");
    let (mut scene, _meshes, _materials) = furnished_gallery(dir.path());
    let artworks = scene.artworks();
    let catalog = builtin_artworks();
    assert_eq!(artworks.len(), catalog.len());
    for (slot, (entity, info)) in artworks.into_iter().zip(catalog).enumerate() {
        let caption = scene.caption(entity).expect("caption");
        assert_eq!(caption.name, info.name, "name at slot {slot}");
        assert_eq!(caption.description, info.description, "description at slot {slot}");
        let artwork = scene.artwork(entity).expect("artwork");
        assert_eq!(artwork.slot, slot);
        assert_eq!(artwork.created_by, info.created_by, "attribution at slot {slot}");
    }
}

#[test]
fn short_caption_list_hangs_default_captions() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut scene = GalleryScene::new();
    let mut meshes = MeshRegistry::new();
    let mut materials = MaterialRegistry::new(dir.path());
    let infos: Vec<ArtworkInfo> = builtin_artworks().into_iter().take(2).collect();
    let manifest = GalleryManifest::from_parallel(&artwork_image_paths(), &infos, &builtin_placements());
    let placed = artwork::populate(&mut scene, &manifest, &mut meshes, &mut materials);

    assert_eq!(placed.len(), 14);
    assert_eq!(scene.caption(placed[1]).expect("caption").name, infos[1].name);
    for &entity in &placed[2..] {
        let caption = scene.caption(entity).expect("caption");
        assert_eq!(caption.name, DEFAULT_ARTWORK_NAME);
        assert_eq!(caption.description, DEFAULT_ARTWORK_DESCRIPTION);
    }
}
