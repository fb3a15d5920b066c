use std::fs;
use std::path::PathBuf;
use virtual_gallery::catalog::{GalleryManifest, Wall, DEFAULT_ARTWORK_DESCRIPTION, DEFAULT_ARTWORK_NAME};
use virtual_gallery::cli::CliOverrides;
use virtual_gallery::config::AppConfig;

#[test]
fn partial_config_keeps_defaults_for_missing_fields() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("app.json");
    fs::write(&path, r#"{"window":{"width":800},"controls":{"damping_factor":0.1}}"#).expect("write config");

    let config = AppConfig::load(&path).expect("config loads");
    assert_eq!(config.window.width, 800);
    assert_eq!(config.window.height, 720);
    assert!((config.controls.damping_factor - 0.1).abs() < f32::EPSILON);
    assert_eq!(config.controls.max_distance, 500.0);
    assert_eq!(config.camera.position, [20.0, 100.0, 200.0]);
    assert_eq!(config.gallery.manifest, None);
}

#[test]
fn unreadable_config_falls_back_to_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").expect("write config");
    assert!(AppConfig::load(&path).is_err());
    let config = AppConfig::load_or_default(&path);
    assert_eq!(config.window.title, "Virtual Art Gallery");
}

#[test]
fn command_line_flags_override_the_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("app.json");
    fs::write(&path, r#"{"window":{"width":800,"vsync":true}}"#).expect("write config");
    let mut config = AppConfig::load(&path).expect("config loads");

    let overrides = CliOverrides::parse([
        "gallery", "--width", "1920", "--vsync", "off", "--assets", "/srv/gallery", "--manifest", "show.json",
    ])
    .expect("flags parse")
    .into_config_overrides();
    assert_eq!(overrides.applied_fields(), ["width", "vsync", "assets", "manifest"]);
    config.apply_overrides(&overrides);

    assert_eq!(config.window.width, 1920);
    assert!(!config.window.vsync);
    assert_eq!(config.gallery.asset_root, PathBuf::from("/srv/gallery"));
    assert_eq!(config.gallery.manifest, Some(PathBuf::from("show.json")));
}

#[test]
fn manifest_file_replaces_the_builtin_catalog() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("show.json");
    fs::write(
        &path,
        r#"{"entries":[
            {"placement":{"wall":"back","x":0,"y":100,"z":-240},"image":"artwork-images/a.jpg",
             "info":{"name":"Dawn","created_by":"A. Painter","description":"Morning light"}},
            {"placement":{"wall":"right","x":190,"y":100,"z":0},"image":"artwork-images/b.jpg"}
        ]}"#,
    )
    .expect("write manifest");

    let manifest = GalleryManifest::load_or_builtin(Some(path.as_path()));
    assert_eq!(manifest.len(), 2);
    assert_eq!(manifest.entries[0].display_name(), "Dawn");
    assert_eq!(manifest.entries[1].placement.wall, Wall::Right);
    assert_eq!(manifest.entries[1].display_name(), DEFAULT_ARTWORK_NAME);
}

#[test]
fn missing_manifest_uses_the_builtin_catalog() {
    let dir = tempfile::tempdir().expect("temp dir");
    let manifest = GalleryManifest::load_or_builtin(Some(dir.path().join("absent.json").as_path()));
    assert_eq!(manifest, GalleryManifest::builtin());
    assert_eq!(manifest.len(), 14);
}

#[test]
fn exported_builtin_manifest_loads_back_unchanged() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("builtin.json");
    let json = serde_json::to_string_pretty(&GalleryManifest::builtin()).expect("serialize manifest");
    fs::write(&path, json).expect("write manifest");

    let loaded = GalleryManifest::load(&path).expect("manifest loads");
    assert_eq!(loaded, GalleryManifest::builtin());
    assert_eq!(loaded.entries[0].created_by(), "Leonardo da Vinci");
}

#[test]
fn partial_captions_keep_the_user_manifest() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("partial.json");
    fs::write(
        &path,
        r#"{"entries":[
            {"placement":{"wall":"back","x":0,"y":100,"z":-240},"image":"a.jpg","info":{"name":"Only a title"}},
            {"placement":{"wall":"back","x":120,"y":100,"z":-240},"image":"b.jpg"}
        ]}"#,
    )
    .expect("write manifest");

    assert!(GalleryManifest::load(&path).is_ok());
    let manifest = GalleryManifest::load_or_builtin(Some(path.as_path()));
    assert_eq!(manifest.len(), 2);
    assert_eq!(manifest.entries[0].display_name(), "Only a title");
    assert_eq!(manifest.entries[0].display_description(), DEFAULT_ARTWORK_DESCRIPTION);
    assert_eq!(manifest.entries[1].display_name(), DEFAULT_ARTWORK_NAME);
}
