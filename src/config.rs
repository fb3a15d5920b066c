use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "WindowConfig::default_title")]
    pub title: String,
    #[serde(default = "WindowConfig::default_width")]
    pub width: u32,
    #[serde(default = "WindowConfig::default_height")]
    pub height: u32,
    #[serde(default = "WindowConfig::default_vsync")]
    pub vsync: bool,
    #[serde(default)]
    pub fullscreen: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CameraConfig {
    #[serde(default = "CameraConfig::default_fov_y_degrees")]
    pub fov_y_degrees: f32,
    #[serde(default = "CameraConfig::default_near")]
    pub near: f32,
    #[serde(default = "CameraConfig::default_far")]
    pub far: f32,
    #[serde(default = "CameraConfig::default_position")]
    pub position: [f32; 3],
    #[serde(default = "CameraConfig::default_target")]
    pub target: [f32; 3],
}

/// Orbit-control tuning. Angles are polar angles in radians measured from +Y.
#[derive(Debug, Clone, Deserialize)]
pub struct ControlsConfig {
    #[serde(default = "ControlsConfig::default_enabled")]
    pub enable_damping: bool,
    #[serde(default = "ControlsConfig::default_damping_factor")]
    pub damping_factor: f32,
    #[serde(default = "ControlsConfig::default_enabled")]
    pub enable_zoom: bool,
    #[serde(default = "ControlsConfig::default_enabled")]
    pub enable_pan: bool,
    #[serde(default = "ControlsConfig::default_min_distance")]
    pub min_distance: f32,
    #[serde(default = "ControlsConfig::default_max_distance")]
    pub max_distance: f32,
    #[serde(default = "ControlsConfig::default_min_polar_angle")]
    pub min_polar_angle: f32,
    #[serde(default = "ControlsConfig::default_max_polar_angle")]
    pub max_polar_angle: f32,
    #[serde(default = "ControlsConfig::default_speed")]
    pub rotate_speed: f32,
    #[serde(default = "ControlsConfig::default_speed")]
    pub zoom_speed: f32,
    #[serde(default = "ControlsConfig::default_speed")]
    pub pan_speed: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GalleryConfig {
    /// Directory that `textures/` and `artwork-images/` are resolved against.
    #[serde(default = "GalleryConfig::default_asset_root")]
    pub asset_root: PathBuf,
    /// Optional manifest replacing the built-in catalog.
    #[serde(default)]
    pub manifest: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub controls: ControlsConfig,
    #[serde(default)]
    pub gallery: GalleryConfig,
}

#[derive(Debug, Clone, Default)]
pub struct AppConfigOverrides {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub vsync: Option<bool>,
    pub asset_root: Option<PathBuf>,
    pub manifest: Option<PathBuf>,
}

impl WindowConfig {
    fn default_title() -> String {
        "Virtual Art Gallery".to_string()
    }

    const fn default_width() -> u32 {
        1280
    }

    const fn default_height() -> u32 {
        720
    }

    const fn default_vsync() -> bool {
        true
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: Self::default_title(),
            width: Self::default_width(),
            height: Self::default_height(),
            vsync: Self::default_vsync(),
            fullscreen: false,
        }
    }
}

impl CameraConfig {
    const fn default_fov_y_degrees() -> f32 {
        75.0
    }

    const fn default_near() -> f32 {
        0.1
    }

    const fn default_far() -> f32 {
        1000.0
    }

    const fn default_position() -> [f32; 3] {
        [20.0, 100.0, 200.0]
    }

    const fn default_target() -> [f32; 3] {
        [0.0, 0.0, 0.0]
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: Self::default_fov_y_degrees(),
            near: Self::default_near(),
            far: Self::default_far(),
            position: Self::default_position(),
            target: Self::default_target(),
        }
    }
}

impl ControlsConfig {
    const fn default_enabled() -> bool {
        true
    }

    const fn default_damping_factor() -> f32 {
        0.25
    }

    const fn default_min_distance() -> f32 {
        50.0
    }

    const fn default_max_distance() -> f32 {
        500.0
    }

    fn default_min_polar_angle() -> f32 {
        std::f32::consts::PI / 10.0
    }

    fn default_max_polar_angle() -> f32 {
        std::f32::consts::PI / 1.5
    }

    const fn default_speed() -> f32 {
        1.0
    }
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            enable_damping: Self::default_enabled(),
            damping_factor: Self::default_damping_factor(),
            enable_zoom: Self::default_enabled(),
            enable_pan: Self::default_enabled(),
            min_distance: Self::default_min_distance(),
            max_distance: Self::default_max_distance(),
            min_polar_angle: Self::default_min_polar_angle(),
            max_polar_angle: Self::default_max_polar_angle(),
            rotate_speed: Self::default_speed(),
            zoom_speed: Self::default_speed(),
            pan_speed: Self::default_speed(),
        }
    }
}

impl GalleryConfig {
    fn default_asset_root() -> PathBuf {
        PathBuf::from(".")
    }
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self { asset_root: Self::default_asset_root(), manifest: None }
    }
}

impl AppConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                log::warn!("[config] {err:?}. Falling back to defaults.");
                Self::default()
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: &AppConfigOverrides) {
        if let Some(width) = overrides.width {
            self.window.width = width;
        }
        if let Some(height) = overrides.height {
            self.window.height = height;
        }
        if let Some(vsync) = overrides.vsync {
            self.window.vsync = vsync;
        }
        if let Some(root) = &overrides.asset_root {
            self.gallery.asset_root = root.clone();
        }
        if let Some(manifest) = &overrides.manifest {
            self.gallery.manifest = Some(manifest.clone());
        }
    }
}

impl AppConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.applied_fields().is_empty()
    }

    pub fn applied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.width.is_some() {
            fields.push("width");
        }
        if self.height.is_some() {
            fields.push("height");
        }
        if self.vsync.is_some() {
            fields.push("vsync");
        }
        if self.asset_root.is_some() {
            fields.push("assets");
        }
        if self.manifest.is_some() {
            fields.push("manifest");
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_object_uses_gallery_defaults() {
        let cfg: AppConfig = serde_json::from_str("{}").expect("parse empty config");
        assert_eq!(cfg.window.title, "Virtual Art Gallery");
        assert_eq!(cfg.camera.fov_y_degrees, 75.0);
        assert_eq!(cfg.camera.position, [20.0, 100.0, 200.0]);
        assert_eq!(cfg.controls.damping_factor, 0.25);
        assert_eq!(cfg.controls.min_distance, 50.0);
        assert_eq!(cfg.controls.max_distance, 500.0);
        assert_eq!(cfg.gallery.asset_root, PathBuf::from("."));
        assert!(cfg.gallery.manifest.is_none());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg: AppConfig =
            serde_json::from_str(r#"{ "window": { "width": 800 }, "controls": { "enable_damping": false } }"#)
                .expect("parse partial config");
        assert_eq!(cfg.window.width, 800);
        assert_eq!(cfg.window.height, 720);
        assert!(!cfg.controls.enable_damping);
        assert!(cfg.controls.enable_zoom);
    }
}
