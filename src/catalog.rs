use anyhow::{Context, Result};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_ARTWORK_NAME: &str = "Untitled";
pub const DEFAULT_ARTWORK_DESCRIPTION: &str = "No description available";
pub const ARTWORK_IMAGE_COUNT: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Wall {
    Front,
    Back,
    Left,
    Right,
}

impl Wall {
    pub fn label(self) -> &'static str {
        match self {
            Wall::Front => "front",
            Wall::Back => "back",
            Wall::Left => "left",
            Wall::Right => "right",
        }
    }

    /// Rotation about +Y applied to a quad hung on this wall.
    pub fn artwork_yaw(self) -> f32 {
        match self {
            Wall::Left => std::f32::consts::FRAC_PI_2,
            Wall::Right => -std::f32::consts::FRAC_PI_2,
            Wall::Front | Wall::Back => 0.0,
        }
    }
}

/// Caption facts for one artwork. Fields missing from a manifest load as empty strings and
/// display as the defaults, one field at a time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtworkInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "createdBy")]
    pub created_by: String,
    #[serde(default)]
    pub description: String,
}

impl ArtworkInfo {
    pub fn new(name: &str, created_by: &str, description: &str) -> Self {
        Self { name: name.to_string(), created_by: created_by.to_string(), description: description.to_string() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlacementSpec {
    pub wall: Wall,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl PlacementSpec {
    pub const fn new(wall: Wall, x: f32, y: f32, z: f32) -> Self {
        Self { wall, x, y, z }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

/// One placement slot together with the image and caption hung there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryEntry {
    pub placement: PlacementSpec,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub info: Option<ArtworkInfo>,
}

impl GalleryEntry {
    pub fn name(&self) -> Option<&str> {
        self.info.as_ref().map(|info| info.name.as_str()).filter(|name| !name.is_empty())
    }

    pub fn description(&self) -> Option<&str> {
        self.info.as_ref().map(|info| info.description.as_str()).filter(|desc| !desc.is_empty())
    }

    pub fn display_name(&self) -> &str {
        self.name().unwrap_or(DEFAULT_ARTWORK_NAME)
    }

    pub fn display_description(&self) -> &str {
        self.description().unwrap_or(DEFAULT_ARTWORK_DESCRIPTION)
    }

    pub fn created_by(&self) -> &str {
        self.info.as_ref().map(|info| info.created_by.as_str()).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GalleryManifest {
    pub entries: Vec<GalleryEntry>,
}

impl GalleryManifest {
    pub fn builtin() -> Self {
        Self::from_parallel(&artwork_image_paths(), &builtin_artworks(), &builtin_placements())
    }

    /// Pairs the three lists by index, one entry per placement slot. Short image or info
    /// lists fall back to an empty path or the default caption; extra items are ignored.
    pub fn from_parallel(images: &[String], infos: &[ArtworkInfo], placements: &[PlacementSpec]) -> Self {
        if images.len() < placements.len() {
            log::warn!(
                "[catalog] {} placement slots but only {} images; remaining slots render blank",
                placements.len(),
                images.len()
            );
        } else if images.len() > placements.len() {
            log::debug!("[catalog] {} images left unused", images.len() - placements.len());
        }
        if infos.len() < placements.len() {
            log::warn!(
                "[catalog] {} placement slots but only {} captions; remaining slots use defaults",
                placements.len(),
                infos.len()
            );
        }
        let entries = placements
            .iter()
            .enumerate()
            .map(|(index, placement)| GalleryEntry {
                placement: *placement,
                image: images.get(index).cloned().unwrap_or_default(),
                info: infos.get(index).cloned(),
            })
            .collect();
        Self { entries }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read gallery manifest {}", path.display()))?;
        let manifest = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse gallery manifest {}", path.display()))?;
        Ok(manifest)
    }

    pub fn load_or_builtin(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::builtin();
        };
        match Self::load(path) {
            Ok(manifest) => manifest,
            Err(err) => {
                log::warn!("[catalog] {err:?}. Falling back to the built-in gallery.");
                Self::builtin()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn artwork_image_paths() -> Vec<String> {
    (1..=ARTWORK_IMAGE_COUNT).map(|i| format!("artwork-images/art{i}.jpg")).collect()
}

pub fn builtin_placements() -> Vec<PlacementSpec> {
    vec![
        PlacementSpec::new(Wall::Front, -120.0, 100.0, 240.0),
        PlacementSpec::new(Wall::Front, 0.0, 100.0, 240.0),
        PlacementSpec::new(Wall::Front, 120.0, 100.0, 240.0),
        PlacementSpec::new(Wall::Back, 120.0, 100.0, -240.0),
        PlacementSpec::new(Wall::Back, 0.0, 100.0, -240.0),
        PlacementSpec::new(Wall::Back, -120.0, 100.0, -240.0),
        PlacementSpec::new(Wall::Left, -190.0, 100.0, 180.0),
        PlacementSpec::new(Wall::Left, -190.0, 100.0, 60.0),
        PlacementSpec::new(Wall::Left, -190.0, 100.0, -60.0),
        PlacementSpec::new(Wall::Left, -190.0, 100.0, -180.0),
        PlacementSpec::new(Wall::Right, 190.0, 100.0, 180.0),
        PlacementSpec::new(Wall::Right, 190.0, 100.0, 60.0),
        PlacementSpec::new(Wall::Right, 190.0, 100.0, -60.0),
        PlacementSpec::new(Wall::Right, 190.0, 100.0, -180.0),
    ]
}

pub fn builtin_artworks() -> Vec<ArtworkInfo> {
    vec![
        ArtworkInfo::new(
            "Mona Lisa",
            "Leonardo da Vinci",
            "A world-renowned portrait by Leonardo da Vinci, showcasing a woman with an enigmatic smile that has captivated audiences for centuries. This Renaissance masterpiece is celebrated for its detailed rendering of the human form, the soft sfumato technique, and the mysterious expression of the subject.",
        ),
        ArtworkInfo::new(
            "Flaming June",
            "Frederic Leighton",
            "A masterpiece of Victorian neoclassical art, \"Flaming June\" depicts a sleeping woman in a flowing orange gown, exuding warmth and tranquility. The vibrant hues and delicate composition embody a perfect harmony of light, color, and texture.",
        ),
        ArtworkInfo::new(
            "Girl with a Pearl Earring",
            "Johannes Vermeer",
            "Often referred to as the \"Mona Lisa of the North,\" this iconic painting captures the quiet allure of a young girl with a pearl earring. Vermeer’s attention to detail and mastery of light bring a lifelike quality to the subject, creating a timeless piece.",
        ),
        ArtworkInfo::new(
            "Self-Portrait with a Felt Hat",
            "Vincent van Gogh",
            "A striking self-portrait by van Gogh during his time in Paris, showcasing his unique style of bold brushstrokes and vibrant colors. The painting reflects his evolving artistic technique and offers a glimpse into the artist’s introspective nature.",
        ),
        ArtworkInfo::new(
            "Self-Portrait with Thorn Necklace and Hummingbird",
            "Frida Kahlo",
            "A deeply symbolic self-portrait reflecting Kahlo’s physical and emotional struggles. The thorn necklace and hummingbird are steeped in meaning, representing pain, resilience, and the dualities of life and death. The lush background emphasizes her connection to nature.",
        ),
        ArtworkInfo::new(
            "A Vase of Irises",
            "Vincent van Gogh",
            "A vibrant still life by van Gogh, capturing the delicate beauty of irises in a vase. His bold use of colors and textures conveys a sense of movement and life, transforming a simple composition into an evocative work of art.",
        ),
        ArtworkInfo::new(
            "The Persistence of Time",
            "Salvador Dalí",
            "A surrealist masterpiece featuring melting clocks draped over a dreamlike landscape. This iconic work by Dalí explores themes of time, memory, and the fluid nature of reality, making it a cornerstone of modern art.",
        ),
        ArtworkInfo::new(
            "The Swing",
            "Jean-Honoré Fragonard",
            "A quintessential Rococo painting, \"The Swing\" depicts a playful and elegant scene of a young woman on a swing, with her suitor watching from below. The painting is full of movement, lightheartedness, and intricate detail, reflecting the era’s charm.",
        ),
        ArtworkInfo::new(
            "A Sunday Afternoon on the Island of La Grande Jatte",
            "Georges Seurat",
            "A famous example of pointillism, this painting captures a serene afternoon by the river. Seurat meticulously placed dots of color to create an image that appears detailed and vibrant from a distance, embodying both innovation and beauty.",
        ),
        ArtworkInfo::new(
            "The Oath of the Horatii",
            "Jacques-Louis David",
            "A powerful neoclassical painting dramatizing the Roman legend of the Horatii brothers. The work captures the themes of loyalty, sacrifice, and patriotism, using a stark and dramatic composition to emphasize its emotional depth.",
        ),
        ArtworkInfo::new(
            "Café Terrace at Night",
            "Vincent van Gogh",
            "This lively nighttime scene depicts a café in Arles under a starry sky. Van Gogh’s masterful use of bold colors and dynamic lighting creates a sense of warmth and wonder, making it one of his most beloved works.",
        ),
        ArtworkInfo::new(
            "Joan of Arc 1864",
            "Dante Gabriel Rossetti",
            "A Pre-Raphaelite depiction of Joan of Arc, emphasizing her spiritual strength and determination. The painting’s rich color palette and intricate details highlight Rossetti’s dedication to beauty and symbolism.",
        ),
        ArtworkInfo::new(
            "The Water Lilies",
            "Claude Monet",
            "An impressionist masterpiece, \"The Water Lilies\" captures the serene beauty of Monet’s garden pond at Giverny. The painting’s soft brushstrokes and harmonious colors evoke a sense of peace and reflection.",
        ),
        ArtworkInfo::new(
            "Still Life with Cherries and Peaches",
            "Paul Cézanne",
            "A Post-Impressionist still life that emphasizes color, shape, and light. Cézanne’s meticulous arrangement of cherries and peaches transforms ordinary objects into a study of form and texture, bridging realism and abstraction.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_gallery_fills_every_slot() {
        let manifest = GalleryManifest::builtin();
        assert_eq!(manifest.len(), 14);
        let first = &manifest.entries[0];
        assert_eq!(first.display_name(), "Mona Lisa");
        assert_eq!(first.created_by(), "Leonardo da Vinci");
        assert_eq!(first.image, "artwork-images/art1.jpg");
        assert_eq!(first.placement, PlacementSpec::new(Wall::Front, -120.0, 100.0, 240.0));
        let last = manifest.entries.last().expect("last entry");
        assert_eq!(last.image, "artwork-images/art14.jpg");
        assert!(manifest.entries.iter().all(|entry| entry.info.is_some()));
    }

    #[test]
    fn short_lists_fall_back_to_defaults() {
        let images = vec!["a.jpg".to_string()];
        let infos = vec![ArtworkInfo::new("Only", "Someone", "Just one")];
        let placements = builtin_placements();
        let manifest = GalleryManifest::from_parallel(&images, &infos, &placements[..3]);
        assert_eq!(manifest.len(), 3);
        assert_eq!(manifest.entries[0].display_name(), "Only");
        assert_eq!(manifest.entries[1].image, "");
        assert_eq!(manifest.entries[1].display_name(), DEFAULT_ARTWORK_NAME);
        assert_eq!(manifest.entries[2].display_description(), DEFAULT_ARTWORK_DESCRIPTION);
        assert_eq!(manifest.entries[2].created_by(), "");
    }

    #[test]
    fn side_walls_rotate_artworks() {
        assert_eq!(Wall::Front.artwork_yaw(), 0.0);
        assert_eq!(Wall::Back.artwork_yaw(), 0.0);
        assert!((Wall::Left.artwork_yaw() - std::f32::consts::FRAC_PI_2).abs() < f32::EPSILON);
        assert!((Wall::Right.artwork_yaw() + std::f32::consts::FRAC_PI_2).abs() < f32::EPSILON);
    }

    #[test]
    fn manifest_accepts_camel_case_attribution() {
        let json = r#"{"entries":[{"placement":{"wall":"left","x":-190,"y":100,"z":60},
            "image":"art.jpg","info":{"name":"N","createdBy":"C","description":"D"}}]}"#;
        let manifest: GalleryManifest = serde_json::from_str(json).expect("manifest parses");
        assert_eq!(manifest.entries[0].placement.wall, Wall::Left);
        assert_eq!(manifest.entries[0].created_by(), "C");
    }

    #[test]
    fn descriptions_keep_typographic_apostrophes() {
        let artworks = builtin_artworks();
        assert!(artworks.iter().all(|info| !info.description.contains('\'')));
        assert!(artworks.iter().any(|info| info.description.contains("Vermeer’s attention")));
        assert_eq!(artworks.iter().map(|info| info.description.matches('’').count()).sum::<usize>(), 10);
    }

    #[test]
    fn partial_caption_defaults_each_missing_field() {
        let json = r#"{"entries":[
            {"placement":{"wall":"back","x":0,"y":100,"z":-240},"image":"a.jpg","info":{"name":"Only a title"}},
            {"placement":{"wall":"back","x":120,"y":100,"z":-240},"image":"b.jpg","info":{"description":""}}]}"#;
        let manifest: GalleryManifest = serde_json::from_str(json).expect("partial captions parse");
        assert_eq!(manifest.entries[0].display_name(), "Only a title");
        assert_eq!(manifest.entries[0].display_description(), DEFAULT_ARTWORK_DESCRIPTION);
        assert_eq!(manifest.entries[0].created_by(), "");
        assert_eq!(manifest.entries[1].display_name(), DEFAULT_ARTWORK_NAME);
        assert_eq!(manifest.entries[1].display_description(), DEFAULT_ARTWORK_DESCRIPTION);
    }
}
