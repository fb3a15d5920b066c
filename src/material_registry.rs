use anyhow::{anyhow, Context, Result};
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const PLACEHOLDER_PIXEL: [u8; 4] = [128, 128, 128, 255];
const WHITE_PIXEL: [u8; 4] = [255, 255, 255, 255];

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shading {
    /// Ambient plus one directional light. Roughness/metalness dull the specular term.
    Standard { roughness: f32, metalness: f32 },
    Unlit,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MaterialDefinition {
    pub key: String,
    pub base_color: [f32; 4],
    pub texture: Option<String>,
    pub uv_repeat: [f32; 2],
    pub shading: Shading,
    pub transparent: bool,
}

impl MaterialDefinition {
    pub fn standard(key: impl Into<String>, roughness: f32, metalness: f32) -> Self {
        Self {
            key: key.into(),
            base_color: [1.0, 1.0, 1.0, 1.0],
            texture: None,
            uv_repeat: [1.0, 1.0],
            shading: Shading::Standard { roughness, metalness },
            transparent: false,
        }
    }

    pub fn unlit(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            base_color: [1.0, 1.0, 1.0, 1.0],
            texture: None,
            uv_repeat: [1.0, 1.0],
            shading: Shading::Unlit,
            transparent: false,
        }
    }

    pub fn with_texture(mut self, path: impl Into<String>) -> Self {
        self.texture = Some(path.into());
        self
    }

    pub fn with_uv_repeat(mut self, u: f32, v: f32) -> Self {
        self.uv_repeat = [u, v];
        self
    }

    pub fn with_base_color_hex(mut self, rgb: u32) -> Self {
        self.base_color = [
            ((rgb >> 16) & 0xff) as f32 / 255.0,
            ((rgb >> 8) & 0xff) as f32 / 255.0,
            (rgb & 0xff) as f32 / 255.0,
            1.0,
        ];
        self
    }

    pub fn with_transparency(mut self, transparent: bool) -> Self {
        self.transparent = transparent;
        self
    }
}

/// Decoded RGBA8 pixels ready for upload.
#[derive(Clone, Debug)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub placeholder: bool,
}

impl TextureData {
    pub fn load(path: &Path) -> Result<Self> {
        let bytes =
            std::fs::read(path).with_context(|| format!("Failed to read texture {}", path.display()))?;
        let img = image::load_from_memory(&bytes)
            .with_context(|| format!("Failed to decode texture {}", path.display()))?
            .to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self { width, height, data: img.into_raw(), placeholder: false })
    }

    pub fn solid(pixel: [u8; 4]) -> Self {
        Self { width: 1, height: 1, data: pixel.to_vec(), placeholder: true }
    }

    /// Missing or undecodable files become a flat grey texel so the surface still draws.
    pub fn load_or_placeholder(path: &Path) -> Self {
        if path.as_os_str().is_empty() {
            log::debug!("[texture] empty texture path, using placeholder");
            return Self::solid(PLACEHOLDER_PIXEL);
        }
        match Self::load(path) {
            Ok(texture) => texture,
            Err(err) => {
                log::warn!("[texture] {err:#}. Using placeholder.");
                Self::solid(PLACEHOLDER_PIXEL)
            }
        }
    }
}

struct MaterialEntry {
    definition: MaterialDefinition,
    gpu: Option<Arc<MaterialGpu>>,
}

struct TextureEntry {
    texture: TextureData,
    gpu: Option<Arc<GpuTexture>>,
}

pub struct MaterialGpu {
    bind_group: wgpu::BindGroup,
    _texture: Arc<GpuTexture>,
}

impl MaterialGpu {
    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

struct GpuTexture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

pub struct MaterialRegistry {
    asset_root: PathBuf,
    materials: HashMap<String, MaterialEntry>,
    textures: HashMap<String, TextureEntry>,
    white_texture: Option<Arc<GpuTexture>>,
    sampler: Option<Arc<wgpu::Sampler>>,
}

impl MaterialRegistry {
    pub fn new(asset_root: impl Into<PathBuf>) -> Self {
        Self {
            asset_root: asset_root.into(),
            materials: HashMap::new(),
            textures: HashMap::new(),
            white_texture: None,
            sampler: None,
        }
    }

    pub fn asset_root(&self) -> &Path {
        &self.asset_root
    }

    /// Registers a material and decodes its texture. Re-registering a key replaces the
    /// definition; texture decoding happens once per path.
    pub fn register(&mut self, definition: MaterialDefinition) {
        if let Some(path) = definition.texture.as_deref() {
            if !self.textures.contains_key(path) {
                let resolved =
                    if path.is_empty() { PathBuf::new() } else { self.asset_root.join(path) };
                let texture = TextureData::load_or_placeholder(&resolved);
                self.textures.insert(path.to_string(), TextureEntry { texture, gpu: None });
            }
        }
        self.materials.insert(definition.key.clone(), MaterialEntry { definition, gpu: None });
    }

    pub fn has(&self, key: &str) -> bool {
        self.materials.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.materials.keys().map(|k| k.as_str())
    }

    pub fn definition(&self, key: &str) -> Option<&MaterialDefinition> {
        self.materials.get(key).map(|entry| &entry.definition)
    }

    pub fn texture(&self, path: &str) -> Option<&TextureData> {
        self.textures.get(path).map(|entry| &entry.texture)
    }

    pub fn prepare_material_gpu(
        &mut self,
        key: &str,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &wgpu::BindGroupLayout,
    ) -> Result<Arc<MaterialGpu>> {
        let definition = {
            let entry = self.materials.get(key).ok_or_else(|| anyhow!("Material '{key}' not registered"))?;
            if let Some(gpu) = &entry.gpu {
                return Ok(gpu.clone());
            }
            entry.definition.clone()
        };

        let sampler = self.ensure_sampler(device);
        let texture = match definition.texture.as_deref() {
            Some(path) => self.ensure_texture_gpu(path, device, queue)?,
            None => self.ensure_white_texture(device, queue),
        };

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Material Bind Group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: wgpu::BindingResource::TextureView(&texture.view) },
                wgpu::BindGroupEntry { binding: 1, resource: wgpu::BindingResource::Sampler(sampler.as_ref()) },
            ],
        });
        let gpu = Arc::new(MaterialGpu { bind_group, _texture: texture });
        if let Some(entry) = self.materials.get_mut(key) {
            entry.gpu = Some(gpu.clone());
        }
        Ok(gpu)
    }

    /// Drops every GPU resource. CPU definitions and decoded pixels stay so the
    /// registry can be uploaded again on a new device.
    pub fn release_gpu(&mut self) {
        for entry in self.materials.values_mut() {
            entry.gpu = None;
        }
        for entry in self.textures.values_mut() {
            entry.gpu = None;
        }
        self.white_texture = None;
        self.sampler = None;
    }

    fn ensure_sampler(&mut self, device: &wgpu::Device) -> Arc<wgpu::Sampler> {
        if let Some(sampler) = &self.sampler {
            return sampler.clone();
        }
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Material Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });
        let sampler = Arc::new(sampler);
        self.sampler = Some(sampler.clone());
        sampler
    }

    fn ensure_white_texture(&mut self, device: &wgpu::Device, queue: &wgpu::Queue) -> Arc<GpuTexture> {
        if let Some(texture) = &self.white_texture {
            return texture.clone();
        }
        let texture = Arc::new(upload_texture(device, queue, &TextureData::solid(WHITE_PIXEL)));
        self.white_texture = Some(texture.clone());
        texture
    }

    fn ensure_texture_gpu(
        &mut self,
        path: &str,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<Arc<GpuTexture>> {
        let entry =
            self.textures.get_mut(path).ok_or_else(|| anyhow!("Texture '{path}' not registered for materials"))?;
        if let Some(texture) = &entry.gpu {
            return Ok(texture.clone());
        }
        let texture = Arc::new(upload_texture(device, queue, &entry.texture));
        entry.gpu = Some(texture.clone());
        Ok(texture)
    }
}

fn upload_texture(device: &wgpu::Device, queue: &wgpu::Queue, data: &TextureData) -> GpuTexture {
    let extent = wgpu::Extent3d { width: data.width, height: data.height, depth_or_array_layers: 1 };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Material Texture"),
        size: extent,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    let (pixel_data, padded_row_bytes) = prepare_texture_upload(&data.data, data.width, data.height);
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        pixel_data.as_ref(),
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(padded_row_bytes),
            rows_per_image: Some(data.height),
        },
        extent,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    GpuTexture { _texture: texture, view }
}

fn padded_bytes_per_row(width: u32) -> u32 {
    let unpadded = width.saturating_mul(4);
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    let remainder = unpadded % align;
    if remainder == 0 {
        unpadded
    } else {
        unpadded + align - remainder
    }
}

fn prepare_texture_upload(data: &[u8], width: u32, height: u32) -> (Cow<'_, [u8]>, u32) {
    let row_bytes = width.saturating_mul(4);
    let padded_row_bytes = padded_bytes_per_row(width);
    if padded_row_bytes == row_bytes {
        (Cow::Borrowed(data), row_bytes)
    } else {
        let mut padded = vec![0u8; (padded_row_bytes.saturating_mul(height)) as usize];
        for row in 0..height {
            let src_start = (row_bytes * row) as usize;
            let dst_start = (padded_row_bytes * row) as usize;
            let src_end = src_start + row_bytes as usize;
            if src_end <= data.len() && dst_start + row_bytes as usize <= padded.len() {
                padded[dst_start..dst_start + row_bytes as usize].copy_from_slice(&data[src_start..src_end]);
            }
        }
        (Cow::Owned(padded), padded_row_bytes)
    }
}
