use std::collections::HashMap;

use anyhow::{anyhow, Result};

use crate::mesh::{Mesh, MeshBounds};
use crate::renderer::{GpuMesh, Renderer};

#[derive(Default)]
pub struct MeshRegistry {
    entries: HashMap<String, MeshEntry>,
}

struct MeshEntry {
    mesh: Mesh,
    gpu: Option<GpuMesh>,
}

impl MeshRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `mesh` under `key` unless the key is already taken.
    pub fn ensure_mesh(&mut self, key: &str, build: impl FnOnce() -> Mesh) {
        self.entries.entry(key.to_string()).or_insert_with(|| MeshEntry { mesh: build(), gpu: None });
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn mesh(&self, key: &str) -> Option<&Mesh> {
        self.entries.get(key).map(|entry| &entry.mesh)
    }

    pub fn mesh_bounds(&self, key: &str) -> Option<&MeshBounds> {
        self.entries.get(key).map(|entry| &entry.mesh.bounds)
    }

    pub fn ensure_gpu<'a>(&'a mut self, key: &str, renderer: &Renderer) -> Result<&'a GpuMesh> {
        let entry =
            self.entries.get_mut(key).ok_or_else(|| anyhow!("Mesh '{key}' not registered in registry"))?;
        if entry.gpu.is_none() {
            entry.gpu = Some(renderer.create_gpu_mesh(&entry.mesh)?);
        }
        entry.gpu.as_ref().ok_or_else(|| anyhow!("Mesh '{key}' failed to upload"))
    }

    pub fn gpu_mesh(&self, key: &str) -> Option<&GpuMesh> {
        self.entries.get(key).and_then(|entry| entry.gpu.as_ref())
    }

    /// Drops every GPU buffer while keeping CPU geometry for picking.
    pub fn release_gpu(&mut self) {
        for entry in self.entries.values_mut() {
            entry.gpu = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_mesh_keeps_first_registration() {
        let mut registry = MeshRegistry::new();
        registry.ensure_mesh("quad", || Mesh::plane(1.0, 1.0));
        registry.ensure_mesh("quad", || Mesh::plane(10.0, 10.0));
        let bounds = registry.mesh_bounds("quad").expect("quad registered");
        assert_eq!(bounds.size().x, 1.0);
        assert!(registry.gpu_mesh("quad").is_none());
        assert!(!registry.has("missing"));
    }
}
