use std::{collections::HashMap, sync::Arc};

use image::RgbaImage;

/// Raster payloads keyed by node path.
///
/// Besides decoded images the store remembers why a payload could not be loaded, so the
/// scheduler can report one precise MissingAsset diagnostic per skipped node.
#[derive(Clone, Debug, Default)]
pub struct RasterStore {
    rasters: HashMap<String, Arc<RgbaImage>>,
    failures: HashMap<String, String>,
}

impl RasterStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) the raster for `path`.
    pub fn insert(&mut self, path: impl Into<String>, raster: RgbaImage) {
        self.insert_shared(path, Arc::new(raster));
    }

    /// Insert an already shared raster.
    pub fn insert_shared(&mut self, path: impl Into<String>, raster: Arc<RgbaImage>) {
        let path = path.into();
        self.failures.remove(&path);
        self.rasters.insert(path, raster);
    }

    /// Record that the payload for `path` exists but could not be decoded.
    pub fn mark_failed(&mut self, path: impl Into<String>, reason: impl Into<String>) {
        let path = path.into();
        self.rasters.remove(&path);
        self.failures.insert(path, reason.into());
    }

    /// Raster for `path`, if loaded.
    pub fn get(&self, path: &str) -> Option<&Arc<RgbaImage>> {
        self.rasters.get(path)
    }

    /// `true` when a raster for `path` is loaded.
    pub fn contains(&self, path: &str) -> bool {
        self.rasters.contains_key(path)
    }

    /// Explanation for an absent raster.
    pub fn missing_reason(&self, path: &str) -> String {
        self.failures
            .get(path)
            .cloned()
            .unwrap_or_else(|| "no raster payload for this path".to_string())
    }

    /// Number of loaded rasters.
    pub fn len(&self) -> usize {
        self.rasters.len()
    }

    /// `true` when no raster is loaded.
    pub fn is_empty(&self) -> bool {
        self.rasters.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
