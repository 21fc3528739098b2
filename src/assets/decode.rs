use std::path::Path;

use anyhow::Context;
use image::RgbaImage;

use crate::foundation::error::{ComposeError, ComposeResult};

/// Decode encoded raster bytes (PNG) into straight-alpha RGBA8.
pub fn decode_raster(bytes: &[u8]) -> ComposeResult<RgbaImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode raster from memory")?;
    Ok(dyn_img.to_rgba8())
}

/// Read and decode a raster file.
pub fn read_raster(path: &Path) -> ComposeResult<RgbaImage> {
    let bytes = std::fs::read(path)
        .map_err(|e| ComposeError::asset(format!("read '{}': {e}", path.display())))?;
    decode_raster(&bytes)
        .map_err(|e| ComposeError::asset(format!("decode '{}': {e}", path.display())))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
