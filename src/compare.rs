//! Visual QA: difference images between two composites.

use std::path::Path;

use image::{RgbaImage, imageops};

use crate::{
    assets::decode::read_raster,
    foundation::diag::{ComposeReport, Diagnostic},
    foundation::error::ComposeResult,
    foundation::math::mul_div255_u8,
};

/// Comparison controls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompareOptions {
    /// Square and brighten the difference, pushing it toward red.
    pub enhance: bool,
    /// Emit `[a | b | diff]` side by side instead of the bare difference.
    pub side_by_side: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            enhance: true,
            side_by_side: false,
        }
    }
}

/// Summary of the raw (unenhanced) per-channel difference.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CompareStats {
    /// Pixels where any channel differs.
    pub differing_pixels: u64,
    /// Largest absolute channel difference.
    pub max_channel_delta: u8,
    /// Mean absolute difference over all RGBA channels.
    pub mean_abs_error: f64,
}

impl CompareStats {
    /// `true` when the two images are pixel-identical.
    pub fn is_identical(&self) -> bool {
        self.differing_pixels == 0
    }
}

/// Output of [`compare_images`].
#[derive(Clone, Debug)]
pub struct Comparison {
    /// Difference image (or the side-by-side strip).
    pub image: RgbaImage,
    /// Difference summary.
    pub stats: CompareStats,
    /// DimensionMismatch, if `b` had to be resized.
    pub report: ComposeReport,
}

/// Compare `a` against `b`; `b` is resized to `a` when their sizes differ.
///
/// The difference image is opaque so it stays viewable when both inputs are opaque.
pub fn compare_images(a: &RgbaImage, b: &RgbaImage, options: &CompareOptions) -> Comparison {
    let mut report = ComposeReport::default();
    let resized;
    let b = if a.dimensions() == b.dimensions() {
        b
    } else {
        report.push(Diagnostic::DimensionMismatch {
            expected: a.dimensions(),
            actual: b.dimensions(),
        });
        resized = imageops::resize(b, a.width(), a.height(), imageops::FilterType::CatmullRom);
        &resized
    };

    let (width, height) = a.dimensions();
    let mut diff = RgbaImage::new(width, height);
    let mut stats = CompareStats::default();
    let mut total: u64 = 0;

    for ((pa, pb), out) in a.pixels().zip(b.pixels()).zip(diff.pixels_mut()) {
        let d: [u8; 4] = std::array::from_fn(|c| pa.0[c].abs_diff(pb.0[c]));
        if d.iter().any(|&v| v != 0) {
            stats.differing_pixels += 1;
        }
        for &v in &d {
            stats.max_channel_delta = stats.max_channel_delta.max(v);
            total += u64::from(v);
        }
        out.0 = if options.enhance {
            enhance([d[0], d[1], d[2]])
        } else {
            [d[0], d[1], d[2], 255]
        };
    }

    let channels = u64::from(width) * u64::from(height) * 4;
    if channels > 0 {
        stats.mean_abs_error = total as f64 / channels as f64;
    }

    let image = if options.side_by_side {
        side_by_side(a, b, &diff)
    } else {
        diff
    };
    Comparison {
        image,
        stats,
        report,
    }
}

/// Read two raster files and compare them.
pub fn compare_files(a: &Path, b: &Path, options: &CompareOptions) -> ComposeResult<Comparison> {
    let a = read_raster(a)?;
    let b = read_raster(b)?;
    Ok(compare_images(&a, &b, options))
}

fn enhance(rgb: [u8; 3]) -> [u8; 4] {
    let boosted = rgb.map(|d| {
        let sq = mul_div255_u8(u16::from(d), u16::from(d));
        sq.saturating_mul(2)
    });
    [
        boosted[0].saturating_mul(2),
        boosted[1] / 2,
        boosted[2] / 2,
        255,
    ]
}

fn side_by_side(a: &RgbaImage, b: &RgbaImage, diff: &RgbaImage) -> RgbaImage {
    let (w, h) = a.dimensions();
    let mut strip = RgbaImage::new(w.saturating_mul(3), h);
    for (i, img) in [a, b, diff].into_iter().enumerate() {
        imageops::replace(&mut strip, img, i64::from(w) * i as i64, 0);
    }
    strip
}

#[cfg(test)]
#[path = "../tests/unit/compare.rs"]
mod tests;
