use std::path::Path;

use image::RgbaImage;
use sha2::Digest as _;

use crate::{
    assets::store::RasterStore,
    foundation::diag::ComposeReport,
    foundation::error::{ComposeError, ComposeResult},
    metadata::export_dir::load_document,
    render::execute::execute_plan,
    render::plan::PaintPlan,
    tree::model::LayerTree,
};

/// Composition controls.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ComposeOptions {
    /// Render independent isolated groups concurrently.
    pub parallel: bool,
    /// Optional explicit worker thread count for parallel runs.
    pub threads: Option<usize>,
    /// Paint groups from their materialized raster when one is available.
    pub use_group_rasters: bool,
}

impl ComposeOptions {
    /// Reject settings that can never work.
    pub fn validate(&self) -> ComposeResult<()> {
        if let Some(n) = self.threads
            && n == 0
        {
            return Err(ComposeError::validation(
                "compose options 'threads' must be >= 1 when set",
            ));
        }
        Ok(())
    }
}

/// Result of a composition run.
#[derive(Clone, Debug)]
pub struct Composed {
    /// Final straight-alpha RGBA8 canvas, sized to the document.
    pub canvas: RgbaImage,
    /// Every recoverable problem met on the way, in order.
    pub report: ComposeReport,
}

impl Composed {
    /// SHA-256 of the raw canvas bytes, lowercase hex.
    pub fn digest_hex(&self) -> String {
        canvas_digest(&self.canvas)
    }
}

/// Flatten `tree` using the rasters in `store`.
///
/// Pipeline:
/// 1. [`PaintPlan::compile`] drops hidden and raster-less nodes (reporting the latter).
/// 2. [`execute_plan`] paints the plan onto a transparent document-sized canvas.
#[tracing::instrument(skip_all, fields(doc = tree.name()))]
pub fn compose_tree(
    tree: &LayerTree,
    store: &RasterStore,
    options: &ComposeOptions,
) -> ComposeResult<Composed> {
    options.validate()?;
    let (plan, report) = PaintPlan::compile(tree, store, options);
    tracing::debug!(paints = plan.paint_count(), "compiled paint plan");

    let canvas = if options.parallel {
        let pool = build_thread_pool(options.threads)?;
        pool.install(|| execute_plan(&plan, store, true))
    } else {
        execute_plan(&plan, store, false)
    };

    Ok(Composed { canvas, report })
}

/// Load an exporter directory (or tree JSON file) and flatten it.
///
/// Load-time diagnostics come first in the returned report.
#[tracing::instrument(skip_all, fields(input = %input.display()))]
pub fn compose_export_dir(
    input: &Path,
    raster_root: Option<&Path>,
    options: &ComposeOptions,
) -> ComposeResult<Composed> {
    options.validate()?;
    let loaded = load_document(input, raster_root, options.use_group_rasters)?;
    let composed = compose_tree(&loaded.tree, &loaded.rasters, options)?;

    let mut report = loaded.report;
    report.absorb(composed.report);
    Ok(Composed {
        canvas: composed.canvas,
        report,
    })
}

/// SHA-256 of raw RGBA bytes, lowercase hex.
pub fn canvas_digest(canvas: &RgbaImage) -> String {
    let digest = sha2::Sha256::digest(canvas.as_raw());
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

fn build_thread_pool(threads: Option<usize>) -> ComposeResult<rayon::ThreadPool> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ComposeError::validation(format!("failed to build rayon thread pool: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
