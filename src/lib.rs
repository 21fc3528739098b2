//! psd-compose re-composites exported PSD layer rasters into one flattened image.
//!
//! The input is a layer tree (names, paths, geometry, visibility, opacity, blend mode,
//! sibling order) plus one straight-alpha RGBA raster per layer. The output is the canvas a
//! PSD renderer would show:
//!
//! - Build a [`LayerTree`] from a [`DocumentSpec`], from flat [`LayerRecord`]s, or by loading
//!   an exporter directory with [`load_document`]
//! - Collect rasters in a [`RasterStore`]
//! - Call [`compose_tree`] (or [`compose_export_dir`]) to get the canvas and a
//!   [`ComposeReport`] of recoverable problems
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Blend modes and their per-channel formulas.
pub mod blend;
/// Placing one raster onto a canvas.
pub mod composite;
/// Layer tree model and its construction.
pub mod tree;
/// Exporter metadata on disk.
pub mod metadata;
/// Raster payloads.
pub mod assets;
/// Paint-order compilation and execution.
pub mod render;

pub mod compare;

pub use crate::assets::decode::{decode_raster, read_raster};
pub use crate::assets::store::RasterStore;
pub use crate::blend::mode::BlendMode;
pub use crate::compare::{CompareOptions, CompareStats, Comparison, compare_files, compare_images};
pub use crate::composite::compositor::{composite, composite_in_place, transparent_canvas};
pub use crate::foundation::core::{CanvasSize, Geometry};
pub use crate::foundation::diag::{ComposeReport, Diagnostic};
pub use crate::foundation::error::{ComposeError, ComposeResult};
pub use crate::metadata::export_dir::{
    LoadedDocument, load_document, load_export_dir, load_tree_json,
};
pub use crate::metadata::records::{DocumentRecord, LayerRecord};
pub use crate::render::pipeline::{
    ComposeOptions, Composed, canvas_digest, compose_export_dir, compose_tree,
};
pub use crate::render::plan::{PaintOp, PaintPlan};
pub use crate::tree::build::{DocumentSpec, LayerSpec};
pub use crate::tree::model::{LayerKind, LayerNode, LayerTree, NodeKind};
pub use crate::tree::stats::{TreeStats, WalkEntry};
