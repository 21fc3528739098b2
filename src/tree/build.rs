use std::collections::{BTreeMap, BTreeSet};

use crate::{
    blend::mode::BlendMode,
    foundation::core::{CanvasSize, Geometry},
    foundation::diag::{ComposeReport, Diagnostic},
    foundation::error::ComposeResult,
    tree::model::{LayerKind, LayerNode, LayerTree},
};

/// A document as handed over by a layered-document parser.
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentSpec {
    /// Document name.
    pub name: String,
    /// Canvas width.
    pub width: u32,
    /// Canvas height.
    pub height: u32,
    /// Root layers, bottom-most first.
    pub layers: Vec<LayerSpec>,
}

/// One parsed layer, before paths and indices are assigned.
///
/// Sibling order in `children` (and in [`DocumentSpec::layers`]) is the document's bottom-to-top
/// order; it becomes `order_index`.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerSpec {
    /// Display name.
    pub name: String,
    /// Visibility flag.
    pub visible: bool,
    /// Opacity 0..=255.
    pub opacity: u8,
    /// Raw blend mode string as the parser reported it.
    pub blend_mode: String,
    /// Pixel bounds.
    pub geometry: Geometry,
    /// Source layer class, e.g. `"PixelLayer"`.
    pub layer_type: Option<String>,
    /// `Some` for groups (possibly empty), `None` for leaves.
    pub children: Option<Vec<LayerSpec>>,
}

impl LayerSpec {
    /// Visible, fully opaque, normal-mode leaf.
    pub fn leaf(name: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            name: name.into(),
            visible: true,
            opacity: 255,
            blend_mode: BlendMode::Normal.metadata_name(),
            geometry,
            layer_type: Some("PixelLayer".to_string()),
            children: None,
        }
    }

    /// Visible pass-through group whose bounds are the union of its children.
    pub fn group(name: impl Into<String>, children: Vec<LayerSpec>) -> Self {
        let geometry = union_bounds(children.iter().map(|c| c.geometry));
        Self {
            name: name.into(),
            visible: true,
            opacity: 255,
            blend_mode: BlendMode::PassThrough.metadata_name(),
            geometry,
            layer_type: Some("Group".to_string()),
            children: Some(children),
        }
    }

    /// Set the visibility flag.
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Set opacity (0..=255).
    pub fn with_opacity(mut self, opacity: u8) -> Self {
        self.opacity = opacity;
        self
    }

    /// Set the raw blend mode string.
    pub fn with_blend(mut self, raw: impl Into<String>) -> Self {
        self.blend_mode = raw.into();
        self
    }

    /// Set bounds explicitly.
    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = geometry;
        self
    }
}

impl DocumentSpec {
    /// Build the immutable tree.
    ///
    /// Fails only when the canvas size is zero. Unknown blend modes become `Normal` and are
    /// reported in the returned [`ComposeReport`].
    pub fn build(&self) -> ComposeResult<(LayerTree, ComposeReport)> {
        let size = CanvasSize::new(self.width, self.height)?;
        let mut report = ComposeReport::default();
        let roots = build_siblings(&self.layers, None, &mut report);
        Ok((
            LayerTree {
                name: self.name.clone(),
                size,
                roots,
            },
            report,
        ))
    }
}

fn build_siblings(
    specs: &[LayerSpec],
    parent_path: Option<&str>,
    report: &mut ComposeReport,
) -> Vec<LayerNode> {
    let parent_segment = parent_path.map(last_segment);
    let mut table = SegmentTable::default();
    let mut out = Vec::with_capacity(specs.len());

    for (index, spec) in specs.iter().enumerate() {
        let (next, segment) = table.claim(&spec.name, parent_segment);
        table = next;
        let path = join_path(parent_path, &segment);

        let resolved = BlendMode::resolve(Some(&spec.blend_mode));
        if let Some(raw) = resolved.unrecognized {
            report.push(Diagnostic::UnknownBlendMode {
                path: path.clone(),
                raw,
            });
        }

        let kind = match &spec.children {
            None => LayerKind::Leaf,
            Some(children) => LayerKind::Group {
                children: build_siblings(children, Some(&path), report),
            },
        };

        out.push(LayerNode {
            name: spec.name.clone(),
            path,
            geometry: spec.geometry,
            visible: spec.visible,
            opacity: spec.opacity,
            blend_mode: resolved.mode,
            order_index: u32::try_from(index).unwrap_or(u32::MAX),
            layer_type: spec.layer_type.clone(),
            kind,
        });
    }
    out
}

/// Per-parent table of claimed path segments.
///
/// A fresh table is used for every sibling list and threaded through by value, so
/// disambiguation of one parent never depends on another.
#[derive(Clone, Debug, Default)]
pub(crate) struct SegmentTable {
    used: BTreeSet<String>,
    suffixes: BTreeMap<String, u32>,
}

impl SegmentTable {
    /// Claim a unique segment for `name` under a parent whose own segment is `parent`.
    ///
    /// The sanitized name is kept when free; a repeat of an earlier sibling, or of the parent's
    /// own name, becomes `name_sub_1`, `name_sub_2`, ...
    pub(crate) fn claim(mut self, name: &str, parent: Option<&str>) -> (Self, String) {
        let base = sanitize_segment(name);
        let clashes = self.used.contains(&base) || parent == Some(base.as_str());

        let segment = if clashes {
            let mut n = self.suffixes.get(&base).copied().unwrap_or(0);
            loop {
                n += 1;
                let candidate = format!("{base}_sub_{n}");
                if !self.used.contains(&candidate) {
                    self.suffixes.insert(base.clone(), n);
                    break candidate;
                }
            }
        } else {
            base
        };

        self.used.insert(segment.clone());
        (self, segment)
    }
}

/// Replace path separators in a display name; empty names become `unnamed`.
pub(crate) fn sanitize_segment(name: &str) -> String {
    let s: String = name
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    if s.is_empty() { "unnamed".to_string() } else { s }
}

pub(crate) fn join_path(parent: Option<&str>, segment: &str) -> String {
    match parent {
        Some(p) => format!("{p}/{segment}"),
        None => segment.to_string(),
    }
}

pub(crate) fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn union_bounds(items: impl Iterator<Item = Geometry>) -> Geometry {
    let mut acc: Option<(i64, i64, i64, i64)> = None;
    for g in items.filter(|g| !g.is_empty()) {
        let (l, t, r, b) = (i64::from(g.left), i64::from(g.top), g.right(), g.bottom());
        acc = Some(match acc {
            None => (l, t, r, b),
            Some((al, at, ar, ab)) => (al.min(l), at.min(t), ar.max(r), ab.max(b)),
        });
    }
    match acc {
        None => Geometry::default(),
        Some((l, t, r, b)) => Geometry::new(
            l as i32,
            t as i32,
            u32::try_from(r - l).unwrap_or(u32::MAX),
            u32::try_from(b - t).unwrap_or(u32::MAX),
        ),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tree/build.rs"]
mod tests;
