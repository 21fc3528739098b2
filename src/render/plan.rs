use std::fmt;

use crate::{
    assets::store::RasterStore,
    blend::mode::BlendMode,
    foundation::core::CanvasSize,
    foundation::diag::{ComposeReport, Diagnostic},
    foundation::math::opacity_factor,
    render::pipeline::ComposeOptions,
    tree::model::{LayerNode, LayerTree},
};

/// One step of a [`PaintPlan`].
#[derive(Clone, Debug, PartialEq)]
pub enum PaintOp {
    /// Composite the raster stored under `path` onto the current canvas.
    Paint {
        /// Raster key (node path).
        path: String,
        /// Placement of the raster's top-left pixel.
        origin: (i32, i32),
        /// Blend mode used for the merge.
        mode: BlendMode,
        /// Layer opacity in `[0, 1]`.
        opacity: f32,
    },
    /// Paint `ops` onto a copy of the current canvas, then merge that copy back with NORMAL.
    ///
    /// Used for pass-through groups below full opacity, so the group opacity is applied once
    /// to the group result rather than to each child.
    PassThrough {
        /// Path of the group.
        path: String,
        /// Group opacity in `[0, 1]`.
        opacity: f32,
        /// Ops painted against the parent's canvas, bottom first.
        ops: Vec<PaintOp>,
    },
    /// Paint `ops` onto a fresh transparent canvas, then merge that canvas as one layer.
    Isolated {
        /// Path of the group.
        path: String,
        /// Blend mode used for the merge.
        mode: BlendMode,
        /// Group opacity in `[0, 1]`.
        opacity: f32,
        /// Ops of the group-local canvas, bottom first.
        ops: Vec<PaintOp>,
    },
}

/// Ordered paint instructions for one document.
///
/// Hidden nodes and nodes without a raster are already removed. Fully opaque pass-through
/// groups are flattened into their parent's op list.
#[derive(Clone, Debug, PartialEq)]
pub struct PaintPlan {
    /// Target canvas size.
    pub size: CanvasSize,
    /// Root op list, bottom first.
    pub ops: Vec<PaintOp>,
}

impl PaintPlan {
    /// Turn a tree into paint ops, reporting every visible node that has to be skipped.
    pub fn compile(
        tree: &LayerTree,
        store: &RasterStore,
        options: &ComposeOptions,
    ) -> (PaintPlan, ComposeReport) {
        let mut cx = CompileCx {
            store,
            use_group_rasters: options.use_group_rasters,
            report: ComposeReport::default(),
        };
        let mut ops = Vec::new();
        cx.siblings(tree.roots(), 0, &mut ops);
        (
            PaintPlan {
                size: tree.size(),
                ops,
            },
            cx.report,
        )
    }

    /// Number of `Paint` ops at any depth.
    pub fn paint_count(&self) -> usize {
        fn count(ops: &[PaintOp]) -> usize {
            ops.iter()
                .map(|op| match op {
                    PaintOp::Paint { .. } => 1,
                    PaintOp::PassThrough { ops, .. } | PaintOp::Isolated { ops, .. } => {
                        count(ops)
                    }
                })
                .sum()
        }
        count(&self.ops)
    }

    /// Raster keys in paint order (isolated groups expanded in place).
    pub fn paint_order(&self) -> Vec<&str> {
        fn collect<'a>(ops: &'a [PaintOp], out: &mut Vec<&'a str>) {
            for op in ops {
                match op {
                    PaintOp::Paint { path, .. } => out.push(path),
                    PaintOp::PassThrough { ops, .. } | PaintOp::Isolated { ops, .. } => {
                        collect(ops, out)
                    }
                }
            }
        }
        let mut out = Vec::new();
        collect(&self.ops, &mut out);
        out
    }
}

struct CompileCx<'a> {
    store: &'a RasterStore,
    use_group_rasters: bool,
    report: ComposeReport,
}

impl CompileCx<'_> {
    fn siblings(&mut self, nodes: &[LayerNode], depth: usize, out: &mut Vec<PaintOp>) {
        for node in nodes {
            self.node(node, depth, out);
        }
    }

    fn node(&mut self, node: &LayerNode, depth: usize, out: &mut Vec<PaintOp>) {
        if !node.is_visible() {
            tracing::debug!(path = node.path(), "hidden; skipped");
            return;
        }
        let opacity = opacity_factor(node.opacity());

        if !node.is_group() {
            if self.store.contains(node.path()) {
                out.push(self.paint(node, node.blend_mode(), opacity, depth));
            } else {
                self.report.push(Diagnostic::MissingAsset {
                    path: node.path().to_string(),
                    reason: self.store.missing_reason(node.path()),
                });
            }
            return;
        }

        let has_raster = self.store.contains(node.path());
        if has_raster && (self.use_group_rasters || node.children().is_empty()) {
            out.push(self.paint(node, node.blend_mode().merge_mode(), opacity, depth));
            return;
        }

        if node.blend_mode() == BlendMode::PassThrough && node.opacity() == u8::MAX {
            self.siblings(node.children(), depth + 1, out);
            return;
        }

        let mut ops = Vec::new();
        self.siblings(node.children(), depth + 1, &mut ops);
        if ops.is_empty() {
            return;
        }

        if node.blend_mode() == BlendMode::PassThrough {
            tracing::debug!(
                path = node.path(),
                depth,
                order_index = node.order_index(),
                opacity,
                "pass-through group"
            );
            out.push(PaintOp::PassThrough {
                path: node.path().to_string(),
                opacity,
                ops,
            });
            return;
        }

        tracing::debug!(
            path = node.path(),
            depth,
            order_index = node.order_index(),
            mode = node.blend_mode().as_str(),
            opacity,
            "isolate group"
        );
        out.push(PaintOp::Isolated {
            path: node.path().to_string(),
            mode: node.blend_mode(),
            opacity,
            ops,
        });
    }

    fn paint(&self, node: &LayerNode, mode: BlendMode, opacity: f32, depth: usize) -> PaintOp {
        tracing::debug!(
            path = node.path(),
            depth,
            order_index = node.order_index(),
            mode = mode.as_str(),
            opacity,
            "paint"
        );
        PaintOp::Paint {
            path: node.path().to_string(),
            origin: node.geometry().origin(),
            mode,
            opacity,
        }
    }
}

impl fmt::Display for PaintPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn write_ops(f: &mut fmt::Formatter<'_>, ops: &[PaintOp], indent: usize) -> fmt::Result {
            for op in ops {
                let pad = "  ".repeat(indent);
                match op {
                    PaintOp::Paint {
                        path,
                        origin,
                        mode,
                        opacity,
                    } => writeln!(
                        f,
                        "{pad}paint {path} at ({}, {}) {mode} opacity={opacity:.3}",
                        origin.0, origin.1
                    )?,
                    PaintOp::PassThrough { path, opacity, ops } => {
                        writeln!(f, "{pad}group {path} PASS_THROUGH opacity={opacity:.3}")?;
                        write_ops(f, ops, indent + 1)?;
                    }
                    PaintOp::Isolated {
                        path,
                        mode,
                        opacity,
                        ops,
                    } => {
                        writeln!(f, "{pad}group {path} {mode} opacity={opacity:.3}")?;
                        write_ops(f, ops, indent + 1)?;
                    }
                }
            }
            Ok(())
        }
        writeln!(f, "canvas {}x{}", self.size.width, self.size.height)?;
        write_ops(f, &self.ops, 0)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/plan.rs"]
mod tests;
