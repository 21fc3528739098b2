use image::RgbaImage;
use rayon::prelude::*;

use crate::{
    assets::store::RasterStore,
    blend::mode::BlendMode,
    composite::compositor::{composite_in_place, transparent_canvas},
    render::plan::{PaintOp, PaintPlan},
};

/// Run a plan on a fresh transparent canvas.
///
/// With `parallel`, the isolated groups of each op list are rendered concurrently on the
/// current rayon pool before that list is merged in order; the pixels are identical to the
/// sequential run.
pub fn execute_plan(plan: &PaintPlan, store: &RasterStore, parallel: bool) -> RgbaImage {
    let mut canvas = transparent_canvas(plan.size);
    run_ops(&mut canvas, &plan.ops, store, parallel);
    canvas
}

fn run_ops(canvas: &mut RgbaImage, ops: &[PaintOp], store: &RasterStore, parallel: bool) {
    let size = canvas.dimensions();

    let mut prerendered: Vec<Option<RgbaImage>> = if parallel {
        ops.par_iter()
            .map(|op| match op {
                PaintOp::Isolated { ops, .. } => Some(render_isolated(size, ops, store, true)),
                PaintOp::Paint { .. } | PaintOp::PassThrough { .. } => None,
            })
            .collect()
    } else {
        Vec::new()
    };

    for (i, op) in ops.iter().enumerate() {
        match op {
            PaintOp::Paint {
                path,
                origin,
                mode,
                opacity,
            } => {
                if let Some(raster) = store.get(path) {
                    composite_in_place(canvas, raster, *origin, *mode, *opacity);
                }
            }
            PaintOp::PassThrough {
                ops: inner,
                opacity,
                ..
            } => {
                // Children blend against the live canvas; the result merges back once.
                let mut local = canvas.clone();
                run_ops(&mut local, inner, store, parallel);
                composite_in_place(canvas, &local, (0, 0), BlendMode::Normal, *opacity);
            }
            PaintOp::Isolated {
                ops: inner,
                mode,
                opacity,
                ..
            } => {
                let local = match prerendered.get_mut(i).and_then(Option::take) {
                    Some(img) => img,
                    None => render_isolated(size, inner, store, parallel),
                };
                composite_in_place(canvas, &local, (0, 0), *mode, *opacity);
            }
        }
    }
}

fn render_isolated(
    (width, height): (u32, u32),
    ops: &[PaintOp],
    store: &RasterStore,
    parallel: bool,
) -> RgbaImage {
    let mut local = RgbaImage::new(width, height);
    run_ops(&mut local, ops, store, parallel);
    local
}

#[cfg(test)]
#[path = "../../tests/unit/render/execute.rs"]
mod tests;
