use image::RgbaImage;

use crate::{
    blend::{algebra::channel_fn, mode::BlendMode},
    composite::over::over,
    foundation::core::CanvasSize,
    foundation::math::scale_alpha,
};

/// Allocate a fully transparent canvas.
pub fn transparent_canvas(size: CanvasSize) -> RgbaImage {
    RgbaImage::new(size.width, size.height)
}

/// Merge `top` onto a copy of `canvas` and return the copy.
///
/// `origin` places the top image's top-left pixel in canvas coordinates; pixels falling outside
/// the canvas are dropped. `opacity` in `[0, 1]` scales the top alpha before compositing. An
/// empty top image, or one placed entirely off-canvas, returns the canvas unchanged.
pub fn composite(
    canvas: &RgbaImage,
    top: &RgbaImage,
    origin: (i32, i32),
    mode: BlendMode,
    opacity: f32,
) -> RgbaImage {
    let mut out = canvas.clone();
    composite_in_place(&mut out, top, origin, mode, opacity);
    out
}

/// In-place form of [`composite`] used by the render executor, which owns its canvases.
///
/// Returns `false` when nothing could be painted (empty or fully clipped top image).
pub fn composite_in_place(
    canvas: &mut RgbaImage,
    top: &RgbaImage,
    origin: (i32, i32),
    mode: BlendMode,
    opacity: f32,
) -> bool {
    let Some(span) = ClipSpan::new(canvas.dimensions(), top.dimensions(), origin) else {
        return false;
    };

    // Dispatch once per layer, not per pixel.
    let blend = channel_fn(mode);
    let plain = matches!(mode, BlendMode::Normal | BlendMode::PassThrough);

    for row in 0..span.rows {
        let ty = span.top_y + row;
        let cy = span.canvas_y + row;
        for col in 0..span.cols {
            let t = top.get_pixel(span.top_x + col, ty).0;
            let alpha = scale_alpha(t[3], opacity);
            if alpha == 0 {
                continue;
            }

            let dst = canvas.get_pixel_mut(span.canvas_x + col, cy);
            let base = dst.0;
            let mut src = [t[0], t[1], t[2], alpha];
            // Blend on raw RGB; alpha only enters through source-over below.
            if !plain {
                for c in 0..3 {
                    src[c] = blend(base[c], t[c]);
                }
            }
            dst.0 = over(base, src);
        }
    }
    true
}

/// Overlap of a placed top image with the canvas, in both coordinate spaces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ClipSpan {
    canvas_x: u32,
    canvas_y: u32,
    top_x: u32,
    top_y: u32,
    cols: u32,
    rows: u32,
}

impl ClipSpan {
    fn new(canvas: (u32, u32), top: (u32, u32), origin: (i32, i32)) -> Option<Self> {
        let (cx0, cols) = axis_overlap(canvas.0, top.0, origin.0)?;
        let (cy0, rows) = axis_overlap(canvas.1, top.1, origin.1)?;
        Some(Self {
            canvas_x: cx0,
            canvas_y: cy0,
            top_x: (i64::from(cx0) - i64::from(origin.0)) as u32,
            top_y: (i64::from(cy0) - i64::from(origin.1)) as u32,
            cols,
            rows,
        })
    }
}

/// `(canvas_start, len)` of the overlap on one axis, `None` when disjoint.
fn axis_overlap(canvas_len: u32, top_len: u32, origin: i32) -> Option<(u32, u32)> {
    let start = i64::from(origin).max(0);
    let end = (i64::from(origin) + i64::from(top_len)).min(i64::from(canvas_len));
    if end <= start {
        return None;
    }
    Some((start as u32, (end - start) as u32))
}

#[cfg(test)]
#[path = "../../tests/unit/composite/compositor.rs"]
mod tests;
