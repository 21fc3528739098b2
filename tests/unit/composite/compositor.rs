use image::Rgba;

use super::*;

fn solid(w: u32, h: u32, px: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(w, h, Rgba(px))
}

fn checker(w: u32, h: u32) -> RgbaImage {
    RgbaImage::from_fn(w, h, |x, y| {
        let v = ((x * 37 + y * 91) % 256) as u8;
        Rgba([v, 255 - v, v / 2, 64 + v / 2])
    })
}

#[test]
fn transparent_top_leaves_canvas_unchanged() {
    let base = checker(8, 6);
    let top = solid(8, 6, [200, 10, 10, 0]);
    for mode in BlendMode::ALL {
        assert_eq!(composite(&base, &top, (0, 0), mode, 1.0), base, "{mode}");
    }
}

#[test]
fn opaque_normal_top_replaces_covered_region() {
    let base = checker(8, 8);
    let top = RgbaImage::from_fn(4, 4, |x, y| Rgba([x as u8 * 40, y as u8 * 40, 7, 255]));
    let out = composite(&base, &top, (2, 3), BlendMode::Normal, 1.0);
    for y in 0..8 {
        for x in 0..8 {
            let inside = (2..6).contains(&x) && (3..7).contains(&y);
            let expected = if inside {
                *top.get_pixel(x - 2, y - 3)
            } else {
                *base.get_pixel(x, y)
            };
            assert_eq!(*out.get_pixel(x, y), expected, "({x},{y})");
        }
    }
}

#[test]
fn input_canvas_is_not_mutated() {
    let base = solid(4, 4, [0, 0, 0, 255]);
    let snapshot = base.clone();
    let _ = composite(&base, &solid(4, 4, [255, 255, 255, 255]), (0, 0), BlendMode::Screen, 1.0);
    assert_eq!(base, snapshot);
}

#[test]
fn empty_or_off_canvas_top_is_noop() {
    let base = checker(5, 5);
    let empty = RgbaImage::new(0, 3);
    assert_eq!(composite(&base, &empty, (0, 0), BlendMode::Normal, 1.0), base);

    let top = solid(2, 2, [255, 0, 0, 255]);
    assert_eq!(composite(&base, &top, (5, 0), BlendMode::Normal, 1.0), base);
    assert_eq!(composite(&base, &top, (-2, 0), BlendMode::Normal, 1.0), base);
    assert_eq!(composite(&base, &top, (0, 40), BlendMode::Normal, 1.0), base);

    let mut canvas = base.clone();
    assert!(!composite_in_place(&mut canvas, &top, (-10, -10), BlendMode::Normal, 1.0));
}

#[test]
fn partially_off_canvas_is_clipped_not_resized() {
    let base = solid(4, 4, [0, 0, 0, 0]);
    let top = RgbaImage::from_fn(4, 4, |x, y| Rgba([x as u8 * 10, y as u8 * 10, 0, 255]));
    let out = composite(&base, &top, (-2, -1), BlendMode::Normal, 1.0);
    // canvas (0,0) shows top (2,1)
    assert_eq!(*out.get_pixel(0, 0), Rgba([20, 10, 0, 255]));
    assert_eq!(*out.get_pixel(1, 2), Rgba([30, 30, 0, 255]));
    // column 2 is outside the top image
    assert_eq!(*out.get_pixel(2, 0), Rgba([0, 0, 0, 0]));
    assert_eq!(*out.get_pixel(0, 3), Rgba([0, 0, 0, 0]));
}

#[test]
fn opacity_scales_top_alpha() {
    let base = solid(1, 1, [255, 0, 0, 255]);
    let top = solid(1, 1, [0, 0, 255, 255]);
    let out = composite(&base, &top, (0, 0), BlendMode::Normal, 128.0 / 255.0);
    let px = out.get_pixel(0, 0).0;
    assert_eq!(px[3], 255);
    assert!((126..=128).contains(&px[0]), "{px:?}");
    assert!((127..=129).contains(&px[2]), "{px:?}");

    let none = composite(&base, &top, (0, 0), BlendMode::Normal, 0.0);
    assert_eq!(none, base);
}

#[test]
fn blend_modes_use_formula_over_opaque_base() {
    let base = solid(1, 1, [255, 128, 0, 255]);
    let top = solid(1, 1, [128, 128, 128, 255]);
    let out = composite(&base, &top, (0, 0), BlendMode::Multiply, 1.0);
    assert_eq!(out.get_pixel(0, 0).0, [128, 64, 0, 255]);

    let out = composite(&base, &top, (0, 0), BlendMode::Darken, 1.0);
    assert_eq!(out.get_pixel(0, 0).0, [128, 128, 0, 255]);
}

#[test]
fn blend_over_empty_canvas_uses_raw_base_rgb() {
    let base = solid(1, 1, [0, 0, 0, 0]);
    let red = solid(1, 1, [255, 0, 0, 255]);

    // base RGB is black even where the canvas is empty
    let out = composite(&base, &red, (0, 0), BlendMode::Multiply, 1.0);
    assert_eq!(out.get_pixel(0, 0).0, [0, 0, 0, 255]);
    let out = composite(&base, &red, (0, 0), BlendMode::Darken, 1.0);
    assert_eq!(out.get_pixel(0, 0).0, [0, 0, 0, 255]);

    let top = solid(1, 1, [90, 160, 220, 255]);
    for mode in [BlendMode::Normal, BlendMode::Screen, BlendMode::Lighten] {
        let out = composite(&base, &top, (0, 0), mode, 1.0);
        assert_eq!(out.get_pixel(0, 0).0, [90, 160, 220, 255], "{mode}");
    }
}

#[test]
fn blend_over_translucent_base_then_source_over() {
    let base = solid(1, 1, [200, 100, 50, 128]);
    let top = solid(1, 1, [128, 128, 128, 255]);
    let out = composite(&base, &top, (0, 0), BlendMode::Multiply, 1.0);
    // opaque top: source-over returns the blended color as is
    assert_eq!(out.get_pixel(0, 0).0, [100, 50, 25, 255]);
}

#[test]
fn transparent_canvas_matches_size() {
    let c = transparent_canvas(CanvasSize::new(7, 3).unwrap());
    assert_eq!(c.dimensions(), (7, 3));
    assert!(c.pixels().all(|p| p.0 == [0, 0, 0, 0]));
}
