use image::RgbaImage;

use super::*;
use crate::foundation::core::Geometry;
use crate::tree::build::{DocumentSpec, LayerSpec};

fn g() -> Geometry {
    Geometry::new(1, 2, 2, 2)
}

fn tree(layers: Vec<LayerSpec>) -> LayerTree {
    DocumentSpec {
        name: "d".to_string(),
        width: 4,
        height: 4,
        layers,
    }
    .build()
    .unwrap()
    .0
}

fn store(paths: &[&str]) -> RasterStore {
    let mut s = RasterStore::new();
    for p in paths {
        s.insert(*p, RgbaImage::new(2, 2));
    }
    s
}

fn compile(t: &LayerTree, s: &RasterStore) -> (PaintPlan, ComposeReport) {
    PaintPlan::compile(t, s, &ComposeOptions::default())
}

#[test]
fn hidden_nodes_are_dropped_silently() {
    let t = tree(vec![
        LayerSpec::leaf("a", g()).with_visible(false),
        LayerSpec::group("grp", vec![LayerSpec::leaf("b", g())]).with_visible(false),
        LayerSpec::leaf("c", g()),
    ]);
    let (plan, report) = compile(&t, &store(&["a", "grp/b", "c"]));
    assert!(report.is_clean());
    assert_eq!(plan.paint_order(), vec!["c"]);
}

#[test]
fn missing_raster_is_reported_and_skipped() {
    let t = tree(vec![LayerSpec::leaf("a", g()), LayerSpec::leaf("b", g())]);
    let mut s = store(&["b"]);
    s.mark_failed("a", "bad png");
    let (plan, report) = compile(&t, &s);
    assert_eq!(plan.paint_order(), vec!["b"]);
    assert_eq!(
        report.diagnostics(),
        &[Diagnostic::MissingAsset {
            path: "a".to_string(),
            reason: "bad png".to_string()
        }]
    );
}

#[test]
fn opaque_pass_through_is_inlined() {
    let t = tree(vec![LayerSpec::group(
        "grp",
        vec![LayerSpec::leaf("a", g()).with_opacity(51).with_blend("MULTIPLY")],
    )]);
    let (plan, _) = compile(&t, &store(&["grp/a"]));
    match &plan.ops[..] {
        [PaintOp::Paint { path, mode, opacity, origin }] => {
            assert_eq!(path, "grp/a");
            assert_eq!(*mode, BlendMode::Multiply);
            assert!((opacity - 0.2).abs() < 1e-6);
            assert_eq!(*origin, (1, 2));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn translucent_pass_through_keeps_group_opacity_on_the_group() {
    let t = tree(vec![
        LayerSpec::group("half", vec![LayerSpec::leaf("a", g()), LayerSpec::leaf("b", g())])
            .with_opacity(51),
        LayerSpec::group("gone", vec![LayerSpec::leaf("c", g()).with_visible(false)])
            .with_opacity(51),
    ]);
    let s = store(&["half/a", "half/b", "gone/c"]);
    let (plan, _) = compile(&t, &s);
    match &plan.ops[..] {
        [PaintOp::PassThrough { path, opacity, ops }] => {
            assert_eq!(path, "half");
            assert!((opacity - 0.2).abs() < 1e-6);
            assert_eq!(ops.len(), 2);
            assert!(ops.iter().all(|op| matches!(
                op,
                PaintOp::Paint { opacity, .. } if *opacity == 1.0
            )));
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(plan.paint_order(), vec!["half/a", "half/b"]);
    assert!(plan.to_string().contains("group half PASS_THROUGH opacity=0.200"));
}

#[test]
fn non_pass_through_group_is_isolated() {
    let t = tree(vec![
        LayerSpec::group("grp", vec![LayerSpec::leaf("a", g()), LayerSpec::leaf("b", g())])
            .with_blend("SCREEN")
            .with_opacity(255),
    ]);
    let (plan, _) = compile(&t, &store(&["grp/a", "grp/b"]));
    match &plan.ops[..] {
        [PaintOp::Isolated { path, mode, ops, opacity }] => {
            assert_eq!(path, "grp");
            assert_eq!(*mode, BlendMode::Screen);
            assert_eq!(*opacity, 1.0);
            assert_eq!(ops.len(), 2);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(plan.paint_order(), vec!["grp/a", "grp/b"]);
    assert!(plan.to_string().contains("group grp SCREEN"));
}

#[test]
fn isolated_group_without_paints_is_omitted() {
    let t = tree(vec![LayerSpec::group(
        "grp",
        vec![LayerSpec::leaf("a", g()).with_visible(false)],
    )
    .with_blend("MULTIPLY")]);
    let (plan, report) = compile(&t, &store(&[]));
    assert!(plan.ops.is_empty());
    assert!(report.is_clean());
}

#[test]
fn group_rasters_replace_recursion_when_enabled() {
    let t = tree(vec![
        LayerSpec::group("grp", vec![LayerSpec::leaf("a", g())]),
        LayerSpec::group("empty", vec![]).with_blend("OVERLAY"),
    ]);
    let s = store(&["grp", "grp/a", "empty"]);

    let (plan, _) = compile(&t, &s);
    assert_eq!(plan.paint_order(), vec!["grp/a", "empty"]);

    let opts = ComposeOptions {
        use_group_rasters: true,
        ..ComposeOptions::default()
    };
    let (plan, _) = PaintPlan::compile(&t, &s, &opts);
    assert_eq!(plan.paint_order(), vec!["grp", "empty"]);
    match &plan.ops[0] {
        PaintOp::Paint { mode, .. } => assert_eq!(*mode, BlendMode::Normal),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(plan.paint_count(), 2);
}
