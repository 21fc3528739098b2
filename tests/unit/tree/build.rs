use super::*;

fn g() -> Geometry {
    Geometry::new(0, 0, 2, 2)
}

fn doc(layers: Vec<LayerSpec>) -> DocumentSpec {
    DocumentSpec {
        name: "doc.psd".to_string(),
        width: 4,
        height: 4,
        layers,
    }
}

#[test]
fn duplicate_siblings_get_sub_suffixes() {
    let (tree, report) = doc(vec![
        LayerSpec::leaf("Layer", g()),
        LayerSpec::leaf("Layer", g()),
        LayerSpec::leaf("Layer", g()),
    ])
    .build()
    .unwrap();
    let paths: Vec<&str> = tree.roots().iter().map(|n| n.path()).collect();
    assert_eq!(paths, vec!["Layer", "Layer_sub_1", "Layer_sub_2"]);
    assert!(tree.roots().iter().all(|n| n.name() == "Layer"));
    assert!(report.is_clean());
}

#[test]
fn child_named_like_parent_is_disambiguated() {
    let (tree, _) = doc(vec![LayerSpec::group(
        "Hair",
        vec![LayerSpec::leaf("Hair", g()), LayerSpec::leaf("Hair", g())],
    )])
    .build()
    .unwrap();
    let paths: Vec<&str> = tree.walk().map(|(n, _)| n.path()).collect();
    assert_eq!(paths, vec!["Hair", "Hair/Hair_sub_1", "Hair/Hair_sub_2"]);
}

#[test]
fn suffix_skips_names_already_taken() {
    let table = SegmentTable::default();
    let (table, a) = table.claim("x_sub_1", None);
    let (table, b) = table.claim("x", None);
    let (_, c) = table.claim("x", None);
    assert_eq!((a.as_str(), b.as_str(), c.as_str()), ("x_sub_1", "x", "x_sub_2"));
}

#[test]
fn separators_are_sanitized() {
    assert_eq!(sanitize_segment("a/b\\c"), "a_b_c");
    assert_eq!(sanitize_segment(""), "unnamed");
    assert_eq!(join_path(Some("p/q"), "r"), "p/q/r");
    assert_eq!(join_path(None, "r"), "r");
    assert_eq!(last_segment("p/q/r"), "r");
}

#[test]
fn order_index_follows_position() {
    let (tree, _) = doc(vec![
        LayerSpec::leaf("bottom", g()),
        LayerSpec::leaf("middle", g()),
        LayerSpec::leaf("top", g()),
    ])
    .build()
    .unwrap();
    let idx: Vec<u32> = tree.roots().iter().map(|n| n.order_index()).collect();
    assert_eq!(idx, vec![0, 1, 2]);
}

#[test]
fn unknown_blend_is_reported_and_normalized() {
    let (tree, report) = doc(vec![LayerSpec::leaf("l", g()).with_blend("BlendMode.LUMINOSITY")])
        .build()
        .unwrap();
    assert_eq!(tree.roots()[0].blend_mode(), BlendMode::Normal);
    assert_eq!(report.count_kind("unknown_blend_mode"), 1);
    assert_eq!(report.diagnostics()[0].path(), Some("l"));
}

#[test]
fn zero_canvas_is_fatal() {
    let mut d = doc(vec![]);
    d.width = 0;
    assert!(d.build().is_err());
}

#[test]
fn group_bounds_are_union_of_children() {
    let grp = LayerSpec::group(
        "g",
        vec![
            LayerSpec::leaf("a", Geometry::new(-2, 3, 4, 1)),
            LayerSpec::leaf("b", Geometry::new(5, 0, 1, 10)),
            LayerSpec::leaf("empty", Geometry::new(100, 100, 0, 0)),
        ],
    );
    assert_eq!(grp.geometry, Geometry::new(-2, 0, 8, 10));
    assert_eq!(grp.blend_mode, "BlendMode.PASS_THROUGH");
    assert_eq!(LayerSpec::group("none", vec![]).geometry, Geometry::default());
}
