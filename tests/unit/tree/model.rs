use super::*;
use crate::tree::build::{DocumentSpec, LayerSpec};

fn sample() -> LayerTree {
    let g = Geometry::new(0, 0, 4, 4);
    let doc = DocumentSpec {
        name: "doc.psd".to_string(),
        width: 8,
        height: 8,
        layers: vec![
            LayerSpec::leaf("bg", g),
            LayerSpec::group(
                "grp",
                vec![
                    LayerSpec::leaf("a", g),
                    LayerSpec::group("inner", vec![LayerSpec::leaf("b", g)]),
                ],
            ),
            LayerSpec::leaf("top", g),
        ],
    };
    doc.build().unwrap().0
}

#[test]
fn walk_is_preorder_with_depth() {
    let tree = sample();
    let seen: Vec<(&str, usize)> = tree.walk().map(|(n, d)| (n.path(), d)).collect();
    assert_eq!(
        seen,
        vec![
            ("bg", 0),
            ("grp", 0),
            ("grp/a", 1),
            ("grp/inner", 1),
            ("grp/inner/b", 2),
            ("top", 0),
        ]
    );
    assert_eq!(tree.node_count(), 6);
}

#[test]
fn find_and_children_of() {
    let tree = sample();
    let grp = tree.find("grp").unwrap();
    assert!(grp.is_group());
    assert_eq!(grp.node_kind(), NodeKind::Group);
    let names: Vec<&str> = tree.children_of(grp).iter().map(|n| n.name()).collect();
    assert_eq!(names, vec!["a", "inner"]);

    let leaf = tree.find("grp/inner/b").unwrap();
    assert_eq!(leaf.save_name(), "b");
    assert!(tree.children_of(leaf).is_empty());
    assert!(tree.find("missing").is_none());
}

#[test]
fn sort_siblings_is_stable_on_ties() {
    let tree = sample();
    let mut nodes: Vec<LayerNode> = tree.roots().to_vec();
    nodes[0].order_index = 5;
    nodes[1].order_index = 1;
    nodes[2].order_index = 1;
    sort_siblings(&mut nodes);
    let order: Vec<&str> = nodes.iter().map(|n| n.path()).collect();
    assert_eq!(order, vec!["grp", "top", "bg"]);
}
