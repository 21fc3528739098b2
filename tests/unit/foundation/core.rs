use super::*;

#[test]
fn right_and_bottom_follow_size() {
    let g = Geometry::new(-5, 10, 20, 3);
    assert_eq!(g.right(), 15);
    assert_eq!(g.bottom(), 13);
    assert_eq!(g.origin(), (-5, 10));
    assert!(!g.is_empty());
    assert!(Geometry::new(0, 0, 0, 7).is_empty());
}

#[test]
fn from_edges_rejects_inverted_bounds() {
    assert_eq!(
        Geometry::from_edges(2, 3, 12, 8).unwrap(),
        Geometry::new(2, 3, 10, 5)
    );
    assert!(Geometry::from_edges(5, 0, 4, 1).is_err());
}

#[test]
fn canvas_size_must_be_non_zero() {
    assert!(CanvasSize::new(0, 10).is_err());
    assert!(CanvasSize::new(10, 0).is_err());
    let size = CanvasSize::new(3, 2).unwrap();
    assert_eq!((size.width, size.height), (3, 2));
}
