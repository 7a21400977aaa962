mod test_utils;

use map_analysis::clipping::{self, ClipOutcome};
use map_analysis::geometry::{Geometry, PolygonRings};
use map_analysis::lattice::Lattice;
use map_analysis::planar;
use map_analysis::polygon;
use test_utils::square;

fn rings(g: &Geometry) -> Vec<&PolygonRings> {
    g.polygons()
}

#[test]
fn difference_with_itself_is_not_found() {
    let a = polygon![[(37.1, 55.1), (37.9, 55.2), (37.8, 55.9), (37.2, 55.7)]];
    let outcome = clipping::difference(rings(&a), rings(&a), Lattice::DEFAULT);
    assert_eq!(outcome, ClipOutcome::NotFound);
    assert!(outcome.to_geometry().is_none());
    assert!(outcome.into_result().is_err());
}

#[test]
fn union_of_disjoint_polygons_adds_areas() {
    let parts = [
        square(10.0, 10.0, 0.5),
        square(11.0, 10.0, 0.25),
        polygon![[(12.0, 12.0), (12.3, 12.0), (12.1, 12.4)]],
    ];
    let expected: f64 = parts.iter().map(planar::area).sum();
    let outcome = clipping::union(parts.iter().flat_map(|g| g.polygons()), Lattice::DEFAULT);
    assert_eq!(outcome.polygons().len(), 3);
    assert!((outcome.area() - expected).abs() < 1e-12);
}

#[test]
fn difference_keeps_holes() {
    let outer = square(0.0, 0.0, 1.0);
    let inner = square(0.25, 0.25, 0.5);
    let outcome = clipping::difference(rings(&outer), rings(&inner), Lattice::DEFAULT);
    let polygons = outcome.polygons();
    assert_eq!(polygons.len(), 1);
    assert_eq!(polygons[0].rings.len(), 2);
    assert!((polygons[0].area - 0.75).abs() < 1e-12);
    assert!(planar::is_valid(&polygons[0].to_geometry()));
}

#[test]
fn difference_splits_into_parts() {
    // a band crossing the square cuts it in two
    let subject = square(0.0, 0.0, 3.0);
    let band = polygon![[(1.0, -1.0), (2.0, -1.0), (2.0, 4.0), (1.0, 4.0)]];
    let outcome = clipping::difference(rings(&subject), rings(&band), Lattice::DEFAULT);
    assert_eq!(outcome.polygons().len(), 2);
    assert!((outcome.area() - 6.0).abs() < 1e-12);
    assert!(matches!(outcome.to_geometry(), Some(Geometry::MultiPolygon(_))));
}

#[test]
fn overlapping_features_of_one_layer_cancel_in_difference() {
    // even-odd over every ring: the nested square of the clip side is a hole of the outer one
    let subject = square(0.4, 0.4, 0.2);
    let clip = [square(0.0, 0.0, 1.0), square(0.3, 0.3, 0.4)];
    let outcome = clipping::difference(
        rings(&subject),
        clip.iter().flat_map(|g| g.polygons()),
        Lattice::DEFAULT,
    );
    assert!((outcome.area() - 0.04).abs() < 1e-12);
}

#[test]
fn intersection_area() {
    let a = square(0.0, 0.0, 2.0);
    let b = square(1.0, 1.0, 2.0);
    let outcome = clipping::intersection(rings(&a), rings(&b), Lattice::DEFAULT);
    assert!((outcome.area() - 1.0).abs() < 1e-12);

    let far = square(10.0, 10.0, 1.0);
    assert!(!clipping::intersection(rings(&a), rings(&far), Lattice::DEFAULT).is_found());
}

#[test]
fn difference_in_metres() {
    // 100 km squares in web mercator, their edges are 10^13 lattice units long
    let a = square(4.0e6, 7.0e6, 1.0e5);
    let b = square(4.05e6, 7.05e6, 1.0e5);
    let outcome = clipping::difference(rings(&a), rings(&b), Lattice::DEFAULT);
    assert_eq!(outcome.polygons().len(), 1);
    assert!((outcome.area() - 7.5e9).abs() / 7.5e9 < 1e-9, "{}", outcome.area());

    let overlap = clipping::intersection(rings(&a), rings(&b), Lattice::DEFAULT);
    assert!((overlap.area() - 2.5e9).abs() / 2.5e9 < 1e-9);
    assert!(planar::contains(&a, &square(4.01e6, 7.01e6, 1.0e4)));
    assert!(!planar::contains(&a, &b));
}
