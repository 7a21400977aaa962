use map_analysis::core::math::vec2;
use map_analysis::geometry::{visit_sequences, Geometry};
use map_analysis::lattice::{to_coordinates, to_integer_points, IntGeometry, IntPoint, Lattice};
use map_analysis::{coords, polygon};

fn max_deviation(a: &Geometry, b: &Geometry) -> f64 {
    let mut left = Vec::new();
    let mut right = Vec::new();
    visit_sequences(a, |seq| left.extend_from_slice(seq));
    visit_sequences(b, |seq| right.extend_from_slice(seq));
    assert_eq!(left.len(), right.len());
    left.iter()
        .zip(right.iter())
        .map(|(p, q)| (p.x - q.x).abs().max((p.y - q.y).abs()))
        .fold(0.0, f64::max)
}

#[test]
fn round_trip_within_lattice_resolution() {
    let geometries = vec![
        Geometry::Point(vec2(37.617_635_123_4, 55.755_814_987_6)),
        Geometry::MultiPoint(coords![(-179.999_999_994, -89.5), (0.000_000_004, 0.0)]),
        Geometry::LineString(coords![(30.123_456_789, 59.9), (30.2, 59.987_654_321)]),
        Geometry::MultiLineString(vec![
            coords![(1.0, 2.0), (3.0, 4.0)],
            coords![(5.5, 6.5), (7.0, 8.0)],
        ]),
        polygon![
            [(10.0, 10.0), (20.123_456_781, 10.0), (20.0, 20.0), (10.0, 20.0)],
            [(12.0, 12.0), (12.0, 14.0), (14.0, 14.0)]
        ],
        Geometry::MultiPolygon(vec![
            vec![coords![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 0.0)]],
            vec![coords![(2.0, 2.0), (3.0, 2.0), (3.0, 3.0), (2.0, 2.0)]],
        ]),
    ];

    for geometry in &geometries {
        let decoded = to_coordinates(&to_integer_points(geometry));
        assert_eq!(decoded.kind(), geometry.kind());
        let deviation = max_deviation(geometry, &decoded);
        assert!(deviation <= 1e-8, "{:?} deviates by {}", geometry.kind(), deviation);
    }
}

#[test]
fn integer_points_are_rounded_products() {
    let encoded = to_integer_points(&Geometry::Point(vec2(0.123_456_786, -0.123_456_786)));
    assert_eq!(encoded, IntGeometry::Point(IntPoint::new(12_345_679, -12_345_679)));
}

#[test]
fn decoding_closes_rings() {
    let open = IntGeometry::Polygon(vec![vec![
        IntPoint::new(0, 0),
        IntPoint::new(100_000_000, 0),
        IntPoint::new(100_000_000, 100_000_000),
    ]]);
    let Geometry::Polygon(rings) = to_coordinates(&open) else {
        panic!("polygon expected");
    };
    assert_eq!(rings[0].len(), 4);
    assert_eq!(rings[0].first(), rings[0].last());

    // already closed rings are left as they are
    let Geometry::Polygon(rings) = to_coordinates(&to_integer_points(&Geometry::Polygon(rings)))
    else {
        panic!("polygon expected");
    };
    assert_eq!(rings[0].len(), 4);
}

#[test]
fn custom_scale() {
    let lattice = Lattice::new(1e4);
    assert_eq!(lattice.encode(vec2(1.234_56, 2.0)), IntPoint::new(12_346, 20_000));
    assert_eq!(lattice.snap(vec2(1.234_56, 2.0)), vec2(1.2346, 2.0));
}
