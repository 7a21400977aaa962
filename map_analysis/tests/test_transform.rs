use map_analysis::core::math::vec2;
use map_analysis::crs::{
    convert, convert_coord, convert_geometry, CrsDescriptor, CrsRegistry, WGS84_DEFINITION,
};
use map_analysis::geometry::{Feature, Geometry};
use map_analysis::{polygon, AnalysisError};
use std::borrow::Cow;

fn parcel() -> Feature {
    Feature::new(
        "parcel-1",
        polygon![[(37.6, 55.7), (37.7, 55.7), (37.7, 55.8), (37.6, 55.8)]],
    )
    .with_property("name", serde_json::json!("north"))
}

#[test]
fn identity_transform_is_borrowed_and_equal() {
    let registry = CrsRegistry::new();
    let feature = parcel();
    let wgs84 = CrsDescriptor::wgs84();
    let same = convert(&registry, &wgs84, &feature, &wgs84).unwrap();
    assert!(matches!(same, Cow::Borrowed(_)));
    assert_eq!(*same, feature);

    // same definition under another code needs no transform either
    let alias = CrsDescriptor::with_definition("urn:ogc:def:crs:EPSG::4326", WGS84_DEFINITION);
    let converted = convert(&registry, &alias, &feature, &wgs84).unwrap();
    assert!(matches!(converted, Cow::Borrowed(_)));
}

#[test]
fn mercator_round_trip() {
    let registry = CrsRegistry::new();
    let wgs84 = CrsDescriptor::wgs84();
    for code in ["EPSG:3857", "EPSG:3395"] {
        let mercator = CrsDescriptor::new(code);
        let feature = parcel();
        let projected = convert(&registry, &wgs84, &feature, &mercator).unwrap().into_owned();
        assert_eq!(projected.id, feature.id);
        assert_eq!(projected.properties, feature.properties);
        assert_ne!(projected.geometry, feature.geometry);

        let back = convert(&registry, &mercator, &projected, &wgs84).unwrap();
        let (Geometry::Polygon(a), Geometry::Polygon(b)) = (&feature.geometry, &back.geometry)
        else {
            panic!("polygon expected");
        };
        for (p, q) in a[0].iter().zip(b[0].iter()) {
            let close = (p.x - q.x).abs() < 1e-6 && (p.y - q.y).abs() < 1e-6;
            assert!(close, "{code}: {p:?} != {q:?}");
        }
    }
}

#[test]
fn web_mercator_known_values() {
    let registry = CrsRegistry::new();
    let p = convert_coord(
        &registry,
        &CrsDescriptor::wgs84(),
        vec2(180.0, 0.0),
        &CrsDescriptor::new("EPSG:3857"),
    )
    .unwrap();
    assert!((p.x - 20_037_508.342_789_244).abs() < 1e-6);
    assert!(p.y.abs() < 1e-6);
}

#[test]
fn every_kind_is_transformed() {
    let registry = CrsRegistry::new();
    let wgs84 = CrsDescriptor::wgs84();
    let mercator = CrsDescriptor::new("EPSG:3857");
    let geometries = [
        Geometry::Point(vec2(10.0, 10.0)),
        Geometry::MultiPoint(vec![vec2(10.0, 10.0), vec2(11.0, 11.0)]),
        Geometry::LineString(vec![vec2(10.0, 10.0), vec2(11.0, 11.0)]),
        Geometry::MultiLineString(vec![vec![vec2(10.0, 10.0), vec2(11.0, 11.0)]]),
        parcel().geometry,
        Geometry::MultiPolygon(vec![parcel().geometry.polygons()[0].clone()]),
    ];
    for g in &geometries {
        let converted = convert_geometry(&registry, &wgs84, g, &mercator).unwrap();
        assert_eq!(converted.kind(), g.kind());
        assert_ne!(&*converted, g);
    }
}

#[test]
fn unknown_crs_fails() {
    let registry = CrsRegistry::new();
    let err = convert(
        &registry,
        &CrsDescriptor::new("EPSG:2000000"),
        &parcel(),
        &CrsDescriptor::wgs84(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::UnknownCoordinateSystem { code } if code == "EPSG:2000000"
    ));
}
