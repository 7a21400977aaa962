mod test_utils;

use futures::stream;
use map_analysis::analysis::PickRequest;
use map_analysis::core::math::vec2;
use map_analysis::crs::{convert_coord, CrsDescriptor, CrsRegistry};
use map_analysis::geometry::{Coord, Feature, Geometry, LayerId};
use map_analysis::snapping::{Cursor, PickEvent};
use map_analysis::{AnalysisError, MapAnalysis};
use test_utils::{init_logging, GridView, MemoryStore, ViewCall};

fn to_mercator(lnglat: Coord) -> Coord {
    convert_coord(
        &CrsRegistry::new(),
        &CrsDescriptor::wgs84(),
        lnglat,
        &CrsDescriptor::new("EPSG:3857"),
    )
    .unwrap()
}

fn analysis() -> MapAnalysis<MemoryStore> {
    init_logging();
    let store = MemoryStore::new()
        .with_layer(
            "poles",
            CrsDescriptor::new("EPSG:3857"),
            vec![Feature::new("p1", Geometry::Point(to_mercator(vec2(1.0, 1.0))))],
        )
        .with_layer(
            "roads",
            CrsDescriptor::wgs84(),
            vec![Feature::new(
                "r1",
                Geometry::LineString(vec![vec2(0.0, 0.0), vec2(2.0, 0.0)]),
            )],
        );
    MapAnalysis::new(store)
}

/// Pointer event at a screen position of a [GridView].
fn at(screen: Coord) -> (Coord, Coord) {
    let lnglat = vec2(
        screen.x / GridView::PX_PER_DEGREE,
        -screen.y / GridView::PX_PER_DEGREE,
    );
    (screen, lnglat)
}

fn mv(x: f64, y: f64) -> PickEvent {
    let (screen, lnglat) = at(vec2(x, y));
    PickEvent::Move { screen, lnglat }
}

fn click(x: f64, y: f64) -> PickEvent {
    let (screen, lnglat) = at(vec2(x, y));
    PickEvent::Click { screen, lnglat }
}

fn close(a: Coord, b: Coord, eps: f64) -> bool {
    (a.x - b.x).abs() < eps && (a.y - b.y).abs() < eps
}

#[tokio::test]
async fn snaps_to_vertex_three_pixels_away() {
    let analysis = analysis();
    let view = GridView::new(CrsDescriptor::wgs84());
    let request = PickRequest {
        distance_px: Some(5.0),
        ..PickRequest::new()
            .with_snap([LayerId::new("poles")])
            .with_target_crs(CrsDescriptor::new("EPSG:3857"))
    };
    let events = stream::iter(vec![mv(103.0, -100.0), click(103.0, -100.0)]);

    let point = analysis.pick_point(&view, events, &request).await.unwrap();
    let expected = to_mercator(vec2(1.0, 1.0));
    assert!(close(point, expected, 1e-3), "{point:?} != {expected:?}");

    let calls = view.calls();
    assert_eq!(calls.first(), Some(&ViewCall::Cursor(Cursor::Crosshair)));
    assert!(matches!(calls[1], ViewCall::ShowMarker(p) if close(p, vec2(1.0, 1.0), 1e-9)));
    assert_eq!(&calls[2..], [ViewCall::HideMarker, ViewCall::Cursor(Cursor::Default)]);
}

#[tokio::test]
async fn click_out_of_range_is_taken_as_is() {
    let analysis = analysis();
    let view = GridView::new(CrsDescriptor::wgs84());
    let request = PickRequest {
        distance_px: Some(5.0),
        ..PickRequest::new().with_snap([LayerId::new("poles")])
    };
    let events = stream::iter(vec![click(110.0, -100.0)]);
    let point = analysis.pick_point(&view, events, &request).await.unwrap();
    assert_eq!(point, vec2(1.1, 1.0));
}

#[tokio::test]
async fn segments_snap_unless_vertex_only() {
    let analysis = analysis();
    let view = GridView::new(CrsDescriptor::wgs84());
    let request = PickRequest {
        distance_px: Some(5.0),
        ..PickRequest::new().with_snap([LayerId::new("roads")])
    };
    let events = stream::iter(vec![click(100.0, 4.0)]);
    let point = analysis.pick_point(&view, events, &request).await.unwrap();
    assert!(close(point, vec2(1.0, 0.0), 1e-9), "{point:?}");

    let vertex_only = PickRequest {
        only_vertex: Some(true),
        ..request
    };
    let events = stream::iter(vec![click(100.0, 4.0)]);
    let point = analysis.pick_point(&view, events, &vertex_only).await.unwrap();
    assert_eq!(point, vec2(1.0, -0.04));
}

#[tokio::test]
async fn without_snap_the_click_is_projected_to_the_view_crs() {
    let analysis = analysis();
    let view = GridView::new(CrsDescriptor::new("EPSG:3857"));
    let events = stream::iter(vec![mv(100.0, -100.0), click(100.0, -100.0)]);
    let point = analysis
        .pick_point(&view, events, &PickRequest::new())
        .await
        .unwrap();
    assert!(close(point, to_mercator(vec2(1.0, 1.0)), 1e-6));
    // no marker without snapping
    assert_eq!(
        view.calls(),
        [ViewCall::Cursor(Cursor::Crosshair), ViewCall::Cursor(Cursor::Default)]
    );
}

#[tokio::test]
async fn missing_snap_layers_are_skipped() {
    let analysis = analysis();
    let view = GridView::new(CrsDescriptor::wgs84());
    let request = PickRequest::new().with_snap([LayerId::new("gone"), LayerId::new("poles")]);
    let events = stream::iter(vec![click(101.0, -101.0)]);
    let point = analysis.pick_point(&view, events, &request).await.unwrap();
    assert!(close(point, vec2(1.0, 1.0), 1e-9));
}

#[tokio::test]
async fn abort_and_end_of_stream_tear_down() {
    let analysis = analysis();
    let view = GridView::new(CrsDescriptor::wgs84());
    let request = PickRequest::new().with_snap([LayerId::new("poles")]);

    let events = stream::iter(vec![mv(100.0, -100.0), PickEvent::Abort, click(0.0, 0.0)]);
    let err = analysis.pick_point(&view, events, &request).await.unwrap_err();
    assert!(matches!(err, AnalysisError::SnapSessionAborted));
    let calls = view.calls();
    assert_eq!(calls.len(), 4);
    assert!(matches!(calls[1], ViewCall::ShowMarker(_)));
    assert_eq!(&calls[2..], [ViewCall::HideMarker, ViewCall::Cursor(Cursor::Default)]);

    let view = GridView::new(CrsDescriptor::wgs84());
    let events = stream::iter(vec![mv(500.0, -500.0)]);
    let err = analysis.pick_point(&view, events, &request).await.unwrap_err();
    assert!(matches!(err, AnalysisError::SnapSessionAborted));
    assert_eq!(view.calls().last(), Some(&ViewCall::Cursor(Cursor::Default)));
}

#[tokio::test]
async fn unknown_target_crs_fails_before_listening() {
    let analysis = analysis();
    let view = GridView::new(CrsDescriptor::wgs84());
    let request = PickRequest::new().with_target_crs(CrsDescriptor::new("EPSG:0"));
    let events = stream::iter(vec![click(0.0, 0.0)]);
    let err = analysis.pick_point(&view, events, &request).await.unwrap_err();
    assert!(matches!(err, AnalysisError::UnknownCoordinateSystem { .. }));
    assert!(view.calls().is_empty());
}
