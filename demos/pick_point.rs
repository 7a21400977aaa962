mod common;

use common::{rect, DemoStore};
use futures::stream;
use map_analysis::analysis::PickRequest;
use map_analysis::core::math::vec2;
use map_analysis::crs::CrsDescriptor;
use map_analysis::geometry::{Coord, Feature, LayerId};
use map_analysis::snapping::{Cursor, MapView, PickEvent};
use map_analysis::MapAnalysis;

/// Map view printing what the snapping controller asks of it. 1000 pixels per degree.
struct ConsoleView;

impl MapView for ConsoleView {
    fn crs(&self) -> CrsDescriptor {
        CrsDescriptor::new("EPSG:3857")
    }

    fn lnglat_to_screen(&self, lnglat: Coord) -> Coord {
        vec2(lnglat.x * 1000.0, -lnglat.y * 1000.0)
    }

    fn screen_to_lnglat(&self, screen: Coord) -> Coord {
        vec2(screen.x / 1000.0, -screen.y / 1000.0)
    }

    fn set_cursor(&self, cursor: Cursor) {
        println!("cursor: {cursor:?}");
    }

    fn show_marker(&self, lnglat: Coord) {
        println!("marker at {:.5}, {:.5}", lnglat.x, lnglat.y);
    }

    fn hide_marker(&self) {
        println!("marker hidden");
    }
}

fn pointer(view: &ConsoleView, x: f64, y: f64) -> (Coord, Coord) {
    let screen = vec2(x, y);
    (screen, view.screen_to_lnglat(screen))
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();

    let mut store = DemoStore::default();
    store.add_layer(
        "buildings",
        CrsDescriptor::wgs84(),
        vec![Feature::new("b1", rect(37.6, 55.7, 37.61, 55.71))],
    );
    let analysis = MapAnalysis::new(store);
    let view = ConsoleView;

    // the pointer wanders towards the building corner, then clicks 4 px away from it
    let mut events = Vec::new();
    for (x, y) in [(37_550.0, -55_650.0), (37_590.0, -55_690.0), (37_603.0, -55_700.0)] {
        let (screen, lnglat) = pointer(&view, x, y);
        events.push(PickEvent::Move { screen, lnglat });
    }
    let (screen, lnglat) = pointer(&view, 37_604.0, -55_700.0);
    events.push(PickEvent::Click { screen, lnglat });

    let request = PickRequest::new()
        .with_snap([LayerId::new("buildings")])
        .with_target_crs(CrsDescriptor::wgs84());
    match analysis
        .pick_point(&view, stream::iter(events), &request)
        .await
    {
        Ok(point) => println!("picked {:.6}, {:.6}", point.x, point.y),
        Err(e) => eprintln!("pick failed: {e}"),
    }
}
