//! Interactive point picking with vertex and segment snapping.
//!
//! A pick is a [SnapSession] driven by a stream of [PickEvent]s coming from a [MapView]. The map
//! view works in longitude/latitude; screen positions are pixels.
mod index;
mod session;

pub use index::*;
pub use session::*;

use crate::error::{AnalysisError, Result};
use crate::crs::CrsDescriptor;
use crate::geometry::{Coord, Feature, LayerId};
use futures::{Stream, StreamExt};

/// Mouse cursor styles used while picking.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Cursor {
    Default,
    Crosshair,
}

/// Map view collaborator of the snapping controller.
pub trait MapView {
    /// CRS points are resolved in when a pick names none.
    fn crs(&self) -> CrsDescriptor;

    fn lnglat_to_screen(&self, lnglat: Coord) -> Coord;

    fn screen_to_lnglat(&self, screen: Coord) -> Coord;

    fn set_cursor(&self, cursor: Cursor);

    /// Shows the snap marker at `lnglat`, moving it if already shown.
    fn show_marker(&self, lnglat: Coord);

    fn hide_marker(&self);
}

/// Input events of a pick session.
#[derive(Debug, Clone, PartialEq)]
pub enum PickEvent {
    Move { screen: Coord, lnglat: Coord },
    Click { screen: Coord, lnglat: Coord },
    /// A snap layer reloaded its features (longitude/latitude).
    LayerLoaded { layer_id: LayerId, features: Vec<Feature> },
    Abort,
}

/// Drives `session` with `events` until it resolves.
///
/// Returns the picked longitude/latitude. An `Abort` event or the end of the stream fails with
/// [AnalysisError::SnapSessionAborted]. The session is torn down on every path, including when
/// the returned future is dropped before completion.
pub async fn run_session<V, E>(mut session: SnapSession<'_, V>, mut events: E) -> Result<Coord>
where
    V: MapView + ?Sized,
    E: Stream<Item = PickEvent> + Unpin,
{
    session.start();
    while let Some(event) = events.next().await {
        match session.handle(event) {
            SnapState::Resolved(point) => return Ok(*point),
            SnapState::Aborted => return Err(AnalysisError::SnapSessionAborted),
            _ => {}
        }
    }

    session.abort();
    Err(AnalysisError::SnapSessionAborted)
}
