use super::{Cursor, MapView, PickEvent, SnapIndex, SnapTarget};
use crate::geometry::{Coord, Feature, Geometry, LayerId};
use crate::options::SnapOptions;
use log::{debug, trace};

/// State of a pick session.
#[derive(Debug, Clone, PartialEq)]
pub enum SnapState {
    /// Created, not listening yet.
    Idle,
    /// Listening for a click, snapping disabled.
    AwaitingClick,
    /// Listening for moves and clicks, `target` is the current snap candidate.
    Snapping { target: Option<SnapTarget> },
    /// Picked longitude/latitude.
    Resolved(Coord),
    Aborted,
}

impl SnapState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SnapState::Resolved(_) | SnapState::Aborted)
    }
}

/// Features of the snap layers, converted to longitude/latitude.
#[derive(Debug, Clone, Default)]
pub struct SnapLayers {
    layers: Vec<(LayerId, Vec<Geometry>)>,
}

impl SnapLayers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the features of a layer, replacing the ones it had.
    pub fn set_layer(&mut self, layer_id: LayerId, features: Vec<Feature>) {
        let geometries = features.into_iter().map(|f| f.geometry).collect();
        match self.layers.iter_mut().find(|(id, _)| *id == layer_id) {
            Some((_, existing)) => *existing = geometries,
            None => self.layers.push((layer_id, geometries)),
        }
    }

    pub fn contains_layer(&self, layer_id: &LayerId) -> bool {
        self.layers.iter().any(|(id, _)| id == layer_id)
    }

    pub fn build_index(&self) -> SnapIndex {
        SnapIndex::new(self.layers.iter().flat_map(|(_, g)| g.iter()))
    }
}

/// One interactive point pick on a map view.
///
/// The session owns the cursor style and the snap marker from [start](Self::start) until it
/// resolves, aborts or is dropped, whichever comes first.
pub struct SnapSession<'a, V: MapView + ?Sized> {
    view: &'a V,
    snap: Option<(SnapLayers, SnapIndex)>,
    options: SnapOptions,
    state: SnapState,
    marker_shown: bool,
    listening: bool,
}

impl<'a, V> SnapSession<'a, V>
where
    V: MapView + ?Sized,
{
    /// Session resolving the next click as is.
    pub fn without_snap(view: &'a V) -> Self {
        Self {
            view,
            snap: None,
            options: SnapOptions::new(),
            state: SnapState::Idle,
            marker_shown: false,
            listening: false,
        }
    }

    /// Session snapping to the vertexes and segments of `layers`.
    pub fn with_snap(view: &'a V, layers: SnapLayers, options: SnapOptions) -> Self {
        let index = layers.build_index();
        debug!(
            "snap session over {} vertexes, {} segments, {} px",
            index.vertex_count(),
            index.segment_count(),
            options.distance_px
        );
        Self {
            view,
            snap: Some((layers, index)),
            options,
            state: SnapState::Idle,
            marker_shown: false,
            listening: false,
        }
    }

    pub fn state(&self) -> &SnapState {
        &self.state
    }

    pub fn options(&self) -> SnapOptions {
        self.options
    }

    /// Starts listening: crosshair cursor, snapping if enabled.
    pub fn start(&mut self) -> &SnapState {
        if self.state != SnapState::Idle {
            return &self.state;
        }

        self.view.set_cursor(Cursor::Crosshair);
        self.listening = true;
        self.state = if self.snap.is_some() {
            SnapState::Snapping { target: None }
        } else {
            SnapState::AwaitingClick
        };
        &self.state
    }

    /// Replaces the features of one snap layer and rebuilds the index, used when a snap layer
    /// reloads while the session is live. Ignored when snapping is disabled.
    pub fn refresh(&mut self, layer_id: LayerId, features: Vec<Feature>) {
        if let Some((layers, index)) = &mut self.snap {
            if !layers.contains_layer(&layer_id) {
                trace!("ignoring reload of layer {layer_id}, not a snap layer");
                return;
            }
            layers.set_layer(layer_id, features);
            *index = layers.build_index();
            trace!("snap index rebuilt: {} vertexes", index.vertex_count());
        }
    }

    fn nearest(&self, screen: Coord) -> Option<SnapTarget> {
        let (_, index) = self.snap.as_ref()?;
        index.nearest(self.view, screen, self.options.distance_px, self.options.only_vertex)
    }

    /// Advances the state machine. Events before [start](Self::start) and after a terminal
    /// state are ignored.
    pub fn handle(&mut self, event: PickEvent) -> &SnapState {
        if self.state.is_terminal() || self.state == SnapState::Idle {
            trace!("ignoring {event:?} in state {:?}", self.state);
            return &self.state;
        }

        match event {
            PickEvent::Move { screen, .. } => {
                if let SnapState::Snapping { .. } = self.state {
                    let target = self.nearest(screen);
                    match target {
                        Some(t) => {
                            self.view.show_marker(t.point);
                            self.marker_shown = true;
                        }
                        None if self.marker_shown => {
                            self.view.hide_marker();
                            self.marker_shown = false;
                        }
                        None => {}
                    }
                    self.state = SnapState::Snapping { target };
                }
            }
            PickEvent::Click { screen, lnglat } => {
                let point = match self.nearest(screen) {
                    Some(t) => {
                        debug!("click snapped to {:?} {} px away", t.kind, t.distance_px);
                        t.point
                    }
                    None => lnglat,
                };
                self.state = SnapState::Resolved(point);
                self.teardown();
            }
            PickEvent::LayerLoaded { layer_id, features } => self.refresh(layer_id, features),
            PickEvent::Abort => {
                debug!("pick session aborted");
                self.state = SnapState::Aborted;
                self.teardown();
            }
        }

        &self.state
    }

    /// Ends a live session without a point.
    pub fn abort(&mut self) -> &SnapState {
        self.handle(PickEvent::Abort)
    }

    fn teardown(&mut self) {
        if !self.listening {
            return;
        }
        if self.marker_shown {
            self.view.hide_marker();
            self.marker_shown = false;
        }
        self.view.set_cursor(Cursor::Default);
        self.listening = false;
    }
}

impl<V> Drop for SnapSession<'_, V>
where
    V: MapView + ?Sized,
{
    fn drop(&mut self) {
        self.teardown();
    }
}
