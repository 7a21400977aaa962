use super::MapAnalysis;
use crate::crs::{convert_coord, CrsDescriptor};
use crate::error::{AnalysisError, Result};
use crate::geometry::{Coord, LayerId};
use crate::loader::FeatureStore;
use crate::snapping::{run_session, MapView, PickEvent, SnapLayers, SnapSession};
use futures::Stream;
use log::{debug, warn};

/// Parameters of one interactive point pick.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PickRequest {
    /// CRS the picked point is returned in, the view's CRS when `None`.
    pub target_crs: Option<CrsDescriptor>,
    pub snap: bool,
    /// Layers whose vertexes and segments attract the cursor. Missing layers are skipped.
    pub snap_layers: Vec<LayerId>,
    /// Overrides the engine's snap distance.
    pub distance_px: Option<f64>,
    /// Overrides the engine's vertex only setting.
    pub only_vertex: Option<bool>,
}

impl PickRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snap(mut self, layers: impl IntoIterator<Item = LayerId>) -> Self {
        self.snap = true;
        self.snap_layers = layers.into_iter().collect();
        self
    }

    pub fn with_target_crs(mut self, crs: CrsDescriptor) -> Self {
        self.target_crs = Some(crs);
        self
    }
}

impl<S> MapAnalysis<S>
where
    S: FeatureStore,
{
    /// Lets the user pick a point on `view` and returns it in the requested CRS.
    ///
    /// The session consumes `events` until a click resolves it. An `Abort` event or the end of
    /// the stream fails with [AnalysisError::SnapSessionAborted]. The view's cursor and snap
    /// marker are restored on every exit, including when the returned future is dropped.
    pub async fn pick_point<V, E>(
        &self,
        view: &V,
        events: E,
        request: &PickRequest,
    ) -> Result<Coord>
    where
        V: MapView + ?Sized,
        E: Stream<Item = PickEvent> + Unpin,
    {
        let target = request.target_crs.clone().unwrap_or_else(|| view.crs());
        // fail before listening when the target cannot be resolved
        self.registry.resolve(&target)?;

        let session = if request.snap {
            let layers = self.snap_layers(&request.snap_layers).await?;
            let mut options = self.options.snap;
            if let Some(distance_px) = request.distance_px {
                options.distance_px = distance_px;
            }
            if let Some(only_vertex) = request.only_vertex {
                options.only_vertex = only_vertex;
            }
            SnapSession::with_snap(view, layers, options)
        } else {
            SnapSession::without_snap(view)
        };

        let lnglat = run_session(session, events).await?;
        let point = convert_coord(&self.registry, &CrsDescriptor::wgs84(), lnglat, &target)?;
        debug!("picked {lnglat:?}, {point:?} in {target}");
        Ok(point)
    }

    /// Loads the features of `layer_ids` in longitude/latitude.
    async fn snap_layers(&self, layer_ids: &[LayerId]) -> Result<SnapLayers> {
        let wgs84 = CrsDescriptor::wgs84();
        let mut layers = SnapLayers::new();
        for layer_id in layer_ids {
            match self.loader().load_all(layer_id).await {
                Ok(layer) => {
                    let features = self.features_in(layer, &wgs84)?;
                    layers.set_layer(layer_id.clone(), features);
                }
                Err(AnalysisError::LayerNotFound(id)) => {
                    warn!("snap layer {id} not found, skipped");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(layers)
    }
}
