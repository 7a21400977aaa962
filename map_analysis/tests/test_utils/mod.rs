#![allow(dead_code)]

use async_trait::async_trait;
use map_analysis::analysis::ServiceLayer;
use map_analysis::core::math::vec2;
use map_analysis::crs::CrsDescriptor;
use map_analysis::geometry::{Coord, Feature, FeatureId, Geometry, GeometryKind, LayerId, LayerInfo};
use map_analysis::snapping::{Cursor, MapView};
use map_analysis::StoreError;
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Axis aligned square polygon.
pub fn square(x: f64, y: f64, size: f64) -> Geometry {
    Geometry::Polygon(vec![vec![
        vec2(x, y),
        vec2(x + size, y),
        vec2(x + size, y + size),
        vec2(x, y + size),
        vec2(x, y),
    ]])
}

pub fn ids(range: std::ops::Range<usize>) -> Vec<FeatureId> {
    range.map(|i| FeatureId::new(i.to_string())).collect()
}

type DelayFn = Box<dyn Fn(&[FeatureId]) -> Duration + Send + Sync>;

/// In memory feature store recording every package request.
#[derive(Default)]
pub struct MemoryStore {
    layers: HashMap<LayerId, (LayerInfo, Vec<Feature>)>,
    delay: Option<DelayFn>,
    failing: Vec<FeatureId>,
    requests: Mutex<Vec<Vec<FeatureId>>>,
    completions: Mutex<Vec<FeatureId>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_layer(mut self, id: &str, crs: CrsDescriptor, features: Vec<Feature>) -> Self {
        let geometry_kind = features
            .first()
            .map(|f| f.geometry.kind())
            .unwrap_or(GeometryKind::Polygon);
        let info = LayerInfo {
            id: LayerId::new(id),
            crs,
            geometry_kind,
        };
        self.layers.insert(LayerId::new(id), (info, features));
        self
    }

    /// Delays each package by the duration computed from its ids.
    pub fn with_delay<F>(mut self, delay: F) -> Self
    where
        F: Fn(&[FeatureId]) -> Duration + Send + Sync + 'static,
    {
        self.delay = Some(Box::new(delay));
        self
    }

    /// Fails every package containing `id`.
    pub fn failing_on(mut self, id: &str) -> Self {
        self.failing.push(FeatureId::new(id));
        self
    }

    /// Ids of every package requested, in request order.
    pub fn requests(&self) -> Vec<Vec<FeatureId>> {
        self.requests.lock().unwrap().clone()
    }

    /// First id of every package, in completion order.
    pub fn completions(&self) -> Vec<FeatureId> {
        self.completions.lock().unwrap().clone()
    }
}

#[async_trait]
impl map_analysis::FeatureStore for MemoryStore {
    async fn fetch_layer(&self, layer_id: &LayerId) -> Result<Option<LayerInfo>, StoreError> {
        Ok(self.layers.get(layer_id).map(|(info, _)| info.clone()))
    }

    async fn fetch_features(
        &self,
        layer_id: &LayerId,
        ids: &[FeatureId],
    ) -> Result<Vec<Feature>, StoreError> {
        self.requests.lock().unwrap().push(ids.to_vec());
        if let Some(delay) = &self.delay {
            tokio::time::sleep(delay(ids)).await;
        }
        if let Some(first) = ids.first() {
            self.completions.lock().unwrap().push(first.clone());
        }
        if ids.iter().any(|id| self.failing.contains(id)) {
            return Err(format!("store unavailable for {}", ids[0]).into());
        }

        let Some((_, features)) = self.layers.get(layer_id) else {
            return Ok(Vec::new());
        };
        Ok(ids
            .iter()
            .filter_map(|id| features.iter().find(|f| &f.id == id).cloned())
            .collect())
    }

    async fn fetch_all_features(&self, layer_id: &LayerId) -> Result<Vec<Feature>, StoreError> {
        Ok(self
            .layers
            .get(layer_id)
            .map(|(_, features)| features.clone())
            .unwrap_or_default())
    }
}

/// Service layer keeping every geometry it is shown.
#[derive(Debug, Default)]
pub struct RecordingServiceLayer {
    pub shown: Mutex<Vec<(Geometry, CrsDescriptor)>>,
}

impl RecordingServiceLayer {
    pub fn count(&self) -> usize {
        self.shown.lock().unwrap().len()
    }
}

impl ServiceLayer for RecordingServiceLayer {
    fn add(&self, geometry: &Geometry, crs: &CrsDescriptor) {
        self.shown
            .lock()
            .unwrap()
            .push((geometry.clone(), crs.clone()));
    }

    fn clear(&self) {
        self.shown.lock().unwrap().clear();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ViewCall {
    Cursor(Cursor),
    ShowMarker(Coord),
    HideMarker,
}

/// Map view with a plain grid projection: 100 pixels per degree, screen y pointing down.
pub struct GridView {
    pub crs: CrsDescriptor,
    pub calls: RefCell<Vec<ViewCall>>,
}

impl GridView {
    pub const PX_PER_DEGREE: f64 = 100.0;

    pub fn new(crs: CrsDescriptor) -> Self {
        Self {
            crs,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<ViewCall> {
        self.calls.borrow().clone()
    }
}

impl MapView for GridView {
    fn crs(&self) -> CrsDescriptor {
        self.crs.clone()
    }

    fn lnglat_to_screen(&self, lnglat: Coord) -> Coord {
        vec2(lnglat.x * Self::PX_PER_DEGREE, -lnglat.y * Self::PX_PER_DEGREE)
    }

    fn screen_to_lnglat(&self, screen: Coord) -> Coord {
        vec2(screen.x / Self::PX_PER_DEGREE, -screen.y / Self::PX_PER_DEGREE)
    }

    fn set_cursor(&self, cursor: Cursor) {
        self.calls.borrow_mut().push(ViewCall::Cursor(cursor));
    }

    fn show_marker(&self, lnglat: Coord) {
        self.calls.borrow_mut().push(ViewCall::ShowMarker(lnglat));
    }

    fn hide_marker(&self) {
        self.calls.borrow_mut().push(ViewCall::HideMarker);
    }
}
