use async_trait::async_trait;
use map_analysis::core::math::vec2;
use map_analysis::crs::CrsDescriptor;
use map_analysis::geometry::{Feature, FeatureId, Geometry, LayerId, LayerInfo};
use map_analysis::{FeatureStore, StoreError};
use std::collections::HashMap;

/// Feature store kept in memory, enough to drive the demos.
#[derive(Debug, Default)]
pub struct DemoStore {
    layers: HashMap<LayerId, (LayerInfo, Vec<Feature>)>,
}

impl DemoStore {
    pub fn add_layer(&mut self, id: &str, crs: CrsDescriptor, features: Vec<Feature>) {
        let info = LayerInfo {
            id: LayerId::new(id),
            crs,
            geometry_kind: features
                .first()
                .map(|f| f.geometry.kind())
                .unwrap_or(map_analysis::GeometryKind::Polygon),
        };
        self.layers.insert(LayerId::new(id), (info, features));
    }
}

#[async_trait]
impl FeatureStore for DemoStore {
    async fn fetch_layer(&self, layer_id: &LayerId) -> Result<Option<LayerInfo>, StoreError> {
        Ok(self.layers.get(layer_id).map(|(info, _)| info.clone()))
    }

    async fn fetch_features(
        &self,
        layer_id: &LayerId,
        ids: &[FeatureId],
    ) -> Result<Vec<Feature>, StoreError> {
        let features = match self.layers.get(layer_id) {
            Some((_, features)) => features,
            None => return Ok(Vec::new()),
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

pub fn rect(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Geometry {
    Geometry::Polygon(vec![vec![
        vec2(min_x, min_y),
        vec2(max_x, min_y),
        vec2(max_x, max_y),
        vec2(min_x, max_y),
        vec2(min_x, min_y),
    ]])
}
