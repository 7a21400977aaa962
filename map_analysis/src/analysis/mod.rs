//! Spatial predicates, measurements and merges over layers of a [FeatureStore].
//!
//! [MapAnalysis] is the entry point: it owns the store, the CRS registry and the options, and
//! exposes one async method per operation.
mod compare;
mod measure;
mod merge;
mod pick;

pub use compare::*;
pub use measure::*;
pub use merge::*;
pub use pick::*;

use crate::crs::{convert, CrsDescriptor, CrsRegistry};
use crate::error::Result;
use crate::geometry::{Feature, FeatureId, Geometry, Layer, LayerId};
use crate::loader::{BatchLoader, FeatureStore};
use crate::options::AnalysisOptions;
use log::{debug, warn};
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

/// Overlay sink geometries are pushed to when an operation is asked to show its results.
pub trait ServiceLayer: Send + Sync {
    fn add(&self, geometry: &Geometry, crs: &CrsDescriptor);

    /// Removes every geometry added so far.
    fn clear(&self);
}

/// Analysis engine over one feature store.
pub struct MapAnalysis<S> {
    store: S,
    registry: CrsRegistry,
    options: AnalysisOptions,
    service_layer: Option<Arc<dyn ServiceLayer>>,
}

impl<S> fmt::Debug for MapAnalysis<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapAnalysis")
            .field("registry", &self.registry)
            .field("options", &self.options)
            .field("service_layer", &self.service_layer.is_some())
            .finish_non_exhaustive()
    }
}

impl<S> MapAnalysis<S>
where
    S: FeatureStore,
{
    /// Engine with the built-in CRS registry and default options.
    pub fn new(store: S) -> Self {
        Self {
            store,
            registry: CrsRegistry::new(),
            options: AnalysisOptions::new(),
            service_layer: None,
        }
    }

    pub fn with_registry(mut self, registry: CrsRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_options(mut self, options: AnalysisOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_service_layer(mut self, service_layer: Arc<dyn ServiceLayer>) -> Self {
        self.service_layer = Some(service_layer);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn registry(&self) -> &CrsRegistry {
        &self.registry
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }

    /// Clears the attached service layer, if any.
    pub fn clear_service_layer(&self) {
        if let Some(layer) = &self.service_layer {
            layer.clear();
        }
    }

    fn loader(&self) -> BatchLoader<'_, S> {
        BatchLoader::new(&self.store)
    }

    fn show(&self, geometry: &Geometry, crs: &CrsDescriptor) {
        match &self.service_layer {
            Some(layer) => layer.add(geometry, crs),
            None => warn!("no service layer attached, {} not shown", geometry.kind()),
        }
    }

    /// Loads one feature converted to `target`.
    async fn load_feature_in(
        &self,
        layer_id: &LayerId,
        feature_id: &FeatureId,
        target: &CrsDescriptor,
    ) -> Result<Feature> {
        let (info, feature) = self.loader().load_feature(layer_id, feature_id).await?;
        let converted = convert(&self.registry, &info.crs, &feature, target)?;
        Ok(match converted {
            Cow::Borrowed(_) => feature,
            Cow::Owned(f) => f,
        })
    }

    /// Converts every feature of `layer` to `target`.
    fn features_in(&self, layer: Layer, target: &CrsDescriptor) -> Result<Vec<Feature>> {
        if self.registry.same_crs(&layer.info.crs, target)? {
            return Ok(layer.features);
        }

        debug!(
            "converting {} features of layer {} from {} to {}",
            layer.features.len(),
            layer.info.id,
            layer.info.crs,
            target
        );
        layer
            .features
            .iter()
            .map(|f| convert(&self.registry, &layer.info.crs, f, target).map(Cow::into_owned))
            .collect()
    }
}
