//! Batched feature loading.
//!
//! Large id lists are split into contiguous packages that are fetched concurrently, then
//! reassembled in the order the packages were created, whatever order they complete in.
use crate::error::{AnalysisError, FailedPackage, Result, StoreError};
use crate::geometry::{Feature, FeatureId, Layer, LayerId, LayerInfo};
use crate::options::DEFAULT_PACKAGE_SIZE;
use async_trait::async_trait;
use futures::future::{self, BoxFuture};
use futures::FutureExt;
use log::{debug, trace, warn};
use std::sync::Arc;

/// Record store holding layers and their features.
#[async_trait]
pub trait FeatureStore: Send + Sync {
    /// Layer metadata, `None` if the layer does not exist.
    async fn fetch_layer(
        &self,
        layer_id: &LayerId,
    ) -> std::result::Result<Option<LayerInfo>, StoreError>;

    /// Features of the layer with the given ids. Unknown ids are left out of the result.
    async fn fetch_features(
        &self,
        layer_id: &LayerId,
        ids: &[FeatureId],
    ) -> std::result::Result<Vec<Feature>, StoreError>;

    async fn fetch_all_features(
        &self,
        layer_id: &LayerId,
    ) -> std::result::Result<Vec<Feature>, StoreError>;
}

#[async_trait]
impl<S> FeatureStore for Arc<S>
where
    S: FeatureStore + ?Sized,
{
    async fn fetch_layer(
        &self,
        layer_id: &LayerId,
    ) -> std::result::Result<Option<LayerInfo>, StoreError> {
        (**self).fetch_layer(layer_id).await
    }

    async fn fetch_features(
        &self,
        layer_id: &LayerId,
        ids: &[FeatureId],
    ) -> std::result::Result<Vec<Feature>, StoreError> {
        (**self).fetch_features(layer_id, ids).await
    }

    async fn fetch_all_features(
        &self,
        layer_id: &LayerId,
    ) -> std::result::Result<Vec<Feature>, StoreError> {
        (**self).fetch_all_features(layer_id).await
    }
}

/// Ids to load from one layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    pub layer_id: LayerId,
    pub ids: Vec<FeatureId>,
    /// Maximum ids per package, zero is treated as one.
    pub package_size: usize,
}

impl BatchRequest {
    pub fn new(layer_id: impl Into<LayerId>, ids: Vec<FeatureId>) -> Self {
        Self {
            layer_id: layer_id.into(),
            ids,
            package_size: DEFAULT_PACKAGE_SIZE,
        }
    }

    pub fn with_package_size(mut self, package_size: usize) -> Self {
        self.package_size = package_size;
        self
    }

    /// Number of packages the request is split into.
    pub fn package_count(&self) -> usize {
        self.ids.len().div_ceil(self.package_size.max(1))
    }
}

/// Features fetched by one package.
#[derive(Debug, Clone)]
pub struct FeaturePackage {
    /// Position of the package in creation order.
    pub index: usize,
    pub layer: Arc<LayerInfo>,
    pub features: Vec<Feature>,
}

/// How the packages of one batched load are awaited.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum JoinPolicy {
    /// Wait for every package and report all failed packages together.
    Settled,
    /// Fail as soon as any package fails.
    Strict,
}

/// Loads features from a [FeatureStore] in packages.
#[derive(Debug)]
pub struct BatchLoader<'a, S: ?Sized> {
    store: &'a S,
}

impl<'a, S> BatchLoader<'a, S>
where
    S: FeatureStore + ?Sized,
{
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Layer metadata, [AnalysisError::LayerNotFound] if the store does not know the layer.
    pub async fn layer_info(&self, layer_id: &LayerId) -> Result<Arc<LayerInfo>> {
        match self.store.fetch_layer(layer_id).await {
            Ok(Some(info)) => Ok(Arc::new(info)),
            Ok(None) => Err(AnalysisError::LayerNotFound(layer_id.clone())),
            Err(e) => Err(AnalysisError::store(layer_id, e)),
        }
    }

    /// Starts one fetch per package of `request`. Nothing is awaited here, every package is
    /// independent of the others.
    pub fn load_by_packages(
        &self,
        layer: Arc<LayerInfo>,
        request: &BatchRequest,
    ) -> Vec<BoxFuture<'a, Result<FeaturePackage>>> {
        let store = self.store;
        request
            .ids
            .chunks(request.package_size.max(1))
            .enumerate()
            .map(|(index, chunk)| {
                let ids = chunk.to_vec();
                let layer = Arc::clone(&layer);
                async move {
                    trace!("package {index} of layer {}: {} ids", layer.id, ids.len());
                    let features = store
                        .fetch_features(&layer.id, &ids)
                        .await
                        .map_err(|e| AnalysisError::store(&layer.id, e))?;
                    if features.len() != ids.len() {
                        debug!(
                            "package {index} of layer {}: {} of {} ids found",
                            layer.id,
                            features.len(),
                            ids.len()
                        );
                    }
                    Ok(FeaturePackage {
                        index,
                        layer,
                        features,
                    })
                }
                .boxed()
            })
            .collect()
    }

    /// Loads the features of `request` into a layer, features in request order.
    pub async fn load(&self, request: &BatchRequest, policy: JoinPolicy) -> Result<Layer> {
        let info = self.layer_info(&request.layer_id).await?;
        let packages = self.load_by_packages(Arc::clone(&info), request);
        debug!(
            "loading {} features of layer {} in {} packages ({policy:?})",
            request.ids.len(),
            request.layer_id,
            packages.len()
        );
        let features = match policy {
            JoinPolicy::Settled => join_settled(&request.layer_id, packages).await?,
            JoinPolicy::Strict => join_strict(packages).await?,
        };
        Ok(Layer {
            info: info.as_ref().clone(),
            features,
        })
    }

    /// Loads every feature of a layer.
    pub async fn load_all(&self, layer_id: &LayerId) -> Result<Layer> {
        let info = self.layer_info(layer_id).await?;
        let features = self
            .store
            .fetch_all_features(layer_id)
            .await
            .map_err(|e| AnalysisError::store(layer_id, e))?;
        debug!("loaded all {} features of layer {layer_id}", features.len());
        Ok(Layer {
            info: info.as_ref().clone(),
            features,
        })
    }

    /// Loads one feature, [AnalysisError::FeatureNotFound] if the store does not return it.
    pub async fn load_feature(
        &self,
        layer_id: &LayerId,
        feature_id: &FeatureId,
    ) -> Result<(Arc<LayerInfo>, Feature)> {
        let info = self.layer_info(layer_id).await?;
        let features = self
            .store
            .fetch_features(layer_id, std::slice::from_ref(feature_id))
            .await
            .map_err(|e| AnalysisError::store(layer_id, e))?;
        match features.into_iter().find(|f| &f.id == feature_id) {
            Some(feature) => Ok((info, feature)),
            None => Err(AnalysisError::FeatureNotFound {
                layer_id: layer_id.clone(),
                feature_id: feature_id.clone(),
            }),
        }
    }
}

/// Waits for every package, failing with [AnalysisError::BatchFetchFailed] listing all the
/// failed packages if any failed.
pub async fn join_settled<'a>(
    layer_id: &LayerId,
    packages: Vec<BoxFuture<'a, Result<FeaturePackage>>>,
) -> Result<Vec<Feature>> {
    let total = packages.len();
    let mut features = Vec::new();
    let mut failed = Vec::new();
    for (index, result) in future::join_all(packages).await.into_iter().enumerate() {
        match result {
            Ok(package) => features.extend(package.features),
            Err(e) => {
                warn!("package {index} of {total} failed for layer {layer_id}: {e}");
                failed.push(FailedPackage {
                    layer_id: layer_id.clone(),
                    index,
                    message: e.to_string(),
                });
            }
        }
    }

    if failed.is_empty() {
        Ok(features)
    } else {
        Err(AnalysisError::BatchFetchFailed { failed, total })
    }
}

/// Waits for the packages, failing with the first error.
pub async fn join_strict<'a>(
    packages: Vec<BoxFuture<'a, Result<FeaturePackage>>>,
) -> Result<Vec<Feature>> {
    let packages = future::try_join_all(packages).await?;
    Ok(packages.into_iter().flat_map(|p| p.features).collect())
}
