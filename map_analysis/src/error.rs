use crate::geometry::{FeatureId, GeometryKind, LayerId};
use thiserror::Error;

/// Error type of the feature store collaborator.
pub type StoreError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Package of a batched fetch that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedPackage {
    pub layer_id: LayerId,
    /// Position of the package in creation order.
    pub index: usize,
    pub message: String,
}

fn layer_list(failed: &[FailedPackage]) -> String {
    let mut layers: Vec<&str> = failed.iter().map(|f| f.layer_id.as_str()).collect();
    layers.dedup();
    layers.join(", ")
}

/// Errors surfaced by analysis operations.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// CRS code is not registered and no resolvable definition was given.
    #[error("unknown coordinate system: {code}")]
    UnknownCoordinateSystem { code: String },

    #[error("layer not found: {0}")]
    LayerNotFound(LayerId),

    #[error("feature {feature_id} not found in layer {layer_id}")]
    FeatureNotFound {
        layer_id: LayerId,
        feature_id: FeatureId,
    },

    /// Comparison condition string is not one of `contains`, `intersects`, `notIntersects`.
    #[error("invalid comparison condition: {0:?}")]
    InvalidComparisonCondition(String),

    /// A clip or merge produced nothing usable.
    #[error("no valid geometry")]
    NoValidGeometry,

    /// One or more packages of batched fetches failed.
    #[error("{} of {total} packages failed to load ({})", .failed.len(), layer_list(.failed))]
    BatchFetchFailed {
        failed: Vec<FailedPackage>,
        /// Number of packages issued, failed or not.
        total: usize,
    },

    /// Pick session ended without a resolved point.
    #[error("snap session aborted")]
    SnapSessionAborted,

    #[error("cannot merge geometries of kinds {first} and {second}")]
    MixedGeometryKinds {
        first: GeometryKind,
        second: GeometryKind,
    },

    #[error("feature store failed for layer {layer_id}: {source}")]
    Store {
        layer_id: LayerId,
        #[source]
        source: StoreError,
    },
}

impl AnalysisError {
    pub(crate) fn unknown_crs(code: impl Into<String>) -> Self {
        AnalysisError::UnknownCoordinateSystem { code: code.into() }
    }

    pub(crate) fn store(layer_id: &LayerId, source: StoreError) -> Self {
        AnalysisError::Store {
            layer_id: layer_id.clone(),
            source,
        }
    }

    /// Folds the failed packages of `other` into `self` when both are
    /// [AnalysisError::BatchFetchFailed], otherwise keeps `self`.
    pub(crate) fn and_batch_failures(self, other: AnalysisError) -> Self {
        match (self, other) {
            (
                AnalysisError::BatchFetchFailed { mut failed, total },
                AnalysisError::BatchFetchFailed {
                    failed: more,
                    total: more_total,
                },
            ) => {
                failed.extend(more);
                AnalysisError::BatchFetchFailed {
                    failed,
                    total: total + more_total,
                }
            }
            (first, _) => first,
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
