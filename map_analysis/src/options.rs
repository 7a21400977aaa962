//! Tunable parameters of the analysis operations.
//!
//! Every options struct implements `Default` and deserializes with missing fields defaulted, so a
//! host can load a partial JSON document.
use crate::lattice::Lattice;
use serde::{Deserialize, Serialize};

/// Maximum number of ids fetched by one package of a batched load.
pub const DEFAULT_PACKAGE_SIZE: usize = 100;

/// Grid scale geometries are snapped to before merging (`10^4`, about 10 m in degrees).
pub const DEFAULT_MERGE_SCALE: f64 = 1e4;

/// Snap tolerance in screen pixels.
pub const DEFAULT_SNAP_DISTANCE_PX: f64 = 15.0;

/// Engine wide options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Ids per package when loading features in batches.
    pub package_size: usize,
    /// Lattice scale of the clipping engine.
    pub clip_scale: f64,
    /// Grid scale used by [MergeOptions] based merges.
    pub merge_scale: f64,
    pub snap: SnapOptions,
}

impl AnalysisOptions {
    pub fn new() -> Self {
        Self {
            package_size: DEFAULT_PACKAGE_SIZE,
            clip_scale: Lattice::DEFAULT.scale,
            merge_scale: DEFAULT_MERGE_SCALE,
            snap: SnapOptions::new(),
        }
    }

    /// Lattice used by clipping operations.
    pub fn clip_lattice(&self) -> Lattice {
        Lattice::new(self.clip_scale)
    }

    /// Grid geometries are snapped to before merging.
    pub fn merge_lattice(&self) -> Lattice {
        Lattice::new(self.merge_scale)
    }
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapping parameters, may be overridden per pick request.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapOptions {
    /// Maximum screen distance between the cursor and a snap target.
    pub distance_px: f64,
    /// Snap to vertexes only, never to points along segments.
    pub only_vertex: bool,
}

impl SnapOptions {
    pub fn new() -> Self {
        Self {
            distance_px: DEFAULT_SNAP_DISTANCE_PX,
            only_vertex: false,
        }
    }
}

impl Default for SnapOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Options of [merge_geometry](crate::analysis::MapAnalysis::merge_geometry).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeOptions {
    /// Dissolve polygons into their union instead of collecting them as parts.
    pub is_union: bool,
    /// An invalid geometry makes its merge produce nothing instead of being skipped.
    pub fail_if_invalid: bool,
    /// Return multi part geometries even when a single part remains.
    pub force_multi: bool,
}

impl MergeOptions {
    pub fn new() -> Self {
        Self {
            is_union: false,
            fail_if_invalid: false,
            force_multi: true,
        }
    }
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self::new()
    }
}
