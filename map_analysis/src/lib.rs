//! Spatial analysis engine for map data.
//!
//! Geometries are clipped exactly on an integer lattice, reprojected between coordinate reference
//! systems, loaded from a [FeatureStore] in bounded packages and compared, measured or merged by
//! [MapAnalysis]. The [snapping] module drives interactive point picking with vertex and segment
//! snapping.
extern crate static_aabb2d_index;

#[macro_use]
mod macros;
mod spatial_index;

pub mod analysis;
pub mod clipping;
pub mod core;
pub mod crs;
pub mod error;
pub mod geometry;
pub mod lattice;
pub mod loader;
pub mod options;
pub mod planar;
pub mod snapping;

pub use static_aabb2d_index::AABB;

pub use crate::analysis::{MapAnalysis, ServiceLayer};
pub use crate::error::{AnalysisError, FailedPackage, Result, StoreError};
pub use crate::geometry::{Coord, Feature, FeatureId, Geometry, GeometryKind, Layer, LayerId};
pub use crate::loader::FeatureStore;
