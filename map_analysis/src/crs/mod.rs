//! Coordinate reference systems: descriptors, projections and the resolving registry.
mod builtin;
mod transform;

pub use builtin::*;
pub use transform::*;

use crate::error::{AnalysisError, Result};
use crate::geometry::Coord;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// CRS descriptor as carried by layers: a code plus an optional Proj4 style definition.
///
/// A blank definition is treated as absent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CrsDescriptor {
    pub code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
}

impl CrsDescriptor {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            definition: None,
        }
    }

    pub fn with_definition(code: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            definition: Some(definition.into()),
        }
    }

    /// Geographic WGS84 (`EPSG:4326`).
    pub fn wgs84() -> Self {
        Self::new(WGS84_CODE)
    }

    /// Definition text if present and not blank.
    pub fn definition(&self) -> Option<&str> {
        self.definition
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }

    fn normalized_code(&self) -> String {
        self.code.trim().to_uppercase()
    }
}

impl fmt::Display for CrsDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.code)
    }
}

/// Forward/inverse mapping between geographic longitude/latitude degrees and a CRS.
pub trait Projection: Send + Sync + fmt::Debug {
    fn code(&self) -> &str;

    /// Resolved definition text, two CRS with identical definitions need no transform.
    fn definition(&self) -> &str;

    /// Geographic `(lng, lat)` to CRS coordinates.
    fn project(&self, lnglat: Coord) -> Coord;

    /// CRS coordinates to geographic `(lng, lat)`.
    fn unproject(&self, point: Coord) -> Coord;
}

/// External source of projections for definitions the registry does not know.
pub trait ProjectionProvider: Send + Sync {
    fn create(&self, code: &str, definition: &str) -> Option<Arc<dyn Projection>>;
}

/// Resolves [CrsDescriptor] values to projections.
///
/// A descriptor with a definition resolves to the registered projection with the same
/// definition text, otherwise to whatever the [ProjectionProvider] builds for it. A descriptor
/// with only a code is looked up by code. Anything else is
/// [AnalysisError::UnknownCoordinateSystem].
#[derive(Clone)]
pub struct CrsRegistry {
    by_code: HashMap<String, Arc<dyn Projection>>,
    provider: Option<Arc<dyn ProjectionProvider>>,
}

impl CrsRegistry {
    /// Empty registry, not even WGS84 resolves.
    pub fn empty() -> Self {
        Self {
            by_code: HashMap::new(),
            provider: None,
        }
    }

    /// Registry with EPSG:4326, EPSG:3857 and EPSG:3395.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(Wgs84));
        registry.register(Arc::new(WebMercator));
        registry.register(Arc::new(WorldMercator));
        registry
    }

    pub fn with_provider(mut self, provider: Arc<dyn ProjectionProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Registers (or replaces) a projection under its code.
    pub fn register(&mut self, projection: Arc<dyn Projection>) {
        self.by_code
            .insert(projection.code().trim().to_uppercase(), projection);
    }

    pub fn resolve(&self, crs: &CrsDescriptor) -> Result<Arc<dyn Projection>> {
        let resolved = match crs.definition() {
            Some(definition) => self
                .by_code
                .values()
                .find(|p| p.definition() == definition)
                .cloned()
                .or_else(|| {
                    trace!("delegating definition of {} to projection provider", crs.code);
                    self.provider
                        .as_ref()
                        .and_then(|provider| provider.create(&crs.code, definition))
                }),
            None => self.by_code.get(&crs.normalized_code()).cloned(),
        };

        resolved.ok_or_else(|| {
            debug!("failed to resolve coordinate system {}", crs.code);
            AnalysisError::unknown_crs(crs.code.clone())
        })
    }

    /// True if both descriptors resolve to textually identical definitions.
    pub fn same_crs(&self, a: &CrsDescriptor, b: &CrsDescriptor) -> Result<bool> {
        let a = self.resolve(a)?;
        let b = self.resolve(b)?;
        Ok(a.definition() == b.definition())
    }
}

impl Default for CrsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CrsRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut codes: Vec<_> = self.by_code.keys().collect();
        codes.sort();
        f.debug_struct("CrsRegistry")
            .field("codes", &codes)
            .field("provider", &self.provider.is_some())
            .finish()
    }
}
