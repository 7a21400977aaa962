//! Feature and geometry model shared by every part of the engine.
//!
//! Geometries follow the GeoJSON structural convention: a `type` tag plus nested coordinate
//! sequences. Polygons are a list of rings where the first ring is the shell and the rest are
//! holes; rings are closed (first position repeated at the end).
mod coords;

pub use coords::*;

use crate::core::math::Vector2;
use crate::crs::CrsDescriptor;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position, `x` is longitude/easting and `y` is latitude/northing.
pub type Coord = Vector2<f64>;

/// A closed ring of positions.
pub type Ring = Vec<Coord>;

/// Shell followed by hole rings.
pub type PolygonRings = Vec<Ring>;

/// Tagged union of the supported geometry kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Coord),
    MultiPoint(Vec<Coord>),
    LineString(Vec<Coord>),
    MultiLineString(Vec<Vec<Coord>>),
    Polygon(PolygonRings),
    MultiPolygon(Vec<PolygonRings>),
}

/// Kind of a geometry without its coordinates.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    Polygon,
    MultiPolygon,
}

/// Topological dimension of a geometry kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Dimension {
    Puntal,
    Lineal,
    Polygonal,
}

impl GeometryKind {
    pub fn dimension(self) -> Dimension {
        match self {
            GeometryKind::Point | GeometryKind::MultiPoint => Dimension::Puntal,
            GeometryKind::LineString | GeometryKind::MultiLineString => Dimension::Lineal,
            GeometryKind::Polygon | GeometryKind::MultiPolygon => Dimension::Polygonal,
        }
    }

    pub fn is_multi(self) -> bool {
        matches!(
            self,
            GeometryKind::MultiPoint | GeometryKind::MultiLineString | GeometryKind::MultiPolygon
        )
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point(_) => GeometryKind::Point,
            Geometry::MultiPoint(_) => GeometryKind::MultiPoint,
            Geometry::LineString(_) => GeometryKind::LineString,
            Geometry::MultiLineString(_) => GeometryKind::MultiLineString,
            Geometry::Polygon(_) => GeometryKind::Polygon,
            Geometry::MultiPolygon(_) => GeometryKind::MultiPolygon,
        }
    }

    #[inline]
    pub fn dimension(&self) -> Dimension {
        self.kind().dimension()
    }

    /// Polygons of a polygonal geometry (a single polygon yields one entry), empty otherwise.
    pub fn polygons(&self) -> Vec<&PolygonRings> {
        match self {
            Geometry::Polygon(rings) => vec![rings],
            Geometry::MultiPolygon(polygons) => polygons.iter().collect(),
            _ => Vec::new(),
        }
    }

    /// Coerces a single part geometry into its multi part form, multi part geometries are
    /// returned as is.
    pub fn into_multi(self) -> Geometry {
        match self {
            Geometry::Point(p) => Geometry::MultiPoint(vec![p]),
            Geometry::LineString(l) => Geometry::MultiLineString(vec![l]),
            Geometry::Polygon(p) => Geometry::MultiPolygon(vec![p]),
            g => g,
        }
    }
}

/// Layer scoped primary key of a feature.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureId(pub String);

/// Identifier of a layer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerId(pub String);

macro_rules! impl_id {
    ($id:ident) => {
        impl $id {
            pub fn new(id: impl Into<String>) -> Self {
                $id(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $id {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $id {
            fn from(value: &str) -> Self {
                $id(value.to_owned())
            }
        }

        impl From<String> for $id {
            fn from(value: String) -> Self {
                $id(value)
            }
        }
    };
}

impl_id!(FeatureId);
impl_id!(LayerId);

/// A feature record: id, geometry (in its layer's CRS) and properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct Feature {
    pub id: FeatureId,
    pub geometry: Geometry,
    #[serde(default)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

impl Feature {
    pub fn new(id: impl Into<FeatureId>, geometry: Geometry) -> Self {
        Self {
            id: id.into(),
            geometry,
            properties: serde_json::Map::new(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }
}

/// Layer metadata, the CRS is fixed for the layer's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerInfo {
    pub id: LayerId,
    pub crs: CrsDescriptor,
    pub geometry_kind: GeometryKind,
}

/// A layer with an ordered feature collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub info: LayerInfo,
    pub features: Vec<Feature>,
}

impl Layer {
    pub fn feature(&self, id: &FeatureId) -> Option<&Feature> {
        self.features.iter().find(|f| &f.id == id)
    }
}
