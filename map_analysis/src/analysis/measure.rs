use super::MapAnalysis;
use crate::clipping::{self, ClipOutcome};
use crate::crs::{convert, CrsDescriptor};
use crate::error::{AnalysisError, Result};
use crate::geometry::{Feature, FeatureId, Geometry, LayerId};
use crate::lattice::Lattice;
use crate::loader::{BatchRequest, FeatureStore, JoinPolicy};
use crate::planar::{self, RhumbPath};
use futures::future;
use log::debug;
use serde::Serialize;

/// Geodesic area of the intersection of one feature with the reference feature, `None` when they
/// do not intersect.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntersectionArea {
    pub id: FeatureId,
    /// Square metres.
    pub area: Option<f64>,
}

/// Attributes, geometry and area of one feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerObjectOptions {
    #[serde(flatten)]
    pub properties: serde_json::Map<String, serde_json::Value>,
    pub geometry: Geometry,
    /// Planar area in the layer's CRS.
    pub area: f64,
}

/// Features of one layer intersecting a reference feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerIntersections {
    pub layer_id: LayerId,
    pub features: Vec<Feature>,
}

fn intersect(a: &Geometry, b: &Geometry, lattice: Lattice) -> ClipOutcome {
    clipping::intersection(a.polygons(), b.polygons(), lattice)
}

impl<S> MapAnalysis<S>
where
    S: FeatureStore,
{
    /// Area of the intersection of `object_a` with each of `objects_b`, in square metres.
    ///
    /// Results follow the order the store returns layer B's features in. With `show_on_map`
    /// every non empty intersection is pushed to the service layer.
    pub async fn intersection_area(
        &self,
        layer_a: &LayerId,
        object_a: &FeatureId,
        layer_b: &LayerId,
        objects_b: &[FeatureId],
        show_on_map: bool,
    ) -> Result<Vec<IntersectionArea>> {
        let wgs84 = CrsDescriptor::wgs84();
        let request = BatchRequest::new(layer_b.clone(), objects_b.to_vec())
            .with_package_size(self.options.package_size);
        let loader = self.loader();
        let (a, b) = futures::try_join!(
            self.load_feature_in(layer_a, object_a, &wgs84),
            loader.load(&request, JoinPolicy::Strict)
        )?;
        let features_b = self.features_in(b, &wgs84)?;

        let lattice = self.options.clip_lattice();
        let results = features_b
            .into_iter()
            .map(|f| {
                let area = match intersect(&a.geometry, &f.geometry, lattice).to_geometry() {
                    Some(intersection) => {
                        if show_on_map {
                            self.show(&intersection, &wgs84);
                        }
                        Some(planar::geodesic_area(&intersection))
                    }
                    None => None,
                };
                IntersectionArea { id: f.id, area }
            })
            .collect();

        Ok(results)
    }

    /// Area of `object_b` lying outside `object_a`, in square metres.
    pub async fn area_extends(
        &self,
        layer_a: &LayerId,
        object_a: &FeatureId,
        layer_b: &LayerId,
        object_b: &FeatureId,
    ) -> Result<f64> {
        let wgs84 = CrsDescriptor::wgs84();
        let (a, b) = futures::try_join!(
            self.load_feature_in(layer_a, object_a, &wgs84),
            self.load_feature_in(layer_b, object_b, &wgs84)
        )?;

        let total = planar::geodesic_area(&b.geometry);
        let inside = intersect(&b.geometry, &a.geometry, self.options.clip_lattice())
            .to_geometry()
            .map(|g| planar::geodesic_area(&g))
            .unwrap_or(0.0);
        debug!("area of {object_b} extending {object_a}: {total} - {inside}");
        Ok(total - inside)
    }

    /// True if `object_a` contains `object_b`, both compared in WGS84.
    pub async fn is_contains_object(
        &self,
        layer_a: &LayerId,
        object_a: &FeatureId,
        layer_b: &LayerId,
        object_b: &FeatureId,
    ) -> Result<bool> {
        let wgs84 = CrsDescriptor::wgs84();
        let (a, b) = futures::try_join!(
            self.load_feature_in(layer_a, object_a, &wgs84),
            self.load_feature_in(layer_b, object_b, &wgs84)
        )?;
        Ok(planar::contains(&a.geometry, &b.geometry))
    }

    /// Great circle distance in metres between the centres of two features.
    pub async fn distance_between_objects(
        &self,
        layer_a: &LayerId,
        object_a: &FeatureId,
        layer_b: &LayerId,
        object_b: &FeatureId,
    ) -> Result<f64> {
        let wgs84 = CrsDescriptor::wgs84();
        let (a, b) = futures::try_join!(
            self.load_feature_in(layer_a, object_a, &wgs84),
            self.load_feature_in(layer_b, object_b, &wgs84)
        )?;
        planar::center_distance(&a.geometry, &b.geometry).ok_or(AnalysisError::NoValidGeometry)
    }

    /// Rhumbs of every line and ring of `feature`, whose coordinates are in `crs_name`.
    pub fn rhumb(&self, feature: &Feature, crs_name: &str) -> Vec<RhumbPath> {
        planar::rhumb(&feature.geometry, crs_name)
    }

    /// Properties, geometry and planar area of a feature. The geometry is converted to
    /// `crs_name` when given, the area is always measured in the layer's CRS.
    pub async fn layer_object_options(
        &self,
        layer_id: &LayerId,
        feature_id: &FeatureId,
        crs_name: Option<&str>,
    ) -> Result<LayerObjectOptions> {
        let (info, feature) = self.loader().load_feature(layer_id, feature_id).await?;
        let area = planar::area(&feature.geometry);
        let geometry = match crs_name {
            Some(name) => {
                let target = CrsDescriptor::new(name);
                convert(&self.registry, &info.crs, &feature, &target)?
                    .into_owned()
                    .geometry
            }
            None => feature.geometry,
        };

        Ok(LayerObjectOptions {
            properties: feature.properties,
            geometry,
            area,
        })
    }

    /// Features of each of `layer_ids` intersecting `feature`, whose coordinates are in
    /// `crs_name` (WGS84 when `None`). Layers are searched concurrently, results follow
    /// `layer_ids`.
    pub async fn intersection_objects(
        &self,
        feature: &Feature,
        crs_name: Option<&str>,
        layer_ids: &[LayerId],
    ) -> Result<Vec<LayerIntersections>> {
        let wgs84 = CrsDescriptor::wgs84();
        let source = crs_name.map(CrsDescriptor::new).unwrap_or_else(CrsDescriptor::wgs84);
        let reference = convert(&self.registry, &source, feature, &wgs84)?;
        let reference: &Feature = &reference;
        let wgs84 = &wgs84;

        let searches = layer_ids.iter().map(|layer_id| async move {
            let layer = self.loader().load_all(layer_id).await?;
            let features = self
                .features_in(layer, wgs84)?
                .into_iter()
                .filter(|f| planar::intersects(&f.geometry, &reference.geometry))
                .collect::<Vec<_>>();
            debug!(
                "{} features of layer {layer_id} intersect {}",
                features.len(),
                reference.id
            );
            Ok::<_, AnalysisError>(LayerIntersections {
                layer_id: layer_id.clone(),
                features,
            })
        });

        future::try_join_all(searches).await
    }
}
