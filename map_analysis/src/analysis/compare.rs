use super::MapAnalysis;
use crate::clipping::{self, ClipPolygon};
use crate::crs::CrsDescriptor;
use crate::error::{AnalysisError, Result};
use crate::geometry::{Feature, FeatureId, Geometry, LayerId};
use crate::loader::FeatureStore;
use crate::planar;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Condition a feature of the other layer must satisfy against a difference polygon.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComparisonCondition {
    /// The candidate contains the difference polygon.
    Contains,
    /// The candidate intersects the difference polygon without containing it.
    Intersects,
    /// Computed on `difference(B, A)`, the candidate from layer A *intersects* the difference
    /// polygon. The test is the raw intersection, not its negation.
    NotIntersects,
}

impl ComparisonCondition {
    /// Whether `candidate` matches the difference polygon `difference`.
    pub fn matches(self, candidate: &Geometry, difference: &Geometry) -> bool {
        match self {
            ComparisonCondition::Contains => planar::contains(candidate, difference),
            ComparisonCondition::Intersects => {
                planar::intersects(candidate, difference)
                    && !planar::contains(candidate, difference)
            }
            ComparisonCondition::NotIntersects => planar::intersects(candidate, difference),
        }
    }

    /// True when the layers are swapped before the difference is computed.
    pub fn swaps_operands(self) -> bool {
        self == ComparisonCondition::NotIntersects
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonCondition::Contains => "contains",
            ComparisonCondition::Intersects => "intersects",
            ComparisonCondition::NotIntersects => "notIntersects",
        }
    }
}

impl FromStr for ComparisonCondition {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "contains" => Ok(ComparisonCondition::Contains),
            "intersects" => Ok(ComparisonCondition::Intersects),
            "notIntersects" => Ok(ComparisonCondition::NotIntersects),
            _ => Err(AnalysisError::InvalidComparisonCondition(s.to_string())),
        }
    }
}

impl fmt::Display for ComparisonCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Difference between all polygons of two layers, computed in the CRS of the first one.
#[derive(Debug, Clone)]
pub struct LayerDifference {
    /// CRS of the polygons and features below.
    pub crs: CrsDescriptor,
    pub polygons: Vec<ClipPolygon>,
    /// Features of the layer the other one was subtracted from.
    pub subject: Vec<Feature>,
    /// Features of the subtracted layer, converted to `crs`.
    pub clip: Vec<Feature>,
}

/// One difference polygon of a layer comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRecord {
    /// Planar area of the difference polygon in square CRS units.
    pub area_difference: f64,
    /// Difference polygon in the CRS of the subject layer.
    pub object_difference: Geometry,
    /// First feature of the other layer matching the condition.
    pub matched_id: Option<FeatureId>,
}

impl<S> MapAnalysis<S>
where
    S: FeatureStore,
{
    /// Polygons of `layer_a` not covered by `layer_b`, in the CRS of `layer_a`.
    ///
    /// Every ring of either layer is an independent path, so overlapping features of one layer
    /// cancel out. Returns `None` when no polygon with positive area remains.
    pub async fn difference_layers(
        &self,
        layer_a: &LayerId,
        layer_b: &LayerId,
    ) -> Result<Option<LayerDifference>> {
        let loader = self.loader();
        let (a, b) = futures::try_join!(loader.load_all(layer_a), loader.load_all(layer_b))?;

        let crs = a.info.crs.clone();
        let subject = a.features;
        let clip = self.features_in(b, &crs)?;

        let outcome = clipping::difference(
            subject.iter().flat_map(|f| f.geometry.polygons()),
            clip.iter().flat_map(|f| f.geometry.polygons()),
            self.options.clip_lattice(),
        );

        debug!(
            "difference of layers {layer_a} and {layer_b}: {} polygons",
            outcome.polygons().len()
        );

        if !outcome.is_found() {
            return Ok(None);
        }

        Ok(Some(LayerDifference {
            crs,
            polygons: outcome.into_polygons(),
            subject,
            clip,
        }))
    }

    /// Compares two layers with `condition` (`contains`, `intersects` or `notIntersects`).
    ///
    /// Computes `difference(A, B)`, or `difference(B, A)` for `notIntersects`, and for every
    /// difference polygon records the first valid feature of the subtracted layer matching the
    /// condition. An empty difference yields no records. With `show_on_map` every difference
    /// polygon is pushed to the service layer.
    pub async fn compare_layers(
        &self,
        layer_a: &LayerId,
        layer_b: &LayerId,
        condition: &str,
        show_on_map: bool,
    ) -> Result<Vec<ComparisonRecord>> {
        let condition: ComparisonCondition = condition.parse()?;

        let difference = if condition.swaps_operands() {
            self.difference_layers(layer_b, layer_a).await?
        } else {
            self.difference_layers(layer_a, layer_b).await?
        };

        let Some(difference) = difference else {
            debug!("compare {layer_a} {condition} {layer_b}: no difference found");
            return Ok(Vec::new());
        };

        let candidates: Vec<&Feature> = difference
            .clip
            .iter()
            .filter(|f| {
                let valid = planar::is_valid(&f.geometry);
                if !valid {
                    trace!("skipping invalid candidate {}", f.id);
                }
                valid
            })
            .collect();

        let records: Vec<ComparisonRecord> = difference
            .polygons
            .iter()
            .map(|polygon| {
                let geometry = polygon.to_geometry();
                let matched_id = candidates
                    .iter()
                    .find(|f| condition.matches(&f.geometry, &geometry))
                    .map(|f| f.id.clone());
                if show_on_map {
                    self.show(&geometry, &difference.crs);
                }
                ComparisonRecord {
                    area_difference: polygon.area,
                    object_difference: geometry,
                    matched_id,
                }
            })
            .collect();

        debug!(
            "compare {layer_a} {condition} {layer_b}: {} records, {} matched",
            records.len(),
            records.iter().filter(|r| r.matched_id.is_some()).count()
        );

        Ok(records)
    }
}
