use super::MapAnalysis;
use crate::clipping;
use crate::error::{AnalysisError, Result};
use crate::geometry::{map_coords, Coord, Dimension, FeatureId, Geometry, LayerId, PolygonRings};
use crate::lattice::Lattice;
use crate::loader::{BatchRequest, FeatureStore, JoinPolicy};
use crate::options::MergeOptions;
use crate::planar;
use log::{debug, warn};

/// Parts of geometries sharing one dimension.
enum Parts {
    Points(Vec<Coord>),
    Lines(Vec<Vec<Coord>>),
    Polygons(Vec<PolygonRings>),
}

impl Parts {
    fn empty(dimension: Dimension) -> Self {
        match dimension {
            Dimension::Puntal => Parts::Points(Vec::new()),
            Dimension::Lineal => Parts::Lines(Vec::new()),
            Dimension::Polygonal => Parts::Polygons(Vec::new()),
        }
    }

    fn push(&mut self, geometry: Geometry) {
        match (self, geometry) {
            (Parts::Points(parts), Geometry::Point(p)) => parts.push(p),
            (Parts::Points(parts), Geometry::MultiPoint(points)) => parts.extend(points),
            (Parts::Lines(parts), Geometry::LineString(l)) => parts.push(l),
            (Parts::Lines(parts), Geometry::MultiLineString(lines)) => parts.extend(lines),
            (Parts::Polygons(parts), Geometry::Polygon(p)) => parts.push(p),
            (Parts::Polygons(parts), Geometry::MultiPolygon(polygons)) => parts.extend(polygons),
            // dimensions are checked before pushing
            _ => {}
        }
    }

    fn into_geometry(self, force_multi: bool) -> Option<Geometry> {
        let geometry = match self {
            Parts::Points(mut p) if p.len() == 1 => Geometry::Point(p.remove(0)),
            Parts::Points(p) if !p.is_empty() => Geometry::MultiPoint(p),
            Parts::Lines(mut l) if l.len() == 1 => Geometry::LineString(l.remove(0)),
            Parts::Lines(l) if !l.is_empty() => Geometry::MultiLineString(l),
            Parts::Polygons(mut p) if p.len() == 1 => Geometry::Polygon(p.remove(0)),
            Parts::Polygons(p) if !p.is_empty() => Geometry::MultiPolygon(p),
            _ => return None,
        };

        Some(if force_multi {
            geometry.into_multi()
        } else {
            geometry
        })
    }
}

/// Combines valid geometries of one dimension into one geometry.
///
/// With `is_union` polygons are dissolved on `lattice` and repeated points are dropped, otherwise
/// parts are collected as they are.
fn combine(
    geometries: Vec<Geometry>,
    is_union: bool,
    force_multi: bool,
    lattice: Lattice,
) -> Result<Option<Geometry>> {
    let Some(first) = geometries.first() else {
        return Ok(None);
    };
    let (first_kind, dimension) = (first.kind(), first.dimension());
    if let Some(other) = geometries.iter().find(|g| g.dimension() != dimension) {
        return Err(AnalysisError::MixedGeometryKinds {
            first: first_kind,
            second: other.kind(),
        });
    }

    let mut parts = Parts::empty(dimension);
    for geometry in geometries {
        parts.push(geometry);
    }

    if is_union {
        parts = match parts {
            Parts::Polygons(polygons) => {
                let dissolved = clipping::union(polygons.iter(), lattice);
                Parts::Polygons(dissolved.into_polygons().into_iter().map(|p| p.rings).collect())
            }
            Parts::Points(points) => {
                let mut unique: Vec<Coord> = Vec::with_capacity(points.len());
                for p in points {
                    if !unique.contains(&p) {
                        unique.push(p);
                    }
                }
                Parts::Points(unique)
            }
            lines => lines,
        };
    }

    Ok(parts.into_geometry(force_multi))
}

/// Merges geometries into one.
///
/// Invalid geometries are skipped, or with `fail_if_invalid` make the merge produce nothing.
/// Returns `None` when no valid geometry remains and fails with
/// [AnalysisError::MixedGeometryKinds] when the geometries do not share one dimension.
pub fn merge_geometries(
    geometries: Vec<Geometry>,
    options: &MergeOptions,
    lattice: Lattice,
) -> Result<Option<Geometry>> {
    let total = geometries.len();
    let mut valid = Vec::with_capacity(total);
    for geometry in geometries {
        if planar::is_valid(&geometry) {
            valid.push(geometry);
        } else if options.fail_if_invalid {
            warn!("invalid {} geometry, merge of {total} geometries abandoned", geometry.kind());
            return Ok(None);
        } else {
            warn!("skipping invalid {} geometry", geometry.kind());
        }
    }

    combine(valid, options.is_union, options.force_multi, lattice)
}

impl<S> MapAnalysis<S>
where
    S: FeatureStore,
{
    /// Merges features of two layers into one geometry in the CRS of `layer_a`.
    ///
    /// Both id lists are loaded in packages and every package must succeed. Geometries are
    /// snapped to the merge grid, merged per layer, then the two per layer results are merged.
    /// Returns `None` when no valid geometry remains.
    pub async fn merge_geometry(
        &self,
        layer_a: &LayerId,
        ids_a: &[FeatureId],
        layer_b: &LayerId,
        ids_b: &[FeatureId],
        options: MergeOptions,
    ) -> Result<Option<Geometry>> {
        let size = self.options.package_size;
        let request_a = BatchRequest::new(layer_a.clone(), ids_a.to_vec()).with_package_size(size);
        let request_b = BatchRequest::new(layer_b.clone(), ids_b.to_vec()).with_package_size(size);

        let loader = self.loader();
        let (a, b) = futures::join!(
            loader.load(&request_a, JoinPolicy::Settled),
            loader.load(&request_b, JoinPolicy::Settled)
        );
        let (a, b) = match (a, b) {
            (Ok(a), Ok(b)) => (a, b),
            (Err(a), Err(b)) => return Err(a.and_batch_failures(b)),
            (Err(e), _) | (_, Err(e)) => return Err(e),
        };

        let crs = a.info.crs.clone();
        let grid = self.options.merge_lattice();
        let lattice = self.options.clip_lattice();
        let per_layer = MergeOptions {
            force_multi: false,
            ..options
        };

        let features_a = a.features;
        let features_b = self.features_in(b, &crs)?;
        let mut merged = Vec::with_capacity(2);
        for (layer_id, features) in [(layer_a, features_a), (layer_b, features_b)] {
            let snapped = features
                .iter()
                .map(|f| map_coords(&f.geometry, |c| grid.snap(c)))
                .collect();
            match merge_geometries(snapped, &per_layer, lattice)? {
                Some(geometry) => merged.push(geometry),
                None => debug!("nothing to merge in layer {layer_id}"),
            }
        }

        let result = combine(merged, options.is_union, options.force_multi, lattice)?;
        debug!(
            "merged {} + {} features: {:?}",
            ids_a.len(),
            ids_b.len(),
            result.as_ref().map(|g| g.kind())
        );
        Ok(result)
    }
}
