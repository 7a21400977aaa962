use super::{CrsDescriptor, CrsRegistry, Projection};
use crate::error::Result;
use crate::geometry::{map_coords, Coord, Feature, Geometry};
use log::trace;
use std::borrow::Cow;

/// Converts `feature` from `source` to `target` CRS.
///
/// Returns the input borrowed when both descriptors resolve to identical definitions, otherwise an
/// owned copy with every position mapped through `target.project(source.unproject(p))`.
///
/// # Examples
///
/// ```
/// # use map_analysis::crs::*;
/// # use map_analysis::geometry::*;
/// # use map_analysis::core::math::vec2;
/// # use std::borrow::Cow;
/// let registry = CrsRegistry::new();
/// let feature = Feature::new("1", Geometry::Point(vec2(20037508.342789244, 0.0)));
/// let converted = convert(
///     &registry,
///     &CrsDescriptor::new("EPSG:3857"),
///     &feature,
///     &CrsDescriptor::wgs84(),
/// ).unwrap();
/// assert!(matches!(converted, Cow::Owned(_)));
/// let Geometry::Point(p) = converted.geometry else { unreachable!() };
/// assert!((p.x - 180.0).abs() < 1e-9);
/// ```
pub fn convert<'a>(
    registry: &CrsRegistry,
    source: &CrsDescriptor,
    feature: &'a Feature,
    target: &CrsDescriptor,
) -> Result<Cow<'a, Feature>> {
    match convert_geometry(registry, source, &feature.geometry, target)? {
        Cow::Borrowed(_) => Ok(Cow::Borrowed(feature)),
        Cow::Owned(geometry) => Ok(Cow::Owned(Feature {
            id: feature.id.clone(),
            geometry,
            properties: feature.properties.clone(),
        })),
    }
}

/// Same as [convert] for a bare geometry.
pub fn convert_geometry<'a>(
    registry: &CrsRegistry,
    source: &CrsDescriptor,
    geometry: &'a Geometry,
    target: &CrsDescriptor,
) -> Result<Cow<'a, Geometry>> {
    let from = registry.resolve(source)?;
    let to = registry.resolve(target)?;
    if from.definition() == to.definition() {
        return Ok(Cow::Borrowed(geometry));
    }

    trace!("converting {:?} from {} to {}", geometry.kind(), source, target);
    Ok(Cow::Owned(map_coords(geometry, |c| {
        reproject(from.as_ref(), to.as_ref(), c)
    })))
}

/// Converts a single position between two CRS.
pub fn convert_coord(
    registry: &CrsRegistry,
    source: &CrsDescriptor,
    coord: Coord,
    target: &CrsDescriptor,
) -> Result<Coord> {
    let from = registry.resolve(source)?;
    let to = registry.resolve(target)?;
    if from.definition() == to.definition() {
        return Ok(coord);
    }
    Ok(reproject(from.as_ref(), to.as_ref(), coord))
}

#[inline]
fn reproject(from: &dyn Projection, to: &dyn Projection, coord: Coord) -> Coord {
    to.project(from.unproject(coord))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::vec2;
    use crate::error::AnalysisError;

    fn square() -> Feature {
        Feature::new(
            "sq",
            Geometry::Polygon(vec![vec![
                vec2(10.0, 50.0),
                vec2(11.0, 50.0),
                vec2(11.0, 51.0),
                vec2(10.0, 50.0),
            ]]),
        )
    }

    #[test]
    fn identity_is_borrowed() {
        let registry = CrsRegistry::new();
        let f = square();
        let wgs = CrsDescriptor::wgs84();
        let same = convert(&registry, &wgs, &f, &wgs).unwrap();
        assert!(matches!(same, Cow::Borrowed(_)));
        assert_eq!(*same, f);
    }

    #[test]
    fn round_trip_through_mercator() {
        let registry = CrsRegistry::new();
        let f = square();
        let wgs = CrsDescriptor::wgs84();
        let merc = CrsDescriptor::new("EPSG:3857");
        let projected = convert(&registry, &wgs, &f, &merc).unwrap();
        let back = convert(&registry, &merc, &projected, &wgs).unwrap();

        let (Geometry::Polygon(a), Geometry::Polygon(b)) = (&f.geometry, &back.geometry) else {
            panic!("kind changed");
        };
        for (p, q) in a[0].iter().zip(b[0].iter()) {
            assert!(p.fuzzy_eq_eps(*q, 1e-9));
        }
        assert_eq!(back.id, f.id);
    }

    #[test]
    fn unknown_target_fails() {
        let registry = CrsRegistry::new();
        let f = square();
        let err = convert(&registry, &CrsDescriptor::wgs84(), &f, &CrsDescriptor::new("X:1"));
        assert!(matches!(err, Err(AnalysisError::UnknownCoordinateSystem { .. })));
    }
}
