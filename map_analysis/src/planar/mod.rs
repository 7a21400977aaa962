//! Planar geometry: validity, areas, point location and spatial predicates, plus the geodesic
//! measurements used by the analysis operations.
//!
//! Validity and predicates are evaluated exactly on the default `10^8` lattice so they agree
//! with the clipping engine about touching and shared boundaries.
mod geodesic;
mod predicates;
mod rhumb;
mod validity;

pub use geodesic::*;
pub use predicates::*;
pub use rhumb::*;
pub use validity::*;

use crate::geometry::{Coord, Geometry};

/// Signed shoelace area of a ring, positive for counter clockwise rings. The ring may be open or
/// closed.
///
/// # Examples
///
/// ```
/// # use map_analysis::planar::*;
/// # use map_analysis::core::math::vec2;
/// let ring = [vec2(0.0, 0.0), vec2(2.0, 0.0), vec2(2.0, 1.0), vec2(0.0, 1.0), vec2(0.0, 0.0)];
/// assert_eq!(ring_signed_area(&ring), 2.0);
/// let reversed: Vec<_> = ring.iter().rev().copied().collect();
/// assert_eq!(ring_signed_area(&reversed), -2.0);
/// ```
pub fn ring_signed_area(ring: &[Coord]) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }

    let origin = ring[0];
    let mut sum = 0.0;
    for i in 1..n - 1 {
        let a = ring[i] - origin;
        let b = ring[i + 1] - origin;
        sum += a.perp_dot(b);
    }
    sum / 2.0
}

/// Planar area of a polygon: shell area minus hole areas, independent of ring orientation.
pub fn polygon_area(rings: &[Vec<Coord>]) -> f64 {
    let mut rings = rings.iter();
    let shell = match rings.next() {
        Some(shell) => ring_signed_area(shell).abs(),
        None => return 0.0,
    };
    let holes: f64 = rings.map(|r| ring_signed_area(r).abs()).sum();
    (shell - holes).max(0.0)
}

/// Planar area in square CRS units, zero for punctual and linear geometries.
pub fn area(geometry: &Geometry) -> f64 {
    geometry.polygons().into_iter().map(|p| polygon_area(p)).sum()
}

/// Location of a point relative to an areal geometry.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PointLocation {
    Interior,
    Boundary,
    Exterior,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_fuzzy_eq;
    use crate::core::math::vec2;
    use crate::core::traits::FuzzyEq;

    #[test]
    fn polygon_with_hole_area() {
        let shell = vec![
            vec2(0.0, 0.0),
            vec2(10.0, 0.0),
            vec2(10.0, 10.0),
            vec2(0.0, 10.0),
            vec2(0.0, 0.0),
        ];
        // holes count negatively whatever their orientation
        let hole = vec![
            vec2(2.0, 2.0),
            vec2(4.0, 2.0),
            vec2(4.0, 4.0),
            vec2(2.0, 4.0),
            vec2(2.0, 2.0),
        ];
        assert_fuzzy_eq!(polygon_area(&[shell.clone(), hole]), 96.0);
        let g = Geometry::MultiPolygon(vec![vec![shell.clone()], vec![shell]]);
        assert_fuzzy_eq!(area(&g), 200.0);
        assert_fuzzy_eq!(area(&Geometry::Point(vec2(1.0, 1.0))), 0.0);
    }
}
