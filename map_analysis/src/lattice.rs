//! Fixed precision integer lattice used by the clipping engine.
//!
//! Geographic coordinates are scaled and rounded onto an `i64` grid so clipping can run with
//! exact integer arithmetic. The same [Lattice] must be used to encode and decode within one
//! operation.
use crate::core::math::vec2;
use crate::geometry::{close_ring, Coord, Geometry};
use serde::{Deserialize, Serialize};

/// Point on the integer lattice.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct IntPoint {
    pub x: i64,
    pub y: i64,
}

impl IntPoint {
    #[inline]
    pub const fn new(x: i64, y: i64) -> Self {
        IntPoint { x, y }
    }
}

/// Ring on the lattice, stored open (no repeated closing point).
pub type IntRing = Vec<IntPoint>;

/// Shell followed by hole rings.
pub type IntPolygon = Vec<IntRing>;

/// Integer counterpart of [Geometry].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntGeometry {
    Point(IntPoint),
    MultiPoint(Vec<IntPoint>),
    LineString(Vec<IntPoint>),
    MultiLineString(Vec<Vec<IntPoint>>),
    Polygon(IntPolygon),
    MultiPolygon(Vec<IntPolygon>),
}

/// Scale factor of the lattice, `x = round(lng * scale)`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lattice {
    pub scale: f64,
}

impl Lattice {
    /// `10^8`, one unit is about a millimetre at the equator.
    pub const DEFAULT: Lattice = Lattice { scale: 1e8 };

    pub const fn new(scale: f64) -> Self {
        Lattice { scale }
    }

    /// Encodes a position.
    ///
    /// # Examples
    ///
    /// ```
    /// # use map_analysis::lattice::*;
    /// # use map_analysis::core::math::vec2;
    /// let p = Lattice::DEFAULT.encode(vec2(37.617_635_12, -55.5));
    /// assert_eq!(p, IntPoint::new(3_761_763_512, -5_550_000_000));
    /// assert_eq!(Lattice::DEFAULT.decode(p), vec2(37.617_635_12, -55.5));
    /// ```
    #[inline]
    pub fn encode(&self, c: Coord) -> IntPoint {
        IntPoint::new((c.x * self.scale).round() as i64, (c.y * self.scale).round() as i64)
    }

    #[inline]
    pub fn decode(&self, p: IntPoint) -> Coord {
        vec2(p.x as f64 / self.scale, p.y as f64 / self.scale)
    }

    /// Position snapped to the lattice grid.
    #[inline]
    pub fn snap(&self, c: Coord) -> Coord {
        self.decode(self.encode(c))
    }

    /// Encodes a ring, dropping the closing point if present.
    pub fn encode_ring(&self, ring: &[Coord]) -> IntRing {
        let mut result: IntRing = ring.iter().map(|&c| self.encode(c)).collect();
        if result.len() > 1 && result.first() == result.last() {
            result.pop();
        }
        result
    }

    /// Decodes a ring, appending the first point when the ring is not closed.
    pub fn decode_ring(&self, ring: &[IntPoint]) -> Vec<Coord> {
        close_ring(ring.iter().map(|&p| self.decode(p)).collect())
    }

    pub fn encode_polygon(&self, rings: &[Vec<Coord>]) -> IntPolygon {
        rings.iter().map(|r| self.encode_ring(r)).collect()
    }

    pub fn decode_polygon(&self, rings: &[IntRing]) -> Vec<Vec<Coord>> {
        rings.iter().map(|r| self.decode_ring(r)).collect()
    }

    fn encode_seq(&self, seq: &[Coord]) -> Vec<IntPoint> {
        seq.iter().map(|&c| self.encode(c)).collect()
    }

    fn decode_seq(&self, seq: &[IntPoint]) -> Vec<Coord> {
        seq.iter().map(|&p| self.decode(p)).collect()
    }

    pub fn to_integer_points(&self, geometry: &Geometry) -> IntGeometry {
        match geometry {
            Geometry::Point(p) => IntGeometry::Point(self.encode(*p)),
            Geometry::MultiPoint(points) => IntGeometry::MultiPoint(self.encode_seq(points)),
            Geometry::LineString(line) => IntGeometry::LineString(self.encode_seq(line)),
            Geometry::MultiLineString(lines) => {
                IntGeometry::MultiLineString(lines.iter().map(|l| self.encode_seq(l)).collect())
            }
            Geometry::Polygon(rings) => IntGeometry::Polygon(self.encode_polygon(rings)),
            Geometry::MultiPolygon(polygons) => IntGeometry::MultiPolygon(
                polygons.iter().map(|p| self.encode_polygon(p)).collect(),
            ),
        }
    }

    pub fn to_coordinates(&self, geometry: &IntGeometry) -> Geometry {
        match geometry {
            IntGeometry::Point(p) => Geometry::Point(self.decode(*p)),
            IntGeometry::MultiPoint(points) => Geometry::MultiPoint(self.decode_seq(points)),
            IntGeometry::LineString(line) => Geometry::LineString(self.decode_seq(line)),
            IntGeometry::MultiLineString(lines) => {
                Geometry::MultiLineString(lines.iter().map(|l| self.decode_seq(l)).collect())
            }
            IntGeometry::Polygon(rings) => Geometry::Polygon(self.decode_polygon(rings)),
            IntGeometry::MultiPolygon(polygons) => Geometry::MultiPolygon(
                polygons.iter().map(|p| self.decode_polygon(p)).collect(),
            ),
        }
    }
}

impl Default for Lattice {
    fn default() -> Self {
        Lattice::DEFAULT
    }
}

/// Perpendicular product of `a - o` and `b - o`, positive when `o -> a -> b` turns left.
#[inline]
pub fn cross(o: IntPoint, a: IntPoint, b: IntPoint) -> i128 {
    let (ax, ay) = ((a.x - o.x) as i128, (a.y - o.y) as i128);
    let (bx, by) = ((b.x - o.x) as i128, (b.y - o.y) as i128);
    ax * by - ay * bx
}

/// Dot product of `a - o` and `b - o`.
#[inline]
pub fn dot(o: IntPoint, a: IntPoint, b: IntPoint) -> i128 {
    let (ax, ay) = ((a.x - o.x) as i128, (a.y - o.y) as i128);
    let (bx, by) = ((b.x - o.x) as i128, (b.y - o.y) as i128);
    ax * bx + ay * by
}

#[inline]
pub(crate) fn within_box(p: IntPoint, a: IntPoint, b: IntPoint) -> bool {
    a.x.min(b.x) <= p.x && p.x <= a.x.max(b.x) && a.y.min(b.y) <= p.y && p.y <= a.y.max(b.y)
}

/// True if `p` lies on the closed segment `a` to `b`.
#[inline]
pub fn on_segment(p: IntPoint, a: IntPoint, b: IntPoint) -> bool {
    cross(a, b, p) == 0 && within_box(p, a, b)
}

/// True if the closed segments `a1 -> a2` and `b1 -> b2` share at least one point.
pub fn segments_intersect(a1: IntPoint, a2: IntPoint, b1: IntPoint, b2: IntPoint) -> bool {
    let d1 = cross(b1, b2, a1).signum();
    let d2 = cross(b1, b2, a2).signum();
    let d3 = cross(a1, a2, b1).signum();
    let d4 = cross(a1, a2, b2).signum();

    if d1 * d2 < 0 && d3 * d4 < 0 {
        return true;
    }

    (d1 == 0 && within_box(a1, b1, b2))
        || (d2 == 0 && within_box(a2, b1, b2))
        || (d3 == 0 && within_box(b1, a1, a2))
        || (d4 == 0 && within_box(b2, a1, a2))
}

/// True if the segments cross at a single point interior to both of them.
pub fn segments_cross(a1: IntPoint, a2: IntPoint, b1: IntPoint, b2: IntPoint) -> bool {
    let d1 = cross(b1, b2, a1).signum();
    let d2 = cross(b1, b2, a2).signum();
    let d3 = cross(a1, a2, b1).signum();
    let d4 = cross(a1, a2, b2).signum();
    d1 * d2 < 0 && d3 * d4 < 0
}

/// Twice the signed area of an open ring, positive for counter clockwise rings.
pub fn ring_area2(ring: &[IntPoint]) -> i128 {
    if ring.len() < 3 {
        return 0;
    }
    let origin = ring[0];
    ring.windows(2)
        .skip(1)
        .map(|w| cross(origin, w[0], w[1]))
        .sum()
}

/// Encodes with the default `10^8` lattice.
pub fn to_integer_points(geometry: &Geometry) -> IntGeometry {
    Lattice::DEFAULT.to_integer_points(geometry)
}

/// Decodes with the default `10^8` lattice.
pub fn to_coordinates(geometry: &IntGeometry) -> Geometry {
    Lattice::DEFAULT.to_coordinates(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_closing() {
        let lattice = Lattice::new(10.0);
        let open = [IntPoint::new(0, 0), IntPoint::new(10, 0), IntPoint::new(10, 10)];
        let ring = lattice.decode_ring(&open);
        assert_eq!(ring.len(), 4);
        assert_eq!(ring[3], vec2(0.0, 0.0));

        let closed = [IntPoint::new(0, 0), IntPoint::new(10, 0), IntPoint::new(0, 0)];
        assert_eq!(lattice.decode_ring(&closed).len(), 3);

        let encoded = lattice.encode_ring(&ring);
        assert_eq!(encoded, open.to_vec());
    }

    #[test]
    fn segment_predicates() {
        let p = IntPoint::new;
        assert!(segments_cross(p(0, 0), p(4, 4), p(0, 4), p(4, 0)));
        assert!(segments_intersect(p(0, 0), p(4, 4), p(0, 4), p(4, 0)));
        // touching at an end point is an intersection but not a crossing
        assert!(!segments_cross(p(0, 0), p(4, 0), p(2, 0), p(2, 3)));
        assert!(segments_intersect(p(0, 0), p(4, 0), p(2, 0), p(2, 3)));
        // collinear overlap
        assert!(segments_intersect(p(0, 0), p(4, 0), p(3, 0), p(6, 0)));
        assert!(!segments_intersect(p(0, 0), p(2, 0), p(3, 0), p(6, 0)));
        assert!(on_segment(p(1, 1), p(0, 0), p(3, 3)));
        assert!(!on_segment(p(4, 4), p(0, 0), p(3, 3)));
    }

    #[test]
    fn signed_area() {
        let p = IntPoint::new;
        let ccw = [p(0, 0), p(4, 0), p(4, 3), p(0, 3)];
        assert_eq!(ring_area2(&ccw), 24);
        let cw: Vec<_> = ccw.iter().rev().copied().collect();
        assert_eq!(ring_area2(&cw), -24);
    }

    #[test]
    fn rounding_to_nearest() {
        let lattice = Lattice::new(1e4);
        assert_eq!(lattice.encode(vec2(0.123_449, -0.123_451)), IntPoint::new(1234, -1235));
        assert_eq!(lattice.snap(vec2(1.000_04, 2.000_06)), vec2(1.0, 2.0001));
    }
}
