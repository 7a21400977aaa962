use crate::clipping::ring_contains_doubled;
use crate::geometry::{Coord, Geometry};
use crate::lattice::{
    cross, dot, ring_area2, segments_cross, segments_intersect, IntPoint, IntRing, Lattice,
};
use crate::spatial_index::{build_index, segment_box};

/// Open lattice ring without repeated consecutive points, `None` if it cannot form a ring.
pub(crate) fn encode_clean_ring(lattice: Lattice, ring: &[Coord]) -> Option<IntRing> {
    let mut result: IntRing = Vec::with_capacity(ring.len());
    for &c in ring {
        let p = lattice.encode(c);
        if result.last() != Some(&p) {
            result.push(p);
        }
    }
    while result.len() > 1 && result.first() == result.last() {
        result.pop();
    }
    (result.len() >= 3).then_some(result)
}

fn all_finite(seq: &[Coord]) -> bool {
    seq.iter().all(|c| c.is_finite())
}

fn is_valid_line(line: &[Coord]) -> bool {
    all_finite(line) && line.windows(2).any(|w| w[0] != w[1])
}

/// True if the two segments are collinear and share a part of positive length.
fn segments_overlap(a1: IntPoint, a2: IntPoint, b1: IntPoint, b2: IntPoint) -> bool {
    if cross(a1, a2, b1) != 0 || cross(a1, a2, b2) != 0 {
        return false;
    }
    let len = dot(a1, a2, a2);
    let t1 = dot(a1, b1, a2);
    let t2 = dot(a1, b2, a2);
    let (lo, hi) = (t1.min(t2), t1.max(t2));
    lo.max(0) < hi.min(len)
}

struct RingEdge {
    ring: usize,
    index: usize,
    a: IntPoint,
    b: IntPoint,
}

/// Checks that no ring crosses itself or another ring. Rings may touch each other at points, a
/// ring may not touch itself.
fn rings_are_simple(rings: &[IntRing]) -> bool {
    let edges: Vec<RingEdge> = rings
        .iter()
        .enumerate()
        .flat_map(|(r, ring)| {
            let n = ring.len();
            (0..n).map(move |i| RingEdge {
                ring: r,
                index: i,
                a: ring[i],
                b: ring[(i + 1) % n],
            })
        })
        .collect();

    let index = build_index(edges.iter().map(|e| segment_box(e.a, e.b)));
    for (i, e) in edges.iter().enumerate() {
        let bb = segment_box(e.a, e.b);
        for j in index.query(bb.min_x, bb.min_y, bb.max_x, bb.max_y) {
            if j <= i {
                continue;
            }
            let f = &edges[j];
            if e.ring != f.ring {
                if segments_cross(e.a, e.b, f.a, f.b) || segments_overlap(e.a, e.b, f.a, f.b) {
                    return false;
                }
                continue;
            }

            let n = rings[e.ring].len();
            let adjacent = (e.index + 1) % n == f.index || (f.index + 1) % n == e.index;
            if adjacent {
                if segments_overlap(e.a, e.b, f.a, f.b) {
                    return false;
                }
            } else if segments_intersect(e.a, e.b, f.a, f.b) {
                return false;
            }
        }
    }

    true
}

/// Validity of one polygon (shell followed by holes).
///
/// Rings must be closed with at least 4 finite positions and non zero area, must not
/// self-intersect or cross each other, and every hole must lie inside the shell and outside the
/// other holes.
pub fn is_valid_polygon(rings: &[Vec<Coord>]) -> bool {
    if rings.is_empty() {
        return false;
    }

    for ring in rings {
        if ring.len() < 4 || ring.first() != ring.last() || !all_finite(ring) {
            return false;
        }
    }

    let lattice = Lattice::DEFAULT;
    let mut encoded = Vec::with_capacity(rings.len());
    for ring in rings {
        match encode_clean_ring(lattice, ring) {
            Some(r) if ring_area2(&r) != 0 => encoded.push(r),
            _ => return false,
        }
    }

    if !rings_are_simple(&encoded) {
        return false;
    }

    let shell = &encoded[0];
    let holes = &encoded[1..];
    for (i, hole) in holes.iter().enumerate() {
        let m = IntPoint::new(hole[0].x + hole[1].x, hole[0].y + hole[1].y);
        if !ring_contains_doubled(shell, m) {
            return false;
        }
        let nested = holes
            .iter()
            .enumerate()
            .any(|(j, other)| j != i && ring_contains_doubled(other, m));
        if nested {
            return false;
        }
    }

    true
}

/// OGC style validity check of a geometry.
///
/// # Examples
///
/// ```
/// # use map_analysis::planar::*;
/// # use map_analysis::geometry::*;
/// # use map_analysis::core::math::vec2;
/// let square = Geometry::Polygon(vec![vec![
///     vec2(0.0, 0.0), vec2(1.0, 0.0), vec2(1.0, 1.0), vec2(0.0, 1.0), vec2(0.0, 0.0),
/// ]]);
/// assert!(is_valid(&square));
///
/// let bow_tie = Geometry::Polygon(vec![vec![
///     vec2(0.0, 0.0), vec2(1.0, 1.0), vec2(1.0, 0.0), vec2(0.0, 1.0), vec2(0.0, 0.0),
/// ]]);
/// assert!(!is_valid(&bow_tie));
/// ```
pub fn is_valid(geometry: &Geometry) -> bool {
    match geometry {
        Geometry::Point(p) => p.is_finite(),
        Geometry::MultiPoint(points) => !points.is_empty() && all_finite(points),
        Geometry::LineString(line) => is_valid_line(line),
        Geometry::MultiLineString(lines) => {
            !lines.is_empty() && lines.iter().all(|l| is_valid_line(l))
        }
        Geometry::Polygon(rings) => is_valid_polygon(rings),
        Geometry::MultiPolygon(polygons) => {
            !polygons.is_empty()
                && polygons.iter().all(|p| is_valid_polygon(p))
                && parts_do_not_overlap(polygons)
        }
    }
}

/// Polygons of a multi polygon may only touch at points.
fn parts_do_not_overlap(polygons: &[Vec<Vec<Coord>>]) -> bool {
    let lattice = Lattice::DEFAULT;
    let shells: Vec<IntRing> = polygons
        .iter()
        .filter_map(|p| p.first().and_then(|s| encode_clean_ring(lattice, s)))
        .collect();

    for (i, a) in shells.iter().enumerate() {
        for b in shells.iter().skip(i + 1) {
            if !rings_are_simple(&[a.clone(), b.clone()]) {
                return false;
            }
            let ma = IntPoint::new(a[0].x + a[1].x, a[0].y + a[1].y);
            let mb = IntPoint::new(b[0].x + b[1].x, b[0].y + b[1].y);
            if ring_contains_doubled(b, ma) || ring_contains_doubled(a, mb) {
                return false;
            }
        }
    }

    true
}
