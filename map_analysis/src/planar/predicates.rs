use super::validity::encode_clean_ring;
use super::PointLocation;
use crate::clipping::{boolean, ring_contains_doubled, BooleanOp};
use crate::geometry::{Coord, Geometry};
use crate::lattice::{
    cross, on_segment, ring_area2, segments_cross, segments_intersect, IntPoint, IntPolygon,
    Lattice,
};
use crate::spatial_index::{build_index, segment_box};

#[inline]
fn doubled(p: IntPoint) -> IntPoint {
    IntPoint::new(2 * p.x, 2 * p.y)
}

/// Parts of a geometry on the lattice grouped by dimension.
#[derive(Debug)]
enum Parts {
    Points(Vec<IntPoint>),
    Lines(Vec<Vec<IntPoint>>),
    Polygons(Vec<IntPolygon>),
}

impl Parts {
    fn new(geometry: &Geometry) -> Self {
        let lattice = Lattice::DEFAULT;
        let line = |l: &[Coord]| -> Vec<IntPoint> {
            let mut result: Vec<IntPoint> = Vec::with_capacity(l.len());
            for &c in l {
                let p = lattice.encode(c);
                if result.last() != Some(&p) {
                    result.push(p);
                }
            }
            result
        };
        let polygon = |rings: &Vec<Vec<Coord>>| -> IntPolygon {
            rings
                .iter()
                .filter_map(|r| encode_clean_ring(lattice, r))
                .collect()
        };

        match geometry {
            Geometry::Point(p) => Parts::Points(vec![lattice.encode(*p)]),
            Geometry::MultiPoint(points) => {
                Parts::Points(points.iter().map(|&p| lattice.encode(p)).collect())
            }
            Geometry::LineString(l) => Parts::Lines(vec![line(l)]),
            Geometry::MultiLineString(lines) => {
                Parts::Lines(lines.iter().map(|l| line(l)).collect())
            }
            Geometry::Polygon(rings) => Parts::Polygons(vec![polygon(rings)]),
            Geometry::MultiPolygon(polygons) => {
                Parts::Polygons(polygons.iter().map(polygon).collect())
            }
        }
    }

    fn segments(&self) -> Vec<(IntPoint, IntPoint)> {
        match self {
            Parts::Points(_) => Vec::new(),
            Parts::Lines(lines) => lines
                .iter()
                .flat_map(|l| l.windows(2).map(|w| (w[0], w[1])))
                .collect(),
            Parts::Polygons(polygons) => polygons
                .iter()
                .flat_map(|p| p.iter())
                .flat_map(|ring| {
                    let n = ring.len();
                    (0..n).map(move |i| (ring[i], ring[(i + 1) % n]))
                })
                .collect(),
        }
    }

    fn vertexes(&self) -> Vec<IntPoint> {
        match self {
            Parts::Points(points) => points.clone(),
            Parts::Lines(lines) => lines.iter().flatten().copied().collect(),
            Parts::Polygons(polygons) => polygons.iter().flatten().flatten().copied().collect(),
        }
    }
}

/// Location of a doubled coordinate point relative to a set of polygons (union of their areas).
fn locate_doubled(m: IntPoint, polygons: &[IntPolygon]) -> PointLocation {
    let mut inside = false;
    for polygon in polygons {
        let mut crossings = 0usize;
        for ring in polygon {
            let n = ring.len();
            for i in 0..n {
                let (a, b) = (ring[i], ring[(i + 1) % n]);
                if on_segment(m, doubled(a), doubled(b)) {
                    return PointLocation::Boundary;
                }
            }
            if ring_contains_doubled(ring, m) {
                crossings += 1;
            }
        }
        if crossings % 2 == 1 {
            inside = true;
        }
    }

    if inside {
        PointLocation::Interior
    } else {
        PointLocation::Exterior
    }
}

/// Location of `point` relative to a polygon given as shell followed by holes.
///
/// # Examples
///
/// ```
/// # use map_analysis::planar::*;
/// # use map_analysis::core::math::vec2;
/// let square = vec![vec![
///     vec2(0.0, 0.0), vec2(2.0, 0.0), vec2(2.0, 2.0), vec2(0.0, 2.0), vec2(0.0, 0.0),
/// ]];
/// assert_eq!(locate_point(vec2(1.0, 1.0), &square), PointLocation::Interior);
/// assert_eq!(locate_point(vec2(2.0, 1.0), &square), PointLocation::Boundary);
/// assert_eq!(locate_point(vec2(3.0, 1.0), &square), PointLocation::Exterior);
/// ```
pub fn locate_point(point: Coord, rings: &[Vec<Coord>]) -> PointLocation {
    let lattice = Lattice::DEFAULT;
    let polygon: IntPolygon = rings
        .iter()
        .filter_map(|r| encode_clean_ring(lattice, r))
        .collect();
    locate_doubled(doubled(lattice.encode(point)), &[polygon])
}

/// True if any segment of `a` shares a point with any segment of `b`.
fn any_segments_intersect(a: &[(IntPoint, IntPoint)], b: &[(IntPoint, IntPoint)]) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    let index = build_index(b.iter().map(|&(p, q)| segment_box(p, q)));
    a.iter().any(|&(p, q)| {
        let bb = segment_box(p, q);
        index
            .query(bb.min_x, bb.min_y, bb.max_x, bb.max_y)
            .into_iter()
            .any(|j| segments_intersect(p, q, b[j].0, b[j].1))
    })
}

fn point_on_segments(p: IntPoint, segments: &[(IntPoint, IntPoint)]) -> bool {
    segments.iter().any(|&(a, b)| on_segment(p, a, b))
}

/// True if the geometries share at least one point (boundaries included).
pub fn intersects(a: &Geometry, b: &Geometry) -> bool {
    let (pa, pb) = (Parts::new(a), Parts::new(b));
    parts_intersect(&pa, &pb)
}

fn parts_intersect(a: &Parts, b: &Parts) -> bool {
    use Parts::*;
    match (a, b) {
        (Points(pa), Points(pb)) => pa.iter().any(|p| pb.contains(p)),
        (Points(points), Lines(_)) => {
            let segments = b.segments();
            points.iter().any(|&p| point_on_segments(p, &segments))
        }
        (Points(points), Polygons(polygons)) => points
            .iter()
            .any(|&p| locate_doubled(doubled(p), polygons) != PointLocation::Exterior),
        (Lines(_), Points(_)) | (Polygons(_), Points(_)) | (Polygons(_), Lines(_)) => {
            parts_intersect(b, a)
        }
        (Lines(_), Lines(_)) => any_segments_intersect(&a.segments(), &b.segments()),
        (Lines(lines), Polygons(polygons)) => {
            any_segments_intersect(&a.segments(), &b.segments())
                || lines.iter().filter_map(|l| l.first()).any(|&p| {
                    locate_doubled(doubled(p), polygons) != PointLocation::Exterior
                })
        }
        (Polygons(polygons_a), Polygons(polygons_b)) => {
            any_segments_intersect(&a.segments(), &b.segments())
                || b.vertexes().first().is_some_and(|&p| {
                    locate_doubled(doubled(p), polygons_a) != PointLocation::Exterior
                })
                || a.vertexes().first().is_some_and(|&p| {
                    locate_doubled(doubled(p), polygons_b) != PointLocation::Exterior
                })
        }
    }
}

/// Splits a segment at every vertex of `splitters` lying inside it, returns the doubled
/// midpoints of the resulting pieces.
fn piece_midpoints(p: IntPoint, q: IntPoint, splitters: &[IntPoint]) -> Vec<IntPoint> {
    let mut stops: Vec<IntPoint> = splitters
        .iter()
        .copied()
        .filter(|&v| v != p && v != q && on_segment(v, p, q))
        .collect();
    stops.sort_by_key(|&v| crate::lattice::dot(p, v, q));
    stops.dedup();
    stops.insert(0, p);
    stops.push(q);
    stops
        .windows(2)
        .map(|w| IntPoint::new(w[0].x + w[1].x, w[0].y + w[1].y))
        .collect()
}

/// True if `b` lies in `a` and the interiors of the two geometries share at least one point.
///
/// Polygon in polygon containment is decided with the clipping engine: `b` minus `a` must be
/// empty on the lattice.
pub fn contains(a: &Geometry, b: &Geometry) -> bool {
    let (pa, pb) = (Parts::new(a), Parts::new(b));
    use Parts::*;
    match (&pa, &pb) {
        (Polygons(outer), Polygons(inner)) => {
            let inner_area: i128 = inner
                .iter()
                .map(|p| {
                    let mut rings = p.iter();
                    let shell = rings.next().map(|r| ring_area2(r).abs()).unwrap_or(0);
                    shell - rings.map(|r| ring_area2(r).abs()).sum::<i128>()
                })
                .sum();
            inner_area > 0 && boolean(inner, outer, BooleanOp::Not).is_empty()
        }
        (Polygons(outer), Lines(_)) => {
            let boundary = pa.segments();
            let vertexes = pa.vertexes();
            let mut any_interior = false;
            for (p, q) in pb.segments() {
                if boundary.iter().any(|&(a1, a2)| segments_cross(p, q, a1, a2)) {
                    return false;
                }
                for m in piece_midpoints(p, q, &vertexes) {
                    match locate_doubled(m, outer) {
                        PointLocation::Exterior => return false,
                        PointLocation::Interior => any_interior = true,
                        PointLocation::Boundary => {}
                    }
                }
            }
            any_interior
        }
        (Polygons(outer), Points(points)) => {
            let mut any_interior = false;
            for &p in points {
                match locate_doubled(doubled(p), outer) {
                    PointLocation::Exterior => return false,
                    PointLocation::Interior => any_interior = true,
                    PointLocation::Boundary => {}
                }
            }
            any_interior
        }
        (Lines(_), Lines(_)) => {
            let covering = pa.segments();
            let vertexes = pa.vertexes();
            let segments = pb.segments();
            !segments.is_empty()
                && segments.iter().all(|&(p, q)| {
                    piece_midpoints(p, q, &vertexes).into_iter().all(|m| {
                        covering.iter().any(|&(a1, a2)| {
                            cross(a1, a2, p) == 0
                                && cross(a1, a2, q) == 0
                                && on_segment(m, doubled(a1), doubled(a2))
                        })
                    })
                })
        }
        (Lines(_), Points(points)) => {
            let covering = pa.segments();
            !points.is_empty() && points.iter().all(|&p| point_on_segments(p, &covering))
        }
        (Points(outer), Points(inner)) => {
            !inner.is_empty() && inner.iter().all(|p| outer.contains(p))
        }
        (Points(_), _) | (Lines(_), Polygons(_)) => false,
    }
}
