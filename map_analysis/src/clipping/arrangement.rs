use super::{BooleanOp, FillRule};
use crate::lattice::{cross, dot, within_box, IntPoint, IntPolygon};
use crate::spatial_index::{build_index, segment_box};
use log::trace;
use std::collections::BTreeMap;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Operand {
    Subject,
    Clip,
}

/// Input edge tagged with the polygon it came from.
#[derive(Debug, Copy, Clone)]
struct TaggedEdge {
    a: IntPoint,
    b: IntPoint,
    polygon: usize,
}

/// Sub-edge of the arrangement: stored with its smaller end point first.
#[derive(Debug, Clone)]
struct SubEdge {
    u: IntPoint,
    v: IntPoint,
    /// Polygons owning this sub-edge, a polygon appears once per coincident edge it contributes.
    owners: Vec<usize>,
}

/// Planar arrangement of every edge of both operands, split at every mutual intersection so that
/// sub-edges only meet at their end points.
#[derive(Debug)]
pub(crate) struct Arrangement {
    edges: Vec<SubEdge>,
    operands: Vec<Operand>,
    fill: FillRule,
}

/// Removes repeated points (including the closing point), `None` if fewer than 3 points remain.
fn normalize_ring(ring: &[IntPoint]) -> Option<Vec<IntPoint>> {
    let mut result: Vec<IntPoint> = Vec::with_capacity(ring.len());
    for &p in ring {
        if result.last() != Some(&p) {
            result.push(p);
        }
    }
    while result.len() > 1 && result.first() == result.last() {
        result.pop();
    }
    (result.len() >= 3).then_some(result)
}

/// Integer division rounding half away from zero.
#[inline]
fn div_round(n: i128, d: i128) -> i128 {
    let (n, d) = if d < 0 { (-n, -d) } else { (n, d) };
    if n >= 0 {
        (2 * n + d) / (2 * d)
    } else {
        -((-2 * n + d) / (2 * d))
    }
}

/// `delta * d1 / den` rounded to the nearest integer.
///
/// Exact while `delta * d1` fits in `i128`. The product grows with the cube of the edge length,
/// long edges in projected CRSs (metres on the `10^8` lattice) overflow it and are scaled through
/// the `f64` parameter `d1 / den` instead, which stays within one lattice unit.
#[inline]
fn scaled_offset(delta: i64, d1: i128, den: i128) -> i128 {
    match (delta as i128).checked_mul(d1) {
        // div_round doubles the numerator and adds the denominator
        Some(n) if n.checked_mul(4).is_some() => div_round(n, den),
        _ => {
            let t = d1 as f64 / den as f64;
            (delta as f64 * t).round() as i128
        }
    }
}

/// Point where segment `a1 -> a2` crosses the other segment's line, `d1`/`d2` being the
/// orientations of `a1`/`a2` relative to that line. Rounded to the lattice.
#[inline]
fn crossing_point(a1: IntPoint, a2: IntPoint, d1: i128, d2: i128) -> IntPoint {
    let den = d1 - d2;
    let x = a1.x as i128 + scaled_offset(a2.x - a1.x, d1, den);
    let y = a1.y as i128 + scaled_offset(a2.y - a1.y, d1, den);
    IntPoint::new(x as i64, y as i64)
}

/// Collects the points at which each of the two segments must be split.
fn collect_split_points(
    a1: IntPoint,
    a2: IntPoint,
    b1: IntPoint,
    b2: IntPoint,
    out_a: &mut Vec<IntPoint>,
    out_b: &mut Vec<IntPoint>,
) {
    let d1 = cross(b1, b2, a1);
    let d2 = cross(b1, b2, a2);
    let d3 = cross(a1, a2, b1);
    let d4 = cross(a1, a2, b2);

    if d1.signum() * d2.signum() < 0 && d3.signum() * d4.signum() < 0 {
        let p = crossing_point(a1, a2, d1, d2);
        out_a.push(p);
        out_b.push(p);
        return;
    }

    // touches and collinear overlaps: end points lying on the other segment
    if d1 == 0 && within_box(a1, b1, b2) {
        out_b.push(a1);
    }
    if d2 == 0 && within_box(a2, b1, b2) {
        out_b.push(a2);
    }
    if d3 == 0 && within_box(b1, a1, a2) {
        out_a.push(b1);
    }
    if d4 == 0 && within_box(b2, a1, a2) {
        out_a.push(b2);
    }
}

/// Splits every edge at its intersections with every other edge, returns for each edge the
/// ordered points from its start to its end.
fn split_edges(edges: &[TaggedEdge]) -> Vec<Vec<IntPoint>> {
    let index = build_index(edges.iter().map(|e| segment_box(e.a, e.b)));
    let mut splits: Vec<Vec<IntPoint>> = edges.iter().map(|_| Vec::new()).collect();

    for (i, e) in edges.iter().enumerate() {
        let bb = segment_box(e.a, e.b);
        for j in index.query(bb.min_x, bb.min_y, bb.max_x, bb.max_y) {
            if j <= i {
                continue;
            }
            let f = &edges[j];
            let (head, tail) = splits.split_at_mut(j);
            collect_split_points(e.a, e.b, f.a, f.b, &mut head[i], &mut tail[0]);
        }
    }

    edges
        .iter()
        .zip(splits)
        .map(|(e, mut points)| {
            let len2 = dot(e.a, e.b, e.b);
            // rounded crossing points may land beyond the end points, those are dropped
            points.retain(|&p| {
                let t = dot(e.a, p, e.b);
                t > 0 && t < len2
            });
            points.sort_by_key(|&p| dot(e.a, p, e.b));
            points.dedup();
            points.insert(0, e.a);
            points.push(e.b);
            points
        })
        .collect()
}

/// Returns true if a ray cast in the `+x` direction from `m` crosses the edge `p -> q`, with `m`
/// in doubled coordinates.
///
/// Half-open rule: an edge counts when `min(y) <= m.y < max(y)` and the crossing lies strictly
/// right of `m`. Equivalent to casting the ray from a point infinitesimally above and right of
/// `m`, with the vertical offset much smaller than the horizontal one.
#[inline]
pub(crate) fn ray_crosses(m: IntPoint, p: IntPoint, q: IntPoint) -> bool {
    let (px, py) = (2 * p.x, 2 * p.y);
    let (qx, qy) = (2 * q.x, 2 * q.y);
    let in_range = (py <= m.y && m.y < qy) || (qy <= m.y && m.y < py);
    if !in_range {
        return false;
    }

    let dy = (qy - py) as i128;
    let dx = (qx - px) as i128;
    let num = (px - m.x) as i128 * dy + (m.y - py) as i128 * dx;
    num.signum() * dy.signum() > 0
}

impl Arrangement {
    pub(crate) fn new(subject: &[IntPolygon], clip: &[IntPolygon], fill: FillRule) -> Self {
        let mut operands = Vec::with_capacity(subject.len() + clip.len());
        let mut input = Vec::new();
        for (operand, polygons) in [(Operand::Subject, subject), (Operand::Clip, clip)] {
            for polygon in polygons {
                let id = operands.len();
                operands.push(operand);
                for ring in polygon.iter().filter_map(|r| normalize_ring(r)) {
                    let n = ring.len();
                    input.extend((0..n).map(|i| TaggedEdge {
                        a: ring[i],
                        b: ring[(i + 1) % n],
                        polygon: id,
                    }));
                }
            }
        }

        let split = split_edges(&input);
        let mut unique: BTreeMap<(IntPoint, IntPoint), Vec<usize>> = BTreeMap::new();
        for (edge, points) in input.iter().zip(split.iter()) {
            for w in points.windows(2) {
                let (a, b) = (w[0], w[1]);
                if a == b {
                    continue;
                }
                let key = if a < b { (a, b) } else { (b, a) };
                unique.entry(key).or_default().push(edge.polygon);
            }
        }

        trace!(
            "arrangement of {} input edges has {} sub-edges",
            input.len(),
            unique.len()
        );

        let edges = unique
            .into_iter()
            .map(|((u, v), owners)| SubEdge { u, v, owners })
            .collect();

        Self {
            edges,
            operands,
            fill,
        }
    }

    /// Fill of (subject, clip) given the per polygon crossing parity.
    fn fill(&self, parity: &BTreeMap<usize, bool>) -> (bool, bool) {
        let mut subject = false;
        let mut clip = false;
        for (&polygon, &inside) in parity {
            if !inside {
                continue;
            }
            let filled = match self.operands[polygon] {
                Operand::Subject => &mut subject,
                Operand::Clip => &mut clip,
            };
            match self.fill {
                FillRule::EvenOdd => *filled = !*filled,
                FillRule::PolygonUnion => *filled = true,
            }
        }
        (subject, clip)
    }

    /// Sub-edges bounding the result of `op`, directed so that the result lies on their left.
    pub(crate) fn boundary(&self, op: BooleanOp) -> Vec<(IntPoint, IntPoint)> {
        if self.edges.is_empty() {
            return Vec::new();
        }

        let index = build_index(self.edges.iter().map(|e| segment_box(e.u, e.v)));
        let max_x = self
            .edges
            .iter()
            .map(|e| e.u.x.max(e.v.x))
            .max()
            .unwrap_or_default() as f64;

        let mut result = Vec::new();
        for edge in &self.edges {
            let m = IntPoint::new(edge.u.x + edge.v.x, edge.u.y + edge.v.y);
            let min_x = m.x as f64 / 2.0;
            let y = m.y as f64 / 2.0;

            let mut probe_parity: BTreeMap<usize, bool> = BTreeMap::new();
            for k in index.query(min_x, y, max_x, y) {
                let other = &self.edges[k];
                if ray_crosses(m, other.u, other.v) {
                    for &polygon in &other.owners {
                        *probe_parity.entry(polygon).or_default() ^= true;
                    }
                }
            }

            let mut across_parity = probe_parity.clone();
            for &polygon in &edge.owners {
                *across_parity.entry(polygon).or_default() ^= true;
            }

            let (s, c) = self.fill(&probe_parity);
            let probe_result = op.apply(s, c);
            let (s, c) = self.fill(&across_parity);
            let across_result = op.apply(s, c);
            if probe_result == across_result {
                continue;
            }

            let dx = edge.v.x - edge.u.x;
            let dy = edge.v.y - edge.u.y;
            let probe_is_left = dy < 0 || (dy == 0 && dx > 0);
            let left_result = if probe_is_left {
                probe_result
            } else {
                across_result
            };

            if left_result {
                result.push((edge.u, edge.v));
            } else {
                result.push((edge.v, edge.u));
            }
        }

        result
    }
}
