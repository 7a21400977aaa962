//! Boolean operations between polygon sets on the integer lattice.
//!
//! Works by building the planar arrangement of every ring edge of both operands (edges split at
//! all intersections), keeping the sub-edges across which the result of the operation changes and
//! stitching them back into rings. All predicates are exact integer arithmetic; only crossing
//! points are rounded to the lattice.
mod arrangement;
mod stitch;

use crate::error::{AnalysisError, Result};
use crate::geometry::{Geometry, PolygonRings};
use crate::lattice::{IntPolygon, Lattice};
use crate::planar;
use arrangement::Arrangement;
use log::{debug, warn};
use serde::Serialize;

pub(crate) use stitch::ring_contains_doubled;

/// Boolean operation to perform.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BooleanOp {
    /// Union of subject and clip.
    Or,
    /// Intersection of subject and clip.
    And,
    /// Subject with clip removed.
    Not,
    /// Areas covered by exactly one of the operands.
    Xor,
}

impl BooleanOp {
    #[inline]
    pub fn apply(self, in_subject: bool, in_clip: bool) -> bool {
        match self {
            BooleanOp::Or => in_subject || in_clip,
            BooleanOp::And => in_subject && in_clip,
            BooleanOp::Not => in_subject && !in_clip,
            BooleanOp::Xor => in_subject != in_clip,
        }
    }
}

/// How the rings of one operand make up its area.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FillRule {
    /// Every ring is an independent path and the operand's area is where an odd number of rings
    /// overlap, so overlapping polygons cancel out.
    EvenOdd,
    /// Even-odd inside each polygon, the polygons of the operand are unioned.
    PolygonUnion,
}

/// Performs `op` between two sets of lattice polygons with [FillRule::PolygonUnion].
///
/// Returned polygons have a counter clockwise shell followed by clockwise holes.
///
/// # Examples
///
/// ```
/// # use map_analysis::clipping::*;
/// # use map_analysis::lattice::*;
/// let square = |x, y, s| vec![vec![
///     IntPoint::new(x, y),
///     IntPoint::new(x + s, y),
///     IntPoint::new(x + s, y + s),
///     IntPoint::new(x, y + s),
/// ]];
/// // punch a hole in the middle
/// let result = boolean(&[square(0, 0, 10)], &[square(4, 4, 2)], BooleanOp::Not);
/// assert_eq!(result.len(), 1);
/// assert_eq!(result[0].len(), 2);
/// assert_eq!(ring_area2(&result[0][0]), 200);
/// assert_eq!(ring_area2(&result[0][1]), -8);
/// ```
pub fn boolean(subject: &[IntPolygon], clip: &[IntPolygon], op: BooleanOp) -> Vec<IntPolygon> {
    boolean_with_fill(subject, clip, op, FillRule::PolygonUnion)
}

/// Performs `op` between two sets of lattice polygons filled with `fill`.
pub fn boolean_with_fill(
    subject: &[IntPolygon],
    clip: &[IntPolygon],
    op: BooleanOp,
    fill: FillRule,
) -> Vec<IntPolygon> {
    let arrangement = Arrangement::new(subject, clip, fill);
    let boundary = arrangement.boundary(op);
    let rings = stitch::stitch(&boundary);
    stitch::group_rings(rings)
}

/// One polygon of a clip result with its planar area (square CRS units).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClipPolygon {
    pub rings: PolygonRings,
    pub area: f64,
}

impl ClipPolygon {
    pub fn to_geometry(&self) -> Geometry {
        Geometry::Polygon(self.rings.clone())
    }
}

/// Outcome of a geographic clip. Nothing usable remaining is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum ClipOutcome {
    Found(Vec<ClipPolygon>),
    NotFound,
}

impl ClipOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, ClipOutcome::Found(_))
    }

    pub fn polygons(&self) -> &[ClipPolygon] {
        match self {
            ClipOutcome::Found(polygons) => polygons,
            ClipOutcome::NotFound => &[],
        }
    }

    pub fn into_polygons(self) -> Vec<ClipPolygon> {
        match self {
            ClipOutcome::Found(polygons) => polygons,
            ClipOutcome::NotFound => Vec::new(),
        }
    }

    /// Total planar area of the result.
    pub fn area(&self) -> f64 {
        self.polygons().iter().map(|p| p.area).sum()
    }

    /// Converts into a result, `NotFound` becoming [AnalysisError::NoValidGeometry].
    pub fn into_result(self) -> Result<Vec<ClipPolygon>> {
        match self {
            ClipOutcome::Found(polygons) => Ok(polygons),
            ClipOutcome::NotFound => Err(AnalysisError::NoValidGeometry),
        }
    }

    /// Result as a single geometry: a polygon or a multi polygon.
    pub fn to_geometry(&self) -> Option<Geometry> {
        match self.polygons() {
            [] => None,
            [single] => Some(single.to_geometry()),
            many => Some(Geometry::MultiPolygon(
                many.iter().map(|p| p.rings.clone()).collect(),
            )),
        }
    }
}

/// Performs `op` between two sets of geographic polygons.
///
/// Both sets are encoded on `lattice`, clipped, decoded back, and every resulting polygon with
/// zero area or failing [planar::is_valid_polygon] is discarded.
pub fn clip<'a, S, C>(
    subject: S,
    clip: C,
    op: BooleanOp,
    fill: FillRule,
    lattice: Lattice,
) -> ClipOutcome
where
    S: IntoIterator<Item = &'a PolygonRings>,
    C: IntoIterator<Item = &'a PolygonRings>,
{
    let subject: Vec<IntPolygon> = subject
        .into_iter()
        .map(|p| lattice.encode_polygon(p))
        .collect();
    let clip: Vec<IntPolygon> = clip.into_iter().map(|p| lattice.encode_polygon(p)).collect();

    let raw = boolean_with_fill(&subject, &clip, op, fill);
    let raw_count = raw.len();

    let polygons: Vec<ClipPolygon> = raw
        .iter()
        .filter_map(|p| {
            let rings = lattice.decode_polygon(p);
            let area = planar::polygon_area(&rings);
            if area <= 0.0 {
                return None;
            }
            if !planar::is_valid_polygon(&rings) {
                warn!("discarding invalid {op:?} result polygon with area {area}");
                return None;
            }
            Some(ClipPolygon { rings, area })
        })
        .collect();

    debug!(
        "{op:?} of {} by {} polygons: {} raw, {} kept",
        subject.len(),
        clip.len(),
        raw_count,
        polygons.len()
    );

    if polygons.is_empty() {
        ClipOutcome::NotFound
    } else {
        ClipOutcome::Found(polygons)
    }
}

/// `subject` with `clip` removed, every ring of each side being an independent even-odd path.
pub fn difference<'a, S, C>(subject: S, clip: C, lattice: Lattice) -> ClipOutcome
where
    S: IntoIterator<Item = &'a PolygonRings>,
    C: IntoIterator<Item = &'a PolygonRings>,
{
    self::clip(subject, clip, BooleanOp::Not, FillRule::EvenOdd, lattice)
}

pub fn intersection<'a, S, C>(subject: S, clip: C, lattice: Lattice) -> ClipOutcome
where
    S: IntoIterator<Item = &'a PolygonRings>,
    C: IntoIterator<Item = &'a PolygonRings>,
{
    self::clip(subject, clip, BooleanOp::And, FillRule::PolygonUnion, lattice)
}

/// Dissolves every polygon of `polygons` into one polygon set.
pub fn union<'a, S>(polygons: S, lattice: Lattice) -> ClipOutcome
where
    S: IntoIterator<Item = &'a PolygonRings>,
{
    self::clip(polygons, std::iter::empty(), BooleanOp::Or, FillRule::PolygonUnion, lattice)
}
