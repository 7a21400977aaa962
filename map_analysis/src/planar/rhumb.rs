use crate::core::math::{angle_degrees, dist_squared};
use crate::geometry::{segments, Coord, Geometry};
use serde::Serialize;
use std::fmt;

/// Quarter of the compass a segment heads into.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum RhumbDirection {
    NE,
    NW,
    SW,
    SE,
}

impl fmt::Display for RhumbDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RhumbDirection::NE => "NE",
            RhumbDirection::NW => "NW",
            RhumbDirection::SW => "SW",
            RhumbDirection::SE => "SE",
        };
        f.write_str(s)
    }
}

/// One segment of a rhumb path: direction, angle from the north/south axis in degrees and planar
/// length in CRS units.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct RhumbSegment {
    pub rhumb: RhumbDirection,
    pub angle: f64,
    pub distance: f64,
}

impl RhumbSegment {
    /// Rhumb of the segment `from` to `to`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use map_analysis::planar::*;
    /// # use map_analysis::core::math::vec2;
    /// # use map_analysis::core::traits::*;
    /// let s = RhumbSegment::between(vec2(0.0, 0.0), vec2(3.0, 3.0));
    /// assert_eq!(s.rhumb, RhumbDirection::NE);
    /// assert!(s.angle.fuzzy_eq(45.0));
    /// assert!(s.distance.fuzzy_eq(18f64.sqrt()));
    /// ```
    pub fn between(from: Coord, to: Coord) -> Self {
        let bearing = angle_degrees(from, to);
        // on the axes the east half wins, due south is SE with angle 0
        let (rhumb, angle) = if (-90.0..=0.0).contains(&bearing) {
            (RhumbDirection::SE, 90.0 + bearing)
        } else if (0.0..=90.0).contains(&bearing) {
            (RhumbDirection::NE, 90.0 - bearing)
        } else if bearing > 90.0 {
            (RhumbDirection::NW, bearing - 90.0)
        } else {
            (RhumbDirection::SW, -bearing - 90.0)
        };

        RhumbSegment {
            rhumb,
            angle,
            distance: dist_squared(from, to).sqrt(),
        }
    }
}

/// Kind of the part a rhumb path was computed for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum RhumbPathKind {
    LineString,
    Polygon,
}

/// Rhumbs of one line or ring.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RhumbPath {
    #[serde(rename = "type")]
    pub kind: RhumbPathKind,
    pub crs: String,
    pub start_point: Option<Coord>,
    /// Number of rhumbs skipped from the start, always zero.
    pub skip: usize,
    pub points: Vec<RhumbSegment>,
    /// Set for polygon rings only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hole: Option<bool>,
}

impl RhumbPath {
    fn new(kind: RhumbPathKind, crs: &str, seq: &[Coord], hole: Option<bool>) -> Self {
        let points = if seq.len() < 2 {
            Vec::new()
        } else {
            segments(seq).map(|(a, b)| RhumbSegment::between(a, b)).collect()
        };
        RhumbPath {
            kind,
            crs: crs.to_string(),
            start_point: if seq.len() < 2 { None } else { seq.first().copied() },
            skip: 0,
            points,
            hole,
        }
    }
}

/// Rhumb paths of every line and ring of a geometry whose coordinates are in `crs_name`.
///
/// Points have no rhumbs. Polygon rings are flagged as shell (`hole == Some(false)`) or hole.
pub fn rhumb(geometry: &Geometry, crs_name: &str) -> Vec<RhumbPath> {
    use RhumbPathKind::*;
    match geometry {
        Geometry::Point(_) | Geometry::MultiPoint(_) => Vec::new(),
        Geometry::LineString(line) => vec![RhumbPath::new(LineString, crs_name, line, None)],
        Geometry::MultiLineString(lines) => lines
            .iter()
            .map(|l| RhumbPath::new(LineString, crs_name, l, None))
            .collect(),
        Geometry::Polygon(rings) => polygon_paths(rings, crs_name).collect(),
        Geometry::MultiPolygon(polygons) => polygons
            .iter()
            .flat_map(|p| polygon_paths(p, crs_name))
            .collect(),
    }
}

fn polygon_paths<'a>(
    rings: &'a [Vec<Coord>],
    crs_name: &'a str,
) -> impl Iterator<Item = RhumbPath> + 'a {
    rings
        .iter()
        .enumerate()
        .map(move |(i, r)| RhumbPath::new(RhumbPathKind::Polygon, crs_name, r, Some(i > 0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assert_fuzzy_eq;
    use crate::core::math::vec2;
    use crate::core::traits::FuzzyEq;

    #[test]
    fn quadrants() {
        let o = vec2(0.0, 0.0);
        let cases = [
            (vec2(1.0, 0.0), RhumbDirection::SE, 90.0),
            (vec2(0.0, 1.0), RhumbDirection::NE, 0.0),
            (vec2(-1.0, 1.0), RhumbDirection::NW, 45.0),
            (vec2(-1.0, 0.0), RhumbDirection::NW, 90.0),
            (vec2(-1.0, -1.0), RhumbDirection::SW, 45.0),
            (vec2(0.0, -1.0), RhumbDirection::SE, 0.0),
            (vec2(1.0, -1.0), RhumbDirection::SE, 45.0),
        ];
        for (to, direction, angle) in cases {
            let s = RhumbSegment::between(o, to);
            assert_eq!(s.rhumb, direction, "{:?}", to);
            assert_fuzzy_eq!(s.angle, angle);
        }
    }

    #[test]
    fn polygon_rings_are_flagged() {
        let shell = vec![
            vec2(0.0, 0.0),
            vec2(4.0, 0.0),
            vec2(4.0, 4.0),
            vec2(0.0, 0.0),
        ];
        let hole = vec![
            vec2(3.0, 1.0),
            vec2(3.0, 2.0),
            vec2(2.0, 1.0),
            vec2(3.0, 1.0),
        ];
        let paths = rhumb(&Geometry::Polygon(vec![shell, hole]), "EPSG:3857");
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0].hole, Some(false));
        assert_eq!(paths[1].hole, Some(true));
        assert_eq!(paths[0].points.len(), 3);
        assert_eq!(paths[0].start_point, Some(vec2(0.0, 0.0)));
        assert_eq!(paths[0].crs, "EPSG:3857");
        assert_fuzzy_eq!(paths[0].points[0].distance, 4.0);
        assert_fuzzy_eq!(paths[0].points[2].distance, 32f64.sqrt());
    }

    #[test]
    fn lines_have_no_hole_flag() {
        let g = Geometry::MultiLineString(vec![
            vec![vec2(0.0, 0.0), vec2(1.0, 1.0)],
            vec![vec2(5.0, 5.0)],
        ]);
        let paths = rhumb(&g, "EPSG:4326");
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.kind == RhumbPathKind::LineString && p.hole.is_none()));
        assert!(paths[1].points.is_empty());
        assert!(paths[1].start_point.is_none());

        let json = serde_json::to_value(&paths[0]).unwrap();
        assert_eq!(json["type"], "LineString");
        assert_eq!(json["points"][0]["rhumb"], "NE");
        assert!(json.get("hole").is_none());
        assert!(rhumb(&Geometry::Point(vec2(0.0, 0.0)), "EPSG:4326").is_empty());
    }
}
