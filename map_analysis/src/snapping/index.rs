use super::MapView;
use crate::core::math::{
    line_seg_closest_point, min_max, parametric_from_point, point_from_parametric, vec2,
};
use crate::geometry::{segments, visit_sequences, Coord, Geometry};
use crate::spatial_index::build_index;
use static_aabb2d_index::{StaticAABB2DIndex, AABB};
use std::fmt;

/// What a snap target lies on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SnapKind {
    Vertex,
    Segment,
}

/// Snap candidate for a cursor position.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SnapTarget {
    /// Longitude/latitude of the target.
    pub point: Coord,
    pub kind: SnapKind,
    /// Screen distance between the cursor and the target in pixels.
    pub distance_px: f64,
}

/// Spatial index over the vertexes and segments of the snap layers' geometries (longitude and
/// latitude).
pub struct SnapIndex {
    vertexes: Vec<Coord>,
    segments: Vec<(Coord, Coord)>,
    vertex_index: Option<StaticAABB2DIndex<f64>>,
    segment_index: Option<StaticAABB2DIndex<f64>>,
}

impl fmt::Debug for SnapIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapIndex")
            .field("vertexes", &self.vertexes.len())
            .field("segments", &self.segments.len())
            .finish()
    }
}

fn segment_aabb(a: Coord, b: Coord) -> AABB<f64> {
    let (min_x, max_x) = min_max(a.x, b.x);
    let (min_y, max_y) = min_max(a.y, b.y);
    AABB::new(min_x, min_y, max_x, max_y)
}

impl SnapIndex {
    pub fn new<'a, I>(geometries: I) -> Self
    where
        I: IntoIterator<Item = &'a Geometry>,
    {
        let mut vertexes = Vec::new();
        let mut segs = Vec::new();
        for geometry in geometries {
            visit_sequences(geometry, |seq| {
                let closed = seq.len() > 2 && seq.first() == seq.last();
                let open_len = if closed { seq.len() - 1 } else { seq.len() };
                vertexes.extend_from_slice(&seq[..open_len]);
                if !matches!(geometry, Geometry::Point(_) | Geometry::MultiPoint(_)) {
                    segs.extend(segments(seq).filter(|(a, b)| a != b));
                }
            });
        }

        let vertex_index = (!vertexes.is_empty())
            .then(|| build_index(vertexes.iter().map(|v| AABB::new(v.x, v.y, v.x, v.y))));
        let segment_index = (!segs.is_empty())
            .then(|| build_index(segs.iter().map(|&(a, b)| segment_aabb(a, b))));

        SnapIndex {
            vertexes,
            segments: segs,
            vertex_index,
            segment_index,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertexes.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertexes.len()
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Nearest snap target within `distance_px` screen pixels of the `screen` cursor position.
    ///
    /// A vertex in range always wins over segments. Unless `only_vertex` is set, the closest
    /// point along a segment in range is returned when no vertex is.
    pub fn nearest<V>(
        &self,
        view: &V,
        screen: Coord,
        distance_px: f64,
        only_vertex: bool,
    ) -> Option<SnapTarget>
    where
        V: MapView + ?Sized,
    {
        let query = Self::query_box(view, screen, distance_px);

        if let Some(index) = &self.vertex_index {
            let mut best: Option<SnapTarget> = None;
            for i in index.query(query.min_x, query.min_y, query.max_x, query.max_y) {
                let vertex = self.vertexes[i];
                let d = (view.lnglat_to_screen(vertex) - screen).length();
                if d <= distance_px && best.is_none_or(|b| d < b.distance_px) {
                    best = Some(SnapTarget {
                        point: vertex,
                        kind: SnapKind::Vertex,
                        distance_px: d,
                    });
                }
            }
            if best.is_some() {
                return best;
            }
        }

        if only_vertex {
            return None;
        }

        let index = self.segment_index.as_ref()?;
        let mut best: Option<SnapTarget> = None;
        for i in index.query(query.min_x, query.min_y, query.max_x, query.max_y) {
            let (a, b) = self.segments[i];
            let s0 = view.lnglat_to_screen(a);
            let s1 = view.lnglat_to_screen(b);
            let closest = line_seg_closest_point(s0, s1, screen);
            let d = (closest - screen).length();
            if d <= distance_px && best.is_none_or(|t| d < t.distance_px) {
                let t = parametric_from_point(s0, s1, closest, 1e-9);
                best = Some(SnapTarget {
                    point: point_from_parametric(a, b, t),
                    kind: SnapKind::Segment,
                    distance_px: d,
                });
            }
        }

        best
    }

    /// Longitude/latitude box covering the screen square of half side `distance_px` around
    /// `screen`.
    fn query_box<V>(view: &V, screen: Coord, distance_px: f64) -> AABB<f64>
    where
        V: MapView + ?Sized,
    {
        let d = distance_px;
        let corners = [
            vec2(screen.x - d, screen.y - d),
            vec2(screen.x + d, screen.y - d),
            vec2(screen.x + d, screen.y + d),
            vec2(screen.x - d, screen.y + d),
        ]
        .map(|c| view.screen_to_lnglat(c));

        corners.iter().skip(1).fold(
            AABB::new(corners[0].x, corners[0].y, corners[0].x, corners[0].y),
            |b, c| {
                AABB::new(
                    b.min_x.min(c.x),
                    b.min_y.min(c.y),
                    b.max_x.max(c.x),
                    b.max_y.max(c.y),
                )
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crs::CrsDescriptor;
    use crate::snapping::Cursor;

    /// One degree is 100 pixels, screen y grows downwards.
    struct GridView;

    impl MapView for GridView {
        fn crs(&self) -> CrsDescriptor {
            CrsDescriptor::wgs84()
        }

        fn lnglat_to_screen(&self, lnglat: Coord) -> Coord {
            vec2(lnglat.x * 100.0, -lnglat.y * 100.0)
        }

        fn screen_to_lnglat(&self, screen: Coord) -> Coord {
            vec2(screen.x / 100.0, -screen.y / 100.0)
        }

        fn set_cursor(&self, _cursor: Cursor) {}

        fn show_marker(&self, _lnglat: Coord) {}

        fn hide_marker(&self) {}
    }

    fn square() -> Geometry {
        Geometry::Polygon(vec![vec![
            vec2(0.0, 0.0),
            vec2(1.0, 0.0),
            vec2(1.0, 1.0),
            vec2(0.0, 1.0),
            vec2(0.0, 0.0),
        ]])
    }

    #[test]
    fn closing_vertex_is_not_duplicated() {
        let g = square();
        let index = SnapIndex::new([&g]);
        assert_eq!(index.vertex_count(), 4);
        assert_eq!(index.segment_count(), 4);
        let points = Geometry::MultiPoint(vec![vec2(5.0, 5.0), vec2(6.0, 6.0)]);
        let index = SnapIndex::new([&points]);
        assert_eq!(index.vertex_count(), 2);
        assert_eq!(index.segment_count(), 0);
    }

    #[test]
    fn vertex_wins_over_segment() {
        let g = square();
        let index = SnapIndex::new([&g]);
        // 3 px right and 4 px below the (1, 1) corner
        let target = index.nearest(&GridView, vec2(103.0, -96.0), 10.0, false).unwrap();
        assert_eq!(target.kind, SnapKind::Vertex);
        assert_eq!(target.point, vec2(1.0, 1.0));
        assert!((target.distance_px - 5.0).abs() < 1e-9);
    }

    #[test]
    fn segment_point_when_no_vertex_in_range() {
        let g = square();
        let index = SnapIndex::new([&g]);
        let cursor = vec2(50.0, 3.0);
        let target = index.nearest(&GridView, cursor, 5.0, false).unwrap();
        assert_eq!(target.kind, SnapKind::Segment);
        assert!((target.point.x - 0.5).abs() < 1e-9);
        assert!(target.point.y.abs() < 1e-9);
        assert!(index.nearest(&GridView, cursor, 5.0, true).is_none());
        assert!(index.nearest(&GridView, cursor, 2.0, false).is_none());
    }

    #[test]
    fn empty_index() {
        let index = SnapIndex::new(std::iter::empty());
        assert!(index.is_empty());
        assert!(index.nearest(&GridView, vec2(0.0, 0.0), 100.0, false).is_none());
    }
}
