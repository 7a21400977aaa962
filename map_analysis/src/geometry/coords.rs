use super::{Coord, Geometry};
use static_aabb2d_index::AABB;

/// Returns a copy of `geometry` with every position replaced by `f(position)`.
///
/// Dispatches over every geometry kind, errors from `f` stop the mapping and are returned.
pub fn try_map_coords<E, F>(geometry: &Geometry, mut f: F) -> Result<Geometry, E>
where
    F: FnMut(Coord) -> Result<Coord, E>,
{
    fn map_seq<E, F>(seq: &[Coord], f: &mut F) -> Result<Vec<Coord>, E>
    where
        F: FnMut(Coord) -> Result<Coord, E>,
    {
        seq.iter().map(|&c| f(c)).collect()
    }

    fn map_nested<E, F>(seqs: &[Vec<Coord>], f: &mut F) -> Result<Vec<Vec<Coord>>, E>
    where
        F: FnMut(Coord) -> Result<Coord, E>,
    {
        seqs.iter().map(|s| map_seq(s, f)).collect()
    }

    let mapped = match geometry {
        Geometry::Point(p) => Geometry::Point(f(*p)?),
        Geometry::MultiPoint(points) => Geometry::MultiPoint(map_seq(points, &mut f)?),
        Geometry::LineString(line) => Geometry::LineString(map_seq(line, &mut f)?),
        Geometry::MultiLineString(lines) => Geometry::MultiLineString(map_nested(lines, &mut f)?),
        Geometry::Polygon(rings) => Geometry::Polygon(map_nested(rings, &mut f)?),
        Geometry::MultiPolygon(polygons) => Geometry::MultiPolygon(
            polygons
                .iter()
                .map(|rings| map_nested(rings, &mut f))
                .collect::<Result<_, _>>()?,
        ),
    };

    Ok(mapped)
}

/// Infallible form of [try_map_coords].
pub fn map_coords<F>(geometry: &Geometry, mut f: F) -> Geometry
where
    F: FnMut(Coord) -> Coord,
{
    match try_map_coords::<std::convert::Infallible, _>(geometry, |c| Ok(f(c))) {
        Ok(g) => g,
        Err(never) => match never {},
    }
}

/// Calls `visitor` with every coordinate sequence of the geometry: each line, each ring, or the
/// point set of a punctual geometry.
pub fn visit_sequences<F>(geometry: &Geometry, mut visitor: F)
where
    F: FnMut(&[Coord]),
{
    match geometry {
        Geometry::Point(p) => visitor(std::slice::from_ref(p)),
        Geometry::MultiPoint(points) | Geometry::LineString(points) => visitor(points),
        Geometry::MultiLineString(seqs) | Geometry::Polygon(seqs) => {
            seqs.iter().for_each(|s| visitor(s))
        }
        Geometry::MultiPolygon(polygons) => polygons
            .iter()
            .flat_map(|rings| rings.iter())
            .for_each(|s| visitor(s)),
    }
}

/// Axis aligned bounding box of every position, `None` for a geometry without positions.
pub fn bounding_box(geometry: &Geometry) -> Option<AABB<f64>> {
    let mut result: Option<AABB<f64>> = None;
    visit_sequences(geometry, |seq| {
        for c in seq {
            result = Some(match result {
                None => AABB::new(c.x, c.y, c.x, c.y),
                Some(b) => AABB::new(
                    b.min_x.min(c.x),
                    b.min_y.min(c.y),
                    b.max_x.max(c.x),
                    b.max_y.max(c.y),
                ),
            });
        }
    });
    result
}

/// Centre of a geometry: the point itself for a point, the centre of the bounding box otherwise.
pub fn center(geometry: &Geometry) -> Option<Coord> {
    if let Geometry::Point(p) = geometry {
        return Some(*p);
    }

    bounding_box(geometry)
        .map(|b| Coord::new((b.min_x + b.max_x) / 2.0, (b.min_y + b.max_y) / 2.0))
}

/// Returns the ring closed, appending the first position when the last one differs.
pub fn close_ring(mut ring: Vec<Coord>) -> Vec<Coord> {
    if let (Some(&first), Some(&last)) = (ring.first(), ring.last()) {
        if first != last {
            ring.push(first);
        }
    }
    ring
}

/// Iterates over consecutive position pairs of a sequence.
#[inline]
pub fn segments(seq: &[Coord]) -> impl Iterator<Item = (Coord, Coord)> + '_ {
    seq.windows(2).map(|w| (w[0], w[1]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::vec2;

    #[test]
    fn bounding_box_and_center() {
        let g = Geometry::Polygon(vec![vec![
            vec2(0.0, 0.0),
            vec2(4.0, 0.0),
            vec2(4.0, 2.0),
            vec2(0.0, 0.0),
        ]]);
        let b = bounding_box(&g).unwrap();
        assert_eq!((b.min_x, b.min_y, b.max_x, b.max_y), (0.0, 0.0, 4.0, 2.0));
        assert_eq!(center(&g), Some(vec2(2.0, 1.0)));
        assert!(bounding_box(&Geometry::LineString(Vec::new())).is_none());
    }

    #[test]
    fn close_ring_appends_first() {
        let open = vec![vec2(0.0, 0.0), vec2(1.0, 0.0), vec2(1.0, 1.0)];
        let closed = close_ring(open.clone());
        assert_eq!(closed.len(), 4);
        assert_eq!(closed[3], closed[0]);
        assert_eq!(close_ring(closed.clone()), closed);
    }

    #[test]
    fn map_coords_keeps_structure() {
        let g = Geometry::MultiLineString(vec![vec![vec2(1.0, 1.0), vec2(2.0, 2.0)]]);
        let shifted = map_coords(&g, |c| vec2(c.x + 1.0, c.y));
        assert_eq!(
            shifted,
            Geometry::MultiLineString(vec![vec![vec2(2.0, 1.0), vec2(3.0, 2.0)]])
        );
    }
}
