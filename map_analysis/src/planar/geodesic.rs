use crate::geometry::{center, Coord, Geometry};

/// Equatorial radius used for ring areas, metres.
pub const AREA_EARTH_RADIUS: f64 = 6_378_137.0;

/// Mean earth radius used for great circle distances, metres.
pub const MEAN_EARTH_RADIUS: f64 = 6_371_008.8;

/// Spherical area of a longitude/latitude ring in square metres (sign follows orientation).
fn ring_area(ring: &[Coord]) -> f64 {
    let n = ring.len();
    if n <= 2 {
        return 0.0;
    }

    let mut total = 0.0;
    for i in 0..n {
        let (lower, middle, upper) = if i == n - 2 {
            (n - 2, n - 1, 0)
        } else if i == n - 1 {
            (n - 1, 0, 1)
        } else {
            (i, i + 1, i + 2)
        };
        total += (ring[upper].x.to_radians() - ring[lower].x.to_radians())
            * ring[middle].y.to_radians().sin();
    }

    total * AREA_EARTH_RADIUS * AREA_EARTH_RADIUS / 2.0
}

fn polygon_geodesic_area(rings: &[Vec<Coord>]) -> f64 {
    let mut rings = rings.iter();
    let shell = match rings.next() {
        Some(shell) => ring_area(shell).abs(),
        None => return 0.0,
    };
    shell - rings.map(|r| ring_area(r).abs()).sum::<f64>()
}

/// Area of a WGS84 geometry in square metres, zero for punctual and linear geometries.
///
/// # Examples
///
/// ```
/// # use map_analysis::planar::*;
/// # use map_analysis::geometry::*;
/// # use map_analysis::core::math::vec2;
/// // one degree square on the equator is about 12 391 km^2
/// let cell = Geometry::Polygon(vec![vec![
///     vec2(0.0, 0.0), vec2(1.0, 0.0), vec2(1.0, 1.0), vec2(0.0, 1.0), vec2(0.0, 0.0),
/// ]]);
/// let km2 = geodesic_area(&cell) / 1e6;
/// assert!((km2 - 12_391.4).abs() < 1.0, "{}", km2);
/// ```
pub fn geodesic_area(geometry: &Geometry) -> f64 {
    geometry
        .polygons()
        .into_iter()
        .map(|p| polygon_geodesic_area(p))
        .sum()
}

/// Great circle (haversine) distance between two longitude/latitude positions in metres.
pub fn haversine_distance(from: Coord, to: Coord) -> f64 {
    let d_lat = (to.y - from.y).to_radians();
    let d_lon = (to.x - from.x).to_radians();
    let lat1 = from.y.to_radians();
    let lat2 = to.y.to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + (d_lon / 2.0).sin().powi(2) * lat1.cos() * lat2.cos();
    2.0 * a.sqrt().atan2((1.0 - a).sqrt()) * MEAN_EARTH_RADIUS
}

/// Haversine distance between the centres of two WGS84 geometries (the point itself, or the
/// centre of the bounding box), `None` if either geometry has no positions.
pub fn center_distance(a: &Geometry, b: &Geometry) -> Option<f64> {
    Some(haversine_distance(center(a)?, center(b)?))
}
