use super::Projection;
use crate::core::math::vec2;
use crate::geometry::Coord;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

pub const WGS84_CODE: &str = "EPSG:4326";
pub const WGS84_DEFINITION: &str = "+proj=longlat +datum=WGS84 +no_defs";

pub const WEB_MERCATOR_CODE: &str = "EPSG:3857";
pub const WEB_MERCATOR_DEFINITION: &str = "+proj=merc +a=6378137 +b=6378137 +lat_ts=0.0 \
+lon_0=0.0 +x_0=0.0 +y_0=0 +k=1.0 +units=m +nadgrids=@null +wktext +no_defs";

pub const WORLD_MERCATOR_CODE: &str = "EPSG:3395";
pub const WORLD_MERCATOR_DEFINITION: &str =
    "+proj=merc +lon_0=0 +k=1 +x_0=0 +y_0=0 +datum=WGS84 +units=m +no_defs";

/// WGS84 semi-major axis in metres.
pub const EARTH_RADIUS_MAJOR: f64 = 6_378_137.0;
/// WGS84 semi-minor axis in metres.
pub const EARTH_RADIUS_MINOR: f64 = 6_356_752.314_245_179;

const MAX_MERCATOR_LATITUDE: f64 = 85.051_128_779_806_6;

/// Geographic longitude/latitude, the identity projection.
#[derive(Debug, Default, Copy, Clone)]
pub struct Wgs84;

impl Projection for Wgs84 {
    fn code(&self) -> &str {
        WGS84_CODE
    }

    fn definition(&self) -> &str {
        WGS84_DEFINITION
    }

    fn project(&self, lnglat: Coord) -> Coord {
        lnglat
    }

    fn unproject(&self, point: Coord) -> Coord {
        point
    }
}

/// Spherical (pseudo) Mercator used by web maps.
#[derive(Debug, Default, Copy, Clone)]
pub struct WebMercator;

impl Projection for WebMercator {
    fn code(&self) -> &str {
        WEB_MERCATOR_CODE
    }

    fn definition(&self) -> &str {
        WEB_MERCATOR_DEFINITION
    }

    fn project(&self, lnglat: Coord) -> Coord {
        let lat = lnglat
            .y
            .clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE)
            .to_radians();
        let sin = lat.sin();
        vec2(
            EARTH_RADIUS_MAJOR * lnglat.x.to_radians(),
            EARTH_RADIUS_MAJOR * ((1.0 + sin) / (1.0 - sin)).ln() / 2.0,
        )
    }

    fn unproject(&self, point: Coord) -> Coord {
        vec2(
            (point.x / EARTH_RADIUS_MAJOR).to_degrees(),
            (2.0 * (point.y / EARTH_RADIUS_MAJOR).exp().atan() - FRAC_PI_2).to_degrees(),
        )
    }
}

/// Elliptical Mercator on the WGS84 ellipsoid.
#[derive(Debug, Default, Copy, Clone)]
pub struct WorldMercator;

impl WorldMercator {
    fn eccentricity() -> f64 {
        let tmp = EARTH_RADIUS_MINOR / EARTH_RADIUS_MAJOR;
        (1.0 - tmp * tmp).sqrt()
    }
}

impl Projection for WorldMercator {
    fn code(&self) -> &str {
        WORLD_MERCATOR_CODE
    }

    fn definition(&self) -> &str {
        WORLD_MERCATOR_DEFINITION
    }

    fn project(&self, lnglat: Coord) -> Coord {
        let e = Self::eccentricity();
        let y = lnglat.y.to_radians();
        let con = e * y.sin();
        let ts = (FRAC_PI_4 - y / 2.0).tan() / ((1.0 - con) / (1.0 + con)).powf(e / 2.0);
        vec2(
            lnglat.x.to_radians() * EARTH_RADIUS_MAJOR,
            -EARTH_RADIUS_MAJOR * ts.max(1e-10).ln(),
        )
    }

    fn unproject(&self, point: Coord) -> Coord {
        let e = Self::eccentricity();
        let ts = (-point.y / EARTH_RADIUS_MAJOR).exp();
        let mut phi = FRAC_PI_2 - 2.0 * ts.atan();

        let mut i = 0;
        let mut dphi = 0.1f64;
        while i < 15 && dphi.abs() > 1e-7 {
            let con = e * phi.sin();
            let con = ((1.0 - con) / (1.0 + con)).powf(e / 2.0);
            dphi = FRAC_PI_2 - 2.0 * (ts * con).atan() - phi;
            phi += dphi;
            i += 1;
        }

        vec2(
            point.x.to_degrees() / EARTH_RADIUS_MAJOR,
            phi * 180.0 / PI,
        )
    }
}
