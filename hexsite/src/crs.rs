use geo::geometry::Coord;
use std::{f64::consts::FRAC_PI_4, fmt};

/// Radius of the sphere used by Web Mercator, in meters.
const WEB_MERCATOR_RADIUS: f64 = 6_378_137.0;

/// Latitude at which Web Mercator's square extent is clipped.
const WEB_MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_59;

/// Coordinate reference systems understood by the site generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crs {
    /// EPSG:4326, `x` is longitude and `y` is latitude in degrees.
    Wgs84,
    /// EPSG:3857, spherical Web Mercator in meters.
    WebMercator,
}

impl Crs {
    /// Returns `true` if distances and areas in this CRS are planar
    /// meters.
    pub fn is_projected(self) -> bool {
        matches!(self, Self::WebMercator)
    }

    /// Transforms `coord` from `self` into `to`.
    pub fn transform(self, coord: Coord<f64>, to: Crs) -> Coord<f64> {
        match (self, to) {
            (Self::Wgs84, Self::WebMercator) => to_web_mercator(coord),
            (Self::WebMercator, Self::Wgs84) => from_web_mercator(coord),
            _ => coord,
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wgs84 => f.write_str("epsg:4326"),
            Self::WebMercator => f.write_str("epsg:3857"),
        }
    }
}

fn to_web_mercator(Coord { x: lon, y: lat }: Coord<f64>) -> Coord<f64> {
    let lat = lat.clamp(-WEB_MERCATOR_MAX_LAT, WEB_MERCATOR_MAX_LAT);
    Coord {
        x: WEB_MERCATOR_RADIUS * lon.to_radians(),
        y: WEB_MERCATOR_RADIUS * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln(),
    }
}

fn from_web_mercator(Coord { x, y }: Coord<f64>) -> Coord<f64> {
    Coord {
        x: (x / WEB_MERCATOR_RADIUS).to_degrees(),
        y: (2.0 * (y / WEB_MERCATOR_RADIUS).exp().atan() - 2.0 * FRAC_PI_4).to_degrees(),
    }
}
