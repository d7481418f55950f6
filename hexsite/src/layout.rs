use crate::{Crs, HexSiteError};
use geo::{
    algorithm::Area,
    geometry::{Coord, LineString, Point, Polygon},
};
use log::debug;

/// Axial neighbor offsets of a flat-topped hexagon, counter-clockwise
/// starting from the upper right.
const AXIAL_DIRECTIONS: [(i32, i32); 6] = [(1, 0), (1, -1), (0, -1), (-1, 0), (-1, 1), (0, 1)];

/// A serving site and the rings of co-channel sites around it.
///
/// All geometries are expressed in `crs`, which is always projected.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteLayout {
    /// Coordinate system of every geometry below.
    pub crs: Crs,

    /// Apothem of each hexagonal site area (meters).
    pub radius_m: f64,

    /// The serving transmitter.
    pub transmitter: Point<f64>,

    /// Co-channel transmitters, nearest ring first.
    pub interfering_transmitters: Vec<Point<f64>>,

    /// Area served by `transmitter`.
    pub site_area: Polygon<f64>,

    /// Areas served by each of `interfering_transmitters`, in the same
    /// order.
    pub interfering_site_areas: Vec<Polygon<f64>>,
}

impl SiteLayout {
    pub fn builder() -> SiteLayoutBuilder {
        SiteLayoutBuilder {
            center: None,
            radius_m: None,
            rings: 1,
            input_crs: Crs::Wgs84,
            output_crs: Crs::WebMercator,
        }
    }

    /// Area of the serving site in km².
    pub fn site_area_km2(&self) -> f64 {
        self.site_area.unsigned_area() / 1e6
    }

    /// Distance between neighboring transmitters (meters).
    pub fn inter_site_distance_m(&self) -> f64 {
        2.0 * self.radius_m
    }
}

pub struct SiteLayoutBuilder {
    /// Location of the serving transmitter (required).
    center: Option<Coord<f64>>,

    /// Site radius, measured center to edge (meters, required).
    radius_m: Option<f64>,

    /// Number of interfering rings (defaults to 1).
    rings: usize,

    /// CRS of `center` (defaults to WGS84).
    input_crs: Crs,

    /// CRS of the produced geometry (defaults to Web Mercator).
    output_crs: Crs,
}

impl SiteLayoutBuilder {
    /// Location of the serving transmitter (required).
    #[must_use]
    pub fn center(mut self, coord: Coord<f64>) -> Self {
        self.center = Some(coord);
        self
    }

    /// Site radius, measured center to edge (meters, required).
    #[must_use]
    pub fn radius(mut self, meters: f64) -> Self {
        self.radius_m = Some(meters);
        self
    }

    /// Number of interfering rings (defaults to 1, i.e. six
    /// interferers).
    #[must_use]
    pub fn rings(mut self, rings: usize) -> Self {
        self.rings = rings;
        self
    }

    /// CRS of `center` (defaults to WGS84).
    #[must_use]
    pub fn input_crs(mut self, crs: Crs) -> Self {
        self.input_crs = crs;
        self
    }

    /// CRS of the produced geometry (defaults to Web Mercator).
    #[must_use]
    pub fn output_crs(mut self, crs: Crs) -> Self {
        self.output_crs = crs;
        self
    }

    pub fn build(&self) -> Result<SiteLayout, HexSiteError> {
        let center = self.center.ok_or(HexSiteError::Builder("center"))?;
        let radius_m = self.radius_m.ok_or(HexSiteError::Builder("radius"))?;
        if !(radius_m.is_finite() && radius_m > 0.0) {
            return Err(HexSiteError::Radius(radius_m));
        }
        if !self.output_crs.is_projected() {
            return Err(HexSiteError::Unprojected(self.output_crs));
        }

        let origin = self.input_crs.transform(center, self.output_crs);
        let circumradius = 2.0 * radius_m / 3f64.sqrt();

        let (interfering_transmitters, interfering_site_areas): (Vec<_>, Vec<_>) = (1..=self
            .rings)
            .flat_map(ring)
            .map(|axial| {
                let center = axial_to_planar(origin, circumradius, axial);
                (Point::from(center), hexagon(center, circumradius))
            })
            .unzip();

        debug!(
            "site layout; origin: {origin:?}, radius_m: {radius_m}, interferers: {}",
            interfering_transmitters.len()
        );

        Ok(SiteLayout {
            crs: self.output_crs,
            radius_m,
            transmitter: Point::from(origin),
            interfering_transmitters,
            site_area: hexagon(origin, circumradius),
            interfering_site_areas,
        })
    }
}

/// Returns the axial coordinates of the `k`th ring around the origin.
fn ring(k: usize) -> Vec<(i32, i32)> {
    let Ok(k) = i32::try_from(k) else {
        return Vec::new();
    };
    let (dq, dr) = AXIAL_DIRECTIONS[4];
    let mut hex = (dq * k, dr * k);
    let mut cells = Vec::with_capacity(6 * k.unsigned_abs() as usize);
    for (dq, dr) in AXIAL_DIRECTIONS {
        for _ in 0..k {
            cells.push(hex);
            hex = (hex.0 + dq, hex.1 + dr);
        }
    }
    cells
}

fn axial_to_planar(origin: Coord<f64>, circumradius: f64, (q, r): (i32, i32)) -> Coord<f64> {
    let (q, r) = (f64::from(q), f64::from(r));
    Coord {
        x: origin.x + circumradius * 1.5 * q,
        y: origin.y + circumradius * 3f64.sqrt() * (r + q / 2.0),
    }
}

/// Flat-topped hexagon centered on `center`.
fn hexagon(center: Coord<f64>, circumradius: f64) -> Polygon<f64> {
    let exterior: LineString<f64> = (0..=6)
        .map(|corner| {
            let angle = f64::from(corner % 6) * 60f64.to_radians();
            Coord {
                x: center.x + circumradius * angle.cos(),
                y: center.y + circumradius * angle.sin(),
            }
        })
        .collect();
    Polygon::new(exterior, vec![])
}

#[cfg(test)]
mod tests {
    use super::{ring, SiteLayout};
    use crate::{Crs, HexSiteError};
    use approx::assert_relative_eq;
    use geo::{coord, Contains, EuclideanDistance};

    fn layout(rings: usize) -> SiteLayout {
        SiteLayout::builder()
            .center(coord!(x: 0.0, y: 0.0))
            .radius(10_000.0)
            .rings(rings)
            .build()
            .unwrap()
    }

    #[test]
    fn test_ring_sizes() {
        assert_eq!(ring(0).len(), 0);
        assert_eq!(ring(1).len(), 6);
        assert_eq!(ring(2).len(), 12);
        assert_eq!(ring(3).len(), 18);
    }

    #[test]
    fn test_site_area() {
        let layout = layout(1);
        // sqrt(3) / 2 * isd² with an inter-site distance of 20 km.
        assert_relative_eq!(layout.site_area_km2(), 346.410_161_513_775_4, epsilon = 1e-6);
        assert_relative_eq!(layout.inter_site_distance_m(), 20_000.0);
        assert!(layout.site_area.contains(&layout.transmitter));
    }

    #[test]
    fn test_first_ring_is_one_isd_away() {
        let layout = layout(1);
        assert_eq!(layout.interfering_transmitters.len(), 6);
        assert_eq!(layout.interfering_site_areas.len(), 6);
        for interferer in &layout.interfering_transmitters {
            assert_relative_eq!(
                layout.transmitter.euclidean_distance(interferer),
                20_000.0,
                epsilon = 1e-6
            );
            assert!(!layout.site_area.contains(interferer));
        }
    }

    #[test]
    fn test_two_rings() {
        let layout = layout(2);
        assert_eq!(layout.interfering_transmitters.len(), 18);
        let farthest = layout
            .interfering_transmitters
            .iter()
            .map(|tx| layout.transmitter.euclidean_distance(tx))
            .fold(0.0, f64::max);
        assert_relative_eq!(farthest, 40_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_builder_errors() {
        assert!(matches!(
            SiteLayout::builder().radius(1.0).build(),
            Err(HexSiteError::Builder("center"))
        ));
        assert!(matches!(
            SiteLayout::builder()
                .center(coord!(x: 0.0, y: 0.0))
                .radius(-5.0)
                .build(),
            Err(HexSiteError::Radius(_))
        ));
        assert!(matches!(
            SiteLayout::builder()
                .center(coord!(x: 0.0, y: 0.0))
                .radius(5.0)
                .output_crs(Crs::Wgs84)
                .build(),
            Err(HexSiteError::Unprojected(Crs::Wgs84))
        ));
    }
}
