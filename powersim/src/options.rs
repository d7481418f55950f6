use anyhow::{anyhow, Error as AnyError};
use clap::{Parser, Subcommand, ValueEnum};
use hexsite::geo::geometry::Coord;
use std::{path::PathBuf, str::FromStr};

/// Simulate the transmit power a cell site needs hour by hour.
#[derive(Parser, Debug, Clone)]
pub struct Cli {
    /// Seed for receiver placement.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Serving site "lon,lat", in degrees.
    #[arg(long, allow_hyphen_values = true, default_value = "-74.83548,-8.156502")]
    pub center: LonLat,

    /// Site radius, in meters.
    #[arg(short, long, default_value_t = 10_000.0)]
    pub radius: f64,

    /// Rings of interfering sites around the serving site.
    #[arg(long, default_value_t = 1)]
    pub rings: usize,

    /// Receivers placed in the site area.
    #[arg(short, long, default_value_t = 500)]
    pub population: usize,

    /// JSON file overriding carrier, demand, and scenarios.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Clone, Debug, Copy)]
pub struct LonLat(pub Coord<f64>);

impl FromStr for LonLat {
    type Err = AnyError;
    fn from_str(s: &str) -> Result<Self, AnyError> {
        let (lon_str, lat_str) = s
            .split_once(',')
            .ok_or_else(|| anyhow!("not a valid lon,lat"))?;
        let lon = f64::from_str(lon_str.trim())?;
        let lat = f64::from_str(lat_str.trim())?;
        if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
            return Err(anyhow!("{lon},{lat} is out of range"));
        }
        Ok(Self(Coord { x: lon, y: lat }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Csv,
    Json,
    /// Plot to terminal.
    Plot,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Simulate every scenario over a day and print hourly results.
    Run {
        /// Hourly traffic share CSV ("hour,share" rows).
        #[arg(long)]
        hourly: Option<PathBuf>,

        #[arg(short, long, value_enum, default_value_t = Format::Csv)]
        format: Format,
    },

    /// Print the receiver population.
    Receivers {
        #[arg(short, long, value_enum, default_value_t = Format::Csv)]
        format: Format,
    },

    /// Summarize links to every receiver at a single power.
    Link {
        /// Transmit power, in watts.
        #[arg(long, default_value_t = 20.0)]
        power: f64,

        #[arg(short, long, default_value = "baseline")]
        scenario: String,
    },
}

#[cfg(test)]
mod tests {
    use super::LonLat;
    use std::str::FromStr;

    #[test]
    fn test_parse_lon_lat() {
        let LonLat(coord) = LonLat::from_str("-74.83548, -8.156502").unwrap();
        assert_eq!(coord.x, -74.83548);
        assert_eq!(coord.y, -8.156502);
        assert!(LonLat::from_str("-74.83548").is_err());
        assert!(LonLat::from_str("10,95").is_err());
        assert!(LonLat::from_str("a,b").is_err());
    }
}
