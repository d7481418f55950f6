//! Receiver placement.

use crate::{error::ConfigError, math::linspace};
use geo::{
    algorithm::{Area, BoundingRect, Contains},
    geometry::{Point, Polygon},
};
use log::debug;
use rand::{seq::index, Rng};
use std::fmt;

/// Chance of a receiver being indoors.
pub const INDOOR_PROBABILITY: f64 = 0.5;

/// Sampling grid points per axis.
const GRID_DIVISIONS: usize = 50;

/// A candidate user location.
#[derive(Debug, Clone, PartialEq)]
pub struct Receiver {
    /// Position in the sampling grid's accepted points.
    pub id: usize,
    pub location: Point<f64>,
    pub indoor: bool,
    /// Throughput assigned while the receiver is active (Mbps).
    pub demand_mbps: Option<f64>,
}

impl Receiver {
    #[must_use]
    pub fn with_demand(mut self, mbps: f64) -> Self {
        self.demand_mbps = Some(mbps);
        self
    }
}

impl fmt::Display for Receiver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "id_{}", self.id)
    }
}

/// Places receivers on a regular grid clipped to a site area.
#[derive(Debug, Clone, Copy)]
pub struct ReceiverSampler {
    grid_divisions: usize,
    indoor_probability: f64,
}

impl Default for ReceiverSampler {
    fn default() -> Self {
        Self {
            grid_divisions: GRID_DIVISIONS,
            indoor_probability: INDOOR_PROBABILITY,
        }
    }
}

impl ReceiverSampler {
    /// Grid points per axis across the polygon's bounding box
    /// (defaults to 50).
    #[must_use]
    pub fn grid_divisions(mut self, divisions: usize) -> Self {
        self.grid_divisions = divisions;
        self
    }

    /// Chance of each receiver being indoors (defaults to 0.5).
    #[must_use]
    pub fn indoor_probability(mut self, probability: f64) -> Self {
        self.indoor_probability = probability;
        self
    }

    /// Returns every grid point strictly inside `site_area`.
    ///
    /// An indoor draw is consumed for every grid point, accepted or
    /// not, so the layout only depends on the grid and the generator.
    pub fn candidates<R: Rng + ?Sized>(
        &self,
        site_area: &Polygon<f64>,
        rng: &mut R,
    ) -> Result<Vec<Receiver>, ConfigError> {
        if !(0.0..=1.0).contains(&self.indoor_probability) {
            return Err(ConfigError::Percentage {
                name: "indoor probability",
                value: self.indoor_probability * 100.0,
            });
        }
        let bounds = site_area
            .bounding_rect()
            .ok_or(ConfigError::DegeneratePolygon)?;
        if !(site_area.unsigned_area() > 0.0) {
            return Err(ConfigError::DegeneratePolygon);
        }

        let (min, max) = (bounds.min(), bounds.max());
        let y_axis: Vec<f64> = linspace(min.y, max.y, self.grid_divisions).collect();
        let mut receivers = Vec::new();
        for x in linspace(min.x, max.x, self.grid_divisions) {
            for &y in &y_axis {
                let location = Point::new(x, y);
                let indoor = rng.gen::<f64>() < self.indoor_probability;
                if site_area.contains(&location) {
                    receivers.push(Receiver {
                        id: receivers.len(),
                        location,
                        indoor,
                        demand_mbps: None,
                    });
                }
            }
        }
        Ok(receivers)
    }

    /// Returns exactly `quantity` receivers drawn uniformly, without
    /// replacement, from the grid points inside `site_area`.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        site_area: &Polygon<f64>,
        quantity: usize,
        rng: &mut R,
    ) -> Result<Vec<Receiver>, ConfigError> {
        let candidates = self.candidates(site_area, rng)?;
        if candidates.len() < quantity {
            return Err(ConfigError::TooFewCandidates {
                requested: quantity,
                available: candidates.len(),
            });
        }
        debug!(
            "receivers; candidates: {}, requested: {quantity}",
            candidates.len()
        );
        let picked = index::sample(rng, candidates.len(), quantity);
        Ok(picked
            .into_iter()
            .map(|idx| candidates[idx].clone())
            .collect())
    }
}

/// Draws `count` receivers from `population` without replacement and
/// assigns each `demand_mbps`.
pub fn activate<R: Rng + ?Sized>(
    population: &[Receiver],
    count: usize,
    demand_mbps: f64,
    rng: &mut R,
) -> Vec<Receiver> {
    index::sample(rng, population.len(), count.min(population.len()))
        .into_iter()
        .map(|idx| population[idx].clone().with_demand(demand_mbps))
        .collect()
}
