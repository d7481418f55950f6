//! Minimum transmit power search.

use crate::{
    error::ConfigError,
    link::{estimate_link, LinkEstimate, LinkParams},
    math::percentile,
    mcs::McsTable,
    params::Scenario,
    receivers::Receiver,
};
use hexsite::SiteLayout;
use log::debug;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

/// Tolerance used when deciding whether the last step landed on the
/// upper bound.
const STEP_EPSILON: f64 = 1e-9;

/// Inclusive, ascending range of transmit powers (W).
///
/// Steps are `min_w + k * increment` up to `max_w`; `max_w` is always
/// the final value, even when the increment doesn't land on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerRange {
    min_w: f64,
    max_w: f64,
    increment: f64,
}

impl PowerRange {
    pub fn new(min_w: f64, max_w: f64, increment: f64) -> Result<Self, ConfigError> {
        if !(min_w.is_finite() && max_w.is_finite() && min_w <= max_w) {
            return Err(ConfigError::PowerRange { min_w, max_w });
        }
        if !(increment > 0.0 && increment.is_finite()) {
            return Err(ConfigError::Increment(increment));
        }
        Ok(Self {
            min_w,
            max_w,
            increment,
        })
    }

    pub fn min_w(&self) -> f64 {
        self.min_w
    }

    pub fn max_w(&self) -> f64 {
        self.max_w
    }

    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        clippy::cast_sign_loss
    )]
    pub fn iter(&self) -> impl Iterator<Item = f64> {
        let Self {
            min_w,
            max_w,
            increment,
        } = *self;
        let steps = ((max_w - min_w) / increment + STEP_EPSILON).floor() as usize;
        let last = min_w + steps as f64 * increment;
        (0..=steps)
            .map(move |step| min_w + step as f64 * increment)
            .chain(std::iter::once(max_w).filter(move |_| last < max_w - STEP_EPSILON))
    }
}

/// Capacity achieved at one transmit power.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerLevel {
    pub tx_power_w: f64,
    /// Percentile of all sampled link capacities (Mbps).
    pub capacity_mbps: f64,
    pub capacity_km2: f64,
    /// `floor(capacity_km2 / demand_km2)`.
    pub capacity_demand_metric: f64,
}

impl PowerLevel {
    pub fn meets_demand(&self) -> bool {
        self.capacity_demand_metric >= 1.0
    }
}

/// Outcome of a power search for one hour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PowerSelection {
    /// Nobody was active, no search was run.
    Idle { tx_power_w: f64 },

    /// The lowest power whose capacity covers demand.
    Met(PowerLevel),

    /// No power in range covers demand; carries the evaluation at the
    /// maximum power.
    Unmet(PowerLevel),
}

impl PowerSelection {
    pub fn tx_power_w(&self) -> f64 {
        match self {
            Self::Idle { tx_power_w } => *tx_power_w,
            Self::Met(level) | Self::Unmet(level) => level.tx_power_w,
        }
    }

    /// `false` only when demand went unmet.
    pub fn demand_met(&self) -> bool {
        !matches!(self, Self::Unmet(_))
    }

    pub fn capacity_km2(&self) -> f64 {
        match self {
            Self::Idle { .. } => 0.0,
            Self::Met(level) | Self::Unmet(level) => level.capacity_km2,
        }
    }

    pub fn capacity_demand_metric(&self) -> f64 {
        match self {
            Self::Idle { .. } => 0.0,
            Self::Met(level) | Self::Unmet(level) => level.capacity_demand_metric,
        }
    }
}

/// Searches a scenario's power range for the cheapest power serving a
/// set of receivers.
#[derive(Debug, Clone)]
pub struct PowerOptimizer<'a> {
    scenario: &'a Scenario,
    params: &'a LinkParams,
    site: &'a SiteLayout,
    mcs: &'a McsTable,
    power_range: PowerRange,
}

impl<'a> PowerOptimizer<'a> {
    pub fn new(
        scenario: &'a Scenario,
        params: &'a LinkParams,
        site: &'a SiteLayout,
        mcs: &'a McsTable,
    ) -> Result<Self, ConfigError> {
        scenario.validate()?;
        Ok(Self {
            scenario,
            params,
            site,
            mcs,
            power_range: scenario.power_range()?,
        })
    }

    pub fn power_range(&self) -> PowerRange {
        self.power_range
    }

    /// Draws `samples_per_receiver` link realizations for every
    /// receiver with all sites transmitting at `tx_power_w`.
    ///
    /// Each receiver gets its own generator seeded with `link_seed`
    /// and a stream equal to its id, so repeated calls with the same
    /// seed see the same random draws whatever the power or thread
    /// count.
    pub fn sample_links(
        &self,
        receivers: &[Receiver],
        tx_power_w: f64,
        link_seed: u64,
    ) -> Vec<LinkEstimate> {
        let eirp = self.scenario.eirp(tx_power_w);
        let samples = self.scenario.samples_per_receiver;
        receivers
            .par_iter()
            .flat_map_iter(|receiver| {
                let mut rng = ChaCha8Rng::seed_from_u64(link_seed);
                rng.set_stream(receiver.id as u64);
                (0..samples).map(move |_| {
                    estimate_link(
                        &receiver.location,
                        self.site,
                        eirp,
                        self.params,
                        self.mcs,
                        &mut rng,
                    )
                })
            })
            .collect()
    }

    /// Evaluates a single power level, or returns `None` when it
    /// yields no areal capacity.
    pub fn evaluate(
        &self,
        receivers: &[Receiver],
        tx_power_w: f64,
        site_area_km2: f64,
        demand_km2: f64,
        link_seed: u64,
    ) -> Option<PowerLevel> {
        let now = std::time::Instant::now();
        let mut capacities: Vec<f64> = self
            .sample_links(receivers, tx_power_w, link_seed)
            .iter()
            .map(|estimate| estimate.capacity_mbps)
            .collect();
        let capacity_mbps = percentile(&mut capacities, self.scenario.percentile)?;
        let runtime = now.elapsed();

        debug!(
            "power level; tx_power_w: {tx_power_w}, samples: {}, capacity_mbps: {capacity_mbps}, exec: {runtime:?}",
            capacities.len(),
        );

        if !(site_area_km2 > 0.0) {
            return None;
        }
        let capacity_km2 = capacity_mbps / site_area_km2;
        if capacity_km2 == 0.0 {
            return None;
        }
        Some(PowerLevel {
            tx_power_w,
            capacity_mbps,
            capacity_km2,
            capacity_demand_metric: (capacity_km2 / demand_km2).floor(),
        })
    }

    /// Returns the lowest power in range whose areal capacity covers
    /// `demand_km2`, or the evaluation at the maximum power flagged as
    /// unmet.
    ///
    /// An empty receiver set is [`PowerSelection::Idle`] at the
    /// minimum power. A non-positive `demand_km2`, which only a
    /// zero-area site produces, skips every level and ends unmet.
    pub fn optimize(
        &self,
        receivers: &[Receiver],
        site_area_km2: f64,
        demand_km2: f64,
        link_seed: u64,
    ) -> Result<PowerSelection, ConfigError> {
        if receivers.is_empty() {
            return Ok(PowerSelection::Idle {
                tx_power_w: self.power_range.min_w(),
            });
        }

        let mut ceiling = None;
        // No level can be scored against a non-positive demand density.
        let levels = self.power_range.iter().filter(|_| demand_km2 > 0.0);
        for tx_power_w in levels {
            let Some(level) =
                self.evaluate(receivers, tx_power_w, site_area_km2, demand_km2, link_seed)
            else {
                continue;
            };
            if level.meets_demand() {
                return Ok(PowerSelection::Met(level));
            }
            ceiling = Some(level);
        }

        let max_w = self.power_range.max_w();
        Ok(PowerSelection::Unmet(
            ceiling
                .filter(|level| level.tx_power_w == max_w)
                .unwrap_or(PowerLevel {
                    tx_power_w: max_w,
                    capacity_mbps: 0.0,
                    capacity_km2: 0.0,
                    capacity_demand_metric: 0.0,
                }),
        ))
    }
}
