//! Hour-by-hour power simulation across scenarios.

use crate::{
    demand::{active_users, required_mbps, HourlyShare},
    error::ConfigError,
    link::LinkParams,
    mcs::ModulationAndCoding,
    optimizer::{PowerOptimizer, PowerSelection},
    params::{Carrier, Scenario},
    receivers::{activate, Receiver},
};
use hexsite::SiteLayout;
use log::{info, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Monthly data volume per user used when none is configured (GB).
pub const MONTHLY_DATA_GB: f64 = 100.0;

const DAYS_PER_YEAR: f64 = 365.0;

/// Demand for one hour of one scenario, fixed before the power search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourContext {
    pub hour: usize,
    /// Percent of daily traffic.
    pub hourly_share: f64,
    pub per_user_demand_mbps: f64,
    pub active_users: usize,
    pub total_demand_mbps: f64,
    pub site_area_km2: f64,
    pub demand_km2: f64,
}

impl HourContext {
    pub fn new(
        hour: usize,
        hourly_share: f64,
        population: usize,
        monthly_data_gb: f64,
        site_area_km2: f64,
    ) -> Self {
        let per_user_demand_mbps = required_mbps(monthly_data_gb, hourly_share);
        let active_users = active_users(population, hourly_share);
        #[allow(clippy::cast_precision_loss)]
        let total_demand_mbps = per_user_demand_mbps * active_users as f64;
        let demand_km2 = if site_area_km2 > 0.0 {
            total_demand_mbps / site_area_km2
        } else {
            0.0
        };
        Self {
            hour,
            hourly_share,
            per_user_demand_mbps,
            active_users,
            total_demand_mbps,
            site_area_km2,
            demand_km2,
        }
    }
}

/// One simulated hour of one scenario.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyResult {
    pub scenario: String,
    pub site_radius_km: f64,
    pub hour: usize,
    pub hourly_share: f64,
    pub per_user_demand_mbps: f64,
    pub active_users: usize,
    pub total_demand_mbps: f64,
    pub demand_mbps_km2: f64,
    pub capacity_mbps_km2: f64,
    pub capacity_demand_metric: f64,
    pub tx_power_w: f64,
    pub demand_met: bool,
}

impl HourlyResult {
    fn new(scenario: &str, site: &SiteLayout, ctx: &HourContext, selection: &PowerSelection) -> Self {
        Self {
            scenario: scenario.to_string(),
            site_radius_km: site.radius_m / 1e3,
            hour: ctx.hour,
            hourly_share: ctx.hourly_share,
            per_user_demand_mbps: ctx.per_user_demand_mbps,
            active_users: ctx.active_users,
            total_demand_mbps: ctx.total_demand_mbps,
            demand_mbps_km2: ctx.demand_km2,
            capacity_mbps_km2: selection.capacity_km2(),
            capacity_demand_metric: selection.capacity_demand_metric(),
            tx_power_w: selection.tx_power_w(),
            demand_met: selection.demand_met(),
        }
    }
}

/// Energy drawn by a scenario's transmitter over a simulated day.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioEnergy {
    pub scenario: String,
    pub daily_kwh: f64,
    pub annual_kwh: f64,
    pub unmet_hours: usize,
}

impl ScenarioEnergy {
    /// Totals `results` per scenario, in order of first appearance.
    ///
    /// Each result accounts for one hour at its selected power.
    pub fn from_results(results: &[HourlyResult]) -> Vec<Self> {
        let mut totals: Vec<Self> = Vec::new();
        for result in results {
            let idx = match totals.iter().position(|e| e.scenario == result.scenario) {
                Some(idx) => idx,
                None => {
                    totals.push(Self {
                        scenario: result.scenario.clone(),
                        daily_kwh: 0.0,
                        annual_kwh: 0.0,
                        unmet_hours: 0,
                    });
                    totals.len() - 1
                }
            };
            let entry = &mut totals[idx];
            entry.daily_kwh += result.tx_power_w / 1000.0;
            entry.annual_kwh = entry.daily_kwh * DAYS_PER_YEAR;
            entry.unmet_hours += usize::from(!result.demand_met);
        }
        totals
    }
}

/// Runs the power search for every hour of every scenario over a
/// fixed site and receiver population.
#[derive(Debug, Clone)]
pub struct Simulation {
    site: SiteLayout,
    population: Vec<Receiver>,
    hourly_share: HourlyShare,
    scenarios: Vec<Scenario>,
    carrier: Carrier,
    mcs: ModulationAndCoding,
    monthly_data_gb: f64,
}

impl Simulation {
    pub fn builder() -> SimulationBuilder {
        SimulationBuilder::default()
    }

    pub fn site(&self) -> &SiteLayout {
        &self.site
    }

    pub fn population(&self) -> &[Receiver] {
        &self.population
    }

    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Simulates all scenarios in order, calling `on_hour` as each
    /// hour completes.
    pub fn run<F>(&self, mut on_hour: F) -> Result<Vec<HourlyResult>, ConfigError>
    where
        F: FnMut(&HourlyResult),
    {
        let mut results = Vec::with_capacity(self.scenarios.len() * 24);
        for scenario in &self.scenarios {
            results.extend(self.run_scenario(scenario, &mut on_hour)?);
        }
        Ok(results)
    }

    /// Simulates hours `0..24` of `scenario`.
    ///
    /// Active receivers and link draws come from a generator seeded
    /// with the scenario's seed, so a scenario's results don't depend
    /// on which other scenarios run.
    pub fn run_scenario<F>(
        &self,
        scenario: &Scenario,
        mut on_hour: F,
    ) -> Result<Vec<HourlyResult>, ConfigError>
    where
        F: FnMut(&HourlyResult),
    {
        let params = LinkParams::new(scenario, &self.carrier)?;
        let mcs = self.mcs.get(&self.carrier.generation)?;
        let optimizer = PowerOptimizer::new(scenario, &params, &self.site, mcs)?;
        let site_area_km2 = self.site.site_area_km2();
        let mut rng = ChaCha8Rng::seed_from_u64(scenario.seed);

        info!("scenario {}", scenario.name);
        let mut results = Vec::with_capacity(24);
        for (hour, share) in self.hourly_share.iter() {
            let ctx = HourContext::new(
                hour,
                share,
                self.population.len(),
                self.monthly_data_gb,
                site_area_km2,
            );
            let active = activate(
                &self.population,
                ctx.active_users,
                ctx.per_user_demand_mbps,
                &mut rng,
            );
            let link_seed: u64 = rng.gen();
            let selection = optimizer.optimize(&active, site_area_km2, ctx.demand_km2, link_seed)?;
            if !selection.demand_met() {
                warn!(
                    "scenario {}, hour {hour}: demand {:.3} Mbps/km² unmet at {} W",
                    scenario.name,
                    ctx.demand_km2,
                    selection.tx_power_w()
                );
            }
            let result = HourlyResult::new(&scenario.name, &self.site, &ctx, &selection);
            on_hour(&result);
            results.push(result);
        }
        Ok(results)
    }
}

#[derive(Debug, Clone)]
pub struct SimulationBuilder {
    site: Option<SiteLayout>,
    population: Option<Vec<Receiver>>,
    hourly_share: Option<HourlyShare>,
    scenarios: Vec<Scenario>,
    carrier: Carrier,
    mcs: ModulationAndCoding,
    monthly_data_gb: f64,
}

impl Default for SimulationBuilder {
    fn default() -> Self {
        Self {
            site: None,
            population: None,
            hourly_share: None,
            scenarios: vec![Scenario::baseline(), Scenario::managed_power()],
            carrier: Carrier::default(),
            mcs: ModulationAndCoding::default(),
            monthly_data_gb: MONTHLY_DATA_GB,
        }
    }
}

impl SimulationBuilder {
    /// Required.
    #[must_use]
    pub fn site(mut self, site: SiteLayout) -> Self {
        self.site = Some(site);
        self
    }

    /// Required. Every receiver that may become active.
    #[must_use]
    pub fn population(mut self, population: Vec<Receiver>) -> Self {
        self.population = Some(population);
        self
    }

    /// Required.
    #[must_use]
    pub fn hourly_share(mut self, hourly_share: HourlyShare) -> Self {
        self.hourly_share = Some(hourly_share);
        self
    }

    /// Defaults to `baseline` and `managed_power`.
    #[must_use]
    pub fn scenarios(mut self, scenarios: Vec<Scenario>) -> Self {
        self.scenarios = scenarios;
        self
    }

    #[must_use]
    pub fn carrier(mut self, carrier: Carrier) -> Self {
        self.carrier = carrier;
        self
    }

    #[must_use]
    pub fn mcs(mut self, mcs: ModulationAndCoding) -> Self {
        self.mcs = mcs;
        self
    }

    /// Per-user monthly data volume, in GB (defaults to 100).
    #[must_use]
    pub fn monthly_data_gb(mut self, monthly_data_gb: f64) -> Self {
        self.monthly_data_gb = monthly_data_gb;
        self
    }

    pub fn build(self) -> Result<Simulation, ConfigError> {
        let site = self.site.ok_or(ConfigError::Builder("site"))?;
        let population = self.population.ok_or(ConfigError::Builder("population"))?;
        let hourly_share = self
            .hourly_share
            .ok_or(ConfigError::Builder("hourly_share"))?;
        if !(self.monthly_data_gb > 0.0) {
            return Err(ConfigError::Zero("monthly_data_gb"));
        }
        self.carrier.validate()?;
        self.mcs.get(&self.carrier.generation)?;
        for (idx, scenario) in self.scenarios.iter().enumerate() {
            scenario.validate()?;
            if self.scenarios[..idx]
                .iter()
                .any(|other| other.name == scenario.name)
            {
                return Err(ConfigError::DuplicateScenario(scenario.name.clone()));
            }
        }
        Ok(Simulation {
            site,
            population,
            hourly_share,
            scenarios: self.scenarios,
            carrier: self.carrier,
            mcs: self.mcs,
            monthly_data_gb: self.monthly_data_gb,
        })
    }
}
