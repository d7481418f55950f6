//! Single link evaluation.

use crate::{
    error::ConfigError,
    interference::interference,
    math::round_to,
    mcs::McsTable,
    params::{Carrier, Scenario},
    propagation::{free_space, Shadowing},
};
use geo::{algorithm::EuclideanDistance, geometry::Point};
use hexsite::SiteLayout;
use rand::Rng;

/// Boltzmann's constant (J/K).
const BOLTZMANN: f64 = 1.38e-23;

/// Receiver noise temperature (K).
const TEMPERATURE_K: f64 = 290.0;

/// Receiver noise figure (dB).
const NOISE_FIGURE_DB: f64 = 1.5;

/// Everything needed to evaluate a link, derived once from a scenario
/// and carrier.
#[derive(Debug, Clone)]
pub struct LinkParams {
    pub frequency_ghz: f64,
    pub bandwidth_hz: f64,
    pub tx_height_m: f64,
    pub rx_height_m: f64,
    pub rx_gain_dbi: f64,
    pub rx_losses_db: f64,
    pub rx_misc_losses_db: f64,
    /// Share of interfering sites transmitting (percent).
    pub network_load: f64,
    pub noise_figure_db: f64,
    pub shadowing: Shadowing,
    pub max_interferers: Option<usize>,
}

impl LinkParams {
    pub fn new(scenario: &Scenario, carrier: &Carrier) -> Result<Self, ConfigError> {
        scenario.validate()?;
        carrier.validate()?;
        Ok(Self {
            frequency_ghz: carrier.frequency_ghz,
            bandwidth_hz: carrier.bandwidth_hz(),
            tx_height_m: scenario.tx_height_m,
            rx_height_m: scenario.rx_height_m,
            rx_gain_dbi: scenario.rx_gain_dbi,
            rx_losses_db: scenario.rx_losses_db,
            rx_misc_losses_db: scenario.rx_misc_losses_db,
            network_load: scenario.network_load,
            noise_figure_db: NOISE_FIGURE_DB,
            shadowing: scenario.shadowing()?,
            max_interferers: scenario.max_interferers,
        })
    }

    #[must_use]
    pub fn with_shadowing(mut self, shadowing: Shadowing) -> Self {
        self.shadowing = shadowing;
        self
    }

    /// Power reaching a receiver from a transmitter radiating `eirp`
    /// over `path_loss_db`.
    pub fn received_power(&self, eirp: f64, path_loss_db: f64) -> f64 {
        eirp - path_loss_db - self.rx_misc_losses_db + self.rx_gain_dbi - self.rx_losses_db
    }

    /// Thermal noise over the carrier bandwidth.
    pub fn noise_db(&self) -> f64 {
        10.0 * (BOLTZMANN * TEMPERATURE_K * 1000.0).log10()
            + self.noise_figure_db
            + 10.0 * self.bandwidth_hz.log10()
    }
}

/// One realization of a link between a receiver and its serving
/// transmitter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkEstimate {
    pub distance_m: f64,
    pub path_loss_db: f64,
    pub received_power_db: f64,
    /// Sum of interference scaled by network load (linear).
    pub interference: f64,
    pub noise_db: f64,
    /// `log10` of the signal to interference plus noise ratio, where
    /// each power is linearized as `10^value`.
    pub sinr: f64,
    /// bps/Hz
    pub spectral_efficiency: f64,
    pub capacity_mbps: f64,
}

impl LinkEstimate {
    /// Total interference on the same scale as `received_power_db`, or
    /// `None` without interferers.
    pub fn interference_db(&self) -> Option<f64> {
        (self.interference > 0.0).then(|| self.interference.log10())
    }
}

/// Samples one realization of the link from `site`'s transmitter to
/// `receiver`, with every interfering site transmitting at `eirp`.
pub fn estimate_link<R: Rng + ?Sized>(
    receiver: &Point<f64>,
    site: &SiteLayout,
    eirp: f64,
    params: &LinkParams,
    mcs: &McsTable,
    rng: &mut R,
) -> LinkEstimate {
    let distance_m = site.transmitter.euclidean_distance(receiver);
    let path_loss_db = free_space(
        params.frequency_ghz,
        distance_m,
        params.tx_height_m,
        params.rx_height_m,
        &params.shadowing,
        rng,
    );
    let received_power_db = params.received_power(eirp, path_loss_db);

    let interference = interference(receiver, &site.interfering_transmitters, eirp, params, rng)
        .iter()
        .sum::<f64>()
        * (params.network_load / 100.0);
    let noise_db = params.noise_db();

    let raw_received_power = 10f64.powf(received_power_db);
    let raw_noise = 10f64.powf(noise_db);
    let sinr = round_to((raw_received_power / (interference + raw_noise)).log10(), 2);

    let spectral_efficiency = mcs.spectral_efficiency(sinr);
    let capacity_mbps = params.bandwidth_hz * spectral_efficiency / 1e6;

    LinkEstimate {
        distance_m,
        path_loss_db,
        received_power_db,
        interference,
        noise_db,
        sinr,
        spectral_efficiency,
        capacity_mbps,
    }
}
