//! Scenario and carrier parameters.

use crate::{error::ConfigError, optimizer::PowerRange, propagation::Shadowing};

/// A named bundle of radio and search parameters.
///
/// Values are never mutated once a simulation starts; per-hour values
/// (demand, site area) live in [`crate::simulation::HourContext`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    pub name: String,

    /// Log-normal shadowing draws averaged per path loss sample.
    pub iterations: u32,

    /// Seed for the scenario's random generator.
    pub seed: u64,

    /// When set, every shadowing sample is re-derived from this value
    /// and the carrier frequency instead of the run's generator.
    pub shadow_seed: Option<u64>,

    /// Linear mean of the shadowing distribution.
    pub shadow_mu: f64,

    /// Standard deviation of the shadowing distribution (dB).
    pub shadow_sigma: f64,

    pub tx_height_m: f64,
    pub tx_gain_dbi: f64,
    pub tx_losses_db: f64,

    pub rx_height_m: f64,
    pub rx_gain_dbi: f64,
    pub rx_losses_db: f64,
    pub rx_misc_losses_db: f64,

    /// Share of interfering sites transmitting (percent).
    pub network_load: f64,

    /// Percentile of sampled link capacities taken as a power level's
    /// capacity.
    pub percentile: f64,

    /// Link realizations drawn per active receiver and power level.
    pub samples_per_receiver: usize,

    /// Only the strongest `n` interferers are summed when set.
    pub max_interferers: Option<usize>,

    /// Lowest transmit power searched (W).
    pub min_w: f64,

    /// Highest transmit power searched and the fallback when demand
    /// can't be met (W).
    pub max_w: f64,

    /// Power search step (W).
    pub increment: f64,
}

/// Baseline parameters under an empty name, which [`Scenario::validate`]
/// rejects. Scenarios read from a file must name themselves.
impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: String::new(),
            ..Self::baseline()
        }
    }
}

impl Scenario {
    /// Fixed 20 W transmitters.
    pub fn baseline() -> Self {
        Self {
            name: "baseline".to_string(),
            iterations: 1,
            seed: 42,
            shadow_seed: None,
            shadow_mu: 1.0,
            shadow_sigma: 2.5,
            tx_height_m: 30.0,
            tx_gain_dbi: 16.0,
            tx_losses_db: 1.0,
            rx_height_m: 1.5,
            rx_gain_dbi: 0.0,
            rx_losses_db: 4.0,
            rx_misc_losses_db: 4.0,
            network_load: 100.0,
            percentile: 90.0,
            samples_per_receiver: 100,
            max_interferers: None,
            min_w: 20.0,
            max_w: 20.0,
            increment: 2.0,
        }
    }

    /// Transmit power managed between 5 W and 20 W to follow demand.
    pub fn managed_power() -> Self {
        Self {
            name: "managed_power".to_string(),
            min_w: 5.0,
            ..Self::baseline()
        }
    }

    /// Checks every parameter that can't be expressed in the type
    /// system.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::UnnamedScenario);
        }
        self.power_range()?;
        self.shadowing()?;
        check_percentage("network_load", self.network_load)?;
        check_percentage("percentile", self.percentile)?;
        if self.samples_per_receiver == 0 {
            return Err(ConfigError::Zero("samples_per_receiver"));
        }
        Ok(())
    }

    /// The inclusive transmit power search range.
    pub fn power_range(&self) -> Result<PowerRange, ConfigError> {
        PowerRange::new(self.min_w, self.max_w, self.increment)
    }

    /// The shadowing term applied to every path loss.
    pub fn shadowing(&self) -> Result<Shadowing, ConfigError> {
        Shadowing::log_normal(
            self.shadow_mu,
            self.shadow_sigma,
            self.iterations,
            self.shadow_seed,
        )
    }

    /// Equivalent isotropically radiated power for `tx_power_w`.
    ///
    /// Watts are added to the antenna gain as-is, without conversion
    /// to dBm.
    pub fn eirp(&self, tx_power_w: f64) -> f64 {
        tx_power_w + self.tx_gain_dbi - self.tx_losses_db
    }
}

/// Carrier band used by every site in a simulation.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
#[derive(Debug, Clone, PartialEq)]
pub struct Carrier {
    pub frequency_ghz: f64,
    pub bandwidth_mhz: f64,
    /// Key into the modulation and coding tables, e.g. `4G`.
    pub generation: String,
}

impl Default for Carrier {
    fn default() -> Self {
        Self {
            frequency_ghz: 0.8,
            bandwidth_mhz: 10.0,
            generation: "4G".to_string(),
        }
    }
}

impl Carrier {
    pub fn bandwidth_hz(&self) -> f64 {
        self.bandwidth_mhz * 1e6
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.frequency_ghz > 0.0) {
            return Err(ConfigError::Zero("frequency_ghz"));
        }
        if !(self.bandwidth_mhz > 0.0) {
            return Err(ConfigError::Zero("bandwidth_mhz"));
        }
        Ok(())
    }
}

fn check_percentage(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Percentage { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::{Carrier, Scenario};
    use crate::error::ConfigError;

    #[test]
    fn test_builtin_scenarios_are_valid() {
        Scenario::baseline().validate().unwrap();
        Scenario::managed_power().validate().unwrap();
        Carrier::default().validate().unwrap();
    }

    #[test]
    fn test_unnamed_scenario() {
        assert_eq!(
            Scenario::default().validate(),
            Err(ConfigError::UnnamedScenario)
        );
        let scenario = Scenario {
            name: "quiet".to_string(),
            ..Scenario::default()
        };
        scenario.validate().unwrap();
        assert_eq!(scenario.min_w, Scenario::baseline().min_w);
    }

    #[test]
    fn test_eirp() {
        assert_eq!(Scenario::baseline().eirp(20.0), 35.0);
    }

    #[test]
    fn test_invalid_power_range() {
        let scenario = Scenario {
            min_w: 30.0,
            ..Scenario::baseline()
        };
        assert_eq!(
            scenario.validate(),
            Err(ConfigError::PowerRange {
                min_w: 30.0,
                max_w: 20.0
            })
        );
        let scenario = Scenario {
            increment: 0.0,
            ..Scenario::managed_power()
        };
        assert_eq!(scenario.validate(), Err(ConfigError::Increment(0.0)));
    }

    #[test]
    fn test_invalid_percentages() {
        let scenario = Scenario {
            network_load: 120.0,
            ..Scenario::baseline()
        };
        assert!(matches!(
            scenario.validate(),
            Err(ConfigError::Percentage {
                name: "network_load",
                ..
            })
        ));
        let scenario = Scenario {
            samples_per_receiver: 0,
            ..Scenario::baseline()
        };
        assert_eq!(
            scenario.validate(),
            Err(ConfigError::Zero("samples_per_receiver"))
        );
    }
}
