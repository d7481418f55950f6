//! Free space path loss with log-normal shadowing.

use crate::{error::ConfigError, math::round_to};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, LogNormal};

/// Random variation added to every path loss estimate (dB).
#[derive(Debug, Clone, Copy)]
pub enum Shadowing {
    /// Deterministic path loss.
    None,

    /// Mean of `draws` log-normal samples.
    LogNormal {
        distribution: LogNormal<f64>,
        draws: u32,
        /// Re-derive a generator from this value and the carrier
        /// frequency for every sample instead of using the caller's.
        seed: Option<u64>,
    },
}

impl Shadowing {
    /// Returns a log-normal shadowing term whose samples have a linear
    /// mean of `mu` and standard deviation `sigma`.
    ///
    /// `mu` and `sigma` describe the log-normal distribution itself,
    /// the parameters of the underlying normal distribution are
    /// derived from them.
    pub fn log_normal(mu: f64, sigma: f64, draws: u32, seed: Option<u64>) -> Result<Self, ConfigError> {
        if draws == 0 {
            return Err(ConfigError::Zero("iterations"));
        }
        if !(mu > 0.0 && mu.is_finite() && sigma >= 0.0 && sigma.is_finite()) {
            return Err(ConfigError::Shadowing { mu, sigma });
        }
        let normal_std = (1.0 + (sigma / mu).powi(2)).log10().sqrt();
        let normal_mean = mu.log10() - normal_std.powi(2) / 2.0;
        let distribution =
            LogNormal::new(normal_mean, normal_std).map_err(|_| ConfigError::Shadowing { mu, sigma })?;
        Ok(Self::LogNormal {
            distribution,
            draws,
            seed,
        })
    }

    /// Draws one shadowing value (dB), rounded to two decimals.
    ///
    /// With `draws == 1` this is a single noisy sample.
    pub fn sample<R: Rng + ?Sized>(&self, frequency_mhz: f64, rng: &mut R) -> f64 {
        match *self {
            Self::None => 0.0,
            Self::LogNormal {
                distribution,
                draws,
                seed,
            } => {
                let total: f64 = match seed {
                    Some(seed) => {
                        let mut rng = ChaCha8Rng::seed_from_u64(frequency_seed(seed, frequency_mhz));
                        (0..draws).map(|_| distribution.sample(&mut rng)).sum()
                    }
                    None => (0..draws).map(|_| distribution.sample(rng)).sum(),
                };
                round_to(total / f64::from(draws), 2)
            }
        }
    }
}

/// Derives a generator seed from the leading two digits of
/// `seed * frequency_mhz * 100`.
fn frequency_seed(seed: u64, frequency_mhz: f64) -> u64 {
    #[allow(clippy::cast_precision_loss)]
    let value = seed as f64 * frequency_mhz * 100.0;
    format!("{value}")
        .chars()
        .filter(char::is_ascii_digit)
        .take(2)
        .collect::<String>()
        .parse()
        .unwrap_or(0)
}

/// Returns the free space path loss (dB) between two antennas,
/// rounded to two decimals.
///
/// # Parameters
///
/// - `frequency_ghz`: carrier frequency (GHz)
/// - `distance_m`: horizontal distance between the antennas (meters)
/// - `tx_height_m`: transmitter height above ground (meters)
/// - `rx_height_m`: receiver height above ground (meters)
/// - `shadowing`: random variation added to the estimate
pub fn free_space<R: Rng + ?Sized>(
    frequency_ghz: f64,
    distance_m: f64,
    tx_height_m: f64,
    rx_height_m: f64,
    shadowing: &Shadowing,
    rng: &mut R,
) -> f64 {
    let frequency_mhz = frequency_ghz * 1000.0;
    let distance_km = distance_m / 1000.0;
    let height_km = (tx_height_m - rx_height_m) / 1000.0;

    let random_variation = shadowing.sample(frequency_mhz, rng);
    let path_loss = 32.4
        + 10.0 * (height_km.powi(2) + distance_km.powi(2)).log10()
        + (20.0 * frequency_mhz.log10() + random_variation);

    round_to(path_loss, 2)
}

#[cfg(test)]
mod tests {
    use super::{free_space, frequency_seed, Shadowing};
    use crate::error::ConfigError;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_deterministic_free_space() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert_relative_eq!(
            free_space(0.8, 1000.0, 30.0, 1.5, &Shadowing::None, &mut rng),
            90.47
        );
        assert_relative_eq!(
            free_space(0.8, 2000.0, 30.0, 1.5, &Shadowing::None, &mut rng),
            96.48
        );
    }

    #[test]
    fn test_path_loss_grows_with_distance() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let near = free_space(0.8, 500.0, 30.0, 1.5, &Shadowing::None, &mut rng);
        let far = free_space(0.8, 5000.0, 30.0, 1.5, &Shadowing::None, &mut rng);
        assert!(far > near);
    }

    #[test]
    fn test_shadowing_is_reproducible() {
        let shadowing = Shadowing::log_normal(1.0, 2.5, 1, None).unwrap();
        let draw = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            (0..10)
                .map(|_| free_space(0.8, 1000.0, 30.0, 1.5, &shadowing, &mut rng))
                .collect::<Vec<_>>()
        };
        assert_eq!(draw(7), draw(7));
        assert_ne!(draw(7), draw(8));
        assert!(draw(7).iter().all(|pl| *pl >= 90.47));
    }

    #[test]
    fn test_shadowing_mean() {
        let shadowing = Shadowing::log_normal(1.0, 2.5, 10_000, None).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mean = shadowing.sample(800.0, &mut rng);
        assert!((mean - 1.0).abs() < 0.1, "mean {mean}");
    }

    #[test]
    fn test_seeded_shadowing_ignores_caller_generator() {
        let shadowing = Shadowing::log_normal(1.0, 2.5, 1, Some(1)).unwrap();
        let mut a = ChaCha8Rng::seed_from_u64(1);
        let mut b = ChaCha8Rng::seed_from_u64(2);
        assert_eq!(shadowing.sample(800.0, &mut a), shadowing.sample(800.0, &mut b));
        assert_eq!(shadowing.sample(800.0, &mut a), shadowing.sample(800.0, &mut a));
    }

    #[test]
    fn test_frequency_seed() {
        assert_eq!(frequency_seed(1, 800.0), 80);
        assert_eq!(frequency_seed(3, 2600.0), 78);
        assert_eq!(frequency_seed(0, 800.0), 0);
    }

    #[test]
    fn test_invalid_shadowing() {
        assert_eq!(
            Shadowing::log_normal(0.0, 2.5, 1, None).unwrap_err(),
            ConfigError::Shadowing { mu: 0.0, sigma: 2.5 }
        );
        assert_eq!(
            Shadowing::log_normal(1.0, 2.5, 0, None).unwrap_err(),
            ConfigError::Zero("iterations")
        );
    }
}
