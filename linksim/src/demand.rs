//! Traffic demand.

use crate::error::ConfigError;

/// Minimum rate guaranteed to every active user (Mbps).
pub const MIN_USER_MBPS: f64 = 2.0;

const DAYS_PER_MONTH: f64 = 30.0;
const SECONDS_PER_HOUR: f64 = 3600.0;

/// Returns the per-user throughput (Mbps) required to carry
/// `monthly_data_gb` when `hourly_share_percent` of it falls in one
/// hour, floored at [`MIN_USER_MBPS`].
pub fn required_mbps(monthly_data_gb: f64, hourly_share_percent: f64) -> f64 {
    let megabits = monthly_data_gb * 1024.0 * 8.0;
    let demand = megabits * (hourly_share_percent / 100.0) / DAYS_PER_MONTH / SECONDS_PER_HOUR;
    demand.max(MIN_USER_MBPS)
}

/// Share of daily traffic (percent) carried in each hour of the day.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyShare([f64; 24]);

impl HourlyShare {
    /// Builds a table from `(hour, percent)` pairs, which must cover
    /// every hour `0..24` exactly once.
    pub fn new(entries: impl IntoIterator<Item = (usize, f64)>) -> Result<Self, ConfigError> {
        let mut shares = [None; 24];
        let mut count = 0;
        for (hour, share) in entries {
            count += 1;
            if !(0.0..=100.0).contains(&share) {
                return Err(ConfigError::Percentage {
                    name: "hourly share",
                    value: share,
                });
            }
            match shares.get_mut(hour) {
                Some(slot) => *slot = Some(share),
                None => return Err(ConfigError::HourlyTableHour(hour)),
            }
        }
        if count != 24 {
            return Err(ConfigError::HourlyTableLen(count));
        }
        let mut table = [0.0; 24];
        for (hour, (slot, share)) in table.iter_mut().zip(shares).enumerate() {
            *slot = share.ok_or(ConfigError::HourlyTableHour(hour))?;
        }
        Ok(Self(table))
    }

    /// Percent of daily traffic in `hour`.
    pub fn share(&self, hour: usize) -> f64 {
        self.0[hour % 24]
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.0.iter().copied().enumerate()
    }
}

/// Number of users active in an hour carrying `hourly_share_percent` of
/// the day's traffic.
pub fn active_users(population: usize, hourly_share_percent: f64) -> usize {
    #[allow(clippy::cast_precision_loss)]
    let active = (population as f64 * hourly_share_percent / 100.0).ceil();
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let active = active.max(0.0) as usize;
    active.min(population)
}

#[cfg(test)]
mod tests {
    use super::{active_users, required_mbps, HourlyShare, MIN_USER_MBPS};
    use crate::error::ConfigError;
    use approx::assert_relative_eq;

    #[test]
    fn test_demand_floor() {
        assert_eq!(required_mbps(1.0, 0.1), MIN_USER_MBPS);
        assert_eq!(required_mbps(100.0, 10.0), 2.0);
    }

    #[test]
    fn test_demand_above_floor() {
        // 1 TB a month with 10% in a single hour.
        assert_relative_eq!(
            required_mbps(1000.0, 10.0),
            7.585_185_185_185_185,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_active_users() {
        assert_eq!(active_users(500, 5.0), 25);
        assert_eq!(active_users(500, 0.1), 1);
        assert_eq!(active_users(500, 0.0), 0);
        assert_eq!(active_users(500, 100.0), 500);
    }

    #[test]
    fn test_hourly_share_table() {
        let table = HourlyShare::new((0..24).map(|hour| (23 - hour, 100.0 / 24.0))).unwrap();
        assert_relative_eq!(
            table.iter().map(|(_, share)| share).sum::<f64>(),
            100.0,
            epsilon = 1e-9
        );
        assert_eq!(table.share(24), table.share(0));
    }

    #[test]
    fn test_hourly_share_errors() {
        assert_eq!(
            HourlyShare::new((0..23).map(|hour| (hour, 1.0))),
            Err(ConfigError::HourlyTableLen(23))
        );
        assert_eq!(
            HourlyShare::new((0..24).map(|hour| (hour + 1, 1.0))),
            Err(ConfigError::HourlyTableHour(24))
        );
        assert_eq!(
            HourlyShare::new((0..24).map(|hour| (hour / 2, 1.0))),
            Err(ConfigError::HourlyTableHour(12))
        );
        assert!(matches!(
            HourlyShare::new((0..24).map(|hour| (hour, -1.0))),
            Err(ConfigError::Percentage { .. })
        ));
    }
}
