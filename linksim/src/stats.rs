//! Percentile summaries of sampled links.

use crate::{link::LinkEstimate, math::percentile};

/// Confidence intervals reported by default.
pub const CONFIDENCE_INTERVALS: [f64; 3] = [5.0, 50.0, 95.0];

/// Link metrics at one confidence interval.
///
/// Loss-like metrics (path loss, interference, noise) are taken at the
/// `confidence_interval` percentile, throughput-like metrics at
/// `100 - confidence_interval`, so a higher interval is always the more
/// pessimistic view.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkSummary {
    pub confidence_interval: f64,
    pub path_loss_db: f64,
    pub received_power_db: f64,
    /// Linear, load-scaled.
    pub interference: f64,
    pub noise_db: f64,
    pub sinr: f64,
    pub spectral_efficiency: f64,
    pub capacity_mbps: f64,
    pub capacity_mbps_km2: f64,
}

impl LinkSummary {
    /// Summarizes `estimates` at every interval in `confidence_intervals`.
    ///
    /// Returns nothing for an empty sample. Areal capacity is zero when
    /// `site_area_km2` isn't positive.
    pub fn summarize(
        estimates: &[LinkEstimate],
        site_area_km2: f64,
        confidence_intervals: &[f64],
    ) -> Vec<Self> {
        if estimates.is_empty() {
            return Vec::new();
        }

        let column = |f: fn(&LinkEstimate) -> f64| estimates.iter().map(f).collect::<Vec<f64>>();
        let mut path_loss = column(|e| e.path_loss_db);
        let mut received_power = column(|e| e.received_power_db);
        let mut interference = column(|e| e.interference);
        let mut noise = column(|e| e.noise_db);
        let mut sinr = column(|e| e.sinr);
        let mut spectral_efficiency = column(|e| e.spectral_efficiency);
        let mut capacity = column(|e| e.capacity_mbps);

        confidence_intervals
            .iter()
            .map(|&ci| {
                let worst = |values: &mut Vec<f64>| percentile(values, ci).unwrap_or(0.0);
                let best = |values: &mut Vec<f64>| percentile(values, 100.0 - ci).unwrap_or(0.0);
                let capacity_mbps = best(&mut capacity);
                Self {
                    confidence_interval: ci,
                    path_loss_db: worst(&mut path_loss),
                    received_power_db: best(&mut received_power),
                    interference: worst(&mut interference),
                    noise_db: worst(&mut noise),
                    sinr: best(&mut sinr),
                    spectral_efficiency: best(&mut spectral_efficiency),
                    capacity_mbps,
                    capacity_mbps_km2: if site_area_km2 > 0.0 {
                        capacity_mbps / site_area_km2
                    } else {
                        0.0
                    },
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{LinkSummary, CONFIDENCE_INTERVALS};
    use crate::link::LinkEstimate;
    use approx::assert_relative_eq;

    fn estimate(step: f64) -> LinkEstimate {
        LinkEstimate {
            distance_m: 1000.0 + step,
            path_loss_db: 90.0 + step,
            received_power_db: -60.0 - step,
            interference: step * 1e-9,
            noise_db: -102.48,
            sinr: 30.0 - step,
            spectral_efficiency: 11.4 - step / 10.0,
            capacity_mbps: 114.0 - step,
        }
    }

    #[test]
    fn test_empty_sample() {
        assert!(LinkSummary::summarize(&[], 10.0, &CONFIDENCE_INTERVALS).is_empty());
    }

    #[test]
    fn test_percentile_directions() {
        let estimates: Vec<LinkEstimate> = (0..=100).map(|step| estimate(f64::from(step))).collect();
        let summaries = LinkSummary::summarize(&estimates, 2.0, &CONFIDENCE_INTERVALS);
        assert_eq!(summaries.len(), 3);

        let pessimistic = summaries[2];
        assert_eq!(pessimistic.confidence_interval, 95.0);
        assert_relative_eq!(pessimistic.path_loss_db, 185.0);
        assert_relative_eq!(pessimistic.received_power_db, -155.0);
        assert_relative_eq!(pessimistic.interference, 95e-9, epsilon = 1e-15);
        assert_relative_eq!(pessimistic.noise_db, -102.48);
        assert_relative_eq!(pessimistic.sinr, -65.0);
        assert_relative_eq!(pessimistic.capacity_mbps, 19.0);
        assert_relative_eq!(pessimistic.capacity_mbps_km2, 9.5);

        let median = summaries[1];
        assert_relative_eq!(median.path_loss_db, 140.0);
        assert_relative_eq!(median.capacity_mbps, 64.0);
        assert!(summaries[0].capacity_mbps > median.capacity_mbps);
    }

    #[test]
    fn test_zero_site_area() {
        let summaries = LinkSummary::summarize(&[estimate(0.0)], 0.0, &[50.0]);
        assert_eq!(summaries[0].capacity_mbps_km2, 0.0);
        assert_relative_eq!(summaries[0].capacity_mbps, 114.0);
    }
}
