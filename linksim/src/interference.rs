use crate::{link::LinkParams, propagation::free_space};
use geo::{algorithm::EuclideanDistance, geometry::Point};
use rand::Rng;

/// Returns the interference power received at `receiver` from each of
/// `interferers`, in linear units, strongest first.
///
/// Interferers transmit at `eirp` on the link's carrier. When the link
/// caps the number of interferers only the strongest are returned.
pub fn interference<R: Rng + ?Sized>(
    receiver: &Point<f64>,
    interferers: &[Point<f64>],
    eirp: f64,
    params: &LinkParams,
    rng: &mut R,
) -> Vec<f64> {
    let mut powers: Vec<f64> = interferers
        .iter()
        .map(|interferer| {
            let distance_m = interferer.euclidean_distance(receiver);
            let path_loss = free_space(
                params.frequency_ghz,
                distance_m,
                params.tx_height_m,
                params.rx_height_m,
                &params.shadowing,
                rng,
            );
            10f64.powf(params.received_power(eirp, path_loss))
        })
        .collect();

    powers.sort_unstable_by(|a, b| b.total_cmp(a));
    if let Some(max) = params.max_interferers {
        powers.truncate(max);
    }
    powers
}
