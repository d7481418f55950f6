use num_traits::{Float, FromPrimitive};

/// Returns `n` evenly spaced values over `[y_start, y_end]`, endpoints
/// included.
pub fn linspace<T>(y_start: T, y_end: T, n: usize) -> impl Iterator<Item = T>
where
    T: Float + FromPrimitive,
{
    let dy = if n > 1 {
        (y_end - y_start) / T::from_usize(n - 1).unwrap_or_else(T::one)
    } else {
        T::zero()
    };
    (0..n).map(move |x| y_start + T::from_usize(x).unwrap_or_else(T::zero) * dy)
}

/// Rounds `value` to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let scale = 10f64.powi(places);
    (value * scale).round() / scale
}

/// Returns the `q`th percentile of `values` using linear interpolation
/// between the closest ranks, or `None` if `values` is empty.
///
/// `values` is sorted in place.
pub fn percentile(values: &mut [f64], q: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable_by(f64::total_cmp);
    #[allow(clippy::cast_precision_loss)]
    let rank = (values.len() - 1) as f64 * q.clamp(0.0, 100.0) / 100.0;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let (lo, hi) = (rank.floor() as usize, rank.ceil() as usize);
    let fraction = rank - rank.floor();
    Some(values[lo] + (values[hi] - values[lo]) * fraction)
}

#[cfg(test)]
mod tests {
    use super::{linspace, percentile, round_to};
    use approx::assert_relative_eq;

    #[test]
    fn test_linspace() {
        let values: Vec<f64> = linspace(0.0, 1.0, 5).collect();
        assert_eq!(values, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert_eq!(linspace(3.0, 9.0, 1).collect::<Vec<f64>>(), vec![3.0]);
        assert_eq!(linspace(3.0, 9.0, 0).count(), 0);
    }

    #[test]
    fn test_round_to() {
        assert_relative_eq!(round_to(90.465_325_864_914_38, 2), 90.47);
        assert_relative_eq!(round_to(-63.474_9, 2), -63.47);
    }

    #[test]
    fn test_percentile_interpolates() {
        let mut values = vec![4.0, 1.0, 3.0, 2.0];
        assert_relative_eq!(percentile(&mut values, 90.0).unwrap(), 3.7);
        assert_relative_eq!(percentile(&mut values, 50.0).unwrap(), 2.5);
        assert_relative_eq!(percentile(&mut values, 0.0).unwrap(), 1.0);
        assert_relative_eq!(percentile(&mut values, 100.0).unwrap(), 4.0);
    }

    #[test]
    fn test_percentile_edge_cases() {
        assert_eq!(percentile(&mut [], 90.0), None);
        assert_relative_eq!(percentile(&mut [7.5], 90.0).unwrap(), 7.5);
    }
}
