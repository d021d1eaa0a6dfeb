/// Mean of the present samples, rounded to 2 decimals.
/// `None` when every sample is missing (or there are none).
pub fn mean_of_present(samples: &[Option<f64>]) -> Option<f64> {
    let (sum, count) = samples
        .iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));

    if count == 0 {
        return None;
    }
    Some(round2(sum / count as f64))
}

/// Round to 2 decimal digits, ties to even.
///
/// Magnitudes at or above 2^52 / 100 carry no fractional digits, and scaling
/// them by 100 could overflow, so they are returned unchanged.
pub fn round2(v: f64) -> f64 {
    if !v.is_finite() || v.abs() >= NO_FRACTION_ABOVE {
        return v;
    }
    (v * 100.0).round_ties_even() / 100.0
}

const NO_FRACTION_ABOVE: f64 = 4_503_599_627_370_496.0 / 100.0;
