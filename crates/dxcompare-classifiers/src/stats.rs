//! Descriptive statistics helpers over plain `f64` slices.
//!
//! Mean, standard deviation and covariance come from `statrs`; quantiles use
//! linear interpolation between closest ranks (the default of numpy and pandas).
use statrs::statistics::Statistics;

/// Arithmetic mean; `NaN` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().mean()
}

/// Sample standard deviation (n - 1 denominator); `NaN` below two values.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    values.iter().std_dev()
}

/// Quantile `q` in `[0, 1]` with linear interpolation; `NaN` for an empty
/// slice.
pub fn quantile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    quantile_sorted(&sorted, q)
}

pub(crate) fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

pub fn median(values: &[f64]) -> f64 {
    quantile(values, 0.5)
}

/// Pearson correlation of paired observations. Pairs with a missing side are
/// skipped. `NaN` when fewer than two complete pairs remain or either side has
/// zero variance.
pub fn pearson(x: &[Option<f64>], y: &[Option<f64>]) -> f64 {
    let (xs, ys): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .unzip();
    if xs.len() < 2 {
        return f64::NAN;
    }
    let denom = xs.iter().std_dev() * ys.iter().std_dev();
    if denom == 0.0 || denom.is_nan() {
        return f64::NAN;
    }
    let cov = xs.iter().covariance(ys.iter());
    (cov / denom).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantiles_interpolate_linearly() {
        let values = [4.0, 1.0, 3.0, 2.0];
        assert!((quantile(&values, 0.25) - 1.75).abs() < 1e-12);
        assert!((median(&values) - 2.5).abs() < 1e-12);
        assert!((quantile(&values, 0.75) - 3.25).abs() < 1e-12);
        assert_eq!(quantile(&values, 0.0), 1.0);
        assert_eq!(quantile(&values, 1.0), 4.0);
    }

    #[test]
    fn median_of_odd_count() {
        assert_eq!(median(&[5.0, 1.0, 3.0]), 3.0);
        assert!(median(&[]).is_nan());
    }

    #[test]
    fn std_uses_sample_denominator() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean(&values) - 5.0).abs() < 1e-12);
        assert!((sample_std(&values) - 2.138089935299395).abs() < 1e-9);
        assert!(sample_std(&[1.0]).is_nan());
    }

    #[test]
    fn pearson_perfect_and_undefined() {
        let x = [Some(1.0), Some(2.0), Some(3.0), None];
        let y = [Some(2.0), Some(4.0), Some(6.0), Some(100.0)];
        assert!((pearson(&x, &y) - 1.0).abs() < 1e-12);

        let flat = [Some(1.0), Some(1.0), Some(1.0), Some(1.0)];
        assert!(pearson(&flat, &y).is_nan());
    }

    #[test]
    fn pearson_matches_known_value_on_complete_pairs() {
        // r of (1,2,3,4,5) and (2,4,5,4,5) is 6 / sqrt(10 * 6)
        let x = [Some(1.0), Some(2.0), None, Some(3.0), Some(4.0), Some(5.0)];
        let y = [Some(2.0), Some(4.0), Some(9.0), Some(5.0), Some(4.0), Some(5.0)];
        let expected = 6.0 / 60.0f64.sqrt();
        assert!((pearson(&x, &y) - expected).abs() < 1e-12);
        assert!((pearson(&y, &x) - expected).abs() < 1e-12);

        let reversed = [Some(5.0), Some(4.0), None, Some(3.0), Some(2.0), Some(1.0)];
        assert!((pearson(&x, &reversed) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_needs_two_complete_pairs() {
        let x = [Some(1.0), None, Some(3.0)];
        let y = [Some(2.0), Some(4.0), None];
        assert!(pearson(&x, &y).is_nan());
        assert!(pearson(&[], &[]).is_nan());
    }
}
