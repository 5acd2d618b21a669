//! Sample statistics used by the correlation engine and tooltip summaries.
//!
//! Degenerate inputs never error: each function documents the value it returns when
//! there is not enough data for the n−1 denominator.

/// Arithmetic mean.
///
/// Returns `0.0` for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }

    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation: `sqrt(Σ(xi − mean)² / (n − 1))`
///
/// Returns `0.0` when fewer than two values are provided.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let mean = mean(values);
    let sum_sq = values
        .iter()
        .map(|value| (value - mean).powi(2))
        .sum::<f64>();

    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// Sample covariance: `Σ((xi − mean_x)(yi − mean_y)) / (n − 1)`
///
/// Returns `0.0` if the slices differ in length or hold fewer than two values.
pub fn covariance(x: &[f64], y: &[f64]) -> f64 {
    if x.len() != y.len() || x.len() < 2 {
        return 0.0;
    }

    let mean_x = mean(x);
    let mean_y = mean(y);
    let sum_products = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| (xi - mean_x) * (yi - mean_y))
        .sum::<f64>();

    sum_products / (x.len() - 1) as f64
}

/// Pearson correlation coefficient from a covariance and both standard deviations.
///
/// Returns `0.0` if either standard deviation is zero: a series with no variance is
/// treated as uncorrelated with everything.
pub fn pearson(covariance: f64, std_dev_x: f64, std_dev_y: f64) -> f64 {
    if std_dev_x == 0.0 || std_dev_y == 0.0 {
        return 0.0;
    }

    covariance / (std_dev_x * std_dev_y)
}
