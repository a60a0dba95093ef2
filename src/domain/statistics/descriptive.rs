//! Descriptive statistics helpers

/// Arithmetic mean; 0.0 for an empty sample
pub fn mean(sample: &[f64]) -> f64 {
    if sample.is_empty() {
        return 0.0;
    }
    sample.iter().sum::<f64>() / sample.len() as f64
}

/// Sample variance (n-1 denominator); 0.0 below two observations
pub fn variance(sample: &[f64]) -> f64 {
    if sample.len() < 2 {
        return 0.0;
    }

    let m = mean(sample);
    let n = sample.len() as f64;
    sample.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (n - 1.0)
}

/// Sample standard deviation
pub fn std_dev(sample: &[f64]) -> f64 {
    variance(sample).sqrt()
}

/// Quantile with linear interpolation between closest ranks.
///
/// `sorted` must be ascending; `q` is in [0, 1].
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;

    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * fraction)
}

/// Interquartile range of an ascending sample
pub fn interquartile_range(sorted: &[f64]) -> Option<f64> {
    Some(quantile(sorted, 0.75)? - quantile(sorted, 0.25)?)
}

/// Minimum and maximum of a non-empty sample
pub fn min_max(sample: &[f64]) -> Option<(f64, f64)> {
    let first = *sample.first()?;
    Some(
        sample
            .iter()
            .fold((first, first), |(lo, hi), &x| (lo.min(x), hi.max(x))),
    )
}
