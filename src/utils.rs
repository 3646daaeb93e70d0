//! Statistics helpers and convenience sample constructors

use crate::types::Sample;
use chrono::{DateTime, Duration, Utc};

/// Arithmetic mean; 0.0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation; 0.0 for an empty slice
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Nearest-rank percentile over an unsorted slice; 0.0 for an empty slice
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let index = ((p / 100.0) * (sorted.len() - 1) as f64).round() as usize;
    sorted[index.min(sorted.len() - 1)]
}

/// Median value; 0.0 for an empty slice
pub fn median(values: &[f64]) -> f64 {
    percentile(values, 50.0)
}

/// Create a sample at a fixed offset (in hours) from a base timestamp
pub fn sample_at(base: DateTime<Utc>, hours_offset: i64, value: f64) -> Sample {
    Sample::new(base + Duration::hours(hours_offset), value)
}

/// Build an hourly series from a value function over the hour index
pub fn hourly_series<F: Fn(usize) -> f64>(
    start: DateTime<Utc>,
    hours: usize,
    value_fn: F,
) -> Vec<Sample> {
    (0..hours)
        .map(|i| Sample::new(start + Duration::hours(i as i64), value_fn(i)))
        .collect()
}
