// src/pattern.rs

//! Recurring-structure extraction: hourly/weekly/monthly averages,
//! seasonal multipliers, and z-score anomaly flagging.
//!
//! Analysis is a wholesale recomputation over an owned snapshot of the
//! series; nothing here is incremental and nothing mutates the store.

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use std::collections::HashMap;
use tracing::debug;

use crate::store::resample_samples;
use crate::types::{Aggregator, AnomalyKind, Pattern, Sample, Season, SpecialEvent};
use crate::utils::{mean, std_dev};

/// Maximum number of anomaly events kept per analysis pass
const MAX_SPECIAL_EVENTS: usize = 10;

/// Extracts recurring daily/weekly/monthly/seasonal structure from a series
#[derive(Debug, Clone)]
pub struct PatternAnalyzer {
    /// Z-score threshold above which a sample becomes a special event
    anomaly_threshold: f64,
}

impl Default for PatternAnalyzer {
    fn default() -> Self {
        Self {
            anomaly_threshold: 2.5,
        }
    }
}

impl PatternAnalyzer {
    pub fn new(anomaly_threshold: f64) -> Self {
        Self { anomaly_threshold }
    }

    /// Run the full analysis pass over a series snapshot
    pub fn analyze(&self, samples: &[Sample]) -> Pattern {
        let values: Vec<f64> = samples.iter().map(|s| s.value).collect();
        let pattern = Pattern {
            daily: self.analyze_daily(samples),
            weekly: self.analyze_weekly(samples),
            monthly: self.analyze_monthly(samples),
            seasonal: self.analyze_seasonal(samples),
            special_events: self.detect_anomalies(samples, self.anomaly_threshold),
            overall_mean: mean(&values),
            confidence: self.confidence(samples),
        };
        debug!(
            samples = samples.len(),
            events = pattern.special_events.len(),
            confidence = pattern.confidence,
            "pattern analysis complete"
        );
        pattern
    }

    /// Average value per hour of day, after resampling to hourly buckets.
    ///
    /// Hours with zero observations report 0.0 rather than being omitted
    /// or interpolated, which biases point prediction toward zero on
    /// sparse history. Carried over deliberately; tunable upstream only by
    /// feeding denser data.
    pub fn analyze_daily(&self, samples: &[Sample]) -> [f64; 24] {
        let hourly = resample_samples(samples, Duration::hours(1), Aggregator::Mean);

        let mut sums = [0.0f64; 24];
        let mut counts = [0usize; 24];
        for sample in &hourly {
            let hour = sample.timestamp.hour() as usize;
            sums[hour] += sample.value;
            counts[hour] += 1;
        }

        let mut averages = [0.0f64; 24];
        for hour in 0..24 {
            if counts[hour] > 0 {
                averages[hour] = sums[hour] / counts[hour] as f64;
            }
        }
        averages
    }

    /// Average value per day of week (0 = Monday); empty days report 0.0
    pub fn analyze_weekly(&self, samples: &[Sample]) -> [f64; 7] {
        let mut sums = [0.0f64; 7];
        let mut counts = [0usize; 7];
        for sample in samples {
            let day = sample.timestamp.weekday().num_days_from_monday() as usize;
            sums[day] += sample.value;
            counts[day] += 1;
        }

        let mut averages = [0.0f64; 7];
        for day in 0..7 {
            if counts[day] > 0 {
                averages[day] = sums[day] / counts[day] as f64;
            }
        }
        averages
    }

    /// Average value per day of month, days 1-30.
    ///
    /// Day-31 observations are silently excluded from this pattern (not
    /// from the underlying series).
    pub fn analyze_monthly(&self, samples: &[Sample]) -> [f64; 30] {
        let mut sums = [0.0f64; 30];
        let mut counts = [0usize; 30];
        for sample in samples {
            let day = sample.timestamp.day() as usize;
            if day > 30 {
                continue;
            }
            sums[day - 1] += sample.value;
            counts[day - 1] += 1;
        }

        let mut averages = [0.0f64; 30];
        for day in 0..30 {
            if counts[day] > 0 {
                averages[day] = sums[day] / counts[day] as f64;
            }
        }
        averages
    }

    /// Per-season multiplier relative to the overall mean.
    ///
    /// Each month's factor is its mean divided by the overall mean (1.0
    /// when the overall mean is 0); a season averages the factors of the
    /// months it actually has data for. Seasons with no data are absent.
    pub fn analyze_seasonal(&self, samples: &[Sample]) -> HashMap<Season, f64> {
        let values: Vec<f64> = samples.iter().map(|s| s.value).collect();
        let overall = mean(&values);

        let mut month_sums = [0.0f64; 12];
        let mut month_counts = [0usize; 12];
        for sample in samples {
            let month = sample.timestamp.month() as usize - 1;
            month_sums[month] += sample.value;
            month_counts[month] += 1;
        }

        let mut season_factors: HashMap<Season, Vec<f64>> = HashMap::new();
        for month in 0..12 {
            if month_counts[month] == 0 {
                continue;
            }
            let month_mean = month_sums[month] / month_counts[month] as f64;
            let factor = if overall == 0.0 {
                1.0
            } else {
                month_mean / overall
            };
            season_factors
                .entry(Season::from_month(month as u32 + 1))
                .or_default()
                .push(factor);
        }

        season_factors
            .into_iter()
            .map(|(season, factors)| (season, mean(&factors)))
            .collect()
    }

    /// Flag samples more than `threshold` standard deviations from the mean.
    ///
    /// Events are tagged spike or dip, sorted strongest-first, and capped
    /// at 10. A zero-variance series yields no events.
    pub fn detect_anomalies(&self, samples: &[Sample], threshold: f64) -> Vec<SpecialEvent> {
        let values: Vec<f64> = samples.iter().map(|s| s.value).collect();
        let m = mean(&values);
        let sd = std_dev(&values);
        if sd == 0.0 {
            return Vec::new();
        }

        let mut events: Vec<SpecialEvent> = samples
            .iter()
            .filter_map(|sample| {
                let z = (sample.value - m).abs() / sd;
                if z > threshold {
                    Some(SpecialEvent {
                        timestamp: sample.timestamp,
                        kind: if sample.value > m {
                            AnomalyKind::Spike
                        } else {
                            AnomalyKind::Dip
                        },
                        impact_multiplier: if m == 0.0 { 1.0 } else { sample.value / m },
                        z_score: z,
                    })
                } else {
                    None
                }
            })
            .collect();

        events.sort_by(|a, b| {
            b.z_score
                .partial_cmp(&a.z_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        events.truncate(MAX_SPECIAL_EVENTS);
        events
    }

    /// Count-based confidence heuristic, not a statistical guarantee
    pub fn confidence(&self, samples: &[Sample]) -> f64 {
        let n = samples.len();
        if n < 100 {
            0.5
        } else {
            (0.5 + n as f64 / 1000.0).min(0.95)
        }
    }

    /// Predict the value at a future instant from a pattern snapshot.
    ///
    /// Multiplies the hourly, weekly and monthly multipliers (each bucket
    /// average normalized by the overall mean) with the seasonal factor,
    /// then applies the impact multiplier of the strongest special event
    /// within one day of the target. Empty buckets zero the product.
    pub fn predict_point_value(&self, pattern: &Pattern, target: DateTime<Utc>) -> f64 {
        if pattern.overall_mean == 0.0 {
            return 0.0;
        }

        let hour_mult = pattern.daily[target.hour() as usize] / pattern.overall_mean;
        let day_mult = pattern.weekly[target.weekday().num_days_from_monday() as usize]
            / pattern.overall_mean;
        // Day-31 targets have no monthly bucket; treat them as neutral.
        let dom = target.day() as usize;
        let month_mult = if dom <= 30 {
            pattern.monthly[dom - 1] / pattern.overall_mean
        } else {
            1.0
        };
        let season_mult = pattern
            .seasonal
            .get(&Season::from_month(target.month()))
            .copied()
            .unwrap_or(1.0);

        let mut value = pattern.overall_mean * hour_mult * day_mult * month_mult * season_mult;

        // Events are already sorted strongest-first.
        if let Some(event) = pattern
            .special_events
            .iter()
            .find(|e| (e.timestamp - target).num_seconds().abs() <= 86_400)
        {
            value *= event.impact_multiplier;
        }

        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::hourly_series;
    use chrono::TimeZone;

    fn base() -> DateTime<Utc> {
        // A Monday at midnight.
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    /// One week of hourly samples: high during business hours, low otherwise.
    fn business_week() -> Vec<Sample> {
        hourly_series(base(), 168, |i| {
            let hour = i % 24;
            if (9..=17).contains(&hour) {
                80.0
            } else {
                20.0
            }
        })
    }

    #[test]
    fn daily_pattern_tracks_business_hours() {
        let analyzer = PatternAnalyzer::default();
        let daily = analyzer.analyze_daily(&business_week());

        for hour in 9..=17 {
            for off_hour in 0..=6 {
                assert!(
                    daily[hour] > daily[off_hour],
                    "hour {hour} ({}) should exceed hour {off_hour} ({})",
                    daily[hour],
                    daily[off_hour]
                );
            }
        }
    }

    #[test]
    fn daily_pattern_is_deterministic() {
        let analyzer = PatternAnalyzer::default();
        let series = business_week();
        assert_eq!(analyzer.analyze_daily(&series), analyzer.analyze_daily(&series));
    }

    #[test]
    fn daily_pattern_empty_hours_are_zero() {
        let analyzer = PatternAnalyzer::default();
        // Samples only at hour 12 across three days.
        let samples: Vec<Sample> = (0..3)
            .map(|d| Sample::new(base() + Duration::days(d) + Duration::hours(12), 50.0))
            .collect();

        let daily = analyzer.analyze_daily(&samples);
        assert_eq!(daily[12], 50.0);
        assert_eq!(daily[0], 0.0);
        assert_eq!(daily[23], 0.0);
    }

    #[test]
    fn weekly_pattern_keyed_from_monday() {
        let analyzer = PatternAnalyzer::default();
        // base() is a Monday; one sample per day for a week, value = weekday index.
        let samples: Vec<Sample> = (0..7)
            .map(|d| Sample::new(base() + Duration::days(d), d as f64 * 10.0))
            .collect();

        let weekly = analyzer.analyze_weekly(&samples);
        assert_eq!(weekly[0], 0.0); // Monday
        assert_eq!(weekly[6], 60.0); // Sunday
    }

    #[test]
    fn monthly_pattern_drops_day_31() {
        let analyzer = PatternAnalyzer::default();
        let jan_31 = Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap();
        let jan_30 = Utc.with_ymd_and_hms(2024, 1, 30, 12, 0, 0).unwrap();
        let samples = vec![Sample::new(jan_30, 42.0), Sample::new(jan_31, 999.0)];

        let monthly = analyzer.analyze_monthly(&samples);
        assert_eq!(monthly[29], 42.0);
        // The day-31 observation must not leak into any bucket.
        assert!(monthly.iter().all(|&v| v != 999.0));
    }

    #[test]
    fn seasonal_factors_relative_to_overall_mean() {
        let analyzer = PatternAnalyzer::default();
        let jan = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let jul = Utc.with_ymd_and_hms(2024, 7, 15, 0, 0, 0).unwrap();
        // Overall mean 50; winter month at 25, summer month at 75.
        let samples = vec![Sample::new(jan, 25.0), Sample::new(jul, 75.0)];

        let seasonal = analyzer.analyze_seasonal(&samples);
        assert_eq!(seasonal[&Season::Winter], 0.5);
        assert_eq!(seasonal[&Season::Summer], 1.5);
        assert!(!seasonal.contains_key(&Season::Spring));
    }

    #[test]
    fn seasonal_factors_are_one_for_zero_mean() {
        let analyzer = PatternAnalyzer::default();
        let jan = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let samples = vec![Sample::new(jan, 0.0)];

        let seasonal = analyzer.analyze_seasonal(&samples);
        assert_eq!(seasonal[&Season::Winter], 1.0);
    }

    #[test]
    fn anomalies_sorted_and_capped() {
        let analyzer = PatternAnalyzer::default();
        let mut samples = hourly_series(base(), 100, |_| 50.0);
        // Inject escalating spikes; enough of them to exceed the cap. The
        // spikes inflate the stddev, so a loose threshold is needed for all
        // of them to register.
        for i in 0..15 {
            samples[i * 6].value = 200.0 + i as f64 * 50.0;
        }

        let events = analyzer.detect_anomalies(&samples, 0.5);
        assert_eq!(events.len(), 10);
        for pair in events.windows(2) {
            assert!(pair[0].z_score >= pair[1].z_score);
        }
        assert!(events.iter().all(|e| e.kind == AnomalyKind::Spike));
    }

    #[test]
    fn anomaly_count_monotone_in_threshold() {
        let analyzer = PatternAnalyzer::default();
        let mut samples = hourly_series(base(), 120, |i| (i as f64 * 0.7).sin() * 10.0 + 50.0);
        samples[30].value = 150.0;
        samples[60].value = 5.0;
        samples[90].value = 120.0;

        let loose = analyzer.detect_anomalies(&samples, 1.5).len();
        let tight = analyzer.detect_anomalies(&samples, 2.5).len();
        let tighter = analyzer.detect_anomalies(&samples, 4.0).len();
        assert!(loose >= tight);
        assert!(tight >= tighter);
    }

    #[test]
    fn zero_variance_yields_no_anomalies() {
        let analyzer = PatternAnalyzer::default();
        let samples = hourly_series(base(), 50, |_| 42.0);
        assert!(analyzer.detect_anomalies(&samples, 2.5).is_empty());
    }

    #[test]
    fn confidence_thresholds() {
        let analyzer = PatternAnalyzer::default();
        assert_eq!(analyzer.confidence(&hourly_series(base(), 99, |_| 1.0)), 0.5);
        assert_eq!(analyzer.confidence(&hourly_series(base(), 100, |_| 1.0)), 0.6);
        assert_eq!(analyzer.confidence(&hourly_series(base(), 400, |_| 1.0)), 0.9);
        // Saturates at 0.95 no matter how much history exists.
        assert_eq!(analyzer.confidence(&hourly_series(base(), 2000, |_| 1.0)), 0.95);
    }

    #[test]
    fn constant_zero_series_never_produces_nan() {
        let analyzer = PatternAnalyzer::default();
        let samples = hourly_series(base(), 48, |_| 0.0);

        let pattern = analyzer.analyze(&samples);
        assert_eq!(pattern.confidence, 0.5);
        assert!(pattern.daily.iter().all(|v| v.is_finite()));
        assert!(pattern.weekly.iter().all(|v| v.is_finite()));
        assert!(pattern.monthly.iter().all(|v| v.is_finite()));
        assert!(pattern.seasonal.values().all(|v| v.is_finite()));
        assert!(pattern.special_events.is_empty());

        let predicted = analyzer.predict_point_value(&pattern, base() + Duration::days(30));
        assert_eq!(predicted, 0.0);
    }

    #[test]
    fn point_prediction_follows_daily_shape() {
        let analyzer = PatternAnalyzer::default();
        let pattern = analyzer.analyze(&business_week());

        // Same Monday, noon vs 3am. Targets outside the observed
        // day-of-month range would hit empty monthly buckets and zero the
        // product, so predict within it.
        let noon = base() + Duration::hours(12);
        let night = base() + Duration::hours(3);
        assert!(analyzer.predict_point_value(&pattern, noon)
            > analyzer.predict_point_value(&pattern, night));
    }

    #[test]
    fn point_prediction_day_31_uses_neutral_monthly_multiplier() {
        let analyzer = PatternAnalyzer::default();
        // History covers days 1-7; day 31 has no monthly bucket at all.
        let pattern = analyzer.analyze(&business_week());

        // Jan 31 2024 is a Wednesday at a business hour, so every other
        // bucket is populated; a zeroing (or out-of-bounds) monthly term
        // would show up immediately.
        let jan_31 = Utc.with_ymd_and_hms(2024, 1, 31, 12, 0, 0).unwrap();
        let predicted = analyzer.predict_point_value(&pattern, jan_31);
        assert!(predicted.is_finite());
        assert!(predicted > 0.0);
    }

    #[test]
    fn point_prediction_applies_nearby_event_impact() {
        let analyzer = PatternAnalyzer::default();
        let mut samples = business_week();
        samples[100].value = 500.0; // strong spike

        let pattern = analyzer.analyze(&samples);
        assert!(!pattern.special_events.is_empty());
        let event_ts = pattern.special_events[0].timestamp;

        let with_event = analyzer.predict_point_value(&pattern, event_ts + Duration::hours(2));
        // Same hour-of-day and weekday two weeks out, far from any event.
        let without_event =
            analyzer.predict_point_value(&pattern, event_ts + Duration::days(14) + Duration::hours(2));
        assert!(with_event > without_event);
    }
}
