// src/types.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unique identifier for a series (e.g., "web-servers:cpu_percent")
pub type ResourceId = String;

/// A metric value (CPU %, memory usage, request count, etc.)
pub type MetricValue = f64;

/// A single time-stamped observation. Immutable once recorded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// When this observation was taken
    pub timestamp: DateTime<Utc>,
    /// The observed value
    pub value: MetricValue,
}

impl Sample {
    pub fn new(timestamp: DateTime<Utc>, value: MetricValue) -> Self {
        Self { timestamp, value }
    }
}

/// How to combine samples that fall into the same resampling bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Aggregator {
    Mean,
    Max,
    Min,
    Sum,
}

/// Calendar season, grouped by month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    /// December, January, February
    Winter,
    /// March, April, May
    Spring,
    /// June, July, August
    Summer,
    /// September, October, November
    Fall,
}

impl Season {
    /// Season for a calendar month (1-12)
    pub fn from_month(month: u32) -> Self {
        match month {
            12 | 1 | 2 => Season::Winter,
            3 | 4 | 5 => Season::Spring,
            6 | 7 | 8 => Season::Summer,
            _ => Season::Fall,
        }
    }
}

/// Direction of an anomalous observation relative to the series mean
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnomalyKind {
    /// Value above the mean
    Spike,
    /// Value below the mean
    Dip,
}

/// An anomalous observation flagged during pattern analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialEvent {
    /// When the anomaly occurred
    pub timestamp: DateTime<Utc>,
    /// Spike or dip
    pub kind: AnomalyKind,
    /// Ratio of the anomalous value to the series mean
    pub impact_multiplier: f64,
    /// How many standard deviations from the mean
    pub z_score: f64,
}

/// Derived recurring-structure snapshot for one series.
///
/// Recomputed wholesale on each analysis pass; holds no references into
/// the underlying series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pattern {
    /// Average value per hour of day (0-23); hours with no observations are 0.0
    pub daily: [f64; 24],
    /// Average value per day of week (0 = Monday); empty days are 0.0
    pub weekly: [f64; 7],
    /// Average value per day of month (index 0 = day 1, through day 30;
    /// day 31 observations are not represented here)
    pub monthly: [f64; 30],
    /// Per-season multiplier relative to the overall mean
    pub seasonal: HashMap<Season, f64>,
    /// Anomalous observations, strongest first, at most 10
    pub special_events: Vec<SpecialEvent>,
    /// Mean over all samples at analysis time
    pub overall_mean: f64,
    /// Count-based confidence heuristic in [0.5, 0.95]
    pub confidence: f64,
}

/// Available forecasting methods
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ForecastMethod {
    /// Ordinary least squares of value vs. time index
    Trend,
    /// Additive trend + additive seasonal exponential smoothing
    Smoothing,
    /// Autoregressive regression over trailing-window features
    WindowedRegression,
    /// Fixed-weight combination of the three base methods
    Ensemble,
    /// Combination weighted by inverse validation error
    AccuracyWeighted,
}

impl ForecastMethod {
    /// Stable name used in logs and model-weight maps
    pub fn name(&self) -> &'static str {
        match self {
            ForecastMethod::Trend => "trend",
            ForecastMethod::Smoothing => "smoothing",
            ForecastMethod::WindowedRegression => "windowed_regression",
            ForecastMethod::Ensemble => "ensemble",
            ForecastMethod::AccuracyWeighted => "accuracy_weighted",
        }
    }
}

/// Lower and upper confidence bounds for one forecast step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

/// An N-step-ahead forecast for one series.
///
/// Created fresh per request and never cached by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forecast {
    /// Series this forecast applies to
    pub resource_id: ResourceId,
    /// Number of future steps predicted
    pub horizon_steps: usize,
    /// Point predictions, one per step
    pub predicted: Vec<f64>,
    /// Confidence bounds, one per step
    pub intervals: Vec<ConfidenceInterval>,
    /// Maximum predicted value over the horizon
    pub peak: f64,
    /// Mean predicted value over the horizon
    pub average: f64,
    /// Trend growth rate over the fitted history, in percent
    pub growth_rate_pct: f64,
    /// Contribution weight of each method that produced this forecast
    pub model_weights: HashMap<ForecastMethod, f64>,
}

/// How aggressively the risk engine scores capacity pressure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalingStrategy {
    Aggressive,
    Balanced,
    Conservative,
    Custom,
}

impl ScalingStrategy {
    /// Risk-score multiplier for this strategy
    pub fn multiplier(&self) -> f64 {
        match self {
            ScalingStrategy::Aggressive => 1.5,
            ScalingStrategy::Balanced => 1.0,
            ScalingStrategy::Conservative => 0.7,
            ScalingStrategy::Custom => 1.0,
        }
    }
}

/// Coarse capacity action recommended by the risk engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecommendedAction {
    /// Grow individual instances
    ScaleUp,
    /// Shrink individual instances
    ScaleDown,
    /// Add instances
    ScaleOut,
    /// Remove instances
    ScaleIn,
    /// Leave capacity as-is
    Maintain,
}

/// Capacity and risk decision derived from a forecast.
///
/// Stateless: recomputed on every call from the forecast and the supplied
/// current-capacity figure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Peak prediction plus the recommended buffer
    pub required_capacity: f64,
    /// Safety margin on top of the peak prediction
    pub recommended_buffer: f64,
    /// Fraction of horizon steps whose upper bound exceeds current capacity
    pub exhaustion_probability: f64,
    /// Composite 0-100 risk score
    pub risk_score: f64,
    /// Coarse action recommendation
    pub recommended_action: RecommendedAction,
}

/// Main configuration for the foresight engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForesightConfig {
    /// Minimum samples required before forecasting
    pub min_samples: usize,
    /// Minimum samples required before pattern analysis
    pub analysis_min_samples: usize,
    /// Z-score threshold for anomaly detection
    pub anomaly_threshold: f64,
    /// Seasonal period for the smoothing method (24 for hourly data)
    pub seasonal_period: usize,
    /// Trailing window size for the windowed regression method
    pub regression_window: usize,
    /// Forecast horizon used by risk assessment
    pub default_horizon: usize,
}

impl Default for ForesightConfig {
    fn default() -> Self {
        Self {
            min_samples: 20,
            analysis_min_samples: 2,
            anomaly_threshold: 2.5,
            seasonal_period: 24,
            regression_window: 10,
            default_horizon: 24,
        }
    }
}

impl ForesightConfig {
    /// Create a new config builder
    pub fn builder() -> ForesightConfigBuilder {
        ForesightConfigBuilder::default()
    }
}

/// Builder for ForesightConfig
#[derive(Default)]
pub struct ForesightConfigBuilder {
    min_samples: Option<usize>,
    analysis_min_samples: Option<usize>,
    anomaly_threshold: Option<f64>,
    seasonal_period: Option<usize>,
    regression_window: Option<usize>,
    default_horizon: Option<usize>,
}

impl ForesightConfigBuilder {
    /// Set minimum samples required before forecasting
    pub fn min_samples(mut self, count: usize) -> Self {
        self.min_samples = Some(count);
        self
    }

    /// Set minimum samples required before pattern analysis
    pub fn analysis_min_samples(mut self, count: usize) -> Self {
        self.analysis_min_samples = Some(count);
        self
    }

    /// Set the z-score threshold for anomaly detection
    pub fn anomaly_threshold(mut self, threshold: f64) -> Self {
        self.anomaly_threshold = Some(threshold);
        self
    }

    /// Set the seasonal period for the smoothing method
    pub fn seasonal_period(mut self, period: usize) -> Self {
        self.seasonal_period = Some(period);
        self
    }

    /// Set the trailing window size for windowed regression
    pub fn regression_window(mut self, window: usize) -> Self {
        self.regression_window = Some(window);
        self
    }

    /// Set the forecast horizon used by risk assessment
    pub fn default_horizon(mut self, steps: usize) -> Self {
        self.default_horizon = Some(steps);
        self
    }

    /// Build the configuration
    pub fn build(self) -> ForesightConfig {
        let default = ForesightConfig::default();
        ForesightConfig {
            min_samples: self.min_samples.unwrap_or(default.min_samples),
            analysis_min_samples: self
                .analysis_min_samples
                .unwrap_or(default.analysis_min_samples),
            anomaly_threshold: self.anomaly_threshold.unwrap_or(default.anomaly_threshold),
            seasonal_period: self.seasonal_period.unwrap_or(default.seasonal_period),
            regression_window: self.regression_window.unwrap_or(default.regression_window),
            default_horizon: self.default_horizon.unwrap_or(default.default_horizon),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_builder_overrides_defaults() {
        let config = ForesightConfig::builder()
            .min_samples(30)
            .anomaly_threshold(3.0)
            .seasonal_period(12)
            .default_horizon(48)
            .build();

        assert_eq!(config.min_samples, 30);
        assert_eq!(config.anomaly_threshold, 3.0);
        assert_eq!(config.seasonal_period, 12);
        assert_eq!(config.default_horizon, 48);
        // Untouched fields fall back to defaults
        assert_eq!(config.regression_window, 10);
        assert_eq!(config.analysis_min_samples, 2);
    }

    #[test]
    fn season_month_grouping() {
        assert_eq!(Season::from_month(12), Season::Winter);
        assert_eq!(Season::from_month(1), Season::Winter);
        assert_eq!(Season::from_month(2), Season::Winter);
        assert_eq!(Season::from_month(3), Season::Spring);
        assert_eq!(Season::from_month(8), Season::Summer);
        assert_eq!(Season::from_month(11), Season::Fall);
    }

    #[test]
    fn strategy_multipliers() {
        assert_eq!(ScalingStrategy::Aggressive.multiplier(), 1.5);
        assert_eq!(ScalingStrategy::Balanced.multiplier(), 1.0);
        assert_eq!(ScalingStrategy::Conservative.multiplier(), 0.7);
        assert_eq!(ScalingStrategy::Custom.multiplier(), 1.0);
    }

    #[test]
    fn forecast_method_serde_round_trip() {
        let methods = [
            ForecastMethod::Trend,
            ForecastMethod::Smoothing,
            ForecastMethod::WindowedRegression,
            ForecastMethod::Ensemble,
            ForecastMethod::AccuracyWeighted,
        ];

        for method in &methods {
            let serialized = serde_json::to_string(method).unwrap();
            let deserialized: ForecastMethod = serde_json::from_str(&serialized).unwrap();
            assert_eq!(*method, deserialized);
        }
    }
}
