// src/forecaster.rs

//! Multi-method N-step-ahead forecasting with confidence intervals.
//!
//! Three base methods (trend regression, seasonal exponential smoothing,
//! windowed-feature autoregression) feed a fixed-weight ensemble. Every
//! method returns its failures internally; the orchestrator substitutes
//! the trend result so a forecast call never fails just because one
//! sub-model is unstable. Callers only ever see `InsufficientData`.

use std::collections::HashMap;
use tracing::{debug, warn};

use crate::error::{ForesightError, ForesightResult};
use crate::types::{ConfidenceInterval, Forecast, ForecastMethod, Sample};
use crate::utils::{mean, median, percentile, std_dev};

/// Fixed ensemble weights: trend, smoothing, windowed regression
const ENSEMBLE_WEIGHTS: [(ForecastMethod, f64); 3] = [
    (ForecastMethod::Trend, 0.3),
    (ForecastMethod::Smoothing, 0.3),
    (ForecastMethod::WindowedRegression, 0.4),
];

/// Level smoothing parameter for the seasonal smoothing method
const SMOOTHING_ALPHA: f64 = 0.3;
/// Trend smoothing parameter
const SMOOTHING_BETA: f64 = 0.1;
/// Seasonal smoothing parameter
const SMOOTHING_GAMMA: f64 = 0.2;

/// Ridge regularization for the windowed regression normal equations
const RIDGE_LAMBDA: f64 = 1.0;

/// Output of one underlying method, before assembly into a `Forecast`
#[derive(Debug, Clone)]
struct MethodForecast {
    predicted: Vec<f64>,
    lower: Vec<f64>,
    upper: Vec<f64>,
}

/// Produces point forecasts plus confidence intervals for N future steps
#[derive(Debug, Clone)]
pub struct Forecaster {
    /// Minimum samples required before any method runs
    min_samples: usize,
    /// Seasonal period for the smoothing method
    seasonal_period: usize,
    /// Trailing window size for the windowed regression method
    regression_window: usize,
}

impl Default for Forecaster {
    fn default() -> Self {
        Self {
            min_samples: 20,
            seasonal_period: 24,
            regression_window: 10,
        }
    }
}

impl Forecaster {
    pub fn new(min_samples: usize, seasonal_period: usize, regression_window: usize) -> Self {
        Self {
            min_samples,
            seasonal_period,
            regression_window,
        }
    }

    /// Forecast `horizon` steps ahead using the requested method.
    ///
    /// Fails only with `InsufficientData`; internal model failures are
    /// absorbed by the trend fallback.
    pub fn forecast(
        &self,
        resource_id: &str,
        samples: &[Sample],
        horizon: usize,
        method: ForecastMethod,
    ) -> ForesightResult<Forecast> {
        if samples.len() < self.min_samples {
            return Err(ForesightError::insufficient_data(
                resource_id.to_string(),
                samples.len(),
                self.min_samples,
            ));
        }
        let values: Vec<f64> = samples.iter().map(|s| s.value).collect();
        let horizon = horizon.max(1);

        let trend = TrendFit::fit(&values);
        let (method_forecast, weights) = match method {
            ForecastMethod::Trend => (
                trend.forecast(horizon),
                HashMap::from([(ForecastMethod::Trend, 1.0)]),
            ),
            ForecastMethod::Smoothing => {
                self.run_with_fallback(ForecastMethod::Smoothing, &values, horizon, &trend)
            }
            ForecastMethod::WindowedRegression => self.run_with_fallback(
                ForecastMethod::WindowedRegression,
                &values,
                horizon,
                &trend,
            ),
            ForecastMethod::Ensemble => {
                let weights: HashMap<ForecastMethod, f64> = ENSEMBLE_WEIGHTS.into();
                (self.combine(&values, horizon, &trend, &weights), weights)
            }
            ForecastMethod::AccuracyWeighted => {
                let weights = self.validation_weights(&values, horizon);
                (self.combine(&values, horizon, &trend, &weights), weights)
            }
        };

        let peak = method_forecast
            .predicted
            .iter()
            .fold(f64::NEG_INFINITY, |a, &b| a.max(b));
        let average = mean(&method_forecast.predicted);

        debug!(
            resource_id,
            horizon,
            method = method.name(),
            peak,
            "forecast generated"
        );

        Ok(Forecast {
            resource_id: resource_id.to_string(),
            horizon_steps: horizon,
            intervals: method_forecast
                .lower
                .iter()
                .zip(&method_forecast.upper)
                .map(|(&lower, &upper)| ConfidenceInterval { lower, upper })
                .collect(),
            predicted: method_forecast.predicted,
            peak,
            average,
            growth_rate_pct: trend.growth_rate_pct(),
            model_weights: weights,
        })
    }

    /// Run one base method, substituting the trend result on failure
    fn run_with_fallback(
        &self,
        method: ForecastMethod,
        values: &[f64],
        horizon: usize,
        trend: &TrendFit,
    ) -> (MethodForecast, HashMap<ForecastMethod, f64>) {
        match self.run_method(method, values, horizon) {
            Ok(forecast) => (forecast, HashMap::from([(method, 1.0)])),
            Err(err) => {
                warn!(method = method.name(), %err, "method failed, falling back to trend");
                (
                    trend.forecast(horizon),
                    HashMap::from([(ForecastMethod::Trend, 1.0)]),
                )
            }
        }
    }

    fn run_method(
        &self,
        method: ForecastMethod,
        values: &[f64],
        horizon: usize,
    ) -> ForesightResult<MethodForecast> {
        match method {
            ForecastMethod::Trend => Ok(TrendFit::fit(values).forecast(horizon)),
            ForecastMethod::Smoothing => self.smoothing(values, horizon),
            ForecastMethod::WindowedRegression => self.windowed_regression(values, horizon),
            ForecastMethod::Ensemble | ForecastMethod::AccuracyWeighted => Err(
                ForesightError::model_fit(method.name(), "not a base method"),
            ),
        }
    }

    /// Weighted per-step combination of the three base methods.
    ///
    /// Each failed method is individually replaced by the trend result
    /// before weighting, so the combination always has three inputs.
    fn combine(
        &self,
        values: &[f64],
        horizon: usize,
        trend: &TrendFit,
        weights: &HashMap<ForecastMethod, f64>,
    ) -> MethodForecast {
        let parts: Vec<(f64, MethodForecast)> = ENSEMBLE_WEIGHTS
            .iter()
            .map(|(method, _)| {
                let weight = weights.get(method).copied().unwrap_or(0.0);
                let (forecast, _) = self.run_with_fallback(*method, values, horizon, trend);
                (weight, forecast)
            })
            .collect();

        let total: f64 = parts.iter().map(|(w, _)| w).sum();
        let total = if total > 0.0 { total } else { 1.0 };

        let mut combined = MethodForecast {
            predicted: vec![0.0; horizon],
            lower: vec![0.0; horizon],
            upper: vec![0.0; horizon],
        };
        for (weight, part) in &parts {
            let w = weight / total;
            for step in 0..horizon {
                combined.predicted[step] += w * part.predicted[step];
                combined.lower[step] += w * part.lower[step];
                combined.upper[step] += w * part.upper[step];
            }
        }
        combined
    }

    /// Weights proportional to inverse validation MSE over a trailing holdout
    fn validation_weights(&self, values: &[f64], horizon: usize) -> HashMap<ForecastMethod, f64> {
        let holdout = (values.len() / 5).max(horizon).min(values.len() / 2);
        let train = &values[..values.len() - holdout];
        let actual = &values[values.len() - holdout..];

        // Validation needs enough training data to be meaningful; otherwise
        // the fixed weights stand.
        if train.len() < self.regression_window + 2 || holdout == 0 {
            return ENSEMBLE_WEIGHTS.into();
        }

        let trend = TrendFit::fit(train);
        let mut raw: HashMap<ForecastMethod, f64> = HashMap::new();
        for (method, _) in ENSEMBLE_WEIGHTS.iter() {
            let (forecast, _) = self.run_with_fallback(*method, train, holdout, &trend);
            let mse = forecast
                .predicted
                .iter()
                .zip(actual)
                .map(|(pred, act)| (pred - act).powi(2))
                .sum::<f64>()
                / holdout as f64;
            raw.insert(*method, 1.0 / (mse + 1e-6));
        }

        let total: f64 = raw.values().sum();
        raw.into_iter().map(|(m, w)| (m, w / total)).collect()
    }

    /// Additive trend + additive seasonal exponential smoothing.
    ///
    /// Degrades to Holt's two-parameter form when fewer than two full
    /// seasonal periods exist. Any non-finite state during fitting is a
    /// `ModelFit` failure.
    fn smoothing(&self, values: &[f64], horizon: usize) -> ForesightResult<MethodForecast> {
        let period = self.seasonal_period;
        let n = values.len();

        let (mut level, mut trend, mut seasonal) = if n >= 2 * period {
            let first_mean = mean(&values[..period]);
            let second_mean = mean(&values[period..2 * period]);
            let seasonal: Vec<f64> = values[..period].iter().map(|v| v - first_mean).collect();
            (first_mean, (second_mean - first_mean) / period as f64, seasonal)
        } else {
            // A loosened minimum can admit series too short even for the
            // degraded two-parameter initialization.
            if n < 2 {
                return Err(ForesightError::model_fit(
                    "smoothing",
                    "need at least two observations to initialize",
                ));
            }
            (values[0], values[1] - values[0], vec![0.0; period])
        };

        for (i, &value) in values.iter().enumerate().skip(1) {
            let season_idx = i % period;
            let prev_level = level;
            level = SMOOTHING_ALPHA * (value - seasonal[season_idx])
                + (1.0 - SMOOTHING_ALPHA) * (level + trend);
            trend = SMOOTHING_BETA * (level - prev_level) + (1.0 - SMOOTHING_BETA) * trend;
            seasonal[season_idx] =
                SMOOTHING_GAMMA * (value - level) + (1.0 - SMOOTHING_GAMMA) * seasonal[season_idx];

            if !level.is_finite() || !trend.is_finite() || !seasonal[season_idx].is_finite() {
                return Err(ForesightError::model_fit(
                    "smoothing",
                    "non-finite state during fitting",
                ));
            }
        }

        let mut predicted = Vec::with_capacity(horizon);
        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);
        for step in 1..=horizon {
            let season_idx = (n + step - 1) % period;
            let value = level + trend * step as f64 + seasonal[season_idx];
            if !value.is_finite() {
                return Err(ForesightError::model_fit(
                    "smoothing",
                    "non-finite forecast value",
                ));
            }
            // Fixed +/-20% interval, not derived from residual variance.
            let margin = value.abs() * 0.2;
            predicted.push(value);
            lower.push(value - margin);
            upper.push(value + margin);
        }

        Ok(MethodForecast {
            predicted,
            lower,
            upper,
        })
    }

    /// Autoregressive regression over trailing-window summary features.
    ///
    /// Trains on sliding windows of history via ridge-regularized least
    /// squares, then rolls the window forward one prediction at a time.
    /// A singular system is a `ModelFit` failure.
    fn windowed_regression(&self, values: &[f64], horizon: usize) -> ForesightResult<MethodForecast> {
        let window = self.regression_window;
        if values.len() < window + 2 {
            return Err(ForesightError::model_fit(
                "windowed_regression",
                "not enough sliding windows to train on",
            ));
        }

        // One training row per sliding window: bias + 10 features -> next value.
        let rows: Vec<(Vec<f64>, f64)> = (window..values.len())
            .map(|i| (window_features(&values[i - window..i]), values[i]))
            .collect();
        let coeffs = ridge_solve(&rows)?;

        let margin = 1.96 * 0.2 * std_dev(values);
        let mut trailing: Vec<f64> = values[values.len() - window..].to_vec();
        let mut predicted = Vec::with_capacity(horizon);
        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);

        for _ in 0..horizon {
            let features = window_features(&trailing);
            let value: f64 = coeffs[0]
                + features
                    .iter()
                    .zip(&coeffs[1..])
                    .map(|(f, c)| f * c)
                    .sum::<f64>();
            if !value.is_finite() {
                return Err(ForesightError::model_fit(
                    "windowed_regression",
                    "non-finite prediction",
                ));
            }
            predicted.push(value);
            lower.push(value - margin);
            upper.push(value + margin);

            trailing.remove(0);
            trailing.push(value);
        }

        Ok(MethodForecast {
            predicted,
            lower,
            upper,
        })
    }
}

/// Summary features of one trailing window
fn window_features(window: &[f64]) -> Vec<f64> {
    let m = mean(window);
    let above = window.iter().filter(|&&v| v > m).count() as f64;
    vec![
        m,
        std_dev(window),
        window.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b)),
        window.iter().fold(f64::INFINITY, |a, &b| a.min(b)),
        *window.last().unwrap_or(&0.0),
        window.last().unwrap_or(&0.0) - window.first().unwrap_or(&0.0),
        percentile(window, 75.0),
        percentile(window, 25.0),
        above,
        median(window),
    ]
}

/// Solve the ridge-regularized normal equations for bias + feature weights
fn ridge_solve(rows: &[(Vec<f64>, f64)]) -> ForesightResult<Vec<f64>> {
    let dims = rows[0].0.len() + 1; // bias term first

    // Build X^T X + lambda I and X^T y over augmented feature vectors.
    let mut matrix = vec![vec![0.0f64; dims]; dims];
    let mut rhs = vec![0.0f64; dims];
    for (features, target) in rows {
        let mut augmented = Vec::with_capacity(dims);
        augmented.push(1.0);
        augmented.extend_from_slice(features);
        for i in 0..dims {
            rhs[i] += augmented[i] * target;
            for j in 0..dims {
                matrix[i][j] += augmented[i] * augmented[j];
            }
        }
    }
    for (i, row) in matrix.iter_mut().enumerate() {
        row[i] += RIDGE_LAMBDA;
    }

    // Gaussian elimination with partial pivoting.
    for col in 0..dims {
        let pivot_row = (col..dims)
            .max_by(|&a, &b| {
                matrix[a][col]
                    .abs()
                    .partial_cmp(&matrix[b][col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);
        if matrix[pivot_row][col].abs() < 1e-12 {
            return Err(ForesightError::model_fit(
                "windowed_regression",
                "singular normal equations",
            ));
        }
        matrix.swap(col, pivot_row);
        rhs.swap(col, pivot_row);

        for row in (col + 1)..dims {
            let factor = matrix[row][col] / matrix[col][col];
            for k in col..dims {
                matrix[row][k] -= factor * matrix[col][k];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut coeffs = vec![0.0f64; dims];
    for row in (0..dims).rev() {
        let mut sum = rhs[row];
        for col in (row + 1)..dims {
            sum -= matrix[row][col] * coeffs[col];
        }
        coeffs[row] = sum / matrix[row][row];
        if !coeffs[row].is_finite() {
            return Err(ForesightError::model_fit(
                "windowed_regression",
                "non-finite coefficients",
            ));
        }
    }
    Ok(coeffs)
}

/// Ordinary least squares of value vs. time index.
///
/// The standalone trend method, the universal fallback, and the source of
/// the growth-rate figure the risk engine consumes.
#[derive(Debug, Clone)]
pub(crate) struct TrendFit {
    slope: f64,
    intercept: f64,
    std_error: f64,
    r_squared: f64,
    n: usize,
}

impl TrendFit {
    pub(crate) fn fit(values: &[f64]) -> Self {
        let n = values.len();
        let nf = n as f64;
        let x_mean = (nf - 1.0) / 2.0;
        let y_mean = mean(values);

        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for (i, &y) in values.iter().enumerate() {
            let x_diff = i as f64 - x_mean;
            numerator += x_diff * (y - y_mean);
            denominator += x_diff * x_diff;
        }
        let slope = if denominator != 0.0 {
            numerator / denominator
        } else {
            0.0
        };
        let intercept = y_mean - slope * x_mean;

        let ss_res: f64 = values
            .iter()
            .enumerate()
            .map(|(i, &y)| (y - (intercept + slope * i as f64)).powi(2))
            .sum();
        let ss_tot: f64 = values.iter().map(|&y| (y - y_mean).powi(2)).sum();
        let r_squared = if ss_tot != 0.0 {
            1.0 - ss_res / ss_tot
        } else {
            0.0
        };
        let std_error = (ss_res / nf).sqrt();

        Self {
            slope,
            intercept,
            std_error,
            r_squared,
            n,
        }
    }

    /// Fitted value at a historical or future index
    fn predict(&self, index: f64) -> f64 {
        self.intercept + self.slope * index
    }

    pub(crate) fn r_squared(&self) -> f64 {
        self.r_squared
    }

    /// Percent change of the fitted line across the historical range.
    ///
    /// Defined as 0.0 whenever the fitted start is at or below zero, which
    /// masks negative-to-positive transitions. Carried over deliberately.
    pub(crate) fn growth_rate_pct(&self) -> f64 {
        let start = self.predict(0.0);
        if start <= 0.0 {
            return 0.0;
        }
        (self.predict(self.n as f64 - 1.0) - start) / start * 100.0
    }

    fn forecast(&self, horizon: usize) -> MethodForecast {
        let margin = 1.96 * self.std_error;
        let mut predicted = Vec::with_capacity(horizon);
        let mut lower = Vec::with_capacity(horizon);
        let mut upper = Vec::with_capacity(horizon);
        for step in 0..horizon {
            let value = self.predict((self.n + step) as f64);
            predicted.push(value);
            lower.push(value - margin);
            upper.push(value + margin);
        }
        MethodForecast {
            predicted,
            lower,
            upper,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::hourly_series;
    use chrono::{TimeZone, Utc};

    fn base() -> chrono::DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn linear_ramp(n: usize) -> Vec<Sample> {
        hourly_series(base(), n, |i| 10.0 + 0.5 * i as f64)
    }

    fn daily_wave(n: usize) -> Vec<Sample> {
        hourly_series(base(), n, |i| {
            50.0 + 25.0 * ((i % 24) as f64 / 24.0 * std::f64::consts::TAU).sin()
        })
    }

    #[test]
    fn insufficient_data_is_rejected() {
        let forecaster = Forecaster::default();
        let samples = linear_ramp(19);
        let result = forecaster.forecast("cpu", &samples, 10, ForecastMethod::Ensemble);
        assert!(matches!(
            result,
            Err(ForesightError::InsufficientData {
                available: 19,
                required: 20,
                ..
            })
        ));
    }

    #[test]
    fn trend_fits_linear_series_exactly() {
        let fit = TrendFit::fit(&(0..50).map(|i| 10.0 + 0.5 * i as f64).collect::<Vec<_>>());
        assert!((fit.r_squared() - 1.0).abs() < 1e-9);
        assert!((fit.slope - 0.5).abs() < 1e-9);
    }

    #[test]
    fn trend_forecast_continues_monotonically() {
        let forecaster = Forecaster::default();
        let forecast = forecaster
            .forecast("cpu", &linear_ramp(50), 10, ForecastMethod::Trend)
            .unwrap();

        assert_eq!(forecast.predicted.len(), 10);
        for pair in forecast.predicted.windows(2) {
            assert!(pair[1] > pair[0]);
        }
        // First forecast step continues the ramp: 10 + 0.5 * 50.
        assert!((forecast.predicted[0] - 35.0).abs() < 1e-6);
        assert!(forecast.growth_rate_pct > 0.0);
    }

    #[test]
    fn growth_rate_zero_when_start_not_positive() {
        // Fitted line starts below zero and rises through it.
        let values: Vec<f64> = (0..40).map(|i| -10.0 + 0.6 * i as f64).collect();
        let fit = TrendFit::fit(&values);
        assert_eq!(fit.growth_rate_pct(), 0.0);
    }

    #[test]
    fn smoothing_tracks_seasonal_shape() {
        let forecaster = Forecaster::default();
        // Three full days of a daily wave.
        let samples = daily_wave(72);
        let forecast = forecaster
            .forecast("cpu", &samples, 24, ForecastMethod::Smoothing)
            .unwrap();

        assert_eq!(forecast.predicted.len(), 24);
        assert!(forecast.predicted.iter().all(|v| v.is_finite()));
        // The forecast day should not be flat: the seasonal component must
        // carry the wave's spread.
        let max = forecast.predicted.iter().cloned().fold(f64::MIN, f64::max);
        let min = forecast.predicted.iter().cloned().fold(f64::MAX, f64::min);
        assert!(max - min > 10.0);
    }

    #[test]
    fn windowed_regression_produces_finite_forecast() {
        let forecaster = Forecaster::default();
        let forecast = forecaster
            .forecast("cpu", &daily_wave(100), 12, ForecastMethod::WindowedRegression)
            .unwrap();

        assert_eq!(forecast.predicted.len(), 12);
        assert!(forecast.predicted.iter().all(|v| v.is_finite()));
        for (value, interval) in forecast.predicted.iter().zip(&forecast.intervals) {
            assert!(interval.lower <= *value && *value <= interval.upper);
        }
    }

    #[test]
    fn ensemble_bounds_bracket_predictions() {
        let forecaster = Forecaster::default();
        let forecast = forecaster
            .forecast("cpu", &daily_wave(120), 24, ForecastMethod::Ensemble)
            .unwrap();

        for (value, interval) in forecast.predicted.iter().zip(&forecast.intervals) {
            assert!(interval.lower <= *value, "lower bound must not exceed prediction");
            assert!(*value <= interval.upper, "prediction must not exceed upper bound");
        }
        assert_eq!(forecast.model_weights.len(), 3);
        let total: f64 = forecast.model_weights.values().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn constant_series_falls_back_without_failing() {
        let forecaster = Forecaster::default();
        // Degenerate constant series: zero variance starves the regression
        // and zeroes the seasonal component. The call must still succeed
        // with a full-shape result.
        let samples = hourly_series(base(), 50, |_| 42.0);
        let forecast = forecaster
            .forecast("cpu", &samples, 10, ForecastMethod::Ensemble)
            .unwrap();

        assert_eq!(forecast.predicted.len(), 10);
        assert_eq!(forecast.intervals.len(), 10);
        assert!(forecast.predicted.iter().all(|v| v.is_finite()));
        assert!(forecast
            .intervals
            .iter()
            .all(|i| i.lower.is_finite() && i.upper.is_finite()));
    }

    #[test]
    fn fallback_shape_matches_requested_horizon() {
        let forecaster = Forecaster::default();
        let constant = hourly_series(base(), 60, |_| 5.0);
        let wavy = daily_wave(60);

        for samples in [&constant, &wavy] {
            for method in [
                ForecastMethod::Trend,
                ForecastMethod::Smoothing,
                ForecastMethod::WindowedRegression,
                ForecastMethod::Ensemble,
                ForecastMethod::AccuracyWeighted,
            ] {
                let forecast = forecaster.forecast("cpu", samples, 16, method).unwrap();
                assert_eq!(forecast.predicted.len(), 16);
                assert_eq!(forecast.intervals.len(), 16);
                assert!(forecast.predicted.iter().all(|v| v.is_finite()));
            }
        }
    }

    #[test]
    fn single_sample_smoothing_falls_back_to_trend() {
        // A loosened minimum lets a one-sample series through; the
        // smoothing initializer cannot run on it, so the trend
        // substitution must carry the forecast instead of panicking.
        let forecaster = Forecaster::new(1, 24, 10);
        let samples = hourly_series(base(), 1, |_| 33.0);
        let forecast = forecaster
            .forecast("cpu", &samples, 6, ForecastMethod::Smoothing)
            .unwrap();

        assert_eq!(forecast.predicted.len(), 6);
        assert_eq!(
            forecast.model_weights.get(&ForecastMethod::Trend).copied(),
            Some(1.0)
        );
        // A one-point trend fit is a flat line through the point.
        assert!(forecast.predicted.iter().all(|v| (v - 33.0).abs() < 1e-9));
    }

    #[test]
    fn single_sample_ensemble_survives() {
        let forecaster = Forecaster::new(1, 24, 10);
        let samples = hourly_series(base(), 1, |_| 12.0);
        let forecast = forecaster
            .forecast("cpu", &samples, 4, ForecastMethod::Ensemble)
            .unwrap();

        assert_eq!(forecast.predicted.len(), 4);
        assert!(forecast.predicted.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn starved_regression_falls_back_to_trend() {
        // A regression window wider than the series leaves no sliding
        // windows to train on, forcing the explicit trend substitution.
        let forecaster = Forecaster::new(20, 24, 64);
        let samples = linear_ramp(30);
        let forecast = forecaster
            .forecast("cpu", &samples, 8, ForecastMethod::WindowedRegression)
            .unwrap();

        assert_eq!(forecast.predicted.len(), 8);
        assert_eq!(
            forecast.model_weights.get(&ForecastMethod::Trend).copied(),
            Some(1.0)
        );
        // The substituted forecast is the trend continuation of the ramp.
        assert!((forecast.predicted[0] - 25.0).abs() < 1e-6);
    }

    #[test]
    fn accuracy_weights_are_normalized() {
        let forecaster = Forecaster::default();
        let forecast = forecaster
            .forecast("cpu", &daily_wave(150), 12, ForecastMethod::AccuracyWeighted)
            .unwrap();

        let total: f64 = forecast.model_weights.values().sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!(forecast.model_weights.values().all(|w| *w >= 0.0));
    }

    #[test]
    fn peak_and_average_summaries() {
        let forecaster = Forecaster::default();
        let forecast = forecaster
            .forecast("cpu", &linear_ramp(40), 5, ForecastMethod::Trend)
            .unwrap();

        let max = forecast.predicted.iter().cloned().fold(f64::MIN, f64::max);
        assert_eq!(forecast.peak, max);
        assert!((forecast.average - mean(&forecast.predicted)).abs() < 1e-9);
    }
}
