// src/engine.rs

//! Façade wiring the store, pattern analyzer, forecaster and risk engine
//! together behind the three operations external callers use.
//!
//! The engine owns every component explicitly: created at system start,
//! dropped at shutdown, no module-level state. All calls are synchronous,
//! pure in-memory computation; parallelism, if wanted, belongs across
//! independent (series, horizon) requests, never inside one.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::{ForesightError, ForesightResult};
use crate::forecaster::Forecaster;
use crate::pattern::PatternAnalyzer;
use crate::risk::RiskEngine;
use crate::store::SeriesStore;
use crate::types::{
    Forecast, ForecastMethod, ForesightConfig, Pattern, RiskAssessment, ScalingStrategy,
};

/// The main foresight engine
pub struct ForecastEngine {
    config: ForesightConfig,
    store: SeriesStore,
    analyzer: PatternAnalyzer,
    forecaster: Forecaster,
    risk: RiskEngine,
}

impl ForecastEngine {
    /// Create an engine with the given configuration
    pub fn new(config: ForesightConfig) -> Self {
        let analyzer = PatternAnalyzer::new(config.anomaly_threshold);
        let forecaster = Forecaster::new(
            config.min_samples,
            config.seasonal_period,
            config.regression_window,
        );
        info!(
            min_samples = config.min_samples,
            seasonal_period = config.seasonal_period,
            "foresight engine created"
        );
        Self {
            config,
            store: SeriesStore::new(),
            analyzer,
            forecaster,
            risk: RiskEngine::new(),
        }
    }

    /// Engine with default configuration
    pub fn with_defaults() -> Self {
        Self::new(ForesightConfig::default())
    }

    /// The underlying series store, for windowed/resampled reads
    pub fn store(&self) -> &SeriesStore {
        &self.store
    }

    /// The active configuration
    pub fn config(&self) -> &ForesightConfig {
        &self.config
    }

    /// Record one sample for a series
    pub fn record(
        &self,
        series_id: &str,
        timestamp: DateTime<Utc>,
        value: f64,
    ) -> ForesightResult<()> {
        self.store.record(series_id, timestamp, value)
    }

    /// Run a full pattern analysis pass over a series.
    ///
    /// The returned snapshot stays valid until the series changes; rerun
    /// after further ingestion to refresh it.
    pub fn analyze(&self, series_id: &str) -> ForesightResult<Pattern> {
        let samples = self.store.snapshot(series_id);
        if samples.is_empty() {
            return Err(ForesightError::not_found(series_id));
        }
        if samples.len() < self.config.analysis_min_samples {
            return Err(ForesightError::insufficient_data(
                series_id.to_string(),
                samples.len(),
                self.config.analysis_min_samples,
            ));
        }
        Ok(self.analyzer.analyze(&samples))
    }

    /// Predict the value of a series at a future instant from its pattern
    pub fn predict_at(&self, series_id: &str, target: DateTime<Utc>) -> ForesightResult<f64> {
        let pattern = self.analyze(series_id)?;
        Ok(self.analyzer.predict_point_value(&pattern, target))
    }

    /// Produce an N-step-ahead forecast for a series
    pub fn forecast(
        &self,
        series_id: &str,
        horizon: usize,
        method: ForecastMethod,
    ) -> ForesightResult<Forecast> {
        let samples = self.store.snapshot(series_id);
        if samples.is_empty() {
            return Err(ForesightError::not_found(series_id));
        }
        self.forecaster.forecast(series_id, &samples, horizon, method)
    }

    /// Assess capacity risk for a series against its current capacity.
    ///
    /// Runs an ensemble forecast over the configured default horizon and
    /// feeds it to the risk engine.
    pub fn assess_risk(
        &self,
        series_id: &str,
        current_capacity: f64,
        strategy: ScalingStrategy,
    ) -> ForesightResult<RiskAssessment> {
        let samples = self.store.snapshot(series_id);
        if samples.is_empty() {
            return Err(ForesightError::not_found(series_id));
        }
        let forecast = self.forecaster.forecast(
            series_id,
            &samples,
            self.config.default_horizon,
            ForecastMethod::Ensemble,
        )?;
        let values = self.store.values(series_id);
        Ok(self.risk.assess(&forecast, &values, current_capacity, strategy))
    }

    /// Drop samples older than `cutoff`; returns how many were removed
    pub fn trim_before(&self, series_id: &str, cutoff: DateTime<Utc>) -> usize {
        self.store.trim_before(series_id, cutoff)
    }
}
