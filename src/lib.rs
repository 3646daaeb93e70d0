//! # Foresight - Time-Series Forecasting & Capacity Risk Core
//!
//! Foresight is the forecasting, pattern-analysis and capacity-risk core
//! for AI-operations tooling: ingest time-stamped resource-usage samples,
//! extract their recurring structure, forecast N steps ahead with
//! confidence intervals, and turn forecasts into capacity decisions.
//!
//! ## 📊 Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ForecastEngine                         │
//! ├───────────────┬─────────────────┬───────────────────────────┤
//! │ SeriesStore   │ PatternAnalyzer │ Forecaster    │ RiskEngine│
//! │               │                 │               │           │
//! │ • Ingestion   │ • Daily/Weekly  │ • Trend OLS   │ • Buffer  │
//! │ • Windowing   │ • Monthly       │ • Smoothing   │ • Exhaust.│
//! │ • Resampling  │ • Seasonal      │ • Windowed    │   prob.   │
//! │ • Retention   │ • Anomalies     │   regression  │ • Risk    │
//! │               │ • Point predict │ • Ensembles   │   score   │
//! └───────────────┴─────────────────┴───────────────┴───────────┘
//!          ▲                                  │
//!          │ (resource_id, timestamp, value)  ▼
//!   external metrics collector       CLI / HTTP layers
//!        (out of scope)                (out of scope)
//! ```
//!
//! Control flow: samples land in the [`SeriesStore`]; the
//! [`PatternAnalyzer`] runs on demand to snapshot recurring structure; the
//! [`Forecaster`] produces point forecasts plus intervals from one of
//! several methods or their ensemble; the [`RiskEngine`] converts a
//! forecast and a current-capacity figure into an exhaustion probability,
//! a recommended buffer and a coarse scaling action.
//!
//! Every operation is synchronous, pure, in-memory computation. Model-level
//! instability never surfaces: a failing method silently falls back to the
//! trend regression, trading forecast quality for availability. Callers
//! only ever see [`ForesightError::InvalidSample`],
//! [`ForesightError::InsufficientData`] or [`ForesightError::NotFound`].
//!
//! ## Usage
//!
//! ```rust
//! use foresight::{ForecastEngine, ForecastMethod, ForesightConfig, ScalingStrategy};
//! use chrono::{Duration, TimeZone, Utc};
//!
//! let engine = ForecastEngine::new(ForesightConfig::default());
//!
//! // Feed two days of hourly CPU samples.
//! let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
//! for hour in 0..48 {
//!     let value = 40.0 + 20.0 * ((hour % 24) as f64 / 24.0 * std::f64::consts::TAU).sin();
//!     engine.record("web:cpu", start + Duration::hours(hour), value).unwrap();
//! }
//!
//! let pattern = engine.analyze("web:cpu").unwrap();
//! let forecast = engine.forecast("web:cpu", 24, ForecastMethod::Ensemble).unwrap();
//! let risk = engine.assess_risk("web:cpu", 100.0, ScalingStrategy::Balanced).unwrap();
//!
//! assert_eq!(forecast.predicted.len(), 24);
//! assert!(pattern.confidence >= 0.5);
//! assert!(risk.risk_score <= 100.0);
//! ```

pub mod error;
pub mod utils;
pub mod types;
pub mod engine;
pub mod store;
pub mod pattern;
pub mod forecaster;
pub mod risk;

// Re-export common types for convenience
pub use types::{
    Aggregator, AnomalyKind, ConfidenceInterval, Forecast, ForecastMethod, ForesightConfig,
    ForesightConfigBuilder, MetricValue, Pattern, RecommendedAction, ResourceId, RiskAssessment,
    Sample, ScalingStrategy, Season, SpecialEvent,
};

pub use error::{ForesightError, ForesightResult};

pub use engine::ForecastEngine;
pub use forecaster::Forecaster;
pub use pattern::PatternAnalyzer;
pub use risk::RiskEngine;
pub use store::SeriesStore;
