// src/risk.rs

//! Capacity and risk decisions derived from a forecast.
//!
//! Every constant in here (buffer clamp, strategy multipliers, action
//! thresholds, risk caps) is carried over verbatim for behavioral parity
//! with existing deployments. None of them has a cited empirical basis;
//! treat them as tunable.

use tracing::debug;

use crate::types::{Forecast, RecommendedAction, RiskAssessment, ScalingStrategy};
use crate::utils::std_dev;

/// Turns a forecast plus current capacity into an exhaustion probability,
/// a recommended buffer, and a coarse scaling action
#[derive(Debug, Clone, Default)]
pub struct RiskEngine;

impl RiskEngine {
    pub fn new() -> Self {
        Self
    }

    /// Assess capacity risk for one forecast.
    ///
    /// `historical_values` is the raw series the forecast was built from;
    /// its volatility sizes the safety buffer. Stateless: every call
    /// recomputes from scratch.
    pub fn assess(
        &self,
        forecast: &Forecast,
        historical_values: &[f64],
        current_capacity: f64,
        strategy: ScalingStrategy,
    ) -> RiskAssessment {
        let volatility = std_dev(historical_values);
        let buffer_pct = (10.0 + volatility * 2.0).clamp(10.0, 50.0) / 100.0;
        let recommended_buffer = forecast.peak * buffer_pct;
        let required_capacity = forecast.peak + recommended_buffer;

        let exhaustion_probability = if forecast.horizon_steps == 0 {
            0.0
        } else {
            let breaches = forecast
                .intervals
                .iter()
                .filter(|interval| interval.upper > current_capacity)
                .count();
            breaches as f64 / forecast.horizon_steps as f64
        };

        let change_component = (forecast.growth_rate_pct.abs() / 2.0).min(30.0);
        let risk_score = ((exhaustion_probability * 50.0 + change_component)
            * strategy.multiplier())
        .clamp(0.0, 100.0);

        let recommended_action = recommend_action(required_capacity, current_capacity);

        debug!(
            resource_id = %forecast.resource_id,
            required_capacity,
            exhaustion_probability,
            risk_score,
            action = ?recommended_action,
            "risk assessed"
        );

        RiskAssessment {
            required_capacity,
            recommended_buffer,
            exhaustion_probability,
            risk_score,
            recommended_action,
        }
    }
}

/// Threshold ladder mapping required vs. current capacity to an action.
///
/// `ScaleIn` is never produced here; it exists for callers composing
/// their own contraction policies over the same action space.
fn recommend_action(required_capacity: f64, current_capacity: f64) -> RecommendedAction {
    if required_capacity > current_capacity * 1.5 {
        RecommendedAction::ScaleOut
    } else if required_capacity > current_capacity {
        RecommendedAction::ScaleUp
    } else if required_capacity < current_capacity * 0.7 {
        RecommendedAction::ScaleDown
    } else {
        RecommendedAction::Maintain
    }
}
