// src/error.rs

use crate::types::ResourceId;

/// Result type used throughout the foresight library
pub type ForesightResult<T> = Result<T, ForesightError>;

/// All possible errors that can occur in the foresight library
#[derive(thiserror::Error, Debug)]
pub enum ForesightError {
    /// A non-finite value (NaN or infinity) was submitted to the store
    #[error("Invalid sample for '{series_id}': {message}")]
    InvalidSample {
        series_id: ResourceId,
        message: String,
    },

    /// Fewer samples than the operation's minimum requirement
    #[error("Insufficient data for '{series_id}': have {available}, need {required}")]
    InsufficientData {
        series_id: ResourceId,
        available: usize,
        required: usize,
    },

    /// Query against an unknown or empty series
    #[error("Series '{series_id}' not found or empty")]
    NotFound { series_id: ResourceId },

    /// An individual forecasting method failed internally.
    ///
    /// Never surfaced to callers: the forecaster recovers locally by
    /// substituting the trend method's output.
    #[error("Model fit failed for method '{method}': {message}")]
    ModelFit { method: String, message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    /// IO-related errors
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Generic error for unexpected situations
    #[error("Unexpected error: {message}")]
    Unexpected { message: String },
}

/// Helper methods for creating common errors
impl ForesightError {
    pub fn invalid_sample<S: Into<String>, M: Into<String>>(series_id: S, message: M) -> Self {
        Self::InvalidSample {
            series_id: series_id.into(),
            message: message.into(),
        }
    }

    pub fn insufficient_data<S: Into<String>>(
        series_id: S,
        available: usize,
        required: usize,
    ) -> Self {
        Self::InsufficientData {
            series_id: series_id.into(),
            available,
            required,
        }
    }

    pub fn not_found<S: Into<String>>(series_id: S) -> Self {
        Self::NotFound {
            series_id: series_id.into(),
        }
    }

    pub fn model_fit<S: Into<String>, M: Into<String>>(method: S, message: M) -> Self {
        Self::ModelFit {
            method: method.into(),
            message: message.into(),
        }
    }

    pub fn unexpected<S: Into<String>>(message: S) -> Self {
        Self::Unexpected {
            message: message.into(),
        }
    }
}
