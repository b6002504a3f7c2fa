//! Error types for the forecasting core.
//!
//! Every failure is surfaced as a structured value; the hosting request layer
//! decides user-visible messaging and status codes.

use thiserror::Error;

/// Failure while applying or reversing the fitted per-column transform.
#[derive(Debug, Error)]
pub enum ScaleError {
    /// Row length does not match the fitted column count.
    #[error("scaler fitted for {expected} columns, got {actual}")]
    Dimension { expected: usize, actual: usize },

    /// Target column index outside the fitted column range.
    #[error("target column {index} out of range for {columns} fitted columns")]
    TargetOutOfRange { index: usize, columns: usize },
}

/// Failure while invoking the fitted regression model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Input vector length does not match the model's expected input size.
    #[error("model expects {expected} inputs, got {actual}")]
    Dimension { expected: usize, actual: usize },

    /// The model produced NaN or infinity.
    #[error("model produced a non-finite prediction")]
    NonFinite,
}

/// Failure while loading a serialized artifact from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read artifact file")]
    Io(#[from] std::io::Error),

    #[error("failed to parse artifact")]
    Parse(#[from] serde_json::Error),

    /// Parsed cleanly but the fitted statistics are unusable.
    #[error("invalid artifact: {0}")]
    Invalid(String),
}

/// Top-level error taxonomy returned by the inference pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Model or scaler artifact was not loaded at startup. Permanent until
    /// the process restarts; the pipeline never retries the load.
    #[error("model or scaler not loaded; predictions are unavailable")]
    Unavailable,

    /// Inbound record was missing required fields. Raised before any
    /// pipeline state is touched.
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// The history window is not yet full. Transient; resolves as more
    /// records arrive.
    #[error("not enough history, need {needed} more record(s)")]
    InsufficientHistory { needed: usize },

    /// Feature scaling failed during inference.
    #[error("feature scaling failed")]
    Transform(#[from] ScaleError),

    /// Model invocation failed during inference.
    #[error("model prediction failed")]
    Prediction(#[from] ModelError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_message_lists_names() {
        let err = PipelineError::MissingFields(vec!["open".into(), "volume".into()]);
        assert_eq!(err.to_string(), "missing required fields: open, volume");
    }

    #[test]
    fn test_insufficient_history_message() {
        let err = PipelineError::InsufficientHistory { needed: 3 };
        assert!(err.to_string().contains("3 more"));
    }

    #[test]
    fn test_scale_error_converts_to_transform() {
        let err: PipelineError = ScaleError::Dimension {
            expected: 5,
            actual: 4,
        }
        .into();
        assert!(matches!(err, PipelineError::Transform(_)));
    }

    #[test]
    fn test_model_error_converts_to_prediction() {
        let err: PipelineError = ModelError::NonFinite.into();
        assert!(matches!(err, PipelineError::Prediction(_)));
    }
}
