//! Fitted regression model wrapper.
//!
//! The pipeline talks to models through the [`Regressor`] trait so the
//! numeric backend stays swappable; the concrete artifact here is a linear
//! regressor exported from the training pipeline as JSON.

use std::fs;
use std::path::Path;

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LoadError, ModelError};
use crate::MODEL_INPUT_LEN;

/// A fitted regression model mapping a flattened scaled window to one
/// scaled scalar prediction.
pub trait Regressor: Send + Sync {
    /// Predict the scaled next close from the flattened scaled input
    /// (rows concatenated in order, oldest row first).
    fn predict(&self, input: ArrayView1<'_, f64>) -> Result<f64, ModelError>;
}

/// Linear regression artifact: one coefficient per flattened input feature
/// plus an intercept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    coefficients: Vec<f64>,
    intercept: f64,
}

impl LinearModel {
    /// Build a model from fitted coefficients and intercept.
    pub fn from_weights(coefficients: Vec<f64>, intercept: f64) -> Result<Self, LoadError> {
        let model = Self {
            coefficients,
            intercept,
        };
        model.validate()?;
        Ok(model)
    }

    /// Load fitted weights from a JSON artifact file.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let contents = fs::read_to_string(path)?;
        let model: Self = serde_json::from_str(&contents)?;
        model.validate()?;
        debug!(
            path = %path.display(),
            inputs = model.coefficients.len(),
            "loaded model artifact"
        );
        Ok(model)
    }

    fn validate(&self) -> Result<(), LoadError> {
        if self.coefficients.len() != MODEL_INPUT_LEN {
            return Err(LoadError::Invalid(format!(
                "expected {} coefficients, got {}",
                MODEL_INPUT_LEN,
                self.coefficients.len()
            )));
        }
        if !self.intercept.is_finite() || self.coefficients.iter().any(|c| !c.is_finite()) {
            return Err(LoadError::Invalid("non-finite model weights".into()));
        }
        Ok(())
    }
}

impl Regressor for LinearModel {
    fn predict(&self, input: ArrayView1<'_, f64>) -> Result<f64, ModelError> {
        if input.len() != self.coefficients.len() {
            return Err(ModelError::Dimension {
                expected: self.coefficients.len(),
                actual: input.len(),
            });
        }
        let prediction = ArrayView1::from(self.coefficients.as_slice()).dot(&input) + self.intercept;
        if !prediction.is_finite() {
            return Err(ModelError::NonFinite);
        }
        Ok(prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;

    #[test]
    fn test_predict_dot_plus_intercept() {
        let mut coefficients = vec![0.0; MODEL_INPUT_LEN];
        coefficients[0] = 2.0;
        coefficients[24] = 0.5;
        let model = LinearModel::from_weights(coefficients, 1.0).unwrap();

        let mut input = vec![0.0; MODEL_INPUT_LEN];
        input[0] = 3.0;
        input[24] = 4.0;
        let input = Array1::from(input);

        let out = model.predict(input.view()).unwrap();
        assert!((out - (2.0 * 3.0 + 0.5 * 4.0 + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_predict_wrong_dimension() {
        let model = LinearModel::from_weights(vec![1.0; MODEL_INPUT_LEN], 0.0).unwrap();
        let input = Array1::from(vec![1.0; 10]);

        let err = model.predict(input.view()).unwrap_err();
        assert!(matches!(
            err,
            ModelError::Dimension {
                expected: 25,
                actual: 10
            }
        ));
    }

    #[test]
    fn test_predict_rejects_non_finite_output() {
        let model = LinearModel::from_weights(vec![1.0; MODEL_INPUT_LEN], 0.0).unwrap();
        let mut input = vec![0.0; MODEL_INPUT_LEN];
        input[3] = f64::NAN;
        let input = Array1::from(input);

        let err = model.predict(input.view()).unwrap_err();
        assert!(matches!(err, ModelError::NonFinite));
    }

    #[test]
    fn test_from_weights_rejects_wrong_length() {
        let err = LinearModel::from_weights(vec![1.0; 10], 0.0).unwrap_err();
        assert!(matches!(err, LoadError::Invalid(_)));
    }

    #[test]
    fn test_from_weights_rejects_non_finite() {
        let mut coefficients = vec![1.0; MODEL_INPUT_LEN];
        coefficients[7] = f64::INFINITY;
        let err = LinearModel::from_weights(coefficients, 0.0).unwrap_err();
        assert!(matches!(err, LoadError::Invalid(_)));
    }

    #[test]
    fn test_load_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let artifact = LinearModel {
            coefficients: vec![0.1; MODEL_INPUT_LEN],
            intercept: 0.5,
        };
        std::fs::write(&path, serde_json::to_string(&artifact).unwrap()).unwrap();

        let model = LinearModel::load(&path).unwrap();
        assert!((model.intercept - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_load_missing_file() {
        let err = LinearModel::load(Path::new("/nonexistent/model.json")).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
