//! Per-column feature scaling against fitted statistics.
//!
//! Wraps the normalization the model was trained with: a forward transform
//! applied row by row when building model input, and an inverse transform
//! used to map the scaled prediction back to a price.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LoadError, ScaleError};
use crate::FEATURES_PER_DAY;

/// A fitted, column-independent row transform.
///
/// Columns are scaled without cross-column interaction, which is what makes
/// [`inverse_transform_target`] sound: reversing one column of a zero-padded
/// row cannot be perturbed by the zeros in the other columns. Scalers with
/// cross-column coupling (whitening, PCA) must not implement this trait.
///
/// [`inverse_transform_target`]: RowScaler::inverse_transform_target
pub trait RowScaler: Send + Sync {
    /// Number of columns the transform was fitted for.
    fn columns(&self) -> usize;

    /// Apply the forward transform (raw to scaled) to one row.
    fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>, ScaleError>;

    /// Apply the inverse transform (scaled to raw) to one row.
    fn inverse_row(&self, row: &[f64]) -> Result<Vec<f64>, ScaleError>;

    /// Reverse the scaling of a single column value.
    ///
    /// Builds a row of zeros with `value` at `index`, inverse-transforms it,
    /// and extracts position `index`. Only the column independence guaranteed
    /// by this trait makes the zero padding harmless.
    fn inverse_transform_target(&self, value: f64, index: usize) -> Result<f64, ScaleError> {
        let columns = self.columns();
        if index >= columns {
            return Err(ScaleError::TargetOutOfRange { index, columns });
        }
        let mut row = vec![0.0; columns];
        row[index] = value;
        let raw = self.inverse_row(&row)?;
        Ok(raw[index])
    }
}

/// Fitted min-max statistics, one pair per column.
///
/// Forward transform maps each column onto the unit interval:
/// `(x - data_min) / (data_max - data_min)`; the inverse reverses it.
/// A degenerate column (`data_max == data_min`) scales by 1, matching the
/// convention of the training-side scaler.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinMaxScaler {
    data_min: Vec<f64>,
    data_max: Vec<f64>,
}

impl MinMaxScaler {
    /// Build a scaler from fitted per-column statistics.
    pub fn from_stats(data_min: Vec<f64>, data_max: Vec<f64>) -> Result<Self, LoadError> {
        let scaler = Self { data_min, data_max };
        scaler.validate()?;
        Ok(scaler)
    }

    /// Load fitted statistics from a JSON artifact file.
    ///
    /// The artifact holds `data_min` and `data_max` arrays exported from the
    /// training pipeline, one entry per feature column.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let contents = fs::read_to_string(path)?;
        let scaler: Self = serde_json::from_str(&contents)?;
        scaler.validate()?;
        debug!(path = %path.display(), columns = scaler.columns(), "loaded scaler artifact");
        Ok(scaler)
    }

    fn validate(&self) -> Result<(), LoadError> {
        if self.data_min.len() != FEATURES_PER_DAY || self.data_max.len() != FEATURES_PER_DAY {
            return Err(LoadError::Invalid(format!(
                "expected {} columns, got {} min / {} max entries",
                FEATURES_PER_DAY,
                self.data_min.len(),
                self.data_max.len()
            )));
        }
        for (i, (&min, &max)) in self.data_min.iter().zip(&self.data_max).enumerate() {
            if !min.is_finite() || !max.is_finite() {
                return Err(LoadError::Invalid(format!(
                    "non-finite statistics in column {i}"
                )));
            }
            if max < min {
                return Err(LoadError::Invalid(format!(
                    "column {i} has data_max {max} below data_min {min}"
                )));
            }
        }
        Ok(())
    }

    fn check_row(&self, row: &[f64]) -> Result<(), ScaleError> {
        if row.len() != self.data_min.len() {
            return Err(ScaleError::Dimension {
                expected: self.data_min.len(),
                actual: row.len(),
            });
        }
        Ok(())
    }

    fn range(&self, column: usize) -> f64 {
        let range = self.data_max[column] - self.data_min[column];
        // Constant column: scale by 1 rather than dividing by zero
        if range == 0.0 {
            1.0
        } else {
            range
        }
    }
}

impl RowScaler for MinMaxScaler {
    fn columns(&self) -> usize {
        self.data_min.len()
    }

    fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>, ScaleError> {
        self.check_row(row)?;
        Ok(row
            .iter()
            .enumerate()
            .map(|(i, &x)| (x - self.data_min[i]) / self.range(i))
            .collect())
    }

    fn inverse_row(&self, row: &[f64]) -> Result<Vec<f64>, ScaleError> {
        self.check_row(row)?;
        Ok(row
            .iter()
            .enumerate()
            .map(|(i, &x)| x * self.range(i) + self.data_min[i])
            .collect())
    }
}
