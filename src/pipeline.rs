//! Inference pipeline orchestrating window state, scaling, and the model.
//!
//! One pipeline instance is constructed at service bootstrap and shared by
//! every inference call for the life of the process. Each call appends the
//! new record and, once five days of history have accumulated, produces a
//! forecast of the next closing price.

use std::path::Path;
use std::sync::{Mutex, PoisonError};

use ndarray::Array1;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::PipelineError;
use crate::model::{LinearModel, Regressor};
use crate::scaler::{MinMaxScaler, RowScaler};
use crate::window::{FeatureRecord, FeatureWindow, RecordPayload};
use crate::{CLOSE_INDEX, MODEL_INPUT_LEN};

/// A successful forecast of the next closing price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub predicted_price: f64,
}

/// Stateful forecasting pipeline.
///
/// Owns the history window behind a mutex; the scaler and model artifacts
/// are read-only after construction, so concurrent calls only contend on
/// the window itself.
pub struct InferencePipeline {
    window: Mutex<FeatureWindow>,
    scaler: Option<Box<dyn RowScaler>>,
    model: Option<Box<dyn Regressor>>,
}

impl InferencePipeline {
    /// Create a pipeline from already-loaded artifacts.
    ///
    /// Either artifact may be absent; the pipeline is still constructed but
    /// stays in the unavailable state until the process restarts with both
    /// artifacts in place.
    pub fn new(scaler: Option<Box<dyn RowScaler>>, model: Option<Box<dyn Regressor>>) -> Self {
        Self {
            window: Mutex::new(FeatureWindow::new()),
            scaler,
            model,
        }
    }

    /// Construct the pipeline from artifact files on disk.
    ///
    /// A failed load is logged and leaves that artifact absent; there is no
    /// retry or reload.
    pub fn from_artifact_files(scaler_path: &Path, model_path: &Path) -> Self {
        let scaler = match MinMaxScaler::load(scaler_path) {
            Ok(scaler) => Some(Box::new(scaler) as Box<dyn RowScaler>),
            Err(err) => {
                warn!(path = %scaler_path.display(), error = %err, "failed to load scaler artifact");
                None
            }
        };
        let model = match LinearModel::load(model_path) {
            Ok(model) => Some(Box::new(model) as Box<dyn Regressor>),
            Err(err) => {
                warn!(path = %model_path.display(), error = %err, "failed to load model artifact");
                None
            }
        };
        if scaler.is_some() && model.is_some() {
            info!("loaded model and scaler artifacts");
        }
        Self::new(scaler, model)
    }

    /// Whether both artifacts loaded and predictions can be served once
    /// enough history accumulates.
    pub fn ready(&self) -> bool {
        self.scaler.is_some() && self.model.is_some()
    }

    /// Number of records currently held in the history window.
    pub fn history_len(&self) -> usize {
        self.lock_window().len()
    }

    /// Validate an inbound payload and run inference on it.
    ///
    /// This is the call the hosting request layer makes; a payload with
    /// missing fields is rejected before any pipeline state is touched.
    pub fn submit(&self, payload: RecordPayload) -> Result<Prediction, PipelineError> {
        let record = payload.validate()?;
        self.infer(record)
    }

    /// Append one record and, if five days of history are present, forecast
    /// the next closing price.
    ///
    /// The append is irreversible: a scaling or prediction failure later in
    /// the call leaves the record in the window.
    pub fn infer(&self, record: FeatureRecord) -> Result<Prediction, PipelineError> {
        let (scaler, model) = match (&self.scaler, &self.model) {
            (Some(scaler), Some(model)) => (scaler, model),
            // Checked before the append so an unavailable pipeline never
            // accumulates state it cannot use
            _ => return Err(PipelineError::Unavailable),
        };

        // Append, fullness check, and row read form one critical section;
        // interleaving them across calls would corrupt row ordering.
        let rows = {
            let mut window = self.lock_window();
            window.append(record);
            match window.to_rows() {
                Some(rows) => rows,
                None => {
                    let needed = window.needed();
                    debug!(needed, "history window not yet full");
                    return Err(PipelineError::InsufficientHistory { needed });
                }
            }
        };

        let mut flat = Vec::with_capacity(MODEL_INPUT_LEN);
        for row in &rows {
            let scaled = scaler.transform_row(row)?;
            flat.extend_from_slice(&scaled);
        }
        let input = Array1::from(flat);

        let scaled_close = model.predict(input.view())?;
        let predicted_price = scaler.inverse_transform_target(scaled_close, CLOSE_INDEX)?;
        debug!(predicted_price, "produced forecast");

        Ok(Prediction { predicted_price })
    }

    fn lock_window(&self) -> std::sync::MutexGuard<'_, FeatureWindow> {
        // A panicked holder cannot have broken the window invariants, so
        // recover rather than propagate the poison
        self.window.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
