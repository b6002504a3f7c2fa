//! Core of an online next-close forecasting service.
//!
//! Callers submit sequential daily OHLCV records one at a time; once five
//! days of history have accumulated, each further submission produces a
//! forecast of the next closing price. This crate covers the stateful
//! windowing, feature scaling, and inference/inverse-scaling pipeline; HTTP
//! routing and process bootstrap live in the hosting service.

pub mod error;
pub mod model;
pub mod pipeline;
pub mod scaler;
pub mod window;

pub use error::{LoadError, ModelError, PipelineError, ScaleError};
pub use model::{LinearModel, Regressor};
pub use pipeline::{InferencePipeline, Prediction};
pub use scaler::{MinMaxScaler, RowScaler};
pub use window::{FeatureRecord, FeatureWindow, RecordPayload, RollingWindow};

/// Days of history required before a forecast can be produced.
pub const HISTORY_DAYS: usize = 5;

/// Raw feature columns per day: open, high, low, close, volume.
pub const FEATURES_PER_DAY: usize = 5;

/// Flattened model input length (rows concatenated oldest first).
pub const MODEL_INPUT_LEN: usize = HISTORY_DAYS * FEATURES_PER_DAY;

/// Column index of the close price, the forecast target.
pub const CLOSE_INDEX: usize = 3;
