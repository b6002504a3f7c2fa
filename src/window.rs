//! Rolling history window over daily market records.
//!
//! Provides a fixed-capacity FIFO buffer that maintains the trailing days of
//! OHLCV history used as model input, without reallocating on the hot path.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::{FEATURES_PER_DAY, HISTORY_DAYS};

/// A generic rolling window with fixed capacity.
///
/// Uses a circular buffer to maintain a sliding window of data; inserting
/// into a full window evicts the oldest element first.
#[derive(Debug, Clone)]
pub struct RollingWindow<T> {
    buffer: VecDeque<T>,
    capacity: usize,
}

impl<T> RollingWindow<T> {
    /// Create a new rolling window with the specified capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Add a new element at the newest end.
    ///
    /// If the window is at capacity, removes the oldest element first.
    pub fn push(&mut self, value: T) {
        if self.buffer.len() >= self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(value);
    }

    /// Current number of elements in the window.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the window is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Check if the window is at full capacity.
    pub fn is_full(&self) -> bool {
        self.buffer.len() >= self.capacity
    }

    /// Window capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterator over all elements (oldest to newest).
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.buffer.iter()
    }
}

impl<T: Clone> RollingWindow<T> {
    /// Vector of all elements (oldest to newest).
    pub fn to_vec(&self) -> Vec<T> {
        self.buffer.iter().cloned().collect()
    }
}

/// One day's raw market values, in fixed column order.
///
/// Column order matches the fitted scaler and model artifacts:
/// open, high, low, close, volume. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl FeatureRecord {
    pub fn new(open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// The record as one model-input row in column order.
    pub fn as_row(&self) -> [f64; FEATURES_PER_DAY] {
        [self.open, self.high, self.low, self.close, self.volume]
    }
}

/// Inbound record shape before validation.
///
/// The hosting request layer deserializes into this and calls [`validate`]
/// before anything reaches the pipeline; a payload with missing fields must
/// never mutate window state.
///
/// [`validate`]: RecordPayload::validate
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordPayload {
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<f64>,
}

impl RecordPayload {
    /// Convert into a [`FeatureRecord`], reporting every missing field name.
    pub fn validate(self) -> Result<FeatureRecord, PipelineError> {
        let mut missing = Vec::new();
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ];
        for (name, value) in &fields {
            if value.is_none() {
                missing.push((*name).to_string());
            }
        }
        if !missing.is_empty() {
            return Err(PipelineError::MissingFields(missing));
        }
        let [open, high, low, close, volume] = fields.map(|(_, v)| v.unwrap_or_default());
        Ok(FeatureRecord::new(open, high, low, close, volume))
    }
}

/// Trailing history of daily records used for one prediction.
///
/// Fixed capacity of [`HISTORY_DAYS`]; ordering reflects submission order,
/// oldest first. Created empty at service start and never reset.
#[derive(Debug, Clone)]
pub struct FeatureWindow {
    records: RollingWindow<FeatureRecord>,
}

impl FeatureWindow {
    pub fn new() -> Self {
        Self {
            records: RollingWindow::new(HISTORY_DAYS),
        }
    }

    /// Insert a record at the newest end, evicting the oldest if full.
    pub fn append(&mut self, record: FeatureRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.records.is_full()
    }

    /// How many more records are required before inference can run.
    pub fn needed(&self) -> usize {
        HISTORY_DAYS - self.records.len()
    }

    /// The full window as rows in oldest-to-newest order.
    ///
    /// Returns `None` unless the window is full.
    pub fn to_rows(&self) -> Option<[[f64; FEATURES_PER_DAY]; HISTORY_DAYS]> {
        if !self.records.is_full() {
            return None;
        }
        let mut rows = [[0.0; FEATURES_PER_DAY]; HISTORY_DAYS];
        for (row, record) in rows.iter_mut().zip(self.records.iter()) {
            *row = record.as_row();
        }
        Some(rows)
    }
}

impl Default for FeatureWindow {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(close: f64) -> FeatureRecord {
        FeatureRecord::new(close - 1.0, close + 1.0, close - 2.0, close, 1000.0)
    }

    #[test]
    fn test_rolling_window_basic() {
        let mut window = RollingWindow::new(3);
        assert!(window.is_empty());
        assert_eq!(window.capacity(), 3);

        window.push(1);
        window.push(2);
        window.push(3);

        assert!(window.is_full());
        assert_eq!(window.len(), 3);
        assert_eq!(window.to_vec(), vec![1, 2, 3]);
    }

    #[test]
    fn test_rolling_window_overflow() {
        let mut window = RollingWindow::new(3);

        window.push(1);
        window.push(2);
        window.push(3);
        window.push(4); // Should evict 1

        assert_eq!(window.to_vec(), vec![2, 3, 4]);
        assert!(window.is_full());
    }

    #[test]
    fn test_rolling_window_never_exceeds_capacity() {
        let mut window = RollingWindow::new(5);
        for i in 0..50 {
            window.push(i);
            assert!(window.len() <= 5);
        }
        assert_eq!(window.to_vec(), vec![45, 46, 47, 48, 49]);
    }

    #[test]
    fn test_feature_window_fifo_keeps_most_recent_five() {
        let mut window = FeatureWindow::new();
        for i in 0..8 {
            window.append(record(100.0 + i as f64));
        }

        assert_eq!(window.len(), HISTORY_DAYS);
        let rows = window.to_rows().unwrap();
        for (i, row) in rows.iter().enumerate() {
            // Rows 3..=7 survive, oldest first
            assert_eq!(row[3], 103.0 + i as f64);
        }
    }

    #[test]
    fn test_feature_window_needed_counts_down() {
        let mut window = FeatureWindow::new();
        assert_eq!(window.needed(), 5);
        assert!(window.to_rows().is_none());

        for i in 0..5 {
            window.append(record(100.0 + i as f64));
            assert_eq!(window.needed(), 4 - i);
        }
        assert!(window.is_full());
        assert!(window.to_rows().is_some());
    }

    #[test]
    fn test_record_as_row_column_order() {
        let rec = FeatureRecord::new(1.0, 2.0, 3.0, 4.0, 5.0);
        assert_eq!(rec.as_row(), [1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(rec.as_row()[crate::CLOSE_INDEX], rec.close);
    }

    #[test]
    fn test_payload_validate_complete() {
        let payload = RecordPayload {
            open: Some(1.0),
            high: Some(2.0),
            low: Some(0.5),
            close: Some(1.5),
            volume: Some(100.0),
        };
        let rec = payload.validate().unwrap();
        assert_eq!(rec.close, 1.5);
    }

    #[test]
    fn test_payload_validate_reports_all_missing_fields() {
        let payload = RecordPayload {
            open: Some(1.0),
            high: None,
            low: Some(0.5),
            close: None,
            volume: None,
        };
        match payload.validate() {
            Err(PipelineError::MissingFields(fields)) => {
                assert_eq!(fields, vec!["high", "close", "volume"]);
            }
            other => panic!("expected MissingFields, got {other:?}"),
        }
    }

    #[test]
    fn test_payload_deserializes_from_json() {
        let payload: RecordPayload =
            serde_json::from_str(r#"{"open": 1.0, "high": 2.0, "low": 0.5}"#).unwrap();
        assert!(payload.close.is_none());
        assert!(payload.validate().is_err());
    }
}
