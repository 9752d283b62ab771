//! Tooltip samples: parsing recognized text and assembling the final series.
//!
//! This module provides:
//! - `ParsedSample`, one accepted (date, value) reading
//! - `SampleParser`, recognized text → sample or rejection
//! - `YearDigitCorrection`, known OCR misreads of the year's leading digit
//! - `SampleAggregator`, dedup + sort into a `Series`

pub mod aggregator;
pub mod correction;
pub mod parser;

pub use aggregator::{SampleAggregator, Series};
pub use parser::{ParseRejection, SampleParser};

use chrono::{DateTime, NaiveDate, Utc};

/// One accepted tooltip reading.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParsedSample {
    /// Milliseconds since the Unix epoch, midnight UTC of the sample's date
    pub timestamp: i64,
    /// Absolute metric value, never negative
    pub value: f64,
}

impl ParsedSample {
    /// Calendar date of the sample, if the timestamp is representable.
    pub fn date(&self) -> Option<NaiveDate> {
        DateTime::<Utc>::from_timestamp_millis(self.timestamp).map(|dt| dt.date_naive())
    }
}

/// Midnight UTC of `date` in epoch milliseconds.
pub fn date_to_epoch_millis(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or_default()
}
