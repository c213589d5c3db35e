//! Error types shared across the planner.
//!
//! [`SlotError`] covers everything that can be wrong with a single proposed
//! time slot and is surfaced verbatim to callers. [`AppError`] is the
//! crate-level error for the I/O and CSV edges.

use serde::Serialize;
use thiserror::Error;

/// Validation failure for a single clock time, range or slot.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SlotError {
    /// Text is not two colon-separated numeric fields.
    #[error("'{input}' is not a valid HH:MM time")]
    InvalidFormat { input: String },

    /// Hour not in 0..=23 or minute not in 0..=59.
    #[error("'{input}' is outside the 24-hour clock")]
    OutOfRange { input: String },

    /// A required bound or field was absent.
    #[error("missing {field}")]
    MissingField { field: &'static str },

    /// The start is not strictly before the end.
    #[error("end time {end} must be later than start time {start}")]
    InvertedRange { start: String, end: String },

    /// The end lies past the configured latest end.
    #[error("end time {end} must not exceed {max_end}")]
    ExceedsBound { end: String, max_end: String },

    /// Day text outside the seven weekdays.
    #[error("'{input}' is not a day of the week")]
    UnknownDay { input: String },
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
