// ⚠️ Error Types
// Failures raised while scoring receipts and touching the store

use thiserror::Error;

/// A field that a scoring rule could not interpret.
///
/// Scoring never aborts on these: the rule that hit it contributes 0 and the
/// error is handed back to the caller inside the breakdown.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScoreError {
    #[error("invalid amount in {field}: {value:?}")]
    InvalidAmount { field: &'static str, value: String },

    #[error("invalid purchase date {0:?} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("invalid purchase time {0:?} (expected HH:MM)")]
    InvalidTime(String),

    #[error("amount out of range in {field}: {value}")]
    Overflow { field: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("receipt store lock poisoned")]
    Poisoned,
}
