//! Report error types

use std::io;

use thiserror::Error;

use crate::rules::RuleError;
use crate::store::StoreError;

/// Result type for report operations
pub type ReportResult<T> = Result<T, ReportError>;

/// Errors raised while building dashboard data
#[derive(Debug, Error)]
pub enum ReportError {
    /// Aggregate query failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Rule batch aborted
    #[error(transparent)]
    Rule(#[from] RuleError),

    /// Date filter not in YYYY-MM-DD form
    #[error("Invalid {field} date '{value}': expected YYYY-MM-DD")]
    InvalidDate { field: &'static str, value: String },

    /// Date range with start after end
    #[error("Invalid date range: start {start} is after end {end}")]
    InvertedRange { start: String, end: String },

    /// CSV encoding failed
    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    /// Writing an export file failed
    #[error("Export I/O failed: {0}")]
    Io(#[from] io::Error),
}

impl ReportError {
    /// Returns true if the caller supplied bad input
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ReportError::InvalidDate { .. } | ReportError::InvertedRange { .. }
        )
    }
}
