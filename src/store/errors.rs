//! Store error types
//!
//! Engine errors are surfaced with the engine's own message, untranslated.

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by the analytical store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Query engine failure (missing table, bad SQL, malformed file)
    #[error("{0}")]
    Engine(#[from] duckdb::Error),

    /// Read-only open of a store file that was never loaded
    #[error("Store file not found: {0}. Run 'leakscope load' first.")]
    NotFound(String),

    /// Identifier that cannot be used as a table or view name
    #[error("Invalid identifier: '{0}'")]
    InvalidIdentifier(String),

    /// Connection guard poisoned by a panicking request
    #[error("Store connection unavailable")]
    Poisoned,
}

impl StoreError {
    /// Error code string, in the same register as CLI codes
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Engine(_) => "LEAK_STORE_ENGINE",
            StoreError::NotFound(_) => "LEAK_STORE_NOT_FOUND",
            StoreError::InvalidIdentifier(_) => "LEAK_STORE_INVALID_IDENTIFIER",
            StoreError::Poisoned => "LEAK_STORE_POISONED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = StoreError::NotFound("x.duckdb".to_string());
        assert!(err.to_string().contains("x.duckdb"));
        assert_eq!(err.code(), "LEAK_STORE_NOT_FOUND");
    }

    #[test]
    fn test_invalid_identifier_message() {
        let err = StoreError::InvalidIdentifier("bad name".to_string());
        assert_eq!(err.to_string(), "Invalid identifier: 'bad name'");
    }
}
