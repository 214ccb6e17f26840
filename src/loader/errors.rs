//! Load error types
//!
//! Every load error is fatal: the load step aborts and the store keeps its
//! previous contents.

use std::io;

use thiserror::Error;

use crate::store::StoreError;

/// Result type for load operations
pub type LoadResult<T> = Result<T, LoadError>;

/// Errors raised while loading input files into the store
#[derive(Debug, Error)]
pub enum LoadError {
    /// Input directory missing or unreadable
    #[error("Input directory not readable: {path}: {source}")]
    InputDir {
        path: String,
        #[source]
        source: io::Error,
    },

    /// File name does not yield a usable table name
    #[error("Invalid table name '{table}' derived from file '{file}'")]
    InvalidTableName { file: String, table: String },

    /// Malformed file or engine failure while reading it
    #[error("Failed to load '{file}': {source}")]
    Table {
        file: String,
        #[source]
        source: StoreError,
    },

    /// A table the join view depends on was not loaded
    #[error("Required table '{0}' is missing; cannot create transactions_base")]
    MissingTable(String),

    /// View creation failed (e.g. unresolvable join key)
    #[error("Failed to create view transactions_base: {0}")]
    View(#[source] StoreError),

    /// Loader was handed a read-only store
    #[error("Store is read-only; open it read-write to load")]
    ReadOnlyStore,

    /// Other store failure (transaction control)
    #[error(transparent)]
    Store(#[from] StoreError),
}
