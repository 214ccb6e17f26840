//! Table Loader
//!
//! Bulk-loads a directory of CSV files into the store, one table per file,
//! and derives the `transactions_base` view.
//!
//! - Full snapshot replace, never incremental
//! - No schema validation: invalid rows are kept for the audit rules
//! - Missing view sources are fatal

mod errors;
mod loader;

pub use errors::{LoadError, LoadResult};
pub use loader::{
    table_name_for, LoadReport, LoadedTable, TableLoader, TRANSACTIONS_VIEW, VIEW_SOURCE_TABLES,
};
