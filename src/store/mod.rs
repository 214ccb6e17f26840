//! Analytical store for leakscope
//!
//! Wraps an embedded DuckDB file. The store is the only shared state in the
//! system: the loader writes it once per run, everything else reads it.

mod errors;
mod store;
mod table;

pub use errors::{StoreError, StoreResult};
pub use store::{quote_ident, quote_literal, validate_identifier, Store, StoreMode};
pub use table::{cell_text, ResultTable};
