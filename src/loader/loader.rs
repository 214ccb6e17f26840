//! Table loader
//!
//! Reads every CSV file in a directory into its own table (full replace)
//! and then derives the `transactions_base` join view. The whole run is
//! one transaction: a failure leaves the previous load untouched.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::observability::{log_event_with_fields, Event, ObservationScope};
use crate::store::{
    quote_ident, quote_literal, validate_identifier, Store, StoreMode, StoreResult,
};

use super::errors::{LoadError, LoadResult};

/// Name of the derived join view
pub const TRANSACTIONS_VIEW: &str = "transactions_base";

/// Tables the join view is built from
pub const VIEW_SOURCE_TABLES: [&str; 3] = ["orders", "order_items", "products"];

const TRANSACTIONS_VIEW_SQL: &str = "
    CREATE OR REPLACE VIEW transactions_base AS
    SELECT
        o.order_id,
        o.customer_id,
        o.order_date,
        o.order_total,
        oi.product_id,
        oi.quantity,
        oi.unit_price,
        p.category,
        p.brand,
        p.price,
        p.mrp,
        p.margin_percentage
    FROM orders o
    JOIN order_items oi ON o.order_id = oi.order_id
    JOIN products p ON oi.product_id = p.product_id
";

/// One file written as a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadedTable {
    pub file_name: String,
    pub table_name: String,
    pub row_count: u64,
    pub column_count: usize,
}

/// Outcome of a full load run
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadReport {
    /// Tables in the order they were loaded
    pub tables: Vec<LoadedTable>,
    /// Files seen but not loaded
    pub skipped: Vec<String>,
    pub view_created: bool,
}

impl LoadReport {
    /// Looks up a loaded table by name
    pub fn table(&self, name: &str) -> Option<&LoadedTable> {
        self.tables.iter().find(|t| t.table_name == name)
    }
}

/// Derives a table name from a file name.
///
/// Returns `None` for files that are not CSV. The extension is dropped,
/// `prefix` is stripped if present, and the rest is lowercased:
/// `blinkit_Order_Items.csv` becomes `order_items`.
pub fn table_name_for(file_name: &str, prefix: &str) -> Option<String> {
    let path = Path::new(file_name);
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return None;
    }

    let stem = path.file_stem()?.to_str()?;
    let stripped = if prefix.is_empty() {
        stem
    } else {
        stem.strip_prefix(prefix).unwrap_or(stem)
    };
    Some(stripped.to_lowercase())
}

/// Loads a directory of CSV files into a read-write store
pub struct TableLoader<'s> {
    store: &'s Store,
    prefix: String,
}

impl<'s> TableLoader<'s> {
    /// Creates a loader that strips `prefix` from file names
    pub fn new(store: &'s Store, prefix: impl Into<String>) -> Self {
        Self {
            store,
            prefix: prefix.into(),
        }
    }

    /// Loads every CSV in `dir`, then recreates the join view.
    pub fn load_dir(&self, dir: &Path) -> LoadResult<LoadReport> {
        if self.store.mode() == StoreMode::ReadOnly {
            return Err(LoadError::ReadOnlyStore);
        }

        let dir_str = dir.display().to_string();
        let store_str = self.store.path().display().to_string();
        let scope = ObservationScope::with_fields(
            "LOAD",
            &[("dir", dir_str.as_str()), ("store", store_str.as_str())],
        );

        let files = match list_files(dir) {
            Ok(files) => files,
            Err(e) => {
                scope.fail(&e.to_string());
                return Err(e);
            }
        };

        self.store.execute_batch("BEGIN TRANSACTION")?;
        let result = self.load_files(&files).and_then(|report| {
            self.store.execute_batch("COMMIT")?;
            Ok(report)
        });

        match result {
            Ok(report) => {
                let tables = report.tables.len().to_string();
                scope.complete_with_fields(&[("tables", tables.as_str())]);
                Ok(report)
            }
            Err(e) => {
                let reason = e.to_string();
                scope.fail(&reason);
                let fields = failure_fields(&reason, self.store.execute_batch("ROLLBACK"));
                let fields: Vec<(&str, &str)> =
                    fields.iter().map(|(k, v)| (*k, v.as_str())).collect();
                log_event_with_fields(Event::LoadFailed, &fields);
                Err(e)
            }
        }
    }

    fn load_files(&self, files: &[PathBuf]) -> LoadResult<LoadReport> {
        let mut report = LoadReport::default();

        for path in files {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            match self.load_file(path)? {
                Some(table) => report.tables.push(table),
                None => {
                    log_event_with_fields(Event::FileSkipped, &[("file", file_name.as_str())]);
                    report.skipped.push(file_name);
                }
            }
        }

        self.create_transactions_view()?;
        report.view_created = true;
        Ok(report)
    }

    /// Loads one file as a table. Non-CSV files return `None`.
    pub fn load_file(&self, path: &Path) -> LoadResult<Option<LoadedTable>> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let table = match table_name_for(&file_name, &self.prefix) {
            Some(table) => table,
            None => return Ok(None),
        };

        if validate_identifier(&table).is_err() {
            return Err(LoadError::InvalidTableName {
                file: file_name,
                table,
            });
        }

        let table_err = |source| LoadError::Table {
            file: file_name.clone(),
            source,
        };

        let sql = format!(
            "CREATE OR REPLACE TABLE {} AS SELECT * FROM read_csv_auto({}, header = true)",
            quote_ident(&table).map_err(table_err)?,
            quote_literal(&path.to_string_lossy()),
        );
        self.store.execute_batch(&sql).map_err(table_err)?;

        let row_count = self.store.row_count(&table).map_err(table_err)?;
        let column_count = self.store.column_count(&table).map_err(table_err)?;

        let rows = row_count.to_string();
        let cols = column_count.to_string();
        log_event_with_fields(
            Event::TableLoaded,
            &[
                ("file", file_name.as_str()),
                ("table", table.as_str()),
                ("rows", rows.as_str()),
                ("cols", cols.as_str()),
            ],
        );

        Ok(Some(LoadedTable {
            file_name,
            table_name: table,
            row_count,
            column_count,
        }))
    }

    /// Recreates `transactions_base` from the loaded tables.
    pub fn create_transactions_view(&self) -> LoadResult<()> {
        for table in VIEW_SOURCE_TABLES {
            if !self.store.table_exists(table)? {
                return Err(LoadError::MissingTable(table.to_string()));
            }
        }

        self.store
            .execute_batch(TRANSACTIONS_VIEW_SQL)
            .map_err(LoadError::View)?;

        log_event_with_fields(Event::ViewCreated, &[("view", TRANSACTIONS_VIEW)]);
        Ok(())
    }
}

/// Fields for LOAD_FAILED; a failed rollback is reported alongside the cause
fn failure_fields(reason: &str, rollback: StoreResult<()>) -> Vec<(&'static str, String)> {
    let mut fields = vec![("reason", reason.to_string())];
    if let Err(e) = rollback {
        fields.push(("rollback_error", e.to_string()));
    }
    fields
}

/// Regular files in `dir`, sorted by name
fn list_files(dir: &Path) -> LoadResult<Vec<PathBuf>> {
    let input_err = |source| LoadError::InputDir {
        path: dir.display().to_string(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(input_err)? {
        let path = entry.map_err(input_err)?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
