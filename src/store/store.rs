//! DuckDB store handle
//!
//! One `Store` owns one connection to the store file. The load phase opens
//! it read-write, the dashboard opens it read-only; dropping the handle
//! releases the file.

use std::path::{Path, PathBuf};

use duckdb::types::Value as Cell;
use duckdb::{AccessMode, Config, Connection};
use serde_json::Value;

use super::errors::{StoreError, StoreResult};
use super::table::ResultTable;

/// Access mode a store was opened with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    ReadWrite,
    ReadOnly,
}

/// Handle to the persisted analytical store
pub struct Store {
    conn: Connection,
    path: PathBuf,
    mode: StoreMode,
}

impl Store {
    /// Opens (or creates) the store for loading.
    pub fn open_read_write(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path)?;
        disable_extension_downloads(&conn)?;
        Ok(Self {
            conn,
            path,
            mode: StoreMode::ReadWrite,
        })
    }

    /// Opens an existing store for auditing and reporting.
    ///
    /// The file must already exist; a read-only open never creates it.
    pub fn open_read_only(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(StoreError::NotFound(path.display().to_string()));
        }
        let config = Config::default().access_mode(AccessMode::ReadOnly)?;
        let conn = Connection::open_with_flags(&path, config)?;
        disable_extension_downloads(&conn)?;
        Ok(Self {
            conn,
            path,
            mode: StoreMode::ReadOnly,
        })
    }

    /// In-memory store, used by tests and throwaway audits
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        disable_extension_downloads(&conn)?;
        Ok(Self {
            conn,
            path: PathBuf::from(":memory:"),
            mode: StoreMode::ReadWrite,
        })
    }

    /// Path of the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Mode the store was opened with
    pub fn mode(&self) -> StoreMode {
        self.mode
    }

    /// Underlying connection, for typed queries
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Execute one or more statements with no result
    pub fn execute_batch(&self, sql: &str) -> StoreResult<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    /// Query for a single scalar value
    pub fn query_scalar<T: duckdb::types::FromSql>(&self, sql: &str) -> StoreResult<T> {
        let value: T = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(value)
    }

    /// Returns true if a table or view with this name exists
    pub fn table_exists(&self, name: &str) -> StoreResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = ?",
            duckdb::params![name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Number of rows in a table or view
    pub fn row_count(&self, name: &str) -> StoreResult<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(name)?);
        let count: i64 = self.query_scalar(&sql)?;
        Ok(count.max(0) as u64)
    }

    /// Number of columns in a table or view
    pub fn column_count(&self, name: &str) -> StoreResult<usize> {
        let sql = format!("SELECT * FROM {}", quote_ident(name)?);
        Ok(self.describe(&sql)?.len())
    }

    /// Column names a query would produce, without running it
    pub fn describe(&self, sql: &str) -> StoreResult<Vec<String>> {
        Ok(self
            .describe_columns(sql)?
            .into_iter()
            .map(|(name, _)| name)
            .collect())
    }

    fn describe_columns(&self, sql: &str) -> StoreResult<Vec<(String, String)>> {
        let mut stmt = self.conn.prepare(&format!("DESCRIBE {sql}"))?;
        let columns = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(columns)
    }

    /// Run a query and collect every row into a `ResultTable`
    pub fn query_table(&self, sql: &str) -> StoreResult<ResultTable> {
        self.query_table_ordered(sql, None)
    }

    /// Run a query with an outer ordering clause applied to its rows
    ///
    /// Columns come from `DESCRIBE` so an empty result still carries its
    /// header. Numbers, booleans and text keep their JSON type; dates,
    /// timestamps and other engine types come back as their text form.
    pub fn query_table_ordered(
        &self,
        sql: &str,
        order_by: Option<&str>,
    ) -> StoreResult<ResultTable> {
        let described = self.describe_columns(sql)?;

        let projection = described
            .iter()
            .map(|(name, column_type)| select_expr(name, column_type))
            .collect::<Vec<_>>()
            .join(", ");
        let mut outer_sql = format!("SELECT {projection} FROM ({sql}) AS _row");
        if let Some(order) = order_by {
            outer_sql.push_str(" ORDER BY ");
            outer_sql.push_str(order);
        }

        let width = described.len();
        let mut stmt = self.conn.prepare(&outer_sql)?;
        let mut rows = stmt.query([])?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(width);
            for idx in 0..width {
                values.push(json_value(row.get::<_, Cell>(idx)?));
            }
            out.push(values);
        }

        let columns = described.into_iter().map(|(name, _)| name).collect();
        Ok(ResultTable::new(columns, out))
    }
}

/// Keeps the engine from fetching extensions over the network
fn disable_extension_downloads(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "SET autoinstall_known_extensions = false; SET autoload_known_extensions = false;",
    )?;
    Ok(())
}

/// Projection for one column: JSON-native types pass through, decimals
/// widen to DOUBLE, everything else is cast to text.
fn select_expr(name: &str, column_type: &str) -> String {
    let column = format!("\"{}\"", name.replace('"', "\"\""));
    let base = column_type
        .split('(')
        .next()
        .unwrap_or(column_type)
        .trim()
        .to_ascii_uppercase();
    match base.as_str() {
        "BOOLEAN" | "TINYINT" | "SMALLINT" | "INTEGER" | "BIGINT" | "UTINYINT" | "USMALLINT"
        | "UINTEGER" | "UBIGINT" | "FLOAT" | "DOUBLE" | "VARCHAR" => column,
        "DECIMAL" | "HUGEINT" | "UHUGEINT" => format!("CAST({column} AS DOUBLE) AS {column}"),
        _ => format!("CAST({column} AS VARCHAR) AS {column}"),
    }
}

fn json_value(cell: Cell) -> Value {
    match cell {
        Cell::Null => Value::Null,
        Cell::Boolean(b) => Value::Bool(b),
        Cell::TinyInt(n) => n.into(),
        Cell::SmallInt(n) => n.into(),
        Cell::Int(n) => n.into(),
        Cell::BigInt(n) => n.into(),
        Cell::UTinyInt(n) => n.into(),
        Cell::USmallInt(n) => n.into(),
        Cell::UInt(n) => n.into(),
        Cell::UBigInt(n) => n.into(),
        Cell::Float(n) => f64::from(n).into(),
        Cell::Double(n) => n.into(),
        Cell::Text(s) => Value::String(s),
        other => Value::String(format!("{other:?}")),
    }
}

/// Checks that a name is a plain SQL identifier
pub fn validate_identifier(name: &str) -> StoreResult<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidIdentifier(name.to_string()))
    }
}

/// Validates and double-quotes an identifier
pub fn quote_ident(name: &str) -> StoreResult<String> {
    validate_identifier(name)?;
    Ok(format!("\"{name}\""))
}

/// Single-quotes a string literal, doubling embedded quotes
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_identifier() {
        assert!(validate_identifier("orders").is_ok());
        assert!(validate_identifier("_order_items2").is_ok());
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("2orders").is_err());
        assert!(validate_identifier("order items").is_err());
        assert!(validate_identifier("orders;drop").is_err());
    }

    #[test]
    fn test_quote_literal_escapes() {
        assert_eq!(quote_literal("data/it's.csv"), "'data/it''s.csv'");
    }

    #[test]
    fn test_query_table_keeps_header_when_empty() {
        let store = Store::open_in_memory().unwrap();
        store
            .execute_batch("CREATE TABLE t (a INTEGER, b VARCHAR)")
            .unwrap();

        let table = store.query_table("SELECT a, b FROM t").unwrap();
        assert!(table.is_empty());
        assert_eq!(table.columns, vec!["a", "b"]);
    }

    #[test]
    fn test_query_table_ordered() {
        let store = Store::open_in_memory().unwrap();
        store
            .execute_batch(
                "CREATE TABLE t (a INTEGER, b VARCHAR);
                 INSERT INTO t VALUES (3, 'z'), (1, 'x'), (2, NULL);",
            )
            .unwrap();

        let table = store
            .query_table_ordered("SELECT a, b FROM t", Some("a"))
            .unwrap();
        assert_eq!(table.column_values("a"), vec![&json!(1), &json!(2), &json!(3)]);
        assert_eq!(table.value(1, "b"), Some(&Value::Null));
    }

    #[test]
    fn test_query_table_converts_engine_types_offline() {
        let store = Store::open_in_memory().unwrap();
        let autoload: bool = store
            .query_scalar("SELECT current_setting('autoload_known_extensions')")
            .unwrap();
        assert!(!autoload);

        store
            .execute_batch(
                "CREATE TABLE t (d DATE, ts TIMESTAMP, amount DECIMAL(10,2), n BIGINT, ok BOOLEAN);
                 INSERT INTO t VALUES
                     ('2024-01-02', '2024-01-02 10:15:00', 12.50, 7, true),
                     (NULL, NULL, NULL, NULL, NULL);",
            )
            .unwrap();

        let table = store
            .query_table_ordered("SELECT * FROM t", Some("d NULLS LAST"))
            .unwrap();
        assert_eq!(table.columns, vec!["d", "ts", "amount", "n", "ok"]);
        assert_eq!(table.value(0, "d"), Some(&json!("2024-01-02")));
        assert_eq!(table.value(0, "ts"), Some(&json!("2024-01-02 10:15:00")));
        assert_eq!(table.value(0, "amount"), Some(&json!(12.5)));
        assert_eq!(table.value(0, "n"), Some(&json!(7)));
        assert_eq!(table.value(0, "ok"), Some(&json!(true)));
        assert!(table.rows[1].iter().all(Value::is_null));
    }

    #[test]
    fn test_select_expr_quotes_and_casts() {
        assert_eq!(select_expr("qty", "BIGINT"), "\"qty\"");
        assert_eq!(
            select_expr("price", "DECIMAL(12,2)"),
            "CAST(\"price\" AS DOUBLE) AS \"price\""
        );
        assert_eq!(
            select_expr("a\"b", "DATE"),
            "CAST(\"a\"\"b\" AS VARCHAR) AS \"a\"\"b\""
        );
    }

    #[test]
    fn test_table_exists_and_counts() {
        let store = Store::open_in_memory().unwrap();
        store
            .execute_batch("CREATE TABLE t (a INTEGER, b INTEGER); INSERT INTO t VALUES (1, 2);")
            .unwrap();

        assert!(store.table_exists("t").unwrap());
        assert!(!store.table_exists("missing").unwrap());
        assert_eq!(store.row_count("t").unwrap(), 1);
        assert_eq!(store.column_count("t").unwrap(), 2);
    }

    #[test]
    fn test_missing_table_surfaces_engine_error() {
        let store = Store::open_in_memory().unwrap();
        let err = store.query_table("SELECT * FROM nowhere").unwrap_err();
        assert!(matches!(err, StoreError::Engine(_)));
        assert!(err.to_string().contains("nowhere"));
    }

    #[test]
    fn test_read_only_requires_existing_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let result = Store::open_read_only(tmp.path().join("absent.duckdb"));
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }
}
