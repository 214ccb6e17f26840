//! Generic tabular query results
//!
//! A `ResultTable` is what every audit rule returns: ordered column names
//! plus rows of JSON scalars. It is the unit the dashboard renders and
//! the CSV export encodes.

use serde::Serialize;
use serde_json::{Map, Value};

/// Ordered columns and rows produced by a query
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultTable {
    /// Column names in select order
    pub columns: Vec<String>,
    /// Rows, each aligned with `columns`
    pub rows: Vec<Vec<Value>>,
}

impl ResultTable {
    /// Creates a table from columns and rows
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    /// Creates an empty table carrying only a header
    pub fn empty(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Returns true if the query matched nothing
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Position of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value at `row` for the named column
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// All values of one column, top to bottom
    pub fn column_values(&self, column: &str) -> Vec<&Value> {
        match self.column_index(column) {
            Some(idx) => self.rows.iter().filter_map(|r| r.get(idx)).collect(),
            None => Vec::new(),
        }
    }

    /// Rows as JSON objects keyed by column name
    pub fn records(&self) -> Vec<Value> {
        self.rows
            .iter()
            .map(|row| {
                let mut obj = Map::with_capacity(self.columns.len());
                for (col, val) in self.columns.iter().zip(row.iter()) {
                    obj.insert(col.clone(), val.clone());
                }
                Value::Object(obj)
            })
            .collect()
    }

    /// First `n` rows, header preserved
    pub fn head(&self, n: usize) -> ResultTable {
        ResultTable {
            columns: self.columns.clone(),
            rows: self.rows.iter().take(n).cloned().collect(),
        }
    }
}

/// Renders a JSON scalar as a plain cell string
///
/// Strings lose their quotes and nulls become empty cells.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> ResultTable {
        ResultTable::new(
            vec!["order_id".to_string(), "order_total".to_string()],
            vec![
                vec![json!(1), json!(-5.0)],
                vec![json!(2), json!(0)],
            ],
        )
    }

    #[test]
    fn test_empty_keeps_header() {
        let table = ResultTable::empty(vec!["a".to_string()]);
        assert!(table.is_empty());
        assert_eq!(table.columns, vec!["a"]);
    }

    #[test]
    fn test_value_lookup() {
        let table = sample();
        assert_eq!(table.value(1, "order_id"), Some(&json!(2)));
        assert_eq!(table.value(5, "order_id"), None);
        assert_eq!(table.value(0, "missing"), None);
    }

    #[test]
    fn test_records() {
        let records = sample().records();
        assert_eq!(records[0]["order_total"], json!(-5.0));
        assert_eq!(records[1]["order_id"], json!(2));
    }

    #[test]
    fn test_head() {
        let table = sample().head(1);
        assert_eq!(table.len(), 1);
        assert_eq!(table.columns.len(), 2);
    }

    #[test]
    fn test_cell_text() {
        assert_eq!(cell_text(&Value::Null), "");
        assert_eq!(cell_text(&json!("C1")), "C1");
        assert_eq!(cell_text(&json!(0.25)), "0.25");
        assert_eq!(cell_text(&json!(true)), "true");
    }
}
