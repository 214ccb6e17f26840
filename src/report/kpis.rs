//! Headline metrics over the orders table

use serde::Serialize;

use crate::store::{Store, StoreError};

use super::errors::ReportResult;

const KPI_SQL: &str = "SELECT
        COUNT(*),
        CAST(COALESCE(SUM(order_total), 0) AS DOUBLE),
        CAST(AVG(order_total) AS DOUBLE)
    FROM orders";

/// Order count, revenue and average order value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub total_orders: u64,
    pub total_sales: f64,
    /// Absent when there are no orders
    pub avg_order_value: Option<f64>,
}

impl Kpis {
    /// Computes KPIs over every loaded order
    pub fn compute(store: &Store) -> ReportResult<Self> {
        let (count, sum, avg): (i64, f64, Option<f64>) =
            store
                .connection()
                .query_row(KPI_SQL, [], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))
                .map_err(StoreError::from)?;

        Ok(Self {
            total_orders: count.max(0) as u64,
            total_sales: sum,
            avg_order_value: avg,
        })
    }
}

/// Formats an integer count with thousands separators
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Formats a money amount rounded to whole units, e.g. `₹1,234`
pub fn format_currency(value: f64) -> String {
    let rounded = value.round();
    let digits = group_thousands(&format!("{:.0}", rounded.abs()));
    if rounded < 0.0 {
        format!("-₹{digits}")
    } else {
        format!("₹{digits}")
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
