//! Aggregate series behind the dashboard charts

use serde::Serialize;

use crate::store::{Store, StoreError};

use super::errors::ReportResult;
use super::filters::{filter_groups, DashboardFilters, DateRange};

/// Label used for a NULL category or brand
pub const UNKNOWN_LABEL: &str = "(unknown)";

/// One order on the sales-over-time line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SalesPoint {
    pub order_date: String,
    pub order_total: f64,
}

/// Summed sales for one category or brand
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupTotal {
    pub label: String,
    pub total_sales: f64,
}

/// Grouping for the bar charts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Category,
    Brand,
}

impl GroupBy {
    fn column(&self) -> &'static str {
        match self {
            GroupBy::Category => "category",
            GroupBy::Brand => "brand",
        }
    }
}

/// One point per order, ordered by date, within `range`
pub fn sales_over_time(store: &Store, range: &DateRange) -> ReportResult<Vec<SalesPoint>> {
    let mut sql = String::from(
        "SELECT CAST(order_date AS VARCHAR), CAST(order_total AS DOUBLE) FROM orders",
    );
    let mut clauses = Vec::new();
    let mut params: Vec<String> = Vec::new();

    if let Some(start) = range.start {
        clauses.push("CAST(order_date AS DATE) >= CAST(? AS DATE)");
        params.push(start.format("%Y-%m-%d").to_string());
    }
    if let Some(end) = range.end {
        clauses.push("CAST(order_date AS DATE) <= CAST(? AS DATE)");
        params.push(end.format("%Y-%m-%d").to_string());
    }
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY order_date, order_id");

    let mut stmt = store.connection().prepare(&sql).map_err(StoreError::from)?;
    let points = stmt
        .query_map(duckdb::params_from_iter(params.iter()), |row| {
            Ok(SalesPoint {
                order_date: row.get::<_, Option<String>>(0)?.unwrap_or_default(),
                order_total: row.get::<_, Option<f64>>(1)?.unwrap_or(0.0),
            })
        })
        .map_err(StoreError::from)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(StoreError::from)?;

    Ok(points)
}

/// Sales summed per category or brand over `transactions_base`
pub fn sales_by(store: &Store, group: GroupBy) -> ReportResult<Vec<GroupTotal>> {
    let column = group.column();
    let sql = format!(
        "SELECT CAST({column} AS VARCHAR), CAST(SUM(order_total) AS DOUBLE)
         FROM transactions_base
         GROUP BY {column}
         ORDER BY {column}"
    );

    let mut stmt = store.connection().prepare(&sql).map_err(StoreError::from)?;
    let groups = stmt
        .query_map([], |row| {
            Ok(GroupTotal {
                label: row
                    .get::<_, Option<String>>(0)?
                    .unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
                total_sales: row.get::<_, Option<f64>>(1)?.unwrap_or(0.0),
            })
        })
        .map_err(StoreError::from)?
        .collect::<Result<Vec<_>, _>>()
        .map_err(StoreError::from)?;

    Ok(groups)
}

/// The three chart series, filters applied
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub sales_over_time: Vec<SalesPoint>,
    pub category_sales: Vec<GroupTotal>,
    pub brand_sales: Vec<GroupTotal>,
}

impl ChartData {
    pub fn compute(store: &Store, filters: &DashboardFilters) -> ReportResult<Self> {
        let range = filters.date_range()?;
        Ok(Self {
            sales_over_time: sales_over_time(store, &range)?,
            category_sales: filter_groups(
                sales_by(store, GroupBy::Category)?,
                filters.category_needle(),
            ),
            brand_sales: filter_groups(sales_by(store, GroupBy::Brand)?, filters.brand_needle()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn store() -> Store {
        let store = Store::open_in_memory().unwrap();
        store
            .execute_batch(
                "CREATE TABLE orders (order_id INTEGER, order_date DATE, order_total DOUBLE);
                 INSERT INTO orders VALUES
                    (2, DATE '2024-01-03', 30.0),
                    (1, DATE '2024-01-01', 10.0),
                    (3, DATE '2024-01-05', 50.0);
                 CREATE VIEW transactions_base AS
                    SELECT order_id, order_total,
                           CASE WHEN order_id = 3 THEN NULL ELSE 'Dairy' END AS category,
                           'Brand' || order_id AS brand
                    FROM orders;",
            )
            .unwrap();
        store
    }

    #[test]
    fn test_sales_over_time_ordered() {
        let points = sales_over_time(&store(), &DateRange::default()).unwrap();
        let dates: Vec<_> = points.iter().map(|p| p.order_date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-01-03", "2024-01-05"]);
    }

    #[test]
    fn test_sales_over_time_date_range() {
        let range = DateRange {
            start: NaiveDate::from_ymd_opt(2024, 1, 2),
            end: NaiveDate::from_ymd_opt(2024, 1, 5),
        };
        let points = sales_over_time(&store(), &range).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].order_total, 30.0);
    }

    #[test]
    fn test_sales_by_category_handles_null() {
        let groups = sales_by(&store(), GroupBy::Category).unwrap();
        assert_eq!(groups.len(), 2);
        let dairy = groups.iter().find(|g| g.label == "Dairy").unwrap();
        assert_eq!(dairy.total_sales, 40.0);
        assert!(groups.iter().any(|g| g.label == UNKNOWN_LABEL));
    }

    #[test]
    fn test_chart_data_applies_brand_filter() {
        let filters = DashboardFilters {
            brand: Some("BRAND2".to_string()),
            ..Default::default()
        };
        let charts = ChartData::compute(&store(), &filters).unwrap();
        assert_eq!(charts.brand_sales.len(), 1);
        assert_eq!(charts.brand_sales[0].label, "Brand2");
        assert_eq!(charts.sales_over_time.len(), 3);
    }
}
