//! Presentation Layer Tests
//!
//! KPIs, chart series and filters, finding views and CSV export over a
//! loaded store, plus the CLI commands that drive them end to end.

mod fixtures;

use std::fs;

use leakscope::cli::{self, CliErrorCode};
use leakscope::report::{
    encode_csv, write_report_csvs, ChartData, DashboardData, DashboardFilters, FindingStatus,
    Kpis, ReportError,
};
use leakscope::rules::RuleEngine;
use serde_json::json;
use tempfile::TempDir;

use fixtures::{data_dir, db_path, loaded_store, write_dataset, TOTAL_SALES};

// =============================================================================
// KPI Tests
// =============================================================================

#[test]
fn test_kpis_match_orders() {
    let (_tmp, store) = loaded_store();
    let kpis = Kpis::compute(&store).unwrap();

    assert_eq!(kpis.total_orders, store.row_count("orders").unwrap());
    assert_eq!(kpis.total_orders, 6);
    assert_eq!(kpis.total_sales, TOTAL_SALES);
    let avg = kpis.avg_order_value.unwrap();
    assert!((avg - TOTAL_SALES / 6.0).abs() < 1e-9);
}

// =============================================================================
// Chart and Filter Tests
// =============================================================================

#[test]
fn test_charts_unfiltered() {
    let (_tmp, store) = loaded_store();
    let charts = ChartData::compute(&store, &DashboardFilters::default()).unwrap();

    assert_eq!(charts.sales_over_time.len(), 6);
    let dates: Vec<_> = charts
        .sales_over_time
        .iter()
        .map(|p| p.order_date.as_str())
        .collect();
    let mut sorted = dates.clone();
    sorted.sort();
    assert_eq!(dates, sorted);

    let categories: Vec<_> = charts.category_sales.iter().map(|g| g.label.as_str()).collect();
    assert_eq!(categories, vec!["Bakery", "Dairy", "Snacks"]);
    let snacks = charts
        .category_sales
        .iter()
        .find(|g| g.label == "Snacks")
        .unwrap();
    assert_eq!(snacks.total_sales, 250.0);
}

/// Brand filter "xyz" keeps exactly the brands containing xyz in any case.
#[test]
fn test_brand_filter_is_case_insensitive_substring() {
    let (_tmp, store) = loaded_store();
    let filters = DashboardFilters {
        brand: Some("xyz".to_string()),
        ..Default::default()
    };
    let charts = ChartData::compute(&store, &filters).unwrap();

    let mut brands: Vec<_> = charts.brand_sales.iter().map(|g| g.label.as_str()).collect();
    brands.sort();
    assert_eq!(brands, vec!["XYZ Foods", "bestxyz"]);
    // Other series are untouched
    assert_eq!(charts.category_sales.len(), 3);
}

#[test]
fn test_category_and_date_filters() {
    let (_tmp, store) = loaded_store();
    let filters = DashboardFilters {
        category: Some("DAIRY".to_string()),
        start: Some("2024-01-02".to_string()),
        end: Some("2024-01-03".to_string()),
        ..Default::default()
    };
    let charts = ChartData::compute(&store, &filters).unwrap();

    assert_eq!(charts.category_sales.len(), 1);
    assert_eq!(charts.category_sales[0].label, "Dairy");
    let totals: Vec<_> = charts.sales_over_time.iter().map(|p| p.order_total).collect();
    assert_eq!(totals, vec![0.0, -50.0]);
}

#[test]
fn test_bad_date_filter_is_client_error() {
    let (_tmp, store) = loaded_store();
    let filters = DashboardFilters {
        end: Some("next week".to_string()),
        ..Default::default()
    };
    let err = ChartData::compute(&store, &filters).unwrap_err();
    assert!(err.is_client_error());
    assert!(matches!(err, ReportError::InvalidDate { field: "end", .. }));
}

/// Filters narrow charts only; KPIs and findings cover all data.
#[test]
fn test_filters_do_not_touch_kpis_or_findings() {
    let (_tmp, store) = loaded_store();
    let filters = DashboardFilters {
        brand: Some("nothing-matches".to_string()),
        ..Default::default()
    };
    let data = DashboardData::compute(&store, &RuleEngine::default(), &filters).unwrap();

    assert!(data.charts.brand_sales.is_empty());
    assert_eq!(data.kpis.total_orders, 6);
    assert_eq!(data.findings.len(), 5);
    assert!(data
        .findings
        .iter()
        .all(|f| f.status == FindingStatus::Fail));
}

// =============================================================================
// Export Tests
// =============================================================================

#[test]
fn test_csv_header_equals_result_columns() {
    let (_tmp, store) = loaded_store();
    let table = RuleEngine::default()
        .run_rule(&store, "invalid_order_totals")
        .unwrap();

    let csv = String::from_utf8(encode_csv(&table).unwrap()).unwrap();
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some(table.columns.join(",").as_str()));
    assert_eq!(lines.next(), Some("4,C3,0"));
    assert_eq!(lines.next(), Some("5,C4,-50"));
    assert_eq!(lines.next(), None);
}

#[test]
fn test_write_report_csvs() {
    let (tmp, store) = loaded_store();
    let report = RuleEngine::default().run(&store).unwrap();
    let out = tmp.path().join("exports");

    let written = write_report_csvs(&out, &report).unwrap();
    assert_eq!(written.len(), 5);
    assert!(out.join("duplicate_orders.csv").exists());

    let text = fs::read_to_string(out.join("duplicate_orders.csv")).unwrap();
    assert!(text.starts_with("customer_id,order_date,order_total,duplicate_count\n"));
}

// =============================================================================
// CLI Tests
// =============================================================================

fn write_config(tmp: &TempDir) -> std::path::PathBuf {
    let path = tmp.path().join("leakscope.json");
    let config = json!({
        "db_path": db_path(tmp).to_string_lossy(),
        "data_dir": data_dir(tmp).to_string_lossy(),
        "export_dir": tmp.path().join("exports").to_string_lossy(),
    });
    fs::write(&path, config.to_string()).unwrap();
    path
}

#[test]
fn test_cli_load_audit_export() {
    let tmp = TempDir::new().unwrap();
    write_dataset(&data_dir(&tmp));
    let config = write_config(&tmp);

    let loaded = cli::load(&config).unwrap();
    assert_eq!(loaded.tables.len(), 5);

    let report = cli::audit(&config, 3).unwrap();
    assert_eq!(report.failed_count(), 0);
    assert_eq!(report.table("invalid_order_totals").unwrap().len(), 2);

    let custom = tmp.path().join("custom");
    let written = cli::export(&config, Some(custom.as_path())).unwrap();
    assert_eq!(written.len(), 5);
    assert!(custom.join("invalid_order_totals.csv").exists());
    assert!(!tmp.path().join("exports").exists());
}

#[test]
fn test_cli_audit_before_load() {
    let tmp = TempDir::new().unwrap();
    let config = write_config(&tmp);

    let err = cli::audit(&config, 10).unwrap_err();
    assert_eq!(err.code(), &CliErrorCode::AuditFailed);
    assert!(err.to_string().starts_with("LEAK_CLI_AUDIT_FAILED: "));
}
