//! Presentation layer
//!
//! Everything the dashboard shows, computed from a read-only store:
//! - KPIs over `orders`
//! - Per-rule pass/fail findings and their CSV export
//! - Three chart series with display-only filters
//! - SVG rendering of those charts

mod charts;
mod errors;
mod export;
mod filters;
mod findings;
mod kpis;
pub mod svg;

pub use charts::{sales_by, sales_over_time, ChartData, GroupBy, GroupTotal, SalesPoint, UNKNOWN_LABEL};
pub use errors::{ReportError, ReportResult};
pub use export::{encode_csv, write_report_csvs, write_rule_csv, CSV_CONTENT_TYPE};
pub use filters::{contains_ci, filter_groups, DashboardFilters, DateRange};
pub use findings::{finding_views, FindingStatus, FindingView};
pub use kpis::{format_count, format_currency, Kpis};

use serde::Serialize;

use crate::rules::RuleEngine;
use crate::store::Store;

/// Everything one dashboard render needs
#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    pub kpis: Kpis,
    pub findings: Vec<FindingView>,
    pub charts: ChartData,
}

impl DashboardData {
    /// Runs KPIs, every rule and the chart queries against `store`.
    ///
    /// Filters only narrow the charts.
    pub fn compute(
        store: &Store,
        engine: &RuleEngine,
        filters: &DashboardFilters,
    ) -> ReportResult<Self> {
        let charts = ChartData::compute(store, filters)?;
        let kpis = Kpis::compute(store)?;
        let report = engine.run(store)?;

        Ok(Self {
            kpis,
            findings: finding_views(&report),
            charts,
        })
    }
}
