//! leakscope - revenue leakage audits over e-commerce sales data
//!
//! CSV files are bulk-loaded into an embedded DuckDB store, five fixed
//! audit rules run against it, and the results are served as KPIs,
//! per-rule findings with CSV export, and three charts.

pub mod cli;
pub mod http_server;
pub mod loader;
pub mod observability;
pub mod report;
pub mod rules;
pub mod store;
