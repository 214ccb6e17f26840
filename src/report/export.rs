//! CSV export of rule findings
//!
//! Header = the result columns, one record per finding. Export files are
//! named `<rule>.csv`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::observability::{log_event_with_fields, Event};
use crate::rules::{AuditReport, LeakageRule};
use crate::store::{cell_text, ResultTable};

use super::errors::{ReportError, ReportResult};

/// MIME type of exported findings
pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// Encodes a result table as UTF-8 CSV
pub fn encode_csv(table: &ResultTable) -> ReportResult<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(cell_text))?;
    }
    writer.flush()?;

    writer.into_inner().map_err(|e| ReportError::Io(e.into_error()))
}

/// Writes one rule's findings to `<dir>/<rule>.csv`
pub fn write_rule_csv(dir: &Path, rule: &LeakageRule, table: &ResultTable) -> ReportResult<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(rule.export_file_name());
    fs::write(&path, encode_csv(table)?)?;

    let path_str = path.display().to_string();
    let rows = table.len().to_string();
    log_event_with_fields(
        Event::ExportWritten,
        &[("rule", rule.name), ("path", path_str.as_str()), ("rows", rows.as_str())],
    );
    Ok(path)
}

/// Writes a CSV for every rule that produced findings.
///
/// Rules that passed or failed to run are skipped.
pub fn write_report_csvs(dir: &Path, report: &AuditReport) -> ReportResult<Vec<PathBuf>> {
    let mut written = Vec::new();
    for finding in report.iter() {
        if let Some(table) = finding.outcome.table().filter(|t| !t.is_empty()) {
            written.push(write_rule_csv(dir, &finding.rule, table)?);
        }
    }
    Ok(written)
}
