//! Display-only dashboard filters
//!
//! Filters narrow what is rendered; they never touch the loaded tables.
//! Empty or whitespace-only inputs are no-ops.

use chrono::NaiveDate;
use serde::Deserialize;

use super::charts::GroupTotal;
use super::errors::{ReportError, ReportResult};

/// Filter inputs as submitted from the dashboard form or query string
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DashboardFilters {
    /// Inclusive start date, `YYYY-MM-DD`
    #[serde(default)]
    pub start: Option<String>,
    /// Inclusive end date, `YYYY-MM-DD`
    #[serde(default)]
    pub end: Option<String>,
    /// Case-insensitive category substring
    #[serde(default)]
    pub category: Option<String>,
    /// Case-insensitive brand substring
    #[serde(default)]
    pub brand: Option<String>,
}

impl DashboardFilters {
    /// Parsed date range; both ends optional
    pub fn date_range(&self) -> ReportResult<DateRange> {
        let start = parse_date("start", self.start.as_deref())?;
        let end = parse_date("end", self.end.as_deref())?;

        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(ReportError::InvertedRange {
                    start: s.to_string(),
                    end: e.to_string(),
                });
            }
        }

        Ok(DateRange { start, end })
    }

    pub fn category_needle(&self) -> Option<&str> {
        non_empty(self.category.as_deref())
    }

    pub fn brand_needle(&self) -> Option<&str> {
        non_empty(self.brand.as_deref())
    }

    /// Trimmed value for echoing back into the form
    pub fn field(&self, name: &str) -> &str {
        let value = match name {
            "start" => self.start.as_deref(),
            "end" => self.end.as_deref(),
            "category" => self.category.as_deref(),
            "brand" => self.brand.as_deref(),
            _ => None,
        };
        value.map(str::trim).unwrap_or("")
    }
}

/// Inclusive date bounds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_date(field: &'static str, value: Option<&str>) -> ReportResult<Option<NaiveDate>> {
    match non_empty(value) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ReportError::InvalidDate {
                field,
                value: raw.to_string(),
            }),
    }
}

/// Case-insensitive substring test
pub fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Keeps groups whose label contains `needle`, ignoring case
pub fn filter_groups(groups: Vec<GroupTotal>, needle: Option<&str>) -> Vec<GroupTotal> {
    match needle {
        None => groups,
        Some(needle) => groups
            .into_iter()
            .filter(|g| contains_ci(&g.label, needle))
            .collect(),
    }
}
