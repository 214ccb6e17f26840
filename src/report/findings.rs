//! Per-rule pass/fail view of an audit report

use serde::Serialize;
use serde_json::Value;

use crate::rules::{AuditReport, RuleFinding, RuleOutcome};

/// Rendered status of one rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingStatus {
    /// Ran and found nothing
    Pass,
    /// Ran and found issues
    Fail,
    /// Could not run
    Error,
}

impl FindingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingStatus::Pass => "pass",
            FindingStatus::Fail => "fail",
            FindingStatus::Error => "error",
        }
    }
}

/// Serializable summary of one rule's outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FindingView {
    pub rule: String,
    pub title: String,
    pub description: String,
    pub status: FindingStatus,
    pub issue_count: usize,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&RuleFinding> for FindingView {
    fn from(finding: &RuleFinding) -> Self {
        let rule = &finding.rule;
        let (status, columns, rows, error) = match &finding.outcome {
            RuleOutcome::Findings(table) if table.is_empty() => {
                (FindingStatus::Pass, table.columns.clone(), Vec::new(), None)
            }
            RuleOutcome::Findings(table) => (
                FindingStatus::Fail,
                table.columns.clone(),
                table.rows.clone(),
                None,
            ),
            RuleOutcome::Failed(msg) => (FindingStatus::Error, Vec::new(), Vec::new(), Some(msg.clone())),
        };

        Self {
            rule: rule.name.to_string(),
            title: rule.title.to_string(),
            description: rule.description.to_string(),
            status,
            issue_count: rows.len(),
            columns,
            rows,
            error,
        }
    }
}

/// Views for every rule, in report order
pub fn finding_views(report: &AuditReport) -> Vec<FindingView> {
    report.iter().map(FindingView::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{DUPLICATE_ORDERS, INVALID_ORDER_TOTALS, INVENTORY_SHRINKAGE};
    use crate::store::ResultTable;
    use serde_json::json;

    fn report() -> AuditReport {
        AuditReport {
            findings: vec![
                RuleFinding {
                    rule: INVALID_ORDER_TOTALS,
                    outcome: RuleOutcome::Findings(ResultTable::new(
                        vec!["order_id".to_string()],
                        vec![vec![json!(1)], vec![json!(2)]],
                    )),
                },
                RuleFinding {
                    rule: DUPLICATE_ORDERS,
                    outcome: RuleOutcome::Findings(ResultTable::empty(vec![
                        "customer_id".to_string()
                    ])),
                },
                RuleFinding {
                    rule: INVENTORY_SHRINKAGE,
                    outcome: RuleOutcome::Failed("Table inventory does not exist".to_string()),
                },
            ],
        }
    }

    #[test]
    fn test_statuses() {
        let views = finding_views(&report());
        assert_eq!(views[0].status, FindingStatus::Fail);
        assert_eq!(views[0].issue_count, 2);
        assert_eq!(views[1].status, FindingStatus::Pass);
        assert_eq!(views[1].columns, vec!["customer_id"]);
        assert_eq!(views[2].status, FindingStatus::Error);
        assert!(views[2].error.as_deref().unwrap().contains("inventory"));
    }

    #[test]
    fn test_serialization() {
        let views = finding_views(&report());
        let json = serde_json::to_value(&views).unwrap();
        assert_eq!(json[0]["status"], "fail");
        assert_eq!(json[1]["status"], "pass");
        assert!(json[1].get("error").is_none());
        assert_eq!(json[2]["status"], "error");
    }
}
