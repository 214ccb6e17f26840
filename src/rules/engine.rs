//! Rule engine
//!
//! Runs every registered rule against a store and collects one outcome per
//! rule. How a failing rule affects the rest is decided by `FailurePolicy`.

use crate::observability::{log_event_with_fields, Event, ObservationScope};
use crate::store::{ResultTable, Store};

use super::errors::{RuleError, RuleResult};
use super::registry::{self, LeakageRule};

/// What a failing rule does to the batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Report the failure on that rule and keep going
    #[default]
    Isolate,
    /// Abort the batch on the first failure
    FailFast,
}

/// Result of one rule
#[derive(Debug, Clone, PartialEq)]
pub enum RuleOutcome {
    /// Query ran; an empty table means no issues
    Findings(ResultTable),
    /// Query failed; the engine message as-is
    Failed(String),
}

impl RuleOutcome {
    /// The findings table, if the rule ran
    pub fn table(&self) -> Option<&ResultTable> {
        match self {
            RuleOutcome::Findings(table) => Some(table),
            RuleOutcome::Failed(_) => None,
        }
    }

    /// Returns true if the rule ran and found nothing
    pub fn passed(&self) -> bool {
        matches!(self, RuleOutcome::Findings(table) if table.is_empty())
    }

    /// Returns true if the rule could not run
    pub fn is_failed(&self) -> bool {
        matches!(self, RuleOutcome::Failed(_))
    }
}

/// One rule paired with its outcome
#[derive(Debug, Clone, PartialEq)]
pub struct RuleFinding {
    pub rule: LeakageRule,
    pub outcome: RuleOutcome,
}

/// Outcomes of a full rule batch, in registry order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditReport {
    pub findings: Vec<RuleFinding>,
}

impl AuditReport {
    /// Outcome for a rule by name
    pub fn get(&self, name: &str) -> Option<&RuleFinding> {
        self.findings.iter().find(|f| f.rule.name == name)
    }

    /// Findings table for a rule by name, if it ran
    pub fn table(&self, name: &str) -> Option<&ResultTable> {
        self.get(name).and_then(|f| f.outcome.table())
    }

    /// Rule names in report order
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.findings.iter().map(|f| f.rule.name).collect()
    }

    /// Total number of finding rows across rules
    pub fn issue_count(&self) -> usize {
        self.findings
            .iter()
            .filter_map(|f| f.outcome.table())
            .map(ResultTable::len)
            .sum()
    }

    /// Number of rules that could not run
    pub fn failed_count(&self) -> usize {
        self.findings.iter().filter(|f| f.outcome.is_failed()).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuleFinding> {
        self.findings.iter()
    }
}

/// Evaluates an ordered list of rules
#[derive(Debug, Clone)]
pub struct RuleEngine {
    rules: Vec<LeakageRule>,
    policy: FailurePolicy,
}

impl RuleEngine {
    /// Engine over the built-in registry
    pub fn new(policy: FailurePolicy) -> Self {
        Self::with_rules(registry::all().to_vec(), policy)
    }

    /// Engine over an explicit rule list
    pub fn with_rules(rules: Vec<LeakageRule>, policy: FailurePolicy) -> Self {
        Self { rules, policy }
    }

    pub fn rules(&self) -> &[LeakageRule] {
        &self.rules
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Looks up a rule this engine knows
    pub fn find(&self, name: &str) -> Option<&LeakageRule> {
        self.rules.iter().find(|rule| rule.name == name)
    }

    /// Runs every rule.
    ///
    /// Under `Isolate` this only fails if nothing could be attempted;
    /// under `FailFast` the first rule error is returned.
    pub fn run(&self, store: &Store) -> RuleResult<AuditReport> {
        let count = self.rules.len().to_string();
        let scope = ObservationScope::with_fields("AUDIT", &[("rules", count.as_str())]);

        let mut report = AuditReport::default();
        for rule in &self.rules {
            match self.evaluate(store, rule) {
                Ok(table) => report.findings.push(RuleFinding {
                    rule: *rule,
                    outcome: RuleOutcome::Findings(table),
                }),
                Err(err) if self.policy == FailurePolicy::Isolate => {
                    report.findings.push(RuleFinding {
                        rule: *rule,
                        outcome: RuleOutcome::Failed(source_message(&err)),
                    });
                }
                Err(err) => {
                    scope.fail(&err.to_string());
                    return Err(err);
                }
            }
        }

        let issues = report.issue_count().to_string();
        let failed = report.failed_count().to_string();
        scope.complete_with_fields(&[("issues", issues.as_str()), ("failed", failed.as_str())]);
        Ok(report)
    }

    /// Runs one rule by name
    pub fn run_rule(&self, store: &Store, name: &str) -> RuleResult<ResultTable> {
        let rule = self
            .find(name)
            .ok_or_else(|| RuleError::UnknownRule(name.to_string()))?;
        self.evaluate(store, rule)
    }

    fn evaluate(&self, store: &Store, rule: &LeakageRule) -> RuleResult<ResultTable> {
        let order_by = (!rule.order_by.is_empty()).then_some(rule.order_by);
        match store.query_table_ordered(rule.sql, order_by) {
            Ok(table) => {
                let rows = table.len().to_string();
                log_event_with_fields(
                    Event::RuleComplete,
                    &[("rule", rule.name), ("rows", rows.as_str())],
                );
                Ok(table)
            }
            Err(source) => {
                let reason = source.to_string();
                log_event_with_fields(
                    Event::RuleFailed,
                    &[("rule", rule.name), ("reason", reason.as_str())],
                );
                Err(RuleError::Failed {
                    rule: rule.name.to_string(),
                    source,
                })
            }
        }
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(FailurePolicy::default())
    }
}

/// The underlying engine message, without the rule prefix
fn source_message(err: &RuleError) -> String {
    match err {
        RuleError::Failed { source, .. } => source.to_string(),
        other => other.to_string(),
    }
}
