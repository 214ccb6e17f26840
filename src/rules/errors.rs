//! Rule engine error types

use thiserror::Error;

use crate::store::StoreError;

/// Result type for rule evaluation
pub type RuleResult<T> = Result<T, RuleError>;

/// Errors raised while evaluating leakage rules
#[derive(Debug, Error)]
pub enum RuleError {
    /// No rule registered under this name
    #[error("Unknown rule: {0}")]
    UnknownRule(String),

    /// Rule query failed; the engine message is kept as-is
    #[error("Rule '{rule}' failed: {source}")]
    Failed {
        rule: String,
        #[source]
        source: StoreError,
    },
}

impl RuleError {
    /// Name of the rule involved
    pub fn rule(&self) -> &str {
        match self {
            RuleError::UnknownRule(rule) => rule,
            RuleError::Failed { rule, .. } => rule,
        }
    }
}
