//! Leakage Rule Engine
//!
//! Five fixed audit queries over the loaded store:
//!
//! 1. misapplied_discounts: unit_price below half of MRP
//! 2. invalid_order_totals: order_total <= 0
//! 3. duplicate_orders: same customer, date and total more than once
//! 4. inventory_shrinkage: damaged stock above 20% of received
//! 5. delayed_deliveries: actual_time after promised_time
//!
//! Rules are stateless and read-only. An empty result means no issues.

mod engine;
mod errors;
mod registry;

pub use engine::{AuditReport, FailurePolicy, RuleEngine, RuleFinding, RuleOutcome};
pub use errors::{RuleError, RuleResult};
pub use registry::{
    all, find, LeakageRule, DELAYED_DELIVERIES, DUPLICATE_ORDERS, INVALID_ORDER_TOTALS,
    INVENTORY_SHRINKAGE, MISAPPLIED_DISCOUNTS, RULES,
};
