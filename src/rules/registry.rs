//! The leakage rule registry
//!
//! Each rule is a read-only query over the loaded tables. Rules are
//! independent: none reads another's output, and their order here is only
//! the order they are reported in.

/// A named audit query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeakageRule {
    /// Stable identifier, also the export file stem
    pub name: &'static str,
    /// Display title
    pub title: &'static str,
    /// What a finding means
    pub description: &'static str,
    /// Table or view the query reads
    pub source: &'static str,
    /// Query returning one row per finding
    pub sql: &'static str,
    /// Ordering applied to the findings
    pub order_by: &'static str,
}

impl LeakageRule {
    /// File name used when the findings are exported
    pub fn export_file_name(&self) -> String {
        format!("{}.csv", self.name)
    }
}

pub const MISAPPLIED_DISCOUNTS: LeakageRule = LeakageRule {
    name: "misapplied_discounts",
    title: "Misapplied Discounts",
    description: "Line items sold below half of MRP",
    source: "transactions_base",
    sql: "SELECT
            t.order_id, t.product_id, t.unit_price, t.mrp, t.quantity,
            (t.mrp - t.unit_price) * t.quantity AS discount_loss
        FROM transactions_base t
        WHERE t.unit_price < t.mrp * 0.5",
    order_by: "order_id, product_id",
};

pub const INVALID_ORDER_TOTALS: LeakageRule = LeakageRule {
    name: "invalid_order_totals",
    title: "Invalid Order Totals",
    description: "Orders with a zero or negative total",
    source: "orders",
    sql: "SELECT order_id, customer_id, order_total
        FROM orders
        WHERE order_total <= 0",
    order_by: "order_id",
};

pub const DUPLICATE_ORDERS: LeakageRule = LeakageRule {
    name: "duplicate_orders",
    title: "Duplicate Orders",
    description: "Same customer, same day, same amount more than once",
    source: "orders",
    sql: "SELECT customer_id, order_date, order_total, COUNT(*) AS duplicate_count
        FROM orders
        GROUP BY customer_id, order_date, order_total
        HAVING COUNT(*) > 1",
    order_by: "customer_id, order_date, order_total",
};

pub const INVENTORY_SHRINKAGE: LeakageRule = LeakageRule {
    name: "inventory_shrinkage",
    title: "Inventory Shrinkage",
    description: "Damaged stock above 20% of stock received",
    source: "inventory",
    sql: "SELECT product_id, date, stock_received, damaged_stock,
               damaged_stock * 1.0 / NULLIF(stock_received, 0) AS shrinkage_ratio
        FROM inventory
        WHERE stock_received > 0
          AND damaged_stock > stock_received * 0.2",
    order_by: "product_id, date",
};

pub const DELAYED_DELIVERIES: LeakageRule = LeakageRule {
    name: "delayed_deliveries",
    title: "Delayed Deliveries",
    description: "Deliveries completed after the promised time",
    source: "delivery_performance",
    sql: "SELECT order_id, promised_time, actual_time, delivery_time_minutes, reasons_if_delayed
        FROM delivery_performance
        WHERE actual_time > promised_time",
    order_by: "order_id, promised_time",
};

/// Every rule, in report order
pub const RULES: [LeakageRule; 5] = [
    MISAPPLIED_DISCOUNTS,
    INVALID_ORDER_TOTALS,
    DUPLICATE_ORDERS,
    INVENTORY_SHRINKAGE,
    DELAYED_DELIVERIES,
];

/// Every registered rule
pub fn all() -> &'static [LeakageRule] {
    &RULES
}

/// Looks up a rule by name
pub fn find(name: &str) -> Option<&'static LeakageRule> {
    RULES.iter().find(|rule| rule.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_rule_names_unique() {
        let names: HashSet<_> = all().iter().map(|r| r.name).collect();
        assert_eq!(names.len(), RULES.len());
    }

    #[test]
    fn test_rule_order() {
        let names: Vec<_> = all().iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![
                "misapplied_discounts",
                "invalid_order_totals",
                "duplicate_orders",
                "inventory_shrinkage",
                "delayed_deliveries",
            ]
        );
    }

    #[test]
    fn test_find() {
        assert_eq!(find("duplicate_orders"), Some(&DUPLICATE_ORDERS));
        assert!(find("nope").is_none());
    }

    #[test]
    fn test_sql_reads_declared_source() {
        for rule in all() {
            assert!(rule.sql.contains(rule.source), "{} reads {}", rule.name, rule.source);
        }
    }

    #[test]
    fn test_export_file_name() {
        assert_eq!(
            INVENTORY_SHRINKAGE.export_file_name(),
            "inventory_shrinkage.csv"
        );
    }
}
