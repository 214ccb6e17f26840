//! Dashboard HTTP Routes
//!
//! HTML page, KPIs, rule findings with CSV export, and chart series.
//! Every request re-runs its queries against the shared read-only store.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::report::{
    encode_csv, filter_groups, sales_by, sales_over_time, DashboardData, DashboardFilters,
    FindingView, GroupBy, GroupTotal, Kpis, SalesPoint, CSV_CONTENT_TYPE,
};
use crate::rules::{FailurePolicy, RuleEngine, RuleError, RuleFinding, RuleOutcome};
use crate::store::{Store, StoreError};

use super::errors::{HttpError, HttpResult};
use super::page::render_dashboard;

// ==================
// Shared State
// ==================

/// Store and rule engine shared across handlers
pub struct DashboardState {
    store: Mutex<Store>,
    engine: RuleEngine,
}

impl DashboardState {
    pub fn new(store: Store, engine: RuleEngine) -> Self {
        Self {
            store: Mutex::new(store),
            engine,
        }
    }

    pub fn engine(&self) -> &RuleEngine {
        &self.engine
    }

    /// Runs `f` with the store locked. The guard never outlives `f`.
    fn with_store<T>(&self, f: impl FnOnce(&Store) -> HttpResult<T>) -> HttpResult<T> {
        let store = self.store.lock().map_err(|_| StoreError::Poisoned)?;
        f(&store)
    }
}

// ==================
// Response Types
// ==================

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// ==================
// Router
// ==================

/// Create dashboard routes
pub fn dashboard_routes(state: Arc<DashboardState>) -> Router {
    Router::new()
        .route("/", get(dashboard_handler))
        .route("/health", get(health_handler))
        .route("/api/kpis", get(kpis_handler))
        .route("/api/findings", get(findings_handler))
        .route("/api/findings/:rule", get(finding_handler))
        .route("/api/findings/:rule/export", get(export_handler))
        .route("/api/charts/sales", get(sales_chart_handler))
        .route("/api/charts/categories", get(category_chart_handler))
        .route("/api/charts/brands", get(brand_chart_handler))
        .with_state(state)
}

// ==================
// Handlers
// ==================

async fn dashboard_handler(
    State(state): State<Arc<DashboardState>>,
    Query(filters): Query<DashboardFilters>,
) -> HttpResult<Html<String>> {
    let data = state.with_store(|store| {
        Ok(DashboardData::compute(store, &state.engine, &filters)?)
    })?;
    Ok(Html(render_dashboard(&data, &filters)))
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn kpis_handler(State(state): State<Arc<DashboardState>>) -> HttpResult<Json<Kpis>> {
    let kpis = state.with_store(|store| Ok(Kpis::compute(store)?))?;
    Ok(Json(kpis))
}

async fn findings_handler(
    State(state): State<Arc<DashboardState>>,
) -> HttpResult<Json<Vec<FindingView>>> {
    let report = state.with_store(|store| Ok(state.engine.run(store)?))?;
    Ok(Json(report.iter().map(FindingView::from).collect()))
}

async fn finding_handler(
    State(state): State<Arc<DashboardState>>,
    Path(rule): Path<String>,
) -> HttpResult<Json<FindingView>> {
    let finding = state.with_store(|store| single_finding(store, &state.engine, &rule))?;
    Ok(Json(FindingView::from(&finding)))
}

async fn export_handler(
    State(state): State<Arc<DashboardState>>,
    Path(rule): Path<String>,
) -> HttpResult<impl IntoResponse> {
    let (file_name, body) = state.with_store(|store| {
        let found = state
            .engine
            .find(&rule)
            .ok_or_else(|| HttpError::UnknownRule(rule.clone()))?;
        let table = state.engine.run_rule(store, &rule)?;
        Ok((found.export_file_name(), encode_csv(&table)?))
    })?;

    let headers = [
        (header::CONTENT_TYPE, CSV_CONTENT_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", file_name),
        ),
    ];
    Ok((headers, body))
}

async fn sales_chart_handler(
    State(state): State<Arc<DashboardState>>,
    Query(filters): Query<DashboardFilters>,
) -> HttpResult<Json<Vec<SalesPoint>>> {
    let range = filters.date_range()?;
    let points = state.with_store(|store| Ok(sales_over_time(store, &range)?))?;
    Ok(Json(points))
}

async fn category_chart_handler(
    State(state): State<Arc<DashboardState>>,
    Query(filters): Query<DashboardFilters>,
) -> HttpResult<Json<Vec<GroupTotal>>> {
    let groups = state.with_store(|store| Ok(sales_by(store, GroupBy::Category)?))?;
    Ok(Json(filter_groups(groups, filters.category_needle())))
}

async fn brand_chart_handler(
    State(state): State<Arc<DashboardState>>,
    Query(filters): Query<DashboardFilters>,
) -> HttpResult<Json<Vec<GroupTotal>>> {
    let groups = state.with_store(|store| Ok(sales_by(store, GroupBy::Brand)?))?;
    Ok(Json(filter_groups(groups, filters.brand_needle())))
}

/// One rule's outcome, honoring the engine's failure policy
fn single_finding(store: &Store, engine: &RuleEngine, name: &str) -> HttpResult<RuleFinding> {
    let rule = *engine
        .find(name)
        .ok_or_else(|| HttpError::UnknownRule(name.to_string()))?;

    let outcome = match engine.run_rule(store, name) {
        Ok(table) => RuleOutcome::Findings(table),
        Err(RuleError::Failed { source, .. }) if engine.policy() == FailurePolicy::Isolate => {
            RuleOutcome::Failed(source.to_string())
        }
        Err(err) => return Err(err.into()),
    };

    Ok(RuleFinding { rule, outcome })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: "ok".to_string(),
            version: "0.1.0".to_string(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("ok"));
    }

    #[test]
    fn test_single_finding_unknown_rule() {
        let store = Store::open_in_memory().unwrap();
        let err = single_finding(&store, &RuleEngine::default(), "price_gouging").unwrap_err();
        assert!(matches!(err, HttpError::UnknownRule(_)));
    }

    #[test]
    fn test_single_finding_isolates_failure() {
        let store = Store::open_in_memory().unwrap();
        let finding =
            single_finding(&store, &RuleEngine::default(), "invalid_order_totals").unwrap();
        assert!(finding.outcome.is_failed());

        let strict = RuleEngine::new(FailurePolicy::FailFast);
        let err = single_finding(&store, &strict, "invalid_order_totals").unwrap_err();
        assert!(matches!(err, HttpError::RuleFailed(_)));
    }
}
