//! # leakscope HTTP Server Module
//!
//! Axum server for the leakage dashboard. Reads a loaded store, never
//! writes it.
//!
//! # Endpoints
//!
//! - `/` - HTML dashboard
//! - `/health` - Health check
//! - `/api/kpis` - Headline metrics
//! - `/api/findings[/:rule[/export]]` - Rule findings and CSV export
//! - `/api/charts/{sales,categories,brands}` - Chart series

pub mod config;
pub mod errors;
mod page;
pub mod routes;
pub mod server;

pub use config::HttpServerConfig;
pub use errors::{ErrorResponse, HttpError, HttpResult};
pub use page::render_dashboard;
pub use routes::{dashboard_routes, DashboardState, HealthResponse};
pub use server::HttpServer;
