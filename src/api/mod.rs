pub mod error;
pub mod handlers;

pub use error::{ApiError, ErrorEnvelope};
pub use handlers::ReportParams;

use crate::domains::export::service::ExportService;
use crate::domains::report::service::ReportService;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;

/// Services shared by every request
#[derive(Clone)]
pub struct AppState {
    pub reports: Arc<dyn ReportService>,
    pub exports: Arc<dyn ExportService>,
}

impl AppState {
    pub fn new(reports: Arc<dyn ReportService>, exports: Arc<dyn ExportService>) -> Self {
        Self { reports, exports }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/reports/overview", get(handlers::overview))
        .route("/reports/export", get(handlers::export))
        .with_state(state)
}
