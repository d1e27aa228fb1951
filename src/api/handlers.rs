use crate::api::error::ApiError;
use crate::api::AppState;
use crate::auth::AuthContext;
use crate::domains::export::types::{ExportError, ExportRequest};
use crate::domains::report::types::{ReportQuery, ReportSummary};
use crate::validation::non_blank;
use axum::extract::{Extension, Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

/// Query string shared by the report endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportParams {
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(rename = "programId")]
    pub program_id: Option<String>,
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub report_type: Option<String>,
    pub format: Option<String>,
}

impl ReportParams {
    /// Filters with blank values dropped. Values are passed on untrimmed so
    /// the summary echoes `from`/`to` exactly as sent.
    pub fn to_query(&self) -> ReportQuery {
        ReportQuery {
            from: non_blank(self.from.clone()),
            to: non_blank(self.to.clone()),
            program_id: non_blank(self.program_id.clone()),
            search: non_blank(self.search.clone()),
        }
    }

    pub fn to_export_request(&self) -> ExportRequest {
        ExportRequest {
            report_type: non_blank(self.report_type.clone()).map(|v| v.trim().to_string()),
            format: non_blank(self.format.clone()).map(|v| v.trim().to_string()),
            query: self.to_query(),
        }
    }
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// `GET /reports/overview`
pub async fn overview(
    State(state): State<AppState>,
    auth: Option<Extension<AuthContext>>,
    Query(params): Query<ReportParams>,
) -> Result<Json<ReportSummary>, ApiError> {
    let query = params.to_query();
    let summary = state
        .reports
        .overview(&query, auth.as_ref().map(|ext| &ext.0))
        .await
        .map_err(ExportError::from)?;
    Ok(Json(summary))
}

/// `GET /reports/export`
pub async fn export(
    State(state): State<AppState>,
    auth: Option<Extension<AuthContext>>,
    Query(params): Query<ReportParams>,
) -> Result<Response, ApiError> {
    let request = params.to_export_request();
    let file = state
        .exports
        .export(&request, auth.as_ref().map(|ext| &ext.0))
        .await?;

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", file.filename))
        .map_err(|e| ApiError::Internal(format!("Invalid attachment filename '{}': {}", file.filename, e)))?;

    let headers = [
        (header::CONTENT_TYPE, HeaderValue::from_static(file.content_type)),
        (header::CONTENT_DISPOSITION, disposition),
        (header::CONTENT_LENGTH, HeaderValue::from(file.content_length())),
    ];

    Ok((StatusCode::OK, headers, file.bytes).into_response())
}
