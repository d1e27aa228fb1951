use crate::domains::report::types::{ReportQuery, ReportType};
use crate::errors::{DomainError, ServiceError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Content type for the spreadsheet-labeled export
pub const XLS_CONTENT_TYPE: &str = "application/vnd.ms-excel";

/// Export formats supported by the export endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Csv,
    /// Same delimited-text bytes as `Csv` under a spreadsheet content type
    Xls,
    Pdf,
}

impl ExportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "csv" => Some(ExportFormat::Csv),
            "xls" => Some(ExportFormat::Xls),
            "pdf" => Some(ExportFormat::Pdf),
            _ => None,
        }
    }

    /// Get file extension for this format
    pub fn file_extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xls => "xls",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// Declared content type of the response body
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Xls => XLS_CONTENT_TYPE,
            ExportFormat::Pdf => "application/pdf",
        }
    }

    pub fn is_delimited_text(&self) -> bool {
        matches!(self, ExportFormat::Csv | ExportFormat::Xls)
    }
}

/// Failure taxonomy for report and export requests
#[derive(Debug, Clone, Error, Serialize)]
pub enum ExportError {
    /// Unsupported type/format or malformed filter; the caller must fix the input
    #[error("Invalid report request: {0}")]
    InvalidRequest(String),

    /// A source store query failed; safe to retry
    #[error("Report aggregation failed: {0}")]
    Aggregation(String),

    /// The summary could not be written in the requested text encoding
    #[error("Report encoding failed: {0}")]
    Encoding(String),

    /// No usable browser executable could be resolved
    #[error("PDF renderer is not configured: {0}")]
    RenderConfiguration(String),

    /// A browser was found but launching, loading or capturing failed
    #[error("PDF rendering failed: {0}")]
    RenderExecution(String),
}

impl ExportError {
    /// HTTP status the error maps to at the API boundary
    pub fn status_code(&self) -> u16 {
        match self {
            ExportError::InvalidRequest(_) => 400,
            ExportError::Aggregation(_)
            | ExportError::Encoding(_)
            | ExportError::RenderConfiguration(_)
            | ExportError::RenderExecution(_) => 500,
        }
    }

    /// Short, client-facing summary for the error envelope
    pub fn summary(&self) -> &'static str {
        match self {
            ExportError::InvalidRequest(_) => "Invalid report request",
            ExportError::Aggregation(_) => "Error generating report",
            ExportError::Encoding(_) => "Error encoding report",
            ExportError::RenderConfiguration(_) => "PDF export is not available on this server",
            ExportError::RenderExecution(_) => "Error rendering PDF report",
        }
    }

    /// Underlying detail without the summary prefix
    pub fn detail(&self) -> &str {
        match self {
            ExportError::InvalidRequest(detail)
            | ExportError::Aggregation(detail)
            | ExportError::Encoding(detail)
            | ExportError::RenderConfiguration(detail)
            | ExportError::RenderExecution(detail) => detail,
        }
    }
}

impl From<ServiceError> for ExportError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(DomainError::Validation(e)) => ExportError::InvalidRequest(e.to_string()),
            other => ExportError::Aggregation(other.to_string()),
        }
    }
}

/// Raw export parameters as received from the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportRequest {
    pub report_type: Option<String>,
    pub format: Option<String>,
    pub query: ReportQuery,
}

impl ExportRequest {
    /// Validate `type` and `format`. A missing format defaults to CSV; a
    /// missing type is rejected like any unsupported one.
    pub fn validate(&self) -> Result<(ReportType, ExportFormat), ExportError> {
        let raw_type = self.report_type.as_deref().unwrap_or_default();
        let report_type = ReportType::from_str(raw_type).ok_or_else(|| {
            ExportError::InvalidRequest(format!("Unsupported report type '{}'", raw_type))
        })?;

        let format = match self.format.as_deref() {
            None => ExportFormat::default(),
            Some(raw) => ExportFormat::from_str(raw).ok_or_else(|| {
                ExportError::InvalidRequest(format!("Unsupported export format '{}'", raw))
            })?,
        };

        Ok((report_type, format))
    }
}

/// Fully buffered export ready to be framed as an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub bytes: Vec<u8>,
    pub content_type: &'static str,
    pub filename: String,
}

impl ExportFile {
    pub fn content_length(&self) -> usize {
        self.bytes.len()
    }
}

/// `<type>-report-<YYYY-MM-DD>.<ext>`
pub fn export_filename(report_type: ReportType, format: ExportFormat, date: NaiveDate) -> String {
    format!(
        "{}-report-{}.{}",
        report_type.as_str(),
        date.format("%Y-%m-%d"),
        format.file_extension()
    )
}
