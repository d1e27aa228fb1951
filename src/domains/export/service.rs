use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

use crate::auth::AuthContext;
use crate::domains::export::renderer::DocumentRenderer;
use crate::domains::export::types::{export_filename, ExportError, ExportFile, ExportFormat, ExportRequest};
use crate::domains::export::writers::SummaryCsvWriter;
use crate::domains::report::service::ReportService;

/// Trait defining export operations
#[async_trait]
pub trait ExportService: Send + Sync {
    /// Validate the request, aggregate once and encode the result as a file.
    async fn export(&self, request: &ExportRequest, auth: Option<&AuthContext>) -> Result<ExportFile, ExportError>;
}

pub struct ExportServiceImpl {
    reports: Arc<dyn ReportService>,
    csv_writer: SummaryCsvWriter,
    renderer: DocumentRenderer,
}

impl ExportServiceImpl {
    pub fn new(reports: Arc<dyn ReportService>, renderer: DocumentRenderer) -> Self {
        Self {
            reports,
            csv_writer: SummaryCsvWriter::default(),
            renderer,
        }
    }
}

#[async_trait]
impl ExportService for ExportServiceImpl {
    async fn export(&self, request: &ExportRequest, auth: Option<&AuthContext>) -> Result<ExportFile, ExportError> {
        // Reject bad input before touching any store
        let (report_type, format) = request.validate()?;

        let summary = self.reports.overview(&request.query, auth).await.map_err(|e| {
            let err = ExportError::from(e);
            log::error!("Export aggregation failed: {}", err);
            err
        })?;

        let (bytes, filename) = match format {
            ExportFormat::Csv | ExportFormat::Xls => {
                let bytes = self.csv_writer.write(&summary, format)?;
                (bytes, export_filename(report_type, format, Utc::now().date_naive()))
            }
            ExportFormat::Pdf => {
                let document = self.renderer.render(&summary, report_type).await?;
                (document.bytes, document.filename)
            }
        };

        log::info!("Exported {} report as {} ({} bytes)", report_type, filename, bytes.len());
        Ok(ExportFile {
            bytes,
            content_type: format.content_type(),
            filename,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::export::renderer::{DiscoveryConfig, PdfOptions, Platform};
    use crate::domains::export::writers::UTF8_BOM;
    use crate::domains::procedure::types::ProcedureStatus;
    use crate::domains::program::types::ProgramStatus;
    use crate::domains::report::service::ReportServiceImpl;
    use crate::domains::report::types::ReportQuery;
    use crate::test_support::{
        procedure, program, FakeLauncher, InMemoryFileSystem, InMemoryProcedureRepository, InMemoryProgramRepository,
    };

    fn reports(programs: InMemoryProgramRepository) -> Arc<dyn ReportService> {
        Arc::new(ReportServiceImpl::new(
            Arc::new(programs),
            Arc::new(InMemoryProcedureRepository::new(vec![
                procedure(ProcedureStatus::Submitted, "2024-04-01T10:00:00Z", "Permiso", "", "La Peña, Sector B"),
                procedure(ProcedureStatus::Approved, "2024-04-02T10:00:00Z", "Permiso", "", "Centro"),
            ])),
        ))
    }

    fn seeded_programs() -> InMemoryProgramRepository {
        InMemoryProgramRepository::new(vec![
            program("p-1", ProgramStatus::Active, "2024-04-01T00:00:00Z", &["u-1", "u-2"]),
            program("p-2", ProgramStatus::Finished, "2024-04-01T00:00:00Z", &["u-2"]),
        ])
    }

    fn service_with(programs: InMemoryProgramRepository, launcher: Arc<FakeLauncher>) -> ExportServiceImpl {
        let renderer = DocumentRenderer::new(
            launcher,
            Arc::new(InMemoryFileSystem::new(&[])),
            DiscoveryConfig::default().with_platform(Platform::Linux),
            PdfOptions::default(),
        );
        ExportServiceImpl::new(reports(programs), renderer)
    }

    fn request(report_type: &str, format: Option<&str>) -> ExportRequest {
        ExportRequest {
            report_type: Some(report_type.to_string()),
            format: format.map(str::to_string),
            query: ReportQuery::new(),
        }
    }

    #[tokio::test]
    async fn test_csv_is_default_format() {
        let svc = service_with(seeded_programs(), Arc::new(FakeLauncher::new()));
        let file = svc.export(&request("overview", None), None).await.unwrap();

        assert_eq!(file.content_type, "text/csv; charset=utf-8");
        assert!(file.filename.starts_with("overview-report-"));
        assert!(file.filename.ends_with(".csv"));
        assert!(file.bytes.starts_with(UTF8_BOM));
        let text = std::str::from_utf8(&file.bytes[UTF8_BOM.len()..]).unwrap();
        assert_eq!(text.lines().nth(1), Some("2,1,1,,"));
    }

    #[tokio::test]
    async fn test_xls_shares_csv_bytes() {
        let svc = service_with(seeded_programs(), Arc::new(FakeLauncher::new()));
        let csv = svc.export(&request("overview", Some("csv")), None).await.unwrap();
        let xls = svc.export(&request("overview", Some("xls")), None).await.unwrap();

        assert_eq!(csv.bytes, xls.bytes);
        assert_eq!(xls.content_type, "application/vnd.ms-excel");
        assert!(xls.filename.ends_with(".xls"));
    }

    #[tokio::test]
    async fn test_pdf_goes_through_renderer() {
        let launcher = Arc::new(FakeLauncher::new().with_implicit_browser());
        let svc = service_with(seeded_programs(), launcher.clone());
        let file = svc.export(&request("overview", Some("pdf")), None).await.unwrap();

        assert_eq!(file.content_type, "application/pdf");
        assert!(file.bytes.starts_with(b"%PDF"));
        assert!(file.filename.ends_with(".pdf"));
        assert_eq!(file.content_length(), file.bytes.len());
        assert_eq!(launcher.live_sessions(), 0);
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_the_stores() {
        // A failing store would turn any aggregation attempt into a 500
        let svc = service_with(InMemoryProgramRepository::failing("unreachable"), Arc::new(FakeLauncher::new()));

        let err = svc.export(&request("overview", Some("unknownformat")), None).await.unwrap_err();
        assert!(matches!(err, ExportError::InvalidRequest(_)));

        let err = svc.export(&request("finance", Some("csv")), None).await.unwrap_err();
        assert!(matches!(err, ExportError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_aggregation_failure_is_500() {
        let svc = service_with(InMemoryProgramRepository::failing("disk I/O error"), Arc::new(FakeLauncher::new()));
        let err = svc.export(&request("overview", Some("csv")), None).await.unwrap_err();

        assert!(matches!(err, ExportError::Aggregation(_)));
        assert_eq!(err.status_code(), 500);
    }

    #[tokio::test]
    async fn test_pdf_without_browser_is_configuration_error() {
        let launcher = Arc::new(FakeLauncher::new());
        let svc = service_with(seeded_programs(), launcher.clone());
        let err = svc.export(&request("overview", Some("pdf")), None).await.unwrap_err();

        assert!(matches!(err, ExportError::RenderConfiguration(_)));
        assert_eq!(launcher.live_sessions(), 0);
    }
}
