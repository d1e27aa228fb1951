pub mod browser;
pub mod discovery;
pub mod document;

pub use browser::{BrowserLauncher, ChromiumLauncher, PdfOptions, RenderSession};
pub use discovery::{resolve_executable, DiscoveryConfig, FileSystemProbe, OsFileSystem, Platform};
pub use document::compose_document;

use crate::domains::export::types::{export_filename, ExportError, ExportFormat};
use crate::domains::report::types::{ReportSummary, ReportType};
use chrono::Utc;
use std::fmt;
use std::sync::Arc;

/// Lifecycle of a single render call.
///
/// `NotStarted -> Launching -> (DiscoveringExecutable)? -> Rendering -> Done | Failed`.
/// Any non-terminal state may also fall straight to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    NotStarted,
    Launching,
    DiscoveringExecutable,
    Rendering,
    Done,
    Failed,
}

impl RenderState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RenderState::Done | RenderState::Failed)
    }

    pub fn can_transition_to(&self, next: RenderState) -> bool {
        use RenderState::*;
        match (self, next) {
            (NotStarted, Launching) => true,
            (Launching, DiscoveringExecutable) | (Launching, Rendering) => true,
            (DiscoveringExecutable, Rendering) => true,
            (Rendering, Done) => true,
            (from, Failed) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for RenderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RenderState::NotStarted => "not_started",
            RenderState::Launching => "launching",
            RenderState::DiscoveringExecutable => "discovering_executable",
            RenderState::Rendering => "rendering",
            RenderState::Done => "done",
            RenderState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Tracks one render call through its states.
#[derive(Debug)]
struct RenderRun {
    state: RenderState,
}

impl RenderRun {
    fn new() -> Self {
        Self {
            state: RenderState::NotStarted,
        }
    }

    fn advance(&mut self, next: RenderState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid render transition {} -> {}",
            self.state,
            next
        );
        log::debug!("Render state {} -> {}", self.state, next);
        self.state = next;
    }

    fn fail(&mut self, err: ExportError) -> ExportError {
        self.advance(RenderState::Failed);
        log::error!("PDF render failed: {}", err);
        err
    }
}

/// Printable output of the renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub filename: String,
}

/// Turns a summary into a PDF through a headless browser.
///
/// One browser process per call. The process is closed on every exit path
/// once it has been launched.
#[derive(Clone)]
pub struct DocumentRenderer {
    launcher: Arc<dyn BrowserLauncher>,
    probe: Arc<dyn FileSystemProbe>,
    discovery: DiscoveryConfig,
    options: PdfOptions,
}

impl DocumentRenderer {
    pub fn new(
        launcher: Arc<dyn BrowserLauncher>,
        probe: Arc<dyn FileSystemProbe>,
        discovery: DiscoveryConfig,
        options: PdfOptions,
    ) -> Self {
        Self {
            launcher,
            probe,
            discovery,
            options,
        }
    }

    pub async fn render(&self, summary: &ReportSummary, report_type: ReportType) -> Result<RenderedDocument, ExportError> {
        let generated_at = Utc::now();
        let html = compose_document(summary, report_type, generated_at);
        let mut run = RenderRun::new();

        run.advance(RenderState::Launching);
        let mut session = match self.launcher.launch(None).await {
            Ok(session) => session,
            Err(implicit_err) => {
                log::info!("Implicit browser launch failed, searching for an executable: {}", implicit_err);
                run.advance(RenderState::DiscoveringExecutable);

                let executable = match resolve_executable(&self.discovery, self.probe.as_ref()) {
                    Some(path) => path,
                    None => {
                        return Err(run.fail(ExportError::RenderConfiguration(
                            "No browser executable found; set PUPPETEER_EXECUTABLE_PATH or install Chrome".to_string(),
                        )))
                    }
                };

                match self.launcher.launch(Some(&executable)).await {
                    Ok(session) => session,
                    Err(e) => return Err(run.fail(e)),
                }
            }
        };

        run.advance(RenderState::Rendering);
        let printed = session.print_pdf(&html, &self.options).await;

        // Teardown runs before the outcome is inspected
        let closed = session.close().await;
        if let Err(e) = &closed {
            log::warn!("Browser teardown reported an error: {}", e);
        }

        match printed {
            Ok(bytes) => {
                run.advance(RenderState::Done);
                log::info!("Rendered {} report PDF ({} bytes)", report_type, bytes.len());
                Ok(RenderedDocument {
                    bytes,
                    filename: export_filename(report_type, ExportFormat::Pdf, generated_at.date_naive()),
                })
            }
            Err(e) => Err(run.fail(e)),
        }
    }
}
