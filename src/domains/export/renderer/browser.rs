use crate::domains::export::types::ExportError;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::page::PrintToPdfParams;
use futures::StreamExt;
use std::path::Path;
use std::time::Duration;
use tokio::task::JoinHandle;

const MM_PER_INCH: f64 = 25.4;

/// Page geometry and timing for PDF capture
#[derive(Debug, Clone, PartialEq)]
pub struct PdfOptions {
    pub paper_width_in: f64,
    pub paper_height_in: f64,
    pub margin_mm: f64,
    pub print_background: bool,
    /// Upper bound for loading the document and capturing the PDF
    pub load_timeout: Duration,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            // A4
            paper_width_in: 8.27,
            paper_height_in: 11.69,
            margin_mm: 20.0,
            print_background: true,
            load_timeout: Duration::from_secs(30),
        }
    }
}

impl PdfOptions {
    pub fn with_load_timeout(mut self, load_timeout: Duration) -> Self {
        self.load_timeout = load_timeout;
        self
    }

    pub fn margin_in(&self) -> f64 {
        self.margin_mm / MM_PER_INCH
    }

    fn to_params(&self) -> PrintToPdfParams {
        let margin = self.margin_in();
        PrintToPdfParams {
            print_background: Some(self.print_background),
            paper_width: Some(self.paper_width_in),
            paper_height: Some(self.paper_height_in),
            margin_top: Some(margin),
            margin_bottom: Some(margin),
            margin_left: Some(margin),
            margin_right: Some(margin),
            prefer_css_page_size: Some(false),
            ..Default::default()
        }
    }
}

/// One running browser process able to print documents
#[async_trait]
pub trait RenderSession: Send {
    /// Load `html` into a fresh page and capture it as a PDF.
    async fn print_pdf(&mut self, html: &str, options: &PdfOptions) -> Result<Vec<u8>, ExportError>;

    /// Terminate the process. Safe to call more than once.
    async fn close(&mut self) -> Result<(), ExportError>;
}

/// Starts browser processes. `None` asks the launcher to find a browser on
/// its own; `Some` pins the executable.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self, executable: Option<&Path>) -> Result<Box<dyn RenderSession>, ExportError>;
}

/// Launcher driving Chrome/Chromium over the DevTools protocol
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    timeout: Duration,
}

impl ChromiumLauncher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for ChromiumLauncher {
    fn default() -> Self {
        Self::new(PdfOptions::default().load_timeout)
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self, executable: Option<&Path>) -> Result<Box<dyn RenderSession>, ExportError> {
        let mut builder = BrowserConfig::builder()
            .no_sandbox()
            .arg("--disable-setuid-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .request_timeout(self.timeout)
            .launch_timeout(self.timeout);

        if let Some(path) = executable {
            builder = builder.chrome_executable(path);
        }

        // Without an explicit executable, building fails when no browser is registered
        let config = builder
            .build()
            .map_err(|e| ExportError::RenderExecution(format!("Invalid browser configuration: {}", e)))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| ExportError::RenderExecution(format!("Failed to launch browser: {}", e)))?;

        let handler_task = tokio::spawn(async move {
            let errors = drive_events(&mut handler).await;
            log::debug!("Browser event loop finished ({} event errors)", errors);
        });

        log::debug!(
            "Browser launched ({})",
            executable.map(|p| p.display().to_string()).unwrap_or_else(|| "auto-detected".to_string())
        );

        Ok(Box::new(ChromiumSession {
            browser: Some(browser),
            handler_task: Some(handler_task),
        }))
    }
}

/// Poll the browser's CDP event stream until it ends. Individual event errors
/// (such as messages the protocol bindings cannot decode) are logged and
/// skipped; stopping early would stall every pending page command.
async fn drive_events<S, E>(events: &mut S) -> usize
where
    S: futures::Stream<Item = Result<(), E>> + Unpin,
    E: std::fmt::Display,
{
    let mut errors = 0;
    while let Some(event) = events.next().await {
        if let Err(e) = event {
            errors += 1;
            log::debug!("Browser event error: {}", e);
        }
    }
    errors
}

pub struct ChromiumSession {
    browser: Option<Browser>,
    handler_task: Option<JoinHandle<()>>,
}

async fn with_timeout<T, E: std::fmt::Display>(
    limit: Duration,
    stage: &str,
    fut: impl std::future::Future<Output = Result<T, E>>,
) -> Result<T, ExportError> {
    match tokio::time::timeout(limit, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(ExportError::RenderExecution(format!("{} failed: {}", stage, e))),
        Err(_) => Err(ExportError::RenderExecution(format!(
            "{} timed out after {}s",
            stage,
            limit.as_secs()
        ))),
    }
}

#[async_trait]
impl RenderSession for ChromiumSession {
    async fn print_pdf(&mut self, html: &str, options: &PdfOptions) -> Result<Vec<u8>, ExportError> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| ExportError::RenderExecution("Browser session already closed".to_string()))?;

        let page = with_timeout(options.load_timeout, "Opening page", browser.new_page("about:blank")).await?;
        // set_content waits for the document load to settle
        with_timeout(options.load_timeout, "Loading document", page.set_content(html)).await?;
        let bytes = with_timeout(options.load_timeout, "PDF capture", page.pdf(options.to_params())).await?;

        if let Err(e) = page.close().await {
            log::debug!("Failed to close page: {}", e);
        }
        Ok(bytes)
    }

    async fn close(&mut self) -> Result<(), ExportError> {
        let mut result = Ok(());

        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                log::warn!("Graceful browser shutdown failed, killing process: {}", e);
                if let Some(Err(kill_err)) = browser.kill().await {
                    result = Err(ExportError::RenderExecution(format!(
                        "Failed to kill browser process: {}",
                        kill_err
                    )));
                }
            }
            if let Err(e) = browser.wait().await {
                log::debug!("Waiting for browser exit failed: {}", e);
            }
        }

        if let Some(task) = self.handler_task.take() {
            task.abort();
        }

        result
    }
}
