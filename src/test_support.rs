//! In-memory stand-ins for the stores and the browser, shared by unit tests.

use crate::domains::export::renderer::{BrowserLauncher, FileSystemProbe, PdfOptions, RenderSession};
use crate::domains::export::types::ExportError;
use crate::domains::procedure::repository::ProcedureRepository;
use crate::domains::procedure::types::{ProcedureFilter, ProcedureRecord, ProcedureStatus};
use crate::domains::program::repository::ProgramRepository;
use crate::domains::program::types::{ProgramFilter, ProgramRecord, ProgramStatus};
use crate::errors::{DbError, DomainError, DomainResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

fn timestamp(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
}

pub fn program(id: &str, status: ProgramStatus, created_at: &str, users: &[&str]) -> ProgramRecord {
    ProgramRecord {
        id: id.to_string(),
        enrolled_user_ids: users.iter().map(|u| u.to_string()).collect(),
        status,
        created_at: timestamp(created_at),
    }
}

pub fn procedure(
    status: ProcedureStatus,
    requested_at: &str,
    title: &str,
    description: &str,
    locality: &str,
) -> ProcedureRecord {
    ProcedureRecord {
        id: Uuid::new_v4().to_string(),
        status,
        requested_at: timestamp(requested_at),
        title: title.to_string(),
        description: description.to_string(),
        locality: locality.to_string(),
    }
}

pub struct InMemoryProgramRepository {
    records: Vec<ProgramRecord>,
    failure: Option<String>,
}

impl InMemoryProgramRepository {
    pub fn new(records: Vec<ProgramRecord>) -> Self {
        Self { records, failure: None }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            records: Vec::new(),
            failure: Some(message.to_string()),
        }
    }
}

#[async_trait]
impl ProgramRepository for InMemoryProgramRepository {
    async fn find_report_projections(&self, filter: &ProgramFilter) -> DomainResult<Vec<ProgramRecord>> {
        if let Some(message) = &self.failure {
            return Err(DomainError::Database(DbError::Query(message.clone())));
        }
        Ok(self.records.iter().filter(|p| filter.matches(p)).cloned().collect())
    }
}

pub struct InMemoryProcedureRepository {
    records: Vec<ProcedureRecord>,
    failure: Option<String>,
}

impl InMemoryProcedureRepository {
    pub fn new(records: Vec<ProcedureRecord>) -> Self {
        Self { records, failure: None }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            records: Vec::new(),
            failure: Some(message.to_string()),
        }
    }
}

#[async_trait]
impl ProcedureRepository for InMemoryProcedureRepository {
    async fn find_statuses(&self, filter: &ProcedureFilter) -> DomainResult<Vec<ProcedureStatus>> {
        if let Some(message) = &self.failure {
            return Err(DomainError::Database(DbError::Query(message.clone())));
        }
        Ok(self
            .records
            .iter()
            .filter(|p| filter.matches(p))
            .map(|p| p.status)
            .collect())
    }
}

/// Filesystem probe over a fixed set of file paths
pub struct InMemoryFileSystem {
    files: BTreeSet<PathBuf>,
}

impl InMemoryFileSystem {
    pub fn new(files: &[&str]) -> Self {
        Self {
            files: files.iter().map(PathBuf::from).collect(),
        }
    }
}

impl FileSystemProbe for InMemoryFileSystem {
    fn is_file(&self, path: &Path) -> bool {
        self.files.contains(path)
    }

    fn read_dir_names(&self, path: &Path) -> Vec<String> {
        let children: BTreeSet<String> = self
            .files
            .iter()
            .filter_map(|file| file.strip_prefix(path).ok())
            .filter_map(|rest| match rest.components().next() {
                Some(Component::Normal(name)) if rest.components().count() > 1 => {
                    name.to_str().map(str::to_string)
                }
                _ => None,
            })
            .collect();
        children.into_iter().collect()
    }
}

/// Browser launcher that records launches and counts sessions left open
#[derive(Default)]
pub struct FakeLauncher {
    implicit_available: bool,
    fail_render: bool,
    fail_explicit_launch: bool,
    live: Arc<AtomicUsize>,
    launches: Mutex<Vec<Option<PathBuf>>>,
}

impl FakeLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_implicit_browser(mut self) -> Self {
        self.implicit_available = true;
        self
    }

    pub fn failing_render(mut self) -> Self {
        self.fail_render = true;
        self
    }

    pub fn failing_explicit_launch(mut self) -> Self {
        self.fail_explicit_launch = true;
        self
    }

    pub fn live_sessions(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn launches(&self) -> Vec<Option<PathBuf>> {
        self.launches.lock().unwrap().clone()
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn launch(&self, executable: Option<&Path>) -> Result<Box<dyn RenderSession>, ExportError> {
        self.launches.lock().unwrap().push(executable.map(Path::to_path_buf));

        let launchable = match executable {
            None => self.implicit_available,
            Some(_) => !self.fail_explicit_launch,
        };
        if !launchable {
            return Err(ExportError::RenderExecution("Could not start browser".to_string()));
        }

        self.live.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            live: self.live.clone(),
            fail_render: self.fail_render,
            open: true,
        }))
    }
}

struct FakeSession {
    live: Arc<AtomicUsize>,
    fail_render: bool,
    open: bool,
}

#[async_trait]
impl RenderSession for FakeSession {
    async fn print_pdf(&mut self, html: &str, _options: &PdfOptions) -> Result<Vec<u8>, ExportError> {
        if self.fail_render {
            return Err(ExportError::RenderExecution("Page crashed".to_string()));
        }
        let mut bytes = b"%PDF-1.7\n".to_vec();
        bytes.extend_from_slice(html.as_bytes());
        Ok(bytes)
    }

    async fn close(&mut self) -> Result<(), ExportError> {
        if self.open {
            self.open = false;
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }
}
