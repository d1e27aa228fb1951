use std::sync::Arc;

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

// Public modules
pub mod api;
pub mod auth;
pub mod config;
pub mod domains;
pub mod errors;
pub mod types;
pub mod validation;

// Private modules
mod db_migration;

#[cfg(test)]
mod test_support;

use api::AppState;
use config::AppConfig;
use domains::export::renderer::{ChromiumLauncher, DiscoveryConfig, DocumentRenderer, OsFileSystem, PdfOptions};
use domains::export::service::{ExportService, ExportServiceImpl};
use domains::procedure::repository::SqliteProcedureRepository;
use domains::program::repository::SqliteProgramRepository;
use domains::report::service::{ReportService, ReportServiceImpl};
use errors::{DbError, ServiceResult};

pub use db_migration::initialize_database;

/// Open the database, apply migrations and build the shared request state.
pub async fn initialize(config: &AppConfig) -> ServiceResult<AppState> {
    log::info!("Connecting to database");
    log::debug!("Database URL: {}", config.database_url);

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .map_err(|e| {
            log::error!("Database connection failed: {}", e);
            DbError::from(e)
        })?;

    db_migration::initialize_database(&pool).await?;

    Ok(build_state(pool, config))
}

/// Wire repositories, services and the renderer over an existing pool.
pub fn build_state(pool: SqlitePool, config: &AppConfig) -> AppState {
    let program_repo = Arc::new(SqliteProgramRepository::new(pool.clone()));
    let procedure_repo = Arc::new(SqliteProcedureRepository::new(pool));
    let reports: Arc<dyn ReportService> = Arc::new(ReportServiceImpl::new(program_repo, procedure_repo));

    let renderer = DocumentRenderer::new(
        Arc::new(ChromiumLauncher::new(config.render_timeout)),
        Arc::new(OsFileSystem),
        DiscoveryConfig::new(config.browser_executable.clone(), config.browser_cache_dir.clone()),
        PdfOptions::default().with_load_timeout(config.render_timeout),
    );
    let exports: Arc<dyn ExportService> = Arc::new(ExportServiceImpl::new(reports.clone(), renderer));

    AppState::new(reports, exports)
}
