use crate::domains::procedure::types::{ProcedureFilter, ProcedureStatus};
use crate::errors::{DbError, DomainError, DomainResult};
use crate::types::{db_timestamp_column, to_db_timestamp};
use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

/// Read-only view of the procedure store used by reporting
#[async_trait]
pub trait ProcedureRepository: Send + Sync {
    /// Fetch the `status` projection of every procedure matching the filter.
    async fn find_statuses(&self, filter: &ProcedureFilter) -> DomainResult<Vec<ProcedureStatus>>;
}

/// SQLite implementation for ProcedureRepository
#[derive(Debug, Clone)]
pub struct SqliteProcedureRepository {
    pool: SqlitePool,
}

type SearchRow = (String, String, String, String);

impl SqliteProcedureRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Only the date range is pushed down. SQLite `LOWER` folds ASCII alone,
    /// so search text is matched on the returned rows instead.
    fn build_query(filter: &ProcedureFilter) -> QueryBuilder<'static, Sqlite> {
        let mut query_builder =
            QueryBuilder::new("SELECT status, title, description, locality FROM procedures WHERE 1=1");

        let requested_at = db_timestamp_column("requested_at");
        if let Some(from) = &filter.requested.from {
            query_builder.push(format!(" AND {} >= ", requested_at)).push_bind(to_db_timestamp(from));
        }
        if let Some(to) = &filter.requested.to {
            query_builder.push(format!(" AND {} <= ", requested_at)).push_bind(to_db_timestamp(to));
        }

        query_builder
    }
}

#[async_trait]
impl ProcedureRepository for SqliteProcedureRepository {
    async fn find_statuses(&self, filter: &ProcedureFilter) -> DomainResult<Vec<ProcedureStatus>> {
        let mut query_builder = Self::build_query(filter);
        let rows = query_builder
            .build_query_as::<SearchRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                log::error!("Procedure status query failed: {}", e);
                DbError::from(e)
            })?;

        let statuses = rows
            .into_iter()
            .filter(|(_, title, description, locality)| filter.matches_text(title, description, locality))
            .map(|(status, ..)| {
                ProcedureStatus::from_str(&status)
                    .ok_or_else(|| DomainError::Internal(format!("Unknown procedure status '{}'", status)))
            })
            .collect::<DomainResult<Vec<_>>>()?;

        log::debug!("Procedure projection returned {} rows", statuses.len());
        Ok(statuses)
    }
}
