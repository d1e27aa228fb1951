use crate::domains::program::types::{ProgramFilter, ProgramRecord, ProgramStatus};
use crate::errors::{DbError, DomainError, DomainResult};
use crate::types::{db_timestamp_column, to_db_timestamp};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::BTreeSet;

/// Read-only view of the program store used by reporting
#[async_trait]
pub trait ProgramRepository: Send + Sync {
    /// Fetch `{id, enrolledUserIds, status, createdAt}` for every program
    /// matching the filter, in a single read.
    async fn find_report_projections(&self, filter: &ProgramFilter) -> DomainResult<Vec<ProgramRecord>>;
}

/// SQLite implementation for ProgramRepository
#[derive(Debug, Clone)]
pub struct SqliteProgramRepository {
    pool: SqlitePool,
}

type ProjectionRow = (String, String, String, Option<String>);

impl SqliteProgramRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn build_query(filter: &ProgramFilter) -> QueryBuilder<'static, Sqlite> {
        let mut query_builder = QueryBuilder::new(
            "SELECT p.id, p.status, p.created_at, e.user_id \
             FROM programs p \
             LEFT JOIN program_enrollments e ON e.program_id = p.id \
             WHERE 1=1",
        );

        if let Some(program_id) = &filter.program_id {
            query_builder.push(" AND p.id = ").push_bind(program_id.clone());
        }
        let created_at = db_timestamp_column("p.created_at");
        if let Some(from) = &filter.created.from {
            query_builder.push(format!(" AND {} >= ", created_at)).push_bind(to_db_timestamp(from));
        }
        if let Some(to) = &filter.created.to {
            query_builder.push(format!(" AND {} <= ", created_at)).push_bind(to_db_timestamp(to));
        }

        query_builder.push(" ORDER BY p.id, e.user_id");
        query_builder
    }

    /// Fold joined rows (one per enrollment) back into one record per program.
    fn group_rows(rows: Vec<ProjectionRow>) -> DomainResult<Vec<ProgramRecord>> {
        let mut records: Vec<ProgramRecord> = Vec::new();

        for (id, status, created_at, user_id) in rows {
            let is_same_program = records.last().map_or(false, |last| last.id == id);
            if !is_same_program {
                let status = ProgramStatus::from_str(&status).ok_or_else(|| {
                    DomainError::Internal(format!("Unknown program status '{}' for program {}", status, id))
                })?;
                let created_at = DateTime::parse_from_rfc3339(&created_at)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| {
                        DomainError::Internal(format!("Invalid created_at for program {}: {}", id, e))
                    })?;
                records.push(ProgramRecord {
                    id,
                    enrolled_user_ids: BTreeSet::new(),
                    status,
                    created_at,
                });
            }

            if let (Some(user_id), Some(current)) = (user_id, records.last_mut()) {
                current.enrolled_user_ids.insert(user_id);
            }
        }

        Ok(records)
    }
}

#[async_trait]
impl ProgramRepository for SqliteProgramRepository {
    async fn find_report_projections(&self, filter: &ProgramFilter) -> DomainResult<Vec<ProgramRecord>> {
        let mut query_builder = Self::build_query(filter);
        let rows = query_builder
            .build_query_as::<ProjectionRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                log::error!("Program projection query failed: {}", e);
                DbError::from(e)
            })?;

        let records = Self::group_rows(rows)?;
        log::debug!("Program projection returned {} programs", records.len());
        Ok(records)
    }
}
