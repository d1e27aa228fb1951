use crate::auth::AuthContext;
use crate::domains::procedure::repository::ProcedureRepository;
use crate::domains::procedure::types::ProcedureFilter;
use crate::domains::program::repository::ProgramRepository;
use crate::domains::program::types::ProgramFilter;
use crate::domains::report::aggregator::summarize;
use crate::domains::report::types::{ReportQuery, ReportSummary};
use crate::errors::ServiceResult;
use crate::validation::parse_date_bounds;
use async_trait::async_trait;
use std::sync::Arc;

/// Trait defining report aggregation operations
#[async_trait]
pub trait ReportService: Send + Sync {
    /// Compute the overview summary for the given filters.
    ///
    /// Read-only and idempotent: repeating the call against unchanged data
    /// yields an equal summary, so callers may retry freely.
    async fn overview(&self, query: &ReportQuery, auth: Option<&AuthContext>) -> ServiceResult<ReportSummary>;
}

/// Implementation of the report service over the program and procedure stores
#[derive(Clone)]
pub struct ReportServiceImpl {
    program_repo: Arc<dyn ProgramRepository>,
    procedure_repo: Arc<dyn ProcedureRepository>,
}

impl ReportServiceImpl {
    pub fn new(
        program_repo: Arc<dyn ProgramRepository>,
        procedure_repo: Arc<dyn ProcedureRepository>,
    ) -> Self {
        Self {
            program_repo,
            procedure_repo,
        }
    }

    fn build_filters(query: &ReportQuery) -> ServiceResult<(ProgramFilter, ProcedureFilter)> {
        // One {from, to} pair becomes two independent predicates, one per
        // source timestamp field.
        let bounds = parse_date_bounds(query.from.as_deref(), query.to.as_deref())?;

        let mut program_filter = ProgramFilter::new().with_created_range(bounds);
        if let Some(program_id) = &query.program_id {
            program_filter = program_filter.with_program_id(program_id.clone());
        }

        let mut procedure_filter = ProcedureFilter::new().with_requested_range(bounds);
        if let Some(search) = &query.search {
            procedure_filter = procedure_filter.with_search(search.clone());
        }

        Ok((program_filter, procedure_filter))
    }
}

#[async_trait]
impl ReportService for ReportServiceImpl {
    async fn overview(&self, query: &ReportQuery, auth: Option<&AuthContext>) -> ServiceResult<ReportSummary> {
        let (program_filter, procedure_filter) = Self::build_filters(query)?;

        if let Some(auth) = auth {
            log::debug!("Overview report requested by {}", auth.describe());
        }

        // Independent reads; no cross-source consistency is required.
        let (programs, procedures) = tokio::try_join!(
            self.program_repo.find_report_projections(&program_filter),
            self.procedure_repo.find_statuses(&procedure_filter),
        )?;

        let summary = summarize(query, &programs, &procedures);
        log::info!(
            "Overview report: {} beneficiaries, {} active programs, {} pending procedures",
            summary.beneficiaries_assigned,
            summary.active_programs,
            summary.pending_procedures
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::procedure::types::ProcedureStatus;
    use crate::domains::program::types::ProgramStatus;
    use crate::errors::{DomainError, ServiceError, ValidationError};
    use crate::test_support::{procedure, program, InMemoryProcedureRepository, InMemoryProgramRepository};

    fn service(
        programs: InMemoryProgramRepository,
        procedures: InMemoryProcedureRepository,
    ) -> ReportServiceImpl {
        ReportServiceImpl::new(Arc::new(programs), Arc::new(procedures))
    }

    fn seeded() -> ReportServiceImpl {
        let programs = InMemoryProgramRepository::new(vec![
            program("p-1", ProgramStatus::Active, "2024-01-10T00:00:00Z", &["u-1", "u-2"]),
            program("p-2", ProgramStatus::Active, "2024-02-10T00:00:00Z", &["u-2", "u-3"]),
            program("p-3", ProgramStatus::Finished, "2024-03-10T00:00:00Z", &["u-4"]),
        ]);
        let procedures = InMemoryProcedureRepository::new(vec![
            procedure(ProcedureStatus::Submitted, "2024-01-05T00:00:00Z", "Licencia", "", "La Peña, Sector B"),
            procedure(ProcedureStatus::Submitted, "2024-02-05T00:00:00Z", "Permiso", "", "Centro"),
            procedure(ProcedureStatus::InReview, "2024-02-06T00:00:00Z", "Patente", "local en la peña", "Norte"),
            procedure(ProcedureStatus::Approved, "2024-02-07T00:00:00Z", "Permiso", "", "Centro"),
            procedure(ProcedureStatus::Rejected, "2024-03-07T00:00:00Z", "Permiso", "", "Sur"),
        ]);
        service(programs, procedures)
    }

    #[tokio::test]
    async fn test_overview_without_filters() {
        let summary = seeded().overview(&ReportQuery::new(), None).await.unwrap();

        assert_eq!(summary.beneficiaries_assigned, 4);
        assert_eq!(summary.active_programs, 2);
        assert_eq!(summary.pending_procedures, 3);
        assert_eq!(summary.date_range.from, None);
        assert_eq!(summary.date_range.to, None);
    }

    #[tokio::test]
    async fn test_date_range_applies_to_each_source_independently() {
        let query = ReportQuery::new().with_range(Some("2024-02-01"), Some("2024-02-29"));
        let summary = seeded().overview(&query, None).await.unwrap();

        // p-2 only
        assert_eq!(summary.beneficiaries_assigned, 2);
        assert_eq!(summary.active_programs, 1);
        // submitted + in_review in February
        assert_eq!(summary.pending_procedures, 2);
        assert_eq!(summary.date_range.from.as_deref(), Some("2024-02-01"));
        assert_eq!(summary.date_range.to.as_deref(), Some("2024-02-29"));
    }

    #[tokio::test]
    async fn test_program_id_still_honours_created_range() {
        let svc = seeded();

        let only_p1 = svc.overview(&ReportQuery::new().with_program_id("p-1"), None).await.unwrap();
        assert_eq!(only_p1.beneficiaries_assigned, 2);
        assert_eq!(only_p1.active_programs, 1);

        let out_of_range = svc
            .overview(
                &ReportQuery::new().with_program_id("p-1").with_range(Some("2024-02-01"), None),
                None,
            )
            .await
            .unwrap();
        assert_eq!(out_of_range.beneficiaries_assigned, 0);
        assert_eq!(out_of_range.active_programs, 0);
    }

    #[tokio::test]
    async fn test_search_only_narrows_procedures() {
        let summary = seeded().overview(&ReportQuery::new().with_search("PEÑA"), None).await.unwrap();

        assert_eq!(summary.pending_procedures, 2);
        assert_eq!(summary.active_programs, 2);
        assert_eq!(summary.beneficiaries_assigned, 4);
    }

    #[tokio::test]
    async fn test_repeated_overview_is_identical() {
        let svc = seeded();
        let query = ReportQuery::new().with_range(Some("2024-01-01"), None).with_search("permiso");

        let first = svc.overview(&query, None).await.unwrap();
        let second = svc.overview(&query, None).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(serde_json::to_vec(&first).unwrap(), serde_json::to_vec(&second).unwrap());
    }

    #[tokio::test]
    async fn test_invalid_date_is_a_validation_error() {
        let err = seeded()
            .overview(&ReportQuery::new().with_range(Some("last week"), None), None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Domain(DomainError::Validation(ValidationError::Format { .. }))
        ));
    }

    #[tokio::test]
    async fn test_source_failure_propagates() {
        let svc = service(
            InMemoryProgramRepository::failing("connection reset"),
            InMemoryProcedureRepository::new(vec![]),
        );

        let err = svc.overview(&ReportQuery::new(), None).await.unwrap_err();
        assert!(matches!(err, ServiceError::Domain(DomainError::Database(_))));
        assert!(err.to_string().contains("connection reset"));
    }
}
