//! Pure counting helpers behind the overview report.

use crate::domains::procedure::types::ProcedureStatus;
use crate::domains::program::types::ProgramRecord;
use crate::domains::report::types::{DateRange, ReportQuery, ReportSummary};
use std::collections::HashSet;

/// Size of the union of several identifier collections.
///
/// Identifiers are keyed by their string form, so the same id appearing in
/// more than one collection is counted once regardless of its concrete type.
pub fn distinct_count<I, C, T>(collections: I) -> usize
where
    I: IntoIterator<Item = C>,
    C: IntoIterator<Item = T>,
    T: ToString,
{
    collections
        .into_iter()
        .fold(HashSet::new(), |mut seen, collection| {
            seen.extend(collection.into_iter().map(|id| id.to_string()));
            seen
        })
        .len()
}

pub fn count_active_programs(programs: &[ProgramRecord]) -> usize {
    programs.iter().filter(|p| p.status.is_active()).count()
}

pub fn count_pending_procedures(statuses: &[ProcedureStatus]) -> usize {
    statuses.iter().filter(|s| s.is_pending()).count()
}

/// Build the summary from already-filtered projections. The raw range strings
/// from the query are echoed back untouched.
pub fn summarize(query: &ReportQuery, programs: &[ProgramRecord], procedures: &[ProcedureStatus]) -> ReportSummary {
    ReportSummary {
        beneficiaries_assigned: distinct_count(programs.iter().map(|p| p.enrolled_user_ids.iter())) as u64,
        active_programs: count_active_programs(programs) as u64,
        pending_procedures: count_pending_procedures(procedures) as u64,
        date_range: DateRange {
            from: query.from.clone(),
            to: query.to.clone(),
        },
    }
}
