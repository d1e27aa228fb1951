use crate::types::DateBounds;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Lifecycle status of a social program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgramStatus {
    Active,
    Finished,
    Pending,
    Cancelled,
}

impl ProgramStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProgramStatus::Active => "active",
            ProgramStatus::Finished => "finished",
            ProgramStatus::Pending => "pending",
            ProgramStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(ProgramStatus::Active),
            "finished" => Some(ProgramStatus::Finished),
            "pending" => Some(ProgramStatus::Pending),
            "cancelled" => Some(ProgramStatus::Cancelled),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, ProgramStatus::Active)
    }
}

impl fmt::Display for ProgramStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reporting projection of a program: only what the aggregator needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramRecord {
    pub id: String,
    pub enrolled_user_ids: BTreeSet<String>,
    pub status: ProgramStatus,
    pub created_at: DateTime<Utc>,
}

/// Filter accepted by the program store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramFilter {
    /// Narrow the selection to a single program
    pub program_id: Option<String>,
    /// Applied to `created_at`
    pub created: DateBounds,
}

impl ProgramFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_program_id(mut self, program_id: impl Into<String>) -> Self {
        self.program_id = Some(program_id.into());
        self
    }

    pub fn with_created_range(mut self, created: DateBounds) -> Self {
        self.created = created;
        self
    }

    pub fn matches(&self, record: &ProgramRecord) -> bool {
        self.program_id.as_deref().map_or(true, |id| id == record.id)
            && self.created.contains(&record.created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(id: &str, day: u32) -> ProgramRecord {
        ProgramRecord {
            id: id.to_string(),
            enrolled_user_ids: BTreeSet::new(),
            status: ProgramStatus::Active,
            created_at: Utc.with_ymd_and_hms(2024, 4, day, 9, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_status_strings() {
        for status in [
            ProgramStatus::Active,
            ProgramStatus::Finished,
            ProgramStatus::Pending,
            ProgramStatus::Cancelled,
        ] {
            assert_eq!(ProgramStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(ProgramStatus::from_str("archived"), None);
        assert!(ProgramStatus::Active.is_active());
        assert!(!ProgramStatus::Pending.is_active());
    }

    #[test]
    fn test_filter_applies_id_and_date_together() {
        let april_10 = Utc.with_ymd_and_hms(2024, 4, 10, 0, 0, 0).unwrap();
        let filter = ProgramFilter::new()
            .with_program_id("p-1")
            .with_created_range(DateBounds::new(Some(april_10), None));

        assert!(filter.matches(&record("p-1", 12)));
        assert!(!filter.matches(&record("p-1", 3)));
        assert!(!filter.matches(&record("p-2", 12)));
    }
}
