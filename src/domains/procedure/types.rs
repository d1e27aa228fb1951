use crate::types::DateBounds;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a digital procedure (trámite)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcedureStatus {
    Submitted,
    InReview,
    Approved,
    Rejected,
    Completed,
}

impl ProcedureStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcedureStatus::Submitted => "submitted",
            ProcedureStatus::InReview => "in_review",
            ProcedureStatus::Approved => "approved",
            ProcedureStatus::Rejected => "rejected",
            ProcedureStatus::Completed => "completed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "submitted" => Some(ProcedureStatus::Submitted),
            "in_review" => Some(ProcedureStatus::InReview),
            "approved" => Some(ProcedureStatus::Approved),
            "rejected" => Some(ProcedureStatus::Rejected),
            "completed" => Some(ProcedureStatus::Completed),
            _ => None,
        }
    }

    /// Not yet finalized in either direction
    pub fn is_pending(&self) -> bool {
        matches!(self, ProcedureStatus::Submitted | ProcedureStatus::InReview)
    }
}

impl fmt::Display for ProcedureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Procedure as held by the procedure store. Reporting only ever reads the
/// `status` projection; the other fields take part in filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureRecord {
    pub id: String,
    pub status: ProcedureStatus,
    pub requested_at: DateTime<Utc>,
    pub title: String,
    pub description: String,
    pub locality: String,
}

/// Filter accepted by the procedure store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcedureFilter {
    /// Applied to `requested_at`
    pub requested: DateBounds,
    /// Case-insensitive substring over title, description and locality
    pub search: Option<String>,
}

impl ProcedureFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_requested_range(mut self, requested: DateBounds) -> Self {
        self.requested = requested;
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// True when any of the three searchable fields contains the search text.
    pub fn matches_search(&self, record: &ProcedureRecord) -> bool {
        self.matches_text(&record.title, &record.description, &record.locality)
    }

    /// Unicode-aware case folding; surrounding whitespace in the search text
    /// is ignored.
    pub fn matches_text(&self, title: &str, description: &str, locality: &str) -> bool {
        match &self.search {
            None => true,
            Some(search) => {
                let needle = search.trim().to_lowercase();
                [title, description, locality]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            }
        }
    }

    pub fn matches(&self, record: &ProcedureRecord) -> bool {
        self.requested.contains(&record.requested_at) && self.matches_search(record)
    }
}
