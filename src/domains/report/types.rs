use serde::{Deserialize, Serialize};
use std::fmt;

/// Filters accepted by every report endpoint. All fields are optional;
/// an absent field places no constraint on that axis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub program_id: Option<String>,
    pub search: Option<String>,
}

impl ReportQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_range(mut self, from: Option<&str>, to: Option<&str>) -> Self {
        self.from = from.map(str::to_string);
        self.to = to.map(str::to_string);
        self
    }

    pub fn with_program_id(mut self, program_id: &str) -> Self {
        self.program_id = Some(program_id.to_string());
        self
    }

    pub fn with_search(mut self, search: &str) -> Self {
        self.search = Some(search.to_string());
        self
    }
}

/// Raw `from`/`to` strings exactly as they were received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

/// Overview metrics. Built fresh per request and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub beneficiaries_assigned: u64,
    pub active_programs: u64,
    pub pending_procedures: u64,
    pub date_range: DateRange,
}

/// Report types the export endpoint understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportType {
    Overview,
}

impl ReportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Overview => "overview",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "overview" => Some(ReportType::Overview),
            _ => None,
        }
    }

    /// Human-readable title used in rendered documents
    pub fn title(&self) -> &'static str {
        match self {
            ReportType::Overview => "Reporte general",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
