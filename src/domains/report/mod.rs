pub mod aggregator;
pub mod service;
pub mod types;

pub use aggregator::distinct_count;
pub use service::{ReportService, ReportServiceImpl};
pub use types::{DateRange, ReportQuery, ReportSummary, ReportType};
