pub mod export;
pub mod procedure;
pub mod program;
pub mod report;

pub use export::{ExportService, ExportServiceImpl};
pub use report::{ReportService, ReportServiceImpl};
