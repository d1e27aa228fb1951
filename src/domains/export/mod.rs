pub mod renderer;
pub mod service;
pub mod types;
pub mod writers;

pub use renderer::{DocumentRenderer, RenderState, RenderedDocument};
pub use service::{ExportService, ExportServiceImpl};
pub use types::{ExportError, ExportFile, ExportFormat, ExportRequest};
pub use writers::SummaryCsvWriter;
