pub mod repository;
pub mod types;

pub use repository::{ProcedureRepository, SqliteProcedureRepository};
pub use types::{ProcedureFilter, ProcedureRecord, ProcedureStatus};
