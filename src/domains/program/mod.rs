pub mod repository;
pub mod types;

pub use repository::{ProgramRepository, SqliteProgramRepository};
pub use types::{ProgramFilter, ProgramRecord, ProgramStatus};
