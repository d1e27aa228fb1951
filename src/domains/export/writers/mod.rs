pub mod csv_writer;

pub use csv_writer::{CsvConfig, SummaryCsvWriter, SUMMARY_HEADERS, UTF8_BOM};
