use crate::domains::export::types::{ExportError, ExportFormat};
use crate::domains::report::types::ReportSummary;

/// UTF-8 byte-order mark so spreadsheet software decodes accented labels
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub const SUMMARY_HEADERS: [&str; 5] = [
    "Beneficiarios asignados",
    "Programas activos",
    "Trámites pendientes",
    "Desde",
    "Hasta",
];

#[derive(Clone)]
pub struct CsvConfig {
    pub delimiter: u8,
    pub quote_char: u8,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote_char: b'"',
        }
    }
}

/// Encodes an overview summary as a header line plus a single data line.
pub struct SummaryCsvWriter {
    config: CsvConfig,
}

impl Default for SummaryCsvWriter {
    fn default() -> Self {
        Self::new(CsvConfig::default())
    }
}

impl SummaryCsvWriter {
    pub fn new(config: CsvConfig) -> Self {
        Self { config }
    }

    /// Render the summary for `csv` or `xls`. Both labels produce identical
    /// bytes; only the declared content type differs.
    pub fn write(&self, summary: &ReportSummary, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
        if !format.is_delimited_text() {
            return Err(ExportError::InvalidRequest(format!(
                "'{}' is not a delimited text format",
                format.file_extension()
            )));
        }

        let mut buffer = Vec::with_capacity(128);
        buffer.extend_from_slice(UTF8_BOM);

        {
            // Cells are quoted only when they contain the delimiter, a quote or
            // a line break; inner quotes are doubled.
            let mut wtr = csv::WriterBuilder::new()
                .delimiter(self.config.delimiter)
                .quote(self.config.quote_char)
                .double_quote(true)
                .quote_style(csv::QuoteStyle::Necessary)
                .terminator(csv::Terminator::Any(b'\n'))
                .from_writer(&mut buffer);

            wtr.write_record(SUMMARY_HEADERS)
                .map_err(|e| ExportError::Encoding(format!("CSV header write failed: {}", e)))?;
            wtr.write_record(summary_row(summary))
                .map_err(|e| ExportError::Encoding(format!("CSV row write failed: {}", e)))?;
            wtr.flush()
                .map_err(|e| ExportError::Encoding(format!("CSV flush failed: {}", e)))?;
        }

        log::debug!("Encoded summary as {} ({} bytes)", format.file_extension(), buffer.len());
        Ok(buffer)
    }
}

fn summary_row(summary: &ReportSummary) -> [String; 5] {
    [
        summary.beneficiaries_assigned.to_string(),
        summary.active_programs.to_string(),
        summary.pending_procedures.to_string(),
        summary.date_range.from.clone().unwrap_or_default(),
        summary.date_range.to.clone().unwrap_or_default(),
    ]
}
