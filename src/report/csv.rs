//! Delimited text export of the payout batch.

use std::io::Write;
use std::path::Path;

use crate::error::{EngineError, EngineResult};
use crate::models::PayoutRecord;

use super::layout::{REPORT_HEADERS, ReportCell, report_row};

/// Writes the records as comma-separated text with a header row.
pub fn write_csv_to<W: Write>(records: &[PayoutRecord], writer: W) -> Result<(), csv::Error> {
    let mut writer = csv::WriterBuilder::new().from_writer(writer);

    writer.write_record(REPORT_HEADERS)?;
    for record in records {
        let row: Vec<String> = report_row(record).iter().map(ReportCell::to_text).collect();
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

/// Writes the CSV export to `path`.
pub fn write_csv(records: &[PayoutRecord], path: &Path) -> EngineResult<()> {
    let file = std::fs::File::create(path).map_err(|e| EngineError::ReportWriteError {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;

    write_csv_to(records, file).map_err(|e| EngineError::ReportWriteError {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
