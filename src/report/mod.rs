//! Report emission for the VR/VA benefit engine.
//!
//! The payout batch is written as a spreadsheet and, optionally, a CSV file
//! with identical content. Both writers share one column layout.

mod csv;
mod layout;
mod summary;
mod xlsx;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::models::PayoutRecord;

pub use self::csv::{write_csv, write_csv_to};
pub use layout::{REPORT_HEADERS, ReportCell, money_text, report_row};
pub use summary::{PREVIEW_ROWS, format_brl, preview_table, print_summary, render_summary};
pub use xlsx::{SHEET_NAME, write_xlsx};

/// Files produced by a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportOutput {
    /// The spreadsheet.
    pub xlsx: PathBuf,
    /// The CSV export, when enabled.
    pub csv: Option<PathBuf>,
}

/// Writes `{stem}.xlsx` (and `{stem}.csv` when `with_csv`) into
/// `output_dir`, creating the directory if needed.
pub fn write_report(
    records: &[PayoutRecord],
    output_dir: &Path,
    stem: &str,
    with_csv: bool,
) -> EngineResult<ReportOutput> {
    fs::create_dir_all(output_dir).map_err(|e| EngineError::ReportWriteError {
        path: output_dir.display().to_string(),
        message: e.to_string(),
    })?;

    let xlsx_path = output_dir.join(format!("{}.xlsx", stem));
    write_xlsx(records, &xlsx_path)?;
    info!(path = %xlsx_path.display(), records = records.len(), "Wrote spreadsheet report");

    let csv_path = if with_csv {
        let path = output_dir.join(format!("{}.csv", stem));
        write_csv(records, &path)?;
        info!(path = %path.display(), "Wrote CSV report");
        Some(path)
    } else {
        None
    };

    Ok(ReportOutput {
        xlsx: xlsx_path,
        csv: csv_path,
    })
}
