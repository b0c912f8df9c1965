//! Spreadsheet export of the payout batch.

use std::path::Path;

use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, Workbook};

use crate::error::{EngineError, EngineResult};
use crate::models::PayoutRecord;

use super::layout::{REPORT_HEADERS, ReportCell, report_row};

/// Worksheet name of the report.
pub const SHEET_NAME: &str = "VR Mensal";

const MONEY_FORMAT: &str = "#,##0.00";

/// Writes the records to an `.xlsx` file, one header row then one row per
/// record. Counts and amounts are stored as numeric cells.
pub fn write_xlsx(records: &[PayoutRecord], path: &Path) -> EngineResult<()> {
    let write_error = |e: rust_xlsxwriter::XlsxError| EngineError::ReportWriteError {
        path: path.display().to_string(),
        message: e.to_string(),
    };

    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let money_format = Format::new().set_num_format(MONEY_FORMAT);

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME).map_err(write_error)?;

    for (col, header) in REPORT_HEADERS.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *header, &header_format)
            .map_err(write_error)?;
    }

    for (index, record) in records.iter().enumerate() {
        let row = (index + 1) as u32;
        for (col, cell) in report_row(record).iter().enumerate() {
            let col = col as u16;
            let written = match cell {
                ReportCell::Text(text) => worksheet.write_string(row, col, *text),
                ReportCell::Count(count) => worksheet.write_number(row, col, f64::from(*count)),
                ReportCell::Money(amount) => worksheet.write_number_with_format(
                    row,
                    col,
                    amount.round_dp(2).to_f64().unwrap_or_default(),
                    &money_format,
                ),
            };
            written.map_err(write_error)?;
        }
    }

    worksheet.set_freeze_panes(1, 0).map_err(write_error)?;
    worksheet.autofit();

    workbook.save(path).map_err(write_error)
}
