//! Reading spreadsheet and CSV files into [`SourceTable`]s.
//!
//! Workbooks (`xlsx`, `xlsm`, `xlsb`, `xls`, `ods`) are read with calamine
//! from their first worksheet; `csv` files with the csv crate. Both produce
//! raw grids that go through the same header and row handling.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use chrono::{Duration, NaiveDate};

use crate::error::{EngineError, EngineResult};
use crate::models::{CellValue, SourceTable, UNNAMED_COLUMN_PREFIX};

/// File extensions read through calamine.
const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Reads a table from `path`, discarding `skip_rows` leading rows before the
/// header row.
pub fn read_table(path: &Path, name: &str, skip_rows: usize) -> EngineResult<SourceTable> {
    let unavailable = |message: String| EngineError::SourceUnavailable {
        source_name: name.to_string(),
        message,
    };

    if !path.exists() {
        return Err(unavailable(format!("file not found: {}", path.display())));
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let grid = if WORKBOOK_EXTENSIONS.contains(&extension.as_str()) {
        read_workbook_grid(path).map_err(unavailable)?
    } else if extension == "csv" {
        read_csv_grid(path, skip_rows).map_err(unavailable)?
    } else {
        return Err(unavailable(format!(
            "unsupported file format '{}': {}",
            extension,
            path.display()
        )));
    };

    Ok(grid_to_table(name, grid, skip_rows))
}

fn read_workbook_grid(path: &Path) -> Result<Vec<Vec<CellValue>>, String> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| format!("failed to open workbook: {}", e))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| "workbook contains no sheets".to_string())?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| format!("failed to read sheet '{}': {}", sheet_name, e))?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect())
}

fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::text(s.as_str()),
        Data::Int(n) => CellValue::Int(*n),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => excel_serial_to_datetime(dt.as_f64())
            .map(CellValue::DateTime)
            .unwrap_or(CellValue::Float(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::text(s.as_str()),
        Data::Error(_) => CellValue::Empty,
    }
}

/// Converts an Excel serial date (1900 system) to a date-time.
fn excel_serial_to_datetime(serial: f64) -> Option<chrono::NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}

fn read_csv_grid(path: &Path, skip_rows: usize) -> Result<Vec<Vec<CellValue>>, String> {
    let delimiter = sniff_delimiter(path, skip_rows).map_err(|e| format!("failed to read file: {}", e))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|e| format!("failed to open CSV: {}", e))?;

    let mut grid = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| format!("malformed CSV: {}", e))?;
        grid.push(record.iter().map(cell_from_text).collect());
    }
    Ok(grid)
}

/// Picks `;` over `,` when the header line (the first line after
/// `skip_rows`) has more semicolons.
fn sniff_delimiter(path: &Path, skip_rows: usize) -> std::io::Result<u8> {
    let header = match BufReader::new(File::open(path)?).lines().nth(skip_rows) {
        Some(line) => line?,
        None => String::new(),
    };
    let semicolons = header.matches(';').count();
    let commas = header.matches(',').count();
    Ok(if semicolons > commas { b';' } else { b',' })
}

/// Infers a typed cell from CSV text the way a spreadsheet would.
fn cell_from_text(raw: &str) -> CellValue {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return CellValue::Empty;
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return CellValue::Int(n);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if f.is_finite() {
            return CellValue::Float(f);
        }
    }
    match trimmed {
        "True" | "TRUE" | "true" => CellValue::Bool(true),
        "False" | "FALSE" | "false" => CellValue::Bool(false),
        _ => CellValue::Text(trimmed.to_string()),
    }
}

/// Turns a raw grid into a table: skip leading rows, take the next row as
/// the header, drop fully empty data rows.
fn grid_to_table(name: &str, grid: Vec<Vec<CellValue>>, skip_rows: usize) -> SourceTable {
    let mut rows = grid.into_iter().skip(skip_rows);

    let Some(header_row) = rows.next() else {
        return SourceTable::empty(name);
    };

    let columns = header_names(&header_row);
    let data = rows
        .filter(|row| row.iter().any(|cell| !cell.is_empty()))
        .collect();

    SourceTable::new(name, columns, data)
}

/// Builds column names, naming blank headers by position and suffixing
/// repeated names with `.1`, `.2`, ...
fn header_names(header_row: &[CellValue]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    header_row
        .iter()
        .enumerate()
        .map(|(index, cell)| {
            let base = cell
                .as_text()
                .unwrap_or_else(|| format!("{}{}", UNNAMED_COLUMN_PREFIX, index));
            let count = seen.entry(base.clone()).or_insert(0);
            let name = if *count == 0 {
                base
            } else {
                format!("{}.{}", base, count)
            };
            *count += 1;
            name
        })
        .collect()
}
