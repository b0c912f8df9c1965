//! In-memory tables loaded from the named input files.

use serde::{Deserialize, Serialize};

use super::CellValue;

/// Prefix of the name given to a column whose header cell is blank.
pub const UNNAMED_COLUMN_PREFIX: &str = "Unnamed: ";

/// A named, ordered collection of rows sharing one header.
///
/// Tables are built once by the source loader and never mutated afterwards.
/// An input that could not be read is represented by [`SourceTable::empty`],
/// never by an error.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SourceTable {
    /// The logical dataset name (e.g. "ativos").
    pub name: String,
    /// Column names in declared order, exactly as spelled in the file.
    pub columns: Vec<String>,
    /// Row cells, each row aligned with `columns`.
    pub rows: Vec<Vec<CellValue>>,
}

impl SourceTable {
    /// Creates a table from a header and its rows.
    ///
    /// Rows shorter than the header are padded with empty cells and longer
    /// rows are truncated, so every row lines up with `columns`.
    pub fn new(name: impl Into<String>, columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Empty);
                row
            })
            .collect();
        Self {
            name: name.into(),
            columns,
            rows,
        }
    }

    /// Creates the zero-row stand-in for an unavailable source.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns a read-only view of row `index`.
    pub fn record(&self, index: usize) -> Option<EmployeeRecord<'_>> {
        self.rows.get(index).map(|cells| EmployeeRecord {
            cells,
            row_index: index,
        })
    }

    /// Iterates over all rows as record views.
    pub fn records(&self) -> impl Iterator<Item = EmployeeRecord<'_>> {
        self.rows
            .iter()
            .enumerate()
            .map(|(row_index, cells)| EmployeeRecord {
                cells,
                row_index,
            })
    }

    /// Iterates over the values of one column.
    pub fn column_values(&self, column: usize) -> impl Iterator<Item = &CellValue> {
        self.rows.iter().filter_map(move |row| row.get(column))
    }
}

/// A read-only view of one roster or reference row.
///
/// Records are never mutated; the payout calculator only projects them into
/// payout records.
#[derive(Debug, Clone, Copy)]
pub struct EmployeeRecord<'a> {
    cells: &'a [CellValue],
    row_index: usize,
}

impl<'a> EmployeeRecord<'a> {
    /// The row's position within its source table.
    pub fn row_index(&self) -> usize {
        self.row_index
    }

    /// Returns the cell at a column index.
    pub fn cell(&self, column: usize) -> Option<&'a CellValue> {
        self.cells.get(column)
    }

    /// Returns the cell at a column index when it holds a non-empty value.
    pub fn non_empty(&self, column: usize) -> Option<&'a CellValue> {
        self.cell(column).filter(|value| !value.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SourceTable {
        SourceTable::new(
            "ativos",
            vec!["MATRICULA".to_string(), "NOME".to_string()],
            vec![
                vec![CellValue::Int(1), CellValue::text("Ana")],
                vec![CellValue::Int(2)],
            ],
        )
    }

    #[test]
    fn test_short_rows_are_padded() {
        let table = sample();
        assert_eq!(table.rows[1].len(), 2);
        assert_eq!(table.rows[1][1], CellValue::Empty);
    }

    #[test]
    fn test_empty_table_has_no_rows_or_columns() {
        let table = SourceTable::empty("aprendiz");
        assert!(table.is_empty());
        assert!(table.columns.is_empty());
        assert_eq!(table.name, "aprendiz");
    }

    #[test]
    fn test_record_lookup_by_index() {
        let table = sample();
        let record = table.record(0).unwrap();
        assert_eq!(record.cell(1), Some(&CellValue::text("Ana")));
        assert_eq!(record.cell(0), Some(&CellValue::Int(1)));
        assert_eq!(record.cell(2), None);
        assert_eq!(record.row_index(), 0);
    }

    #[test]
    fn test_non_empty_skips_blank_cells() {
        let table = sample();
        let record = table.record(1).unwrap();
        assert!(record.non_empty(1).is_none());
        assert!(record.non_empty(0).is_some());
    }

    #[test]
    fn test_column_values_iterates_in_row_order() {
        let table = sample();
        let ids: Vec<_> = table.column_values(0).cloned().collect();
        assert_eq!(ids, vec![CellValue::Int(1), CellValue::Int(2)]);
    }
}
