//! Scalar cell values read from spreadsheet and CSV sources.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::calculation::fold_text;

/// A single scalar value from a source table.
///
/// Spreadsheets hand back loosely typed cells; this enum keeps the original
/// type so that numeric lookups can be strict while identifiers can still be
/// compared by their canonical text form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    /// No value (blank cell, missing CSV field).
    #[default]
    Empty,
    /// Free text.
    Text(String),
    /// Whole number.
    Int(i64),
    /// Floating point number as stored by the spreadsheet.
    Float(f64),
    /// Boolean cell.
    Bool(bool),
    /// Date or date-time cell.
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Builds a text cell, mapping blank strings to [`CellValue::Empty`].
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(value)
        }
    }

    /// Returns true for blank cells and whitespace-only text.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Returns the canonical text form used for display and identifier
    /// matching, or `None` for empty cells.
    ///
    /// Text is trimmed and integral floats lose their fractional part, so a
    /// registration number stored as `12345.0` in one file and `"12345"` in
    /// another compare equal.
    ///
    /// ```
    /// use vr_engine::models::CellValue;
    ///
    /// assert_eq!(CellValue::Float(12345.0).as_text().as_deref(), Some("12345"));
    /// assert_eq!(CellValue::text(" 12345 ").as_text().as_deref(), Some("12345"));
    /// assert_eq!(CellValue::Empty.as_text(), None);
    /// ```
    pub fn as_text(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        Some(match self {
            CellValue::Empty => return None,
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Int(n) => n.to_string(),
            CellValue::Float(f) => {
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    format!("{}", *f as i64)
                } else {
                    format!("{}", f)
                }
            }
            CellValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        })
    }

    /// Interprets the cell as a decimal amount.
    ///
    /// Text is parsed after trimming and accepts a comma as the decimal
    /// separator. Returns `None` for empty cells and anything non-numeric.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            CellValue::Int(n) => Some(Decimal::from(*n)),
            CellValue::Float(f) if f.is_finite() => Decimal::from_f64(*f),
            CellValue::Text(s) => parse_decimal_text(s),
            _ => None,
        }
    }

    /// Interprets the cell as a truthy flag.
    pub fn is_truthy(&self) -> bool {
        match self {
            CellValue::Bool(b) => *b,
            CellValue::Int(n) => *n == 1,
            CellValue::Float(f) => *f == 1.0,
            CellValue::Text(s) => matches!(
                fold_text(s.trim()).as_str(),
                "true" | "verdadeiro" | "sim" | "s" | "yes" | "1"
            ),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_text() {
            Some(text) => write!(f, "{}", text),
            None => Ok(()),
        }
    }
}

fn parse_decimal_text(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .ok()
        .or_else(|| Decimal::from_str(&trimmed.replace(',', ".")).ok())
}
