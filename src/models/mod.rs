//! Core data models for the VR/VA benefit engine.
//!
//! This module contains the tables read from the input files, the payout
//! records computed from them, and the run diagnostics log.

mod cell;
mod diagnostics;
mod payout;
mod source_table;

pub use cell::CellValue;
pub use diagnostics::{Diagnostic, Diagnostics, Stage};
pub use payout::{
    EMPLOYEE_SHARE, EMPLOYER_SHARE, PayoutRecord, PayoutTotals, SkippedRow, ValueSource,
};
pub use source_table::{EmployeeRecord, SourceTable, UNNAMED_COLUMN_PREFIX};
