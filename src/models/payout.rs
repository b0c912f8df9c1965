//! Payout models produced by the calculator and consumed by the report emitter.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::SkipReason;

/// Where a resolved working-days or daily-rate value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    /// Carried on the employee row itself.
    Precomputed,
    /// Looked up by union in the rate or calendar table.
    UnionTable,
    /// The fixed default for unknown unions.
    Default,
}

/// The computed benefit for one eligible employee.
///
/// `total = working_days * daily_rate`, with the employer paying 80% and the
/// employee 20%. Amounts are exact decimals, so
/// `employer_share + employee_share == total` holds without tolerance.
///
/// # Example
///
/// ```
/// use vr_engine::models::{PayoutRecord, ValueSource};
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let record = PayoutRecord::compute(
///     "1001".to_string(),
///     "Ana".to_string(),
///     "SP-001".to_string(),
///     22,
///     Decimal::from_str("37.5").unwrap(),
///     "Elegível".to_string(),
///     ValueSource::UnionTable,
///     ValueSource::UnionTable,
/// )
/// .unwrap();
/// assert_eq!(record.total, Decimal::from_str("825.0").unwrap());
/// assert_eq!(record.employer_share + record.employee_share, record.total);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutRecord {
    /// Registration identifier ("matrícula"), or `N/A`.
    pub matricula: String,
    /// Display name, or `N/A`.
    pub name: String,
    /// Union label as found on the employee row.
    pub union: String,
    /// Working days in the period.
    pub working_days: u32,
    /// Daily voucher value.
    pub daily_rate: Decimal,
    /// `working_days * daily_rate`.
    pub total: Decimal,
    /// Employer's 80% share.
    pub employer_share: Decimal,
    /// Employee's 20% share.
    pub employee_share: Decimal,
    /// Status label carried through from the row.
    pub status: String,
    /// Origin of `working_days`.
    pub working_days_source: ValueSource,
    /// Origin of `daily_rate`.
    pub daily_rate_source: ValueSource,
}

/// Employer share of the voucher total.
pub const EMPLOYER_SHARE: Decimal = Decimal::from_parts(80, 0, 0, false, 2);

/// Employee share of the voucher total.
pub const EMPLOYEE_SHARE: Decimal = Decimal::from_parts(20, 0, 0, false, 2);

impl PayoutRecord {
    /// Builds a record and derives the total and both shares.
    #[allow(clippy::too_many_arguments)]
    pub fn compute(
        matricula: String,
        name: String,
        union: String,
        working_days: u32,
        daily_rate: Decimal,
        status: String,
        working_days_source: ValueSource,
        daily_rate_source: ValueSource,
    ) -> Result<Self, SkipReason> {
        let overflow = || SkipReason::AmountOverflow {
            working_days,
            daily_rate: daily_rate.to_string(),
        };
        let total = Decimal::from(working_days)
            .checked_mul(daily_rate)
            .ok_or_else(overflow)?;
        let employer_share = total.checked_mul(EMPLOYER_SHARE).ok_or_else(overflow)?;
        let employee_share = total.checked_mul(EMPLOYEE_SHARE).ok_or_else(overflow)?;

        Ok(Self {
            matricula,
            name,
            union,
            working_days,
            daily_rate,
            total,
            employer_share,
            employee_share,
            status,
            working_days_source,
            daily_rate_source,
        })
    }
}

/// Aggregate amounts across a payout batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutTotals {
    /// Number of payout records.
    pub employees: usize,
    /// Sum of `total`.
    pub total: Decimal,
    /// Sum of `employer_share`.
    pub employer_share: Decimal,
    /// Sum of `employee_share`.
    pub employee_share: Decimal,
}

impl PayoutTotals {
    /// Adds one record to the totals.
    ///
    /// Returns `None` when any of the sums would leave the decimal range.
    pub fn checked_add(&self, record: &PayoutRecord) -> Option<Self> {
        Some(Self {
            employees: self.employees + 1,
            total: self.total.checked_add(record.total)?,
            employer_share: self.employer_share.checked_add(record.employer_share)?,
            employee_share: self.employee_share.checked_add(record.employee_share)?,
        })
    }
}

/// A row that was left out of the batch, with its identifier and cause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRow {
    /// Identifier of the offending row (`N/A` when unresolved).
    pub matricula: String,
    /// Position in the eligible population.
    pub row_index: usize,
    /// Human-readable cause.
    pub reason: String,
}

impl SkippedRow {
    /// Records a skipped row.
    pub fn new(matricula: impl Into<String>, row_index: usize, reason: &SkipReason) -> Self {
        Self {
            matricula: matricula.into(),
            row_index,
            reason: reason.to_string(),
        }
    }
}
