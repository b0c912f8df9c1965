//! Union rate and working-day lookups.
//!
//! Two maps are built per run: union → daily voucher value from
//! `base_sindicato`, and union → working days from `base_dias_uteis`. When a
//! lookup sheet is missing or unusable the configured fallback map is used
//! instead, so every union always resolves to something.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{RIO_GRANDE_DO_SUL, SAO_PAULO};
use crate::models::{Diagnostics, SourceTable, Stage};

use super::column_resolver::resolve_column;

/// Aliases for the union column of both lookup sheets.
pub const UNION_ALIASES: &[&str] = &["sindicato", "sindic", "union"];

/// Aliases for the daily value column of the rate sheet.
pub const RATE_ALIASES: &[&str] = &["valor", "rate", "vr"];

/// Aliases for the day-count column of the calendar sheet.
pub const WORKING_DAYS_ALIASES: &[&str] = &["dias", "uteis", "working days"];

/// Where a lookup map came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupOrigin {
    /// Built from the lookup sheet.
    SourceTable,
    /// The configured fallback map.
    Fallback,
}

/// A union-keyed lookup map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionTable<T> {
    entries: BTreeMap<String, T>,
    origin: LookupOrigin,
}

impl<T: Copy> UnionTable<T> {
    /// Creates a map with the given origin.
    pub fn new(entries: BTreeMap<String, T>, origin: LookupOrigin) -> Self {
        Self { entries, origin }
    }

    /// Looks up a union by exact label, then by its canonical region label.
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use vr_engine::calculation::{LookupOrigin, UnionTable};
    ///
    /// let days = UnionTable::new(
    ///     BTreeMap::from([("São Paulo".to_string(), 22u32)]),
    ///     LookupOrigin::SourceTable,
    /// );
    /// assert_eq!(days.get("SP-001"), Some(22));
    /// assert_eq!(days.get("SINDPD RJ"), None);
    /// ```
    pub fn get(&self, union: &str) -> Option<T> {
        let union = union.trim();
        self.entries
            .get(union)
            .or_else(|| self.entries.get(canonical_union_label(union).as_str()))
            .copied()
    }

    /// Where this map came from.
    pub fn origin(&self) -> LookupOrigin {
        self.origin
    }

    /// Number of unions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the map has no unions.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The underlying entries.
    pub fn entries(&self) -> &BTreeMap<String, T> {
        &self.entries
    }
}

/// Maps a union label to its region label: anything containing "SP" is São
/// Paulo, else anything containing "RS" is Rio Grande do Sul, else the label
/// is returned unchanged.
pub fn canonical_union_label(label: &str) -> String {
    let upper = label.to_uppercase();
    if upper.contains("SP") {
        SAO_PAULO.to_string()
    } else if upper.contains("RS") {
        RIO_GRANDE_DO_SUL.to_string()
    } else {
        label.trim().to_string()
    }
}

/// Builds union → daily rate from the rate sheet, or returns `fallback`.
pub fn build_rate_table(
    table: &SourceTable,
    fallback: &BTreeMap<String, Decimal>,
    diagnostics: &mut Diagnostics,
) -> UnionTable<Decimal> {
    let entries = collect_entries(table, RATE_ALIASES, |value| {
        value.filter(|v| !v.is_sign_negative())
    }, |label| label.to_string());

    finish(table, entries, fallback, "rate", diagnostics)
}

/// Builds union → working days from the calendar sheet, canonicalizing
/// region labels, or returns `fallback`.
pub fn build_working_days_table(
    table: &SourceTable,
    fallback: &BTreeMap<String, u32>,
    diagnostics: &mut Diagnostics,
) -> UnionTable<u32> {
    let entries = collect_entries(
        table,
        WORKING_DAYS_ALIASES,
        |value| value.and_then(|v| v.trunc().to_u32()),
        canonical_union_label,
    );

    finish(table, entries, fallback, "working days", diagnostics)
}

/// Reads (union, value) pairs; `None` when either column is unresolved.
fn collect_entries<T, P, L>(
    table: &SourceTable,
    value_aliases: &[&str],
    parse: P,
    label: L,
) -> Option<BTreeMap<String, T>>
where
    P: Fn(Option<Decimal>) -> Option<T>,
    L: Fn(&str) -> String,
{
    if table.is_empty() {
        return None;
    }
    let union_column = resolve_column(table, UNION_ALIASES)?;
    let value_column = resolve_column(table, value_aliases)?;

    let mut entries = BTreeMap::new();
    for record in table.records() {
        let Some(union) = record.cell(union_column).and_then(|c| c.as_text()) else {
            continue;
        };
        let Some(value) = parse(record.cell(value_column).and_then(|c| c.as_decimal())) else {
            debug!(union = %union, "Skipping lookup row without a usable value");
            continue;
        };
        entries.insert(label(&union), value);
    }
    Some(entries)
}

fn finish<T: Copy + std::fmt::Debug>(
    table: &SourceTable,
    entries: Option<BTreeMap<String, T>>,
    fallback: &BTreeMap<String, T>,
    what: &str,
    diagnostics: &mut Diagnostics,
) -> UnionTable<T> {
    match entries {
        Some(entries) if !entries.is_empty() => {
            info!(source = %table.name, unions = entries.len(), "Loaded {} lookup", what);
            debug!(entries = ?entries, "{} by union", what);
            UnionTable::new(entries, LookupOrigin::SourceTable)
        }
        entries => {
            let cause = match entries {
                None if table.is_empty() => "lookup sheet is empty or unavailable",
                None => "union or value column not found",
                Some(_) => "no usable rows",
            };
            diagnostics.record(
                Stage::Lookup,
                table.name.clone(),
                format!("{}; using fallback {} values", cause, what),
            );
            UnionTable::new(fallback.clone(), LookupOrigin::Fallback)
        }
    }
}
