//! Eligibility selection.
//!
//! Two modes exist and the richer one is chosen by data availability:
//! whenever the precomputed final reference sheet has rows it is used
//! ([`EligibilityMode::Reference`]); otherwise the active roster is filtered
//! against the exclusion sources ([`EligibilityMode::RosterExclusion`]).
//! Either mode yields an empty population instead of an error when its
//! source is missing.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::{Diagnostics, EmployeeRecord, SourceTable, Stage};
use crate::sources::{LoadedSources, SourceName};

use super::column_resolver::{MATRICULA_ALIASES, resolve_column};

/// Aliases for the boolean eligibility column of the reference sheet.
pub const ELIGIBLE_FLAG_ALIASES: &[&str] = &["elegivel", "eligible"];

/// Aliases for a status column. Leave descriptions (`DESC. SITUACAO`) are not
/// statuses.
pub const STATUS_ALIASES: &[&str] = &["status"];

/// How the eligible population was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityMode {
    /// Active roster minus apprentices, interns, leaves and overseas staff.
    RosterExclusion,
    /// Rows of the precomputed final reference sheet.
    Reference,
}

/// Which rule filtered the reference sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceFilter {
    /// Kept rows whose eligibility flag is true.
    EligibleFlag,
    /// Kept rows whose status equals the eligible marker.
    StatusMarker,
    /// No eligibility column; every row kept.
    All,
}

/// The employees a payout must be computed for.
#[derive(Debug, Clone)]
pub struct EligiblePopulation<'s> {
    mode: EligibilityMode,
    table: &'s SourceTable,
    rows: Vec<usize>,
    removed: usize,
    reference_filter: Option<ReferenceFilter>,
}

impl<'s> EligiblePopulation<'s> {
    fn empty(mode: EligibilityMode, table: &'s SourceTable) -> Self {
        Self {
            mode,
            table,
            rows: Vec::new(),
            removed: 0,
            reference_filter: None,
        }
    }

    /// The mode that produced this population.
    pub fn mode(&self) -> EligibilityMode {
        self.mode
    }

    /// The table the eligible rows belong to.
    pub fn table(&self) -> &'s SourceTable {
        self.table
    }

    /// Number of eligible rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if nobody is eligible.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows dropped by the filter.
    pub fn removed(&self) -> usize {
        self.removed
    }

    /// The reference-mode rule applied, if any.
    pub fn reference_filter(&self) -> Option<ReferenceFilter> {
        self.reference_filter
    }

    /// Eligible rows in source order.
    pub fn records(&self) -> impl Iterator<Item = EmployeeRecord<'s>> + '_ {
        self.rows.iter().filter_map(|&i| self.table.record(i))
    }
}

/// Selects the eligible population, preferring reference mode when the
/// final reference sheet has rows.
pub fn select_eligible<'s>(
    sources: &'s LoadedSources,
    eligible_marker: &str,
    diagnostics: &mut Diagnostics,
) -> EligiblePopulation<'s> {
    let reference = sources.table(SourceName::VrFinalRef);
    if reference.is_empty() {
        filter_by_exclusions(sources, diagnostics)
    } else {
        filter_reference(reference, eligible_marker)
    }
}

/// Roster-exclusion mode.
///
/// Builds the exclusion set from every exclusion source with a resolvable
/// registration column (others are skipped) and removes matching roster
/// rows. Duplicate roster rows are kept.
pub fn filter_by_exclusions<'s>(
    sources: &'s LoadedSources,
    diagnostics: &mut Diagnostics,
) -> EligiblePopulation<'s> {
    let roster = sources.table(SourceName::Ativos);
    let mode = EligibilityMode::RosterExclusion;

    if roster.is_empty() {
        diagnostics.record(
            Stage::Eligibility,
            SourceName::Ativos.key(),
            "active roster is empty or unavailable",
        );
        return EligiblePopulation::empty(mode, roster);
    }
    info!(rows = roster.len(), "Active roster loaded");

    let excluded = exclusion_set(sources);

    let Some(id_column) = resolve_column(roster, MATRICULA_ALIASES) else {
        diagnostics.record(
            Stage::Eligibility,
            SourceName::Ativos.key(),
            "no registration column found in active roster",
        );
        return EligiblePopulation::empty(mode, roster);
    };

    let rows: Vec<usize> = roster
        .records()
        .filter(|record| {
            record
                .cell(id_column)
                .and_then(|cell| cell.as_text())
                .is_none_or(|id| !excluded.contains(&id))
        })
        .map(|record| record.row_index())
        .collect();

    let removed = roster.len() - rows.len();
    info!(eligible = rows.len(), removed, "Applied exclusions");

    EligiblePopulation {
        mode,
        table: roster,
        rows,
        removed,
        reference_filter: None,
    }
}

/// Collects registration ids from the apprentice, intern, leave and
/// overseas sources.
pub fn exclusion_set(sources: &LoadedSources) -> HashSet<String> {
    let mut excluded = HashSet::new();

    for source in SourceName::EXCLUSIONS {
        let table = sources.table(source);
        if table.is_empty() {
            continue;
        }
        let Some(column) = resolve_column(table, MATRICULA_ALIASES) else {
            debug!(source = %source, "No registration column, skipping exclusion source");
            continue;
        };
        let before = excluded.len();
        excluded.extend(table.column_values(column).filter_map(|cell| cell.as_text()));
        info!(
            source = %source,
            rows = table.len(),
            new_ids = excluded.len() - before,
            "Exclusion source applied"
        );
    }

    excluded
}

/// Reference mode.
///
/// Keeps rows whose eligibility flag is true, else rows whose status equals
/// `eligible_marker`, else every row.
pub fn filter_reference<'s>(reference: &'s SourceTable, eligible_marker: &str) -> EligiblePopulation<'s> {
    let mode = EligibilityMode::Reference;
    if reference.is_empty() {
        return EligiblePopulation::empty(mode, reference);
    }
    info!(rows = reference.len(), "Reference sheet loaded");

    let (filter, rows): (ReferenceFilter, Vec<usize>) =
        if let Some(flag) = resolve_column(reference, ELIGIBLE_FLAG_ALIASES) {
            let rows = reference
                .records()
                .filter(|r| r.cell(flag).is_some_and(|c| c.is_truthy()))
                .map(|r| r.row_index())
                .collect();
            (ReferenceFilter::EligibleFlag, rows)
        } else if let Some(status) = resolve_column(reference, STATUS_ALIASES) {
            let marker = eligible_marker.trim();
            let rows = reference
                .records()
                .filter(|r| {
                    r.cell(status)
                        .and_then(|c| c.as_text())
                        .is_some_and(|s| s == marker)
                })
                .map(|r| r.row_index())
                .collect();
            (ReferenceFilter::StatusMarker, rows)
        } else {
            (ReferenceFilter::All, (0..reference.len()).collect())
        };

    let removed = reference.len() - rows.len();
    info!(eligible = rows.len(), filter = ?filter, "Filtered reference sheet");

    EligiblePopulation {
        mode,
        table: reference,
        rows,
        removed,
        reference_filter: Some(filter),
    }
}
