//! End-to-end benefit run.
//!
//! A run is strictly sequential: load every source, select the eligible
//! population, build the union lookups, compute payouts, write the report.
//! [`compute_run`] performs everything but the write so callers and tests can
//! inspect a batch without touching the filesystem.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn};
use uuid::Uuid;

use crate::calculation::{
    EligibilityMode, LookupOrigin, PayoutContext, ReferenceFilter, build_rate_table,
    build_working_days_table, calculate_payouts, select_eligible,
};
use crate::config::{ConfigLoader, PipelineConfig};
use crate::error::{EngineError, EngineResult};
use crate::models::{Diagnostic, Diagnostics, PayoutRecord, PayoutTotals, SkippedRow, Stage};
use crate::report::{ReportOutput, write_report};
use crate::sources::{LoadedSources, SourceLoader, SourceName};

/// A computed but not yet written run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputedRun {
    /// How the population was selected.
    pub mode: EligibilityMode,
    /// Reference-mode filter, if reference mode was used.
    pub reference_filter: Option<ReferenceFilter>,
    /// Eligible rows.
    pub eligible: usize,
    /// Rows removed by the eligibility filter.
    pub excluded: usize,
    /// Payouts in population order.
    pub records: Vec<PayoutRecord>,
    /// Financial totals of `records`.
    pub totals: PayoutTotals,
    /// Rows left out of the batch.
    pub skipped: Vec<SkippedRow>,
    /// Where the rate map came from.
    pub rate_origin: LookupOrigin,
    /// Where the working-days map came from.
    pub working_days_origin: LookupOrigin,
    /// Diagnostics raised from loading through calculation.
    pub diagnostics: Vec<Diagnostic>,
}

/// The JSON-friendly outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Correlation id of the run.
    pub run_id: Uuid,
    /// When the run finished.
    pub generated_at: DateTime<Utc>,
    /// How the population was selected.
    pub mode: EligibilityMode,
    /// Reference-mode filter, if reference mode was used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_filter: Option<ReferenceFilter>,
    /// Eligible rows.
    pub eligible: usize,
    /// Rows removed by the eligibility filter.
    pub excluded: usize,
    /// Financial totals of the batch.
    pub totals: PayoutTotals,
    /// Rows left out of the batch.
    pub skipped: Vec<SkippedRow>,
    /// Where the rate map came from.
    pub rate_origin: LookupOrigin,
    /// Where the working-days map came from.
    pub working_days_origin: LookupOrigin,
    /// Diagnostics raised during the run.
    pub diagnostics: Vec<Diagnostic>,
    /// Written files.
    pub outputs: ReportOutput,
}

/// A finished run: the summary plus every payout record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Run summary.
    pub summary: RunSummary,
    /// Payouts in population order.
    pub records: Vec<PayoutRecord>,
}

/// Computes the payout batch for already loaded sources.
///
/// # Errors
///
/// Returns `NoEligibleEmployees` when the eligibility filter leaves nobody to
/// process, including when its source table is missing. The error carries
/// every diagnostic raised up to that point.
pub fn compute_run(sources: &LoadedSources, config: &PipelineConfig) -> EngineResult<ComputedRun> {
    let mut diagnostics = Diagnostics::new();
    diagnostics.extend(sources.diagnostics().clone());

    let population = select_eligible(sources, &config.defaults.eligible_marker, &mut diagnostics);
    if population.is_empty() {
        let reason = match population.mode() {
            EligibilityMode::Reference => "reference sheet has no eligible rows".to_string(),
            EligibilityMode::RosterExclusion if population.table().is_empty() => {
                format!("source '{}' is empty or unavailable", SourceName::Ativos)
            }
            EligibilityMode::RosterExclusion => {
                "every active employee was excluded or unidentifiable".to_string()
            }
        };
        warn!(
            reason = %reason,
            diagnostics = diagnostics.len(),
            "No eligible employees"
        );
        return Err(EngineError::NoEligibleEmployees {
            reason,
            diagnostics: diagnostics.entries().to_vec(),
        });
    }

    let rates = build_rate_table(
        sources.table(SourceName::BaseSindicato),
        &config.fallback_rates,
        &mut diagnostics,
    );
    let working_days = build_working_days_table(
        sources.table(SourceName::BaseDiasUteis),
        &config.fallback_working_days,
        &mut diagnostics,
    );

    let context = PayoutContext {
        rates: &rates,
        working_days: &working_days,
        defaults: &config.defaults,
    };
    let batch = calculate_payouts(&population, &context);
    if !batch.skipped.is_empty() {
        let ids: Vec<&str> = batch.skipped.iter().map(|s| s.matricula.as_str()).collect();
        diagnostics.record(
            Stage::Payout,
            population.table().name.clone(),
            format!("{} row(s) skipped: {}", ids.len(), ids.join(", ")),
        );
    }

    Ok(ComputedRun {
        mode: population.mode(),
        reference_filter: population.reference_filter(),
        eligible: population.len(),
        excluded: population.removed(),
        records: batch.records,
        totals: batch.totals,
        skipped: batch.skipped,
        rate_origin: rates.origin(),
        working_days_origin: working_days.origin(),
        diagnostics: diagnostics.entries().to_vec(),
    })
}

/// Runs the whole pipeline with the given configuration and writes the
/// report.
///
/// # Errors
///
/// Returns `NoEligibleEmployees` when nobody is eligible and
/// `ReportWriteError` when the report cannot be written. Unreadable inputs
/// are diagnostics, not errors.
pub fn run_pipeline(config: &ConfigLoader) -> EngineResult<RunReport> {
    let run_id = Uuid::new_v4();
    let _span = info_span!("run", run_id = %run_id).entered();
    let start_time = Instant::now();

    let sources = SourceLoader::from_config(config).load();
    run_with_sources(run_id, &sources, config.config()).inspect(|report| {
        info!(
            records = report.records.len(),
            skipped = report.summary.skipped.len(),
            total = %report.summary.totals.total,
            duration_ms = start_time.elapsed().as_millis(),
            "Run completed"
        );
    })
}

/// Runs the pipeline over already loaded sources and writes the report.
pub fn run_with_sources(
    run_id: Uuid,
    sources: &LoadedSources,
    config: &PipelineConfig,
) -> EngineResult<RunReport> {
    let computed = compute_run(sources, config)?;
    let outputs = write_report(
        &computed.records,
        &config.output_dir,
        &config.output_stem,
        config.write_csv,
    )?;

    let summary = RunSummary {
        run_id,
        generated_at: Utc::now(),
        mode: computed.mode,
        reference_filter: computed.reference_filter,
        eligible: computed.eligible,
        excluded: computed.excluded,
        totals: computed.totals,
        skipped: computed.skipped,
        rate_origin: computed.rate_origin,
        working_days_origin: computed.working_days_origin,
        diagnostics: computed.diagnostics,
        outputs,
    };

    Ok(RunReport {
        summary,
        records: computed.records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CellValue, SourceTable, ValueSource};
    use rust_decimal::Decimal;

    fn table(name: &str, columns: &[&str], rows: Vec<Vec<CellValue>>) -> SourceTable {
        SourceTable::new(name, columns.iter().map(|c| c.to_string()).collect(), rows)
    }

    #[test]
    fn test_missing_roster_is_no_eligible_employees() {
        let sources = LoadedSources::default();

        let err = compute_run(&sources, &PipelineConfig::default()).unwrap_err();

        assert!(matches!(err, EngineError::NoEligibleEmployees { .. }));
        assert!(err.to_string().contains("ativos"));
    }

    #[test]
    fn test_no_eligible_error_carries_load_diagnostics() {
        let sources = SourceLoader::new(
            [(SourceName::Ativos, std::path::PathBuf::from("/nonexistent/ATIVOS.xlsx"))]
                .into_iter()
                .collect(),
        )
        .load();

        let diagnostics = match compute_run(&sources, &PipelineConfig::default()) {
            Err(EngineError::NoEligibleEmployees { diagnostics, .. }) => diagnostics,
            other => panic!("expected NoEligibleEmployees, got {other:?}"),
        };
        assert!(
            diagnostics
                .iter()
                .any(|d| d.stage == Stage::Load && d.subject == "ativos" && d.message.contains("not found"))
        );
        assert!(diagnostics.iter().any(|d| d.stage == Stage::Eligibility));
    }

    #[test]
    fn test_skipped_rows_are_reported_as_diagnostics() {
        let ativos = table(
            "ativos",
            &["MATRICULA", "Sindicato", "DIAS UTEIS CALCULADOS"],
            vec![
                vec![CellValue::Int(1), CellValue::text("SINDPD SP"), CellValue::Int(22)],
                vec![CellValue::Int(2), CellValue::text("SINDPD SP"), CellValue::text("vinte")],
            ],
        );
        let sources = LoadedSources::from_tables([(SourceName::Ativos, ativos)]);

        let run = compute_run(&sources, &PipelineConfig::default()).unwrap();

        assert_eq!(run.records.len(), 1);
        assert_eq!(run.totals.employees, 1);
        assert_eq!(run.totals.total, run.records[0].total);
        let payout: Vec<_> = run
            .diagnostics
            .iter()
            .filter(|d| d.stage == Stage::Payout)
            .collect();
        assert_eq!(payout.len(), 1);
        assert_eq!(payout[0].subject, "ativos");
        assert!(payout[0].message.contains("2"));
    }

    #[test]
    fn test_roster_with_fallback_lookups() {
        let ativos = table(
            "ativos",
            &["MATRICULA", "NOME", "Sindicato"],
            vec![
                vec![CellValue::Int(1), CellValue::text("Ana"), CellValue::text("SINDPD SP")],
                vec![CellValue::Int(2), CellValue::text("Bia"), CellValue::text("SINDPPD RS")],
                vec![CellValue::Int(3), CellValue::text("Caio"), CellValue::text("SINDPD RJ")],
            ],
        );
        let afastamentos = table("afastamentos", &["MATRICULA"], vec![vec![CellValue::Int(3)]]);
        let sources = LoadedSources::from_tables([
            (SourceName::Ativos, ativos),
            (SourceName::Afastamentos, afastamentos),
        ]);

        let run = compute_run(&sources, &PipelineConfig::default()).unwrap();

        assert_eq!(run.mode, EligibilityMode::RosterExclusion);
        assert_eq!(run.eligible, 2);
        assert_eq!(run.excluded, 1);
        assert_eq!(run.rate_origin, LookupOrigin::Fallback);
        assert_eq!(run.records[0].total, Decimal::new(825, 0));
        assert_eq!(run.records[1].total, Decimal::new(735, 0));
        assert_eq!(run.records[1].working_days_source, ValueSource::UnionTable);
        assert_eq!(run.diagnostics.len(), 2);
    }

    #[test]
    fn test_reference_mode_is_preferred() {
        let ativos = table("ativos", &["MATRICULA"], vec![vec![CellValue::Int(1)]]);
        let reference = table(
            "vr_final_ref",
            &["Matricula", "Nome", "Sindicato", "ELEGIVEL"],
            vec![
                vec![
                    CellValue::Int(10),
                    CellValue::text("Dora"),
                    CellValue::text("SINDPD SP"),
                    CellValue::Bool(true),
                ],
                vec![
                    CellValue::Int(11),
                    CellValue::text("Enzo"),
                    CellValue::text("SINDPD SP"),
                    CellValue::Bool(false),
                ],
            ],
        );
        let sources = LoadedSources::from_tables([
            (SourceName::Ativos, ativos),
            (SourceName::VrFinalRef, reference),
        ]);

        let run = compute_run(&sources, &PipelineConfig::default()).unwrap();

        assert_eq!(run.mode, EligibilityMode::Reference);
        assert_eq!(run.reference_filter, Some(ReferenceFilter::EligibleFlag));
        assert_eq!(run.records.len(), 1);
        assert_eq!(run.records[0].matricula, "10");
    }

    #[test]
    fn test_run_writes_report_and_summary() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = PipelineConfig::default();
        config.output_dir = dir.path().join("output");
        let ativos = table("ativos", &["MATRICULA"], vec![vec![CellValue::Int(1)]]);
        let sources = LoadedSources::from_tables([(SourceName::Ativos, ativos)]);

        let report = run_with_sources(Uuid::new_v4(), &sources, &config).unwrap();

        assert_eq!(report.summary.totals.employees, 1);
        assert_eq!(report.summary.totals.total, Decimal::new(660, 0));
        assert!(report.summary.outputs.xlsx.exists());
        assert!(report.summary.outputs.csv.is_some());
    }
}
