//! Per-employee payout calculation.
//!
//! Each output field is filled from an ordered list of [`FieldRule`]s. Rules
//! are resolved to column indices once per table by [`FieldPlan::resolve`]
//! and then applied to every eligible row; an empty cell falls through to the
//! next rule.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, warn};

use crate::config::DefaultValues;
use crate::error::SkipReason;
use crate::models::{
    CellValue, EmployeeRecord, PayoutRecord, PayoutTotals, SkippedRow, SourceTable, ValueSource,
};

use super::column_resolver::{MATRICULA_ALIASES, resolve_column};
use super::eligibility::EligiblePopulation;
use super::union_lookup::UnionTable;

/// Placeholder for identifiers and names that cannot be resolved.
pub const NOT_AVAILABLE: &str = "N/A";

/// A named column fallback: the first column matching any alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    /// Rule name, used in debug output.
    pub name: &'static str,
    /// Column aliases, matched case- and accent-insensitively.
    pub aliases: &'static [&'static str],
}

/// Registration identifier.
pub const ID_RULES: &[FieldRule] = &[FieldRule {
    name: "matricula",
    aliases: MATRICULA_ALIASES,
}];

/// Display name, falling back to the job title.
pub const NAME_RULES: &[FieldRule] = &[
    FieldRule {
        name: "nome",
        aliases: &["nome", "name"],
    },
    FieldRule {
        name: "titulo_do_cargo",
        aliases: &["titulo do cargo", "cargo", "job title"],
    },
];

/// Union label, preferring the mapped union of merged sheets.
pub const UNION_RULES: &[FieldRule] = &[
    FieldRule {
        name: "sindicato_mapeado",
        aliases: &["sindicato mapeado"],
    },
    FieldRule {
        name: "sindicato_y",
        aliases: &["sindicato_y"],
    },
    FieldRule {
        name: "sindicato_x",
        aliases: &["sindicato_x"],
    },
    FieldRule {
        name: "sindicato",
        aliases: &["sindicato", "union"],
    },
];

/// Working days already computed on the row.
pub const PRECOMPUTED_WORKING_DAYS_RULES: &[FieldRule] = &[FieldRule {
    name: "dias_uteis_calculados",
    aliases: &["dias uteis calculados"],
}];

/// Daily rate already computed on the row.
pub const PRECOMPUTED_DAILY_RATE_RULES: &[FieldRule] = &[FieldRule {
    name: "valor_vr_diario",
    aliases: &["valor vr diario"],
}];

/// Status label.
pub const STATUS_RULES: &[FieldRule] = &[FieldRule {
    name: "status",
    aliases: &["status"],
}];

/// Column indices for every output field of one table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPlan {
    /// Identifier column.
    pub id: Vec<usize>,
    /// Name columns, in fallback order.
    pub name: Vec<usize>,
    /// Union columns, in fallback order.
    pub union: Vec<usize>,
    /// Precomputed working-days column.
    pub working_days: Vec<usize>,
    /// Precomputed daily-rate column.
    pub daily_rate: Vec<usize>,
    /// Status column.
    pub status: Vec<usize>,
}

impl FieldPlan {
    /// Resolves every rule list against the table's columns.
    pub fn resolve(table: &SourceTable) -> Self {
        let plan = Self {
            id: resolve_rules(table, ID_RULES),
            name: resolve_rules(table, NAME_RULES),
            union: resolve_rules(table, UNION_RULES),
            working_days: resolve_rules(table, PRECOMPUTED_WORKING_DAYS_RULES),
            daily_rate: resolve_rules(table, PRECOMPUTED_DAILY_RATE_RULES),
            status: resolve_rules(table, STATUS_RULES),
        };
        debug!(table = %table.name, plan = ?plan, "Resolved payout fields");
        plan
    }
}

fn resolve_rules(table: &SourceTable, rules: &[FieldRule]) -> Vec<usize> {
    let mut columns = Vec::with_capacity(rules.len());
    for rule in rules {
        if let Some(index) = resolve_column(table, rule.aliases) {
            if !columns.contains(&index) {
                columns.push(index);
            }
        }
    }
    columns
}

fn first_cell<'a>(record: &EmployeeRecord<'a>, columns: &[usize]) -> Option<&'a CellValue> {
    columns.iter().find_map(|&column| record.non_empty(column))
}

fn first_text(record: &EmployeeRecord<'_>, columns: &[usize]) -> Option<String> {
    first_cell(record, columns).and_then(CellValue::as_text)
}

/// The lookups and defaults a payout is computed against.
#[derive(Debug, Clone, Copy)]
pub struct PayoutContext<'a> {
    /// Union → daily rate.
    pub rates: &'a UnionTable<Decimal>,
    /// Union → working days.
    pub working_days: &'a UnionTable<u32>,
    /// Defaults for unknown unions and missing labels.
    pub defaults: &'a DefaultValues,
}

/// Computes the payout for one eligible row.
///
/// # Arguments
///
/// * `record` - The eligible row
/// * `plan` - Column plan resolved for the row's table
/// * `context` - Lookups and defaults
///
/// # Returns
///
/// The payout record, or the reason the row must be skipped: an invalid
/// precomputed value or an amount outside the decimal range.
pub fn calculate_payout(
    record: &EmployeeRecord<'_>,
    plan: &FieldPlan,
    context: &PayoutContext<'_>,
) -> Result<PayoutRecord, SkipReason> {
    let matricula = first_text(record, &plan.id).unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let name = first_text(record, &plan.name).unwrap_or_else(|| NOT_AVAILABLE.to_string());
    let union = first_text(record, &plan.union).unwrap_or_else(|| context.defaults.union.clone());
    let status = first_text(record, &plan.status)
        .unwrap_or_else(|| context.defaults.eligible_marker.clone());

    let (working_days, working_days_source) =
        match first_cell(record, &plan.working_days).map(precomputed_working_days) {
            Some(days) => (days?, ValueSource::Precomputed),
            None => match context.working_days.get(&union) {
                Some(days) => (days, ValueSource::UnionTable),
                None => (context.defaults.working_days, ValueSource::Default),
            },
        };

    let (daily_rate, daily_rate_source) =
        match first_cell(record, &plan.daily_rate).map(precomputed_daily_rate) {
            Some(rate) => (rate?, ValueSource::Precomputed),
            None => match context.rates.get(&union) {
                Some(rate) => (rate, ValueSource::UnionTable),
                None => (context.defaults.daily_rate, ValueSource::Default),
            },
        };

    PayoutRecord::compute(
        matricula,
        name,
        union,
        working_days,
        daily_rate,
        status,
        working_days_source,
        daily_rate_source,
    )
}

fn precomputed_working_days(cell: &CellValue) -> Result<u32, SkipReason> {
    cell.as_decimal()
        .filter(|days| !days.is_sign_negative())
        .and_then(|days| days.trunc().to_u32())
        .ok_or_else(|| SkipReason::InvalidWorkingDays {
            value: cell.to_string(),
        })
}

fn precomputed_daily_rate(cell: &CellValue) -> Result<Decimal, SkipReason> {
    cell.as_decimal()
        .filter(|rate| !rate.is_sign_negative())
        .ok_or_else(|| SkipReason::InvalidDailyRate {
            value: cell.to_string(),
        })
}

/// The result of calculating a whole population.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutBatch {
    /// Payouts in population order.
    pub records: Vec<PayoutRecord>,
    /// Rows that failed, in population order.
    pub skipped: Vec<SkippedRow>,
    /// Sums over `records`.
    pub totals: PayoutTotals,
}

/// Computes payouts for every eligible row, collecting failures instead of
/// stopping at the first one.
pub fn calculate_payouts(population: &EligiblePopulation<'_>, context: &PayoutContext<'_>) -> PayoutBatch {
    let _span = info_span!("calculate_payouts", rows = population.len()).entered();
    let plan = FieldPlan::resolve(population.table());
    let mut batch = PayoutBatch::default();

    for (position, record) in population.records().enumerate() {
        let outcome = calculate_payout(&record, &plan, context).and_then(|payout| {
            match batch.totals.checked_add(&payout) {
                Some(totals) => Ok((payout, totals)),
                None => Err(SkipReason::TotalsOverflow {
                    total: payout.total.to_string(),
                }),
            }
        });

        match outcome {
            Ok((payout, totals)) => {
                batch.totals = totals;
                batch.records.push(payout);
            }
            Err(reason) => {
                let matricula =
                    first_text(&record, &plan.id).unwrap_or_else(|| NOT_AVAILABLE.to_string());
                warn!(matricula = %matricula, reason = %reason, "Skipping row");
                batch.skipped.push(SkippedRow::new(matricula, position, &reason));
            }
        }
    }

    info!(
        calculated = batch.records.len(),
        skipped = batch.skipped.len(),
        "Calculated payouts"
    );
    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::union_lookup::LookupOrigin;
    use crate::calculation::filter_reference;
    use crate::config::{DEFAULT_UNION, PipelineConfig, SAO_PAULO};
    use crate::models::EMPLOYER_SHARE;
    use proptest::prelude::*;
    use std::collections::BTreeMap;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn table(columns: &[&str], rows: Vec<Vec<CellValue>>) -> SourceTable {
        SourceTable::new(
            "vr_final_ref",
            columns.iter().map(|c| c.to_string()).collect(),
            rows,
        )
    }

    struct Lookups {
        rates: UnionTable<Decimal>,
        days: UnionTable<u32>,
        defaults: DefaultValues,
    }

    impl Lookups {
        fn new() -> Self {
            Self {
                rates: UnionTable::new(
                    BTreeMap::from([(SAO_PAULO.to_string(), dec("37.5"))]),
                    LookupOrigin::SourceTable,
                ),
                days: UnionTable::new(
                    BTreeMap::from([(SAO_PAULO.to_string(), 22)]),
                    LookupOrigin::SourceTable,
                ),
                defaults: DefaultValues::default(),
            }
        }

        fn context(&self) -> PayoutContext<'_> {
            PayoutContext {
                rates: &self.rates,
                working_days: &self.days,
                defaults: &self.defaults,
            }
        }
    }

    fn single(columns: &[&str], row: Vec<CellValue>) -> Result<PayoutRecord, SkipReason> {
        let t = table(columns, vec![row]);
        let lookups = Lookups::new();
        let plan = FieldPlan::resolve(&t);
        calculate_payout(&t.record(0).unwrap(), &plan, &lookups.context())
    }

    #[test]
    fn test_sao_paulo_union_lookup() {
        let payout = single(
            &["MATRICULA", "NOME", "SINDICATO"],
            vec![
                CellValue::Int(1001),
                CellValue::text("Ana"),
                CellValue::text("SP-001"),
            ],
        )
        .unwrap();

        assert_eq!(payout.matricula, "1001");
        assert_eq!(payout.union, "SP-001");
        assert_eq!(payout.working_days, 22);
        assert_eq!(payout.daily_rate, dec("37.5"));
        assert_eq!(payout.total, dec("825.00"));
        assert_eq!(payout.employer_share, dec("660.00"));
        assert_eq!(payout.employee_share, dec("165.00"));
        assert_eq!(payout.working_days_source, ValueSource::UnionTable);
        assert_eq!(payout.status, "Elegível");
    }

    #[test]
    fn test_leading_index_column_is_not_taken_for_name() {
        let payout = single(
            &["Unnamed: 0", "MATRICULA", "NOME", "Sindicato"],
            vec![
                CellValue::Int(0),
                CellValue::Int(1001),
                CellValue::text("Ana"),
                CellValue::text("SINDPD SP"),
            ],
        )
        .unwrap();

        assert_eq!(payout.matricula, "1001");
        assert_eq!(payout.name, "Ana");
        assert_eq!(payout.union, "SINDPD SP");
    }

    #[test]
    fn test_unknown_union_uses_defaults() {
        let payout = single(
            &["MATRICULA", "SINDICATO"],
            vec![CellValue::Int(7), CellValue::text("SINDPD RJ")],
        )
        .unwrap();

        assert_eq!(payout.working_days, 22);
        assert_eq!(payout.daily_rate, dec("30.0"));
        assert_eq!(payout.total, dec("660"));
        assert_eq!(payout.daily_rate_source, ValueSource::Default);
        assert_eq!(payout.name, NOT_AVAILABLE);
    }

    #[test]
    fn test_missing_union_uses_default_label() {
        let payout = single(&["MATRICULA"], vec![CellValue::Int(7)]).unwrap();
        assert_eq!(payout.union, DEFAULT_UNION);
    }

    #[test]
    fn test_mapped_union_takes_precedence() {
        let payout = single(
            &["MATRICULA", "Sindicato_x", "Sindicato_y", "Sindicato Mapeado"],
            vec![
                CellValue::Int(1),
                CellValue::text("X"),
                CellValue::text("Y"),
                CellValue::text("SINDPD SP"),
            ],
        )
        .unwrap();
        assert_eq!(payout.union, "SINDPD SP");
        assert_eq!(payout.daily_rate, dec("37.5"));
    }

    #[test]
    fn test_empty_field_falls_through_to_next_rule() {
        let payout = single(
            &["MATRICULA", "Sindicato_y", "Sindicato_x", "NOME", "TITULO DO CARGO"],
            vec![
                CellValue::Int(1),
                CellValue::Empty,
                CellValue::text("SINDPD SP"),
                CellValue::text("  "),
                CellValue::text("ANALISTA"),
            ],
        )
        .unwrap();
        assert_eq!(payout.union, "SINDPD SP");
        assert_eq!(payout.name, "ANALISTA");
    }

    #[test]
    fn test_precomputed_values_win() {
        let payout = single(
            &["MATRICULA", "SINDICATO", "DIAS UTEIS CALCULADOS", "VALOR VR DIARIO", "Status"],
            vec![
                CellValue::Int(1),
                CellValue::text("SINDPD SP"),
                CellValue::Float(18.0),
                CellValue::Float(40.0),
                CellValue::text("Elegível - Férias"),
            ],
        )
        .unwrap();

        assert_eq!(payout.working_days, 18);
        assert_eq!(payout.daily_rate, dec("40"));
        assert_eq!(payout.total, dec("720"));
        assert_eq!(payout.working_days_source, ValueSource::Precomputed);
        assert_eq!(payout.daily_rate_source, ValueSource::Precomputed);
        assert_eq!(payout.status, "Elegível - Férias");
    }

    #[test]
    fn test_empty_precomputed_value_falls_back_to_lookup() {
        let payout = single(
            &["MATRICULA", "SINDICATO", "DIAS UTEIS CALCULADOS"],
            vec![CellValue::Int(1), CellValue::text("SINDPD SP"), CellValue::Empty],
        )
        .unwrap();
        assert_eq!(payout.working_days, 22);
        assert_eq!(payout.working_days_source, ValueSource::UnionTable);
    }

    #[test]
    fn test_fractional_precomputed_days_are_truncated() {
        let payout = single(
            &["MATRICULA", "DIAS UTEIS CALCULADOS"],
            vec![CellValue::Int(1), CellValue::Float(20.9)],
        )
        .unwrap();
        assert_eq!(payout.working_days, 20);
    }

    #[test]
    fn test_invalid_precomputed_values_skip_row() {
        let days = single(
            &["MATRICULA", "DIAS UTEIS CALCULADOS"],
            vec![CellValue::Int(1), CellValue::text("vinte")],
        );
        assert_eq!(
            days,
            Err(SkipReason::InvalidWorkingDays {
                value: "vinte".to_string()
            })
        );

        let rate = single(
            &["MATRICULA", "VALOR VR DIARIO"],
            vec![CellValue::Int(1), CellValue::Float(-5.0)],
        );
        assert!(matches!(rate, Err(SkipReason::InvalidDailyRate { .. })));
    }

    #[test]
    fn test_batch_collects_skips_and_continues() {
        let t = table(
            &["MATRICULA", "SINDICATO", "VALOR VR DIARIO"],
            vec![
                vec![CellValue::Int(1), CellValue::text("SINDPD SP"), CellValue::Empty],
                vec![CellValue::Int(2), CellValue::text("SINDPD SP"), CellValue::text("abc")],
                vec![CellValue::Int(3), CellValue::text("SINDPD RS"), CellValue::Empty],
            ],
        );
        let population = filter_reference(&t, "Elegível");
        let lookups = Lookups::new();

        let batch = calculate_payouts(&population, &lookups.context());

        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.records[0].matricula, "1");
        assert_eq!(batch.records[1].matricula, "3");
        assert_eq!(batch.skipped.len(), 1);
        assert_eq!(batch.skipped[0].matricula, "2");
        assert_eq!(batch.skipped[0].row_index, 1);
        assert!(batch.skipped[0].reason.contains("abc"));
        assert_eq!(batch.totals.employees, 2);
        assert_eq!(
            batch.totals.total,
            batch.records[0].total + batch.records[1].total
        );
    }

    #[test]
    fn test_batch_totals_overflow_skips_row() {
        let huge = CellValue::text("30000000000000000000000000000");
        let t = table(
            &["MATRICULA", "DIAS UTEIS CALCULADOS", "VALOR VR DIARIO"],
            vec![
                vec![CellValue::Int(1), CellValue::Int(1), huge.clone()],
                vec![CellValue::Int(2), CellValue::Int(1), huge.clone()],
                vec![CellValue::Int(3), CellValue::Int(1), huge],
            ],
        );
        let population = filter_reference(&t, "Elegível");
        let lookups = Lookups::new();

        let batch = calculate_payouts(&population, &lookups.context());

        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.totals.employees, 2);
        assert_eq!(batch.totals.total, dec("60000000000000000000000000000"));
        assert_eq!(batch.skipped.len(), 1);
        assert_eq!(batch.skipped[0].matricula, "3");
        assert!(batch.skipped[0].reason.contains("overflows the batch totals"));
    }

    #[test]
    fn test_fallback_maps_resolve_region_labels() {
        let config = PipelineConfig::default();
        let rates = UnionTable::new(config.fallback_rates.clone(), LookupOrigin::Fallback);
        let days = UnionTable::new(config.fallback_working_days.clone(), LookupOrigin::Fallback);
        let context = PayoutContext {
            rates: &rates,
            working_days: &days,
            defaults: &config.defaults,
        };
        let t = table(
            &["MATRICULA", "SINDICATO"],
            vec![vec![CellValue::Int(1), CellValue::text("SINDPPD RS")]],
        );
        let plan = FieldPlan::resolve(&t);

        let payout = calculate_payout(&t.record(0).unwrap(), &plan, &context).unwrap();

        assert_eq!(payout.working_days, 21);
        assert_eq!(payout.daily_rate, dec("35.0"));
        assert_eq!(payout.total, dec("735"));
    }

    proptest! {
        #[test]
        fn prop_shares_always_sum_to_total(days in 0u32..=31, cents in 0i64..100_000) {
            let rate = Decimal::new(cents, 2);
            let payout = single(
                &["MATRICULA", "DIAS UTEIS CALCULADOS", "VALOR VR DIARIO"],
                vec![CellValue::Int(1), CellValue::Int(days as i64), CellValue::text(rate.to_string())],
            )
            .unwrap();

            prop_assert_eq!(payout.total, Decimal::from(days) * rate);
            prop_assert_eq!(payout.employer_share + payout.employee_share, payout.total);
            prop_assert_eq!(payout.employer_share, payout.total * EMPLOYER_SHARE);
            prop_assert!(payout.total >= Decimal::ZERO);
        }
    }
}
