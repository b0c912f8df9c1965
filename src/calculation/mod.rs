//! Calculation logic for the VR/VA benefit engine.
//!
//! This module contains the stages between loading and reporting: column
//! resolution by alias, eligibility selection, union rate and working-day
//! lookups, and the per-employee payout arithmetic.

mod column_resolver;
mod eligibility;
mod payout;
mod union_lookup;

pub use column_resolver::{
    MATRICULA_ALIASES, fold_text, resolve_column, resolve_column_name, resolve_in,
};
pub use eligibility::{
    ELIGIBLE_FLAG_ALIASES, EligibilityMode, EligiblePopulation, ReferenceFilter, STATUS_ALIASES,
    exclusion_set, filter_by_exclusions, filter_reference, select_eligible,
};
pub use payout::{
    FieldPlan, FieldRule, ID_RULES, NAME_RULES, NOT_AVAILABLE, PRECOMPUTED_DAILY_RATE_RULES,
    PRECOMPUTED_WORKING_DAYS_RULES, PayoutBatch, PayoutContext, STATUS_RULES, UNION_RULES,
    calculate_payout, calculate_payouts,
};
pub use union_lookup::{
    LookupOrigin, RATE_ALIASES, UNION_ALIASES, UnionTable, WORKING_DAYS_ALIASES,
    build_rate_table, build_working_days_table, canonical_union_label,
};
