//! Console summary of a run.

use std::fmt::Write as _;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use rust_decimal::Decimal;

use crate::models::PayoutRecord;
use crate::pipeline::RunSummary;

use super::layout::{REPORT_HEADERS, ReportCell, report_row};

/// Records shown in the console preview.
pub const PREVIEW_ROWS: usize = 10;

/// Formats an amount as Brazilian reais with comma thousands separators and
/// two decimals.
///
/// ```
/// use rust_decimal::Decimal;
/// use vr_engine::report::format_brl;
///
/// assert_eq!(format_brl(Decimal::new(123456, 2)), "R$ 1,234.56");
/// assert_eq!(format_brl(Decimal::new(-5, 1)), "R$ -0.50");
/// ```
pub fn format_brl(amount: Decimal) -> String {
    let fixed = format!("{:.2}", amount.round_dp(2).abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount.round_dp(2).is_sign_negative() && !amount.round_dp(2).is_zero() {
        "-"
    } else {
        ""
    };
    format!("R$ {}{}.{}", sign, grouped, cents)
}

/// Builds the preview table of the first [`PREVIEW_ROWS`] records.
pub fn preview_table(records: &[PayoutRecord]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(160);
    table.set_header(
        REPORT_HEADERS
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
    );
    for index in 3..8 {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }

    for record in records.iter().take(PREVIEW_ROWS) {
        table.add_row(report_row(record).iter().map(|cell| match cell {
            ReportCell::Money(amount) => Cell::new(format_brl(*amount)),
            other => Cell::new(other.to_text()),
        }));
    }
    table
}

/// Renders the full run summary: counts, financial totals, the preview,
/// skipped rows and diagnostics.
pub fn render_summary(summary: &RunSummary, records: &[PayoutRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Run {} ({:?} mode)", summary.run_id, summary.mode);
    let _ = writeln!(
        out,
        "Eligible: {}  Excluded: {}  Calculated: {}  Skipped: {}",
        summary.eligible,
        summary.excluded,
        summary.totals.employees,
        summary.skipped.len()
    );
    let _ = writeln!(out, "Valor Total: {}", format_brl(summary.totals.total));
    let _ = writeln!(
        out,
        "Valor Empresa (80%): {}",
        format_brl(summary.totals.employer_share)
    );
    let _ = writeln!(
        out,
        "Valor Descontado (20%): {}",
        format_brl(summary.totals.employee_share)
    );

    if !records.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Primeiros {} registros:", records.len().min(PREVIEW_ROWS));
        let _ = writeln!(out, "{}", preview_table(records));
    }

    if !summary.skipped.is_empty() {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL_CONDENSED)
            .apply_modifier(UTF8_ROUND_CORNERS)
            .set_header(vec![
                Cell::new("Matrícula").add_attribute(Attribute::Bold),
                Cell::new("Linha").add_attribute(Attribute::Bold),
                Cell::new("Motivo").add_attribute(Attribute::Bold),
            ]);
        for row in &summary.skipped {
            table.add_row(vec![
                Cell::new(&row.matricula),
                Cell::new(row.row_index),
                Cell::new(&row.reason).fg(Color::Yellow),
            ]);
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "Skipped rows:");
        let _ = writeln!(out, "{}", table);
    }

    if !summary.diagnostics.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Diagnostics:");
        for diagnostic in &summary.diagnostics {
            let _ = writeln!(
                out,
                "- [{:?}] {}: {}",
                diagnostic.stage, diagnostic.subject, diagnostic.message
            );
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Output: {}", summary.outputs.xlsx.display());
    if let Some(csv) = &summary.outputs.csv {
        let _ = writeln!(out, "CSV: {}", csv.display());
    }
    out
}

/// Prints [`render_summary`] to stdout.
pub fn print_summary(summary: &RunSummary, records: &[PayoutRecord]) {
    print!("{}", render_summary(summary, records));
}
