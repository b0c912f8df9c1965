//! Column layout shared by the spreadsheet and CSV writers.

use rust_decimal::Decimal;

use crate::models::PayoutRecord;

/// Report headers, in output order.
pub const REPORT_HEADERS: [&str; 9] = [
    "Matrícula",
    "Nome",
    "Sindicato",
    "Dias Úteis",
    "Valor do VR",
    "Valor Total",
    "Valor Empresa (80%)",
    "Valor Descontado (20%)",
    "Status",
];

/// One typed report cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportCell<'a> {
    /// Free text.
    Text(&'a str),
    /// Whole number of days.
    Count(u32),
    /// Money amount.
    Money(Decimal),
}

/// Lays a payout record out in [`REPORT_HEADERS`] order.
pub fn report_row(record: &PayoutRecord) -> [ReportCell<'_>; 9] {
    [
        ReportCell::Text(&record.matricula),
        ReportCell::Text(&record.name),
        ReportCell::Text(&record.union),
        ReportCell::Count(record.working_days),
        ReportCell::Money(record.daily_rate),
        ReportCell::Money(record.total),
        ReportCell::Money(record.employer_share),
        ReportCell::Money(record.employee_share),
        ReportCell::Text(&record.status),
    ]
}

/// Renders a money amount with exactly two decimals.
pub fn money_text(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

impl ReportCell<'_> {
    /// Text form used by the CSV export and console preview.
    pub fn to_text(&self) -> String {
        match self {
            ReportCell::Text(text) => text.to_string(),
            ReportCell::Count(count) => count.to_string(),
            ReportCell::Money(amount) => money_text(*amount),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ValueSource;
    use std::str::FromStr;

    #[test]
    fn test_row_follows_header_order() {
        let record = PayoutRecord::compute(
            "1001".to_string(),
            "Ana".to_string(),
            "SP-001".to_string(),
            22,
            Decimal::from_str("37.5").unwrap(),
            "Elegível".to_string(),
            ValueSource::UnionTable,
            ValueSource::UnionTable,
        )
        .unwrap();

        let texts: Vec<String> = report_row(&record).iter().map(ReportCell::to_text).collect();

        assert_eq!(
            texts,
            vec!["1001", "Ana", "SP-001", "22", "37.50", "825.00", "660.00", "165.00", "Elegível"]
        );
    }

    #[test]
    fn test_money_text_rounds_to_cents() {
        assert_eq!(money_text(Decimal::from_str("1.005").unwrap()), "1.00");
        assert_eq!(money_text(Decimal::from_str("1.015").unwrap()), "1.02");
        assert_eq!(money_text(Decimal::ZERO), "0.00");
    }
}
