//! Alias-based column resolution.
//!
//! Header spelling varies across the HR spreadsheets ("MATRÍCULA",
//! "Matricula_ID", "Matrícula"), so columns are found by case- and
//! accent-insensitive substring match against a list of aliases rather than
//! by exact name.

use crate::models::{SourceTable, UNNAMED_COLUMN_PREFIX};

/// Aliases for the registration identifier column.
pub const MATRICULA_ALIASES: &[&str] = &["matricula", "registration"];

/// Lowercases `text` and strips the diacritics found in Portuguese and
/// Spanish headers.
///
/// ```
/// use vr_engine::calculation::fold_text;
///
/// assert_eq!(fold_text("MATRÍCULA"), "matricula");
/// assert_eq!(fold_text("Dias Úteis"), "dias uteis");
/// ```
pub fn fold_text(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .map(strip_diacritic)
        .collect()
}

fn strip_diacritic(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        'ñ' => 'n',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

/// Returns the index of the first column, in the table's declared order,
/// whose folded name contains any folded candidate.
///
/// Candidate order never changes the result; only column order does.
/// `None` means no column matched.
pub fn resolve_column(table: &SourceTable, candidates: &[&str]) -> Option<usize> {
    resolve_in(&table.columns, candidates)
}

/// Like [`resolve_column`], returning the matched column name.
pub fn resolve_column_name<'t>(table: &'t SourceTable, candidates: &[&str]) -> Option<&'t str> {
    resolve_column(table, candidates).map(|i| table.columns[i].as_str())
}

/// Column resolution over a bare header list.
///
/// Placeholder names given to blank headers (`Unnamed: <index>`) never
/// match.
pub fn resolve_in(columns: &[String], candidates: &[&str]) -> Option<usize> {
    let folded: Vec<String> = candidates
        .iter()
        .map(|c| fold_text(c))
        .filter(|c| !c.is_empty())
        .collect();

    columns.iter().position(|column| {
        if column.starts_with(UNNAMED_COLUMN_PREFIX) {
            return false;
        }
        let column = fold_text(column);
        folded.iter().any(|candidate| column.contains(candidate.as_str()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn table(columns: &[&str]) -> SourceTable {
        SourceTable::new(
            "t",
            columns.iter().map(|c| c.to_string()).collect(),
            vec![],
        )
    }

    #[test]
    fn test_accent_and_case_insensitive_match() {
        let t = table(&["NOME", "MATRÍCULA"]);
        assert_eq!(resolve_column(&t, &["matricula"]), Some(1));
        assert_eq!(resolve_column_name(&t, &["matricula"]), Some("MATRÍCULA"));
    }

    #[test]
    fn test_substring_match() {
        let t = table(&["Matricula_ID", "Nome"]);
        assert_eq!(resolve_column_name(&t, &["matricula"]), Some("Matricula_ID"));
    }

    #[test]
    fn test_accented_candidate_matches_plain_column() {
        let t = table(&["matricula"]);
        assert_eq!(resolve_column(&t, &["Matrícula"]), Some(0));
    }

    #[test]
    fn test_not_found() {
        let t = table(&["NOME", "CARGO"]);
        assert_eq!(resolve_column(&t, &["matricula"]), None);
    }

    #[test]
    fn test_table_order_wins_over_candidate_order() {
        let t = table(&["DIAS UTEIS", "VALOR"]);
        assert_eq!(resolve_column(&t, &["valor", "dias"]), Some(0));
        assert_eq!(resolve_column(&t, &["dias", "valor"]), Some(0));
    }

    #[test]
    fn test_empty_candidate_never_matches() {
        let t = table(&["NOME"]);
        assert_eq!(resolve_column(&t, &[""]), None);
    }

    #[test]
    fn test_blank_header_placeholder_never_matches() {
        let t = table(&["Unnamed: 0", "MATRICULA", "NOME"]);
        assert_eq!(resolve_column_name(&t, &["nome", "name"]), Some("NOME"));
        assert_eq!(resolve_column(&t, &["unnamed"]), None);
    }

    proptest! {
        #[test]
        fn prop_candidate_order_does_not_matter(
            columns in prop::collection::vec("[a-zA-Z_ ]{1,12}", 0..8),
            candidates in prop::collection::vec("[a-z]{1,4}", 1..4),
        ) {
            let columns: Vec<String> = columns;
            let forward: Vec<&str> = candidates.iter().map(String::as_str).collect();
            let mut backward = forward.clone();
            backward.reverse();
            prop_assert_eq!(resolve_in(&columns, &forward), resolve_in(&columns, &backward));
        }

        #[test]
        fn prop_uppercased_column_still_resolves(name in "[a-z]{3,10}") {
            let columns = vec![format!("X_{}_Y", name.to_uppercase())];
            prop_assert_eq!(resolve_in(&columns, &[name.as_str()]), Some(0));
        }
    }
}
