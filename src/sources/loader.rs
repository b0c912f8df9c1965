//! Loading every named source of a run.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, info_span};

use crate::config::ConfigLoader;
use crate::models::{Diagnostics, SourceTable, Stage};

use super::catalog::SourceName;
use super::reader::read_table;

/// The tables of one run, produced once by the loader and passed by
/// reference to every downstream stage.
#[derive(Debug, Clone, Default)]
pub struct LoadedSources {
    tables: BTreeMap<SourceName, SourceTable>,
    prompt_template: Option<String>,
    diagnostics: Diagnostics,
}

impl LoadedSources {
    /// Builds a source set directly from tables (used by tests and callers
    /// that already hold the data).
    pub fn from_tables(tables: impl IntoIterator<Item = (SourceName, SourceTable)>) -> Self {
        Self {
            tables: tables.into_iter().collect(),
            prompt_template: None,
            diagnostics: Diagnostics::new(),
        }
    }

    /// Sets the custom assistant prompt.
    pub fn with_prompt_template(mut self, prompt: Option<String>) -> Self {
        self.prompt_template = prompt;
        self
    }

    /// Returns the table for a source. Sources that were never loaded read as
    /// an empty table.
    pub fn table(&self, source: SourceName) -> &SourceTable {
        static EMPTY: SourceTable = SourceTable {
            name: String::new(),
            columns: Vec::new(),
            rows: Vec::new(),
        };
        self.tables.get(&source).unwrap_or(&EMPTY)
    }

    /// The custom assistant prompt, if `prompt.md` was readable and not blank.
    pub fn prompt_template(&self) -> Option<&str> {
        self.prompt_template.as_deref()
    }

    /// Diagnostics raised while loading.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Row count per loaded source, in catalog order.
    pub fn row_counts(&self) -> Vec<(SourceName, usize)> {
        self.tables
            .iter()
            .map(|(name, table)| (*name, table.len()))
            .collect()
    }
}

/// Reads the named inputs of a run.
///
/// A source that cannot be read becomes an empty table plus a load
/// diagnostic; loading never fails as a whole.
pub struct SourceLoader {
    paths: BTreeMap<SourceName, PathBuf>,
    prompt_path: Option<PathBuf>,
}

impl SourceLoader {
    /// Creates a loader for an explicit mapping of sources to paths.
    pub fn new(paths: BTreeMap<SourceName, PathBuf>) -> Self {
        Self {
            paths,
            prompt_path: None,
        }
    }

    /// Creates a loader for every catalog source, resolved through the
    /// configuration.
    pub fn from_config(config: &ConfigLoader) -> Self {
        let paths = SourceName::ALL
            .into_iter()
            .map(|source| (source, config.source_path(source)))
            .collect();
        Self {
            paths,
            prompt_path: Some(config.prompt_path()),
        }
    }

    /// Also reads a prompt template from `path`.
    pub fn with_prompt_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.prompt_path = Some(path.into());
        self
    }

    /// Loads every configured source.
    pub fn load(&self) -> LoadedSources {
        let _span = info_span!("load_sources", sources = self.paths.len()).entered();
        let mut diagnostics = Diagnostics::new();
        let mut tables = BTreeMap::new();

        for (&source, path) in &self.paths {
            let table = match read_table(path, source.key(), source.skip_rows()) {
                Ok(table) => {
                    info!(source = %source, rows = table.len(), "Loaded source");
                    debug!(source = %source, columns = ?table.columns, "Source columns");
                    table
                }
                Err(err) => {
                    diagnostics.record(Stage::Load, source.key(), err.to_string());
                    SourceTable::empty(source.key())
                }
            };
            tables.insert(source, table);
        }

        let prompt_template = self
            .prompt_path
            .as_deref()
            .and_then(|path| read_prompt(path, &mut diagnostics));

        LoadedSources {
            tables,
            prompt_template,
            diagnostics,
        }
    }
}

fn read_prompt(path: &Path, diagnostics: &mut Diagnostics) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(text) if !text.trim().is_empty() => {
            info!(path = %path.display(), "Loaded custom prompt");
            Some(text)
        }
        Ok(_) => None,
        Err(err) => {
            diagnostics.record(
                Stage::Load,
                "prompt",
                format!("failed to read {}: {}", path.display(), err),
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CellValue;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_missing_files_become_empty_tables_with_diagnostics() {
        let dir = tempfile::tempdir().unwrap();
        let ativos = write_file(dir.path(), "ativos.csv", "MATRICULA\n1\n2\n");
        let paths = BTreeMap::from([
            (SourceName::Ativos, ativos),
            (SourceName::Aprendiz, dir.path().join("missing.csv")),
        ]);

        let sources = SourceLoader::new(paths).load();

        assert_eq!(sources.table(SourceName::Ativos).len(), 2);
        assert!(sources.table(SourceName::Aprendiz).is_empty());
        assert_eq!(sources.diagnostics().len(), 1);
        assert_eq!(sources.diagnostics().entries()[0].subject, "aprendiz");
    }

    #[test]
    fn test_working_days_source_skips_title_row() {
        let dir = tempfile::tempdir().unwrap();
        let dias = write_file(
            dir.path(),
            "dias.csv",
            "Dias uteis maio/2025\nSINDICATO,DIAS UTEIS\nSINDPD SP,22\n",
        );
        let paths = BTreeMap::from([(SourceName::BaseDiasUteis, dias)]);

        let sources = SourceLoader::new(paths).load();
        let table = sources.table(SourceName::BaseDiasUteis);

        assert_eq!(table.columns, vec!["SINDICATO", "DIAS UTEIS"]);
        assert_eq!(table.rows[0][1], CellValue::Int(22));
    }

    #[test]
    fn test_unloaded_source_reads_as_empty() {
        let sources = LoadedSources::default();
        assert!(sources.table(SourceName::VrFinalRef).is_empty());
    }

    #[test]
    fn test_prompt_is_loaded_and_missing_prompt_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let prompt = write_file(dir.path(), "prompt.md", "Contexto: {context}\n");

        let loaded = SourceLoader::new(BTreeMap::new())
            .with_prompt_path(&prompt)
            .load();
        assert_eq!(loaded.prompt_template(), Some("Contexto: {context}\n"));

        let missing = SourceLoader::new(BTreeMap::new())
            .with_prompt_path(dir.path().join("nope.md"))
            .load();
        assert_eq!(missing.prompt_template(), None);
        assert_eq!(missing.diagnostics().entries()[0].subject, "prompt");
    }
}
