//! Configuration types for a benefit run.
//!
//! This module contains the strongly-typed settings deserialized from
//! `settings.yaml`. Every field has a built-in default, so an absent or
//! partial file is valid.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Canonical label for the São Paulo region.
pub const SAO_PAULO: &str = "São Paulo";

/// Canonical label for the Rio Grande do Sul region.
pub const RIO_GRANDE_DO_SUL: &str = "Rio Grande do Sul";

/// Label used when an employee row carries no union.
pub const DEFAULT_UNION: &str = "PADRÃO";

/// Values applied when a row or a lookup cannot supply one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultValues {
    /// Union label for rows without a union.
    pub union: String,
    /// Daily rate for unions missing from the rate table.
    pub daily_rate: Decimal,
    /// Working days for unions missing from the calendar table.
    pub working_days: u32,
    /// Status value marking an eligible row, also the default status label.
    pub eligible_marker: String,
}

impl Default for DefaultValues {
    fn default() -> Self {
        Self {
            union: DEFAULT_UNION.to_string(),
            daily_rate: Decimal::new(300, 1),
            working_days: 22,
            eligible_marker: "Elegível".to_string(),
        }
    }
}

/// Settings for the document question-answering assistant.
///
/// These are consumed only by the assistant; the payout pipeline ignores
/// them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantSettings {
    /// Language model identifier.
    pub model_name: String,
    /// Characters per document chunk.
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks.
    pub chunk_overlap: usize,
    /// Chunks retrieved per question.
    pub top_k: usize,
    /// The policy document to index.
    pub document: PathBuf,
    /// Where the index is persisted.
    pub index_dir: PathBuf,
    /// Credential for the model provider. Never serialized.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for AssistantSettings {
    fn default() -> Self {
        Self {
            model_name: "gpt-4o-mini".to_string(),
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 3,
            document: PathBuf::from("data/Desafio4-Descrição.pdf"),
            index_dir: PathBuf::from("output/vectorstore"),
            api_key: None,
        }
    }
}

impl AssistantSettings {
    /// Applies `MODEL_NAME`, `CHUNK_SIZE`, `CHUNK_OVERLAP` and
    /// `OPENAI_API_KEY` overrides from the given variable lookup.
    ///
    /// Numeric variables that fail to parse are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = lookup("MODEL_NAME").filter(|v| !v.trim().is_empty()) {
            self.model_name = model;
        }
        if let Some(size) = lookup("CHUNK_SIZE").and_then(|v| v.trim().parse().ok()) {
            self.chunk_size = size;
        }
        if let Some(overlap) = lookup("CHUNK_OVERLAP").and_then(|v| v.trim().parse().ok()) {
            self.chunk_overlap = overlap;
        }
        if let Some(key) = lookup("OPENAI_API_KEY").filter(|v| !v.trim().is_empty()) {
            self.api_key = Some(key);
        }
    }
}

/// The complete configuration of a benefit run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory holding the input spreadsheets and `prompt.md`.
    pub input_dir: PathBuf,
    /// Directory the report is written to.
    pub output_dir: PathBuf,
    /// Report file name without extension.
    pub output_stem: String,
    /// Whether the CSV export is written next to the spreadsheet.
    pub write_csv: bool,
    /// File-name overrides keyed by logical source name.
    pub sources: BTreeMap<String, String>,
    /// Fixed defaults.
    pub defaults: DefaultValues,
    /// Rate map used when the union rate table is unusable.
    pub fallback_rates: BTreeMap<String, Decimal>,
    /// Working-days map used when the calendar table is unusable.
    pub fallback_working_days: BTreeMap<String, u32>,
    /// Document assistant settings.
    pub assistant: AssistantSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let fallback_rates = BTreeMap::from([
            (SAO_PAULO.to_string(), Decimal::new(375, 1)),
            (RIO_GRANDE_DO_SUL.to_string(), Decimal::new(350, 1)),
            (DEFAULT_UNION.to_string(), Decimal::new(300, 1)),
        ]);
        let fallback_working_days = BTreeMap::from([
            (SAO_PAULO.to_string(), 22),
            (RIO_GRANDE_DO_SUL.to_string(), 21),
            (DEFAULT_UNION.to_string(), 22),
        ]);

        Self {
            input_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("output"),
            output_stem: "VR_Mensal_05_2025_Gerado".to_string(),
            write_csv: true,
            sources: BTreeMap::new(),
            defaults: DefaultValues::default(),
            fallback_rates,
            fallback_working_days,
            assistant: AssistantSettings::default(),
        }
    }
}
