//! Chunked document index with term-overlap retrieval.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::calculation::fold_text;
use crate::error::{EngineError, EngineResult};

use super::document::PageText;

/// File name of the persisted index inside the index directory.
pub const INDEX_FILE: &str = "index.json";

const STOPWORDS: &[&str] = &[
    "que", "para", "com", "uma", "por", "dos", "das", "como", "qual", "quais", "sao", "nao",
    "mais", "sobre", "est", "esta", "the", "and", "what", "how", "for",
];

/// One retrievable piece of the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position in the index.
    pub id: usize,
    /// Page the chunk was taken from.
    pub page: u32,
    /// Chunk text.
    pub text: String,
}

/// The persisted index of one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentIndex {
    /// Source document path.
    pub document: PathBuf,
    /// Characters per chunk.
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks of a page.
    pub chunk_overlap: usize,
    /// Chunks in document order.
    pub chunks: Vec<Chunk>,
}

/// Splits `text` into windows of `size` characters, each starting
/// `size - overlap` characters after the previous one. Blank windows are
/// dropped.
///
/// ```
/// use vr_engine::assistant::chunk_text;
///
/// assert_eq!(chunk_text("abcdefgh", 4, 1), vec!["abcd", "defg", "gh"]);
/// ```
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() || size == 0 {
        return Vec::new();
    }
    let step = size.saturating_sub(overlap).max(1);

    let mut chunks = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + size).min(chars.len());
        let chunk: String = chars[start..end].iter().collect();
        if !chunk.trim().is_empty() {
            chunks.push(chunk.trim().to_string());
        }
        if end == chars.len() {
            break;
        }
        start += step;
    }
    chunks
}

/// Folded search terms of `text`: accent- and case-insensitive words of at
/// least three characters, minus common stopwords.
pub fn terms(text: &str) -> HashSet<String> {
    fold_text(text)
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 3 && !STOPWORDS.contains(t))
        .map(str::to_string)
        .collect()
}

impl DocumentIndex {
    /// Chunks every page of a document.
    pub fn build(document: &Path, pages: &[PageText], chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunks = pages
            .iter()
            .flat_map(|page| {
                chunk_text(&page.text, chunk_size, chunk_overlap)
                    .into_iter()
                    .map(move |text| (page.page, text))
            })
            .enumerate()
            .map(|(id, (page, text))| Chunk { id, page, text })
            .collect::<Vec<_>>();

        info!(document = %document.display(), chunks = chunks.len(), "Built document index");
        Self {
            document: document.to_path_buf(),
            chunk_size,
            chunk_overlap,
            chunks,
        }
    }

    /// Writes the index as JSON to `dir/index.json`, creating `dir`.
    pub fn save(&self, dir: &Path) -> EngineResult<PathBuf> {
        let path = dir.join(INDEX_FILE);
        let io_error = |e: &dyn std::fmt::Display| EngineError::AssistantError {
            message: format!("failed to save index {}: {}", path.display(), e),
        };
        fs::create_dir_all(dir).map_err(|e| io_error(&e))?;
        let json = serde_json::to_string_pretty(self).map_err(|e| io_error(&e))?;
        fs::write(&path, json).map_err(|e| io_error(&e))?;
        debug!(path = %path.display(), "Saved document index");
        Ok(path)
    }

    /// Reads an index saved by [`DocumentIndex::save`]. `path` may be the
    /// index directory or the JSON file itself.
    pub fn load(path: &Path) -> EngineResult<Self> {
        let file = if path.is_dir() {
            path.join(INDEX_FILE)
        } else {
            path.to_path_buf()
        };
        let content = fs::read_to_string(&file).map_err(|e| EngineError::AssistantError {
            message: format!("failed to read index {}: {}", file.display(), e),
        })?;
        serde_json::from_str(&content).map_err(|e| EngineError::AssistantError {
            message: format!("failed to parse index {}: {}", file.display(), e),
        })
    }

    /// Returns up to `top_k` chunks sharing the most terms with `question`,
    /// best first. Chunks sharing no term are never returned.
    pub fn search(&self, question: &str, top_k: usize) -> Vec<&Chunk> {
        let query = terms(question);
        if query.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(usize, &Chunk)> = self
            .chunks
            .iter()
            .map(|chunk| (overlap(&query, &chunk.text), chunk))
            .filter(|(score, _)| *score > 0)
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.id.cmp(&b.1.id)));

        scored.into_iter().take(top_k).map(|(_, chunk)| chunk).collect()
    }

    /// Number of chunks per page.
    pub fn page_counts(&self) -> BTreeMap<u32, usize> {
        let mut counts = BTreeMap::new();
        for chunk in &self.chunks {
            *counts.entry(chunk.page).or_insert(0) += 1;
        }
        counts
    }
}

/// Number of query terms present in `text`.
pub fn overlap(query: &HashSet<String>, text: &str) -> usize {
    terms(text).intersection(query).count()
}
