//! Offline document assistant.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::AssistantSettings;
use crate::error::EngineResult;

use super::document::extract_pages;
use super::index::{DocumentIndex, INDEX_FILE, overlap, terms};
use super::{Answer, AnswerSource, DEFAULT_PROMPT, DocumentAssistant, render_prompt};

/// Reply used when no indexed passage relates to the question.
pub const NO_ANSWER: &str =
    "Não encontrei no documento informações relacionadas a esta pergunta.";

const ANSWER_SENTENCES: usize = 3;
const EXCERPT_CHARS: usize = 200;

/// Answers questions from the indexed document itself: retrieval by term
/// overlap, then the best-matching sentences of the retrieved passages.
#[derive(Debug, Clone)]
pub struct LocalDocumentAssistant {
    settings: AssistantSettings,
    index: Option<DocumentIndex>,
    prompt_template: String,
}

impl LocalDocumentAssistant {
    /// Creates an assistant with no index and the default prompt.
    pub fn new(settings: AssistantSettings) -> Self {
        Self {
            settings,
            index: None,
            prompt_template: DEFAULT_PROMPT.to_string(),
        }
    }

    /// Returns true once an index is built or loaded.
    pub fn is_ready(&self) -> bool {
        self.index.is_some()
    }

    /// The active index.
    pub fn index(&self) -> Option<&DocumentIndex> {
        self.index.as_ref()
    }

    /// The active prompt template.
    pub fn prompt_template(&self) -> &str {
        &self.prompt_template
    }

    /// The assistant settings.
    pub fn settings(&self) -> &AssistantSettings {
        &self.settings
    }

    /// The prompt a language model would receive for `question`: the
    /// template with the retrieved passages as `{context}`.
    pub fn prompt_for(&self, question: &str) -> Option<String> {
        let index = self.index.as_ref()?;
        let context = index
            .search(question, self.settings.top_k)
            .iter()
            .map(|chunk| chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        Some(render_prompt(&self.prompt_template, &context, question))
    }

    /// Loads the persisted index when it matches the configured chunking,
    /// otherwise builds it from the configured document.
    pub fn setup(settings: AssistantSettings, prompt_template: Option<&str>) -> EngineResult<Self> {
        let mut assistant = Self::new(settings);
        let index_dir = assistant.settings.index_dir.clone();
        let document = assistant.settings.document.clone();

        let loaded = index_dir.join(INDEX_FILE).exists()
            && match assistant.load_index(&index_dir) {
                Ok(()) => assistant.index.as_ref().is_some_and(|idx| {
                    idx.chunk_size == assistant.settings.chunk_size
                        && idx.chunk_overlap == assistant.settings.chunk_overlap
                }),
                Err(e) => {
                    warn!(error = %e, "Ignoring unreadable index");
                    false
                }
            };

        if loaded {
            info!(path = %index_dir.display(), "Loaded existing document index");
        } else {
            assistant.build_index(&document)?;
        }

        assistant.configure(prompt_template);
        Ok(assistant)
    }

    fn index_dir(&self) -> PathBuf {
        self.settings.index_dir.clone()
    }
}

impl DocumentAssistant for LocalDocumentAssistant {
    fn build_index(&mut self, document: &Path) -> EngineResult<usize> {
        let pages = extract_pages(document)?;
        let index = DocumentIndex::build(
            document,
            &pages,
            self.settings.chunk_size,
            self.settings.chunk_overlap,
        );
        index.save(&self.index_dir())?;
        let chunks = index.chunks.len();
        self.index = Some(index);
        Ok(chunks)
    }

    fn load_index(&mut self, path: &Path) -> EngineResult<()> {
        let index = DocumentIndex::load(path)?;
        debug!(chunks = index.chunks.len(), "Document index loaded");
        self.index = Some(index);
        Ok(())
    }

    fn configure(&mut self, prompt_template: Option<&str>) {
        self.prompt_template = match prompt_template.filter(|p| !p.trim().is_empty()) {
            Some(custom) => {
                info!("Assistant configured with custom prompt");
                custom.to_string()
            }
            None => DEFAULT_PROMPT.to_string(),
        };
    }

    fn ask(&self, question: &str) -> Option<Answer> {
        let index = self.index.as_ref()?;
        let question = question.trim();
        if question.is_empty() {
            return None;
        }

        let hits = index.search(question, self.settings.top_k);
        debug!(
            hits = hits.len(),
            model = %self.settings.model_name,
            "Retrieved passages"
        );
        if hits.is_empty() {
            return Some(Answer {
                answer: NO_ANSWER.to_string(),
                sources: Vec::new(),
            });
        }

        let query = terms(question);
        let mut sentences: Vec<(usize, usize, &str)> = hits
            .iter()
            .enumerate()
            .flat_map(|(rank, chunk)| {
                split_sentences(&chunk.text).map(move |sentence| (rank, sentence))
            })
            .map(|(rank, sentence)| (overlap(&query, sentence), rank, sentence))
            .filter(|(score, _, _)| *score > 0)
            .collect();
        sentences.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        let mut picked: Vec<&str> = Vec::new();
        for (_, _, sentence) in sentences {
            if picked.len() == ANSWER_SENTENCES {
                break;
            }
            if !picked.contains(&sentence) {
                picked.push(sentence);
            }
        }

        let sources = hits
            .iter()
            .map(|chunk| AnswerSource {
                chunk: chunk.id,
                page: chunk.page,
                excerpt: chunk.text.chars().take(EXCERPT_CHARS).collect(),
            })
            .collect();

        Some(Answer {
            answer: picked.join(" "),
            sources,
        })
    }
}

fn split_sentences(text: &str) -> impl Iterator<Item = &str> {
    text.split_inclusive(|c: char| matches!(c, '.' | '!' | '?' | '\n'))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
