//! Document question answering over the benefit policy.
//!
//! The assistant is independent of the payout pipeline: it shares only the
//! configuration and the optional `prompt.md` template. [`DocumentAssistant`]
//! is the boundary; [`LocalDocumentAssistant`] is the offline implementation
//! shipped with the engine.

mod document;
mod index;
mod local;
mod session;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineResult;

pub use document::{PageText, extract_pages};
pub use index::{Chunk, DocumentIndex, INDEX_FILE, chunk_text, terms};
pub use local::{LocalDocumentAssistant, NO_ANSWER};
pub use session::{SessionCommand, SessionOutcome, parse_command, run_session};

/// Prompt used when no custom template is configured.
pub const DEFAULT_PROMPT: &str = "Você é um especialista em automação de processos de RH e folha de pagamento, com foco no cálculo e na compra de benefícios como Vale Refeição (VR) e Vale Alimentação (VA).

Use o contexto fornecido para responder às perguntas sobre o processamento de dados de VR/VA.

Contexto: {context}

Pergunta: {question}

Resposta:";

/// A passage an answer was drawn from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSource {
    /// Chunk id in the index.
    pub chunk: usize,
    /// Page of the chunk.
    pub page: u32,
    /// Leading text of the chunk.
    pub excerpt: String,
}

/// An answer with the passages that support it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// Answer text.
    pub answer: String,
    /// Supporting passages, most relevant first.
    pub sources: Vec<AnswerSource>,
}

/// A question-answering backend over one policy document.
pub trait DocumentAssistant: Send + Sync {
    /// Indexes `document` and persists the index. Returns the chunk count.
    fn build_index(&mut self, document: &Path) -> EngineResult<usize>;

    /// Loads a previously persisted index.
    fn load_index(&mut self, path: &Path) -> EngineResult<()>;

    /// Sets the prompt template; `None` or a blank template selects
    /// [`DEFAULT_PROMPT`].
    fn configure(&mut self, prompt_template: Option<&str>);

    /// Answers a question. `None` when the assistant has no index or the
    /// question is blank.
    fn ask(&self, question: &str) -> Option<Answer>;
}

/// Substitutes `{context}` and `{question}` in a prompt template.
///
/// ```
/// use vr_engine::assistant::render_prompt;
///
/// let prompt = render_prompt("C: {context} / Q: {question}", "regras", "quem?");
/// assert_eq!(prompt, "C: regras / Q: quem?");
/// ```
pub fn render_prompt(template: &str, context: &str, question: &str) -> String {
    template
        .replace("{context}", context)
        .replace("{question}", question)
}
