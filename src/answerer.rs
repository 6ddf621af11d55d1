//! Natural language answering over retrieved record lines.
//!
//! The language model is an opaque external collaborator: the pipeline only
//! depends on the [`Answerer`] trait, so the retrieval core can be exercised
//! with a deterministic stub instead of a live model.

mod ollama_answerer;

pub use ollama_answerer::{OllamaAnswerer, OllamaAnswererBuilder, clean_answer};

use crate::ollama::OllamaError;

/// External answering collaborator.
///
/// Given a question and retrieved context (a single record line or several
/// newline-joined lines), produces a short natural-language answer. No
/// latency or failure behavior is assumed beyond "returns a string or an
/// error"; callers decide how to degrade on failure.
pub trait Answerer: Send + Sync {
    /// Answers `question` grounded in `context`.
    fn answer(&self, question: &str, context: &str) -> Result<String, OllamaError>;
}
