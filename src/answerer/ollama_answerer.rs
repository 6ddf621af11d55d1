//! Ollama-backed answerer and model-output cleanup.

use std::sync::Arc;

use crate::models::RecordLine;
use crate::ollama::{OllamaClientTrait, OllamaError};

use super::Answerer;

/// Prompt template for brief, context-grounded answers.
///
/// Kept deliberately short: sub-1B models lose the instruction when the
/// prompt grows, and the newline stop token ends generation after the first
/// answer line anyway.
const PROMPT_TEMPLATE: &str = "Context: {context}

Question: {input}

Answer the question using the Context. Be extremely brief.
Answer:";

/// Builder for constructing `OllamaAnswerer` instances.
#[derive(Default)]
pub struct OllamaAnswererBuilder {
    client: Option<Arc<dyn OllamaClientTrait>>,
    model: Option<String>,
}

impl OllamaAnswererBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the Ollama client to use.
    pub fn client(mut self, client: Arc<dyn OllamaClientTrait>) -> Self {
        self.client = Some(client);
        self
    }

    /// Sets the model to generate with.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Builds the `OllamaAnswerer`.
    ///
    /// # Panics
    ///
    /// Panics if `client()` or `model()` was not called.
    #[must_use]
    pub fn build(self) -> OllamaAnswerer {
        OllamaAnswerer {
            client: self.client.expect("client must be set via client() method"),
            model: self.model.expect("model must be set via model() method"),
        }
    }
}

/// Answers questions by prompting a local Ollama model with retrieved context.
pub struct OllamaAnswerer {
    client: Arc<dyn OllamaClientTrait>,
    model: String,
}

impl OllamaAnswerer {
    /// Creates a new `OllamaAnswerer` with the specified client and model.
    #[must_use]
    pub fn new(client: Arc<dyn OllamaClientTrait>, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// Returns the model this answerer generates with.
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl Answerer for OllamaAnswerer {
    fn answer(&self, question: &str, context: &str) -> Result<String, OllamaError> {
        let prompt = PROMPT_TEMPLATE
            .replace("{context}", context)
            .replace("{input}", question);

        self.client.generate(&self.model, &prompt)
    }
}

/// Cleans raw model output, guarding against the echo failure mode.
///
/// Very small models sometimes repeat the question back instead of
/// answering it. When the trimmed output equals the question
/// case-insensitively, the answer is replaced by the last pipe-delimited
/// field of the context line (for `"USER (Bob Smith) | Currency: EUR"`
/// that is `"EUR"`). Anything else passes through trimmed.
///
/// This only catches exact echoes, not partial echoes or hallucinations.
///
/// # Examples
///
/// ```
/// use factline::answerer::clean_answer;
///
/// let context = "USER (Bob Smith) | Currency: EUR";
/// assert_eq!(clean_answer("  EUR\n", "What currency?", context), "EUR");
/// assert_eq!(
///     clean_answer("What currency?", "What currency?", context),
///     "EUR"
/// );
/// ```
pub fn clean_answer(raw: &str, question: &str, context: &str) -> String {
    let answer = raw.trim();
    if answer.eq_ignore_ascii_case(question.trim()) {
        // Echo failure: fall back to the raw fact value. Multi-line
        // context falls back to its first (best-scoring) line.
        let best_line = context.lines().next().unwrap_or(context);
        return RecordLine::new(best_line).last_field().to_string();
    }
    answer.to_string()
}
