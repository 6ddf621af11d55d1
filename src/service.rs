use std::sync::Arc;

use anyhow::Result;

use crate::answerer::{Answerer, clean_answer};
use crate::database::{Database, DbStatus};
use crate::retriever::{RetrievalConfig, retrieve};

/// Fixed reply when retrieval finds no matching record line.
pub const NOT_FOUND_MESSAGE: &str = "I could not find that information in the database.";

/// Outcome of a single question through the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Answer {
    /// The text to show the user.
    pub text: String,
    /// The best-matching record line the answer was grounded in, when any.
    pub source: Option<String>,
}

/// Service layer running the retrieve-then-answer pipeline.
///
/// AssistantService owns the record database and an injected [`Answerer`]
/// and provides the one high-level operation every surface uses: ask a
/// question, get an answer. This service is UI-independent and is shared by
/// the CLI and the chat TUI.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use factline::{AssistantService, Database};
/// use factline::answerer::{OllamaAnswererBuilder};
/// use factline::ollama::OllamaClientBuilder;
/// use factline::retriever::RetrievalConfig;
///
/// # fn main() -> anyhow::Result<()> {
/// let client = Arc::new(OllamaClientBuilder::new().build()?);
/// let answerer = OllamaAnswererBuilder::new()
///     .client(client.clone())
///     .model("qwen2.5:0.5b")
///     .build();
/// let service = AssistantService::new(
///     Database::open("flattened_notes.txt"),
///     Arc::new(answerer),
///     RetrievalConfig::default(),
/// );
/// let answer = service.ask("What currency does Bob use?")?;
/// println!("{}", answer.text);
/// # Ok(())
/// # }
/// ```
pub struct AssistantService {
    db: Database,
    answerer: Arc<dyn Answerer>,
    config: RetrievalConfig,
}

impl AssistantService {
    /// Creates a new service over the given database and answerer.
    pub fn new(db: Database, answerer: Arc<dyn Answerer>, config: RetrievalConfig) -> Self {
        Self {
            db,
            answerer,
            config,
        }
    }

    /// Returns a reference to the underlying database.
    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Reports database availability for status displays.
    pub fn db_status(&self) -> DbStatus {
        self.db.status()
    }

    /// Answers a question against the record database.
    ///
    /// Runs the full pipeline: load records, retrieve the best-scoring
    /// lines, hand them to the answerer, clean the model output. Two
    /// degraded paths keep the reply useful without a model:
    ///
    /// - No line matches (or the database is missing): the fixed
    ///   [`NOT_FOUND_MESSAGE`] is returned and the answerer is never called.
    /// - The answerer fails (timeout, connection refused, bad payload): the
    ///   best-matching line itself is returned verbatim. The raw fact is a
    ///   better reply than an error screen.
    ///
    /// Errors are reserved for an unreadable data file.
    pub fn ask(&self, question: &str) -> Result<Answer> {
        let lines = self.db.load()?;
        let matches = retrieve(question, &lines, self.config.top_k, self.config.policy);

        let Some(best) = matches.first().cloned() else {
            return Ok(Answer {
                text: NOT_FOUND_MESSAGE.to_string(),
                source: None,
            });
        };

        let context = matches.join("\n");
        let text = match self.answerer.answer(question, &context) {
            Ok(raw) => clean_answer(&raw, question, &context),
            Err(_) => best.clone(),
        };

        Ok(Answer {
            text,
            source: Some(best),
        })
    }
}
