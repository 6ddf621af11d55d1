/// Ollama HTTP client module.
///
/// Provides a blocking HTTP client for the Ollama API with error handling,
/// retry logic, and timeout configuration.
mod client;

pub use client::{OllamaClient, OllamaClientBuilder, OllamaClientTrait, OllamaError};
