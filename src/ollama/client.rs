/// Ollama HTTP client implementation.
///
/// This module provides `OllamaClient` for making synchronous HTTP requests
/// to the Ollama API, along with error types and a builder for configuration.
use std::thread;
use std::time::Duration;

use thiserror::Error;

/// Default generation timeout in seconds.
///
/// Override with `FACTLINE_ANSWER_TIMEOUT_SECS`. A timed-out generation is
/// reported as an ordinary error; the pipeline treats it as "no answer
/// produced" and falls back to the raw context line.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Errors that can occur when interacting with the Ollama API.
#[derive(Debug, Error)]
pub enum OllamaError {
    /// Network-related errors (connection failures, DNS resolution, etc.)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Request or response timeout errors
    #[error("Request timed out")]
    Timeout(#[source] reqwest::Error),

    /// HTTP errors with status code
    #[error("HTTP error: status {status}")]
    Http { status: u16 },

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Ollama API-specific errors
    #[error("Ollama API error: {message}")]
    Api { message: String },

    /// Invalid URL configuration error
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Builder for constructing `OllamaClient` instances.
///
/// # Examples
///
/// ```
/// use factline::ollama::OllamaClientBuilder;
///
/// let client = OllamaClientBuilder::new()
///     .base_url("http://localhost:11434")
///     .model("qwen2.5:0.5b")
///     .build()
///     .expect("Failed to create client");
/// ```
#[derive(Debug, Default)]
pub struct OllamaClientBuilder {
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

impl OllamaClientBuilder {
    /// Creates a new `OllamaClientBuilder` with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL for the Ollama API.
    ///
    /// # Arguments
    ///
    /// * `url` - The base URL (e.g., "http://localhost:11434")
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the model name for Ollama API calls.
    ///
    /// # Arguments
    ///
    /// * `model` - The model name (e.g., "qwen2.5:0.5b")
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the generation request timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Builds the `OllamaClient` with the configured settings.
    ///
    /// # Environment Variables
    ///
    /// If `base_url()` was not called, checks `OLLAMA_HOST` and defaults to
    /// `http://localhost:11434`. If `model()` was not called, checks
    /// `OLLAMA_MODEL` and defaults to `qwen2.5:0.5b`. If `timeout_secs()`
    /// was not called, checks `FACTLINE_ANSWER_TIMEOUT_SECS` and defaults
    /// to 60.
    ///
    /// # Errors
    ///
    /// Returns `OllamaError::InvalidUrl` for an unparseable base URL, or
    /// `OllamaError::Network` if the HTTP client cannot be constructed.
    pub fn build(self) -> Result<OllamaClient, OllamaError> {
        let base_url = if let Some(url) = self.base_url {
            url
        } else {
            std::env::var("OLLAMA_HOST").unwrap_or_else(|_| "http://localhost:11434".to_string())
        };

        let model = if let Some(m) = self.model {
            m
        } else {
            std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "qwen2.5:0.5b".to_string())
        };

        let timeout_secs = self.timeout_secs.unwrap_or_else(|| {
            std::env::var("FACTLINE_ANSWER_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS)
        });

        reqwest::Url::parse(&base_url)
            .map_err(|e| OllamaError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(OllamaError::Network)?;

        Ok(OllamaClient {
            client,
            base_url,
            model,
        })
    }
}

/// Synchronous HTTP client for interacting with the Ollama API.
///
/// Construct with `OllamaClientBuilder`.
pub struct OllamaClient {
    client: reqwest::blocking::Client,
    base_url: String,
    model: String,
}

/// Trait for Ollama API client operations.
///
/// Enables mocking in unit tests and keeps the answering layer independent
/// of the concrete HTTP client.
pub trait OllamaClientTrait: Send + Sync {
    /// Generates text using the Ollama API.
    ///
    /// # Arguments
    ///
    /// * `model` - The name of the model to use (e.g., "qwen2.5:0.5b")
    /// * `prompt` - The prompt text to send to the model
    ///
    /// # Returns
    ///
    /// The generated text, or an error if the request fails.
    fn generate(&self, model: &str, prompt: &str) -> Result<String, OllamaError>;
}

impl OllamaClient {
    /// Returns the base URL configured for this client.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the model name configured for this client.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Lists available models from the Ollama API, sorted by size (largest first).
    ///
    /// Fetches the `/api/tags` endpoint and returns model names.
    pub fn list_models(&self) -> Result<Vec<String>, OllamaError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self.client.get(&url).send().map_err(OllamaError::Network)?;

        if !response.status().is_success() {
            return Err(OllamaError::Http {
                status: response.status().as_u16(),
            });
        }

        let json: serde_json::Value = response.json().map_err(OllamaError::Network)?;

        let mut models: Vec<(String, u64)> = json
            .get("models")
            .and_then(|m| m.as_array())
            .map(|models| {
                models
                    .iter()
                    .filter_map(|model| {
                        let name = model.get("name").and_then(|n| n.as_str())?;
                        let size = model.get("size").and_then(|s| s.as_u64()).unwrap_or(0);
                        Some((name.to_string(), size))
                    })
                    .collect()
            })
            .unwrap_or_default();

        models.sort_by(|a, b| b.1.cmp(&a.1));

        Ok(models.into_iter().map(|(name, _)| name).collect())
    }

    /// Generates text using the Ollama API.
    ///
    /// Requests are made with zero temperature and a newline stop token:
    /// the answering prompt expects a single short line, and a 0.5B-class
    /// model at temperature zero is deterministic enough for repeated
    /// identical queries.
    fn generate_internal(&self, model: &str, prompt: &str) -> Result<String, OllamaError> {
        let url = format!("{}/api/generate", self.base_url);
        let request_body = serde_json::json!({
            "model": model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "temperature": 0.0,
                "stop": ["\n"],
            },
        });

        // Wrap the HTTP call with retry logic
        retry_with_backoff(|| {
            let response = self
                .client
                .post(&url)
                .json(&request_body)
                .send()
                .map_err(|e| {
                    if e.is_timeout() {
                        OllamaError::Timeout(e)
                    } else {
                        OllamaError::Network(e)
                    }
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(OllamaError::Http {
                    status: status.as_u16(),
                });
            }

            let json: serde_json::Value = response.json().map_err(OllamaError::Network)?;

            // Extract the "response" field from Ollama API response
            json.get("response")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
                .ok_or_else(|| OllamaError::Api {
                    message: "Missing 'response' field in API response".to_string(),
                })
        })
    }
}

impl OllamaClientTrait for OllamaClient {
    fn generate(&self, model: &str, prompt: &str) -> Result<String, OllamaError> {
        self.generate_internal(model, prompt)
    }
}

/// Retries an operation with exponential backoff.
///
/// Retries up to 3 times with delays of 1s, 2s, and 4s, but only on
/// transient errors (HTTP 5xx, network errors, timeouts). Client errors
/// (HTTP 4xx) and API errors fail immediately.
///
/// # Returns
///
/// The first successful result, or the last error if all retries fail.
pub fn retry_with_backoff<F, T>(mut f: F) -> Result<T, OllamaError>
where
    F: FnMut() -> Result<T, OllamaError>,
{
    const MAX_RETRIES: usize = 3;
    const DELAYS: [u64; MAX_RETRIES] = [1, 2, 4]; // seconds

    let mut last_error = match f() {
        Ok(result) => return Ok(result),
        Err(e) => {
            if !should_retry(&e) {
                return Err(e);
            }
            e
        }
    };

    for &delay_secs in &DELAYS {
        thread::sleep(Duration::from_secs(delay_secs));

        match f() {
            Ok(result) => return Ok(result),
            Err(e) => {
                if !should_retry(&e) {
                    return Err(e);
                }
                last_error = e;
            }
        }
    }

    Err(last_error)
}

/// Determines if an error should be retried.
///
/// Transient errors (HTTP 5xx, network errors, timeouts) are retryable;
/// everything else is not.
fn should_retry(error: &OllamaError) -> bool {
    match error {
        OllamaError::Network(_) => true,
        OllamaError::Timeout(_) => true,
        OllamaError::Http { status } => *status >= 500 && *status < 600,
        OllamaError::Serialization(_) => false,
        OllamaError::Api { .. } => false,
        OllamaError::InvalidUrl(_) => false,
    }
}
