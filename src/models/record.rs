use serde::{Deserialize, Serialize};

/// A single denormalized fact line from the flattened database.
///
/// Record lines follow the `"Header (EntityName) | field: value"` convention
/// produced by the flattening step. Each line is self-contained: answering a
/// fact never requires looking at another line.
///
/// # Examples
///
/// ```
/// use factline::RecordLine;
///
/// let record = RecordLine::new("USER (Bob Smith) | Currency: EUR");
/// assert_eq!(record.as_str(), "USER (Bob Smith) | Currency: EUR");
/// assert_eq!(record.last_field(), "EUR");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordLine(String);

impl RecordLine {
    /// Creates a record line from raw text, trimming surrounding whitespace.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into().trim().to_string())
    }

    /// Returns the raw line text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the value of the last pipe-delimited field.
    ///
    /// Takes the text after the final `|` and, when that segment contains a
    /// `:`, the trimmed value after the first `:`. Used as the substitute
    /// answer when the model echoes the question back: for
    /// `"USER (Bob Smith) | Currency: EUR"` this is `"EUR"`.
    ///
    /// Lines without a `|` fall back to the whole line; segments without a
    /// `:` are returned as-is. Both keep the substitute answer non-empty for
    /// malformed input.
    pub fn last_field(&self) -> &str {
        let segment = self.0.rsplit('|').next().unwrap_or(&self.0).trim();
        match segment.split_once(':') {
            Some((_, value)) if !value.trim().is_empty() => value.trim(),
            _ => segment,
        }
    }
}

impl std::fmt::Display for RecordLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RecordLine {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}
