//! Keyword-scoring retrieval over flat record lines.
//!
//! Retrieval is symbolic: a query is broken into lowercase keywords and
//! every database line is scored by how many distinct keywords it contains
//! as substrings. No embeddings, no index — a single linear scan per query.

/// How keywords are extracted from a query.
///
/// Two policies shipped in the original tooling; which one fits depends on
/// the data. `MinLength` suppresses noise words ("is", "do") at the cost of
/// dropping short meaningful tokens ("id", "ok"); `AllTokens` keeps
/// everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeywordPolicy {
    /// Drop tokens shorter than three characters. The default.
    #[default]
    MinLength,
    /// Keep every word token regardless of length.
    AllTokens,
}

impl KeywordPolicy {
    /// Minimum token length kept by [`KeywordPolicy::MinLength`].
    pub const MIN_TOKEN_LEN: usize = 3;

    fn keeps(self, token: &str) -> bool {
        match self {
            KeywordPolicy::MinLength => token.chars().count() >= Self::MIN_TOKEN_LEN,
            KeywordPolicy::AllTokens => true,
        }
    }
}

/// Retrieval configuration.
///
/// Parsed from environment variables at call time with fallback defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrievalConfig {
    /// Keyword extraction policy.
    pub policy: KeywordPolicy,
    /// How many top-scoring lines to hand to the answerer.
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            policy: KeywordPolicy::default(),
            top_k: 1,
        }
    }
}

impl RetrievalConfig {
    /// Parses configuration from environment variables.
    ///
    /// Falls back to defaults when env vars are not set or invalid.
    ///
    /// # Environment Variables
    ///
    /// - `FACTLINE_KEYWORD_POLICY` (`min-length` | `all-tokens`, default
    ///   `min-length`)
    /// - `FACTLINE_TOP_K` (usize >= 1, default 1)
    pub fn from_env() -> Self {
        let policy = match std::env::var("FACTLINE_KEYWORD_POLICY").as_deref() {
            Ok("all-tokens") => KeywordPolicy::AllTokens,
            _ => KeywordPolicy::MinLength,
        };

        let top_k = std::env::var("FACTLINE_TOP_K")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|&k| k >= 1)
            .unwrap_or(1);

        Self { policy, top_k }
    }
}

/// Extracts lowercase keywords from a query under the given policy.
///
/// Tokens are maximal alphanumeric runs, so punctuation never leaks into a
/// keyword (`"Bob's?"` tokenizes as `bob`, `s`). Duplicate keywords are
/// removed keeping first occurrence: a word repeated in the query scores at
/// most once per line.
///
/// # Examples
///
/// ```
/// use factline::retriever::{KeywordPolicy, extract_keywords};
///
/// let kw = extract_keywords("What currency does Bob use?", KeywordPolicy::MinLength);
/// assert_eq!(kw, vec!["what", "currency", "does", "bob", "use"]);
///
/// let kw = extract_keywords("it is ok", KeywordPolicy::MinLength);
/// assert!(kw.is_empty());
/// ```
pub fn extract_keywords(query: &str, policy: KeywordPolicy) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for token in query
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
    {
        if policy.keeps(token) && !keywords.iter().any(|k| k == token) {
            keywords.push(token.to_string());
        }
    }
    keywords
}

/// Counts how many of the keywords occur as substrings of the line.
///
/// Containment is plain substring match on the lowercased line, not token
/// boundary match, so `currency` matches `"Currency: EUR"`.
pub fn score_line(line: &str, keywords: &[String]) -> usize {
    let line_lower = line.to_lowercase();
    keywords
        .iter()
        .filter(|kw| line_lower.contains(kw.as_str()))
        .count()
}

/// Returns the `top_k` best-matching lines for the query.
///
/// Every line is scored by distinct-keyword containment; lines scoring zero
/// are discarded and the rest are sorted by score descending with a stable
/// sort, so ties keep the database's original scan order. When a tie spans
/// the `top_k` cutoff, the earliest-scanned lines win.
///
/// An empty database or a query whose keyword set survives filtering empty
/// (for example only stop-length words under [`KeywordPolicy::MinLength`])
/// yields an empty result — the caller's "not found" signal.
///
/// # Examples
///
/// ```
/// use factline::retriever::{KeywordPolicy, retrieve};
///
/// let lines = vec![
///     "USER (Bob Smith) | Currency: EUR".to_string(),
///     "USER (Alice Chen) | Currency: USD".to_string(),
///     "PRODUCT (Widget) | Price: 9.99".to_string(),
/// ];
/// let top = retrieve("What currency does Bob use?", &lines, 1, KeywordPolicy::MinLength);
/// assert_eq!(top, vec!["USER (Bob Smith) | Currency: EUR".to_string()]);
/// ```
pub fn retrieve(query: &str, lines: &[String], top_k: usize, policy: KeywordPolicy) -> Vec<String> {
    let keywords = extract_keywords(query, policy);
    if keywords.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(usize, &String)> = lines
        .iter()
        .map(|line| (score_line(line, &keywords), line))
        .filter(|(score, _)| *score > 0)
        .collect();

    // Stable sort: equal scores keep original scan order, which callers
    // (and the tests) can observe.
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    scored
        .into_iter()
        .take(top_k)
        .map(|(_, line)| line.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn sample_db() -> Vec<String> {
        vec![
            "USER (Bob Smith) | Currency: EUR".to_string(),
            "USER (Alice Chen) | Currency: USD".to_string(),
            "PRODUCT (Widget) | Price: 9.99".to_string(),
        ]
    }

    #[test]
    fn min_length_policy_drops_short_tokens() {
        let kw = extract_keywords("is Bob ok", KeywordPolicy::MinLength);
        assert_eq!(kw, vec!["bob"]);
    }

    #[test]
    fn all_tokens_policy_keeps_short_tokens() {
        let kw = extract_keywords("is Bob ok", KeywordPolicy::AllTokens);
        assert_eq!(kw, vec!["is", "bob", "ok"]);
    }

    #[test]
    fn duplicate_query_words_are_deduplicated() {
        let kw = extract_keywords("currency currency CURRENCY", KeywordPolicy::MinLength);
        assert_eq!(kw, vec!["currency"]);
    }

    #[test]
    fn punctuation_does_not_leak_into_keywords() {
        let kw = extract_keywords("What's Bob's currency?!", KeywordPolicy::MinLength);
        assert_eq!(kw, vec!["what", "bob", "currency"]);
    }

    #[test]
    fn score_counts_distinct_keyword_containment() {
        let keywords = extract_keywords("What currency does Bob use?", KeywordPolicy::MinLength);
        assert_eq!(score_line("USER (Bob Smith) | Currency: EUR", &keywords), 2);
        assert_eq!(
            score_line("USER (Alice Chen) | Currency: USD", &keywords),
            1
        );
        assert_eq!(score_line("PRODUCT (Widget) | Price: 9.99", &keywords), 0);
    }

    #[test]
    fn top_match_is_highest_scoring_line() {
        let top = retrieve(
            "What currency does Bob use?",
            &sample_db(),
            1,
            KeywordPolicy::MinLength,
        );
        assert_eq!(top, vec!["USER (Bob Smith) | Currency: EUR".to_string()]);
    }

    #[test]
    fn zero_scoring_lines_are_excluded() {
        let top = retrieve(
            "What currency does Bob use?",
            &sample_db(),
            10,
            KeywordPolicy::MinLength,
        );
        assert_eq!(top.len(), 2);
        assert!(!top.contains(&"PRODUCT (Widget) | Price: 9.99".to_string()));
    }

    #[test]
    fn ties_keep_original_scan_order() {
        let lines = vec![
            "USER (Ann) | Currency: EUR".to_string(),
            "USER (Ben) | Currency: GBP".to_string(),
            "USER (Cal) | Currency: JPY".to_string(),
        ];
        let top = retrieve("currency", &lines, 2, KeywordPolicy::MinLength);
        assert_eq!(top, vec![lines[0].clone(), lines[1].clone()]);
    }

    #[test]
    fn top_k_caps_result_length() {
        let lines = vec![
            "A | currency: 1".to_string(),
            "B | currency: 2".to_string(),
            "C | currency: 3".to_string(),
        ];
        assert_eq!(
            retrieve("currency", &lines, 2, KeywordPolicy::MinLength).len(),
            2
        );
    }

    #[test]
    fn returned_scores_dominate_excluded_scores() {
        let lines = vec![
            "one keyword bob".to_string(),
            "bob smith currency match".to_string(),
            "unrelated line".to_string(),
        ];
        let keywords = extract_keywords("bob smith currency", KeywordPolicy::MinLength);
        let top = retrieve("bob smith currency", &lines, 1, KeywordPolicy::MinLength);
        assert_eq!(top.len(), 1);
        let returned_score = score_line(&top[0], &keywords);
        for line in &lines {
            if !top.contains(line) {
                assert!(score_line(line, &keywords) <= returned_score);
            }
        }
    }

    #[test]
    fn empty_database_returns_empty() {
        let top = retrieve("anything at all", &[], 3, KeywordPolicy::MinLength);
        assert!(top.is_empty());
    }

    #[test]
    fn stop_length_query_returns_empty_under_min_length() {
        let top = retrieve("it is ok", &sample_db(), 3, KeywordPolicy::MinLength);
        assert!(top.is_empty());
    }

    #[test]
    fn retrieval_is_idempotent() {
        let first = retrieve("bob currency", &sample_db(), 2, KeywordPolicy::MinLength);
        let second = retrieve("bob currency", &sample_db(), 2, KeywordPolicy::MinLength);
        assert_eq!(first, second);
    }

    #[test]
    #[serial]
    fn config_from_env_defaults() {
        unsafe {
            std::env::remove_var("FACTLINE_KEYWORD_POLICY");
            std::env::remove_var("FACTLINE_TOP_K");
        }

        let config = RetrievalConfig::from_env();
        assert_eq!(config.policy, KeywordPolicy::MinLength);
        assert_eq!(config.top_k, 1);
    }

    #[test]
    #[serial]
    fn config_from_env_reads_overrides() {
        unsafe {
            std::env::set_var("FACTLINE_KEYWORD_POLICY", "all-tokens");
            std::env::set_var("FACTLINE_TOP_K", "3");
        }

        let config = RetrievalConfig::from_env();
        assert_eq!(config.policy, KeywordPolicy::AllTokens);
        assert_eq!(config.top_k, 3);

        unsafe {
            std::env::remove_var("FACTLINE_KEYWORD_POLICY");
            std::env::remove_var("FACTLINE_TOP_K");
        }
    }

    #[test]
    #[serial]
    fn config_from_env_rejects_zero_top_k() {
        unsafe {
            std::env::set_var("FACTLINE_TOP_K", "0");
        }

        let config = RetrievalConfig::from_env();
        assert_eq!(config.top_k, 1);

        unsafe {
            std::env::remove_var("FACTLINE_TOP_K");
        }
    }
}
