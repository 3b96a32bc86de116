//! Optional extraction of the IP from an IP-source response body

use ddns_core::{Error, Result};
use regex::{Regex, RegexBuilder};
use std::time::Duration;

/// Ceiling on pattern evaluation time
pub const MATCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Compiled size limit for user-supplied patterns
const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// Result of applying the pattern to a body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Exactly one match
    Single(String),
    /// Several matches; the first one is used
    First {
        /// The first match
        value: String,
        /// Total number of matches
        total: usize,
    },
}

impl Extraction {
    /// The selected match
    pub fn value(&self) -> &str {
        match self {
            Extraction::Single(value) | Extraction::First { value, .. } => value,
        }
    }
}

/// Case-insensitive pattern used to pull an IP out of a response body
#[derive(Debug, Clone)]
pub struct IpPattern {
    source: String,
    regex: Regex,
    match_timeout: Duration,
}

impl IpPattern {
    /// Compile `pattern`
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the pattern does not compile.
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .size_limit(PATTERN_SIZE_LIMIT)
            .build()
            .map_err(|e| Error::config(format!("Invalid IP extraction pattern '{}': {}", pattern, e)))?;

        Ok(Self {
            source: pattern.to_string(),
            regex,
            match_timeout: MATCH_TIMEOUT,
        })
    }

    /// Override the evaluation ceiling (defaults to [`MATCH_TIMEOUT`])
    pub fn with_match_timeout(mut self, match_timeout: Duration) -> Self {
        self.match_timeout = match_timeout;
        self
    }

    /// The pattern as configured
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Apply the pattern to `body`
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoMatch`] when nothing matches. Empty matches are
    /// ignored.
    pub fn extract(&self, body: &str) -> Result<Extraction> {
        let mut matches = self.regex.find_iter(body).filter(|m| !m.is_empty());

        let first = matches.next().ok_or_else(|| Error::NoMatch {
            pattern: self.source.clone(),
        })?;
        let others = matches.count();

        if others == 0 {
            Ok(Extraction::Single(first.as_str().to_string()))
        } else {
            Ok(Extraction::First {
                value: first.as_str().to_string(),
                total: others + 1,
            })
        }
    }

    /// Apply the pattern off the async executor, bounded by the match timeout
    pub async fn extract_bounded(&self, body: String) -> Result<Extraction> {
        let pattern = self.clone();
        let task = tokio::task::spawn_blocking(move || pattern.extract(&body));

        match tokio::time::timeout(self.match_timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(Error::http(format!(
                "Pattern evaluation task failed: {}",
                join_error
            ))),
            Err(_) => Err(Error::PatternTimeout {
                pattern: self.source.clone(),
            }),
        }
    }
}
