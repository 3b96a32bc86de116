// # HTTP IP Source
//
// This crate provides the HTTP-based public IP resolver for the DDNS
// reconciler.
//
// ## Behavior
//
// - Up to 3 sequential GET attempts per resolve, no delay between them
// - A non-success status, transport error or empty body counts as a failed attempt
// - An optional case-insensitive pattern extracts the IP from the body
// - Without a pattern the whole trimmed body is the candidate
//
// The candidate is returned as text; the engine validates it.

pub mod pattern;

pub use pattern::{Extraction, IpPattern};

use ddns_core::traits::IpSource;
use ddns_core::{DdnsConfig, Error, Result};
use std::time::Duration;

/// Maximum GET attempts per resolve
pub const MAX_FETCH_ATTEMPTS: usize = 3;

/// Per-request HTTP timeout
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP-based public IP resolver
#[derive(Debug, Clone)]
pub struct HttpIpSource {
    /// URL to fetch IP from
    url: String,

    /// Optional extraction pattern
    pattern: Option<IpPattern>,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: URL to fetch IP from (e.g., "https://api.ipify.org")
    /// - `pattern`: Optional extraction pattern
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the pattern does not compile or the
    /// HTTP client cannot be built.
    pub fn new(url: impl Into<String>, pattern: Option<&str>) -> Result<Self> {
        let pattern = pattern.map(IpPattern::new).transpose()?;
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            pattern,
            client,
        })
    }

    /// Create from the reconciler configuration
    pub fn from_config(config: &DdnsConfig) -> Result<Self> {
        Self::new(config.ip_source_url.clone(), config.ip_pattern.as_deref())
    }

    /// One GET attempt; `None` when the attempt did not produce a usable body
    async fn fetch_once(&self, attempt: usize) -> Option<String> {
        let response = match self.client.get(&self.url).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(
                    "IP fetch attempt {}/{} to {} failed: {}",
                    attempt,
                    MAX_FETCH_ATTEMPTS,
                    self.url,
                    e
                );
                return None;
            }
        };

        if !response.status().is_success() {
            tracing::warn!(
                "IP fetch attempt {}/{} to {} returned HTTP {}",
                attempt,
                MAX_FETCH_ATTEMPTS,
                self.url,
                response.status()
            );
            return None;
        }

        match response.text().await {
            Ok(body) if !body.trim().is_empty() => Some(body),
            Ok(_) => {
                tracing::warn!(
                    "IP fetch attempt {}/{} to {} returned an empty body",
                    attempt,
                    MAX_FETCH_ATTEMPTS,
                    self.url
                );
                None
            }
            Err(e) => {
                tracing::warn!(
                    "IP fetch attempt {}/{}: failed to read response from {}: {}",
                    attempt,
                    MAX_FETCH_ATTEMPTS,
                    self.url,
                    e
                );
                None
            }
        }
    }

    /// Fetch the body, spending at most [`MAX_FETCH_ATTEMPTS`] attempts
    async fn fetch_body(&self) -> Result<String> {
        for attempt in 1..=MAX_FETCH_ATTEMPTS {
            if let Some(body) = self.fetch_once(attempt).await {
                return Ok(body);
            }
        }

        Err(Error::FetchExhausted {
            url: self.url.clone(),
            attempts: MAX_FETCH_ATTEMPTS,
        })
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn resolve(&self) -> Result<String> {
        let body = self.fetch_body().await?;

        let Some(pattern) = &self.pattern else {
            let candidate = body.trim().to_string();
            tracing::debug!("Resolved candidate {} from {}", candidate, self.url);
            return Ok(candidate);
        };

        let extraction = pattern.extract_bounded(body).await?;
        if let Extraction::First { value, total } = &extraction {
            tracing::info!(
                "Pattern '{}' matched {} times in response from {}; using first match {}",
                pattern.as_str(),
                total,
                self.url,
                value
            );
        }

        let candidate = extraction.value().to_string();
        tracing::debug!("Resolved candidate {} from {}", candidate, self.url);
        Ok(candidate)
    }

    fn describe(&self) -> String {
        match &self.pattern {
            Some(pattern) => format!("{} (pattern '{}')", self.url, pattern.as_str()),
            None => self.url.clone(),
        }
    }
}
