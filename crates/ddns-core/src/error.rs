//! Error types for the DDNS reconciler
//!
//! Every failure the reconciliation loop can observe is a variant here, so the
//! loop can decide per kind whether the cycle or the whole run ends.

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS reconciler
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (missing or malformed settings)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Every HTTP attempt against the IP source failed or returned an empty body
    #[error("Failed to fetch public IP from {url} after {attempts} attempts")]
    FetchExhausted {
        /// IP source URL
        url: String,
        /// Number of attempts made
        attempts: usize,
    },

    /// The extraction pattern matched nothing in the response body
    #[error("Pattern '{pattern}' did not match the IP source response")]
    NoMatch {
        /// The configured pattern
        pattern: String,
    },

    /// The extraction pattern exceeded its evaluation time budget
    #[error("Pattern '{pattern}' exceeded its evaluation time budget")]
    PatternTimeout {
        /// The configured pattern
        pattern: String,
    },

    /// Candidate IP is not a valid IPv4 address
    #[error("Invalid IPv4 address: '{0}'")]
    InvalidAddress(String),

    /// Resource group does not exist in the subscription
    #[error("Resource group not found: {0}")]
    ResourceGroupNotFound(String),

    /// DNS zone does not exist in the resource group
    #[error("DNS zone not found: {0}")]
    ZoneNotFound(String),

    /// A-record lookup failed
    #[error("Record lookup failed for {record}: {message}")]
    RecordLookup {
        /// Record name
        record: String,
        /// Error message
        message: String,
    },

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// Authentication errors
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an HTTP error
    pub fn http(msg: impl Into<String>) -> Self {
        Self::Http(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create an invalid address error
    pub fn invalid_address(candidate: impl Into<String>) -> Self {
        Self::InvalidAddress(candidate.into())
    }

    /// Create a record lookup error
    pub fn record_lookup(record: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RecordLookup {
            record: record.into(),
            message: message.into(),
        }
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether this error only aborts the current cycle.
    ///
    /// Pattern failures skip to the next poll; everything else stops the loop.
    pub fn is_cycle_abort(&self) -> bool {
        matches!(self, Self::NoMatch { .. } | Self::PatternTimeout { .. })
    }
}
