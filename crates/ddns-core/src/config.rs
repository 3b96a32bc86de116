//! Configuration types for the DDNS reconciler
//!
//! A [`DdnsConfig`] is built once at startup and passed by reference to every
//! component. Nothing in this crate reads the process environment; the daemon
//! hands [`DdnsConfig::from_lookup`] a closure over whatever key/value source it
//! uses.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tenant (directory) id of the service principal
pub const ENV_TENANT_ID: &str = "DDNS_TENANT_ID";
/// Application (client) id of the service principal
pub const ENV_CLIENT_ID: &str = "DDNS_CLIENT_ID";
/// Client secret of the service principal
pub const ENV_CLIENT_SECRET: &str = "DDNS_CLIENT_SECRET";
/// Azure subscription id
pub const ENV_SUBSCRIPTION_ID: &str = "DDNS_SUBSCRIPTION_ID";
/// Resource group holding the DNS zone
pub const ENV_RESOURCE_GROUP: &str = "DDNS_RESOURCE_GROUP";
/// DNS zone name
pub const ENV_ZONE_NAME: &str = "DDNS_ZONE_NAME";
/// A-record name within the zone
pub const ENV_RECORD_NAME: &str = "DDNS_RECORD_NAME";
/// URL returning the public IP
pub const ENV_IP_SOURCE_URL: &str = "DDNS_IP_SOURCE_URL";
/// Optional extraction pattern applied to the IP source response
pub const ENV_IP_PATTERN: &str = "DDNS_IP_PATTERN";
/// Poll interval in milliseconds
pub const ENV_POLL_INTERVAL_MS: &str = "DDNS_POLL_INTERVAL_MS";
/// Record TTL in seconds
pub const ENV_RECORD_TTL_SECS: &str = "DDNS_RECORD_TTL_SECS";
/// Operating mode (`live` or `dry-run`)
pub const ENV_MODE: &str = "DDNS_MODE";

/// Main DDNS configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// Service principal credentials
    pub credentials: Credentials,

    /// Azure subscription id
    pub subscription_id: String,

    /// Resource group holding the zone
    pub resource_group: String,

    /// DNS zone name (e.g. "example.com")
    pub zone_name: String,

    /// A-record name within the zone
    #[serde(default = "default_record_name")]
    pub record_name: String,

    /// URL returning the public IP
    pub ip_source_url: String,

    /// Optional case-insensitive pattern used to extract the IP from the response
    #[serde(default)]
    pub ip_pattern: Option<String>,

    /// Delay between reconciliation cycles (in milliseconds)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// TTL written to the record (in seconds)
    #[serde(default = "default_record_ttl_secs")]
    pub record_ttl_secs: u32,

    /// Perform lookups but never write to the provider
    #[serde(default)]
    pub dry_run: bool,
}

impl DdnsConfig {
    /// Build a configuration from a key/value lookup
    ///
    /// Missing optional keys take their defaults. Required keys are not checked
    /// here; call [`DdnsConfig::validate`] before use.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, crate::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string());
        let non_blank = |key: &str| value(key).filter(|v| !v.is_empty());

        Ok(Self {
            credentials: Credentials {
                tenant_id: value(ENV_TENANT_ID).unwrap_or_default(),
                client_id: value(ENV_CLIENT_ID).unwrap_or_default(),
                client_secret: value(ENV_CLIENT_SECRET).unwrap_or_default(),
            },
            subscription_id: value(ENV_SUBSCRIPTION_ID).unwrap_or_default(),
            resource_group: value(ENV_RESOURCE_GROUP).unwrap_or_default(),
            zone_name: value(ENV_ZONE_NAME).unwrap_or_default(),
            record_name: non_blank(ENV_RECORD_NAME).unwrap_or_else(default_record_name),
            ip_source_url: value(ENV_IP_SOURCE_URL).unwrap_or_default(),
            ip_pattern: non_blank(ENV_IP_PATTERN),
            poll_interval_ms: parse_or(
                ENV_POLL_INTERVAL_MS,
                non_blank(ENV_POLL_INTERVAL_MS),
                default_poll_interval_ms(),
            )?,
            record_ttl_secs: parse_or(
                ENV_RECORD_TTL_SECS,
                non_blank(ENV_RECORD_TTL_SECS),
                default_record_ttl_secs(),
            )?,
            dry_run: parse_mode(non_blank(ENV_MODE))?,
        })
    }

    /// Validate the configuration
    ///
    /// Every required field must be non-blank and the numeric settings must be
    /// positive.
    pub fn validate(&self) -> Result<(), crate::Error> {
        let required = [
            (ENV_TENANT_ID, &self.credentials.tenant_id),
            (ENV_CLIENT_ID, &self.credentials.client_id),
            (ENV_CLIENT_SECRET, &self.credentials.client_secret),
            (ENV_SUBSCRIPTION_ID, &self.subscription_id),
            (ENV_RESOURCE_GROUP, &self.resource_group),
            (ENV_ZONE_NAME, &self.zone_name),
            (ENV_RECORD_NAME, &self.record_name),
            (ENV_IP_SOURCE_URL, &self.ip_source_url),
        ];

        let missing: Vec<&str> = required
            .iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(key, _)| *key)
            .collect();

        if !missing.is_empty() {
            return Err(crate::Error::config(format!(
                "Missing required setting(s): {}",
                missing.join(", ")
            )));
        }

        if !self.ip_source_url.starts_with("https://") && !self.ip_source_url.starts_with("http://")
        {
            return Err(crate::Error::config(format!(
                "{} must use HTTP or HTTPS scheme. Got: {}",
                ENV_IP_SOURCE_URL, self.ip_source_url
            )));
        }

        if self.poll_interval_ms == 0 {
            return Err(crate::Error::config(format!(
                "{} must be > 0",
                ENV_POLL_INTERVAL_MS
            )));
        }

        if self.record_ttl_secs == 0 {
            return Err(crate::Error::config(format!(
                "{} must be > 0",
                ENV_RECORD_TTL_SECS
            )));
        }

        Ok(())
    }

    /// Poll interval as a [`Duration`]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Service principal credentials
///
/// The Debug implementation never prints the client secret.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// Tenant (directory) id
    pub tenant_id: String,
    /// Application (client) id
    pub client_id: String,
    /// Client secret
    /// ⚠️ NEVER log this value
    #[serde(skip_serializing)]
    pub client_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<REDACTED>")
            .finish()
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &str,
    raw: Option<String>,
    default: T,
) -> Result<T, crate::Error> {
    match raw {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| {
            crate::Error::config(format!("{} is not a valid number: '{}'", key, raw))
        }),
    }
}

/// `live` or `dry-run`, case-insensitive; anything else is rejected
fn parse_mode(raw: Option<String>) -> Result<bool, crate::Error> {
    match raw {
        None => Ok(false),
        Some(mode) if mode.eq_ignore_ascii_case("live") => Ok(false),
        Some(mode) if mode.eq_ignore_ascii_case("dry-run") => Ok(true),
        Some(mode) => Err(crate::Error::config(format!(
            "{} must be 'live' or 'dry-run'. Got: '{}'",
            ENV_MODE, mode
        ))),
    }
}

fn default_record_name() -> String {
    "HA".to_string()
}

fn default_poll_interval_ms() -> u64 {
    300_000
}

fn default_record_ttl_secs() -> u32 {
    300
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn full_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            (ENV_TENANT_ID, "tenant"),
            (ENV_CLIENT_ID, "client"),
            (ENV_CLIENT_SECRET, "s3cr3t-value"),
            (ENV_SUBSCRIPTION_ID, "sub"),
            (ENV_RESOURCE_GROUP, "rg-dns"),
            (ENV_ZONE_NAME, "example.com"),
            (ENV_IP_SOURCE_URL, "https://api.ipify.org"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> Result<DdnsConfig, crate::Error> {
        DdnsConfig::from_lookup(|key| env.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn defaults_apply_when_optional_keys_absent() {
        let config = load(&full_env()).unwrap();

        assert_eq!(config.record_name, "HA");
        assert_eq!(config.poll_interval_ms, 300_000);
        assert_eq!(config.record_ttl_secs, 300);
        assert_eq!(config.ip_pattern, None);
        assert!(!config.dry_run);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn overrides_are_read() {
        let mut env = full_env();
        env.insert(ENV_RECORD_NAME, "home");
        env.insert(ENV_POLL_INTERVAL_MS, "60000");
        env.insert(ENV_RECORD_TTL_SECS, "120");
        env.insert(ENV_IP_PATTERN, r"\d+\.\d+\.\d+\.\d+");
        env.insert(ENV_MODE, "DRY-RUN");

        let config = load(&env).unwrap();

        assert_eq!(config.record_name, "home");
        assert_eq!(config.poll_interval(), Duration::from_secs(60));
        assert_eq!(config.record_ttl_secs, 120);
        assert_eq!(config.ip_pattern.as_deref(), Some(r"\d+\.\d+\.\d+\.\d+"));
        assert!(config.dry_run);
    }

    #[test]
    fn blank_required_settings_are_reported_together() {
        let mut env = full_env();
        env.insert(ENV_ZONE_NAME, "   ");
        env.remove(ENV_CLIENT_SECRET);

        let err = load(&env).unwrap().validate().unwrap_err().to_string();

        assert!(err.contains(ENV_ZONE_NAME), "{}", err);
        assert!(err.contains(ENV_CLIENT_SECRET), "{}", err);
    }

    #[test]
    fn malformed_number_is_a_config_error() {
        let mut env = full_env();
        env.insert(ENV_POLL_INTERVAL_MS, "five minutes");

        assert!(matches!(load(&env), Err(crate::Error::Config(_))));
    }

    #[test]
    fn unknown_mode_is_a_config_error() {
        let mut env = full_env();
        env.insert(ENV_MODE, "dryrun");

        let err = load(&env).unwrap_err();

        assert!(matches!(err, crate::Error::Config(ref m) if m.contains(ENV_MODE)));
    }

    #[test]
    fn live_mode_is_accepted() {
        let mut env = full_env();
        env.insert(ENV_MODE, "Live");

        assert!(!load(&env).unwrap().dry_run);
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut env = full_env();
        env.insert(ENV_POLL_INTERVAL_MS, "0");

        assert!(load(&env).unwrap().validate().is_err());
    }

    #[test]
    fn non_http_url_is_rejected() {
        let mut env = full_env();
        env.insert(ENV_IP_SOURCE_URL, "ftp://example.com/ip");

        assert!(load(&env).unwrap().validate().is_err());
    }

    #[test]
    fn client_secret_not_exposed_in_debug() {
        let config = load(&full_env()).unwrap();
        let debug_str = format!("{:?}", config);

        assert!(!debug_str.contains("s3cr3t-value"));
        assert!(debug_str.contains("<REDACTED>"));
    }
}
