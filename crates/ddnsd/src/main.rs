// # ddnsd - DDNS Daemon
//
// Thin integration layer: all reconciliation logic lives in ddns-core.
//
// The ddnsd daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Building the HTTP IP source and the Azure DNS session
// 4. Running the DDNS engine until SIGTERM/SIGINT
//
// ## Configuration
//
// ### Credentials
// - `DDNS_TENANT_ID`, `DDNS_CLIENT_ID`, `DDNS_CLIENT_SECRET`: Service principal
//
// ### Target
// - `DDNS_SUBSCRIPTION_ID`: Azure subscription
// - `DDNS_RESOURCE_GROUP`: Resource group holding the zone
// - `DDNS_ZONE_NAME`: DNS zone (e.g. example.com)
// - `DDNS_RECORD_NAME`: A-record name (default: HA)
// - `DDNS_RECORD_TTL_SECS`: TTL of the written record (default: 300)
//
// ### IP Source
// - `DDNS_IP_SOURCE_URL`: URL returning the public IP
// - `DDNS_IP_PATTERN`: Optional case-insensitive extraction pattern
// - `DDNS_POLL_INTERVAL_MS`: Delay between cycles (default: 300000)
//
// ### Runtime
// - `DDNS_MODE`: `live` (default) or `dry-run`
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Example
//
// ```bash
// export DDNS_TENANT_ID=00000000-0000-0000-0000-000000000000
// export DDNS_CLIENT_ID=11111111-1111-1111-1111-111111111111
// export DDNS_CLIENT_SECRET=...
// export DDNS_SUBSCRIPTION_ID=22222222-2222-2222-2222-222222222222
// export DDNS_RESOURCE_GROUP=rg-dns
// export DDNS_ZONE_NAME=example.com
// export DDNS_IP_SOURCE_URL=https://api.ipify.org
//
// ddnsd
// ```

use anyhow::{Context, Result};
use ddns_core::{DdnsConfig, DdnsEngine};
use ddns_ip_http::HttpIpSource;
use ddns_provider_azure::AzureDnsProvider;
use std::env;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

const ENV_LOG_LEVEL: &str = "DDNS_LOG_LEVEL";

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (the engine stopped on a fatal error)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Parse a log level name, case-insensitively
fn parse_log_level(raw: &str) -> Result<Level> {
    match raw.trim().to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "{} '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            ENV_LOG_LEVEL,
            raw
        ),
    }
}

/// Load and validate configuration from the process environment
fn load_config() -> Result<DdnsConfig> {
    let config = DdnsConfig::from_lookup(|key| env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

fn main() -> ExitCode {
    let log_level = match env::var(ENV_LOG_LEVEL) {
        Ok(raw) => match parse_log_level(&raw) {
            Ok(level) => level,
            Err(e) => {
                eprintln!("Configuration error: {}", e);
                return DdnsExitCode::ConfigError.into();
            }
        },
        Err(_) => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    let config = match load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Configuration error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    info!("Starting ddnsd daemon");

    // Cycles are strictly sequential; one thread is enough
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run_daemon(config)).into()
}

/// Build the components and run the engine until shutdown
async fn run_daemon(config: DdnsConfig) -> DdnsExitCode {
    let mut engine = match build_engine(config).await {
        Ok(engine) => engine,
        Err(e) => {
            error!("Startup failed: {:#}", e);
            return DdnsExitCode::ConfigError;
        }
    };

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        match wait_for_shutdown().await {
            Ok(signal) => info!("Received shutdown signal: {}", signal),
            Err(e) => warn!("Signal handling unavailable, shutting down: {}", e),
        }
        signal_cancel.cancel();
    });

    match engine.run(cancel).await {
        Ok(()) => {
            info!("Shutting down daemon");
            DdnsExitCode::CleanShutdown
        }
        Err(e) => {
            error!("Daemon error: {}", e);
            DdnsExitCode::RuntimeError
        }
    }
}

async fn build_engine(config: DdnsConfig) -> Result<DdnsEngine> {
    let ip_source = HttpIpSource::from_config(&config).context("Failed to build IP source")?;
    let provider = AzureDnsProvider::connect(&config)
        .await
        .context("Failed to establish Azure DNS session")?;

    Ok(DdnsEngine::new(
        Box::new(ip_source),
        Box::new(provider),
        config,
    )?)
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate()).context("Failed to setup SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to setup SIGINT handler")?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .context("Failed to wait for CTRL-C")?;
    Ok("SIGINT")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_is_case_insensitive() {
        assert_eq!(parse_log_level("DEBUG").unwrap(), Level::DEBUG);
        assert_eq!(parse_log_level(" warn ").unwrap(), Level::WARN);
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        let err = parse_log_level("verbose").unwrap_err();

        assert!(err.to_string().contains("DDNS_LOG_LEVEL"));
    }

    #[test]
    fn exit_codes_follow_systemd_conventions() {
        assert_eq!(DdnsExitCode::CleanShutdown as u8, 0);
        assert_eq!(DdnsExitCode::ConfigError as u8, 1);
        assert_eq!(DdnsExitCode::RuntimeError as u8, 2);
    }
}
