//! Core DDNS engine
//!
//! The DdnsEngine is responsible for:
//! - Resolving the public IP via IpSource
//! - Detecting changes against the last observed IP
//! - Reconciling the A record via DnsProvider
//! - Sleeping between cycles until cancelled
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   candidate   ┌──────────────┐   changed IP   ┌──────────────┐
//! │  IpSource   │──────────────▶│ detect_change│───────────────▶│  reconcile   │
//! └─────────────┘               └──────────────┘                └──────────────┘
//!        ▲                              ▲                               │
//!        │                              │ observed IP                   ▼
//!        │                      ┌──────────────┐                ┌──────────────┐
//!        └──────── cycle ───────│  DdnsEngine  │                │ DnsProvider  │
//!                               └──────────────┘                └──────────────┘
//! ```
//!
//! ## Cycle
//!
//! 1. Resolve the candidate IP
//! 2. Compare with the observed IP; unchanged → sleep
//! 3. Reconcile the record
//! 4. Remember the candidate as the observed IP
//! 5. Sleep for the poll interval
//!
//! Cancellation is observed at every await: a pending resolve, provider call,
//! completion poll or sleep is dropped and the engine stops.

use crate::change::{Change, detect_change};
use crate::config::DdnsConfig;
use crate::error::Result;
use crate::reconcile::reconcile;
use crate::traits::{DnsProvider, IpSource, UpdateResult};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// What a single cycle did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Candidate matched the observed IP; no provider calls were made
    Unchanged,
    /// Candidate differed and the record was reconciled
    Reconciled(UpdateResult),
    /// The cycle was abandoned without touching the provider
    Skipped {
        /// Why the cycle was abandoned
        reason: String,
    },
}

/// Core DDNS engine
///
/// The engine drives the resolve → compare → reconcile → sleep loop for a
/// single A record. It owns the only cross-cycle state, the observed IP,
/// which starts empty so the first cycle always reconciles.
///
/// ## Lifecycle
///
/// 1. Create with [`DdnsEngine::new()`]
/// 2. Start with [`DdnsEngine::run()`]
/// 3. Engine runs until the token is cancelled or a fatal error occurs
///
/// ## Threading
///
/// One cycle is in flight at a time, all on the caller's task.
pub struct DdnsEngine {
    /// IP source for discovering the public IP
    ip_source: Box<dyn IpSource>,

    /// Authorized provider session, established once by the caller
    provider: Box<dyn DnsProvider>,

    /// Immutable configuration
    config: DdnsConfig,

    /// Last candidate that was successfully handled
    observed_ip: String,
}

impl DdnsEngine {
    /// Create a new DDNS engine
    ///
    /// # Parameters
    ///
    /// - `ip_source`: IP source implementation
    /// - `provider`: Established provider session
    /// - `config`: DDNS configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` fails validation.
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        config: DdnsConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            ip_source,
            provider,
            config,
            observed_ip: String::new(),
        })
    }

    /// The last IP the engine handled (empty before the first success)
    pub fn observed_ip(&self) -> &str {
        &self.observed_ip
    }

    /// Run the engine until `cancel` fires
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Cancelled
    /// - `Err(Error)`: A fatal error stopped the loop
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<()> {
        info!(
            "Starting reconciliation of {}.{} from {} every {:?}",
            self.config.record_name,
            self.config.zone_name,
            self.ip_source.describe(),
            self.config.poll_interval()
        );

        loop {
            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                outcome = self.run_cycle() => outcome,
            };

            if let Err(e) = outcome {
                error!("Reconciliation loop stopped: {}", e);
                return Err(e);
            }

            debug!("Sleeping for {:?}", self.config.poll_interval());
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.config.poll_interval()) => {}
            }
        }

        info!("Shutdown signal received, engine stopped");
        Ok(())
    }

    /// Run a single resolve → compare → reconcile cycle
    ///
    /// The observed IP is only replaced once the cycle has succeeded, so a
    /// failed reconciliation is retried by the next cycle that runs.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome> {
        let candidate = match self.ip_source.resolve().await {
            Ok(candidate) => candidate,
            Err(e) if e.is_cycle_abort() => {
                warn!(
                    "Skipping cycle for {}: {}",
                    self.ip_source.describe(),
                    e
                );
                return Ok(CycleOutcome::Skipped {
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        };

        let new_ip = match detect_change(&self.observed_ip, &candidate)? {
            Change::Unchanged => {
                debug!("IP unchanged ({}), nothing to do", candidate);
                return Ok(CycleOutcome::Unchanged);
            }
            Change::Changed(ip) => ip,
        };

        info!(
            "IP change detected: {} -> {}",
            if self.observed_ip.is_empty() { "<none>" } else { self.observed_ip.as_str() },
            new_ip
        );

        let result = reconcile(self.provider.as_ref(), &self.config, new_ip).await?;
        self.observed_ip = candidate;

        Ok(CycleOutcome::Reconciled(result))
    }
}
