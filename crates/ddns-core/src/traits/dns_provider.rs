// # DNS Provider Trait
//
// Defines the interface the reconciler uses to read and write A records.
//
// ## Implementations
//
// - Azure DNS: `ddns-provider-azure` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::DnsProvider;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     let zones = provider.list_zones("rg-dns").await?;
//     for zone in zones {
//         println!("{}", zone.name);
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// A DNS zone returned by a provider lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    /// Provider-specific id
    pub id: String,
    /// Zone name (e.g. "example.com")
    pub name: String,
}

/// An A-record set as stored by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ARecordSet {
    /// Record name relative to the zone
    pub name: String,
    /// Time-to-live in seconds
    pub ttl_secs: u32,
    /// Ordered IPv4 addresses
    pub addresses: Vec<Ipv4Addr>,
}

impl ARecordSet {
    /// Record set holding exactly one address
    pub fn single(name: impl Into<String>, ttl_secs: u32, address: Ipv4Addr) -> Self {
        Self {
            name: name.into(),
            ttl_secs,
            addresses: vec![address],
        }
    }

    /// First stored address, if any
    pub fn first_address(&self) -> Option<Ipv4Addr> {
        self.addresses.first().copied()
    }
}

/// Result of a reconciliation against the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateResult {
    /// Record existed and its addresses were replaced
    Updated {
        /// The previous first address
        previous_ip: Option<Ipv4Addr>,
        /// The new IP address
        new_ip: Ipv4Addr,
    },
    /// Record already had the correct IP (no-op)
    Unchanged {
        /// The current IP address
        current_ip: Ipv4Addr,
    },
    /// Record was created (didn't exist before)
    Created {
        /// The created IP address
        new_ip: Ipv4Addr,
        /// Whether the provider confirmed completion within the poll budget
        confirmed: bool,
    },
}

/// Status of an asynchronous provider operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationStatus {
    /// Still running
    InProgress,
    /// Finished successfully
    Succeeded,
    /// Finished unsuccessfully
    Failed(String),
}

/// Handle to an asynchronous provider operation
#[async_trait]
pub trait PendingOperation: Send {
    /// Check the operation's status once
    async fn status(&mut self) -> Result<OperationStatus, crate::Error>;
}

/// Trait for DNS provider implementations
///
/// Each method is a single lookup or write. Providers do not retry, cache
/// lookups across calls, or decide whether an update is needed; the
/// reconciler owns those decisions.
///
/// # Thread Safety
///
/// Implementations must be usable across async tasks.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Check that the resource group exists
    ///
    /// # Returns
    ///
    /// - `Ok(true)`: The group exists
    /// - `Ok(false)`: The group does not exist
    /// - `Err(Error)`: The lookup failed
    async fn resource_group_exists(&self, resource_group: &str) -> Result<bool, crate::Error>;

    /// List the DNS zones in a resource group
    async fn list_zones(&self, resource_group: &str) -> Result<Vec<Zone>, crate::Error>;

    /// Fetch an A-record set
    ///
    /// # Returns
    ///
    /// - `Ok(Some(ARecordSet))`: The record exists
    /// - `Ok(None)`: The record does not exist
    /// - `Err(Error)`: The lookup failed
    async fn get_a_record(
        &self,
        resource_group: &str,
        zone: &Zone,
        record_name: &str,
    ) -> Result<Option<ARecordSet>, crate::Error>;

    /// Submit a create-or-update for a new A-record set
    ///
    /// Creation may complete asynchronously; the returned handle is polled by
    /// the reconciler.
    async fn begin_create_a_record(
        &self,
        resource_group: &str,
        zone: &Zone,
        record: &ARecordSet,
    ) -> Result<Box<dyn PendingOperation>, crate::Error>;

    /// Replace an existing A-record set and wait for the provider's answer
    async fn update_a_record(
        &self,
        resource_group: &str,
        zone: &Zone,
        record: &ARecordSet,
    ) -> Result<ARecordSet, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
