//! Core traits for the DDNS reconciler
//!
//! - [`IpSource`]: Discover the public IP
//! - [`DnsProvider`]: Read and write A records via provider APIs
//! - [`PendingOperation`]: Poll an asynchronous provider operation

pub mod ip_source;
pub mod dns_provider;

pub use ip_source::IpSource;
pub use dns_provider::{
    ARecordSet, DnsProvider, OperationStatus, PendingOperation, UpdateResult, Zone,
};
