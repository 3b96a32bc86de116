// # ddns-core
//
// Core library for the Azure DNS A-record reconciler.
//
// ## Architecture Overview
//
// This library provides the reconciliation logic for dynamic DNS:
// - **IpSource**: Trait for discovering the public IP
// - **detect_change**: Compares a candidate with the last observed IP
// - **DnsProvider**: Trait for reading and writing A records via provider APIs
// - **reconcile**: Looks up the zone/record and creates or updates it
// - **DdnsEngine**: Drives the resolve → compare → reconcile → sleep loop
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from HTTP and provider implementations
// 2. **Explicit State**: Configuration and the provider session are passed in, never global
// 3. **Minimal Traffic**: The provider is only contacted when the IP actually moves
// 4. **Library-First**: All core functionality can be used as a library

pub mod traits;
pub mod change;
pub mod poll;
pub mod reconcile;
pub mod engine;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{ARecordSet, DnsProvider, IpSource, PendingOperation, UpdateResult, Zone};
pub use change::{Change, detect_change};
pub use engine::{CycleOutcome, DdnsEngine};
pub use config::{Credentials, DdnsConfig};
pub use error::{Error, Result};
