// # IP Source Trait
//
// Defines the interface for discovering the host's public IP address.
//
// ## Implementations
//
// - HTTP-based: `ddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::IpSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* IpSource implementation */;
//
//     let candidate = source.resolve().await?;
//     println!("Public IP candidate: {}", candidate);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;

/// Trait for IP source implementations
///
/// A source returns the current public IP as text. The value is a
/// *candidate*: it is not validated as an address here, the engine does that
/// before any provider call.
///
/// # Retry
///
/// Sources own their fetch retry budget. Once it is spent they return
/// [`crate::Error::FetchExhausted`], which ends the run.
///
/// # Cancellation
///
/// The engine drops the returned future when shutdown is requested, so
/// implementations must not rely on running to completion.
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Resolve the current public IP candidate
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The candidate IP text
    /// - `Err(Error::FetchExhausted)`: No attempt produced a usable body
    /// - `Err(Error::NoMatch)`: The extraction pattern matched nothing
    async fn resolve(&self) -> Result<String, crate::Error>;

    /// Where the IP is fetched from (for logging)
    fn describe(&self) -> String;
}
