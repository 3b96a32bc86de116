//! A-record reconciliation
//!
//! Brings the provider's record in line with a candidate IP:
//!
//! 1. The resource group must exist
//! 2. The first zone whose name equals the configured zone is selected
//! 3. The named A-record set is fetched
//! 4. Absent → create `{ttl, [candidate]}` and poll for completion
//! 5. Present with a different first address → replace with `{ttl, [candidate]}`
//!
//! Zones and records are looked up again on every call.

use crate::config::DdnsConfig;
use crate::error::{Error, Result};
use crate::poll::{CREATE_POLL_ATTEMPTS, CREATE_POLL_INTERVAL, PollOutcome, poll_until_complete};
use crate::traits::{ARecordSet, DnsProvider, UpdateResult, Zone};
use std::net::Ipv4Addr;
use tracing::{debug, info, warn};

/// Reconcile the configured A record with `candidate`
///
/// After a successful return the record holds exactly `[candidate]` with the
/// configured TTL, unless it already had `candidate` as its first address.
pub async fn reconcile(
    provider: &dyn DnsProvider,
    config: &DdnsConfig,
    candidate: Ipv4Addr,
) -> Result<UpdateResult> {
    let resource_group = config.resource_group.as_str();
    let record_name = config.record_name.as_str();

    if !provider.resource_group_exists(resource_group).await? {
        return Err(Error::ResourceGroupNotFound(resource_group.to_string()));
    }

    let zone = find_zone(provider, resource_group, &config.zone_name).await?;
    debug!("Using zone {} ({})", zone.name, zone.id);

    let existing = provider
        .get_a_record(resource_group, &zone, record_name)
        .await
        .map_err(|e| Error::record_lookup(record_name, e.to_string()))?;

    let desired = ARecordSet::single(record_name, config.record_ttl_secs, candidate);

    match existing {
        None => create_record(provider, resource_group, &zone, &desired, candidate).await,
        Some(current) => {
            // Exact string comparison against the first stored address
            let current_first = current.first_address();
            if current_first.map(|ip| ip.to_string()) == Some(candidate.to_string()) {
                info!(
                    "Record {}.{} already points to {}",
                    record_name, zone.name, candidate
                );
                return Ok(UpdateResult::Unchanged {
                    current_ip: candidate,
                });
            }

            info!(
                "Updating record {}.{}: {:?} -> {} (ttl {}s)",
                record_name, zone.name, current.addresses, candidate, desired.ttl_secs
            );
            provider
                .update_a_record(resource_group, &zone, &desired)
                .await?;
            info!("Record {}.{} updated to {}", record_name, zone.name, candidate);

            Ok(UpdateResult::Updated {
                previous_ip: current_first,
                new_ip: candidate,
            })
        }
    }
}

/// First zone in the group whose name matches exactly
async fn find_zone(provider: &dyn DnsProvider, resource_group: &str, zone_name: &str) -> Result<Zone> {
    provider
        .list_zones(resource_group)
        .await?
        .into_iter()
        .find(|zone| zone.name == zone_name)
        .ok_or_else(|| Error::ZoneNotFound(zone_name.to_string()))
}

async fn create_record(
    provider: &dyn DnsProvider,
    resource_group: &str,
    zone: &Zone,
    desired: &ARecordSet,
    new_ip: Ipv4Addr,
) -> Result<UpdateResult> {
    info!(
        "Creating record {}.{} -> {} (ttl {}s)",
        desired.name, zone.name, new_ip, desired.ttl_secs
    );

    let mut operation = provider
        .begin_create_a_record(resource_group, zone, desired)
        .await?;

    match poll_until_complete(operation.as_mut(), CREATE_POLL_INTERVAL, CREATE_POLL_ATTEMPTS).await {
        PollOutcome::Completed => {
            info!("Record {}.{} created", desired.name, zone.name);
            Ok(UpdateResult::Created {
                new_ip,
                confirmed: true,
            })
        }
        PollOutcome::TimedOut => {
            warn!(
                "Creation of {}.{} not confirmed after {} checks; assuming it completed",
                desired.name, zone.name, CREATE_POLL_ATTEMPTS
            );
            Ok(UpdateResult::Created {
                new_ip,
                confirmed: false,
            })
        }
        PollOutcome::Failed(reason) => Err(Error::provider(
            provider.provider_name(),
            format!("Creation of {}.{} failed: {}", desired.name, zone.name, reason),
        )),
    }
}
