//! Azure Resource Manager wire types for DNS zones and A-record sets

use ddns_core::traits::{ARecordSet, Zone};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// One page of `GET …/dnsZones`
#[derive(Debug, Deserialize)]
pub(crate) struct ZoneListPage {
    #[serde(default)]
    pub value: Vec<ZoneResource>,
    #[serde(rename = "nextLink")]
    pub next_link: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ZoneResource {
    pub id: String,
    pub name: String,
}

impl From<ZoneResource> for Zone {
    fn from(zone: ZoneResource) -> Self {
        Zone {
            id: zone.id,
            name: zone.name,
        }
    }
}

/// Body of `GET`/`PUT …/dnsZones/{zone}/A/{record}`
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct RecordSetResource {
    #[serde(default, skip_serializing)]
    pub name: Option<String>,
    pub properties: RecordSetProperties,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct RecordSetProperties {
    #[serde(rename = "TTL")]
    pub ttl: Option<u32>,
    #[serde(rename = "ARecords", default)]
    pub a_records: Vec<ARecordEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct ARecordEntry {
    #[serde(rename = "ipv4Address")]
    pub ipv4_address: Ipv4Addr,
}

impl RecordSetResource {
    pub fn from_record(record: &ARecordSet) -> Self {
        Self {
            name: None,
            properties: RecordSetProperties {
                ttl: Some(record.ttl_secs),
                a_records: record
                    .addresses
                    .iter()
                    .map(|ip| ARecordEntry { ipv4_address: *ip })
                    .collect(),
            },
        }
    }

    pub fn into_record(self, fallback_name: &str) -> ARecordSet {
        ARecordSet {
            name: self.name.unwrap_or_else(|| fallback_name.to_string()),
            ttl_secs: self.properties.ttl.unwrap_or_default(),
            addresses: self
                .properties
                .a_records
                .into_iter()
                .map(|a| a.ipv4_address)
                .collect(),
        }
    }
}

/// Body returned by an `Azure-AsyncOperation` status URL
#[derive(Debug, Deserialize)]
pub(crate) struct AsyncOperationBody {
    pub status: String,
    pub error: Option<ErrorDetail>,
}

/// ARM error envelope
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl std::fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_set_body_uses_arm_field_names() {
        let record = ARecordSet::single("home", 300, Ipv4Addr::new(203, 0, 113, 5));

        let body = serde_json::to_value(RecordSetResource::from_record(&record)).unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "properties": {
                    "TTL": 300,
                    "ARecords": [{ "ipv4Address": "203.0.113.5" }]
                }
            })
        );
    }

    #[test]
    fn record_set_response_keeps_address_order() {
        let body = serde_json::json!({
            "id": "/subscriptions/sub/resourceGroups/rg/providers/Microsoft.Network/dnszones/example.com/A/home",
            "name": "home",
            "type": "Microsoft.Network/dnszones/A",
            "etag": "abc",
            "properties": {
                "TTL": 3600,
                "fqdn": "home.example.com.",
                "ARecords": [
                    { "ipv4Address": "198.51.100.1" },
                    { "ipv4Address": "198.51.100.2" }
                ]
            }
        });

        let record = serde_json::from_value::<RecordSetResource>(body)
            .unwrap()
            .into_record("ignored");

        assert_eq!(record.name, "home");
        assert_eq!(record.ttl_secs, 3600);
        assert_eq!(
            record.addresses,
            vec![Ipv4Addr::new(198, 51, 100, 1), Ipv4Addr::new(198, 51, 100, 2)]
        );
    }

    #[test]
    fn record_set_without_a_records_is_empty() {
        let body = serde_json::json!({ "properties": { "TTL": 300 } });

        let record = serde_json::from_value::<RecordSetResource>(body)
            .unwrap()
            .into_record("home");

        assert_eq!(record.name, "home");
        assert!(record.addresses.is_empty());
    }
}
