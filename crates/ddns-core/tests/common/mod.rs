//! Test doubles and common utilities for reconciler contract tests
//!
//! The doubles record every call so tests can assert exactly which provider
//! operations a cycle issued.

#![allow(dead_code)]

use ddns_core::config::{Credentials, DdnsConfig};
use ddns_core::error::{Error, Result};
use ddns_core::traits::{
    ARecordSet, DnsProvider, IpSource, OperationStatus, PendingOperation, Zone,
};
use std::collections::{HashMap, VecDeque};
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// An IpSource that replays a script of results
///
/// Once the script is exhausted the last result is repeated.
#[derive(Clone)]
pub struct ScriptedIpSource {
    script: Arc<Mutex<VecDeque<Result<String>>>>,
    last: Arc<Mutex<Option<String>>>,
    resolve_call_count: Arc<AtomicUsize>,
}

impl ScriptedIpSource {
    pub fn new(script: Vec<Result<String>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            last: Arc::new(Mutex::new(None)),
            resolve_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A source that always returns `ip`
    pub fn fixed(ip: &str) -> Self {
        Self::new(vec![Ok(ip.to_string())])
    }

    /// Get the number of times resolve() was called
    pub fn resolve_call_count(&self) -> usize {
        self.resolve_call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl IpSource for ScriptedIpSource {
    async fn resolve(&self) -> Result<String> {
        self.resolve_call_count.fetch_add(1, Ordering::SeqCst);

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(ip)) => {
                *self.last.lock().unwrap() = Some(ip.clone());
                Ok(ip)
            }
            Some(Err(e)) => Err(e),
            None => match self.last.lock().unwrap().clone() {
                Some(ip) => Ok(ip),
                None => Err(Error::FetchExhausted {
                    url: "scripted".to_string(),
                    attempts: 3,
                }),
            },
        }
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}

/// A provider call as observed by [`MockDnsProvider`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    ResourceGroupExists(String),
    ListZones(String),
    GetRecord { zone_id: String, name: String },
    Create { zone_id: String, record: ARecordSet },
    StatusCheck,
    Update { zone_id: String, record: ARecordSet },
}

impl ProviderCall {
    pub fn is_write(&self) -> bool {
        matches!(self, ProviderCall::Create { .. } | ProviderCall::Update { .. })
    }
}

#[derive(Default)]
struct ProviderState {
    resource_groups: Vec<String>,
    zones: Vec<Zone>,
    records: HashMap<String, ARecordSet>,
    calls: Vec<ProviderCall>,
    /// Status checks needed before a create reports success (None = never)
    create_completes_after: Option<usize>,
    create_fails_with: Option<String>,
    update_fails_with: Option<String>,
    record_lookup_fails_with: Option<String>,
}

/// An in-memory DnsProvider that records every call
#[derive(Clone)]
pub struct MockDnsProvider {
    state: Arc<Mutex<ProviderState>>,
}

impl MockDnsProvider {
    /// Provider with one resource group holding one zone
    pub fn new(resource_group: &str, zone_name: &str) -> Self {
        let state = ProviderState {
            resource_groups: vec![resource_group.to_string()],
            zones: vec![zone(zone_name, "zone-1")],
            create_completes_after: Some(1),
            ..Default::default()
        };

        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    /// Provider without any resource groups
    pub fn empty() -> Self {
        Self {
            state: Arc::new(Mutex::new(ProviderState {
                create_completes_after: Some(1),
                ..Default::default()
            })),
        }
    }

    pub fn with_zone(self, name: &str, id: &str) -> Self {
        self.state.lock().unwrap().zones.push(zone(name, id));
        self
    }

    pub fn with_record(self, name: &str, ttl_secs: u32, addresses: &[&str]) -> Self {
        let record = ARecordSet {
            name: name.to_string(),
            ttl_secs,
            addresses: addresses.iter().map(|a| a.parse().unwrap()).collect(),
        };
        self.state
            .lock()
            .unwrap()
            .records
            .insert(name.to_string(), record);
        self
    }

    pub fn with_create_completing_after(self, checks: Option<usize>) -> Self {
        self.state.lock().unwrap().create_completes_after = checks;
        self
    }

    pub fn with_create_failure(self, reason: &str) -> Self {
        self.state.lock().unwrap().create_fails_with = Some(reason.to_string());
        self
    }

    pub fn with_update_failure(self, message: &str) -> Self {
        self.state.lock().unwrap().update_fails_with = Some(message.to_string());
        self
    }

    pub fn with_record_lookup_failure(self, message: &str) -> Self {
        self.state.lock().unwrap().record_lookup_fails_with = Some(message.to_string());
        self
    }

    /// All calls made so far
    pub fn calls(&self) -> Vec<ProviderCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of calls made so far
    pub fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    /// Write calls (create/update) made so far
    pub fn writes(&self) -> Vec<ProviderCall> {
        self.calls().into_iter().filter(ProviderCall::is_write).collect()
    }

    /// Number of completion status checks made so far
    pub fn status_checks(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| **c == ProviderCall::StatusCheck)
            .count()
    }

    /// Current provider-side record
    pub fn record(&self, name: &str) -> Option<ARecordSet> {
        self.state.lock().unwrap().records.get(name).cloned()
    }

    fn record_call(&self, call: ProviderCall) {
        self.state.lock().unwrap().calls.push(call);
    }
}

fn zone(name: &str, id: &str) -> Zone {
    Zone {
        id: id.to_string(),
        name: name.to_string(),
    }
}

struct MockOperation {
    provider: MockDnsProvider,
    checks: usize,
}

#[async_trait::async_trait]
impl PendingOperation for MockOperation {
    async fn status(&mut self) -> Result<OperationStatus> {
        self.provider.record_call(ProviderCall::StatusCheck);
        self.checks += 1;

        let state = self.provider.state.lock().unwrap();
        if let Some(reason) = &state.create_fails_with {
            return Ok(OperationStatus::Failed(reason.clone()));
        }
        match state.create_completes_after {
            Some(needed) if self.checks >= needed => Ok(OperationStatus::Succeeded),
            _ => Ok(OperationStatus::InProgress),
        }
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn resource_group_exists(&self, resource_group: &str) -> Result<bool> {
        self.record_call(ProviderCall::ResourceGroupExists(resource_group.to_string()));
        Ok(self
            .state
            .lock()
            .unwrap()
            .resource_groups
            .iter()
            .any(|rg| rg == resource_group))
    }

    async fn list_zones(&self, resource_group: &str) -> Result<Vec<Zone>> {
        self.record_call(ProviderCall::ListZones(resource_group.to_string()));
        Ok(self.state.lock().unwrap().zones.clone())
    }

    async fn get_a_record(
        &self,
        _resource_group: &str,
        zone: &Zone,
        record_name: &str,
    ) -> Result<Option<ARecordSet>> {
        self.record_call(ProviderCall::GetRecord {
            zone_id: zone.id.clone(),
            name: record_name.to_string(),
        });

        let state = self.state.lock().unwrap();
        if let Some(message) = &state.record_lookup_fails_with {
            return Err(Error::provider("mock", message.clone()));
        }
        Ok(state.records.get(record_name).cloned())
    }

    async fn begin_create_a_record(
        &self,
        _resource_group: &str,
        zone: &Zone,
        record: &ARecordSet,
    ) -> Result<Box<dyn PendingOperation>> {
        self.record_call(ProviderCall::Create {
            zone_id: zone.id.clone(),
            record: record.clone(),
        });
        self.state
            .lock()
            .unwrap()
            .records
            .insert(record.name.clone(), record.clone());

        Ok(Box::new(MockOperation {
            provider: self.clone(),
            checks: 0,
        }))
    }

    async fn update_a_record(
        &self,
        _resource_group: &str,
        zone: &Zone,
        record: &ARecordSet,
    ) -> Result<ARecordSet> {
        self.record_call(ProviderCall::Update {
            zone_id: zone.id.clone(),
            record: record.clone(),
        });

        let mut state = self.state.lock().unwrap();
        if let Some(message) = &state.update_fails_with {
            return Err(Error::provider("mock", message.clone()));
        }
        state.records.insert(record.name.clone(), record.clone());
        Ok(record.clone())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Helper to create a valid DdnsConfig for testing
pub fn test_config(record_name: &str) -> DdnsConfig {
    DdnsConfig {
        credentials: Credentials {
            tenant_id: "tenant".to_string(),
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
        },
        subscription_id: "sub".to_string(),
        resource_group: "rg-dns".to_string(),
        zone_name: "example.com".to_string(),
        record_name: record_name.to_string(),
        ip_source_url: "https://api.ipify.org".to_string(),
        ip_pattern: None,
        poll_interval_ms: 60_000,
        record_ttl_secs: 300,
        dry_run: false,
    }
}

/// Parse an IPv4 literal
pub fn ip(s: &str) -> Ipv4Addr {
    s.parse().unwrap()
}
