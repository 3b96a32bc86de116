// # Azure DNS Provider
//
// This crate provides the Azure DNS provider for the DDNS reconciler.
//
// ## Implementation
//
// - ✅ One Azure Resource Manager request per trait call
// - ✅ Errors propagated to the reconciler with HTTP status context
// - ✅ HTTP timeout configured (30 seconds)
// - ✅ Client-credential token acquired once and refreshed before expiry
// - ✅ Record creation exposed as a pollable operation (`Azure-AsyncOperation` / `Location`)
// - ✅ Dry-run mode for safe testing
// - ❌ NO retry logic (the reconciler decides what a failure means)
// - ❌ NO caching of zones or records between calls
//
// ## Security Requirements
//
// - Client secret and access token NEVER appear in logs or Debug output
// - Session establishment fails fast if credentials are rejected
//
// ## API Reference
//
// - Get resource group: GET `/subscriptions/{sub}/resourcegroups/{rg}`
// - List zones: GET `/subscriptions/{sub}/resourceGroups/{rg}/providers/Microsoft.Network/dnsZones`
// - Get record set: GET `…/dnsZones/{zone}/A/{record}`
// - Create or update record set: PUT `…/dnsZones/{zone}/A/{record}`

pub mod auth;
mod models;

use async_trait::async_trait;
use auth::ClientSecretCredential;
use ddns_core::traits::{ARecordSet, DnsProvider, OperationStatus, PendingOperation, Zone};
use ddns_core::{DdnsConfig, Error, Result};
use models::{AsyncOperationBody, ErrorResponse, RecordSetResource, ZoneListPage};
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;

/// Azure Resource Manager base URL
pub const ARM_BASE: &str = "https://management.azure.com";

/// Microsoft identity platform base URL
pub const LOGIN_BASE: &str = "https://login.microsoftonline.com";

/// API version for resource group lookups
const RESOURCES_API_VERSION: &str = "2021-04-01";

/// API version for DNS zones and record sets
const DNS_API_VERSION: &str = "2018-05-01";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

const PROVIDER_NAME: &str = "azure";

/// Authenticated HTTP access shared by the provider and its pending operations
struct Session {
    client: reqwest::Client,
    credential: ClientSecretCredential,
}

impl Session {
    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        let token = self.credential.token().await?;
        self.client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| Error::provider(PROVIDER_NAME, format!("HTTP request failed: {}", e)))
    }

    async fn put_json(&self, url: &str, body: &RecordSetResource) -> Result<reqwest::Response> {
        let token = self.credential.token().await?;
        self.client
            .put(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(|e| Error::provider(PROVIDER_NAME, format!("HTTP request failed: {}", e)))
    }
}

/// Azure DNS provider session
///
/// Built once at startup by [`AzureDnsProvider::connect`] and reused for every
/// cycle.
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform all GET requests (resource group, zone and record lookups)
/// - Log the intended PUT payload
/// - **NOT** actually modify DNS records
pub struct AzureDnsProvider {
    session: Arc<Session>,
    arm_base: String,
    subscription_id: String,
    dry_run: bool,
}

// Custom Debug implementation that hides the credential
impl std::fmt::Debug for AzureDnsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureDnsProvider")
            .field("credential", &self.session.credential)
            .field("arm_base", &self.arm_base)
            .field("subscription_id", &self.subscription_id)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl AzureDnsProvider {
    /// Establish a session against the public Azure cloud
    ///
    /// Acquires the first access token immediately so bad credentials fail
    /// at startup.
    pub async fn connect(config: &DdnsConfig) -> Result<Self> {
        Self::connect_to(config, ARM_BASE, LOGIN_BASE).await
    }

    /// Establish a session against explicit endpoints
    pub async fn connect_to(config: &DdnsConfig, arm_base: &str, login_base: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        let credential = ClientSecretCredential::new(&config.credentials, login_base, client.clone());
        credential.token().await?;

        if config.dry_run {
            tracing::warn!("Azure provider running in DRY-RUN mode - no changes will be made");
        }

        Ok(Self {
            session: Arc::new(Session { client, credential }),
            arm_base: arm_base.trim_end_matches('/').to_string(),
            subscription_id: config.subscription_id.clone(),
            dry_run: config.dry_run,
        })
    }

    fn resource_group_url(&self, resource_group: &str) -> String {
        format!(
            "{}/subscriptions/{}/resourcegroups/{}?api-version={}",
            self.arm_base, self.subscription_id, resource_group, RESOURCES_API_VERSION
        )
    }

    fn zones_url(&self, resource_group: &str) -> String {
        format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Network/dnsZones?api-version={}",
            self.arm_base, self.subscription_id, resource_group, DNS_API_VERSION
        )
    }

    fn record_url(&self, resource_group: &str, zone: &Zone, record_name: &str) -> String {
        format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Network/dnsZones/{}/A/{}?api-version={}",
            self.arm_base, self.subscription_id, resource_group, zone.name, record_name, DNS_API_VERSION
        )
    }

    async fn put_record(
        &self,
        resource_group: &str,
        zone: &Zone,
        record: &ARecordSet,
    ) -> Result<reqwest::Response> {
        let url = self.record_url(resource_group, zone, &record.name);
        let response = self
            .session
            .put_json(&url, &RecordSetResource::from_record(record))
            .await?;

        if !response.status().is_success() {
            return Err(status_error(
                &format!("Failed to write record {}.{}", record.name, zone.name),
                response,
            )
            .await);
        }

        Ok(response)
    }

    fn log_dry_run(&self, resource_group: &str, zone: &Zone, record: &ARecordSet) {
        tracing::info!(
            "[DRY-RUN] Would send PUT request to {} with payload: {}",
            self.record_url(resource_group, zone, &record.name),
            serde_json::to_string(&RecordSetResource::from_record(record)).unwrap_or_default()
        );
    }
}

/// Map a non-success ARM response to an error
async fn status_error(context: &str, response: reqwest::Response) -> Error {
    let status = response.status();
    let detail = match response.text().await {
        Ok(text) => serde_json::from_str::<ErrorResponse>(&text)
            .map(|e| e.error.to_string())
            .unwrap_or(text),
        Err(_) => "Unable to read error response".to_string(),
    };

    match status.as_u16() {
        401 | 403 => Error::auth(format!(
            "{}: invalid credentials or insufficient permissions ({}): {}",
            context, status, detail
        )),
        429 => Error::provider(
            PROVIDER_NAME,
            format!("{}: rate limit exceeded ({})", context, status),
        ),
        500..=599 => Error::provider(
            PROVIDER_NAME,
            format!("{}: Azure server error (transient) ({}): {}", context, status, detail),
        ),
        _ => Error::provider(PROVIDER_NAME, format!("{}: {} - {}", context, status, detail)),
    }
}

async fn parse_json<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    response
        .json()
        .await
        .map_err(|e| Error::provider(PROVIDER_NAME, format!("Failed to parse response: {}", e)))
}

#[async_trait]
impl DnsProvider for AzureDnsProvider {
    async fn resource_group_exists(&self, resource_group: &str) -> Result<bool> {
        tracing::debug!("Looking up resource group {}", resource_group);

        let response = self.session.get(&self.resource_group_url(resource_group)).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            _ => Err(status_error(
                &format!("Resource group lookup for {}", resource_group),
                response,
            )
            .await),
        }
    }

    async fn list_zones(&self, resource_group: &str) -> Result<Vec<Zone>> {
        tracing::debug!("Listing DNS zones in {}", resource_group);

        let mut zones = Vec::new();
        let mut next = Some(self.zones_url(resource_group));

        while let Some(url) = next {
            let response = self.session.get(&url).await?;
            if !response.status().is_success() {
                return Err(status_error(
                    &format!("Zone listing for {}", resource_group),
                    response,
                )
                .await);
            }

            let page: ZoneListPage = parse_json(response).await?;
            zones.extend(page.value.into_iter().map(Zone::from));
            next = page.next_link;
        }

        tracing::debug!("Found {} zone(s) in {}", zones.len(), resource_group);
        Ok(zones)
    }

    async fn get_a_record(
        &self,
        resource_group: &str,
        zone: &Zone,
        record_name: &str,
    ) -> Result<Option<ARecordSet>> {
        tracing::debug!("Looking up A record {} in {}", record_name, zone.name);

        let response = self
            .session
            .get(&self.record_url(resource_group, zone, record_name))
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let resource: RecordSetResource = parse_json(response).await?;
                Ok(Some(resource.into_record(record_name)))
            }
            _ => Err(status_error(
                &format!("Record lookup for {}.{}", record_name, zone.name),
                response,
            )
            .await),
        }
    }

    async fn begin_create_a_record(
        &self,
        resource_group: &str,
        zone: &Zone,
        record: &ARecordSet,
    ) -> Result<Box<dyn PendingOperation>> {
        if self.dry_run {
            self.log_dry_run(resource_group, zone, record);
            return Ok(Box::new(AzureOperation::completed()));
        }

        let response = self.put_record(resource_group, zone, record).await?;
        Ok(Box::new(AzureOperation::from_response(
            Arc::clone(&self.session),
            &response,
        )))
    }

    async fn update_a_record(
        &self,
        resource_group: &str,
        zone: &Zone,
        record: &ARecordSet,
    ) -> Result<ARecordSet> {
        if self.dry_run {
            self.log_dry_run(resource_group, zone, record);
            return Ok(record.clone());
        }

        let response = self.put_record(resource_group, zone, record).await?;
        let body = response
            .text()
            .await
            .map_err(|e| Error::provider(PROVIDER_NAME, format!("Failed to read response: {}", e)))?;

        // Accepted writes may come back without a body
        if body.trim().is_empty() {
            return Ok(record.clone());
        }

        let resource: RecordSetResource = serde_json::from_str(&body)
            .map_err(|e| Error::provider(PROVIDER_NAME, format!("Failed to parse response: {}", e)))?;
        Ok(resource.into_record(&record.name))
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

enum PollTarget {
    /// The PUT already finished
    Done,
    /// `Azure-AsyncOperation` status resource
    AsyncOperation(String),
    /// `Location` header, 202 while in progress
    Location(String),
}

/// Pending Azure Resource Manager operation
pub struct AzureOperation {
    session: Option<Arc<Session>>,
    target: PollTarget,
}

impl AzureOperation {
    fn completed() -> Self {
        Self {
            session: None,
            target: PollTarget::Done,
        }
    }

    fn from_response(session: Arc<Session>, response: &reqwest::Response) -> Self {
        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };

        let target = if let Some(url) = header("azure-asyncoperation") {
            PollTarget::AsyncOperation(url)
        } else if response.status() == StatusCode::ACCEPTED {
            match header("location") {
                Some(url) => PollTarget::Location(url),
                None => PollTarget::Done,
            }
        } else {
            PollTarget::Done
        };

        Self {
            session: Some(session),
            target,
        }
    }
}

#[async_trait]
impl PendingOperation for AzureOperation {
    async fn status(&mut self) -> Result<OperationStatus> {
        let (session, url) = match (&self.session, &self.target) {
            (Some(session), PollTarget::AsyncOperation(url) | PollTarget::Location(url)) => {
                (session, url)
            }
            _ => return Ok(OperationStatus::Succeeded),
        };

        let response = session.get(url).await?;
        let status = response.status();

        if let PollTarget::Location(_) = self.target {
            return match status {
                StatusCode::ACCEPTED => Ok(OperationStatus::InProgress),
                s if s.is_success() => Ok(OperationStatus::Succeeded),
                _ => Err(status_error("Operation status check", response).await),
            };
        }

        if !status.is_success() {
            return Err(status_error("Operation status check", response).await);
        }

        let AsyncOperationBody { status, error } = parse_json(response).await?;
        Ok(match status.as_str() {
            "Succeeded" => OperationStatus::Succeeded,
            "Failed" | "Canceled" => OperationStatus::Failed(
                error.map(|e| e.to_string()).unwrap_or_else(|| status.clone()),
            ),
            _ => OperationStatus::InProgress,
        })
    }
}
