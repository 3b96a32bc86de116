//! Client-credential authentication against the Microsoft identity platform
//!
//! The access token is fetched once when the session is established and
//! refreshed transparently shortly before it expires.

use ddns_core::{Credentials, Error, Result};
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// OAuth2 scope for Azure Resource Manager
const ARM_SCOPE: &str = "https://management.azure.com/.default";

/// Refresh tokens this long before they expire
const REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Upper bound on the lifetime accepted from the token endpoint
const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: String,
}

struct AccessToken {
    secret: String,
    expires_at: Instant,
}

impl AccessToken {
    fn is_fresh(&self) -> bool {
        Instant::now() + REFRESH_MARGIN < self.expires_at
    }
}

/// Service-principal credential with a cached access token
///
/// # Security
///
/// Neither the client secret nor the access token appear in Debug output or
/// logs.
pub struct ClientSecretCredential {
    client_id: String,
    client_secret: String,
    token_url: String,
    client: reqwest::Client,
    cached: Mutex<Option<AccessToken>>,
}

impl std::fmt::Debug for ClientSecretCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSecretCredential")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<REDACTED>")
            .field("token_url", &self.token_url)
            .finish()
    }
}

impl ClientSecretCredential {
    /// Create a credential for `credentials`, authenticating against `login_base`
    pub fn new(credentials: &Credentials, login_base: &str, client: reqwest::Client) -> Self {
        Self {
            client_id: credentials.client_id.clone(),
            client_secret: credentials.client_secret.clone(),
            token_url: format!(
                "{}/{}/oauth2/v2.0/token",
                login_base.trim_end_matches('/'),
                credentials.tenant_id
            ),
            client,
            cached: Mutex::new(None),
        }
    }

    /// A valid bearer token, fetching a new one if the cached token is stale
    pub async fn token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.secret.clone());
        }

        let token = self.request_token().await?;
        let secret = token.secret.clone();
        *cached = Some(token);
        Ok(secret)
    }

    async fn request_token(&self) -> Result<AccessToken> {
        tracing::debug!("Requesting access token for client {}", self.client_id);

        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("scope", ARM_SCOPE),
            ])
            .send()
            .await
            .map_err(|e| Error::auth(format!("Token request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = match response.json::<TokenErrorResponse>().await {
                Ok(body) => format!("{}: {}", body.error, body.error_description),
                Err(_) => "unreadable error response".to_string(),
            };
            return Err(Error::auth(format!(
                "Token request rejected ({}): {}",
                status, detail
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::auth(format!("Failed to parse token response: {}", e)))?;

        tracing::info!(
            "Acquired access token for client {} (valid {}s)",
            self.client_id,
            body.expires_in
        );

        let lifetime = Duration::from_secs(body.expires_in).min(MAX_TOKEN_LIFETIME);
        let expires_at = Instant::now()
            .checked_add(lifetime)
            .ok_or_else(|| Error::auth(format!("Token lifetime out of range: {}s", body.expires_in)))?;

        Ok(AccessToken {
            secret: body.access_token,
            expires_at,
        })
    }
}
