//! Azure AD client-credential token acquisition
//!
//! Service principal login against the v1 token endpoint, with the token
//! cached until shortly before it expires.

use crate::error::{AzureError, Result};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;

/// Refresh this long before the reported expiry
const EXPIRY_MARGIN_SECS: i64 = 300;

/// Service principal credentials
#[derive(Clone)]
pub struct ClientSecretCredential {
    tenant_id: String,
    client_id: String,
    client_secret: String,
    authority: String,
    resource: String,
}

impl std::fmt::Debug for ClientSecretCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSecretCredential")
            .field("tenant_id", &self.tenant_id)
            .field("client_id", &self.client_id)
            .field("authority", &self.authority)
            .field("resource", &self.resource)
            .finish_non_exhaustive()
    }
}

impl ClientSecretCredential {
    pub fn new(
        tenant_id: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        authority: impl Into<String>,
        resource: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            authority: authority.into(),
            resource: resource.into(),
        }
    }

    /// Token endpoint URL for the tenant
    pub fn token_url(&self) -> String {
        format!(
            "{}/{}/oauth2/token",
            self.authority.trim_end_matches('/'),
            self.tenant_id
        )
    }
}

#[derive(Debug, Clone)]
struct AccessToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

/// Hands out bearer tokens, requesting a new one only when needed
pub struct TokenProvider {
    client: reqwest::Client,
    credential: ClientSecretCredential,
    cached: Mutex<Option<AccessToken>>,
}

impl TokenProvider {
    pub fn new(client: reqwest::Client, credential: ClientSecretCredential) -> Self {
        Self {
            client,
            credential,
            cached: Mutex::new(None),
        }
    }

    /// Current bearer token
    pub async fn token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.is_fresh(Utc::now()) {
                return Ok(token.token.clone());
            }
        }

        let token = self.request_token().await?;
        let value = token.token.clone();
        *cached = Some(token);
        Ok(value)
    }

    async fn request_token(&self) -> Result<AccessToken> {
        let url = self.credential.token_url();
        tracing::debug!("Requesting token from {}", url);

        let response = self
            .client
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.credential.client_id.as_str()),
                ("client_secret", self.credential.client_secret.as_str()),
                ("resource", self.credential.resource.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Token request status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AzureError::TokenRequest(token_error_message(&body, status)));
        }

        let body: TokenResponse = response.json().await?;
        parse_token(body, Utc::now())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    /// AAD v1 returns this as a string
    #[serde(default)]
    expires_in: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

fn parse_token(body: TokenResponse, now: DateTime<Utc>) -> Result<AccessToken> {
    if body.access_token.is_empty() {
        return Err(AzureError::TokenRequest(
            "no access token in response".to_string(),
        ));
    }

    // Default to 1 hour if not provided
    let expires_in = match body.expires_in {
        Some(serde_json::Value::Number(n)) => n.as_i64().unwrap_or(3600),
        Some(serde_json::Value::String(s)) => s.parse::<i64>().unwrap_or(3600),
        _ => 3600,
    };

    Ok(AccessToken {
        token: body.access_token,
        expires_at: now + Duration::seconds(expires_in),
    })
}

fn token_error_message(body: &str, status: reqwest::StatusCode) -> String {
    match serde_json::from_str::<TokenErrorResponse>(body) {
        Ok(err) => match err.error_description {
            Some(desc) => format!("{}: {}", err.error, desc.lines().next().unwrap_or("")),
            None => err.error,
        },
        Err(_) => format!("status {}", status),
    }
}
