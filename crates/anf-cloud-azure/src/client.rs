//! Azure Resource Manager REST client
//!
//! Thin wrapper over reqwest: bearer auth, `api-version` query, ARM error
//! bodies, and long-running operation tracking through the
//! `Azure-AsyncOperation` / `Location` headers.

use crate::auth::{ClientSecretCredential, TokenProvider};
use crate::error::{AzureError, Result};
use reqwest::header::{HeaderMap, LOCATION, RETRY_AFTER};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

pub const DEFAULT_RESOURCE_MANAGER_ENDPOINT: &str = "https://management.azure.com/";

const AZURE_ASYNC_OPERATION: &str = "azure-asyncoperation";

/// How long-running operations are followed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationPolling {
    /// Used when the service does not send `Retry-After`
    pub default_interval: Duration,
    pub max_attempts: u32,
}

impl Default for OperationPolling {
    fn default() -> Self {
        Self {
            default_interval: Duration::from_secs(10),
            max_attempts: 360,
        }
    }
}

/// ARM client bound to one endpoint and one service principal
pub struct ArmClient {
    client: reqwest::Client,
    tokens: TokenProvider,
    endpoint: String,
    polling: OperationPolling,
}

impl ArmClient {
    pub fn new(credential: ClientSecretCredential, endpoint: impl Into<String>) -> Self {
        let client = reqwest::Client::new();
        Self {
            tokens: TokenProvider::new(client.clone(), credential),
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            polling: OperationPolling::default(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Full request URL for a resource path
    pub fn url(&self, path: &str, api_version: &str) -> String {
        resource_url(&self.endpoint, path, api_version)
    }

    /// GET a resource as raw JSON
    pub async fn get(&self, path: &str, api_version: &str) -> Result<serde_json::Value> {
        let url = self.url(path, api_version);
        let response = self.send(Method::GET, &url, None).await?;
        let status = response.status();

        if !status.is_success() {
            return Err(api_error(status, &response.text().await.unwrap_or_default()));
        }
        Ok(response.json().await?)
    }

    /// PUT a resource and follow the operation until it settles
    ///
    /// Returns the resource as ARM reports it afterwards.
    pub async fn put<B: Serialize + ?Sized>(
        &self,
        path: &str,
        api_version: &str,
        body: &B,
    ) -> Result<serde_json::Value> {
        let url = self.url(path, api_version);
        let body = serde_json::to_value(body)?;
        let response = self.send(Method::PUT, &url, Some(&body)).await?;
        let status = response.status();

        if !status.is_success() {
            return Err(api_error(status, &response.text().await.unwrap_or_default()));
        }

        let headers = response.headers().clone();
        let text = response.text().await?;
        match after_put(&headers, &text)? {
            PutNext::Follow(tracker, first_delay) => {
                self.follow(tracker, first_delay).await?;
                self.get(path, api_version).await
            }
            PutNext::Fetch => self.get(path, api_version).await,
            PutNext::Body(value) => Ok(value),
        }
    }

    /// DELETE a resource and wait for the operation to finish
    pub async fn delete(&self, path: &str, api_version: &str) -> Result<()> {
        let url = self.url(path, api_version);
        self.execute(Method::DELETE, &url).await
    }

    /// POST an action (e.g. `{volume}/deleteReplication`) and wait for it
    pub async fn post_action(&self, path: &str, action: &str, api_version: &str) -> Result<()> {
        let url = self.url(&format!("{}/{}", path.trim_end_matches('/'), action), api_version);
        self.execute(Method::POST, &url).await
    }

    async fn execute(&self, method: Method, url: &str) -> Result<()> {
        let response = self.send(method, url, None).await?;
        let status = response.status();

        if !status.is_success() {
            return Err(api_error(status, &response.text().await.unwrap_or_default()));
        }

        if let Some((tracker, first_delay)) = after_action(status, response.headers()) {
            self.follow(tracker, first_delay).await?;
        }
        Ok(())
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response> {
        let token = self.tokens.token().await?;
        tracing::debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method, url)
            .bearer_auth(token)
            .header("Accept", "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        tracing::debug!("Response status: {}", response.status());
        Ok(response)
    }

    async fn follow(&self, tracker: Tracker, first_delay: Option<Duration>) -> Result<()> {
        let target = &tracker;
        track(target, first_delay, &self.polling, move || self.poll(target)).await
    }

    async fn poll(&self, tracker: &Tracker) -> Result<TrackerResponse> {
        let response = self.send(Method::GET, tracker.url(), None).await?;
        let status = response.status();
        let retry_after = retry_after(response.headers());
        let body = response.text().await?;
        Ok(TrackerResponse {
            status,
            retry_after,
            body,
        })
    }
}

/// Poll an operation tracker until it reaches a terminal state
async fn track<F, Fut>(
    tracker: &Tracker,
    first_delay: Option<Duration>,
    polling: &OperationPolling,
    mut poll: F,
) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<TrackerResponse>>,
{
    let mut delay = first_delay.unwrap_or(polling.default_interval);

    for attempt in 1..=polling.max_attempts {
        sleep(delay).await;

        let response = poll().await?;
        if poll_step(tracker, &response)? {
            tracing::debug!("Operation finished after {} polls", attempt);
            return Ok(());
        }

        delay = response.retry_after.unwrap_or(polling.default_interval);
    }

    Err(AzureError::OperationTimeout(tracker.url().to_string()))
}

/// One answer from a tracker URL
#[derive(Debug)]
struct TrackerResponse {
    status: StatusCode,
    retry_after: Option<Duration>,
    body: String,
}

/// How a successful PUT continues
#[derive(Debug, PartialEq)]
enum PutNext {
    /// The operation runs in the background; follow it, then GET the resource
    Follow(Tracker, Option<Duration>),
    /// Nothing to follow and no body; GET the resource
    Fetch,
    /// The response already carries the resource
    Body(serde_json::Value),
}

fn after_put(headers: &HeaderMap, body: &str) -> Result<PutNext> {
    if let Some(tracker) = tracker_for(headers) {
        return Ok(PutNext::Follow(tracker, retry_after(headers)));
    }
    if body.trim().is_empty() {
        return Ok(PutNext::Fetch);
    }
    Ok(PutNext::Body(serde_json::from_str(body)?))
}

/// DELETE and POST actions only run in the background when answered with 202
fn after_action(status: StatusCode, headers: &HeaderMap) -> Option<(Tracker, Option<Duration>)> {
    if status != StatusCode::ACCEPTED {
        return None;
    }
    tracker_for(headers).map(|tracker| (tracker, retry_after(headers)))
}

/// `Ok(true)` once the tracked operation is over
fn poll_step(tracker: &Tracker, response: &TrackerResponse) -> Result<bool> {
    if !response.status.is_success() {
        return Err(api_error(response.status, &response.body));
    }

    match tracker {
        Tracker::AsyncOperation(_) => {
            let body: OperationStatus = serde_json::from_str(&response.body)?;
            body.into_outcome()
        }
        // Location trackers answer 202 while running and 200/204 once done
        Tracker::Location(_) => Ok(response.status != StatusCode::ACCEPTED),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tracker {
    AsyncOperation(String),
    Location(String),
}

impl Tracker {
    fn url(&self) -> &str {
        match self {
            Tracker::AsyncOperation(url) | Tracker::Location(url) => url,
        }
    }
}

fn tracker_for(headers: &HeaderMap) -> Option<Tracker> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };

    header(AZURE_ASYNC_OPERATION)
        .map(Tracker::AsyncOperation)
        .or_else(|| header(LOCATION.as_str()).map(Tracker::Location))
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

fn resource_url(endpoint: &str, path: &str, api_version: &str) -> String {
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };
    format!("{}{}?api-version={}", endpoint, path, api_version)
}

/// Build an error from a failed ARM response body
fn api_error(status: StatusCode, body: &str) -> AzureError {
    let (code, message) = match serde_json::from_str::<ArmErrorResponse>(body) {
        Ok(resp) => (resp.error.code, resp.error.message),
        Err(_) => (
            status.canonical_reason().unwrap_or("Unknown").replace(' ', ""),
            if body.trim().is_empty() {
                "no error details".to_string()
            } else {
                body.trim().to_string()
            },
        ),
    };

    AzureError::Api {
        status: status.as_u16(),
        code,
        message,
    }
}

// ============================================================================
// ARM API Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ArmErrorResponse {
    error: ArmError,
}

#[derive(Debug, Deserialize)]
struct ArmError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct OperationStatus {
    status: String,
    #[serde(default)]
    error: Option<ArmError>,
}

impl OperationStatus {
    /// `Ok(true)` when finished, `Ok(false)` while running
    fn into_outcome(self) -> Result<bool> {
        match self.status.as_str() {
            s if s.eq_ignore_ascii_case("Succeeded") => Ok(true),
            s if s.eq_ignore_ascii_case("Failed") || s.eq_ignore_ascii_case("Canceled") => {
                let (code, message) = match self.error {
                    Some(e) if !e.code.is_empty() => (e.code, e.message),
                    Some(e) => (self.status.clone(), e.message),
                    None => (self.status.clone(), "no error details".to_string()),
                };
                Err(AzureError::OperationFailed {
                    status: self.status,
                    code,
                    message,
                })
            }
            _ => Ok(false),
        }
    }
}
