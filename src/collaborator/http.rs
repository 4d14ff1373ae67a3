//! HTTP collaborators
//!
//! `ProxyClient` talks to the middleware that fronts both collaborators:
//!
//! - `GET  {endpoint}/fetch?url=<source>` returns the raw payload
//! - `POST {endpoint}/infer` with `{"sample": ...}` returns the schema
//! - `GET  {endpoint}/` reports service health
//!
//! `DirectFetcher` skips the middleware and retrieves the source URL itself.
//!
//! # Example
//!
//! ```no_run
//! use easyapigis::collaborator::{ProxyClient, SampleFetcher};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let proxy = ProxyClient::new("http://localhost:8000", Duration::from_secs(30))?;
//! let payload = proxy.fetch("https://example.com/layer.geojson").await?;
//! println!("{}", payload);
//! # Ok(())
//! # }
//! ```

use super::client::{SampleFetcher, SchemaInferrer};
use super::error::CollaboratorError;
use super::response::{detail_from_body, schema_from_value};
use crate::schema::InferredSchema;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Default request timeout for collaborator calls
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Health report served by the middleware root endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub duckdb_version: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl HealthResponse {
    pub fn is_online(&self) -> bool {
        self.status.eq_ignore_ascii_case("online")
    }
}

#[derive(Debug, Serialize)]
struct InferRequest<'a> {
    sample: &'a Value,
}

fn build_http_client(timeout: Duration) -> Result<Client, CollaboratorError> {
    Client::builder().timeout(timeout).build().map_err(|e| {
        CollaboratorError::unknown(format!("Failed to build HTTP client: {}", e))
    })
}

fn map_send_error(err: reqwest::Error, target: &str, timeout: Duration) -> CollaboratorError {
    if err.is_timeout() {
        error!("Request to {} timed out after {:?}", target, timeout);
        CollaboratorError::Timeout {
            seconds: timeout.as_secs(),
        }
    } else if err.is_connect() {
        error!("Cannot connect to {}", target);
        CollaboratorError::transport(format!("Connection failed: {}", err))
    } else {
        error!("Request to {} failed: {}", target, err);
        CollaboratorError::transport(format!("Request failed: {}", err))
    }
}

/// Turns a non-2xx response into a structured or transport failure
async fn error_from_response(response: Response) -> CollaboratorError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    warn!("Collaborator returned status {}: {}", status, body);

    let detail = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|value| detail_from_body(&value));

    match detail {
        Some(detail) => CollaboratorError::Structured {
            detail,
            status_code: Some(status.as_u16()),
        },
        None => CollaboratorError::Transport {
            message: status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string(),
            status_code: Some(status.as_u16()),
        },
    }
}

async fn read_json(response: Response) -> Result<Value, CollaboratorError> {
    response.json::<Value>().await.map_err(|e| {
        error!("Failed to parse collaborator response: {}", e);
        CollaboratorError::unknown(format!("Response is not valid JSON: {}", e))
    })
}

/// Client for the fetch/infer middleware
pub struct ProxyClient {
    /// Middleware base URL, without trailing slash
    endpoint: String,

    /// Shared HTTP client with connection pooling
    http_client: Client,

    timeout: Duration,
}

impl ProxyClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, CollaboratorError> {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();

        Ok(Self {
            endpoint,
            http_client: build_http_client(timeout)?,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Queries the middleware root endpoint
    ///
    /// Returns `Ok(None)` when the middleware cannot be reached at all.
    pub async fn health_check(&self) -> Result<Option<HealthResponse>, CollaboratorError> {
        let url = format!("{}/", self.endpoint);
        debug!("Checking middleware health at {}", url);

        let response = match self.http_client.get(&url).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() || e.is_connect() => {
                warn!("Middleware at {} is not reachable: {}", self.endpoint, e);
                return Ok(None);
            }
            Err(e) => return Err(map_send_error(e, &self.endpoint, self.timeout)),
        };

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let health: HealthResponse = response.json().await.map_err(|e| {
            CollaboratorError::unknown(format!("Unexpected health response: {}", e))
        })?;

        if health.is_online() {
            info!("Middleware health check successful");
        } else {
            warn!(status = %health.status, "Middleware reports degraded health");
        }

        Ok(Some(health))
    }
}

#[async_trait]
impl SampleFetcher for ProxyClient {
    async fn fetch(&self, source_url: &str) -> Result<Value, CollaboratorError> {
        let url = format!("{}/fetch", self.endpoint);
        debug!(source = %source_url, "Requesting payload through {}", url);

        let start = Instant::now();
        let response = self
            .http_client
            .get(&url)
            .query(&[("url", source_url)])
            .send()
            .await
            .map_err(|e| map_send_error(e, &self.endpoint, self.timeout))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let payload = read_json(response).await?;
        info!(
            "Fetched payload through proxy in {:.2}s",
            start.elapsed().as_secs_f64()
        );
        Ok(payload)
    }

    fn name(&self) -> &str {
        "proxy"
    }
}

#[async_trait]
impl SchemaInferrer for ProxyClient {
    async fn infer(&self, sample: &Value) -> Result<InferredSchema, CollaboratorError> {
        let url = format!("{}/infer", self.endpoint);
        debug!("Requesting schema inference from {}", url);

        let start = Instant::now();
        let response = self
            .http_client
            .post(&url)
            .json(&InferRequest { sample })
            .send()
            .await
            .map_err(|e| map_send_error(e, &self.endpoint, self.timeout))?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let body = read_json(response).await?;
        let schema = schema_from_value(body)?;
        info!(
            fields = schema.fields.len(),
            "Schema inferred by proxy in {:.2}s",
            start.elapsed().as_secs_f64()
        );
        Ok(schema)
    }

    fn name(&self) -> &str {
        "proxy"
    }

    fn model_info(&self) -> Option<String> {
        Some(self.endpoint.clone())
    }
}

impl fmt::Debug for ProxyClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyClient")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Fetches the source URL directly, without the middleware
pub struct DirectFetcher {
    http_client: Client,
    timeout: Duration,
}

impl DirectFetcher {
    pub fn new(timeout: Duration) -> Result<Self, CollaboratorError> {
        Ok(Self {
            http_client: build_http_client(timeout)?,
            timeout,
        })
    }
}

#[async_trait]
impl SampleFetcher for DirectFetcher {
    async fn fetch(&self, source_url: &str) -> Result<Value, CollaboratorError> {
        debug!(source = %source_url, "Fetching payload directly");

        let start = Instant::now();
        let response = self
            .http_client
            .get(source_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                if e.is_builder() {
                    CollaboratorError::structured(format!("Invalid URL: {}", source_url))
                } else {
                    map_send_error(e, source_url, self.timeout)
                }
            })?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let payload = read_json(response).await?;
        info!(
            "Fetched payload directly in {:.2}s",
            start.elapsed().as_secs_f64()
        );
        Ok(payload)
    }

    fn name(&self) -> &str {
        "direct"
    }
}

impl fmt::Debug for DirectFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectFetcher")
            .field("timeout", &self.timeout)
            .finish()
    }
}
