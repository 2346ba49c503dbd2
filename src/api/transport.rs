//! HTTP transport seam
//!
//! One `send` is exactly one HTTP exchange. Retries, credential refresh and
//! response interpretation happen above this layer.

use crate::api::constants;
use crate::error::ClientError;
use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::HeaderMap;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;

/// A fully prepared request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Option<Value>,
    pub timeout: Duration,
}

impl HttpRequest {
    /// Value of a query parameter, if present
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Response as it came off the wire
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, headers: HeaderMap, body: impl Into<String>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Non-success HTTP response surfaced by the invoker
#[derive(Debug, Clone, PartialEq)]
pub struct ApiException {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: String,
}

impl From<RawResponse> for ApiException {
    fn from(response: RawResponse) -> Self {
        Self {
            status: response.status,
            headers: response.headers,
            body: response.body,
        }
    }
}

impl std::fmt::Display for ApiException {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HTTP {}: {}", self.status, self.body)
    }
}

/// Outcome of a failed invocation
#[derive(Debug)]
pub enum InvokeError {
    /// The array answered with a non-success status
    Status(ApiException),
    /// Nothing usable came back; not subject to status classification
    Local(ClientError),
}

impl From<ClientError> for InvokeError {
    fn from(error: ClientError) -> Self {
        InvokeError::Local(error)
    }
}

/// Performs a single HTTP exchange
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> anyhow::Result<RawResponse>;
}

/// Connection settings for the production transport
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub user_agent: String,
    pub verify_ssl: bool,
    /// Extra PEM root certificate to trust
    pub ssl_cert: Option<PathBuf>,
    pub connect_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            user_agent: constants::DEFAULT_USER_AGENT.to_string(),
            verify_ssl: true,
            ssl_cert: None,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// `reqwest`-backed transport with connection pooling
#[derive(Clone)]
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &TransportConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .danger_accept_invalid_certs(!config.verify_ssl);

        if let Some(path) = &config.ssl_cert {
            let pem = std::fs::read(path)
                .map_err(|e| ClientError::configuration(format!("Failed to read certificate {:?}", path), Some(e.into())))?;
            let certificate = reqwest::Certificate::from_pem(&pem)
                .map_err(|e| ClientError::configuration(format!("Invalid PEM certificate {:?}", path), Some(e.into())))?;
            builder = builder.add_root_certificate(certificate);
        }

        let http_client = builder
            .build()
            .map_err(|e| ClientError::configuration("Failed to build HTTP client", Some(e.into())))?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> anyhow::Result<RawResponse> {
        let mut builder = self
            .http_client
            .request(request.method, &request.url)
            .headers(request.headers)
            .timeout(request.timeout);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await?;

        Ok(RawResponse { status, headers, body })
    }
}
