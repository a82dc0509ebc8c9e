//! HTTP transport shared by the Session, KV and Agent API modules.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

/// Configuration for the Consul HTTP client
#[derive(Clone, Debug)]
pub struct ConsulClientConfig {
    /// Consul agent address, e.g. "http://127.0.0.1:8500"
    pub address: String,
    /// Connection timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// Read timeout in milliseconds
    pub read_timeout_ms: u64,
    /// Optional ACL token, sent as `X-Consul-Token`
    pub token: Option<String>,
}

impl Default for ConsulClientConfig {
    fn default() -> Self {
        Self {
            address: "http://127.0.0.1:8500".to_string(),
            connect_timeout_ms: 5000,
            read_timeout_ms: 30000,
            token: None,
        }
    }
}

impl ConsulClientConfig {
    /// Create a new config pointing at a single Consul agent
    pub fn new(address: &str) -> Self {
        Self {
            address: address.trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }

    /// Set connect/read timeouts
    pub fn with_timeouts(mut self, connect_ms: u64, read_ms: u64) -> Self {
        self.connect_timeout_ms = connect_ms;
        self.read_timeout_ms = read_ms;
        self
    }

    /// Set the ACL token
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }
}

/// Errors surfaced by the Consul HTTP client.
///
/// `Transport` covers connection-level failures (refused, timed out, DNS),
/// `Status` covers non-2xx responses with the body preserved for callers that
/// want to branch on it, `Decode` covers unparseable response bodies.
#[derive(Debug, thiserror::Error)]
pub enum ConsulApiError {
    #[error("transport error talking to consul: {0}")]
    Transport(String),

    #[error("consul returned status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to decode consul response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ConsulApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ConsulApiError::Decode(e.to_string())
        } else {
            ConsulApiError::Transport(e.to_string())
        }
    }
}

/// Consul HTTP client.
///
/// Cheap to clone; the underlying `reqwest::Client` is an `Arc` internally.
#[derive(Clone)]
pub struct ConsulClient {
    http: Client,
    config: ConsulClientConfig,
}

impl ConsulClient {
    /// Create a new client from config
    pub fn new(config: ConsulClientConfig) -> Result<Self, ConsulApiError> {
        let http = Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(Duration::from_millis(config.read_timeout_ms))
            .build()
            .map_err(|e| ConsulApiError::Transport(e.to_string()))?;

        Ok(Self { http, config })
    }

    pub(crate) fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.config.address, path)
    }

    fn apply_token(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.token {
            Some(token) => req.header("X-Consul-Token", token),
            None => req,
        }
    }

    /// GET a JSON body. A 404 is reported as `Status`, not `Decode`.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ConsulApiError> {
        let url = self.build_url(path);
        debug!(url = %url, "consul GET");

        let req = self.apply_token(self.http.get(&url)).query(query);
        let response = req.send().await?;
        Self::handle_json(response).await
    }

    /// PUT with an optional raw body, expecting a JSON response.
    pub(crate) async fn put_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Vec<u8>>,
    ) -> Result<T, ConsulApiError> {
        let url = self.build_url(path);
        debug!(url = %url, "consul PUT");

        let mut req = self.apply_token(self.http.put(&url)).query(query);
        if let Some(bytes) = body {
            req = req.body(bytes);
        }
        let response = req.send().await?;
        Self::handle_json(response).await
    }

    /// PUT with a JSON body, expecting a JSON response.
    pub(crate) async fn put_json_body<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ConsulApiError> {
        let url = self.build_url(path);
        debug!(url = %url, "consul PUT (json)");

        let req = self.apply_token(self.http.put(&url)).json(body);
        let response = req.send().await?;
        Self::handle_json(response).await
    }

    /// PUT expecting an empty (or ignored) response body.
    pub(crate) async fn put_unit<B: serde::Serialize>(
        &self,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), ConsulApiError> {
        let url = self.build_url(path);
        debug!(url = %url, "consul PUT (unit)");

        let mut req = self.apply_token(self.http.put(&url));
        if let Some(b) = body {
            req = req.json(b);
        }
        let response = req.send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "consul request failed");
            Err(ConsulApiError::Status { status, body })
        }
    }

    /// DELETE expecting a JSON response.
    pub(crate) async fn delete_json<T: DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ConsulApiError> {
        let url = self.build_url(path);
        debug!(url = %url, "consul DELETE");

        let response = self.apply_token(self.http.delete(&url)).send().await?;
        Self::handle_json(response).await
    }

    async fn handle_json<T: DeserializeOwned>(response: Response) -> Result<T, ConsulApiError> {
        let status = response.status();
        if status.is_success() {
            let bytes = response.bytes().await?;
            serde_json::from_slice(&bytes).map_err(|e| ConsulApiError::Decode(e.to_string()))
        } else {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "consul request failed");
            Err(ConsulApiError::Status { status, body })
        }
    }
}
