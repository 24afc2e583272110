//! reqwest-backed transport for the DME REST and JSON-RPC endpoints.
//!
//! REST calls are sent as `application/json`; calls to the JSON-RPC endpoint
//! (`/ins`) are sent as `application/json-rpc`. Non-2xx responses are not
//! errors here: their bodies are decoded and returned with the status so the
//! dispatcher can classify them.

use super::{HttpMethod, Transport, TransportError, TransportResponse, TransportResult};
use crate::config::DeviceConfig;
use crate::dme::jsonrpc::JSON_RPC_ENDPOINT;
use async_trait::async_trait;
use reqwest::{header, Client, Method};
use std::time::Duration;
use tracing::trace;
use url::Url;

/// Content type for REST calls
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Content type for JSON-RPC calls
pub const JSON_RPC_CONTENT_TYPE: &str = "application/json-rpc";

/// HTTP transport to a single DME-speaking device.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    identifier: String,
    base_url: Url,
    client: Client,
    username: Option<String>,
    password: Option<String>,
    timeout_secs: u64,
}

impl HttpTransport {
    /// Build a transport from device settings.
    pub fn new(device: &DeviceConfig) -> TransportResult<Self> {
        let host = device
            .host
            .as_deref()
            .filter(|h| !h.trim().is_empty())
            .ok_or_else(|| TransportError::InvalidConfig("device host is required".to_string()))?;

        let base = format!("{}://{}:{}", device.scheme(), host, device.effective_port());
        let base_url = Url::parse(&base).map_err(|e| {
            TransportError::InvalidConfig(format!("Invalid device URL '{}': {}", base, e))
        })?;

        Self::with_base_url(base_url, device)
    }

    /// Build a transport against an explicit base URL. Host, port and scheme
    /// from `device` are ignored.
    pub fn with_base_url(base_url: Url, device: &DeviceConfig) -> TransportResult<Self> {
        let client = Self::build_client(device.timeout, device.validate_certs)?;
        let identifier = base_url
            .host_str()
            .map(String::from)
            .unwrap_or_else(|| base_url.to_string());

        Ok(Self {
            identifier,
            base_url,
            client,
            username: device.username.clone(),
            password: device.password.clone(),
            timeout_secs: device.timeout,
        })
    }

    /// Base URL requests are resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn build_client(timeout_secs: u64, validate_certs: bool) -> TransportResult<Client> {
        Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs((timeout_secs / 2).max(1)))
            .danger_accept_invalid_certs(!validate_certs)
            .build()
            .map_err(|e| {
                TransportError::InvalidConfig(format!("Failed to build HTTP client: {}", e))
            })
    }

    fn content_type(path: &str) -> &'static str {
        let endpoint = path.split('?').next().unwrap_or(path);
        if endpoint == JSON_RPC_ENDPOINT {
            JSON_RPC_CONTENT_TYPE
        } else {
            JSON_CONTENT_TYPE
        }
    }

    fn reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    /// Decode a response body; an empty body decodes to `{}`.
    fn decode_body(text: &str) -> TransportResult<serde_json::Value> {
        if text.trim().is_empty() {
            return Ok(serde_json::json!({}));
        }
        serde_json::from_str(text).map_err(|e| TransportError::Decode(e.to_string()))
    }

    fn classify(err: &reqwest::Error, timeout_secs: u64) -> TransportError {
        if err.is_timeout() {
            return TransportError::Timeout(timeout_secs);
        }

        let message = error_chain(err);
        if message.to_lowercase().contains("certificate") {
            TransportError::Certificate(message)
        } else if err.is_connect() {
            TransportError::Connection(message)
        } else if err.is_decode() {
            TransportError::Decode(message)
        } else {
            TransportError::Other(message)
        }
    }
}

/// Flatten an error and its sources into one line.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[async_trait]
impl Transport for HttpTransport {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> TransportResult<TransportResponse> {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| TransportError::Other(format!("Invalid request path '{}': {}", path, e)))?;

        trace!(%method, %url, "sending DME request");

        let mut request = self
            .client
            .request(Self::reqwest_method(method), url)
            .header(header::CONTENT_TYPE, Self::content_type(path))
            .header(header::ACCEPT, JSON_CONTENT_TYPE);

        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_ref());
        }

        if let Some(body) = body {
            let payload =
                serde_json::to_vec(body).map_err(|e| TransportError::Other(e.to_string()))?;
            request = request.body(payload);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Self::classify(&e, self.timeout_secs))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| Self::classify(&e, self.timeout_secs))?;

        Ok(TransportResponse::new(status, Self::decode_body(&text)?))
    }
}
