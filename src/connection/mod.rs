//! Transport layer for DME device communication.
//!
//! The engine never talks HTTP directly. Every request goes through the
//! [`Transport`] trait, which performs exactly one round trip and hands back
//! the HTTP status together with the decoded JSON body. Session handling,
//! TLS and credentials are the transport's business.
//!
//! # Supported Transports
//!
//! - **HTTP** ([`http::HttpTransport`]): reqwest client against the device's
//!   REST (`/api/...`) and JSON-RPC (`/ins`) endpoints
//!
//! # Example
//!
//! ```rust,ignore
//! use dme_nxos::connection::{http::HttpTransport, HttpMethod, Transport};
//!
//! let transport = HttpTransport::new(&config.device)?;
//! let response = transport
//!     .send(HttpMethod::Get, "/api/mo/sys.json", None)
//!     .await?;
//! println!("{} {}", response.status, response.body);
//! ```

/// reqwest-backed HTTP transport.
pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur while performing a single round trip.
///
/// The variants are ordered the way the dispatcher classifies them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The device could not be reached.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The call did not complete within the configured timeout.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// TLS handshake or certificate verification failed.
    #[error("Certificate verification failed: {0}")]
    Certificate(String),

    /// The response body could not be decoded as JSON.
    #[error("Failed to decode response body: {0}")]
    Decode(String),

    /// Transport configuration is invalid or incomplete.
    #[error("Invalid transport configuration: {0}")]
    InvalidConfig(String),

    /// Anything else.
    #[error("{0}")]
    Other(String),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// HTTP methods used against the DME API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Get => write!(f, "GET"),
            HttpMethod::Post => write!(f, "POST"),
            HttpMethod::Put => write!(f, "PUT"),
            HttpMethod::Patch => write!(f, "PATCH"),
            HttpMethod::Delete => write!(f, "DELETE"),
        }
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "PATCH" => Ok(HttpMethod::Patch),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(TransportError::InvalidConfig(format!(
                "Unsupported HTTP method '{}'. Valid options: GET, POST, PUT, PATCH, DELETE",
                s
            ))),
        }
    }
}

/// Status and decoded body of one round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Decoded JSON body (`{}` for an empty body)
    pub body: serde_json::Value,
}

impl TransportResponse {
    pub fn new(status: u16, body: serde_json::Value) -> Self {
        Self { status, body }
    }

    /// Whether the status signals a failure (400 and above).
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }
}

/// A single-shot request channel to one device.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Identifier of the device this transport talks to (used in logs).
    fn identifier(&self) -> &str;

    /// Perform one request. Non-2xx statuses are not errors at this level.
    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> TransportResult<TransportResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_method_round_trip() {
        for method in [
            HttpMethod::Get,
            HttpMethod::Post,
            HttpMethod::Put,
            HttpMethod::Patch,
            HttpMethod::Delete,
        ] {
            assert_eq!(method.to_string().parse::<HttpMethod>().unwrap(), method);
        }
        assert_eq!("post".parse::<HttpMethod>().unwrap(), HttpMethod::Post);
        assert_eq!("patch".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
        assert_eq!(serde_json::json!(HttpMethod::Patch), serde_json::json!("PATCH"));
        assert!("OPTIONS".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn test_response_is_error() {
        assert!(!TransportResponse::new(200, serde_json::json!({})).is_error());
        assert!(!TransportResponse::new(399, serde_json::json!({})).is_error());
        assert!(TransportResponse::new(400, serde_json::json!({})).is_error());
        assert!(TransportResponse::new(503, serde_json::json!({})).is_error());
    }
}
