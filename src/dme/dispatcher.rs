//! Request dispatch.
//!
//! [`RequestDispatcher`] is the single point through which every DME request
//! leaves the engine. It performs exactly one transport round trip per call,
//! classifies failures into [`Error`] variants and shapes the result according
//! to its [`ResultMode`].
//!
//! Transport failures always propagate. What happens to an HTTP status of 400
//! or above depends on the mode:
//!
//! | Mode           | status < 400        | status >= 400                  |
//! |----------------|---------------------|--------------------------------|
//! | `FailFast`     | `Payload(body)`     | `Err(Error::RemoteError)`      |
//! | `ReturnStatus` | `Status{..}`        | `Status{..}` (logged)          |

use super::jsonrpc::JSON_RPC_ENDPOINT;
use crate::connection::{HttpMethod, Transport, TransportError};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Which API family a request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKind {
    /// REST object-model endpoints under `/api`
    Rest,
    /// JSON-RPC endpoint `/ins`
    Rpc,
}

/// Method and path of a dispatched request, used in logs and error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub api: ApiKind,
    pub method: HttpMethod,
    pub path: String,
}

impl RequestLine {
    pub fn rest(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            api: ApiKind::Rest,
            method,
            path: path.into(),
        }
    }

    pub fn rpc(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            api: ApiKind::Rpc,
            method,
            path: path.into(),
        }
    }
}

impl fmt::Display for RequestLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.api {
            ApiKind::Rest => write!(f, "{} {}", self.method, self.path),
            ApiKind::Rpc => write!(f, "RPC {} {}", self.method, self.path),
        }
    }
}

/// What a successful dispatch returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultMode {
    /// Return the bare payload; HTTP error statuses fail the call.
    #[default]
    FailFast,
    /// Return status and payload; the caller decides what an error status means.
    ReturnStatus,
}

impl fmt::Display for ResultMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultMode::FailFast => write!(f, "fail_fast"),
            ResultMode::ReturnStatus => write!(f, "return_status"),
        }
    }
}

impl std::str::FromStr for ResultMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "fail_fast" | "raise" => Ok(ResultMode::FailFast),
            "return_status" | "status" => Ok(ResultMode::ReturnStatus),
            _ => Err(Error::precondition(format!(
                "Invalid result mode '{}'. Valid options: fail_fast, return_status",
                s
            ))),
        }
    }
}

/// Result of one dispatched request.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchResult {
    /// Bare payload (`ResultMode::FailFast`)
    Payload(serde_json::Value),
    /// Status and payload (`ResultMode::ReturnStatus`)
    Status {
        status: u16,
        payload: serde_json::Value,
    },
}

impl DispatchResult {
    pub fn payload(&self) -> &serde_json::Value {
        match self {
            DispatchResult::Payload(payload) | DispatchResult::Status { payload, .. } => payload,
        }
    }

    pub fn into_payload(self) -> serde_json::Value {
        match self {
            DispatchResult::Payload(payload) | DispatchResult::Status { payload, .. } => payload,
        }
    }

    /// HTTP status, when the mode keeps it.
    pub fn status(&self) -> Option<u16> {
        match self {
            DispatchResult::Payload(_) => None,
            DispatchResult::Status { status, .. } => Some(*status),
        }
    }
}

/// Single chokepoint over a [`Transport`].
#[derive(Clone)]
pub struct RequestDispatcher {
    transport: Arc<dyn Transport>,
    mode: ResultMode,
    debug: bool,
}

impl fmt::Debug for RequestDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDispatcher")
            .field("transport", &self.transport.identifier())
            .field("mode", &self.mode)
            .field("debug", &self.debug)
            .finish()
    }
}

impl RequestDispatcher {
    pub fn new(transport: Arc<dyn Transport>, mode: ResultMode) -> Self {
        Self {
            transport,
            mode,
            debug: false,
        }
    }

    /// Log `DME API|RPC <method> <path> returned code <status>` for every
    /// successful call.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn mode(&self) -> ResultMode {
        self.mode
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Dispatch a REST request.
    pub async fn dispatch(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<DispatchResult> {
        self.send(RequestLine::rest(method, path), body).await
    }

    /// POST a JSON-RPC batch to the JSON-RPC endpoint.
    pub async fn dispatch_rpc(&self, body: &serde_json::Value) -> Result<DispatchResult> {
        self.send(RequestLine::rpc(HttpMethod::Post, JSON_RPC_ENDPOINT), Some(body))
            .await
    }

    async fn send(
        &self,
        request: RequestLine,
        body: Option<&serde_json::Value>,
    ) -> Result<DispatchResult> {
        let response = match self
            .transport
            .send(request.method, &request.path, body)
            .await
        {
            Ok(response) => response,
            Err(err) => {
                debug!(
                    device = self.transport.identifier(),
                    %request,
                    error = %err,
                    "DME request failed"
                );
                return Err(classify_transport_error(request, err));
            }
        };

        if response.is_error() {
            let remote_error = response
                .body
                .get("error")
                .cloned()
                .unwrap_or(serde_json::Value::Null);

            return match self.mode {
                ResultMode::FailFast => Err(Error::RemoteError {
                    request,
                    status: response.status,
                    remote_error,
                    payload: response.body,
                }),
                ResultMode::ReturnStatus => {
                    warn!(
                        device = self.transport.identifier(),
                        "HTTP error {} received from {}: {}", response.status, request, remote_error
                    );
                    Ok(DispatchResult::Status {
                        status: response.status,
                        payload: response.body,
                    })
                }
            };
        }

        if self.debug {
            let family = match request.api {
                ApiKind::Rest => "API",
                ApiKind::Rpc => "RPC",
            };
            debug!(
                "DME {} {} {} returned code {}",
                family, request.method, request.path, response.status
            );
        }

        Ok(match self.mode {
            ResultMode::FailFast => DispatchResult::Payload(response.body),
            ResultMode::ReturnStatus => DispatchResult::Status {
                status: response.status,
                payload: response.body,
            },
        })
    }
}

/// Map a transport failure to its dispatch error.
fn classify_transport_error(request: RequestLine, err: TransportError) -> Error {
    let message = err.to_string();
    match err {
        TransportError::Connection(_) | TransportError::Timeout(_) => {
            Error::ConnectionFailure { request, message }
        }
        TransportError::Certificate(_) => Error::CertificateFailure { request, message },
        TransportError::Decode(_) => Error::InvalidResponse { request, message },
        TransportError::InvalidConfig(_) | TransportError::Other(_) => {
            Error::UnexpectedFailure { request, message }
        }
    }
}
