//! Error types for dme-nxos.
//!
//! Every failure the engine can report is a variant of [`Error`]. Builders and
//! parsers raise precondition errors locally, the request dispatcher turns
//! transport failures and HTTP error statuses into the dispatch variants, and
//! the validation interpreter raises only for structurally malformed batches.

use crate::dme::dispatcher::RequestLine;
use thiserror::Error;

/// Result type alias for dme-nxos operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for dme-nxos.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Request Errors
    // ========================================================================
    /// A required input was missing or empty.
    #[error("Precondition failed: {0}")]
    Precondition(String),

    // ========================================================================
    // Dispatch Errors
    // ========================================================================
    /// The device could not be reached or the call timed out.
    #[error("Connection error occurred while calling {request}: {message}")]
    ConnectionFailure {
        /// Request that failed
        request: RequestLine,
        /// Underlying cause
        message: String,
    },

    /// TLS negotiation or certificate verification failed.
    #[error("Certificate error occurred while calling {request}: {message}")]
    CertificateFailure {
        /// Request that failed
        request: RequestLine,
        /// Underlying cause
        message: String,
    },

    /// The response body could not be decoded.
    #[error("Invalid response received from {request}: {message}")]
    InvalidResponse {
        /// Request that failed
        request: RequestLine,
        /// Underlying cause
        message: String,
    },

    /// Any other transport failure.
    #[error("Unexpected error occurred while calling {request}: {message}")]
    UnexpectedFailure {
        /// Request that failed
        request: RequestLine,
        /// Underlying cause
        message: String,
    },

    /// The device answered with an HTTP status of 400 or above.
    #[error("HTTP error {status} received from {request}{}", remote_suffix(.remote_error))]
    RemoteError {
        /// Request that failed
        request: RequestLine,
        /// HTTP status code
        status: u16,
        /// The `error` field of the response body, or null
        remote_error: serde_json::Value,
        /// Full response body
        payload: serde_json::Value,
    },

    // ========================================================================
    // Validation Errors
    // ========================================================================
    /// The JSON-RPC response batch contained no entries.
    #[error("Validation response batch is empty")]
    EmptyBatch,

    /// The final JSON-RPC entry did not carry a parseable model.
    #[error("Malformed validation response: {0}")]
    MalformedResponse(String),

    // ========================================================================
    // Serialization Errors
    // ========================================================================
    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// `: <error>` when the body carried an `error` member, nothing otherwise.
fn remote_suffix(remote_error: &serde_json::Value) -> String {
    if remote_error.is_null() {
        String::new()
    } else {
        format!(": {}", remote_error)
    }
}

impl Error {
    /// Creates a new precondition error.
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }

    /// Creates a new malformed-response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Returns the request a dispatch error refers to, if any.
    pub fn request(&self) -> Option<&RequestLine> {
        match self {
            Error::ConnectionFailure { request, .. }
            | Error::CertificateFailure { request, .. }
            | Error::InvalidResponse { request, .. }
            | Error::UnexpectedFailure { request, .. }
            | Error::RemoteError { request, .. } => Some(request),
            _ => None,
        }
    }

    /// Returns true if the failure happened before the device produced an answer.
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            Error::ConnectionFailure { .. }
                | Error::CertificateFailure { .. }
                | Error::InvalidResponse { .. }
                | Error::UnexpectedFailure { .. }
        )
    }

    /// Returns the error code for CLI exit status.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Precondition(_) => 4,
            Error::ConnectionFailure { .. } | Error::CertificateFailure { .. } => 3,
            Error::RemoteError { .. } => 2,
            Error::EmptyBatch | Error::MalformedResponse(_) | Error::InvalidResponse { .. } => 5,
            _ => 1,
        }
    }
}
