//! Explicit device handle.
//!
//! A [`DmeClient`] wraps one [`RequestDispatcher`] and exposes the three flows
//! the engine supports: reading the object model, validating CLI text and
//! applying a configuration tree. The caller owns the client and passes it
//! wherever it is needed; nothing is cached globally.

use super::dispatcher::{RequestDispatcher, ResultMode};
use super::interpreter::{interpret_with, parse_batch, CorrelateBy, ValidationOutcome};
use super::jsonrpc::{build_batch, DEFAULT_START_ID};
use super::parser::{parse_config_block, ConfigLine, ConfigSections};
use super::url::DmeAddress;
use crate::connection::{HttpMethod, Transport};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Managed object every configuration tree is posted to
pub const SYSTEM_MO_PATH: &str = "/api/mo/sys.json";

/// Input of a validation round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateRequest {
    pub commands: Vec<ConfigLine>,
    pub start_id: u64,
    pub correlate_by: CorrelateBy,
}

impl ValidateRequest {
    pub fn new(commands: Vec<ConfigLine>) -> Self {
        Self {
            commands,
            start_id: DEFAULT_START_ID,
            correlate_by: CorrelateBy::default(),
        }
    }

    /// Parse raw configuration text.
    pub fn from_text(text: &str) -> Self {
        Self::new(parse_config_block(Some(text)))
    }

    /// Assemble and parse `before`/`parents`/`lines`/`after` groups.
    pub fn from_sections(sections: &ConfigSections) -> Self {
        Self::new(sections.to_config_lines())
    }

    pub fn with_start_id(mut self, start_id: u64) -> Self {
        self.start_id = start_id;
        self
    }

    pub fn with_correlate_by(mut self, correlate_by: CorrelateBy) -> Self {
        self.correlate_by = correlate_by;
        self
    }
}

/// Result of applying a configuration tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigureOutcome {
    pub dme_response: serde_json::Value,
    pub changed: bool,
}

/// A request the client can execute.
#[derive(Debug, Clone, PartialEq)]
pub enum DmeRequest {
    Read(DmeAddress),
    Validate(ValidateRequest),
    Configure(serde_json::Value),
}

/// Response to a [`DmeRequest`].
#[derive(Debug, Clone, PartialEq)]
pub enum DmeResponse {
    Read(serde_json::Value),
    Validate(ValidationOutcome),
    Configure(ConfigureOutcome),
}

impl DmeResponse {
    /// JSON rendering: raw body, `{model, valid, errors?}` or
    /// `{dme_response, changed}`.
    pub fn to_value(&self) -> serde_json::Value {
        match self {
            DmeResponse::Read(body) => body.clone(),
            DmeResponse::Validate(outcome) => outcome.to_result_value(),
            DmeResponse::Configure(outcome) => serde_json::json!({
                "dme_response": outcome.dme_response,
                "changed": outcome.changed,
            }),
        }
    }
}

/// Handle to one DME-speaking device.
#[derive(Debug, Clone)]
pub struct DmeClient {
    dispatcher: RequestDispatcher,
}

impl DmeClient {
    /// Client over `transport` in fail-fast mode.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::from_dispatcher(RequestDispatcher::new(transport, ResultMode::FailFast))
    }

    pub fn from_dispatcher(dispatcher: RequestDispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &RequestDispatcher {
        &self.dispatcher
    }

    /// GET a class or managed-object query and return the raw body.
    pub async fn read(&self, address: &DmeAddress) -> Result<serde_json::Value> {
        let path = address.to_path()?;
        debug!(%path, "reading DME object model");
        let result = self.dispatcher.dispatch(HttpMethod::Get, &path, None).await?;
        Ok(result.into_payload())
    }

    /// Validate configuration commands through the JSON-RPC endpoint.
    pub async fn validate(&self, request: &ValidateRequest) -> Result<ValidationOutcome> {
        if request.commands.is_empty() {
            return Err(Error::precondition("no configuration commands to validate"));
        }

        let batch = build_batch(&request.commands, request.start_id);
        let body = serde_json::to_value(&batch)?;
        debug!(commands = batch.len(), start_id = request.start_id, "validating configuration");

        let result = self.dispatcher.dispatch_rpc(&body).await?;
        let entries = parse_batch(result.payload())?;
        let outcome = interpret_with(
            &entries,
            &request.commands,
            request.correlate_by.correlation(request.start_id),
        )?;

        if !outcome.is_valid() {
            info!(rejected = outcome.errors.len(), "device rejected configuration commands");
        }
        Ok(outcome)
    }

    /// POST a configuration tree to the system managed object.
    pub async fn configure(&self, config: &serde_json::Value) -> Result<ConfigureOutcome> {
        let is_empty = match config {
            serde_json::Value::Null => true,
            serde_json::Value::Object(map) => map.is_empty(),
            _ => false,
        };
        if is_empty {
            return Err(Error::precondition("Configuration payload is required"));
        }

        let result = self
            .dispatcher
            .dispatch(HttpMethod::Post, SYSTEM_MO_PATH, Some(config))
            .await?;

        Ok(ConfigureOutcome {
            dme_response: result.into_payload(),
            changed: true,
        })
    }

    /// Execute any [`DmeRequest`].
    pub async fn execute(&self, request: DmeRequest) -> Result<DmeResponse> {
        match request {
            DmeRequest::Read(address) => self.read(&address).await.map(DmeResponse::Read),
            DmeRequest::Validate(request) => {
                self.validate(&request).await.map(DmeResponse::Validate)
            }
            DmeRequest::Configure(config) => {
                self.configure(&config).await.map(DmeResponse::Configure)
            }
        }
    }
}
