//! Shared test utilities for the dme-nxos integration tests.
//!
//! This module provides:
//! - A scripted [`Transport`] that replays canned replies and records requests
//! - Builders for JSON-RPC response entries and DME class bodies
//!
//! # Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::*;
//! ```

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{json, Value};

use dme_nxos::connection::{
    HttpMethod, Transport, TransportError, TransportResponse, TransportResult,
};

// ============================================================================
// Scripted Transport
// ============================================================================

/// One request seen by the transport
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: HttpMethod,
    pub path: String,
    pub body: Option<Value>,
}

/// Transport that replays scripted replies in order.
///
/// Once the script runs out every call answers `200 {}`.
#[derive(Default)]
pub struct ScriptedTransport {
    replies: RwLock<VecDeque<TransportResult<TransportResponse>>>,
    requests: RwLock<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a reply with the given status and body.
    pub fn reply(self, status: u16, body: Value) -> Self {
        self.replies
            .write()
            .push_back(Ok(TransportResponse::new(status, body)));
        self
    }

    /// Queue a transport failure.
    pub fn fail(self, error: TransportError) -> Self {
        self.replies.write().push_back(Err(error));
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.read().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.read().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    fn identifier(&self) -> &str {
        "scripted"
    }

    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&Value>,
    ) -> TransportResult<TransportResponse> {
        self.requests.write().push(RecordedRequest {
            method,
            path: path.to_string(),
            body: body.cloned(),
        });

        self.replies
            .write()
            .pop_front()
            .unwrap_or_else(|| Ok(TransportResponse::new(200, json!({}))))
    }
}

// ============================================================================
// Response Builders
// ============================================================================

/// Successful `cli_rest` entry whose `result.msg` holds `model`.
pub fn rpc_ok(id: u64, model: &Value) -> Value {
    json!({"jsonrpc": "2.0", "result": {"msg": model.to_string()}, "id": id})
}

/// Rejected `cli_rest` entry.
pub fn rpc_err(id: u64, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "error": {"code": -32602, "message": "Invalid params", "data": {"msg": message}},
        "id": id
    })
}

/// Class query body holding `l1PhysIf` objects with the given attributes.
pub fn l1_phys_if_body(objects: &[Value]) -> Value {
    json!({
        "totalCount": objects.len().to_string(),
        "imdata": objects
            .iter()
            .map(|attributes| json!({"l1PhysIf": {"attributes": attributes}}))
            .collect::<Vec<_>>()
    })
}

/// Model the device returns for an interface block.
pub fn interface_model(id: &str, descr: &str) -> Value {
    json!({
        "topSystem": {
            "children": [{
                "interfaceEntity": {
                    "children": [{
                        "l1PhysIf": {"attributes": {"id": id, "descr": descr, "adminSt": "up"}}
                    }]
                }
            }]
        }
    })
}
