//! JSON-RPC (`cli_rest`) request and response types.
//!
//! Each configuration line becomes one request in a batch. The device answers
//! with one entry per request, either a `result` whose `msg` is a JSON string
//! holding the DME model built so far, or an `error`.

use serde::{Deserialize, Serialize};

/// Path of the JSON-RPC endpoint
pub const JSON_RPC_ENDPOINT: &str = "/ins";

/// JSON-RPC protocol version
pub const JSON_RPC_VERSION: &str = "2.0";

/// Method converting CLI commands into DME REST payloads
pub const CLI_REST_METHOD: &str = "cli_rest";

/// Default id of the first request in a batch
pub const DEFAULT_START_ID: u64 = 1;

/// One `cli_rest` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub option: String,
    pub params: JsonRpcParams,
    pub id: u64,
}

/// Parameters of a `cli_rest` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonRpcParams {
    pub cmd: String,
    pub version: u32,
}

impl JsonRpcRequest {
    pub fn cli_rest(cmd: impl Into<String>, id: u64) -> Self {
        Self {
            jsonrpc: JSON_RPC_VERSION.to_string(),
            method: CLI_REST_METHOD.to_string(),
            option: "default".to_string(),
            params: JsonRpcParams {
                cmd: cmd.into(),
                version: 1,
            },
            id,
        }
    }
}

/// Build one request per line, ids increasing from `start_id`.
///
/// Lines are not filtered here; a blank string still yields a request.
pub fn build_batch<S: AsRef<str>>(lines: &[S], start_id: u64) -> Vec<JsonRpcRequest> {
    lines
        .iter()
        .zip(start_id..)
        .map(|(line, id)| JsonRpcRequest::cli_rest(line.as_ref(), id))
        .collect()
}

/// One entry of a batch response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct JsonRpcResponseEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jsonrpc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
}

impl JsonRpcResponseEntry {
    /// A successful entry carrying `msg`.
    pub fn success(id: u64, msg: impl Into<String>) -> Self {
        Self {
            jsonrpc: Some(JSON_RPC_VERSION.to_string()),
            id: Some(id.into()),
            result: Some(serde_json::json!({ "msg": msg.into() })),
            error: None,
        }
    }

    /// A failed entry carrying `error`.
    pub fn failure(id: u64, error: serde_json::Value) -> Self {
        Self {
            jsonrpc: Some(JSON_RPC_VERSION.to_string()),
            id: Some(id.into()),
            result: None,
            error: Some(error),
        }
    }

    /// Whether the entry reports a per-command error.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// `result.msg` when it is a string.
    pub fn result_msg(&self) -> Option<&str> {
        self.result.as_ref()?.get("msg")?.as_str()
    }

    /// The declared id as an integer.
    pub fn numeric_id(&self) -> Option<u64> {
        match self.id.as_ref()? {
            serde_json::Value::Number(n) => n.as_u64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_build_batch_wire_shape() {
        let batch = build_batch(&["interface Ethernet1/1", "  description test"], 1);
        let wire = serde_json::to_value(&batch).unwrap();
        assert_eq!(
            wire,
            json!([
                {
                    "jsonrpc": "2.0",
                    "method": "cli_rest",
                    "option": "default",
                    "params": {"cmd": "interface Ethernet1/1", "version": 1},
                    "id": 1
                },
                {
                    "jsonrpc": "2.0",
                    "method": "cli_rest",
                    "option": "default",
                    "params": {"cmd": "  description test", "version": 1},
                    "id": 2
                }
            ])
        );
    }

    #[test]
    fn test_build_batch_custom_start_id() {
        let batch = build_batch(&["a", "b", "c"], 10);
        let ids: Vec<u64> = batch.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![10, 11, 12]);
    }

    #[test]
    fn test_build_batch_empty() {
        let lines: Vec<String> = Vec::new();
        assert!(build_batch(&lines, DEFAULT_START_ID).is_empty());
    }

    #[test]
    fn test_build_batch_does_not_filter_blank_lines() {
        let batch = build_batch(&["", "feature bgp"], 1);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].params.cmd, "");
    }

    #[test]
    fn test_response_entry_accessors() {
        let ok: JsonRpcResponseEntry =
            serde_json::from_value(json!({"jsonrpc": "2.0", "result": {"msg": "{}"}, "id": 3}))
                .unwrap();
        assert!(!ok.is_error());
        assert_eq!(ok.result_msg(), Some("{}"));
        assert_eq!(ok.numeric_id(), Some(3));

        let err: JsonRpcResponseEntry = serde_json::from_value(
            json!({"error": {"code": -32602, "message": "Invalid params"}, "id": "4"}),
        )
        .unwrap();
        assert!(err.is_error());
        assert_eq!(err.result_msg(), None);
        assert_eq!(err.numeric_id(), Some(4));

        let bare = JsonRpcResponseEntry::default();
        assert_eq!(bare.numeric_id(), None);
    }

    #[test]
    fn test_result_msg_requires_string() {
        let entry = JsonRpcResponseEntry {
            result: Some(json!({"msg": {"topSystem": {}}})),
            ..JsonRpcResponseEntry::default()
        };
        assert_eq!(entry.result_msg(), None);
    }
}
