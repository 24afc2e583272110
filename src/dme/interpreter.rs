//! Interpretation of JSON-RPC validation responses.
//!
//! The device answers a `cli_rest` batch with one entry per command. Every
//! successful entry carries the DME model accumulated up to that command as a
//! JSON string in `result.msg`, so the final entry holds the complete model.
//! Entries with an `error` member mark commands the device rejected. Those are
//! reported back as data and never fail the call.

use super::jsonrpc::JsonRpcResponseEntry;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// How per-command errors are matched back to the commands that caused them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorCorrelation {
    /// Response index `i` belongs to command `i`. Matches the device's
    /// documented ordering and is the legacy behavior.
    #[default]
    Positional,
    /// Response id `n` belongs to command `n - start_id`. Entries without a
    /// usable id fall back to their position.
    ById { start_id: u64 },
}

impl ErrorCorrelation {
    fn command_index(self, position: usize, entry: &JsonRpcResponseEntry) -> usize {
        match self {
            ErrorCorrelation::Positional => position,
            ErrorCorrelation::ById { start_id } => entry
                .numeric_id()
                .and_then(|id| id.checked_sub(start_id))
                .and_then(|offset| usize::try_from(offset).ok())
                .unwrap_or(position),
        }
    }
}

/// User-facing choice of correlation, resolved against a batch's start id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelateBy {
    #[default]
    Position,
    Id,
}

impl CorrelateBy {
    pub fn correlation(self, start_id: u64) -> ErrorCorrelation {
        match self {
            CorrelateBy::Position => ErrorCorrelation::Positional,
            CorrelateBy::Id => ErrorCorrelation::ById { start_id },
        }
    }
}

impl std::str::FromStr for CorrelateBy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "position" | "positional" | "index" => Ok(CorrelateBy::Position),
            "id" => Ok(CorrelateBy::Id),
            _ => Err(Error::precondition(format!(
                "Invalid correlation '{}'. Valid options: position, id",
                s
            ))),
        }
    }
}

/// Structured outcome of a validation round trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationOutcome {
    /// DME model parsed from the final entry
    pub model: serde_json::Value,
    /// Command index to the command text the device rejected
    pub errors: BTreeMap<usize, String>,
}

impl ValidationOutcome {
    /// True when no command was rejected.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// `{model, valid, errors?}`, omitting `errors` when empty.
    pub fn to_result_value(&self) -> serde_json::Value {
        let mut result = serde_json::json!({
            "model": self.model,
            "valid": self.is_valid(),
        });
        if !self.errors.is_empty() {
            result["errors"] = serde_json::json!(self.errors);
        }
        result
    }
}

/// Decode a raw batch body. A bare object is treated as a batch of one.
pub fn parse_batch(body: &serde_json::Value) -> Result<Vec<JsonRpcResponseEntry>> {
    let invalid_entry =
        |e: serde_json::Error| Error::malformed(format!("invalid JSON-RPC entry: {}", e));
    match body {
        serde_json::Value::Array(_) => {
            serde_json::from_value(body.clone()).map_err(invalid_entry)
        }
        serde_json::Value::Object(_) => serde_json::from_value(body.clone())
            .map(|entry| vec![entry])
            .map_err(invalid_entry),
        other => Err(Error::malformed(format!(
            "expected a JSON-RPC batch, got {}",
            json_type_name(other)
        ))),
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Interpret a batch with positional error correlation.
pub fn interpret<S: AsRef<str>>(
    entries: &[JsonRpcResponseEntry],
    commands: &[S],
) -> Result<ValidationOutcome> {
    interpret_with(entries, commands, ErrorCorrelation::Positional)
}

/// Interpret a batch with the given error correlation.
pub fn interpret_with<S: AsRef<str>>(
    entries: &[JsonRpcResponseEntry],
    commands: &[S],
    correlation: ErrorCorrelation,
) -> Result<ValidationOutcome> {
    let last = entries.last().ok_or(Error::EmptyBatch)?;

    let msg = last
        .result_msg()
        .ok_or_else(|| Error::malformed("final entry has no result.msg"))?;
    let model = serde_json::from_str(msg)
        .map_err(|e| Error::malformed(format!("result.msg is not valid JSON: {}", e)))?;

    let mut errors = BTreeMap::new();
    for (position, entry) in entries.iter().enumerate().filter(|(_, e)| e.is_error()) {
        let index = correlation.command_index(position, entry);
        match commands.get(index) {
            Some(command) => {
                errors.insert(index, command.as_ref().to_string());
            }
            None => warn!(
                index,
                error = %entry.error.as_ref().unwrap_or(&serde_json::Value::Null),
                "validation error does not match any submitted command"
            ),
        }
    }

    Ok(ValidationOutcome { model, errors })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const MODEL: &str = r#"{"topSystem":{"children":[{"interfaceEntity":{}}]}}"#;

    #[test]
    fn test_all_success() {
        let entries = vec![
            JsonRpcResponseEntry::success(1, "{}"),
            JsonRpcResponseEntry::success(2, MODEL),
        ];
        let outcome = interpret(&entries, &["interface Ethernet1/1", "  no shutdown"]).unwrap();
        assert!(outcome.is_valid());
        assert_eq!(outcome.model, serde_json::from_str::<serde_json::Value>(MODEL).unwrap());
        assert_eq!(
            outcome.to_result_value(),
            json!({"model": outcome.model, "valid": true})
        );
    }

    #[test]
    fn test_errors_map_to_command_text() {
        let entries = vec![
            JsonRpcResponseEntry::failure(1, json!({"message": "bad"})),
            JsonRpcResponseEntry::failure(2, json!({"message": "bad"})),
            JsonRpcResponseEntry::success(3, "{}"),
        ];
        let outcome = interpret(&entries, &["a", "b", "c"]).unwrap();
        assert!(!outcome.is_valid());
        assert_eq!(
            outcome.errors,
            BTreeMap::from([(0, "a".to_string()), (1, "b".to_string())])
        );
        assert_eq!(
            outcome.to_result_value(),
            json!({"model": {}, "valid": false, "errors": {"0": "a", "1": "b"}})
        );
    }

    #[test]
    fn test_empty_batch() {
        let entries: Vec<JsonRpcResponseEntry> = Vec::new();
        assert!(matches!(
            interpret(&entries, &["a"]).unwrap_err(),
            Error::EmptyBatch
        ));
    }

    #[test]
    fn test_last_entry_without_msg_is_malformed() {
        let entries = vec![
            JsonRpcResponseEntry::success(1, "{}"),
            JsonRpcResponseEntry::failure(2, json!("rejected")),
        ];
        assert!(matches!(
            interpret(&entries, &["a", "b"]).unwrap_err(),
            Error::MalformedResponse(_)
        ));
    }

    #[test]
    fn test_last_entry_with_invalid_json_is_malformed() {
        let entries = vec![JsonRpcResponseEntry::success(1, "not json")];
        let err = interpret(&entries, &["a"]).unwrap_err();
        assert!(err.to_string().contains("result.msg is not valid JSON"));
    }

    #[test]
    fn test_correlate_by_id() {
        // Entries arrive out of order; ids identify the commands.
        let entries = vec![
            JsonRpcResponseEntry::success(11, "{}"),
            JsonRpcResponseEntry::failure(10, json!("rejected")),
            JsonRpcResponseEntry::success(12, "{}"),
        ];
        let commands = ["first", "second", "third"];

        let positional = interpret(&entries, &commands).unwrap();
        assert_eq!(positional.errors, BTreeMap::from([(1, "second".to_string())]));

        let by_id =
            interpret_with(&entries, &commands, ErrorCorrelation::ById { start_id: 10 }).unwrap();
        assert_eq!(by_id.errors, BTreeMap::from([(0, "first".to_string())]));
    }

    #[test]
    fn test_correlate_by_id_falls_back_to_position() {
        let entries = vec![
            JsonRpcResponseEntry {
                error: Some(json!("rejected")),
                ..JsonRpcResponseEntry::default()
            },
            JsonRpcResponseEntry::success(2, "{}"),
        ];
        let outcome =
            interpret_with(&entries, &["a", "b"], ErrorCorrelation::ById { start_id: 1 }).unwrap();
        assert_eq!(outcome.errors, BTreeMap::from([(0, "a".to_string())]));
    }

    #[test]
    fn test_error_beyond_commands_is_ignored() {
        let entries = vec![
            JsonRpcResponseEntry::success(1, "{}"),
            JsonRpcResponseEntry::failure(2, json!("extra")),
            JsonRpcResponseEntry::success(3, "{}"),
        ];
        let outcome = interpret(&entries, &["only"]).unwrap();
        assert!(outcome.is_valid());
    }

    #[test]
    fn test_correlate_by_from_str() {
        assert_eq!("id".parse::<CorrelateBy>().unwrap(), CorrelateBy::Id);
        assert_eq!("Position".parse::<CorrelateBy>().unwrap(), CorrelateBy::Position);
        assert!("name".parse::<CorrelateBy>().is_err());
        assert_eq!(
            CorrelateBy::Id.correlation(5),
            ErrorCorrelation::ById { start_id: 5 }
        );
        assert_eq!(CorrelateBy::Position.correlation(5), ErrorCorrelation::Positional);
    }

    #[test]
    fn test_parse_batch_shapes() {
        let array = json!([{"result": {"msg": "{}"}, "id": 1}]);
        assert_eq!(parse_batch(&array).unwrap().len(), 1);

        let single = json!({"result": {"msg": "{}"}, "id": 1});
        assert_eq!(parse_batch(&single).unwrap()[0].numeric_id(), Some(1));

        assert!(matches!(
            parse_batch(&json!("oops")).unwrap_err(),
            Error::MalformedResponse(_)
        ));
    }

    #[test]
    fn test_parse_batch_rejects_non_object_entries() {
        for body in [json!([{"result": {"msg": "{}"}}, null]), json!(["oops"]), json!([1])] {
            let err = parse_batch(&body).unwrap_err();
            assert!(matches!(err, Error::MalformedResponse(_)), "{:?}", err);
            assert_eq!(err.exit_code(), 5);
        }
    }
}
