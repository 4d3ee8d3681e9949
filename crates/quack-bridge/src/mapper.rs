//! Projection of the engine's JSON message onto [`UnifiedResult`].
//!
//! Every recognized key that is present is copied through; absent keys stay
//! unset. Keys are matched in camelCase first, then in the snake_case
//! spelling older engine builds emitted.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::result::{ResultStatus, UnifiedResult};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    #[error("expected a JSON object, got {found}")]
    NotAnObject { found: &'static str },

    #[error("field `{field}` has an unexpected shape: {message}")]
    InvalidField { field: &'static str, message: String },

    #[error("unknown status `{0}`")]
    UnknownStatus(String),

    #[error("status `{status}` contradicts the error field (error present: {has_error})")]
    InconsistentStatus { status: String, has_error: bool },
}

/// Build a [`UnifiedResult`] from an extracted message.
pub fn map_result(message: &Value) -> Result<UnifiedResult, MapError> {
    let Value::Object(map) = message else {
        return Err(MapError::NotAnObject {
            found: json_type(message),
        });
    };

    let error: Option<String> = field(map, "error", None)?;
    let status: Option<String> = field(map, "status", None)?;
    let status = match (status.as_deref(), error.is_some()) {
        (None, false) | (Some("ok"), false) => ResultStatus::Ok,
        (None, true) | (Some("error"), true) => ResultStatus::Error,
        (Some(s @ ("ok" | "error")), has_error) => {
            return Err(MapError::InconsistentStatus {
                status: s.to_string(),
                has_error,
            })
        }
        (Some(other), _) => return Err(MapError::UnknownStatus(other.to_string())),
    };

    let mut result = UnifiedResult::with_status(status);
    result.error = error;
    result.decision_id = field(map, "decisionId", Some("decision_id"))?;
    result.investment_decision = field(map, "investmentDecision", Some("investment_decision"))?;
    result.agent_analysis = field(map, "agentAnalysis", Some("agent_analysis"))?;
    result.conversation_logs = field(map, "conversationLogs", Some("conversation_logs"))?;
    result.market_info = field(map, "marketInfo", Some("market_info"))?;
    result.legacy_decision = field(map, "decision", None)?;
    result.legacy_agents = field(map, "agents", None)?;
    Ok(result)
}

fn field<T: DeserializeOwned>(
    map: &Map<String, Value>,
    key: &'static str,
    alias: Option<&'static str>,
) -> Result<Option<T>, MapError> {
    let value = map.get(key).or_else(|| alias.and_then(|a| map.get(a)));
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value) => T::deserialize(value)
            .map(Some)
            .map_err(|e| MapError::InvalidField {
                field: key,
                message: e.to_string(),
            }),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
