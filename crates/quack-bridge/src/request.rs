//! Request payloads sent to the engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{BridgeError, BridgeResult};

/// Market context for a decision.
///
/// `question` identifies a prediction market; `symbol` a traded asset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume24h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_cap: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question: Option<String>,
}

impl MarketData {
    /// Whether the engine can identify a market from this context.
    pub fn is_identified(&self) -> bool {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        present(&self.symbol) || present(&self.question)
    }
}

/// Auxiliary analysis inputs, passed through to the agents untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub portfolio: Option<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_data: Option<BTreeMap<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub historical_data: Option<Vec<BTreeMap<String, Value>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<BTreeMap<String, Value>>,
}

/// Inbound decision request as accepted from callers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DecisionRequest {
    #[serde(default)]
    pub market: Option<MarketData>,
    #[serde(default)]
    pub data: Option<AgentData>,
}

/// Normalized engine payload.
///
/// An unidentified market becomes `{}` so the engine auto-selects one;
/// absent data becomes `{}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnginePayload {
    pub market: Value,
    pub data: Value,
}

impl DecisionRequest {
    pub fn into_payload(self) -> BridgeResult<EnginePayload> {
        let market = match self.market {
            Some(market) if market.is_identified() => to_value(&market)?,
            _ => empty_object(),
        };
        let data = match self.data {
            Some(data) => to_value(&data)?,
            None => empty_object(),
        };
        Ok(EnginePayload { market, data })
    }
}

fn empty_object() -> Value {
    Value::Object(serde_json::Map::new())
}

fn to_value<T: Serialize>(value: &T) -> BridgeResult<Value> {
    serde_json::to_value(value)
        .map_err(|e| BridgeError::internal(format!("failed to serialize request: {e}")))
}

/// Serialized request bytes, built once per call.
///
/// Every strategy of the call reads the same bytes; nothing mutates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRequest {
    bytes: Vec<u8>,
}

impl InvocationRequest {
    pub fn from_serializable<T: Serialize + ?Sized>(request: &T) -> BridgeResult<Self> {
        let bytes = serde_json::to_vec(request)
            .map_err(|e| BridgeError::internal(format!("failed to serialize request: {e}")))?;
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
