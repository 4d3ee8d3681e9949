//! Normalized engine result.
//!
//! One structure carries both response shapes the engine has emitted over
//! time. The current shape (`decisionId`, `investmentDecision`,
//! `agentAnalysis`, `conversationLogs`, `marketInfo`) and the legacy shape
//! (`decision`, `agents`) are independent optional projections; which one
//! to display is the caller's concern.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Ok,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    #[serde(rename = "YES")]
    Yes,
    #[serde(rename = "NO")]
    No,
}

/// Consensus summary in the current shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentDecision {
    pub direction: Direction,
    pub size: f64,
    pub confidence: f64,
    pub summary: String,
}

/// One agent's contribution in the current shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentAnalysis {
    #[serde(alias = "agent_name")]
    pub agent_name: String,
    pub direction: Direction,
    pub confidence: f64,
    pub size: f64,
    pub reasoning: String,
}

/// Legacy consensus decision (`decision`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusDecision {
    pub direction: Direction,
    pub size: f64,
    pub reasoning: String,
}

/// Legacy per-agent decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDecision {
    pub direction: Direction,
    pub confidence: f64,
    pub size: f64,
    pub reasoning: String,
}

/// Legacy per-agent entry (`agents[]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentOutput {
    pub agent: String,
    pub decision: AgentDecision,
}

/// The bridge's single return shape.
///
/// `error` is set if and only if `status` is [`ResultStatus::Error`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedResult {
    pub status: ResultStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investment_decision: Option<InvestmentDecision>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_analysis: Option<Vec<AgentAnalysis>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_logs: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_info: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_decision: Option<ConsensusDecision>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legacy_agents: Option<Vec<AgentOutput>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UnifiedResult {
    /// A result with only `status` set.
    pub fn with_status(status: ResultStatus) -> Self {
        Self {
            status,
            decision_id: None,
            investment_decision: None,
            agent_analysis: None,
            conversation_logs: None,
            market_info: None,
            legacy_decision: None,
            legacy_agents: None,
            error: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == ResultStatus::Ok
    }

    pub fn has_current_shape(&self) -> bool {
        self.decision_id.is_some()
            || self.investment_decision.is_some()
            || self.agent_analysis.is_some()
            || self.conversation_logs.is_some()
            || self.market_info.is_some()
    }

    pub fn has_legacy_shape(&self) -> bool {
        self.legacy_decision.is_some() || self.legacy_agents.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_only_present_fields_in_camel_case() {
        let mut result = UnifiedResult::with_status(ResultStatus::Ok);
        result.decision_id = Some("d-9".into());
        result.legacy_decision = Some(ConsensusDecision {
            direction: Direction::No,
            size: 0.0,
            reasoning: "hold".into(),
        });

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({
                "status": "ok",
                "decisionId": "d-9",
                "legacyDecision": {"direction": "NO", "size": 0.0, "reasoning": "hold"}
            })
        );
    }

    #[test]
    fn shape_predicates_are_independent() {
        let mut result = UnifiedResult::with_status(ResultStatus::Ok);
        assert!(!result.has_current_shape());
        assert!(!result.has_legacy_shape());

        result.market_info = Some(Map::new());
        result.legacy_agents = Some(Vec::new());
        assert!(result.has_current_shape());
        assert!(result.has_legacy_shape());
    }

    #[test]
    fn agent_analysis_accepts_both_name_spellings() {
        let camel: AgentAnalysis = serde_json::from_value(json!({
            "agentName": "Quant", "direction": "YES", "confidence": 0.8, "size": 10, "reasoning": "r"
        }))
        .unwrap();
        let snake: AgentAnalysis = serde_json::from_value(json!({
            "agent_name": "Quant", "direction": "YES", "confidence": 0.8, "size": 10, "reasoning": "r"
        }))
        .unwrap();
        assert_eq!(camel, snake);
        assert_eq!(camel.direction, Direction::Yes);
    }
}
