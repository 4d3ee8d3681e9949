//! Process bridge to the Quack multi-agent decision engine.
//!
//! The engine is an external program that reads one JSON request on stdin
//! and prints one JSON result as the last line of stdout. This crate
//! provides:
//!
//! - Strategy planning (compiled artifact first, entry script as fallback)
//! - Process execution with per-strategy timeouts and kill-on-cancel
//! - Result extraction from log-prefixed stdout
//! - Mapping onto a single [`UnifiedResult`] covering both response shapes
//! - A stable error taxonomy ([`ErrorKind`]) with remediation guidance
//!
//! # Quick Start
//!
//! ```no_run
//! use quack_bridge::{BridgeConfig, DecisionBridge, DecisionRequest};
//!
//! # async fn example() -> Result<(), quack_bridge::BridgeError> {
//! let bridge = DecisionBridge::new(BridgeConfig::from_env());
//!
//! // No market: the engine picks one itself
//! let result = bridge.decide(DecisionRequest::default()).await?;
//! if let Some(decision) = &result.investment_decision {
//!     println!("{:?} size={} confidence={}", decision.direction, decision.size, decision.confidence);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `QUACK_ENGINE_HOME` | Engine working directory (default: `.`) |
//! | `QUACK_ENGINE_COMPILED` | Compiled artifact, relative to home |
//! | `QUACK_ENGINE_LAUNCHER` | Launcher for the artifact (default: `node`) |
//! | `QUACK_ENGINE_COMPILED_TIMEOUT` | Compiled strategy timeout in seconds (default: 60) |
//! | `QUACK_ENGINE_SCRIPT` | Entry script, relative to home |
//! | `QUACK_ENGINE_RUNNER` | Interpreter for the script (default: `npx`) |
//! | `QUACK_ENGINE_SCRIPT_TIMEOUT` | Script strategy timeout in seconds (default: 120) |

pub mod bridge;
pub mod classify;
pub mod config;
pub mod error;
pub mod extract;
pub mod mapper;
pub mod planner;
pub mod request;
pub mod result;
pub mod runner;
pub mod strategy;

// Re-export main types
pub use bridge::DecisionBridge;
pub use config::BridgeConfig;
pub use error::{BridgeError, BridgeResult, ConfigError, ErrorKind, ErrorReport};
pub use extract::extract_message;
pub use mapper::{map_result, MapError};
pub use planner::plan;
pub use request::{AgentData, DecisionRequest, EnginePayload, InvocationRequest, MarketData};
pub use result::{
    AgentAnalysis, AgentDecision, AgentOutput, ConsensusDecision, Direction, InvestmentDecision,
    ResultStatus, UnifiedResult,
};
pub use runner::{EngineRunner, ProcessOutcome, ProcessRunner, RunnerError};
pub use strategy::{EngineCommand, InvocationStrategy};
