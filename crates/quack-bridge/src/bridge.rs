//! The decision bridge: plan, run with fallback, extract, map.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::classify::{classify, AttemptFailure};
use crate::config::BridgeConfig;
use crate::error::{BridgeError, BridgeResult};
use crate::extract::{excerpt, extract_message, EXCERPT_LIMIT};
use crate::mapper::map_result;
use crate::planner::{absolutize, plan};
use crate::request::{DecisionRequest, InvocationRequest};
use crate::result::UnifiedResult;
use crate::runner::{EngineRunner, ProcessRunner};
use crate::strategy::InvocationStrategy;

/// Runs the decision engine for one request at a time.
///
/// Cheap to clone; concurrent calls share nothing but configuration and
/// each spawns its own processes.
#[derive(Clone)]
pub struct DecisionBridge {
    config: Arc<BridgeConfig>,
    runner: Arc<dyn EngineRunner>,
}

impl std::fmt::Debug for DecisionBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionBridge")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DecisionBridge {
    pub fn new(config: BridgeConfig) -> Self {
        Self::with_runner(config, Arc::new(ProcessRunner))
    }

    /// Use a custom runner (tests, sandboxes).
    pub fn with_runner(config: BridgeConfig, runner: Arc<dyn EngineRunner>) -> Self {
        Self {
            config: Arc::new(config),
            runner,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// The strategies a call made now would try, in order.
    pub fn plan(&self) -> Vec<InvocationStrategy> {
        plan(&self.config)
    }

    /// Shape a typed request and invoke the engine with it.
    pub async fn decide(&self, request: DecisionRequest) -> BridgeResult<UnifiedResult> {
        let payload = request.into_payload()?;
        self.invoke(&payload).await
    }

    /// Invoke the engine with any serializable request.
    ///
    /// Strategies run strictly one after another. The first attempt that
    /// yields a mapped result wins; failures before the last strategy are
    /// logged and absorbed, and only the last one is returned.
    pub async fn invoke<T: Serialize + ?Sized>(&self, request: &T) -> BridgeResult<UnifiedResult> {
        let input = InvocationRequest::from_serializable(request)?;
        let home = absolutize(&self.config.home_dir);
        // A missing cwd makes spawn fail with NotFound, which would read as
        // a missing interpreter.
        if !home.is_dir() {
            return Err(BridgeError::internal(format!(
                "engine home {} does not exist or is not a directory",
                home.display()
            )));
        }
        let strategies = self.plan();

        info!(
            strategies = strategies.len(),
            request_bytes = input.len(),
            "invoking decision engine"
        );

        let mut last: Option<(InvocationStrategy, AttemptFailure)> = None;
        let total = strategies.len();
        for (index, strategy) in strategies.into_iter().enumerate() {
            let failure = match self.attempt(&strategy, &home, &input).await {
                Ok(result) => {
                    info!(strategy = %strategy, status = ?result.status, "decision engine succeeded");
                    return Ok(result);
                }
                Err(failure) => failure,
            };

            if index + 1 < total {
                warn!(
                    strategy = %strategy,
                    kind = %failure.kind(),
                    error = %failure,
                    "strategy failed, falling back"
                );
            }
            last = Some((strategy, failure));
        }

        match last {
            Some((strategy, failure)) => Err(classify(&strategy, &home, failure)),
            None => Err(BridgeError::internal("no invocation strategy available")),
        }
    }

    async fn attempt(
        &self,
        strategy: &InvocationStrategy,
        home: &Path,
        input: &InvocationRequest,
    ) -> Result<UnifiedResult, AttemptFailure> {
        let outcome = self
            .runner
            .run(strategy, home, input.as_bytes())
            .await
            .map_err(AttemptFailure::Runner)?;

        if !outcome.stderr.is_empty() {
            debug!(
                strategy = %strategy,
                stderr = %excerpt(String::from_utf8_lossy(&outcome.stderr).trim(), EXCERPT_LIMIT),
                "engine stderr"
            );
        }

        if outcome.timed_out {
            return Err(AttemptFailure::TimedOut(outcome));
        }
        if !outcome.succeeded() {
            return Err(AttemptFailure::Exited(outcome));
        }

        let message = match extract_message(&outcome.stdout) {
            Ok(message) => message,
            Err(error) => {
                return Err(AttemptFailure::Extract {
                    error,
                    stderr: outcome.stderr,
                })
            }
        };
        map_result(&message).map_err(|error| AttemptFailure::Map {
            error,
            stdout: outcome.stdout,
            stderr: outcome.stderr,
        })
    }
}
