//! Failure classification.
//!
//! Each strategy attempt that does not yield a result produces an
//! [`AttemptFailure`]. The fallback loop absorbs them; only the last one is
//! turned into a [`BridgeError`] by [`classify`].

use std::path::Path;

use crate::error::{BridgeError, ErrorKind};
use crate::extract::{excerpt, ExtractError, EXCERPT_LIMIT};
use crate::mapper::MapError;
use crate::runner::{ProcessOutcome, RunnerError};
use crate::strategy::InvocationStrategy;

/// Why one strategy attempt produced no result.
#[derive(Debug)]
pub enum AttemptFailure {
    /// The process could not be started or supervised.
    Runner(RunnerError),
    /// The process outlived its timeout and was killed.
    TimedOut(ProcessOutcome),
    /// The process exited unsuccessfully.
    Exited(ProcessOutcome),
    /// Exit 0, but no JSON document could be located.
    Extract {
        error: ExtractError,
        stderr: Vec<u8>,
    },
    /// Exit 0 and a document was found, but it is not a valid result.
    Map {
        error: MapError,
        stdout: Vec<u8>,
        stderr: Vec<u8>,
    },
}

impl AttemptFailure {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Runner(e) if e.is_unavailable() => ErrorKind::EngineUnavailable,
            Self::Runner(_) => ErrorKind::Internal,
            Self::TimedOut(_) => ErrorKind::EngineTimeout,
            Self::Exited(_) => ErrorKind::EngineExecutionError,
            Self::Extract { .. } | Self::Map { .. } => ErrorKind::MalformedResponse,
        }
    }
}

impl std::fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Runner(e) => write!(f, "{e}"),
            Self::TimedOut(_) => f.write_str("timed out"),
            Self::Exited(outcome) => f.write_str(&outcome.status_text()),
            Self::Extract { error, .. } => write!(f, "{error}"),
            Self::Map { error, .. } => write!(f, "{error}"),
        }
    }
}

/// Turn the final attempt's failure into the caller-facing error.
pub fn classify(
    strategy: &InvocationStrategy,
    home_dir: &Path,
    failure: AttemptFailure,
) -> BridgeError {
    let label = strategy.to_string();
    match failure {
        AttemptFailure::Runner(e) if e.is_unavailable() => BridgeError::EngineUnavailable {
            strategy: label,
            program: e.program().to_string(),
            remediation: strategy.remediation(home_dir),
        },
        AttemptFailure::Runner(e) => BridgeError::internal(format!("{label}: {e}")),
        AttemptFailure::TimedOut(_) => BridgeError::EngineTimeout {
            strategy: label,
            timeout_ms: u64::try_from(strategy.timeout().as_millis()).unwrap_or(u64::MAX),
        },
        AttemptFailure::Exited(outcome) => BridgeError::EngineExecution {
            strategy: label,
            exit_code: outcome.exit_code,
            status: outcome.status_text(),
            diagnostics: outcome.diagnostics(),
        },
        AttemptFailure::Extract { error, stderr } => BridgeError::MalformedResponse {
            strategy: label,
            reason: error.to_string(),
            excerpt: error.excerpt().to_string(),
            stderr: stderr_context(&stderr),
        },
        AttemptFailure::Map {
            error,
            stdout,
            stderr,
        } => BridgeError::MalformedResponse {
            strategy: label,
            reason: error.to_string(),
            excerpt: excerpt(String::from_utf8_lossy(&stdout).trim(), EXCERPT_LIMIT),
            stderr: stderr_context(&stderr),
        },
    }
}

fn stderr_context(stderr: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    (!text.is_empty()).then(|| excerpt(text, EXCERPT_LIMIT))
}
