//! Error types for the engine bridge.
//!
//! Every failure that reaches a caller is one of the five [`ErrorKind`]s.
//! Per-strategy failures stay inside the fallback loop (see
//! [`crate::classify`]) and only the last one is turned into a
//! [`BridgeError`].

use std::path::PathBuf;

use serde::Serialize;

/// Stable classification of a bridge failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    EngineUnavailable,
    EngineTimeout,
    EngineExecutionError,
    MalformedResponse,
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EngineUnavailable => "engine_unavailable",
            Self::EngineTimeout => "engine_timeout",
            Self::EngineExecutionError => "engine_execution_error",
            Self::MalformedResponse => "malformed_response",
            Self::Internal => "internal",
        }
    }

    /// What the caller should do about it.
    pub fn guidance(self) -> &'static str {
        match self {
            Self::EngineUnavailable => {
                "install the engine dependencies (npm install) and build the compiled artifact (npm run build)"
            }
            Self::EngineTimeout => "raise the strategy timeout or check the engine's health",
            Self::EngineExecutionError => "inspect the captured engine diagnostics",
            Self::MalformedResponse => {
                "the engine must print exactly one JSON document as its last stdout line"
            }
            Self::Internal => "unexpected bridge failure; see logs",
        }
    }

    /// Exit code for the CLI.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::EngineExecutionError => 1,
            Self::Internal => 2,
            Self::EngineUnavailable => 3,
            Self::EngineTimeout => 4,
            Self::MalformedResponse => 5,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified bridge errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    /// The launcher or interpreter for the last strategy could not be started.
    #[error("decision engine unavailable ({strategy}): `{program}` could not be started. {remediation}")]
    EngineUnavailable {
        strategy: String,
        program: String,
        remediation: String,
    },

    /// The last strategy exceeded its timeout and was terminated.
    #[error("decision engine timed out after {timeout_ms}ms ({strategy})")]
    EngineTimeout { strategy: String, timeout_ms: u64 },

    /// The last strategy exited unsuccessfully.
    #[error("decision engine failed ({strategy}, {status}): {diagnostics}")]
    EngineExecution {
        strategy: String,
        exit_code: Option<i32>,
        status: String,
        diagnostics: String,
    },

    /// The engine exited cleanly but its output could not be understood.
    #[error("invalid response from decision engine ({strategy}): {reason}")]
    MalformedResponse {
        strategy: String,
        reason: String,
        excerpt: String,
        stderr: Option<String>,
    },

    /// Anything outside the above, e.g. the request could not be serialized.
    #[error("internal bridge error: {message}")]
    Internal { message: String },
}

impl BridgeError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EngineUnavailable { .. } => ErrorKind::EngineUnavailable,
            Self::EngineTimeout { .. } => ErrorKind::EngineTimeout,
            Self::EngineExecution { .. } => ErrorKind::EngineExecutionError,
            Self::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.kind().exit_code()
    }

    /// Supporting text for the caller: remediation steps, engine
    /// diagnostics, or the raw output excerpt.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::EngineUnavailable { remediation, .. } => Some(remediation),
            Self::EngineExecution { diagnostics, .. } => Some(diagnostics),
            Self::MalformedResponse { excerpt, .. } => Some(excerpt),
            Self::EngineTimeout { .. } | Self::Internal { .. } => None,
        }
    }

    /// Error body for an HTTP-facing caller.
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            status: "error",
            kind: self.kind(),
            error: self.to_string(),
            guidance: self.kind().guidance(),
            detail: self.detail().map(str::to_string),
            stderr: self.stderr().map(str::to_string),
        }
    }

    /// Engine stderr kept as context when the output was unusable.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::MalformedResponse { stderr, .. } => stderr.as_deref(),
            _ => None,
        }
    }
}

/// Serializable error body: `{status, kind, error, guidance, detail?, stderr?}`.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub status: &'static str,
    pub kind: ErrorKind,
    pub error: String,
    pub guidance: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
}

/// Result type for bridge calls.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config: {message}")]
    Invalid { message: String },
}
