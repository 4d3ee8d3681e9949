//! Engine process execution.
//!
//! One call to [`EngineRunner::run`] is one child process: the request is
//! written to stdin, stdout and stderr are drained, and the child is killed
//! if it outlives the strategy's timeout. Dropping the returned future kills
//! the child as well, so a caller that gives up never leaks an engine.
//!
//! Completion means both exit and EOF on stdout and stderr. An engine that
//! prints its result, exits 0 and leaves a background child holding the
//! pipes is reported as timed out once the timeout fires.

use std::io;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{ChildStdin, Command};
use tracing::{debug, warn};

use crate::extract::excerpt;
use crate::strategy::InvocationStrategy;

/// Longest diagnostic text kept from a failed engine run.
pub const DIAGNOSTIC_LIMIT: usize = 2000;

/// How long to wait for a killed child to be reaped.
const KILL_GRACE: Duration = Duration::from_secs(2);

/// Everything observed from one engine process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// Exit code, if the process exited on its own.
    pub exit_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// Whether the process was killed due to timeout.
    pub timed_out: bool,
}

impl ProcessOutcome {
    /// Whether the output may be handed to extraction.
    pub fn succeeded(&self) -> bool {
        self.exit_code == Some(0) && !self.timed_out
    }

    /// Human-readable exit status.
    pub fn status_text(&self) -> String {
        match (self.timed_out, self.exit_code) {
            (true, _) => "timed out".to_string(),
            (false, Some(code)) => format!("exit code {code}"),
            (false, None) => "terminated by signal".to_string(),
        }
    }

    /// Stderr, or stdout when stderr is empty, bounded to
    /// [`DIAGNOSTIC_LIMIT`] characters.
    pub fn diagnostics(&self) -> String {
        let stderr = String::from_utf8_lossy(&self.stderr);
        let text = if stderr.trim().is_empty() {
            String::from_utf8_lossy(&self.stdout)
        } else {
            stderr
        };
        let text = text.trim();
        if text.is_empty() {
            "Unknown error".to_string()
        } else {
            excerpt(text, DIAGNOSTIC_LIMIT)
        }
    }
}

/// Failures that prevented an outcome from being observed at all.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("i/o error while running `{program}`: {source}")]
    Io {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl RunnerError {
    /// Whether the program itself is missing or not executable.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Spawn { source, .. }
                if matches!(source.kind(), io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied)
        )
    }

    pub fn program(&self) -> &str {
        match self {
            Self::Spawn { program, .. } | Self::Io { program, .. } => program,
        }
    }
}

/// Runs one strategy to completion or timeout.
#[async_trait]
pub trait EngineRunner: Send + Sync {
    async fn run(
        &self,
        strategy: &InvocationStrategy,
        cwd: &Path,
        input: &[u8],
    ) -> Result<ProcessOutcome, RunnerError>;
}

/// [`EngineRunner`] backed by real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

#[async_trait]
impl EngineRunner for ProcessRunner {
    async fn run(
        &self,
        strategy: &InvocationStrategy,
        cwd: &Path,
        input: &[u8],
    ) -> Result<ProcessOutcome, RunnerError> {
        let command = strategy.command();
        let timeout = strategy.timeout();

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .current_dir(cwd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);

        debug!(
            strategy = %strategy,
            command = %command,
            timeout_ms = timeout.as_millis() as u64,
            "spawning engine"
        );

        let start = Instant::now();
        let mut child = cmd.spawn().map_err(|source| RunnerError::Spawn {
            program: command.program.clone(),
            source,
        })?;
        let mut group = ProcessGroupGuard::new(child.id());

        let stdin = child.stdin.take();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let mut stdout_buf = Vec::new();
        let mut stderr_buf = Vec::new();

        // Feed, drain and wait concurrently: an engine that fills its stdout
        // pipe before reading stdin would otherwise deadlock against us.
        let exchange = async {
            let (written, out, err, status) = tokio::join!(
                write_input(stdin, input),
                drain(stdout, &mut stdout_buf),
                drain(stderr, &mut stderr_buf),
                child.wait(),
            );
            written?;
            out?;
            err?;
            status
        };

        let waited = tokio::time::timeout(timeout, exchange).await;
        let waited: io::Result<ExitStatus> = match waited {
            Ok(result) => result,
            Err(_elapsed) => {
                group.kill();
                let reaped = tokio::time::timeout(KILL_GRACE, child.kill()).await;
                warn!(
                    strategy = %strategy,
                    timeout_ms = timeout.as_millis() as u64,
                    reaped = matches!(reaped, Ok(Ok(()))),
                    "engine timed out, process killed"
                );
                return Ok(ProcessOutcome {
                    exit_code: None,
                    stdout: stdout_buf,
                    stderr: stderr_buf,
                    timed_out: true,
                });
            }
        };

        let status = match waited {
            Ok(status) => status,
            Err(source) => {
                group.kill();
                let _ = tokio::time::timeout(KILL_GRACE, child.kill()).await;
                return Err(RunnerError::Io {
                    program: command.program,
                    source,
                });
            }
        };
        group.disarm();

        debug!(
            strategy = %strategy,
            exit_code = ?status.code(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            stdout_bytes = stdout_buf.len(),
            stderr_bytes = stderr_buf.len(),
            "engine exited"
        );

        Ok(ProcessOutcome {
            exit_code: status.code(),
            stdout: stdout_buf,
            stderr: stderr_buf,
            timed_out: false,
        })
    }
}

async fn write_input(stdin: Option<ChildStdin>, input: &[u8]) -> io::Result<()> {
    let Some(mut stdin) = stdin else {
        return Ok(());
    };
    match stdin.write_all(input).await {
        // The engine may exit without reading its input; its exit status decides.
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
    // stdin is dropped here, which closes the pipe and signals EOF.
}

async fn drain<R: AsyncRead + Unpin>(pipe: Option<R>, buf: &mut Vec<u8>) -> io::Result<()> {
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(buf).await?;
    }
    Ok(())
}

/// Kills the child's whole process group on drop unless disarmed, so
/// launcher wrappers (`npx` -> `node`) do not leave grandchildren behind.
struct ProcessGroupGuard {
    #[cfg(unix)]
    pgid: Option<nix::unistd::Pid>,
}

impl ProcessGroupGuard {
    #[cfg(unix)]
    fn new(pid: Option<u32>) -> Self {
        Self {
            pgid: pid
                .and_then(|p| i32::try_from(p).ok())
                .map(nix::unistd::Pid::from_raw),
        }
    }

    #[cfg(not(unix))]
    fn new(_pid: Option<u32>) -> Self {
        Self {}
    }

    fn kill(&mut self) {
        #[cfg(unix)]
        if let Some(pgid) = self.pgid.take() {
            // ESRCH just means the group is already gone.
            let _ = nix::sys::signal::killpg(pgid, nix::sys::signal::Signal::SIGKILL);
        }
    }

    fn disarm(&mut self) {
        #[cfg(unix)]
        {
            self.pgid = None;
        }
    }
}

impl Drop for ProcessGroupGuard {
    fn drop(&mut self) {
        self.kill();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(exit_code: Option<i32>, stdout: &str, stderr: &str) -> ProcessOutcome {
        ProcessOutcome {
            exit_code,
            stdout: stdout.as_bytes().to_vec(),
            stderr: stderr.as_bytes().to_vec(),
            timed_out: false,
        }
    }

    #[test]
    fn succeeded_requires_zero_exit_without_timeout() {
        assert!(outcome(Some(0), "", "").succeeded());
        assert!(!outcome(Some(1), "", "").succeeded());
        assert!(!outcome(None, "", "").succeeded());

        let mut timed_out = outcome(Some(0), "", "");
        timed_out.timed_out = true;
        assert!(!timed_out.succeeded());
    }

    #[test]
    fn diagnostics_prefer_stderr_then_stdout() {
        assert_eq!(
            outcome(Some(1), "stdout text", "  stderr text\n").diagnostics(),
            "stderr text"
        );
        assert_eq!(
            outcome(Some(1), "stdout text\n", " \n").diagnostics(),
            "stdout text"
        );
        assert_eq!(outcome(Some(1), "", "").diagnostics(), "Unknown error");
    }

    #[test]
    fn diagnostics_are_bounded() {
        let long = "x".repeat(DIAGNOSTIC_LIMIT * 2);
        let text = outcome(Some(1), "", &long).diagnostics();
        assert!(text.chars().count() <= DIAGNOSTIC_LIMIT + 64);
        assert!(text.contains("truncated"));
    }

    #[test]
    fn status_text_describes_exit() {
        assert_eq!(outcome(Some(3), "", "").status_text(), "exit code 3");
        assert_eq!(outcome(None, "", "").status_text(), "terminated by signal");
    }

    #[test]
    fn missing_program_is_unavailable() {
        let err = RunnerError::Spawn {
            program: "node".into(),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(err.is_unavailable());
        assert_eq!(err.program(), "node");

        let err = RunnerError::Io {
            program: "node".into(),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(!err.is_unavailable());
    }
}
