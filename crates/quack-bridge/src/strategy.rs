//! Invocation strategies: concrete ways to start the engine.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

/// One way to invoke the engine, with its own command and timeout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvocationStrategy {
    /// A prebuilt artifact, run directly or through `launcher`.
    CompiledArtifact {
        path: PathBuf,
        launcher: Option<String>,
        #[serde(serialize_with = "serialize_millis")]
        timeout: Duration,
    },

    /// The entry script, run through an interpreter.
    InterpretedScript {
        entry_path: PathBuf,
        runner: String,
        runner_args: Vec<String>,
        #[serde(serialize_with = "serialize_millis")]
        timeout: Duration,
    },
}

impl InvocationStrategy {
    pub fn timeout(&self) -> Duration {
        match self {
            Self::CompiledArtifact { timeout, .. } | Self::InterpretedScript { timeout, .. } => {
                *timeout
            }
        }
    }

    /// Path to the engine code this strategy runs.
    pub fn target(&self) -> &Path {
        match self {
            Self::CompiledArtifact { path, .. } => path,
            Self::InterpretedScript { entry_path, .. } => entry_path,
        }
    }

    pub fn command(&self) -> EngineCommand {
        match self {
            Self::CompiledArtifact {
                path,
                launcher: Some(launcher),
                ..
            } => EngineCommand {
                program: launcher.clone(),
                args: vec![path.display().to_string()],
            },
            Self::CompiledArtifact {
                path,
                launcher: None,
                ..
            } => EngineCommand {
                program: path.display().to_string(),
                args: Vec::new(),
            },
            Self::InterpretedScript {
                entry_path,
                runner,
                runner_args,
                ..
            } => {
                let mut args = runner_args.clone();
                args.push(entry_path.display().to_string());
                EngineCommand {
                    program: runner.clone(),
                    args,
                }
            }
        }
    }

    /// Installation steps for when this strategy's program is missing.
    pub fn remediation(&self, home_dir: &Path) -> String {
        match self {
            Self::CompiledArtifact {
                launcher: Some(launcher),
                ..
            } => format!(
                "Install `{launcher}` and make sure it is on PATH, or remove the compiled artifact to fall back to the entry script."
            ),
            Self::CompiledArtifact { path, launcher: None, .. } => format!(
                "Rebuild the engine artifact at {} and make sure it is executable.",
                path.display()
            ),
            Self::InterpretedScript { runner, .. } => format!(
                "Install the engine dependencies: cd {} && npm install. Then either compile: npm run build, or make `{runner}` able to run the script (npm install -g ts-node).",
                home_dir.display()
            ),
        }
    }
}

impl fmt::Display for InvocationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CompiledArtifact { path, .. } => write!(f, "compiled:{}", path.display()),
            Self::InterpretedScript { entry_path, .. } => {
                write!(f, "script:{}", entry_path.display())
            }
        }
    }
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// Program and argument vector for one engine process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl fmt::Display for EngineCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script() -> InvocationStrategy {
        InvocationStrategy::InterpretedScript {
            entry_path: PathBuf::from("/srv/backend/engine.ts"),
            runner: "npx".into(),
            runner_args: vec!["ts-node".into(), "--project".into(), "tsconfig.json".into()],
            timeout: Duration::from_secs(120),
        }
    }

    #[test]
    fn script_command_appends_entry_after_runner_args() {
        let command = script().command();
        assert_eq!(command.program, "npx");
        assert_eq!(
            command.args,
            vec!["ts-node", "--project", "tsconfig.json", "/srv/backend/engine.ts"]
        );
        assert_eq!(
            command.to_string(),
            "npx ts-node --project tsconfig.json /srv/backend/engine.ts"
        );
    }

    #[test]
    fn compiled_without_launcher_runs_artifact_directly() {
        let strategy = InvocationStrategy::CompiledArtifact {
            path: PathBuf::from("/srv/backend/dist/engine"),
            launcher: None,
            timeout: Duration::from_secs(60),
        };
        let command = strategy.command();
        assert_eq!(command.program, "/srv/backend/dist/engine");
        assert!(command.args.is_empty());
    }

    #[test]
    fn display_labels_strategy_kind() {
        let compiled = InvocationStrategy::CompiledArtifact {
            path: PathBuf::from("/srv/backend/dist/engine.js"),
            launcher: Some("node".into()),
            timeout: Duration::from_secs(60),
        };
        assert_eq!(compiled.to_string(), "compiled:/srv/backend/dist/engine.js");
        assert_eq!(script().to_string(), "script:/srv/backend/engine.ts");
    }

    #[test]
    fn remediation_names_missing_program() {
        let compiled = InvocationStrategy::CompiledArtifact {
            path: PathBuf::from("dist/engine.js"),
            launcher: Some("node".into()),
            timeout: Duration::from_secs(60),
        };
        assert!(compiled.remediation(Path::new(".")).contains("`node`"));

        let text = script().remediation(Path::new("/srv/backend"));
        assert!(text.contains("cd /srv/backend && npm install"));
        assert!(text.contains("npm run build"));
        assert!(text.contains("`npx`"));
    }

    #[test]
    fn serializes_with_kind_tag_and_millis() {
        let value = serde_json::to_value(script()).unwrap();
        assert_eq!(value["kind"], "interpreted_script");
        assert_eq!(value["timeout"], 120_000);
    }
}
