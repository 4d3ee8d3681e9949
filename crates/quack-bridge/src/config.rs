//! Bridge configuration.
//!
//! Supplied once at construction and immutable for the bridge's lifetime.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Where the engine lives and how long each strategy may run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Working directory for the engine process. Relative artifact paths
    /// resolve against it.
    #[serde(default = "default_home_dir")]
    pub home_dir: PathBuf,

    /// Compiled engine artifact, tried first when it exists.
    #[serde(default = "default_compiled_artifact")]
    pub compiled_artifact: PathBuf,

    /// Program that runs the compiled artifact. Empty runs the artifact
    /// directly.
    #[serde(default = "default_compiled_launcher")]
    pub compiled_launcher: String,

    #[serde(default = "default_compiled_timeout")]
    pub compiled_timeout_secs: u64,

    /// Interpretable entry script, always the last strategy.
    #[serde(default = "default_script_entry")]
    pub script_entry: PathBuf,

    #[serde(default = "default_script_runner")]
    pub script_runner: String,

    #[serde(default = "default_script_runner_args")]
    pub script_runner_args: Vec<String>,

    #[serde(default = "default_script_timeout")]
    pub script_timeout_secs: u64,
}

fn default_home_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_compiled_artifact() -> PathBuf {
    PathBuf::from("dist/agent_engine/services/decisionService.js")
}

fn default_compiled_launcher() -> String {
    "node".to_string()
}

fn default_compiled_timeout() -> u64 {
    60
}

fn default_script_entry() -> PathBuf {
    PathBuf::from("agent_engine/services/decisionService.ts")
}

fn default_script_runner() -> String {
    "npx".to_string()
}

fn default_script_runner_args() -> Vec<String> {
    vec![
        "ts-node".to_string(),
        "--project".to_string(),
        "tsconfig.json".to_string(),
    ]
}

fn default_script_timeout() -> u64 {
    120
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            home_dir: default_home_dir(),
            compiled_artifact: default_compiled_artifact(),
            compiled_launcher: default_compiled_launcher(),
            compiled_timeout_secs: default_compiled_timeout(),
            script_entry: default_script_entry(),
            script_runner: default_script_runner(),
            script_runner_args: default_script_runner_args(),
            script_timeout_secs: default_script_timeout(),
        }
    }
}

impl BridgeConfig {
    /// Create config from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `QUACK_ENGINE_HOME` | Engine working directory |
    /// | `QUACK_ENGINE_COMPILED` | Compiled artifact path |
    /// | `QUACK_ENGINE_LAUNCHER` | Launcher for the compiled artifact |
    /// | `QUACK_ENGINE_COMPILED_TIMEOUT` | Compiled strategy timeout (seconds) |
    /// | `QUACK_ENGINE_SCRIPT` | Entry script path |
    /// | `QUACK_ENGINE_RUNNER` | Interpreter for the entry script |
    /// | `QUACK_ENGINE_SCRIPT_TIMEOUT` | Script strategy timeout (seconds) |
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            home_dir: env_path("QUACK_ENGINE_HOME").unwrap_or(defaults.home_dir),
            compiled_artifact: env_path("QUACK_ENGINE_COMPILED")
                .unwrap_or(defaults.compiled_artifact),
            compiled_launcher: std::env::var("QUACK_ENGINE_LAUNCHER")
                .unwrap_or(defaults.compiled_launcher),
            compiled_timeout_secs: env_secs("QUACK_ENGINE_COMPILED_TIMEOUT")
                .unwrap_or(defaults.compiled_timeout_secs),
            script_entry: env_path("QUACK_ENGINE_SCRIPT").unwrap_or(defaults.script_entry),
            script_runner: std::env::var("QUACK_ENGINE_RUNNER")
                .unwrap_or(defaults.script_runner),
            script_runner_args: defaults.script_runner_args,
            script_timeout_secs: env_secs("QUACK_ENGINE_SCRIPT_TIMEOUT")
                .unwrap_or(defaults.script_timeout_secs),
        }
    }

    /// Load config from a YAML file. Missing keys take their defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.compiled_timeout_secs == 0 || self.script_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                message: "strategy timeouts must be at least 1 second".into(),
            });
        }
        if self.script_entry.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                message: "script_entry must not be empty".into(),
            });
        }
        if self.script_runner.trim().is_empty() {
            return Err(ConfigError::Invalid {
                message: "script_runner must not be empty".into(),
            });
        }
        Ok(())
    }

    pub fn with_home_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.home_dir = dir.into();
        self
    }

    pub fn with_compiled_artifact(mut self, path: impl Into<PathBuf>) -> Self {
        self.compiled_artifact = path.into();
        self
    }

    pub fn with_compiled_launcher(mut self, launcher: impl Into<String>) -> Self {
        self.compiled_launcher = launcher.into();
        self
    }

    pub fn with_script_entry(mut self, path: impl Into<PathBuf>) -> Self {
        self.script_entry = path.into();
        self
    }

    /// Set the script interpreter and its leading arguments.
    pub fn with_script_runner(mut self, runner: impl Into<String>, args: Vec<String>) -> Self {
        self.script_runner = runner.into();
        self.script_runner_args = args;
        self
    }

    pub fn with_compiled_timeout(mut self, timeout: Duration) -> Self {
        self.compiled_timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn with_script_timeout(mut self, timeout: Duration) -> Self {
        self.script_timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn compiled_timeout(&self) -> Duration {
        Duration::from_secs(self.compiled_timeout_secs)
    }

    pub fn script_timeout(&self) -> Duration {
        Duration::from_secs(self.script_timeout_secs)
    }

    /// Resolve a configured path against the home directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.home_dir.join(path)
        }
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var_os(key)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

fn env_secs(key: &str) -> Option<u64> {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .filter(|secs| *secs > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn defaults_follow_engine_layout() {
        let config = BridgeConfig::default();
        assert_eq!(config.compiled_timeout(), Duration::from_secs(60));
        assert_eq!(config.script_timeout(), Duration::from_secs(120));
        assert_eq!(config.compiled_launcher, "node");
        assert_eq!(config.script_runner, "npx");
        assert_eq!(
            config.script_runner_args,
            vec!["ts-node", "--project", "tsconfig.json"]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn resolve_joins_relative_paths_to_home() {
        let config = BridgeConfig::default().with_home_dir("/srv/backend");
        assert_eq!(
            config.resolve(Path::new("dist/engine.js")),
            PathBuf::from("/srv/backend/dist/engine.js")
        );
        assert_eq!(
            config.resolve(Path::new("/opt/engine.js")),
            PathBuf::from("/opt/engine.js")
        );
    }

    #[test]
    fn yaml_missing_keys_take_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bridge.yaml");
        std::fs::write(&path, "home_dir: /srv/backend\nscript_timeout_secs: 30\n").unwrap();

        let config = BridgeConfig::from_yaml_file(&path).unwrap();
        assert_eq!(config.home_dir, PathBuf::from("/srv/backend"));
        assert_eq!(config.script_timeout_secs, 30);
        assert_eq!(config.compiled_timeout_secs, 60);
        assert_eq!(config.script_runner, "npx");
    }

    #[test]
    fn yaml_zero_timeout_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bridge.yaml");
        std::fs::write(&path, "compiled_timeout_secs: 0\n").unwrap();

        let err = BridgeConfig::from_yaml_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn yaml_missing_file_is_read_error() {
        let err = BridgeConfig::from_yaml_file("/nonexistent/bridge.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    #[serial]
    fn from_env_overrides_defaults() {
        std::env::set_var("QUACK_ENGINE_HOME", "/tmp/engine-home");
        std::env::set_var("QUACK_ENGINE_SCRIPT_TIMEOUT", "15");
        std::env::set_var("QUACK_ENGINE_COMPILED_TIMEOUT", "not-a-number");

        let config = BridgeConfig::from_env();

        std::env::remove_var("QUACK_ENGINE_HOME");
        std::env::remove_var("QUACK_ENGINE_SCRIPT_TIMEOUT");
        std::env::remove_var("QUACK_ENGINE_COMPILED_TIMEOUT");

        assert_eq!(config.home_dir, PathBuf::from("/tmp/engine-home"));
        assert_eq!(config.script_timeout_secs, 15);
        assert_eq!(config.compiled_timeout_secs, 60);
    }
}
