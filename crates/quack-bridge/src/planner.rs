//! Strategy planning.
//!
//! Order:
//! 1. Compiled artifact (only if it exists on disk)
//! 2. Entry script (always, as the final fallback)

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::BridgeConfig;
use crate::strategy::InvocationStrategy;

/// Build the ordered, non-empty strategy list for one call.
pub fn plan(config: &BridgeConfig) -> Vec<InvocationStrategy> {
    let mut strategies = Vec::with_capacity(2);

    let compiled = absolutize(&config.resolve(&config.compiled_artifact));
    if compiled.is_file() {
        let launcher = Some(config.compiled_launcher.trim())
            .filter(|l| !l.is_empty())
            .map(str::to_string);
        strategies.push(InvocationStrategy::CompiledArtifact {
            path: compiled,
            launcher,
            timeout: config.compiled_timeout(),
        });
    } else {
        debug!(path = %compiled.display(), "compiled artifact not found, skipping");
    }

    strategies.push(InvocationStrategy::InterpretedScript {
        entry_path: absolutize(&config.resolve(&config.script_entry)),
        runner: config.script_runner.clone(),
        runner_args: config.script_runner_args.clone(),
        timeout: config.script_timeout(),
    });

    debug!(
        strategies = %strategies
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
        "planned engine strategies"
    );
    strategies
}

// The child runs with the home directory as cwd, so a path relative to the
// parent's cwd would resolve differently there.
pub(crate) fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> BridgeConfig {
        BridgeConfig::default()
            .with_home_dir(dir.path())
            .with_compiled_artifact("dist/engine.js")
            .with_script_entry("engine.ts")
    }

    #[test]
    fn script_only_when_artifact_missing() {
        let dir = TempDir::new().unwrap();
        let strategies = plan(&config_in(&dir));

        assert_eq!(strategies.len(), 1);
        assert!(matches!(
            &strategies[0],
            InvocationStrategy::InterpretedScript { entry_path, .. }
                if entry_path == &dir.path().join("engine.ts")
        ));
    }

    #[test]
    fn compiled_first_when_artifact_exists() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("dist")).unwrap();
        std::fs::write(dir.path().join("dist/engine.js"), "// built").unwrap();

        let config = config_in(&dir)
            .with_compiled_timeout(Duration::from_secs(5))
            .with_script_timeout(Duration::from_secs(9));
        let strategies = plan(&config);

        assert_eq!(strategies.len(), 2);
        assert!(matches!(
            &strategies[0],
            InvocationStrategy::CompiledArtifact { launcher: Some(l), .. } if l == "node"
        ));
        assert_eq!(strategies[0].timeout(), Duration::from_secs(5));
        assert!(matches!(
            strategies[1],
            InvocationStrategy::InterpretedScript { .. }
        ));
        assert_eq!(strategies[1].timeout(), Duration::from_secs(9));
    }

    #[test]
    fn directory_at_artifact_path_is_not_an_artifact() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("dist/engine.js")).unwrap();

        assert_eq!(plan(&config_in(&dir)).len(), 1);
    }

    #[test]
    fn empty_launcher_runs_artifact_directly() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("dist")).unwrap();
        std::fs::write(dir.path().join("dist/engine.js"), "").unwrap();

        let strategies = plan(&config_in(&dir).with_compiled_launcher(""));
        assert!(matches!(
            strategies[0],
            InvocationStrategy::CompiledArtifact { launcher: None, .. }
        ));
    }

    #[test]
    fn planned_paths_are_absolute() {
        let config = BridgeConfig::default().with_home_dir("relative-home");
        for strategy in plan(&config) {
            assert!(strategy.target().is_absolute(), "{strategy}");
        }
    }
}
