use std::io::Read;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use quack_bridge::BridgeConfig;
use serde::Serialize;

use super::args::EngineArgs;

pub mod decide;
mod dispatch;
pub mod extract;
pub mod plan;

pub use dispatch::dispatch;

/// Config file if given, else environment; explicit flags win over both.
pub(crate) fn load_config(args: &EngineArgs) -> anyhow::Result<BridgeConfig> {
    let mut config = match &args.config {
        Some(path) => BridgeConfig::from_yaml_file(path)?,
        None => BridgeConfig::from_env(),
    };
    if let Some(home) = &args.home {
        config = config.with_home_dir(home);
    }
    if let Some(secs) = args.compiled_timeout {
        config = config.with_compiled_timeout(Duration::from_secs(secs));
    }
    if let Some(secs) = args.script_timeout {
        config = config.with_script_timeout(Duration::from_secs(secs));
    }
    config.validate()?;
    Ok(config)
}

/// Read a file, or stdin for `-`.
pub(crate) fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

pub(crate) fn print_json<T: Serialize>(value: &T, pretty: bool) -> anyhow::Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}
