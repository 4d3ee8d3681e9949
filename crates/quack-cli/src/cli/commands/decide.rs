use anyhow::Context;
use quack_bridge::{DecisionBridge, DecisionRequest};
use tracing::error;

use super::{load_config, print_json, read_input};
use crate::cli::args::DecideArgs;
use crate::exit_codes;

pub async fn run(args: DecideArgs) -> anyhow::Result<i32> {
    let config = load_config(&args.engine)?;
    let request = match &args.request {
        Some(path) => {
            let raw = read_input(path)?;
            serde_json::from_slice::<DecisionRequest>(&raw)
                .with_context(|| format!("invalid decision request in {}", path.display()))?
        }
        None => DecisionRequest::default(),
    };

    let bridge = DecisionBridge::new(config);
    match bridge.decide(request).await {
        Ok(result) => {
            print_json(&result, args.pretty)?;
            Ok(exit_codes::SUCCESS)
        }
        Err(err) => {
            error!(kind = %err.kind(), "{err}");
            print_json(&err.report(), args.pretty)?;
            Ok(exit_codes::for_kind(err.kind()))
        }
    }
}
