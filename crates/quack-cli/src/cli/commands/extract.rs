use quack_bridge::extract::{excerpt, EXCERPT_LIMIT};
use quack_bridge::{extract_message, map_result, BridgeError};
use tracing::error;

use super::{print_json, read_input};
use crate::cli::args::ExtractArgs;
use crate::exit_codes;

/// Same extraction and mapping the bridge applies to a successful run.
pub fn run(args: ExtractArgs) -> anyhow::Result<i32> {
    let stdout = read_input(&args.input)?;
    let source = args.input.display().to_string();

    let mapped = extract_message(&stdout)
        .map_err(|e| BridgeError::MalformedResponse {
            strategy: source.clone(),
            reason: e.to_string(),
            excerpt: e.excerpt().to_string(),
            stderr: None,
        })
        .and_then(|message| {
            map_result(&message).map_err(|e| BridgeError::MalformedResponse {
                strategy: source.clone(),
                reason: e.to_string(),
                excerpt: excerpt(String::from_utf8_lossy(&stdout).trim(), EXCERPT_LIMIT),
                stderr: None,
            })
        });

    match mapped {
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
