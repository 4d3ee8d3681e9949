use quack_bridge::plan;
use serde_json::Value;

use super::{load_config, print_json};
use crate::cli::args::PlanArgs;
use crate::exit_codes;

pub fn run(args: PlanArgs) -> anyhow::Result<i32> {
    let config = load_config(&args.engine)?;
    let mut planned = Vec::new();
    for strategy in plan(&config) {
        let mut entry = serde_json::to_value(&strategy)?;
        if let Value::Object(map) = &mut entry {
            map.insert("label".into(), Value::String(strategy.to_string()));
            map.insert(
                "command".into(),
                Value::String(strategy.command().to_string()),
            );
        }
        planned.push(entry);
    }
    print_json(&planned, true)?;
    Ok(exit_codes::SUCCESS)
}
