use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use tenet_rules::RuleEngine;

use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Ruleset file (.json, .yaml or .yml).
    pub ruleset: PathBuf,
}

pub fn run(engine: &RuleEngine, args: &PlanArgs, format: &OutputFormat) -> anyhow::Result<ExitCode> {
    let ruleset = super::read_ruleset(&args.ruleset)?;
    let requests = engine.plan(&ruleset)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&requests)?);
        }
        OutputFormat::Text => {
            println!("{} accessors requested:", requests.len());
            for request in &requests {
                let registered = if engine.accessors().contains(&request.accessor_name) {
                    "   "
                } else {
                    " ! "
                };
                println!(
                    " {registered}{name} {values}",
                    name = request.accessor_name,
                    values = serde_json::to_string(&request.constraint_values)?,
                );
                for (child, values) in &request.children_constraint_values {
                    println!(
                        "      .{child} {values}",
                        values = serde_json::to_string(values)?
                    );
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
