use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use tenet_rules::RuleEngine;

use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct EvalArgs {
    /// Ruleset file (.json, .yaml or .yml).
    pub ruleset: PathBuf,
    /// External parameters passed to every accessor (JSON string or @file path).
    #[arg(long)]
    pub params: Option<String>,
}

fn parse_params(raw: &str) -> anyhow::Result<serde_json::Value> {
    if let Some(path) = raw.strip_prefix('@') {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    } else {
        Ok(serde_json::from_str(raw)?)
    }
}

pub async fn run(
    engine: &RuleEngine,
    args: &EvalArgs,
    format: &OutputFormat,
) -> anyhow::Result<ExitCode> {
    let ruleset = super::read_ruleset(&args.ruleset)?;
    let params = args.params.as_deref().map(parse_params).transpose()?;

    let result = engine
        .evaluate_with_reason(&ruleset, params.as_ref())
        .await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        OutputFormat::Text => {
            println!("{result}");
        }
    }

    Ok(if result.value {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
