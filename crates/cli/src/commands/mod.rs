pub mod eval;
pub mod plan;

use std::path::Path;

use tenet_rules::{JsonFrontend, RulesetFrontend, load_ruleset};
use tenet_rules_yaml::YamlFrontend;

/// Load a ruleset file with the frontend matching its extension.
pub fn read_ruleset(path: &Path) -> anyhow::Result<serde_json::Value> {
    let frontends: [&dyn RulesetFrontend; 2] = [&JsonFrontend, &YamlFrontend];
    Ok(load_ruleset(path, &frontends)?)
}
