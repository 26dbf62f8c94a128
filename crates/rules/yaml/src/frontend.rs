use std::path::Path;

use serde_json::Value;
use tenet_rules::{RuleError, RulesetFrontend};

/// A [`RulesetFrontend`] that decodes YAML ruleset documents.
///
/// Mapping keys keep their document order, so the first failing parameter
/// reported by the engine matches the order the rules were written in.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlFrontend;

impl RulesetFrontend for YamlFrontend {
    fn extensions(&self) -> &[&str] {
        &["yaml", "yml"]
    }

    fn parse(&self, content: &str) -> Result<Value, RuleError> {
        serde_yaml_ng::from_str(content)
            .map_err(|e| RuleError::Parse(format!("YAML parse error: {e}")))
    }

    fn parse_file(&self, path: &Path) -> Result<Value, RuleError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RuleError::Parse(format!("cannot read {}: {e}", path.display())))?;

        serde_yaml_ng::from_str(&content).map_err(|e| {
            RuleError::Parse(format!("YAML parse error in {}: {e}", path.display()))
        })
    }
}
