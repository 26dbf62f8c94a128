//! Engine configuration loaded from TOML.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::RuleError;
use crate::ir::parameter::is_reserved_name;

/// Configuration for building a [`RuleEngine`](crate::RuleEngine).
///
/// ```toml
/// ignore = ["debug_flag", "legacy.value"]
///
/// [accessors]
/// region = "eu-west"
/// limits = { daily = 5, burst = 2 }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Ruleset keys excluded from parsing and evaluation.
    #[serde(default)]
    pub ignore: Vec<String>,
    /// Static accessors: each name always resolves to the given value.
    #[serde(default)]
    pub accessors: BTreeMap<String, serde_json::Value>,
}

impl EngineConfig {
    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, RuleError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| RuleError::Config(format!("invalid engine configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, RuleError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RuleError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Reject names the engine would refuse to register.
    pub fn validate(&self) -> Result<(), RuleError> {
        for name in self.accessors.keys() {
            if name.is_empty() || is_reserved_name(name) {
                return Err(RuleError::Config(format!(
                    "invalid accessor name '{name}' in [accessors]"
                )));
            }
        }
        if let Some(name) = self.ignore.iter().find(|n| is_reserved_name(n)) {
            return Err(RuleError::Config(format!(
                "reserved name '{name}' cannot be ignored"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn empty_config_defaults() {
        let config = EngineConfig::from_toml_str("").unwrap();
        assert!(config.ignore.is_empty());
        assert!(config.accessors.is_empty());
    }

    #[test]
    fn parses_accessors_and_ignore_list() {
        let toml = r#"
            ignore = ["debug_flag", "legacy.value"]

            [accessors]
            region = "eu-west"
            limits = { daily = 5, burst = 2 }
            enabled = true
        "#;

        let config = EngineConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.ignore, vec!["debug_flag", "legacy.value"]);
        assert_eq!(config.accessors.len(), 3);
        assert_eq!(config.accessors["region"], json!("eu-west"));
        assert_eq!(config.accessors["limits"], json!({"daily": 5, "burst": 2}));
        assert_eq!(config.accessors["enabled"], json!(true));
    }

    #[test]
    fn rejects_reserved_names() {
        let err = EngineConfig::from_toml_str("[accessors]\nOR = 1\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);

        let err = EngineConfig::from_toml_str("ignore = [\"and\"]\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = EngineConfig::from_toml_str("unknown = 1\n").unwrap_err();
        assert!(matches!(err, RuleError::Config(_)));
    }

    #[test]
    fn missing_file() {
        let err = EngineConfig::from_file(Path::new("/nonexistent/tenet.toml")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }
}
