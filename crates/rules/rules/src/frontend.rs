use std::path::Path;

use serde_json::Value;

use crate::error::RuleError;

/// Trait for frontends that decode ruleset documents from text.
///
/// A frontend only turns text into a JSON value tree; the shape of the
/// ruleset is validated when the engine parses it.
pub trait RulesetFrontend: Send + Sync {
    /// Return the file extensions this frontend supports (e.g., `["yaml", "yml"]`).
    fn extensions(&self) -> &[&str];

    /// Decode a ruleset from string content.
    fn parse(&self, content: &str) -> Result<Value, RuleError>;

    /// Decode a ruleset from a file path.
    ///
    /// The default implementation reads the file and delegates to [`parse`](Self::parse).
    fn parse_file(&self, path: &Path) -> Result<Value, RuleError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RuleError::Parse(format!("cannot read {}: {e}", path.display())))?;
        self.parse(&content)
    }
}

/// Frontend for JSON ruleset documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFrontend;

impl RulesetFrontend for JsonFrontend {
    fn extensions(&self) -> &[&str] {
        &["json"]
    }

    fn parse(&self, content: &str) -> Result<Value, RuleError> {
        serde_json::from_str(content).map_err(|e| RuleError::Parse(format!("JSON parse error: {e}")))
    }
}

/// Load a ruleset file with the first frontend that handles its extension.
pub fn load_ruleset(
    path: &Path,
    frontends: &[&dyn RulesetFrontend],
) -> Result<Value, RuleError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");

    frontends
        .iter()
        .find(|frontend| frontend.extensions().contains(&extension))
        .ok_or_else(|| {
            RuleError::Parse(format!(
                "no ruleset frontend handles '{}'",
                path.display()
            ))
        })?
        .parse_file(path)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn json_frontend_extensions() {
        assert_eq!(JsonFrontend.extensions(), &["json"]);
    }

    #[test]
    fn json_frontend_keeps_key_order() {
        let value = JsonFrontend
            .parse(r#"{"v3": {"is": 3}, "v1": {"max": 2}, "OR": []}"#)
            .unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["v3", "v1", "OR"]);
        assert_eq!(value["v1"], json!({"max": 2}));
    }

    #[test]
    fn json_frontend_rejects_garbage() {
        let err = JsonFrontend.parse("{ not json").unwrap_err();
        assert!(matches!(err, RuleError::Parse(_)));
    }

    #[test]
    fn parse_nonexistent_file() {
        let result = JsonFrontend.parse_file(Path::new("/nonexistent/path.json"));
        assert!(result.is_err());
    }

    #[test]
    fn load_ruleset_needs_matching_frontend() {
        let err = load_ruleset(Path::new("rules.toml"), &[&JsonFrontend]).unwrap_err();
        assert!(matches!(err, RuleError::Parse(ref m) if m.contains("rules.toml")));
    }
}
