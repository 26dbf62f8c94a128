use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of evaluating a ruleset.
///
/// `parameter_name` names the first failing parameter (full dotted name) and
/// is only ever set when `value` is `false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalResult {
    /// Whether the ruleset holds.
    pub value: bool,
    /// The parameter responsible for a failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter_name: Option<String>,
}

impl EvalResult {
    /// A passing result.
    pub fn pass() -> Self {
        Self {
            value: true,
            parameter_name: None,
        }
    }

    /// A failing result attributed to `parameter_name`.
    pub fn fail(parameter_name: impl Into<String>) -> Self {
        Self {
            value: false,
            parameter_name: Some(parameter_name.into()),
        }
    }

    /// A failing result with no parameter to blame (an empty OR-group).
    pub fn fail_unattributed() -> Self {
        Self {
            value: false,
            parameter_name: None,
        }
    }
}

impl fmt::Display for EvalResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.value, &self.parameter_name) {
            (true, _) => f.write_str("true"),
            (false, Some(name)) => write!(f, "false (reason: {name})"),
            (false, None) => f.write_str("false"),
        }
    }
}

impl From<EvalResult> for bool {
    fn from(result: EvalResult) -> Self {
        result.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_reason_only_on_failure() {
        let ok = EvalResult::pass();
        let failed = EvalResult::fail("PARAM");
        assert_eq!(ok.to_string(), "true");
        assert_eq!(failed.to_string(), "false (reason: PARAM)");
        assert_eq!(EvalResult::fail_unattributed().to_string(), "false");
    }

    #[test]
    fn converts_into_bool() {
        assert!(bool::from(EvalResult::pass()));
        assert!(!bool::from(EvalResult::fail("v1")));
    }

    #[test]
    fn serializes_without_empty_reason() {
        assert_eq!(
            serde_json::to_value(EvalResult::pass()).unwrap(),
            serde_json::json!({"value": true})
        );
        assert_eq!(
            serde_json::to_value(EvalResult::fail("o.v1")).unwrap(),
            serde_json::json!({"value": false, "parameter_name": "o.v1"})
        );
    }
}
