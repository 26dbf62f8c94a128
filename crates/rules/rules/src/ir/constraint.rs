use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RuleError;
use crate::ir::primitive::{Primitive, ValueSet, json_type_name};

/// Primitive comparison operators available in constraint objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    /// `value <= limit`.
    Max,
    /// `value >= limit`.
    Min,
    /// Strict equality.
    Is,
    /// Strict inequality.
    Not,
    /// `value < limit`.
    Under,
    /// `value > limit`.
    Over,
}

impl Operator {
    /// Look up an operator by its ruleset key.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "max" => Some(Self::Max),
            "min" => Some(Self::Min),
            "is" => Some(Self::Is),
            "not" => Some(Self::Not),
            "under" => Some(Self::Under),
            "over" => Some(Self::Over),
            _ => None,
        }
    }

    /// The ruleset key of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Max => "max",
            Self::Min => "min",
            Self::Is => "is",
            Self::Not => "not",
            Self::Under => "under",
            Self::Over => "over",
        }
    }

    /// Apply the operator to a candidate value and a limit.
    pub fn apply(self, value: &Primitive, limit: &Primitive) -> bool {
        match self {
            Self::Is => value.strict_eq(limit),
            Self::Not => !value.strict_eq(limit),
            Self::Max => matches!(
                value.partial_order(limit),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Self::Min => matches!(
                value.partial_order(limit),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Self::Under => value.partial_order(limit) == Some(Ordering::Less),
            Self::Over => value.partial_order(limit) == Some(Ordering::Greater),
        }
    }
}

/// A single entry of a constraint object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Constraint {
    /// An operator applied against a literal limit value.
    Primitive {
        /// The comparison operator.
        operator: Operator,
        /// The literal the candidate value is compared with.
        limit: Primitive,
    },
    /// Holds if any of the nested constraint sets holds.
    Or(Vec<ConstraintSet>),
}

type ParseFn = fn(&str, &Value) -> Result<Constraint, RuleError>;

/// Keys with dedicated parsers. Every other key is a primitive operator.
const DISPATCH: &[(&str, ParseFn)] = &[("OR", parse_or)];

impl Constraint {
    /// Build a constraint from one key/value pair of a constraint object.
    pub fn parse(key: &str, value: &Value) -> Result<Self, RuleError> {
        let parse_fn = DISPATCH
            .iter()
            .find(|(name, _)| *name == key)
            .map_or(parse_primitive as ParseFn, |(_, f)| *f);
        parse_fn(key, value)
    }

    /// Evaluate the constraint against a resolved value.
    pub fn evaluate(&self, value: &Value) -> Result<bool, RuleError> {
        match self {
            Self::Primitive { operator, limit } => {
                let candidate = Primitive::from_json(value).ok_or_else(|| {
                    RuleError::Type(format!(
                        "operator '{}' expects a primitive input value, but got '{}': {value}",
                        operator.as_str(),
                        json_type_name(value)
                    ))
                })?;
                Ok(operator.apply(&candidate, limit))
            }
            Self::Or(branches) => {
                for branch in branches {
                    if branch.evaluate(value)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }

    /// Every literal limit value referenced by this constraint.
    pub fn constraint_values(&self) -> ValueSet {
        match self {
            Self::Primitive { limit, .. } => std::iter::once(limit.clone()).collect(),
            Self::Or(branches) => {
                let mut set = ValueSet::new();
                for branch in branches {
                    set.union_with(&branch.constraint_values());
                }
                set
            }
        }
    }
}

fn parse_primitive(key: &str, value: &Value) -> Result<Constraint, RuleError> {
    let operator = Operator::from_name(key)
        .ok_or_else(|| RuleError::Syntax(format!("invalid constraint operator: '{key}'")))?;
    let limit = Primitive::from_json(value).ok_or_else(|| {
        RuleError::Syntax(format!(
            "operator '{key}' expects a primitive, but got '{}': {value}",
            json_type_name(value)
        ))
    })?;
    Ok(Constraint::Primitive { operator, limit })
}

fn parse_or(key: &str, value: &Value) -> Result<Constraint, RuleError> {
    let Value::Array(items) = value else {
        return Err(RuleError::Syntax(format!(
            "operator '{key}' expects an array, but got '{}': {value}",
            json_type_name(value)
        )));
    };
    let branches = items
        .iter()
        .map(ConstraintSet::parse)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Constraint::Or(branches))
}

/// An AND-combination of constraints, built from one constraint object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConstraintSet {
    constraints: Vec<Constraint>,
}

impl ConstraintSet {
    /// Parse a constraint object such as `{"max": 5, "not": 3}`.
    pub fn parse(json: &Value) -> Result<Self, RuleError> {
        let Value::Object(entries) = json else {
            return Err(RuleError::Syntax(format!(
                "constraints object expected, instead got '{}': {json}",
                json_type_name(json)
            )));
        };
        let constraints = entries
            .iter()
            .map(|(key, value)| Constraint::parse(key, value))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { constraints })
    }

    /// Returns `true` if every constraint holds. An empty set always holds.
    ///
    /// Stops at the first constraint that does not hold, so a type error in a
    /// later constraint is not reported.
    pub fn evaluate(&self, value: &Value) -> Result<bool, RuleError> {
        for constraint in &self.constraints {
            if !constraint.evaluate(value)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Union of every literal limit value in this set and its nested groups.
    pub fn constraint_values(&self) -> ValueSet {
        let mut set = ValueSet::new();
        for constraint in &self.constraints {
            set.union_with(&constraint.constraint_values());
        }
        set
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::ErrorKind;

    fn set(json: Value) -> ConstraintSet {
        ConstraintSet::parse(&json).unwrap()
    }

    #[test]
    fn operator_table() {
        let one = Primitive::from(1);
        let two = Primitive::from(2);
        assert!(Operator::Max.apply(&one, &two));
        assert!(Operator::Max.apply(&two, &two));
        assert!(!Operator::Min.apply(&one, &two));
        assert!(Operator::Under.apply(&one, &two));
        assert!(!Operator::Under.apply(&two, &two));
        assert!(Operator::Over.apply(&two, &one));
        assert!(Operator::Is.apply(&one, &one));
        assert!(Operator::Not.apply(&one, &two));
    }

    #[test]
    fn operator_names_round_trip() {
        for name in ["max", "min", "is", "not", "under", "over"] {
            assert_eq!(Operator::from_name(name).unwrap().as_str(), name);
        }
        assert!(Operator::from_name("foobars").is_none());
        assert!(Operator::from_name("OR").is_none());
    }

    #[test]
    fn and_semantics() {
        let c = set(json!({"max": 2, "min": 1, "under": 2, "over": -3, "is": 1, "not": 100}));
        assert_eq!(c.len(), 6);
        assert!(c.evaluate(&json!(1)).unwrap());
        assert!(!c.evaluate(&json!(2)).unwrap());
    }

    #[test]
    fn empty_set_holds() {
        let c = set(json!({}));
        assert!(c.is_empty());
        assert!(c.evaluate(&json!(42)).unwrap());
        // No primitive operator is applied, so containers are accepted.
        assert!(c.evaluate(&json!({"a": 1})).unwrap());
    }

    #[test]
    fn string_and_null_constraints() {
        let c = set(json!({"is": "string", "not": "sterling", "max": "tring", "min": "ring"}));
        assert!(c.evaluate(&json!("string")).unwrap());

        let n = set(json!({"is": null, "not": false}));
        assert!(n.evaluate(&json!(null)).unwrap());
        assert!(!n.evaluate(&json!(0)).unwrap());
    }

    #[test]
    fn or_group_needs_one_branch() {
        let c = set(json!({"OR": [{"is": 10}, {"over": 1.9999}]}));
        assert!(c.evaluate(&json!(2)).unwrap());
        assert!(c.evaluate(&json!(10)).unwrap());
        assert!(!c.evaluate(&json!(1)).unwrap());
    }

    #[test]
    fn empty_or_group_fails() {
        let c = set(json!({"OR": []}));
        assert!(!c.evaluate(&json!(1)).unwrap());
    }

    #[test]
    fn nested_or_groups() {
        let c = set(json!({
            "OR": [
                {"is": false},
                {"OR": [{"is": false}, {"OR": [{"is": false}, {"is": true}]}]},
            ]
        }));
        assert!(c.evaluate(&json!(true)).unwrap());
        assert!(c.evaluate(&json!(false)).unwrap());
        assert!(!c.evaluate(&json!(1)).unwrap());
    }

    #[test]
    fn constraint_values_are_collected_recursively() {
        let c = set(json!({"max": 5, "not": 3, "OR": [{"is": 7}, {"is": 5, "under": null}]}));
        let values: Vec<Value> = c.constraint_values().iter().map(Primitive::to_json).collect();
        assert_eq!(values, vec![json!(5), json!(3), json!(7), json!(null)]);
    }

    #[test]
    fn rejects_non_object() {
        for specimen in [json!([1]), json!("x"), json!(33), json!(null)] {
            let err = ConstraintSet::parse(&specimen).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Syntax, "{specimen}");
        }
    }

    #[test]
    fn rejects_unknown_operator() {
        let err = ConstraintSet::parse(&json!({"foobars": 32000})).unwrap_err();
        assert!(matches!(err, RuleError::Syntax(ref m) if m.contains("foobars")));
    }

    #[test]
    fn rejects_non_primitive_limit() {
        for specimen in [json!([1]), json!({}), json!({"a": 1})] {
            let err = ConstraintSet::parse(&json!({"max": specimen})).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Syntax);
        }
    }

    #[test]
    fn rejects_or_without_array() {
        for specimen in [json!(1), json!(null), json!("x"), json!({})] {
            let err = ConstraintSet::parse(&json!({"OR": specimen})).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Syntax);
        }
        let err = ConstraintSet::parse(&json!({"OR": [5]})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }

    #[test]
    fn non_primitive_candidate_is_a_type_error() {
        let c = set(json!({"max": 5}));
        for specimen in [json!([1]), json!({}), json!({"g": 1})] {
            let err = c.evaluate(&specimen).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Type);
        }
    }

    #[test]
    fn mixed_kinds_never_order() {
        let c = set(json!({"max": 5}));
        assert!(!c.evaluate(&json!("4")).unwrap());
        assert!(!c.evaluate(&json!(null)).unwrap());
        assert!(set(json!({"not": true})).evaluate(&json!(3)).unwrap());
    }
}
