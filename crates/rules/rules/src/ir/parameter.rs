use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::collector::{DataCollector, ParameterUsage};
use crate::engine::lookup::walk_path;
use crate::engine::resolver::ValueMap;
use crate::engine::result::EvalResult;
use crate::error::RuleError;
use crate::ir::constraint::ConstraintSet;
use crate::ir::primitive::json_type_name;

/// Logical operator names that can never be used as accessor names.
pub const RESERVED_NAMES: [&str; 4] = ["OR", "AND", "or", "and"];

/// Returns `true` if `name` is a reserved logical operator name.
pub fn is_reserved_name(name: &str) -> bool {
    RESERVED_NAMES.contains(&name)
}

/// A parameter bound to an accessor value, optionally through a dotted path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SingleParameter {
    /// The full key as written, e.g. `"o.o.v1"`.
    pub name: String,
    /// The first path segment, e.g. `"o"`.
    pub accessor: String,
    /// Remaining segments, e.g. `["o", "v1"]`.
    pub path: Vec<String>,
    /// Constraints the resolved value must satisfy.
    pub constraints: ConstraintSet,
}

impl SingleParameter {
    fn evaluate(&self, values: &ValueMap) -> Result<EvalResult, RuleError> {
        let root = values.get(&self.accessor).ok_or_else(|| {
            RuleError::Syntax(format!(
                "no value was resolved for accessor '{}'",
                self.accessor
            ))
        })?;

        let value = walk_path(root, &self.path).map_err(|idx| {
            let missing = std::iter::once(self.accessor.as_str())
                .chain(self.path[..=idx].iter().map(String::as_str))
                .collect::<Vec<_>>()
                .join(".");
            RuleError::Syntax(format!(
                "parameter '{missing}' doesn't exist in '{}'",
                self.accessor
            ))
        })?;

        if self.constraints.evaluate(value)? {
            Ok(EvalResult::pass())
        } else {
            Ok(EvalResult::fail(&self.name))
        }
    }
}

/// One entry of a ruleset object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ParameterNode {
    /// A constrained parameter.
    Single(SingleParameter),
    /// Holds if any nested parameter set holds.
    Or(Vec<ParameterSet>),
}

type ParseFn = fn(&str, &Value, &HashSet<String>) -> Result<ParameterNode, RuleError>;

/// Keys with dedicated parsers. Every other key names a parameter.
const DISPATCH: &[(&str, ParseFn)] = &[("OR", parse_or)];

impl ParameterNode {
    /// Build a node from one key/value pair of a ruleset object.
    pub fn parse(key: &str, value: &Value, ignore: &HashSet<String>) -> Result<Self, RuleError> {
        let parse_fn = DISPATCH
            .iter()
            .find(|(name, _)| *name == key)
            .map_or(parse_single as ParseFn, |(_, f)| *f);
        parse_fn(key, value, ignore)
    }

    /// Evaluate the node.
    ///
    /// An OR node returns the first passing branch. When every branch fails,
    /// the last branch's failure is reported.
    pub fn evaluate(&self, values: &ValueMap) -> Result<EvalResult, RuleError> {
        match self {
            Self::Single(param) => param.evaluate(values),
            Self::Or(branches) => {
                let mut last_failure = EvalResult::fail_unattributed();
                for branch in branches {
                    let result = branch.evaluate(values)?;
                    if result.value {
                        return Ok(result);
                    }
                    last_failure = result;
                }
                Ok(last_failure)
            }
        }
    }

    /// Record accessor needs. OR nodes visit every branch.
    pub fn collect_parameter_data(&self, collector: &mut DataCollector) {
        match self {
            Self::Single(param) => collector.add(ParameterUsage {
                parameter_name: &param.name,
                accessor_name: &param.accessor,
                child_path: param.path.join("."),
                constraint_values: param.constraints.constraint_values(),
            }),
            Self::Or(branches) => {
                for branch in branches {
                    branch.collect_parameter_data(collector);
                }
            }
        }
    }

    fn node_count(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Or(branches) => 1 + branches.iter().map(ParameterSet::node_count).sum::<usize>(),
        }
    }
}

fn parse_single(
    key: &str,
    value: &Value,
    _ignore: &HashSet<String>,
) -> Result<ParameterNode, RuleError> {
    let mut segments = key.split('.').map(str::to_owned);
    let accessor = segments.next().unwrap_or_default();
    let path: Vec<String> = segments.collect();

    if accessor.is_empty() || path.iter().any(String::is_empty) {
        return Err(RuleError::Syntax(format!(
            "parameter name '{key}' has an empty path segment"
        )));
    }
    if is_reserved_name(&accessor) {
        return Err(RuleError::Syntax(format!(
            "parameter name '{key}' uses the reserved name '{accessor}'"
        )));
    }
    if !value.is_object() {
        return Err(RuleError::Syntax(format!(
            "parameter '{key}' expects an object with constraint definitions, but got '{}'",
            json_type_name(value)
        )));
    }

    Ok(ParameterNode::Single(SingleParameter {
        name: key.to_owned(),
        accessor,
        path,
        constraints: ConstraintSet::parse(value)?,
    }))
}

fn parse_or(key: &str, value: &Value, ignore: &HashSet<String>) -> Result<ParameterNode, RuleError> {
    let Value::Array(items) = value else {
        return Err(RuleError::Syntax(format!(
            "operator '{key}' expects an array, but got '{}': {value}",
            json_type_name(value)
        )));
    };
    let branches = items
        .iter()
        .map(|item| ParameterSet::parse(item, ignore))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ParameterNode::Or(branches))
}

/// An AND-combination of parameter checks: one level of a ruleset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParameterSet {
    nodes: Vec<ParameterNode>,
}

impl ParameterSet {
    /// Parse a ruleset object. Keys in `ignore` are skipped at every level.
    pub fn parse(json: &Value, ignore: &HashSet<String>) -> Result<Self, RuleError> {
        let Value::Object(entries) = json else {
            return Err(RuleError::Syntax(format!(
                "an object with parameter definitions is expected, instead got '{}': {json}",
                json_type_name(json)
            )));
        };
        let nodes = entries
            .iter()
            .filter(|(key, _)| !ignore.contains(key.as_str()))
            .map(|(key, value)| ParameterNode::parse(key, value, ignore))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { nodes })
    }

    /// Evaluate nodes in order, stopping at the first failure.
    pub fn evaluate(&self, values: &ValueMap) -> Result<EvalResult, RuleError> {
        for node in &self.nodes {
            let result = node.evaluate(values)?;
            if !result.value {
                return Ok(result);
            }
        }
        Ok(EvalResult::pass())
    }

    /// Record the accessor needs of every node into `collector`.
    pub fn collect_parameter_data(&self, collector: &mut DataCollector) {
        for node in &self.nodes {
            node.collect_parameter_data(collector);
        }
    }

    /// Walk the whole tree into a fresh collector.
    pub fn collect(&self) -> DataCollector {
        let mut collector = DataCollector::new();
        self.collect_parameter_data(&mut collector);
        collector
    }

    pub fn nodes(&self) -> &[ParameterNode] {
        &self.nodes
    }

    /// Total number of nodes, including nested OR-groups and their contents.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().map(ParameterNode::node_count).sum()
    }
}
