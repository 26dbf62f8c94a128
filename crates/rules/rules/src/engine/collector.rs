use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::ir::primitive::ValueSet;

/// What a single accessor will be asked for during one evaluation.
///
/// Passed verbatim to the accessor so it can see which values and which
/// sub-fields of its result the ruleset is going to test.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccessorRequest {
    /// The top-level accessor name.
    pub accessor_name: String,
    /// Limit values tested directly against the accessor's value.
    pub constraint_values: ValueSet,
    /// Limit values tested against each dotted child path (`"v1"`, `"o.v1"`).
    pub children_constraint_values: BTreeMap<String, ValueSet>,
}

impl AccessorRequest {
    /// Child paths accessed below this accessor, in sorted order.
    pub fn child_paths(&self) -> impl Iterator<Item = &str> {
        self.children_constraint_values.keys().map(String::as_str)
    }
}

/// One parameter occurrence found while walking a parameter tree.
#[derive(Debug, Clone)]
pub struct ParameterUsage<'a> {
    /// Full dotted parameter name as written in the ruleset.
    pub parameter_name: &'a str,
    /// The top-level accessor the parameter reads from.
    pub accessor_name: &'a str,
    /// Dotted child path below the accessor; empty for direct access.
    pub child_path: String,
    /// Limit values referenced by the parameter's constraints.
    pub constraint_values: ValueSet,
}

#[derive(Debug, Default)]
struct AccessorAccumulator {
    values: ValueSet,
    children: BTreeMap<String, ValueSet>,
}

/// Accumulates accessor needs across a whole parameter tree.
///
/// Every occurrence of an accessor, at any depth and any child path, merges
/// into one entry so each accessor is fetched once per evaluation.
#[derive(Debug, Default)]
pub struct DataCollector {
    accessors: BTreeMap<String, AccessorAccumulator>,
}

impl DataCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one parameter occurrence.
    pub fn add(&mut self, usage: ParameterUsage<'_>) {
        trace!(
            parameter = usage.parameter_name,
            accessor = usage.accessor_name,
            values = usage.constraint_values.len(),
            "collected parameter"
        );
        let entry = self
            .accessors
            .entry(usage.accessor_name.to_owned())
            .or_default();
        if usage.child_path.is_empty() {
            entry.values.union_with(&usage.constraint_values);
        } else {
            entry
                .children
                .entry(usage.child_path)
                .or_default()
                .union_with(&usage.constraint_values);
        }
    }

    /// Number of distinct accessors recorded so far.
    pub fn len(&self) -> usize {
        self.accessors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accessors.is_empty()
    }

    /// One request per distinct accessor, sorted by accessor name.
    pub fn into_requests(self) -> Vec<AccessorRequest> {
        self.accessors
            .into_iter()
            .map(|(accessor_name, acc)| AccessorRequest {
                accessor_name,
                constraint_values: acc.values,
                children_constraint_values: acc.children,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ir::primitive::Primitive;

    fn values(items: &[i64]) -> ValueSet {
        items.iter().map(|n| Primitive::from(*n)).collect()
    }

    fn usage<'a>(name: &'a str, accessor: &'a str, child: &str, vals: &[i64]) -> ParameterUsage<'a> {
        ParameterUsage {
            parameter_name: name,
            accessor_name: accessor,
            child_path: child.to_owned(),
            constraint_values: values(vals),
        }
    }

    #[test]
    fn merges_occurrences_per_accessor() {
        let mut collector = DataCollector::new();
        collector.add(usage("o.v1", "o", "v1", &[1]));
        collector.add(usage("o.v3", "o", "v3", &[1]));
        collector.add(usage("o.o.v1", "o", "o.v1", &[1]));
        collector.add(usage("o.v1", "o", "v1", &[2, 1]));
        collector.add(usage("v1", "v1", "", &[2, 3]));
        assert_eq!(collector.len(), 2);

        let requests = collector.into_requests();
        let o = requests.iter().find(|r| r.accessor_name == "o").unwrap();
        assert!(o.constraint_values.is_empty());
        assert_eq!(o.child_paths().collect::<Vec<_>>(), vec!["o.v1", "v1", "v3"]);
        assert_eq!(
            serde_json::to_value(&o.children_constraint_values["v1"]).unwrap(),
            json!([1, 2])
        );

        let v1 = requests.iter().find(|r| r.accessor_name == "v1").unwrap();
        assert_eq!(serde_json::to_value(&v1.constraint_values).unwrap(), json!([2, 3]));
        assert_eq!(v1.child_paths().count(), 0);
    }

    #[test]
    fn direct_access_with_no_constraints_is_still_requested() {
        let mut collector = DataCollector::new();
        collector.add(usage("pass", "pass", "", &[]));
        let requests = collector.into_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].accessor_name, "pass");
    }

    #[test]
    fn request_serializes_to_json() {
        let mut collector = DataCollector::new();
        collector.add(usage("o.v1", "o", "v1", &[1]));
        let request = collector.into_requests().remove(0);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "accessor_name": "o",
                "constraint_values": [],
                "children_constraint_values": {"v1": [1]}
            })
        );
    }
}
