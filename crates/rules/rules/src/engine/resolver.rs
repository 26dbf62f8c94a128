use std::collections::HashMap;
use std::sync::Arc;

use futures::future::try_join_all;
use serde_json::Value;
use tracing::{debug, warn};

use crate::engine::accessor::Accessor;
use crate::engine::collector::AccessorRequest;
use crate::error::RuleError;
use crate::ir::parameter::is_reserved_name;

/// Resolved accessor values, one per distinct accessor name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueMap {
    values: HashMap<String, Value>,
}

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, accessor: impl Into<String>, value: Value) {
        self.values.insert(accessor.into(), value);
    }

    pub fn get(&self, accessor: &str) -> Option<&Value> {
        self.values.get(accessor)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, Value)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Named accessors available to the engine.
#[derive(Default, Clone)]
pub struct AccessorRegistry {
    accessors: HashMap<String, Arc<dyn Accessor>>,
}

impl std::fmt::Debug for AccessorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessorRegistry")
            .field("accessors", &self.names())
            .finish()
    }
}

impl AccessorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `accessor` under `name`, replacing any previous definition.
    ///
    /// Fails for empty names and reserved logical operator names.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        accessor: Arc<dyn Accessor>,
    ) -> Result<(), RuleError> {
        let name = name.into();
        validate_name(&name, "define_accessor")?;
        debug!(accessor = %name, "registered accessor");
        self.accessors.insert(name, accessor);
        Ok(())
    }

    /// Register a built-in accessor whose name is known to be valid.
    pub(crate) fn insert_builtin(&mut self, name: &'static str, accessor: Arc<dyn Accessor>) {
        self.accessors.insert(name.to_owned(), accessor);
    }

    /// Register the same accessor under several names.
    ///
    /// Names are validated up front, so nothing is registered on failure.
    pub fn register_many<I, S>(&mut self, names: I, accessor: &Arc<dyn Accessor>) -> Result<(), RuleError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        for name in &names {
            validate_name(name, "define_accessors")?;
        }
        for name in names {
            self.register(name, Arc::clone(accessor))?;
        }
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.accessors.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.accessors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.accessors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accessors.is_empty()
    }

    /// Fetch every requested accessor concurrently and collect the results.
    ///
    /// Each request invokes its accessor exactly once. All accessors are
    /// looked up before any is invoked; a missing one fails the whole call
    /// with [`RuleError::MissingAccessor`]. The first accessor error aborts
    /// the remaining fetches.
    pub async fn resolve(
        &self,
        requests: &[AccessorRequest],
        params: &Value,
    ) -> Result<ValueMap, RuleError> {
        let calls = requests
            .iter()
            .map(|request| {
                self.accessors
                    .get(&request.accessor_name)
                    .map(|accessor| (accessor, request))
                    .ok_or_else(|| missing_accessor(request))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let fetches = calls.into_iter().map(|(accessor, request)| async move {
            debug!(
                accessor = %request.accessor_name,
                children = request.children_constraint_values.len(),
                "invoking accessor"
            );
            match accessor.fetch(params, request).await {
                Ok(value) => Ok((request.accessor_name.clone(), value)),
                Err(source) => {
                    warn!(accessor = %request.accessor_name, error = %source, "accessor failed");
                    Err(RuleError::Accessor {
                        accessor: request.accessor_name.clone(),
                        source,
                    })
                }
            }
        });

        let values = try_join_all(fetches).await?;
        Ok(values.into_iter().collect())
    }
}

fn validate_name(name: &str, operation: &str) -> Result<(), RuleError> {
    if name.is_empty() {
        return Err(RuleError::Parameter(format!(
            "{operation}() expects a non-empty accessor name"
        )));
    }
    if is_reserved_name(name) {
        return Err(RuleError::Parameter(format!(
            "{operation}() accessor name '{name}' is reserved"
        )));
    }
    Ok(())
}

fn missing_accessor(request: &AccessorRequest) -> RuleError {
    RuleError::MissingAccessor {
        accessor: request.accessor_name.clone(),
        parameters: request.child_paths().map(str::to_owned).collect(),
    }
}
