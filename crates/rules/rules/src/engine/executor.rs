use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::config::EngineConfig;
use crate::engine::accessor::{Accessor, StaticAccessor};
use crate::engine::collector::AccessorRequest;
use crate::engine::resolver::AccessorRegistry;
use crate::engine::result::EvalResult;
use crate::error::RuleError;
use crate::ir::parameter::{ParameterSet, is_reserved_name};

/// Name of the built-in accessor that always yields `true`.
pub const PASS_ACCESSOR: &str = "pass";

static EMPTY_PARAMS: LazyLock<Value> = LazyLock::new(|| Value::Object(serde_json::Map::new()));

/// Evaluates rulesets against values fetched from registered accessors.
///
/// Each evaluation parses the ruleset, works out which accessors it needs,
/// fetches each of them once (concurrently), and then evaluates the parsed
/// tree against the fetched values. Nothing is cached between evaluations.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    accessors: AccessorRegistry,
    ignored: HashSet<String>,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleEngine {
    /// Create an engine with only the built-in `pass` accessor.
    pub fn new() -> Self {
        let mut accessors = AccessorRegistry::new();
        accessors.insert_builtin(PASS_ACCESSOR, Arc::new(StaticAccessor::new(true)));
        Self {
            accessors,
            ignored: HashSet::new(),
        }
    }

    /// Build an engine from configuration: static accessors and ignored names.
    pub fn from_config(config: &EngineConfig) -> Result<Self, RuleError> {
        let mut engine = Self::new();
        for (name, value) in &config.accessors {
            engine.define_accessor(name.as_str(), Arc::new(StaticAccessor::new(value.clone())))?;
        }
        for name in &config.ignore {
            engine.ignore(name.as_str())?;
        }
        info!(
            accessors = engine.accessors.len(),
            ignored = engine.ignored.len(),
            "rule engine configured"
        );
        Ok(engine)
    }

    /// Register an accessor, replacing any previous one with the same name.
    pub fn define_accessor(
        &mut self,
        name: impl Into<String>,
        accessor: Arc<dyn Accessor>,
    ) -> Result<(), RuleError> {
        self.accessors.register(name, accessor)
    }

    /// Register one accessor under several names.
    pub fn define_accessors<I, S>(
        &mut self,
        names: I,
        accessor: Arc<dyn Accessor>,
    ) -> Result<(), RuleError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accessors.register_many(names, &accessor)
    }

    /// Exclude a ruleset key from parsing and evaluation.
    ///
    /// The name is matched against the full key as written, dotted paths
    /// included.
    pub fn ignore(&mut self, name: impl Into<String>) -> Result<(), RuleError> {
        let name = name.into();
        if is_reserved_name(&name) {
            return Err(RuleError::Parameter(format!(
                "ignore() illegal parameter name: '{name}'"
            )));
        }
        self.ignored.insert(name);
        Ok(())
    }

    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignored.contains(name)
    }

    pub fn accessors(&self) -> &AccessorRegistry {
        &self.accessors
    }

    /// Parse a ruleset, honouring the ignore list.
    pub fn parse(&self, ruleset: &Value) -> Result<ParameterSet, RuleError> {
        ParameterSet::parse(ruleset, &self.ignored)
    }

    /// The accessor requests an evaluation of `ruleset` would issue.
    ///
    /// No accessor is invoked.
    pub fn plan(&self, ruleset: &Value) -> Result<Vec<AccessorRequest>, RuleError> {
        Ok(self.parse(ruleset)?.collect().into_requests())
    }

    /// Evaluate a ruleset and report the first failing parameter.
    ///
    /// `params` is handed to every accessor; `None` passes an empty object.
    #[instrument(skip_all, fields(keys = ruleset.as_object().map_or(0, serde_json::Map::len)))]
    pub async fn evaluate_with_reason(
        &self,
        ruleset: &Value,
        params: Option<&Value>,
    ) -> Result<EvalResult, RuleError> {
        let parameters = self.parse(ruleset)?;
        debug!(nodes = parameters.node_count(), "ruleset parsed");

        let requests = parameters.collect().into_requests();
        debug!(accessors = requests.len(), "accessor requests collected");

        let values = self
            .accessors
            .resolve(&requests, params.unwrap_or(&*EMPTY_PARAMS))
            .await?;

        let result = parameters.evaluate(&values)?;
        debug!(
            value = result.value,
            parameter = result.parameter_name.as_deref().unwrap_or(""),
            "ruleset evaluated"
        );
        Ok(result)
    }

    /// Evaluate a ruleset to a plain boolean.
    pub async fn evaluate(&self, ruleset: &Value, params: Option<&Value>) -> Result<bool, RuleError> {
        Ok(self.evaluate_with_reason(ruleset, params).await?.value)
    }
}
