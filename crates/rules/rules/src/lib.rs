pub mod config;
pub mod engine;
pub mod error;
pub mod frontend;
pub mod ir;

pub use config::EngineConfig;
pub use engine::{
    Accessor, AccessorRegistry, AccessorRequest, EvalResult, FnAccessor, PASS_ACCESSOR,
    RuleEngine, StaticAccessor, ValueMap, accessor_fn,
};
pub use error::{AccessorError, ErrorKind, RuleError};
pub use frontend::{JsonFrontend, RulesetFrontend, load_ruleset};
pub use ir::constraint::{Constraint, ConstraintSet, Operator};
pub use ir::parameter::{ParameterNode, ParameterSet, RESERVED_NAMES};
pub use ir::primitive::{Primitive, ValueSet};
