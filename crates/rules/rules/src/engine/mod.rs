pub mod accessor;
pub mod collector;
pub mod executor;
pub mod lookup;
pub mod resolver;
pub mod result;

pub use accessor::{Accessor, FnAccessor, StaticAccessor, accessor_fn};
pub use collector::{AccessorRequest, DataCollector};
pub use executor::{PASS_ACCESSOR, RuleEngine};
pub use resolver::{AccessorRegistry, ValueMap};
pub use result::EvalResult;
