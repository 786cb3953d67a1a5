//! Working memory, the rule binder/evaluator, and the shared agenda — the
//! engine's inference core.

pub mod agenda;
pub mod binder;
pub mod error;
pub mod evaluator;
pub mod working_memory;

pub use agenda::Agenda;
pub use binder::bind_rules;
pub use error::{EngineError, EvalError};
pub use evaluator::evaluate_values;
pub use working_memory::WorkingMemory;
