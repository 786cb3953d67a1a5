//! Working-memory entity model: facts, rules, containers, and the
//! predicate/action library.

pub mod containers;
pub mod fact;
pub mod ops;
pub mod rule;
pub mod value;

pub use containers::{ContainerError, FactContainer, GoalContainer, RuleContainer, UnboundRuleContainer};
pub use fact::Fact;
pub use ops::OperationError;
pub use rule::{
    first_unbound_variable, first_variable, substitute_rule, substitute_variable, Action, Antecedent, Condition,
    Conclusion, Consequent, Disjunction, Operand, Predicate, Rule,
};
pub use ops::{apply_action, eval_predicate};
pub use value::{cast_trial, Value};
