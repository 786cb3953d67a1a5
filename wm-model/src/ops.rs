//! The predicate/action library. Predicates and actions are referenced by
//! tag at parse time rather than by name lookup at runtime — dispatch goes
//! through the closed [`Predicate`]/[`Action`] enumerations in
//! [`crate::rule`] rather than a runtime name-to-function mapping.

use crate::containers::{ContainerError, FactContainer};
use crate::fact::Fact;
use crate::rule::{Action, Predicate};
use crate::value::Value;
use std::cmp::Ordering;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OperationError {
    #[error("attribute error: {0}")]
    Attr(String),
    #[error(transparent)]
    Container(#[from] ContainerError),
}

fn value_cmp(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Nil, _) | (_, Value::Nil) => None,
        (a, b) if a.is_numeric() && b.is_numeric() => {
            a.as_f64().unwrap().partial_cmp(&b.as_f64().unwrap())
        }
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Evaluates a single condition's predicate against `facts`. A fact named
/// `fact_name` that doesn't exist in `facts` propagates as a
/// [`ContainerError`], the same way `wm_core::evaluator::resolve_operand`
/// handles a missing fact on the value side of an expression — it is not
/// swallowed. An absent *attribute* on a fact that does exist makes every
/// predicate false instead — never an error, and never true for
/// `not_equal` either, even though a literal "not equal to the given
/// value" reading of a missing attribute would say otherwise.
pub fn eval_predicate(predicate: Predicate, facts: &FactContainer, fact_name: &str, attr: &str, value: &Value) -> Result<bool, ContainerError> {
    let fact = facts.get(fact_name)?;
    let Some(observed) = fact.get(attr) else {
        return Ok(false);
    };
    Ok(match predicate {
        Predicate::Eq => observed == value,
        Predicate::Neq => observed != value,
        Predicate::Gt => value_cmp(observed, value) == Some(Ordering::Greater),
        Predicate::Lt => value_cmp(observed, value) == Some(Ordering::Less),
        Predicate::Gte => matches!(value_cmp(observed, value), Some(Ordering::Greater | Ordering::Equal)),
        Predicate::Lte => matches!(value_cmp(observed, value), Some(Ordering::Less | Ordering::Equal)),
    })
}

/// Applies one already-evaluated action to `facts` in place. `attr`/`value`
/// must be `Some` exactly when `action`'s arity requires them:
/// `Assert`/`Retract` take neither, `Add`/`Update` take both, `Remove` takes
/// only `attr`.
pub fn apply_action(
    action: Action,
    facts: &mut FactContainer,
    fact_name: &str,
    attr: Option<&str>,
    value: Option<&Value>,
) -> Result<(), OperationError> {
    match action {
        Action::Assert => {
            facts.add(Fact::new(fact_name))?;
            Ok(())
        }
        Action::Retract => {
            facts.remove(fact_name)?;
            Ok(())
        }
        Action::Add => {
            let attr = attr.expect("Add conclusion without an attribute");
            let value = value.expect("Add conclusion without a value");
            let fact = facts.get_mut(fact_name)?;
            if fact.contains(attr) {
                return Err(OperationError::Attr(attr.to_string()));
            }
            fact.set(attr, value.clone());
            Ok(())
        }
        Action::Update => {
            let attr = attr.expect("Update conclusion without an attribute");
            let value = value.expect("Update conclusion without a value");
            let fact = facts.get_mut(fact_name)?;
            if !fact.contains(attr) {
                return Err(OperationError::Attr(attr.to_string()));
            }
            fact.set(attr, value.clone());
            Ok(())
        }
        Action::Remove => {
            let attr = attr.expect("Remove conclusion without an attribute");
            let fact = facts.get_mut(fact_name)?;
            if fact.remove(attr).is_none() {
                return Err(OperationError::Attr(attr.to_string()));
            }
            Ok(())
        }
    }
}
