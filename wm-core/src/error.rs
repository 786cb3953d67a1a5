//! Errors raised by the binder, evaluator, and by the search engine that
//! drives them.

use thiserror::Error;
use wm_model::{ContainerError, OperationError};

/// Raised by [`crate::evaluator::evaluate_values`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// An expression carries more than one arithmetic operator.
    #[error("value evaluating error: {0}")]
    ValueEvaluating(String),
    /// An arithmetic operand resolved to something other than a number.
    #[error("non-numeric operand: {0}")]
    NotNumericOperand(String),
    #[error(transparent)]
    Container(#[from] ContainerError),
}

/// The single error type that escapes a search call. The engine treats
/// all internal exceptions from a search primitive as fatal for the
/// current search and surfaces this one error type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error(transparent)]
    Eval(#[from] EvalError),
    #[error(transparent)]
    Operation(#[from] OperationError),
    #[error(transparent)]
    Container(#[from] ContainerError),
    /// A*/best-first's heuristic attribute names didn't resolve to numbers
    /// on some fact in the node or goal.
    #[error("heuristic attribute error: {0}")]
    HeuristicAttr(String),
}
