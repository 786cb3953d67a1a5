//! The parser-syntax error family. Every variant carries the offending
//! (purified) line so a caller can point the user at exactly what failed
//! to parse.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParserSyntaxError {
    #[error("unnamed fact: {0}")]
    UnnamedFact(String),
    #[error("unnamed rule: {0}")]
    UnnamedRule(String),
    #[error("unexpected beginFact: {0}")]
    UnexpectedBeginFact(String),
    #[error("unexpected endFact: {0}")]
    UnexpectedEndFact(String),
    #[error("unexpected end of antecedent: {0}")]
    UnexpectedAntecedentEnd(String),
    #[error("unexpected end of consequent: {0}")]
    UnexpectedConsequentEnd(String),
    #[error("empty antecedent: {0}")]
    EmptyAntecedent(String),
    #[error("empty consequent: {0}")]
    EmptyConsequent(String),
    #[error("attribute parsing error: {0}")]
    AttributeParsing(String),
    #[error("bad arguments: {0}")]
    BadArguments(String),
    #[error("unexpected beginGoal: {0}")]
    UnexpectedBeginGoal(String),
    #[error("fact syntax error: {0}")]
    FactSyntax(String),
    #[error("rule syntax error: {0}")]
    RuleSyntax(String),
}
