//! Shell-level errors: bad command arguments and the recoverable error
//! families that escape from the parser and the engine. `NothingToDo` is
//! deliberately not a variant here — it isn't a failure callers should
//! surface as an error, so it's represented by
//! [`crate::session::Outcome::NothingToDo`] instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error("bad arguments error: {0}")]
    BadArguments(String),
    #[error(transparent)]
    Parser(#[from] wm_kb::ParserSyntaxError),
    #[error(transparent)]
    Engine(#[from] wm_core::EngineError),
}
