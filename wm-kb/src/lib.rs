//! Knowledge-base text parser: reads the line-oriented
//! `beginFact:`/`beginRule:`/`beginGoal:` format into the [`wm_model`]
//! entity types.

pub mod error;
pub mod parser;

pub use error::ParserSyntaxError;
pub use parser::{load_from_text, parse_facts, parse_goal, parse_rules, purify, KnowledgeBase, ParserState};
