//! Graph search over working-memory states: breadth-first, depth-first,
//! A*, and best-first, plus the heuristics A*/best-first score
//! successors with.

pub mod driver;
pub mod heuristics;
pub mod outcome;

pub use driver::{a_star_search, best_first_search, breadth_first_search, depth_first_search};
pub use heuristics::Heuristic;
pub use outcome::SearchOutcome;
