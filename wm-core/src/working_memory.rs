//! `WorkingMemory`: the immutable-after-construction tuple carried
//! read-only through search.

use wm_model::{FactContainer, GoalContainer, RuleContainer};

#[derive(Clone, Debug)]
pub struct WorkingMemory {
    pub initial_state: FactContainer,
    pub rules: RuleContainer,
    pub goal: GoalContainer,
}

impl WorkingMemory {
    pub fn new(initial_state: FactContainer, rules: RuleContainer, goal: GoalContainer) -> Self {
        WorkingMemory { initial_state, rules, goal }
    }
}

impl std::fmt::Display for WorkingMemory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\n{}\n{}", self.initial_state, self.rules, self.goal)
    }
}
