use wm_model::{FactContainer, Rule};

/// Result of one search run. `path` distinguishes "goal reached with
/// zero rule firings" (`Some(vec![])`) from "open emptied without finding
/// the goal" (`None`) — typing the field as `Option<Vec<Rule>>` means a
/// caller can always tell a zero-step success from a search failure,
/// never by truthiness alone.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub arrival_state: FactContainer,
    pub path: Option<Vec<Rule>>,
    pub visited: usize,
}

impl SearchOutcome {
    pub fn success(arrival_state: FactContainer, path: Vec<Rule>, visited: usize) -> Self {
        SearchOutcome { arrival_state, path: Some(path), visited }
    }

    pub fn failure(arrival_state: FactContainer, visited: usize) -> Self {
        SearchOutcome { arrival_state, path: None, visited }
    }

    pub fn is_success(&self) -> bool {
        self.path.is_some()
    }

    /// `len(path) / visited`, the run's penetrance. `None` when `visited`
    /// is zero — goal matched before a single node was
    /// expanded, leaving the ratio undefined rather than a division by
    /// zero.
    pub fn penetrance(&self) -> Option<f64> {
        let path = self.path.as_ref()?;
        if self.visited == 0 {
            return None;
        }
        Some(path.len() as f64 / self.visited as f64)
    }
}
