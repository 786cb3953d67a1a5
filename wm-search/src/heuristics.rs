//! The three heuristics available to A* and best-first search. Each
//! compares a node's facts against the goal's; all three are zero when
//! `node == goal`.

use wm_core::EngineError;
use wm_model::FactContainer;

/// Selects which heuristic a search run scores successors with, and the
/// attribute names `MANHATTANDISTANCE`/`LINEARCONFLICT` need.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Heuristic {
    Hamming,
    Manhattan { value_attr: String, x_attr: String, y_attr: String },
    LinearConflict { value_attr: String, x_attr: String, y_attr: String },
}

impl Heuristic {
    pub fn evaluate(&self, node: &FactContainer, goal: &FactContainer) -> Result<f64, EngineError> {
        match self {
            Heuristic::Hamming => Ok(hamming(node, goal)),
            Heuristic::Manhattan { value_attr, x_attr, y_attr } => manhattan(node, goal, value_attr, x_attr, y_attr),
            Heuristic::LinearConflict { value_attr, x_attr, y_attr } => {
                linear_conflict(node, goal, value_attr, x_attr, y_attr)
            }
        }
    }
}

/// Number of facts in `node` whose value differs from the goal's fact of
/// the same name. A name the goal doesn't have at all simply counts as a
/// mismatch rather than aborting the whole search.
fn hamming(node: &FactContainer, goal: &FactContainer) -> f64 {
    let mut distance = 0.0;
    for fact in node.iter() {
        match goal.get(&fact.name) {
            Ok(goal_fact) if goal_fact == fact => {}
            _ => distance += 1.0,
        }
    }
    distance
}

fn numeric_attr(facts: &FactContainer, fact_name: &str, attr: &str) -> Result<f64, EngineError> {
    let fact = facts.get(fact_name).map_err(EngineError::from)?;
    fact.get(attr)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| EngineError::HeuristicAttr(format!("{fact_name}->{attr} is not numeric")))
}

/// Sum, over every pair of (node-fact, goal-fact) sharing the same
/// `value_attr`, of the Manhattan distance between their `(x_attr,
/// y_attr)` coordinates. Two facts that both lack `value_attr` count as
/// sharing it too — the comparison is a plain `==` over
/// `Option<&Value>`, so an absent attribute on both sides matches just
/// like any other equal value would.
fn manhattan(node: &FactContainer, goal: &FactContainer, value_attr: &str, x_attr: &str, y_attr: &str) -> Result<f64, EngineError> {
    let mut distance = 0.0;
    for fact in node.iter() {
        for goal_fact in goal.iter() {
            let node_value = fact.get(value_attr);
            let goal_value = goal_fact.get(value_attr);
            if node_value == goal_value {
                let dx = numeric_attr(node, &fact.name, x_attr)? - numeric_attr(goal, &goal_fact.name, x_attr)?;
                let dy = numeric_attr(node, &fact.name, y_attr)? - numeric_attr(goal, &goal_fact.name, y_attr)?;
                distance += dx.abs() + dy.abs();
            }
        }
    }
    Ok(distance)
}

/// Manhattan distance plus 2 per pair of facts sharing a row (same
/// `x_attr`, different `y_attr` from their goal) whose `y`-offset from the
/// goal occurs in that row exactly twice — exactly twice, not two or
/// more.
fn linear_conflict(node: &FactContainer, goal: &FactContainer, value_attr: &str, x_attr: &str, y_attr: &str) -> Result<f64, EngineError> {
    use std::collections::HashMap;

    let mut rows: HashMap<String, HashMap<i64, u32>> = HashMap::new();
    for fact in node.iter() {
        for goal_fact in goal.iter() {
            let node_value = fact.get(value_attr);
            let goal_value = goal_fact.get(value_attr);
            if node_value != goal_value {
                continue;
            }
            let node_x = numeric_attr(node, &fact.name, x_attr)?;
            let goal_x = numeric_attr(goal, &goal_fact.name, x_attr)?;
            let node_y = numeric_attr(node, &fact.name, y_attr)?;
            let goal_y = numeric_attr(goal, &goal_fact.name, y_attr)?;
            if node_x == goal_x && node_y != goal_y {
                let offset = (node_y - goal_y).abs().round() as i64;
                *rows.entry(format!("{node_x}")).or_default().entry(offset).or_insert(0) += 1;
            }
        }
    }

    let conflicts: u32 = rows.values().flat_map(|row| row.values()).filter(|&&count| count == 2).count() as u32;
    Ok(manhattan(node, goal, value_attr, x_attr, y_attr)? + (conflicts as f64) * 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wm_model::{Fact, Value};

    fn fact(name: &str, attrs: &[(&str, Value)]) -> Fact {
        let mut f = Fact::new(name);
        for (k, v) in attrs {
            f.set(*k, v.clone());
        }
        f
    }

    #[test]
    fn hamming_is_zero_at_the_goal() {
        let mut node = FactContainer::new();
        node.add(fact("A", &[("x", Value::Int(1))])).unwrap();
        let goal = node.clone();
        assert_eq!(hamming(&node, &goal), 0.0);
    }

    #[test]
    fn hamming_counts_each_mismatched_fact() {
        let mut node = FactContainer::new();
        node.add(fact("A", &[("x", Value::Int(1))])).unwrap();
        node.add(fact("B", &[("x", Value::Int(2))])).unwrap();
        let mut goal = FactContainer::new();
        goal.add(fact("A", &[("x", Value::Int(1))])).unwrap();
        goal.add(fact("B", &[("x", Value::Int(99))])).unwrap();
        assert_eq!(hamming(&node, &goal), 1.0);
    }

    #[test]
    fn manhattan_sums_displacement_of_matching_tiles() {
        // A 3x3 tile puzzle with a single tile displaced by (2, 1).
        let mut node = FactContainer::new();
        node.add(fact("tile", &[("val", Value::Int(8)), ("row", Value::Int(0)), ("col", Value::Int(0))])).unwrap();
        let mut goal = FactContainer::new();
        goal.add(fact("tile", &[("val", Value::Int(8)), ("row", Value::Int(2)), ("col", Value::Int(1))])).unwrap();
        let distance = manhattan(&node, &goal, "val", "row", "col").unwrap();
        assert_eq!(distance, 3.0);
    }

    #[test]
    fn manhattan_is_zero_at_the_goal() {
        let mut node = FactContainer::new();
        node.add(fact("tile", &[("val", Value::Int(1)), ("row", Value::Int(0)), ("col", Value::Int(0))])).unwrap();
        let goal = node.clone();
        assert_eq!(manhattan(&node, &goal, "val", "row", "col").unwrap(), 0.0);
    }

    #[test]
    fn manhattan_pairs_facts_that_both_lack_the_value_attribute() {
        // Neither fact carries "val" at all; they should still be paired
        // (absent == absent) rather than skipped as a non-match.
        let mut node = FactContainer::new();
        node.add(fact("tile", &[("row", Value::Int(0)), ("col", Value::Int(0))])).unwrap();
        let mut goal = FactContainer::new();
        goal.add(fact("tile", &[("row", Value::Int(2)), ("col", Value::Int(1))])).unwrap();
        let distance = manhattan(&node, &goal, "val", "row", "col").unwrap();
        assert_eq!(distance, 3.0);
    }

    #[test]
    fn linear_conflict_adds_two_per_conflicting_pair_sharing_a_row() {
        let mut node = FactContainer::new();
        node.add(fact("t1", &[("val", Value::Int(1)), ("row", Value::Int(0)), ("col", Value::Int(1))])).unwrap();
        node.add(fact("t2", &[("val", Value::Int(2)), ("row", Value::Int(0)), ("col", Value::Int(0))])).unwrap();
        let mut goal = FactContainer::new();
        goal.add(fact("t1", &[("val", Value::Int(1)), ("row", Value::Int(0)), ("col", Value::Int(0))])).unwrap();
        goal.add(fact("t2", &[("val", Value::Int(2)), ("row", Value::Int(0)), ("col", Value::Int(1))])).unwrap();

        let manhattan_only = manhattan(&node, &goal, "val", "row", "col").unwrap();
        let conflict_value = linear_conflict(&node, &goal, "val", "row", "col").unwrap();
        assert_eq!(conflict_value, manhattan_only + 2.0);
    }
}
