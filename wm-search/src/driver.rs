//! The four search drivers: breadth-first, depth-first, A*, and
//! best-first. All four share the same per-node expansion
//! procedure — bind the rules the current state's fact names admit,
//! evaluate and queue every fireable one on a fresh agenda, fire them in
//! agenda order to produce successor states — and differ only in how
//! `open` orders the frontier.

use crate::heuristics::Heuristic;
use crate::outcome::SearchOutcome;
use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap, HashSet, VecDeque};
use wm_core::{bind_rules, evaluate_values, Agenda, EngineError, WorkingMemory};
use wm_model::{FactContainer, Rule, RuleContainer};

/// Caches the binder's output against the fact-name set it was computed
/// from, so two nodes carrying the same fact names (a common case in
/// explored puzzle states) don't re-run `bind_rules` from scratch.
struct ExpansionCache {
    fact_names: BTreeSet<String>,
    bound: RuleContainer,
}

impl ExpansionCache {
    fn for_state(wm: &WorkingMemory, state: &FactContainer) -> Self {
        ExpansionCache { fact_names: state.fact_names(), bound: bind_rules(&wm.rules, state) }
    }

    fn refresh(&mut self, wm: &WorkingMemory, state: &FactContainer) {
        let names = state.fact_names();
        if names != self.fact_names {
            self.bound = bind_rules(&wm.rules, state);
            self.fact_names = names;
        }
    }
}

/// Evaluates every bound rule against `state`, queues the ones whose
/// antecedent holds on a fresh agenda, and fires them in agenda order.
fn fireable_successors(bound: &RuleContainer, state: &FactContainer) -> Result<Vec<(FactContainer, Rule)>, EngineError> {
    let mut agenda = Agenda::new();
    for rule in bound.iter() {
        let evaluated = evaluate_values(rule, state)?;
        if evaluated.antecedent.evaluate(state)? {
            agenda.push(evaluated);
        }
    }
    let mut successors = Vec::new();
    while let Some(rule) = agenda.pop() {
        let next_state = rule.consequent.apply(state)?;
        successors.push((next_state, rule));
    }
    Ok(successors)
}

/// Breadth-first search. `max_depth` bounds `path.len()`, the number of
/// rule firings since the initial state.
pub fn breadth_first_search(wm: &WorkingMemory, max_depth: usize) -> Result<SearchOutcome, EngineError> {
    let mut open: VecDeque<(FactContainer, Vec<Rule>)> = VecDeque::new();
    open.push_back((wm.initial_state.clone(), Vec::new()));
    let mut closed: HashSet<FactContainer> = HashSet::new();
    closed.insert(wm.initial_state.clone());
    let mut cache = ExpansionCache::for_state(wm, &wm.initial_state);
    let mut visited = 0usize;
    let mut last_state = wm.initial_state.clone();

    while let Some((state, path)) = open.pop_front() {
        last_state = state.clone();
        if state == *wm.goal {
            return Ok(SearchOutcome::success(state, path, visited));
        }
        visited += 1;
        if visited % 1000 == 0 {
            tracing::debug!(visited, open = open.len(), "breadth-first search in progress");
        }
        if path.len() >= max_depth {
            continue;
        }
        cache.refresh(wm, &state);
        for (next_state, rule) in fireable_successors(&cache.bound, &state)? {
            if closed.insert(next_state.clone()) {
                let mut next_path = path.clone();
                next_path.push(rule);
                open.push_back((next_state, next_path));
            }
        }
    }
    Ok(SearchOutcome::failure(last_state, visited))
}

/// Depth-first search. Identical to [`breadth_first_search`]
/// except `open` is a stack: the most recently generated successor is
/// expanded next.
pub fn depth_first_search(wm: &WorkingMemory, max_depth: usize) -> Result<SearchOutcome, EngineError> {
    let mut open: Vec<(FactContainer, Vec<Rule>)> = vec![(wm.initial_state.clone(), Vec::new())];
    let mut closed: HashSet<FactContainer> = HashSet::new();
    closed.insert(wm.initial_state.clone());
    let mut cache = ExpansionCache::for_state(wm, &wm.initial_state);
    let mut visited = 0usize;
    let mut last_state = wm.initial_state.clone();

    while let Some((state, path)) = open.pop() {
        last_state = state.clone();
        if state == *wm.goal {
            return Ok(SearchOutcome::success(state, path, visited));
        }
        visited += 1;
        if visited % 1000 == 0 {
            tracing::debug!(visited, open = open.len(), "depth-first search in progress");
        }
        if path.len() >= max_depth {
            continue;
        }
        cache.refresh(wm, &state);
        for (next_state, rule) in fireable_successors(&cache.bound, &state)? {
            if closed.insert(next_state.clone()) {
                let mut next_path = path.clone();
                next_path.push(rule);
                open.push((next_state, next_path));
            }
        }
    }
    Ok(SearchOutcome::failure(last_state, visited))
}

/// A priority-queue entry ordered so [`BinaryHeap::pop`] returns the
/// lowest `priority` first, breaking ties by insertion order (`seq`) —
/// earliest-pushed wins, so runs stay reproducible rather than depending
/// on an arbitrary tie-break.
struct HeapEntry {
    priority: f64,
    seq: u64,
    state: FactContainer,
    path: Vec<Rule>,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}
impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other.priority.total_cmp(&self.priority).then(other.seq.cmp(&self.seq))
    }
}

/// A* search. Priority is `len(path) + h(parent, goal)`: `path` is the
/// *parent's* path, one shorter than the successor's own path, and `h` is
/// scored against the parent state rather than the successor being
/// queued — the g-cost runs one node behind and the heuristic looks one
/// state too early. Both quirks are preserved rather than corrected;
/// search quality is out of scope here, only determinism is required.
pub fn a_star_search(wm: &WorkingMemory, heuristic: &Heuristic, max_depth: usize) -> Result<SearchOutcome, EngineError> {
    let mut seq = 0u64;
    let mut open: BinaryHeap<HeapEntry> = BinaryHeap::new();
    open.push(HeapEntry { priority: 0.0, seq, state: wm.initial_state.clone(), path: Vec::new() });
    seq += 1;
    let mut closed: HashSet<FactContainer> = HashSet::new();
    closed.insert(wm.initial_state.clone());
    let mut cache = ExpansionCache::for_state(wm, &wm.initial_state);
    let mut visited = 0usize;
    let mut last_state = wm.initial_state.clone();

    while let Some(entry) = open.pop() {
        let HeapEntry { state, path, .. } = entry;
        last_state = state.clone();
        if state == *wm.goal {
            return Ok(SearchOutcome::success(state, path, visited));
        }
        visited += 1;
        if visited % 1000 == 0 {
            tracing::debug!(visited, open = open.len(), "A* search in progress");
        }
        if path.len() >= max_depth {
            continue;
        }
        cache.refresh(wm, &state);
        let h = heuristic.evaluate(&state, &wm.goal)?;
        for (next_state, rule) in fireable_successors(&cache.bound, &state)? {
            if closed.insert(next_state.clone()) {
                let priority = path.len() as f64 + h;
                let mut next_path = path.clone();
                next_path.push(rule);
                open.push(HeapEntry { priority, seq, state: next_state, path: next_path });
                seq += 1;
            }
        }
    }
    Ok(SearchOutcome::failure(last_state, visited))
}

/// Best-first (greedy) search: identical driver to [`a_star_search`] but
/// the priority is `h(parent, goal)` alone, with no
/// path-length term.
pub fn best_first_search(wm: &WorkingMemory, heuristic: &Heuristic, max_depth: usize) -> Result<SearchOutcome, EngineError> {
    let mut seq = 0u64;
    let mut open: BinaryHeap<HeapEntry> = BinaryHeap::new();
    open.push(HeapEntry { priority: 0.0, seq, state: wm.initial_state.clone(), path: Vec::new() });
    seq += 1;
    let mut closed: HashSet<FactContainer> = HashSet::new();
    closed.insert(wm.initial_state.clone());
    let mut cache = ExpansionCache::for_state(wm, &wm.initial_state);
    let mut visited = 0usize;
    let mut last_state = wm.initial_state.clone();

    while let Some(entry) = open.pop() {
        let HeapEntry { state, path, .. } = entry;
        last_state = state.clone();
        if state == *wm.goal {
            return Ok(SearchOutcome::success(state, path, visited));
        }
        visited += 1;
        if visited % 1000 == 0 {
            tracing::debug!(visited, open = open.len(), "best-first search in progress");
        }
        if path.len() >= max_depth {
            continue;
        }
        cache.refresh(wm, &state);
        let priority = heuristic.evaluate(&state, &wm.goal)?;
        for (next_state, rule) in fireable_successors(&cache.bound, &state)? {
            if closed.insert(next_state.clone()) {
                let mut next_path = path.clone();
                next_path.push(rule);
                open.push(HeapEntry { priority, seq, state: next_state, path: next_path });
                seq += 1;
            }
        }
    }
    Ok(SearchOutcome::failure(last_state, visited))
}
