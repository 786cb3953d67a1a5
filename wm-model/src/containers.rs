//! Fact, goal, and rule containers. `FactContainer` is the search-graph
//! node identity type — its equality/hash must be by value, not by
//! address, which `Fact`'s own `Hash`/`Eq` already gives us.

use crate::fact::Fact;
use crate::rule::Rule;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::hash::{Hash, Hasher};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ContainerError {
    #[error("no such item: {0}")]
    NotExistentItem(String),
    #[error("duplicate item: {0}")]
    DuplicateItem(String),
    #[error("container is empty")]
    EmptyContainer,
}

/// Mapping from fact name to [`Fact`], unique names. Stored in a
/// `BTreeMap` rather than a `HashMap` for the same reproducible-iteration
/// reason as [`Fact`]'s own attribute map.
#[derive(Clone, Debug, Default)]
pub struct FactContainer {
    facts: BTreeMap<String, Fact>,
}

impl FactContainer {
    pub fn new() -> Self {
        FactContainer { facts: BTreeMap::new() }
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.facts.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Result<&Fact, ContainerError> {
        self.facts.get(name).ok_or_else(|| ContainerError::NotExistentItem(name.to_string()))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut Fact, ContainerError> {
        self.facts.get_mut(name).ok_or_else(|| ContainerError::NotExistentItem(name.to_string()))
    }

    pub fn add(&mut self, fact: Fact) -> Result<(), ContainerError> {
        if self.facts.contains_key(&fact.name) {
            return Err(ContainerError::DuplicateItem(fact.name));
        }
        self.facts.insert(fact.name.clone(), fact);
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<Fact, ContainerError> {
        self.facts.remove(name).ok_or_else(|| ContainerError::NotExistentItem(name.to_string()))
    }

    /// Merges `other`'s facts in, overwriting on name collision.
    pub fn update(&mut self, other: &FactContainer) {
        for (name, fact) in &other.facts {
            self.facts.insert(name.clone(), fact.clone());
        }
    }

    pub fn clear(&mut self) {
        self.facts.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fact> {
        self.facts.values()
    }

    pub fn fact_names(&self) -> BTreeSet<String> {
        self.facts.keys().cloned().collect()
    }
}

impl PartialEq for FactContainer {
    fn eq(&self, other: &Self) -> bool {
        self.facts == other.facts
    }
}
impl Eq for FactContainer {}

impl Hash for FactContainer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for (name, fact) in &self.facts {
            name.hash(state);
            fact.hash(state);
        }
    }
}

impl std::fmt::Display for FactContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Facts:")?;
        for fact in self.facts.values() {
            writeln!(f, "{fact}")?;
        }
        write!(f, "\nFacts count: {}", self.facts.len())
    }
}

/// Same shape as [`FactContainer`], kept as a distinct type for clarity at
/// call sites.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct GoalContainer(FactContainer);

impl GoalContainer {
    pub fn new() -> Self {
        GoalContainer(FactContainer::new())
    }
}

impl From<FactContainer> for GoalContainer {
    fn from(inner: FactContainer) -> Self {
        GoalContainer(inner)
    }
}

impl std::ops::Deref for GoalContainer {
    type Target = FactContainer;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::ops::DerefMut for GoalContainer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl std::fmt::Display for GoalContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Goal:")?;
        for fact in self.0.iter() {
            writeln!(f, "{fact}")?;
        }
        Ok(())
    }
}

/// The unbound half of a [`RuleContainer`]: rules awaiting expansion by the
/// binder. A rule is keyed by structural identity in `rules`; `by_name`
/// tracks only the most recently inserted rule for a given name — it is
/// last-write-wins, and is never consulted for duplicate rejection.
#[derive(Clone, Debug, Default)]
pub struct UnboundRuleContainer {
    rules: HashSet<Rule>,
    by_name: HashMap<String, Rule>,
}

impl UnboundRuleContainer {
    pub fn new() -> Self {
        UnboundRuleContainer { rules: HashSet::new(), by_name: HashMap::new() }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn contains(&self, rule: &Rule) -> bool {
        self.rules.contains(rule)
    }

    /// Inserting a structurally identical rule twice is a silent no-op:
    /// deduplication here comes entirely from the underlying set insert,
    /// not from an explicit duplicate check against rule names.
    pub fn add(&mut self, rule: Rule) {
        self.by_name.insert(rule.name.clone(), rule.clone());
        self.rules.insert(rule);
    }

    pub fn remove(&mut self, name: &str) -> Result<Rule, ContainerError> {
        let rule = self.by_name.remove(name).ok_or_else(|| ContainerError::NotExistentItem(name.to_string()))?;
        self.rules.remove(&rule);
        Ok(rule)
    }

    /// Pops an arbitrary unbound rule — the binder's "pop any unbound rule"
    /// step. Errs with [`ContainerError::EmptyContainer`] if none remain.
    pub fn pop(&mut self) -> Result<Rule, ContainerError> {
        let rule = self.rules.iter().next().cloned().ok_or(ContainerError::EmptyContainer)?;
        self.rules.remove(&rule);
        if self.by_name.get(&rule.name) == Some(&rule) {
            self.by_name.remove(&rule.name);
        }
        Ok(rule)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn clear(&mut self) {
        self.rules.clear();
        self.by_name.clear();
    }
}

/// Two disjoint buckets — bound rules and unbound rules awaiting expansion.
/// Set-like insert/remove/lookup-by-name.
#[derive(Clone, Debug, Default)]
pub struct RuleContainer {
    bound: HashSet<Rule>,
    bound_by_name: HashMap<String, Rule>,
    pub unbound: UnboundRuleContainer,
}

impl RuleContainer {
    pub fn new() -> Self {
        RuleContainer { bound: HashSet::new(), bound_by_name: HashMap::new(), unbound: UnboundRuleContainer::new() }
    }

    pub fn len(&self) -> usize {
        self.bound.len() + self.unbound.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bound.is_empty() && self.unbound.is_empty()
    }

    pub fn contains(&self, rule: &Rule) -> bool {
        self.bound.contains(rule)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.bound.iter().chain(self.unbound.iter())
    }

    /// Routes `rule` to the bound or unbound bucket by its current bind
    /// status. See [`UnboundRuleContainer::add`] for why a duplicate never
    /// raises an error here either.
    pub fn add(&mut self, rule: Rule) {
        if rule.is_bound() {
            self.bound_by_name.insert(rule.name.clone(), rule.clone());
            self.bound.insert(rule);
        } else {
            self.unbound.add(rule);
        }
    }

    /// Pops an arbitrary bound rule — used by the agenda-filling pass over
    /// a binding result. Errs with [`ContainerError::EmptyContainer`] if no
    /// bound rule remains.
    pub fn pop(&mut self) -> Result<Rule, ContainerError> {
        let rule = self.bound.iter().next().cloned().ok_or(ContainerError::EmptyContainer)?;
        self.bound.remove(&rule);
        if self.bound_by_name.get(&rule.name) == Some(&rule) {
            self.bound_by_name.remove(&rule.name);
        }
        Ok(rule)
    }

    pub fn remove(&mut self, name: &str) -> Result<Rule, ContainerError> {
        if let Some(rule) = self.bound_by_name.remove(name) {
            self.bound.remove(&rule);
            return Ok(rule);
        }
        self.unbound.remove(name)
    }

    /// Unions `other`'s buckets into `self`, keeping both the rule sets and
    /// the by-name indices in sync.
    pub fn update(&mut self, other: &RuleContainer) {
        for rule in &other.bound {
            self.bound_by_name.insert(rule.name.clone(), rule.clone());
            self.bound.insert(rule.clone());
        }
        for rule in other.unbound.iter() {
            self.unbound.add(rule.clone());
        }
    }

    pub fn clear(&mut self) {
        self.bound.clear();
        self.bound_by_name.clear();
        self.unbound.clear();
    }
}

impl std::fmt::Display for RuleContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Rules:")?;
        for rule in self.iter() {
            writeln!(f, "\n{rule}")?;
        }
        write!(f, "\nRules count: {}", self.len())
    }
}
