//! The entity model above [`crate::fact::Fact`]: conditions, disjunctions,
//! antecedents, conclusions, consequents and rules.

use crate::containers::{ContainerError, FactContainer};
use crate::ops;
use crate::value::Value;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Relational predicate tags. A closed enumeration rather than a
/// name-to-function runtime dispatch table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Predicate {
    Eq,
    Neq,
    Gt,
    Lt,
    Gte,
    Lte,
}

impl Predicate {
    pub fn name(self) -> &'static str {
        match self {
            Predicate::Eq => "equal",
            Predicate::Neq => "not_equal",
            Predicate::Gt => "greater_than",
            Predicate::Lt => "less_than",
            Predicate::Gte => "greater_equal_than",
            Predicate::Lte => "less_equal_than",
        }
    }

    /// Inverse of [`Predicate::name`] — the parser's only way to turn a
    /// knowledge-base token (`equal`, `not_equal`, `greater_than`,
    /// `less_than`, `greater_equal_than`, `less_equal_than`) into a
    /// predicate tag. `None` for any other token.
    pub fn from_name(name: &str) -> Option<Predicate> {
        match name {
            "equal" => Some(Predicate::Eq),
            "not_equal" => Some(Predicate::Neq),
            "greater_than" => Some(Predicate::Gt),
            "less_than" => Some(Predicate::Lt),
            "greater_equal_than" => Some(Predicate::Gte),
            "less_equal_than" => Some(Predicate::Lte),
            _ => None,
        }
    }
}

/// Action tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Assert,
    Retract,
    Add,
    Update,
    Remove,
}

impl Action {
    pub fn name(self) -> &'static str {
        match self {
            Action::Assert => "assert",
            Action::Retract => "retract",
            Action::Add => "add",
            Action::Update => "update",
            Action::Remove => "remove",
        }
    }

    /// Inverse of [`Action::name`].
    pub fn from_name(name: &str) -> Option<Action> {
        match name {
            "assert" => Some(Action::Assert),
            "retract" => Some(Action::Retract),
            "add" => Some(Action::Add),
            "update" => Some(Action::Update),
            "remove" => Some(Action::Remove),
            _ => None,
        }
    }

    /// Number of arguments after `fact_name` this action's call syntax
    /// takes — `assert`/`retract` none, `add`/`update` two (`attr`,
    /// `value`), `remove` one (`attr`).
    pub fn extra_arity(self) -> usize {
        match self {
            Action::Assert | Action::Retract => 0,
            Action::Remove => 1,
            Action::Add | Action::Update => 2,
        }
    }
}

/// An operand slot in a [`Condition`] or [`Conclusion`]: either a literal
/// already cast by the parser, or unresolved text — a bare variable
/// (`?X`), an attribute reference (`X->attr`, possibly still carrying a
/// `?var` before binding), or an arithmetic expression. Binding and
/// evaluation narrow `Unresolved` text but never change its variant; only
/// [`crate::rule::Operand::is_bound`]/[`is_evaluated`] distinguish the
/// stages.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operand {
    Literal(Value),
    Unresolved(String),
}

fn contains_arithmetic_op(s: &str) -> bool {
    let chars: Vec<char> = s.chars().collect();
    for (i, c) in chars.iter().enumerate() {
        if matches!(c, '+' | '*' | '/' | '-') && chars.get(i + 1) != Some(&'>') {
            return true;
        }
    }
    false
}

impl Operand {
    pub fn is_bound(&self) -> bool {
        match self {
            Operand::Literal(_) => true,
            Operand::Unresolved(s) => !s.starts_with('?'),
        }
    }

    pub fn is_evaluated(&self) -> bool {
        match self {
            Operand::Literal(_) => true,
            Operand::Unresolved(s) => !(s.contains("->") || contains_arithmetic_op(s)),
        }
    }

    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            Operand::Literal(v) => Some(v),
            Operand::Unresolved(_) => None,
        }
    }
}

impl std::fmt::Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Literal(v) => write!(f, "{v}"),
            Operand::Unresolved(s) => write!(f, "{s}"),
        }
    }
}

/// `(predicate, fact_name, attr, value)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Condition {
    pub predicate: Predicate,
    pub fact_name: String,
    pub attr: String,
    pub value: Operand,
}

impl Condition {
    pub fn new(predicate: Predicate, fact_name: impl Into<String>, attr: impl Into<String>, value: Operand) -> Self {
        Condition { predicate, fact_name: fact_name.into(), attr: attr.into(), value }
    }

    pub fn is_bound(&self) -> bool {
        !self.fact_name.starts_with('?') && self.value.is_bound()
    }

    pub fn is_evaluated(&self) -> bool {
        self.value.is_evaluated()
    }

    /// Requires `self.value` to be a [`Operand::Literal`] — callers run the
    /// evaluator over a rule before testing its antecedent. An unresolved
    /// operand here is a contract violation and simply evaluates false
    /// rather than panicking. A `fact_name` absent from `facts` propagates
    /// as a [`ContainerError`] rather than evaluating false — see
    /// [`ops::eval_predicate`].
    pub fn evaluate(&self, facts: &FactContainer) -> Result<bool, ContainerError> {
        let Some(value) = self.value.as_literal() else {
            return Ok(false);
        };
        ops::eval_predicate(self.predicate, facts, &self.fact_name, &self.attr, value)
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({}, {}, {})", self.predicate.name(), self.fact_name, self.attr, self.value)
    }
}

fn set_hash<T: Hash>(items: &[T]) -> u64 {
    items.iter().fold(0u64, |acc, item| {
        let mut hasher = DefaultHasher::new();
        item.hash(&mut hasher);
        acc ^ hasher.finish()
    })
}

fn set_eq<T: Eq + Hash>(a: &[T], b: &[T]) -> bool {
    use std::collections::HashSet;
    let sa: HashSet<&T> = a.iter().collect();
    let sb: HashSet<&T> = b.iter().collect();
    sa == sb
}

/// Ordered list of [`Condition`]s; evaluates true iff any is true
/// (short-circuit). Equality and hashing are order-independent — a
/// disjunction identifies with the *set* of its conditions.
#[derive(Clone, Debug)]
pub struct Disjunction {
    pub conditions: Vec<Condition>,
}

impl Disjunction {
    pub fn new(conditions: Vec<Condition>) -> Self {
        Disjunction { conditions }
    }

    pub fn is_bound(&self) -> bool {
        self.conditions.iter().all(Condition::is_bound)
    }

    pub fn is_evaluated(&self) -> bool {
        self.conditions.iter().all(Condition::is_evaluated)
    }

    pub fn evaluate(&self, facts: &FactContainer) -> Result<bool, ContainerError> {
        for condition in &self.conditions {
            if condition.evaluate(facts)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl PartialEq for Disjunction {
    fn eq(&self, other: &Self) -> bool {
        set_eq(&self.conditions, &other.conditions)
    }
}
impl Eq for Disjunction {}
impl Hash for Disjunction {
    fn hash<H: Hasher>(&self, state: &mut H) {
        set_hash(&self.conditions).hash(state);
    }
}

impl std::fmt::Display for Disjunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered: Vec<String> = self.conditions.iter().map(ToString::to_string).collect();
        write!(f, "{}", rendered.join(" || "))
    }
}

/// Ordered list of [`Disjunction`]s (implicit conjunction); true iff every
/// disjunction is true.
#[derive(Clone, Debug)]
pub struct Antecedent {
    pub disjunctions: Vec<Disjunction>,
}

impl Antecedent {
    pub fn new(disjunctions: Vec<Disjunction>) -> Self {
        Antecedent { disjunctions }
    }

    pub fn is_bound(&self) -> bool {
        self.disjunctions.iter().all(Disjunction::is_bound)
    }

    pub fn is_evaluated(&self) -> bool {
        self.disjunctions.iter().all(Disjunction::is_evaluated)
    }

    pub fn evaluate(&self, facts: &FactContainer) -> Result<bool, ContainerError> {
        for disjunction in &self.disjunctions {
            if !disjunction.evaluate(facts)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl PartialEq for Antecedent {
    fn eq(&self, other: &Self) -> bool {
        set_eq(&self.disjunctions, &other.disjunctions)
    }
}
impl Eq for Antecedent {}
impl Hash for Antecedent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        set_hash(&self.disjunctions).hash(state);
    }
}

impl std::fmt::Display for Antecedent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered: Vec<String> = self.disjunctions.iter().map(ToString::to_string).collect();
        write!(f, "{}", rendered.join(" &&\n"))
    }
}

/// `(action, fact_name, attr, value)`. `attr`/`value` are `None` exactly
/// when `action`'s arity omits them.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Conclusion {
    pub action: Action,
    pub fact_name: String,
    pub attr: Option<String>,
    pub value: Option<Operand>,
}

impl Conclusion {
    pub fn new(action: Action, fact_name: impl Into<String>, attr: Option<String>, value: Option<Operand>) -> Self {
        Conclusion { action, fact_name: fact_name.into(), attr, value }
    }

    pub fn is_bound(&self) -> bool {
        if !self.fact_name.starts_with('?') {
            if let Some(value) = &self.value {
                return value.is_bound();
            }
            return true;
        }
        false
    }

    pub fn is_evaluated(&self) -> bool {
        match &self.value {
            Some(value) => value.is_evaluated(),
            None => true,
        }
    }

    /// Requires the conclusion to be evaluated (its `value`, if present, is
    /// a literal). Applies the action to `facts` in place.
    pub fn apply(&self, facts: &mut FactContainer) -> Result<(), ops::OperationError> {
        let value = self.value.as_ref().and_then(Operand::as_literal);
        ops::apply_action(self.action, facts, &self.fact_name, self.attr.as_deref(), value)
    }
}

impl std::fmt::Display for Conclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.attr, &self.value) {
            (Some(attr), Some(value)) => write!(f, "{}({}, {attr}, {value})", self.action.name(), self.fact_name),
            (Some(attr), None) => write!(f, "{}({}, {attr})", self.action.name(), self.fact_name),
            _ => write!(f, "{}({})", self.action.name(), self.fact_name),
        }
    }
}

/// Ordered list of [`Conclusion`]s, applied in order to a copy of the
/// incoming state.
#[derive(Clone, Debug)]
pub struct Consequent {
    pub conclusions: Vec<Conclusion>,
}

impl Consequent {
    pub fn new(conclusions: Vec<Conclusion>) -> Self {
        Consequent { conclusions }
    }

    pub fn is_bound(&self) -> bool {
        self.conclusions.iter().all(Conclusion::is_bound)
    }

    pub fn is_evaluated(&self) -> bool {
        self.conclusions.iter().all(Conclusion::is_evaluated)
    }

    /// Applies every conclusion, in order, to a clone of `facts`. `facts`
    /// itself is never mutated.
    pub fn apply(&self, facts: &FactContainer) -> Result<FactContainer, ops::OperationError> {
        let mut next = facts.clone();
        for conclusion in &self.conclusions {
            conclusion.apply(&mut next)?;
        }
        Ok(next)
    }
}

impl PartialEq for Consequent {
    fn eq(&self, other: &Self) -> bool {
        set_eq(&self.conclusions, &other.conclusions)
    }
}
impl Eq for Consequent {}
impl Hash for Consequent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        set_hash(&self.conclusions).hash(state);
    }
}

impl std::fmt::Display for Consequent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rendered: Vec<String> = self.conclusions.iter().map(ToString::to_string).collect();
        write!(f, "{}", rendered.join("\n"))
    }
}

/// `(name, Antecedent, Consequent)`; bound iff both sides are bound.
/// Equality/hashing are by `(antecedent, consequent, name)`.
#[derive(Clone, Debug)]
pub struct Rule {
    pub name: String,
    pub antecedent: Antecedent,
    pub consequent: Consequent,
}

impl Rule {
    pub fn new(name: impl Into<String>, antecedent: Antecedent, consequent: Consequent) -> Self {
        Rule { name: name.into(), antecedent, consequent }
    }

    pub fn is_bound(&self) -> bool {
        self.antecedent.is_bound() && self.consequent.is_bound()
    }

    pub fn is_evaluated(&self) -> bool {
        self.antecedent.is_evaluated() && self.consequent.is_evaluated()
    }
}

impl PartialEq for Rule {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.antecedent == other.antecedent && self.consequent == other.consequent
    }
}
impl Eq for Rule {}
impl Hash for Rule {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.antecedent.hash(state);
        self.consequent.hash(state);
        self.name.hash(state);
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[Rule: {}]\nAntecedent:\n{}\nConsequent:\n{}", self.name, self.antecedent, self.consequent)
    }
}

/// Finds the first `?var` token occurring in `text` — the variable to
/// expand is extracted by matching the first occurrence of `\?[\w_]+`.
pub fn first_variable(text: &str) -> Option<&str> {
    let start = text.find('?')?;
    let rest = &text[start + 1..];
    let end = rest.find(|c: char| !(c.is_alphanumeric() || c == '_')).unwrap_or(rest.len());
    if end == 0 {
        return None;
    }
    Some(&text[start..start + 1 + end])
}

/// Whole-identifier textual substitution of `var` (e.g. `?X`) with
/// `replacement` inside `text`. A match is only whole-identifier if it is
/// not immediately followed by another identifier character — substituting
/// `?X` must not match inside `?XY`.
pub fn substitute_variable(text: &str, var: &str, replacement: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(idx) = rest.find(var) {
        let (before, after_match) = rest.split_at(idx);
        let after = &after_match[var.len()..];
        let boundary_ok = after.chars().next().map_or(true, |c| !(c.is_alphanumeric() || c == '_'));
        result.push_str(before);
        if boundary_ok {
            result.push_str(replacement);
        } else {
            result.push_str(var);
        }
        rest = after;
    }
    result.push_str(rest);
    result
}

/// Finds the next `?var` to expand, in left-to-right priority: antecedent
/// conditions are considered before consequent conclusions, and a
/// consequent variable is only picked once the antecedent is fully bound
/// (consequent variables must already be constrained by the antecedent).
pub fn first_unbound_variable(rule: &Rule) -> Option<String> {
    if rule.antecedent.is_bound() {
        for conclusion in &rule.consequent.conclusions {
            if !conclusion.is_bound() {
                if conclusion.fact_name.starts_with('?') {
                    return Some(conclusion.fact_name.clone());
                }
                if let Some(Operand::Unresolved(text)) = &conclusion.value {
                    if let Some(var) = first_variable(text) {
                        return Some(var.to_string());
                    }
                }
            }
        }
        return None;
    }
    for disjunction in &rule.antecedent.disjunctions {
        for condition in &disjunction.conditions {
            if !condition.is_bound() {
                if condition.fact_name.starts_with('?') {
                    return Some(condition.fact_name.clone());
                }
                if let Operand::Unresolved(text) = &condition.value {
                    if let Some(var) = first_variable(text) {
                        return Some(var.to_string());
                    }
                }
            }
        }
    }
    None
}

fn substitute_operand(operand: &Operand, var: &str, replacement: &str) -> Operand {
    match operand {
        Operand::Literal(_) => operand.clone(),
        Operand::Unresolved(text) => Operand::Unresolved(substitute_variable(text, var, replacement)),
    }
}

/// Produces a deep copy of `rule` with every occurrence of `var` (e.g.
/// `?X`) replaced by `replacement` (a fact name) — in `fact_name` fields,
/// and textually inside arrow-reference/arithmetic operand strings.
pub fn substitute_rule(rule: &Rule, var: &str, replacement: &str) -> Rule {
    let disjunctions = rule
        .antecedent
        .disjunctions
        .iter()
        .map(|d| {
            let conditions = d
                .conditions
                .iter()
                .map(|c| {
                    let fact_name = if c.fact_name == var { replacement.to_string() } else { c.fact_name.clone() };
                    Condition::new(c.predicate, fact_name, c.attr.clone(), substitute_operand(&c.value, var, replacement))
                })
                .collect();
            Disjunction::new(conditions)
        })
        .collect();
    let conclusions = rule
        .consequent
        .conclusions
        .iter()
        .map(|c| {
            let fact_name = if c.fact_name == var { replacement.to_string() } else { c.fact_name.clone() };
            let value = c.value.as_ref().map(|v| substitute_operand(v, var, replacement));
            Conclusion::new(c.action, fact_name, c.attr.clone(), value)
        })
        .collect();
    Rule::new(rule.name.clone(), Antecedent::new(disjunctions), Consequent::new(conclusions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn disjunction_equality_ignores_order() {
        let a = Disjunction::new(vec![
            Condition::new(Predicate::Eq, "A", "x", Operand::Literal(Value::Int(1))),
            Condition::new(Predicate::Eq, "B", "y", Operand::Literal(Value::Int(2))),
        ]);
        let b = Disjunction::new(vec![
            Condition::new(Predicate::Eq, "B", "y", Operand::Literal(Value::Int(2))),
            Condition::new(Predicate::Eq, "A", "x", Operand::Literal(Value::Int(1))),
        ]);
        assert_eq!(a, b);
    }

    #[test]
    fn first_variable_extracts_leading_token() {
        assert_eq!(first_variable("?X->attr"), Some("?X"));
        assert_eq!(first_variable("?foo_bar+1"), Some("?foo_bar"));
        assert_eq!(first_variable("no var here"), None);
    }

    #[test]
    fn substitute_variable_is_whole_identifier() {
        assert_eq!(substitute_variable("?X->y", "?X", "block1"), "block1->y");
        assert_eq!(substitute_variable("?XY->y", "?X", "block1"), "?XY->y");
    }

    #[test]
    fn condition_is_bound_tracks_value_and_fact_name() {
        let bound = Condition::new(Predicate::Eq, "A", "x", Operand::Literal(Value::Int(1)));
        assert!(bound.is_bound());

        let unbound_name = Condition::new(Predicate::Eq, "?X", "x", Operand::Literal(Value::Int(1)));
        assert!(!unbound_name.is_bound());

        let unbound_value = Condition::new(Predicate::Eq, "A", "x", Operand::Unresolved("?Y".into()));
        assert!(!unbound_value.is_bound());
    }

    #[test]
    fn predicate_and_action_name_round_trip() {
        for p in [Predicate::Eq, Predicate::Neq, Predicate::Gt, Predicate::Lt, Predicate::Gte, Predicate::Lte] {
            assert_eq!(Predicate::from_name(p.name()), Some(p));
        }
        for a in [Action::Assert, Action::Retract, Action::Add, Action::Update, Action::Remove] {
            assert_eq!(Action::from_name(a.name()), Some(a));
        }
        assert_eq!(Predicate::from_name("bogus"), None);
    }

    #[test]
    fn condition_is_evaluated_tracks_arrow_and_arithmetic() {
        let plain = Condition::new(Predicate::Eq, "A", "x", Operand::Unresolved("block1".into()));
        assert!(plain.is_evaluated());

        let arrow = Condition::new(Predicate::Eq, "A", "x", Operand::Unresolved("block1->size".into()));
        assert!(!arrow.is_evaluated());

        let arithmetic = Condition::new(Predicate::Eq, "A", "x", Operand::Unresolved("block1->size+1".into()));
        assert!(!arithmetic.is_evaluated());
    }
}
