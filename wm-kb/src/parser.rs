//! Line-oriented knowledge-base parser. Produces the entities a working
//! memory is built from: a [`FactContainer`], a [`RuleContainer`], and a
//! [`GoalContainer`].
//!
//! Each of the three passes (`parse_facts`, `parse_rules`, `parse_goal`,
//! run in sequence by `load_from_text`) threads an explicit
//! [`ParserState`] value through itself as a parameter rather than
//! carrying it on a struct field. Every pass starts fresh from
//! [`ParserState::Unknown`] and returns to `Unknown` once its blocks
//! close, so no stuck state can leak across calls on malformed input.

use once_cell::sync::Lazy;
use regex::Regex;
use wm_model::{
    cast_trial, Action, Antecedent, Condition, Conclusion, Consequent, Disjunction, Fact,
    FactContainer, GoalContainer, Operand, Predicate, Rule, RuleContainer,
};

use crate::error::ParserSyntaxError;

const COMMENT: char = '#';

static STRING_LITERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r#""[^"]*""#).unwrap());

/// The parser's finite states: `Unknown` between blocks, `Fact` inside a
/// `beginFact:`/`endFact` block, `Goal` inside `beginGoal:`/`endGoal`,
/// `Antecedent`/`Consequent` inside a rule's two halves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParserState {
    Unknown,
    Fact,
    Goal,
    Antecedent,
    Consequent,
}

/// A fully parsed knowledge base: initial facts, rule base, and goal.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    pub facts: FactContainer,
    pub rules: RuleContainer,
    pub goal: GoalContainer,
}

/// Strips blank lines, `#`-prefixed comment lines, a trailing `#` comment,
/// and all whitespace outside quoted string literals. Every entry point
/// below runs its input through this first.
pub fn purify(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with(COMMENT) {
            continue;
        }
        let mut purified = match STRING_LITERAL.find(line) {
            Some(m) => {
                let head: String = line[..m.start()].chars().filter(|c| !c.is_whitespace()).collect();
                let body = &line[m.start()..m.end()];
                let tail: String = line[m.end()..].chars().filter(|c| !c.is_whitespace()).collect();
                format!("{head}{body}{tail}")
            }
            None => line.chars().filter(|c| !c.is_whitespace()).collect(),
        };
        if let Some(idx) = purified.find(COMMENT) {
            purified.truncate(idx);
        }
        out.push(purified);
    }
    out
}

/// Parses every `beginFact:`/`endFact` block in `lines`. `state` must
/// start at [`ParserState::Unknown`]; a `beginGoal:`/`endGoal`
/// block is skipped (its fact blocks are parsed separately by
/// [`parse_goal`]'s delegation to this same function).
pub fn parse_facts(lines: &[String], state: &mut ParserState) -> Result<FactContainer, ParserSyntaxError> {
    let mut facts = FactContainer::new();
    let mut current_name: Option<String> = None;

    for line in lines {
        match *state {
            ParserState::Goal => {
                if line.starts_with("endGoal") {
                    *state = ParserState::Unknown;
                }
            }
            ParserState::Unknown => {
                if line.starts_with("beginGoal:") {
                    *state = ParserState::Goal;
                } else if let Some(name) = line.strip_prefix("beginFact:") {
                    if name.is_empty() {
                        return Err(ParserSyntaxError::UnnamedFact(line.clone()));
                    }
                    facts.add(Fact::new(name)).map_err(|_| ParserSyntaxError::FactSyntax(line.clone()))?;
                    current_name = Some(name.to_string());
                    *state = ParserState::Fact;
                } else if line.starts_with("endFact") {
                    return Err(ParserSyntaxError::UnexpectedEndFact(line.clone()));
                }
            }
            ParserState::Fact => {
                if line.starts_with("beginFact:") {
                    return Err(ParserSyntaxError::UnexpectedBeginFact(line.clone()));
                }
                if line.starts_with("endFact") {
                    *state = ParserState::Unknown;
                    current_name = None;
                    continue;
                }
                let (k, v) = line.split_once('=').ok_or_else(|| ParserSyntaxError::FactSyntax(line.clone()))?;
                if k.is_empty() || v.is_empty() {
                    return Err(ParserSyntaxError::AttributeParsing(line.clone()));
                }
                let name = current_name.as_deref().expect("Fact state implies an open fact block");
                let fact = facts.get_mut(name).expect("fact inserted at beginFact");
                fact.set(k, cast_trial(v));
            }
            ParserState::Antecedent | ParserState::Consequent => {}
        }
    }
    Ok(facts)
}

/// Parses every `beginRule:`/`then`/`endRule` block in `lines`. `state`
/// must start at [`ParserState::Unknown`].
pub fn parse_rules(lines: &[String], state: &mut ParserState) -> Result<RuleContainer, ParserSyntaxError> {
    let mut rules = RuleContainer::new();
    let mut current_name: Option<String> = None;
    let mut disjunctions: Vec<Disjunction> = Vec::new();
    let mut conclusions: Vec<Conclusion> = Vec::new();

    for line in lines {
        match *state {
            ParserState::Goal => {
                if line.starts_with("endGoal") {
                    *state = ParserState::Unknown;
                }
            }
            ParserState::Unknown => {
                if line.starts_with("beginGoal:") {
                    *state = ParserState::Goal;
                } else if let Some(name) = line.strip_prefix("beginRule:") {
                    if name.is_empty() {
                        return Err(ParserSyntaxError::UnnamedRule(line.clone()));
                    }
                    current_name = Some(name.to_string());
                    disjunctions = Vec::new();
                    *state = ParserState::Antecedent;
                } else if line == "then" {
                    return Err(ParserSyntaxError::UnexpectedAntecedentEnd(line.clone()));
                } else if line == "endRule" {
                    return Err(ParserSyntaxError::UnexpectedConsequentEnd(line.clone()));
                }
            }
            ParserState::Antecedent => {
                if line == "then" {
                    if disjunctions.is_empty() {
                        return Err(ParserSyntaxError::EmptyAntecedent(line.clone()));
                    }
                    conclusions = Vec::new();
                    *state = ParserState::Consequent;
                    continue;
                }
                disjunctions.push(parse_disjunction(line)?);
            }
            ParserState::Consequent => {
                if line == "endRule" {
                    if conclusions.is_empty() {
                        return Err(ParserSyntaxError::EmptyConsequent(line.clone()));
                    }
                    let name = current_name.take().expect("Consequent state implies an open rule block");
                    let rule = Rule::new(
                        name,
                        Antecedent::new(std::mem::take(&mut disjunctions)),
                        Consequent::new(std::mem::take(&mut conclusions)),
                    );
                    rules.add(rule);
                    *state = ParserState::Unknown;
                    continue;
                }
                conclusions.push(parse_conclusion(line)?);
            }
            ParserState::Fact => {}
        }
    }
    Ok(rules)
}

/// Parses the `beginGoal:`/`endGoal` block, delegating its inner fact
/// blocks to [`parse_facts`] — the goal section embeds fact blocks exactly
/// like the top-level fact section.
pub fn parse_goal(lines: &[String], state: &mut ParserState) -> Result<GoalContainer, ParserSyntaxError> {
    let mut goal_lines: Vec<String> = Vec::new();
    let mut closed_once = false;

    for line in lines {
        match *state {
            ParserState::Unknown => {
                if line.starts_with("beginGoal:") {
                    if closed_once {
                        return Err(ParserSyntaxError::UnexpectedBeginGoal(line.clone()));
                    }
                    *state = ParserState::Goal;
                }
            }
            ParserState::Goal => {
                if line.starts_with("endGoal") {
                    *state = ParserState::Unknown;
                    closed_once = true;
                    continue;
                }
                goal_lines.push(line.clone());
            }
            _ => {}
        }
    }

    let mut inner_state = ParserState::Unknown;
    let facts = parse_facts(&goal_lines, &mut inner_state)?;
    Ok(GoalContainer::from(facts))
}

/// Parses `text` into a complete [`KnowledgeBase`]: purify once, then run
/// the fact, rule, and goal passes over the same purified lines.
pub fn load_from_text(text: &str) -> Result<KnowledgeBase, ParserSyntaxError> {
    let lines = purify(text);
    let mut fact_state = ParserState::Unknown;
    let facts = parse_facts(&lines, &mut fact_state)?;
    let mut rule_state = ParserState::Unknown;
    let rules = parse_rules(&lines, &mut rule_state)?;
    let mut goal_state = ParserState::Unknown;
    let goal = parse_goal(&lines, &mut goal_state)?;
    Ok(KnowledgeBase { facts, rules, goal })
}

fn parse_disjunction(line: &str) -> Result<Disjunction, ParserSyntaxError> {
    let conditions: Result<Vec<Condition>, ParserSyntaxError> = line.split("||").map(parse_condition).collect();
    Ok(Disjunction::new(conditions?))
}

/// Splits a `name(args)` call expression. `None` if `text` doesn't end in
/// `)` or has no `(` at all.
fn split_call(text: &str) -> Option<(&str, &str)> {
    let open = text.find('(')?;
    if !text.ends_with(')') {
        return None;
    }
    Some((&text[..open], &text[open + 1..text.len() - 1]))
}

/// Splits a call's argument list on top-level commas, treating `"..."`
/// spans as opaque so a quoted value can never be split mid-string.
fn split_args(args: &str) -> Vec<&str> {
    if args.is_empty() {
        return Vec::new();
    }
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;
    for (i, c) in args.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                parts.push(&args[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&args[start..]);
    parts
}

/// Wraps a raw value token as [`Operand::Unresolved`] — its literal
/// casting ([`cast_trial`]) and arithmetic/attribute-reference resolution
/// happen later in `wm_core::evaluate_values`, not at parse time, since a
/// condition's `?var->attr` form isn't resolvable until the rule is bound
/// to a concrete fact name.
fn parse_operand(text: &str) -> Operand {
    Operand::Unresolved(text.to_string())
}

/// `<pred>(<factref>,<attr>,<value>)`.
fn parse_condition(text: &str) -> Result<Condition, ParserSyntaxError> {
    let (name, args) =
        split_call(text).ok_or_else(|| ParserSyntaxError::RuleSyntax(text.to_string()))?;
    let predicate = Predicate::from_name(name).ok_or_else(|| ParserSyntaxError::RuleSyntax(text.to_string()))?;
    let parts = split_args(args);
    if parts.len() != 3 {
        return Err(ParserSyntaxError::BadArguments(text.to_string()));
    }
    Ok(Condition::new(predicate, parts[0], parts[1], parse_operand(parts[2])))
}

/// `<action>(<factref>[,<attr>[,<value>]])`. Argument count is validated
/// against [`Action::extra_arity`] at parse time, not at bind time.
fn parse_conclusion(text: &str) -> Result<Conclusion, ParserSyntaxError> {
    let (name, args) =
        split_call(text).ok_or_else(|| ParserSyntaxError::RuleSyntax(text.to_string()))?;
    let action = Action::from_name(name).ok_or_else(|| ParserSyntaxError::RuleSyntax(text.to_string()))?;
    let parts = split_args(args);
    if parts.is_empty() || parts[0].is_empty() {
        return Err(ParserSyntaxError::BadArguments(text.to_string()));
    }
    let extra = parts.len() - 1;
    if extra != action.extra_arity() {
        return Err(ParserSyntaxError::BadArguments(text.to_string()));
    }
    let fact_name = parts[0].to_string();
    let attr = if extra >= 1 { Some(parts[1].to_string()) } else { None };
    let value = if extra >= 2 { Some(parse_operand(parts[2])) } else { None };
    Ok(Conclusion::new(action, fact_name, attr, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wm_model::Value;

    #[test]
    fn purify_strips_blank_lines_comments_and_whitespace() {
        let text = "  beginFact: A \n# full comment\nx = 1 # trailing\n\nendFact";
        let lines = purify(text);
        assert_eq!(lines, vec!["beginFact:A", "x=1", "endFact"]);
    }

    #[test]
    fn purify_preserves_whitespace_inside_quoted_strings() {
        let lines = purify(r#"kind = "red block""#);
        assert_eq!(lines, vec![r#"kind="red block""#]);
    }

    #[test]
    fn parses_a_simple_fact_block() {
        let kb = load_from_text("beginFact:A\nx=1\nkind=\"red\"\nendFact").unwrap();
        let fact = kb.facts.get("A").unwrap();
        assert_eq!(fact.get("x"), Some(&Value::Int(1)));
        assert_eq!(fact.get("kind"), Some(&Value::Str("red".into())));
    }

    #[test]
    fn unnamed_fact_is_a_syntax_error() {
        let err = load_from_text("beginFact:\nendFact").unwrap_err();
        assert!(matches!(err, ParserSyntaxError::UnnamedFact(_)));
    }

    #[test]
    fn unexpected_end_fact_is_a_syntax_error() {
        let err = load_from_text("endFact").unwrap_err();
        assert!(matches!(err, ParserSyntaxError::UnexpectedEndFact(_)));
    }

    #[test]
    fn parses_a_rule_with_disjunction_and_arithmetic_consequent() {
        let text = "beginRule:bump\n\
                     equal(A,x,1)||equal(A,x,2)\n\
                     then\n\
                     update(A,x,A->x+1)\n\
                     endRule";
        let kb = load_from_text(text).unwrap();
        let rule = kb.rules.iter().next().unwrap();
        assert_eq!(rule.name, "bump");
        assert_eq!(rule.antecedent.disjunctions[0].conditions.len(), 2);
        assert_eq!(rule.consequent.conclusions[0].action, Action::Update);
    }

    #[test]
    fn empty_antecedent_is_rejected() {
        let text = "beginRule:r\nthen\nassert(A)\nendRule";
        let err = load_from_text(text).unwrap_err();
        assert!(matches!(err, ParserSyntaxError::EmptyAntecedent(_)));
    }

    #[test]
    fn empty_consequent_is_rejected() {
        let text = "beginRule:r\nequal(A,x,1)\nthen\nendRule";
        let err = load_from_text(text).unwrap_err();
        assert!(matches!(err, ParserSyntaxError::EmptyConsequent(_)));
    }

    #[test]
    fn wrong_arity_for_add_is_bad_arguments() {
        let text = "beginRule:r\nequal(A,x,1)\nthen\nadd(A,y)\nendRule";
        let err = load_from_text(text).unwrap_err();
        assert!(matches!(err, ParserSyntaxError::BadArguments(_)));
    }

    #[test]
    fn unknown_predicate_name_is_a_rule_syntax_error() {
        let text = "beginRule:r\nbogus(A,x,1)\nthen\nassert(B)\nendRule";
        let err = load_from_text(text).unwrap_err();
        assert!(matches!(err, ParserSyntaxError::RuleSyntax(_)));
    }

    #[test]
    fn goal_block_reuses_the_fact_block_grammar() {
        let text = "beginGoal:\nbeginFact:A\nx=1\nendFact\nendGoal";
        let kb = load_from_text(text).unwrap();
        assert_eq!(kb.goal.get("A").unwrap().get("x"), Some(&Value::Int(1)));
    }

    #[test]
    fn variable_fact_name_parses_as_unbound_condition() {
        let condition = parse_condition(r#"equal(?X,kind,"red")"#).unwrap();
        assert_eq!(condition.fact_name, "?X");
        assert!(!condition.is_bound());
    }

    #[test]
    fn full_knowledge_base_round_trips_facts_rules_and_goal() {
        let text = "beginFact:A\nx=1\nendFact\n\
                     beginRule:bump\nequal(A,x,1)\nthen\nupdate(A,x,A->x+1)\nendRule\n\
                     beginGoal:\nbeginFact:A\nx=2\nendFact\nendGoal";
        let kb = load_from_text(text).unwrap();
        assert!(kb.facts.contains("A"));
        assert_eq!(kb.rules.len(), 1);
        assert_eq!(kb.goal.get("A").unwrap().get("x"), Some(&Value::Int(2)));
    }

    proptest::proptest! {
        #[test]
        fn any_integer_attribute_round_trips_through_a_fact_block(x in -10_000i64..10_000) {
            let text = format!("beginFact:A\nx={x}\nendFact");
            let kb = load_from_text(&text).unwrap();
            prop_assert_eq!(kb.facts.get("A").unwrap().get("x"), Some(&Value::Int(x)));
        }
    }
}
