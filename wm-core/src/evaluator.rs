//! `evaluate_values`: resolves attribute lookups and arithmetic
//! sub-expressions of a fully-bound rule against a concrete state.

use crate::error::EvalError;
use wm_model::{cast_trial, Antecedent, Condition, Conclusion, Consequent, Disjunction, FactContainer, Operand, Rule, Value};

/// Splits `text` at its single arithmetic operator, tolerating the minus
/// sign inside a `->` arrow: `+`, `*`, `/`, or `-` count as operators only
/// when not immediately followed by `>`. Returns `Ok(None)` when `text`
/// carries no operator and `Err` when it carries more than one.
fn split_arithmetic(text: &str) -> Result<Option<(char, &str, &str)>, EvalError> {
    let mut hits = Vec::new();
    for (byte_idx, c) in text.char_indices() {
        if matches!(c, '+' | '*' | '/' | '-') && text[byte_idx + c.len_utf8()..].chars().next() != Some('>') {
            hits.push((byte_idx, c));
        }
    }
    match hits.len() {
        0 => Ok(None),
        1 => {
            let (byte_idx, op) = hits[0];
            Ok(Some((op, &text[..byte_idx], &text[byte_idx + op.len_utf8()..])))
        }
        _ => Err(EvalError::ValueEvaluating(text.to_string())),
    }
}

/// Resolves a single arithmetic operand: an attribute reference
/// (`name->attr`) or a literal token. An absent attribute resolves to
/// [`Value::Nil`] rather than erroring — if either operand resolves to an
/// attribute that is absent, the result is `NIL`.
fn resolve_operand(text: &str, facts: &FactContainer) -> Result<Value, EvalError> {
    match text.split_once("->") {
        Some((fact_name, attr)) => {
            let fact = facts.get(fact_name)?;
            Ok(fact.get(attr).cloned().unwrap_or(Value::Nil))
        }
        None => Ok(cast_trial(text)),
    }
}

/// Resolves one operand slot — an arithmetic expression, a bare attribute
/// reference, or (already) a literal — to a [`Operand::Literal`].
fn evaluate_operand(operand: &Operand, facts: &FactContainer) -> Result<Operand, EvalError> {
    let Operand::Unresolved(text) = operand else {
        return Ok(operand.clone());
    };
    if let Some((op, lhs, rhs)) = split_arithmetic(text)? {
        let a = resolve_operand(lhs, facts)?;
        let b = resolve_operand(rhs, facts)?;
        if matches!(a, Value::Nil) || matches!(b, Value::Nil) {
            return Ok(Operand::Literal(Value::Nil));
        }
        if !a.is_numeric() || !b.is_numeric() {
            return Err(EvalError::NotNumericOperand(text.clone()));
        }
        return Ok(Operand::Literal(Value::apply_numeric(op, &a, &b)));
    }
    Ok(Operand::Literal(resolve_operand(text, facts)?))
}

fn evaluate_condition(condition: &Condition, facts: &FactContainer) -> Result<Condition, EvalError> {
    let value = evaluate_operand(&condition.value, facts)?;
    Ok(Condition::new(condition.predicate, condition.fact_name.clone(), condition.attr.clone(), value))
}

fn evaluate_conclusion(conclusion: &Conclusion, facts: &FactContainer) -> Result<Conclusion, EvalError> {
    let value = conclusion.value.as_ref().map(|v| evaluate_operand(v, facts)).transpose()?;
    Ok(Conclusion::new(conclusion.action, conclusion.fact_name.clone(), conclusion.attr.clone(), value))
}

/// Produces a rule with every attribute reference and arithmetic
/// expression replaced by its current value in `facts`. `rule` must be
/// fully bound; the input is never mutated — a deep copy is always
/// returned, even when nothing needed evaluating.
pub fn evaluate_values(rule: &Rule, facts: &FactContainer) -> Result<Rule, EvalError> {
    let disjunctions = rule
        .antecedent
        .disjunctions
        .iter()
        .map(|d| -> Result<Disjunction, EvalError> {
            let conditions =
                d.conditions.iter().map(|c| evaluate_condition(c, facts)).collect::<Result<Vec<_>, _>>()?;
            Ok(Disjunction::new(conditions))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let conclusions = rule
        .consequent
        .conclusions
        .iter()
        .map(|c| evaluate_conclusion(c, facts))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Rule::new(rule.name.clone(), Antecedent::new(disjunctions), Consequent::new(conclusions)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wm_model::{Action, Fact, Predicate};

    fn facts_with(name: &str, attr: &str, value: Value) -> FactContainer {
        let mut fact = Fact::new(name);
        fact.set(attr, value);
        let mut facts = FactContainer::new();
        facts.add(fact).unwrap();
        facts
    }

    #[test]
    fn arithmetic_resolves_attribute_plus_literal() {
        let facts = facts_with("A", "x", Value::Int(1));
        let rule = Rule::new(
            "r",
            Antecedent::new(vec![]),
            Consequent::new(vec![Conclusion::new(
                Action::Update,
                "A",
                Some("x".into()),
                Some(Operand::Unresolved("A->x+1".into())),
            )]),
        );
        let evaluated = evaluate_values(&rule, &facts).unwrap();
        assert_eq!(evaluated.consequent.conclusions[0].value, Some(Operand::Literal(Value::Float(2.0))));
    }

    #[test]
    fn plain_literal_condition_resolves_to_a_literal_and_holds() {
        // The parser wraps every value token, literals included, as
        // `Operand::Unresolved` — a bound condition like `equal(A,x,1)`
        // must still come out of evaluation as a literal so
        // `Condition::evaluate` doesn't vacuously see an unresolved value
        // and return false.
        let facts = facts_with("A", "x", Value::Int(1));
        let condition = Condition::new(Predicate::Eq, "A", "x", Operand::Unresolved("1".into()));
        let evaluated = evaluate_condition(&condition, &facts).unwrap();
        assert_eq!(evaluated.value, Operand::Literal(Value::Int(1)));
        assert!(evaluated.evaluate(&facts).unwrap());
    }

    #[test]
    fn plain_literal_conclusion_resolves_to_a_literal_before_apply() {
        // Same root cause as above, but on the consequent side: an
        // unresolved literal value reaching `Conclusion::apply` trips
        // `apply_action`'s `.expect("... without a value")` panic.
        let facts = facts_with("A", "x", Value::Int(1));
        let rule = Rule::new(
            "r",
            Antecedent::new(vec![]),
            Consequent::new(vec![Conclusion::new(
                Action::Update,
                "A",
                Some("x".into()),
                Some(Operand::Unresolved("5".into())),
            )]),
        );
        let evaluated = evaluate_values(&rule, &facts).unwrap();
        assert_eq!(evaluated.consequent.conclusions[0].value, Some(Operand::Literal(Value::Int(5))));
        evaluated.consequent.apply(&facts).unwrap();
    }

    #[test]
    fn missing_attribute_yields_nil_not_error() {
        let facts = facts_with("A", "x", Value::Int(1));
        let rule = Rule::new(
            "r",
            Antecedent::new(vec![]),
            Consequent::new(vec![Conclusion::new(
                Action::Update,
                "A",
                Some("z".into()),
                Some(Operand::Unresolved("A->y+1".into())),
            )]),
        );
        let evaluated = evaluate_values(&rule, &facts).unwrap();
        assert_eq!(evaluated.consequent.conclusions[0].value, Some(Operand::Literal(Value::Nil)));
    }

    #[test]
    fn multiple_operators_is_an_error() {
        let facts = facts_with("A", "x", Value::Int(1));
        let rule = Rule::new(
            "r",
            Antecedent::new(vec![]),
            Consequent::new(vec![Conclusion::new(
                Action::Update,
                "A",
                Some("z".into()),
                Some(Operand::Unresolved("A->x+1+1".into())),
            )]),
        );
        assert!(matches!(evaluate_values(&rule, &facts), Err(EvalError::ValueEvaluating(_))));
    }

    #[test]
    fn non_numeric_operand_is_an_error() {
        let facts = facts_with("A", "x", Value::Str("nope".into()));
        let rule = Rule::new(
            "r",
            Antecedent::new(vec![]),
            Consequent::new(vec![Conclusion::new(
                Action::Update,
                "A",
                Some("z".into()),
                Some(Operand::Unresolved("A->x+1".into())),
            )]),
        );
        assert!(matches!(evaluate_values(&rule, &facts), Err(EvalError::NotNumericOperand(_))));
    }

    #[test]
    fn arrow_inside_minus_is_not_mistaken_for_subtraction() {
        let facts = facts_with("A", "x", Value::Int(5));
        let condition = Condition::new(Predicate::Eq, "A", "x", Operand::Unresolved("A->x".into()));
        let evaluated = evaluate_condition(&condition, &facts).unwrap();
        assert_eq!(evaluated.value, Operand::Literal(Value::Int(5)));
    }

    #[test]
    fn division_is_true_division() {
        let facts = facts_with("A", "x", Value::Int(1));
        let condition = Condition::new(Predicate::Eq, "A", "x", Operand::Unresolved("A->x/2".into()));
        let evaluated = evaluate_condition(&condition, &facts).unwrap();
        assert_eq!(evaluated.value, Operand::Literal(Value::Float(0.5)));
    }

    #[test]
    fn evaluation_never_mutates_input_and_is_idempotent() {
        let facts = facts_with("A", "x", Value::Int(1));
        let rule = Rule::new(
            "r",
            Antecedent::new(vec![Disjunction::new(vec![Condition::new(
                Predicate::Eq,
                "A",
                "x",
                Operand::Unresolved("A->x".into()),
            )])]),
            Consequent::new(vec![]),
        );
        let once = evaluate_values(&rule, &facts).unwrap();
        assert!(!rule.is_evaluated());
        let twice = evaluate_values(&once, &facts).unwrap();
        assert_eq!(once, twice);
    }

    proptest::proptest! {
        /// Any integer attribute combined with any integer literal by any
        /// of the four operators evaluates the same whether the rule has
        /// already been evaluated once or not.
        #[test]
        fn arithmetic_evaluation_is_idempotent(x in -1000i64..1000, lit in 0i64..1000, op_idx in 0u8..4) {
            let op = ['+', '-', '*', '/'][op_idx as usize];
            if op == '/' && lit == 0 {
                return Ok(());
            }
            let facts = facts_with("A", "x", Value::Int(x));
            let condition = Condition::new(Predicate::Eq, "A", "x", Operand::Unresolved(format!("A->x{op}{lit}")));
            let once = evaluate_condition(&condition, &facts).unwrap();
            let twice = evaluate_condition(&Condition::new(once.predicate, once.fact_name.clone(), once.attr.clone(), once.value.clone()), &facts).unwrap();
            prop_assert_eq!(once.value, twice.value);
        }

        /// Any arithmetic expression referencing a missing attribute
        /// evaluates to NIL, never an error, regardless of the operator
        /// chosen.
        #[test]
        fn missing_operand_always_propagates_nil(lit in 0i64..1000, op_idx in 0u8..4) {
            let op = ['+', '-', '*', '/'][op_idx as usize];
            let facts = facts_with("A", "unrelated", Value::Int(0));
            let condition = Condition::new(Predicate::Eq, "A", "x", Operand::Unresolved(format!("A->missing{op}{lit}")));
            let evaluated = evaluate_condition(&condition, &facts).unwrap();
            prop_assert_eq!(evaluated.value, Operand::Literal(Value::Nil));
        }
    }
}
