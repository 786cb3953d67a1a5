//! `bind_rules`: expands partially-bound rules into fully bound instances
//! by trying each logic variable against every fact name in the current
//! state.

use tracing::trace;
use wm_model::{first_unbound_variable, substitute_rule, FactContainer, RuleContainer};

/// Expands every unbound rule in `rules` against `facts`. The input
/// container is not mutated; the returned container holds the rules that
/// were already bound plus every substitution reachable by the
/// fixed-point expansion.
///
/// Binding cannot fail by construction: every unbound rule carries at
/// least one `?var` (by definition of being unbound), and
/// [`first_unbound_variable`] always finds it by scanning left to right.
pub fn bind_rules(rules: &RuleContainer, facts: &FactContainer) -> RuleContainer {
    let mut rules = rules.clone();
    while !rules.unbound.is_empty() {
        let rule = rules.unbound.pop().expect("checked non-empty above");
        match first_unbound_variable(&rule) {
            Some(var) => {
                trace!(rule = %rule.name, variable = %var, candidates = facts.len(), "expanding logic variable");
                for fact in facts.iter() {
                    rules.add(substitute_rule(&rule, &var, &fact.name));
                }
            }
            // Every condition/conclusion is already bound; nothing left to
            // substitute. Route it through `add` so it lands in whichever
            // bucket its current bind status calls for.
            None => rules.add(rule),
        }
    }
    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use wm_model::{Action, Antecedent, Condition, Conclusion, Consequent, Disjunction, Fact, Operand, Predicate, Rule, Value};

    fn facts_with_kinds(pairs: &[(&str, &str)]) -> FactContainer {
        let mut facts = FactContainer::new();
        for (name, kind) in pairs {
            let mut fact = Fact::new(*name);
            fact.set("kind", Value::Str((*kind).to_string()));
            facts.add(fact).unwrap();
        }
        facts
    }

    fn unbound_rules(rule: Rule) -> RuleContainer {
        let mut rules = RuleContainer::new();
        rules.add(rule);
        rules
    }

    #[test]
    fn expands_one_candidate_per_fact_name() {
        let facts = facts_with_kinds(&[("P1", "red"), ("P2", "blue")]);
        let rule = Rule::new(
            "retract_red",
            Antecedent::new(vec![Disjunction::new(vec![Condition::new(
                Predicate::Eq,
                "?X",
                "kind",
                Operand::Literal(Value::Str("red".into())),
            )])]),
            Consequent::new(vec![Conclusion::new(Action::Retract, "?X", None, None)]),
        );

        let bound = bind_rules(&unbound_rules(rule), &facts);
        assert!(bound.unbound.is_empty());
        assert_eq!(bound.len(), 2);
        let names: Vec<&str> = bound.iter().map(|r| r.antecedent.disjunctions[0].conditions[0].fact_name.as_str()).collect();
        assert!(names.contains(&"P1"));
        assert!(names.contains(&"P2"));
    }

    #[test]
    fn every_output_rule_is_bound() {
        let facts = facts_with_kinds(&[("P1", "red")]);
        let rule = Rule::new(
            "r",
            Antecedent::new(vec![Disjunction::new(vec![Condition::new(
                Predicate::Eq,
                "?X",
                "kind",
                Operand::Literal(Value::Str("red".into())),
            )])]),
            Consequent::new(vec![Conclusion::new(Action::Retract, "?X", None, None)]),
        );
        let bound = bind_rules(&unbound_rules(rule), &facts);
        for r in bound.iter() {
            assert!(r.is_bound());
        }
    }

    #[test]
    fn consequent_variable_expands_only_after_antecedent_closes() {
        // `?X` appears in both antecedent and consequent; the binder must
        // resolve the antecedent's occurrence first rather than trying to
        // expand the consequent prematurely.
        let facts = facts_with_kinds(&[("P1", "red")]);
        let rule = Rule::new(
            "r",
            Antecedent::new(vec![Disjunction::new(vec![Condition::new(
                Predicate::Eq,
                "?X",
                "kind",
                Operand::Literal(Value::Str("red".into())),
            )])]),
            Consequent::new(vec![Conclusion::new(Action::Retract, "?X", None, None)]),
        );
        let bound = bind_rules(&unbound_rules(rule), &facts);
        let only = bound.iter().next().unwrap();
        assert_eq!(only.consequent.conclusions[0].fact_name, "P1");
    }

    #[test]
    fn already_bound_input_passes_through_untouched() {
        let rule = Rule::new("r", Antecedent::new(vec![]), Consequent::new(vec![Conclusion::new(Action::Assert, "A", None, None)]));
        let mut rules = RuleContainer::new();
        rules.add(rule.clone());
        let bound = bind_rules(&rules, &FactContainer::new());
        assert_eq!(bound.len(), 1);
        assert_eq!(bound.iter().next().unwrap(), &rule);
    }

    proptest::proptest! {
        /// Every rule produced by `bind_rules` is bound, for any non-empty
        /// set of fact names the variable could have been substituted with.
        #[test]
        fn every_expansion_is_bound(fact_names in proptest::collection::vec("[A-Z][a-z0-9]{0,4}", 1..6)) {
            let mut facts = FactContainer::new();
            for name in fact_names.iter().collect::<std::collections::BTreeSet<_>>() {
                let _ = facts.add(Fact::new(name.clone()));
            }
            let rule = Rule::new(
                "r",
                Antecedent::new(vec![Disjunction::new(vec![Condition::new(
                    Predicate::Eq,
                    "?X",
                    "kind",
                    Operand::Literal(Value::Str("red".into())),
                )])]),
                Consequent::new(vec![Conclusion::new(Action::Retract, "?X", None, None)]),
            );
            let bound = bind_rules(&unbound_rules(rule), &facts);
            for r in bound.iter() {
                prop_assert!(r.is_bound());
            }
        }
    }
}
