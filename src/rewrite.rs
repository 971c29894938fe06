use log::debug;

use crate::production::{ProductionRule, RuleKind};
use crate::symbol::Symbol;

/// Removes direct left recursion from every parser rule, to a fixpoint.
///
/// For a nonterminal `a` with at least one alternative whose first symbol is
/// `a` itself:
///
/// * `a = b ...`     becomes `a = b ..., a'`
/// * `a = a, x ...`  becomes `a' = x ..., a'`
/// * `a' = ;`        is appended as the final `a'` alternative
///
/// `a'` is a fresh synthetic name and the empty alternative matches
/// unconditionally. The empty alternative comes last so ordered choice tries
/// the consuming tails first. Indirect left recursion is out of scope and is
/// not detected.
pub(crate) fn remove_left_recursion(mut rules: Vec<ProductionRule>) -> Vec<ProductionRule> {
    loop {
        // `a = a;` derives nothing and would regenerate itself through the
        // rewrite forever; drop such alternatives outright.
        rules.retain(|rule| {
            !(is_left_recursive(rule) && rule.symbols.len() == 1)
        });
        let Some(name) = rules
            .iter()
            .find(|rule| is_left_recursive(rule))
            .map(|rule| rule.name.clone())
        else {
            return rules;
        };
        debug!("removing direct left recursion from `{name}`");
        rules = rewrite_group(rules, &name);
    }
}

fn is_left_recursive(rule: &ProductionRule) -> bool {
    rule.kind() == RuleKind::Nonterminal
        && rule
            .symbols
            .first()
            .is_some_and(|s| s.name.eq_ignore_ascii_case(&rule.name))
}

fn rewrite_group(rules: Vec<ProductionRule>, name: &str) -> Vec<ProductionRule> {
    let tail_name = format!("{name}'");
    let mut out = Vec::with_capacity(rules.len() + 2);
    let mut tails = Vec::new();
    for rule in rules {
        if rule.kind() != RuleKind::Nonterminal || !rule.name.eq_ignore_ascii_case(name) {
            out.push(rule);
            continue;
        }
        if is_left_recursive(&rule) {
            let mut symbols: Vec<Symbol> = rule.symbols[1..].to_vec();
            symbols.push(Symbol::reference(&tail_name));
            tails.push(ProductionRule::from_symbols(&tail_name, symbols));
        } else {
            let mut symbols = rule.symbols;
            symbols.push(Symbol::reference(&tail_name));
            out.push(ProductionRule::from_symbols(&rule.name, symbols));
        }
    }
    tails.push(ProductionRule::from_symbols(&tail_name, Vec::new()));
    out.extend(tails);
    out
}

#[cfg(test)]
mod test {
    use super::*;

    fn render(rules: &[ProductionRule]) -> Vec<String> {
        rules.iter().map(|r| r.to_string()).collect()
    }

    #[test]
    fn rewrites_the_textbook_shape() {
        let rules = vec![
            ProductionRule::new("expr", &["expr", "OP:PLUS", "TERM:term"]).unwrap(),
            ProductionRule::new("expr", &["TERM:term"]).unwrap(),
        ];
        let rules = remove_left_recursion(rules);
        assert_eq!(
            render(&rules),
            [
                "expr = TERM:term, expr';",
                "expr' = OP:PLUS, TERM:term, expr';",
                "expr' = ;",
            ]
        );
    }

    #[test]
    fn epsilon_alternative_comes_last() {
        let rules = vec![
            ProductionRule::new("term", &["FACTOR:factor"]).unwrap(),
            ProductionRule::new("term", &["term", "OP:MUL", "FACTOR:factor"]).unwrap(),
            ProductionRule::new("term", &["term", "OP:DIV", "FACTOR:factor"]).unwrap(),
        ];
        let rules = remove_left_recursion(rules);
        let tails: Vec<&ProductionRule> =
            rules.iter().filter(|r| r.name == "term'").collect();
        assert_eq!(tails.len(), 3);
        assert!(tails.last().unwrap().symbols.is_empty());
        assert!(!tails[0].symbols.is_empty());
    }

    #[test]
    fn untouched_rules_keep_their_order() {
        let rules = vec![
            ProductionRule::new("NUMBER", &[r"\d+"]).unwrap(),
            ProductionRule::new("primary", &["NUMBER"]).unwrap(),
        ];
        let rules = remove_left_recursion(rules);
        assert_eq!(render(&rules), [r#"NUMBER = "\d+";"#, "primary = NUMBER;"]);
    }

    #[test]
    fn idempotent_on_eliminated_grammar() {
        let rules = vec![
            ProductionRule::new("expr", &["expr", "OP:PLUS", "TERM:term"]).unwrap(),
            ProductionRule::new("expr", &["TERM:term"]).unwrap(),
        ];
        let once = remove_left_recursion(rules);
        let twice = remove_left_recursion(once.clone());
        assert_eq!(render(&once), render(&twice));
    }

    #[test]
    fn self_only_alternatives_are_dropped() {
        let rules = vec![
            ProductionRule::new("a", &["a"]).unwrap(),
            ProductionRule::new("a", &["WORD"]).unwrap(),
        ];
        let rules = remove_left_recursion(rules);
        assert_eq!(render(&rules), ["a = WORD;"]);
    }
}
