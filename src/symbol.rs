use std::fmt::{self, Display};

use serde::Serialize;

use crate::error::GrammarError;
use crate::production::RuleKind;

/// One element of a production rule's right-hand side.
///
/// For parser rules a symbol is written as a grammar literal
/// `[alias(:|=)]name[modifier]`, e.g. `LHV:comparison_operand`, `MODIFIER*`,
/// `COMMA!`. For lexer rules the single symbol holds the raw regex pattern
/// and carries no alias or modifiers.
///
/// The alias decides where a matched value lands on the parent node:
/// * `None` — the value is discarded;
/// * `Some("")` — the value replaces/extends the parent result in place;
/// * `Some(name)` — the value is stored under that property name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Symbol {
    pub name: String,
    pub alias: Option<String>,
    pub optional: bool,
    pub many: bool,
    pub ignore: bool,
}

const MODIFIERS: [char; 4] = ['?', '*', '+', '!'];

impl Symbol {
    /// Parses a grammar literal into a symbol. Lexer rules skip alias and
    /// modifier handling entirely; their literal is the pattern itself.
    pub fn parse(literal: &str, kind: RuleKind) -> Result<Symbol, GrammarError> {
        if kind == RuleKind::Terminal {
            if literal.is_empty() {
                return Err(GrammarError::BadSymbol(literal.to_string()));
            }
            return Ok(Symbol {
                name: literal.to_string(),
                alias: None,
                optional: false,
                many: false,
                ignore: false,
            });
        }

        let (alias, mut name) = match literal.find(&[':', '='][..]) {
            Some(at) => (Some(literal[..at].trim()), literal[at + 1..].trim()),
            None => (None, literal.trim()),
        };

        let mut modifier = None;
        if let Some(last) = name.chars().last() {
            if MODIFIERS.contains(&last) {
                modifier = Some(last);
                name = name[..name.len() - last.len_utf8()].trim_end();
            }
        }
        if name.is_empty() {
            return Err(GrammarError::BadSymbol(literal.to_string()));
        }

        let ignore = modifier == Some('!');
        let alias = if ignore {
            None
        } else {
            // no separator means the value lands under the symbol's own name
            Some(alias.map(str::to_string).unwrap_or_else(|| name.to_string()))
        };
        Ok(Symbol {
            name: name.to_string(),
            alias,
            optional: matches!(modifier, Some('?') | Some('*')),
            many: matches!(modifier, Some('+') | Some('*')),
            ignore,
        })
    }

    /// A plain reference to another rule, stored under its own name. Used by
    /// the left-recursion rewrite to splice in generated tail rules.
    pub(crate) fn reference(name: &str) -> Symbol {
        Symbol {
            name: name.to_string(),
            alias: Some(name.to_string()),
            optional: false,
            many: false,
            ignore: false,
        }
    }

    fn modifier(&self) -> &'static str {
        match (self.many, self.optional, self.ignore) {
            (true, true, _) => "*",
            (true, false, _) => "+",
            (false, true, _) => "?",
            (false, false, true) => "!",
            _ => "",
        }
    }
}

impl Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.alias {
            Some(alias) if *alias == self.name => write!(f, "{}{}", self.name, self.modifier()),
            Some(alias) => write!(f, "{}:{}{}", alias, self.name, self.modifier()),
            None => write!(f, "{}{}", self.name, self.modifier()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn parser_symbol(literal: &str) -> Symbol {
        Symbol::parse(literal, RuleKind::Nonterminal).unwrap()
    }

    #[test]
    fn bare_name_aliases_itself() {
        let s = parser_symbol("NUMBER_LITERAL");
        assert_eq!(s.name, "NUMBER_LITERAL");
        assert_eq!(s.alias.as_deref(), Some("NUMBER_LITERAL"));
        assert!(!s.optional && !s.many && !s.ignore);
    }

    #[test]
    fn named_alias() {
        let s = parser_symbol("LHV:comparison_operand");
        assert_eq!(s.name, "comparison_operand");
        assert_eq!(s.alias.as_deref(), Some("LHV"));
    }

    #[test]
    fn equals_separator() {
        let s = parser_symbol("LHV=comparison_operand");
        assert_eq!(s.name, "comparison_operand");
        assert_eq!(s.alias.as_deref(), Some("LHV"));
    }

    #[test]
    fn empty_alias_means_splice() {
        let s = parser_symbol(":FOO");
        assert_eq!(s.name, "FOO");
        assert_eq!(s.alias.as_deref(), Some(""));
    }

    #[test]
    fn modifiers() {
        let star = parser_symbol("MODIFIER*");
        assert!(star.optional && star.many);
        assert_eq!(star.alias.as_deref(), Some("MODIFIER"));

        let plus = parser_symbol("RULES:rule+");
        assert!(plus.many && !plus.optional);

        let opt = parser_symbol("NOT:NOT?");
        assert!(opt.optional && !opt.many);
    }

    #[test]
    fn ignore_discards_alias() {
        let s = parser_symbol("COMMA!");
        assert_eq!(s.name, "COMMA");
        assert_eq!(s.alias, None);
        assert!(s.ignore);
    }

    #[test]
    fn splice_with_modifier() {
        let s = parser_symbol(":BAR*");
        assert_eq!(s.name, "BAR");
        assert_eq!(s.alias.as_deref(), Some(""));
        assert!(s.optional && s.many);
    }

    #[test]
    fn lexer_symbol_is_raw_pattern() {
        let s = Symbol::parse(r"[?!+*]", RuleKind::Terminal).unwrap();
        assert_eq!(s.name, r"[?!+*]");
        assert_eq!(s.alias, None);
        assert!(!s.optional && !s.many && !s.ignore);
    }

    #[test]
    fn empty_name_is_rejected() {
        assert!(matches!(
            Symbol::parse("X:", RuleKind::Nonterminal),
            Err(GrammarError::BadSymbol(_))
        ));
        assert!(matches!(
            Symbol::parse("", RuleKind::Nonterminal),
            Err(GrammarError::BadSymbol(_))
        ));
    }

    #[test]
    fn display_round_trips() {
        for literal in ["FOO", "LHV:comparison_operand", ":BAR*", "COMMA!", "ITEMS:fb"] {
            assert_eq!(parser_symbol(literal).to_string(), literal);
        }
        // self-aliased symbols render in their bare canonical form
        assert_eq!(parser_symbol("NOT:NOT?").to_string(), "NOT?");
    }
}
