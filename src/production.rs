use std::fmt::{self, Display};

use serde::Serialize;

use crate::error::GrammarError;
use crate::symbol::Symbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RuleKind {
    /// Matches raw input text into a token. Holds exactly one pattern symbol.
    Terminal,
    /// Matches a sequence of symbols into a node.
    Nonterminal,
}

/// A named alternative of the grammar. Several rules may share a name; they
/// are tried top to bottom and the first match wins.
///
/// The kind of a rule follows from the case of the first character of its
/// name: uppercase names are lexer (terminal) rules, anything else is a
/// parser (nonterminal) rule. Callers must name rules accordingly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductionRule {
    pub name: String,
    pub symbols: Vec<Symbol>,
}

impl ProductionRule {
    pub fn new(name: &str, symbols: &[&str]) -> Result<ProductionRule, GrammarError> {
        if name.is_empty() {
            return Err(GrammarError::BadSymbol(name.to_string()));
        }
        let kind = kind_of(name);
        if kind == RuleKind::Terminal && symbols.len() != 1 {
            return Err(GrammarError::LexerRuleShape(name.to_string()));
        }
        let symbols = symbols
            .iter()
            .map(|literal| Symbol::parse(literal, kind))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ProductionRule {
            name: name.to_string(),
            symbols,
        })
    }

    /// Builds a rule from already-constructed symbols, bypassing literal
    /// parsing. Used by the left-recursion rewrite.
    pub(crate) fn from_symbols(name: &str, symbols: Vec<Symbol>) -> ProductionRule {
        ProductionRule {
            name: name.to_string(),
            symbols,
        }
    }

    pub fn kind(&self) -> RuleKind {
        kind_of(&self.name)
    }
}

fn kind_of(name: &str) -> RuleKind {
    if name.chars().next().is_some_and(char::is_uppercase) {
        RuleKind::Terminal
    } else {
        RuleKind::Nonterminal
    }
}

impl Display for ProductionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            RuleKind::Terminal => write!(f, "{} = \"{}\";", self.name, self.symbols[0].name),
            RuleKind::Nonterminal => {
                write!(f, "{} = ", self.name)?;
                for (i, symbol) in self.symbols.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{symbol}")?;
                }
                write!(f, ";")
            }
        }
    }
}
