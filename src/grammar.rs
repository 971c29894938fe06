use std::fmt::{self, Display};

use log::debug;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use string_interner::{backend::StringBackend, symbol::SymbolU32, StringInterner};

use crate::error::GrammarError;
use crate::lexer::{compile_pattern, LexRule};
use crate::parser::{Binding, CompiledRule, CompiledSymbol};
use crate::production::{ProductionRule, RuleKind};
use crate::rewrite::remove_left_recursion;

/// Interned id of a lowercased rule/symbol name. All name matching happens on
/// these ids; names are normalized exactly once, at compile time.
pub(crate) type NameId = SymbolU32;

type Names = StringInterner<StringBackend<SymbolU32>>;

/// A compiled grammar: the (left-recursion-free) rule list plus everything
/// precomputed for matching — interned names, the parser-rule index, the
/// ignore set and the lexer rules with their patterns already built.
///
/// A `Grammar` is immutable after compilation and can be shared or cloned
/// freely; every parse call carries its own cursor.
#[derive(Debug, Clone)]
pub struct Grammar {
    pub rules: Vec<ProductionRule>,
    pub(crate) names: Names,
    pub(crate) lexemes: Vec<LexRule>,
    pub(crate) compiled: Vec<CompiledRule>,
    pub(crate) index: FxHashMap<NameId, Vec<usize>>,
    pub(crate) ignore: FxHashSet<NameId>,
}

impl Grammar {
    /// Compiles a rule table into a grammar. Direct left recursion is
    /// rewritten away first (§ `rewrite`); terminal patterns are compiled
    /// eagerly so pattern errors surface here and never at parse time.
    ///
    /// `ignore` names terminal rules whose matches are consumed but never
    /// emitted as tokens (whitespace, comments).
    pub fn from_rules(
        rules: Vec<ProductionRule>,
        ignore: &[&str],
    ) -> Result<Grammar, GrammarError> {
        if rules.is_empty() {
            return Err(GrammarError::Empty);
        }

        // the capitalization convention must be unambiguous per name; checked
        // before the left-recursion rewrite, which matches names
        // case-insensitively and must never see a conflicted group
        let mut kinds: FxHashMap<String, RuleKind> = FxHashMap::default();
        for rule in &rules {
            match kinds.insert(rule.name.to_lowercase(), rule.kind()) {
                Some(previous) if previous != rule.kind() => {
                    return Err(GrammarError::MixedKinds(rule.name.clone()))
                }
                _ => {}
            }
        }
        let rules = remove_left_recursion(rules);

        let mut names = Names::new();
        let mut lexemes = Vec::new();
        let mut compiled = Vec::new();
        let mut index: FxHashMap<NameId, Vec<usize>> = FxHashMap::default();
        for rule in &rules {
            let id = names.get_or_intern(rule.name.to_lowercase());
            match rule.kind() {
                RuleKind::Terminal => {
                    if rule.symbols.len() != 1 {
                        return Err(GrammarError::LexerRuleShape(rule.name.clone()));
                    }
                    let pattern = &rule.symbols[0].name;
                    let regex =
                        compile_pattern(pattern).map_err(|e| GrammarError::Pattern {
                            rule: rule.name.clone(),
                            pattern: pattern.clone(),
                            message: e.to_string(),
                        })?;
                    lexemes.push(LexRule {
                        name: rule.name.clone(),
                        id,
                        regex,
                    });
                }
                RuleKind::Nonterminal => {
                    let compiled_rule = compile_rule(rule, &mut names)?;
                    index.entry(id).or_default().push(compiled.len());
                    compiled.push(compiled_rule);
                }
            }
        }
        let ignore = ignore
            .iter()
            .map(|name| names.get_or_intern(name.to_lowercase()))
            .collect();
        debug!(
            "compiled grammar: {} rules ({} lexer, {} parser)",
            rules.len(),
            lexemes.len(),
            compiled.len()
        );
        Ok(Grammar {
            rules,
            names,
            lexemes,
            compiled,
            index,
            ignore,
        })
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<NameId> {
        self.names.get(name.to_lowercase())
    }
}

fn compile_rule(rule: &ProductionRule, names: &mut Names) -> Result<CompiledRule, GrammarError> {
    let splices = rule
        .symbols
        .iter()
        .filter(|s| s.alias.as_deref() == Some(""))
        .count();
    let named = rule
        .symbols
        .iter()
        .any(|s| matches!(s.alias.as_deref(), Some(alias) if !alias.is_empty()));
    if splices > 0 && named {
        return Err(GrammarError::MixedAliases(rule.name.clone()));
    }

    let mut symbols = Vec::with_capacity(rule.symbols.len());
    for symbol in &rule.symbols {
        let binding = match symbol.alias.as_deref() {
            None => Binding::Discard,
            Some("") => Binding::Splice,
            Some(alias) => Binding::Property(alias.to_string()),
        };
        let list = match &binding {
            Binding::Discard => false,
            Binding::Splice => symbol.many || splices > 1,
            Binding::Property(alias) => {
                symbol.many
                    || rule
                        .symbols
                        .iter()
                        .filter(|s| s.alias.as_deref() == Some(alias.as_str()))
                        .count()
                        > 1
            }
        };
        symbols.push(CompiledSymbol {
            id: names.get_or_intern(symbol.name.to_lowercase()),
            name: symbol.name.clone(),
            binding,
            optional: symbol.optional,
            many: symbol.many,
            list,
        });
    }
    Ok(CompiledRule {
        name: rule.name.clone(),
        symbols,
        splice: splices > 0,
    })
}

impl Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for rule in &self.rules {
            writeln!(f, "{rule}")?;
        }
        Ok(())
    }
}

impl Serialize for Grammar {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(&self)
    }
}
