use log::trace;
use regex_lite::{Regex, RegexBuilder};

use crate::error::LexError;
use crate::grammar::Grammar;
use crate::token::Token;
use crate::utils::preview;

/// A lexer rule with its pattern compiled, kept in declared order. Declared
/// order is lexical precedence: the first rule whose pattern matches a
/// non-empty prefix wins, even when a later rule would match more.
#[derive(Debug, Clone)]
pub(crate) struct LexRule {
    pub name: String,
    pub id: crate::grammar::NameId,
    pub regex: Regex,
}

/// Compiles a terminal pattern anchored at the match position. Patterns are
/// case-insensitive and `.` crosses newlines, matching how the original rule
/// text is written (`\bAND\b`, `\(\*.*?\*\)`, ...).
pub(crate) fn compile_pattern(pattern: &str) -> Result<Regex, regex_lite::Error> {
    RegexBuilder::new(&format!("^(?:{pattern})"))
        .case_insensitive(true)
        .dot_matches_new_line(true)
        .build()
}

impl Grammar {
    /// Splits `input` into tokens using the grammar's lexer rules, dropping
    /// matches of ignored kinds. Exhausting the input yields an empty vector;
    /// input no rule can match is a lexical error.
    pub fn tokenize(&self, input: &str) -> Result<Vec<Token>, LexError> {
        Ok(self.scan(input)?.0)
    }

    // One iteration per token, never recursion: stack depth must not scale
    // with input length.
    pub(crate) fn scan(
        &self,
        input: &str,
    ) -> Result<(Vec<Token>, Vec<crate::grammar::NameId>), LexError> {
        let mut rest = input.trim_start();
        let mut tokens = Vec::new();
        let mut kinds = Vec::new();
        while !rest.is_empty() {
            let hit = self
                .lexemes
                .iter()
                .find_map(|lex| {
                    lex.regex
                        .find(rest)
                        .filter(|m| !m.as_str().is_empty())
                        .map(|m| (lex, m.end()))
                });
            let Some((lex, end)) = hit else {
                return Err(LexError {
                    fragment: preview(rest),
                });
            };
            if !self.ignore.contains(&lex.id) {
                trace!("token {} `{}`", lex.name, &rest[..end]);
                tokens.push(Token::new(&lex.name, &rest[..end]));
                kinds.push(lex.id);
            }
            rest = rest[end..].trim_start();
        }
        Ok((tokens, kinds))
    }
}
