//! bnfkit - a runtime parser generator: compile a BNF-like grammar, tokenize
//! input against its lexer rules, parse the tokens with backtracking
//! recursive descent, and fold the resulting syntax tree with named visitors.
//!
//! ## The grammar notation
//!
//! ```ebnf
//! (* lexer rules: UPPERCASE name, quoted regex pattern *)
//! NUMBER = "\d+";
//!
//! (* parser rules: lowercase name, comma-separated symbols, | alternation *)
//! sum    = LHS:NUMBER, PLUS!, RHS:NUMBER;
//! ```
//!
//! A rule whose name starts with an uppercase letter is a lexer (terminal)
//! rule; anything else is a parser (nonterminal) rule. Symbols are written
//! `[alias:]name[modifier]` where the modifier is one of `?` (optional), `*`
//! (zero or more), `+` (one or more) or `!` (match but discard). An absent
//! alias stores the value under the symbol's own name; an empty alias (`:name`)
//! splices the value into the parent result.
//!
//! Alternatives for one rule name are tried top to bottom and the first match
//! wins, so declaration order is the only ambiguity resolution. Directly
//! left-recursive rules are rewritten automatically at compile time.
//!
//! ## Example
//!
//! ```rust
//! use bnfkit::{compile_grammar, execute, Visitor};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let grammar = compile_grammar(
//!     r#"
//!     NUMBER = "\d+";
//!     PLUS   = "\+";
//!     sum    = LHS:NUMBER, PLUS!, RHS:NUMBER;
//!     "#,
//!     &[],
//! )?;
//!
//! let tree = grammar.parse("4 + 38", "sum")?.expect("non-empty input");
//!
//! let mut visitor = Visitor::new(0i64);
//! visitor.register("sum", |v, n| {
//!     let lhs: i64 = n.token("LHS").unwrap().text.parse().unwrap();
//!     let rhs: i64 = n.token("RHS").unwrap().text.parse().unwrap();
//!     v.state = lhs + rhs;
//!     Ok(())
//! });
//! assert_eq!(execute(&tree, visitor)?, 42);
//! # Ok(())
//! # }
//! ```

mod bnf;
pub mod error;
pub mod grammar;
mod lexer;
pub mod node;
mod parser;
pub mod production;
mod rewrite;
pub mod symbol;
pub mod token;
mod utils;
pub mod visitor;

pub use error::{GrammarError, LexError, ParseError, VisitError};
pub use grammar::Grammar;
pub use node::{Node, Properties, Value};
pub use production::{ProductionRule, RuleKind};
pub use symbol::Symbol;
pub use token::Token;
pub use visitor::Visitor;

/// Compiles grammar text into a [`Grammar`], with `ignore` naming the
/// terminal rules to drop while tokenizing (whitespace, comments).
///
/// The text is parsed by the engine itself against a built-in grammar of the
/// notation; malformed text surfaces as a [`GrammarError`] naming the
/// offending fragment, and blank text is an error rather than a zero-rule
/// grammar.
///
/// ```rust
/// use bnfkit::compile_grammar;
///
/// let grammar = compile_grammar(r#"WORD = "[a-z]+";"#, &[])?;
/// assert_eq!(grammar.tokenize("hello")?.len(), 1);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn compile_grammar(text: &str, ignore: &[&str]) -> Result<Grammar, GrammarError> {
    bnf::compile_grammar(text, ignore)
}

/// Runs a visitor over a parse tree and hands back the final state.
pub fn execute<S>(node: &Node, mut visitor: Visitor<S>) -> Result<S, VisitError> {
    node.accept(&mut visitor)?;
    Ok(visitor.state)
}

/// Like [`execute`], but maps the final state through `map` first.
pub fn execute_with<S, T>(
    node: &Node,
    visitor: Visitor<S>,
    map: impl FnOnce(S) -> T,
) -> Result<T, VisitError> {
    Ok(map(execute(node, visitor)?))
}
