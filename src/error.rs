use thiserror::Error;

/// Raised while building a [`Grammar`](crate::Grammar), either from a rule
/// table or from grammar text. Always fatal; a grammar that fails to compile
/// cannot be retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    #[error("grammar specification is empty")]
    Empty,
    #[error("malformed grammar: {0}")]
    Malformed(String),
    #[error("lexer rule `{0}` must hold exactly one pattern")]
    LexerRuleShape(String),
    #[error("invalid pattern `{pattern}` in rule `{rule}`: {message}")]
    Pattern {
        rule: String,
        pattern: String,
        message: String,
    },
    #[error("rule `{0}` mixes replacing and named aliases in one alternative")]
    MixedAliases(String),
    #[error("`{0}` is declared as both a lexer and a parser rule")]
    MixedKinds(String),
    #[error("invalid symbol literal `{0}`")]
    BadSymbol(String),
}

/// No terminal rule matched the remaining input. The fragment is a bounded
/// preview, never the full remaining text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no lexer rule matches input near `{fragment}`")]
pub struct LexError {
    pub fragment: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error("production rule `{0}` not found")]
    UnknownRule(String),
    #[error("input produced no tokens")]
    NoTokens,
    #[error("input cannot be parsed near {0}")]
    NoMatch(String),
    #[error("root rule `{0}` did not produce a node")]
    NoTree(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VisitError {
    #[error("no visitor registered for `{0}`")]
    Missing(String),
    #[error("unexpected syntax tree shape: {0}")]
    Tree(String),
}
