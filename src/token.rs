use serde::Serialize;

/// A terminal match produced by the tokenizer: the lexer rule's name as
/// declared, and the matched substring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: String,
    pub text: String,
}

impl Token {
    pub fn new(kind: impl Into<String>, text: impl Into<String>) -> Self {
        Token {
            kind: kind.into(),
            text: text.into(),
        }
    }
}
