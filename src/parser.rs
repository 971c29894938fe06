use log::trace;

use crate::error::ParseError;
use crate::grammar::{Grammar, NameId};
use crate::node::{append_flat, Node, Value};
use crate::token::Token;

/// Where a matched value lands on the parent result, fixed per symbol when
/// the grammar is compiled.
#[derive(Debug, Clone)]
pub(crate) enum Binding {
    Discard,
    Splice,
    Property(String),
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledSymbol {
    pub id: NameId,
    pub name: String,
    pub binding: Binding,
    pub optional: bool,
    pub many: bool,
    /// Sequence-typed slot: the symbol is `many`, or its alias is shared by
    /// another symbol of the same alternative.
    pub list: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct CompiledRule {
    pub name: String,
    pub symbols: Vec<CompiledSymbol>,
    /// True when the alternative's values replace the rule result in place
    /// instead of building a named node.
    pub splice: bool,
}

/// Token cursor threaded through one parse attempt. Backtracking is a plain
/// position save/restore; failures never allocate.
struct Cursor<'a> {
    grammar: &'a Grammar,
    tokens: &'a [Token],
    kinds: &'a [NameId],
    pos: usize,
    high: usize,
    depth: usize,
}

impl<'a> Cursor<'a> {
    fn new(grammar: &'a Grammar, tokens: &'a [Token], kinds: &'a [NameId]) -> Cursor<'a> {
        Cursor {
            grammar,
            tokens,
            kinds,
            pos: 0,
            high: 0,
            depth: 0,
        }
    }

    /// Consumes the next token if its kind matches, advancing the cursor.
    fn try_token(&mut self, id: NameId) -> Option<Token> {
        if self.pos < self.kinds.len() && self.kinds[self.pos] == id {
            let token = self.tokens[self.pos].clone();
            self.pos += 1;
            self.high = self.high.max(self.pos);
            Some(token)
        } else {
            None
        }
    }

    fn at_end(&self) -> bool {
        self.pos == self.tokens.len()
    }
}

/// Accumulates a rule's captured values into either a named node or a bare
/// spliced value, per the rule's compiled bindings.
struct Accumulator<'r> {
    rule: &'r CompiledRule,
    value: Option<Value>,
    node: Option<Node>,
}

impl<'r> Accumulator<'r> {
    fn new(rule: &'r CompiledRule) -> Accumulator<'r> {
        Accumulator {
            rule,
            value: None,
            node: None,
        }
    }

    fn store(&mut self, symbol: &CompiledSymbol, value: Value) {
        match &symbol.binding {
            Binding::Discard => {}
            Binding::Splice => {
                if symbol.list {
                    match self.value.get_or_insert_with(|| Value::Seq(Vec::new())) {
                        Value::Seq(items) => append_flat(items, value),
                        _ => unreachable!("splice slots are uniformly typed per rule"),
                    }
                } else {
                    self.value = Some(value);
                }
            }
            Binding::Property(key) => {
                let node = self
                    .node
                    .get_or_insert_with(|| Node::new(&self.rule.name));
                if symbol.list {
                    append_flat(node.properties.seq_mut(key), value);
                } else {
                    node.properties.insert(key.clone(), value);
                }
            }
        }
    }

    /// `None` when nothing was captured; the parent then records a match
    /// without a value (an optional or fully-discarded expansion).
    fn finish(self) -> Option<Value> {
        if self.rule.splice {
            self.value
        } else {
            self.node.map(Value::Node)
        }
    }
}

impl CompiledRule {
    /// `None` means the alternative did not match and the cursor is back
    /// where it started. `Some(value)` is a match; the value is absent when
    /// the expansion captured nothing.
    fn parse(&self, cx: &mut Cursor) -> Option<Option<Value>> {
        let start = cx.pos;
        cx.depth += 1;
        trace!("{:1$}try {2}", "", cx.depth, self.name);
        let result = self.parse_symbols(cx);
        trace!(
            "{:1$}{3} {2}",
            "",
            cx.depth,
            self.name,
            if result.is_some() { "match" } else { "fail" }
        );
        cx.depth -= 1;
        if result.is_none() {
            cx.pos = start;
        }
        result
    }

    fn parse_symbols(&self, cx: &mut Cursor) -> Option<Option<Value>> {
        let mut acc = Accumulator::new(self);
        for symbol in &self.symbols {
            let mut matched = false;
            loop {
                let save = cx.pos;
                match parse_symbol_once(symbol, cx) {
                    Some(value) => {
                        matched = true;
                        if let Some(value) = value {
                            acc.store(symbol, value);
                        }
                        // a zero-width match must not repeat
                        if !symbol.many || cx.pos == save {
                            break;
                        }
                    }
                    None => {
                        cx.pos = save;
                        break;
                    }
                }
            }
            if !matched && !symbol.optional {
                return None;
            }
        }
        Some(acc.finish())
    }
}

/// One attempt at a symbol: a token of the matching kind is consumed
/// directly; otherwise the name is resolved to parser-rule alternatives,
/// tried in declared order, first match wins. An unresolved name is a plain
/// match failure, not an error.
fn parse_symbol_once(symbol: &CompiledSymbol, cx: &mut Cursor) -> Option<Option<Value>> {
    if let Some(token) = cx.try_token(symbol.id) {
        trace!("{:1$}token {2} `{3}`", "", cx.depth, symbol.name, token.text);
        return Some(match symbol.binding {
            Binding::Discard => None,
            _ => Some(Value::Token(token)),
        });
    }
    let grammar = cx.grammar;
    let indices = grammar.index.get(&symbol.id)?;
    for &ix in indices {
        if let Some(value) = grammar.compiled[ix].parse(cx) {
            return Some(match symbol.binding {
                Binding::Discard => None,
                _ => value,
            });
        }
    }
    None
}

impl Grammar {
    /// Tokenizes `input` and matches it against the alternatives registered
    /// under `root`, in declared order. A candidate wins only if it matches
    /// *and* consumes every token; trailing input rejects it and the next
    /// alternative is tried. Empty input parses to `Ok(None)`.
    pub fn parse(&self, input: &str, root: &str) -> Result<Option<Node>, ParseError> {
        if input.trim().is_empty() {
            return Ok(None);
        }
        let (tokens, kinds) = self.scan(input)?;
        if tokens.is_empty() {
            return Err(ParseError::NoTokens);
        }
        let indices = self
            .lookup(root)
            .and_then(|id| self.index.get(&id))
            .ok_or_else(|| ParseError::UnknownRule(root.to_string()))?;

        let mut furthest = 0;
        for &ix in indices {
            let mut cx = Cursor::new(self, &tokens, &kinds);
            match self.compiled[ix].parse(&mut cx) {
                Some(value) if cx.at_end() => {
                    return match value {
                        Some(Value::Node(node)) => Ok(Some(node)),
                        _ => Err(ParseError::NoTree(root.to_string())),
                    };
                }
                _ => furthest = furthest.max(cx.high),
            }
        }
        let near = match tokens.get(furthest) {
            Some(token) => format!("`{}`", token.text),
            None => "end of input".to_string(),
        };
        Err(ParseError::NoMatch(near))
    }

    /// Like [`parse`](Grammar::parse), but a failure to match is `Ok(None)`
    /// instead of an error. Lexical errors and unknown root rules still fail.
    pub fn try_parse(&self, input: &str, root: &str) -> Result<Option<Node>, ParseError> {
        match self.parse(input, root) {
            Err(ParseError::NoMatch(_)) => Ok(None),
            other => other,
        }
    }
}
