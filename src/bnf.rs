use crate::error::{GrammarError, ParseError, VisitError};
use crate::grammar::Grammar;
use crate::node::Value;
use crate::production::ProductionRule;
use crate::visitor::Visitor;

/// The grammar of the grammar notation itself. The engine parses grammar
/// text with this table and a fixed visitor turns the tree back into
/// production rules — the parser bootstraps its own configuration language.
fn meta_grammar() -> Grammar {
    let lexer: &[(&str, &str)] = &[
        ("COMMENT", r"\(\*.*?\*\)"),
        ("EQ", "="),
        ("COMMA", "[,]"),
        ("COLON", "[:]"),
        ("SEMICOLON", ";"),
        ("MODIFIER", r"[?!+*]"),
        ("OR", r"[|]"),
        ("QUOTEDLITERAL", r#""(?:[^"\\]|\\.)*""#),
        ("IDENTIFIER", "[a-zA-Z][a-zA-Z0-9_]+"),
        ("NEWLINE", r"\n"),
    ];
    let parser: &[(&str, &[&str])] = &[
        ("alias", &[":IDENTIFIER?", ":COLON"]),
        ("symbol", &["ALIAS:alias?", "IDENTIFIER:IDENTIFIER", "MODIFIER:MODIFIER?"]),
        ("first_symbol", &[":symbol"]),
        ("next_symbol", &["COMMA!", ":symbol"]),
        ("sequence", &["SYMBOL:first_symbol", "SYMBOL:next_symbol*"]),
        ("next_alternative", &["OR!", ":sequence"]),
        ("alternatives", &["ALTERNATE:sequence", "ALTERNATE:next_alternative*"]),
        ("rule", &["RULE:IDENTIFIER", "EQ!", "EXPANSION:QUOTEDLITERAL", "SEMICOLON!"]),
        ("rule", &["RULE:IDENTIFIER", "EQ!", "EXPANSION:alternatives", "SEMICOLON!"]),
        ("grammar", &["RULES:rule+"]),
    ];

    let mut rules = Vec::with_capacity(lexer.len() + parser.len());
    for &(name, pattern) in lexer {
        rules.push(ProductionRule::new(name, &[pattern]).expect("bootstrap lexer rule"));
    }
    for &(name, symbols) in parser {
        rules.push(ProductionRule::new(name, symbols).expect("bootstrap parser rule"));
    }
    Grammar::from_rules(rules, &["COMMENT", "NEWLINE"]).expect("the bootstrap grammar compiles")
}

#[derive(Default)]
struct MetaState {
    rules: Vec<ProductionRule>,
    current: String,
}

fn shape(reason: impl Into<String>) -> VisitError {
    VisitError::Tree(reason.into())
}

/// Rebuilds production rules from a parsed grammar tree. A `rule` whose
/// expansion is a single quoted token becomes a lexer rule (quotes
/// stripped); anything else is one parser alternative per `|`-branch, its
/// symbols rendered back into `{alias}{identifier}{modifier}` literals.
fn meta_visitor() -> Visitor<MetaState> {
    let mut visitor = Visitor::new(MetaState::default());

    visitor.register("grammar", |v, n| {
        let rules = n.items("RULES").ok_or_else(|| shape("grammar without rules"))?;
        for item in rules {
            item.as_node()
                .ok_or_else(|| shape("rule entry is not a node"))?
                .accept(v)?;
        }
        Ok(())
    });

    visitor.register("rule", |v, n| {
        let name = n
            .token("RULE")
            .ok_or_else(|| shape("rule without a name"))?
            .text
            .clone();
        match n.get("EXPANSION") {
            Some(Value::Token(literal)) => {
                let pattern = unquote(&literal.text);
                let rule = ProductionRule::new(&name, &[pattern.as_str()])
                    .map_err(|e| shape(e.to_string()))?;
                v.state.rules.push(rule);
                Ok(())
            }
            Some(Value::Node(expansion)) => {
                v.state.current = name;
                expansion.accept(v)
            }
            _ => Err(shape(format!("rule `{name}` has no expansion"))),
        }
    });

    visitor.register("alternatives", |v, n| {
        let branches = n
            .items("ALTERNATE")
            .ok_or_else(|| shape("expansion without branches"))?;
        for item in branches {
            item.as_node()
                .ok_or_else(|| shape("branch is not a node"))?
                .accept(v)?;
        }
        Ok(())
    });

    visitor.register("sequence", |v, n| {
        let symbols = n
            .items("SYMBOL")
            .ok_or_else(|| shape("branch without symbols"))?;
        let mut literals = Vec::with_capacity(symbols.len());
        for item in symbols {
            let symbol = item.as_node().ok_or_else(|| shape("symbol is not a node"))?;
            let alias = match symbol.get("ALIAS") {
                Some(Value::Seq(parts)) => parts
                    .iter()
                    .filter_map(Value::as_token)
                    .map(|t| t.text.as_str())
                    .collect::<String>(),
                _ => String::new(),
            };
            let identifier = &symbol
                .token("IDENTIFIER")
                .ok_or_else(|| shape("symbol without an identifier"))?
                .text;
            let modifier = symbol.token("MODIFIER").map(|t| t.text.as_str()).unwrap_or("");
            literals.push(format!("{alias}{identifier}{modifier}"));
        }
        let literals: Vec<&str> = literals.iter().map(String::as_str).collect();
        let rule = ProductionRule::new(&v.state.current, &literals)
            .map_err(|e| shape(e.to_string()))?;
        v.state.rules.push(rule);
        Ok(())
    });

    visitor
}

fn unquote(text: &str) -> String {
    // QUOTEDLITERAL always carries both quotes
    text[1..text.len() - 1].replace("\\\"", "\"")
}

/// Compiles grammar text into a [`Grammar`]: tokenize and parse the text
/// with the bootstrap grammar, rebuild the rule table from the tree, then
/// compile it like any direct rule table (left-recursion removal included).
pub(crate) fn compile_grammar(text: &str, ignore: &[&str]) -> Result<Grammar, GrammarError> {
    if text.trim().is_empty() {
        return Err(GrammarError::Empty);
    }
    let meta = meta_grammar();
    let tree = match meta.parse(text, "grammar") {
        Ok(Some(tree)) => tree,
        // comment-only text tokenizes to nothing: still an empty grammar
        Ok(None) | Err(ParseError::NoTokens) => return Err(GrammarError::Empty),
        Err(e) => return Err(GrammarError::Malformed(e.to_string())),
    };
    let mut visitor = meta_visitor();
    tree.accept(&mut visitor)
        .map_err(|e| GrammarError::Malformed(e.to_string()))?;
    let rules = visitor.state.rules;
    if rules.is_empty() {
        return Err(GrammarError::Empty);
    }
    Grammar::from_rules(rules, ignore)
}
