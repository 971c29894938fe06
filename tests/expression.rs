//! An arithmetic evaluator client: `+ - * /`, unary signs and parentheses,
//! folded left-to-right by a visitor over a stack of intermediate values.

use bnfkit::error::VisitError;
use bnfkit::{compile_grammar, execute_with, Grammar, Node, Visitor};

const GRAMMAR: &str = r#"
(* Lexer rules *)
NUMBER_LITERAL  = "\d+";
PLUS_OP         = "\+";
MINUS_OP        = "\-";
MUL_OP          = "\*";
DIV_OP          = "\/";
LPAREN          = "\(";
RPAREN          = "\)";

(* Parser rules *)
expression      = TERMS:term, TERMS:term_tail*;
term_tail       = OP:PLUS_OP, TERM:term | OP:MINUS_OP, TERM:term;
term            = FACTORS:factor, FACTORS:factor_tail*;
factor_tail     = OP:MUL_OP, FACTOR:factor | OP:DIV_OP, FACTOR:factor;
factor          = VALUE:primary | SIGN:PLUS_OP, VALUE:primary | SIGN:MINUS_OP, VALUE:primary;
primary         = NUMBER:NUMBER_LITERAL | LPAREN!, EXPR:expression, RPAREN!;
"#;

fn tree_err(reason: &str) -> VisitError {
    VisitError::Tree(reason.to_string())
}

fn pop(v: &mut Visitor<Vec<i64>>) -> Result<i64, VisitError> {
    v.state.pop().ok_or_else(|| tree_err("value stack underflow"))
}

fn evaluator() -> Visitor<Vec<i64>> {
    let mut visitor = Visitor::new(Vec::new());

    visitor.register("expression", |v, n| {
        let terms = n.items("TERMS").ok_or_else(|| tree_err("expression without terms"))?;
        let (first, tails) = terms.split_first().ok_or_else(|| tree_err("empty expression"))?;
        first
            .as_node()
            .ok_or_else(|| tree_err("term is not a node"))?
            .accept(v)?;
        let mut sum = pop(v)?;
        for tail in tails {
            let tail = tail.as_node().ok_or_else(|| tree_err("tail is not a node"))?;
            tail.child("TERM")
                .ok_or_else(|| tree_err("tail without a term"))?
                .accept(v)?;
            let term = pop(v)?;
            match tail.token("OP").map(|t| t.kind.as_str()) {
                Some("PLUS_OP") => sum += term,
                Some("MINUS_OP") => sum -= term,
                _ => return Err(tree_err("tail without an operator")),
            }
        }
        v.state.push(sum);
        Ok(())
    });

    visitor.register("term", |v, n| {
        let factors = n.items("FACTORS").ok_or_else(|| tree_err("term without factors"))?;
        let (first, tails) = factors.split_first().ok_or_else(|| tree_err("empty term"))?;
        first
            .as_node()
            .ok_or_else(|| tree_err("factor is not a node"))?
            .accept(v)?;
        let mut product = pop(v)?;
        for tail in tails {
            let tail = tail.as_node().ok_or_else(|| tree_err("tail is not a node"))?;
            tail.child("FACTOR")
                .ok_or_else(|| tree_err("tail without a factor"))?
                .accept(v)?;
            let factor = pop(v)?;
            match tail.token("OP").map(|t| t.kind.as_str()) {
                Some("MUL_OP") => product *= factor,
                Some("DIV_OP") => product /= factor,
                _ => return Err(tree_err("tail without an operator")),
            }
        }
        v.state.push(product);
        Ok(())
    });

    visitor.register("factor", |v, n| {
        n.child("VALUE")
            .ok_or_else(|| tree_err("factor without a value"))?
            .accept(v)?;
        let mut value = pop(v)?;
        if n.token("SIGN").is_some_and(|t| t.kind == "MINUS_OP") {
            value = -value;
        }
        v.state.push(value);
        Ok(())
    });

    visitor.register("primary", |v, n| {
        match n.token("NUMBER") {
            Some(number) => {
                let value: i64 = number
                    .text
                    .parse()
                    .map_err(|_| tree_err("unreadable number literal"))?;
                v.state.push(value);
                Ok(())
            }
            None => n
                .child("EXPR")
                .ok_or_else(|| tree_err("primary without a value"))?
                .accept(v),
        }
    });

    visitor
}

fn eval(grammar: &Grammar, input: &str) -> i64 {
    let tree: Node = grammar.parse(input, "expression").unwrap().unwrap();
    execute_with(&tree, evaluator(), |mut stack| stack.pop().unwrap()).unwrap()
}

#[test]
fn evaluates_arithmetic_left_to_right() {
    let grammar = compile_grammar(GRAMMAR, &[]).unwrap();
    let cases: &[(&str, i64)] = &[
        ("4", 4),
        ("-4", -4),
        ("9+9", 18),
        ("1+2+3+4", 10),
        ("2*3", 6),
        ("1+2*3", 7),
        ("(1+2)*3", 9),
        ("2*-3", -6),
        ("-2*-3", 6),
        ("3*4+5*6", 42),
        ("7-4", 3),
        ("10-3+2", 9),
        ("10-2*3+4*5", 24),
        ("10--2*3+4*5", 36),
        ("10+8/2-2*5", 4),
        ("((((1+7)/(3-1))/2)*(5+2)+(-7+15)-(-2*-4))", 14),
        ("6*2/3", 4),
    ];
    for (input, expected) in cases {
        assert_eq!(eval(&grammar, input), *expected, "input: {input}");
    }
}

#[test]
fn rejects_dangling_operators() {
    let grammar = compile_grammar(GRAMMAR, &[]).unwrap();
    assert!(grammar.parse("1+", "expression").is_err());
    assert!(grammar.parse("(1+2", "expression").is_err());
}

#[test]
fn whitespace_is_insignificant() {
    let grammar = compile_grammar(GRAMMAR, &[]).unwrap();
    assert_eq!(eval(&grammar, " 1 + 2 * 3 "), 7);
}
