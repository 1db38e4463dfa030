//! Property-based tests for the migo front end
//!
//! 1. **Keyword classification**: every reserved spelling classifies to its
//!    kind and every other identifier stays an identifier
//! 2. **Mark classification**: a mark either names a known kind or fails
//!    with an unknown-operator error
//! 3. **Printing round-trips**: parsing the printed form of a tree gives the
//!    same tree up to positions, and printing it again gives the same text
//! 4. **Parser never panics** on arbitrary or near-valid input, and every
//!    placeholder node comes with at least one error

use proptest::prelude::*;

use crate::ast::{Expr, File, Stmt, StmtBlockExpr};
use crate::classifier::{Classifier, LexError};
use crate::config::ParserConfig;
use crate::lexer::{Scanner, ScannerConfig};
use crate::token::{TokenKind, FIXED_KINDS};

use super::Parser;

// ============================================================================
// Generators
// ============================================================================

const BINARY_OPS: &[&str] = &[
    "*", "/", "%", "<<", ">>", "&", "&^", "+", "-", "|", "^", "==", "!=", "<", "<=", ">", ">=",
    "&&", "||",
];

const PREFIX_OPS: &[&str] = &["+", "-", "!", "^", "*", "&"];

const POSTFIX_OPS: &[&str] = &["++", "--", "?"];

/// Well-formed programs that must survive a print/parse cycle unchanged
const PROGRAMS: &[&str] = &[
    "import \"fmt\"\nimport \"strings\" as str",
    "val x = 1\nvar y int = x + 2",
    "var a, b string",
    "type Point struct { x, y int; label string }",
    "type Any interface {}",
    "type Handler fun(req Request) (Response, error)",
    "fun add(a, b int) int { return a + b }",
    "fun log(msg string)",
    "fun main() {\n  val total = sum(items)\n  total += 1\n  print(total)\n}",
    "for { break }\nfor i < 10 { i++ }\nfor k, v in m { continue }",
    "val r = if a > b { a } else if a == b { 0 } else { b }",
    "val kind = match n {\n  case 0 { \"zero\" }\n  default { \"many\" }\n}",
    "val v = { f(); g()? }",
    "x[i].y = -z.w * (p + q)",
];

fn identifier() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_]{0,6}".prop_filter("reserved word", |s| TokenKind::lookup(s).is_none())
}

fn leaf() -> impl Strategy<Value = String> {
    prop_oneof![
        identifier(),
        "[0-9]{1,4}",
        "[0-9]{1,2}\\.[0-9]{1,2}",
        "[a-z ]{0,5}".prop_map(|s| format!("\"{s}\"")),
        "[a-z]".prop_map(|s| format!("'{s}'")),
    ]
}

/// Expression source text, parenthesised freely
fn expression() -> impl Strategy<Value = String> {
    leaf().prop_recursive(4, 48, 3, |inner| {
        prop_oneof![
            (inner.clone(), prop::sample::select(BINARY_OPS), inner.clone())
                .prop_map(|(l, op, r)| format!("{l} {op} {r}")),
            inner.clone().prop_map(|e| format!("({e})")),
            (prop::sample::select(PREFIX_OPS), inner.clone())
                .prop_map(|(op, e)| format!("{op}({e})")),
            (prop::sample::select(PREFIX_OPS), identifier())
                .prop_map(|(op, name)| format!("{op}{name}")),
            (inner.clone(), prop::sample::select(POSTFIX_OPS))
                .prop_map(|(e, op)| format!("({e}){op}")),
            (identifier(), prop::collection::vec(inner.clone(), 0..3))
                .prop_map(|(name, args)| format!("{name}({})", args.join(", "))),
            (inner.clone(), inner.clone()).prop_map(|(b, i)| format!("({b})[{i}]")),
            (inner.clone(), identifier()).prop_map(|(b, m)| format!("({b}).{m}")),
            (inner.clone(), inner.clone(), inner.clone())
                .prop_map(|(c, t, e)| format!("if {c} {{ {t} }} else {{ {e} }}")),
            inner.clone().prop_map(|e| format!("{{ {e} }}")),
            (inner.clone(), inner.clone(), inner)
                .prop_map(|(s, a, b)| format!("match {s} {{ case {a} {{ {b} }} default {{}} }}")),
        ]
    })
}

fn fragment() -> impl Strategy<Value = String> {
    prop::sample::select(PROGRAMS).prop_map(ToString::to_string)
}

/// Valid programs, truncated or glued together
fn near_valid_source() -> impl Strategy<Value = String> {
    prop_oneof![
        fragment(),
        (fragment(), any::<prop::sample::Index>()).prop_map(|(s, cut)| {
            let keep = cut.index(s.chars().count() + 1);
            s.chars().take(keep).collect()
        }),
        (fragment(), fragment()).prop_map(|(a, b)| format!("{a}\n{b}")),
        (fragment(), fragment()).prop_map(|(a, b)| format!("{a} {b}")),
    ]
}

// ============================================================================
// Helpers
// ============================================================================

/// Debug dump of a tree with every `Position` blanked out
fn shape(tree: &impl std::fmt::Debug) -> String {
    let dump = format!("{tree:?}");
    let mut out = String::with_capacity(dump.len());
    let mut rest = dump.as_str();
    while let Some(at) = rest.find("Position {") {
        out.push_str(&rest[..at]);
        out.push_str("Position");
        let after = &rest[at..];
        let close = after.find('}').map_or(after.len(), |i| i + 1);
        rest = &after[close..];
    }
    out.push_str(rest);
    out
}

fn classify_one(text: &str) -> Result<TokenKind, LexError> {
    let mut classifier = Classifier::new(Scanner::new(text, ScannerConfig::default()));
    classifier.advance()?;
    Ok(classifier.token().kind)
}

fn parse_expression(source: &str) -> Expr {
    match Parser::parse_expression(source) {
        Ok(expr) => expr,
        Err(errors) => panic!("{source:?} failed to parse: {errors:?}"),
    }
}

fn parse_file(source: &str) -> File {
    let output = Parser::parse_source(source, &ParserConfig::default());
    assert!(output.is_ok(), "{source:?} failed to parse: {:?}", output.errors);
    output.file
}

fn file_has_bad(file: &File) -> bool {
    file.stmts.iter().any(stmt_has_bad)
}

fn stmt_has_bad(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Bad(_) => true,
        Stmt::Val(val) => expr_has_bad(&val.value),
        Stmt::Func(func) => func.body.as_ref().is_some_and(block_has_bad),
        Stmt::Return(ret) => ret.exprs.iter().any(expr_has_bad),
        Stmt::Loop(lp) => lp.cond.as_ref().is_some_and(expr_has_bad) || block_has_bad(&lp.body),
        Stmt::Foreach(each) => expr_has_bad(&each.iterable) || block_has_bad(&each.body),
        Stmt::Assign(assign) => expr_has_bad(&assign.target) || expr_has_bad(&assign.value),
        Stmt::Expr(stmt) => expr_has_bad(&stmt.expr),
        Stmt::Import(_) | Stmt::Gen(_) | Stmt::Type(_) | Stmt::Break(_) | Stmt::Continue(_) => {
            false
        }
    }
}

fn block_has_bad(block: &StmtBlockExpr) -> bool {
    block.stmts.iter().any(stmt_has_bad) || block.value.as_deref().is_some_and(expr_has_bad)
}

fn expr_has_bad(expr: &Expr) -> bool {
    match expr {
        Expr::Bad(_) => true,
        Expr::Literal(_) | Expr::Ident(_) => false,
        Expr::Unary(unary) => expr_has_bad(&unary.operand),
        Expr::Binary(binary) => expr_has_bad(&binary.left) || expr_has_bad(&binary.right),
        Expr::Call(call) => expr_has_bad(&call.callee) || call.args.iter().any(expr_has_bad),
        Expr::Index(index) => expr_has_bad(&index.base) || expr_has_bad(&index.index),
        Expr::Cast(cast) => expr_has_bad(&cast.operand),
        Expr::Branch(branch) => {
            expr_has_bad(&branch.cond)
                || block_has_bad(&branch.then)
                || branch.otherwise.as_ref().is_some_and(block_has_bad)
        }
        Expr::Match(matched) => {
            expr_has_bad(&matched.subject)
                || matched.patterns.iter().any(|arm| {
                    arm.pattern.as_ref().is_some_and(expr_has_bad) || block_has_bad(&arm.body)
                })
        }
        Expr::Unwrap(unwrap) => expr_has_bad(&unwrap.operand),
        Expr::Block(block) => block_has_bad(block),
        Expr::MemberSelect(select) => expr_has_bad(&select.base),
        Expr::Paren(paren) => expr_has_bad(&paren.inner),
    }
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Property 1: reserved spellings classify to their own kind
    #[test]
    fn reserved_words_classify(kind in prop::sample::select(FIXED_KINDS).prop_filter("word", |k| k.is_reserved_word())) {
        let text = kind.literal().unwrap();
        prop_assert_eq!(classify_one(text).unwrap(), kind);
    }

    /// Property 1b: any other identifier text stays an identifier
    #[test]
    fn other_words_are_identifiers(text in "[a-zA-Z_][a-zA-Z0-9_]{0,10}") {
        let expected = TokenKind::lookup(&text)
            .filter(|kind| kind.is_reserved_word())
            .unwrap_or(TokenKind::Ident);
        prop_assert_eq!(classify_one(&text).unwrap(), expected);
    }

    /// Property 2: a mark run yields its longest known prefix, or fails whole
    #[test]
    fn marks_classify_or_fail(text in "[+\\-*%&|^<>=!.:?~@#$]{1,4}") {
        let longest = (1..=text.len()).rev().find_map(|len| TokenKind::lookup(&text[..len]));
        match (longest, classify_one(&text)) {
            (Some(kind), Ok(found)) => prop_assert_eq!(found, kind),
            (None, Err(LexError::UnknownOperator(token))) => prop_assert_eq!(token.literal, text),
            (known, result) => prop_assert!(false, "{:?}: table says {:?}, classifier says {:?}", text, known, result),
        }
    }

    /// Property 3: a printed expression parses back to the same tree
    #[test]
    fn expression_printing_round_trips(source in expression()) {
        let first = parse_expression(&source);
        let printed = first.to_string();
        let second = parse_expression(&printed);
        prop_assert_eq!(shape(&first), shape(&second));
        prop_assert_eq!(printed, second.to_string());
    }

    /// Property 3b: the same holds for whole programs
    #[test]
    fn program_printing_round_trips(source in fragment()) {
        let first = parse_file(&source);
        let printed = first.to_string();
        let second = parse_file(&printed);
        prop_assert_eq!(shape(&first), shape(&second));
        prop_assert_eq!(printed, second.to_string());
    }

    /// Property 4: the parser never panics on arbitrary text
    #[test]
    fn parser_never_panics(input in "\\PC{0,200}") {
        let output = Parser::parse_source(&input, &ParserConfig::default());
        if file_has_bad(&output.file) {
            prop_assert!(!output.errors.is_empty());
        }
    }

    /// Property 4b: nor on near-valid programs
    #[test]
    fn parser_never_panics_near_valid(input in near_valid_source()) {
        let output = Parser::parse_source(&input, &ParserConfig::default());
        if file_has_bad(&output.file) {
            prop_assert!(!output.errors.is_empty());
        }
        for err in &output.errors {
            prop_assert!(err.range.to.offset as usize <= input.len());
        }
    }
}
