//! Parser error types

use thiserror::Error;

use crate::classifier::LexError;
use crate::lexer::{PosRange, ScanError};
use crate::token::{Token, TokenKind};

/// A syntax error with the source range it points at
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub range: PosRange,
}

impl SyntaxError {
    #[must_use]
    pub const fn new(kind: SyntaxErrorKind, range: PosRange) -> Self {
        Self { kind, range }
    }

    /// Error for an unexpected token
    #[must_use]
    pub fn unexpected(found: &Token, expected: Expected) -> Self {
        Self::new(
            SyntaxErrorKind::UnexpectedNode {
                found: Found::Token(found.clone()),
                expected,
            },
            found.range,
        )
    }

    /// Errors that end the parse: the token stream cannot continue
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self.kind,
            SyntaxErrorKind::Scan(_) | SyntaxErrorKind::EndOfInput
        )
    }
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.range.from, self.kind)
    }
}

impl std::error::Error for SyntaxError {}

impl From<LexError> for SyntaxError {
    fn from(err: LexError) -> Self {
        match err {
            LexError::UnknownOperator(token) => {
                let range = token.range;
                Self::new(SyntaxErrorKind::UnknownOperator(token), range)
            }
            LexError::EndOfInput => Self::new(SyntaxErrorKind::EndOfInput, PosRange::default()),
            LexError::Scan(scan) => {
                let range = scan.range();
                Self::new(SyntaxErrorKind::Scan(scan), range)
            }
        }
    }
}

/// The kind of syntax error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyntaxErrorKind {
    #[error("unexpected {found}, expected {expected}")]
    UnexpectedNode { found: Found, expected: Expected },

    #[error("unknown operator `{}`", .0.literal)]
    UnknownOperator(Token),

    #[error("unexpected end of input")]
    EndOfInput,

    /// Blocks, expressions or types nested past the configured limit
    #[error("nesting deeper than {limit} levels")]
    NestingTooDeep { limit: usize },

    #[error(transparent)]
    Scan(ScanError),
}

/// What the parser ran into
#[derive(Debug, Clone, PartialEq)]
pub enum Found {
    Token(Token),
    /// An already parsed node in a position that does not accept it
    Node {
        what: &'static str,
        range: PosRange,
    },
}

impl std::fmt::Display for Found {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Found::Token(token) => write!(f, "{token}"),
            Found::Node { what, .. } => write!(f, "{what}"),
        }
    }
}

/// What the parser would have accepted instead
#[derive(Debug, Clone, PartialEq)]
pub enum Expected {
    Kinds(Vec<TokenKind>),
    Description(&'static str),
}

impl Expected {
    #[must_use]
    pub fn kind(kind: TokenKind) -> Self {
        Self::Kinds(vec![kind])
    }
}

impl std::fmt::Display for Expected {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expected::Kinds(kinds) => match kinds.as_slice() {
                [] => write!(f, "nothing"),
                [kind] => write!(f, "{kind}"),
                [init @ .., last] => {
                    let names: Vec<String> = init.iter().map(ToString::to_string).collect();
                    write!(f, "{} or {last}", names.join(", "))
                }
            },
            Expected::Description(desc) => write!(f, "{desc}"),
        }
    }
}
