//! Abstract Syntax Tree (AST) for migo
//!
//! Three closed node families ([`Type`], [`Expr`], [`Stmt`]) plus the
//! [`File`] root. Every node carries the [`PosRange`] it was parsed from;
//! leaves keep the classified [`Token`] they were built from.

mod expr;
mod pretty;
mod stmt;
mod types;

pub use expr::*;
pub use stmt::*;
pub use types::*;

pub use crate::lexer::PosRange;
use crate::token::{Token, TokenKind};

/// A trait for AST nodes that have associated source location information
pub trait Spanned {
    /// Returns the source range of this node
    fn range(&self) -> PosRange;
}

impl Spanned for Token {
    fn range(&self) -> PosRange {
        self.range
    }
}

/// An identifier
#[derive(Debug, Clone, PartialEq)]
pub struct Ident {
    pub token: Token,
}

impl Ident {
    #[must_use]
    pub const fn new(token: Token) -> Self {
        Self { token }
    }

    /// The identifier text
    #[must_use]
    pub fn name(&self) -> &str {
        &self.token.literal
    }
}

impl Spanned for Ident {
    fn range(&self) -> PosRange {
        self.token.range
    }
}

/// A literal as written in the source (`42`, `0x1F`, `'c'`, `"text"`)
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralValue {
    pub token: Token,
}

impl LiteralValue {
    #[must_use]
    pub const fn new(token: Token) -> Self {
        Self { token }
    }

    /// Which literal kind this is
    #[must_use]
    pub const fn kind(&self) -> TokenKind {
        self.token.kind
    }

    /// The source text, quotes included
    #[must_use]
    pub fn text(&self) -> &str {
        &self.token.literal
    }
}

impl Spanned for LiteralValue {
    fn range(&self) -> PosRange {
        self.token.range
    }
}

/// A parsed source file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct File {
    pub stmts: Vec<Stmt>,
    pub range: PosRange,
}

impl File {
    #[must_use]
    pub const fn new(stmts: Vec<Stmt>, range: PosRange) -> Self {
        Self { stmts, range }
    }
}

impl Spanned for File {
    fn range(&self) -> PosRange {
        self.range
    }
}
