//! Expression AST nodes

use crate::lexer::PosRange;
use crate::token::Token;

use super::{Ident, LiteralValue, Spanned, Stmt, Type};

/// Binding power of prefix operators, above every binary level
pub const PREFIX_PRECEDENCE: u8 = 6;
/// Binding power of postfix operators and primaries
pub const POSTFIX_PRECEDENCE: u8 = 7;

/// An expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Placeholder for an expression that failed to parse
    Bad(BadExpr),
    Literal(LiteralValue),
    Ident(Ident),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    Call(CallExpr),
    Index(IndexExpr),
    Cast(Box<CastExpr>),
    /// `if cond { .. } else { .. }`
    Branch(Box<BranchExpr>),
    Match(Box<MatchExpr>),
    /// `operand?`
    Unwrap(UnwrapExpr),
    Block(Box<StmtBlockExpr>),
    /// `base.member`
    MemberSelect(MemberSelectExpr),
    /// `(inner)`, kept so the parentheses stay inside a node's range
    Paren(ParenExpr),
}

impl Expr {
    /// Returns true for [`Expr::Bad`]
    #[must_use]
    pub const fn is_bad(&self) -> bool {
        matches!(self, Self::Bad(_))
    }

    /// How tightly this expression binds when printed next to an operator
    #[must_use]
    pub fn precedence(&self) -> u8 {
        match self {
            Self::Binary(binary) => binary.op.kind.binary_precedence().unwrap_or(1),
            Self::Unary(unary) if unary.fixity == Fixity::Prefix => PREFIX_PRECEDENCE,
            _ => POSTFIX_PRECEDENCE,
        }
    }
}

impl Spanned for Expr {
    fn range(&self) -> PosRange {
        match self {
            Self::Bad(e) => e.range,
            Self::Literal(e) => e.range(),
            Self::Ident(e) => e.range(),
            Self::Unary(e) => e.range,
            Self::Binary(e) => e.range,
            Self::Call(e) => e.range,
            Self::Index(e) => e.range,
            Self::Cast(e) => e.range,
            Self::Branch(e) => e.range,
            Self::Match(e) => e.range,
            Self::Unwrap(e) => e.range,
            Self::Block(e) => e.range,
            Self::MemberSelect(e) => e.range,
            Self::Paren(e) => e.range,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BadExpr {
    pub range: PosRange,
}

/// Whether a unary operator is written before or after its operand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fixity {
    Prefix,
    Postfix,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub op: Token,
    pub operand: Box<Expr>,
    pub fixity: Fixity,
    pub range: PosRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub op: Token,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub range: PosRange,
}

impl BinaryExpr {
    #[must_use]
    pub fn new(op: Token, left: Expr, right: Expr) -> Self {
        let range = left.range().cover(right.range());
        Self {
            op,
            left: Box::new(left),
            right: Box::new(right),
            range,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CallExpr {
    pub callee: Box<Expr>,
    pub args: Vec<Expr>,
    pub range: PosRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexExpr {
    pub base: Box<Expr>,
    pub index: Box<Expr>,
    pub range: PosRange,
}

/// A type conversion
// TODO: no syntax produces this yet; `as` needs a precedence slot first
#[derive(Debug, Clone, PartialEq)]
pub struct CastExpr {
    pub operand: Box<Expr>,
    pub ty: Type,
    pub range: PosRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BranchExpr {
    pub cond: Box<Expr>,
    pub then: StmtBlockExpr,
    /// `else if` is an else block whose only content is the nested branch
    pub otherwise: Option<StmtBlockExpr>,
    pub range: PosRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchExpr {
    pub subject: Box<Expr>,
    pub patterns: Vec<PatternBlock>,
    pub range: PosRange,
}

/// One arm of a match: `case pattern { .. }`, or `default { .. }` when
/// `pattern` is `None`
#[derive(Debug, Clone, PartialEq)]
pub struct PatternBlock {
    pub pattern: Option<Expr>,
    pub body: StmtBlockExpr,
    pub range: PosRange,
}

impl Spanned for PatternBlock {
    fn range(&self) -> PosRange {
        self.range
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnwrapExpr {
    pub operand: Box<Expr>,
    pub range: PosRange,
}

/// A braced block of statements with an optional trailing value
#[derive(Debug, Clone, PartialEq)]
pub struct StmtBlockExpr {
    /// Type of `value`; filled in by the type checker, never by the parser
    pub ty: Option<Type>,
    pub stmts: Vec<Stmt>,
    pub value: Option<Box<Expr>>,
    pub range: PosRange,
}

impl StmtBlockExpr {
    #[must_use]
    pub fn new(stmts: Vec<Stmt>, value: Option<Expr>, range: PosRange) -> Self {
        Self {
            ty: None,
            stmts,
            value: value.map(Box::new),
            range,
        }
    }

    /// The nested branch of an `else if`, if this block is one
    #[must_use]
    pub fn as_else_if(&self) -> Option<&BranchExpr> {
        match (self.stmts.is_empty(), self.value.as_deref()) {
            (true, Some(Expr::Branch(branch))) => Some(branch.as_ref()),
            _ => None,
        }
    }
}

impl Spanned for StmtBlockExpr {
    fn range(&self) -> PosRange {
        self.range
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberSelectExpr {
    pub base: Box<Expr>,
    pub member: Ident,
    pub range: PosRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParenExpr {
    pub inner: Box<Expr>,
    pub range: PosRange,
}
