//! Statement and declaration AST nodes

use crate::lexer::PosRange;
use crate::token::Token;

use super::{Expr, FuncType, Ident, LiteralValue, Spanned, StmtBlockExpr, Type};

/// A statement
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Import(ImportDecl),
    /// `val x = 1` / `var x int = 1`
    Val(Box<ValDecl>),
    /// `var a, b int`
    Gen(GenDecl),
    Func(Box<FuncDecl>),
    /// `type Name T`
    Type(Box<TypeDecl>),
    Return(ReturnStmt),
    Break(BreakStmt),
    Continue(ContinueStmt),
    /// `for { .. }` / `for cond { .. }`
    Loop(Box<LoopStmt>),
    /// `for a, b in xs { .. }`
    Foreach(Box<ForeachStmt>),
    Assign(Box<AssignStmt>),
    Expr(ExprStmt),
    /// Placeholder for a statement that failed to parse
    Bad(BadStmt),
}

impl Stmt {
    /// Returns true for [`Stmt::Bad`]
    #[must_use]
    pub const fn is_bad(&self) -> bool {
        matches!(self, Self::Bad(_))
    }
}

impl Spanned for Stmt {
    fn range(&self) -> PosRange {
        match self {
            Self::Import(s) => s.range,
            Self::Val(s) => s.range,
            Self::Gen(s) => s.range,
            Self::Func(s) => s.range,
            Self::Type(s) => s.range,
            Self::Return(s) => s.range,
            Self::Break(s) => s.range,
            Self::Continue(s) => s.range,
            Self::Loop(s) => s.range,
            Self::Foreach(s) => s.range,
            Self::Assign(s) => s.range,
            Self::Expr(s) => s.range,
            Self::Bad(s) => s.range,
        }
    }
}

/// `import "path"` with an optional `as name`
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    pub path: LiteralValue,
    pub alias: Option<Ident>,
    pub range: PosRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValDecl {
    pub name: Ident,
    pub ty: Option<Type>,
    pub value: Expr,
    /// Declared with `var` rather than `val`
    pub mutable: bool,
    pub range: PosRange,
}

/// One or more names sharing a type (`a, b int`)
///
/// Used for parameters, struct fields and uninitialised `var` declarations.
/// `idents` is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct GenDecl {
    pub idents: Vec<Ident>,
    pub ty: Type,
    pub range: PosRange,
}

/// A function declaration; without a body it only declares the signature
#[derive(Debug, Clone, PartialEq)]
pub struct FuncDecl {
    pub ty: FuncType,
    pub name: Option<Ident>,
    pub body: Option<StmtBlockExpr>,
    pub range: PosRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub name: Ident,
    pub ty: Type,
    pub range: PosRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub exprs: Vec<Expr>,
    pub range: PosRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreakStmt {
    pub range: PosRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContinueStmt {
    pub range: PosRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoopStmt {
    /// `None` loops forever
    pub cond: Option<Expr>,
    pub body: StmtBlockExpr,
    pub range: PosRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForeachStmt {
    pub idents: Vec<Ident>,
    pub iterable: Expr,
    pub body: StmtBlockExpr,
    pub range: PosRange,
}

/// `target op value` where `op` is `=` or a compound assignment
#[derive(Debug, Clone, PartialEq)]
pub struct AssignStmt {
    pub target: Expr,
    pub op: Token,
    pub value: Expr,
    pub range: PosRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprStmt {
    pub expr: Expr,
    pub range: PosRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BadStmt {
    pub range: PosRange,
}
