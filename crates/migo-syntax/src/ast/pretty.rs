//! Canonical source printing for AST nodes
//!
//! The output parses back to the same tree: parentheses from the source are
//! [`Expr::Paren`] nodes and print as written, other operands are
//! parenthesised only where precedence demands it, and blocks print on one
//! line with `;` after every statement. File-level statements end with a
//! newline.

use std::fmt::{self, Display, Formatter};

use super::{
    AssignStmt, BranchExpr, Expr, File, Fixity, FuncDecl, FuncType, GenDecl, Ident, ImportDecl,
    LiteralValue, MatchExpr, PatternBlock, Stmt, StmtBlockExpr, Type, ValDecl, POSTFIX_PRECEDENCE,
    PREFIX_PRECEDENCE,
};
use crate::token::{Token, TokenKind};

// ============================================================================
// Helpers
// ============================================================================

fn write_comma_separated<T: Display>(f: &mut Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// An operand that needs parentheses when it binds looser than `min`
struct Operand<'a> {
    expr: &'a Expr,
    min: u8,
}

impl Display for Operand<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.expr.precedence() < self.min {
            write!(f, "({})", self.expr)
        } else {
            write!(f, "{}", self.expr)
        }
    }
}

const fn tight(expr: &Expr) -> Operand<'_> {
    Operand {
        expr,
        min: POSTFIX_PRECEDENCE,
    }
}

/// Prefix operators written back to back must not scan as one mark
/// (`- -x` rather than `--x`)
fn needs_space(op: &Token, operand: &Expr) -> bool {
    match operand {
        Expr::Unary(inner) if inner.fixity == Fixity::Prefix => {
            TokenKind::lookup(&format!("{}{}", op.literal, inner.op.literal)).is_some()
        }
        _ => false,
    }
}

/// Parameter list and results, without the leading `fun`
fn write_signature(f: &mut Formatter<'_>, ty: &FuncType) -> fmt::Result {
    write!(f, "(")?;
    write_comma_separated(f, &ty.params)?;
    write!(f, ")")?;
    match ty.results.as_slice() {
        [] => Ok(()),
        [single] => write!(f, " {single}"),
        many => {
            write!(f, " (")?;
            write_comma_separated(f, many)?;
            write!(f, ")")
        }
    }
}

// ============================================================================
// Leaves and types
// ============================================================================

impl Display for Ident {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Display for LiteralValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text())
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Type::Struct(ty) => {
                if ty.fields.is_empty() {
                    return write!(f, "struct {{}}");
                }
                write!(f, "struct {{ ")?;
                for (i, field) in ty.fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{field}")?;
                }
                write!(f, " }}")
            }
            Type::Trait(_) => write!(f, "interface {{}}"),
            Type::Alias(alias) => write!(f, "{}", alias.ident),
            Type::Func(func) => {
                write!(f, "fun")?;
                write_signature(f, func)
            }
        }
    }
}

impl Display for GenDecl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_comma_separated(f, &self.idents)?;
        write!(f, " {}", self.ty)
    }
}

// ============================================================================
// Expressions
// ============================================================================

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Bad(_) => write!(f, "<bad expression>"),
            Expr::Literal(lit) => write!(f, "{lit}"),
            Expr::Ident(ident) => write!(f, "{ident}"),
            Expr::Unary(unary) => match unary.fixity {
                Fixity::Prefix => {
                    let gap = if needs_space(&unary.op, &unary.operand) { " " } else { "" };
                    let operand = Operand {
                        expr: &unary.operand,
                        min: PREFIX_PRECEDENCE,
                    };
                    write!(f, "{}{gap}{operand}", unary.op.literal)
                }
                Fixity::Postfix => write!(f, "{}{}", tight(&unary.operand), unary.op.literal),
            },
            Expr::Binary(binary) => {
                let prec = self.precedence();
                let left = Operand {
                    expr: &binary.left,
                    min: prec,
                };
                let right = Operand {
                    expr: &binary.right,
                    min: prec + 1,
                };
                write!(f, "{left} {} {right}", binary.op.literal)
            }
            Expr::Call(call) => {
                write!(f, "{}(", tight(&call.callee))?;
                write_comma_separated(f, &call.args)?;
                write!(f, ")")
            }
            Expr::Index(index) => write!(f, "{}[{}]", tight(&index.base), index.index),
            Expr::Cast(cast) => write!(f, "{} as {}", tight(&cast.operand), cast.ty),
            Expr::Branch(branch) => write!(f, "{branch}"),
            Expr::Match(matched) => write!(f, "{matched}"),
            Expr::Unwrap(unwrap) => write!(f, "{}?", tight(&unwrap.operand)),
            Expr::Block(block) => write!(f, "{block}"),
            Expr::MemberSelect(select) => write!(f, "{}.{}", tight(&select.base), select.member),
            Expr::Paren(paren) => write!(f, "({})", paren.inner),
        }
    }
}

impl Display for BranchExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "if {} {}", self.cond, self.then)?;
        match &self.otherwise {
            None => Ok(()),
            Some(block) => match block.as_else_if() {
                Some(nested) => write!(f, " else {nested}"),
                None => write!(f, " else {block}"),
            },
        }
    }
}

impl Display for MatchExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "match {} {{", self.subject)?;
        for pattern in &self.patterns {
            write!(f, " {pattern}")?;
        }
        write!(f, " }}")
    }
}

impl Display for PatternBlock {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.pattern {
            Some(pattern) => write!(f, "case {pattern} {}", self.body),
            None => write!(f, "default {}", self.body),
        }
    }
}

impl Display for StmtBlockExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.stmts.is_empty() && self.value.is_none() {
            return write!(f, "{{}}");
        }
        write!(f, "{{")?;
        for stmt in &self.stmts {
            write!(f, " {stmt};")?;
        }
        if let Some(value) = &self.value {
            write!(f, " {value}")?;
        }
        write!(f, " }}")
    }
}

// ============================================================================
// Statements
// ============================================================================

impl Display for Stmt {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Import(import) => write!(f, "{import}"),
            Stmt::Val(val) => write!(f, "{val}"),
            Stmt::Gen(gen) => write!(f, "var {gen}"),
            Stmt::Func(func) => write!(f, "{func}"),
            Stmt::Type(decl) => write!(f, "type {} {}", decl.name, decl.ty),
            Stmt::Return(ret) => {
                write!(f, "return")?;
                if !ret.exprs.is_empty() {
                    write!(f, " ")?;
                    write_comma_separated(f, &ret.exprs)?;
                }
                Ok(())
            }
            Stmt::Break(_) => write!(f, "break"),
            Stmt::Continue(_) => write!(f, "continue"),
            Stmt::Loop(lp) => match &lp.cond {
                Some(cond) => write!(f, "for {cond} {}", lp.body),
                None => write!(f, "for {}", lp.body),
            },
            Stmt::Foreach(each) => {
                write!(f, "for ")?;
                write_comma_separated(f, &each.idents)?;
                write!(f, " in {} {}", each.iterable, each.body)
            }
            Stmt::Assign(assign) => write!(f, "{assign}"),
            Stmt::Expr(stmt) => write!(f, "{}", stmt.expr),
            Stmt::Bad(_) => write!(f, "<bad statement>"),
        }
    }
}

impl Display for ImportDecl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "import {}", self.path)?;
        if let Some(alias) = &self.alias {
            write!(f, " as {alias}")?;
        }
        Ok(())
    }
}

impl Display for ValDecl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let keyword = if self.mutable { "var" } else { "val" };
        write!(f, "{keyword} {}", self.name)?;
        if let Some(ty) = &self.ty {
            write!(f, " {ty}")?;
        }
        write!(f, " = {}", self.value)
    }
}

impl Display for FuncDecl {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "fun")?;
        if let Some(name) = &self.name {
            write!(f, " {name}")?;
        }
        write_signature(f, &self.ty)?;
        if let Some(body) = &self.body {
            write!(f, " {body}")?;
        }
        Ok(())
    }
}

impl Display for AssignStmt {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.target, self.op.literal, self.value)
    }
}

impl Display for File {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for stmt in &self.stmts {
            writeln!(f, "{stmt}")?;
        }
        Ok(())
    }
}
