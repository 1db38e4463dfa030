//! Parser for migo
//!
//! Recursive descent over a single lookahead token with precedence climbing
//! for binary operators. The parser keeps going after errors: failed
//! expressions become [`Expr::Bad`], failed statements become [`Stmt::Bad`],
//! and every error is recorded for the caller. Nesting is bounded by
//! [`ParserConfig::max_depth`]; a statement that goes deeper is recorded as
//! [`SyntaxErrorKind::NestingTooDeep`] and skipped.
//!
//! # Example
//!
//! ```
//! use migo_syntax::parser::Parser;
//! use migo_syntax::config::ParserConfig;
//!
//! let output = Parser::parse_source("fun add(a, b int) int { return a + b }", &ParserConfig::default());
//! assert!(output.errors.is_empty());
//! assert_eq!(output.file.stmts.len(), 1);
//!
//! let expr = Parser::parse_expression("1 + 2 * 3").unwrap();
//! assert_eq!(expr.to_string(), "1 + 2 * 3");
//! ```

mod error;
#[cfg(test)]
mod property_tests;

pub use error::{Expected, Found, SyntaxError, SyntaxErrorKind};

use tracing::debug;

use crate::ast::{
    AssignStmt, BadExpr, BadStmt, BinaryExpr, BranchExpr, BreakStmt, CallExpr, ContinueStmt,
    Expr, ExprStmt, File, Fixity, ForeachStmt, FuncDecl, FuncType, GenDecl, Ident, ImportDecl,
    IndexExpr, LiteralValue, LoopStmt, MatchExpr, MemberSelectExpr, ParenExpr, PatternBlock,
    ReturnStmt, Spanned, Stmt, StmtBlockExpr, StructType, TraitType, Type, TypeAlias, TypeDecl,
    UnaryExpr, UnwrapExpr, ValDecl,
};
use crate::classifier::{Classifier, LexError};
use crate::config::{NewlineMode, ParserConfig};
use crate::lexer::{PosRange, Position, RawScanner, Scanner};
use crate::token::{Token, TokenKind};

/// Result type for parsing operations
pub type ParseResult<T> = Result<T, SyntaxError>;

/// A parsed file together with every error recorded while parsing it
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutput {
    pub file: File,
    pub errors: Vec<SyntaxError>,
}

impl ParseOutput {
    /// Returns true if no errors were recorded
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// The migo parser
pub struct Parser<S> {
    lexer: Classifier<S>,
    errors: Vec<SyntaxError>,
    config: ParserConfig,
    /// End of the last consumed token
    prev_end: Position,
    /// Set by a fatal error or by reaching the error limit
    stopped: bool,
    /// Nested productions currently open
    depth: usize,
}

impl<'source> Parser<Scanner<'source>> {
    /// Parse a complete source file
    #[must_use]
    pub fn parse_source(source: &'source str, config: &ParserConfig) -> ParseOutput {
        let scanner = Scanner::new(source, config.scanner_config());
        let mut parser = Parser::new(scanner, config.clone());
        let file = parser.parse_file();
        ParseOutput {
            file,
            errors: parser.into_errors(),
        }
    }

    /// Parse a single expression; the whole input must be consumed
    pub fn parse_expression(source: &'source str) -> Result<Expr, Vec<SyntaxError>> {
        let config = ParserConfig::default();
        let mut parser = Parser::new(Scanner::new(source, config.scanner_config()), config);
        match parser.complete_expression() {
            Ok(expr) if parser.errors.is_empty() => Ok(expr),
            Ok(_) => Err(parser.into_errors()),
            Err(err) => {
                parser.report(err);
                Err(parser.into_errors())
            }
        }
    }
}

impl<S: RawScanner> Parser<S> {
    /// Create a parser and load the first token
    pub fn new(scanner: S, config: ParserConfig) -> Self {
        let mut parser = Self {
            lexer: Classifier::new(scanner),
            errors: Vec::new(),
            config,
            prev_end: Position::new(0, 1, 1),
            stopped: false,
            depth: 0,
        };
        if let Err(err) = parser.lexer.advance() {
            let err = parser.lex_error(err);
            parser.report(err);
        }
        parser
    }

    /// Parse statements until end of input, a fatal error, or the error limit
    pub fn parse_file(&mut self) -> File {
        let (stmts, _) = self.statement_list(false);
        let end = self.current().range.to.max(self.prev_end);
        debug!(
            statements = stmts.len(),
            errors = self.errors.len(),
            "parsed file"
        );
        File::new(stmts, PosRange::new(Position::new(0, 1, 1), end))
    }

    /// Errors recorded so far
    #[must_use]
    pub fn errors(&self) -> &[SyntaxError] {
        &self.errors
    }

    /// Consume the parser, returning its recorded errors
    #[must_use]
    pub fn into_errors(self) -> Vec<SyntaxError> {
        self.errors
    }

    // ==================== Token Management ====================

    fn current(&self) -> &Token {
        self.lexer.token()
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current().kind == kind
    }

    /// Consume the current token and load the next one
    fn bump(&mut self) -> ParseResult<Token> {
        let token = self.current().clone();
        self.prev_end = token.range.to;
        self.lexer.advance().map_err(|err| self.lex_error(err))?;
        Ok(token)
    }

    fn lex_error(&self, err: LexError) -> SyntaxError {
        let mut err = SyntaxError::from(err);
        if matches!(err.kind, SyntaxErrorKind::EndOfInput) {
            err.range = self.current().range;
        }
        err
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.at(kind) {
            self.bump()
        } else {
            Err(SyntaxError::unexpected(self.current(), Expected::kind(kind)))
        }
    }

    fn expect_ident(&mut self) -> ParseResult<Ident> {
        self.expect(TokenKind::Ident).map(Ident::new)
    }

    fn expect_literal_value(&mut self) -> ParseResult<LiteralValue> {
        if self.current().kind.is_literal() {
            Ok(LiteralValue::new(self.bump()?))
        } else {
            Err(SyntaxError::unexpected(
                self.current(),
                Expected::Kinds(vec![
                    TokenKind::Int,
                    TokenKind::Float,
                    TokenKind::Char,
                    TokenKind::String,
                ]),
            ))
        }
    }

    fn skip_newlines(&mut self) -> ParseResult<()> {
        while self.at(TokenKind::Newline) {
            self.bump()?;
        }
        Ok(())
    }

    /// Skip empty statements
    fn skip_separators(&mut self) -> ParseResult<()> {
        while matches!(self.current().kind, TokenKind::Newline | TokenKind::Semicolon) {
            self.bump()?;
        }
        Ok(())
    }

    /// Require a statement terminator after a complete statement
    fn end_statement(&mut self) -> ParseResult<()> {
        match self.current().kind {
            TokenKind::Semicolon | TokenKind::Newline => self.bump().map(drop),
            TokenKind::RBrace | TokenKind::Eof => Ok(()),
            _ if self.config.newlines == NewlineMode::Whitespace => Ok(()),
            _ => Err(SyntaxError::unexpected(
                self.current(),
                Expected::Kinds(vec![TokenKind::Semicolon, TokenKind::Newline]),
            )),
        }
    }

    // ==================== Errors and Recovery ====================

    fn report(&mut self, err: SyntaxError) {
        if self.stopped {
            return;
        }
        // An illegal token was already reported as an unknown operator
        if let SyntaxErrorKind::UnexpectedNode {
            found: Found::Token(token),
            ..
        } = &err.kind
        {
            if token.kind == TokenKind::Illegal {
                return;
            }
        }
        debug!(at = %err.range.from, error = %err.kind, "syntax error");
        if err.is_fatal() {
            self.stopped = true;
        }
        self.errors.push(err);
        if self.config.error_limit_reached(self.errors.len()) {
            debug!(limit = self.config.max_errors, "error limit reached");
            self.stopped = true;
        }
    }

    /// Consume one token while recovering; unknown operators are recorded
    fn skip(&mut self) -> ParseResult<()> {
        match self.bump() {
            Ok(_) => Ok(()),
            Err(err) if !err.is_fatal() => {
                self.report(err);
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Skip to the end of the broken statement
    ///
    /// Stops after a `;` or newline at nesting depth 0, or at a `}` at depth
    /// 0, which is left for the enclosing block or skipped at file level.
    fn synchronize(&mut self, in_block: bool) -> ParseResult<()> {
        let mut depth = 0usize;
        loop {
            match self.current().kind {
                TokenKind::Eof => return Ok(()),
                TokenKind::Semicolon | TokenKind::Newline if depth == 0 => return self.skip(),
                TokenKind::RBrace if depth == 0 => {
                    return if in_block { Ok(()) } else { self.skip() };
                }
                TokenKind::LParen | TokenKind::LBrack | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBrack | TokenKind::RBrace => {
                    depth = depth.saturating_sub(1);
                }
                _ => {}
            }
            self.skip()?;
        }
    }

    /// Record a failed statement and replace it with a [`Stmt::Bad`]
    fn recover(&mut self, err: SyntaxError, from: Position, in_block: bool) -> Stmt {
        self.report(err);
        if !self.stopped {
            debug!(at = %self.current().range.from, "resynchronising");
            if let Err(err) = self.synchronize(in_block) {
                self.report(err);
            }
        }
        Stmt::Bad(BadStmt {
            range: PosRange::new(from, self.prev_end.max(from)),
        })
    }

    /// Parse an expression, substituting [`Expr::Bad`] for a malformed one
    fn expression_or_bad(&mut self) -> ParseResult<Expr> {
        match self.expression() {
            Ok(expr) => Ok(expr),
            Err(err) if matches!(err.kind, SyntaxErrorKind::UnexpectedNode { .. }) => {
                let range = err.range;
                self.report(err);
                if !self.current().kind.is_terminator() {
                    self.skip()?;
                }
                Ok(Expr::Bad(BadExpr { range }))
            }
            Err(err) => Err(err),
        }
    }

    /// Run a nested production, failing instead once `max_depth` are open
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= self.config.max_depth {
            return Err(SyntaxError::new(
                SyntaxErrorKind::NestingTooDeep {
                    limit: self.config.max_depth,
                },
                self.current().range,
            ));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    // ==================== Statements ====================

    /// Parse statements up to end of input, or up to `}` inside a block
    ///
    /// Inside a block, a final expression statement not followed by `;`
    /// becomes the block's value.
    fn statement_list(&mut self, in_block: bool) -> (Vec<Stmt>, Option<Expr>) {
        let mut stmts = Vec::new();
        loop {
            if let Err(err) = self.skip_separators() {
                self.report(err);
            }
            if self.stopped || self.at(TokenKind::Eof) || (in_block && self.at(TokenKind::RBrace))
            {
                return (stmts, None);
            }

            let from = self.current().range.from;
            let stmt = match self.statement() {
                Ok(stmt) => stmt,
                Err(err) => {
                    let bad = self.recover(err, from, in_block);
                    stmts.push(bad);
                    continue;
                }
            };

            let mut terminated = false;
            if in_block && self.at(TokenKind::Newline) {
                terminated = true;
                if let Err(err) = self.skip_newlines() {
                    self.report(err);
                }
            }
            if in_block && self.at(TokenKind::RBrace) {
                return match stmt {
                    Stmt::Expr(value) => (stmts, Some(value.expr)),
                    other => {
                        stmts.push(other);
                        (stmts, None)
                    }
                };
            }

            stmts.push(stmt);
            if !terminated {
                if let Err(err) = self.end_statement() {
                    let at = self.current().range.from;
                    let bad = self.recover(err, at, in_block);
                    stmts.push(bad);
                }
            }
        }
    }

    fn statement(&mut self) -> ParseResult<Stmt> {
        match self.current().kind {
            TokenKind::Import => self.import_decl(),
            TokenKind::Val | TokenKind::Var => self.val_decl(),
            TokenKind::Type => self.type_decl(),
            TokenKind::Fun => self.func_decl().map(|func| Stmt::Func(Box::new(func))),
            TokenKind::Return => self.return_stmt(),
            TokenKind::Break => {
                let token = self.bump()?;
                Ok(Stmt::Break(BreakStmt { range: token.range }))
            }
            TokenKind::Continue => {
                let token = self.bump()?;
                Ok(Stmt::Continue(ContinueStmt { range: token.range }))
            }
            TokenKind::For => self.for_stmt(),
            _ => self.simple_stmt(),
        }
    }

    fn import_decl(&mut self) -> ParseResult<Stmt> {
        let keyword = self.expect(TokenKind::Import)?;
        let path = LiteralValue::new(self.expect(TokenKind::String)?);
        let mut range = keyword.range.cover(path.range());
        let alias = if self.at(TokenKind::As) {
            self.bump()?;
            let alias = self.expect_ident()?;
            range = range.cover(alias.range());
            Some(alias)
        } else {
            None
        };
        Ok(Stmt::Import(ImportDecl { path, alias, range }))
    }

    /// `val`/`var` declarations, and uninitialised `var a, b T`
    fn val_decl(&mut self) -> ParseResult<Stmt> {
        let keyword = self.bump()?;
        let mutable = keyword.kind == TokenKind::Var;
        let name = self.expect_ident()?;

        if mutable && self.at(TokenKind::Comma) {
            let mut idents = vec![name];
            while self.at(TokenKind::Comma) {
                self.bump()?;
                idents.push(self.expect_ident()?);
            }
            let ty = self.parse_type()?;
            let range = keyword.range.cover(ty.range());
            return Ok(Stmt::Gen(GenDecl { idents, ty, range }));
        }

        let ty = if self.at(TokenKind::Assign) {
            None
        } else {
            Some(self.parse_type()?)
        };
        if mutable && !self.at(TokenKind::Assign) {
            if let Some(ty) = ty {
                let range = keyword.range.cover(ty.range());
                return Ok(Stmt::Gen(GenDecl {
                    idents: vec![name],
                    ty,
                    range,
                }));
            }
        }

        self.expect(TokenKind::Assign)?;
        self.skip_newlines()?;
        let value = self.expression_or_bad()?;
        let range = keyword.range.cover(value.range());
        Ok(Stmt::Val(Box::new(ValDecl {
            name,
            ty,
            value,
            mutable,
            range,
        })))
    }

    fn type_decl(&mut self) -> ParseResult<Stmt> {
        let keyword = self.expect(TokenKind::Type)?;
        let name = self.expect_ident()?;
        let ty = self.parse_type()?;
        let range = keyword.range.cover(ty.range());
        Ok(Stmt::Type(Box::new(TypeDecl { name, ty, range })))
    }

    fn func_decl(&mut self) -> ParseResult<FuncDecl> {
        let keyword = self.expect(TokenKind::Fun)?;
        let name = if self.at(TokenKind::Ident) {
            Some(Ident::new(self.bump()?))
        } else {
            None
        };
        let ty = self.signature(keyword.range)?;
        let body = if self.at(TokenKind::LBrace) {
            Some(self.block()?)
        } else {
            None
        };
        let range = body
            .as_ref()
            .map_or(ty.range, |body| ty.range.cover(body.range));
        Ok(FuncDecl {
            ty,
            name,
            body,
            range,
        })
    }

    fn return_stmt(&mut self) -> ParseResult<Stmt> {
        let keyword = self.expect(TokenKind::Return)?;
        let mut exprs = Vec::new();
        if !self.current().kind.is_terminator() {
            exprs.push(self.expression_or_bad()?);
            while self.at(TokenKind::Comma) {
                self.bump()?;
                self.skip_newlines()?;
                exprs.push(self.expression_or_bad()?);
            }
        }
        let range = exprs
            .last()
            .map_or(keyword.range, |last| keyword.range.cover(last.range()));
        Ok(Stmt::Return(ReturnStmt { exprs, range }))
    }

    /// `for { }`, `for cond { }` and `for a, b in xs { }`
    fn for_stmt(&mut self) -> ParseResult<Stmt> {
        let keyword = self.expect(TokenKind::For)?;
        if self.at(TokenKind::LBrace) {
            let body = self.block()?;
            let range = keyword.range.cover(body.range);
            return Ok(Stmt::Loop(Box::new(LoopStmt {
                cond: None,
                body,
                range,
            })));
        }

        let first = self.expression()?;
        if !matches!(self.current().kind, TokenKind::In | TokenKind::Comma) {
            let body = self.block()?;
            let range = keyword.range.cover(body.range);
            return Ok(Stmt::Loop(Box::new(LoopStmt {
                cond: Some(first),
                body,
                range,
            })));
        }

        let mut idents = vec![loop_variable(first)?];
        while self.at(TokenKind::Comma) {
            self.bump()?;
            idents.push(self.expect_ident()?);
        }
        self.expect(TokenKind::In)?;
        let iterable = self.expression()?;
        let body = self.block()?;
        let range = keyword.range.cover(body.range);
        Ok(Stmt::Foreach(Box::new(ForeachStmt {
            idents,
            iterable,
            body,
            range,
        })))
    }

    /// An expression statement or an assignment
    fn simple_stmt(&mut self) -> ParseResult<Stmt> {
        let target = self.expression()?;
        if !self.current().kind.is_assign_operator() {
            let range = target.range();
            return Ok(Stmt::Expr(ExprStmt {
                expr: target,
                range,
            }));
        }
        let op = self.bump()?;
        self.skip_newlines()?;
        let value = self.expression_or_bad()?;
        let range = target.range().cover(value.range());
        Ok(Stmt::Assign(Box::new(AssignStmt {
            target,
            op,
            value,
            range,
        })))
    }

    fn block(&mut self) -> ParseResult<StmtBlockExpr> {
        self.nested(Self::braced_statements)
    }

    fn braced_statements(&mut self) -> ParseResult<StmtBlockExpr> {
        let open = self.expect(TokenKind::LBrace)?;
        let (stmts, value) = self.statement_list(true);
        let close = self.expect(TokenKind::RBrace)?;
        Ok(StmtBlockExpr::new(
            stmts,
            value,
            open.range.cover(close.range),
        ))
    }

    // ==================== Types ====================

    fn parse_type(&mut self) -> ParseResult<Type> {
        self.nested(Self::type_expr)
    }

    fn type_expr(&mut self) -> ParseResult<Type> {
        match self.current().kind {
            TokenKind::Ident => Ok(Type::Alias(TypeAlias {
                ident: Ident::new(self.bump()?),
            })),
            TokenKind::Struct => self.struct_type().map(Type::Struct),
            TokenKind::Interface => {
                let keyword = self.bump()?;
                self.expect(TokenKind::LBrace)?;
                self.skip_newlines()?;
                let close = self.expect(TokenKind::RBrace)?;
                Ok(Type::Trait(TraitType {
                    range: keyword.range.cover(close.range),
                }))
            }
            TokenKind::Fun => {
                let keyword = self.bump()?;
                let signature = self.signature(keyword.range)?;
                Ok(Type::Func(Box::new(signature)))
            }
            _ => Err(SyntaxError::unexpected(
                self.current(),
                Expected::Description("type"),
            )),
        }
    }

    fn struct_type(&mut self) -> ParseResult<StructType> {
        let keyword = self.expect(TokenKind::Struct)?;
        self.expect(TokenKind::LBrace)?;
        let mut fields = Vec::new();
        loop {
            self.skip_separators()?;
            if self.at(TokenKind::RBrace) {
                break;
            }
            fields.push(self.gen_decl()?);
            if !self.at(TokenKind::RBrace) {
                self.end_statement()?;
            }
        }
        let close = self.expect(TokenKind::RBrace)?;
        Ok(StructType {
            fields,
            range: keyword.range.cover(close.range),
        })
    }

    /// `a, b T`
    fn gen_decl(&mut self) -> ParseResult<GenDecl> {
        let mut idents = vec![self.expect_ident()?];
        while self.at(TokenKind::Comma) {
            self.bump()?;
            self.skip_newlines()?;
            idents.push(self.expect_ident()?);
        }
        let ty = self.parse_type()?;
        let range = idents[0].range().cover(ty.range());
        Ok(GenDecl { idents, ty, range })
    }

    /// Parameter groups and results, after `fun` and an optional name
    fn signature(&mut self, start: PosRange) -> ParseResult<FuncType> {
        self.expect(TokenKind::LParen)?;
        self.skip_newlines()?;
        let mut params = Vec::new();
        while !self.at(TokenKind::RParen) {
            params.push(self.gen_decl()?);
            self.skip_newlines()?;
            if !self.at(TokenKind::Comma) {
                break;
            }
            self.bump()?;
            self.skip_newlines()?;
        }
        let mut end = self.expect(TokenKind::RParen)?.range;

        let results = match self.current().kind {
            TokenKind::LParen => {
                self.bump()?;
                self.skip_newlines()?;
                let mut results = Vec::new();
                while !self.at(TokenKind::RParen) {
                    results.push(self.parse_type()?);
                    self.skip_newlines()?;
                    if !self.at(TokenKind::Comma) {
                        break;
                    }
                    self.bump()?;
                    self.skip_newlines()?;
                }
                end = self.expect(TokenKind::RParen)?.range;
                results
            }
            TokenKind::Ident | TokenKind::Struct | TokenKind::Interface | TokenKind::Fun => {
                let ty = self.parse_type()?;
                end = ty.range();
                vec![ty]
            }
            _ => Vec::new(),
        };

        Ok(FuncType {
            params,
            results,
            range: start.cover(end),
        })
    }

    // ==================== Expressions ====================

    /// An expression followed by end of input
    fn complete_expression(&mut self) -> ParseResult<Expr> {
        self.skip_newlines()?;
        let expr = self.expression()?;
        self.skip_newlines()?;
        if self.at(TokenKind::Eof) {
            Ok(expr)
        } else {
            Err(SyntaxError::unexpected(
                self.current(),
                Expected::kind(TokenKind::Eof),
            ))
        }
    }

    fn expression(&mut self) -> ParseResult<Expr> {
        self.nested(|parser| parser.binary(1))
    }

    /// Precedence climbing; operators of equal precedence associate left
    fn binary(&mut self, min_prec: u8) -> ParseResult<Expr> {
        let mut left = self.unary()?;
        while let Some(prec) = self.current().kind.binary_precedence() {
            if prec < min_prec {
                break;
            }
            let op = self.bump()?;
            self.skip_newlines()?;
            let right = self.binary(prec + 1)?;
            left = Expr::Binary(BinaryExpr::new(op, left, right));
        }
        Ok(left)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if !self.current().kind.is_prefix_operator() {
            return self.postfix();
        }
        let op = self.bump()?;
        let operand = self.nested(Self::unary)?;
        let range = op.range.cover(operand.range());
        Ok(Expr::Unary(UnaryExpr {
            op,
            operand: Box::new(operand),
            fixity: Fixity::Prefix,
            range,
        }))
    }

    fn postfix(&mut self) -> ParseResult<Expr> {
        let mut expr = self.primary()?;
        loop {
            expr = match self.current().kind {
                TokenKind::LParen => {
                    self.bump()?;
                    let args = self.arguments()?;
                    let close = self.expect(TokenKind::RParen)?;
                    let range = expr.range().cover(close.range);
                    Expr::Call(CallExpr {
                        callee: Box::new(expr),
                        args,
                        range,
                    })
                }
                TokenKind::LBrack => {
                    self.bump()?;
                    self.skip_newlines()?;
                    let index = self.expression()?;
                    self.skip_newlines()?;
                    let close = self.expect(TokenKind::RBrack)?;
                    let range = expr.range().cover(close.range);
                    Expr::Index(IndexExpr {
                        base: Box::new(expr),
                        index: Box::new(index),
                        range,
                    })
                }
                TokenKind::Period => {
                    self.bump()?;
                    self.skip_newlines()?;
                    let member = self.expect_ident()?;
                    let range = expr.range().cover(member.range());
                    Expr::MemberSelect(MemberSelectExpr {
                        base: Box::new(expr),
                        member,
                        range,
                    })
                }
                TokenKind::Question => {
                    let op = self.bump()?;
                    let range = expr.range().cover(op.range);
                    Expr::Unwrap(UnwrapExpr {
                        operand: Box::new(expr),
                        range,
                    })
                }
                TokenKind::Inc | TokenKind::Dec => {
                    let op = self.bump()?;
                    let range = expr.range().cover(op.range);
                    Expr::Unary(UnaryExpr {
                        op,
                        operand: Box::new(expr),
                        fixity: Fixity::Postfix,
                        range,
                    })
                }
                _ => return Ok(expr),
            };
        }
    }

    /// Call arguments after `(`, up to but not including `)`
    fn arguments(&mut self) -> ParseResult<Vec<Expr>> {
        let mut args = Vec::new();
        self.skip_newlines()?;
        while !self.at(TokenKind::RParen) {
            args.push(self.expression()?);
            self.skip_newlines()?;
            if !self.at(TokenKind::Comma) {
                break;
            }
            self.bump()?;
            self.skip_newlines()?;
        }
        Ok(args)
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        match self.current().kind {
            TokenKind::Ident => Ok(Expr::Ident(Ident::new(self.bump()?))),
            TokenKind::Int | TokenKind::Float | TokenKind::Char | TokenKind::String => {
                self.expect_literal_value().map(Expr::Literal)
            }
            TokenKind::LParen => {
                let open = self.bump()?;
                self.skip_newlines()?;
                let inner = self.expression()?;
                self.skip_newlines()?;
                let close = self.expect(TokenKind::RParen)?;
                Ok(Expr::Paren(ParenExpr {
                    inner: Box::new(inner),
                    range: open.range.cover(close.range),
                }))
            }
            TokenKind::If => Ok(Expr::Branch(Box::new(self.branch()?))),
            TokenKind::Match => Ok(Expr::Match(Box::new(self.match_expr()?))),
            TokenKind::LBrace => Ok(Expr::Block(Box::new(self.block()?))),
            _ => Err(SyntaxError::unexpected(
                self.current(),
                Expected::Description("expression"),
            )),
        }
    }

    fn branch(&mut self) -> ParseResult<BranchExpr> {
        let keyword = self.expect(TokenKind::If)?;
        let cond = self.expression()?;
        let then = self.block()?;
        let otherwise = if self.at(TokenKind::Else) {
            self.bump()?;
            if self.at(TokenKind::If) {
                let nested = self.branch()?;
                let range = nested.range;
                Some(StmtBlockExpr::new(
                    Vec::new(),
                    Some(Expr::Branch(Box::new(nested))),
                    range,
                ))
            } else {
                Some(self.block()?)
            }
        } else {
            None
        };
        let end = otherwise.as_ref().map_or(then.range, |block| block.range);
        Ok(BranchExpr {
            cond: Box::new(cond),
            then,
            otherwise,
            range: keyword.range.cover(end),
        })
    }

    fn match_expr(&mut self) -> ParseResult<MatchExpr> {
        let keyword = self.expect(TokenKind::Match)?;
        let subject = self.expression()?;
        self.expect(TokenKind::LBrace)?;
        let mut patterns = Vec::new();
        loop {
            self.skip_separators()?;
            let arm_start = self.current().range.from;
            let pattern = match self.current().kind {
                TokenKind::RBrace => break,
                TokenKind::Case => {
                    self.bump()?;
                    Some(self.expression()?)
                }
                TokenKind::Default => {
                    self.bump()?;
                    None
                }
                _ => {
                    return Err(SyntaxError::unexpected(
                        self.current(),
                        Expected::Kinds(vec![
                            TokenKind::Case,
                            TokenKind::Default,
                            TokenKind::RBrace,
                        ]),
                    ))
                }
            };
            let body = self.block()?;
            patterns.push(PatternBlock {
                pattern,
                range: PosRange::new(arm_start, body.range.to),
                body,
            });
        }
        let close = self.expect(TokenKind::RBrace)?;
        Ok(MatchExpr {
            subject: Box::new(subject),
            patterns,
            range: keyword.range.cover(close.range),
        })
    }
}

/// The loop variable of a `for .. in` header must be a plain identifier
fn loop_variable(expr: Expr) -> ParseResult<Ident> {
    match expr {
        Expr::Ident(ident) => Ok(ident),
        other => {
            let range = other.range();
            Err(SyntaxError::new(
                SyntaxErrorKind::UnexpectedNode {
                    found: Found::Node {
                        what: "expression",
                        range,
                    },
                    expected: Expected::Description("loop variable"),
                },
                range,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> ParseOutput {
        Parser::parse_source(source, &ParserConfig::default())
    }

    fn parse_ok(source: &str) -> File {
        let output = parse(source);
        assert!(output.errors.is_empty(), "errors: {:?}", output.errors);
        output.file
    }

    fn parse_expr(source: &str) -> Expr {
        Parser::parse_expression(source).unwrap()
    }

    fn binary(expr: &Expr) -> &BinaryExpr {
        match expr {
            Expr::Binary(binary) => binary,
            other => panic!("expected binary expression, got {other:?}"),
        }
    }

    #[test]
    fn multiplication_binds_tighter() {
        let expr = parse_expr("a + b * c");
        let add = binary(&expr);
        assert_eq!(add.op.kind, TokenKind::Add);
        assert!(matches!(&*add.left, Expr::Ident(ident) if ident.name() == "a"));
        assert_eq!(binary(&add.right).op.kind, TokenKind::Mul);

        let expr = parse_expr("a * b + c");
        let add = binary(&expr);
        assert_eq!(add.op.kind, TokenKind::Add);
        assert_eq!(binary(&add.left).op.kind, TokenKind::Mul);
    }

    #[test]
    fn subtraction_is_left_associative() {
        let expr = parse_expr("a - b - c");
        let outer = binary(&expr);
        assert!(matches!(&*outer.right, Expr::Ident(ident) if ident.name() == "c"));
        let inner = binary(&outer.left);
        assert_eq!(inner.op.kind, TokenKind::Sub);
        assert_eq!(expr.to_string(), "a - b - c");
    }

    #[test]
    fn logical_levels() {
        let expr = parse_expr("a || b && c == d");
        let or = binary(&expr);
        assert_eq!(or.op.kind, TokenKind::LogicalOr);
        let and = binary(&or.right);
        assert_eq!(and.op.kind, TokenKind::LogicalAnd);
        assert_eq!(binary(&and.right).op.kind, TokenKind::Eql);
    }

    #[test]
    fn parentheses_override_precedence() {
        let expr = parse_expr("(a + b) * c");
        assert_eq!(binary(&expr).op.kind, TokenKind::Mul);
        assert_eq!(expr.to_string(), "(a + b) * c");
        assert_eq!(parse_expr("a - (b - c)").to_string(), "a - (b - c)");
    }

    #[test]
    fn prefix_and_postfix() {
        let expr = parse_expr("-x++");
        let Expr::Unary(neg) = &expr else {
            panic!("expected unary, got {expr:?}");
        };
        assert_eq!(neg.fixity, Fixity::Prefix);
        assert!(matches!(&*neg.operand, Expr::Unary(inc) if inc.fixity == Fixity::Postfix));

        assert!(matches!(parse_expr("f(x)?"), Expr::Unwrap(_)));
        assert_eq!(parse_expr("-(-x)").to_string(), "-(-x)");
        assert_eq!(parse_expr("(*p).field").to_string(), "(*p).field");
    }

    #[test]
    fn calls_index_and_members() {
        let expr = parse_expr("a.b(1, 2)[i]");
        let Expr::Index(index) = &expr else {
            panic!("expected index, got {expr:?}");
        };
        let Expr::Call(call) = &*index.base else {
            panic!("expected call");
        };
        assert_eq!(call.args.len(), 2);
        assert!(matches!(&*call.callee, Expr::MemberSelect(select) if select.member.name() == "b"));
        assert_eq!(expr.to_string(), "a.b(1, 2)[i]");
    }

    #[test]
    fn function_declaration() {
        let file = parse_ok("fun add(a, b int) int { return a + b }");
        let [Stmt::Func(func)] = file.stmts.as_slice() else {
            panic!("expected one function, got {:?}", file.stmts);
        };
        assert_eq!(func.name.as_ref().map(Ident::name), Some("add"));
        assert_eq!(func.ty.params.len(), 1);
        let names: Vec<_> = func.ty.params[0].idents.iter().map(Ident::name).collect();
        assert_eq!(names, ["a", "b"]);
        assert!(matches!(&func.ty.params[0].ty, Type::Alias(alias) if alias.ident.name() == "int"));
        assert!(matches!(func.ty.results.as_slice(), [Type::Alias(_)]));

        let body = func.body.as_ref().unwrap();
        assert!(body.value.is_none());
        let [Stmt::Return(ret)] = body.stmts.as_slice() else {
            panic!("expected return, got {:?}", body.stmts);
        };
        assert_eq!(ret.exprs.len(), 1);
        assert_eq!(binary(&ret.exprs[0]).op.kind, TokenKind::Add);
    }

    #[test]
    fn function_without_body() {
        let file = parse_ok("fun pair(x int) (int, string)\nfun(f fun(n int) bool)");
        let [Stmt::Func(first), Stmt::Func(second)] = file.stmts.as_slice() else {
            panic!("expected two functions, got {:?}", file.stmts);
        };
        assert!(first.body.is_none());
        assert_eq!(first.ty.results.len(), 2);
        assert!(second.name.is_none());
        assert!(matches!(&second.ty.params[0].ty, Type::Func(_)));
    }

    #[test]
    fn missing_initializer_recovers() {
        let output = parse("val x = ; val y = 1");
        assert!(!output.errors.is_empty() && output.errors.len() <= 2);
        let y = output.file.stmts.iter().find_map(|stmt| match stmt {
            Stmt::Val(val) if val.name.name() == "y" => Some(val),
            _ => None,
        });
        let y = y.expect("val y should survive");
        assert_eq!(y.value.to_string(), "1");
        assert!(matches!(&output.file.stmts[0], Stmt::Val(x) if x.value.is_bad()));
    }

    #[test]
    fn broken_statement_becomes_bad() {
        let output = parse("val a = 1\nfoo bar\nval b = 2");
        assert_eq!(output.errors.len(), 1);
        let shapes: Vec<_> = output
            .file
            .stmts
            .iter()
            .map(|stmt| match stmt {
                Stmt::Val(_) => "val",
                Stmt::Expr(_) => "expr",
                Stmt::Bad(_) => "bad",
                _ => "other",
            })
            .collect();
        assert_eq!(shapes, ["val", "expr", "bad", "val"]);
    }

    #[test]
    fn block_value() {
        let file = parse_ok("val v = {\n  f()\n  x + 1\n}");
        let [Stmt::Val(val)] = file.stmts.as_slice() else {
            panic!("expected val");
        };
        let Expr::Block(block) = &val.value else {
            panic!("expected block");
        };
        assert_eq!(block.stmts.len(), 1);
        assert_eq!(block.value.as_deref().map(ToString::to_string).as_deref(), Some("x + 1"));
        assert!(block.ty.is_none());

        let file = parse_ok("val v = { x + 1; }");
        let [Stmt::Val(val)] = file.stmts.as_slice() else {
            panic!("expected val");
        };
        assert!(matches!(&val.value, Expr::Block(block) if block.value.is_none() && block.stmts.len() == 1));
    }

    #[test]
    fn else_if_chain() {
        let expr = parse_expr("if a { 1 } else if b { 2 } else { 3 }");
        let Expr::Branch(branch) = &expr else {
            panic!("expected branch");
        };
        let nested = branch
            .otherwise
            .as_ref()
            .and_then(StmtBlockExpr::as_else_if)
            .expect("else if");
        assert!(nested.otherwise.is_some());
        assert_eq!(expr.to_string(), "if a { 1 } else if b { 2 } else { 3 }");
    }

    #[test]
    fn else_on_next_line_is_an_error() {
        let output = parse("if a { 1 }\nelse { 2 }");
        assert!(!output.errors.is_empty());
    }

    #[test]
    fn match_arms() {
        let file = parse_ok("match x {\n  case 1 { a }\n  case 2 { b }\n  default { c }\n}");
        let [Stmt::Expr(stmt)] = file.stmts.as_slice() else {
            panic!("expected expression statement");
        };
        let Expr::Match(matched) = &stmt.expr else {
            panic!("expected match");
        };
        assert_eq!(matched.patterns.len(), 3);
        assert!(matched.patterns[2].pattern.is_none());
    }

    #[test]
    fn loops() {
        let file = parse_ok("for { break }\nfor i < 10 { i++ }\nfor k, v in items { continue }");
        assert!(matches!(&file.stmts[0], Stmt::Loop(lp) if lp.cond.is_none()));
        assert!(matches!(&file.stmts[1], Stmt::Loop(lp) if lp.cond.is_some()));
        let Stmt::Foreach(each) = &file.stmts[2] else {
            panic!("expected foreach");
        };
        let names: Vec<_> = each.idents.iter().map(Ident::name).collect();
        assert_eq!(names, ["k", "v"]);
    }

    #[test]
    fn foreach_needs_identifiers() {
        let output = parse("for a.b in xs { }");
        let [err] = output.errors.as_slice() else {
            panic!("expected one error, got {:?}", output.errors);
        };
        assert!(matches!(
            &err.kind,
            SyntaxErrorKind::UnexpectedNode {
                found: Found::Node { what: "expression", .. },
                ..
            }
        ));
    }

    #[test]
    fn declarations() {
        let file = parse_ok(
            "import \"fmt\" as f\nvar count int = 0\nvar a, b string\ntype Point struct { x, y int; label string }\ntype Any interface {}",
        );
        assert!(matches!(&file.stmts[0], Stmt::Import(import) if import.alias.is_some()));
        assert!(matches!(&file.stmts[1], Stmt::Val(val) if val.mutable && val.ty.is_some()));
        assert!(matches!(&file.stmts[2], Stmt::Gen(gen) if gen.idents.len() == 2));
        assert!(matches!(&file.stmts[3], Stmt::Type(decl) if matches!(&decl.ty, Type::Struct(s) if s.fields.len() == 2)));
        assert!(matches!(&file.stmts[4], Stmt::Type(decl) if matches!(decl.ty, Type::Trait(_))));
    }

    #[test]
    fn interface_members_are_rejected() {
        let output = parse("type T interface { m() }");
        assert_eq!(output.errors.len(), 1);
    }

    #[test]
    fn assignments() {
        let file = parse_ok("x = 1\ny &^= mask\nz.w += f(x)");
        let ops: Vec<_> = file
            .stmts
            .iter()
            .map(|stmt| match stmt {
                Stmt::Assign(assign) => assign.op.kind,
                other => panic!("expected assignment, got {other:?}"),
            })
            .collect();
        assert_eq!(
            ops,
            [TokenKind::Assign, TokenKind::AndNotAssign, TokenKind::AddAssign]
        );
    }

    #[test]
    fn statements_need_terminators() {
        let output = parse("val a = 1 val b = 2");
        assert_eq!(output.errors.len(), 1);

        let config = ParserConfig {
            newlines: NewlineMode::Whitespace,
            ..ParserConfig::default()
        };
        let output = Parser::parse_source("val a = 1 val b = 2", &config);
        assert!(output.is_ok());
        assert_eq!(output.file.stmts.len(), 2);
    }

    #[test]
    fn newlines_after_operators_continue_expressions() {
        let file = parse_ok("val total = a +\n  b\nf(\n  x,\n  y,\n)");
        assert_eq!(file.stmts.len(), 2);
    }

    #[test]
    fn unknown_operator_reported_once() {
        let output = parse("val a = b @ c\nval d = 1");
        let [err] = output.errors.as_slice() else {
            panic!("expected one error, got {:?}", output.errors);
        };
        assert!(matches!(&err.kind, SyntaxErrorKind::UnknownOperator(token) if token.literal == "@"));
        assert!(matches!(output.file.stmts.last(), Some(Stmt::Val(val)) if val.name.name() == "d"));
    }

    #[test]
    fn unspaced_operator_chains() {
        let expr = parse_expr("f(x)?.y");
        let Expr::MemberSelect(select) = &expr else {
            panic!("expected member select, got {expr:?}");
        };
        assert!(matches!(&*select.base, Expr::Unwrap(_)));
        assert_eq!(expr.to_string(), "f(x)?.y");

        let file = parse_ok("x=-1");
        let [Stmt::Assign(assign)] = file.stmts.as_slice() else {
            panic!("expected assignment, got {:?}", file.stmts);
        };
        assert!(matches!(&assign.value, Expr::Unary(neg) if neg.op.kind == TokenKind::Sub));

        let expr = parse_expr("!!ok");
        assert!(matches!(&expr, Expr::Unary(outer) if matches!(&*outer.operand, Expr::Unary(_))));
        assert_eq!(expr.to_string(), "!!ok");
        assert_eq!(parse_expr("- -x").to_string(), "- -x");
    }

    #[test]
    fn parentheses_are_inside_ranges() {
        let expr = parse_expr("(a + b) * c");
        let mul = binary(&expr);
        assert_eq!(mul.range.from.offset, 0);
        let Expr::Paren(paren) = &*mul.left else {
            panic!("expected parenthesised operand");
        };
        assert_eq!((paren.range.from.offset, paren.range.to.offset), (0, 7));
        assert_eq!(paren.inner.range().from.offset, 1);
    }

    #[test]
    fn nesting_limit_is_an_error_not_a_crash() {
        let depth = 200;
        let source = format!(
            "fun f() {{\n{}x = 1\n{}}}\nval after = 1",
            "if a {\n".repeat(depth),
            "}\n".repeat(depth)
        );
        let output = parse(&source);
        let [err] = output.errors.as_slice() else {
            panic!("expected one error, got {:?}", output.errors);
        };
        assert_eq!(
            err.kind,
            SyntaxErrorKind::NestingTooDeep {
                limit: crate::config::DEFAULT_MAX_DEPTH
            }
        );
        assert!(matches!(output.file.stmts.last(), Some(Stmt::Val(val)) if val.name.name() == "after"));

        let source = format!("val x = {}1{}\nval y = 2", "(".repeat(depth), ")".repeat(depth));
        let output = parse(&source);
        assert_eq!(output.errors.len(), 1);
        assert!(matches!(
            output.file.stmts.as_slice(),
            [Stmt::Bad(_), Stmt::Val(val)] if val.name.name() == "y"
        ));

        let config = ParserConfig {
            max_depth: 4,
            ..ParserConfig::default()
        };
        let output = Parser::parse_source("val x = ((((1))))", &config);
        assert!(matches!(
            output.errors.as_slice(),
            [err] if err.kind == SyntaxErrorKind::NestingTooDeep { limit: 4 }
        ));
        assert!(Parser::parse_source("val x = ((1))", &config).is_ok());
    }

    #[test]
    fn scan_errors_stop_the_parse() {
        let output = parse("val a = 1\nval s = \"open\nval b = 2");
        let last = output.errors.last().unwrap();
        assert!(last.is_fatal());
        assert!(matches!(&last.kind, SyntaxErrorKind::Scan(_)));
        assert!(matches!(&output.file.stmts[0], Stmt::Val(_)));
        assert!(!output
            .file
            .stmts
            .iter()
            .any(|stmt| matches!(stmt, Stmt::Val(val) if val.name.name() == "b")));
    }

    #[test]
    fn error_limit() {
        let config = ParserConfig {
            max_errors: 2,
            ..ParserConfig::default()
        };
        let output = Parser::parse_source("a b\nc d\ne f\ng h", &config);
        assert_eq!(output.errors.len(), 2);
    }

    #[test]
    fn ranges_nest() {
        let file = parse_ok("val x = foo(1, 2)");
        let Stmt::Val(val) = &file.stmts[0] else {
            panic!("expected val");
        };
        assert_eq!(val.range.from.offset, 0);
        assert_eq!(val.range.to.offset, 17);
        assert!(val.range.contains(&val.value.range()));
        assert!(file.range.contains(&val.range));
    }

    #[test]
    fn error_display_has_position() {
        let output = parse("val x =\n  )");
        let message = output.errors[0].to_string();
        assert!(message.starts_with("2:3: "), "{message}");
    }
}
