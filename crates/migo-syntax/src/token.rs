//! Token kinds and the tables derived from them

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::lexer::PosRange;

/// The broad category a [`TokenKind`] belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenBand {
    Special,
    Literal,
    Operator,
    Keyword,
    Delimiter,
}

/// Every lexical category of the language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // ========== Special ==========
    Illegal,
    Ident,
    Eof,

    // ========== Literals ==========
    Int,
    Float,
    Char,
    String,

    // ========== Operators ==========
    Add,
    Sub,
    Mul,
    Quo,
    Rem,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    AndNot,
    Period,
    LogicalAnd,
    LogicalOr,
    Eql,
    Neq,
    Leq,
    Geq,
    Lss,
    Gtr,
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    QuoAssign,
    RemAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    ShlAssign,
    ShrAssign,
    AndNotAssign,
    Not,
    Ellipsis,
    Inc,
    Dec,
    Question,
    As,
    In,

    // ========== Keywords ==========
    Break,
    Case,
    Chan,
    Const,
    Continue,
    Default,
    Defer,
    Else,
    Fallthrough,
    For,
    Fun,
    Go,
    Goto,
    If,
    Import,
    Interface,
    Map,
    Match,
    Package,
    Range,
    Return,
    Switch,
    Select,
    Struct,
    Type,
    Var,
    Val,

    // ========== Delimiters ==========
    LParen,
    LBrack,
    LBrace,
    Comma,
    RParen,
    RBrack,
    RBrace,
    Semicolon,
    Colon,
    Newline,
}

/// Every kind with a fixed spelling, in declaration order
pub const FIXED_KINDS: &[TokenKind] = &[
    TokenKind::Add,
    TokenKind::Sub,
    TokenKind::Mul,
    TokenKind::Quo,
    TokenKind::Rem,
    TokenKind::And,
    TokenKind::Or,
    TokenKind::Xor,
    TokenKind::Shl,
    TokenKind::Shr,
    TokenKind::AndNot,
    TokenKind::Period,
    TokenKind::LogicalAnd,
    TokenKind::LogicalOr,
    TokenKind::Eql,
    TokenKind::Neq,
    TokenKind::Leq,
    TokenKind::Geq,
    TokenKind::Lss,
    TokenKind::Gtr,
    TokenKind::Assign,
    TokenKind::AddAssign,
    TokenKind::SubAssign,
    TokenKind::MulAssign,
    TokenKind::QuoAssign,
    TokenKind::RemAssign,
    TokenKind::AndAssign,
    TokenKind::OrAssign,
    TokenKind::XorAssign,
    TokenKind::ShlAssign,
    TokenKind::ShrAssign,
    TokenKind::AndNotAssign,
    TokenKind::Not,
    TokenKind::Ellipsis,
    TokenKind::Inc,
    TokenKind::Dec,
    TokenKind::Question,
    TokenKind::As,
    TokenKind::In,
    TokenKind::Break,
    TokenKind::Case,
    TokenKind::Chan,
    TokenKind::Const,
    TokenKind::Continue,
    TokenKind::Default,
    TokenKind::Defer,
    TokenKind::Else,
    TokenKind::Fallthrough,
    TokenKind::For,
    TokenKind::Fun,
    TokenKind::Go,
    TokenKind::Goto,
    TokenKind::If,
    TokenKind::Import,
    TokenKind::Interface,
    TokenKind::Map,
    TokenKind::Match,
    TokenKind::Package,
    TokenKind::Range,
    TokenKind::Return,
    TokenKind::Switch,
    TokenKind::Select,
    TokenKind::Struct,
    TokenKind::Type,
    TokenKind::Var,
    TokenKind::Val,
    TokenKind::LParen,
    TokenKind::LBrack,
    TokenKind::LBrace,
    TokenKind::Comma,
    TokenKind::RParen,
    TokenKind::RBrack,
    TokenKind::RBrace,
    TokenKind::Semicolon,
    TokenKind::Colon,
    TokenKind::Newline,
];

impl TokenKind {
    /// The band this kind belongs to
    #[must_use]
    pub const fn band(self) -> TokenBand {
        match self {
            Self::Illegal | Self::Ident | Self::Eof => TokenBand::Special,
            Self::Int | Self::Float | Self::Char | Self::String => TokenBand::Literal,
            Self::Add
            | Self::Sub
            | Self::Mul
            | Self::Quo
            | Self::Rem
            | Self::And
            | Self::Or
            | Self::Xor
            | Self::Shl
            | Self::Shr
            | Self::AndNot
            | Self::Period
            | Self::LogicalAnd
            | Self::LogicalOr
            | Self::Eql
            | Self::Neq
            | Self::Leq
            | Self::Geq
            | Self::Lss
            | Self::Gtr
            | Self::Assign
            | Self::AddAssign
            | Self::SubAssign
            | Self::MulAssign
            | Self::QuoAssign
            | Self::RemAssign
            | Self::AndAssign
            | Self::OrAssign
            | Self::XorAssign
            | Self::ShlAssign
            | Self::ShrAssign
            | Self::AndNotAssign
            | Self::Not
            | Self::Ellipsis
            | Self::Inc
            | Self::Dec
            | Self::Question
            | Self::As
            | Self::In => TokenBand::Operator,
            Self::Break
            | Self::Case
            | Self::Chan
            | Self::Const
            | Self::Continue
            | Self::Default
            | Self::Defer
            | Self::Else
            | Self::Fallthrough
            | Self::For
            | Self::Fun
            | Self::Go
            | Self::Goto
            | Self::If
            | Self::Import
            | Self::Interface
            | Self::Map
            | Self::Match
            | Self::Package
            | Self::Range
            | Self::Return
            | Self::Switch
            | Self::Select
            | Self::Struct
            | Self::Type
            | Self::Var
            | Self::Val => TokenBand::Keyword,
            Self::LParen
            | Self::LBrack
            | Self::LBrace
            | Self::Comma
            | Self::RParen
            | Self::RBrack
            | Self::RBrace
            | Self::Semicolon
            | Self::Colon
            | Self::Newline => TokenBand::Delimiter,
        }
    }

    /// The fixed spelling of this kind, if it has one
    #[must_use]
    #[allow(clippy::too_many_lines)] // One arm per spelling
    pub const fn literal(self) -> Option<&'static str> {
        let text = match self {
            Self::Illegal
            | Self::Ident
            | Self::Eof
            | Self::Int
            | Self::Float
            | Self::Char
            | Self::String => return None,
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Quo => "/",
            Self::Rem => "%",
            Self::And => "&",
            Self::Or => "|",
            Self::Xor => "^",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::AndNot => "&^",
            Self::Period => ".",
            Self::LogicalAnd => "&&",
            Self::LogicalOr => "||",
            Self::Eql => "==",
            Self::Neq => "!=",
            Self::Leq => "<=",
            Self::Geq => ">=",
            Self::Lss => "<",
            Self::Gtr => ">",
            Self::Assign => "=",
            Self::AddAssign => "+=",
            Self::SubAssign => "-=",
            Self::MulAssign => "*=",
            Self::QuoAssign => "/=",
            Self::RemAssign => "%=",
            Self::AndAssign => "&=",
            Self::OrAssign => "|=",
            Self::XorAssign => "^=",
            Self::ShlAssign => "<<=",
            Self::ShrAssign => ">>=",
            Self::AndNotAssign => "&^=",
            Self::Not => "!",
            Self::Ellipsis => "...",
            Self::Inc => "++",
            Self::Dec => "--",
            Self::Question => "?",
            Self::As => "as",
            Self::In => "in",
            Self::Break => "break",
            Self::Case => "case",
            Self::Chan => "chan",
            Self::Const => "const",
            Self::Continue => "continue",
            Self::Default => "default",
            Self::Defer => "defer",
            Self::Else => "else",
            Self::Fallthrough => "fallthrough",
            Self::For => "for",
            Self::Fun => "fun",
            Self::Go => "go",
            Self::Goto => "goto",
            Self::If => "if",
            Self::Import => "import",
            Self::Interface => "interface",
            Self::Map => "map",
            Self::Match => "match",
            Self::Package => "package",
            Self::Range => "range",
            Self::Return => "return",
            Self::Switch => "switch",
            Self::Select => "select",
            Self::Struct => "struct",
            Self::Type => "type",
            Self::Var => "var",
            Self::Val => "val",
            Self::LParen => "(",
            Self::LBrack => "[",
            Self::LBrace => "{",
            Self::Comma => ",",
            Self::RParen => ")",
            Self::RBrack => "]",
            Self::RBrace => "}",
            Self::Semicolon => ";",
            Self::Colon => ":",
            Self::Newline => "\n",
        };
        Some(text)
    }

    /// Find the kind spelled exactly `text`
    #[must_use]
    pub fn lookup(text: &str) -> Option<Self> {
        static TABLE: OnceLock<HashMap<&'static str, TokenKind>> = OnceLock::new();
        TABLE
            .get_or_init(|| {
                FIXED_KINDS
                    .iter()
                    .filter_map(|&kind| kind.literal().map(|text| (text, kind)))
                    .collect()
            })
            .get(text)
            .copied()
    }

    #[must_use]
    pub const fn is_literal(self) -> bool {
        matches!(self.band(), TokenBand::Literal)
    }

    #[must_use]
    pub const fn is_operator(self) -> bool {
        matches!(self.band(), TokenBand::Operator)
    }

    #[must_use]
    pub const fn is_keyword(self) -> bool {
        matches!(self.band(), TokenBand::Keyword)
    }

    #[must_use]
    pub const fn is_delimiter(self) -> bool {
        matches!(self.band(), TokenBand::Delimiter)
    }

    /// Words the classifier turns into operators or keywords
    #[must_use]
    pub const fn is_reserved_word(self) -> bool {
        self.is_keyword() || matches!(self, Self::As | Self::In)
    }

    /// Binding power of a binary operator; higher binds tighter
    #[must_use]
    pub const fn binary_precedence(self) -> Option<u8> {
        match self {
            Self::Mul | Self::Quo | Self::Rem | Self::Shl | Self::Shr | Self::And | Self::AndNot => {
                Some(5)
            }
            Self::Add | Self::Sub | Self::Or | Self::Xor => Some(4),
            Self::Eql | Self::Neq | Self::Lss | Self::Leq | Self::Gtr | Self::Geq => Some(3),
            Self::LogicalAnd => Some(2),
            Self::LogicalOr => Some(1),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_prefix_operator(self) -> bool {
        matches!(
            self,
            Self::Add | Self::Sub | Self::Not | Self::Xor | Self::Mul | Self::And
        )
    }

    #[must_use]
    pub const fn is_postfix_operator(self) -> bool {
        matches!(self, Self::Inc | Self::Dec | Self::Question)
    }

    /// `=` and the compound assignments
    #[must_use]
    pub const fn is_assign_operator(self) -> bool {
        matches!(
            self,
            Self::Assign
                | Self::AddAssign
                | Self::SubAssign
                | Self::MulAssign
                | Self::QuoAssign
                | Self::RemAssign
                | Self::AndAssign
                | Self::OrAssign
                | Self::XorAssign
                | Self::ShlAssign
                | Self::ShrAssign
                | Self::AndNotAssign
        )
    }

    /// Tokens that end a statement or close the enclosing construct
    #[must_use]
    pub const fn is_terminator(self) -> bool {
        matches!(
            self,
            Self::Semicolon
                | Self::Newline
                | Self::RParen
                | Self::RBrack
                | Self::RBrace
                | Self::Eof
        )
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Illegal => write!(f, "illegal token"),
            Self::Ident => write!(f, "identifier"),
            Self::Eof => write!(f, "end of input"),
            Self::Int => write!(f, "integer literal"),
            Self::Float => write!(f, "float literal"),
            Self::Char => write!(f, "character literal"),
            Self::String => write!(f, "string literal"),
            Self::Newline => write!(f, "newline"),
            other => match other.literal() {
                Some(text) => write!(f, "`{text}`"),
                None => write!(f, "{other:?}"),
            },
        }
    }
}

/// Sub-format of a numeric literal as reported by the scanner
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LiteralFormat {
    #[default]
    None,
    Decimal,
    Hexadecimal,
    Octal,
    Binary,
    Exponent,
}

/// A classified token
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub range: PosRange,
    pub kind: TokenKind,
    pub format: LiteralFormat,
    /// Exact source text
    pub literal: String,
}

impl Token {
    #[must_use]
    pub fn new(kind: TokenKind, range: PosRange, literal: impl Into<String>) -> Self {
        Self {
            range,
            kind,
            format: LiteralFormat::None,
            literal: literal.into(),
        }
    }

    #[must_use]
    pub const fn with_format(mut self, format: LiteralFormat) -> Self {
        self.format = format;
        self
    }

    /// Returns true if this token has the given kind
    #[must_use]
    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::Eof | TokenKind::Newline => write!(f, "{}", self.kind),
            _ => write!(f, "`{}`", self.literal),
        }
    }
}
