//! Raw lexeme patterns for the migo scanner

use logos::Logos;

/// What logos recognises before the scanner turns it into a [`super::RawToken`]
///
/// Quoted literals and block comments only have their opening matched here;
/// the scanner finds the closing delimiter itself so it can report
/// unterminated input precisely.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r]+")]
pub(super) enum Lexeme {
    #[regex(r"[\p{XID_Start}_][\p{XID_Continue}]*")]
    Ident,

    // ========== Numbers ==========
    #[regex(r"[0-9][0-9_]*")]
    DecInt,

    #[regex(r"0[xX][0-9a-fA-F][0-9a-fA-F_]*")]
    HexInt,

    #[regex(r"0[oO][0-7][0-7_]*")]
    OctInt,

    #[regex(r"0[bB][01][01_]*")]
    BinInt,

    #[regex(r"[0-9][0-9_]*\.[0-9][0-9_]*")]
    Float,

    #[regex(r"[0-9][0-9_]*(\.[0-9][0-9_]*)?[eE][+-]?[0-9][0-9_]*")]
    ExpFloat,

    // ========== Quoted literals ==========
    #[token("\"")]
    DoubleQuote,

    #[token("'")]
    SingleQuote,

    // ========== Comments ==========
    #[regex(r"//[^\n]*")]
    LineComment,

    #[token("/*")]
    BlockCommentStart,

    // ========== Marks ==========
    /// A run of operator characters; the scanner keeps its longest prefix
    /// that spells a known token and rescans the rest.
    #[regex(r"[+\-*%&|^<>=!.:?~@#$]+")]
    Operator,

    /// `/` and `/=` stand alone so they never absorb a following comment opener
    #[regex(r"/=?")]
    Slash,

    #[regex(r"[(){}\[\],;]")]
    Delimiter,

    #[token("\n")]
    Newline,
}
