//! Lexical classification of raw scanner output
//!
//! The classifier is the parser's only cursor into the source. It pulls raw
//! tokens from a [`RawScanner`], drops comments, and maps identifier and mark
//! text onto [`TokenKind`]s using the fixed spelling table.

use thiserror::Error;
use tracing::trace;

use crate::lexer::{PosRange, RawKind, RawScanner, ScanError};
use crate::token::{Token, TokenKind};

/// Classification failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    /// Mark text that spells no known operator or delimiter
    #[error("unknown operator `{}`", .0.literal)]
    UnknownOperator(Token),

    /// Advance was requested after the end-of-input token was produced
    #[error("unexpected end of input")]
    EndOfInput,

    #[error(transparent)]
    Scan(#[from] ScanError),
}

/// Turns raw tokens into classified [`Token`]s, one at a time
pub struct Classifier<S> {
    scanner: S,
    token: Token,
    reached_eof: bool,
}

impl<S: RawScanner> Classifier<S> {
    /// Wrap a scanner; call [`Classifier::advance`] before reading the first token
    #[must_use]
    pub fn new(scanner: S) -> Self {
        Self {
            scanner,
            token: Token::new(TokenKind::Illegal, PosRange::default(), ""),
            reached_eof: false,
        }
    }

    /// The current token
    #[must_use]
    pub const fn token(&self) -> &Token {
        &self.token
    }

    /// Returns true once the end-of-input token has been produced
    #[must_use]
    pub const fn reached_eof(&self) -> bool {
        self.reached_eof
    }

    /// Move to the next significant token
    ///
    /// The first end of input yields an [`TokenKind::Eof`] token; advancing
    /// past it fails with [`LexError::EndOfInput`]. An unknown mark leaves an
    /// [`TokenKind::Illegal`] token current and reports it.
    pub fn advance(&mut self) -> Result<(), LexError> {
        if self.reached_eof {
            return Err(LexError::EndOfInput);
        }

        loop {
            let raw = match self.scanner.scan_token() {
                Ok(raw) => raw,
                Err(ScanError::Eof { at }) => {
                    self.reached_eof = true;
                    self.token = Token::new(TokenKind::Eof, PosRange::at(at), "");
                    trace!(at = %at, "reached end of input");
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };

            let range = PosRange::new(raw.from, raw.to);
            let kind = match raw.kind {
                RawKind::Comment => continue,
                RawKind::Ident => TokenKind::lookup(&raw.text)
                    .filter(|kind| kind.is_reserved_word())
                    .unwrap_or(TokenKind::Ident),
                RawKind::Mark => {
                    if let Some(kind) = TokenKind::lookup(&raw.text) {
                        kind
                    } else {
                        self.token = Token::new(TokenKind::Illegal, range, raw.text);
                        trace!(at = %range.from, text = %self.token.literal, "unknown operator");
                        return Err(LexError::UnknownOperator(self.token.clone()));
                    }
                }
                RawKind::Char => TokenKind::Char,
                RawKind::String => TokenKind::String,
                RawKind::Int => TokenKind::Int,
                RawKind::Float => TokenKind::Float,
            };

            self.token = Token::new(kind, range, raw.text).with_format(raw.format);
            trace!(kind = ?kind, at = %range.from, "classified token");
            return Ok(());
        }
    }
}
