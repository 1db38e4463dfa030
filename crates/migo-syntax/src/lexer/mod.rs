//! Raw scanner for migo source text
//!
//! The scanner is the lowest layer of the front end. It knows nothing about
//! keywords or operator spellings; it only splits text into raw tokens:
//! - identifiers and numeric literals (with their [`LiteralFormat`])
//! - string and character literals, kept verbatim with quotes and escapes
//! - marks: operator runs, delimiters and (optionally) newlines
//! - comments, which the classifier later discards
//!
//! Anything implementing [`RawScanner`] can feed the classifier; [`Scanner`]
//! is the logos-backed implementation used by [`crate::parse`].

#![allow(clippy::cast_possible_truncation)] // Offsets are u32; sources > 4GB are unsupported

mod lexeme;
mod span;

pub use span::{LineIndex, PosRange, Position};

use lexeme::Lexeme;
use logos::Logos;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::token::{LiteralFormat, TokenKind};

/// Raw token categories produced by a scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawKind {
    Ident,
    /// Operator or delimiter text, including a newline when newlines are significant
    Mark,
    Char,
    String,
    Int,
    Float,
    Comment,
}

/// One token as the scanner sees it
#[derive(Debug, Clone, PartialEq)]
pub struct RawToken {
    pub from: Position,
    pub to: Position,
    pub kind: RawKind,
    pub format: LiteralFormat,
    /// Exact source text of the token
    pub text: String,
}

/// Scanner failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScanError {
    #[error("end of input")]
    Eof { at: Position },

    #[error("unexpected character {ch:?}")]
    UnexpectedChar { ch: char, range: PosRange },

    #[error("unterminated string literal")]
    UnterminatedString { range: PosRange },

    #[error("unterminated character literal")]
    UnterminatedChar { range: PosRange },

    #[error("character literal must hold exactly one character")]
    MalformedChar { range: PosRange },

    #[error("invalid escape sequence: \\{ch}")]
    InvalidEscape { ch: char, range: PosRange },

    #[error("unterminated block comment")]
    UnterminatedComment { range: PosRange },
}

impl ScanError {
    /// Source range the error points at
    #[must_use]
    pub fn range(&self) -> PosRange {
        match self {
            Self::Eof { at } => PosRange::at(*at),
            Self::UnexpectedChar { range, .. }
            | Self::UnterminatedString { range }
            | Self::UnterminatedChar { range }
            | Self::MalformedChar { range }
            | Self::InvalidEscape { range, .. }
            | Self::UnterminatedComment { range } => *range,
        }
    }

    /// Returns true for the end-of-input signal
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::Eof { .. })
    }
}

/// The capability the classifier needs from a scanner
pub trait RawScanner {
    /// Scan the next raw token
    ///
    /// Returns [`ScanError::Eof`] once the input is exhausted, on this and
    /// every later call.
    fn scan_token(&mut self) -> Result<RawToken, ScanError>;
}

/// How the scanner treats line feeds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewlineMode {
    /// A line feed is a delimiter mark and may end a statement
    #[default]
    Terminator,
    /// A line feed is skipped like any other whitespace
    Whitespace,
}

/// Scanner configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScannerConfig {
    pub newlines: NewlineMode,
}

/// The logos-backed migo scanner
pub struct Scanner<'source> {
    source: &'source str,
    /// Current byte offset in the source
    position: usize,
    lines: LineIndex,
    config: ScannerConfig,
}

impl<'source> Scanner<'source> {
    /// Create a scanner over the given source
    #[must_use]
    pub fn new(source: &'source str, config: ScannerConfig) -> Self {
        Self {
            source,
            position: 0,
            lines: LineIndex::new(source),
            config,
        }
    }

    /// Scan every remaining raw token up to end of input or the first error
    pub fn collect_all(&mut self) -> Result<Vec<RawToken>, ScanError> {
        let mut tokens = Vec::new();
        loop {
            match self.scan_token() {
                Ok(token) => tokens.push(token),
                Err(ScanError::Eof { .. }) => return Ok(tokens),
                Err(e) => return Err(e),
            }
        }
    }

    fn range(&self, start: usize, end: usize) -> PosRange {
        PosRange::new(self.lines.position(start), self.lines.position(end))
    }

    fn raw(&self, kind: RawKind, format: LiteralFormat, start: usize, end: usize) -> RawToken {
        RawToken {
            from: self.lines.position(start),
            to: self.lines.position(end),
            kind,
            format,
            text: self.source[start..end].to_string(),
        }
    }

    /// Scan the body of a quoted literal whose opening quote ended at `self.position`
    ///
    /// On success `self.position` is just past the closing quote. On failure it
    /// is left where scanning stopped so the next call makes progress.
    fn scan_quoted(&mut self, start: usize, quote: char) -> Result<(), ScanError> {
        let body = &self.source[self.position..];
        let mut chars = body.char_indices();
        let mut bad_escape = None;
        let mut stop = body.len();

        while let Some((i, c)) = chars.next() {
            if c == quote {
                self.position += i + c.len_utf8();
                return match bad_escape {
                    Some((ch, at)) => Err(ScanError::InvalidEscape {
                        ch,
                        range: self.range(at, at + 1 + ch.len_utf8()),
                    }),
                    None => Ok(()),
                };
            }
            match c {
                '\n' => {
                    stop = i;
                    break;
                }
                '\\' => match chars.next() {
                    Some((j, '\n')) => {
                        stop = j;
                        break;
                    }
                    Some((_, escaped)) => {
                        if bad_escape.is_none() && !is_valid_escape(escaped) {
                            bad_escape = Some((escaped, self.position + i));
                        }
                    }
                    None => break,
                },
                _ => {}
            }
        }

        self.position += stop;
        let range = self.range(start, self.position);
        Err(if quote == '"' {
            ScanError::UnterminatedString { range }
        } else {
            ScanError::UnterminatedChar { range }
        })
    }

    /// Skip to the end of a block comment whose `/*` ended at `self.position`
    fn scan_block_comment(&mut self, start: usize) -> Result<(), ScanError> {
        if let Some(i) = self.source[self.position..].find("*/") {
            self.position += i + 2;
            Ok(())
        } else {
            self.position = self.source.len();
            Err(ScanError::UnterminatedComment {
                range: self.range(start, self.position),
            })
        }
    }
}

impl RawScanner for Scanner<'_> {
    fn scan_token(&mut self) -> Result<RawToken, ScanError> {
        loop {
            let remaining = &self.source[self.position..];
            let mut lexer = Lexeme::lexer(remaining);

            let Some(result) = lexer.next() else {
                self.position = self.source.len();
                return Err(ScanError::Eof {
                    at: self.lines.position(self.position),
                });
            };

            // span is relative to the remaining slice, after skipped whitespace
            let span = lexer.span();
            let start = self.position + span.start;
            let end = self.position + span.end;
            self.position = end;

            let lexeme = match result {
                Ok(lexeme) => lexeme,
                Err(()) => {
                    let ch = lexer
                        .slice()
                        .chars()
                        .next()
                        .unwrap_or(char::REPLACEMENT_CHARACTER);
                    return Err(ScanError::UnexpectedChar {
                        ch,
                        range: self.range(start, end),
                    });
                }
            };

            let token = match lexeme {
                Lexeme::Newline if self.config.newlines == NewlineMode::Whitespace => continue,
                Lexeme::Ident => self.raw(RawKind::Ident, LiteralFormat::None, start, end),
                Lexeme::DecInt => self.raw(RawKind::Int, LiteralFormat::Decimal, start, end),
                Lexeme::HexInt => self.raw(RawKind::Int, LiteralFormat::Hexadecimal, start, end),
                Lexeme::OctInt => self.raw(RawKind::Int, LiteralFormat::Octal, start, end),
                Lexeme::BinInt => self.raw(RawKind::Int, LiteralFormat::Binary, start, end),
                Lexeme::Float => self.raw(RawKind::Float, LiteralFormat::Decimal, start, end),
                Lexeme::ExpFloat => self.raw(RawKind::Float, LiteralFormat::Exponent, start, end),
                Lexeme::DoubleQuote => {
                    self.scan_quoted(start, '"')?;
                    self.raw(RawKind::String, LiteralFormat::None, start, self.position)
                }
                Lexeme::SingleQuote => {
                    self.scan_quoted(start, '\'')?;
                    let token = self.raw(RawKind::Char, LiteralFormat::None, start, self.position);
                    if !is_single_char(&token.text) {
                        return Err(ScanError::MalformedChar {
                            range: PosRange::new(token.from, token.to),
                        });
                    }
                    token
                }
                Lexeme::LineComment => self.raw(RawKind::Comment, LiteralFormat::None, start, end),
                Lexeme::BlockCommentStart => {
                    self.scan_block_comment(start)?;
                    self.raw(RawKind::Comment, LiteralFormat::None, start, self.position)
                }
                Lexeme::Operator => {
                    let end = start + known_operator_len(&self.source[start..end]);
                    self.position = end;
                    self.raw(RawKind::Mark, LiteralFormat::None, start, end)
                }
                Lexeme::Slash | Lexeme::Delimiter | Lexeme::Newline => {
                    self.raw(RawKind::Mark, LiteralFormat::None, start, end)
                }
            };
            return Ok(token);
        }
    }
}

/// Length of the longest prefix of an operator run that names a token
///
/// A run with no known prefix is kept whole and reported once.
fn known_operator_len(run: &str) -> usize {
    (1..=run.len())
        .rev()
        .find(|&len| TokenKind::lookup(&run[..len]).is_some())
        .unwrap_or(run.len())
}

fn is_valid_escape(c: char) -> bool {
    matches!(c, 'n' | 't' | 'r' | '0' | '\\' | '\'' | '"')
}

/// Checks the body of a quoted char literal holds one char or one escape
fn is_single_char(text: &str) -> bool {
    let body = &text[1..text.len() - 1];
    let mut chars = body.chars();
    match chars.next() {
        Some('\\') => chars.next().is_some() && chars.next().is_none(),
        Some(_) => chars.next().is_none(),
        None => false,
    }
}
