//! migo syntax - front end of the migo toolchain
//!
//! This crate turns migo source text into a positioned AST:
//! - Lexer: raw scanning of source text
//! - Token: the closed set of token kinds and their tables
//! - Classifier: raw tokens to typed tokens
//! - AST: abstract syntax tree definitions and canonical printing
//! - Parser: AST construction with error recovery
//!
//! ```
//! let output = migo_syntax::parse("val answer = 6 * 7");
//! assert!(output.is_ok());
//! assert_eq!(output.file.to_string(), "val answer = 6 * 7\n");
//! ```

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Lexer module - raw scanning of migo source code
pub mod lexer;

/// Token kinds, bands and operator tables
pub mod token;

/// Lexical classifier - raw tokens to typed tokens
pub mod classifier;

/// Abstract Syntax Tree - parsed representation of migo source code
pub mod ast;

/// Parser module - converts tokens into AST
pub mod parser;

/// Parser configuration
pub mod config;

pub use parser::{ParseOutput, Parser, SyntaxError};

/// Parse a source file with the default configuration
#[must_use]
pub fn parse(source: &str) -> ParseOutput {
    Parser::parse_source(source, &config::ParserConfig::default())
}
