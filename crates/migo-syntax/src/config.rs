//! Parser configuration
//!
//! Loaded from TOML when a caller wants something other than the defaults:
//!
//! ```toml
//! newlines = "whitespace"
//! max_errors = 20
//! max_depth = 64
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::lexer::NewlineMode;
use crate::lexer::ScannerConfig;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid parser configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("could not serialize parser configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Nesting levels allowed unless configured otherwise
pub const DEFAULT_MAX_DEPTH: usize = 40;

const fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

/// Settings for one parse session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Whether a line feed terminates statements
    #[serde(default)]
    pub newlines: NewlineMode,
    /// Stop after this many recorded errors (0 means never)
    #[serde(default)]
    pub max_errors: usize,
    /// Open blocks, expressions and types allowed inside one another
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            newlines: NewlineMode::default(),
            max_errors: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParserConfig {
    /// Read a configuration from TOML text; missing keys take their defaults
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Render this configuration as TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The part of the configuration the scanner needs
    #[must_use]
    pub const fn scanner_config(&self) -> ScannerConfig {
        ScannerConfig {
            newlines: self.newlines,
        }
    }

    /// Returns true once `recorded` errors reach the configured limit
    #[must_use]
    pub const fn error_limit_reached(&self, recorded: usize) -> bool {
        self.max_errors != 0 && recorded >= self.max_errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ParserConfig::default();
        assert_eq!(config.newlines, NewlineMode::Terminator);
        assert_eq!(config.max_errors, 0);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert!(!config.error_limit_reached(1000));
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(
            ParserConfig::from_toml_str("").unwrap(),
            ParserConfig::default()
        );
    }

    #[test]
    fn load_from_toml() {
        let config = ParserConfig::from_toml_str("newlines = \"whitespace\"\nmax_errors = 3\n")
            .expect("config should parse");
        assert_eq!(config.newlines, NewlineMode::Whitespace);
        assert_eq!(config.max_errors, 3);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert!(!config.error_limit_reached(2));
        assert!(config.error_limit_reached(3));
    }

    #[test]
    fn reject_unknown_mode() {
        let err = ParserConfig::from_toml_str("newlines = \"sometimes\"").unwrap_err();
        assert!(err.to_string().starts_with("invalid parser configuration"));
    }

    #[test]
    fn toml_output_reloads() {
        let config = ParserConfig {
            newlines: NewlineMode::Whitespace,
            max_errors: 5,
            max_depth: 12,
        };
        let text = config.to_toml_string().unwrap();
        assert_eq!(ParserConfig::from_toml_str(&text).unwrap(), config);
    }
}
