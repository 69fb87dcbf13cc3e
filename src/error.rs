//! Centralised error hierarchy for the **Lox interpreter**.
//!
//! All subsystems (scanner, parser, resolver, runtime, script loader) convert
//! their internal failure modes into one of the variants defined here.  This
//! enables a uniform `Result<T>` alias throughout the crate and ergonomic
//! inter‑operation with `anyhow` in the binary, while still preserving rich
//! diagnostic detail.
//!
//! The module **does not** print diagnostics itself; the session layer decides
//! where they go.

use std::fmt;
use std::io;

use log::info;
use thiserror::Error;

use crate::token::{Token, TokenType};

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error.  `location` is either empty, ` at end` or
    /// ` at '<lexeme>'`.
    #[error("[line {line}] Error{location}: {message}")]
    Parse {
        message: String,
        location: String,
        line: usize,
    },

    /// Static‑analysis or resolution failure (scoping and context rules).
    #[error("[line {line}] Error{location}: {message}")]
    Resolve {
        message: String,
        location: String,
        line: usize,
    },

    /// Runtime evaluation error.  Unwinds to the top‑level `interpret` loop.
    #[error("[line {line}] RuntimeError: {message}")]
    Runtime { message: String, line: usize },

    /// A script pulled in through `execute` failed to scan, parse or resolve.
    #[error("Failed to execute '{path}':{}", render_nested(.errors))]
    Script { path: String, errors: Vec<LoxError> },

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl LoxError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        LoxError::Lex { message, line }
    }

    /// Helper constructor for the **parser**; the location is derived from
    /// the offending token.
    pub fn parse<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Parse error: line={}, msg={}", token.line, message);

        LoxError::Parse {
            message,
            location: location_of(token),
            line: token.line,
        }
    }

    /// Helper constructor for the **resolver**.
    pub fn resolve<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Resolve error: line={}, msg={}", token.line, message);

        LoxError::Resolve {
            message,
            location: location_of(token),
            line: token.line,
        }
    }

    /// Helper constructor for the **interpreter**.
    pub fn runtime<S: Into<String>>(token: &Token, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Runtime error: line={}, msg={}", token.line, message);

        LoxError::Runtime {
            message,
            line: token.line,
        }
    }

    /// `true` for errors detected before execution starts (exit status 65).
    pub fn is_static(&self) -> bool {
        matches!(
            self,
            LoxError::Lex { .. } | LoxError::Parse { .. } | LoxError::Resolve { .. }
        )
    }
}

fn location_of(token: &Token) -> String {
    if token.token_type == TokenType::EOF {
        " at end".to_string()
    } else {
        format!(" at '{}'", token.lexeme)
    }
}

fn render_nested(errors: &[LoxError]) -> String {
    errors.iter().map(|e| format!("\n  {}", e)).collect()
}

/// Non‑fatal static finding.  Never blocks execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub line: usize,
    pub message: String,
}

impl Warning {
    pub fn new<S: Into<String>>(line: usize, msg: S) -> Self {
        Self {
            line,
            message: msg.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[line {}] Warning: {}", self.line, self.message)
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, LoxError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_points_at_lexeme() {
        let token = Token::new(TokenType::IDENTIFIER, "foo", 3);
        let err = LoxError::parse(&token, "Expected ';' after value.");

        assert_eq!(
            err.to_string(),
            "[line 3] Error at 'foo': Expected ';' after value."
        );
        assert!(err.is_static());
    }

    #[test]
    fn parse_error_at_end_of_input() {
        let token = Token::new(TokenType::EOF, "", 7);
        let err = LoxError::parse(&token, "Expected expression.");

        assert_eq!(err.to_string(), "[line 7] Error at end: Expected expression.");
    }

    #[test]
    fn runtime_error_format() {
        let token = Token::new(TokenType::MINUS, "-", 2);
        let err = LoxError::runtime(&token, "Operand must be a number.");

        assert_eq!(err.to_string(), "[line 2] RuntimeError: Operand must be a number.");
        assert!(!err.is_static());
    }

    #[test]
    fn script_error_lists_nested_errors() {
        let err = LoxError::Script {
            path: "lib.lox".into(),
            errors: vec![LoxError::lex(1, "Unexpected character.")],
        };

        assert_eq!(
            err.to_string(),
            "Failed to execute 'lib.lox':\n  [line 1] Error: Unexpected character."
        );
    }

    #[test]
    fn warning_format() {
        let warning = Warning::new(4, "Variable 'a' declared but never used.");

        assert_eq!(
            warning.to_string(),
            "[line 4] Warning: Variable 'a' declared but never used."
        );
    }
}
