//! Compile error types.
//!
//! Every anomaly the compiler detects is fatal: compilation stops at the
//! first error, and exactly one `CompileError` travels up to the driver.
//! There are no warnings and no recovery.

use crate::SourcePosition;
use std::fmt;

/// The class of a compile error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Illegal character, malformed literal, unterminated string or comment
    Lexical,
    /// A token other than the one the grammar requires
    Syntax,
    /// Type mismatches, unknown or redeclared names, arity errors
    Semantic,
    /// A supposedly unreachable compiler path was reached
    Internal,
}

/// A fatal compile error with its source position.
///
/// # Examples
///
/// ```
/// use core_types::{CompileError, ErrorKind, SourcePosition};
///
/// let error = CompileError {
///     kind: ErrorKind::Semantic,
///     message: "unknown identifier 'x'".to_string(),
///     position: Some(SourcePosition::new(3, 14)),
/// };
/// assert_eq!(error.to_string(), "3:14: unknown identifier 'x'");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    /// The class of error
    pub kind: ErrorKind,
    /// Human-readable message, already formatted
    pub message: String,
    /// Where in the source the error was detected, when known
    pub position: Option<SourcePosition>,
}

impl CompileError {
    /// Build an error from its parts.
    pub fn new(kind: ErrorKind, message: impl Into<String>, position: Option<SourcePosition>) -> Self {
        Self {
            kind,
            message: message.into(),
            position,
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(pos) => write!(f, "{}: {}", pos, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for CompileError {}
