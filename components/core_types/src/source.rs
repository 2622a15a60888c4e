//! Source position tracking.
//!
//! This module provides the types the lexer uses to stamp every token with
//! its location and that errors carry for reporting.

use std::fmt;

/// A position in source text, 1-indexed in both dimensions.
///
/// Used for error reporting to indicate where an issue occurred.
///
/// # Examples
///
/// ```
/// use core_types::SourcePosition;
///
/// let pos = SourcePosition { line: 10, column: 5 };
/// assert_eq!(pos.to_string(), "10:5");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePosition {
    /// Line number, starting at 1
    pub line: u32,
    /// Column number, starting at 1
    pub column: u32,
}

impl SourcePosition {
    /// Create a position from line and column numbers.
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// The position of the first character of a source file.
    pub fn origin() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The start and end positions of one token, captured at lex time.
///
/// The end position is exclusive: it names the character just past the
/// token. Every token owns its span, so later stages never recompute
/// positions from lexeme lengths.
///
/// # Examples
///
/// ```
/// use core_types::{SourcePosition, Span};
///
/// let span = Span::new(
///     SourcePosition::new(3, 7),
///     SourcePosition::new(3, 12),
/// );
/// assert_eq!(span.start.column, 7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Position of the token's first character
    pub start: SourcePosition,
    /// Position just past the token's last character
    pub end: SourcePosition,
}

impl Span {
    /// Create a span from its two endpoints.
    pub fn new(start: SourcePosition, end: SourcePosition) -> Self {
        Self { start, end }
    }

    /// A zero-width span at one position, for synthesized tokens.
    pub fn point(at: SourcePosition) -> Self {
        Self { start: at, end: at }
    }
}
