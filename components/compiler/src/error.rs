//! Error constructors shared by the lexer and the parser.
//!
//! Every diagnostic the compiler raises is built here, so the wording of
//! each error class lives in one place. The constructors return plain
//! [`CompileError`] values; callers abort compilation by propagating them.

use crate::lexer::{Token, TokenKind};
use core_types::{CompileError, ErrorKind, SourcePosition, ValueType};

/// Create a lexical error at the given source position.
pub fn lexical_error(message: impl Into<String>, position: SourcePosition) -> CompileError {
    CompileError::new(ErrorKind::Lexical, message, Some(position))
}

/// Create a syntax error at the given source position.
pub fn syntax_error(message: impl Into<String>, position: SourcePosition) -> CompileError {
    CompileError::new(ErrorKind::Syntax, message, Some(position))
}

/// Create a semantic error at the given source position.
pub fn semantic_error(message: impl Into<String>, position: SourcePosition) -> CompileError {
    CompileError::new(ErrorKind::Semantic, message, Some(position))
}

/// Create an internal error for a broken compiler invariant.
///
/// These have no source position; they indicate a bug in the compiler
/// itself rather than in the program being compiled.
pub fn internal_error(message: impl Into<String>) -> CompileError {
    CompileError::new(ErrorKind::Internal, message, None)
}

/// Create the standard syntax error for an unexpected token.
pub fn expected_token(expected: &TokenKind, found: &Token) -> CompileError {
    syntax_error(
        format!("expected {}, but found {}", expected, found.kind),
        found.span.start,
    )
}

/// Create the standard semantic error for a type mismatch.
///
/// `context` is a suffix such as `for array index of 'a'`; pass an empty
/// string when the mismatch has no named construct to point at.
pub fn incompatible_types(
    expected: &ValueType,
    found: &ValueType,
    context: &str,
    position: SourcePosition,
) -> CompileError {
    let mut message = format!("incompatible types (expected {}, found {})", expected, found);
    if !context.is_empty() {
        message.push(' ');
        message.push_str(context);
    }
    semantic_error(message, position)
}
