//! AMPL Compiler Component
//!
//! Provides the lexer, symbol table, and single-pass parser that turn AMPL
//! source code into stack-machine bytecode. Parsing, type checking and code
//! generation happen in one traversal with one token of lookahead; there is
//! no syntax tree.
//!
//! # Overview
//!
//! - [`Lexer`] - Tokenizes AMPL source code
//! - [`Token`] / [`TokenKind`] - Tokens with their source spans
//! - [`SymbolTable`] - Scoped name bindings with frame offsets
//! - [`Parser`] - Recursive descent parser driving the bytecode generator
//! - [`compile`] - One-call convenience wrapper
//!
//! # Example
//!
//! ```
//! use compiler::compile;
//!
//! let program = compile("program demo: main: let x = 2 + 3; output x end").unwrap();
//! assert_eq!(program.name, "demo");
//! assert_eq!(program.subroutines.len(), 1);
//! assert_eq!(program.subroutines[0].name, "main");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod lexer;
pub mod parser;
pub mod symbols;

// Re-export main types at crate root
pub use lexer::{Lexer, Token, TokenKind, MAX_IDENTIFIER_LENGTH};
pub use parser::Parser;
pub use symbols::SymbolTable;

use bytecode::Program;
use core_types::CompileError;

/// Compile AMPL source code to a bytecode program.
///
/// Stops at the first error; the returned program always has balanced
/// labels and a `main` subroutine.
pub fn compile(source: &str) -> Result<Program, CompileError> {
    Parser::new(source).parse()
}
