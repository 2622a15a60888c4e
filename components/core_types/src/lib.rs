//! Core AMPL compiler types.
//!
//! This crate provides the foundational types shared by every stage of the
//! compiler: source location tracking, the value-type lattice used by the
//! type checker, symbol properties stored in the symbol table, and the
//! compile error type every stage reports through.
//!
//! # Overview
//!
//! - [`SourcePosition`] / [`Span`] - Source code locations
//! - [`Primitive`] / [`ValueType`] - The type system of the source language
//! - [`SymbolProperties`] - What the symbol table records per name
//! - [`CompileError`] / [`ErrorKind`] - Fatal, positioned compile errors
//!
//! # Examples
//!
//! ```
//! use core_types::{Primitive, ValueType};
//!
//! let f = ValueType::Function {
//!     params: vec![ValueType::Scalar(Primitive::Integer)],
//!     returns: Primitive::Integer,
//! };
//! assert!(f.is_callable());
//! assert_eq!(f.result(), ValueType::Scalar(Primitive::Integer));
//! assert_eq!(f.to_string(), "integer function");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod source;
mod symbol;
mod types;

pub use error::{CompileError, ErrorKind};
pub use source::{SourcePosition, Span};
pub use symbol::SymbolProperties;
pub use types::{Primitive, ValueType};
