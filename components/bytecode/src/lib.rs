//! Code-generation backend for the AMPL compiler.
//!
//! The compiler front end drives a [`Generator`] through a narrow emission
//! interface; the result is a [`Program`] of per-subroutine instruction
//! streams for an abstract stack machine with numbered local slots. The
//! crate also renders programs as a deterministic assembly listing and
//! round-trips them through a compact binary encoding.
//!
//! # Overview
//!
//! - [`Opcode`] / [`Comparison`] / [`Label`] - The instruction set
//! - [`Subroutine`] / [`Program`] - Containers for emitted code
//! - [`Generator`] - The emission interface the front end drives
//!
//! # Examples
//!
//! ```
//! use bytecode::{Comparison, Generator, Opcode};
//! use core_types::{Primitive, SymbolProperties, ValueType};
//!
//! let mut gen = Generator::new();
//! gen.set_program_name("demo");
//! gen.init_subroutine(
//!     "main",
//!     &SymbolProperties::new(ValueType::Procedure { params: vec![] }),
//! );
//! gen.emit(Opcode::PushConst(5));
//! gen.emit(Opcode::StoreLocal(0));
//! gen.set_max_stack_depth(1);
//! gen.close_subroutine(1);
//!
//! let program = gen.finish();
//! assert_eq!(program.subroutines.len(), 1);
//! assert!(program.subroutines[0].labels_balanced());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod generator;
mod opcode;
mod program;

pub use generator::Generator;
pub use opcode::{Comparison, Label, Opcode};
pub use program::{Program, Subroutine};
