//! Integration test suite for the AMPL compiler
//!
//! This crate provides integration tests that verify the compiler
//! components work together correctly across component boundaries.

/// Re-export components for test convenience
pub mod components {
    pub use ampl_cli;
    pub use bytecode;
    pub use compiler;
    pub use core_types;
}
