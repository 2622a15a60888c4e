//! Error types for the CLI

use core_types::CompileError;
use thiserror::Error;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid combination of command line arguments
    #[error("{0}")]
    Usage(String),

    /// File could not be read or written
    #[error("{path}: {source}")]
    Io {
        /// Path of the file involved
        path: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Compilation failed
    ///
    /// Renders as `name:line:col: message`, with the position part coming
    /// from the wrapped [`CompileError`].
    #[error("{name}:{error}")]
    Compile {
        /// Display name of the source, a file path or `<eval>`
        name: String,
        /// The compile error with its position
        error: CompileError,
    },
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
