//! Compilation driver
//!
//! The Driver struct runs one compilation from source text to its
//! artifacts: a listing file next to the source, stdout dumps when
//! requested, or nothing at all in check mode.

use crate::error::{CliError, CliResult};
use bytecode::Program;
use compiler::{Lexer, TokenKind};
use std::path::PathBuf;

/// Name used for inline source in diagnostics.
const EVAL_NAME: &str = "<eval>";

/// Orchestrates one compilation and its output artifacts
pub struct Driver {
    /// Whether to dump the token stream before compiling
    print_tokens: bool,
    /// Whether to print the listing to stdout
    print_bytecode: bool,
    /// Whether to skip writing the listing file
    check_only: bool,
    /// Overridden listing path, `None` for the default
    output: Option<PathBuf>,
}

impl Driver {
    /// Create a driver with all dumps off and the default output path.
    ///
    /// # Example
    /// ```
    /// use ampl_cli::Driver;
    ///
    /// let driver = Driver::new().with_print_bytecode(false);
    /// let program = driver.compile_source("program p: main: chillax").unwrap();
    /// assert_eq!(program.name, "p");
    /// ```
    pub fn new() -> Self {
        Self {
            print_tokens: false,
            print_bytecode: false,
            check_only: false,
            output: None,
        }
    }

    /// Enable the token stream dump.
    pub fn with_print_tokens(mut self, enabled: bool) -> Self {
        self.print_tokens = enabled;
        self
    }

    /// Enable printing the listing to stdout.
    pub fn with_print_bytecode(mut self, enabled: bool) -> Self {
        self.print_bytecode = enabled;
        self
    }

    /// Compile without writing the listing file.
    pub fn with_check_only(mut self, enabled: bool) -> Self {
        self.check_only = enabled;
        self
    }

    /// Write the listing to `path` instead of the source path with
    /// extension `s`.
    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = Some(path.into());
        self
    }

    /// Compile a source file and write its listing.
    ///
    /// The listing lands at the configured output path, or at the source
    /// path with its extension replaced by `s`. In check mode nothing is
    /// written.
    ///
    /// # Errors
    /// Returns `CliError` if the file cannot be read, compilation fails,
    /// or the listing cannot be written.
    pub fn compile_file(&self, path: &str) -> CliResult<Program> {
        let source = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_string(),
            source,
        })?;
        let program = self.compile(&source, path)?;

        if !self.check_only {
            let target = match &self.output {
                Some(output) => output.clone(),
                None => PathBuf::from(path).with_extension("s"),
            };
            std::fs::write(&target, program.to_string()).map_err(|source| CliError::Io {
                path: target.display().to_string(),
                source,
            })?;
        }
        Ok(program)
    }

    /// Compile inline source text.
    ///
    /// Diagnostics name the source `<eval>`. Nothing is written to disk;
    /// printing the listing is the caller's configuration.
    ///
    /// # Errors
    /// Returns `CliError::Compile` if compilation fails.
    pub fn compile_source(&self, source: &str) -> CliResult<Program> {
        self.compile(source, EVAL_NAME)
    }

    fn compile(&self, source: &str, name: &str) -> CliResult<Program> {
        if self.print_tokens {
            self.dump_tokens(source, name)?;
        }
        let program = compiler::compile(source).map_err(|error| CliError::Compile {
            name: name.to_string(),
            error,
        })?;
        if self.print_bytecode {
            println!("{}", program);
        }
        Ok(program)
    }

    /// Print one `line:col kind` row per token, end-of-file included.
    fn dump_tokens(&self, source: &str, name: &str) -> CliResult<()> {
        let mut lexer = Lexer::new(source);
        loop {
            let token = lexer.next_token().map_err(|error| CliError::Compile {
                name: name.to_string(),
                error,
            })?;
            println!("{} {}", token.span.start, token.kind);
            if token.kind == TokenKind::Eof {
                return Ok(());
            }
        }
    }
}

impl Default for Driver {
    fn default() -> Self {
        Self::new()
    }
}
