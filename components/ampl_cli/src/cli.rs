//! Command line argument definitions for `amplc`

use clap::Parser;

/// Compile AMPL programs to stack-machine bytecode.
#[derive(Parser, Debug)]
#[command(name = "amplc", version, about = "AMPL compiler")]
pub struct Cli {
    /// Source file to compile; the listing is written next to it with
    /// extension `s` unless --output says otherwise
    pub file: Option<String>,

    /// Compile the given source text and print its listing to stdout
    #[arg(short = 'e', long, value_name = "SOURCE")]
    pub eval: Option<String>,

    /// Where to write the listing when compiling a file
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: Option<String>,

    /// Dump the token stream before compiling
    #[arg(long)]
    pub print_tokens: bool,

    /// Print the compiled listing to stdout
    #[arg(long)]
    pub print_bytecode: bool,

    /// Compile without writing any output file
    #[arg(long)]
    pub check: bool,
}
