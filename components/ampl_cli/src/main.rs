//! AMPL Compiler CLI
//!
//! Entry point for the `amplc` compiler. Parses CLI arguments and
//! delegates to the Driver for compilation.

use ampl_cli::{Cli, CliError, Driver};
use clap::Parser as ClapParser;

fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli) {
        eprintln!("amplc: error: {}", error);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    if cli.file.is_some() && cli.eval.is_some() {
        return Err(CliError::Usage(
            "take a source file or --eval, not both".to_string(),
        ));
    }

    let mut driver = Driver::new()
        .with_print_tokens(cli.print_tokens)
        .with_check_only(cli.check);

    if let Some(file) = cli.file {
        driver = driver.with_print_bytecode(cli.print_bytecode);
        if let Some(output) = cli.output {
            driver = driver.with_output(output);
        }
        driver.compile_file(&file)?;
    } else if let Some(source) = cli.eval {
        // inline compilation always shows its listing, unless it is only
        // being checked
        driver = driver.with_print_bytecode(cli.print_bytecode || !cli.check);
        driver.compile_source(&source)?;
    } else {
        return Err(CliError::Usage(
            "no input given; name a source file or use --eval".to_string(),
        ));
    }
    Ok(())
}
