//! Implementation of the `check` command.

use anyhow::Result;
use clap::Args as ClapArgs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::report;

/// Validate a ledger file and report errors.
#[derive(ClapArgs, Debug)]
pub struct Args {
    /// The ledger file to check
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Suppress all output (just use the exit code)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Run the check command.
pub fn run(args: &Args) -> Result<ExitCode> {
    let (loaded, evaluation) = super::load_and_evaluate(&args.file)?;
    let error_count = loaded.errors.len() + evaluation.errors.len();

    if !args.quiet {
        let mut stdout = io::stdout().lock();
        for error in &loaded.errors {
            writeln!(stdout, "error: {error}")?;
        }
        for error in &evaluation.errors {
            writeln!(stdout, "error: {error}")?;
        }
        report::print_summary(error_count, &mut stdout)?;
    }

    if error_count > 0 {
        Ok(ExitCode::from(1))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}
