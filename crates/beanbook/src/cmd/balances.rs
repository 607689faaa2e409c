//! Implementation of the `balances` command (the default action).

use anyhow::Result;
use clap::Args as ClapArgs;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::report;

/// Print the flat balance listing for a ledger.
#[derive(ClapArgs, Debug)]
pub struct Args {
    /// The ledger file to process
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Only show accounts whose name contains this substring
    #[arg(short, long, value_name = "SUBSTRING")]
    pub filter: Option<String>,

    /// Emit the balances as JSON instead of the flat listing
    #[arg(long)]
    pub json: bool,
}

/// Run the balances command.
pub fn run(args: &Args) -> Result<ExitCode> {
    let (loaded, evaluation) = super::load_and_evaluate(&args.file)?;

    for error in &loaded.errors {
        eprintln!("error: {error}");
    }
    for error in &evaluation.errors {
        eprintln!("error: {error}");
    }

    let mut stdout = io::stdout().lock();
    if args.json {
        report::print_balances_json(&evaluation.state, &mut stdout)?;
    } else {
        report::print_balances(
            &evaluation.state,
            &loaded.options.operating_currency,
            args.filter.as_deref(),
            &mut stdout,
        )?;
    }

    if loaded.errors.is_empty() && evaluation.errors.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(1))
    }
}
