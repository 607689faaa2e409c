//! beanbook command-line interface.
//!
//! `beanbook FILE` prints balances; `beanbook check FILE` only validates.
//! Exit codes: 0 for a clean ledger, 1 when errors were reported, 2 when
//! the ledger could not be loaded at all.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;

mod cmd;
mod report;

/// Process beancount-style ledger files.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// The ledger file to process (shorthand for `balances FILE`)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print account balances
    #[command(alias = "bal")]
    Balances(cmd::balances::Args),
    /// Check the ledger and report errors
    Check(cmd::check::Args),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt().with_max_level(Level::DEBUG).init();
    }

    let result = match cli.command {
        Some(Command::Balances(args)) => cmd::balances::run(&args),
        Some(Command::Check(args)) => cmd::check::run(&args),
        None => match cli.file {
            Some(file) => cmd::balances::run(&cmd::balances::Args {
                file,
                filter: None,
                json: false,
            }),
            None => {
                eprintln!("error: missing ledger file (try `beanbook --help`)");
                return ExitCode::from(2);
            }
        },
    };

    match result {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
