//! # Tortuga CLI
//!
//! This is the binary entry point for the `tt` command-line tool.
//!
//! Its primary responsibilities are:
//! - Parsing command-line arguments using `clap`.
//! - Running the update/sync workflow for the requested directory.
//! - Translating the outcome into an exit code: `0` when every repository is
//!   fine, `1` when a repository failed or the run could not start, `2` for
//!   invalid usage (reported by `clap`).
//!
//! The core application logic is defined in the `lib.rs` library crate, ensuring
//! that the binary is a thin wrapper around the reusable library functionality.

mod cli;

use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    match cli.execute() {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
