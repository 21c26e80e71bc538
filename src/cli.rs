//! CLI argument parsing and run setup

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, ValueEnum};
use clap_complete::{generate, Shell};
use log::{debug, LevelFilter};

use tortuga::git::{self, SystemGit};
use tortuga::orchestrator::{write_failure_report, Orchestrator, RunOptions};
use tortuga::output::OutputConfig;
use tortuga::renderer::LiveRenderer;

/// Tortuga - Keep a directory of git repositories in sync with their upstreams
#[derive(Parser, Debug)]
#[command(name = "tt")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Directory whose subdirectories are the repositories to manage
    #[arg(value_name = "PATH", default_value = ".")]
    path: PathBuf,

    /// Only inspect local state: no fetch, no sync
    #[arg(short, long)]
    local_only: bool,

    /// Sync without asking for confirmation
    #[arg(short = 'y', long = "yes")]
    yes: bool,

    /// Stash and rebase onto incoming commits, but never push
    #[arg(short, long)]
    incoming_only: bool,

    /// Print git diagnostics for every repository that failed
    #[arg(short, long)]
    verbose: bool,

    /// Colorize output (always, never, auto)
    #[arg(
        long,
        value_name = "WHEN",
        default_value = "auto",
        value_parser = ["auto", "always", "never"]
    )]
    color: String,

    /// Set log level (off, error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL", env = "TORTUGA_LOG", default_value = "warn")]
    log_level: LevelFilter,

    /// Print a completion script for the given shell and exit
    #[arg(long, value_name = "SHELL", value_enum)]
    completions: Option<CompletionShell>,
}

/// Shell types for completion generation
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
    Elvish,
}

impl From<CompletionShell> for Shell {
    fn from(shell: CompletionShell) -> Self {
        match shell {
            CompletionShell::Bash => Shell::Bash,
            CompletionShell::Zsh => Shell::Zsh,
            CompletionShell::Fish => Shell::Fish,
            CompletionShell::PowerShell => Shell::PowerShell,
            CompletionShell::Elvish => Shell::Elvish,
        }
    }
}

impl Cli {
    /// Runs the tool and returns the process exit code.
    pub fn execute(self) -> Result<u8> {
        if let Some(shell) = self.completions {
            let mut cmd = Cli::command();
            generate(Shell::from(shell), &mut cmd, "tt", &mut io::stdout());
            return Ok(0);
        }

        env_logger::Builder::new()
            .filter_level(self.log_level)
            .format_timestamp(None)
            .init();

        git::is_available().context("tortuga needs git on the PATH")?;

        let output = OutputConfig::from_env_and_flag(&self.color);
        let options = RunOptions {
            base_dir: self.path,
            local_only: self.local_only,
            assume_yes: self.yes,
            incoming_only: self.incoming_only,
        };
        debug!("Running with {:?}", options);

        let renderer = LiveRenderer::stdout();
        let summary = Orchestrator::new(&SystemGit, &renderer, output)
            .run(&options, &mut io::stdin().lock())
            .with_context(|| format!("Failed to sync {}", options.base_dir.display()))?;
        debug!("Run finished: {:?}", summary.outcome);

        let mut stderr = io::stderr().lock();
        write_failure_report(&mut stderr, &summary.repositories, self.verbose, &output)?;
        stderr.flush()?;

        Ok(summary.exit_code() as u8)
    }
}
