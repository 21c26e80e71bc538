//! # Error Handling
//!
//! This module defines the centralized error type for `tortuga`. It uses the
//! `thiserror` library to build a single `Error` enum that covers every
//! anticipated failure mode, from git commands failing inside one working
//! copy to setup problems that abort the whole run.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum. Repository-level variants
//!   (`BranchDetection`, `NoUpstream`, `Authentication`, `CommandExecution`)
//!   are recorded on the failing repository and never abort the run. Setup
//!   variants (`GitNotFound`, `NoRepositories`, `Io`, `Prompt`,
//!   `ThreadPool`) are fatal.
//!
//! - **`ErrorKind`**: A copyable classification of an `Error`, used by the
//!   status table to pick an error label.
//!
//! - **`Failure`**: A cloneable record of a repository-level error, stored on
//!   the repository so that snapshots of it can be handed to the renderer.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.

use thiserror::Error;

/// Main error type for tortuga operations
#[derive(Error, Debug)]
pub enum Error {
    /// The local branch could not be determined, most commonly because HEAD
    /// is detached.
    #[error("Branch detection failed: {message}")]
    BranchDetection { message: String, stderr: String },

    /// The current branch has no upstream configured.
    #[error("No upstream configured{}", for_branch(branch))]
    NoUpstream { branch: String, stderr: String },

    /// Git needed credentials but terminal prompting is disabled.
    #[error("Authentication failed while running git {command}")]
    Authentication { command: String, stderr: String },

    /// A git command exited unsuccessfully.
    #[error("Git command failed: git {command}{}", summary(stderr))]
    CommandExecution {
        command: String,
        stdout: String,
        stderr: String,
    },

    /// The `git` binary could not be executed at all.
    #[error("git not found: {message}")]
    GitNotFound { message: String },

    /// The base directory contains no git working copies.
    #[error("No repositories found at '{path}'")]
    NoRepositories { path: String },

    /// The confirmation prompt received unusable input.
    #[error("Prompt error: {message}")]
    Prompt { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The worker pool could not be started.
    #[error("Worker pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

fn summary(stderr: &str) -> String {
    match stderr.lines().find(|line| !line.trim().is_empty()) {
        Some(line) => format!(" - {}", line.trim()),
        None => String::new(),
    }
}

fn for_branch(branch: &str) -> String {
    if branch.is_empty() {
        String::new()
    } else {
        format!(" for branch '{branch}'")
    }
}

/// Branch named in git's `no upstream configured for branch 'x'` message.
fn quoted_branch(stderr: &str) -> String {
    let line = stderr.lines().next().unwrap_or_default();
    let mut parts = line.split('\'');
    match (parts.next(), parts.next()) {
        (Some(_), Some(branch)) => branch.to_string(),
        _ => String::new(),
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    BranchDetection,
    NoUpstream,
    Authentication,
    CommandExecution,
    Setup,
}

impl Error {
    /// Builds the error for a git invocation that exited unsuccessfully,
    /// recognizing well-known diagnostics on stderr.
    pub fn from_git_failure(command: &str, stdout: &str, stderr: &str) -> Self {
        if is_auth_error(stderr) {
            return Error::Authentication {
                command: command.to_string(),
                stderr: stderr.to_string(),
            };
        }
        if stderr.starts_with("fatal: no upstream") {
            return Error::NoUpstream {
                branch: quoted_branch(stderr),
                stderr: stderr.to_string(),
            };
        }
        Error::CommandExecution {
            command: command.to_string(),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::BranchDetection { .. } => ErrorKind::BranchDetection,
            Error::NoUpstream { .. } => ErrorKind::NoUpstream,
            Error::Authentication { .. } => ErrorKind::Authentication,
            Error::CommandExecution { .. } => ErrorKind::CommandExecution,
            Error::GitNotFound { .. }
            | Error::NoRepositories { .. }
            | Error::Prompt { .. }
            | Error::Io(_)
            | Error::ThreadPool(_) => ErrorKind::Setup,
        }
    }

    /// Raw diagnostic text captured from git, if any.
    pub fn diagnostics(&self) -> String {
        match self {
            Error::BranchDetection { stderr, .. }
            | Error::NoUpstream { stderr, .. }
            | Error::Authentication { stderr, .. } => stderr.trim_end().to_string(),
            Error::CommandExecution { stdout, stderr, .. } => {
                let mut text = String::new();
                if !stdout.trim().is_empty() {
                    text.push_str(stdout.trim_end());
                }
                if !stderr.trim().is_empty() {
                    if !text.is_empty() {
                        text.push('\n');
                    }
                    text.push_str(stderr.trim_end());
                }
                text
            }
            _ => String::new(),
        }
    }
}

fn is_auth_error(stderr: &str) -> bool {
    stderr.starts_with("fatal: could not read Username")
        || stderr.starts_with("fatal: could not read Password")
}

/// A repository-level error as it is kept on the repository record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: ErrorKind,
    pub message: String,
    pub diagnostics: String,
    /// A best-effort cleanup step (stash pop) that failed after the cause.
    pub cleanup: Option<String>,
}

impl Failure {
    /// Attaches the failure of a cleanup step that ran after the cause.
    pub fn with_cleanup(mut self, err: &Error) -> Self {
        let mut text = err.to_string();
        let diagnostics = err.diagnostics();
        if !diagnostics.is_empty() {
            text.push('\n');
            text.push_str(&diagnostics);
        }
        self.cleanup = Some(text);
        self
    }
}

impl From<&Error> for Failure {
    fn from(err: &Error) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
            diagnostics: err.diagnostics(),
            cleanup: None,
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}
