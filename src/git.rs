//! Git command gateway.
//!
//! Everything here shells out to the system `git` binary, which picks up the
//! user's SSH keys, credential helpers and `~/.gitconfig` without any extra
//! work. Terminal prompting is disabled on every invocation so an operation
//! that needs interactive credentials fails fast instead of hanging a worker.
//!
//! The [`GitOperations`] trait is the seam between the repository state
//! machine and the real commands; tests substitute scripted implementations.

use std::path::Path;
use std::process::{Command, ExitStatus};

use log::debug;

use crate::error::{Error, Result};

/// Captured result of one git invocation.
#[derive(Debug)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: ExitStatus,
}

/// Runs `git -C <repo_path> <args...>` and captures its output.
///
/// Only failing to spawn the process is an error here; a non-zero exit
/// status is returned to the caller for interpretation.
pub fn run(repo_path: &Path, args: &[&str]) -> Result<CommandOutput> {
    debug!("git -C {} {}", repo_path.display(), args.join(" "));

    let output = Command::new("git")
        .arg("-C")
        .arg(repo_path)
        .args(args)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .map_err(|e| Error::GitNotFound {
            message: e.to_string(),
        })?;

    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        status: output.status,
    })
}

/// Runs a git command and turns a non-zero exit status into an [`Error`].
fn run_checked(repo_path: &Path, args: &[&str]) -> Result<String> {
    let output = run(repo_path, args)?;
    if !output.status.success() {
        debug!(
            "git {} failed in {} ({})",
            args.join(" "),
            repo_path.display(),
            output.status
        );
        return Err(Error::from_git_failure(
            &args.join(" "),
            &output.stdout,
            &output.stderr,
        ));
    }
    Ok(output.stdout)
}

/// Checks that a usable `git` binary is on the PATH.
pub fn is_available() -> Result<()> {
    let output = Command::new("git")
        .arg("--version")
        .output()
        .map_err(|e| Error::GitNotFound {
            message: e.to_string(),
        })?;
    if !output.status.success() {
        return Err(Error::GitNotFound {
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(())
}

/// Returns the upstream revision expression for a branch.
pub fn upstream_ref(branch: &str) -> String {
    format!("{branch}@{{upstream}}")
}

/// Range of commits on the upstream that are not yet in HEAD.
pub fn incoming_range(branch: &str) -> String {
    format!("HEAD..{branch}@{{upstream}}")
}

/// Range of commits in HEAD that are not yet on the push destination.
pub fn outgoing_range(branch: &str) -> String {
    format!("{branch}@{{push}}..HEAD")
}

/// Commit of the newest stash entry, `None` when the stash list is empty.
fn stash_head(repo_path: &Path) -> Result<Option<String>> {
    let output = run(repo_path, &["rev-parse", "-q", "--verify", "refs/stash"])?;
    let head = output.stdout.trim();
    if !output.status.success() || head.is_empty() {
        return Ok(None);
    }
    Ok(Some(head.to_string()))
}

/// Trait for git operations - allows mocking in tests
pub trait GitOperations: Send + Sync {
    /// Name of the checked out branch. Fails with
    /// [`Error::BranchDetection`] when HEAD is detached.
    fn local_branch(&self, repo_path: &Path) -> Result<String>;

    /// Name of the remote the branch tracks. Fails with
    /// [`Error::NoUpstream`] when the branch has no upstream.
    fn upstream_remote(&self, repo_path: &Path, branch: &str) -> Result<String>;

    fn fetch(&self, repo_path: &Path, remote: &str) -> Result<()>;

    /// Raw `git status --porcelain` output.
    fn status_porcelain(&self, repo_path: &Path) -> Result<String>;

    /// Number of commits in a revision range such as `HEAD..main@{upstream}`.
    fn commit_count(&self, repo_path: &Path, range: &str) -> Result<usize>;

    /// Stashes tracked changes. Returns whether a stash entry was created;
    /// git exits successfully without saving anything when, for example, the
    /// only change is inside a submodule.
    fn stash(&self, repo_path: &Path) -> Result<bool>;

    fn stash_pop(&self, repo_path: &Path) -> Result<()>;

    fn rebase(&self, repo_path: &Path, upstream: &str) -> Result<()>;

    fn push(&self, repo_path: &Path) -> Result<()>;
}

/// The default implementation of `GitOperations`, which uses the system's
/// `git` command.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemGit;

impl GitOperations for SystemGit {
    fn local_branch(&self, repo_path: &Path) -> Result<String> {
        let output = run(repo_path, &["rev-parse", "--abbrev-ref", "HEAD"])?;
        if !output.status.success() {
            return Err(Error::BranchDetection {
                message: "could not resolve HEAD".to_string(),
                stderr: output.stderr,
            });
        }

        let branch = output.stdout.trim();
        if branch == "HEAD" {
            return Err(Error::BranchDetection {
                message: "HEAD is detached".to_string(),
                stderr: output.stderr,
            });
        }
        Ok(branch.to_string())
    }

    fn upstream_remote(&self, repo_path: &Path, branch: &str) -> Result<String> {
        let refname = format!("refs/heads/{branch}");
        let output = run(
            repo_path,
            &["for-each-ref", "--format=%(upstream:remotename)", &refname],
        )?;

        let remote = output.stdout.trim();
        if !output.status.success() || remote.is_empty() {
            return Err(Error::NoUpstream {
                branch: branch.to_string(),
                stderr: output.stderr,
            });
        }
        Ok(remote.to_string())
    }

    fn fetch(&self, repo_path: &Path, remote: &str) -> Result<()> {
        run_checked(repo_path, &["fetch", "--quiet", remote]).map(|_| ())
    }

    fn status_porcelain(&self, repo_path: &Path) -> Result<String> {
        run_checked(repo_path, &["status", "--porcelain"])
    }

    fn commit_count(&self, repo_path: &Path, range: &str) -> Result<usize> {
        let stdout = run_checked(repo_path, &["rev-list", "--count", range])?;
        stdout
            .trim()
            .parse()
            .map_err(|_| Error::CommandExecution {
                command: format!("rev-list --count {range}"),
                stdout: stdout.clone(),
                stderr: "unexpected commit count".to_string(),
            })
    }

    fn stash(&self, repo_path: &Path) -> Result<bool> {
        let before = stash_head(repo_path)?;
        run_checked(repo_path, &["stash", "push", "--quiet"])?;
        let after = stash_head(repo_path)?;
        Ok(after.is_some() && after != before)
    }

    fn stash_pop(&self, repo_path: &Path) -> Result<()> {
        run_checked(repo_path, &["stash", "pop", "--quiet"]).map(|_| ())
    }

    fn rebase(&self, repo_path: &Path, upstream: &str) -> Result<()> {
        run_checked(repo_path, &["rebase", "--quiet", upstream]).map(|_| ())
    }

    fn push(&self, repo_path: &Path) -> Result<()> {
        run_checked(repo_path, &["push", "--quiet"]).map(|_| ())
    }
}
