//! Shared test utilities for E2E tests.
//!
//! [`GitFixture`] builds a throwaway workspace with real git repositories:
//! every managed working copy lives under `work/` and tracks a bare remote
//! under `remotes/`. A second clone of each remote under `peers/` plays the
//! part of a colleague publishing commits.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     if !git_available() {
//!         return;
//!     }
//!     let fixture = GitFixture::new().with_repo("alpha");
//!     fixture.command().assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::git_available;
    pub use super::GitFixture;
}

/// Returns `true` when a `git` binary can be executed.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Runs git in `dir` and panics with its stderr on failure.
#[allow(dead_code)]
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {} failed in {}: {}",
        args.join(" "),
        dir.display(),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn configure_identity(dir: &Path) {
    git(dir, &["config", "user.email", "test@example.com"]);
    git(dir, &["config", "user.name", "Test"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
}

/// A temporary workspace of git repositories with bare remotes.
pub struct GitFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl GitFixture {
    /// Create a fixture with empty `work/`, `remotes/` and `peers/` dirs.
    pub fn new() -> Self {
        let temp_dir = assert_fs::TempDir::new().expect("Failed to create temp directory");
        for dir in ["work", "remotes", "peers"] {
            temp_dir
                .child(dir)
                .create_dir_all()
                .expect("Failed to create fixture directory");
        }
        Self { temp_dir }
    }

    /// The directory the tool is pointed at.
    pub fn work_dir(&self) -> PathBuf {
        self.temp_dir.path().join("work")
    }

    /// Path of the managed working copy `name`.
    pub fn repo(&self, name: &str) -> PathBuf {
        self.work_dir().join(name)
    }

    fn remote(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join("remotes").join(format!("{name}.git"))
    }

    fn peer(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join("peers").join(name)
    }

    /// Add a working copy on `main` tracking a fresh bare remote, plus a peer
    /// clone of that remote.
    pub fn with_repo(self, name: &str) -> Self {
        let remote = self.remote(name);
        let repo = self.repo(name);
        std::fs::create_dir_all(&remote).expect("Failed to create remote dir");
        std::fs::create_dir_all(&repo).expect("Failed to create repo dir");

        git(&remote, &["init", "--quiet", "--bare", "--initial-branch=main"]);

        git(&repo, &["init", "--quiet", "--initial-branch=main"]);
        configure_identity(&repo);
        std::fs::write(repo.join("README.md"), format!("# {name}\n")).expect("Failed to write");
        git(&repo, &["add", "README.md"]);
        git(&repo, &["commit", "--quiet", "-m", "initial"]);
        git(&repo, &["remote", "add", "origin", path_str(&remote)]);
        git(&repo, &["push", "--quiet", "-u", "origin", "main"]);

        let peers = self.temp_dir.path().join("peers");
        git(&peers, &["clone", "--quiet", path_str(&remote), name]);
        configure_identity(&self.peer(name));
        self
    }

    /// Add a working copy with a commit but no upstream.
    pub fn with_unpublished_repo(self, name: &str) -> Self {
        let repo = self.repo(name);
        std::fs::create_dir_all(&repo).expect("Failed to create repo dir");
        git(&repo, &["init", "--quiet", "--initial-branch=main"]);
        configure_identity(&repo);
        std::fs::write(repo.join("README.md"), "local\n").expect("Failed to write");
        git(&repo, &["add", "README.md"]);
        git(&repo, &["commit", "--quiet", "-m", "initial"]);
        self
    }

    /// Publish a commit to `name`'s remote from the peer clone.
    pub fn push_upstream_commit(&self, name: &str, file: &str, content: &str) -> &Self {
        let peer = self.peer(name);
        std::fs::write(peer.join(file), content).expect("Failed to write");
        git(&peer, &["add", file]);
        git(&peer, &["commit", "--quiet", "-m", &format!("upstream {file}")]);
        git(&peer, &["push", "--quiet", "origin", "main"]);
        self
    }

    /// Commit a file in the managed working copy without pushing.
    pub fn local_commit(&self, name: &str, file: &str, content: &str) -> &Self {
        let repo = self.repo(name);
        std::fs::write(repo.join(file), content).expect("Failed to write");
        git(&repo, &["add", file]);
        git(&repo, &["commit", "--quiet", "-m", &format!("local {file}")]);
        self
    }

    /// Write a file in the managed working copy without committing.
    pub fn edit(&self, name: &str, file: &str, content: &str) -> &Self {
        std::fs::write(self.repo(name).join(file), content).expect("Failed to write");
        self
    }

    /// Number of commits on the remote's `main`.
    pub fn remote_commit_count(&self, name: &str) -> usize {
        git(&self.remote(name), &["rev-list", "--count", "main"])
            .trim()
            .parse()
            .expect("rev-list printed a number")
    }

    /// Current `HEAD` commit of the managed working copy.
    pub fn head(&self, name: &str) -> String {
        git(&self.repo(name), &["rev-parse", "HEAD"]).trim().to_string()
    }

    /// A `tt` command pointed at the work directory, without colors or logs.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("tt");
        cmd.arg(self.work_dir())
            .arg("--color")
            .arg("never")
            .env_remove("TORTUGA_LOG");
        cmd
    }
}

impl Default for GitFixture {
    fn default() -> Self {
        Self::new()
    }
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("Fixture paths are UTF-8")
}
