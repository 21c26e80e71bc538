//! End-to-end tests for CLI exit codes.
//!
//! - Exit code 0: Success, nothing to do, or sync declined
//! - Exit code 1: A repository failed, or the run could not start
//! - Exit code 2: Invalid command-line usage (handled by clap)

mod common;
use common::prelude::*;

/// Exit code 0 is returned for --help.
#[test]
fn test_exit_code_help() {
    let mut cmd = cargo_bin_cmd!("tt");

    cmd.arg("--help")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("--local-only"))
        .stdout(predicate::str::contains("--incoming-only"));
}

/// Exit code 0 is returned for --version.
#[test]
fn test_exit_code_version() {
    let mut cmd = cargo_bin_cmd!("tt");

    cmd.arg("--version")
        .assert()
        .code(0)
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

/// Exit code 2 is returned for an unknown flag.
#[test]
fn test_exit_code_unknown_flag() {
    let mut cmd = cargo_bin_cmd!("tt");

    cmd.arg("--frobnicate").assert().code(2);
}

/// Exit code 2 is returned for an invalid --color value.
#[test]
fn test_exit_code_invalid_color() {
    let mut cmd = cargo_bin_cmd!("tt");

    cmd.arg("--color")
        .arg("sometimes")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("sometimes"));
}

/// Completion scripts are printed without touching any repository.
#[test]
fn test_completions() {
    let mut cmd = cargo_bin_cmd!("tt");

    cmd.arg("--completions")
        .arg("bash")
        .assert()
        .code(0)
        .stdout(predicate::str::contains("tt"));
}

/// Exit code 1 is returned when the base directory does not exist.
#[test]
fn test_exit_code_missing_directory() {
    let temp = TempDir::new().unwrap();
    let mut cmd = cargo_bin_cmd!("tt");

    cmd.arg(temp.path().join("does-not-exist"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error:"));
}

/// Exit code 1 is returned when there is nothing to manage.
#[test]
fn test_exit_code_no_repositories() {
    if !git_available() {
        return;
    }
    let temp = TempDir::new().unwrap();
    temp.child("not-a-repo").create_dir_all().unwrap();
    let mut cmd = cargo_bin_cmd!("tt");

    cmd.arg(temp.path())
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No repositories found"));
}

/// Exit code 0 is returned when every repository is up to date.
#[test]
fn test_exit_code_up_to_date() {
    if !git_available() {
        return;
    }
    let fixture = GitFixture::new().with_repo("alpha").with_repo("beta");

    fixture.command().assert().code(0);
}

/// Exit code 1 is returned when a repository fails, while the others are
/// still processed.
#[test]
fn test_exit_code_repository_failure() {
    if !git_available() {
        return;
    }
    let fixture = GitFixture::new()
        .with_repo("alpha")
        .with_unpublished_repo("beta");

    fixture
        .command()
        .assert()
        .code(1)
        .stdout(predicate::str::contains("No upstream"))
        .stdout(predicate::str::is_match(r"alpha\s+\| main\s+\| 0\*").unwrap())
        .stderr(predicate::str::contains("1 repository failed"));
}

/// Exit code 0 is returned when the user declines the sync.
#[test]
fn test_exit_code_declined() {
    if !git_available() {
        return;
    }
    let fixture = GitFixture::new().with_repo("alpha");
    fixture.local_commit("alpha", "local.txt", "local\n");

    fixture.command().write_stdin("n\n").assert().code(0);
}
