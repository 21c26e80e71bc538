//! # Repository Record and State Machine
//!
//! A [`Repository`] is one working copy under management. It is created by
//! [`Repository::open`], refreshed by [`Repository::update`] and reconciled
//! with its upstream by [`Repository::sync`]. All git access goes through a
//! [`GitOperations`] implementation, so the whole state machine can be driven
//! by scripted git in tests.
//!
//! ## States
//!
//! ```text
//! None -> Updated -> NeedsSync | NoSyncNeeded -> Synced
//! ```
//!
//! Any step may land on `Error` instead. `Error` is terminal: once a
//! repository has failed, no further git command is issued for it.

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::changes::Changes;
use crate::error::{Error, Failure};
use crate::git::{self, GitOperations};

/// Placeholder shown when the branch could not be determined.
pub const UNKNOWN_BRANCH: &str = "???";

/// Where a repository is in the update/sync workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    /// Discovered, nothing checked yet.
    #[default]
    None,
    /// Local changes and incoming/outgoing counts are known.
    Updated,
    /// Has incoming or outgoing commits.
    NeedsSync,
    /// Already level with its upstream.
    NoSyncNeeded,
    Synced,
    /// A command failed; the repository takes no further actions.
    Error,
}

#[derive(Debug, Clone)]
pub struct Repository {
    path: PathBuf,

    pub name: String,
    pub branch: String,
    pub remote: String,
    pub changes: Changes,
    pub incoming: usize,
    pub outgoing: usize,
    /// Commits integrated by the last successful sync.
    pub pulled: usize,
    /// Commits published by the last successful sync.
    pub pushed: usize,
    pub state: State,
    pub failure: Option<Failure>,
}

impl Repository {
    /// Creates the record for the working copy at `path` and resolves its
    /// branch and upstream remote.
    ///
    /// Never fails outright: when the branch or upstream cannot be resolved
    /// the record comes back in the `Error` state so it can still be listed.
    pub fn open(path: impl Into<PathBuf>, git: &dyn GitOperations) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        let mut repo = Self {
            path,
            name,
            branch: UNKNOWN_BRANCH.to_string(),
            remote: String::new(),
            changes: Changes::default(),
            incoming: 0,
            outgoing: 0,
            pulled: 0,
            pushed: 0,
            state: State::None,
            failure: None,
        };

        match git.local_branch(&repo.path) {
            Ok(branch) => repo.branch = branch,
            Err(e) => {
                repo.fail(&e);
                return repo;
            }
        }

        match git.upstream_remote(&repo.path, &repo.branch) {
            Ok(remote) => repo.remote = remote,
            Err(e) => repo.fail(&e),
        }
        repo
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_failed(&self) -> bool {
        self.state == State::Error
    }

    pub fn needs_sync(&self) -> bool {
        self.incoming > 0 || self.outgoing > 0
    }

    /// Refreshes local changes and incoming/outgoing commit counts,
    /// fetching the upstream remote first when `fetch` is set.
    pub fn update(&mut self, git: &dyn GitOperations, fetch: bool) {
        if self.is_failed() {
            return;
        }
        if let Err(e) = self.try_update(git, fetch) {
            self.fail(&e);
            return;
        }
        self.state = State::Updated;
    }

    fn try_update(&mut self, git: &dyn GitOperations, fetch: bool) -> crate::error::Result<()> {
        if fetch {
            git.fetch(&self.path, &self.remote)?;
        }

        let status = git.status_porcelain(&self.path)?;
        self.changes = Changes::from_porcelain(&status);

        self.incoming = git.commit_count(&self.path, &git::incoming_range(&self.branch))?;
        self.outgoing = git.commit_count(&self.path, &git::outgoing_range(&self.branch))?;

        debug!(
            "{}: {} changes, {} incoming, {} outgoing",
            self.name,
            self.changes.total(),
            self.incoming,
            self.outgoing
        );
        Ok(())
    }

    /// Moves an updated repository to `NeedsSync` or `NoSyncNeeded`.
    ///
    /// With `incoming_only` nothing will be pushed, so only incoming commits
    /// make a sync necessary.
    pub fn classify(&mut self, incoming_only: bool) {
        if self.state != State::Updated {
            return;
        }
        let needed = if incoming_only {
            self.incoming > 0
        } else {
            self.needs_sync()
        };
        self.state = if needed {
            State::NeedsSync
        } else {
            State::NoSyncNeeded
        };
    }

    /// Stashes local edits, rebases onto the upstream, pushes local commits
    /// (unless `incoming_only`) and restores the stash.
    ///
    /// When the rebase or push fails after a stash was taken, the stash is
    /// popped again on a best-effort basis. The rebase/push failure stays the
    /// reported cause; a failing pop is only kept as cleanup context.
    pub fn sync(&mut self, git: &dyn GitOperations, incoming_only: bool) {
        if self.is_failed() {
            return;
        }

        let mut stashed = false;
        if self.changes.stashable() > 0 {
            match git.stash(&self.path) {
                Ok(saved) => stashed = saved,
                Err(e) => {
                    self.fail(&e);
                    return;
                }
            }
            if !stashed {
                debug!("{}: stash saved nothing, skipping pop", self.name);
            }
        }

        if self.incoming > 0 {
            if let Err(e) = git.rebase(&self.path, &git::upstream_ref(&self.branch)) {
                self.fail_after_stash(git, stashed, &e);
                return;
            }
        }

        let push = !incoming_only && self.outgoing > 0;
        if push {
            if let Err(e) = git.push(&self.path) {
                self.fail_after_stash(git, stashed, &e);
                return;
            }
        }

        if stashed {
            if let Err(e) = git.stash_pop(&self.path) {
                self.fail(&e);
                return;
            }
        }

        self.pulled = self.incoming;
        self.pushed = if push { self.outgoing } else { 0 };
        self.state = State::Synced;
        info!("{}: synced", self.name);
    }

    fn fail_after_stash(&mut self, git: &dyn GitOperations, stashed: bool, cause: &Error) {
        let mut failure = Failure::from(cause);
        if stashed {
            if let Err(pop) = git.stash_pop(&self.path) {
                failure = failure.with_cleanup(&pop);
            }
        }
        self.record(failure);
    }

    fn fail(&mut self, err: &Error) {
        self.record(Failure::from(err));
    }

    fn record(&mut self, failure: Failure) {
        debug!("{}: {}", self.name, failure);
        self.state = State::Error;
        self.failure = Some(failure);
    }
}
