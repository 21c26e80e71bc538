//! Status tables shown while updating and syncing.
//!
//! [`StatusBoard`] holds the latest published snapshot of every repository.
//! Workers own their repository exclusively and publish a copy after each
//! state change; the renderer composes tables from the board. Each slot has
//! its own lock, held only for the copy.

use std::sync::Mutex;

use crate::error::ErrorKind;
use crate::output::OutputConfig;
use crate::repository::{Repository, State};
use crate::table::Table;

/// Which table to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Update,
    Sync,
}

const PENDING: &str = "...";

/// Latest snapshots of all repositories, in discovery order.
pub struct StatusBoard {
    slots: Vec<Mutex<Repository>>,
}

impl StatusBoard {
    pub fn new(repos: &[Repository]) -> Self {
        Self {
            slots: repos.iter().cloned().map(Mutex::new).collect(),
        }
    }

    /// Replaces the snapshot at `idx`.
    pub fn publish(&self, idx: usize, repo: &Repository) {
        let mut slot = self.slots[idx].lock().unwrap_or_else(|e| e.into_inner());
        *slot = repo.clone();
    }

    pub fn snapshot(&self) -> Vec<Repository> {
        self.slots
            .iter()
            .map(|slot| slot.lock().unwrap_or_else(|e| e.into_inner()).clone())
            .collect()
    }
}

/// Builds the table for `phase`.
pub fn status_table(repos: &[Repository], phase: Phase, output: &OutputConfig) -> Table {
    let mut table = Table::new();
    let heading = match phase {
        Phase::Update => "STATUS",
        Phase::Sync => "ACTIONS",
    };
    table.add_row(["REPOSITORY", "BRANCH", heading]);

    for repo in repos {
        let status = match phase {
            Phase::Update => update_status(repo, output),
            Phase::Sync => sync_status(repo, output),
        };
        table.add_row([output.white(&repo.name), output.white(&repo.branch), status]);
    }
    table
}

fn update_status(repo: &Repository, output: &OutputConfig) -> String {
    match repo.state {
        State::Updated | State::NeedsSync | State::NoSyncNeeded | State::Synced => {
            let mut parts = Vec::new();

            let total = repo.changes.total();
            if total == 0 {
                parts.push(output.green("0*"));
            } else {
                parts.push(output.yellow(&format!("{total}*")));
            }
            if repo.incoming > 0 {
                parts.push(output.yellow(&format!("{}↓", repo.incoming)));
            }
            if repo.outgoing > 0 {
                parts.push(output.yellow(&format!("{}↑", repo.outgoing)));
            }
            if repo.changes.untracked > 0 {
                parts.push(output.yellow(&format!("{}?", repo.changes.untracked)));
            }
            parts.join(" ")
        }
        State::Error => error_label(repo, output),
        State::None => PENDING.to_string(),
    }
}

fn sync_status(repo: &Repository, output: &OutputConfig) -> String {
    match repo.state {
        State::NoSyncNeeded => output.green("Nothing to do"),
        State::Synced => {
            let mut parts = Vec::new();
            if repo.pulled > 0 {
                parts.push(format!("{} pulled", repo.pulled));
            }
            if repo.pushed > 0 {
                parts.push(format!("{} pushed", repo.pushed));
            }
            if parts.is_empty() {
                output.green("Nothing to do")
            } else {
                output.green(&parts.join(", "))
            }
        }
        State::Error => error_label(repo, output),
        State::None | State::Updated | State::NeedsSync => PENDING.to_string(),
    }
}

fn error_label(repo: &Repository, output: &OutputConfig) -> String {
    let label = match repo.failure.as_ref().map(|f| f.kind) {
        Some(ErrorKind::Authentication) => "Auth error",
        Some(ErrorKind::NoUpstream) => "No upstream",
        Some(ErrorKind::BranchDetection) => "Detached HEAD",
        _ => "Error",
    };
    output.red(label)
}
