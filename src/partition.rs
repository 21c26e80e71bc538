//! Splitting repositories that need a sync into a concurrent and a
//! sequential group.
//!
//! A sync is *safe* when it cannot run into a rebase conflict: either there
//! is nothing to stash and nothing to push (a pure fast-forward style pull),
//! or there are only outgoing commits (a conflict-free push). Everything else
//! combines incoming commits with local work and is run one repository at a
//! time, so the user never faces two failed rebases at once.

use crate::repository::{Repository, State};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Safety {
    Safe,
    Unsafe,
}

/// Classifies a pending sync by its divergence and stashable changes.
pub fn classify(incoming: usize, outgoing: usize, stashable: usize) -> Safety {
    if (outgoing == 0 && stashable == 0) || (incoming == 0 && outgoing > 0) {
        Safety::Safe
    } else {
        Safety::Unsafe
    }
}

/// Indices into the repository list, grouped by how they may be synced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    /// May be synced concurrently.
    pub safe: Vec<usize>,
    /// Must be synced one at a time, in this order.
    pub sequential: Vec<usize>,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.safe.is_empty() && self.sequential.is_empty()
    }

    pub fn len(&self) -> usize {
        self.safe.len() + self.sequential.len()
    }
}

/// Groups every repository in the `NeedsSync` state, keeping discovery
/// order within each group.
pub fn partition(repos: &[Repository]) -> SyncPlan {
    let mut plan = SyncPlan::default();
    for (idx, repo) in repos.iter().enumerate() {
        if repo.state != State::NeedsSync {
            continue;
        }
        match classify(repo.incoming, repo.outgoing, repo.changes.stashable()) {
            Safety::Safe => plan.safe.push(idx),
            Safety::Unsafe => plan.sequential.push(idx),
        }
    }
    plan
}
