//! # Tortuga
//!
//! This library keeps a directory full of git working copies level with their
//! upstreams. It is designed to be used by the `tt` command-line tool, but the
//! pieces (porcelain classification, the sync partition, the live table) can
//! be driven on their own.
//!
//! ## Quick Example
//!
//! ```
//! use tortuga::changes::Changes;
//! use tortuga::partition::{classify, Safety};
//!
//! let changes = Changes::from_porcelain(" M src/lib.rs\n?? notes.txt\n");
//! assert_eq!(changes.stashable(), 1);
//! assert_eq!(changes.total(), 2);
//!
//! // Incoming commits on top of local edits must be synced one at a time
//! assert_eq!(classify(2, 0, changes.stashable()), Safety::Unsafe);
//! assert_eq!(classify(0, 3, 0), Safety::Safe);
//! ```
//!
//! ## Core Concepts
//!
//! - **Repository records (`repository`)**: one record per working copy with
//!   a small state machine (`None -> Updated -> NeedsSync | NoSyncNeeded ->
//!   Synced`, or `Error`). All git access goes through the `GitOperations`
//!   trait from the `git` module.
//! - **Change classification (`changes`)**: counts modified, added, deleted,
//!   renamed, copied, unmerged and untracked files from porcelain status.
//! - **Partitioning (`partition`)**: splits the repositories needing a sync
//!   into a group that may run concurrently and one that runs in order.
//! - **Presentation (`table`, `status`, `renderer`, `prompt`, `output`)**:
//!   an aligned, optionally colored status table redrawn in place while
//!   workers report progress, and a yes/no prompt with a help overlay.
//!
//! ## Execution Flow
//!
//! The entry point is [`orchestrator::Orchestrator::run`]:
//!
//! 1.  **Discovery**: list the working copies below the base directory.
//! 2.  **Update**: fetch and count changes in every repository concurrently.
//! 3.  **Confirmation**: ask before modifying anything.
//! 4.  **Sync**: stash, rebase, push and restore, concurrently where safe.

pub mod changes;
pub mod discovery;
pub mod error;
pub mod git;
pub mod orchestrator;
pub mod output;
pub mod partition;
pub mod prompt;
pub mod renderer;
pub mod repository;
pub mod status;
pub mod table;
