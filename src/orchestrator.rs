//! # Orchestrator
//!
//! Drives one complete run:
//!
//! 1.  **Discovery**: find the working copies under the base directory and
//!     resolve their branch and upstream.
//! 2.  **Update**: refresh every repository concurrently, one worker per
//!     repository, redrawing the status table as each one finishes.
//! 3.  **Confirmation**: unless told otherwise, ask before touching anything.
//! 4.  **Sync**: reconcile the safe group concurrently, then the unsafe group
//!     one repository at a time in discovery order.
//!
//! A repository that fails only marks itself as failed; the run continues
//! with the others. Repository records live in one `Vec`; every worker gets
//! exclusive access to exactly one element through `par_iter_mut`, and
//! publishes a snapshot to the [`StatusBoard`] before requesting a redraw.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use log::{debug, info};
use rayon::prelude::*;
use rayon::ThreadPool;

use crate::discovery;
use crate::error::Result;
use crate::git::GitOperations;
use crate::output::OutputConfig;
use crate::partition::{partition, SyncPlan};
use crate::prompt;
use crate::renderer::LiveRenderer;
use crate::repository::Repository;
use crate::status::{status_table, Phase, StatusBoard};
use crate::table::Table;

/// What to do in a run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub base_dir: PathBuf,
    /// Skip fetching and the whole sync phase.
    pub local_only: bool,
    /// Sync without asking.
    pub assume_yes: bool,
    /// Stash and rebase, but never push.
    pub incoming_only: bool,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Local-only mode; nothing was synced.
    Checked,
    /// No repository needed a sync.
    NothingToSync,
    /// The user declined the sync.
    Declined,
    Synced,
}

#[derive(Debug)]
pub struct RunSummary {
    pub outcome: Outcome,
    pub repositories: Vec<Repository>,
}

impl RunSummary {
    pub fn failed(&self) -> Vec<&Repository> {
        self.repositories.iter().filter(|r| r.is_failed()).collect()
    }

    /// `1` when any repository failed, `0` otherwise.
    pub fn exit_code(&self) -> i32 {
        if self.repositories.iter().any(Repository::is_failed) {
            1
        } else {
            0
        }
    }
}

pub struct Orchestrator<'a, W: Write + Send> {
    git: &'a dyn GitOperations,
    renderer: &'a LiveRenderer<W>,
    output: OutputConfig,
}

impl<'a, W: Write + Send> Orchestrator<'a, W> {
    pub fn new(
        git: &'a dyn GitOperations,
        renderer: &'a LiveRenderer<W>,
        output: OutputConfig,
    ) -> Self {
        Self {
            git,
            renderer,
            output,
        }
    }

    /// Executes a full run. `input` supplies the answer to the confirmation
    /// prompt.
    pub fn run<R: BufRead>(&self, options: &RunOptions, input: &mut R) -> Result<RunSummary> {
        let paths = discovery::require_repositories(&options.base_dir)?;
        info!(
            "Found {} repositories in {}",
            paths.len(),
            options.base_dir.display()
        );

        let pool = worker_pool(paths.len())?;
        let mut repos = self.open_all(&pool, &paths);
        self.update_phase(
            &pool,
            &mut repos,
            !options.local_only,
            options.incoming_only,
        )?;

        if options.local_only {
            return Ok(RunSummary {
                outcome: Outcome::Checked,
                repositories: repos,
            });
        }

        let plan = partition(&repos);
        if plan.is_empty() {
            info!("Nothing to sync");
            return Ok(RunSummary {
                outcome: Outcome::NothingToSync,
                repositories: repos,
            });
        }

        if !options.assume_yes {
            let help = plan_overview(&repos, &plan, options.incoming_only, &self.output);
            let question = if options.incoming_only {
                "Stash and rebase?"
            } else {
                "Stash, rebase and push?"
            };
            if !prompt::confirm(self.renderer, input, question, &help, &self.output)? {
                return Ok(RunSummary {
                    outcome: Outcome::Declined,
                    repositories: repos,
                });
            }
        }

        self.sync_phase(&pool, &mut repos, &plan, options.incoming_only)?;
        Ok(RunSummary {
            outcome: Outcome::Synced,
            repositories: repos,
        })
    }

    fn open_all(&self, pool: &ThreadPool, paths: &[PathBuf]) -> Vec<Repository> {
        let git = self.git;
        pool.install(|| {
            paths
                .par_iter()
                .map(|path| Repository::open(path.as_path(), git))
                .collect()
        })
    }

    /// Updates every repository concurrently, then classifies them.
    pub fn update_phase(
        &self,
        pool: &ThreadPool,
        repos: &mut [Repository],
        fetch: bool,
        incoming_only: bool,
    ) -> Result<()> {
        let board = StatusBoard::new(repos);
        self.refresh(&board, Phase::Update)?;

        let git = self.git;
        pool.install(|| {
            repos.par_iter_mut().enumerate().for_each(|(idx, repo)| {
                repo.update(git, fetch);
                board.publish(idx, repo);
                self.refresh_quietly(&board, Phase::Update);
            });
        });

        for repo in repos.iter_mut() {
            repo.classify(incoming_only);
        }
        self.draw(repos, Phase::Update)
    }

    /// Syncs the safe group concurrently, then the sequential group in order.
    pub fn sync_phase(
        &self,
        pool: &ThreadPool,
        repos: &mut [Repository],
        plan: &SyncPlan,
        incoming_only: bool,
    ) -> Result<()> {
        info!(
            "Syncing {} repositories ({} concurrently)",
            plan.len(),
            plan.safe.len()
        );
        self.renderer.detach();
        let board = StatusBoard::new(repos);
        self.refresh(&board, Phase::Sync)?;

        let mut safe = vec![false; repos.len()];
        for &idx in &plan.safe {
            safe[idx] = true;
        }

        let git = self.git;
        pool.install(|| {
            repos
                .par_iter_mut()
                .enumerate()
                .filter(|(idx, _)| safe[*idx])
                .for_each(|(idx, repo)| {
                    repo.sync(git, incoming_only);
                    board.publish(idx, repo);
                    self.refresh_quietly(&board, Phase::Sync);
                });
        });

        for &idx in &plan.sequential {
            let repo = &mut repos[idx];
            debug!("Syncing {} sequentially", repo.name);
            repo.sync(git, incoming_only);
            board.publish(idx, repo);
            self.refresh(&board, Phase::Sync)?;
        }

        self.draw(repos, Phase::Sync)
    }

    fn refresh(&self, board: &StatusBoard, phase: Phase) -> Result<()> {
        let output = self.output;
        self.renderer.render(|buf| {
            let table = status_table(&board.snapshot(), phase, &output);
            buf.push_str(&table.render());
        })?;
        Ok(())
    }

    /// Worker-side refresh; a failed intermediate frame is superseded by the
    /// final draw after the join barrier.
    fn refresh_quietly(&self, board: &StatusBoard, phase: Phase) {
        if let Err(e) = self.refresh(board, phase) {
            debug!("Redraw failed: {}", e);
        }
    }

    fn draw(&self, repos: &[Repository], phase: Phase) -> Result<()> {
        let output = self.output;
        self.renderer
            .render(|buf| buf.push_str(&status_table(repos, phase, &output).render()))?;
        Ok(())
    }
}

/// Thread pool with one worker per repository.
pub fn worker_pool(repositories: usize) -> Result<ThreadPool> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(repositories.max(1))
        .thread_name(|i| format!("tortuga-worker-{i}"))
        .build()?;
    Ok(pool)
}

/// Help text listing what a sync would do for each repository.
pub fn plan_overview(
    repos: &[Repository],
    plan: &SyncPlan,
    incoming_only: bool,
    output: &OutputConfig,
) -> String {
    let mut table = Table::new();
    let groups = [(&plan.safe, "concurrent"), (&plan.sequential, "sequential")];
    for (indices, mode) in groups {
        for &idx in indices {
            let repo = &repos[idx];
            let mut steps = Vec::new();
            if repo.changes.stashable() > 0 {
                steps.push("stash");
            }
            if repo.incoming > 0 {
                steps.push("rebase");
            }
            if !incoming_only && repo.outgoing > 0 {
                steps.push("push");
            }
            if repo.changes.stashable() > 0 {
                steps.push("stash pop");
            }
            table.add_row([
                format!("  {}", output.white(&repo.name)),
                steps.join(" → "),
                mode.to_string(),
            ]);
        }
    }
    table.render()
}

/// Writes the failure count and, when `verbose`, each failed repository's
/// diagnostics.
pub fn write_failure_report<E: Write>(
    err: &mut E,
    repos: &[Repository],
    verbose: bool,
    output: &OutputConfig,
) -> std::io::Result<()> {
    let failed: Vec<&Repository> = repos.iter().filter(|r| r.is_failed()).collect();
    if failed.is_empty() {
        return Ok(());
    }

    let noun = if failed.len() == 1 {
        "repository"
    } else {
        "repositories"
    };
    writeln!(err, "{}", output.red(&format!("{} {noun} failed", failed.len())))?;
    if !verbose {
        return Ok(());
    }

    for repo in failed {
        writeln!(err)?;
        writeln!(err, "{} ({})", output.bold(&repo.name), repo.path().display())?;
        if let Some(failure) = &repo.failure {
            writeln!(err, "  {}", failure.message)?;
            for line in failure.diagnostics.lines() {
                writeln!(err, "    {line}")?;
            }
            if let Some(cleanup) = &failure.cleanup {
                writeln!(err, "  while restoring stashed changes:")?;
                for line in cleanup.lines() {
                    writeln!(err, "    {line}")?;
                }
            }
        }
    }
    Ok(())
}
