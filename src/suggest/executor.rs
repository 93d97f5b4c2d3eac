//! Sequential application of commit operations against the repository.
//!
//! The engine owns no git plumbing itself: staging and committing are
//! injected through [`CommitBackend`], so tests can script failures and the
//! CLI wires in the git2-backed implementation. Operations run strictly in
//! order — a later operation's staging may depend on the working-tree state
//! an earlier commit left behind.

use crate::error::{ExecutionError, GitError};
use crate::suggest::parser::CommitOperation;
use crate::suggest::tree::render_tree;

/// Length of the short commit id used for progress display.
const SHORT_ID_LEN: usize = 7;

/// The two repository capabilities the engine needs.
pub trait CommitBackend {
    /// Stage the given paths for the next commit.
    fn stage(&mut self, files: &[String]) -> Result<(), GitError>;

    /// Commit the staged changes; returns the full commit id.
    fn commit(&mut self, message: &str) -> Result<String, GitError>;
}

/// Progress event emitted after each successful commit.
#[derive(Debug, Clone)]
pub struct StepProgress {
    /// 1-based step number.
    pub index: usize,
    /// Total number of operations in the plan.
    pub total: usize,
    /// Short form of the created commit's id.
    pub short_id: String,
    /// The commit message that was used.
    pub message: String,
    /// Rendered tree of the files staged for this step.
    pub tree: Vec<String>,
}

/// Terminal state of a successful engine run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionOutcome {
    /// Every operation was staged and committed.
    Completed { steps: usize },
    /// The plan was empty; the repository was not touched.
    NothingToExecute,
}

/// Apply the operations in order, reporting progress after each commit.
///
/// The first staging or commit failure aborts the remaining sequence.
/// Already-created commits stay in place — there is no rollback; the caller
/// reports the committed/failed split to the user. Confirmation must happen
/// before this is called: the engine mutates the repository unconditionally.
pub fn execute_operations(
    operations: &[CommitOperation],
    backend: &mut dyn CommitBackend,
    on_step: &mut dyn FnMut(&StepProgress),
) -> Result<ExecutionOutcome, ExecutionError> {
    if operations.is_empty() {
        return Ok(ExecutionOutcome::NothingToExecute);
    }

    let total = operations.len();
    for (position, operation) in operations.iter().enumerate() {
        let step = position + 1;

        backend
            .stage(&operation.files)
            .map_err(|source| ExecutionError::Aborted {
                step,
                total,
                completed: position,
                source,
            })?;

        let commit_id =
            backend
                .commit(&operation.message)
                .map_err(|source| ExecutionError::Aborted {
                    step,
                    total,
                    completed: position,
                    source,
                })?;

        on_step(&StepProgress {
            index: step,
            total,
            short_id: commit_id.chars().take(SHORT_ID_LEN).collect(),
            message: operation.message.clone(),
            tree: render_tree(&operation.files),
        });
    }

    Ok(ExecutionOutcome::Completed { steps: total })
}
