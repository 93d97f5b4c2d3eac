//! Repository state collection: diff, status, and recent log.
//!
//! Everything here is read-only. The snapshot is rendered to plain text for
//! the model prompt; the structured status doubles as the change detector
//! that gates the whole flow.

use std::fmt;

use git2::{DiffFormat, DiffOptions, ErrorCode, Repository, Status, StatusOptions, Tree};
use tracing::warn;

use crate::error::GitError;

/// Maximum characters for the unified diff text before truncation.
const MAX_DIFF_LENGTH: usize = 30_000;

/// Number of recent commits included in the prompt.
const LOG_COMMIT_COUNT: usize = 5;

/// State of one path in the working tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    Staged,
    Modified,
    Deleted,
    Renamed,
    Untracked,
    Conflicted,
}

impl fmt::Display for FileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileState::Staged => write!(f, "staged"),
            FileState::Modified => write!(f, "modified"),
            FileState::Deleted => write!(f, "deleted"),
            FileState::Renamed => write!(f, "renamed"),
            FileState::Untracked => write!(f, "untracked"),
            FileState::Conflicted => write!(f, "conflicted"),
        }
    }
}

/// One entry of the structured repository status.
#[derive(Debug, Clone)]
pub struct StatusEntry {
    pub path: String,
    pub state: FileState,
}

/// Structured status of the working tree.
#[derive(Debug, Clone, Default)]
pub struct StatusSummary {
    pub entries: Vec<StatusEntry>,
}

impl StatusSummary {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Paths of untracked (new, never-added) files.
    pub fn untracked(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.state == FileState::Untracked)
            .map(|e| e.path.as_str())
            .collect()
    }
}

impl fmt::Display for StatusSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.entries.is_empty() {
            return write!(f, "clean working tree");
        }
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {}", entry.state, entry.path)?;
        }
        Ok(())
    }
}

/// Everything the prompt needs to know about the repository.
#[derive(Debug, Clone)]
pub struct RepoSnapshot {
    /// Unstaged and staged patches, framed for the prompt.
    pub diff: String,
    pub status: StatusSummary,
    /// Recent commit log, one `short-id summary` line per commit.
    pub log: String,
}

impl RepoSnapshot {
    /// Whether there is anything to commit (staged, unstaged, or untracked).
    pub fn has_changes(&self) -> bool {
        !self.status.is_empty()
    }
}

/// Collect diff, status, and recent log in one pass.
pub fn collect_snapshot(repo: &Repository) -> Result<RepoSnapshot, GitError> {
    Ok(RepoSnapshot {
        diff: collect_diff_text(repo)?,
        status: collect_status(repo)?,
        log: collect_log(repo, LOG_COMMIT_COUNT)?,
    })
}

/// Resolve the HEAD tree, treating an unborn branch as "no tree yet".
fn resolve_head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, GitError> {
    let head_ref = match repo.head() {
        Ok(r) => r,
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(None);
        }
        Err(e) => return Err(GitError::DiffFailed(e)),
    };

    let tree = head_ref.peel_to_tree().map_err(GitError::DiffFailed)?;
    Ok(Some(tree))
}

/// Render the working-tree changes as `Unstaged Changes` / `Staged Changes`
/// patch sections.
fn collect_diff_text(repo: &Repository) -> Result<String, GitError> {
    let head_tree = resolve_head_tree(repo)?;

    let mut unstaged_opts = DiffOptions::new();
    unstaged_opts.include_untracked(true).recurse_untracked_dirs(true);
    let unstaged = repo
        .diff_index_to_workdir(None, Some(&mut unstaged_opts))
        .map_err(GitError::DiffFailed)?;

    let staged = repo
        .diff_tree_to_index(head_tree.as_ref(), None, None)
        .map_err(GitError::DiffFailed)?;

    let mut truncated = false;
    let mut unstaged_text = String::new();
    append_patch_text(&unstaged, &mut unstaged_text, &mut truncated);
    let mut staged_text = String::new();
    if !truncated {
        append_patch_text(&staged, &mut staged_text, &mut truncated);
    }

    if truncated {
        warn!("diff exceeds {MAX_DIFF_LENGTH} characters, truncating prompt input");
    }

    Ok(format!(
        "Unstaged Changes:\n{unstaged_text}\n\nStaged Changes:\n{staged_text}"
    ))
}

/// Append unified patch text from a diff, respecting the shared length budget.
fn append_patch_text(diff: &git2::Diff<'_>, text: &mut String, truncated: &mut bool) {
    if let Err(e) = diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        if *truncated {
            return true;
        }

        let content = std::str::from_utf8(line.content()).unwrap_or("");
        if text.len() + content.len() + 2 > MAX_DIFF_LENGTH {
            *truncated = true;
            return true;
        }

        let origin = line.origin();
        if origin == '+' || origin == '-' || origin == ' ' {
            text.push(origin);
        }
        text.push_str(content);
        true
    }) {
        warn!("Failed to collect diff text: {e}");
        *truncated = true;
    }
}

/// Classify one git2 status bitfield into a single display state.
///
/// A path can carry both index and worktree flags; conflicts win, then the
/// index (staged) side, then the worktree side.
fn classify_status(status: Status) -> Option<FileState> {
    if status.is_conflicted() {
        return Some(FileState::Conflicted);
    }
    if status.is_index_new()
        || status.is_index_modified()
        || status.is_index_deleted()
        || status.is_index_renamed()
        || status.is_index_typechange()
    {
        return Some(FileState::Staged);
    }
    if status.is_wt_renamed() {
        return Some(FileState::Renamed);
    }
    if status.is_wt_deleted() {
        return Some(FileState::Deleted);
    }
    if status.is_wt_modified() || status.is_wt_typechange() {
        return Some(FileState::Modified);
    }
    if status.is_wt_new() {
        return Some(FileState::Untracked);
    }
    None
}

fn collect_status(repo: &Repository) -> Result<StatusSummary, GitError> {
    let mut opts = StatusOptions::new();
    opts.include_untracked(true).recurse_untracked_dirs(true);

    let statuses = repo
        .statuses(Some(&mut opts))
        .map_err(GitError::StatusFailed)?;

    let mut entries = Vec::new();
    for entry in statuses.iter() {
        let Some(path) = entry.path() else { continue };
        if let Some(state) = classify_status(entry.status()) {
            entries.push(StatusEntry {
                path: path.to_string(),
                state,
            });
        }
    }

    Ok(StatusSummary { entries })
}

/// Render the last `max_count` commits as `short-id summary` lines.
fn collect_log(repo: &Repository, max_count: usize) -> Result<String, GitError> {
    let mut revwalk = match repo.revwalk() {
        Ok(r) => r,
        Err(e) => return Err(GitError::LogFailed(e)),
    };

    match revwalk.push_head() {
        Ok(()) => {}
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok("No commits yet.".to_string());
        }
        Err(e) => return Err(GitError::LogFailed(e)),
    }

    let mut lines = Vec::new();
    for oid in revwalk.take(max_count) {
        let oid = oid.map_err(GitError::LogFailed)?;
        let commit = repo.find_commit(oid).map_err(GitError::LogFailed)?;
        let id = oid.to_string();
        let short = &id[..7.min(id.len())];
        lines.push(format!("{} {}", short, commit.summary().unwrap_or("")));
    }

    if lines.is_empty() {
        return Ok("No commits yet.".to_string());
    }
    Ok(lines.join("\n"))
}
