//! The git2-backed staging/commit implementation of [`CommitBackend`].

use std::cell::Cell;
use std::path::Path;

use git2::{ErrorCode, IndexAddOption, Repository};

use crate::error::GitError;
use crate::suggest::CommitBackend;

/// Stages and commits through a borrowed [`Repository`].
pub struct Git2Backend<'r> {
    repo: &'r Repository,
}

impl<'r> Git2Backend<'r> {
    pub fn new(repo: &'r Repository) -> Self {
        Self { repo }
    }
}

impl CommitBackend for Git2Backend<'_> {
    /// Stage each pathspec like `git add -A <path>`.
    ///
    /// Each entry may be a file, a directory, or a glob. A pathspec that
    /// matches nothing in the working tree (including ignored-only matches)
    /// raises the distinct [`GitError::NoMatchingFiles`] so the executor can
    /// report which suggested path was wrong.
    fn stage(&mut self, files: &[String]) -> Result<(), GitError> {
        let mut index = self.repo.index().map_err(GitError::StagingFailed)?;

        for file in files {
            let matched = Cell::new(0usize);
            let mut on_match = |_path: &Path, _spec: &[u8]| -> i32 {
                matched.set(matched.get() + 1);
                0
            };

            // add_all stages new and modified files; update_all stages
            // modifications and deletions of tracked files. Together they
            // cover `git add -A` for one pathspec.
            index
                .add_all(
                    std::iter::once(file.as_str()),
                    IndexAddOption::DEFAULT,
                    Some(&mut on_match),
                )
                .map_err(GitError::StagingFailed)?;
            index
                .update_all(std::iter::once(file.as_str()), Some(&mut on_match))
                .map_err(GitError::StagingFailed)?;

            if matched.get() == 0 {
                return Err(GitError::NoMatchingFiles { path: file.clone() });
            }
        }

        index.write().map_err(GitError::StagingFailed)
    }

    /// Commit the staged index on HEAD; returns the full commit id.
    ///
    /// Works on an unborn branch too (the initial commit has no parent).
    fn commit(&mut self, message: &str) -> Result<String, GitError> {
        let mut index = self.repo.index().map_err(GitError::CommitFailed)?;
        let tree_id = index.write_tree().map_err(GitError::CommitFailed)?;
        let tree = self.repo.find_tree(tree_id).map_err(GitError::CommitFailed)?;

        let sig = self.repo.signature().map_err(GitError::ConfigError)?;

        let parent = match self.repo.head() {
            Ok(head) => Some(head.peel_to_commit().map_err(GitError::CommitFailed)?),
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                None
            }
            Err(e) => return Err(GitError::CommitFailed(e)),
        };
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        let oid = self
            .repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .map_err(GitError::CommitFailed)?;

        Ok(oid.to_string())
    }
}
