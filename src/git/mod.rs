//! Git operations using git2-rs.

pub mod ops;
pub mod snapshot;

pub use ops::Git2Backend;
pub use snapshot::{FileState, RepoSnapshot, StatusEntry, StatusSummary, collect_snapshot};
