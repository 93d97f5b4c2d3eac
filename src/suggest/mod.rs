//! Suggestion parsing, commit execution, and file-tree rendering.

pub mod executor;
pub mod parser;
pub mod tree;

pub use executor::{CommitBackend, ExecutionOutcome, StepProgress, execute_operations};
pub use parser::{CommitOperation, is_section_boundary, parse_suggestion};
pub use tree::{FileTreeNode, render_tree};
