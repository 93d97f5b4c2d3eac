//! Prompt construction for the commit assistant.

use crate::git::RepoSnapshot;

/// Built-in commit rules used when the user has no `rules.md`.
const DEFAULT_RULES: &str = r#"- Follow Conventional Commits: type(scope): message (feat, fix, chore, docs, refactor, test, perf).
- Keep each commit message on a single line, under 72 characters.
- Group files by logical concern; unrelated changes belong in separate commits.
- Order commits so foundational changes come first."#;

/// Build the system prompt: the assistant role, the exact output grammar the
/// parser understands, and the commit rules.
pub fn build_system_prompt(user_rules: Option<&str>, explain: bool) -> String {
    let rules = user_rules.unwrap_or(DEFAULT_RULES);

    let explain_section = if explain {
        "\nAfter each block, add one line starting with \"why:\" briefly explaining the grouping.\n"
    } else {
        ""
    };

    format!(
        r#"You are a Git commit assistant for the gitmuse CLI.
Your goal is to suggest git commands and commit messages based on the provided changes.

1. Analyze the provided "Git Status", "Git Log", and "Git Diff".
2. Group the changes into one or more commits.
3. For each commit, output a block in exactly this form:

commit 1
git add <file> <file> ...
git commit -m "type(scope): message"

Number the blocks sequentially (commit 1, commit 2, ...). Quote any file path
that contains spaces with double quotes.
{explain_section}
---
RULES:
{rules}
---

IMPORTANT:
- Suggest only 'git add' and 'git commit' commands, nothing else.
- Every commit block must contain at least one 'git add' line and exactly one
  'git commit -m' line.
- The user is reading this in a terminal. Keep any explanation brief.
"#
    )
}

/// Build the user message from the repository snapshot and optional context.
pub fn build_user_message(snapshot: &RepoSnapshot, context: Option<&str>) -> String {
    let untracked = snapshot.status.untracked();
    let untracked_section = if untracked.is_empty() {
        String::new()
    } else {
        format!(
            "\nUntracked Files (New Files):\n{}\n\nIMPORTANT: The above files are NEW and untracked. \
             You MUST suggest 'git add' for them and include them in commits based on their names/purpose.\n",
            untracked.join("\n")
        )
    };

    let context_section = match context {
        Some(ctx) if !ctx.trim().is_empty() => {
            format!("\nContext from the user: {}\n", ctx.trim())
        }
        _ => String::new(),
    };

    format!(
        "Git Status:\n{status}\n{untracked_section}\n\
         Git Log (Last 5 commits):\n{log}\n\n\
         Git Diff:\n{diff}\n{context_section}\n\
         Please suggest the git add commands and the git commit messages.\n",
        status = snapshot.status,
        log = snapshot.log,
        diff = snapshot.diff,
    )
}
