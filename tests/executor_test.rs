//! Integration tests for the execution engine against real git repositories.

mod common;

use common::TestRepo;
use gitmuse::error::{ExecutionError, GitError};
use gitmuse::git::Git2Backend;
use gitmuse::suggest::{
    CommitOperation, ExecutionOutcome, StepProgress, execute_operations, parse_suggestion,
};

fn op(files: &[&str], message: &str) -> CommitOperation {
    CommitOperation {
        files: files.iter().map(ToString::to_string).collect(),
        message: message.to_string(),
    }
}

#[test]
fn test_execute_two_grouped_commits() {
    let test_repo = TestRepo::new();
    test_repo.write_file("src/a.rs", "pub fn a() {}\n");
    test_repo.write_file("src/b.rs", "pub fn b() {}\n");
    test_repo.write_file("docs/guide.md", "# Guide\n");

    let operations = vec![
        op(&["src/a.rs", "src/b.rs"], "feat: add a and b"),
        op(&["docs/guide.md"], "docs: add guide"),
    ];

    let mut backend = Git2Backend::new(&test_repo.repo);
    let mut events: Vec<StepProgress> = Vec::new();
    let outcome = execute_operations(&operations, &mut backend, &mut |p| events.push(p.clone()))
        .expect("execution should succeed");

    assert_eq!(outcome, ExecutionOutcome::Completed { steps: 2 });
    assert_eq!(
        test_repo.commit_messages(),
        vec!["docs: add guide", "feat: add a and b"]
    );

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].index, 1);
    assert_eq!(events[0].total, 2);
    assert_eq!(events[0].short_id.len(), 7);
    assert_eq!(events[0].tree, vec!["└── src/", "    ├── a.rs", "    └── b.rs"]);
    assert_eq!(events[1].tree, vec!["└── docs/", "    └── guide.md"]);
}

#[test]
fn test_execute_parsed_suggestion_end_to_end() {
    let test_repo = TestRepo::new();
    test_repo.write_file("main.rs", "fn main() {}\n");
    test_repo.write_file("with space.txt", "spaced\n");

    let suggestion = "commit 1\n\
                      git add main.rs\n\
                      git commit -m \"feat: entry point\"\n\
                      commit 2\n\
                      git add \"with space.txt\"\n\
                      git commit -m \"chore: add spaced file\"\n";

    let operations = parse_suggestion(suggestion);
    assert_eq!(operations.len(), 2);

    let mut backend = Git2Backend::new(&test_repo.repo);
    let outcome = execute_operations(&operations, &mut backend, &mut |_| {})
        .expect("execution should succeed");

    assert_eq!(outcome, ExecutionOutcome::Completed { steps: 2 });
    assert_eq!(
        test_repo.commit_messages(),
        vec!["chore: add spaced file", "feat: entry point"]
    );
}

#[test]
fn test_bad_path_aborts_and_keeps_earlier_commits() {
    let test_repo = TestRepo::new();
    test_repo.write_file("good.rs", "fn good() {}\n");
    test_repo.write_file("other.rs", "fn other() {}\n");

    let operations = vec![
        op(&["good.rs"], "feat: good"),
        op(&["hallucinated.rs"], "feat: does not exist"),
        op(&["other.rs"], "feat: never reached"),
    ];

    let mut backend = Git2Backend::new(&test_repo.repo);
    let mut events: Vec<StepProgress> = Vec::new();
    let err = execute_operations(&operations, &mut backend, &mut |p| events.push(p.clone()))
        .expect_err("step 2 should fail");

    let ExecutionError::Aborted {
        step,
        total,
        completed,
        source,
    } = err;
    assert_eq!(step, 2);
    assert_eq!(total, 3);
    assert_eq!(completed, 1);
    assert!(matches!(source, GitError::NoMatchingFiles { path } if path == "hallucinated.rs"));

    // Step 1 remains committed; step 3 was never attempted.
    assert_eq!(events.len(), 1);
    assert_eq!(test_repo.commit_messages(), vec!["feat: good"]);
}

#[test]
fn test_later_commit_depends_on_earlier_working_tree_state() {
    // The second operation stages a deletion created after the first commit
    // ran; ordering matters.
    let test_repo = TestRepo::new();
    test_repo.write_file("keep.rs", "fn keep() {}\n");
    test_repo.write_file("drop.rs", "fn drop_me() {}\n");
    test_repo.commit_files(&["keep.rs", "drop.rs"], "init");

    test_repo.write_file("keep.rs", "fn keep() { /* updated */ }\n");
    test_repo.remove_file("drop.rs");

    let operations = vec![
        op(&["keep.rs"], "feat: update keep"),
        op(&["drop.rs"], "chore: remove drop"),
    ];

    let mut backend = Git2Backend::new(&test_repo.repo);
    let outcome = execute_operations(&operations, &mut backend, &mut |_| {})
        .expect("execution should succeed");

    assert_eq!(outcome, ExecutionOutcome::Completed { steps: 2 });
    assert_eq!(
        test_repo.commit_messages(),
        vec!["chore: remove drop", "feat: update keep", "init"]
    );

    let tree = test_repo.repo.head().unwrap().peel_to_tree().unwrap();
    assert!(tree.get_path(std::path::Path::new("drop.rs")).is_err());
}

#[test]
fn test_empty_plan_touches_nothing() {
    let test_repo = TestRepo::new();
    test_repo.write_file("untouched.rs", "fn untouched() {}\n");

    let mut backend = Git2Backend::new(&test_repo.repo);
    let outcome = execute_operations(&[], &mut backend, &mut |_| {})
        .expect("empty plan should not error");

    assert_eq!(outcome, ExecutionOutcome::NothingToExecute);
    assert!(test_repo.commit_messages().is_empty());
}
