//! Rendering of staged file paths as a nested visual tree.

use std::collections::BTreeMap;

/// A node in the file tree: either a file or a directory of named children.
///
/// The `BTreeMap` keeps children in lexicographic order, so rendering is
/// deterministic regardless of input order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileTreeNode {
    Leaf,
    Directory(BTreeMap<String, FileTreeNode>),
}

/// Build a tree from flat slash-separated paths.
///
/// A name that appears both as a file and as a directory prefix collapses
/// into a directory.
fn build_tree(paths: &[String]) -> BTreeMap<String, FileTreeNode> {
    let mut root = BTreeMap::new();
    for path in paths {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if !segments.is_empty() {
            insert_path(&mut root, &segments);
        }
    }
    root
}

fn insert_path(children: &mut BTreeMap<String, FileTreeNode>, segments: &[&str]) {
    let (first, rest) = segments
        .split_first()
        .expect("insert_path is called with at least one segment");

    if rest.is_empty() {
        // Don't clobber an existing directory with a leaf of the same name.
        children.entry((*first).to_string()).or_insert(FileTreeNode::Leaf);
        return;
    }

    let child = children
        .entry((*first).to_string())
        .or_insert_with(|| FileTreeNode::Directory(BTreeMap::new()));
    if matches!(child, FileTreeNode::Leaf) {
        *child = FileTreeNode::Directory(BTreeMap::new());
    }
    if let FileTreeNode::Directory(grandchildren) = child {
        insert_path(grandchildren, rest);
    }
}

/// Render a flat list of paths as tree-drawing lines.
///
/// Directories carry a trailing `/`; the last child of each level uses the
/// `└──` connector and its descendants drop the vertical guide line.
pub fn render_tree(paths: &[String]) -> Vec<String> {
    let mut lines = Vec::new();
    render_level(&build_tree(paths), "", &mut lines);
    lines
}

fn render_level(children: &BTreeMap<String, FileTreeNode>, prefix: &str, lines: &mut Vec<String>) {
    let count = children.len();
    for (position, (name, node)) in children.iter().enumerate() {
        let is_last = position + 1 == count;
        let connector = if is_last { "└── " } else { "├── " };
        match node {
            FileTreeNode::Leaf => lines.push(format!("{prefix}{connector}{name}")),
            FileTreeNode::Directory(grandchildren) => {
                lines.push(format!("{prefix}{connector}{name}/"));
                let child_prefix = if is_last {
                    format!("{prefix}    ")
                } else {
                    format!("{prefix}│   ")
                };
                render_level(grandchildren, &child_prefix, lines);
            }
        }
    }
}
