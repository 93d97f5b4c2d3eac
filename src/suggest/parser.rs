//! Parsing of model responses into executable commit operations.
//!
//! The model replies in loosely structured text: numbered `commit N` section
//! markers, `git add` lines, `git commit -m` lines, and free-form prose in
//! between. The parser recovers the machine-actionable parts and drops
//! everything else. It is total: malformed input yields a shorter (possibly
//! empty) result, never an error.

use std::sync::OnceLock;

use regex_lite::Regex;

/// One executable commit: the files to stage and the message to commit with.
///
/// Files are kept in the order the model listed them, duplicates included.
/// Validation against the working tree happens at execution time, not here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOperation {
    pub files: Vec<String>,
    pub message: String,
}

/// Line categories the scanner distinguishes.
enum LineKind<'a> {
    /// A `commit N` section marker.
    Boundary,
    /// A `git add …` directive; holds the text after the prefix.
    Add(&'a str),
    /// A `git commit -m …` directive; holds the text after the prefix.
    Message(&'a str),
    /// Prose, blank lines, anything else.
    Other,
}

/// Matches a full trimmed line of the form `commit 3` (case-insensitive).
pub fn is_section_boundary(line: &str) -> bool {
    static BOUNDARY: OnceLock<Regex> = OnceLock::new();
    let re = BOUNDARY.get_or_init(|| {
        Regex::new(r"(?i)^commit\s+\d+$").expect("boundary regex is valid")
    });
    re.is_match(line.trim())
}

fn classify(line: &str) -> LineKind<'_> {
    let trimmed = line.trim();
    if is_section_boundary(trimmed) {
        return LineKind::Boundary;
    }
    if let Some(rest) = trimmed.strip_prefix("git add ") {
        return LineKind::Add(rest);
    }
    if let Some(rest) = trimmed.strip_prefix("git commit -m ") {
        return LineKind::Message(rest);
    }
    LineKind::Other
}

/// Parse a model response into an ordered list of commit operations.
///
/// Two registers accumulate state while scanning: the pending file list and
/// the pending message. A section boundary flushes them as one operation when
/// both are populated and resets them either way, so a block missing its
/// files or its message is dropped whole. A trailing block without a closing
/// boundary is still captured.
pub fn parse_suggestion(text: &str) -> Vec<CommitOperation> {
    let mut operations = Vec::new();
    let mut pending_files: Vec<String> = Vec::new();
    let mut pending_message: Option<String> = None;

    for line in text.lines() {
        match classify(line) {
            LineKind::Boundary => {
                flush(&mut operations, &mut pending_files, &mut pending_message);
            }
            LineKind::Add(rest) => {
                pending_files.extend(tokenize_paths(rest));
            }
            LineKind::Message(rest) => {
                // Last message directive in a section wins.
                if let Some(message) = extract_quoted(rest) {
                    pending_message = Some(message);
                }
            }
            LineKind::Other => {}
        }
    }

    flush(&mut operations, &mut pending_files, &mut pending_message);
    operations
}

/// Flush the accumulators as one operation if both are populated, then reset.
fn flush(
    operations: &mut Vec<CommitOperation>,
    pending_files: &mut Vec<String>,
    pending_message: &mut Option<String>,
) {
    if !pending_files.is_empty() {
        if let Some(message) = pending_message.take() {
            operations.push(CommitOperation {
                files: std::mem::take(pending_files),
                message,
            });
        }
    }
    pending_files.clear();
    *pending_message = None;
}

/// Tokenize the remainder of a `git add` line into path tokens.
///
/// A token is either a maximal run of non-whitespace, non-quote characters or
/// a double-quoted span (so paths with spaces survive). Surrounding quotes
/// are stripped from each token. An unterminated quote swallows the rest of
/// the line as one token.
fn tokenize_paths(rest: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = rest.char_indices().peekable();

    while let Some(&(start, ch)) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }
        if ch == '"' {
            chars.next();
            let mut token = String::new();
            for (_, c) in chars.by_ref() {
                if c == '"' {
                    break;
                }
                token.push(c);
            }
            if !token.is_empty() {
                tokens.push(token);
            }
            continue;
        }
        let mut end = start;
        while let Some(&(idx, c)) = chars.peek() {
            if c.is_whitespace() || c == '"' {
                break;
            }
            end = idx + c.len_utf8();
            chars.next();
        }
        let token = strip_surrounding_quotes(&rest[start..end]);
        if !token.is_empty() {
            tokens.push(token.to_string());
        }
    }

    tokens
}

/// Strip one matching pair of surrounding single quotes, if present.
fn strip_surrounding_quotes(token: &str) -> &str {
    if token.len() >= 2 && token.starts_with('\'') && token.ends_with('\'') {
        &token[1..token.len() - 1]
    } else {
        token
    }
}

/// Extract the first substring enclosed in matching single or double quotes.
fn extract_quoted(rest: &str) -> Option<String> {
    let open = rest.find(['"', '\''])?;
    let quote = rest[open..].chars().next()?;
    let body = &rest[open + quote.len_utf8()..];
    let close = body.find(quote)?;
    let content = &body[..close];
    if content.is_empty() {
        return None;
    }
    Some(content.to_string())
}
