//! Line-oriented unified diffs and the add/delete operations derived from them.
//!
//! Lines are produced by splitting on `\n` only, so a trailing newline shows
//! up as a final empty line and joining the lines back with `\n` restores
//! the exact text.

use regex::Regex;
use similar::{ChangeTag, DiffTag, TextDiff};
use std::sync::LazyLock;

use crate::domain::models::{DiffOpKind, DiffOperation};

/// Context lines around each hunk
pub const DEFAULT_CONTEXT: usize = 3;

static HUNK_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@").expect("valid hunk header regex")
});

pub fn split_lines(content: &str) -> Vec<&str> {
    content.split('\n').collect()
}

/// Unified diff between `original` and `modified` with `--- original` /
/// `+++ modified` headers. Empty when the two bodies are identical.
pub fn unified_diff(original: &str, modified: &str, context: usize) -> Vec<String> {
    let old = split_lines(original);
    let new = split_lines(modified);
    let diff = TextDiff::from_slices(&old, &new);

    let mut out = Vec::new();
    for group in diff.grouped_ops(context) {
        if group.iter().all(|op| op.tag() == DiffTag::Equal) {
            continue;
        }
        let (Some(first), Some(last)) = (group.first(), group.last()) else {
            continue;
        };

        if out.is_empty() {
            out.push("--- original".to_string());
            out.push("+++ modified".to_string());
        }
        out.push(format!(
            "@@ -{} +{} @@",
            format_range(first.old_range().start, last.old_range().end),
            format_range(first.new_range().start, last.new_range().end),
        ));

        for op in &group {
            for change in diff.iter_changes(op) {
                let marker = match change.tag() {
                    ChangeTag::Delete => '-',
                    ChangeTag::Insert => '+',
                    ChangeTag::Equal => ' ',
                };
                out.push(format!("{marker}{}", change.value()));
            }
        }
    }
    out
}

/// `start,len` range of a hunk header for the half-open range `[start, end)`
fn format_range(start: usize, end: usize) -> String {
    let length = end - start;
    match length {
        0 => format!("{start},0"),
        1 => format!("{}", start + 1),
        _ => format!("{},{length}", start + 1),
    }
}

/// Number of addition lines in a unified diff, ignoring the `+++` header
pub fn count_added_lines<S: AsRef<str>>(diff: &[S]) -> usize {
    let mut in_hunk = false;
    let mut added = 0;
    for line in diff {
        let line = line.as_ref();
        if line.starts_with("@@") {
            in_hunk = true;
        } else if in_hunk && line.starts_with('+') {
            added += 1;
        }
    }
    added
}

/// Running position while walking a unified diff.
///
/// `shift` is the net number of lines added so far, which maps a hunk's
/// position in the original file onto the file as already mutated by the
/// operations of earlier hunks.
#[derive(Debug, Default)]
struct DiffCursor {
    line: usize,
    shift: isize,
    in_hunk: bool,
    operations: Vec<DiffOperation>,
}

impl DiffCursor {
    fn feed(&mut self, line: &str) {
        if let Some(start) = hunk_start(line) {
            self.line = start.saturating_add_signed(self.shift);
            self.in_hunk = true;
            return;
        }
        // File headers precede the first hunk
        if !self.in_hunk {
            return;
        }

        if let Some(content) = line.strip_prefix('+') {
            self.operations.push(DiffOperation::add(self.line, content));
            self.line += 1;
            self.shift += 1;
        } else if let Some(content) = line.strip_prefix('-') {
            self.operations.push(DiffOperation::delete(self.line, content));
            self.shift -= 1;
        } else if !line.starts_with('\\') {
            self.line += 1;
        }
    }
}

/// 1-based first original line covered by a hunk header
fn hunk_start(line: &str) -> Option<usize> {
    let caps = HUNK_HEADER.captures(line)?;
    let start: usize = caps.get(1)?.as_str().parse().ok()?;
    let length: usize = caps
        .get(2)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(1);
    // An empty range names the line *before* the insertion point
    Some(if length == 0 { start + 1 } else { start })
}

/// Turn a unified diff into the ordered add/delete operations that
/// transform the original into the modified text.
pub fn parse_operations<S: AsRef<str>>(diff: &[S]) -> Vec<DiffOperation> {
    let mut cursor = DiffCursor::default();
    for line in diff {
        cursor.feed(line.as_ref());
    }
    cursor.operations
}

/// Apply one operation to a line buffer. Insertions are clamped to the
/// buffer; deletions outside it are ignored.
pub fn apply_operation(lines: &mut Vec<String>, operation: &DiffOperation) {
    let index = operation.line.saturating_sub(1);
    match operation.kind {
        DiffOpKind::Add => {
            let index = index.min(lines.len());
            lines.insert(index, operation.content.clone());
        }
        DiffOpKind::Delete => {
            if index < lines.len() {
                lines.remove(index);
            }
        }
    }
}

/// Apply a full operation sequence to `content` in memory
pub fn apply_operations(content: &str, operations: &[DiffOperation]) -> String {
    let mut lines: Vec<String> = content.split('\n').map(str::to_string).collect();
    for operation in operations {
        apply_operation(&mut lines, operation);
    }
    lines.join("\n")
}
