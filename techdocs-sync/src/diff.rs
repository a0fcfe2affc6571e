//! Diff planner: line-oriented change sets for previews and change counts.
//!
//! Purely informational: nothing here decides whether a file is written.

use similar::{ChangeTag, TextDiff};

/// Line-level difference between two texts, after line-ending normalisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeSet {
    old: String,
    new: String,
    insertions: usize,
    deletions: usize,
}

/// Compute the [`ChangeSet`] turning `old` into `new`.
///
/// `\r\n` and lone `\r` are treated as `\n` on both sides.
pub fn plan(old: &str, new: &str) -> ChangeSet {
    let old = normalize_line_endings(old);
    let new = normalize_line_endings(new);

    let (mut insertions, mut deletions) = (0, 0);
    for change in TextDiff::from_lines(&old, &new).iter_all_changes() {
        match change.tag() {
            ChangeTag::Insert => insertions += 1,
            ChangeTag::Delete => deletions += 1,
            ChangeTag::Equal => {}
        }
    }

    ChangeSet {
        old,
        new,
        insertions,
        deletions,
    }
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.insertions == 0 && self.deletions == 0
    }

    pub fn insertions(&self) -> usize {
        self.insertions
    }

    pub fn deletions(&self) -> usize {
        self.deletions
    }

    /// Unified diff with three lines of context; empty when nothing changed.
    pub fn unified(&self, old_label: &str, new_label: &str) -> String {
        if self.is_empty() {
            return String::new();
        }
        TextDiff::from_lines(&self.old, &self.new)
            .unified_diff()
            .header(old_label, new_label)
            .context_radius(3)
            .to_string()
    }
}

pub(crate) fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n").replace('\r', "\n")
}
