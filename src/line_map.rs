//! Carry thread positions forward through a diff.
//!
//! Threads store the line range they were created on. When the reviewed
//! change moves on, the diff from the thread's commit to the viewed commit
//! tells us where those lines went (or that they were deleted).

use std::collections::HashMap;

use serde::Serialize;

use crate::diff::{DiffHunk, ParsedDiff};
use crate::review::Thread;
use crate::row::LineKind;

/// Result of mapping a thread's position through a diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappedPosition {
    /// File path on the new side (differs from the thread's on renames)
    pub file: String,
    pub line_start: Option<u32>,
    pub line_end: Option<u32>,
    pub is_deleted: bool,
}

impl MappedPosition {
    fn unchanged(thread: &Thread) -> Self {
        Self {
            file: thread.file.clone(),
            line_start: Some(thread.line_start),
            line_end: Some(thread.line_end),
            is_deleted: false,
        }
    }

    fn deleted(thread: &Thread) -> Self {
        Self {
            file: thread.file.clone(),
            line_start: None,
            line_end: None,
            is_deleted: true,
        }
    }

    /// Whether the thread now sits somewhere other than where it was created.
    #[must_use]
    pub fn is_displaced(&self, thread: &Thread) -> bool {
        !self.is_deleted
            && (self.file != thread.file
                || self.line_start != Some(thread.line_start)
                || self.line_end != Some(thread.line_end))
    }
}

impl Thread {
    /// This thread re-anchored at `position`; `None` when its lines are gone.
    #[must_use]
    pub fn relocated(&self, position: &MappedPosition) -> Option<Self> {
        if position.is_deleted {
            return None;
        }
        let (Some(line_start), Some(line_end)) = (position.line_start, position.line_end) else {
            return None;
        };
        Some(Self {
            file: position.file.clone(),
            line_start,
            line_end,
            ..self.clone()
        })
    }
}

/// Map an old line number through hunks to find its new position.
/// Returns `None` if the line was deleted.
#[must_use]
pub fn map_line(old_line: u32, hunks: &[DiffHunk]) -> Option<u32> {
    let mut offset: i64 = 0;

    for hunk in hunks.iter().filter(|h| h.well_formed) {
        // A pure insertion (`-n,0`) lands after old line n
        let first_old = if hunk.old_count == 0 {
            hunk.old_start.saturating_add(1)
        } else {
            hunk.old_start
        };

        // Line is before this hunk, shift by the offset so far
        if old_line < first_old {
            return shift(old_line, offset);
        }

        // Line is inside this hunk, look it up among the hunk lines
        if u64::from(old_line) < u64::from(hunk.old_start) + u64::from(hunk.old_count) {
            return hunk
                .lines
                .iter()
                .find(|l| l.kind != LineKind::Add && l.old_line == Some(old_line))
                .and_then(|l| l.new_line);
        }

        // Line is after this hunk, accumulate its offset
        offset += i64::from(hunk.new_count) - i64::from(hunk.old_count);
    }

    // Line is after all hunks
    shift(old_line, offset)
}

fn shift(line: u32, offset: i64) -> Option<u32> {
    u32::try_from(i64::from(line) + offset).ok()
}

/// Map every thread through `diff` (which must run from the threads'
/// creation commit to the viewed commit). Threads on files the diff does
/// not touch keep their stored position.
#[must_use]
pub fn relocate_threads(threads: &[Thread], diff: &ParsedDiff) -> HashMap<String, MappedPosition> {
    threads
        .iter()
        .map(|thread| (thread.id.clone(), relocate_thread(thread, diff)))
        .collect()
}

#[must_use]
pub fn relocate_thread(thread: &Thread, diff: &ParsedDiff) -> MappedPosition {
    if thread.is_commit_message() {
        return MappedPosition::unchanged(thread);
    }

    let Some(file) = diff
        .files
        .iter()
        .find(|f| f.old_path.as_deref().unwrap_or(&f.path) == thread.file)
    else {
        return MappedPosition::unchanged(thread);
    };

    if file.deleted {
        return MappedPosition::deleted(thread);
    }

    let line_start = map_line(thread.line_start, &file.hunks);
    let line_end = map_line(thread.line_end, &file.hunks);
    MappedPosition {
        file: file.path.clone(),
        line_start,
        line_end,
        is_deleted: line_start.is_none() || line_end.is_none(),
    }
}

/// Threads re-anchored through `diff`, dropping those whose lines are gone.
#[must_use]
pub fn relocated(threads: &[Thread], diff: &ParsedDiff) -> Vec<Thread> {
    threads
        .iter()
        .filter_map(|thread| thread.relocated(&relocate_thread(thread, diff)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::review::ThreadStatus;

    fn thread(file: &str, start: u32, end: u32) -> Thread {
        Thread {
            id: format!("{file}-{start}"),
            file: file.to_string(),
            line_start: start,
            line_end: end,
            status: ThreadStatus::Open,
            comments: Vec::new(),
            created_at_commit: Some("c1".to_string()),
            created_at_revision: Some(1),
        }
    }

    fn hunks(diff: &str) -> Vec<DiffHunk> {
        ParsedDiff::parse(diff).files.remove(0).hunks
    }

    const TWO_HUNKS: &str = "\
--- a/src/main.rs
+++ b/src/main.rs
@@ -5,3 +5,4 @@
 line5
+inserted
 line6
 line7
@@ -20,3 +21,2 @@
 line20
-line21
 line22
";

    #[test]
    fn test_map_line_before_hunk() {
        assert_eq!(map_line(1, &hunks(TWO_HUNKS)), Some(1));
    }

    #[test]
    fn test_map_line_inside_hunk() {
        let h = hunks(TWO_HUNKS);
        assert_eq!(map_line(5, &h), Some(5));
        assert_eq!(map_line(6, &h), Some(7));
        assert_eq!(map_line(22, &h), Some(22));
    }

    #[test]
    fn test_map_line_between_and_after_hunks() {
        let h = hunks(TWO_HUNKS);
        assert_eq!(map_line(10, &h), Some(11));
        // +1 from the first hunk, -1 from the second
        assert_eq!(map_line(30, &h), Some(30));
    }

    #[test]
    fn test_map_line_deleted() {
        assert_eq!(map_line(21, &hunks(TWO_HUNKS)), None);
    }

    #[test]
    fn test_pure_insertion_does_not_move_preceding_line() {
        let h = hunks("+++ b/f\n@@ -5,0 +6,2 @@\n+a\n+b\n");
        assert_eq!(map_line(5, &h), Some(5));
        assert_eq!(map_line(6, &h), Some(8));
    }

    #[test]
    fn test_hunk_at_end_of_line_range() {
        let h = hunks("+++ b/f\n@@ -4294967295,1 +4294967295,1 @@\n-a\n+b\n");
        assert_eq!(map_line(u32::MAX, &h), None);
        assert_eq!(map_line(10, &h), Some(10));
    }

    #[test]
    fn test_relocate_thread_shifts_and_flags() {
        let diff = ParsedDiff::parse(TWO_HUNKS);
        let moved = thread("src/main.rs", 6, 7);
        let pos = relocate_thread(&moved, &diff);
        assert_eq!((pos.line_start, pos.line_end), (Some(7), Some(8)));
        assert!(pos.is_displaced(&moved));
        let applied = moved.relocated(&pos).unwrap();
        assert_eq!((applied.line_start, applied.line_end), (7, 8));
        assert_eq!(applied.id, moved.id);

        let gone = thread("src/main.rs", 20, 21);
        let pos = relocate_thread(&gone, &diff);
        assert!(pos.is_deleted);
        assert!(gone.relocated(&pos).is_none());
    }

    #[test]
    fn test_untouched_file_keeps_position() {
        let diff = ParsedDiff::parse(TWO_HUNKS);
        let t = thread("other.rs", 3, 3);
        let pos = relocate_thread(&t, &diff);
        assert!(!pos.is_displaced(&t));
        assert!(!pos.is_deleted);
    }

    #[test]
    fn test_deleted_and_renamed_files() {
        let diff = ParsedDiff::parse(
            "diff --git a/old.rs b/old.rs
--- a/old.rs
+++ /dev/null
@@ -1,1 +0,0 @@
-x
diff --git a/a.rs b/b.rs
--- a/a.rs
+++ b/b.rs
@@ -1,1 +1,2 @@
+header
 body
",
        );
        assert!(relocate_thread(&thread("old.rs", 1, 1), &diff).is_deleted);

        let renamed = relocate_thread(&thread("a.rs", 1, 1), &diff);
        assert_eq!(renamed.file, "b.rs");
        assert_eq!(renamed.line_end, Some(2));
    }

    #[test]
    fn test_relocated_drops_deleted_threads() {
        let diff = ParsedDiff::parse(TWO_HUNKS);
        let threads = vec![thread("src/main.rs", 6, 6), thread("src/main.rs", 21, 21)];
        let kept = relocated(&threads, &diff);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].line_end, 7);
        assert_eq!(relocate_threads(&threads, &diff).len(), 2);
    }
}
