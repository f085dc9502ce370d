//! Review aggregate types: threads, comments, and revisions.
//!
//! These mirror the review store's JSON records. The renderer only reads
//! them; ownership and persistence live with the caller.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Virtual file name under which commit-message threads are stored.
///
/// The leading colon keeps it out of the space of paths a diff header can
/// produce (`+++ b/<path>` always yields a relative path).
pub const COMMIT_MESSAGE_FILE: &str = ":commit-message:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreadStatus {
    #[default]
    Open,
    Resolved,
}

/// A single comment in a thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub author: String,
    pub text: String,
    pub timestamp: String,
}

/// A review conversation anchored to a line range of one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    pub id: String,
    /// Real repository path or [`COMMIT_MESSAGE_FILE`]
    pub file: String,
    /// First selected line (new-side, 1-based)
    pub line_start: u32,
    /// Last selected line (new-side, 1-based); the row anchor
    pub line_end: u32,
    #[serde(default)]
    pub status: ThreadStatus,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub created_at_commit: Option<String>,
    #[serde(default)]
    pub created_at_revision: Option<u32>,
}

impl Thread {
    /// Whether this thread targets the commit message rather than a file.
    #[must_use]
    pub fn is_commit_message(&self) -> bool {
        self.file == COMMIT_MESSAGE_FILE
    }

    /// The (file, line) pair this thread is displayed after.
    #[must_use]
    pub fn anchor(&self) -> (&str, u32) {
        (&self.file, self.line_end)
    }

    /// Threads created after the viewed revision are hidden when looking at
    /// an older snapshot. Threads without a revision tag are always shown.
    #[must_use]
    pub fn visible_at(&self, revision: u32) -> bool {
        self.created_at_revision.is_none_or(|created| created <= revision)
    }
}

/// Split threads into (real-file threads, commit-message threads), keeping
/// input order within each side.
#[must_use]
pub fn partition_threads(threads: &[Thread]) -> (Vec<&Thread>, Vec<&Thread>) {
    threads.iter().partition(|t| !t.is_commit_message())
}

/// One recorded (or pending) snapshot of the change under review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    pub number: u32,
    pub commit_id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_pending: bool,
}

/// A review of one change, with its threads and revision history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub change_id: String,
    pub base: String,
    #[serde(default)]
    pub threads: Vec<Thread>,
    #[serde(default)]
    pub revisions: Vec<Revision>,
    #[serde(default)]
    pub working_commit_id: Option<String>,
}

impl Review {
    /// Append a virtual pending revision when the working commit differs from
    /// the last recorded one (or nothing has been recorded yet).
    #[must_use]
    pub fn with_pending_revision(mut self, current_commit_id: &str) -> Self {
        let has_pending = self
            .revisions
            .last()
            .is_none_or(|last| last.commit_id != current_commit_id);

        if has_pending {
            let number = self.revisions.last().map_or(1, |r| r.number + 1);
            self.revisions.push(Revision {
                number,
                commit_id: current_commit_id.to_string(),
                description: None,
                is_pending: true,
            });
        }
        self
    }

    #[must_use]
    pub fn revision(&self, number: u32) -> Option<&Revision> {
        self.revisions.iter().find(|r| r.number == number)
    }

    #[must_use]
    pub fn latest_revision(&self) -> Option<&Revision> {
        self.revisions.last()
    }

    #[must_use]
    pub fn open_thread_count(&self) -> usize {
        self.threads
            .iter()
            .filter(|t| t.status == ThreadStatus::Open)
            .count()
    }
}

/// Left side of a revision comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevisionRef {
    Base,
    Number(u32),
}

impl fmt::Display for RevisionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base => f.write_str("base"),
            Self::Number(n) => write!(f, "r{n}"),
        }
    }
}

/// An ordered (from, to) pair of revisions to diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub from: RevisionRef,
    pub to: u32,
}

impl Comparison {
    /// Returns `None` unless `from` strictly precedes `to`.
    #[must_use]
    pub const fn new(from: RevisionRef, to: u32) -> Option<Self> {
        match from {
            RevisionRef::Number(n) if n >= to => None,
            _ if to == 0 => None,
            _ => Some(Self { from, to }),
        }
    }

    /// Base against the newest revision (pending included).
    #[must_use]
    pub fn latest(review: &Review) -> Option<Self> {
        let to = review.latest_revision()?.number;
        Self::new(RevisionRef::Base, to)
    }

    /// Resolve to (from commit, to commit). The base side resolves to the
    /// review's base revision string.
    #[must_use]
    pub fn commits<'a>(&self, review: &'a Review) -> Option<(&'a str, &'a str)> {
        let to = review.revision(self.to)?.commit_id.as_str();
        let from = match self.from {
            RevisionRef::Base => review.base.as_str(),
            RevisionRef::Number(n) => review.revision(n)?.commit_id.as_str(),
        };
        Some((from, to))
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}→r{}", self.from, self.to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thread(id: &str, file: &str, line: u32) -> Thread {
        Thread {
            id: id.to_string(),
            file: file.to_string(),
            line_start: line,
            line_end: line,
            status: ThreadStatus::Open,
            comments: Vec::new(),
            created_at_commit: None,
            created_at_revision: None,
        }
    }

    fn review(commits: &[&str]) -> Review {
        Review {
            change_id: "zwlsqumm".to_string(),
            base: "trunk".to_string(),
            threads: Vec::new(),
            revisions: commits
                .iter()
                .zip(1..)
                .map(|(c, number)| Revision {
                    number,
                    commit_id: (*c).to_string(),
                    description: None,
                    is_pending: false,
                })
                .collect(),
            working_commit_id: None,
        }
    }

    #[test]
    fn test_thread_deserializes_review_json() {
        let json = r#"{
            "id": "a1b2c3d4",
            "file": "src/lib.rs",
            "line_start": 3,
            "line_end": 5,
            "status": "resolved",
            "comments": [{"author": "user", "text": "why?", "timestamp": "2025-01-01T00:00:00Z"}],
            "created_at_revision": 2
        }"#;
        let t: Thread = serde_json::from_str(json).unwrap();
        assert_eq!(t.status, ThreadStatus::Resolved);
        assert_eq!(t.anchor(), ("src/lib.rs", 5));
        assert_eq!(t.comments.len(), 1);
        assert_eq!(t.created_at_revision, Some(2));
        assert!(t.created_at_commit.is_none());
    }

    #[test]
    fn test_partition_threads_keeps_order() {
        let threads = vec![
            thread("a", "x.rs", 1),
            thread("m1", COMMIT_MESSAGE_FILE, 1),
            thread("b", "y.rs", 2),
            thread("m2", COMMIT_MESSAGE_FILE, 3),
        ];
        let (files, message) = partition_threads(&threads);
        let ids = |v: &[&Thread]| v.iter().map(|t| t.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&files), vec!["a", "b"]);
        assert_eq!(ids(&message), vec!["m1", "m2"]);
    }

    #[test]
    fn test_visible_at_revision() {
        let mut t = thread("a", "x.rs", 1);
        assert!(t.visible_at(1));
        t.created_at_revision = Some(3);
        assert!(!t.visible_at(2));
        assert!(t.visible_at(3));
    }

    #[test]
    fn test_pending_revision_added_when_commit_moves() {
        let r = review(&["c1", "c2"]).with_pending_revision("c3");
        assert_eq!(r.revisions.len(), 3);
        let last = r.latest_revision().unwrap();
        assert_eq!(last.number, 3);
        assert!(last.is_pending);
        assert_eq!(last.commit_id, "c3");
    }

    #[test]
    fn test_pending_revision_skipped_when_up_to_date() {
        let r = review(&["c1", "c2"]).with_pending_revision("c2");
        assert_eq!(r.revisions.len(), 2);
        assert!(!r.revisions.iter().any(|rev| rev.is_pending));
    }

    #[test]
    fn test_pending_revision_on_empty_review() {
        let r = review(&[]).with_pending_revision("c1");
        assert_eq!(r.revisions[0].number, 1);
        assert!(r.revisions[0].is_pending);
    }

    #[test]
    fn test_comparison_ordering() {
        assert!(Comparison::new(RevisionRef::Number(2), 2).is_none());
        assert!(Comparison::new(RevisionRef::Number(3), 2).is_none());
        assert!(Comparison::new(RevisionRef::Base, 0).is_none());
        let cmp = Comparison::new(RevisionRef::Number(1), 2).unwrap();
        assert_eq!(cmp.to_string(), "r1→r2");
    }

    #[test]
    fn test_comparison_resolves_commits() {
        let r = review(&["c1", "c2", "c3"]);
        let latest = Comparison::latest(&r).unwrap();
        assert_eq!(latest.to_string(), "base→r3");
        assert_eq!(latest.commits(&r), Some(("trunk", "c3")));

        let cmp = Comparison::new(RevisionRef::Number(1), 2).unwrap();
        assert_eq!(cmp.commits(&r), Some(("c1", "c2")));

        let missing = Comparison::new(RevisionRef::Base, 9).unwrap();
        assert_eq!(missing.commits(&r), None);
    }

    #[test]
    fn test_open_thread_count() {
        let mut r = review(&["c1"]);
        let mut resolved = thread("b", "x.rs", 2);
        resolved.status = ThreadStatus::Resolved;
        r.threads = vec![thread("a", "x.rs", 1), resolved];
        assert_eq!(r.open_thread_count(), 1);
    }
}
