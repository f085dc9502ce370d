//! Flat row model fed to the virtualized diff list.

use serde::Serialize;

use crate::review::{Thread, COMMIT_MESSAGE_FILE};

/// Type of diff line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Context,
    Add,
    Delete,
}

/// A single line in a diff hunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffLine {
    pub file: String,
    pub kind: LineKind,
    /// The line content (without the +/-/space prefix)
    pub content: String,
    /// Line number in old file (if applicable)
    pub old_line: Option<u32>,
    /// Line number in new file (if applicable)
    pub new_line: Option<u32>,
}

/// A folded run of unchanged context lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CollapsedRun {
    pub file: String,
    pub hidden: Vec<DiffLine>,
    /// `"{file}:{new_line}"` of the first hidden line
    pub id: String,
}

impl CollapsedRun {
    /// Whether `line` (new-side) is one of the hidden lines.
    #[must_use]
    pub fn hides(&self, file: &str, line: u32) -> bool {
        self.file == file && self.hidden.iter().any(|l| l.new_line == Some(line))
    }
}

/// Tag for commit-message lines when two revisions' messages are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffTag {
    Equal,
    Insert,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitLine {
    /// 1-based line in the current message; `None` for removed lines
    pub line_num: Option<u32>,
    pub content: String,
    pub diff_tag: Option<DiffTag>,
}

/// One addressable row of the rendered diff stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Row {
    FileHeader {
        path: String,
    },
    HunkHeader {
        header: String,
    },
    Line(DiffLine),
    Collapsed(CollapsedRun),
    Thread(Thread),
    CommentEditor {
        file: String,
        line_start: u32,
        line_end: u32,
    },
    CommitHeader {
        change_id: String,
    },
    CommitLine(CommitLine),
}

impl Row {
    /// The (file, new-line) address of this row, if it has one.
    ///
    /// Only lines that exist in the new version are addressable; pure
    /// deletions and every non-line row return `None`.
    #[must_use]
    pub fn anchor(&self) -> Option<(&str, u32)> {
        match self {
            Self::Line(line) => line.new_line.map(|n| (line.file.as_str(), n)),
            Self::CommitLine(line) => line.line_num.map(|n| (COMMIT_MESSAGE_FILE, n)),
            _ => None,
        }
    }

    /// Rows a keyboard cursor may land on.
    #[must_use]
    pub const fn is_navigable(&self) -> bool {
        matches!(
            self,
            Self::Line(_) | Self::Thread(_) | Self::Collapsed(_) | Self::CommitLine(_)
        )
    }

    #[must_use]
    pub const fn is_context_line(&self) -> bool {
        matches!(self, Self::Line(DiffLine { kind: LineKind::Context, .. }))
    }
}
