//! One-call composition of everything shown in the review pane.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::commit_message::message_rows;
use crate::diff::{anchored_run_ids, collapse_context, flatten, ParsedDiff, DEFAULT_CONTEXT_RADIUS};
use crate::nav::RowIndex;
use crate::review::Thread;
use crate::row::Row;
use crate::weave::{weave, Selection};

/// The commit message shown above the file diffs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitMessage {
    pub change_id: String,
    pub message: String,
    /// Message at the comparison's starting revision, if it differs
    #[serde(default)]
    pub previous: Option<String>,
}

/// Everything that determines the rendered rows. Rendering the same
/// snapshot twice yields the same [`RenderedDiff`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffSnapshot {
    pub diff_text: String,
    pub threads: Vec<Thread>,
    pub expanded: HashSet<String>,
    pub selection: Option<Selection>,
    pub commit_message: Option<CommitMessage>,
    pub context_radius: usize,
    /// Also expand any collapsed run hiding a thread anchor or the selection
    pub auto_expand: bool,
    /// Hide threads created after this revision
    pub revision: Option<u32>,
}

impl Default for DiffSnapshot {
    fn default() -> Self {
        Self {
            diff_text: String::new(),
            threads: Vec::new(),
            expanded: HashSet::new(),
            selection: None,
            commit_message: None,
            context_radius: DEFAULT_CONTEXT_RADIUS,
            auto_expand: false,
            revision: None,
        }
    }
}

impl DiffSnapshot {
    #[must_use]
    pub fn new(diff_text: impl Into<String>) -> Self {
        Self {
            diff_text: diff_text.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedDiff {
    pub rows: Vec<Row>,
    pub index: RowIndex,
}

#[must_use]
pub fn render_diff(snapshot: &DiffSnapshot) -> RenderedDiff {
    let threads: Vec<&Thread> = snapshot
        .threads
        .iter()
        .filter(|t| snapshot.revision.is_none_or(|rev| t.visible_at(rev)))
        .collect();

    let flat = flatten(ParsedDiff::parse(&snapshot.diff_text));
    let mut diff_rows = collapse_context(flat.clone(), &snapshot.expanded, snapshot.context_radius);

    if snapshot.auto_expand {
        let anchors = threads
            .iter()
            .map(|t| t.anchor())
            .chain(snapshot.selection.iter().map(|s| (s.file.as_str(), s.end)));
        let extra = anchored_run_ids(&diff_rows, anchors);
        if !extra.is_empty() {
            debug!(runs = extra.len(), "expanding runs hiding anchors");
            let mut expanded = snapshot.expanded.clone();
            expanded.extend(extra);
            diff_rows = collapse_context(flat, &expanded, snapshot.context_radius);
        }
    }

    let mut rows = snapshot
        .commit_message
        .as_ref()
        .map(|m| message_rows(&m.change_id, &m.message, m.previous.as_deref()))
        .unwrap_or_default();
    rows.extend(diff_rows);

    let rows = weave(rows, threads, snapshot.selection.as_ref());
    let index = RowIndex::build(&rows);
    RenderedDiff { rows, index }
}
