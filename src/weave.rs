//! Splicing review threads and the comment editor into decomposed rows.
//!
//! A thread is shown directly after the row addressed by
//! `(thread.file, thread.line_end)`. Only rows with a new-side line number
//! are addressable, so a thread left on a purely deleted line has no anchor
//! and is not shown inline (the thread itself is untouched upstream).

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::review::Thread;
use crate::row::Row;

/// Lines selected for a new comment; the editor renders after `end`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub file: String,
    pub start: u32,
    pub end: u32,
}

impl Selection {
    #[must_use]
    pub fn new(file: impl Into<String>, start: u32, end: u32) -> Self {
        Self {
            file: file.into(),
            start: start.min(end),
            end: start.max(end),
        }
    }
}

/// Parses `path:line` or `path:start-end`.
impl FromStr for Selection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (file, range) = s
            .rsplit_once(':')
            .ok_or_else(|| anyhow!("expected <file>:<start>[-<end>], got {s:?}"))?;
        let (start, end) = range.split_once('-').unwrap_or((range, range));
        let start = start
            .parse()
            .with_context(|| format!("invalid start line in {s:?}"))?;
        let end = end
            .parse()
            .with_context(|| format!("invalid end line in {s:?}"))?;
        Ok(Self::new(file, start, end))
    }
}

/// Insert `Thread` rows after their anchor rows and a single
/// `CommentEditor` after the row matching `selection.end`.
///
/// Threads sharing an anchor keep their input order. Re-running with the
/// same inputs yields identical output.
#[must_use]
pub fn weave<'t>(
    rows: Vec<Row>,
    threads: impl IntoIterator<Item = &'t Thread>,
    selection: Option<&Selection>,
) -> Vec<Row> {
    let mut by_anchor: HashMap<&str, HashMap<u32, Vec<&Thread>>> = HashMap::new();
    let mut thread_count = 0usize;
    for thread in threads {
        let (file, line) = thread.anchor();
        by_anchor
            .entry(file)
            .or_default()
            .entry(line)
            .or_default()
            .push(thread);
        thread_count += 1;
    }

    let mut out = Vec::with_capacity(rows.len() + thread_count + 1);
    let mut emitted: HashSet<&str> = HashSet::with_capacity(thread_count);
    let mut editor_placed = false;

    for row in rows {
        let (here, editor_here): (&[&Thread], bool) = match row.anchor() {
            Some((file, line)) => {
                let here = by_anchor
                    .get(file)
                    .and_then(|lines| lines.get(&line))
                    .map_or(&[][..], Vec::as_slice);
                let editor_here = !editor_placed
                    && selection.is_some_and(|s| s.file == file && s.end == line);
                (here, editor_here)
            }
            None => (&[], false),
        };

        out.push(row);

        for thread in here {
            if emitted.insert(thread.id.as_str()) {
                out.push(Row::Thread((*thread).clone()));
            }
        }

        if editor_here {
            if let Some(selection) = selection {
                out.push(Row::CommentEditor {
                    file: selection.file.clone(),
                    line_start: selection.start,
                    line_end: selection.end,
                });
                editor_placed = true;
            }
        }
    }

    if emitted.len() < thread_count {
        for thread in by_anchor.values().flat_map(HashMap::values).flatten() {
            if !emitted.contains(thread.id.as_str()) {
                trace!(
                    thread_id = %thread.id,
                    file = %thread.file,
                    line = thread.line_end,
                    "thread anchor not present in rows"
                );
            }
        }
    }
    if let Some(selection) = selection {
        if !editor_placed {
            debug!(file = %selection.file, line = selection.end, "selection has no anchor row");
        }
    }

    out
}
