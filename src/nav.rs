//! Cursor movement over a rendered row sequence.
//!
//! Rows like file and hunk headers are decoration; the cursor only lands on
//! lines, collapsed runs, threads and commit-message lines.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::row::Row;

/// Positions of interest within one row sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RowIndex {
    /// Thread id → index of its `Thread` row
    pub thread_rows: BTreeMap<String, usize>,
    /// Indices the cursor may rest on, ascending
    pub navigable: Vec<usize>,
    /// Indices of `Thread` rows, ascending
    threads: Vec<usize>,
}

impl RowIndex {
    #[must_use]
    pub fn build(rows: &[Row]) -> Self {
        let mut index = Self::default();
        for (i, row) in rows.iter().enumerate() {
            if row.is_navigable() {
                index.navigable.push(i);
            }
            if let Row::Thread(thread) = row {
                index.thread_rows.entry(thread.id.clone()).or_insert(i);
                index.threads.push(i);
            }
        }
        index
    }

    /// Row of the given thread, if it was placed.
    #[must_use]
    pub fn thread_row(&self, thread_id: &str) -> Option<usize> {
        self.thread_rows.get(thread_id).copied()
    }

    /// First navigable row after `from`.
    #[must_use]
    pub fn next(&self, from: usize) -> Option<usize> {
        after(&self.navigable, from)
    }

    /// Last navigable row before `from`.
    #[must_use]
    pub fn prev(&self, from: usize) -> Option<usize> {
        before(&self.navigable, from)
    }

    #[must_use]
    pub fn next_thread(&self, from: usize) -> Option<usize> {
        after(&self.threads, from)
    }

    #[must_use]
    pub fn prev_thread(&self, from: usize) -> Option<usize> {
        before(&self.threads, from)
    }

    /// Nearest navigable row to `cursor`, preferring the one at or before it.
    /// Used to keep a cursor valid after rows are re-rendered.
    #[must_use]
    pub fn clamp(&self, cursor: usize) -> Option<usize> {
        match self.navigable.binary_search(&cursor) {
            Ok(_) => Some(cursor),
            Err(_) => self.prev(cursor).or_else(|| self.next(cursor)),
        }
    }
}

fn after(sorted: &[usize], from: usize) -> Option<usize> {
    let i = sorted.partition_point(|&row| row <= from);
    sorted.get(i).copied()
}

fn before(sorted: &[usize], from: usize) -> Option<usize> {
    let i = sorted.partition_point(|&row| row < from);
    i.checked_sub(1).map(|i| sorted[i])
}
