//! Diff text → flat row sequence.

use std::collections::HashSet;

use super::collapse::collapse_context;
use super::parse::ParsedDiff;
use crate::row::Row;

/// Parse `diff_text` and fold long context runs not listed in `expanded`.
///
/// Pure and deterministic: the same inputs always produce identical rows.
#[must_use]
#[allow(clippy::implicit_hasher)]
pub fn decompose(diff_text: &str, expanded: &HashSet<String>, radius: usize) -> Vec<Row> {
    let parsed = ParsedDiff::parse(diff_text);
    collapse_context(flatten(parsed), expanded, radius)
}

/// File header, then per hunk a hunk header followed by its lines.
#[must_use]
pub fn flatten(parsed: ParsedDiff) -> Vec<Row> {
    let mut rows = Vec::with_capacity(parsed.total_lines() + parsed.files.len() * 2);
    for file in parsed.files {
        rows.push(Row::FileHeader { path: file.path });
        for hunk in file.hunks {
            rows.push(Row::HunkHeader {
                header: hunk.header,
            });
            rows.extend(hunk.lines.into_iter().map(Row::Line));
        }
    }
    rows
}
