//! Folding of long unchanged-context runs into expandable placeholders.

use std::collections::HashSet;

use crate::row::{CollapsedRun, DiffLine, LineKind, Row};

/// Context lines kept visible on each side of a folded run.
pub const DEFAULT_CONTEXT_RADIUS: usize = 3;

/// Deterministic id of a run whose first hidden line is `first_hidden`.
#[must_use]
pub fn collapsed_run_id(first_hidden: &DiffLine) -> String {
    format!(
        "{}:{}",
        first_hidden.file,
        first_hidden.new_line.unwrap_or_default()
    )
}

/// Fold every run of consecutive context lines longer than `2 * radius + 1`.
///
/// The first and last `radius` lines of a run stay visible; the interior
/// becomes a single [`Row::Collapsed`]. Runs whose id is in `expanded` are
/// left untouched. A run ends at any non-context row (including hunk
/// headers) and whenever the file changes.
#[must_use]
#[allow(clippy::implicit_hasher)]
pub fn collapse_context(rows: Vec<Row>, expanded: &HashSet<String>, radius: usize) -> Vec<Row> {
    let mut out = Vec::with_capacity(rows.len());
    let mut run: Vec<DiffLine> = Vec::new();

    for row in rows {
        match row {
            Row::Line(line) if line.kind == LineKind::Context => {
                if run.last().is_some_and(|prev| prev.file != line.file) {
                    flush_run(&mut out, &mut run, expanded, radius);
                }
                run.push(line);
            }
            other => {
                flush_run(&mut out, &mut run, expanded, radius);
                out.push(other);
            }
        }
    }
    flush_run(&mut out, &mut run, expanded, radius);

    out
}

fn flush_run(
    out: &mut Vec<Row>,
    run: &mut Vec<DiffLine>,
    expanded: &HashSet<String>,
    radius: usize,
) {
    let lines = std::mem::take(run);
    let len = lines.len();
    let shown = radius.saturating_mul(2);
    if len <= shown.saturating_add(1) {
        out.extend(lines.into_iter().map(Row::Line));
        return;
    }

    let id = collapsed_run_id(&lines[radius]);
    if expanded.contains(&id) {
        out.extend(lines.into_iter().map(Row::Line));
        return;
    }

    let mut lines = lines.into_iter();
    out.extend(lines.by_ref().take(radius).map(Row::Line));
    let hidden: Vec<DiffLine> = lines.by_ref().take(len - shown).collect();
    let file = hidden[0].file.clone();
    out.push(Row::Collapsed(CollapsedRun { file, hidden, id }));
    out.extend(lines.map(Row::Line));
}

/// Ids of collapsed runs that hide one of `anchors`.
///
/// Adding these to the expanded set before re-decomposing keeps every
/// anchored thread (and the comment editor) reachable.
#[must_use]
pub fn anchored_run_ids<'a>(
    rows: &[Row],
    anchors: impl IntoIterator<Item = (&'a str, u32)>,
) -> Vec<String> {
    let anchors: HashSet<(&str, u32)> = anchors.into_iter().collect();
    if anchors.is_empty() {
        return Vec::new();
    }

    rows.iter()
        .filter_map(|row| match row {
            Row::Collapsed(run) => Some(run),
            _ => None,
        })
        .filter(|run| {
            run.hidden.iter().any(|line| {
                line.new_line
                    .is_some_and(|n| anchors.contains(&(run.file.as_str(), n)))
            })
        })
        .map(|run| run.id.clone())
        .collect()
}
