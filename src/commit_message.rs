//! The commit message as a pseudo-file that threads can anchor to.

use similar::{ChangeTag, TextDiff};

use crate::row::{CommitLine, DiffTag, Row};

/// Header plus one addressable row per message line.
///
/// When `previous` is given and differs from `message`, rows come from a
/// line diff of the two and carry a [`DiffTag`]; removed lines have no
/// line number and therefore cannot anchor threads.
#[must_use]
pub fn message_rows(change_id: &str, message: &str, previous: Option<&str>) -> Vec<Row> {
    let mut rows = vec![Row::CommitHeader {
        change_id: change_id.to_string(),
    }];

    match previous {
        Some(previous) if previous != message => {
            let diff = TextDiff::from_lines(previous, message);
            rows.extend(diff.iter_all_changes().map(|change| {
                let diff_tag = match change.tag() {
                    ChangeTag::Equal => DiffTag::Equal,
                    ChangeTag::Delete => DiffTag::Delete,
                    ChangeTag::Insert => DiffTag::Insert,
                };
                Row::CommitLine(CommitLine {
                    line_num: change.new_index().map(|i| i as u32 + 1),
                    content: change.value().trim_end_matches(['\r', '\n']).to_string(),
                    diff_tag: Some(diff_tag),
                })
            }));
        }
        _ => {
            rows.extend(message.lines().zip(1..).map(|(line, n)| {
                Row::CommitLine(CommitLine {
                    line_num: Some(n),
                    content: line.to_string(),
                    diff_tag: None,
                })
            }));
        }
    }

    rows
}
