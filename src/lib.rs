//! diffweave - diff and commit-graph rendering for code review
//!
//! Turns unified diff text, review threads and graph-row encodings into flat,
//! index-addressable row and primitive sequences for a virtualized view.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::too_many_lines)]

pub mod commit_message;
pub mod config;
pub mod diff;
pub mod graph;
pub mod line_map;
pub mod nav;
pub mod review;
pub mod row;
pub mod vcs;
pub mod view;
pub mod weave;

pub use diff::{decompose, ParsedDiff};
pub use graph::{render_graph, render_row, GraphRow, GraphStyle, Primitive};
pub use nav::RowIndex;
pub use review::{Review, Thread};
pub use row::Row;
pub use view::{render_diff, DiffSnapshot, RenderedDiff};
pub use weave::{weave, Selection};
