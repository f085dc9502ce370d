//! Unified diff parsing and decomposition into rows

mod collapse;
mod decompose;
mod parse;

pub use collapse::{anchored_run_ids, collapse_context, collapsed_run_id, DEFAULT_CONTEXT_RADIUS};
pub use decompose::{decompose, flatten};
pub use parse::{DiffHunk, FileDiff, ParsedDiff};
