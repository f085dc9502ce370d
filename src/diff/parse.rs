//! Unified diff parser
//!
//! Parses `diff --git` style unified diffs (possibly covering many files)
//! into structured data. Parsing never fails: malformed input degrades to
//! whatever lines can still be numbered.

use tracing::debug;

use crate::row::{DiffLine, LineKind};

/// A parsed unified diff
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedDiff {
    pub files: Vec<FileDiff>,
}

/// All hunks touching one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    /// New-side path (old-side path for deletions)
    pub path: String,
    /// Old-side path when it differs from `path` (renames)
    pub old_path: Option<String>,
    /// The file no longer exists on the new side (`+++ /dev/null`)
    pub deleted: bool,
    pub hunks: Vec<DiffHunk>,
}

/// A single hunk from a diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffHunk {
    /// The @@ header line
    pub header: String,
    /// Starting line in old file
    pub old_start: u32,
    /// Number of lines in old file
    pub old_count: u32,
    /// Starting line in new file
    pub new_start: u32,
    /// Number of lines in new file
    pub new_count: u32,
    /// False when the header could not be parsed; the start fields then
    /// hold the counters carried over from the previous hunk.
    pub well_formed: bool,
    /// Lines in this hunk
    pub lines: Vec<DiffLine>,
}

impl ParsedDiff {
    /// Parse a unified diff string
    #[must_use]
    pub fn parse(diff: &str) -> Self {
        let mut parser = Parser::default();
        for line in diff.lines() {
            parser.feed(line);
        }
        Self {
            files: parser.files,
        }
    }

    #[must_use]
    pub fn file(&self, path: &str) -> Option<&FileDiff> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Get total number of lines across all hunks
    #[must_use]
    pub fn total_lines(&self) -> usize {
        self.files
            .iter()
            .flat_map(|f| &f.hunks)
            .map(|h| h.lines.len())
            .sum()
    }
}

#[derive(Default)]
struct Parser {
    files: Vec<FileDiff>,
    /// Path from the last `diff --git` line, used when no `+++` line follows
    git_path: Option<String>,
    /// Path from the last `--- a/` line
    old_path: Option<String>,
    file_open: bool,
    in_hunk: bool,
    /// Lines still expected (old, new); `None` for malformed headers
    remaining: Option<(u32, u32)>,
    /// Next line numbers; `None` before the first hunk or once past `u32::MAX`
    old_line: Option<u32>,
    new_line: Option<u32>,
}

impl Parser {
    fn feed(&mut self, line: &str) {
        if line.starts_with("diff --git ") {
            self.in_hunk = false;
            self.file_open = false;
            self.old_path = None;
            self.git_path = line.rsplit_once(" b/").map(|(_, path)| path.to_string());
            return;
        }

        if line.starts_with("@@") {
            if !self.file_open {
                let path = self
                    .git_path
                    .take()
                    .or_else(|| self.old_path.clone())
                    .unwrap_or_default();
                self.open_file(path, false);
            }
            self.start_hunk(line);
            return;
        }

        if self.in_hunk {
            self.push_line(line);
            return;
        }

        if let Some(rest) = line.strip_prefix("--- ") {
            self.old_path = side_path(rest, "a/");
        } else if let Some(rest) = line.strip_prefix("+++ ") {
            match side_path(rest, "b/") {
                Some(path) => self.open_file(path, false),
                None => {
                    // Deletion: the file is only known by its old name
                    let path = self
                        .old_path
                        .clone()
                        .or_else(|| self.git_path.clone())
                        .unwrap_or_default();
                    self.open_file(path, true);
                }
            }
        }
        // Everything else (index, mode, similarity, binary notices) is skipped
    }

    fn open_file(&mut self, path: String, deleted: bool) {
        let old_path = self.old_path.take().filter(|old| *old != path);
        self.files.push(FileDiff {
            path,
            old_path,
            deleted,
            hunks: Vec::new(),
        });
        self.git_path = None;
        self.file_open = true;
        self.in_hunk = false;
    }

    fn start_hunk(&mut self, header: &str) {
        let (old_start, old_count, new_start, new_count, well_formed) =
            if let Some((old_start, old_count, new_start, new_count)) = parse_hunk_header(header) {
                self.old_line = Some(old_start);
                self.new_line = Some(new_start);
                self.remaining = Some((old_count, new_count));
                (old_start, old_count, new_start, new_count, true)
            } else {
                debug!(header, "malformed hunk header, keeping previous line counters");
                self.remaining = None;
                (
                    self.old_line.unwrap_or_default(),
                    0,
                    self.new_line.unwrap_or_default(),
                    0,
                    false,
                )
            };

        let Some(file) = self.files.last_mut() else {
            return;
        };
        file.hunks.push(DiffHunk {
            header: header.to_string(),
            old_start,
            old_count,
            new_start,
            new_count,
            well_formed,
            lines: Vec::new(),
        });
        self.in_hunk = !matches!(self.remaining, Some((0, 0)));
    }

    fn push_line(&mut self, line: &str) {
        let (kind, content) = if let Some(content) = line.strip_prefix('+') {
            (LineKind::Add, content)
        } else if let Some(content) = line.strip_prefix('-') {
            (LineKind::Delete, content)
        } else if let Some(content) = line.strip_prefix(' ') {
            (LineKind::Context, content)
        } else if line.is_empty() {
            // Empty context line (trailing whitespace stripped by a tool)
            (LineKind::Context, "")
        } else if line.starts_with('\\') {
            // "\ No newline at end of file"
            return;
        } else {
            // Unknown line format, treat as context
            (LineKind::Context, line)
        };

        let (old_line, new_line) = match kind {
            LineKind::Add => (None, next_number(&mut self.new_line)),
            LineKind::Delete => (next_number(&mut self.old_line), None),
            LineKind::Context => (
                next_number(&mut self.old_line),
                next_number(&mut self.new_line),
            ),
        };

        let Some(file) = self.files.last_mut() else {
            return;
        };
        let path = file.path.clone();
        let Some(hunk) = file.hunks.last_mut() else {
            return;
        };
        hunk.lines.push(DiffLine {
            file: path,
            kind,
            content: content.to_string(),
            old_line,
            new_line,
        });

        if let Some((old_rem, new_rem)) = &mut self.remaining {
            if kind != LineKind::Add {
                *old_rem = old_rem.saturating_sub(1);
            }
            if kind != LineKind::Delete {
                *new_rem = new_rem.saturating_sub(1);
            }
            if *old_rem == 0 && *new_rem == 0 {
                self.in_hunk = false;
            }
        }
    }
}

/// Current value of a line counter, advancing it. Numbers that would pass
/// `u32::MAX` are dropped rather than wrapped.
fn next_number(counter: &mut Option<u32>) -> Option<u32> {
    let n = *counter;
    *counter = n.and_then(|n| n.checked_add(1));
    n
}

/// Strip the `a/`/`b/` prefix; `/dev/null` means the side does not exist.
fn side_path(rest: &str, prefix: &str) -> Option<String> {
    // Some tools append a tab and timestamp after the path
    let rest = rest.split('\t').next().unwrap_or(rest);
    if rest == "/dev/null" {
        return None;
    }
    Some(rest.strip_prefix(prefix).unwrap_or(rest).to_string())
}

/// Parse `@@ -start,count +start,count @@ optional context`.
fn parse_hunk_header(header: &str) -> Option<(u32, u32, u32, u32)> {
    let parts: Vec<&str> = header.split_whitespace().collect();
    if parts.len() < 4 || parts[0] != "@@" || parts[3] != "@@" {
        return None;
    }

    let (old_start, old_count) = parse_range(parts[1].strip_prefix('-')?)?;
    let (new_start, new_count) = parse_range(parts[2].strip_prefix('+')?)?;
    Some((old_start, old_count, new_start, new_count))
}

fn parse_range(s: &str) -> Option<(u32, u32)> {
    if let Some((start, count)) = s.split_once(',') {
        Some((start.parse().ok()?, count.parse().ok()?))
    } else {
        // Single line: "5" means start=5, count=1
        let start = s.parse().ok()?;
        Some((start, 1))
    }
}
