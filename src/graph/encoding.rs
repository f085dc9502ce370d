//! Per-commit graph row encoding as produced by the DAG layout pass.

use std::ops::BitOr;

use serde::{Deserialize, Serialize};

/// What occupies a column on the node's own line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeLine {
    #[default]
    Blank,
    /// A lane passing through to a non-direct ancestor
    Ancestor,
    /// A lane passing through to a direct parent
    Parent,
    /// The commit itself
    Node,
}

/// What continues below the row in a column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PadLine {
    #[default]
    Blank,
    Ancestor,
    Parent,
}

impl PadLine {
    #[must_use]
    pub const fn continues(self) -> bool {
        !matches!(self, Self::Blank)
    }
}

/// Connection bits for one column of the link line.
///
/// Serialized as the raw `u16` mask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkLine(u16);

impl LinkLine {
    pub const HORIZ_PARENT: Self = Self(1 << 0);
    pub const HORIZ_ANCESTOR: Self = Self(1 << 1);
    pub const VERT_PARENT: Self = Self(1 << 2);
    pub const VERT_ANCESTOR: Self = Self(1 << 3);
    pub const LEFT_FORK_PARENT: Self = Self(1 << 4);
    pub const LEFT_FORK_ANCESTOR: Self = Self(1 << 5);
    pub const RIGHT_FORK_PARENT: Self = Self(1 << 6);
    pub const RIGHT_FORK_ANCESTOR: Self = Self(1 << 7);
    pub const LEFT_MERGE_PARENT: Self = Self(1 << 8);
    pub const LEFT_MERGE_ANCESTOR: Self = Self(1 << 9);
    pub const RIGHT_MERGE_PARENT: Self = Self(1 << 10);
    pub const RIGHT_MERGE_ANCESTOR: Self = Self(1 << 11);
    pub const CHILD: Self = Self(1 << 12);

    pub const HORIZONTAL: Self = Self(Self::HORIZ_PARENT.0 | Self::HORIZ_ANCESTOR.0);
    pub const VERTICAL: Self = Self(Self::VERT_PARENT.0 | Self::VERT_ANCESTOR.0);
    pub const DIAGONAL: Self = Self(0x0ff0);
    /// Every bit with a defined meaning
    pub const KNOWN: Self = Self(0x1fff);

    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[must_use]
    pub const fn from_bits_retain(bits: u16) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u16 {
        self.0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True if every bit of `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if any bit of `other` is set.
    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Bits outside [`Self::KNOWN`].
    #[must_use]
    pub const fn unknown(self) -> Self {
        Self(self.0 & !Self::KNOWN.0)
    }
}

impl BitOr for LinkLine {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// One commit row of the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphRow {
    /// Node identifier (change id)
    pub node: String,
    /// `@` for a commit with content, `o` for an empty one
    pub glyph: String,
    #[serde(default)]
    pub merge: bool,
    pub node_line: Vec<NodeLine>,
    #[serde(default)]
    pub link_line: Option<Vec<LinkLine>>,
    #[serde(default)]
    pub term_line: Option<Vec<bool>>,
    #[serde(default)]
    pub pad_lines: Vec<PadLine>,
}

impl GraphRow {
    /// Number of columns this row spans.
    #[must_use]
    pub fn width(&self) -> usize {
        let links = self.link_line.as_ref().map_or(0, Vec::len);
        let terms = self.term_line.as_ref().map_or(0, Vec::len);
        self.node_line
            .len()
            .max(self.pad_lines.len())
            .max(links)
            .max(terms)
    }

    #[must_use]
    pub fn node_at(&self, column: usize) -> NodeLine {
        self.node_line.get(column).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn pad_at(&self, column: usize) -> PadLine {
        self.pad_lines.get(column).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn link_at(&self, column: usize) -> LinkLine {
        self.link_line
            .as_ref()
            .and_then(|links| links.get(column).copied())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn term_at(&self, column: usize) -> bool {
        self.term_line
            .as_ref()
            .and_then(|terms| terms.get(column).copied())
            .unwrap_or(false)
    }

    /// Whether the node glyph is drawn filled.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        self.glyph == "@"
    }
}
