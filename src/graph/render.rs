//! Graph rows → line and circle primitives.
//!
//! Each row is drawn in isolation from its own encoding plus the pad line of
//! the row above. Within a row, y positions are fixed fractions of the row
//! height: the node sits at the middle, diagonals leave from the link line
//! and terminator stubs start near the bottom.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::encoding::{GraphRow, LinkLine, NodeLine, PadLine};

const TOP: f64 = 0.0;
const NODE: f64 = 0.5;
const LINK: f64 = 0.6;
const TERM: f64 = 0.85;
const BOTTOM: f64 = 1.0;

/// Lane colors, cycled by column
pub const DEFAULT_PALETTE: [&str; 8] = [
    "#3b82f6", // blue
    "#22c55e", // green
    "#f59e0b", // amber
    "#a855f7", // purple
    "#64748b", // slate
    "#66e6e6", // cyan
    "#ff8080", // red
    "#b3b3e6", // lavender
];

const FALLBACK_STROKE: &str = "#888888";

/// Geometry and colors for the commit graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphStyle {
    pub column_width: f64,
    pub row_height: f64,
    pub node_radius: f64,
    pub palette: Vec<String>,
    /// Fill for empty-commit (hollow) nodes
    pub hollow_fill: String,
}

impl Default for GraphStyle {
    fn default() -> Self {
        Self {
            column_width: 16.0,
            row_height: 28.0,
            node_radius: 4.5,
            palette: DEFAULT_PALETTE.iter().map(ToString::to_string).collect(),
            hollow_fill: "#ffffff".to_string(),
        }
    }
}

impl GraphStyle {
    #[must_use]
    pub fn lane_color(&self, column: usize) -> &str {
        if self.palette.is_empty() {
            return FALLBACK_STROKE;
        }
        &self.palette[column % self.palette.len()]
    }

    fn x(&self, column: f64) -> f64 {
        (column + 0.5) * self.column_width
    }

    fn y(&self, fraction: f64) -> f64 {
        fraction * self.row_height
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineSegment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub stroke: String,
    pub dashed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeCircle {
    pub cx: f64,
    pub cy: f64,
    pub r: f64,
    pub fill: String,
    pub stroke: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Primitive {
    Line(LineSegment),
    Circle(NodeCircle),
}

/// Diagonal bits: (bit, column step, dashed)
const DIAGONALS: [(LinkLine, isize, bool); 8] = [
    (LinkLine::LEFT_FORK_PARENT, -1, false),
    (LinkLine::LEFT_FORK_ANCESTOR, -1, true),
    (LinkLine::RIGHT_FORK_PARENT, 1, false),
    (LinkLine::RIGHT_FORK_ANCESTOR, 1, true),
    (LinkLine::LEFT_MERGE_PARENT, -1, false),
    (LinkLine::LEFT_MERGE_ANCESTOR, -1, true),
    (LinkLine::RIGHT_MERGE_PARENT, 1, false),
    (LinkLine::RIGHT_MERGE_ANCESTOR, 1, true),
];

/// The merge bit on the neighbouring column that draws the same edge as a
/// fork bit here. Merge bits have no counterpart.
const fn mirrored_merge(fork: LinkLine) -> Option<LinkLine> {
    match fork.bits() {
        b if b == LinkLine::LEFT_FORK_PARENT.bits() => Some(LinkLine::RIGHT_MERGE_PARENT),
        b if b == LinkLine::LEFT_FORK_ANCESTOR.bits() => Some(LinkLine::RIGHT_MERGE_ANCESTOR),
        b if b == LinkLine::RIGHT_FORK_PARENT.bits() => Some(LinkLine::LEFT_MERGE_PARENT),
        b if b == LinkLine::RIGHT_FORK_ANCESTOR.bits() => Some(LinkLine::LEFT_MERGE_ANCESTOR),
        _ => None,
    }
}

struct RowPainter<'a> {
    style: &'a GraphStyle,
    lines: Vec<Primitive>,
    circles: Vec<Primitive>,
}

impl RowPainter<'_> {
    fn line(&mut self, from: (f64, f64), to: (f64, f64), column: usize, dashed: bool) {
        self.lines.push(Primitive::Line(LineSegment {
            x1: from.0 * self.style.column_width,
            y1: self.style.y(from.1),
            x2: to.0 * self.style.column_width,
            y2: self.style.y(to.1),
            stroke: self.style.lane_color(column).to_string(),
            dashed,
        }));
    }

    fn vertical(&mut self, column: usize, from: f64, to: f64, dashed: bool) {
        let x = column as f64 + 0.5;
        self.line((x, from), (x, to), column, dashed);
    }

    fn node(&mut self, column: usize, filled: bool) {
        let color = self.style.lane_color(column).to_string();
        self.circles.push(Primitive::Circle(NodeCircle {
            cx: self.style.x(column as f64),
            cy: self.style.y(NODE),
            r: self.style.node_radius,
            fill: if filled {
                color.clone()
            } else {
                self.style.hollow_fill.clone()
            },
            stroke: color,
        }));
    }

    fn finish(mut self) -> Vec<Primitive> {
        self.lines.append(&mut self.circles);
        self.lines
    }
}

/// Primitives for one row, lines first then node circles.
///
/// `prev_pad` is the pad line of the row above (`None` for the first row).
/// Coordinates are relative to the row's top-left corner.
#[must_use]
pub fn render_row(row: &GraphRow, prev_pad: Option<&[PadLine]>, style: &GraphStyle) -> Vec<Primitive> {
    let width = row.width();
    let mut painter = RowPainter {
        style,
        lines: Vec::new(),
        circles: Vec::new(),
    };

    for i in 0..width {
        let above = prev_pad
            .and_then(|pad| pad.get(i).copied())
            .unwrap_or_default();
        let below = row.pad_at(i);
        let link = row.link_at(i);

        match row.node_at(i) {
            node @ (NodeLine::Parent | NodeLine::Ancestor) => {
                let end = if below.continues() { BOTTOM } else { LINK };
                painter.vertical(i, TOP, end, node == NodeLine::Ancestor);
            }
            NodeLine::Node => {
                if above.continues() {
                    painter.vertical(i, TOP, NODE, above == PadLine::Ancestor);
                }
                if below.continues() {
                    painter.vertical(i, NODE, BOTTOM, below == PadLine::Ancestor);
                } else if link.intersects(LinkLine::DIAGONAL | LinkLine::VERTICAL) {
                    painter.vertical(i, NODE, LINK, false);
                }
                painter.node(i, row.is_filled());
            }
            NodeLine::Blank => {
                // Lane from above bending into a diagonal here
                if above.continues() {
                    painter.vertical(i, TOP, LINK, above == PadLine::Ancestor);
                }
                if link.intersects(LinkLine::VERTICAL) {
                    let dashed = !link.contains(LinkLine::VERT_PARENT);
                    painter.vertical(i, LINK, BOTTOM, dashed);
                }
            }
        }

        if link.intersects(LinkLine::HORIZONTAL) {
            let dashed = !link.contains(LinkLine::HORIZ_PARENT);
            let left = i as f64;
            painter.line((left, LINK), (left + 1.0, LINK), i, dashed);
        }

        for (bit, step, dashed) in DIAGONALS {
            if !link.contains(bit) {
                continue;
            }
            let Some(target) = i.checked_add_signed(step).filter(|&t| t < width) else {
                continue;
            };
            if mirrored_merge(bit).is_some_and(|merge| row.link_at(target).contains(merge)) {
                continue;
            }
            let x = i as f64 + 0.5;
            painter.line((x, LINK), (target as f64 + 0.5, BOTTOM), i, dashed);
        }

        if row.term_at(i) {
            painter.vertical(i, TERM, BOTTOM, true);
        }

        let unknown = link.unknown();
        if !unknown.is_empty() {
            trace!(node = %row.node, column = i, bits = unknown.bits(), "ignoring unknown link bits");
        }
    }

    painter.finish()
}

/// Render every row, feeding each row the pad line of the one above.
#[must_use]
pub fn render_graph(rows: &[GraphRow], style: &GraphStyle) -> Vec<Vec<Primitive>> {
    let mut prev_pad: Option<&[PadLine]> = None;
    rows.iter()
        .map(|row| {
            let primitives = render_row(row, prev_pad, style);
            prev_pad = Some(row.pad_lines.as_slice());
            primitives
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(
        node_line: Vec<NodeLine>,
        link_line: Option<Vec<LinkLine>>,
        pad_lines: Vec<PadLine>,
    ) -> GraphRow {
        GraphRow {
            node: "n".to_string(),
            glyph: "@".to_string(),
            merge: false,
            node_line,
            link_line,
            term_line: None,
            pad_lines,
        }
    }

    fn lines(prims: &[Primitive]) -> Vec<&LineSegment> {
        prims
            .iter()
            .filter_map(|p| match p {
                Primitive::Line(l) => Some(l),
                Primitive::Circle(_) => None,
            })
            .collect()
    }

    fn diagonals(prims: &[Primitive]) -> Vec<&LineSegment> {
        lines(prims)
            .into_iter()
            .filter(|l| (l.x1 - l.x2).abs() > f64::EPSILON && (l.y1 - l.y2).abs() > f64::EPSILON)
            .collect()
    }

    fn style() -> GraphStyle {
        GraphStyle {
            column_width: 10.0,
            row_height: 100.0,
            ..GraphStyle::default()
        }
    }

    #[test]
    fn test_fork_suppressed_by_matching_merge() {
        let r = row(
            vec![NodeLine::Node, NodeLine::Blank],
            Some(vec![
                LinkLine::VERT_PARENT | LinkLine::RIGHT_FORK_PARENT,
                LinkLine::LEFT_MERGE_PARENT,
            ]),
            vec![],
        );
        let prev = [PadLine::Parent, PadLine::Parent];
        let prims = render_row(&r, Some(&prev), &style());
        let diags = diagonals(&prims);
        assert_eq!(diags.len(), 1);
        let d = diags[0];
        // From column 1 at the link line to column 0 at the bottom
        assert!((d.x1 - 15.0).abs() < 1e-9 && (d.y1 - 60.0).abs() < 1e-9);
        assert!((d.x2 - 5.0).abs() < 1e-9 && (d.y2 - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_unmatched_fork_is_drawn() {
        let r = row(
            vec![NodeLine::Node, NodeLine::Blank],
            Some(vec![LinkLine::RIGHT_FORK_ANCESTOR, LinkLine::empty()]),
            vec![PadLine::Blank, PadLine::Ancestor],
        );
        let prims = render_row(&r, None, &style());
        let diags = diagonals(&prims);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].dashed);
        assert!((diags[0].x2 - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_range_diagonal_skipped() {
        let r = row(
            vec![NodeLine::Node],
            Some(vec![LinkLine::LEFT_MERGE_PARENT | LinkLine::RIGHT_FORK_PARENT]),
            vec![],
        );
        assert!(diagonals(&render_row(&r, None, &style())).is_empty());
    }

    #[test]
    fn test_unknown_bits_ignored_alongside_known() {
        let r = row(
            vec![NodeLine::Node, NodeLine::Blank],
            Some(vec![
                LinkLine::empty(),
                LinkLine::from_bits_retain(0x8000 | LinkLine::LEFT_MERGE_PARENT.bits()),
            ]),
            vec![],
        );
        let prims = render_row(&r, None, &style());
        assert_eq!(lines(&prims).len(), 1);
        let diags = diagonals(&prims);
        assert_eq!(diags.len(), 1);
        assert!((diags[0].x1 - 15.0).abs() < 1e-9 && (diags[0].x2 - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_isolated_node_is_only_a_circle() {
        let r = row(vec![NodeLine::Node], None, vec![PadLine::Blank]);
        let prims = render_row(&r, None, &style());
        assert_eq!(prims.len(), 1);
        assert!(matches!(&prims[0], Primitive::Circle(c) if c.fill == c.stroke));
    }

    #[test]
    fn test_hollow_node_for_empty_commit() {
        let mut r = row(vec![NodeLine::Node], None, vec![]);
        r.glyph = "o".to_string();
        let s = style();
        let prims = render_row(&r, None, &s);
        assert!(matches!(&prims[0], Primitive::Circle(c) if c.fill == s.hollow_fill));
    }

    #[test]
    fn test_passing_lanes_solid_and_dashed() {
        let r = row(
            vec![NodeLine::Parent, NodeLine::Node, NodeLine::Ancestor],
            None,
            vec![PadLine::Parent, PadLine::Parent, PadLine::Blank],
        );
        let prev = [PadLine::Parent, PadLine::Blank, PadLine::Ancestor];
        let prims = render_row(&r, Some(&prev), &style());
        let ls = lines(&prims);
        // Column 0 runs full height; column 2 stops at the link line
        assert!(ls.iter().any(|l| (l.x1 - 5.0).abs() < 1e-9 && l.y1 == 0.0 && (l.y2 - 100.0).abs() < 1e-9 && !l.dashed));
        assert!(ls.iter().any(|l| (l.x1 - 25.0).abs() < 1e-9 && (l.y2 - 60.0).abs() < 1e-9 && l.dashed));
        // Node has no lane above, so only the bottom half
        let node_col: Vec<_> = ls.iter().filter(|l| (l.x1 - 15.0).abs() < 1e-9).collect();
        assert_eq!(node_col.len(), 1);
        assert!((node_col[0].y1 - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_circles_after_lines() {
        let r = row(
            vec![NodeLine::Node, NodeLine::Parent],
            Some(vec![LinkLine::empty(), LinkLine::VERT_PARENT]),
            vec![PadLine::Parent, PadLine::Parent],
        );
        let prims = render_row(&r, Some(&[PadLine::Parent, PadLine::Parent]), &style());
        let first_circle = prims
            .iter()
            .position(|p| matches!(p, Primitive::Circle(_)))
            .unwrap();
        assert!(prims[first_circle..]
            .iter()
            .all(|p| matches!(p, Primitive::Circle(_))));
    }

    #[test]
    fn test_terminator_and_horizontal() {
        let mut r = row(
            vec![NodeLine::Node, NodeLine::Blank],
            Some(vec![LinkLine::empty(), LinkLine::HORIZ_ANCESTOR]),
            vec![],
        );
        r.term_line = Some(vec![true, false]);
        let prims = render_row(&r, None, &style());
        let ls = lines(&prims);
        assert!(ls.iter().any(|l| l.dashed && (l.y1 - 85.0).abs() < 1e-9 && (l.y2 - 100.0).abs() < 1e-9));
        assert!(ls.iter().any(|l| l.dashed && (l.y1 - 60.0).abs() < 1e-9 && (l.y2 - 60.0).abs() < 1e-9 && (l.x2 - l.x1 - 10.0).abs() < 1e-9));
    }

    #[test]
    fn test_pad_continuity_across_rows() {
        let rows = vec![
            row(
                vec![NodeLine::Node, NodeLine::Parent],
                Some(vec![LinkLine::VERT_PARENT, LinkLine::VERT_PARENT]),
                vec![PadLine::Parent, PadLine::Ancestor],
            ),
            row(
                vec![NodeLine::Node, NodeLine::Blank],
                Some(vec![
                    LinkLine::VERT_PARENT | LinkLine::RIGHT_FORK_PARENT,
                    LinkLine::LEFT_MERGE_ANCESTOR,
                ]),
                vec![PadLine::Parent, PadLine::Blank],
            ),
        ];
        let s = style();
        let rendered = render_graph(&rows, &s);
        assert_eq!(rendered.len(), 2);
        for (i, pad) in rows[0].pad_lines.iter().enumerate() {
            if pad.continues() {
                let x = (i as f64 + 0.5) * s.column_width;
                assert!(
                    lines(&rendered[1])
                        .iter()
                        .any(|l| (l.x1 - x).abs() < 1e-9 && l.y1 == 0.0),
                    "column {i} has no line from the top"
                );
            }
        }
        // Flavours differ, so the parent fork is still drawn alongside the merge
        assert_eq!(diagonals(&rendered[1]).len(), 2);
    }

    #[test]
    fn test_lane_color_cycles() {
        let s = GraphStyle::default();
        assert_eq!(s.lane_color(0), s.lane_color(8));
        let empty = GraphStyle {
            palette: Vec::new(),
            ..GraphStyle::default()
        };
        assert_eq!(empty.lane_color(3), FALLBACK_STROKE);
    }
}
