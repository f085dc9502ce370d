//! Commit graph rows → drawing primitives

mod encoding;
mod render;
pub mod svg;

pub use encoding::{GraphRow, LinkLine, NodeLine, PadLine};
pub use render::{
    render_graph, render_row, GraphStyle, LineSegment, NodeCircle, Primitive, DEFAULT_PALETTE,
};
