//! SVG serialization of rendered graph rows.

use super::render::{GraphStyle, Primitive};

/// Dash pattern for ancestor edges and terminators
const DASH: &str = "3 2";

/// One SVG document with each row's primitives shifted down into its band.
#[must_use]
pub fn to_svg(rows: &[Vec<Primitive>], style: &GraphStyle) -> String {
    let columns = rows
        .iter()
        .flatten()
        .map(|p| match p {
            Primitive::Line(l) => l.x1.max(l.x2),
            Primitive::Circle(c) => c.cx + c.r,
        })
        .fold(0.0_f64, f64::max);
    let width = (columns / style.column_width).ceil().max(1.0) * style.column_width;
    let height = rows.len() as f64 * style.row_height;

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    );
    svg.push('\n');
    for (n, primitives) in rows.iter().enumerate() {
        svg.push_str(&format!(
            "  <g transform=\"translate(0 {})\">\n",
            n as f64 * style.row_height
        ));
        for primitive in primitives {
            match primitive {
                Primitive::Line(l) => {
                    let dash = if l.dashed {
                        format!(r#" stroke-dasharray="{DASH}""#)
                    } else {
                        String::new()
                    };
                    svg.push_str(&format!(
                        "    <line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{}\" stroke-width=\"2\"{dash}/>\n",
                        l.x1,
                        l.y1,
                        l.x2,
                        l.y2,
                        escape(&l.stroke)
                    ));
                }
                Primitive::Circle(c) => {
                    svg.push_str(&format!(
                        "    <circle cx=\"{}\" cy=\"{}\" r=\"{}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"1.5\"/>\n",
                        c.cx,
                        c.cy,
                        c.r,
                        escape(&c.fill),
                        escape(&c.stroke)
                    ));
                }
            }
        }
        svg.push_str("  </g>\n");
    }
    svg.push_str("</svg>\n");
    svg
}

fn escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}
