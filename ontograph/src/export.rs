use std::fmt::Write;

use chrono::{NaiveDate, Utc};

use crate::model::NodeKind;
use crate::Diagram;

const EXPORT_MARGIN: f64 = 20.0;

/// Serializes the current diagram into a standalone SVG document: node
/// rectangles with labels, association polylines with arrowheads and label
/// anchors. Rasterization to a bitmap happens outside the core; when it
/// fails, this vector artifact is all that gets offered.
pub fn to_svg(diagram: &Diagram) -> String {
    let bbox = diagram
        .bounding_box::<std::iter::Empty<&crate::model::NodeId>>(None)
        .unwrap_or(crate::geometry::Rect {
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
        });
    let x = bbox.x - EXPORT_MARGIN;
    let y = bbox.y - EXPORT_MARGIN;
    let w = bbox.width + 2.0 * EXPORT_MARGIN;
    let h = bbox.height + 2.0 * EXPORT_MARGIN;

    let mut svg = String::new();
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" viewBox=\"{x} {y} {w} {h}\">"
    );
    svg.push_str(
        "<defs><marker id=\"arrow\" markerWidth=\"10\" markerHeight=\"10\" refX=\"8\" refY=\"3\" \
         orient=\"auto\"><path d=\"M0,0 L8,3 L0,6 Z\"/></marker></defs>",
    );

    for edge in diagram.edges() {
        let mut d = format!("M {} {}", edge.source_anchor.x, edge.source_anchor.y);
        for v in &edge.vertices {
            let _ = write!(d, " L {} {}", v.x, v.y);
        }
        let _ = write!(d, " L {} {}", edge.target_anchor.x, edge.target_anchor.y);
        let _ = write!(
            svg,
            "<path d=\"{}\" fill=\"none\" stroke=\"black\" marker-end=\"url(#arrow)\"/>",
            d
        );
        if !edge.label.is_empty() {
            let _ = write!(
                svg,
                "<text x=\"{}\" y=\"{}\" font-size=\"11\" text-anchor=\"middle\">{}</text>",
                edge.label_anchor.x,
                edge.label_anchor.y,
                escape(&edge.label)
            );
        }
    }

    for node in diagram.nodes() {
        let rect = crate::geometry::Rect::from_center(node.center, node.size);
        let dash = match node.kind {
            NodeKind::Placeholder => " stroke-dasharray=\"4 2\"",
            NodeKind::Concrete => "",
        };
        let _ = write!(
            svg,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"white\" stroke=\"black\"{}/>",
            rect.x, rect.y, rect.width, rect.height, dash
        );
        let style = if node.flags.abstract_class {
            " font-style=\"italic\""
        } else {
            ""
        };
        let _ = write!(
            svg,
            "<text x=\"{}\" y=\"{}\" font-size=\"13\" text-anchor=\"middle\"{}>{}</text>",
            node.center.x,
            rect.y + 18.0,
            style,
            escape(&node.label)
        );
    }

    svg.push_str("</svg>");
    svg
}

/// `<model-prefix>-visualization-<ISO-date>.<ext>`, dated today.
pub fn export_file_name(model_prefix: &str, extension: &str) -> String {
    export_file_name_for_date(model_prefix, extension, Utc::now().date_naive())
}

pub fn export_file_name_for_date(model_prefix: &str, extension: &str, date: NaiveDate) -> String {
    format!(
        "{}-visualization-{}.{}",
        model_prefix,
        date.format("%Y-%m-%d"),
        extension.to_lowercase()
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn svg_carries_nodes_and_labels() {
        use crate::geometry::{Coordinate, Dimensions};
        use crate::model::{DiagramNode, DisplayFlags, NodeId};

        let mut diagram = Diagram::default();
        diagram.insert_node(DiagramNode {
            id: NodeId::new("http://example.org/A"),
            kind: NodeKind::Concrete,
            label: "Per<son>".to_string(),
            flags: DisplayFlags::default(),
            size: Dimensions {
                width: 220.0,
                height: 120.0,
            },
            center: Coordinate::new(0.0, 0.0),
        });
        let svg = to_svg(&diagram);
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Per&lt;son&gt;"));
        assert!(svg.contains("<rect"));
    }

    #[test]
    fn file_name_follows_pattern() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(
            export_file_name_for_date("iow", "SVG", date),
            "iow-visualization-2024-03-09.svg"
        );
    }
}
