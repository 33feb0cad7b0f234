// Deterministic graph-driven layouter for the diagram.
//
// Goals:
// - Deterministic: no randomness, no time budgets
// - Incremental: when given an explicit node set, only those nodes move;
//   everything else is a fixed obstacle and anchor
// - Graph-driven: newly introduced nodes land near the nodes they connect to
// - No gross overlap between node rectangles

use std::collections::BTreeMap;

use crate::geometry::{Coordinate, Dimensions};
use crate::model::NodeId;
use crate::positions::PositionStore;
use crate::Diagram;

mod adjacency;
mod grid;
mod placement;

use adjacency::Adjacency;
use placement::Placement;

#[derive(Clone, Debug)]
pub struct LayoutConfig {
    /// Default node rectangle when the diagram carries no measured size.
    pub node_size: Dimensions,
    /// Spacing between neighboring nodes.
    pub gap: f64,
    /// Padding from the origin for grid-fallback rows.
    pub padding: f64,
    /// Max row width before the grid fallback wraps.
    pub max_row_width: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            node_size: Dimensions {
                width: 220.0,
                height: 120.0,
            },
            gap: 40.0,
            padding: 24.0,
            max_row_width: 1600.0,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct LayoutResult {
    /// New centers for exactly the nodes that were asked to be placed.
    pub placed: BTreeMap<NodeId, Coordinate>,
}

/// Computes coordinates for `only` (or every node when `None`). Nodes outside
/// the input set are never assigned a coordinate; their stored positions act
/// as fixed anchors. The caller applies the result to the diagram and decides
/// about persistence.
pub fn layout(
    diagram: &Diagram,
    positions: &PositionStore,
    only: Option<&[NodeId]>,
    cfg: &LayoutConfig,
) -> LayoutResult {
    let adjacency = Adjacency::from_diagram(diagram);
    let mut placement = Placement::new(diagram, &adjacency, cfg);

    let free: Vec<NodeId> = match only {
        Some(ids) => {
            // Everything outside the input set is fixed at its current
            // coordinate (stored position when present, else live center).
            for node in diagram.nodes() {
                if ids.contains(&node.id) {
                    continue;
                }
                let center = positions.node_coordinate(&node.id).unwrap_or(node.center);
                placement.fix(&node.id, center);
            }
            ids.iter().filter(|id| diagram.contains_node(id)).cloned().collect()
        }
        None => diagram.node_ids().cloned().collect(),
    };

    LayoutResult {
        placed: placement.place_all(&free),
    }
}
