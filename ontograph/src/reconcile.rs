use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::geometry::{boundary_anchor, polyline_midpoint, Coordinate, Rect};
use crate::model::{EdgeKey, NodeId};
use crate::positions::PositionStore;
use crate::Diagram;

/// What happens to an edge's route vertices during reconciliation. The choice
/// is driven by interaction context: a right-drag discards manual routing, a
/// left-drag keeps it, a structural edit restores the persisted route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VertexAction {
    /// Discard all stored vertices and fall back to straight-line anchors.
    Reset,
    /// Preserve vertices, except self-loops get their route regenerated.
    KeepAllButLoops,
    /// Use only the persisted vertices from the position store, ignoring any
    /// transient visual drift.
    KeepPersistent,
}

/// Vertical clearance for the generated self-loop route.
const LOOP_CLEARANCE: f64 = 40.0;

/// Recomputes anchors, vertices and label anchors for every edge touching the
/// affected nodes (all edges when `None`). Each edge is adjusted at most once
/// per pass. Geometry diffs are pushed to the position store under the
/// whole-pixel tolerance, so render jitter never shows up as a user move.
pub fn adjust_links(
    diagram: &mut Diagram,
    positions: &mut PositionStore,
    affected: Option<&[NodeId]>,
    action: VertexAction,
) {
    let mut keys: Vec<EdgeKey> = Vec::new();
    let mut seen: BTreeSet<EdgeKey> = BTreeSet::new();
    match affected {
        Some(ids) => {
            for id in ids {
                for key in diagram.edges_touching(id) {
                    if seen.insert(key.clone()) {
                        keys.push(key);
                    }
                }
            }
        }
        None => {
            for edge in diagram.edges() {
                if seen.insert(edge.key.clone()) {
                    keys.push(edge.key.clone());
                }
            }
        }
    }

    for key in keys {
        adjust_one(diagram, positions, &key, action);
    }
}

fn adjust_one(
    diagram: &mut Diagram,
    positions: &mut PositionStore,
    key: &EdgeKey,
    action: VertexAction,
) {
    let (source_rect, target_rect, is_loop, current_vertices) = {
        let edge = match diagram.edge(key) {
            Some(e) => e,
            None => return,
        };
        let source_rect = match diagram.node_rect(&edge.key.source) {
            Some(r) => r,
            None => return,
        };
        let target_rect = match diagram.node_rect(&edge.target) {
            Some(r) => r,
            None => return,
        };
        (source_rect, target_rect, edge.is_loop(), edge.vertices.clone())
    };

    let vertices = match action {
        VertexAction::Reset => {
            if is_loop {
                loop_route(source_rect)
            } else {
                Vec::new()
            }
        }
        VertexAction::KeepAllButLoops => {
            if is_loop {
                loop_route(source_rect)
            } else {
                current_vertices
            }
        }
        VertexAction::KeepPersistent => positions.edge_vertices(key).to_vec(),
    };

    let source_anchor = boundary_anchor(
        source_rect,
        vertices.first().copied().unwrap_or(target_rect.center()),
    );
    let target_anchor = boundary_anchor(
        target_rect,
        vertices.last().copied().unwrap_or(source_rect.center()),
    );

    if let Some(edge) = diagram.edge_mut(key) {
        edge.vertices = vertices.clone();
        edge.source_anchor = source_anchor;
        edge.target_anchor = target_anchor;
        edge.label_anchor = polyline_midpoint(&edge.polyline());
    }

    // KeepPersistent reads from the store; the other modes report the
    // resulting route back to it.
    if action != VertexAction::KeepPersistent {
        positions.set_edge_vertices(key, vertices);
    }
}

/// Recomputes anchors and the label anchor of one edge from its current
/// vertices, leaving the route itself alone. Used when the rendering layer
/// reports a reshaped link.
pub fn refresh_edge_geometry(diagram: &mut Diagram, key: &EdgeKey) {
    let (source_rect, target_rect, vertices) = {
        let edge = match diagram.edge(key) {
            Some(e) => e,
            None => return,
        };
        let source_rect = match diagram.node_rect(&edge.key.source) {
            Some(r) => r,
            None => return,
        };
        let target_rect = match diagram.node_rect(&edge.target) {
            Some(r) => r,
            None => return,
        };
        (source_rect, target_rect, edge.vertices.clone())
    };

    let source_anchor = boundary_anchor(
        source_rect,
        vertices.first().copied().unwrap_or(target_rect.center()),
    );
    let target_anchor = boundary_anchor(
        target_rect,
        vertices.last().copied().unwrap_or(source_rect.center()),
    );
    if let Some(edge) = diagram.edge_mut(key) {
        edge.source_anchor = source_anchor;
        edge.target_anchor = target_anchor;
        edge.label_anchor = polyline_midpoint(&edge.polyline());
    }
}

/// Two waypoints above the node so a self-referencing association stays
/// visible instead of collapsing to a point.
fn loop_route(rect: Rect) -> Vec<Coordinate> {
    let c = rect.center();
    vec![
        Coordinate::new(c.x + rect.width / 4.0, rect.y - LOOP_CLEARANCE),
        Coordinate::new(c.x - rect.width / 4.0, rect.y - LOOP_CLEARANCE),
    ]
}
