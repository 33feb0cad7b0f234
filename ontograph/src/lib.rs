pub mod export;
pub mod focus;
pub mod geometry;
pub mod json;
pub mod layout;
pub mod model;
pub mod positions;
pub mod reconcile;
pub mod sync;

use std::collections::{BTreeMap, BTreeSet};

use geometry::{Coordinate, Rect};
use model::{AssociationEdge, DiagramNode, EdgeKey, NodeId, NodeKind};

pub use focus::{CameraTransform, FocusLevel, Viewport, ZoomDirection};
pub use model::{DomainClass, RenderCommand};
pub use positions::PositionStore;
pub use reconcile::VertexAction;
pub use sync::{DragButton, GraphSyncEngine, RefreshPolicy, SyncError};

/// The in-memory diagram graph: an arena of nodes and association edges keyed
/// by stable ids, with an incoming-target index so placeholder decisions are
/// O(1) instead of link scans.
///
/// Owned and structurally mutated only by the sync engine; layout and
/// reconciliation get read access plus coordinate/vertex writes.
#[derive(Clone, Debug, Default)]
pub struct Diagram {
    nodes: BTreeMap<NodeId, DiagramNode>,
    edges: BTreeMap<EdgeKey, AssociationEdge>,
    incoming: BTreeMap<NodeId, BTreeSet<EdgeKey>>,
}

impl Diagram {
    pub fn new() -> Self {
        Diagram::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn contains_node(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: &NodeId) -> Option<&DiagramNode> {
        self.nodes.get(id)
    }

    pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut DiagramNode> {
        self.nodes.get_mut(id)
    }

    pub fn edge(&self, key: &EdgeKey) -> Option<&AssociationEdge> {
        self.edges.get(key)
    }

    pub fn edge_mut(&mut self, key: &EdgeKey) -> Option<&mut AssociationEdge> {
        self.edges.get_mut(key)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &DiagramNode> {
        self.nodes.values()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.nodes.keys()
    }

    pub fn edges(&self) -> impl Iterator<Item = &AssociationEdge> {
        self.edges.values()
    }

    /// Inserts or replaces a node record. Structural bookkeeping only; the
    /// caller is responsible for the matching render command.
    pub fn insert_node(&mut self, node: DiagramNode) {
        self.nodes.insert(node.id.clone(), node);
    }

    /// Removes a node and its outgoing edges. Incoming edges must have been
    /// rerouted or removed by the caller first.
    pub fn remove_node(&mut self, id: &NodeId) -> Vec<EdgeKey> {
        debug_assert!(
            !self.is_association_target(id),
            "node removed while still an association target"
        );
        self.nodes.remove(id);
        self.incoming.remove(id);
        let outgoing: Vec<EdgeKey> = self
            .edges
            .keys()
            .filter(|k| &k.source == id)
            .cloned()
            .collect();
        for key in &outgoing {
            self.remove_edge(key);
        }
        outgoing
    }

    pub fn insert_edge(&mut self, edge: AssociationEdge) {
        debug_assert!(
            self.contains_node(&edge.key.source) && self.contains_node(&edge.target),
            "edge endpoints must exist before the edge"
        );
        self.incoming
            .entry(edge.target.clone())
            .or_default()
            .insert(edge.key.clone());
        self.edges.insert(edge.key.clone(), edge);
    }

    pub fn remove_edge(&mut self, key: &EdgeKey) -> Option<AssociationEdge> {
        let edge = self.edges.remove(key)?;
        if let Some(set) = self.incoming.get_mut(&edge.target) {
            set.remove(key);
            if set.is_empty() {
                self.incoming.remove(&edge.target);
            }
        }
        Some(edge)
    }

    pub fn outgoing_edges(&self, id: &NodeId) -> Vec<EdgeKey> {
        self.edges
            .keys()
            .filter(|k| &k.source == id)
            .cloned()
            .collect()
    }

    pub fn incoming_edges(&self, id: &NodeId) -> Vec<EdgeKey> {
        self.incoming
            .get(id)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Every edge with the node as source or target.
    pub fn edges_touching(&self, id: &NodeId) -> Vec<EdgeKey> {
        let mut keys = self.outgoing_edges(id);
        for key in self.incoming_edges(id) {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        keys
    }

    pub fn is_association_target(&self, id: &NodeId) -> bool {
        self.incoming.get(id).map(|s| !s.is_empty()).unwrap_or(false)
    }

    /// Neighbor node ids in either edge direction.
    pub fn neighbors(&self, id: &NodeId) -> BTreeSet<NodeId> {
        let mut out = BTreeSet::new();
        for key in self.edges_touching(id) {
            if let Some(edge) = self.edges.get(&key) {
                if &edge.key.source != id {
                    out.insert(edge.key.source.clone());
                }
                if &edge.target != id {
                    out.insert(edge.target.clone());
                }
            }
        }
        out
    }

    /// Placeholder neighbors that would be left with no remaining edges once
    /// the given node goes away.
    pub fn orphaned_placeholders_after_removal(&self, id: &NodeId) -> Vec<NodeId> {
        let mut orphans = Vec::new();
        for neighbor in self.neighbors(id) {
            let node = match self.nodes.get(&neighbor) {
                Some(n) => n,
                None => continue,
            };
            if node.kind != NodeKind::Placeholder {
                continue;
            }
            let remaining = self
                .edges_touching(&neighbor)
                .into_iter()
                .filter(|key| {
                    self.edges
                        .get(key)
                        .map(|e| &e.key.source != id && &e.target != id)
                        .unwrap_or(false)
                })
                .count();
            if remaining == 0 {
                orphans.push(neighbor);
            }
        }
        orphans
    }

    pub fn set_node_center(&mut self, id: &NodeId, center: Coordinate) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.center = center;
        }
    }

    pub fn node_rect(&self, id: &NodeId) -> Option<Rect> {
        self.nodes
            .get(id)
            .map(|n| Rect::from_center(n.center, n.size))
    }

    /// Bounding box of the given nodes, or of the whole graph when `ids` is
    /// `None`. Empty input yields `None`.
    pub fn bounding_box<'a, I>(&self, ids: Option<I>) -> Option<Rect>
    where
        I: IntoIterator<Item = &'a NodeId>,
    {
        let mut bbox: Option<Rect> = None;
        let mut extend = |rect: Rect| {
            bbox = Some(match bbox {
                Some(b) => b.union(&rect),
                None => rect,
            });
        };
        match ids {
            Some(ids) => {
                for id in ids {
                    if let Some(rect) = self.node_rect(id) {
                        extend(rect);
                    }
                }
            }
            None => {
                for node in self.nodes.values() {
                    extend(Rect::from_center(node.center, node.size));
                }
            }
        }
        bbox
    }

    /// Checks the structural invariant that every edge target resolves to a
    /// node present in the graph.
    pub fn dangling_edge_targets(&self) -> Vec<EdgeKey> {
        self.edges
            .values()
            .filter(|e| !self.nodes.contains_key(&e.target))
            .map(|e| e.key.clone())
            .collect()
    }
}
