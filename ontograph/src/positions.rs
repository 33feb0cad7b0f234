use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geometry::{coordinates_are_equal, vertices_are_equal, Coordinate};
use crate::model::{EdgeKey, NodeId};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NodePosition {
    pub coordinate: Option<Coordinate>,
    /// Whether the coordinate came from a user drag rather than auto-layout.
    pub user_defined: bool,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EdgePosition {
    pub vertices: Vec<Coordinate>,
}

/// Result of comparing two stores, by key.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PositionDiff {
    pub nodes: Vec<NodeId>,
    pub edges: Vec<EdgeKey>,
}

impl PositionDiff {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

/// Persisted 2-D coordinates for nodes and polyline vertices for links.
///
/// A record exists for every node and edge currently in the diagram; an absent
/// coordinate means the node still needs layout. All writes go through the
/// truncation-tolerant setters so sub-pixel drift from the rendering surface
/// never dirties the store.
#[derive(Clone, Debug, Default)]
pub struct PositionStore {
    nodes: BTreeMap<NodeId, NodePosition>,
    edges: BTreeMap<EdgeKey, EdgePosition>,
    dirty: bool,
}

impl PositionStore {
    pub fn new() -> Self {
        PositionStore::default()
    }

    pub fn is_pristine(&self) -> bool {
        !self.dirty
    }

    pub fn set_pristine(&mut self) {
        self.dirty = false;
    }

    pub fn ensure_node(&mut self, id: &NodeId) {
        self.nodes.entry(id.clone()).or_default();
    }

    pub fn ensure_edge(&mut self, key: &EdgeKey) {
        self.edges.entry(key.clone()).or_default();
    }

    pub fn node_coordinate(&self, id: &NodeId) -> Option<Coordinate> {
        self.nodes.get(id).and_then(|p| p.coordinate)
    }

    pub fn is_user_defined(&self, id: &NodeId) -> bool {
        self.nodes.get(id).map(|p| p.user_defined).unwrap_or(false)
    }

    pub fn edge_vertices(&self, key: &EdgeKey) -> &[Coordinate] {
        self.edges
            .get(key)
            .map(|p| p.vertices.as_slice())
            .unwrap_or(&[])
    }

    /// Returns true when the coordinate actually changed beyond the
    /// whole-pixel tolerance.
    pub fn set_node_coordinate(
        &mut self,
        id: &NodeId,
        coordinate: Coordinate,
        user_defined: bool,
    ) -> bool {
        let entry = self.nodes.entry(id.clone()).or_default();
        if let Some(existing) = entry.coordinate {
            if coordinates_are_equal(existing, coordinate) {
                return false;
            }
        }
        entry.coordinate = Some(coordinate);
        entry.user_defined = user_defined;
        self.dirty = true;
        true
    }

    pub fn set_edge_vertices(&mut self, key: &EdgeKey, vertices: Vec<Coordinate>) -> bool {
        let entry = self.edges.entry(key.clone()).or_default();
        if vertices_are_equal(&entry.vertices, &vertices) {
            return false;
        }
        entry.vertices = vertices;
        self.dirty = true;
        true
    }

    pub fn clear_edge_vertices(&mut self, key: &EdgeKey) -> bool {
        self.set_edge_vertices(key, Vec::new())
    }

    /// Migrates the node record and every edge record keyed by the old source
    /// id. Part of id-change handling; runs before the graph is patched.
    pub fn change_node_id(&mut self, old: &NodeId, new: &NodeId) {
        if let Some(record) = self.nodes.remove(old) {
            self.nodes.insert(new.clone(), record);
            self.dirty = true;
        }
        let moved: Vec<EdgeKey> = self
            .edges
            .keys()
            .filter(|k| &k.source == old)
            .cloned()
            .collect();
        for key in moved {
            if let Some(record) = self.edges.remove(&key) {
                self.edges.insert(
                    EdgeKey::new(new.clone(), key.property.clone()),
                    record,
                );
                self.dirty = true;
            }
        }
    }

    /// Node ids whose record has no coordinate yet.
    pub fn ids_without_coordinate(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, p)| p.coordinate.is_none())
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Drops all stored geometry but keeps the key set, so every node counts
    /// as "needs layout" again.
    pub fn clear(&mut self) {
        for record in self.nodes.values_mut() {
            record.coordinate = None;
            record.user_defined = false;
        }
        for record in self.edges.values_mut() {
            record.vertices.clear();
        }
        self.dirty = true;
    }

    /// Replaces the contents from another store. The result matches that
    /// store exactly, so the dirty flag follows it.
    pub fn reset_with(&mut self, other: &PositionStore) {
        self.nodes = other.nodes.clone();
        self.edges = other.edges.clone();
        self.dirty = other.dirty;
    }

    pub fn diff(&self, other: &PositionStore) -> PositionDiff {
        let mut diff = PositionDiff::default();
        let node_ids: std::collections::BTreeSet<&NodeId> =
            self.nodes.keys().chain(other.nodes.keys()).collect();
        for id in node_ids {
            let l = self.nodes.get(id);
            let r = other.nodes.get(id);
            let same = match (l, r) {
                (Some(a), Some(b)) => match (a.coordinate, b.coordinate) {
                    (Some(ca), Some(cb)) => coordinates_are_equal(ca, cb),
                    (None, None) => true,
                    _ => false,
                },
                (None, None) => true,
                _ => false,
            };
            if !same {
                diff.nodes.push((*id).clone());
            }
        }
        let edge_keys: std::collections::BTreeSet<&EdgeKey> =
            self.edges.keys().chain(other.edges.keys()).collect();
        for key in edge_keys {
            let l = self.edges.get(key).map(|p| p.vertices.as_slice()).unwrap_or(&[]);
            let r = other.edges.get(key).map(|p| p.vertices.as_slice()).unwrap_or(&[]);
            if !vertices_are_equal(l, r) {
                diff.edges.push((*key).clone());
            }
        }
        diff
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&NodeId, &NodePosition)> {
        self.nodes.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = (&EdgeKey, &EdgePosition)> {
        self.edges.iter()
    }

    pub(crate) fn insert_node_record(&mut self, id: NodeId, record: NodePosition) {
        self.nodes.insert(id, record);
    }

    pub(crate) fn insert_edge_record(&mut self, key: EdgeKey, record: EdgePosition) {
        self.edges.insert(key, record);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subpixel_write_does_not_dirty() {
        let mut store = PositionStore::new();
        let id = NodeId::new("http://example.org/A");
        store.set_node_coordinate(&id, Coordinate::new(10.2, 20.4), false);
        store.set_pristine();
        let changed = store.set_node_coordinate(&id, Coordinate::new(10.9, 20.1), false);
        assert!(!changed);
        assert!(store.is_pristine());
    }

    #[test]
    fn diff_reports_changed_keys_only() {
        let mut left = PositionStore::new();
        let mut right = PositionStore::new();
        let a = NodeId::new("a");
        let b = NodeId::new("b");
        left.set_node_coordinate(&a, Coordinate::new(1.0, 1.0), false);
        right.set_node_coordinate(&a, Coordinate::new(1.4, 1.2), false);
        right.set_node_coordinate(&b, Coordinate::new(9.0, 9.0), false);

        let diff = left.diff(&right);
        assert_eq!(diff.nodes, vec![b]);
        assert!(diff.edges.is_empty());
    }

    #[test]
    fn id_change_migrates_node_and_edge_records() {
        let mut store = PositionStore::new();
        let old = NodeId::new("u1");
        let new = NodeId::new("u2");
        let key = EdgeKey::new(old.clone(), crate::model::PropertyId::new("p"));
        store.set_node_coordinate(&old, Coordinate::new(1.0, 2.0), true);
        store.set_edge_vertices(&key, vec![Coordinate::new(5.0, 5.0)]);
        store.change_node_id(&old, &new);
        assert!(store.node_coordinate(&old).is_none());
        assert!(store.node_coordinate(&new).is_some());
        let migrated = EdgeKey::new(new, key.property.clone());
        assert_eq!(store.edge_vertices(&migrated).len(), 1);
        assert!(store.edge_vertices(&key).is_empty());
    }
}
