use std::collections::BTreeMap;

use crate::model::NodeId;
use crate::Diagram;

/// Undirected edge-weight table between node pairs. Parallel associations
/// between the same pair add up; self-loops carry no placement information
/// and are skipped.
#[derive(Debug, Default)]
pub struct Adjacency {
    neighbors: BTreeMap<NodeId, BTreeMap<NodeId, usize>>,
}

impl Adjacency {
    pub fn from_diagram(diagram: &Diagram) -> Self {
        let mut adj = Adjacency::default();
        for edge in diagram.edges() {
            if edge.is_loop() {
                continue;
            }
            *adj.neighbors
                .entry(edge.key.source.clone())
                .or_default()
                .entry(edge.target.clone())
                .or_insert(0) += 1;
            *adj.neighbors
                .entry(edge.target.clone())
                .or_default()
                .entry(edge.key.source.clone())
                .or_insert(0) += 1;
        }
        adj
    }

    pub fn neighbors(&self, id: &NodeId) -> impl Iterator<Item = (&NodeId, usize)> {
        self.neighbors
            .get(id)
            .into_iter()
            .flat_map(|m| m.iter().map(|(n, w)| (n, *w)))
    }

    pub fn degree(&self, id: &NodeId) -> usize {
        self.neighbors
            .get(id)
            .map(|m| m.values().sum())
            .unwrap_or(0)
    }
}
