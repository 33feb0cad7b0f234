use serde::{Deserialize, Serialize};

use crate::geometry::Coordinate;
use crate::model::{DomainClass, EdgeKey, NodeId, PropertyId};
use crate::positions::{EdgePosition, NodePosition, PositionStore};

/// Snapshot fetched from the persistence collaborator at initialize time.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VisualizationSnapshot {
    #[serde(default)]
    pub classes: Vec<DomainClass>,
    #[serde(default)]
    pub positions: PositionSnapshot,
}

/// The coordinate/vertex payload of the explicit "save positions" call.
/// Records without a coordinate are omitted; absence means "needs layout".
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PositionSnapshot {
    #[serde(default)]
    pub nodes: Vec<NodePositionEntry>,
    #[serde(default)]
    pub edges: Vec<EdgePositionEntry>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodePositionEntry {
    pub id: NodeId,
    pub coordinate: Coordinate,
    #[serde(default)]
    pub user_defined: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EdgePositionEntry {
    pub source: NodeId,
    pub property: PropertyId,
    #[serde(default)]
    pub vertices: Vec<Coordinate>,
}

impl PositionSnapshot {
    pub fn from_store(store: &PositionStore) -> Self {
        let nodes = store
            .nodes()
            .filter_map(|(id, record)| {
                record.coordinate.map(|coordinate| NodePositionEntry {
                    id: id.clone(),
                    coordinate,
                    user_defined: record.user_defined,
                })
            })
            .collect();
        let edges = store
            .edges()
            .filter(|(_, record)| !record.vertices.is_empty())
            .map(|(key, record)| EdgePositionEntry {
                source: key.source.clone(),
                property: key.property.clone(),
                vertices: record.vertices.clone(),
            })
            .collect();
        PositionSnapshot { nodes, edges }
    }

    /// Builds a pristine store from the snapshot.
    pub fn into_store(self) -> PositionStore {
        let mut store = PositionStore::new();
        for entry in self.nodes {
            store.insert_node_record(
                entry.id,
                NodePosition {
                    coordinate: Some(entry.coordinate),
                    user_defined: entry.user_defined,
                },
            );
        }
        for entry in self.edges {
            store.insert_edge_record(
                EdgeKey::new(entry.source, entry.property),
                EdgePosition {
                    vertices: entry.vertices,
                },
            );
        }
        store
    }
}

pub fn snapshot_to_json(snapshot: &VisualizationSnapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string(snapshot)
}

pub fn snapshot_from_json(json: &str) -> Result<VisualizationSnapshot, serde_json::Error> {
    serde_json::from_str(json)
}

pub fn positions_to_json(snapshot: &PositionSnapshot) -> Result<String, serde_json::Error> {
    serde_json::to_string(snapshot)
}

pub fn positions_from_json(json: &str) -> Result<PositionSnapshot, serde_json::Error> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_snapshot_round_trip() {
        let mut store = PositionStore::new();
        let id = NodeId::new("http://example.org/A");
        let key = EdgeKey::new(id.clone(), PropertyId::new("p1"));
        store.set_node_coordinate(&id, Coordinate::new(120.0, 80.0), true);
        store.set_edge_vertices(&key, vec![Coordinate::new(10.0, 10.0)]);

        let snapshot = PositionSnapshot::from_store(&store);
        let json = positions_to_json(&snapshot).unwrap();
        let restored = positions_from_json(&json).unwrap().into_store();

        assert_eq!(restored.node_coordinate(&id), Some(Coordinate::new(120.0, 80.0)));
        assert!(restored.is_user_defined(&id));
        assert_eq!(restored.edge_vertices(&key).len(), 1);
        assert!(restored.is_pristine());
    }

    #[test]
    fn snapshot_tolerates_missing_fields() {
        let snapshot = snapshot_from_json(r#"{"classes":[{"id":"http://example.org/A"}]}"#).unwrap();
        assert_eq!(snapshot.classes.len(), 1);
        assert!(snapshot.positions.nodes.is_empty());
    }
}
