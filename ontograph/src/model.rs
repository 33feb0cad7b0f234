use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geometry::{Coordinate, Dimensions};

/// Stable URI-like identifier of a class node.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        NodeId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of an association property on its owning class.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyId(pub String);

impl PropertyId {
    pub fn new(id: impl Into<String>) -> Self {
        PropertyId(id.into())
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Edge identity: the source node plus the association property on it.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeKey {
    pub source: NodeId,
    pub property: PropertyId,
}

impl EdgeKey {
    pub fn new(source: NodeId, property: PropertyId) -> Self {
        EdgeKey { source, property }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A loaded class with its own definition.
    Concrete,
    /// Stand-in for an association target that is not part of the diagram.
    Placeholder,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayFlags {
    pub abstract_class: bool,
    pub profile: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DiagramNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub label: String,
    pub flags: DisplayFlags,
    pub size: Dimensions,
    /// Current on-screen center, mirrored from the rendering layer through
    /// move events and layout results.
    pub center: Coordinate,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssociationEdge {
    pub key: EdgeKey,
    pub target: NodeId,
    pub label: String,
    /// User-adjustable route waypoints between the two anchor points.
    pub vertices: Vec<Coordinate>,
    pub source_anchor: Coordinate,
    pub target_anchor: Coordinate,
    pub label_anchor: Coordinate,
}

impl AssociationEdge {
    pub fn is_loop(&self) -> bool {
        self.key.source == self.target
    }

    /// Full route: source anchor, waypoints, target anchor.
    pub fn polyline(&self) -> Vec<Coordinate> {
        let mut pts = Vec::with_capacity(self.vertices.len() + 2);
        pts.push(self.source_anchor);
        pts.extend_from_slice(&self.vertices);
        pts.push(self.target_anchor);
        pts
    }
}

/// Association property carried by a domain class snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssociationProperty {
    pub property: PropertyId,
    pub target: NodeId,
    #[serde(default)]
    pub label: String,
}

/// Domain-entity snapshot pushed by the external model collaborator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DomainClass {
    pub id: NodeId,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub flags: DisplayFlags,
    #[serde(default)]
    pub associations: Vec<AssociationProperty>,
}

impl DomainClass {
    pub fn new(id: impl Into<String>) -> Self {
        DomainClass {
            id: NodeId::new(id),
            label: String::new(),
            flags: DisplayFlags::default(),
            associations: Vec::new(),
        }
    }

    pub fn has_association_target(&self, target: &NodeId) -> bool {
        self.associations.iter().any(|a| &a.target == target)
    }
}

/// One-way commands issued toward the rendering layer.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum RenderCommand {
    NodeAdded { id: NodeId },
    NodeRemoved { id: NodeId },
    NodeReplaced { id: NodeId },
    EdgeAdded { key: EdgeKey },
    EdgeRemoved { key: EdgeKey },
    Camera { transform: crate::focus::CameraTransform },
    /// Escape hatch: the whole diagram must be re-fetched and re-initialized.
    RefreshRequired,
}
