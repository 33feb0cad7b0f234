use ontograph::geometry::{Coordinate, Dimensions, Rect};
use ontograph::layout::{layout, LayoutConfig};
use ontograph::model::{AssociationEdge, DiagramNode, EdgeKey, NodeId, NodeKind, PropertyId};
use ontograph::{Diagram, PositionStore};

fn nid(local: &str) -> NodeId {
    NodeId::new(format!("http://example.org/{local}"))
}

fn node(id: &NodeId) -> DiagramNode {
    DiagramNode {
        id: id.clone(),
        kind: NodeKind::Concrete,
        label: id.as_str().to_string(),
        flags: Default::default(),
        size: Dimensions {
            width: 220.0,
            height: 120.0,
        },
        center: Coordinate::default(),
    }
}

fn connect(diagram: &mut Diagram, source: &NodeId, prop: &str, target: &NodeId) {
    diagram.insert_edge(AssociationEdge {
        key: EdgeKey::new(source.clone(), PropertyId::new(prop)),
        target: target.clone(),
        label: String::new(),
        vertices: Vec::new(),
        source_anchor: Coordinate::default(),
        target_anchor: Coordinate::default(),
        label_anchor: Coordinate::default(),
    });
}

/// Hub S with four leaves.
fn star() -> (Diagram, Vec<NodeId>) {
    let mut diagram = Diagram::new();
    let hub = nid("S");
    diagram.insert_node(node(&hub));
    let mut ids = vec![hub.clone()];
    for leaf in ["L1", "L2", "L3", "L4"] {
        let id = nid(leaf);
        diagram.insert_node(node(&id));
        connect(&mut diagram, &hub, leaf, &id);
        ids.push(id);
    }
    (diagram, ids)
}

#[test]
fn full_layout_is_deterministic() {
    let (diagram, _) = star();
    let positions = PositionStore::new();
    let cfg = LayoutConfig::default();
    let first = layout(&diagram, &positions, None, &cfg);
    let second = layout(&diagram, &positions, None, &cfg);
    assert_eq!(first.placed, second.placed);
    assert_eq!(first.placed.len(), 5);
}

#[test]
fn placed_nodes_do_not_overlap() {
    let (mut diagram, ids) = star();
    let positions = PositionStore::new();
    let result = layout(&diagram, &positions, None, &LayoutConfig::default());
    for (id, center) in &result.placed {
        diagram.set_node_center(id, *center);
    }

    let rects: Vec<Rect> = ids
        .iter()
        .map(|id| diagram.node_rect(id).unwrap())
        .collect();
    for i in 0..rects.len() {
        for j in (i + 1)..rects.len() {
            assert!(
                !rects[i].overlaps(&rects[j]),
                "{:?} overlaps {:?}",
                ids[i],
                ids[j]
            );
        }
    }
}

#[test]
fn incremental_layout_moves_only_the_requested_nodes() {
    let (diagram, _) = star();
    let mut positions = PositionStore::new();
    positions.set_node_coordinate(&nid("S"), Coordinate::new(0.0, 0.0), false);
    positions.set_node_coordinate(&nid("L1"), Coordinate::new(400.0, 0.0), false);
    positions.set_node_coordinate(&nid("L2"), Coordinate::new(-400.0, 0.0), false);
    positions.set_node_coordinate(&nid("L3"), Coordinate::new(0.0, 300.0), false);

    let only = [nid("L4")];
    let result = layout(&diagram, &positions, Some(&only), &LayoutConfig::default());

    assert_eq!(result.placed.len(), 1);
    assert!(result.placed.contains_key(&nid("L4")));
}

#[test]
fn new_node_lands_near_its_neighbor() {
    let mut diagram = Diagram::new();
    let (a, b) = (nid("A"), nid("B"));
    diagram.insert_node(node(&a));
    diagram.insert_node(node(&b));
    connect(&mut diagram, &a, "p", &b);

    let mut positions = PositionStore::new();
    positions.set_node_coordinate(&a, Coordinate::new(0.0, 0.0), false);

    let only = [b.clone()];
    let result = layout(&diagram, &positions, Some(&only), &LayoutConfig::default());
    let placed = result.placed[&b];
    let dist = (placed.x * placed.x + placed.y * placed.y).sqrt();
    assert!(dist < 2000.0, "placed too far from its only neighbor: {placed:?}");
    assert!(dist > 100.0, "placed on top of its neighbor: {placed:?}");
}

#[test]
fn disconnected_nodes_fall_back_to_grid_rows() {
    let mut diagram = Diagram::new();
    let ids: Vec<NodeId> = (0..6).map(|i| nid(&format!("N{i}"))).collect();
    for id in &ids {
        diagram.insert_node(node(id));
    }
    let positions = PositionStore::new();
    let result = layout(&diagram, &positions, None, &LayoutConfig::default());
    assert_eq!(result.placed.len(), 6);
    // All within the configured row band.
    for center in result.placed.values() {
        assert!(center.x >= 0.0 && center.x <= 1600.0);
    }
}

#[test]
fn unknown_requested_ids_are_ignored() {
    let (diagram, _) = star();
    let positions = PositionStore::new();
    let only = [nid("ghost")];
    let result = layout(&diagram, &positions, Some(&only), &LayoutConfig::default());
    assert!(result.placed.is_empty());
}
