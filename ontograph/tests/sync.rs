use ontograph::geometry::{coordinates_are_equal, Coordinate, Rect};
use ontograph::json::{PositionSnapshot, VisualizationSnapshot};
use ontograph::model::{AssociationProperty, DomainClass, NodeId, NodeKind, PropertyId};
use ontograph::{DragButton, GraphSyncEngine, RefreshPolicy, RenderCommand, Viewport, ZoomDirection};

fn uri(local: &str) -> String {
    format!("http://example.org/{local}")
}

fn nid(local: &str) -> NodeId {
    NodeId::new(uri(local))
}

fn class(local: &str, targets: &[(&str, &str)]) -> DomainClass {
    let mut c = DomainClass::new(uri(local));
    c.label = local.to_string();
    for (prop, target) in targets {
        c.associations.push(AssociationProperty {
            property: PropertyId::new(uri(prop)),
            target: nid(target),
            label: (*prop).to_string(),
        });
    }
    c
}

fn snapshot(classes: Vec<DomainClass>) -> VisualizationSnapshot {
    VisualizationSnapshot {
        classes,
        positions: PositionSnapshot::default(),
    }
}

fn engine_with(classes: Vec<DomainClass>) -> GraphSyncEngine {
    let mut engine = GraphSyncEngine::default();
    engine.initialize(snapshot(classes));
    engine
}

#[test]
fn unknown_association_target_becomes_placeholder() {
    let engine = engine_with(vec![class("A", &[("p", "B")])]);
    let diagram = engine.diagram();
    assert_eq!(diagram.node_count(), 2);
    assert_eq!(diagram.node(&nid("A")).unwrap().kind, NodeKind::Concrete);
    assert_eq!(diagram.node(&nid("B")).unwrap().kind, NodeKind::Placeholder);
    assert!(diagram.dangling_edge_targets().is_empty());
}

#[test]
fn assigning_entity_replaces_its_placeholder() {
    let mut engine = engine_with(vec![class("A", &[("p", "B")])]);
    let before = engine.diagram().node(&nid("B")).unwrap().center;
    engine.on_entity_assigned(class("B", &[]));
    let diagram = engine.diagram();
    assert_eq!(diagram.node_count(), 2);
    assert_eq!(diagram.node(&nid("B")).unwrap().kind, NodeKind::Concrete);
    // In-place replacement keeps the spot the placeholder occupied.
    assert!(coordinates_are_equal(
        diagram.node(&nid("B")).unwrap().center,
        before
    ));
    assert!(diagram.dangling_edge_targets().is_empty());
}

#[test]
fn deleting_a_referenced_entity_demotes_it_to_placeholder() {
    let mut engine = engine_with(vec![class("A", &[("p", "B")]), class("B", &[])]);
    engine.on_entity_deleted(class("B", &[]));
    let diagram = engine.diagram();
    assert_eq!(diagram.node(&nid("B")).unwrap().kind, NodeKind::Placeholder);
    assert_eq!(diagram.edge_count(), 1);
    assert!(diagram.dangling_edge_targets().is_empty());
}

#[test]
fn deleting_an_unreferenced_entity_prunes_orphan_placeholders() {
    let mut engine = engine_with(vec![class("A", &[("p", "B")])]);
    engine.on_entity_deleted(class("A", &[]));
    let diagram = engine.diagram();
    assert_eq!(diagram.node_count(), 0);
    assert_eq!(diagram.edge_count(), 0);
}

#[test]
fn selected_placeholder_survives_pruning() {
    let mut engine = engine_with(vec![class("A", &[("p", "B")])]);
    engine.set_selection(Some(nid("B")));
    engine.on_entity_deleted(class("A", &[]));
    let diagram = engine.diagram();
    assert!(diagram.contains_node(&nid("B")));
    assert!(!diagram.contains_node(&nid("A")));
    assert_eq!(diagram.edge_count(), 0);
}

#[test]
fn deleting_a_self_loop_only_entity_removes_it_entirely() {
    let mut engine = engine_with(vec![class("A", &[("p", "A")])]);
    engine.on_entity_deleted(class("A", &[]));
    assert_eq!(engine.diagram().node_count(), 0);
    assert_eq!(engine.diagram().edge_count(), 0);
}

#[test]
fn id_change_substitutes_a_placeholder_for_the_old_id() {
    let mut engine = engine_with(vec![class("C", &[("p", "A")]), class("A", &[])]);
    let old_center = engine.diagram().node(&nid("A")).unwrap().center;

    engine.on_entity_created_or_updated(class("A2", &[]), Some(nid("A")));

    let diagram = engine.diagram();
    assert_eq!(diagram.node(&nid("A2")).unwrap().kind, NodeKind::Concrete);
    assert_eq!(diagram.node(&nid("A")).unwrap().kind, NodeKind::Placeholder);
    // C still points at the old id, now resolved by the stub.
    assert_eq!(
        &diagram
            .edge(&ontograph::model::EdgeKey::new(nid("C"), PropertyId::new(uri("p"))))
            .unwrap()
            .target,
        &nid("A")
    );
    // The position record followed the rename.
    assert!(coordinates_are_equal(
        diagram.node(&nid("A2")).unwrap().center,
        old_center
    ));
    assert!(diagram.dangling_edge_targets().is_empty());
}

#[test]
fn id_change_of_an_unreferenced_entity_drops_the_old_node() {
    let mut engine = engine_with(vec![class("A", &[])]);
    engine.on_entity_created_or_updated(class("A2", &[]), Some(nid("A")));
    let diagram = engine.diagram();
    assert!(!diagram.contains_node(&nid("A")));
    assert!(diagram.contains_node(&nid("A2")));
}

#[test]
fn untracked_previous_id_is_a_plain_addition() {
    let mut engine = engine_with(vec![class("A", &[])]);
    engine.on_entity_created_or_updated(class("D", &[]), Some(nid("Nope")));
    let diagram = engine.diagram();
    assert!(diagram.contains_node(&nid("D")));
    assert!(diagram.contains_node(&nid("A")));
    assert!(!diagram.contains_node(&nid("Nope")));
}

#[test]
fn full_refresh_policy_signals_instead_of_patching() {
    let mut engine = engine_with(vec![class("A", &[])]);
    engine.set_refresh_policy(RefreshPolicy::FullRefreshOnRename);
    engine.take_commands();

    let added = engine.on_entity_created_or_updated(class("A2", &[]), Some(nid("A")));

    assert!(added.is_empty());
    assert!(engine.diagram().contains_node(&nid("A")));
    assert!(!engine.diagram().contains_node(&nid("A2")));
    let commands = engine.take_commands();
    assert!(commands
        .iter()
        .any(|c| matches!(c, RenderCommand::RefreshRequired)));
}

#[test]
fn hidden_engine_queues_and_flushes_in_reverse_arrival_order() {
    let mut engine = engine_with(vec![]);
    engine.set_visible(false);
    engine.take_commands();

    let added = engine.on_entity_assigned(class("B", &[]));
    assert!(added.is_empty());
    engine.on_entity_assigned(class("C", &[]));
    assert_eq!(engine.diagram().node_count(), 0);

    engine.set_visible(true);
    assert_eq!(engine.diagram().node_count(), 2);

    let commands = engine.take_commands();
    let added_order: Vec<&NodeId> = commands
        .iter()
        .filter_map(|c| match c {
            RenderCommand::NodeAdded { id } => Some(id),
            _ => None,
        })
        .collect();
    assert_eq!(added_order, vec![&nid("C"), &nid("B")]);
}

#[test]
fn dimension_change_defers_operations_until_settled() {
    let mut engine = engine_with(vec![]);
    engine.dimension_change_started();
    engine.on_entity_assigned(class("F", &[]));
    assert_eq!(engine.diagram().node_count(), 0);
    engine.dimension_change_settled();
    assert_eq!(engine.diagram().node_count(), 1);
}

#[test]
fn save_flow_tracks_dirty_state() {
    let mut engine = engine_with(vec![class("A", &[]), class("B", &[])]);
    // Initial layout assigned coordinates nothing has persisted yet.
    assert!(engine.positions_dirty());

    engine.mark_saved();
    assert!(!engine.positions_dirty());

    let center = engine.diagram().node(&nid("A")).unwrap().center;
    engine.on_node_moved(
        &nid("A"),
        Coordinate::new(center.x + 500.0, center.y + 300.0),
        DragButton::Left,
    );
    assert!(engine.positions_dirty());
    assert!(engine.positions().is_user_defined(&nid("A")));

    engine.mark_saved();
    // Sub-pixel drift is not a move.
    let center = engine.diagram().node(&nid("A")).unwrap().center;
    engine.on_node_moved(
        &nid("A"),
        Coordinate::new(center.x + 0.3, center.y + 0.2),
        DragButton::Left,
    );
    assert!(!engine.positions_dirty());
}

#[test]
fn initialize_with_full_positions_stays_pristine() {
    let classes = vec![class("A", &[("p", "B")]), class("B", &[])];
    let positions = PositionSnapshot {
        nodes: vec![
            ontograph::json::NodePositionEntry {
                id: nid("A"),
                coordinate: Coordinate::new(100.0, 100.0),
                user_defined: true,
            },
            ontograph::json::NodePositionEntry {
                id: nid("B"),
                coordinate: Coordinate::new(500.0, 100.0),
                user_defined: true,
            },
        ],
        edges: vec![],
    };
    let mut engine = GraphSyncEngine::default();
    engine.initialize(VisualizationSnapshot { classes, positions });

    assert!(!engine.positions_dirty());
    assert!(coordinates_are_equal(
        engine.diagram().node(&nid("A")).unwrap().center,
        Coordinate::new(100.0, 100.0)
    ));
}

#[test]
fn right_drag_discards_manual_routing_left_drag_keeps_it() {
    let mut engine = engine_with(vec![class("A", &[("p", "B")]), class("B", &[])]);
    let key = ontograph::model::EdgeKey::new(nid("A"), PropertyId::new(uri("p")));
    engine
        .on_edge_vertices_changed(&key, vec![Coordinate::new(900.0, 900.0)])
        .unwrap();
    assert_eq!(engine.diagram().edge(&key).unwrap().vertices.len(), 1);

    let center = engine.diagram().node(&nid("A")).unwrap().center;
    engine.on_node_moved(
        &nid("A"),
        Coordinate::new(center.x + 50.0, center.y + 50.0),
        DragButton::Left,
    );
    assert_eq!(engine.diagram().edge(&key).unwrap().vertices.len(), 1);

    let center = engine.diagram().node(&nid("A")).unwrap().center;
    engine.on_node_moved(
        &nid("A"),
        Coordinate::new(center.x + 50.0, center.y + 50.0),
        DragButton::Right,
    );
    assert!(engine.diagram().edge(&key).unwrap().vertices.is_empty());
}

#[test]
fn unknown_edge_reshape_is_an_error() {
    let mut engine = engine_with(vec![class("A", &[])]);
    let key = ontograph::model::EdgeKey::new(nid("A"), PropertyId::new(uri("missing")));
    assert!(engine.on_edge_vertices_changed(&key, vec![]).is_err());
}

#[test]
fn relayout_discards_stored_positions() {
    let mut engine = engine_with(vec![class("A", &[]), class("B", &[])]);
    engine.mark_saved();
    let before = engine.diagram().node(&nid("A")).unwrap().center;
    engine.on_node_moved(
        &nid("A"),
        Coordinate::new(before.x + 999.0, before.y + 999.0),
        DragButton::Left,
    );

    engine.relayout_all();
    assert!(engine.positions_dirty());
    assert!(!engine.positions().is_user_defined(&nid("A")));

    // Back to the saved snapshot.
    engine.layout_persistent();
    assert!(coordinates_are_equal(
        engine.diagram().node(&nid("A")).unwrap().center,
        before
    ));
}

#[test]
fn rename_to_a_self_referencing_class_keeps_the_old_id_resolvable() {
    // The renamed class points back at its former id, so the old node is an
    // association target by the time the substitution decision is made.
    let mut engine = engine_with(vec![class("A", &[])]);
    engine.on_entity_created_or_updated(class("A2", &[("p", "A")]), Some(nid("A")));

    let diagram = engine.diagram();
    assert_eq!(diagram.node(&nid("A2")).unwrap().kind, NodeKind::Concrete);
    assert_eq!(diagram.node(&nid("A")).unwrap().kind, NodeKind::Placeholder);
    assert_eq!(
        &diagram
            .edge(&ontograph::model::EdgeKey::new(
                nid("A2"),
                PropertyId::new(uri("p"))
            ))
            .unwrap()
            .target,
        &nid("A")
    );
    assert!(diagram.dangling_edge_targets().is_empty());
}

fn on_boundary(point: Coordinate, rect: Rect) -> bool {
    let eps = 1e-6;
    let on_vertical = (point.x - rect.x).abs() < eps || (point.x - rect.right()).abs() < eps;
    let on_horizontal = (point.y - rect.y).abs() < eps || (point.y - rect.bottom()).abs() < eps;
    let within_x = point.x >= rect.x - eps && point.x <= rect.right() + eps;
    let within_y = point.y >= rect.y - eps && point.y <= rect.bottom() + eps;
    (on_vertical && within_y) || (on_horizontal && within_x)
}

#[test]
fn promoting_a_placeholder_re_anchors_incoming_links() {
    let mut engine = engine_with(vec![class("A", &[("p", "B")])]);
    engine.on_entity_assigned(class("B", &[]));

    let key = ontograph::model::EdgeKey::new(nid("A"), PropertyId::new(uri("p")));
    let rect = engine.diagram().node_rect(&nid("B")).unwrap();
    let anchor = engine.diagram().edge(&key).unwrap().target_anchor;
    // The concrete node is larger than the stub it replaced; the link must
    // end on the new outline, not somewhere inside it.
    assert!(
        on_boundary(anchor, rect),
        "anchor {anchor:?} not on the outline of {rect:?}"
    );
}

#[test]
fn re_added_class_regains_its_saved_spot() {
    let mut engine = engine_with(vec![class("A", &[]), class("B", &[])]);
    engine.mark_saved();
    let target = Coordinate::new(1200.0, 900.0);
    engine.on_node_moved(&nid("A"), target, DragButton::Left);

    engine.on_entity_deleted(class("A", &[]));
    assert!(!engine.diagram().contains_node(&nid("A")));

    // The position record outlived the node; re-adding skips layout.
    engine.on_entity_assigned(class("A", &[]));
    assert!(coordinates_are_equal(
        engine.diagram().node(&nid("A")).unwrap().center,
        target
    ));
    assert!(engine.positions().is_user_defined(&nid("A")));
}

#[test]
fn plain_update_leaves_other_nodes_in_place() {
    let mut engine = engine_with(vec![class("A", &[("p", "B")]), class("B", &[])]);
    let a_before = engine.diagram().node(&nid("A")).unwrap().center;
    let b_before = engine.diagram().node(&nid("B")).unwrap().center;

    let mut updated = class("A", &[("p", "B")]);
    updated.label = "A (renamed)".to_string();
    let added = engine.on_entity_created_or_updated(updated, Some(nid("A")));

    assert!(added.is_empty());
    let diagram = engine.diagram();
    assert_eq!(diagram.node(&nid("A")).unwrap().label, "A (renamed)");
    assert!(coordinates_are_equal(
        diagram.node(&nid("A")).unwrap().center,
        a_before
    ));
    assert!(coordinates_are_equal(
        diagram.node(&nid("B")).unwrap().center,
        b_before
    ));
}

#[test]
fn zoom_tick_at_the_clamp_emits_nothing() {
    let mut engine = engine_with(vec![class("A", &[])]);
    engine.set_viewport(Viewport {
        width: 2000.0,
        height: 2000.0,
    });
    // A single node in a large viewport pins the fit at the zoom ceiling.
    engine.fit_to_content();
    engine.take_commands();

    engine.zoom_start(ZoomDirection::In);
    engine.zoom_tick();
    assert!(engine.take_commands().is_empty());
    engine.zoom_release();

    engine.zoom_start(ZoomDirection::Out);
    engine.zoom_tick();
    assert_eq!(engine.take_commands().len(), 1);
}
