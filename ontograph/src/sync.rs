use std::collections::BTreeSet;

use log::{debug, warn};
use thiserror::Error;

use crate::focus::{self, FocusLevel, Viewport, ZoomControl, ZoomDirection};
use crate::geometry::{coordinates_are_equal, Coordinate, Dimensions};
use crate::json::{PositionSnapshot, VisualizationSnapshot};
use crate::layout::{self, LayoutConfig};
use crate::model::{
    AssociationEdge, DiagramNode, DomainClass, EdgeKey, NodeId, NodeKind, RenderCommand,
};
use crate::positions::PositionStore;
use crate::reconcile::{self, VertexAction};
use crate::Diagram;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("unknown edge {}#{}", .0.source, .0.property)]
    UnknownEdge(EdgeKey),
    #[error("unknown node {0}")]
    UnknownNode(NodeId),
}

/// How an id-change event is applied. The original implementation re-fetched
/// the whole diagram after renames to dodge server-side inconsistency; that
/// escape hatch stays available as policy rather than hard-wired behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshPolicy {
    /// Patch the graph in place (placeholder substitution and all).
    TargetedPatch,
    /// Emit `RenderCommand::RefreshRequired` and wait for a fresh
    /// `initialize` from the caller.
    FullRefreshOnRename,
}

/// Which mouse button drove a node drag. Right-drag discards manual link
/// routing, left-drag preserves it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragButton {
    Left,
    Right,
}

/// Visibility gate for graph-mutating operations. While the container is
/// hidden or its dimensions are still settling, the rendering surface reports
/// wrong geometry, so operations queue instead of applying.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GateState {
    Hidden,
    PendingFlush,
    Flushing,
    Idle,
}

#[derive(Clone, Debug)]
enum PendingOp {
    Initialize(VisualizationSnapshot),
    CreatedOrUpdated {
        class: DomainClass,
        previous_id: Option<NodeId>,
    },
    Deleted(DomainClass),
    Assigned(DomainClass),
    Refocus {
        force_fit_all: bool,
    },
}

/// The orchestrator: receives domain-entity events, mutates the diagram
/// graph, lays out newly introduced nodes, reconciles links and re-centers
/// the camera. Emits one-way render commands collected via `take_commands`.
pub struct GraphSyncEngine {
    diagram: Diagram,
    positions: PositionStore,
    /// Snapshot of the store at the last successful save.
    persistent: PositionStore,
    layout_cfg: LayoutConfig,
    viewport: Viewport,
    selection: Option<NodeId>,
    focus_level: FocusLevel,
    root_class: Option<NodeId>,
    refresh_policy: RefreshPolicy,
    zoom: ZoomControl,
    camera: crate::focus::CameraTransform,
    visible: bool,
    dimension_change: bool,
    state: GateState,
    queue: Vec<PendingOp>,
    commands: Vec<RenderCommand>,
}

impl Default for GraphSyncEngine {
    fn default() -> Self {
        GraphSyncEngine::new(LayoutConfig::default())
    }
}

impl GraphSyncEngine {
    pub fn new(layout_cfg: LayoutConfig) -> Self {
        GraphSyncEngine {
            diagram: Diagram::new(),
            positions: PositionStore::new(),
            persistent: PositionStore::new(),
            layout_cfg,
            viewport: Viewport {
                width: 800.0,
                height: 600.0,
            },
            selection: None,
            focus_level: FocusLevel::All,
            root_class: None,
            refresh_policy: RefreshPolicy::TargetedPatch,
            zoom: ZoomControl::default(),
            camera: crate::focus::CameraTransform {
                pan_x: 0.0,
                pan_y: 0.0,
                zoom: 1.0,
            },
            visible: true,
            dimension_change: false,
            state: GateState::Idle,
            queue: Vec::new(),
            commands: Vec::new(),
        }
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn positions(&self) -> &PositionStore {
        &self.positions
    }

    pub fn take_commands(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn set_root_class(&mut self, root: Option<NodeId>) {
        self.root_class = root;
    }

    pub fn set_refresh_policy(&mut self, policy: RefreshPolicy) {
        self.refresh_policy = policy;
    }

    /// The selection lives outside the engine; it is mirrored here because
    /// focus and delete-pruning depend on it. Changing it re-centers.
    pub fn set_selection(&mut self, selection: Option<NodeId>) {
        if self.selection != selection {
            self.selection = selection;
            self.enqueue(PendingOp::Refocus {
                force_fit_all: false,
            });
        }
    }

    pub fn selection(&self) -> Option<&NodeId> {
        self.selection.as_ref()
    }

    // ----- focus & camera -----

    pub fn focus_level(&self) -> FocusLevel {
        self.focus_level
    }

    pub fn focus_in(&mut self) {
        let next = self.focus_level.focus_in();
        if next != self.focus_level {
            self.focus_level = next;
            self.enqueue(PendingOp::Refocus {
                force_fit_all: false,
            });
        }
    }

    pub fn focus_out(&mut self) {
        let next = self.focus_level.focus_out();
        if next != self.focus_level {
            self.focus_level = next;
            self.enqueue(PendingOp::Refocus {
                force_fit_all: false,
            });
        }
    }

    pub fn visible_nodes(&self) -> BTreeSet<NodeId> {
        focus::visible_set(&self.diagram, self.selection.as_ref(), self.focus_level)
    }

    pub fn fit_to_content(&mut self) {
        self.enqueue(PendingOp::Refocus {
            force_fit_all: true,
        });
    }

    pub fn zoom_start(&mut self, direction: ZoomDirection) {
        self.zoom.start(direction);
    }

    /// Driven by the caller's repeating timer while the zoom button is held.
    /// Pan is untouched; only the scale changes per tick.
    pub fn zoom_tick(&mut self) {
        if let Some(zoom) = self.zoom.tick(self.camera.zoom) {
            if zoom == self.camera.zoom {
                // Already pinned at the clamp; nothing to redraw.
                return;
            }
            self.camera.zoom = zoom;
            self.commands.push(RenderCommand::Camera {
                transform: self.camera,
            });
        }
    }

    pub fn zoom_release(&mut self) {
        self.zoom.release();
    }

    // ----- visibility gate -----

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        self.maybe_flush();
    }

    pub fn dimension_change_started(&mut self) {
        self.dimension_change = true;
        if self.visible {
            self.state = GateState::PendingFlush;
        }
    }

    pub fn dimension_change_settled(&mut self) {
        self.dimension_change = false;
        self.maybe_flush();
    }

    fn gated(&self) -> bool {
        self.state != GateState::Idle
    }

    fn enqueue(&mut self, op: PendingOp) {
        self.queue.push(op);
        self.maybe_flush();
    }

    /// Flushes queued operations in reverse arrival order once visible and
    /// dimensionally settled.
    fn maybe_flush(&mut self) {
        if !self.visible {
            self.state = GateState::Hidden;
            return;
        }
        if self.dimension_change {
            self.state = GateState::PendingFlush;
            return;
        }
        self.state = GateState::Flushing;
        while let Some(op) = self.queue.pop() {
            self.apply(op);
        }
        self.state = GateState::Idle;
    }

    fn apply(&mut self, op: PendingOp) {
        match op {
            PendingOp::Initialize(snapshot) => self.apply_initialize(snapshot),
            PendingOp::CreatedOrUpdated { class, previous_id } => {
                self.apply_created_or_updated(class, previous_id);
            }
            PendingOp::Deleted(class) => self.apply_deleted(&class),
            PendingOp::Assigned(class) => {
                self.apply_created_or_updated(class, None);
            }
            PendingOp::Refocus { force_fit_all } => self.refocus(force_fit_all),
        }
    }

    // ----- domain events -----

    /// Populates the graph from a domain snapshot. Association targets not in
    /// the snapshot become placeholder nodes. Nodes lacking a saved position
    /// get one layout pass; when every node already has one, none do.
    pub fn initialize(&mut self, snapshot: VisualizationSnapshot) {
        self.enqueue(PendingOp::Initialize(snapshot));
    }

    /// Entity created or updated, possibly under a new id. Returns the ids of
    /// newly introduced nodes, or an empty set when the operation had to be
    /// queued behind the visibility gate.
    pub fn on_entity_created_or_updated(
        &mut self,
        class: DomainClass,
        previous_id: Option<NodeId>,
    ) -> Vec<NodeId> {
        if self.gated() {
            self.enqueue(PendingOp::CreatedOrUpdated { class, previous_id });
            return Vec::new();
        }
        self.apply_created_or_updated(class, previous_id)
    }

    pub fn on_entity_deleted(&mut self, class: DomainClass) {
        self.enqueue(PendingOp::Deleted(class));
    }

    /// Create/update with no previous id: adds if absent, replaces an
    /// equivalent placeholder if one existed.
    pub fn on_entity_assigned(&mut self, class: DomainClass) -> Vec<NodeId> {
        if self.gated() {
            self.enqueue(PendingOp::Assigned(class));
            return Vec::new();
        }
        self.apply_created_or_updated(class, None)
    }

    pub fn reconcile_links_for(&mut self, ids: Option<&[NodeId]>, action: VertexAction) {
        reconcile::adjust_links(&mut self.diagram, &mut self.positions, ids, action);
    }

    // ----- rendering-layer feedback -----

    /// A node's on-screen position changed by user drag. Sub-pixel drift is
    /// ignored; a real move updates the store and re-routes touched links.
    pub fn on_node_moved(&mut self, id: &NodeId, new_center: Coordinate, button: DragButton) {
        let current = match self.diagram.node(id) {
            Some(node) => node.center,
            None => {
                warn!("move event for unknown node {id}");
                return;
            }
        };
        if coordinates_are_equal(current, new_center) {
            return;
        }
        self.diagram.set_node_center(id, new_center);
        let action = match button {
            DragButton::Right => VertexAction::Reset,
            DragButton::Left => VertexAction::KeepAllButLoops,
        };
        reconcile::adjust_links(
            &mut self.diagram,
            &mut self.positions,
            Some(std::slice::from_ref(id)),
            action,
        );
        self.positions.set_node_coordinate(id, new_center, true);
    }

    /// The user reshaped a link route in the rendering layer.
    pub fn on_edge_vertices_changed(
        &mut self,
        key: &EdgeKey,
        vertices: Vec<Coordinate>,
    ) -> Result<(), SyncError> {
        let edge = self
            .diagram
            .edge_mut(key)
            .ok_or_else(|| SyncError::UnknownEdge(key.clone()))?;
        edge.vertices = vertices.clone();
        reconcile::refresh_edge_geometry(&mut self.diagram, key);
        self.positions.set_edge_vertices(key, vertices);
        Ok(())
    }

    // ----- layout commands -----

    /// Discards every stored position and lays the whole graph out again.
    pub fn relayout_all(&mut self) {
        self.positions.clear();
        self.apply_layout(None);
        self.reconcile_links_for(None, VertexAction::Reset);
        self.refocus(false);
    }

    /// Returns to the last saved positions, laying out only nodes that still
    /// lack a coordinate.
    pub fn layout_persistent(&mut self) {
        self.positions.reset_with(&self.persistent);
        self.apply_stored_centers();
        let missing = self.ids_needing_layout();
        if missing.len() == self.diagram.node_count() {
            self.apply_layout(None);
        } else if !missing.is_empty() {
            self.apply_layout(Some(&missing));
        }
        self.reconcile_links_for(None, VertexAction::KeepPersistent);
        self.refocus(false);
    }

    // ----- save flow -----

    pub fn position_snapshot(&self) -> PositionSnapshot {
        PositionSnapshot::from_store(&self.positions)
    }

    pub fn positions_dirty(&self) -> bool {
        !self.positions.is_pristine()
    }

    /// The backend acknowledged the save: the store becomes pristine and the
    /// saved state becomes the new restore point.
    pub fn mark_saved(&mut self) {
        self.positions.set_pristine();
        self.persistent = self.positions.clone();
    }

    /// The save was rejected. In-memory state is untouched and the dirty flag
    /// stays set.
    pub fn save_failed(&mut self) {
        debug!("position save failed; keeping dirty state");
    }

    // ----- internals -----

    fn apply_initialize(&mut self, snapshot: VisualizationSnapshot) {
        self.diagram = Diagram::new();
        self.positions = snapshot.positions.clone().into_store();
        self.queue.clear();

        let snapshot_ids: BTreeSet<NodeId> =
            snapshot.classes.iter().map(|c| c.id.clone()).collect();

        for class in &snapshot.classes {
            for association in &class.associations {
                if !snapshot_ids.contains(&association.target)
                    && !self.diagram.contains_node(&association.target)
                {
                    let node = self.make_placeholder(&association.target);
                    self.commands.push(RenderCommand::NodeAdded {
                        id: node.id.clone(),
                    });
                    self.positions.ensure_node(&node.id);
                    self.diagram.insert_node(node);
                }
            }
            let node = self.make_concrete(class);
            self.commands.push(RenderCommand::NodeAdded {
                id: node.id.clone(),
            });
            self.positions.ensure_node(&node.id);
            self.diagram.insert_node(node);
        }

        for class in &snapshot.classes {
            for association in &class.associations {
                self.insert_association(class, association);
            }
        }

        self.apply_stored_centers();

        let missing = self.ids_needing_layout();
        if missing.len() == self.diagram.node_count() {
            self.apply_layout(None);
        } else if !missing.is_empty() {
            self.apply_layout(Some(&missing));
        }

        self.persistent = self.positions.clone();
        self.reconcile_links_for(None, VertexAction::KeepPersistent);

        let force_fit = match (&self.selection, &self.root_class) {
            (Some(sel), Some(root)) => sel == root,
            _ => false,
        };
        self.refocus(force_fit);
    }

    fn apply_created_or_updated(
        &mut self,
        class: DomainClass,
        previous_id: Option<NodeId>,
    ) -> Vec<NodeId> {
        // Edits always carry a previous id, even when unchanged; only a true
        // creation comes without one. An update's own node keeps its position
        // out of the layout pass.
        let creation = previous_id.is_none();
        let id_changed = previous_id
            .as_ref()
            .map(|old| old != &class.id)
            .unwrap_or(false);

        if id_changed && self.refresh_policy == RefreshPolicy::FullRefreshOnRename {
            debug!("id change {:?} -> {}: requesting full refresh", previous_id, class.id);
            self.commands.push(RenderCommand::RefreshRequired);
            return Vec::new();
        }

        let old_id = previous_id.filter(|_| id_changed);
        // An id-change whose previous id is not tracked is a plain addition;
        // the two stores are allowed to be briefly out of sync.
        let old_tracked = old_id
            .as_ref()
            .map(|old| self.diagram.contains_node(old))
            .unwrap_or(false);

        if let Some(old) = old_id.as_ref() {
            if old_tracked {
                self.positions.change_node_id(old, &class.id);
            } else {
                debug!("previous id {old} not tracked; treating as addition");
            }
        }

        let mut added = self.add_or_replace_class(&class);

        let mut demoted: Option<NodeId> = None;
        if let Some(old) = old_id.filter(|_| old_tracked) {
            // Checked only now: the new class's own associations may have just
            // made the old id a target again.
            if self.diagram.is_association_target(&old) {
                // Other classes still point at the old id; it degrades to a
                // placeholder instead of vanishing.
                self.demote_to_placeholder(&old);
                added.push(old.clone());
                demoted = Some(old);
            } else {
                self.remove_node_and_prune(&old);
            }
        }

        // Nodes that kept a stored spot from an earlier life skip the layout
        // pass; everything else gets placed.
        let layout_ids: Vec<NodeId> = added
            .iter()
            .filter(|id| creation || **id != class.id)
            .filter(|id| self.positions.node_coordinate(id).is_none())
            .cloned()
            .collect();
        if !layout_ids.is_empty() {
            self.apply_layout(Some(&layout_ids));
        }
        if let Some(old) = demoted.as_ref() {
            self.reconcile_links_for(Some(std::slice::from_ref(old)), VertexAction::Reset);
        }
        self.reconcile_links_for(
            Some(std::slice::from_ref(&class.id)),
            VertexAction::KeepPersistent,
        );
        self.refocus(false);
        added
    }

    fn apply_deleted(&mut self, class: &DomainClass) {
        if !self.diagram.contains_node(&class.id) {
            debug!("delete event for untracked node {}", class.id);
            return;
        }
        if self.diagram.is_association_target(&class.id) {
            self.demote_to_placeholder(&class.id);
        } else {
            self.remove_node_and_prune(&class.id);
        }
        self.refocus(false);
    }

    /// Adds the class, or replaces the node in place when the id already has
    /// one (concrete or placeholder). Returns newly introduced node ids, the
    /// class itself included when it is new.
    fn add_or_replace_class(&mut self, class: &DomainClass) -> Vec<NodeId> {
        if self.diagram.contains_node(&class.id) {
            self.replace_class(class)
        } else {
            self.add_class(class)
        }
    }

    fn add_class(&mut self, class: &DomainClass) -> Vec<NodeId> {
        let mut node = self.make_concrete(class);
        self.positions.ensure_node(&node.id);
        // An id-change migrates the position record ahead of the node, and a
        // re-added class may still have its old spot on record.
        if let Some(center) = self.positions.node_coordinate(&node.id) {
            node.center = center;
        }
        self.commands.push(RenderCommand::NodeAdded {
            id: node.id.clone(),
        });
        self.diagram.insert_node(node);

        let mut added = vec![class.id.clone()];
        for association in &class.associations {
            if let Some(placeholder) = self.ensure_association_target(class, &association.target) {
                added.push(placeholder);
            }
            self.insert_association(class, association);
        }
        added
    }

    fn replace_class(&mut self, class: &DomainClass) -> Vec<NodeId> {
        // Outgoing links are rebuilt from the new association set; targets no
        // longer referenced may leave orphaned placeholders behind.
        let mut kept_targets: BTreeSet<NodeId> = BTreeSet::new();
        for key in self.diagram.outgoing_edges(&class.id) {
            let target = match self.diagram.edge(&key) {
                Some(edge) => edge.target.clone(),
                None => continue,
            };
            self.diagram.remove_edge(&key);
            self.commands.push(RenderCommand::EdgeRemoved { key });
            if class.has_association_target(&target) {
                kept_targets.insert(target);
            } else {
                self.prune_if_orphan_placeholder(&target);
            }
        }

        let center = self
            .diagram
            .node(&class.id)
            .map(|n| n.center)
            .unwrap_or_default();
        let mut node = self.make_concrete(class);
        node.center = center;
        self.diagram.insert_node(node);
        self.commands.push(RenderCommand::NodeReplaced {
            id: class.id.clone(),
        });

        let mut added = Vec::new();
        for association in &class.associations {
            if let Some(placeholder) = self.ensure_association_target(class, &association.target) {
                if !kept_targets.contains(&placeholder) {
                    added.push(placeholder);
                }
            }
            self.insert_association(class, association);
        }
        added
    }

    /// Creates a placeholder for an association target that is not in the
    /// graph yet, seeded at the source's center so layout starts it nearby.
    fn ensure_association_target(
        &mut self,
        source: &DomainClass,
        target: &NodeId,
    ) -> Option<NodeId> {
        if self.diagram.contains_node(target) {
            return None;
        }
        let mut node = self.make_placeholder(target);
        if let Some(source_node) = self.diagram.node(&source.id) {
            node.center = source_node.center;
        }
        self.positions.ensure_node(&node.id);
        if let Some(center) = self.positions.node_coordinate(&node.id) {
            node.center = center;
        }
        self.commands.push(RenderCommand::NodeAdded {
            id: node.id.clone(),
        });
        self.diagram.insert_node(node);
        Some(target.clone())
    }

    fn insert_association(
        &mut self,
        class: &DomainClass,
        association: &crate::model::AssociationProperty,
    ) {
        let key = EdgeKey::new(class.id.clone(), association.property.clone());
        self.positions.ensure_edge(&key);
        let vertices = self.positions.edge_vertices(&key).to_vec();
        let edge = AssociationEdge {
            key: key.clone(),
            target: association.target.clone(),
            label: association.label.clone(),
            vertices,
            source_anchor: Coordinate::default(),
            target_anchor: Coordinate::default(),
            label_anchor: Coordinate::default(),
        };
        self.diagram.insert_edge(edge);
        self.commands.push(RenderCommand::EdgeAdded { key });
    }

    /// Converts a node that is still an association target into a placeholder
    /// instead of deleting it, keeping every edge target resolvable.
    fn demote_to_placeholder(&mut self, id: &NodeId) {
        for key in self.diagram.outgoing_edges(id) {
            let target = self.diagram.edge(&key).map(|e| e.target.clone());
            self.diagram.remove_edge(&key);
            self.commands.push(RenderCommand::EdgeRemoved { key });
            if let Some(target) = target {
                if &target != id {
                    self.prune_if_orphan_placeholder(&target);
                }
            }
        }
        // A node referenced only by its own loop stops being a target once
        // the loop goes; nothing justifies a stub then.
        if !self.diagram.is_association_target(id) {
            self.diagram.remove_node(id);
            self.commands
                .push(RenderCommand::NodeRemoved { id: id.clone() });
            return;
        }
        let center = self.diagram.node(id).map(|n| n.center).unwrap_or_default();
        let mut node = self.make_placeholder(id);
        node.center = center;
        self.diagram.insert_node(node);
        self.positions.ensure_node(id);
        self.commands
            .push(RenderCommand::NodeReplaced { id: id.clone() });
    }

    /// Removes a node outright: its outgoing edges go first, then any
    /// placeholder neighbors left unreferenced, then the node itself. The
    /// current selection is never pruned.
    fn remove_node_and_prune(&mut self, id: &NodeId) {
        let orphans = self.diagram.orphaned_placeholders_after_removal(id);
        for key in self.diagram.outgoing_edges(id) {
            self.diagram.remove_edge(&key);
            self.commands.push(RenderCommand::EdgeRemoved { key });
        }
        for orphan in orphans {
            if Some(&orphan) == self.selection.as_ref() {
                continue;
            }
            self.diagram.remove_node(&orphan);
            self.commands
                .push(RenderCommand::NodeRemoved { id: orphan });
        }
        self.diagram.remove_node(id);
        self.commands
            .push(RenderCommand::NodeRemoved { id: id.clone() });
    }

    fn prune_if_orphan_placeholder(&mut self, id: &NodeId) {
        if Some(id) == self.selection.as_ref() {
            return;
        }
        let is_orphan_placeholder = self
            .diagram
            .node(id)
            .map(|n| n.kind == NodeKind::Placeholder)
            .unwrap_or(false)
            && self.diagram.edges_touching(id).is_empty();
        if is_orphan_placeholder {
            self.diagram.remove_node(id);
            self.commands
                .push(RenderCommand::NodeRemoved { id: id.clone() });
        }
    }

    fn make_concrete(&self, class: &DomainClass) -> DiagramNode {
        DiagramNode {
            id: class.id.clone(),
            kind: NodeKind::Concrete,
            label: if class.label.is_empty() {
                local_name(&class.id)
            } else {
                class.label.clone()
            },
            flags: class.flags,
            size: self.layout_cfg.node_size,
            center: Coordinate::default(),
        }
    }

    fn make_placeholder(&self, id: &NodeId) -> DiagramNode {
        // Placeholders render as stubs, noticeably smaller than real classes.
        DiagramNode {
            id: id.clone(),
            kind: NodeKind::Placeholder,
            label: local_name(id),
            flags: Default::default(),
            size: Dimensions {
                width: self.layout_cfg.node_size.width * 0.6,
                height: self.layout_cfg.node_size.height * 0.4,
            },
            center: Coordinate::default(),
        }
    }

    fn apply_stored_centers(&mut self) {
        let stored: Vec<(NodeId, Coordinate)> = self
            .diagram
            .node_ids()
            .filter_map(|id| {
                self.positions
                    .node_coordinate(id)
                    .map(|c| (id.clone(), c))
            })
            .collect();
        for (id, center) in stored {
            self.diagram.set_node_center(&id, center);
        }
    }

    /// Store records may outlive their nodes (positions survive removal so a
    /// re-added class regains its spot), so layout inputs are filtered to
    /// current graph members.
    fn ids_needing_layout(&self) -> Vec<NodeId> {
        self.positions
            .ids_without_coordinate()
            .into_iter()
            .filter(|id| self.diagram.contains_node(id))
            .collect()
    }

    fn apply_layout(&mut self, only: Option<&[NodeId]>) {
        let result = layout::layout(&self.diagram, &self.positions, only, &self.layout_cfg);
        for (id, center) in result.placed {
            self.diagram.set_node_center(&id, center);
            self.positions.set_node_coordinate(&id, center, false);
        }
    }

    fn refocus(&mut self, force_fit_all: bool) {
        let outcome = focus::focus(
            &self.diagram,
            self.selection.as_ref(),
            self.focus_level,
            force_fit_all,
            self.viewport,
        );
        if let Some(transform) = outcome.camera {
            self.camera = transform;
            self.commands.push(RenderCommand::Camera { transform });
        }
    }
}

/// Last path segment of a URI-like id, used as the stub label.
fn local_name(id: &NodeId) -> String {
    let s = id.as_str();
    s.rsplit(|c| c == '#' || c == '/')
        .next()
        .unwrap_or(s)
        .to_string()
}
