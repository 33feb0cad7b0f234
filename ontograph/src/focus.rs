use std::collections::{BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::model::NodeId;
use crate::Diagram;

/// Largest named hop depth before the scale steps to `Infinite`.
pub const MAX_NAMED_DEPTH: u8 = 4;

const MIN_ZOOM: f64 = 0.1;
const MAX_ZOOM: f64 = 3.0;
const FIT_MARGIN: f64 = 40.0;

/// Hop-distance radius around the selection that determines the visible
/// subgraph. Total order: 1 < 2 < ... < Infinite < All.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FocusLevel {
    Depth(u8),
    /// Everything reachable from the selection, any hop count.
    Infinite,
    /// Ignore the selection entirely.
    All,
}

impl FocusLevel {
    fn rank(self) -> u16 {
        match self {
            FocusLevel::Depth(n) => n as u16,
            FocusLevel::Infinite => MAX_NAMED_DEPTH as u16 + 1,
            FocusLevel::All => MAX_NAMED_DEPTH as u16 + 2,
        }
    }

    /// One step toward `All`.
    pub fn focus_in(self) -> FocusLevel {
        match self {
            FocusLevel::Depth(n) if n < MAX_NAMED_DEPTH => FocusLevel::Depth(n + 1),
            FocusLevel::Depth(_) => FocusLevel::Infinite,
            FocusLevel::Infinite => FocusLevel::All,
            FocusLevel::All => FocusLevel::All,
        }
    }

    /// One step toward `Depth(1)`, never below it.
    pub fn focus_out(self) -> FocusLevel {
        match self {
            FocusLevel::All => FocusLevel::Infinite,
            FocusLevel::Infinite => FocusLevel::Depth(MAX_NAMED_DEPTH),
            FocusLevel::Depth(n) if n > 1 => FocusLevel::Depth(n - 1),
            FocusLevel::Depth(_) => FocusLevel::Depth(1),
        }
    }
}

impl PartialOrd for FocusLevel {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FocusLevel {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.rank().cmp(&other.rank())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// Pan/zoom request toward the rendering layer: `screen = world * zoom + pan`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraTransform {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

#[derive(Clone, Debug, Default)]
pub struct FocusOutcome {
    /// Node ids the rendering layer should keep visible.
    pub visible: BTreeSet<NodeId>,
    pub camera: Option<CameraTransform>,
}

/// Nodes within the focus radius of the selection. No selection, `All`, or a
/// selection without a visual counterpart all mean the whole graph.
pub fn visible_set(
    diagram: &Diagram,
    selection: Option<&NodeId>,
    level: FocusLevel,
) -> BTreeSet<NodeId> {
    let start = match (selection, level) {
        (Some(id), FocusLevel::Depth(_)) | (Some(id), FocusLevel::Infinite)
            if diagram.contains_node(id) =>
        {
            id
        }
        _ => return diagram.node_ids().cloned().collect(),
    };

    let limit = match level {
        FocusLevel::Depth(k) => Some(k as usize),
        _ => None,
    };

    let mut visible: BTreeSet<NodeId> = BTreeSet::new();
    let mut queue: VecDeque<(NodeId, usize)> = VecDeque::new();
    visible.insert(start.clone());
    queue.push_back((start.clone(), 0));
    while let Some((id, depth)) = queue.pop_front() {
        if let Some(limit) = limit {
            if depth >= limit {
                continue;
            }
        }
        for neighbor in diagram.neighbors(&id) {
            if visible.insert(neighbor.clone()) {
                queue.push_back((neighbor, depth + 1));
            }
        }
    }
    visible
}

/// Computes the visible subgraph and the camera transform that centers and
/// scales it into the viewport. A selection with no visual node yields no
/// camera change; unsaved entities are expected to lack one until the next
/// layout pass.
pub fn focus(
    diagram: &Diagram,
    selection: Option<&NodeId>,
    level: FocusLevel,
    force_fit_all: bool,
    viewport: Viewport,
) -> FocusOutcome {
    if let Some(id) = selection {
        if !diagram.contains_node(id) {
            return FocusOutcome {
                visible: diagram.node_ids().cloned().collect(),
                camera: None,
            };
        }
    }

    let visible = visible_set(diagram, selection, level);
    let bbox = if force_fit_all {
        diagram.bounding_box::<std::iter::Empty<&NodeId>>(None)
    } else {
        diagram.bounding_box(Some(visible.iter()))
    };

    let camera = bbox.map(|b| {
        let zoom = ((viewport.width / (b.width + 2.0 * FIT_MARGIN))
            .min(viewport.height / (b.height + 2.0 * FIT_MARGIN)))
        .clamp(MIN_ZOOM, MAX_ZOOM);
        let center = b.center();
        CameraTransform {
            pan_x: viewport.width / 2.0 - center.x * zoom,
            pan_y: viewport.height / 2.0 - center.y * zoom,
            zoom,
        }
    });

    FocusOutcome { visible, camera }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoomDirection {
    In,
    Out,
}

/// Press-and-hold continuous zoom, modeled as an explicit repeating stepper:
/// the caller drives `tick` from its timer and `release` cancels. Each tick
/// nudges the zoom by a fixed step, clamped to the camera bounds.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZoomControl {
    active: Option<ZoomDirection>,
}

const ZOOM_STEP: f64 = 0.01;

impl ZoomControl {
    pub fn start(&mut self, direction: ZoomDirection) {
        self.active = Some(direction);
    }

    pub fn release(&mut self) {
        self.active = None;
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Next zoom value, or `None` when not pressed.
    pub fn tick(&self, current_zoom: f64) -> Option<f64> {
        let direction = self.active?;
        let delta = match direction {
            ZoomDirection::In => ZOOM_STEP,
            ZoomDirection::Out => -ZOOM_STEP,
        };
        Some((current_zoom + delta).clamp(MIN_ZOOM, MAX_ZOOM))
    }
}
