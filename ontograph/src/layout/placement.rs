use std::collections::{BTreeMap, BTreeSet};

use crate::geometry::{Coordinate, Dimensions, Rect};
use crate::model::NodeId;
use crate::Diagram;

use super::adjacency::Adjacency;
use super::grid::OccupancyGrid;
use super::LayoutConfig;

/// Candidate positions tried per free node before giving up and falling back
/// to row scanning.
const NUM_CANDIDATES: usize = 32;

/// Vertical scan limit for the row fallback. Beyond this the node is dropped
/// at a fixed offset from its first placed neighbor instead.
const MAX_SCAN_Y: f64 = 20_000.0;

pub(super) struct Placement<'a> {
    diagram: &'a Diagram,
    adjacency: &'a Adjacency,
    cfg: &'a LayoutConfig,
    grid: OccupancyGrid,
    placed: BTreeMap<NodeId, Coordinate>,
}

impl<'a> Placement<'a> {
    pub fn new(diagram: &'a Diagram, adjacency: &'a Adjacency, cfg: &'a LayoutConfig) -> Self {
        let cell = cfg.node_size.width.max(cfg.node_size.height);
        Placement {
            diagram,
            adjacency,
            cfg,
            grid: OccupancyGrid::new(cell),
            placed: BTreeMap::new(),
        }
    }

    fn size_of(&self, id: &NodeId) -> Dimensions {
        self.diagram
            .node(id)
            .map(|n| n.size)
            .unwrap_or(self.cfg.node_size)
    }

    /// Registers an already-positioned node as a fixed obstacle and anchor.
    pub fn fix(&mut self, id: &NodeId, center: Coordinate) {
        let size = self.size_of(id);
        self.grid.insert(Rect::from_center(center, size));
        self.placed.insert(id.clone(), center);
    }

    /// Places every node in `free`, most-connected-first, and returns the
    /// chosen centers.
    pub fn place_all(mut self, free: &[NodeId]) -> BTreeMap<NodeId, Coordinate> {
        let mut pending: Vec<NodeId> = free.to_vec();
        pending.sort();
        pending.dedup();
        let mut result = BTreeMap::new();

        while !pending.is_empty() {
            let idx = self.pick_next(&pending);
            let id = pending.remove(idx);
            let center = self.place_one(&id);
            self.fix(&id, center);
            result.insert(id, center);
        }
        result
    }

    /// Most edge weight to already-placed nodes wins; total degree breaks
    /// ties, then lexical id order for determinism.
    fn pick_next(&self, pending: &[NodeId]) -> usize {
        let mut best_idx = 0;
        let mut best_score = 0usize;
        let mut best_degree = 0usize;
        for (idx, id) in pending.iter().enumerate() {
            let score: usize = self
                .adjacency
                .neighbors(id)
                .filter(|(n, _)| self.placed.contains_key(*n))
                .map(|(_, w)| w)
                .sum();
            let degree = self.adjacency.degree(id);
            if score > best_score || (score == best_score && degree > best_degree) {
                best_idx = idx;
                best_score = score;
                best_degree = degree;
            }
        }
        best_idx
    }

    fn place_one(&self, id: &NodeId) -> Coordinate {
        let size = self.size_of(id);
        let candidates = self.candidates(id, size);
        let mut best: Option<(f64, Coordinate)> = None;
        for candidate in &candidates {
            let rect = Rect::from_center(*candidate, size);
            if self.grid.overlaps_any(&rect) {
                continue;
            }
            let score = self.score(id, *candidate);
            let better = match best {
                Some((s, _)) => score < s,
                None => true,
            };
            if better {
                best = Some((score, *candidate));
            }
        }
        match best {
            Some((_, center)) => center,
            None => self.fallback(id, size),
        }
    }

    /// Sum of weighted squared distances to placed neighbors.
    fn score(&self, id: &NodeId, center: Coordinate) -> f64 {
        let mut score = 0.0;
        for (neighbor, weight) in self.adjacency.neighbors(id) {
            if let Some(pos) = self.placed.get(neighbor) {
                let dx = center.x - pos.x;
                let dy = center.y - pos.y;
                score += (dx * dx + dy * dy) * weight as f64;
            }
        }
        score
    }

    /// Candidates adjacent to each connected placed neighbor (cardinals and
    /// diagonals, strongest neighbor first), then wider rings around the
    /// strongest one, then a grid fallback when nothing is placed yet.
    fn candidates(&self, id: &NodeId, size: Dimensions) -> Vec<Coordinate> {
        let step_x = size.width + self.cfg.gap;
        let step_y = size.height + self.cfg.gap;
        let mut out: Vec<Coordinate> = Vec::with_capacity(NUM_CANDIDATES * 2);
        let mut seen: BTreeSet<(i64, i64)> = BTreeSet::new();
        let mut push = |out: &mut Vec<Coordinate>, c: Coordinate| {
            let key = (c.x.round() as i64, c.y.round() as i64);
            if seen.insert(key) {
                out.push(c);
            }
        };

        let mut connected: Vec<(usize, &NodeId, Coordinate)> = self
            .adjacency
            .neighbors(id)
            .filter_map(|(n, w)| self.placed.get(n).map(|pos| (w, n, *pos)))
            .collect();
        connected.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1)));

        for (_, _, pos) in &connected {
            for (dx, dy) in [
                (1.0, 0.0),
                (-1.0, 0.0),
                (0.0, 1.0),
                (0.0, -1.0),
                (1.0, 1.0),
                (-1.0, 1.0),
                (1.0, -1.0),
                (-1.0, -1.0),
            ] {
                push(
                    &mut out,
                    Coordinate::new(pos.x + dx * step_x, pos.y + dy * step_y),
                );
            }
            if out.len() >= NUM_CANDIDATES {
                break;
            }
        }

        if let Some((_, _, center)) = connected.first() {
            for ring in 2..=3 {
                for dx in -1i32..=1 {
                    for dy in -1i32..=1 {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        push(
                            &mut out,
                            Coordinate::new(
                                center.x + dx as f64 * step_x * ring as f64,
                                center.y + dy as f64 * step_y * ring as f64,
                            ),
                        );
                    }
                }
            }
        }

        if out.is_empty() {
            let cols = (self.cfg.max_row_width / step_x).max(1.0) as usize;
            for i in 0..NUM_CANDIDATES {
                let col = (i % cols) as f64;
                let row = (i / cols) as f64;
                push(
                    &mut out,
                    Coordinate::new(
                        self.cfg.padding + col * step_x + size.width / 2.0,
                        self.cfg.padding + row * step_y + size.height / 2.0,
                    ),
                );
            }
        }
        out
    }

    /// All candidates overlapped: scan rows for the first free slot, and if
    /// even that does not converge, drop the node at a fixed offset near its
    /// first placed neighbor.
    fn fallback(&self, id: &NodeId, size: Dimensions) -> Coordinate {
        let step = self.cfg.gap.max(1.0);
        let mut y = self.cfg.padding + size.height / 2.0;
        while y < MAX_SCAN_Y {
            let mut x = self.cfg.padding + size.width / 2.0;
            while x + size.width / 2.0 <= self.cfg.max_row_width {
                let rect = Rect::from_center(Coordinate::new(x, y), size);
                if !self.grid.overlaps_any(&rect) {
                    return Coordinate::new(x, y);
                }
                x += step;
            }
            y += step;
        }
        let anchor = self
            .adjacency
            .neighbors(id)
            .find_map(|(n, _)| self.placed.get(n).copied())
            .unwrap_or(Coordinate::new(self.cfg.padding, self.cfg.padding));
        Coordinate::new(anchor.x + size.width + self.cfg.gap, anchor.y + self.cfg.gap)
    }
}
