use std::collections::HashMap;

use crate::geometry::Rect;

/// Spatial hash grid for overlap checks while packing nodes, so candidate
/// scoring stays O(1) per probe instead of scanning every placed rectangle.
#[derive(Debug)]
pub struct OccupancyGrid {
    cell_size: f64,
    cells: HashMap<(i64, i64), Vec<Rect>>,
}

impl OccupancyGrid {
    pub fn new(cell_size: f64) -> Self {
        OccupancyGrid {
            cell_size: cell_size.max(1.0),
            cells: HashMap::new(),
        }
    }

    fn cell_range(&self, rect: &Rect) -> ((i64, i64), (i64, i64)) {
        let min_x = (rect.x / self.cell_size).floor() as i64;
        let max_x = ((rect.right() - 1e-9) / self.cell_size).floor() as i64;
        let min_y = (rect.y / self.cell_size).floor() as i64;
        let max_y = ((rect.bottom() - 1e-9) / self.cell_size).floor() as i64;
        ((min_x, min_y), (max_x, max_y))
    }

    pub fn insert(&mut self, rect: Rect) {
        let ((x0, y0), (x1, y1)) = self.cell_range(&rect);
        for cx in x0..=x1 {
            for cy in y0..=y1 {
                self.cells.entry((cx, cy)).or_default().push(rect);
            }
        }
    }

    pub fn overlaps_any(&self, rect: &Rect) -> bool {
        let ((x0, y0), (x1, y1)) = self.cell_range(rect);
        for cx in x0..=x1 {
            for cy in y0..=y1 {
                if let Some(rects) = self.cells.get(&(cx, cy)) {
                    if rects.iter().any(|r| r.overlaps(rect)) {
                        return true;
                    }
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_probe() {
        let mut grid = OccupancyGrid::new(100.0);
        grid.insert(Rect {
            x: 0.0,
            y: 0.0,
            width: 50.0,
            height: 50.0,
        });
        assert!(grid.overlaps_any(&Rect {
            x: 25.0,
            y: 25.0,
            width: 50.0,
            height: 50.0,
        }));
        assert!(!grid.overlaps_any(&Rect {
            x: 100.0,
            y: 100.0,
            width: 50.0,
            height: 50.0,
        }));
    }
}
