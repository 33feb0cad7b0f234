use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64) -> Self {
        Coordinate { x, y }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn from_center(center: Coordinate, size: Dimensions) -> Self {
        Rect {
            x: center.x - size.width / 2.0,
            y: center.y - size.height / 2.0,
            width: size.width,
            height: size.height,
        }
    }

    pub fn center(&self) -> Coordinate {
        Coordinate::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x0 = self.x.min(other.x);
        let y0 = self.y.min(other.y);
        let x1 = self.right().max(other.right());
        let y1 = self.bottom().max(other.bottom());
        Rect {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        }
    }
}

/// Rendering surfaces report sub-pixel drift on untouched cells, so two
/// coordinates count as equal when their truncated integer parts match.
pub fn coordinates_are_equal(l: Coordinate, r: Coordinate) -> bool {
    l.x.trunc() == r.x.trunc() && l.y.trunc() == r.y.trunc()
}

pub fn vertices_are_equal(l: &[Coordinate], r: &[Coordinate]) -> bool {
    l.len() == r.len()
        && l.iter()
            .zip(r.iter())
            .all(|(a, b)| coordinates_are_equal(*a, *b))
}

/// Intersection of the ray from the rectangle center toward `toward` with the
/// rectangle boundary. Degenerates to the center when the two coincide.
pub fn boundary_anchor(rect: Rect, toward: Coordinate) -> Coordinate {
    let c = rect.center();
    let dx = toward.x - c.x;
    let dy = toward.y - c.y;
    if dx == 0.0 && dy == 0.0 {
        return c;
    }
    let tx = if dx != 0.0 {
        (rect.width / 2.0) / dx.abs()
    } else {
        f64::INFINITY
    };
    let ty = if dy != 0.0 {
        (rect.height / 2.0) / dy.abs()
    } else {
        f64::INFINITY
    };
    let t = tx.min(ty).min(1.0);
    Coordinate::new(c.x + dx * t, c.y + dy * t)
}

/// Point at half the total length of a polyline. Used as the label anchor of
/// an association link.
pub fn polyline_midpoint(points: &[Coordinate]) -> Coordinate {
    match points {
        [] => Coordinate::default(),
        [only] => *only,
        _ => {
            let total: f64 = points
                .windows(2)
                .map(|w| segment_length(w[0], w[1]))
                .sum();
            if total == 0.0 {
                return points[0];
            }
            let mut remaining = total / 2.0;
            for w in points.windows(2) {
                let len = segment_length(w[0], w[1]);
                if len >= remaining && len > 0.0 {
                    let t = remaining / len;
                    return Coordinate::new(
                        w[0].x + (w[1].x - w[0].x) * t,
                        w[0].y + (w[1].y - w[0].y) * t,
                    );
                }
                remaining -= len;
            }
            points[points.len() - 1]
        }
    }
}

fn segment_length(a: Coordinate, b: Coordinate) -> f64 {
    ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncated_equality_ignores_subpixel_drift() {
        assert!(coordinates_are_equal(
            Coordinate::new(10.2, 20.9),
            Coordinate::new(10.7, 20.1)
        ));
        assert!(!coordinates_are_equal(
            Coordinate::new(10.2, 20.9),
            Coordinate::new(11.0, 20.1)
        ));
    }

    #[test]
    fn anchor_lands_on_boundary() {
        let rect = Rect {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 50.0,
        };
        let a = boundary_anchor(rect, Coordinate::new(200.0, 25.0));
        assert!((a.x - 100.0).abs() < 1e-9);
        assert!((a.y - 25.0).abs() < 1e-9);
    }

    #[test]
    fn midpoint_of_two_segment_polyline() {
        let pts = [
            Coordinate::new(0.0, 0.0),
            Coordinate::new(10.0, 0.0),
            Coordinate::new(10.0, 10.0),
        ];
        let m = polyline_midpoint(&pts);
        assert!((m.x - 10.0).abs() < 1e-9);
        assert!((m.y - 0.0).abs() < 1e-9);
    }
}
