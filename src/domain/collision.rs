// Pure geometry predicates shared by the simulation systems.

use crate::domain::tuning::WorldTuning;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Axis-aligned box anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Half-open overlap test: boxes that only share an edge do not intersect.
pub fn rect_intersect(a: &Rect, b: &Rect) -> bool {
    a.x < b.right() && a.right() > b.x && a.y < b.bottom() && a.bottom() > b.y
}

/// Strict Euclidean distance check between two points.
pub fn within_radius(a: Point, b: Point, radius: f32) -> bool {
    a.distance(b) < radius
}

/// Clamps a box's top-left corner so the whole box stays inside the world.
///
/// Boxes wider than the world pin to the origin on that axis.
pub fn clamp_to_world(x: f32, y: f32, width: f32, height: f32, world: &WorldTuning) -> (f32, f32) {
    let max_x = (world.width - width).max(0.0);
    let max_y = (world.height - height).max(0.0);
    (x.min(max_x).max(0.0), y.min(max_y).max(0.0))
}

/// True when a point lies inside the world rectangle, edges included.
pub fn in_world(point: Point, world: &WorldTuning) -> bool {
    point.x >= 0.0 && point.x <= world.width && point.y >= 0.0 && point.y <= world.height
}
