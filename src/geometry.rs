//! Pure geometry utilities: points, rectangles, grid snapping, distances.
//!
//! Everything in here is side-effect free and operates on canvas-space
//! coordinates. Higher layers (registry, connection engine, viewport)
//! build on these primitives.

use serde::{Deserialize, Serialize};

/// A canvas-space coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// True when both coordinates are finite (guards against NaN/Infinity
    /// leaking out of degenerate computations).
    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// An axis-aligned rectangle with a top-left origin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build a rectangle from any two opposite corners. The result is
    /// guaranteed to contain both corners: `origin + extent` must reach
    /// the far corner even when the subtraction rounds down.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self {
            x,
            y,
            width: extent_to(x, a.x.max(b.x)),
            height: extent_to(y, a.y.max(b.y)),
        }
    }

    #[inline]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[inline]
    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn max_y(&self) -> f32 {
        self.y + self.height
    }

    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Inclusive point containment (borders count as inside).
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.max_x() && p.y >= self.y && p.y <= self.max_y()
    }

    /// Inclusive rectangle overlap test. Touching edges count as overlap,
    /// which is what marquee selection and `in_area` queries expect.
    #[inline]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x <= other.max_x()
            && self.max_x() >= other.x
            && self.y <= other.max_y()
            && self.max_y() >= other.y
    }

    /// Smallest rectangle covering both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let max_x = self.max_x().max(other.max_x());
        let max_y = self.max_y().max(other.max_y());
        Rect::new(x, y, max_x - x, max_y - y)
    }

    /// Expand by `padding` on every side.
    pub fn expanded(&self, padding: f32) -> Rect {
        Rect::new(
            self.x - padding,
            self.y - padding,
            self.width + padding * 2.0,
            self.height + padding * 2.0,
        )
    }
}

/// Smallest extent such that `min + extent >= max` in f32 arithmetic.
/// `max - min` alone can round to a value that lands one ulp short.
fn extent_to(min: f32, max: f32) -> f32 {
    let mut extent = max - min;
    while min + extent < max {
        extent = extent.next_up();
    }
    extent
}

/// Snap a single value to the nearest multiple of `grid`.
///
/// A non-positive grid is treated as "snapping disabled" and returns the
/// value unchanged rather than producing NaN.
#[inline]
pub fn snap_value(v: f32, grid: f32) -> f32 {
    if grid <= 0.0 {
        return v;
    }
    (v / grid).round() * grid
}

/// Snap a point to the nearest grid intersection.
#[inline]
pub fn snap_to_grid(p: Point, grid: f32) -> Point {
    Point::new(snap_value(p.x, grid), snap_value(p.y, grid))
}

/// Euclidean distance between two points.
#[inline]
pub fn distance(a: Point, b: Point) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt()
}

/// Distance from point `p` to the segment `a`..`b`.
///
/// A zero-length segment degrades to plain point distance instead of
/// dividing by zero.
pub fn point_segment_distance(p: Point, a: Point, b: Point) -> f32 {
    let seg = b - a;
    let len_sq = seg.x * seg.x + seg.y * seg.y;
    if len_sq <= f32::EPSILON {
        return distance(p, a);
    }
    let t = (((p.x - a.x) * seg.x + (p.y - a.y) * seg.y) / len_sq).clamp(0.0, 1.0);
    distance(p, Point::new(a.x + seg.x * t, a.y + seg.y * t))
}
