//! Geometry helpers: points, rectangles, circles and segment sampling.
//!
//! Coordinates are pixels with the origin at the top-left and Y growing
//! downward. Rectangles follow the "touching edges collide" convention so
//! that placement checks stay conservative.

use serde::{Deserialize, Serialize};

use crate::constants::screen;

/// 2D point or vector in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_squared(&self, other: &Self) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn distance(&self, other: &Self) -> f32 {
        self.distance_squared(other).sqrt()
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self {
                x: self.x / len,
                y: self.y / len,
            }
        } else {
            Self::ZERO
        }
    }

    /// Linear interpolation: `t = 0` is `self`, `t = 1` is `other`.
    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    /// Step toward `target` by at most `max_step`, landing exactly on it when close.
    pub fn step_toward(&self, target: &Self, max_step: f32) -> Self {
        let delta = *target - *self;
        let dist = delta.length();
        if dist <= max_step || dist <= f32::EPSILON {
            *target
        } else {
            *self + delta * (max_step / dist)
        }
    }

    /// Integer pixel containing this point.
    pub fn pixel(&self) -> (i32, i32) {
        (self.x.floor() as i32, self.y.floor() as i32)
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;
    fn mul(self, scalar: f32) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

/// Euclidean distance between two points.
pub fn distance(p: Vec2, q: Vec2) -> f32 {
    p.distance(&q)
}

/// Clamp without panicking when `lo > hi` (the upper bound wins).
pub fn clamp(v: f32, lo: f32, hi: f32) -> f32 {
    v.max(lo).min(hi)
}

/// Axis-aligned rectangle given by its top-left corner and size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_center(center: Vec2, w: f32, h: f32) -> Self {
        Self::new(center.x - w / 2.0, center.y - h / 2.0, w, h)
    }

    pub fn left(&self) -> f32 {
        self.x
    }
    pub fn right(&self) -> f32 {
        self.x + self.w
    }
    pub fn top(&self) -> f32 {
        self.y
    }
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    /// Half-open containment, like a pixel grid: the right and bottom edges are outside.
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    /// Whether `other` lies completely inside this rectangle.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Intersection test where touching edges count as a collision.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x <= other.right()
            && other.x <= self.right()
            && self.y <= other.bottom()
            && other.y <= self.bottom()
    }

    /// Intersection test with positive-area overlap only.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Grow (or shrink, for negative `amount`) on every side.
    pub fn inflate(&self, amount: f32) -> Rect {
        Rect::new(
            self.x - amount,
            self.y - amount,
            self.w + amount * 2.0,
            self.h + amount * 2.0,
        )
    }

    /// Closest point of the rectangle to `p` (or `p` itself when inside).
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            clamp(p.x, self.x, self.right()),
            clamp(p.y, self.y, self.bottom()),
        )
    }

    pub fn distance_to_point(&self, p: Vec2) -> f32 {
        self.closest_point(p).distance(&p)
    }

    /// Move the rectangle so it lies inside `bounds` (if it fits).
    pub fn clamped_into(&self, bounds: &Rect) -> Rect {
        Rect::new(
            clamp(self.x, bounds.x, bounds.right() - self.w),
            clamp(self.y, bounds.y, bounds.bottom() - self.h),
            self.w,
            self.h,
        )
    }

    pub fn is_landscape(&self) -> bool {
        self.w > self.h
    }
}

/// Circle given by center and radius.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub const fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        self.center.distance_squared(&p) <= self.radius * self.radius
    }

    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        rect.distance_to_point(self.center) <= self.radius
    }

    pub fn intersects_circle(&self, other: &Circle) -> bool {
        self.center.distance(&other.center) <= self.radius + other.radius
    }

    /// Bounding square.
    pub fn bounds(&self) -> Rect {
        Rect::from_center(self.center, self.radius * 2.0, self.radius * 2.0)
    }
}

/// Solid footprint used by collision checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Rect(Rect),
    Circle(Circle),
}

impl Shape {
    pub fn contains_point(&self, p: Vec2) -> bool {
        match self {
            Shape::Rect(r) => r.contains_point(p),
            Shape::Circle(c) => c.contains_point(p),
        }
    }

    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        match self {
            Shape::Rect(r) => r.intersects(rect),
            Shape::Circle(c) => c.intersects_rect(rect),
        }
    }

    pub fn intersects_circle(&self, circle: &Circle) -> bool {
        match self {
            Shape::Rect(r) => circle.intersects_rect(r),
            Shape::Circle(c) => c.intersects_circle(circle),
        }
    }

    pub fn bounds(&self) -> Rect {
        match self {
            Shape::Rect(r) => *r,
            Shape::Circle(c) => c.bounds(),
        }
    }
}

/// `count` evenly spaced points from `a` to `b`, both ends included.
pub fn sample_segment(a: Vec2, b: Vec2, count: usize) -> impl Iterator<Item = Vec2> {
    let steps = count.max(2) - 1;
    (0..=steps).map(move |i| a.lerp(&b, i as f32 / steps as f32))
}

/// The playable area: full width, between the two HUD strips.
pub fn play_area() -> Rect {
    Rect::new(
        0.0,
        screen::PLAY_TOP,
        screen::WIDTH,
        screen::PLAY_BOTTOM - screen::PLAY_TOP,
    )
}

/// Clamp a top-left agent position so a `w`×`h` body stays in the playable area.
pub fn clamp_to_play_area(pos: Vec2, w: f32, h: f32) -> Vec2 {
    Vec2::new(
        clamp(pos.x, 0.0, screen::WIDTH - w),
        clamp(pos.y, screen::PLAY_TOP, screen::PLAY_BOTTOM - h),
    )
}

/// Clamp a point into the playable area.
pub fn clamp_point_to_play_area(p: Vec2) -> Vec2 {
    Vec2::new(
        clamp(p.x, 0.0, screen::WIDTH - 1.0),
        clamp(p.y, screen::PLAY_TOP, screen::PLAY_BOTTOM - 1.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        assert!((distance(Vec2::new(0.0, 0.0), Vec2::new(3.0, 4.0)) - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_clamp_inverted_bounds() {
        assert_eq!(clamp(5.0, 0.0, 10.0), 5.0);
        assert_eq!(clamp(-1.0, 0.0, 10.0), 0.0);
        assert_eq!(clamp(5.0, 10.0, 2.0), 2.0);
    }

    #[test]
    fn test_touching_rects_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert!(a.intersects(&b));
        assert!(!a.overlaps(&b));
        let c = Rect::new(10.5, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&c));
    }

    #[test]
    fn test_contains_point_half_open() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains_point(Vec2::new(0.0, 0.0)));
        assert!(r.contains_point(Vec2::new(9.9, 9.9)));
        assert!(!r.contains_point(Vec2::new(10.0, 5.0)));
    }

    #[test]
    fn test_circle_rect_intersection() {
        let c = Circle::new(Vec2::new(0.0, 0.0), 5.0);
        assert!(c.intersects_rect(&Rect::new(4.0, -1.0, 2.0, 2.0)));
        assert!(!c.intersects_rect(&Rect::new(4.0, 4.0, 2.0, 2.0)));
    }

    #[test]
    fn test_step_toward_lands_on_target() {
        let p = Vec2::new(0.0, 0.0);
        let t = Vec2::new(3.0, 0.0);
        assert_eq!(p.step_toward(&t, 5.0), t);
        let mid = p.step_toward(&t, 1.0);
        assert!((mid.x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_sample_segment_endpoints() {
        let pts: Vec<Vec2> =
            sample_segment(Vec2::new(0.0, 0.0), Vec2::new(20.0, 0.0), 21).collect();
        assert_eq!(pts.len(), 21);
        assert_eq!(pts[0], Vec2::new(0.0, 0.0));
        assert_eq!(pts[20], Vec2::new(20.0, 0.0));
        assert!((pts[10].x - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_clamp_to_play_area() {
        let p = clamp_to_play_area(Vec2::new(-50.0, 5000.0), 20.0, 20.0);
        assert_eq!(p.x, 0.0);
        assert_eq!(p.y, screen::PLAY_BOTTOM - 20.0);
    }

    #[test]
    fn test_rect_clamped_into() {
        let bounds = Rect::new(0.0, 40.0, 100.0, 100.0);
        let r = Rect::new(90.0, 20.0, 20.0, 20.0).clamped_into(&bounds);
        assert_eq!(r, Rect::new(80.0, 40.0, 20.0, 20.0));
        assert!(bounds.contains_rect(&r));
    }
}
