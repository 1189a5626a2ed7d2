//! Graze target validation.
//!
//! Pens are squares whose walls sit on the square's edge. A sheep grazing
//! outside a pen must never choose a spot inside it and vice versa, and the
//! straight line to the spot must not pass through any wall.

use crate::constants::{distances, grazing};
use crate::geometry::{play_area, sample_segment, Rect, Vec2};

/// Candidate pixel within the herd square around `centroid`.
///
/// `u` and `v` are uniform samples in `[0, 1)`.
pub fn herd_candidate(centroid: Vec2, u: f32, v: f32) -> Vec2 {
    let half = distances::HERD_BOUNDARY_SIZE / 2.0;
    Vec2::new(
        (centroid.x - half + u * distances::HERD_BOUNDARY_SIZE).floor(),
        (centroid.y - half + v * distances::HERD_BOUNDARY_SIZE).floor(),
    )
}

/// Whether `a` and `b` are on the same side (both inside or both outside) of `pen`.
pub fn same_side(pen: &Rect, a: Vec2, b: Vec2) -> bool {
    pen.contains_point(a) == pen.contains_point(b)
}

/// Whether the segment `from → to` leaves or enters `pen` at any sampled point.
pub fn crosses_pen(pen: &Rect, from: Vec2, to: Vec2) -> bool {
    let inside = pen.contains_point(from);
    sample_segment(from, to, grazing::LINE_CHECKS).any(|p| pen.contains_point(p) != inside)
}

/// Whether a sheep centered at `from` may graze at `target`.
///
/// `pens` are the outer squares of collision-enabled pens. The eaten-grass
/// check is left to the caller, which owns the set.
pub fn is_valid_graze_target(from: Vec2, target: Vec2, pens: &[Rect]) -> bool {
    if !play_area().contains_point(target) {
        return false;
    }
    pens.iter()
        .all(|pen| same_side(pen, from, target) && !crosses_pen(pen, from, target))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pen() -> Rect {
        Rect::new(300.0, 300.0, 150.0, 150.0)
    }

    #[test]
    fn test_outside_cannot_target_inside() {
        let from = Vec2::new(280.0, 375.0);
        assert!(!is_valid_graze_target(from, Vec2::new(320.0, 375.0), &[pen()]));
        assert!(is_valid_graze_target(from, Vec2::new(250.0, 375.0), &[pen()]));
    }

    #[test]
    fn test_inside_cannot_leave() {
        let from = Vec2::new(375.0, 375.0);
        assert!(!is_valid_graze_target(from, Vec2::new(460.0, 375.0), &[pen()]));
        assert!(is_valid_graze_target(from, Vec2::new(400.0, 420.0), &[pen()]));
    }

    #[test]
    fn test_line_through_pen_corner_rejected() {
        // Both ends outside but the straight line cuts the pen.
        let from = Vec2::new(290.0, 375.0);
        let to = Vec2::new(460.0, 375.0);
        assert!(same_side(&pen(), from, to));
        assert!(crosses_pen(&pen(), from, to));
        assert!(!is_valid_graze_target(from, to, &[pen()]));
    }

    #[test]
    fn test_off_screen_rejected() {
        assert!(!is_valid_graze_target(
            Vec2::new(20.0, 50.0),
            Vec2::new(20.0, 10.0),
            &[]
        ));
    }

    #[test]
    fn test_herd_candidate_within_square() {
        let c = Vec2::new(500.0, 400.0);
        let lo = herd_candidate(c, 0.0, 0.0);
        let hi = herd_candidate(c, 0.999, 0.999);
        assert_eq!(lo, Vec2::new(450.0, 350.0));
        assert!(hi.x < 550.0 && hi.y < 450.0);
    }
}
