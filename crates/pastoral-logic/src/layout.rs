//! Slot layouts: standing spots around a resource and grain spots on a millstone.

use std::f32::consts::{PI, TAU};

use crate::constants::{distances, mill, sizes};
use crate::geometry::Vec2;

/// Angular step between consecutive ring slots (60°).
pub const RING_SLOT_STEP: f32 = PI / 3.0;

/// Point on the harvest ring around `center` at `angle` radians.
pub fn ring_position(center: Vec2, angle: f32) -> Vec2 {
    Vec2::new(
        center.x + distances::HARVEST_RING_RADIUS * angle.cos(),
        center.y + distances::HARVEST_RING_RADIUS * angle.sin(),
    )
}

/// Standing spot for the `index`-th worker on the same resource.
///
/// Consecutive indices are 60° apart, so up to six workers get distinct spots.
pub fn ring_slot(center: Vec2, index: usize) -> Vec2 {
    ring_position(center, (index % 6) as f32 * RING_SLOT_STEP)
}

/// Number of grain slots on ring `k` of the millstone (ring 0 is the center).
fn ring_capacity(k: usize) -> usize {
    if k == 0 {
        1
    } else {
        (TAU * k as f32).floor() as usize
    }
}

/// Number of rings that fit inside the millstone without grains spilling over its edge.
fn ring_count() -> usize {
    let usable = sizes::MILLSTONE_RADIUS - mill::GRAIN_SPACING / 2.0;
    (usable / mill::GRAIN_SPACING).floor() as usize + 1
}

/// Total grain slots on one millstone.
pub fn millstone_capacity() -> usize {
    (0..ring_count()).map(ring_capacity).sum()
}

/// Offset from the millstone center of grain slot `index`.
///
/// Slots fill the center first, then concentric rings `GRAIN_SPACING` apart.
/// Indices past the last slot wrap around and stack on earlier grains.
pub fn millstone_slot(index: usize) -> Vec2 {
    let mut remaining = index % millstone_capacity();
    for k in 0..ring_count() {
        let cap = ring_capacity(k);
        if remaining < cap {
            if k == 0 {
                return Vec2::ZERO;
            }
            let angle = remaining as f32 * TAU / cap as f32;
            let r = k as f32 * mill::GRAIN_SPACING;
            return Vec2::new(r * angle.cos(), r * angle.sin());
        }
        remaining -= cap;
    }
    Vec2::ZERO
}
