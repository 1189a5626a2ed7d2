//! Build-mode placement validity.
//!
//! A proposed footprint is first clamped into the playable area, then
//! rejected when it touches a live natural resource or an existing
//! building. Touching edges count as a collision. Roads are the one
//! exception: they may sit edge to edge with other roads so networks can be
//! laid without gaps.

use crate::geometry::{play_area, Rect};

/// Why a placement was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlacementError {
    /// The footprint does not fit in the playable area even after clamping.
    OutOfBounds,
    OverlapsResource,
    OverlapsBuilding,
}

impl std::fmt::Display for PlacementError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlacementError::OutOfBounds => write!(f, "footprint does not fit on the map"),
            PlacementError::OverlapsResource => write!(f, "footprint overlaps a resource"),
            PlacementError::OverlapsBuilding => write!(f, "footprint overlaps a building"),
        }
    }
}

impl std::error::Error for PlacementError {}

/// An existing building's footprint as seen by placement.
#[derive(Debug, Clone, Copy)]
pub struct Obstruction {
    pub rect: Rect,
    pub is_road: bool,
}

/// Everything a placement check needs to know about the world.
#[derive(Debug, Clone, Copy)]
pub struct PlacementContext<'a> {
    /// Bounds of live trees, rocks, iron mines and salt deposits.
    pub resources: &'a [Rect],
    /// Footprints of existing buildings (circles as bounding squares,
    /// mills once per part).
    pub buildings: &'a [Obstruction],
}

/// Clamp `footprint` into the playable area.
pub fn clamp_footprint(footprint: Rect) -> Result<Rect, PlacementError> {
    let area = play_area();
    if footprint.w > area.w || footprint.h > area.h {
        return Err(PlacementError::OutOfBounds);
    }
    Ok(footprint.clamped_into(&area))
}

/// Validate a set of footprint parts (one for most buildings, three for a mill).
///
/// Returns the clamping offset applied to the first part; callers move every
/// part by the same offset before spawning.
pub fn validate_placement(
    parts: &[Rect],
    is_road: bool,
    ctx: &PlacementContext<'_>,
) -> Result<(f32, f32), PlacementError> {
    let Some(first) = parts.first() else {
        return Err(PlacementError::OutOfBounds);
    };
    let clamped = clamp_footprint(*first)?;
    let (dx, dy) = (clamped.x - first.x, clamped.y - first.y);
    let area = play_area();

    for part in parts {
        let moved = Rect::new(part.x + dx, part.y + dy, part.w, part.h);
        if !area.contains_rect(&moved) {
            return Err(PlacementError::OutOfBounds);
        }
        if ctx.resources.iter().any(|r| r.intersects(&moved)) {
            return Err(PlacementError::OverlapsResource);
        }
        let hit = ctx.buildings.iter().any(|b| {
            if is_road && b.is_road {
                b.rect.overlaps(&moved)
            } else {
                b.rect.intersects(&moved)
            }
        });
        if hit {
            return Err(PlacementError::OverlapsBuilding);
        }
    }
    Ok((dx, dy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::screen;

    fn building(x: f32, y: f32, w: f32, h: f32) -> Obstruction {
        Obstruction {
            rect: Rect::new(x, y, w, h),
            is_road: false,
        }
    }

    #[test]
    fn test_free_spot_accepted() {
        let ctx = PlacementContext {
            resources: &[],
            buildings: &[building(0.0, 100.0, 50.0, 50.0)],
        };
        let parts = [Rect::new(200.0, 200.0, 80.0, 60.0)];
        assert_eq!(validate_placement(&parts, false, &ctx), Ok((0.0, 0.0)));
    }

    #[test]
    fn test_tangent_building_rejected() {
        let ctx = PlacementContext {
            resources: &[],
            buildings: &[building(100.0, 100.0, 50.0, 50.0)],
        };
        let parts = [Rect::new(150.0, 100.0, 40.0, 40.0)];
        assert_eq!(
            validate_placement(&parts, false, &ctx),
            Err(PlacementError::OverlapsBuilding)
        );
    }

    #[test]
    fn test_resource_overlap_rejected() {
        let resources = [Rect::new(210.0, 210.0, 20.0, 20.0)];
        let ctx = PlacementContext {
            resources: &resources,
            buildings: &[],
        };
        let parts = [Rect::new(200.0, 200.0, 80.0, 60.0)];
        assert_eq!(
            validate_placement(&parts, false, &ctx),
            Err(PlacementError::OverlapsResource)
        );
    }

    #[test]
    fn test_roads_may_touch_roads() {
        let road = Obstruction {
            rect: Rect::new(100.0, 100.0, 60.0, 30.0),
            is_road: true,
        };
        let ctx = PlacementContext {
            resources: &[],
            buildings: &[road],
        };
        let next = [Rect::new(160.0, 100.0, 60.0, 30.0)];
        assert!(validate_placement(&next, true, &ctx).is_ok());
        // a non-road building touching the road is still refused
        assert!(validate_placement(&next, false, &ctx).is_err());
    }

    #[test]
    fn test_clamped_into_play_area() {
        let ctx = PlacementContext {
            resources: &[],
            buildings: &[],
        };
        let parts = [Rect::new(-30.0, 10.0, 80.0, 60.0)];
        let (dx, dy) = validate_placement(&parts, false, &ctx).unwrap();
        assert_eq!(dx, 30.0);
        assert_eq!(dy, screen::PLAY_TOP - 10.0);
    }

    #[test]
    fn test_oversized_rejected() {
        let ctx = PlacementContext {
            resources: &[],
            buildings: &[],
        };
        let parts = [Rect::new(0.0, 0.0, screen::WIDTH + 1.0, 10.0)];
        assert_eq!(
            validate_placement(&parts, false, &ctx),
            Err(PlacementError::OutOfBounds)
        );
    }
}
