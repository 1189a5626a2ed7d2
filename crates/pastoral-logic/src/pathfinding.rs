//! Road-biased local pathfinding.
//!
//! Roads are 30×60 rectangles that form an implicit graph: two roads are
//! connected when their centers lie within [`CONNECTION_DISTANCE`]. Instead
//! of a full search the pathfinder makes one greedy decision per frame and
//! returns a single sub-target for the agent to walk toward.
//!
//! The caller owns the "previous road" hint and passes it back in every
//! frame; [`refine_road_hint`] decides when the hint should move on. The
//! hint keeps agents from flipping between two roads at L-intersections.

use crate::geometry::{sample_segment, Rect, Vec2};

/// Stable road identifier supplied by the caller.
pub type RoadId = u64;

/// Tolerance for "standing on" a road.
pub const ON_ROAD_TOLERANCE: f32 = 5.0;
/// Larger tolerance applied to the hinted road so agents do not drop off it at seams.
pub const HINT_TOLERANCE: f32 = 15.0;
/// Distance from a road's far end at which the next road is chosen.
pub const END_PROXIMITY: f32 = 20.0;
/// Center distance under which two roads count as connected.
pub const CONNECTION_DISTANCE: f32 = 80.0;
/// Score bonus for a connected road that keeps the current axis.
pub const SAME_AXIS_BONUS: f32 = 50.0;
/// Obstacles within this distance of the goal are ignored by line-of-sight checks.
pub const GOAL_RELAXATION: f32 = 50.0;
/// Points sampled along a segment by line-of-sight checks.
pub const LINE_SAMPLES: usize = 21;
/// How far ahead along a road the sub-target is placed.
pub const ROAD_LOOKAHEAD: f32 = 30.0;
/// Fraction of the minor-axis offset pulled back to the centerline each frame.
pub const CENTERLINE_PULL: f32 = 0.5;

/// Main axis of a road segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// A road segment as seen by the pathfinder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadSegment {
    pub id: RoadId,
    pub rect: Rect,
}

impl RoadSegment {
    pub fn new(id: RoadId, rect: Rect) -> Self {
        Self { id, rect }
    }

    pub fn axis(&self) -> Axis {
        if self.rect.is_landscape() {
            Axis::Horizontal
        } else {
            Axis::Vertical
        }
    }

    pub fn center(&self) -> Vec2 {
        self.rect.center()
    }

    fn is_under(&self, p: Vec2, tolerance: f32) -> bool {
        self.rect.inflate(tolerance).contains_point(p)
    }
}

/// One pathfinding request.
#[derive(Debug, Clone, Copy)]
pub struct PathQuery {
    pub position: Vec2,
    pub goal: Vec2,
    pub previous_road: Option<RoadId>,
}

/// How a sub-target was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Walk straight at the goal.
    Direct,
    /// Keep following the current road toward its far end.
    AlongRoad,
    /// Head for the center of another road.
    ToRoad(RoadId),
    /// Nothing reachable this frame; stay put.
    Stalled,
}

/// Result of [`next_waypoint`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathStep {
    pub target: Vec2,
    /// Road the agent is currently standing on, if any.
    pub on_road: Option<RoadId>,
    pub kind: StepKind,
}

impl PathStep {
    pub fn is_stalled(&self) -> bool {
        self.kind == StepKind::Stalled
    }
}

/// Whether the segment `from → to` is free of obstacles.
///
/// Samples [`LINE_SAMPLES`] points and skips those within
/// [`GOAL_RELAXATION`] of `goal`, so agents can walk up to buildings.
pub fn line_is_clear(from: Vec2, to: Vec2, goal: Vec2, blocked: &dyn Fn(Vec2) -> bool) -> bool {
    sample_segment(from, to, LINE_SAMPLES)
        .filter(|p| p.distance(&goal) > GOAL_RELAXATION)
        .all(|p| !blocked(p))
}

/// Road currently under `position`, preferring the hinted road.
pub fn road_under<'a>(
    position: Vec2,
    roads: &'a [RoadSegment],
    hint: Option<RoadId>,
) -> Option<&'a RoadSegment> {
    if let Some(hint_id) = hint {
        if let Some(road) = roads
            .iter()
            .find(|r| r.id == hint_id && r.is_under(position, HINT_TOLERANCE))
        {
            return Some(road);
        }
    }
    roads
        .iter()
        .filter(|r| r.is_under(position, ON_ROAD_TOLERANCE))
        .min_by(|a, b| {
            a.center()
                .distance_squared(&position)
                .total_cmp(&b.center().distance_squared(&position))
        })
}

/// Pick the sub-target an agent at `query.position` should walk toward this frame.
///
/// `blocked` reports whether a point lies inside a colliding structure.
pub fn next_waypoint(
    query: &PathQuery,
    roads: &[RoadSegment],
    blocked: &dyn Fn(Vec2) -> bool,
) -> PathStep {
    let pos = query.position;
    let goal = query.goal;

    if let Some(current) = road_under(pos, roads, query.previous_road) {
        return follow_road(query, current, roads, blocked);
    }

    let direct_clear = line_is_clear(pos, goal, goal, blocked);
    let direct = PathStep {
        target: goal,
        on_road: None,
        kind: StepKind::Direct,
    };
    let stalled = PathStep {
        target: pos,
        on_road: None,
        kind: StepKind::Stalled,
    };

    let Some(nearest) = roads.iter().min_by(|a, b| {
        a.rect
            .distance_to_point(pos)
            .total_cmp(&b.rect.distance_to_point(pos))
    }) else {
        return if direct_clear { direct } else { stalled };
    };

    let goal_distance = pos.distance(&goal);
    let road_distance = nearest.rect.distance_to_point(pos);
    // An agent that walked off the hinted road toward a visible goal keeps
    // going instead of being pulled back onto that road.
    let just_left = query.previous_road == Some(nearest.id);
    if direct_clear && (goal_distance < road_distance || just_left) {
        return direct;
    }

    if line_is_clear(pos, nearest.center(), goal, blocked) {
        PathStep {
            target: nearest.center(),
            on_road: None,
            kind: StepKind::ToRoad(nearest.id),
        }
    } else {
        stalled
    }
}

fn follow_road(
    query: &PathQuery,
    current: &RoadSegment,
    roads: &[RoadSegment],
    blocked: &dyn Fn(Vec2) -> bool,
) -> PathStep {
    let pos = query.position;
    let goal = query.goal;
    let on_road = Some(current.id);

    if line_is_clear(pos, goal, goal, blocked) {
        return PathStep {
            target: goal,
            on_road,
            kind: StepKind::Direct,
        };
    }

    let rect = current.rect;
    let center = current.center();
    let (near_end, along) = match current.axis() {
        Axis::Horizontal => {
            let forward = goal.x >= pos.x;
            let end = if forward { rect.right() } else { rect.left() };
            let ahead = if forward {
                (pos.x + ROAD_LOOKAHEAD).min(end)
            } else {
                (pos.x - ROAD_LOOKAHEAD).max(end)
            };
            let pulled_y = pos.y + (center.y - pos.y) * CENTERLINE_PULL;
            ((end - pos.x).abs() <= END_PROXIMITY, Vec2::new(ahead, pulled_y))
        }
        Axis::Vertical => {
            let forward = goal.y >= pos.y;
            let end = if forward { rect.bottom() } else { rect.top() };
            let ahead = if forward {
                (pos.y + ROAD_LOOKAHEAD).min(end)
            } else {
                (pos.y - ROAD_LOOKAHEAD).max(end)
            };
            let pulled_x = pos.x + (center.x - pos.x) * CENTERLINE_PULL;
            ((end - pos.y).abs() <= END_PROXIMITY, Vec2::new(pulled_x, ahead))
        }
    };

    if !near_end {
        return PathStep {
            target: along,
            on_road,
            kind: StepKind::AlongRoad,
        };
    }

    let axis = current.axis();
    let next = roads
        .iter()
        .filter(|r| r.id != current.id && Some(r.id) != query.previous_road)
        .filter(|r| r.center().distance(&center) <= CONNECTION_DISTANCE)
        .map(|r| {
            let bonus = if r.axis() == axis { SAME_AXIS_BONUS } else { 0.0 };
            (r, r.center().distance(&goal) - bonus)
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(r, _)| r);

    match next {
        Some(road) => PathStep {
            target: road.center(),
            on_road,
            kind: StepKind::ToRoad(road.id),
        },
        None => PathStep {
            target: pos,
            on_road,
            kind: StepKind::Stalled,
        },
    }
}

/// Decide the road hint to carry into the next frame.
///
/// The hint only moves to a newly reached road when that road's center is
/// closer to the goal than the hinted one; stepping off all roads keeps the
/// old hint so the agent is not pulled straight back onto it.
pub fn refine_road_hint(
    previous: Option<RoadId>,
    step: &PathStep,
    roads: &[RoadSegment],
    goal: Vec2,
) -> Option<RoadId> {
    let Some(current) = step.on_road else {
        return previous.filter(|id| roads.iter().any(|r| r.id == *id));
    };
    let Some(prev_id) = previous else {
        return Some(current);
    };
    if prev_id == current {
        return Some(current);
    }
    let center_of = |id: RoadId| roads.iter().find(|r| r.id == id).map(|r| r.center());
    match (center_of(prev_id), center_of(current)) {
        (Some(prev_center), Some(cur_center)) => {
            if cur_center.distance(&goal) < prev_center.distance(&goal) {
                Some(current)
            } else {
                Some(prev_id)
            }
        }
        (None, Some(_)) => Some(current),
        _ => None,
    }
}
