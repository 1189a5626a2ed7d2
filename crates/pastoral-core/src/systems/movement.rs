//! Human movement helpers shared by the behavior and employment systems.
//!
//! Moves are proposed, clamped to the playable area, then checked against
//! structures and other humans. A refused move leaves the human where it was.

use hecs::Entity;
use pastoral_logic::geometry::{clamp_to_play_area, Rect, Vec2};
use pastoral_logic::pathfinding::{next_waypoint, refine_road_hint, PathQuery};
use rand::Rng;

use crate::collision::Frame;
use crate::components::Human;

/// Outcome of one movement attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Travel {
    Moved,
    /// Already at the goal, or no time passed.
    Still,
    /// A structure is in the way.
    Blocked,
    /// Other humans are in the way.
    Crowded,
    /// The pathfinder found no way forward.
    Stalled,
}

/// Walk toward `goal` through the road-biased pathfinder.
///
/// `target` is the structure being walked to; it never blocks its own visitor.
pub fn travel_to(
    human: &mut Human,
    id: Entity,
    goal: Vec2,
    speed: f32,
    target: Option<Entity>,
    frame: &mut Frame,
) -> Travel {
    let pos = human.center();
    if frame.dt <= 0.0 || pos == goal {
        return Travel::Still;
    }

    let mut ignore = frame.colliders.containing(pos);
    ignore.extend(target);
    let colliders = &frame.colliders;
    let blocked = |p: Vec2| colliders.point_blocked(p, &ignore);
    let query = PathQuery {
        position: pos,
        goal,
        previous_road: human.road_hint,
    };
    let step = next_waypoint(&query, &frame.roads, &blocked);
    human.road_hint = refine_road_hint(human.road_hint, &step, &frame.roads, goal);
    if step.is_stalled() {
        return Travel::Stalled;
    }

    let len = frame.human_step(speed, pos);
    let to = pos.step_toward(&step.target, len);
    attempt(human, id, to, target, frame, true)
}

/// Walk straight at `goal`, without the pathfinder.
///
/// With `push` set, a human blocked by another is nudged away from them
/// instead of standing still.
pub fn walk_direct(
    human: &mut Human,
    id: Entity,
    goal: Vec2,
    speed: f32,
    target: Option<Entity>,
    frame: &mut Frame,
    push: bool,
) -> Travel {
    let pos = human.center();
    if frame.dt <= 0.0 || pos == goal {
        return Travel::Still;
    }
    let len = frame.human_step(speed, pos);
    let to = pos.step_toward(&goal, len);
    let result = attempt(human, id, to, target, frame, false);
    if result != Travel::Crowded || !push {
        return result;
    }
    let Some(neighbor) = frame.humans.nearest_neighbor(id, to) else {
        return result;
    };
    let away = (pos - neighbor).normalize();
    if away == Vec2::ZERO {
        return result;
    }
    attempt(human, id, pos + away * (len * 0.5), target, frame, false)
}

fn attempt(
    human: &mut Human,
    id: Entity,
    to: Vec2,
    target: Option<Entity>,
    frame: &mut Frame,
    sidestep: bool,
) -> Travel {
    let from = human.center();
    let ignore: Vec<Entity> = target.into_iter().collect();
    let candidate = clamp_center(human.size, to);
    if frame.colliders.move_blocked(&human.rect(), &human.body_at(candidate), &ignore) {
        return Travel::Blocked;
    }
    if !frame.humans.conflicts(id, from, candidate) {
        commit(human, id, candidate, frame);
        return Travel::Moved;
    }
    if !sidestep {
        return Travel::Crowded;
    }

    let dir = candidate - from;
    for side in [Vec2::new(-dir.y, dir.x), Vec2::new(dir.y, -dir.x)] {
        let alt = clamp_center(human.size, from + side);
        if alt != from
            && !frame.colliders.move_blocked(&human.rect(), &human.body_at(alt), &ignore)
            && !frame.humans.conflicts(id, from, alt)
        {
            commit(human, id, alt, frame);
            return Travel::Moved;
        }
    }
    Travel::Crowded
}

/// Nearest center that keeps a `size`-square body inside the playable area.
pub fn clamp_center(size: f32, center: Vec2) -> Vec2 {
    let half = size / 2.0;
    let top_left = clamp_to_play_area(Vec2::new(center.x - half, center.y - half), size, size);
    Vec2::new(top_left.x + half, top_left.y + half)
}

/// Uniform point inside `rect`, kept `margin` away from its edges.
pub fn random_point_in(rng: &mut impl Rng, rect: &Rect, margin: f32) -> Vec2 {
    let mut span = |lo: f32, hi: f32| {
        if hi > lo {
            rng.gen_range(lo..hi)
        } else {
            (lo + hi) / 2.0
        }
    };
    let x = span(rect.left() + margin, rect.right() - margin);
    let y = span(rect.top() + margin, rect.bottom() - margin);
    Vec2::new(x, y)
}

fn commit(human: &mut Human, id: Entity, center: Vec2, frame: &mut Frame) {
    human.set_center(center);
    frame.humans.update(id, center);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{Colliders, Crowd, Frame};
    use crate::components::{Gender, Hut, Structure};
    use hecs::World;
    use pastoral_logic::constants::sizes;

    fn frame(world: &World, dt: f32) -> Frame {
        Frame::new(world, Vec::new(), dt)
    }

    #[test]
    fn test_zero_dt_moves_nothing() {
        let mut world = World::new();
        let h = Human::new("Ada", Gender::Female, Vec2::new(100.0, 100.0));
        let id = world.spawn((h.clone(),));
        let mut f = frame(&world, 0.0);
        let mut moved = h.clone();
        let travel = travel_to(&mut moved, id, Vec2::new(500.0, 500.0), 5.0, None, &mut f);
        assert_eq!(travel, Travel::Still);
        assert_eq!(moved, h);
    }

    #[test]
    fn test_step_length_scales_with_dt() {
        let mut world = World::new();
        let mut h = Human::new("Ada", Gender::Female, Vec2::new(100.0, 100.0));
        let id = world.spawn((h.clone(),));
        let mut f = frame(&world, 1.0 / 60.0);
        let start = h.center();
        let travel = travel_to(&mut h, id, Vec2::new(500.0, start.y), 5.0, None, &mut f);
        assert_eq!(travel, Travel::Moved);
        assert!((h.center().x - start.x - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_target_structure_does_not_block_its_visitor() {
        let mut world = World::new();
        let hut = world.spawn((Structure::Hut(Hut::new(Vec2::new(300.0, 300.0))),));
        let mut h = Human::new("Ada", Gender::Female, Vec2::ZERO);
        h.set_center(Vec2::new(300.0, 330.0));
        let id = world.spawn((h.clone(),));
        let mut f = frame(&world, 1.0 / 60.0);
        for _ in 0..20 {
            travel_to(&mut h, id, Vec2::new(300.0, 300.0), 5.0, Some(hut), &mut f);
        }
        assert!(h.center().distance(&Vec2::new(300.0, 300.0)) < 5.0);
    }

    #[test]
    fn test_humans_keep_their_distance() {
        let mut world = World::new();
        let mut a = Human::new("Ada", Gender::Female, Vec2::ZERO);
        a.set_center(Vec2::new(200.0, 200.0));
        let mut b = Human::new("Bob", Gender::Male, Vec2::ZERO);
        b.set_center(Vec2::new(240.0, 200.0));
        let a_id = world.spawn((a.clone(),));
        world.spawn((b.clone(),));
        let mut f = Frame {
            dt: 1.0 / 60.0,
            colliders: Colliders::default(),
            roads: Vec::new(),
            humans: Crowd::humans(&world),
            sheep: Crowd::sheep(&world),
        };
        for _ in 0..30 {
            walk_direct(&mut a, a_id, Vec2::new(240.0, 200.0), 2.0, None, &mut f, true);
        }
        assert!(a.center().distance(&b.center()) >= sizes::HUMAN_COLLISION_RADIUS);
    }
}
