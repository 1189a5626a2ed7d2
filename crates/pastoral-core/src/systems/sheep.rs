//! Sheep system - following the player and grazing
//!
//! Following sheep chase the player (split by gender when asked to).
//! Staying sheep graze: every few seconds they pick a fresh patch of grass
//! near the herd, walk to it and eat it.

use hecs::Entity;
use pastoral_logic::constants::{distances, grazing, sizes, speeds, timing};
use pastoral_logic::geometry::{clamp_to_play_area, Rect, Vec2};
use pastoral_logic::grazing::{herd_candidate, is_valid_graze_target};
use rand::Rng;

use crate::collision::Frame;
use crate::components::{Gender, Sheep, SheepState};
use crate::world::WorldState;

pub fn sheep_system(state: &mut WorldState, frame: &mut Frame) {
    let ids = state.sheep_ids();
    let centroid = herd_centroid(state);
    let pens = state.closed_pen_rects();
    for id in ids {
        let Some(mut sheep) = state.sheep(id) else {
            continue;
        };
        match sheep.state {
            SheepState::Follow | SheepState::GenderSeparate => {
                follow_player(state, frame, id, &mut sheep)
            }
            SheepState::Stay => {
                if let Some(centroid) = centroid {
                    graze(state, frame, id, &mut sheep, centroid, &pens);
                }
            }
        }
        state.put_sheep(id, sheep);
    }
}

/// Center of every grazing sheep.
fn herd_centroid(state: &WorldState) -> Option<Vec2> {
    let (sum, count) = state
        .ecs
        .query::<&Sheep>()
        .iter()
        .filter(|(_, s)| s.state == SheepState::Stay)
        .fold((Vec2::ZERO, 0usize), |(sum, n), (_, s)| (sum + s.center(), n + 1));
    (count > 0).then(|| sum * (1.0 / count as f32))
}

fn clamp_sheep(sheep: &Sheep, center: Vec2) -> Vec2 {
    let top_left = clamp_to_play_area(
        Vec2::new(center.x - sheep.width / 2.0, center.y - sheep.height / 2.0),
        sheep.width,
        sheep.height,
    );
    Vec2::new(top_left.x + sheep.width / 2.0, top_left.y + sheep.height / 2.0)
}

/// Try one move; returns false if the sheep made no progress.
///
/// A structure in the way, another sheep in the way and a move pinned by
/// the play-area edge all count as no progress.
fn try_move(frame: &mut Frame, id: Entity, sheep: &mut Sheep, to: Vec2) -> bool {
    let from = sheep.center();
    let to = clamp_sheep(sheep, to);
    if to == from {
        return false;
    }
    let body: Rect = sheep.body_at(to);
    if frame.colliders.move_blocked(&sheep.rect(), &body, &[]) {
        return false;
    }
    if frame.sheep.conflicts(id, from, to) {
        return false;
    }
    sheep.set_center(to);
    frame.sheep.update(id, to);
    true
}

fn follow_player(state: &WorldState, frame: &mut Frame, id: Entity, sheep: &mut Sheep) {
    let mut goal = state.player.center();
    if sheep.state == SheepState::GenderSeparate {
        goal.x += match sheep.gender {
            Gender::Male => distances::GENDER_SEPARATION_DISTANCE,
            Gender::Female => -distances::GENDER_SEPARATION_DISTANCE,
        };
    }
    let pos = sheep.center();
    if pos.distance(&goal) <= distances::SHEEP_MIN_FOLLOW_DISTANCE {
        return;
    }
    let step = frame.step_length(speeds::SHEEP_SPEED);
    if step <= 0.0 {
        return;
    }
    try_move(frame, id, sheep, pos.step_toward(&goal, step));
}

fn graze_timer(state: &mut WorldState) -> f32 {
    state
        .rng
        .gen_range(timing::GRAZE_TIMER_MIN..=timing::GRAZE_TIMER_MAX)
}

fn graze(
    state: &mut WorldState,
    frame: &mut Frame,
    id: Entity,
    sheep: &mut Sheep,
    centroid: Vec2,
    pens: &[Rect],
) {
    if frame.dt <= 0.0 {
        return;
    }
    let Some(target) = sheep.graze_target else {
        sheep.graze_timer -= frame.dt;
        if sheep.graze_timer <= 0.0 {
            sheep.graze_target = pick_graze_target(state, sheep.center(), centroid, pens);
            if sheep.graze_target.is_none() {
                sheep.graze_timer = graze_timer(state);
            }
        }
        return;
    };

    // probe in small steps so thin pen walls cannot be skipped over
    let total = frame.step_length(speeds::SHEEP_GRAZE_SPEED);
    let probes = (total * grazing::PROBES_PER_PIXEL).ceil().max(1.0) as usize;
    let step = total / probes as f32;
    for _ in 0..probes {
        if sheep.center().distance(&target) < 1.0 {
            break;
        }
        let next = sheep.center().step_toward(&target, step);
        if !try_move(frame, id, sheep, next) {
            sheep.graze_target = None;
            sheep.graze_timer = graze_timer(state);
            return;
        }
    }
    if sheep.center().distance(&target) < 1.0 {
        state.eaten_grass.insert(target.pixel());
        sheep.graze_target = None;
        sheep.graze_timer = graze_timer(state);
    }
}

/// Whether a sheep's center can sit on `p` with its whole body on the map.
fn body_fits(p: Vec2) -> bool {
    let (w, h) = (sizes::SHEEP_WIDTH, sizes::SHEEP_HEIGHT);
    clamp_to_play_area(Vec2::new(p.x - w / 2.0, p.y - h / 2.0), w, h)
        == Vec2::new(p.x - w / 2.0, p.y - h / 2.0)
}

/// Random uneaten pixel near the herd that can be reached without crossing
/// a closed pen's wall.
pub fn pick_graze_target(
    state: &mut WorldState,
    from: Vec2,
    centroid: Vec2,
    pens: &[Rect],
) -> Option<Vec2> {
    for _ in 0..grazing::MAX_TARGET_ATTEMPTS {
        let (u, v): (f32, f32) = (state.rng.gen(), state.rng.gen());
        let candidate = herd_candidate(centroid, u, v);
        if !body_fits(candidate) || state.eaten_grass.contains(&candidate.pixel()) {
            continue;
        }
        if is_valid_graze_target(from, candidate, pens) {
            return Some(candidate);
        }
    }
    None
}
