//! Reproduction system - lambs are born at the end of each day

use hecs::Entity;
use pastoral_logic::constants::{distances, sizes, timing};
use pastoral_logic::geometry::{clamp_to_play_area, Vec2};
use rand::Rng;

use crate::components::{Gender, Sheep, SheepState};
use crate::world::WorldState;

/// Placement attempts before a lamb is dropped next to another sheep anyway.
const SPAWN_ATTEMPTS: usize = 10;

/// Pair off the sheep outside closed pens. Returns the lambs spawned.
pub fn reproduction_system(state: &mut WorldState) -> Vec<Entity> {
    let pens = state.closed_pen_rects();
    let outside: Vec<(Gender, Vec2)> = state
        .sheep_ids()
        .into_iter()
        .filter_map(|id| state.sheep(id))
        .filter(|s| !pens.iter().any(|pen| pen.contains_point(s.center())))
        .map(|s| (s.gender, s.center()))
        .collect();

    let females = outside.iter().filter(|(g, _)| *g == Gender::Female).count();
    let males = outside.len() - females;
    if females == 0 || males == 0 {
        return Vec::new();
    }

    let mut taken: Vec<Vec2> = state
        .sheep_ids()
        .into_iter()
        .filter_map(|id| state.sheep(id))
        .map(|s| s.center())
        .collect();
    let chance = state.config.reproduction_chance.clamp(0.0, 1.0);
    let mut born = Vec::new();
    for _ in 0..females {
        if !state.rng.gen_bool(chance) {
            continue;
        }
        let gender = if state.rng.gen_bool(0.5) {
            Gender::Male
        } else {
            Gender::Female
        };
        let center = lamb_position(state, &taken);
        let timer = state
            .rng
            .gen_range(timing::GRAZE_TIMER_MIN..=timing::GRAZE_TIMER_MAX);
        let mut lamb = Sheep::new(Vec2::ZERO, gender, timer);
        lamb.set_center(center);
        lamb.state = SheepState::Follow;
        taken.push(lamb.center());
        born.push(state.spawn_sheep(lamb));
    }
    if !born.is_empty() {
        log::info!("{} lambs born on day {}", born.len(), state.clock.current_day);
    }
    born
}

fn lamb_position(state: &mut WorldState, taken: &[Vec2]) -> Vec2 {
    let anchor = state.player.center();
    let offset = distances::REPRODUCTION_SPAWN_OFFSET;
    let mut center = anchor;
    for _ in 0..SPAWN_ATTEMPTS {
        let raw = Vec2::new(
            anchor.x + state.rng.gen_range(-offset..=offset),
            anchor.y + state.rng.gen_range(-offset..=offset),
        );
        let (w, h) = (sizes::SHEEP_WIDTH, sizes::SHEEP_HEIGHT);
        let top_left = clamp_to_play_area(Vec2::new(raw.x - w / 2.0, raw.y - h / 2.0), w, h);
        center = Vec2::new(top_left.x + w / 2.0, top_left.y + h / 2.0);
        if taken
            .iter()
            .all(|p| p.distance(&center) >= sizes::SHEEP_COLLISION_RADIUS)
        {
            break;
        }
    }
    center
}
