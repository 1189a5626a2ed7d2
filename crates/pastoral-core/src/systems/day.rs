//! Day cycle system - clock, end-of-day regrowth and crop ripening

use rand::seq::IteratorRandom;
use rand::Rng;

use crate::components::{Sheep, Structure};
use crate::world::WorldState;

use super::reproduction::reproduction_system;

/// Advance the day clock. Returns the new day number on rollover.
pub fn day_cycle_system(state: &mut WorldState, dt: f32) -> Option<u32> {
    let new_day = state.clock.advance(dt)?;
    log::info!("day {} begins", new_day);
    Some(new_day)
}

/// Everything that happens once when the day counter moves.
/// Returns the number of lambs born.
pub fn end_of_day_system(state: &mut WorldState, day: u32) -> usize {
    let born = reproduction_system(state).len();
    regrow_grass(state);
    regrow_wool(state, day);
    born
}

/// Forget a random 10-20% of the eaten grass pixels.
pub fn regrow_grass(state: &mut WorldState) {
    let total = state.eaten_grass.len();
    if total == 0 {
        return;
    }
    let (lo, hi) = (state.config.grass_regrowth_min, state.config.grass_regrowth_max);
    let fraction = if hi > lo { state.rng.gen_range(lo..=hi) } else { lo };
    let count = ((total as f32 * fraction).round() as usize).min(total);
    let regrown: Vec<(i32, i32)> = state
        .eaten_grass
        .iter()
        .copied()
        .choose_multiple(&mut state.rng, count);
    for pixel in regrown {
        state.eaten_grass.remove(&pixel);
    }
    log::debug!("{} of {} grazed pixels regrew", count, total);
}

/// Sheep sheared on an earlier day grow their wool back.
pub fn regrow_wool(state: &mut WorldState, day: u32) {
    for (_, sheep) in state.ecs.query_mut::<&mut Sheep>() {
        if let Some(sheared) = sheep.wool_sheared_on_day {
            if day > sheared {
                sheep.has_wool = true;
                sheep.wool_sheared_on_day = None;
            }
        }
    }
}

/// Ripen barley planted on an earlier day.
pub fn crop_system(state: &mut WorldState) {
    let day = state.clock.current_day;
    for (_, structure) in state.ecs.query_mut::<&mut Structure>() {
        if let Structure::Farm(farm) = structure {
            farm.update_crops(day);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{BarleyFarm, Gender};
    use crate::config::SimConfig;
    use pastoral_logic::geometry::Vec2;

    #[test]
    fn test_grass_regrows_ten_to_twenty_percent() {
        let mut state = WorldState::new(SimConfig::default());
        for i in 0..100 {
            state.eaten_grass.insert((i, 100));
        }
        regrow_grass(&mut state);
        let left = state.eaten_grass.len();
        assert!((80..=90).contains(&left), "{} pixels left", left);
    }

    #[test]
    fn test_wool_regrows_next_day() {
        let mut state = WorldState::new(SimConfig::default());
        let mut sheep = Sheep::new(Vec2::new(300.0, 300.0), Gender::Female, 5.0);
        sheep.has_wool = false;
        sheep.wool_sheared_on_day = Some(2);
        let id = state.spawn_sheep(sheep);
        regrow_wool(&mut state, 2);
        assert!(!state.sheep(id).unwrap().has_wool);
        regrow_wool(&mut state, 3);
        assert!(state.sheep(id).unwrap().has_wool);
    }

    #[test]
    fn test_crops_ripen_after_a_day() {
        let mut state = WorldState::new(SimConfig::default());
        let mut farm = BarleyFarm::new(Vec2::new(300.0, 300.0), 0);
        for i in 0..farm.plots.len() {
            farm.work_plot(i);
        }
        farm.plant_crops(1);
        let id = state.spawn_structure(Structure::Farm(farm));
        crop_system(&mut state);
        let ripe = |state: &WorldState| match &*state.ecs.get::<&Structure>(id).unwrap() {
            Structure::Farm(f) => f.has_crops,
            _ => false,
        };
        assert!(!ripe(&state));
        state.clock.current_day = 2;
        crop_system(&mut state);
        assert!(ripe(&state));
    }
}
