//! Happiness system - per-human mood from job, home, town hall and hunger

use pastoral_logic::happiness::{update_happiness, HappinessInput};

use crate::components::Human;
use crate::world::WorldState;

pub fn happiness_system(state: &mut WorldState, dt: f32) {
    let town_hall_exists = state.town_hall_exists();
    let rates = state.config.happiness_rates();
    for (_, human) in state.ecs.query_mut::<&mut Human>() {
        let input = HappinessInput {
            is_employed: human.is_employed,
            owns_hut: human.home_hut.is_some(),
            town_hall_exists,
            is_hungry: human.is_hungry,
        };
        human.happiness = update_happiness(&input, &rates, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Gender, Hut, Structure, TownHall};
    use crate::config::SimConfig;
    use pastoral_logic::geometry::Vec2;

    #[test]
    fn test_homeless_unemployed_capped_at_sixty() {
        let mut state = WorldState::new(SimConfig::default());
        state.spawn_structure(Structure::TownHall(TownHall::new(Vec2::new(100.0, 100.0), 0)));
        let id = state.spawn_human(Human::new("Una", Gender::Female, Vec2::new(400.0, 400.0)));
        happiness_system(&mut state, 1.0 / 60.0);
        assert_eq!(state.human(id).unwrap().happiness, 60.0);
    }

    #[test]
    fn test_hunger_drains_over_time() {
        let mut state = WorldState::new(SimConfig::default());
        let mut h = Human::new("Hugo", Gender::Male, Vec2::new(400.0, 400.0));
        h.is_hungry = true;
        let id = state.spawn_human(h);
        happiness_system(&mut state, 5.0);
        assert!((state.human(id).unwrap().happiness - 30.0).abs() < 1e-4);
    }

    #[test]
    fn test_content_worker_is_fully_happy_each_tick() {
        let mut state = WorldState::new(SimConfig::default());
        state.spawn_structure(Structure::TownHall(TownHall::new(Vec2::new(100.0, 100.0), 0)));
        let hut = state.spawn_structure(Structure::Hut(Hut::new(Vec2::new(600.0, 300.0))));
        let mut h = Human::new("Wyn", Gender::Male, Vec2::new(400.0, 400.0));
        h.is_employed = true;
        h.home_hut = Some(hut);
        h.happiness = 50.0;
        let id = state.spawn_human(h);
        happiness_system(&mut state, 1.0 / 60.0);
        assert_eq!(state.human(id).unwrap().happiness, 100.0);
    }
}
