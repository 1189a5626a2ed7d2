//! Miller: carry barley from silos to the millstone one grain at a time.

use hecs::Entity;
use pastoral_logic::constants::{distances, speeds, timing};
use pastoral_logic::geometry::Vec2;
use rand::Rng;

use crate::collision::Frame;
use crate::components::{Activity, Human, Mill, MillTask, MillWander, ResourceKind, Structure};
use crate::ledger::Commodity;
use crate::systems::movement::{random_point_in, travel_to, walk_direct, Travel};
use crate::world::{nearest, WorldState};

fn working_mills(state: &WorldState) -> Vec<(Entity, Vec2)> {
    state.structures_where(|s| matches!(s, Structure::Mill(m) if !m.is_at_capacity()))
}

fn mill(state: &WorldState, id: Entity) -> Option<Mill> {
    match &*state.ecs.get::<&Structure>(id).ok()? {
        Structure::Mill(m) if !m.is_at_capacity() => Some(m.clone()),
        _ => None,
    }
}

fn silos_with_barley(state: &WorldState) -> Vec<(Entity, Vec2)> {
    state.structures_where(|s| matches!(s, Structure::Silo(silo) if silo.barley > 0))
}

pub(super) fn miller_available(state: &WorldState, _human: &Human) -> bool {
    !working_mills(state).is_empty()
}

pub(super) fn miller_work(
    state: &mut WorldState,
    frame: &mut Frame,
    id: Entity,
    human: &mut Human,
) {
    let current = match &human.activity {
        Activity::Mill(task) => Some(*task),
        _ => None,
    };
    let mut task = match current.filter(|t| mill(state, t.mill).is_some()) {
        Some(task) => task,
        None => {
            let Some(chosen) = nearest(working_mills(state), human.center()) else {
                return;
            };
            MillTask {
                mill: chosen,
                silo: None,
                wander: None,
            }
        }
    };
    let Some(site) = mill(state, task.mill) else {
        return;
    };

    if human.carrying == Some(ResourceKind::Barley) {
        task.wander = None;
        load_millstone(state, frame, id, human, &mut task, &site);
    } else if let Some(silo) = pick_silo(state, human, task.silo) {
        task.wander = None;
        task.silo = Some(silo);
        fetch_barley(state, frame, id, human, &mut task, silo);
    } else {
        task.silo = None;
        wander_in_mill(state, frame, id, human, &mut task, &site);
    }
    human.activity = Activity::Mill(task);
}

fn pick_silo(state: &WorldState, human: &Human, current: Option<Entity>) -> Option<Entity> {
    let stocked = silos_with_barley(state);
    current
        .filter(|s| stocked.iter().any(|(e, _)| e == s))
        .or_else(|| nearest(stocked, human.center()))
}

fn load_millstone(
    state: &mut WorldState,
    frame: &mut Frame,
    id: Entity,
    human: &mut Human,
    task: &mut MillTask,
    site: &Mill,
) {
    let stone = site.millstone.center;
    if human.center().distance(&stone) > distances::MILL_ARRIVAL {
        travel_to(human, id, stone, speeds::HUMAN_SPEED, Some(task.mill), frame);
        if human.center().distance(&stone) > distances::MILL_ARRIVAL {
            return;
        }
    }
    if let Ok(mut structure) = state.ecs.get::<&mut Structure>(task.mill) {
        if let Structure::Mill(m) = &mut *structure {
            m.add_barley();
        }
    }
    human.carrying = None;
}

fn fetch_barley(
    state: &mut WorldState,
    frame: &mut Frame,
    id: Entity,
    human: &mut Human,
    task: &mut MillTask,
    silo: Entity,
) {
    let Some(center) = state.structure_center(silo) else {
        task.silo = None;
        return;
    };
    if human.center().distance(&center) > distances::MILL_ARRIVAL {
        travel_to(human, id, center, speeds::HUMAN_SPEED, Some(silo), frame);
        if human.center().distance(&center) > distances::MILL_ARRIVAL {
            return;
        }
    }
    let taken = match state.ecs.get::<&mut Structure>(silo) {
        Ok(mut structure) => match &mut *structure {
            Structure::Silo(s) => s.take_barley(),
            _ => false,
        },
        Err(_) => false,
    };
    if taken {
        state.ledger.debit(Commodity::Barley, 1);
        human.carrying = Some(ResourceKind::Barley);
        task.silo = None;
    }
}

/// Pace around inside the mill at half speed while there is nothing to carry.
fn wander_in_mill(
    state: &mut WorldState,
    frame: &mut Frame,
    id: Entity,
    human: &mut Human,
    task: &mut MillTask,
    site: &Mill,
) {
    let mut wander = match task.wander {
        Some(w) if w.remaining > 0.0 => w,
        _ => {
            let target = random_point_in(&mut state.rng, &site.rect, human.size / 2.0);
            let remaining = state
                .rng
                .gen_range(timing::MILL_WANDER_MIN..=timing::MILL_WANDER_MAX);
            MillWander { target, remaining }
        }
    };
    wander.remaining -= frame.dt;
    let travel = walk_direct(
        human,
        id,
        wander.target,
        speeds::HUMAN_SPEED / 2.0,
        Some(task.mill),
        frame,
        true,
    );
    if travel == Travel::Blocked {
        wander.remaining = 0.0;
    }
    task.wander = Some(wander);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Gender, HumanState, Job, Silo};
    use crate::config::SimConfig;
    use pastoral_logic::constants::capacities;

    #[test]
    fn test_miller_moves_barley_to_millstone() {
        let mut state = WorldState::new(SimConfig::default());
        let mut silo = Silo::new(Vec2::new(300.0, 300.0));
        silo.barley = 2;
        let silo_id = state.spawn_structure(Structure::Silo(silo));
        state.ledger.credit(Commodity::Barley, 2);
        let mill_id = state.spawn_structure(Structure::Mill(Mill::new(Vec2::new(500.0, 300.0), 0)));
        let mut h = Human::new("Milo", Gender::Male, Vec2::ZERO);
        h.set_center(Vec2::new(400.0, 360.0));
        h.job = Some(Job::Miller);
        h.is_employed = true;
        h.state = HumanState::Employed;
        let id = state.spawn_human(h);

        let dt = 1.0 / 60.0;
        for _ in 0..(60 * 6) {
            let mut frame = Frame::new(&state.ecs, Vec::new(), dt);
            let mut human = state.human(id).unwrap();
            miller_work(&mut state, &mut frame, id, &mut human);
            state.put_human(id, human);
        }

        let grains = match &*state.ecs.get::<&Structure>(mill_id).unwrap() {
            Structure::Mill(m) => m.processing_barley(),
            _ => 0,
        };
        let left = match &*state.ecs.get::<&Structure>(silo_id).unwrap() {
            Structure::Silo(s) => s.barley,
            _ => 99,
        };
        assert_eq!(left, 0);
        assert_eq!(grains, 2);
        assert_eq!(state.ledger.get(Commodity::Barley), 0);
        assert!(matches!(
            state.human(id).unwrap().activity,
            Activity::Mill(MillTask { wander: Some(_), .. })
        ));
    }

    #[test]
    fn test_full_mill_means_no_work() {
        let mut state = WorldState::new(SimConfig::default());
        let mut m = Mill::new(Vec2::new(500.0, 300.0), 0);
        m.flour = capacities::MILL_FLOUR;
        m.malt = capacities::MILL_MALT;
        state.spawn_structure(Structure::Mill(m));
        let h = Human::new("Milo", Gender::Male, Vec2::new(100.0, 100.0));
        assert!(!miller_available(&state, &h));
    }
}
