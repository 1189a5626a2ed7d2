//! Downtime: workers with nothing to do idle inside the nearest town hall.

use hecs::Entity;
use pastoral_logic::constants::{distances, speeds};

use crate::collision::Frame;
use crate::components::{Activity, DowntimeTask, Human, Structure};
use crate::systems::movement::{random_point_in, travel_to, walk_direct, Travel};
use crate::world::WorldState;

fn is_town_hall(state: &WorldState, id: Entity) -> bool {
    state
        .ecs
        .get::<&Structure>(id)
        .map(|s| matches!(&*s, Structure::TownHall(_)))
        .unwrap_or(false)
}

pub(super) fn downtime_step(
    state: &mut WorldState,
    frame: &mut Frame,
    id: Entity,
    human: &mut Human,
) {
    let mut task = match &human.activity {
        Activity::Downtime(task) => *task,
        _ => DowntimeTask {
            hall: None,
            arrived: false,
            target: None,
        },
    };

    let hall = match task.hall.filter(|h| is_town_hall(state, *h)) {
        Some(hall) => hall,
        None => {
            task.arrived = false;
            task.target = None;
            task.hall = state.nearest_town_hall(human.center());
            match task.hall {
                Some(hall) => hall,
                None => {
                    human.activity = Activity::Downtime(task);
                    return;
                }
            }
        }
    };
    let Ok(rect) = state.ecs.get::<&Structure>(hall).map(|s| s.bounds()) else {
        return;
    };

    if !task.arrived {
        let door = rect.center();
        travel_to(human, id, door, speeds::HUMAN_SPEED, Some(hall), frame);
        task.arrived = human.center().distance(&door) <= distances::TOWN_HALL_ARRIVAL;
    } else {
        let reached = task
            .target
            .map_or(true, |t| human.center().distance(&t) < distances::WANDER_ARRIVAL);
        if reached {
            task.target = Some(random_point_in(&mut state.rng, &rect, human.size / 2.0));
        }
        if let Some(target) = task.target {
            let travel = walk_direct(
                human,
                id,
                target,
                speeds::HUMAN_WANDER_SPEED,
                Some(hall),
                frame,
                true,
            );
            if matches!(travel, Travel::Blocked | Travel::Crowded) {
                task.target = None;
            }
        }
    }
    human.activity = Activity::Downtime(task);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Gender, TownHall};
    use crate::config::SimConfig;
    use pastoral_logic::geometry::Vec2;

    #[test]
    fn test_idle_worker_settles_inside_hall() {
        let mut state = WorldState::new(SimConfig::default());
        let hall = state.spawn_structure(Structure::TownHall(TownHall::new(
            Vec2::new(500.0, 300.0),
            0,
        )));
        let mut h = Human::new("Ida", Gender::Female, Vec2::ZERO);
        h.set_center(Vec2::new(200.0, 200.0));
        let id = state.spawn_human(h);

        let dt = 1.0 / 60.0;
        for _ in 0..(60 * 8) {
            let mut frame = Frame::new(&state.ecs, Vec::new(), dt);
            let mut human = state.human(id).unwrap();
            downtime_step(&mut state, &mut frame, id, &mut human);
            state.put_human(id, human);
        }

        let human = state.human(id).unwrap();
        let bounds = state.ecs.get::<&Structure>(hall).unwrap().bounds();
        assert!(bounds.contains_point(human.center()));
        assert!(matches!(human.activity, Activity::Downtime(DowntimeTask { arrived: true, .. })));
    }
}
