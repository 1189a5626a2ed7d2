//! Shearer: clip the nearest woolly sheep and take the wool to a wool shed.

use hecs::Entity;
use pastoral_logic::constants::{distances, speeds, timing};
use pastoral_logic::geometry::Vec2;
use pastoral_logic::grazing::same_side;

use crate::collision::Frame;
use crate::components::{Activity, Human, ResourceKind, Sheep, WorkTask, YardKind};
use crate::systems::movement::{travel_to, Travel};
use crate::world::{nearest, WorldState};

use super::gathering::{deliver_to_yard, Delivery};

/// Woolly sheep the shearer at `from` can reach without crossing a closed pen wall.
fn woolly_sheep(state: &WorldState, from: Vec2) -> Vec<(Entity, Vec2)> {
    let pens = state.closed_pen_rects();
    let mut found: Vec<_> = state
        .ecs
        .query::<&Sheep>()
        .iter()
        .filter(|(_, s)| s.has_wool)
        .map(|(e, s)| (e, s.center()))
        .filter(|(_, at)| pens.iter().all(|pen| same_side(pen, from, *at)))
        .collect();
    found.sort_by_key(|(e, _)| e.to_bits());
    found
}

fn has_wool(state: &WorldState, sheep: Entity) -> bool {
    state
        .ecs
        .get::<&Sheep>(sheep)
        .map(|s| s.has_wool)
        .unwrap_or(false)
}

pub(super) fn shearer_available(state: &WorldState, human: &Human) -> bool {
    if state.yards_with_space(YardKind::Wool).is_empty() {
        return false;
    }
    human.carrying.is_some() || !woolly_sheep(state, human.center()).is_empty()
}

pub(super) fn shearer_work(
    state: &mut WorldState,
    frame: &mut Frame,
    id: Entity,
    human: &mut Human,
) {
    let mut task = match &human.activity {
        Activity::Gather(task) => *task,
        _ => WorkTask {
            target: None,
            building: None,
            resource: ResourceKind::Wool,
            stand: human.center(),
            timer: 0.0,
        },
    };

    if human.carrying.is_some() {
        if let Delivery::Refused(issue) = deliver_to_yard(state, frame, id, human, &mut task) {
            state.messages.report(issue);
        }
    } else if let Some(sheep) = task.target.filter(|s| has_wool(state, *s)) {
        shear(state, frame, id, human, &mut task, sheep);
    } else {
        // no radius cap: woolly sheep are scarce
        task.target = nearest(woolly_sheep(state, human.center()), human.center());
        task.timer = 0.0;
    }
    human.activity = Activity::Gather(task);
}

fn shear(
    state: &mut WorldState,
    frame: &mut Frame,
    id: Entity,
    human: &mut Human,
    task: &mut WorkTask,
    sheep: Entity,
) {
    let Some(at) = state.sheep(sheep).map(|s| s.center()) else {
        task.target = None;
        return;
    };
    task.stand = at;
    if human.center().distance(&at) > distances::SHEAR_REACH {
        task.timer = 0.0;
        let travel = travel_to(human, id, at, speeds::HUMAN_SPEED, None, frame);
        if matches!(travel, Travel::Blocked | Travel::Stalled) {
            task.target = None;
        }
        return;
    }

    task.timer += frame.dt;
    if task.timer < timing::SHEAR_TIME {
        return;
    }
    let day = state.clock.current_day;
    if let Ok(mut s) = state.ecs.get::<&mut Sheep>(sheep) {
        s.has_wool = false;
        s.wool_sheared_on_day = Some(day);
    }
    log::debug!("{} sheared a sheep on day {}", human.name, day);
    human.carrying = Some(ResourceKind::Wool);
    task.resource = ResourceKind::Wool;
    task.target = None;
    task.timer = 0.0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Gender, HumanState, Job, Pen, StorageYard, Structure};
    use crate::config::SimConfig;

    #[test]
    fn test_shearer_clips_and_stores_wool() {
        let mut state = WorldState::new(SimConfig::default());
        let shed = state.spawn_structure(Structure::Storage(StorageYard::new(
            YardKind::Wool,
            Vec2::new(100.0, 300.0),
            0,
        )));
        let sheep = state.spawn_sheep(Sheep::new(Vec2::new(290.0, 303.0), Gender::Female, 5.0));
        let mut h = Human::new("Sam", Gender::Male, Vec2::ZERO);
        h.set_center(Vec2::new(300.0, 340.0));
        h.job = Some(Job::Shearer);
        h.is_employed = true;
        h.state = HumanState::Employed;
        let id = state.spawn_human(h);

        assert!(shearer_available(&state, &state.human(id).unwrap()));
        let dt = 1.0 / 60.0;
        for _ in 0..(60 * 10) {
            let mut frame = Frame::new(&state.ecs, state.road_segments(), dt);
            let mut human = state.human(id).unwrap();
            shearer_work(&mut state, &mut frame, id, &mut human);
            state.put_human(id, human);
        }

        let s = state.sheep(sheep).unwrap();
        assert!(!s.has_wool);
        assert_eq!(s.wool_sheared_on_day, Some(1));
        let stored = match &*state.ecs.get::<&Structure>(shed).unwrap() {
            Structure::Storage(y) => y.inventory,
            _ => 0,
        };
        assert_eq!(stored, 1);
        assert_eq!(state.human(id).unwrap().carrying, None);
    }

    #[test]
    fn test_penned_sheep_not_a_shearing_target() {
        let mut state = WorldState::new(SimConfig::default());
        state.spawn_structure(Structure::Storage(StorageYard::new(
            YardKind::Wool,
            Vec2::new(100.0, 300.0),
            0,
        )));
        let pen = state.spawn_structure(Structure::Pen(Pen::new(Vec2::new(300.0, 300.0), 0)));
        state.spawn_sheep(Sheep::new(Vec2::new(365.0, 368.0), Gender::Female, 5.0));
        let mut h = Human::new("Sam", Gender::Male, Vec2::ZERO);
        h.set_center(Vec2::new(600.0, 400.0));
        h.job = Some(Job::Shearer);
        h.is_employed = true;
        h.state = HumanState::Employed;
        let id = state.spawn_human(h);

        let worker = state.human(id).unwrap();
        assert!(!shearer_available(&state, &worker));

        let mut frame = Frame::new(&state.ecs, state.road_segments(), 1.0 / 60.0);
        let mut human = state.human(id).unwrap();
        shearer_work(&mut state, &mut frame, id, &mut human);
        assert!(matches!(human.activity, Activity::Gather(WorkTask { target: None, .. })));

        if let Ok(mut s) = state.ecs.get::<&mut Structure>(pen) {
            if let Structure::Pen(p) = &mut *s {
                p.collision_enabled = false;
            }
        }
        assert!(shearer_available(&state, &worker));
    }
}
