//! Human behavior system - hut claims, day/night transitions, wandering,
//! sleeping and following the player

use hecs::Entity;
use pastoral_logic::constants::{distances, speeds, timing};
use pastoral_logic::geometry::{play_area, Vec2};
use rand::Rng;

use crate::collision::Frame;
use crate::components::{Activity, Human, HumanState, SleepTask, Structure, WanderPhase};
use crate::systems::movement::{random_point_in, travel_to, walk_direct, Travel};
use crate::world::{nearest_within, WorldState};

pub fn behavior_system(state: &mut WorldState, frame: &mut Frame) {
    claim_huts(state);
    let dark = state.clock.is_dark();
    for id in state.human_ids() {
        let Some(mut human) = state.human(id) else {
            continue;
        };
        day_night_transition(state, &mut human, dark);
        match human.state {
            HumanState::Wander => wander_step(state, frame, id, &mut human),
            HumanState::Sleep => sleep_step(state, frame, id, &mut human),
            HumanState::Follow => follow_step(state, frame, id, &mut human),
            _ => {}
        }
        state.put_human(id, human);
    }
}

// ── Huts ──────────────────────────────────────────────────────────

fn hut_owner(state: &WorldState, hut: Entity) -> Option<Option<Entity>> {
    match &*state.ecs.get::<&Structure>(hut).ok()? {
        Structure::Hut(h) => Some(h.owner),
        _ => None,
    }
}

/// Release huts held by the unemployed, then give each free hut to the
/// nearest employed, homeless human within reach.
pub fn claim_huts(state: &mut WorldState) {
    for id in state.human_ids() {
        let Some(mut human) = state.human(id) else {
            continue;
        };
        let Some(hut) = human.home_hut else {
            continue;
        };
        let still_ours = hut_owner(state, hut) == Some(Some(id));
        if human.is_employed && still_ours {
            continue;
        }
        if still_ours {
            state.release_hut(hut, id);
        }
        log::debug!("{} no longer has a hut", human.name);
        human.home_hut = None;
        state.put_human(id, human);
    }

    let free = state.structures_where(|s| matches!(s, Structure::Hut(h) if h.owner.is_none()));
    for (hut, center) in free {
        let homeless: Vec<(Entity, Vec2)> = state
            .human_ids()
            .into_iter()
            .filter_map(|id| state.human(id).map(|h| (id, h)))
            .filter(|(_, h)| h.is_employed && h.home_hut.is_none())
            .map(|(id, h)| (id, h.center()))
            .collect();
        let Some(owner) = nearest_within(homeless, center, distances::HUT_CLAIM_DISTANCE) else {
            continue;
        };
        if let Ok(mut structure) = state.ecs.get::<&mut Structure>(hut) {
            if let Structure::Hut(h) = &mut *structure {
                h.owner = Some(owner);
            }
        }
        if let Some(mut human) = state.human(owner) {
            log::debug!("{} claimed a hut", human.name);
            human.home_hut = Some(hut);
            state.put_human(owner, human);
        }
    }
}

// ── Day and night ─────────────────────────────────────────────────

fn day_night_transition(state: &WorldState, human: &mut Human, dark: bool) {
    match human.state {
        HumanState::Wander | HumanState::Employed if dark => {
            let resume = match &human.activity {
                Activity::Gather(_) | Activity::Farm(_) | Activity::Mill(_) => {
                    Some(Box::new(human.activity.clone()))
                }
                _ => None,
            };
            human.state = HumanState::Sleep;
            human.road_hint = None;
            human.activity = Activity::Sleep(SleepTask {
                target: sleep_target(state, human),
                asleep: false,
                resume,
            });
        }
        HumanState::Sleep if !dark => {
            let resume = match std::mem::take(&mut human.activity) {
                Activity::Sleep(task) => task.resume,
                _ => None,
            };
            human.road_hint = None;
            if human.is_employed {
                human.state = HumanState::Employed;
                human.activity = resume.map(|a| *a).unwrap_or_default();
            } else {
                human.state = HumanState::Wander;
                human.activity = Activity::Idle;
            }
        }
        _ => {}
    }
}

fn sleep_target(state: &WorldState, human: &Human) -> Option<Entity> {
    human
        .home_hut
        .filter(|h| state.structure_center(*h).is_some())
        .or_else(|| state.nearest_town_hall(human.center()))
}

fn sleep_step(state: &mut WorldState, frame: &mut Frame, id: Entity, human: &mut Human) {
    let Activity::Sleep(mut task) = std::mem::take(&mut human.activity) else {
        human.activity = Activity::Sleep(SleepTask {
            target: sleep_target(state, human),
            asleep: false,
            resume: None,
        });
        return;
    };
    if !task.asleep {
        let bed = task
            .target
            .filter(|t| state.structure_center(*t).is_some())
            .or_else(|| sleep_target(state, human));
        task.target = bed;
        match bed.and_then(|b| state.structure_center(b).map(|c| (b, c))) {
            None => task.asleep = true,
            Some((bed, center)) => {
                let arrival = match state.ecs.get::<&Structure>(bed).as_deref() {
                    Ok(Structure::Hut(_)) => distances::HUT_ARRIVAL,
                    _ => distances::TOWN_HALL_ARRIVAL,
                };
                if human.center().distance(&center) > arrival {
                    travel_to(human, id, center, speeds::HUMAN_WANDER_SPEED, Some(bed), frame);
                }
                task.asleep = human.center().distance(&center) <= arrival;
            }
        }
    }
    human.activity = Activity::Sleep(task);
}

// ── Wandering ─────────────────────────────────────────────────────

fn wander_target(state: &mut WorldState, human: &Human) -> Vec2 {
    random_point_in(&mut state.rng, &play_area(), human.size / 2.0)
}

fn start_moving(state: &mut WorldState, human: &Human) -> WanderPhase {
    let target = wander_target(state, human);
    let duration = state
        .rng
        .gen_range(timing::WANDER_MOVE_MIN..=timing::WANDER_MOVE_MAX);
    WanderPhase::Moving {
        target,
        elapsed: 0.0,
        duration,
    }
}

fn start_resting(state: &mut WorldState) -> WanderPhase {
    WanderPhase::Resting {
        remaining: state
            .rng
            .gen_range(timing::WANDER_REST_MIN..=timing::WANDER_REST_MAX),
    }
}

fn wander_step(state: &mut WorldState, frame: &mut Frame, id: Entity, human: &mut Human) {
    let phase = match &human.activity {
        Activity::Wander(phase) => *phase,
        _ => start_moving(state, human),
    };
    let next = match phase {
        WanderPhase::Resting { remaining } => {
            let remaining = remaining - frame.dt;
            if remaining <= 0.0 {
                start_moving(state, human)
            } else {
                WanderPhase::Resting { remaining }
            }
        }
        WanderPhase::Moving {
            target,
            elapsed,
            duration,
        } => {
            let elapsed = elapsed + frame.dt;
            let travel = walk_direct(
                human,
                id,
                target,
                speeds::HUMAN_WANDER_SPEED,
                None,
                frame,
                true,
            );
            let arrived = human.center().distance(&target) < distances::WANDER_ARRIVAL;
            if arrived || elapsed >= duration {
                start_resting(state)
            } else if travel == Travel::Blocked {
                WanderPhase::Moving {
                    target: wander_target(state, human),
                    elapsed,
                    duration,
                }
            } else {
                WanderPhase::Moving {
                    target,
                    elapsed,
                    duration,
                }
            }
        }
    };
    human.activity = Activity::Wander(next);
}

// ── Following ─────────────────────────────────────────────────────

fn follow_step(state: &mut WorldState, frame: &mut Frame, id: Entity, human: &mut Human) {
    let goal = state.player.center();
    if human.center().distance(&goal) <= distances::HUMAN_FOLLOW_DISTANCE {
        return;
    }
    travel_to(human, id, goal, speeds::HUMAN_SPEED, None, frame);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Gender, Hut, Job, TownHall};
    use crate::config::SimConfig;

    fn employed(state: &mut WorldState, name: &str, center: Vec2) -> Entity {
        let mut h = Human::new(name, Gender::Male, Vec2::ZERO);
        h.set_center(center);
        h.job = Some(Job::Lumberjack);
        h.is_employed = true;
        h.state = HumanState::Employed;
        state.spawn_human(h)
    }

    fn owner(state: &WorldState, hut: Entity) -> Option<Entity> {
        hut_owner(state, hut).flatten()
    }

    #[test]
    fn test_nearest_employed_claims_hut() {
        let mut state = WorldState::new(SimConfig::default());
        let hut = state.spawn_structure(Structure::Hut(Hut::new(Vec2::new(600.0, 400.0))));
        let near = employed(&mut state, "Near", Vec2::new(640.0, 400.0));
        let far = employed(&mut state, "Far", Vec2::new(800.0, 400.0));
        claim_huts(&mut state);
        assert_eq!(owner(&state, hut), Some(near));
        assert_eq!(state.human(near).unwrap().home_hut, Some(hut));
        assert_eq!(state.human(far).unwrap().home_hut, None);

        let mut h = state.human(near).unwrap();
        h.is_employed = false;
        h.state = HumanState::Stay;
        state.put_human(near, h);
        claim_huts(&mut state);
        assert_eq!(owner(&state, hut), None);
        assert_eq!(state.human(near).unwrap().home_hut, None);
    }

    #[test]
    fn test_unemployed_never_claims() {
        let mut state = WorldState::new(SimConfig::default());
        let hut = state.spawn_structure(Structure::Hut(Hut::new(Vec2::new(600.0, 400.0))));
        state.spawn_human(Human::new("Idle", Gender::Female, Vec2::new(590.0, 420.0)));
        claim_huts(&mut state);
        assert_eq!(owner(&state, hut), None);
    }

    #[test]
    fn test_night_sends_workers_to_bed_and_dawn_resumes() {
        let mut state = WorldState::new(SimConfig::default());
        state.spawn_structure(Structure::TownHall(TownHall::new(Vec2::new(400.0, 300.0), 0)));
        let id = employed(&mut state, "Ned", Vec2::new(300.0, 340.0));

        state.clock.elapsed = state.clock.day_duration + 1.0;
        assert!(state.clock.is_dark());
        let dt = 1.0 / 60.0;
        for _ in 0..(60 * 5) {
            let mut frame = Frame::new(&state.ecs, Vec::new(), dt);
            behavior_system(&mut state, &mut frame);
        }
        let h = state.human(id).unwrap();
        assert_eq!(h.state, HumanState::Sleep);
        assert!(h.is_asleep());

        state.clock.elapsed = 0.0;
        let mut frame = Frame::new(&state.ecs, Vec::new(), dt);
        behavior_system(&mut state, &mut frame);
        let h = state.human(id).unwrap();
        assert_eq!(h.state, HumanState::Employed);
        assert_eq!(h.activity, Activity::Idle);
    }

    #[test]
    fn test_wanderer_moves_and_rests() {
        let mut state = WorldState::new(SimConfig::default());
        let id = state.spawn_human(Human::new("Wes", Gender::Male, Vec2::new(600.0, 400.0)));
        let start = state.human(id).unwrap().center();
        let dt = 1.0 / 60.0;
        let mut rested = false;
        for _ in 0..(60 * 12) {
            let mut frame = Frame::new(&state.ecs, Vec::new(), dt);
            behavior_system(&mut state, &mut frame);
            let h = state.human(id).unwrap();
            rested |= matches!(h.activity, Activity::Wander(WanderPhase::Resting { .. }));
            assert!(play_area().contains_point(h.center()));
        }
        assert!(rested);
        assert_ne!(state.human(id).unwrap().center(), start);
    }
}
