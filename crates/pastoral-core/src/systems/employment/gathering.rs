//! Yard jobs (lumberjack, miner, stoneworker, saltworker) and the delivery
//! leg shared with shearing and manual harvest.

use std::f32::consts::TAU;

use hecs::Entity;
use pastoral_logic::constants::{distances, sizes, speeds, timing};
use pastoral_logic::geometry::Vec2;
use pastoral_logic::layout::ring_position;
use rand::Rng;

use crate::collision::Frame;
use crate::components::{
    Activity, Human, Job, NaturalResource, NodeKind, ResourceKind, Structure, WorkTask, YardKind,
};
use crate::error::DepositError;
use crate::messages::WorkIssue;
use crate::systems::movement::{clamp_center, travel_to, Travel};
use crate::world::{nearest, nearest_within, WorldState};

/// Progress of a delivery leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Delivery {
    EnRoute,
    Delivered,
    Refused(WorkIssue),
}

fn yard_has_space(state: &WorldState, building: Entity, kind: YardKind) -> bool {
    state
        .ecs
        .get::<&Structure>(building)
        .map(|s| matches!(&*s, Structure::Storage(y) if y.kind == kind && y.has_space()))
        .unwrap_or(false)
}

fn yard_kind_exists(state: &WorldState, kind: YardKind) -> bool {
    !state
        .structures_where(|s| matches!(s, Structure::Storage(y) if y.kind == kind))
        .is_empty()
}

/// Carry `task.resource` to a yard that accepts it and store it there.
///
/// Keeps the task's building while it has room, otherwise switches to the
/// nearest yard with room.
pub(crate) fn deliver_to_yard(
    state: &mut WorldState,
    frame: &mut Frame,
    id: Entity,
    human: &mut Human,
    task: &mut WorkTask,
) -> Delivery {
    let resource = task.resource;
    let Some(kind) = YardKind::for_resource(resource) else {
        return Delivery::Refused(WorkIssue::NoStorageAvailable(resource));
    };
    let building = match task.building.filter(|b| yard_has_space(state, *b, kind)) {
        Some(b) => b,
        None => match nearest(state.yards_with_space(kind), human.center()) {
            Some(b) => {
                task.building = Some(b);
                b
            }
            None => {
                task.building = None;
                let issue = if yard_kind_exists(state, kind) {
                    WorkIssue::BuildingFull(resource)
                } else {
                    WorkIssue::NoStorageAvailable(resource)
                };
                return Delivery::Refused(issue);
            }
        },
    };
    let Some(center) = state.structure_center(building) else {
        task.building = None;
        return Delivery::EnRoute;
    };

    if human.center().distance(&center) > distances::DELIVERY_ARRIVAL {
        travel_to(human, id, center, speeds::HUMAN_SPEED, Some(building), frame);
        if human.center().distance(&center) > distances::DELIVERY_ARRIVAL {
            return Delivery::EnRoute;
        }
    }

    let stored = match state.ecs.get::<&mut Structure>(building) {
        Ok(mut structure) => match &mut *structure {
            Structure::Storage(yard) => yard.deposit(resource),
            _ => Err(DepositError::NotStorage),
        },
        Err(_) => Err(DepositError::NotStorage),
    };
    match stored {
        Ok(inventory) => {
            state.ledger.credit(resource, 1);
            human.carrying = None;
            log::debug!("{} stored {:?} ({} in yard)", human.name, resource, inventory);
            Delivery::Delivered
        }
        Err(err) => {
            log::warn!("{} could not store {:?}: {}", human.name, resource, err);
            task.building = None;
            Delivery::Refused(WorkIssue::BuildingFull(resource))
        }
    }
}

fn job_resource(job: Job) -> Option<(ResourceKind, NodeKind, YardKind)> {
    let resource = job.gathered_resource()?;
    Some((
        resource,
        NodeKind::for_resource(resource)?,
        YardKind::for_resource(resource)?,
    ))
}

fn current_task(human: &Human) -> Option<WorkTask> {
    match &human.activity {
        Activity::Gather(task) => Some(*task),
        _ => None,
    }
}

fn find_node(state: &WorldState, human: &Human, kind: NodeKind) -> Option<Entity> {
    nearest_within(
        state.live_resources(kind),
        human.center(),
        state.config.auto_work_search_radius,
    )
}

pub(super) fn gathering_available(state: &WorldState, human: &Human, job: Job) -> bool {
    let Some((_, node, yard)) = job_resource(job) else {
        return false;
    };
    if state.yards_with_space(yard).is_empty() {
        return false;
    }
    if human.carrying.is_some() {
        return true;
    }
    let target_alive = current_task(human)
        .and_then(|t| t.target)
        .is_some_and(|t| state.resource_alive(t));
    target_alive || find_node(state, human, node).is_some()
}

fn random_stand(state: &mut WorldState, center: Vec2) -> Vec2 {
    let angle = state.rng.gen_range(0.0..TAU);
    clamp_center(sizes::HUMAN_SIZE, ring_position(center, angle))
}

pub(super) fn gathering_work(
    state: &mut WorldState,
    frame: &mut Frame,
    id: Entity,
    human: &mut Human,
    job: Job,
) {
    let Some((resource, node, _)) = job_resource(job) else {
        return;
    };
    let mut task = current_task(human).unwrap_or(WorkTask {
        target: None,
        building: None,
        resource,
        stand: human.center(),
        timer: 0.0,
    });

    if human.carrying.is_some() {
        if let Delivery::Refused(issue) = deliver_to_yard(state, frame, id, human, &mut task) {
            state.messages.report(issue);
        }
    } else if let Some(target) = task.target.filter(|t| state.resource_alive(*t)) {
        work_node(state, frame, id, human, &mut task, target);
    } else if let Some(target) = find_node(state, human, node) {
        let center = state
            .ecs
            .get::<&NaturalResource>(target)
            .map(|r| r.center)
            .unwrap_or(human.center());
        task.target = Some(target);
        task.stand = random_stand(state, center);
        task.timer = 0.0;
        log::debug!("{} heads for {:?} at {:?}", human.name, node, center);
    } else {
        task.target = None;
    }
    human.activity = Activity::Gather(task);
}

/// Walk to the standing spot next to `target` and chop, mine or dig there.
pub(crate) fn work_node(
    state: &mut WorldState,
    frame: &mut Frame,
    id: Entity,
    human: &mut Human,
    task: &mut WorkTask,
    target: Entity,
) {
    if human.center().distance(&task.stand) > distances::HARVEST_ARRIVAL {
        task.timer = 0.0;
        let travel = travel_to(human, id, task.stand, speeds::HUMAN_SPEED, None, frame);
        let near = human.center().distance(&task.stand) < distances::HARVEST_RING_RADIUS;
        let stuck = match travel {
            Travel::Crowded => near,
            Travel::Blocked | Travel::Stalled => true,
            _ => false,
        };
        if stuck {
            let center = state
                .ecs
                .get::<&NaturalResource>(target)
                .map(|r| r.center)
                .unwrap_or(task.stand);
            task.stand = random_stand(state, center);
        }
        return;
    }

    task.timer += frame.dt;
    if task.timer < timing::HARVEST_TIME {
        return;
    }
    task.timer = 0.0;
    let taken = state
        .ecs
        .get::<&mut NaturalResource>(target)
        .ok()
        .and_then(|mut r| r.harvest());
    if let Some(kind) = taken {
        human.carrying = Some(kind);
        task.resource = kind;
    }
}
