//! Manual harvest system - player-directed single-target harvesting
//!
//! Humans in the `Harvest` state work the one resource the player pointed
//! them at and carry each unit to the yard chosen when the order was given.
//! When the resource runs out, or the yard refuses a delivery, they stop
//! and wait where they are.

use hecs::Entity;

use crate::collision::Frame;
use crate::components::{Activity, Human, HumanState};
use crate::world::WorldState;

use super::employment::{deliver_to_yard, work_node, Delivery};

pub fn harvest_system(state: &mut WorldState, frame: &mut Frame) {
    for id in state.human_ids() {
        let Some(mut human) = state.human(id) else {
            continue;
        };
        if human.state != HumanState::Harvest {
            continue;
        }
        harvest_step(state, frame, id, &mut human);
        state.put_human(id, human);
    }
}

fn stop(human: &mut Human) {
    human.state = HumanState::Stay;
    human.reset_worker();
}

fn harvest_step(state: &mut WorldState, frame: &mut Frame, id: Entity, human: &mut Human) {
    let Activity::Gather(mut task) = human.activity.clone() else {
        stop(human);
        return;
    };
    let target_alive = task.target.is_some_and(|t| state.resource_alive(t));

    if human.carrying.is_some() {
        match deliver_to_yard(state, frame, id, human, &mut task) {
            Delivery::EnRoute => human.activity = Activity::Gather(task),
            Delivery::Delivered if target_alive => {
                task.timer = 0.0;
                human.activity = Activity::Gather(task);
            }
            Delivery::Delivered => {
                log::debug!("{} finished harvesting", human.name);
                stop(human);
            }
            Delivery::Refused(issue) => {
                log::warn!("{} gave up harvesting: {}", human.name, issue);
                state.messages.report(issue);
                human.carrying = None;
                stop(human);
            }
        }
        return;
    }

    let Some(target) = task.target.filter(|_| target_alive) else {
        log::debug!("{} lost the harvest target", human.name);
        stop(human);
        return;
    };
    work_node(state, frame, id, human, &mut task, target);
    human.activity = Activity::Gather(task);
}
