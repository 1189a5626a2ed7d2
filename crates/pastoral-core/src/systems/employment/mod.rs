//! Employment system - drives every employed human through their job
//!
//! All seven jobs share one loop: if the job has no work (nothing to gather
//! or nowhere to store it) the worker goes to the nearest town hall and
//! idles there; otherwise a carried item is delivered first, then the
//! current target is worked, and only then is a new target searched for.
//! While idling, work availability is re-checked once per
//! `auto_work_interval`.

mod downtime;
mod farmer;
mod gathering;
mod miller;
mod shearer;

use hecs::Entity;

use crate::collision::Frame;
use crate::components::{Activity, DowntimeTask, Human, HumanState, Job, YardKind};
use crate::messages::WorkIssue;
use crate::world::WorldState;

pub(crate) use gathering::{deliver_to_yard, work_node, Delivery};

pub fn employment_system(state: &mut WorldState, frame: &mut Frame) {
    for id in state.human_ids() {
        let Some(mut human) = state.human(id) else {
            continue;
        };
        if human.state != HumanState::Employed {
            continue;
        }
        let Some(job) = human.job else {
            continue;
        };
        run_job(state, frame, id, &mut human, job);
        state.put_human(id, human);
    }
}

fn run_job(state: &mut WorldState, frame: &mut Frame, id: Entity, human: &mut Human, job: Job) {
    human.search_cooldown = (human.search_cooldown - frame.dt).max(0.0);
    let throttled = human.in_downtime() && human.search_cooldown > 0.0;
    let available = !throttled && work_available(state, id, human, job);

    if !available {
        if !throttled {
            human.search_cooldown = state.config.auto_work_interval;
        }
        if !human.in_downtime() {
            enter_downtime(state, human, job);
        }
        downtime::downtime_step(state, frame, id, human);
        return;
    }

    if human.in_downtime() {
        log::debug!("{} is back to work as {:?}", human.name, job);
        human.reset_worker();
    }
    match job {
        Job::Shearer => shearer::shearer_work(state, frame, id, human),
        Job::BarleyFarmer => farmer::farmer_work(state, frame, id, human),
        Job::Miller => miller::miller_work(state, frame, id, human),
        Job::Lumberjack | Job::Miner | Job::Stoneworker | Job::Saltworker => {
            gathering::gathering_work(state, frame, id, human, job)
        }
    }
}

fn work_available(state: &WorldState, id: Entity, human: &Human, job: Job) -> bool {
    match job {
        Job::Shearer => shearer::shearer_available(state, human),
        Job::BarleyFarmer => farmer::farmer_available(state, id, human),
        Job::Miller => miller::miller_available(state, human),
        Job::Lumberjack | Job::Miner | Job::Stoneworker | Job::Saltworker => {
            gathering::gathering_available(state, human, job)
        }
    }
}

fn enter_downtime(state: &mut WorldState, human: &mut Human, job: Job) {
    log::debug!("{} has no {:?} work, heading to the town hall", human.name, job);
    if let Some(kind) = human.carrying.and_then(YardKind::for_resource) {
        let any_yard = !state
            .structures_where(|s| {
                matches!(s, crate::components::Structure::Storage(y) if y.kind == kind)
            })
            .is_empty();
        let resource = kind.accepts();
        state.messages.report(if any_yard {
            WorkIssue::BuildingFull(resource)
        } else {
            WorkIssue::NoStorageAvailable(resource)
        });
    }
    human.road_hint = None;
    human.activity = Activity::Downtime(DowntimeTask {
        hall: None,
        arrived: false,
        target: None,
    });
}
