//! Barley farmer: till every plot, wait for the crop to ripen, then harvest
//! plot by plot into the nearest silo.
//!
//! A farm is worked by at most one farmer; the claim is recorded on the farm
//! and dropped when the farmer is fired or moves to another farm.

use hecs::Entity;
use pastoral_logic::constants::{distances, speeds, timing};
use pastoral_logic::geometry::Vec2;

use crate::collision::Frame;
use crate::components::{Activity, BarleyFarm, FarmTask, Human, ResourceKind, Structure};
use crate::ledger::Commodity;
use crate::systems::movement::travel_to;
use crate::world::{nearest, WorldState};

fn farm(state: &WorldState, id: Entity) -> Option<BarleyFarm> {
    match &*state.ecs.get::<&Structure>(id).ok()? {
        Structure::Farm(f) => Some(f.clone()),
        _ => None,
    }
}

fn with_farm<R>(
    state: &mut WorldState,
    id: Entity,
    f: impl FnOnce(&mut BarleyFarm) -> R,
) -> Option<R> {
    let mut structure = state.ecs.get::<&mut Structure>(id).ok()?;
    match &mut *structure {
        Structure::Farm(farm) => Some(f(farm)),
        _ => None,
    }
}

fn silos(state: &WorldState) -> Vec<(Entity, Vec2)> {
    state.structures_where(|s| matches!(s, Structure::Silo(_)))
}

fn usable_by(farm: &BarleyFarm, farmer: Entity) -> bool {
    farm.farmer.is_none() || farm.farmer == Some(farmer)
}

fn has_work_for(farm: &BarleyFarm, silo_exists: bool) -> bool {
    farm.needs_tilling() || (farm.ready_to_harvest() && silo_exists)
}

/// Farms this farmer may work that have something to do right now.
fn workable_farms(state: &WorldState, farmer: Entity) -> Vec<(Entity, Vec2)> {
    let silo_exists = !silos(state).is_empty();
    state.structures_where(|s| {
        matches!(s, Structure::Farm(f) if usable_by(f, farmer) && has_work_for(f, silo_exists))
    })
}

pub(super) fn farmer_available(state: &WorldState, id: Entity, human: &Human) -> bool {
    if human.carrying.is_some() {
        return !silos(state).is_empty();
    }
    !workable_farms(state, id).is_empty()
}

pub(super) fn farmer_work(
    state: &mut WorldState,
    frame: &mut Frame,
    id: Entity,
    human: &mut Human,
) {
    let current = match &human.activity {
        Activity::Farm(task) => Some(*task),
        _ => None,
    };

    if human.carrying.is_some() {
        let mut silo = current.and_then(|t| t.silo);
        carry_to_silo(state, frame, id, human, &mut silo);
        if let Some(mut task) = current {
            task.silo = silo;
            human.activity = Activity::Farm(task);
        }
        return;
    }

    let workable = workable_farms(state, id);
    let keep = current.filter(|t| workable.iter().any(|(f, _)| *f == t.farm));
    let mut task = match keep {
        Some(task) => task,
        None => {
            let Some(chosen) = nearest(workable, human.center()) else {
                return;
            };
            state.release_farm(id);
            with_farm(state, chosen, |f| f.farmer = Some(id));
            log::debug!("{} takes on a barley farm", human.name);
            FarmTask {
                farm: chosen,
                plot: None,
                silo: None,
                timer: 0.0,
            }
        }
    };

    let Some(field) = farm(state, task.farm) else {
        human.activity = Activity::Idle;
        return;
    };
    if field.needs_tilling() {
        till(state, frame, id, human, &mut task, &field);
    } else if field.ready_to_harvest() {
        reap(state, frame, id, human, &mut task, &field);
    }
    human.activity = Activity::Farm(task);
}

fn walk_to_plot(
    frame: &mut Frame,
    id: Entity,
    human: &mut Human,
    task: &mut FarmTask,
    field: &BarleyFarm,
    plot: usize,
) -> bool {
    let spot = field.plot_center(plot);
    if human.center().distance(&spot) > distances::HARVEST_ARRIVAL {
        task.timer = 0.0;
        travel_to(human, id, spot, speeds::HUMAN_SPEED, None, frame);
        return false;
    }
    true
}

fn till(
    state: &mut WorldState,
    frame: &mut Frame,
    id: Entity,
    human: &mut Human,
    task: &mut FarmTask,
    field: &BarleyFarm,
) {
    let plot = match task.plot.filter(|p| field.plots.get(*p).is_some_and(|plot| !plot.worked)) {
        Some(p) => p,
        None => match field.next_unworked(human.center()) {
            Some(p) => p,
            None => return,
        },
    };
    task.plot = Some(plot);
    if !walk_to_plot(frame, id, human, task, field, plot) {
        return;
    }
    task.timer += frame.dt;
    if task.timer < timing::TILL_TIME {
        return;
    }
    task.timer = 0.0;
    task.plot = None;
    let day = state.clock.current_day;
    let planted = with_farm(state, task.farm, |f| {
        f.work_plot(plot);
        if f.all_worked() && !f.is_planted() {
            f.plant_crops(day);
            true
        } else {
            false
        }
    });
    if planted == Some(true) {
        log::info!("{} planted barley on day {}", human.name, day);
    }
}

fn reap(
    state: &mut WorldState,
    frame: &mut Frame,
    id: Entity,
    human: &mut Human,
    task: &mut FarmTask,
    field: &BarleyFarm,
) {
    let plot = match task.plot.filter(|p| field.plots.get(*p).is_some_and(|plot| plot.has_barley)) {
        Some(p) => p,
        None => match field.next_barley(human.center()) {
            Some(p) => p,
            None => return,
        },
    };
    task.plot = Some(plot);
    if !walk_to_plot(frame, id, human, task, field, plot) {
        return;
    }
    task.timer += frame.dt;
    if task.timer < timing::BARLEY_HARVEST_TIME {
        return;
    }
    task.timer = 0.0;
    task.plot = None;
    let picked = with_farm(state, task.farm, |f| {
        let picked = f.harvest_plot(plot);
        if picked && !f.plots.iter().any(|p| p.has_barley) {
            f.reset_after_harvest();
        }
        picked
    });
    if picked == Some(true) {
        human.carrying = Some(ResourceKind::Barley);
    }
}

fn carry_to_silo(
    state: &mut WorldState,
    frame: &mut Frame,
    id: Entity,
    human: &mut Human,
    target: &mut Option<Entity>,
) {
    let valid = target.filter(|s| {
        state
            .ecs
            .get::<&Structure>(*s)
            .map(|st| matches!(&*st, Structure::Silo(_)))
            .unwrap_or(false)
    });
    let Some(silo) = valid.or_else(|| nearest(silos(state), human.center())) else {
        return;
    };
    *target = Some(silo);
    let Some(center) = state.structure_center(silo) else {
        return;
    };
    if human.center().distance(&center) > distances::SILO_ARRIVAL {
        travel_to(human, id, center, speeds::HUMAN_SPEED, Some(silo), frame);
        if human.center().distance(&center) > distances::SILO_ARRIVAL {
            return;
        }
    }
    if let Ok(mut structure) = state.ecs.get::<&mut Structure>(silo) {
        if let Structure::Silo(s) = &mut *structure {
            s.barley += 1;
        }
    }
    state.ledger.credit(Commodity::Barley, 1);
    human.carrying = None;
    *target = None;
}
