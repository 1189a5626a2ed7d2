//! Input interpreter - turns decoded player commands into world mutations
//!
//! The window layer decodes raw events and hands them over as [`Command`]s
//! before each tick. Menus are drawn elsewhere: the interpreter only records
//! which menu should be open ([`MenuRequest`]) and accepts the chosen entry
//! back as [`Command::Menu`].

use hecs::Entity;
use pastoral_logic::constants::distances;
use pastoral_logic::geometry::{Rect, Vec2};
use pastoral_logic::layout::ring_slot;
use pastoral_logic::placement::{validate_placement, Obstruction, PlacementContext, PlacementError};
use serde::{Deserialize, Serialize};

use crate::components::*;
use crate::messages::WorkIssue;
use crate::world::{nearest, BuildMode, MoveKeys, WorldState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyCode {
    Escape,
    Q,
    E,
    D,
}

/// Menu the window layer should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuRequest {
    Sheep,
    MaleHuman,
    FemaleHuman,
    Employment { hall: Entity },
    Build,
}

/// Entry picked in one of the menus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    SheepFollow,
    SheepStay,
    SheepGenderSeparate,
    HumanFollow,
    HumanStay,
    /// Back to work if employed, otherwise wander.
    HumanAuto,
    HarvestCursor,
    Hire { hall: Entity, job: Job },
    Fire,
    StartBuild(BuildKind),
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// Current keyboard snapshot, read by the next tick.
    MoveKeys(MoveKeys),
    Click { pos: Vec2, button: MouseButton },
    Release { pos: Vec2, button: MouseButton },
    MouseMove { pos: Vec2 },
    Wheel { delta: i32 },
    Key(KeyCode),
    Menu(MenuAction),
}

/// Apply one command to the world.
pub fn apply_command(state: &mut WorldState, command: Command) {
    match command {
        Command::MoveKeys(keys) => state.player.keys = keys,
        Command::MouseMove { pos } => state.cursor = pos,
        Command::Click { pos, button } => {
            state.cursor = pos;
            match button {
                MouseButton::Left => left_click(state, pos),
                MouseButton::Right => right_click(state, pos),
                MouseButton::Middle => {}
            }
        }
        Command::Release { pos, button } => {
            if button == MouseButton::Left {
                left_release(state, pos);
            }
        }
        Command::Wheel { delta } => {
            if delta != 0 {
                rotate_build(state, delta > 0);
            }
        }
        Command::Key(key) => match key {
            KeyCode::Escape => {
                state.build = None;
                state.harvest_cursor = false;
                state.open_menu = None;
                state.drag_start = None;
            }
            KeyCode::Q => rotate_build(state, false),
            KeyCode::E => rotate_build(state, true),
            KeyCode::D => {
                state.debug = !state.debug;
                log::info!("debug view {}", if state.debug { "on" } else { "off" });
            }
        },
        Command::Menu(action) => menu_action(state, action),
    }
}

fn rotate_build(state: &mut WorldState, clockwise: bool) {
    if let Some(build) = &mut state.build {
        build.rotation = if clockwise {
            (build.rotation + 1) % 4
        } else {
            (build.rotation + 3) % 4
        };
    }
}

// ── Selection ─────────────────────────────────────────────────────

fn clear_selection(state: &mut WorldState) {
    for (_, sheep) in state.ecs.query_mut::<&mut Sheep>() {
        sheep.selected = false;
    }
    for (_, human) in state.ecs.query_mut::<&mut Human>() {
        human.selected = false;
    }
}

pub fn selected_sheep(state: &WorldState) -> Vec<Entity> {
    let mut ids: Vec<Entity> = state
        .ecs
        .query::<&Sheep>()
        .iter()
        .filter(|(_, s)| s.selected)
        .map(|(e, _)| e)
        .collect();
    ids.sort_by_key(|e| e.to_bits());
    ids
}

pub fn selected_humans(state: &WorldState) -> Vec<Entity> {
    let mut ids: Vec<Entity> = state
        .ecs
        .query::<&Human>()
        .iter()
        .filter(|(_, h)| h.selected)
        .map(|(e, _)| e)
        .collect();
    ids.sort_by_key(|e| e.to_bits());
    ids
}

/// Select the agent under `pos`, humans first. Returns false on empty ground.
fn select_at(state: &mut WorldState, pos: Vec2) -> bool {
    let human = state
        .human_ids()
        .into_iter()
        .find(|id| state.human(*id).is_some_and(|h| h.rect().contains_point(pos)));
    if let Some(id) = human {
        if let Ok(mut h) = state.ecs.get::<&mut Human>(id) {
            h.selected = true;
        }
        return true;
    }
    let sheep = state
        .sheep_ids()
        .into_iter()
        .find(|id| state.sheep(*id).is_some_and(|s| s.rect().contains_point(pos)));
    if let Some(id) = sheep {
        if let Ok(mut s) = state.ecs.get::<&mut Sheep>(id) {
            s.selected = true;
        }
        return true;
    }
    false
}

fn box_select(state: &mut WorldState, area: Rect) -> usize {
    let mut count = 0;
    for (_, sheep) in state.ecs.query_mut::<&mut Sheep>() {
        sheep.selected = area.contains_point(sheep.center());
        count += sheep.selected as usize;
    }
    for (_, human) in state.ecs.query_mut::<&mut Human>() {
        human.selected = area.contains_point(human.center());
        count += human.selected as usize;
    }
    count
}

// ── Mouse ─────────────────────────────────────────────────────────

fn left_click(state: &mut WorldState, pos: Vec2) {
    state.open_menu = None;
    if let Some(build) = state.build {
        match place_building(state, build.kind, build.rotation, pos) {
            Ok(_) if !build.kind.is_road() => state.build = None,
            Ok(_) => {}
            Err(err) => log::debug!("cannot place {:?} at {:?}: {}", build.kind, pos, err),
        }
        return;
    }
    if state.harvest_cursor {
        harvest_click(state, pos);
        return;
    }
    if toggle_pen_gate(state, pos) {
        return;
    }
    clear_selection(state);
    if !select_at(state, pos) {
        state.drag_start = Some(pos);
    }
}

fn left_release(state: &mut WorldState, pos: Vec2) {
    let Some(start) = state.drag_start.take() else {
        return;
    };
    let (w, h) = ((pos.x - start.x).abs(), (pos.y - start.y).abs());
    if w < distances::BOX_SELECT_MIN && h < distances::BOX_SELECT_MIN {
        select_at(state, pos);
        return;
    }
    let area = Rect::new(start.x.min(pos.x), start.y.min(pos.y), w, h);
    let count = box_select(state, area);
    log::debug!("box selected {} agents", count);
}

fn right_click(state: &mut WorldState, pos: Vec2) {
    state.drag_start = None;
    let hall = state
        .structures_where(|s| matches!(s, Structure::TownHall(t) if t.rect.contains_point(pos)))
        .first()
        .map(|(e, _)| *e);
    let humans: Vec<Human> = selected_humans(state)
        .into_iter()
        .filter_map(|id| state.human(id))
        .collect();
    state.open_menu = Some(if let Some(hall) = hall {
        MenuRequest::Employment { hall }
    } else if !selected_sheep(state).is_empty() {
        MenuRequest::Sheep
    } else if humans.iter().any(|h| h.is_male()) {
        MenuRequest::MaleHuman
    } else if !humans.is_empty() {
        MenuRequest::FemaleHuman
    } else {
        MenuRequest::Build
    });
}

fn toggle_pen_gate(state: &mut WorldState, pos: Vec2) -> bool {
    for (_, structure) in state.ecs.query_mut::<&mut Structure>() {
        if let Structure::Pen(pen) = structure {
            if pen.button_hit(pos) {
                pen.toggle_gate();
                log::debug!("pen gate {}", if pen.collision_enabled { "closed" } else { "opened" });
                return true;
            }
        }
    }
    false
}

// ── Manual harvest orders ─────────────────────────────────────────

fn resource_at(state: &WorldState, pos: Vec2) -> Option<(Entity, NaturalResource)> {
    let mut hits: Vec<(Entity, NaturalResource)> = state
        .ecs
        .query::<&NaturalResource>()
        .iter()
        .filter(|(_, r)| !r.is_depleted() && r.contains_point(pos))
        .map(|(e, r)| (e, r.clone()))
        .collect();
    hits.sort_by_key(|(e, _)| e.to_bits());
    hits.into_iter().next()
}

/// Humans already working `node` by hand.
fn workers_on(state: &WorldState, node: Entity) -> usize {
    state
        .ecs
        .query::<&Human>()
        .iter()
        .filter(|(_, h)| {
            h.state == HumanState::Harvest
                && matches!(&h.activity, Activity::Gather(t) if t.target == Some(node))
        })
        .count()
}

/// Send every selected male to harvest the resource under `pos`.
/// Returns how many humans took the order.
pub fn harvest_click(state: &mut WorldState, pos: Vec2) -> usize {
    let Some((node, resource)) = resource_at(state, pos) else {
        return 0;
    };
    let kind = resource.kind.yields();
    let Some(yard_kind) = YardKind::for_resource(kind) else {
        return 0;
    };
    state.harvest_cursor = false;

    let mut assigned = 0;
    for id in selected_humans(state) {
        let Some(mut human) = state.human(id) else {
            continue;
        };
        if !human.is_male() {
            continue;
        }
        let Some(yard) = nearest(state.yards_with_space(yard_kind), human.center()) else {
            log::warn!("{} cannot harvest {:?}: no storage with space", human.name, kind);
            state.messages.report(WorkIssue::NoStorageAvailable(kind));
            continue;
        };
        let index = workers_on(state, node);
        human.state = HumanState::Harvest;
        human.carrying = None;
        human.road_hint = None;
        human.activity = Activity::Gather(WorkTask {
            target: Some(node),
            building: Some(yard),
            resource: kind,
            stand: ring_slot(resource.center, index),
            timer: 0.0,
        });
        log::debug!("{} ordered to harvest {:?}", human.name, resource.kind);
        state.put_human(id, human);
        assigned += 1;
    }
    assigned
}

// ── Menus ─────────────────────────────────────────────────────────

fn set_sheep_state(state: &mut WorldState, to: SheepState) {
    for id in selected_sheep(state) {
        if let Ok(mut sheep) = state.ecs.get::<&mut Sheep>(id) {
            sheep.state = to;
            sheep.graze_target = None;
        }
    }
}

fn set_human_state(state: &mut WorldState, to: impl Fn(&Human) -> HumanState) {
    for id in selected_humans(state) {
        let Some(mut human) = state.human(id) else {
            continue;
        };
        human.state = to(&human);
        human.reset_worker();
        state.put_human(id, human);
    }
}

fn menu_action(state: &mut WorldState, action: MenuAction) {
    state.open_menu = None;
    match action {
        MenuAction::SheepFollow => set_sheep_state(state, SheepState::Follow),
        MenuAction::SheepStay => set_sheep_state(state, SheepState::Stay),
        MenuAction::SheepGenderSeparate => set_sheep_state(state, SheepState::GenderSeparate),
        MenuAction::HumanFollow => set_human_state(state, |_| HumanState::Follow),
        MenuAction::HumanStay => set_human_state(state, |_| HumanState::Stay),
        MenuAction::HumanAuto => set_human_state(state, |h| {
            if h.is_employed {
                HumanState::Employed
            } else {
                HumanState::Wander
            }
        }),
        MenuAction::HarvestCursor => state.harvest_cursor = true,
        MenuAction::Hire { hall, job } => {
            hire_for(state, hall, job);
        }
        MenuAction::Fire => {
            for id in selected_humans(state) {
                state.fire(id);
            }
        }
        MenuAction::StartBuild(kind) => {
            state.harvest_cursor = false;
            state.build = Some(BuildMode { kind, rotation: 0 });
        }
        MenuAction::Close => {}
    }
}

/// Hire the selected humans at `hall`, or the nearest unemployed human when
/// nobody is selected, until the job's openings run out.
pub fn hire_for(state: &mut WorldState, hall: Entity, job: Job) -> usize {
    let Some(center) = state.structure_center(hall) else {
        return 0;
    };
    let mut candidates = selected_humans(state);
    if candidates.is_empty() {
        let idle: Vec<(Entity, Vec2)> = state
            .human_ids()
            .into_iter()
            .filter_map(|id| state.human(id).map(|h| (id, h)))
            .filter(|(_, h)| !h.is_employed)
            .map(|(id, h)| (id, h.center()))
            .collect();
        candidates.extend(nearest(idle, center));
    }

    let mut hired = 0;
    for id in candidates {
        match state.hire(hall, id, job) {
            Ok(()) => hired += 1,
            Err(crate::error::HireError::NoSlot { .. }) => {
                state.messages.push(format!("No open {:?} positions", job));
                break;
            }
            Err(err) => log::debug!("skipping hire: {}", err),
        }
    }
    hired
}

// ── Building ──────────────────────────────────────────────────────

/// Place a `kind` building centered on `center`, nudged into the playable
/// area. Refused when it would touch a resource or another building.
pub fn place_building(
    state: &mut WorldState,
    kind: BuildKind,
    rotation: u8,
    center: Vec2,
) -> Result<Entity, PlacementError> {
    let proposed = kind.build(center, rotation);
    let resources: Vec<Rect> = state
        .ecs
        .query::<&NaturalResource>()
        .iter()
        .filter(|(_, r)| !r.is_depleted())
        .map(|(_, r)| r.bounds())
        .collect();
    let buildings: Vec<Obstruction> = state
        .ecs
        .query::<&Structure>()
        .iter()
        .flat_map(|(_, s)| {
            let is_road = s.is_road();
            s.footprint()
                .into_iter()
                .map(move |rect| Obstruction { rect, is_road })
        })
        .collect();
    let ctx = PlacementContext {
        resources: &resources,
        buildings: &buildings,
    };
    let (dx, dy) = validate_placement(&proposed.footprint(), kind.is_road(), &ctx)?;
    let structure = kind.build(Vec2::new(center.x + dx, center.y + dy), rotation);
    log::info!("placed {} at {:?}", structure.kind_name(), structure.center());
    Ok(state.spawn_structure(structure))
}
