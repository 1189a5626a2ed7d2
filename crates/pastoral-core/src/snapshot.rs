//! Read-only snapshot of the world for renderers, tests and tooling.
//!
//! Entities are flattened to their `u64` bits so the whole snapshot can be
//! serialized and compared. Lists are ordered by entity id, which keeps two
//! snapshots of the same world equal.

use hecs::Entity;
use pastoral_logic::day_cycle::{DayPhase, TimeOfDay};
use pastoral_logic::geometry::{Rect, Vec2};
use serde::Serialize;

use crate::components::*;
use crate::ledger::Commodity;
use crate::world::WorldState;

fn id(e: Entity) -> u64 {
    e.to_bits().get()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheepView {
    pub id: u64,
    pub center: Vec2,
    pub gender: Gender,
    pub state: SheepState,
    pub selected: bool,
    pub has_wool: bool,
    pub graze_target: Option<Vec2>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HumanView {
    pub id: u64,
    pub name: String,
    pub center: Vec2,
    pub gender: Gender,
    pub state: HumanState,
    /// Short label for the current activity.
    pub task: &'static str,
    pub selected: bool,
    pub job: Option<Job>,
    pub employer: Option<u64>,
    pub happiness: f32,
    pub carrying: Option<ResourceKind>,
    pub home_hut: Option<u64>,
    pub asleep: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructureView {
    pub id: u64,
    pub kind: &'static str,
    pub bounds: Rect,
    pub rotation: u8,
    /// Yard inventory, silo barley or mill flour.
    pub stock: Option<u32>,
    pub capacity: Option<u32>,
    pub gate_closed: Option<bool>,
    pub owner: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceView {
    pub id: u64,
    pub kind: NodeKind,
    pub center: Vec2,
    pub health: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorldSnapshot {
    pub day: u32,
    pub elapsed: f32,
    pub phase: DayPhase,
    pub time_of_day: TimeOfDay,
    pub darkness: f32,
    pub player: Vec2,
    pub sheep: Vec<SheepView>,
    pub humans: Vec<HumanView>,
    pub structures: Vec<StructureView>,
    pub resources: Vec<ResourceView>,
    pub eaten_grass: usize,
    pub ledger: Vec<(Commodity, u32)>,
    pub messages: Vec<String>,
}

fn task_label(activity: &Activity) -> &'static str {
    match activity {
        Activity::Idle => "idle",
        Activity::Wander(_) => "wander",
        Activity::Sleep(_) => "sleep",
        Activity::Gather(_) => "gather",
        Activity::Farm(_) => "farm",
        Activity::Mill(_) => "mill",
        Activity::Downtime(_) => "downtime",
    }
}

fn structure_view(e: Entity, s: &Structure) -> StructureView {
    let mut view = StructureView {
        id: id(e),
        kind: s.kind_name(),
        bounds: s.bounds(),
        rotation: 0,
        stock: None,
        capacity: None,
        gate_closed: None,
        owner: None,
    };
    match s {
        Structure::Pen(p) => {
            view.rotation = p.rotation;
            view.gate_closed = Some(p.collision_enabled);
        }
        Structure::TownHall(t) => view.rotation = t.rotation,
        Structure::Storage(y) => {
            view.rotation = y.rotation;
            view.stock = Some(y.inventory);
            view.capacity = Some(y.capacity);
        }
        Structure::Silo(silo) => view.stock = Some(silo.barley),
        Structure::Hut(h) => view.owner = h.owner.map(id),
        Structure::Farm(f) => {
            view.rotation = f.rotation;
            view.owner = f.farmer.map(id);
        }
        Structure::Mill(m) => {
            view.rotation = m.rotation;
            view.stock = Some(m.flour);
        }
        Structure::Road(r) => view.rotation = r.rotation,
    }
    view
}

impl WorldSnapshot {
    pub fn capture(state: &WorldState) -> Self {
        let mut sheep: Vec<SheepView> = state
            .ecs
            .query::<&Sheep>()
            .iter()
            .map(|(e, s)| SheepView {
                id: id(e),
                center: s.center(),
                gender: s.gender,
                state: s.state,
                selected: s.selected,
                has_wool: s.has_wool,
                graze_target: s.graze_target,
            })
            .collect();
        sheep.sort_by_key(|s| s.id);

        let mut humans: Vec<HumanView> = state
            .ecs
            .query::<&Human>()
            .iter()
            .map(|(e, h)| HumanView {
                id: id(e),
                name: h.name.clone(),
                center: h.center(),
                gender: h.gender,
                state: h.state,
                task: task_label(&h.activity),
                selected: h.selected,
                job: h.job,
                employer: h.employer.map(id),
                happiness: h.happiness,
                carrying: h.carrying,
                home_hut: h.home_hut.map(id),
                asleep: h.is_asleep(),
            })
            .collect();
        humans.sort_by_key(|h| h.id);

        let mut structures: Vec<StructureView> = state
            .ecs
            .query::<&Structure>()
            .iter()
            .map(|(e, s)| structure_view(e, s))
            .collect();
        structures.sort_by_key(|s| s.id);

        let mut resources: Vec<ResourceView> = state
            .ecs
            .query::<&NaturalResource>()
            .iter()
            .map(|(e, r)| ResourceView {
                id: id(e),
                kind: r.kind,
                center: r.center,
                health: r.health,
            })
            .collect();
        resources.sort_by_key(|r| r.id);

        Self {
            day: state.clock.current_day,
            elapsed: state.clock.elapsed,
            phase: state.clock.phase(),
            time_of_day: state.clock.time_of_day(),
            darkness: state.clock.darkness_alpha(),
            player: state.player.center(),
            sheep,
            humans,
            structures,
            resources,
            eaten_grass: state.eaten_grass.len(),
            ledger: state.ledger.totals(),
            messages: state.messages.active().map(str::to_owned).collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Stock of every yard of `kind`, in id order.
    pub fn yard_stock(&self, kind: &str) -> Vec<u32> {
        self.structures
            .iter()
            .filter(|s| s.kind == kind)
            .filter_map(|s| s.stock)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;

    #[test]
    fn test_capture_lists_everything() {
        let mut state = WorldState::new(SimConfig::default());
        state.spawn_sheep(Sheep::new(Vec2::new(300.0, 300.0), Gender::Female, 5.0));
        let hut = state.spawn_structure(Structure::Hut(Hut::new(Vec2::new(500.0, 300.0))));
        state.spawn_human(Human::new("Ann", Gender::Female, Vec2::new(400.0, 300.0)));
        state.spawn_resource(NaturalResource::new(NodeKind::Salt, Vec2::new(700.0, 500.0)));

        let snap = WorldSnapshot::capture(&state);
        assert_eq!(snap.sheep.len(), 1);
        assert_eq!(snap.humans[0].name, "Ann");
        assert_eq!(snap.humans[0].task, "idle");
        assert_eq!(snap.structures[0].id, hut.to_bits().get());
        assert_eq!(snap.structures[0].kind, "hut");
        assert_eq!(snap.resources[0].health, 80);
        assert_eq!(snap.day, 1);
        assert!(snap.to_json().unwrap().contains("\"Ann\""));
    }

    #[test]
    fn test_snapshots_of_same_world_are_equal() {
        let mut state = WorldState::new(SimConfig::default());
        state.spawn_structure(Structure::Storage(StorageYard::new(
            YardKind::Stone,
            Vec2::new(100.0, 100.0),
            0,
        )));
        assert_eq!(WorldSnapshot::capture(&state), WorldSnapshot::capture(&state));
        assert_eq!(WorldSnapshot::capture(&state).yard_stock("stone_yard"), vec![0]);
    }
}
