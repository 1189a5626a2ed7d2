//! World state container.
//!
//! Owns the ECS world holding every agent, structure and resource, plus the
//! player, clock, ledger, RNG and UI mode flags. Agents refer to other
//! entities by `hecs::Entity`; a failed lookup means the target is gone.

use std::collections::BTreeSet;

use hecs::{Entity, World};
use pastoral_logic::constants::{screen, sizes};
use pastoral_logic::day_cycle::DayClock;
use pastoral_logic::geometry::{Rect, Vec2};
use pastoral_logic::pathfinding::RoadSegment;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::components::*;
use crate::config::SimConfig;
use crate::error::HireError;
use crate::input::MenuRequest;
use crate::ledger::ResourceLedger;
use crate::messages::MessageLog;

/// Keyboard movement snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveKeys {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    /// Top-left corner.
    pub pos: Vec2,
    pub size: f32,
    pub keys: MoveKeys,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            size: sizes::PLAYER_SIZE,
            keys: MoveKeys::default(),
        }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.pos.x + self.size / 2.0, self.pos.y + self.size / 2.0)
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size, self.size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildMode {
    pub kind: BuildKind,
    pub rotation: u8,
}

pub struct WorldState {
    pub ecs: World,
    pub player: Player,
    /// Grazed pixels, drawn darker until they regrow.
    pub eaten_grass: BTreeSet<(i32, i32)>,
    pub clock: DayClock,
    pub ledger: ResourceLedger,
    pub rng: ChaCha8Rng,
    pub messages: MessageLog,
    pub config: SimConfig,
    pub debug: bool,
    pub build: Option<BuildMode>,
    pub harvest_cursor: bool,
    pub cursor: Vec2,
    /// Start of an in-progress box selection.
    pub drag_start: Option<Vec2>,
    pub open_menu: Option<MenuRequest>,
}

impl WorldState {
    pub fn new(config: SimConfig) -> Self {
        let center = Vec2::new(
            screen::WIDTH / 2.0 - sizes::PLAYER_SIZE / 2.0,
            (screen::PLAY_TOP + screen::PLAY_BOTTOM) / 2.0 - sizes::PLAYER_SIZE / 2.0,
        );
        Self {
            ecs: World::new(),
            player: Player::new(center),
            eaten_grass: BTreeSet::new(),
            clock: config.day_clock(),
            ledger: ResourceLedger::new(),
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            messages: MessageLog::default(),
            config,
            debug: false,
            build: None,
            harvest_cursor: false,
            cursor: Vec2::ZERO,
            drag_start: None,
            open_menu: None,
        }
    }

    // ── Spawning ──────────────────────────────────────────────────

    pub fn spawn_sheep(&mut self, sheep: Sheep) -> Entity {
        self.ecs.spawn((sheep,))
    }

    pub fn spawn_human(&mut self, human: Human) -> Entity {
        self.ecs.spawn((human,))
    }

    pub fn spawn_structure(&mut self, structure: Structure) -> Entity {
        self.ecs.spawn((structure,))
    }

    pub fn spawn_resource(&mut self, resource: NaturalResource) -> Entity {
        self.ecs.spawn((resource,))
    }

    // ── Lookups ───────────────────────────────────────────────────

    /// Human ids in a stable order.
    pub fn human_ids(&self) -> Vec<Entity> {
        let mut ids: Vec<Entity> = self.ecs.query::<&Human>().iter().map(|(e, _)| e).collect();
        ids.sort_by_key(|e| e.to_bits());
        ids
    }

    pub fn sheep_ids(&self) -> Vec<Entity> {
        let mut ids: Vec<Entity> = self.ecs.query::<&Sheep>().iter().map(|(e, _)| e).collect();
        ids.sort_by_key(|e| e.to_bits());
        ids
    }

    pub fn human(&self, id: Entity) -> Option<Human> {
        self.ecs.get::<&Human>(id).ok().map(|h| (*h).clone())
    }

    pub fn put_human(&mut self, id: Entity, human: Human) {
        if let Ok(mut slot) = self.ecs.get::<&mut Human>(id) {
            *slot = human;
        }
    }

    pub fn sheep(&self, id: Entity) -> Option<Sheep> {
        self.ecs.get::<&Sheep>(id).ok().map(|s| (*s).clone())
    }

    pub fn put_sheep(&mut self, id: Entity, sheep: Sheep) {
        if let Ok(mut slot) = self.ecs.get::<&mut Sheep>(id) {
            *slot = sheep;
        }
    }

    /// Structures matching `pred`, with their center, in a stable order.
    pub fn structures_where(&self, pred: impl Fn(&Structure) -> bool) -> Vec<(Entity, Vec2)> {
        let mut found: Vec<(Entity, Vec2)> = self
            .ecs
            .query::<&Structure>()
            .iter()
            .filter(|(_, s)| pred(s))
            .map(|(e, s)| (e, s.center()))
            .collect();
        found.sort_by_key(|(e, _)| e.to_bits());
        found
    }

    pub fn structure_center(&self, id: Entity) -> Option<Vec2> {
        self.ecs.get::<&Structure>(id).ok().map(|s| s.center())
    }

    pub fn town_hall_exists(&self) -> bool {
        self.ecs
            .query::<&Structure>()
            .iter()
            .any(|(_, s)| matches!(s, Structure::TownHall(_)))
    }

    pub fn nearest_town_hall(&self, from: Vec2) -> Option<Entity> {
        nearest(
            self.structures_where(|s| matches!(s, Structure::TownHall(_))),
            from,
        )
    }

    /// Live resource nodes of `kind`, with their center.
    pub fn live_resources(&self, kind: NodeKind) -> Vec<(Entity, Vec2)> {
        let mut found: Vec<(Entity, Vec2)> = self
            .ecs
            .query::<&NaturalResource>()
            .iter()
            .filter(|(_, r)| r.kind == kind && !r.is_depleted())
            .map(|(e, r)| (e, r.center))
            .collect();
        found.sort_by_key(|(e, _)| e.to_bits());
        found
    }

    pub fn resource_alive(&self, id: Entity) -> bool {
        self.ecs
            .get::<&NaturalResource>(id)
            .map(|r| !r.is_depleted())
            .unwrap_or(false)
    }

    /// Storage yards of `kind` with room for one more unit.
    pub fn yards_with_space(&self, kind: YardKind) -> Vec<(Entity, Vec2)> {
        self.structures_where(|s| {
            matches!(s, Structure::Storage(y) if y.kind == kind && y.has_space())
        })
    }

    pub fn road_segments(&self) -> Vec<RoadSegment> {
        let mut roads: Vec<RoadSegment> = self
            .ecs
            .query::<&Structure>()
            .iter()
            .filter_map(|(e, s)| match s {
                Structure::Road(r) => Some(RoadSegment::new(e.to_bits().get(), r.rect)),
                _ => None,
            })
            .collect();
        roads.sort_by_key(|r| r.id);
        roads
    }

    /// Outer squares of pens whose gate is closed.
    pub fn closed_pen_rects(&self) -> Vec<Rect> {
        self.structures_where(|s| matches!(s, Structure::Pen(p) if p.collision_enabled))
            .into_iter()
            .filter_map(|(e, _)| self.ecs.get::<&Structure>(e).ok().map(|s| s.bounds()))
            .collect()
    }

    // ── Employment ────────────────────────────────────────────────

    /// Employ `human` at `hall` as `job`.
    pub fn hire(&mut self, hall: Entity, human: Entity, job: Job) -> Result<(), HireError> {
        let mut worker = self.human(human).ok_or(HireError::NotAHuman)?;
        if worker.is_employed {
            return Err(HireError::AlreadyEmployed);
        }
        {
            let mut structure = self
                .ecs
                .get::<&mut Structure>(hall)
                .map_err(|_| HireError::NotATownHall)?;
            let Structure::TownHall(town_hall) = &mut *structure else {
                return Err(HireError::NotATownHall);
            };
            town_hall.take_slot(job, human)?;
        }
        worker.job = Some(job);
        worker.employer = Some(hall);
        worker.is_employed = true;
        worker.state = HumanState::Employed;
        worker.search_cooldown = 0.0;
        worker.reset_worker();
        log::info!("{} hired as {:?}", worker.name, job);
        self.put_human(human, worker);
        Ok(())
    }

    /// Release `human` from their job. Returns false if they had none.
    pub fn fire(&mut self, human: Entity) -> bool {
        let Some(mut worker) = self.human(human) else {
            return false;
        };
        if !worker.is_employed {
            return false;
        }
        if let (Some(hall), Some(job)) = (worker.employer, worker.job) {
            if let Ok(mut structure) = self.ecs.get::<&mut Structure>(hall) {
                if let Structure::TownHall(town_hall) = &mut *structure {
                    town_hall.release_slot(job, human);
                }
            }
        }
        if let Some(hut) = worker.home_hut.take() {
            self.release_hut(hut, human);
        }
        self.release_farm(human);
        log::info!("{} fired from {:?}", worker.name, worker.job);
        worker.job = None;
        worker.employer = None;
        worker.is_employed = false;
        worker.carrying = None;
        worker.state = HumanState::Stay;
        worker.reset_worker();
        self.put_human(human, worker);
        true
    }

    pub(crate) fn release_hut(&mut self, hut: Entity, owner: Entity) {
        if let Ok(mut structure) = self.ecs.get::<&mut Structure>(hut) {
            if let Structure::Hut(h) = &mut *structure {
                if h.owner == Some(owner) {
                    h.owner = None;
                }
            }
        }
    }

    /// Free any farm reserved by `farmer`.
    pub(crate) fn release_farm(&mut self, farmer: Entity) {
        for (_, structure) in self.ecs.query_mut::<&mut Structure>() {
            if let Structure::Farm(farm) = structure {
                if farm.farmer == Some(farmer) {
                    farm.farmer = None;
                }
            }
        }
    }
}

/// Nearest candidate to `from`; ties go to the first in the list.
pub fn nearest(candidates: Vec<(Entity, Vec2)>, from: Vec2) -> Option<Entity> {
    nearest_within(candidates, from, f32::INFINITY)
}

pub fn nearest_within(candidates: Vec<(Entity, Vec2)>, from: Vec2, radius: f32) -> Option<Entity> {
    candidates
        .into_iter()
        .map(|(e, p)| (e, p.distance(&from)))
        .filter(|(_, d)| *d <= radius)
        .fold(None, |best: Option<(Entity, f32)>, (e, d)| match best {
            Some((_, bd)) if bd <= d => best,
            _ => Some((e, d)),
        })
        .map(|(e, _)| e)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> WorldState {
        WorldState::new(SimConfig::default())
    }

    #[test]
    fn test_hire_and_fire_keep_slots_consistent() {
        let mut world = state();
        let hall = world.spawn_structure(Structure::TownHall(TownHall::new(
            Vec2::new(100.0, 100.0),
            0,
        )));
        let bob = world.spawn_human(Human::new("Bob", Gender::Male, Vec2::new(300.0, 300.0)));
        let hut = world.spawn_structure(Structure::Hut(Hut::new(Vec2::new(400.0, 300.0))));

        world.hire(hall, bob, Job::Miner).unwrap();
        assert_eq!(world.hire(hall, bob, Job::Miner), Err(HireError::AlreadyEmployed));
        {
            let s = world.ecs.get::<&Structure>(hall).unwrap();
            let Structure::TownHall(t) = &*s else { panic!() };
            assert_eq!(t.slot(Job::Miner).filled, 1);
            assert_eq!(t.employees, vec![bob]);
        }

        // give him the hut, then fire him
        if let Ok(mut s) = world.ecs.get::<&mut Structure>(hut) {
            if let Structure::Hut(h) = &mut *s {
                h.owner = Some(bob);
            }
        }
        let mut h = world.human(bob).unwrap();
        h.home_hut = Some(hut);
        world.put_human(bob, h);

        assert!(world.fire(bob));
        let h = world.human(bob).unwrap();
        assert!(!h.is_employed);
        assert_eq!(h.state, HumanState::Stay);
        assert_eq!(h.home_hut, None);
        let s = world.ecs.get::<&Structure>(hall).unwrap();
        let Structure::TownHall(t) = &*s else { panic!() };
        assert_eq!(t.total_filled(), 0);
        drop(s);
        let s = world.ecs.get::<&Structure>(hut).unwrap();
        let Structure::Hut(hut) = &*s else { panic!() };
        assert_eq!(hut.owner, None);
    }

    #[test]
    fn test_hire_rejects_non_hall() {
        let mut world = state();
        let hut = world.spawn_structure(Structure::Hut(Hut::new(Vec2::new(400.0, 300.0))));
        let bob = world.spawn_human(Human::new("Bob", Gender::Male, Vec2::new(300.0, 300.0)));
        assert_eq!(world.hire(hut, bob, Job::Miner), Err(HireError::NotATownHall));
        assert_eq!(world.hire(hut, hut, Job::Miner), Err(HireError::NotAHuman));
    }

    #[test]
    fn test_nearest_within_radius() {
        let mut world = state();
        let a = world.spawn_resource(NaturalResource::new(NodeKind::Rock, Vec2::new(100.0, 100.0)));
        let b = world.spawn_resource(NaturalResource::new(NodeKind::Rock, Vec2::new(400.0, 100.0)));
        let rocks = world.live_resources(NodeKind::Rock);
        assert_eq!(nearest(rocks.clone(), Vec2::new(350.0, 100.0)), Some(b));
        assert_eq!(nearest_within(rocks.clone(), Vec2::new(90.0, 100.0), 50.0), Some(a));
        assert_eq!(nearest_within(rocks, Vec2::new(250.0, 400.0), 50.0), None);
    }
}
