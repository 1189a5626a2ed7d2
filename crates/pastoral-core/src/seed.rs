//! World seeding
//!
//! A [`WorldSeed`] describes the starting map: agents, buildings and natural
//! resources. It is plain serde data so scenarios can live in JSON files;
//! [`WorldSeed::demo`] builds the stock start. Injection spawns everything,
//! employs the humans that come with a job and finally clears natural
//! resources off the town hall lots.

use std::fs;
use std::path::Path;

use hecs::Entity;
use pastoral_logic::constants::{distances, timing};
use pastoral_logic::geometry::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::components::*;
use crate::error::SeedError;
use crate::world::WorldState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheepSeed {
    pub center: Vec2,
    pub gender: Gender,
    #[serde(default = "default_sheep_state")]
    pub state: SheepState,
}

fn default_sheep_state() -> SheepState {
    SheepState::Stay
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HumanSeed {
    pub name: String,
    pub gender: Gender,
    pub center: Vec2,
    #[serde(default)]
    pub job: Option<Job>,
    /// Index into [`WorldSeed::town_halls`]; defaults to the first hall.
    #[serde(default)]
    pub employer: Option<usize>,
}

/// A rectangular building given by its center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placed {
    pub center: Vec2,
    #[serde(default)]
    pub rotation: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PenSeed {
    pub center: Vec2,
    #[serde(default)]
    pub rotation: u8,
    #[serde(default)]
    pub gate_open: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YardSeed {
    pub kind: YardKind,
    pub center: Vec2,
    #[serde(default)]
    pub rotation: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSeed {
    pub sheep: Vec<SheepSeed>,
    pub humans: Vec<HumanSeed>,
    pub pens: Vec<PenSeed>,
    pub town_halls: Vec<Placed>,
    pub yards: Vec<YardSeed>,
    pub silos: Vec<Vec2>,
    pub huts: Vec<Vec2>,
    pub farms: Vec<Placed>,
    pub mills: Vec<Placed>,
    pub roads: Vec<Placed>,
    pub trees: Vec<Vec2>,
    pub rocks: Vec<Vec2>,
    pub iron_mines: Vec<Vec2>,
    pub salt: Vec<Vec2>,
}

fn yard_build_kind(kind: YardKind) -> BuildKind {
    match kind {
        YardKind::Lumber => BuildKind::LumberYard,
        YardKind::Stone => BuildKind::StoneYard,
        YardKind::Iron => BuildKind::IronYard,
        YardKind::Salt => BuildKind::SaltYard,
        YardKind::Wool => BuildKind::WoolShed,
    }
}

impl WorldSeed {
    pub fn from_json_str(json: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| SeedError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// The stock start: two pens of sheep on the west side, yards and a
    /// town hall in the middle, woods to the north, rocks and an iron
    /// mine to the east and salt flats in the south.
    pub fn demo() -> Self {
        let sheep = |x: f32, y: f32, gender: Gender| SheepSeed {
            center: Vec2::new(x, y),
            gender,
            state: SheepState::Stay,
        };
        let human = |name: &str, gender: Gender, x: f32, y: f32, job: Option<Job>| HumanSeed {
            name: name.to_string(),
            gender,
            center: Vec2::new(x, y),
            job,
            employer: job.map(|_| 0),
        };
        let at = |x: f32, y: f32| Placed {
            center: Vec2::new(x, y),
            rotation: 0,
        };
        let yard = |kind: YardKind, x: f32, y: f32| YardSeed {
            kind,
            center: Vec2::new(x, y),
            rotation: 0,
        };

        Self {
            sheep: vec![
                sheep(195.0, 190.0, Gender::Male),
                sheep(245.0, 195.0, Gender::Female),
                sheep(200.0, 250.0, Gender::Female),
                sheep(250.0, 255.0, Gender::Female),
                sheep(200.0, 500.0, Gender::Male),
                sheep(250.0, 510.0, Gender::Female),
                sheep(420.0, 420.0, Gender::Male),
                sheep(460.0, 440.0, Gender::Female),
            ],
            humans: vec![
                human("Alder", Gender::Male, 700.0, 280.0, Some(Job::Lumberjack)),
                human("Bram", Gender::Male, 900.0, 500.0, Some(Job::Stoneworker)),
                human("Corin", Gender::Male, 1000.0, 650.0, Some(Job::Miner)),
                human("Dara", Gender::Female, 600.0, 480.0, None),
                human("Elsie", Gender::Female, 660.0, 480.0, None),
            ],
            pens: vec![
                PenSeed {
                    center: Vec2::new(225.0, 225.0),
                    rotation: 0,
                    gate_open: false,
                },
                PenSeed {
                    center: Vec2::new(225.0, 525.0),
                    rotation: 3,
                    gate_open: false,
                },
            ],
            town_halls: vec![at(640.0, 390.0)],
            yards: vec![
                yard(YardKind::Lumber, 560.0, 180.0),
                yard(YardKind::Stone, 880.0, 420.0),
                yard(YardKind::Iron, 1020.0, 560.0),
                yard(YardKind::Salt, 560.0, 640.0),
            ],
            huts: vec![Vec2::new(480.0, 300.0), Vec2::new(800.0, 320.0)],
            trees: vec![
                Vec2::new(700.0, 120.0),
                Vec2::new(760.0, 150.0),
                Vec2::new(820.0, 110.0),
                Vec2::new(880.0, 170.0),
                Vec2::new(940.0, 120.0),
                Vec2::new(1000.0, 190.0),
                Vec2::new(860.0, 250.0),
                // lands on the town hall lot and is cleared at start
                Vec2::new(620.0, 380.0),
            ],
            rocks: vec![
                Vec2::new(980.0, 380.0),
                Vec2::new(1030.0, 420.0),
                Vec2::new(1080.0, 370.0),
            ],
            iron_mines: vec![Vec2::new(1160.0, 520.0)],
            salt: vec![
                Vec2::new(420.0, 660.0),
                Vec2::new(470.0, 700.0),
                Vec2::new(380.0, 710.0),
            ],
            ..Default::default()
        }
    }

    /// Spawn the seed into `state`.
    pub fn inject(&self, state: &mut WorldState) -> Result<(), SeedError> {
        for pen in &self.pens {
            let mut structure = BuildKind::Pen.build(pen.center, pen.rotation);
            if let Structure::Pen(p) = &mut structure {
                p.collision_enabled = !pen.gate_open;
            }
            state.spawn_structure(structure);
        }
        let halls: Vec<Entity> = self
            .town_halls
            .iter()
            .map(|h| state.spawn_structure(BuildKind::TownHall.build(h.center, h.rotation)))
            .collect();
        for y in &self.yards {
            state.spawn_structure(yard_build_kind(y.kind).build(y.center, y.rotation));
        }
        let simple = [
            (BuildKind::Silo, self.silos.iter().map(|c| (*c, 0)).collect::<Vec<_>>()),
            (BuildKind::Hut, self.huts.iter().map(|c| (*c, 0)).collect()),
            (BuildKind::BarleyFarm, self.farms.iter().map(|p| (p.center, p.rotation)).collect()),
            (BuildKind::Mill, self.mills.iter().map(|p| (p.center, p.rotation)).collect()),
            (BuildKind::Road, self.roads.iter().map(|p| (p.center, p.rotation)).collect()),
        ];
        for (kind, places) in simple {
            for (center, rotation) in places {
                state.spawn_structure(kind.build(center, rotation));
            }
        }

        let nodes = [
            (NodeKind::Tree, &self.trees),
            (NodeKind::Rock, &self.rocks),
            (NodeKind::IronMine, &self.iron_mines),
            (NodeKind::Salt, &self.salt),
        ];
        for (kind, centers) in nodes {
            for center in centers {
                state.spawn_resource(NaturalResource::new(kind, *center));
            }
        }

        for s in &self.sheep {
            let timer = state
                .rng
                .gen_range(timing::GRAZE_TIMER_MIN..=timing::GRAZE_TIMER_MAX);
            let mut sheep = Sheep::new(Vec2::ZERO, s.gender, timer);
            sheep.set_center(s.center);
            sheep.state = s.state;
            state.spawn_sheep(sheep);
        }

        for h in &self.humans {
            let mut human = Human::new(h.name.clone(), h.gender, Vec2::ZERO);
            human.set_center(h.center);
            let id = state.spawn_human(human);
            let Some(job) = h.job else {
                continue;
            };
            let index = h.employer.unwrap_or(0);
            let hall = *halls.get(index).ok_or_else(|| SeedError::UnknownEmployer {
                name: h.name.clone(),
                index,
            })?;
            state.hire(hall, id, job).map_err(|source| SeedError::Hire {
                name: h.name.clone(),
                source,
            })?;
        }

        let cleared = clear_town_hall_lots(state);
        log::info!(
            "seeded {} sheep, {} humans, {} buildings; cleared {} resources off town hall lots",
            self.sheep.len(),
            self.humans.len(),
            state.ecs.query::<&Structure>().iter().count(),
            cleared
        );
        Ok(())
    }
}

/// Despawn every natural resource touching a town hall grown by the carve
/// margin. Returns how many were removed.
pub fn clear_town_hall_lots(state: &mut WorldState) -> usize {
    let lots: Vec<_> = state
        .ecs
        .query::<&Structure>()
        .iter()
        .filter_map(|(_, s)| match s {
            Structure::TownHall(t) => Some(t.rect.inflate(distances::TOWN_HALL_CARVE_MARGIN)),
            _ => None,
        })
        .collect();
    let doomed: Vec<Entity> = state
        .ecs
        .query::<&NaturalResource>()
        .iter()
        .filter(|(_, r)| lots.iter().any(|lot| lot.intersects(&r.bounds())))
        .map(|(e, _)| e)
        .collect();
    for e in &doomed {
        let _ = state.ecs.despawn(*e);
    }
    doomed.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;

    #[test]
    fn test_demo_seed_injects() {
        let mut state = WorldState::new(SimConfig::default());
        let seed = WorldSeed::demo();
        seed.inject(&mut state).unwrap();
        assert_eq!(state.sheep_ids().len(), seed.sheep.len());
        assert_eq!(state.human_ids().len(), seed.humans.len());
        let employed = state
            .human_ids()
            .into_iter()
            .filter(|id| state.human(*id).unwrap().is_employed)
            .count();
        assert_eq!(employed, 3);
        // the tree on the hall lot is gone
        assert_eq!(state.live_resources(NodeKind::Tree).len(), seed.trees.len() - 1);
    }

    #[test]
    fn test_seed_from_json() {
        let json = r#"{
            "town_halls": [{ "center": { "x": 400.0, "y": 300.0 } }],
            "humans": [
                {
                    "name": "Ivo",
                    "gender": "male",
                    "center": { "x": 200.0, "y": 200.0 },
                    "job": "miner"
                }
            ],
            "rocks": [{ "x": 700.0, "y": 500.0 }]
        }"#;
        let seed = WorldSeed::from_json_str(json).unwrap();
        let mut state = WorldState::new(SimConfig::default());
        seed.inject(&mut state).unwrap();
        let id = state.human_ids()[0];
        let human = state.human(id).unwrap();
        assert_eq!(human.job, Some(Job::Miner));
        assert_eq!(human.center(), Vec2::new(200.0, 200.0));
    }

    #[test]
    fn test_unknown_enum_rejected() {
        let json = r#"{
            "humans": [{ "name": "X", "gender": "other", "center": { "x": 1.0, "y": 1.0 } }]
        }"#;
        assert!(matches!(WorldSeed::from_json_str(json), Err(SeedError::Parse(_))));
    }

    #[test]
    fn test_missing_employer_rejected() {
        let seed = WorldSeed {
            humans: vec![HumanSeed {
                name: "Lone".into(),
                gender: Gender::Male,
                center: Vec2::new(300.0, 300.0),
                job: Some(Job::Lumberjack),
                employer: Some(2),
            }],
            ..Default::default()
        };
        let mut state = WorldState::new(SimConfig::default());
        assert!(matches!(
            seed.inject(&mut state),
            Err(SeedError::UnknownEmployer { index: 2, .. })
        ));
    }
}
