//! End-to-end scenarios driven through `Simulation::tick`, plus the world
//! invariants checked after every tick of a running demo world.

use pastoral_core::ledger::Commodity;
use pastoral_core::prelude::*;
use pastoral_core::systems::pick_graze_target;
use pastoral_core::world::WorldState;
use pastoral_logic::constants::{capacities, screen, sizes};
use pastoral_logic::geometry::{Rect, Vec2};
use pastoral_logic::grazing::same_side;

const DT: f32 = 1.0 / 60.0;

/// A config whose day never ends during the scenario.
fn long_day() -> SimConfig {
    SimConfig {
        day_duration: 10_000.0,
        ..Default::default()
    }
}

fn employed(sim: &mut Simulation, name: &str, center: Vec2, job: Job) -> hecs::Entity {
    let mut h = Human::new(name, Gender::Male, Vec2::ZERO);
    h.set_center(center);
    h.job = Some(job);
    h.is_employed = true;
    h.state = HumanState::Employed;
    sim.state_mut().spawn_human(h)
}

fn yard(state: &WorldState, id: hecs::Entity) -> StorageYard {
    match &*state.ecs.get::<&Structure>(id).unwrap() {
        Structure::Storage(y) => y.clone(),
        other => panic!("not a yard: {:?}", other),
    }
}

// ── S1: one lumberjack, one tree ──────────────────────────────────

#[test]
fn test_single_lumberjack_clears_a_tree() {
    let mut sim = Simulation::new(long_day());
    sim.state_mut()
        .spawn_resource(NaturalResource::new(NodeKind::Tree, Vec2::new(500.0, 400.0)));
    let lumber = sim.state_mut().spawn_structure(Structure::Storage(StorageYard::new(
        YardKind::Lumber,
        Vec2::new(50.0, 300.0),
        0,
    )));
    employed(&mut sim, "Jack", Vec2::new(250.0, 300.0), Job::Lumberjack);

    for _ in 0..(60 * 240) {
        sim.tick(DT);
        if yard(sim.state(), lumber).inventory == 20 {
            break;
        }
    }
    assert_eq!(yard(sim.state(), lumber).inventory, 20);
    assert_eq!(sim.state().ledger.get(Commodity::Log), 20);
    assert!(sim.state().live_resources(NodeKind::Tree).is_empty());
}

// ── S2: full yard sends the worker to the town hall ───────────────

#[test]
fn test_full_yard_sends_worker_to_town_hall() {
    let mut sim = Simulation::new(long_day());
    let mut almost_full = StorageYard::new(YardKind::Lumber, Vec2::new(50.0, 300.0), 0);
    almost_full.inventory = almost_full.capacity - 1;
    let lumber = sim.state_mut().spawn_structure(Structure::Storage(almost_full));
    let hall = sim
        .state_mut()
        .spawn_structure(Structure::TownHall(TownHall::new(Vec2::new(400.0, 500.0), 0)));
    sim.state_mut()
        .spawn_resource(NaturalResource::new(NodeKind::Tree, Vec2::new(300.0, 200.0)));
    let id = employed(&mut sim, "Jack", Vec2::new(160.0, 330.0), Job::Lumberjack);
    let mut h = sim.state().human(id).unwrap();
    h.carrying = Some(ResourceKind::Log);
    sim.state_mut().put_human(id, h);

    for _ in 0..(60 * 10) {
        sim.tick(DT);
    }
    assert_eq!(yard(sim.state(), lumber).inventory, capacities::LUMBER_YARD);
    let h = sim.state().human(id).unwrap();
    assert_eq!(h.state, HumanState::Employed);
    assert!(h.in_downtime());
    let hall_rect = sim.state().ecs.get::<&Structure>(hall).unwrap().bounds();
    assert!(hall_rect.contains_point(h.center()));
}

// ── S3: huts ──────────────────────────────────────────────────────

#[test]
fn test_hut_claimed_by_nearest_and_released_on_firing() {
    let mut sim = Simulation::new(long_day());
    let hut = sim
        .state_mut()
        .spawn_structure(Structure::Hut(Hut::new(Vec2::new(600.0, 400.0))));
    let near = employed(&mut sim, "Near", Vec2::new(640.0, 400.0), Job::Miner);
    let far = employed(&mut sim, "Far", Vec2::new(800.0, 400.0), Job::Miner);

    sim.tick(DT);
    let owner = |sim: &Simulation| match &*sim.state().ecs.get::<&Structure>(hut).unwrap() {
        Structure::Hut(h) => h.owner,
        _ => None,
    };
    assert_eq!(owner(&sim), Some(near));
    assert_eq!(sim.state().human(near).unwrap().home_hut, Some(hut));
    assert_eq!(sim.state().human(far).unwrap().home_hut, None);

    let mut h = sim.state().human(near).unwrap();
    h.is_employed = false;
    h.state = HumanState::Stay;
    sim.state_mut().put_human(near, h);
    sim.tick(DT);
    assert_eq!(owner(&sim), None);
    assert_eq!(sim.state().human(near).unwrap().home_hut, None);
}

// ── S4: one full day cycle ────────────────────────────────────────

#[test]
fn test_full_cycle_rolls_day_and_regrows_grass() {
    let mut sim = Simulation::default();
    for x in 0..50 {
        for y in 0..20 {
            sim.state_mut().eaten_grass.insert((400 + x, 300 + y));
        }
    }
    let before = sim.state().eaten_grass.len();
    assert_eq!(sim.current_day(), 1);

    let mut rollovers = 0;
    let mut ticks = 0;
    loop {
        ticks += 1;
        rollovers += sim.tick(DT).new_day.is_some() as usize;
        if rollovers > 0 && sim.state().clock.elapsed == 0.0 {
            break;
        }
        assert!(ticks < 60 * 300, "cycle never completed");
    }
    assert_eq!(rollovers, 1);
    assert_eq!(sim.current_day(), 2);
    assert_eq!(sim.state().clock.darkness_alpha(), 0.0);

    let removed = before - sim.state().eaten_grass.len();
    assert!(removed >= 100 && removed <= 200, "regrew {} of {}", removed, before);
}

// ── S6: grazing and pen walls ─────────────────────────────────────

#[test]
fn test_graze_targets_never_cross_pen_walls() {
    let mut state = WorldState::new(SimConfig::default());
    state.spawn_structure(Structure::Pen(Pen::new(Vec2::new(300.0, 300.0), 0)));
    let pens = state.closed_pen_rects();
    let pen = Rect::new(300.0, 300.0, sizes::PEN_SIZE, sizes::PEN_SIZE);

    let outside = Vec2::new(280.0, 375.0);
    let inside = Vec2::new(320.0, 375.0);
    let mut picked = 0;
    for i in 0..1000 {
        let from = if i % 2 == 0 { outside } else { inside };
        if let Some(target) = pick_graze_target(&mut state, from, from, &pens) {
            picked += 1;
            assert!(same_side(&pen, from, target), "{:?} -> {:?}", from, target);
        }
    }
    assert!(picked > 900);
}

// ── Mill timing ───────────────────────────────────────────────────

#[test]
fn test_grain_mills_after_processing_time() {
    let mut sim = Simulation::new(long_day());
    let mut mill = Mill::new(Vec2::new(600.0, 400.0), 0);
    mill.add_barley();
    sim.state_mut().spawn_structure(Structure::Mill(mill));

    let mut flour = 0;
    for _ in 0..9 {
        flour += sim.tick(0.5).flour;
    }
    assert_eq!(flour, 0);
    flour += sim.tick(0.5).flour;
    assert_eq!(flour, capacities::FLOUR_PER_GRAIN);
    assert_eq!(sim.state().ledger.get(Commodity::Flour), capacities::FLOUR_PER_GRAIN);
}

// ── Invariants ────────────────────────────────────────────────────

fn check_invariants(sim: &Simulation) {
    let state = sim.state();
    let humans: Vec<Human> = state
        .human_ids()
        .into_iter()
        .filter_map(|id| state.human(id))
        .collect();
    for h in &humans {
        assert!((0.0..=100.0).contains(&h.happiness), "{} happiness {}", h.name, h.happiness);
        assert!(h.pos.x >= 0.0 && h.pos.x <= screen::WIDTH - h.size, "{} x {}", h.name, h.pos.x);
        assert!(
            h.pos.y >= screen::PLAY_TOP && h.pos.y <= screen::PLAY_BOTTOM - h.size,
            "{} y {}",
            h.name,
            h.pos.y
        );
    }
    for (i, a) in humans.iter().enumerate() {
        for b in &humans[i + 1..] {
            assert!(
                a.center().distance(&b.center()) >= sizes::HUMAN_COLLISION_RADIUS - 1e-3,
                "{} and {} overlap",
                a.name,
                b.name
            );
        }
    }

    for (_, s) in state.ecs.query::<&Structure>().iter() {
        match s {
            Structure::Storage(y) => assert!(y.inventory <= y.capacity),
            Structure::Mill(m) => {
                assert!(m.flour <= capacities::MILL_FLOUR);
                assert!(m.malt <= capacities::MILL_MALT);
            }
            Structure::Hut(hut) => {
                if let Some(owner) = hut.owner {
                    assert!(state.human(owner).is_some());
                }
            }
            _ => {}
        }
    }
    for (_, r) in state.ecs.query::<&NaturalResource>().iter() {
        assert!(r.health > 0, "depleted {:?} still present", r.kind);
    }
}

#[test]
fn test_demo_world_keeps_invariants() {
    let mut sim = Simulation::with_seed(SimConfig::default(), &WorldSeed::demo()).unwrap();
    check_invariants(&sim);
    for _ in 0..(60 * 30) {
        sim.tick(DT);
        check_invariants(&sim);
    }
}

#[test]
fn test_zero_tick_is_idempotent() {
    let mut sim = Simulation::with_seed(SimConfig::default(), &WorldSeed::demo()).unwrap();
    for _ in 0..120 {
        sim.tick(DT);
    }
    sim.tick(0.0);
    let first = sim.snapshot();
    sim.tick(0.0);
    assert_eq!(sim.snapshot(), first);
}

#[test]
fn test_same_seed_replays_identically() {
    let run = || {
        let mut sim = Simulation::with_seed(SimConfig::default(), &WorldSeed::demo()).unwrap();
        for _ in 0..(60 * 20) {
            sim.tick(DT);
        }
        sim.snapshot()
    };
    assert_eq!(run(), run());
}
