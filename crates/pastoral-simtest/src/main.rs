//! Pastoral Headless Simulation Harness
//!
//! Drives the simulation in-process and checks the behaviour a player would
//! notice: the day cycle, road following, gathering, downtime and the
//! world invariants. No rendering, no input devices.
//!
//! Usage:
//!   cargo run -p pastoral-simtest
//!   cargo run -p pastoral-simtest -- --verbose --seconds 120
//!   cargo run -p pastoral-simtest -- --seed world.json --config sim.json

use std::path::PathBuf;

use clap::Parser;
use pastoral_core::ledger::Commodity;
use pastoral_core::prelude::*;
use pastoral_core::world::WorldState;
use pastoral_logic::constants::{capacities, screen, sizes};
use pastoral_logic::day_cycle::{DayClock, DayPhase};
use pastoral_logic::geometry::{Rect, Vec2};
use pastoral_logic::happiness::{happiness_ceiling, HappinessInput};
use pastoral_logic::pathfinding::{next_waypoint, refine_road_hint, PathQuery, RoadId, RoadSegment};

const DT: f32 = 1.0 / 60.0;

#[derive(Parser)]
#[command(name = "pastoral-simtest")]
#[command(about = "Headless scenario checks for the pastoral sandbox")]
struct Cli {
    /// Print every check, not only failures
    #[arg(short, long)]
    verbose: bool,

    /// Log filter passed to env_logger
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// World seed JSON for the soak run (defaults to the demo world)
    #[arg(long)]
    seed: Option<PathBuf>,

    /// Simulation config JSON (defaults to the built-in tuning)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Simulated seconds for the soak run
    #[arg(long, default_value = "60")]
    seconds: u32,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

impl TestResult {
    fn new(name: &str, passed: bool, detail: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            passed,
            detail: detail.into(),
        }
    }
}

fn main() {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();
    println!("=== Pastoral Simulation Harness ===\n");

    let mut results = Vec::new();

    // 1. Day cycle timing
    results.extend(validate_day_cycle(cli.verbose));

    // 2. Happiness ceilings
    results.extend(validate_happiness(cli.verbose));

    // 3. Road following on a synthetic network
    results.extend(validate_pathfinding(cli.verbose));

    // 4. Gathering and downtime through the full tick
    results.extend(validate_gathering(cli.verbose));

    // 5. Seeded world soak with invariants
    results.extend(validate_world_soak(&cli));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || cli.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

// ── 1. Day Cycle ────────────────────────────────────────────────────────

fn validate_day_cycle(verbose: bool) -> Vec<TestResult> {
    println!("--- Day Cycle ---");
    let mut results = Vec::new();

    let mut clock = DayClock::default();
    let cycle = clock.cycle_length();
    let mut increments = 0;
    let mut phases = Vec::new();
    let mut t = 0.0;
    while t < cycle - DT {
        if clock.advance(DT).is_some() {
            increments += 1;
        }
        let phase = clock.phase();
        if phases.last() != Some(&phase) {
            phases.push(phase);
        }
        t += DT;
    }
    // Finish the cycle exactly.
    if clock.advance(cycle).is_some() {
        increments += 1;
    }

    results.push(TestResult::new(
        "day_cycle_single_increment",
        increments == 1 && clock.current_day == 2,
        format!("{} increments over one cycle, day {}", increments, clock.current_day),
    ));
    results.push(TestResult::new(
        "day_cycle_phase_order",
        phases == [DayPhase::Day, DayPhase::Dusk, DayPhase::Night, DayPhase::Dawn],
        format!("{:?}", phases),
    ));
    results.push(TestResult::new(
        "day_cycle_bright_after_wrap",
        clock.elapsed == 0.0 && clock.darkness_alpha() == 0.0,
        format!("elapsed {:.2}, alpha {:.2}", clock.elapsed, clock.darkness_alpha()),
    ));

    if verbose {
        println!("  cycle length {:.1}s, phases {:?}", cycle, phases);
    }
    results
}

// ── 2. Happiness ────────────────────────────────────────────────────────

fn validate_happiness(verbose: bool) -> Vec<TestResult> {
    println!("--- Happiness ---");
    let mut results = Vec::new();

    let content = HappinessInput {
        is_employed: true,
        owns_hut: true,
        town_hall_exists: true,
        is_hungry: false,
    };
    let forlorn = HappinessInput::default();
    let top = happiness_ceiling(&content);
    let bottom = happiness_ceiling(&forlorn);

    results.push(TestResult::new(
        "happiness_ceiling_full",
        top == 100.0,
        format!("ceiling {:.1}", top),
    ));
    results.push(TestResult::new(
        "happiness_ceiling_ordering",
        (0.0..top).contains(&bottom),
        format!("worst case ceiling {:.1}", bottom),
    ));

    if verbose {
        println!("  ceilings: content {:.1}, forlorn {:.1}", top, bottom);
    }
    results
}

// ── 3. Pathfinding ──────────────────────────────────────────────────────

fn validate_pathfinding(verbose: bool) -> Vec<TestResult> {
    println!("--- Road Pathfinding ---");
    let mut results = Vec::new();

    let roads = vec![
        RoadSegment::new(1, Rect::new(100.0, 100.0, 60.0, 30.0)),
        RoadSegment::new(2, Rect::new(130.0, 130.0, 30.0, 60.0)),
    ];
    let rects: Vec<Rect> = roads.iter().map(|r| r.rect).collect();
    let off_road = move |p: Vec2| !rects.iter().any(|r| r.contains_point(p));

    let goal = Vec2::new(145.0, 180.0);
    let mut pos = Vec2::new(110.0, 115.0);
    let mut hint = None;
    let mut visited: Vec<RoadId> = Vec::new();
    let mut frames = 0;
    let mut arrived = false;
    while frames < 300 {
        if pos.distance(&goal) < 1.0 {
            arrived = true;
            break;
        }
        let step = next_waypoint(
            &PathQuery {
                position: pos,
                goal,
                previous_road: hint,
            },
            &roads,
            &off_road,
        );
        if let Some(id) = step.on_road {
            if visited.last() != Some(&id) {
                visited.push(id);
            }
        }
        if step.is_stalled() {
            break;
        }
        hint = refine_road_hint(hint, &step, &roads, goal);
        pos = pos.step_toward(&step.target, 5.0);
        frames += 1;
    }

    results.push(TestResult::new(
        "road_l_intersection_arrives",
        arrived,
        format!("{} frames, ended at ({:.1}, {:.1})", frames, pos.x, pos.y),
    ));
    results.push(TestResult::new(
        "road_l_intersection_no_doubling_back",
        visited == [1, 2],
        format!("roads visited {:?}", visited),
    ));

    if verbose {
        println!("  walked {} frames over roads {:?}", frames, visited);
    }
    results
}

// ── 4. Gathering ────────────────────────────────────────────────────────

fn long_day() -> SimConfig {
    SimConfig {
        day_duration: 10_000.0,
        ..Default::default()
    }
}

fn spawn_worker(sim: &mut Simulation, name: &str, center: Vec2, job: Job) -> hecs::Entity {
    let mut h = Human::new(name, Gender::Male, Vec2::ZERO);
    h.set_center(center);
    h.job = Some(job);
    h.is_employed = true;
    h.state = HumanState::Employed;
    sim.state_mut().spawn_human(h)
}

fn yard_inventory(state: &WorldState, id: hecs::Entity) -> Option<u32> {
    match &*state.ecs.get::<&Structure>(id).ok()? {
        Structure::Storage(y) => Some(y.inventory),
        _ => None,
    }
}

fn validate_gathering(verbose: bool) -> Vec<TestResult> {
    println!("--- Gathering & Downtime ---");
    let mut results = Vec::new();

    // One lumberjack fells one tree into an empty yard.
    let mut sim = Simulation::new(long_day());
    sim.state_mut()
        .spawn_resource(NaturalResource::new(NodeKind::Tree, Vec2::new(500.0, 400.0)));
    let lumber = sim.state_mut().spawn_structure(Structure::Storage(StorageYard::new(
        YardKind::Lumber,
        Vec2::new(50.0, 300.0),
        0,
    )));
    spawn_worker(&mut sim, "Jack", Vec2::new(250.0, 300.0), Job::Lumberjack);

    let mut seconds = 0.0;
    while seconds < 240.0 && yard_inventory(sim.state(), lumber) != Some(20) {
        sim.tick(DT);
        seconds += DT;
    }
    let logs = yard_inventory(sim.state(), lumber).unwrap_or(0);
    results.push(TestResult::new(
        "lumberjack_clears_tree",
        logs == 20 && sim.state().live_resources(NodeKind::Tree).is_empty(),
        format!("{} logs after {:.0}s", logs, seconds),
    ));
    results.push(TestResult::new(
        "ledger_tracks_deposits",
        sim.state().ledger.get(Commodity::Log) == logs,
        format!("ledger {} logs", sim.state().ledger.get(Commodity::Log)),
    ));

    // A full yard sends the worker to idle at the town hall.
    let mut sim = Simulation::new(long_day());
    let mut yard = StorageYard::new(YardKind::Lumber, Vec2::new(50.0, 300.0), 0);
    yard.inventory = yard.capacity - 1;
    let lumber = sim.state_mut().spawn_structure(Structure::Storage(yard));
    let hall = sim
        .state_mut()
        .spawn_structure(Structure::TownHall(TownHall::new(Vec2::new(400.0, 500.0), 0)));
    sim.state_mut()
        .spawn_resource(NaturalResource::new(NodeKind::Tree, Vec2::new(300.0, 200.0)));
    let id = spawn_worker(&mut sim, "Jack", Vec2::new(160.0, 330.0), Job::Lumberjack);
    if let Some(mut h) = sim.state().human(id) {
        h.carrying = Some(ResourceKind::Log);
        sim.state_mut().put_human(id, h);
    }
    for _ in 0..600 {
        sim.tick(DT);
    }
    let hall_rect = sim.state().ecs.get::<&Structure>(hall).map(|s| s.bounds()).ok();
    let idle_at_hall = match (sim.state().human(id), hall_rect) {
        (Some(h), Some(rect)) => h.in_downtime() && rect.contains_point(h.center()),
        _ => false,
    };
    results.push(TestResult::new(
        "full_yard_sends_worker_to_hall",
        yard_inventory(sim.state(), lumber) == Some(capacities::LUMBER_YARD) && idle_at_hall,
        format!(
            "yard {:?}/{}, idle at hall: {}",
            yard_inventory(sim.state(), lumber),
            capacities::LUMBER_YARD,
            idle_at_hall
        ),
    ));

    if verbose {
        println!("  lumberjack delivered {} logs", logs);
    }
    results
}

// ── 5. World Soak ───────────────────────────────────────────────────────

/// Describe the first broken world invariant, if any.
fn invariant_violation(state: &WorldState) -> Option<String> {
    let humans: Vec<Human> = state
        .human_ids()
        .into_iter()
        .filter_map(|id| state.human(id))
        .collect();
    for h in &humans {
        if !(0.0..=100.0).contains(&h.happiness) {
            return Some(format!("{} happiness {:.2}", h.name, h.happiness));
        }
        let x_ok = h.pos.x >= 0.0 && h.pos.x <= screen::WIDTH - h.size;
        let y_ok = h.pos.y >= screen::PLAY_TOP && h.pos.y <= screen::PLAY_BOTTOM - h.size;
        if !x_ok || !y_ok {
            return Some(format!("{} left the play area at {:?}", h.name, h.pos));
        }
    }
    for (i, a) in humans.iter().enumerate() {
        for b in &humans[i + 1..] {
            if a.center().distance(&b.center()) < sizes::HUMAN_COLLISION_RADIUS - 1e-3 {
                return Some(format!("{} and {} overlap", a.name, b.name));
            }
        }
    }
    for (_, s) in state.ecs.query::<&Structure>().iter() {
        match s {
            Structure::Storage(y) if y.inventory > y.capacity => {
                return Some(format!("{} over capacity", s.kind_name()));
            }
            Structure::Mill(m)
                if m.flour > capacities::MILL_FLOUR || m.malt > capacities::MILL_MALT =>
            {
                return Some("mill over capacity".to_string());
            }
            Structure::Hut(hut) => {
                if let Some(owner) = hut.owner {
                    if state.human(owner).is_none() {
                        return Some("hut owned by a missing human".to_string());
                    }
                }
            }
            _ => {}
        }
    }
    for (_, r) in state.ecs.query::<&NaturalResource>().iter() {
        if r.health == 0 {
            return Some(format!("depleted {:?} still present", r.kind));
        }
    }
    None
}

fn load_world(cli: &Cli) -> Result<Simulation, String> {
    let config = match &cli.config {
        Some(path) => SimConfig::load(path).map_err(|e| e.to_string())?,
        None => SimConfig::default(),
    };
    let seed = match &cli.seed {
        Some(path) => WorldSeed::load(path).map_err(|e| e.to_string())?,
        None => WorldSeed::demo(),
    };
    Simulation::with_seed(config, &seed).map_err(|e| e.to_string())
}

fn validate_world_soak(cli: &Cli) -> Vec<TestResult> {
    println!("--- World Soak ---");
    let mut results = Vec::new();

    let mut sim = match load_world(cli) {
        Ok(sim) => sim,
        Err(e) => {
            results.push(TestResult::new("world_loads", false, e));
            return results;
        }
    };
    results.push(TestResult::new(
        "world_loads",
        true,
        format!(
            "{} humans, {} sheep",
            sim.snapshot().humans.len(),
            sim.snapshot().sheep.len()
        ),
    ));

    let ticks = cli.seconds as usize * 60;
    let mut violation = invariant_violation(sim.state());
    let mut days = 0;
    let mut lambs = 0;
    for tick in 0..ticks {
        if violation.is_some() {
            break;
        }
        let summary = sim.tick(DT);
        days += summary.new_day.is_some() as usize;
        lambs += summary.offspring;
        violation = invariant_violation(sim.state()).map(|v| format!("tick {}: {}", tick, v));
    }
    results.push(TestResult::new(
        "world_invariants_hold",
        violation.is_none(),
        violation.unwrap_or_else(|| format!("{} ticks clean", ticks)),
    ));

    sim.tick(0.0);
    let before = sim.snapshot();
    sim.tick(0.0);
    results.push(TestResult::new(
        "zero_tick_is_idempotent",
        sim.snapshot() == before,
        "tick(0) leaves the snapshot unchanged",
    ));

    let snap = sim.snapshot();
    if cli.verbose {
        println!(
            "  day {} ({:?}), {} rollovers, {} lambs, ledger {:?}",
            snap.day, snap.phase, days, lambs, snap.ledger
        );
        for h in &snap.humans {
            println!(
                "    {:<8} {:?} {:<9} happiness {:>5.1}",
                h.name, h.job, h.task, h.happiness
            );
        }
    }
    results
}
