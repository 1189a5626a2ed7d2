//! Simulation engine - main entry point for running the simulation

use crate::collision::Frame;
use crate::config::SimConfig;
use crate::error::SeedError;
use crate::input::{apply_command, Command};
use crate::seed::WorldSeed;
use crate::snapshot::WorldSnapshot;
use crate::systems::*;
use crate::world::WorldState;

/// What happened during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    /// Set when the day counter moved this tick.
    pub new_day: Option<u32>,
    /// Lambs born at the day rollover.
    pub offspring: usize,
    /// Flour ground this tick.
    pub flour: u32,
    /// Malt produced this tick.
    pub malt: u32,
    /// Depleted resources removed this tick.
    pub cleared: usize,
}

/// Main simulation engine
pub struct Simulation {
    state: WorldState,
}

impl Simulation {
    /// Create an empty world
    pub fn new(config: SimConfig) -> Self {
        Self {
            state: WorldState::new(config),
        }
    }

    /// Create a world and inject `seed` into it
    pub fn with_seed(config: SimConfig, seed: &WorldSeed) -> Result<Self, SeedError> {
        let mut sim = Self::new(config);
        seed.inject(&mut sim.state)?;
        Ok(sim)
    }

    /// Feed one decoded input command; takes effect on the next tick
    pub fn handle(&mut self, command: Command) {
        apply_command(&mut self.state, command);
    }

    /// Advance the simulation by `dt` seconds
    pub fn tick(&mut self, dt: f32) -> TickSummary {
        let mut summary = TickSummary::default();
        if !dt.is_finite() || dt <= 0.0 {
            return summary;
        }
        let state = &mut self.state;

        let mut frame = Frame::new(&state.ecs, state.road_segments(), dt);

        // Player first so followers chase the fresh position
        player_system(state, &frame);

        // Clock, and the once-a-day work at rollover
        if let Some(day) = day_cycle_system(state, dt) {
            summary.new_day = Some(day);
            summary.offspring = end_of_day_system(state, day);
        }
        crop_system(state);

        let milled = mill_system(state, dt);
        summary.flour = milled.flour;
        summary.malt = milled.malt;

        // Humans: manual orders, jobs, then everything else
        harvest_system(state, &mut frame);
        employment_system(state, &mut frame);
        behavior_system(state, &mut frame);

        sheep_system(state, &mut frame);
        happiness_system(state, dt);

        summary.cleared = cleanup_system(state);
        state.messages.advance(dt);
        summary
    }

    /// Get a read-only snapshot for rendering
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::capture(&self.state)
    }

    /// Get the world state
    pub fn state(&self) -> &WorldState {
        &self.state
    }

    /// Get mutable world state (tests and tooling)
    pub fn state_mut(&mut self) -> &mut WorldState {
        &mut self.state
    }

    /// Get the current day number
    pub fn current_day(&self) -> u32 {
        self.state.clock.current_day
    }

    /// Get the config this world runs with
    pub fn config(&self) -> &SimConfig {
        &self.state.config
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}
