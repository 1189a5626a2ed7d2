//! Per-tick happiness update.
//!
//! Each tick starts again from the base of 100. Static conditions (job, home,
//! a town hall somewhere) subtract fixed penalties, then hunger subtracts and
//! employment adds a rate scaled by `dt`. The result is always in `[0, 100]`.

use crate::constants::happiness::*;

/// Conditions that feed the happiness formula.
#[derive(Debug, Clone, Copy, Default)]
pub struct HappinessInput {
    pub is_employed: bool,
    pub owns_hut: bool,
    pub town_hall_exists: bool,
    pub is_hungry: bool,
}

/// Highest happiness reachable under the given static conditions.
pub fn happiness_ceiling(input: &HappinessInput) -> f32 {
    let mut ceiling = BASE;
    if !input.is_employed {
        ceiling -= UNEMPLOYED_PENALTY;
    }
    if !input.owns_hut {
        ceiling -= HOMELESS_PENALTY;
    }
    if !input.town_hall_exists {
        ceiling -= NO_TOWN_HALL_PENALTY;
    }
    ceiling.max(0.0)
}

/// Per-second drift rates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HappinessRates {
    pub hunger_penalty: f32,
    pub gain_rate: f32,
}

impl Default for HappinessRates {
    fn default() -> Self {
        Self {
            hunger_penalty: HUNGER_PENALTY,
            gain_rate: GAIN_RATE,
        }
    }
}

/// Happiness for one tick of `dt` seconds.
///
/// Recomputed from the ceiling every tick, so a human who gets a job or a
/// hut is happy again on the next tick.
pub fn update_happiness(input: &HappinessInput, rates: &HappinessRates, dt: f32) -> f32 {
    let mut value = happiness_ceiling(input);
    if input.is_hungry {
        value -= rates.hunger_penalty * dt;
    } else if input.is_employed {
        value += rates.gain_rate * dt;
    }
    value.clamp(0.0, BASE)
}
