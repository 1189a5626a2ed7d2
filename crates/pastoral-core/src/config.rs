//! Simulation tunables.
//!
//! Every field has a default matching the stock game, so a config file only
//! needs the values it changes.

use std::fs;
use std::path::Path;

use pastoral_logic::constants::{distances, happiness, reproduction, timing};
use pastoral_logic::day_cycle::DayClock;
use pastoral_logic::happiness::HappinessRates;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Length of the daytime part of a cycle, in seconds.
    pub day_duration: f32,
    /// Length of each dusk/night/dawn slice, in seconds.
    pub dusk_duration: f32,
    /// Wall-clock hour shown at the start of a day.
    pub start_hour: f32,
    /// Seed for the world RNG; identical seeds replay identically.
    pub rng_seed: u64,
    /// Seconds between failed work searches.
    pub auto_work_interval: f32,
    /// Search radius for gathering jobs, in pixels.
    pub auto_work_search_radius: f32,
    pub reproduction_chance: f64,
    pub grass_regrowth_min: f32,
    pub grass_regrowth_max: f32,
    pub happiness_hunger_penalty: f32,
    pub happiness_gain_rate: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            day_duration: timing::DAY_DURATION,
            dusk_duration: timing::DUSK_FADE_DURATION,
            start_hour: timing::START_HOUR,
            rng_seed: 0x5eed,
            auto_work_interval: timing::AUTO_WORK_INTERVAL,
            auto_work_search_radius: distances::AUTO_WORK_SEARCH_RADIUS,
            reproduction_chance: reproduction::CHANCE,
            grass_regrowth_min: reproduction::GRASS_REGROWTH_MIN,
            grass_regrowth_max: reproduction::GRASS_REGROWTH_MAX,
            happiness_hunger_penalty: happiness::HUNGER_PENALTY,
            happiness_gain_rate: happiness::GAIN_RATE,
        }
    }
}

impl SimConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.day_duration <= 0.0 || self.dusk_duration <= 0.0 {
            return Err(ConfigError::Invalid(
                "day and dusk durations must be positive".into(),
            ));
        }
        if self.dusk_duration > self.day_duration {
            return Err(ConfigError::Invalid(
                "dusk cannot be longer than the day".into(),
            ));
        }
        if !(0.0..24.0).contains(&self.start_hour) {
            return Err(ConfigError::Invalid("start hour must be in [0, 24)".into()));
        }
        if self.auto_work_interval < 0.0 || self.auto_work_search_radius <= 0.0 {
            return Err(ConfigError::Invalid(
                "work search interval and radius must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.reproduction_chance) {
            return Err(ConfigError::Invalid(
                "reproduction chance must be a probability".into(),
            ));
        }
        let regrowth = 0.0..=1.0;
        if !regrowth.contains(&self.grass_regrowth_min)
            || !regrowth.contains(&self.grass_regrowth_max)
            || self.grass_regrowth_min > self.grass_regrowth_max
        {
            return Err(ConfigError::Invalid(
                "grass regrowth must be an ordered fraction range".into(),
            ));
        }
        Ok(())
    }

    pub fn day_clock(&self) -> DayClock {
        let mut clock = DayClock::new(self.day_duration, self.dusk_duration);
        clock.start_hour = self.start_hour;
        clock
    }

    pub fn happiness_rates(&self) -> HappinessRates {
        HappinessRates {
            hunger_penalty: self.happiness_hunger_penalty,
            gain_rate: self.happiness_gain_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            SimConfig::from_json_str(r#"{ "day_duration": 60.0, "rng_seed": 7 }"#).unwrap();
        assert_eq!(config.day_duration, 60.0);
        assert_eq!(config.rng_seed, 7);
        assert_eq!(config.dusk_duration, timing::DUSK_FADE_DURATION);
    }

    #[test]
    fn test_rejects_dusk_longer_than_day() {
        let err = SimConfig::from_json_str(r#"{ "day_duration": 10.0, "dusk_duration": 20.0 }"#);
        assert!(matches!(err, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(matches!(
            SimConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            SimConfig::load("/definitely/not/here.json"),
            Err(ConfigError::Read { .. })
        ));
    }
}
