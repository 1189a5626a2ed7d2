//! Day clock: elapsed time, day counter, dusk/dawn transition and darkness.
//!
//! A cycle is `day_duration` seconds of day followed by a `3 × dusk_duration`
//! transition. The last `dusk_duration` seconds of the day fade the darkness
//! overlay in, the first two transition slices hold it at full darkness and
//! the last one fades it back out. The day counter increments exactly once
//! per cycle, at the moment the elapsed time crosses `day_duration`, no
//! matter how far a single `dt` overshoots.

use serde::{Deserialize, Serialize};

use crate::constants::{darkness, timing};

/// Coarse phase of the cycle, mostly useful for display and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayPhase {
    Day,
    Dusk,
    Night,
    Dawn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Meridiem {
    Am,
    Pm,
}

/// 12-hour wall-clock reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOfDay {
    /// 1..=12
    pub hour: u8,
    /// 0..=59
    pub minute: u8,
    pub meridiem: Meridiem,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayClock {
    pub day_duration: f32,
    pub dusk_duration: f32,
    pub start_hour: f32,
    pub elapsed: f32,
    pub current_day: u32,
    /// Latched when the day counter moved during the current transition.
    day_incremented: bool,
}

impl Default for DayClock {
    fn default() -> Self {
        Self::new(timing::DAY_DURATION, timing::DUSK_FADE_DURATION)
    }
}

impl DayClock {
    pub fn new(day_duration: f32, dusk_duration: f32) -> Self {
        Self {
            day_duration,
            dusk_duration,
            start_hour: timing::START_HOUR,
            elapsed: 0.0,
            current_day: 1,
            day_incremented: false,
        }
    }

    /// Length of one full cycle (day plus transition).
    pub fn cycle_length(&self) -> f32 {
        self.day_duration + 3.0 * self.dusk_duration
    }

    pub fn day_incremented(&self) -> bool {
        self.day_incremented
    }

    /// Advance the clock. Returns the new day number when the day rolls over.
    pub fn advance(&mut self, dt: f32) -> Option<u32> {
        if dt <= 0.0 {
            return None;
        }
        self.elapsed += dt;

        let mut new_day = None;
        if self.elapsed >= self.day_duration && !self.day_incremented {
            self.current_day += 1;
            self.day_incremented = true;
            new_day = Some(self.current_day);
        }
        if self.elapsed >= self.cycle_length() {
            self.elapsed = 0.0;
            self.day_incremented = false;
        }
        new_day
    }

    pub fn phase(&self) -> DayPhase {
        let d = self.day_duration;
        let f = self.dusk_duration;
        let e = self.elapsed;
        if e < d - f {
            DayPhase::Day
        } else if e < d {
            DayPhase::Dusk
        } else if e < d + 2.0 * f {
            DayPhase::Night
        } else {
            DayPhase::Dawn
        }
    }

    /// Darkness overlay alpha on an 8-bit scale.
    pub fn darkness_alpha(&self) -> f32 {
        let d = self.day_duration;
        let f = self.dusk_duration.max(f32::EPSILON);
        let e = self.elapsed;
        let alpha = match self.phase() {
            DayPhase::Day => 0.0,
            DayPhase::Dusk => darkness::MAX_ALPHA * (e - (d - f)) / f,
            DayPhase::Night => darkness::MAX_ALPHA,
            DayPhase::Dawn => darkness::MAX_ALPHA * (1.0 - (e - (d + 2.0 * f)) / f),
        };
        alpha.clamp(0.0, darkness::MAX_ALPHA)
    }

    pub fn is_dark(&self) -> bool {
        self.darkness_alpha() > darkness::DARK_THRESHOLD
    }

    /// Map elapsed time linearly onto 24 hours starting at `start_hour`.
    pub fn time_of_day(&self) -> TimeOfDay {
        let fraction = (self.elapsed / self.cycle_length()).clamp(0.0, 1.0);
        let hours = (self.start_hour + fraction * 24.0).rem_euclid(24.0);
        let hour24 = hours.floor() as u8 % 24;
        let minute = (((hours - hours.floor()) * 60.0).floor() as u8).min(59);
        let meridiem = if hour24 < 12 { Meridiem::Am } else { Meridiem::Pm };
        let hour = match hour24 % 12 {
            0 => 12,
            h => h,
        };
        TimeOfDay {
            hour,
            minute,
            meridiem,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(clock: &mut DayClock, seconds: f32, dt: f32) -> Vec<u32> {
        let steps = (seconds / dt).round() as usize;
        (0..steps).filter_map(|_| clock.advance(dt)).collect()
    }

    #[test]
    fn test_starts_bright_on_day_one() {
        let clock = DayClock::default();
        assert_eq!(clock.current_day, 1);
        assert_eq!(clock.darkness_alpha(), 0.0);
        assert_eq!(clock.phase(), DayPhase::Day);
    }

    #[test]
    fn test_dusk_fades_in() {
        let mut clock = DayClock::new(180.0, 30.0);
        run(&mut clock, 165.0, 0.5);
        assert_eq!(clock.phase(), DayPhase::Dusk);
        assert!((clock.darkness_alpha() - 100.0).abs() < 0.01);
        assert!(clock.is_dark());
    }

    #[test]
    fn test_full_cycle_increments_once_and_resets() {
        let mut clock = DayClock::new(180.0, 30.0);
        let days = run(&mut clock, 270.0, 0.5);
        assert_eq!(days, vec![2]);
        assert_eq!(clock.current_day, 2);
        assert_eq!(clock.elapsed, 0.0);
        assert_eq!(clock.darkness_alpha(), 0.0);
        assert!(!clock.day_incremented());
    }

    #[test]
    fn test_overshooting_dt_fires_once() {
        let mut clock = DayClock::new(180.0, 30.0);
        run(&mut clock, 179.0, 0.5);
        assert_eq!(clock.advance(5.0), Some(2));
        assert_eq!(clock.advance(5.0), None);
        assert_eq!(clock.advance(5.0), None);
        assert_eq!(clock.current_day, 2);
    }

    #[test]
    fn test_zero_dt_is_noop() {
        let mut clock = DayClock::new(180.0, 30.0);
        run(&mut clock, 100.0, 0.5);
        let before = clock.elapsed;
        assert_eq!(clock.advance(0.0), None);
        assert_eq!(clock.elapsed, before);
    }

    #[test]
    fn test_night_then_dawn() {
        let mut clock = DayClock::new(180.0, 30.0);
        run(&mut clock, 200.0, 0.5);
        assert_eq!(clock.phase(), DayPhase::Night);
        assert_eq!(clock.darkness_alpha(), darkness::MAX_ALPHA);
        run(&mut clock, 55.0, 0.5);
        assert_eq!(clock.phase(), DayPhase::Dawn);
        assert!((clock.darkness_alpha() - 100.0).abs() < 0.01);
    }

    #[test]
    fn test_time_of_day_mapping() {
        let mut clock = DayClock::new(180.0, 30.0);
        let t = clock.time_of_day();
        assert_eq!((t.hour, t.minute, t.meridiem), (6, 0, Meridiem::Am));

        // A quarter of the 270 s cycle is 6 hours later: noon.
        run(&mut clock, 67.5, 0.5);
        let t = clock.time_of_day();
        assert_eq!((t.hour, t.minute, t.meridiem), (12, 0, Meridiem::Pm));

        // Half the cycle: 6 pm.
        run(&mut clock, 67.5, 0.5);
        let t = clock.time_of_day();
        assert_eq!((t.hour, t.meridiem), (6, Meridiem::Pm));
    }
}
