//! Age tracking in ticks

use serde::{Deserialize, Serialize};

use crate::data::races::{TICKS_PER_DAY, TICKS_PER_YEAR};

/// Biological and chronological age.
///
/// Chronological age counts calendar time since birth and includes time
/// spent in stasis, so it is never smaller than biological age.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeTracker {
    pub biological_ticks: i64,
    pub chronological_ticks: i64,
}

impl AgeTracker {
    pub fn new(biological_ticks: i64, chronological_ticks: i64) -> Self {
        let mut tracker = AgeTracker { biological_ticks, chronological_ticks };
        tracker.clamp_chronological();
        tracker
    }

    pub fn from_years(biological: f32, chronological: f32) -> Self {
        Self::new(years_to_ticks(biological), years_to_ticks(chronological))
    }

    pub fn biological_years(&self) -> f32 {
        self.biological_ticks as f32 / TICKS_PER_YEAR as f32
    }

    /// Whole biological years.
    pub fn biological_years_floor(&self) -> u32 {
        (self.biological_ticks / TICKS_PER_YEAR).max(0) as u32
    }

    pub fn chronological_years(&self) -> f32 {
        self.chronological_ticks as f32 / TICKS_PER_YEAR as f32
    }

    pub fn chronological_years_floor(&self) -> u32 {
        (self.chronological_ticks / TICKS_PER_YEAR).max(0) as u32
    }

    /// Birth time on the absolute clock.
    pub fn birth_tick(&self, now_ticks: i64) -> i64 {
        now_ticks - self.chronological_ticks
    }

    /// Raise chronological age to biological age if it fell below.
    pub fn clamp_chronological(&mut self) {
        if self.chronological_ticks < self.biological_ticks {
            self.chronological_ticks = self.biological_ticks;
        }
    }

    /// Years spent in stasis.
    pub fn stasis_years(&self) -> f32 {
        (self.chronological_ticks - self.biological_ticks) as f32 / TICKS_PER_YEAR as f32
    }
}

pub fn years_to_ticks(years: f32) -> i64 {
    (years as f64 * TICKS_PER_YEAR as f64).round() as i64
}

pub fn ticks_to_days(ticks: i64) -> f32 {
    ticks as f32 / TICKS_PER_DAY as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chronological_never_below_biological() {
        let tracker = AgeTracker::from_years(30.0, 20.0);
        assert_eq!(tracker.biological_ticks, tracker.chronological_ticks);
        assert_eq!(tracker.biological_years_floor(), 30);
    }

    #[test]
    fn test_stasis_years() {
        let tracker = AgeTracker::from_years(30.0, 130.0);
        assert!((tracker.stasis_years() - 100.0).abs() < 0.01);
        assert_eq!(tracker.birth_tick(years_to_ticks(200.0)), years_to_ticks(70.0));
    }
}
