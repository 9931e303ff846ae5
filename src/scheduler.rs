//! SM-2 spaced-repetition scheduler
//!
//! Pure state-transition algorithm: a recall-quality grade plus the current
//! scheduling state yields the next state. No I/O, no clock, deterministic
//! for identical floating-point inputs.
//!
//! Interval growth uses round-half-to-even for the `interval * ease` product
//! so that repeated reviews compound reproducibly.

use crate::error::{LexmemError, Result};
use crate::types::VocabEntry;
use serde::{Deserialize, Serialize};

/// Floor for the ease factor
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Ease factor assigned to newly created entries
pub const INITIAL_EASE_FACTOR: f64 = 2.5;

/// Grade below which a recall counts as failed
const PASSING_GRADE: u8 = 3;

/// Validated recall-quality grade, 0 (total failure) to 5 (perfect recall)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quality(u8);

impl Quality {
    /// Validate a grade, rejecting anything outside 0..=5
    pub fn new(value: i64) -> Result<Self> {
        if (0..=5).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(LexmemError::InvalidQuality(value))
        }
    }

    /// The raw grade
    pub fn grade(&self) -> u8 {
        self.0
    }

    /// Whether the recall succeeded
    pub fn is_passing(&self) -> bool {
        self.0 >= PASSING_GRADE
    }
}

/// The scheduling fields the SM-2 transition reads and writes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleState {
    /// Consecutive successful recalls
    pub repetition_count: u32,

    /// Interval growth multiplier
    pub ease_factor: f64,

    /// Current interval in days
    pub interval_days: u32,
}

impl From<&VocabEntry> for ScheduleState {
    fn from(entry: &VocabEntry) -> Self {
        Self {
            repetition_count: entry.repetition_count,
            ease_factor: entry.ease_factor,
            interval_days: entry.interval_days,
        }
    }
}

/// Compute the next scheduling state from a recall grade
///
/// Failed recall (`quality < 3`) resets the learning process: repetition
/// count and interval drop to zero while the ease factor stays untouched.
/// Successful recall adjusts the ease factor (floored at 1.3), bumps the
/// repetition count, and grows the interval: 1 day after the first success,
/// 6 days after the second, then `round(interval * ease')`.
pub fn schedule(quality: Quality, state: ScheduleState) -> ScheduleState {
    if !quality.is_passing() {
        return ScheduleState {
            repetition_count: 0,
            ease_factor: state.ease_factor,
            interval_days: 0,
        };
    }

    let shortfall = (5 - quality.grade()) as f64;
    let ease_factor =
        (state.ease_factor + (0.1 - shortfall * (0.08 + shortfall * 0.02))).max(MIN_EASE_FACTOR);

    let repetition_count = state.repetition_count + 1;
    let interval_days = match repetition_count {
        1 => 1,
        2 => 6,
        _ => round_half_to_even(state.interval_days as f64 * ease_factor),
    };

    ScheduleState {
        repetition_count,
        ease_factor,
        interval_days,
    }
}

/// Banker's rounding to a whole number of days
///
/// Exact .5 products round to the even neighbor, so a long run of reviews
/// cannot drift upward from the tie-break alone.
fn round_half_to_even(value: f64) -> u32 {
    let floor = value.floor();
    let frac = value - floor;

    let rounded = if frac > 0.5 {
        floor + 1.0
    } else if frac < 0.5 {
        floor
    } else if (floor as i64) % 2 == 0 {
        floor
    } else {
        floor + 1.0
    };

    rounded.max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(repetition_count: u32, ease_factor: f64, interval_days: u32) -> ScheduleState {
        ScheduleState {
            repetition_count,
            ease_factor,
            interval_days,
        }
    }

    #[test]
    fn test_quality_validation() {
        assert!(Quality::new(0).is_ok());
        assert!(Quality::new(5).is_ok());
        assert!(matches!(Quality::new(6), Err(LexmemError::InvalidQuality(6))));
        assert!(matches!(Quality::new(-1), Err(LexmemError::InvalidQuality(-1))));
    }

    #[test]
    fn test_failed_recall_resets_progress_but_not_ease() {
        for grade in 0..3 {
            let quality = Quality::new(grade).unwrap();
            let next = schedule(quality, state(4, 2.1, 30));

            assert_eq!(next.repetition_count, 0, "grade {}", grade);
            assert_eq!(next.interval_days, 0, "grade {}", grade);
            assert_eq!(next.ease_factor, 2.1, "grade {}", grade);
        }
    }

    #[test]
    fn test_first_success_gives_one_day() {
        let next = schedule(Quality::new(5).unwrap(), state(0, 2.5, 0));

        assert_eq!(next.repetition_count, 1);
        assert_eq!(next.interval_days, 1);
        assert!(next.ease_factor >= 2.5);
    }

    #[test]
    fn test_second_success_gives_six_days() {
        for ease in [1.3, 2.0, 2.5, 3.0] {
            let next = schedule(Quality::new(5).unwrap(), state(1, ease, 1));

            assert_eq!(next.repetition_count, 2);
            assert_eq!(next.interval_days, 6);
        }
    }

    #[test]
    fn test_third_success_multiplies_interval_by_new_ease() {
        let next = schedule(Quality::new(5).unwrap(), state(2, 2.5, 6));

        assert_eq!(next.repetition_count, 3);
        // Ease for a perfect recall grows by 0.1
        assert!((next.ease_factor - 2.6).abs() < 1e-9);
        assert_eq!(next.interval_days, round_half_to_even(6.0 * next.ease_factor));
        assert_eq!(next.interval_days, 16);
    }

    #[test]
    fn test_ease_factor_never_falls_below_floor() {
        // Grade 3 subtracts 0.14 each time; hammer a low-ease item
        let mut current = state(5, 1.32, 20);
        for _ in 0..10 {
            current = schedule(Quality::new(3).unwrap(), current);
            assert!(current.ease_factor >= MIN_EASE_FACTOR);
        }
        assert_eq!(current.ease_factor, MIN_EASE_FACTOR);
    }

    #[test]
    fn test_ease_adjustment_per_grade() {
        let base = state(2, 2.5, 6);

        // q=5: +0.1, q=4: unchanged, q=3: -0.14
        let q5 = schedule(Quality::new(5).unwrap(), base);
        let q4 = schedule(Quality::new(4).unwrap(), base);
        let q3 = schedule(Quality::new(3).unwrap(), base);

        assert!((q5.ease_factor - 2.6).abs() < 1e-9);
        assert!((q4.ease_factor - 2.5).abs() < 1e-9);
        assert!((q3.ease_factor - 2.36).abs() < 1e-9);
    }

    #[test]
    fn test_round_half_to_even_tie_breaks() {
        assert_eq!(round_half_to_even(10.5), 10);
        assert_eq!(round_half_to_even(11.5), 12);
        assert_eq!(round_half_to_even(10.4), 10);
        assert_eq!(round_half_to_even(10.6), 11);
        assert_eq!(round_half_to_even(0.0), 0);
    }

    #[test]
    fn test_schedule_is_deterministic() {
        let input = state(3, 2.36, 16);
        let a = schedule(Quality::new(4).unwrap(), input);
        let b = schedule(Quality::new(4).unwrap(), input);
        assert_eq!(a, b);
    }
}
