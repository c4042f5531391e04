//! Fixed thresholds of the session modes.

use std::time::Duration;

use ezmath_core::model::{Difficulty, Operation};

/// Problems per level in level mode.
pub const LEVEL_TARGET: u32 = 10;
/// Correct answers out of `LEVEL_TARGET` needed to pass a level.
pub const LEVEL_PASS_THRESHOLD: u32 = 8;

pub const CORRECT_FEEDBACK_DELAY: Duration = Duration::from_millis(500);
pub const WRONG_FEEDBACK_DELAY: Duration = Duration::from_millis(1000);

/// Remaining seconds at or below which each tick is announced.
pub const TICK_WARNING_SECS: u32 = 10;
/// Remaining seconds at or below which ticks are urgent.
pub const TICK_URGENT_SECS: u32 = 5;

/// Tier and operations used at a given level.
///
/// Levels 1-3 are easy addition and subtraction, 4-6 add medium
/// multiplication, 7 and up are hard with all four operations.
#[must_use]
pub fn tier_for_level(level: u32) -> (Difficulty, Vec<Operation>) {
    match level {
        0..=3 => (
            Difficulty::Easy,
            vec![Operation::Add, Operation::Subtract],
        ),
        4..=6 => (
            Difficulty::Medium,
            vec![Operation::Add, Operation::Subtract, Operation::Multiply],
        ),
        _ => (Difficulty::Hard, Operation::ALL.to_vec()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_change_at_four_and_seven() {
        assert_eq!(tier_for_level(1).0, Difficulty::Easy);
        assert_eq!(tier_for_level(3).0, Difficulty::Easy);
        assert_eq!(tier_for_level(4).0, Difficulty::Medium);
        assert_eq!(tier_for_level(6).1.len(), 3);
        assert_eq!(tier_for_level(7), (Difficulty::Hard, Operation::ALL.to_vec()));
        assert_eq!(tier_for_level(40).0, Difficulty::Hard);
    }
}
