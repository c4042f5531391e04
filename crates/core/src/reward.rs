//! Score and star formulas.
//!
//! Generic problems and table drills use separate formulas. The drill formula
//! is a flat amount per correct answer and does not go through the generic
//! multipliers.

use crate::model::{Difficulty, GameMode, Operation};

/// Stars for a correct answer before multipliers.
pub const BASE_STARS: u32 = 5;
/// Points for a correct answer before multipliers.
pub const BASE_POINTS: u32 = 10;
/// Stars per correct drill answer: round(5 × 1.5 × 1.5).
pub const DRILL_STARS: u32 = 11;

/// Attempts needed in practice mode for the completion bonus.
pub const PRACTICE_COMPLETION_MIN: u32 = 10;

/// Star tally for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewardBreakdown {
    pub base: u32,
    /// Always zero; kept so the persisted breakdown shape stays stable.
    pub streak_bonus: u32,
    pub accuracy_bonus: u32,
    pub completion_bonus: u32,
}

impl RewardBreakdown {
    #[must_use]
    pub fn total(&self) -> u32 {
        self.base + self.streak_bonus + self.accuracy_bonus + self.completion_bonus
    }
}

fn difficulty_points(difficulty: Difficulty) -> u32 {
    match difficulty {
        Difficulty::Easy => 1,
        Difficulty::Medium => 2,
        Difficulty::Hard => 3,
    }
}

fn operation_points(operation: Operation) -> u32 {
    match operation {
        Operation::Add | Operation::Subtract => 1,
        Operation::Multiply | Operation::Divide => 2,
    }
}

// Star multipliers in halves: 1, 1.5, 2 and 1, 1.5.
fn difficulty_star_halves(difficulty: Difficulty) -> u32 {
    match difficulty {
        Difficulty::Easy => 2,
        Difficulty::Medium => 3,
        Difficulty::Hard => 4,
    }
}

fn operation_star_halves(operation: Operation) -> u32 {
    match operation {
        Operation::Add | Operation::Subtract => 2,
        Operation::Multiply | Operation::Divide => 3,
    }
}

/// Score for a correct generic answer: 10 × difficulty × operation.
#[must_use]
pub fn problem_points(difficulty: Difficulty, operation: Operation) -> u32 {
    BASE_POINTS * difficulty_points(difficulty) * operation_points(operation)
}

/// Stars for a correct generic answer, rounded half up.
#[must_use]
pub fn problem_stars(difficulty: Difficulty, operation: Operation) -> u32 {
    let quarters =
        BASE_STARS * difficulty_star_halves(difficulty) * operation_star_halves(operation);
    (quarters + 2) / 4
}

/// Score for a correct drill answer: higher tables pay more.
#[must_use]
pub fn drill_points(table: u32) -> u32 {
    BASE_POINTS * table
}

/// Rounded percent; 0 when nothing was attempted.
#[must_use]
pub fn accuracy_percent(correct: u32, attempted: u32) -> u32 {
    if attempted == 0 {
        return 0;
    }
    let (correct, attempted) = (u64::from(correct), u64::from(attempted));
    let percent = (correct * 200 + attempted) / (attempted * 2);
    u32::try_from(percent).unwrap_or(u32::MAX)
}

#[must_use]
pub fn accuracy_bonus(accuracy: u32) -> u32 {
    match accuracy {
        80.. => 50,
        60..=79 => 25,
        50..=59 => 10,
        _ => 0,
    }
}

/// End-of-session completion bonus.
///
/// `passed_level` only matters for level mode: the in-level correct count
/// reached the pass threshold.
#[must_use]
pub fn completion_bonus(mode: GameMode, attempted: u32, passed_level: bool) -> u32 {
    match mode {
        GameMode::Practice if attempted >= PRACTICE_COMPLETION_MIN => 30,
        GameMode::Timed => 40,
        GameMode::Level if passed_level => 60,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_scale_with_tier_and_operation() {
        assert_eq!(problem_points(Difficulty::Easy, Operation::Add), 10);
        assert_eq!(problem_points(Difficulty::Medium, Operation::Multiply), 40);
        assert_eq!(problem_points(Difficulty::Hard, Operation::Divide), 60);
    }

    #[test]
    fn stars_round_half_up() {
        assert_eq!(problem_stars(Difficulty::Easy, Operation::Add), 5);
        assert_eq!(problem_stars(Difficulty::Easy, Operation::Multiply), 8);
        assert_eq!(problem_stars(Difficulty::Medium, Operation::Subtract), 8);
        assert_eq!(problem_stars(Difficulty::Medium, Operation::Divide), 11);
        assert_eq!(problem_stars(Difficulty::Hard, Operation::Add), 10);
        assert_eq!(problem_stars(Difficulty::Hard, Operation::Multiply), 15);
    }

    #[test]
    fn drill_formula_is_separate_from_generic() {
        // Same stars as a generic medium multiplication today, but the score
        // depends on the table, not on the tier.
        assert_eq!(DRILL_STARS, problem_stars(Difficulty::Medium, Operation::Multiply));
        assert_eq!(drill_points(7), 70);
        assert_ne!(drill_points(7), problem_points(Difficulty::Medium, Operation::Multiply));
    }

    #[test]
    fn accuracy_tiers() {
        assert_eq!(accuracy_percent(17, 20), 85);
        assert_eq!(accuracy_percent(2, 3), 67);
        assert_eq!(accuracy_percent(0, 0), 0);
        assert_eq!(accuracy_bonus(85), 50);
        assert_eq!(accuracy_bonus(80), 50);
        assert_eq!(accuracy_bonus(79), 25);
        assert_eq!(accuracy_bonus(50), 10);
        assert_eq!(accuracy_bonus(49), 0);
    }

    #[test]
    fn completion_by_mode() {
        assert_eq!(completion_bonus(GameMode::Practice, 9, false), 0);
        assert_eq!(completion_bonus(GameMode::Practice, 10, false), 30);
        assert_eq!(completion_bonus(GameMode::Timed, 1, false), 40);
        assert_eq!(completion_bonus(GameMode::Level, 10, false), 0);
        assert_eq!(completion_bonus(GameMode::Level, 10, true), 60);
        assert_eq!(completion_bonus(GameMode::TimesTable, 12, true), 0);
    }

    #[test]
    fn breakdown_total_sums_parts() {
        let breakdown = RewardBreakdown {
            base: 85,
            streak_bonus: 0,
            accuracy_bonus: 50,
            completion_bonus: 40,
        };
        assert_eq!(breakdown.total(), 175);
    }
}
