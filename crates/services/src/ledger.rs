use std::fmt;

use ezmath_core::model::{Difficulty, Evolution, HighScoreKind, Milestone, Operation};

/// Why stars are being credited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CurrencyReason {
    Session,
    Milestone,
}

impl fmt::Display for CurrencyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CurrencyReason::Session => "session",
            CurrencyReason::Milestone => "milestone",
        })
    }
}

/// Commands the session engine issues against the player's profile.
///
/// Implementations without an active profile treat every command as a no-op.
pub trait ProfileLedger {
    fn update_stats(&mut self, operation: Operation, difficulty: Difficulty, correct: bool);

    fn add_currency(&mut self, amount: u32, reason: CurrencyReason);

    /// Pet xp, one point per problem attempted.
    fn add_experience(&mut self, amount: u32);

    /// Advance the pet if its xp earned a higher stage.
    fn check_evolution(&mut self) -> Option<Evolution>;

    /// Award newly crossed milestones and credit their rewards.
    fn check_milestones(&mut self) -> Vec<Milestone>;

    fn update_high_score(&mut self, kind: HighScoreKind, value: u32);

    fn unlock_level(&mut self, level: u32);
}

impl<T: ProfileLedger + ?Sized> ProfileLedger for &mut T {
    fn update_stats(&mut self, operation: Operation, difficulty: Difficulty, correct: bool) {
        (**self).update_stats(operation, difficulty, correct);
    }

    fn add_currency(&mut self, amount: u32, reason: CurrencyReason) {
        (**self).add_currency(amount, reason);
    }

    fn add_experience(&mut self, amount: u32) {
        (**self).add_experience(amount);
    }

    fn check_evolution(&mut self) -> Option<Evolution> {
        (**self).check_evolution()
    }

    fn check_milestones(&mut self) -> Vec<Milestone> {
        (**self).check_milestones()
    }

    fn update_high_score(&mut self, kind: HighScoreKind, value: u32) {
        (**self).update_high_score(kind, value);
    }

    fn unlock_level(&mut self, level: u32) {
        (**self).unlock_level(level);
    }
}
