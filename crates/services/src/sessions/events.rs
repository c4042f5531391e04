use std::time::Duration;

use ezmath_core::model::{Evolution, GameMode, Milestone};
use ezmath_core::reward::RewardBreakdown;

use super::rules::{CORRECT_FEEDBACK_DELAY, WRONG_FEEDBACK_DELAY};

/// Token for the deferred "show feedback, then advance" step.
///
/// The driver waits `delay()` and hands the ticket back to
/// `SessionEngine::continue_after_feedback`. Tickets from a replaced, reset or
/// ended session are ignored there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeedbackTicket {
    pub(crate) generation: u64,
    pub(crate) seq: u64,
    delay: Duration,
}

impl FeedbackTicket {
    pub(crate) fn new(generation: u64, seq: u64, correct: bool) -> Self {
        let delay = if correct {
            CORRECT_FEEDBACK_DELAY
        } else {
            WRONG_FEEDBACK_DELAY
        };
        Self {
            generation,
            seq,
            delay,
        }
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

/// Presentation cues, drained by the driver after each call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Started { mode: GameMode },
    Correct,
    Wrong,
    LevelUp { level: u32 },
    /// A drill table was cleared and the next one begins.
    TableComplete { table: u32 },
    DrillComplete,
    Tick { remaining: u32 },
    TickUrgent { remaining: u32 },
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelResult {
    /// Advanced; `level` is the new level.
    Passed { level: u32 },
    /// Session ended at `level`.
    Failed { level: u32 },
}

/// What happened to one submitted answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub expected: u32,
    pub points: u32,
    pub stars: u32,
    /// Present when the next problem waits for the feedback delay.
    pub ticket: Option<FeedbackTicket>,
    /// Present when this answer closed a level.
    pub level_result: Option<LevelResult>,
}

/// Final tally of an ended session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub mode: GameMode,
    pub attempted: u32,
    pub correct: u32,
    pub accuracy: u32,
    pub score: u32,
    pub breakdown: RewardBreakdown,
    pub stars_earned: u32,
    pub level: u32,
    pub table: Option<u32>,
    pub drill_completed: bool,
    pub evolution: Option<Evolution>,
    pub milestones: Vec<Milestone>,
}
