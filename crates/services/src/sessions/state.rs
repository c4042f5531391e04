use std::collections::VecDeque;

use ezmath_core::model::{
    Difficulty, DrillKind, Evolution, GameMode, Hint, Milestone, Operation, Problem,
};
use ezmath_core::reward::{RewardBreakdown, accuracy_percent};

use super::events::{FeedbackTicket, SessionReport};
use super::progress::SessionProgress;
use super::rules::LEVEL_TARGET;

/// Lifecycle of the engine. `Idle` means no session exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Active,
    Paused,
    Ended,
}

impl Phase {
    /// Active or paused.
    #[must_use]
    pub fn is_live(self) -> bool {
        matches!(self, Phase::Active | Phase::Paused)
    }
}

//
// ─── LEVEL ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelState {
    pub level: u32,
    /// Attempts within the current level.
    pub attempts: u32,
    /// Correct answers within the current level.
    pub correct: u32,
}

impl LevelState {
    pub(crate) fn new(level: u32) -> Self {
        Self {
            level,
            attempts: 0,
            correct: 0,
        }
    }

    pub(crate) fn record(&mut self, correct: bool) {
        self.attempts += 1;
        if correct {
            self.correct += 1;
        }
    }
}

//
// ─── DRILL ─────────────────────────────────────────────────────────────────────
//

/// Progress through the fixed tables of a drill.
#[derive(Debug, Clone)]
pub struct DrillState {
    pub(crate) kind: DrillKind,
    pub(crate) table: u32,
    pub(crate) pending: VecDeque<Problem>,
    pub(crate) retry: Vec<Problem>,
    pub(crate) pass_len: usize,
    pub(crate) completed: bool,
}

impl DrillState {
    pub(crate) fn new(kind: DrillKind, table: u32, set: Vec<Problem>) -> Self {
        let mut drill = Self {
            kind,
            table,
            pending: VecDeque::new(),
            retry: Vec::new(),
            pass_len: 0,
            completed: false,
        };
        drill.begin_pass(set);
        drill
    }

    /// Replace the pending queue with a fresh pass.
    pub(crate) fn begin_pass(&mut self, set: Vec<Problem>) {
        self.pass_len = set.len();
        self.pending = set.into();
    }

    #[must_use]
    pub fn kind(&self) -> DrillKind {
        self.kind
    }

    #[must_use]
    pub fn table(&self) -> u32 {
        self.table
    }

    /// Problems still queued in this pass, in asking order.
    pub fn pending(&self) -> impl Iterator<Item = &Problem> {
        self.pending.iter()
    }

    /// Problems missed in this pass, one entry per miss.
    #[must_use]
    pub fn retry(&self) -> &[Problem] {
        &self.retry
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// State of one game from `start_game` until it is replaced or reset.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub(crate) mode: GameMode,
    pub(crate) difficulty: Difficulty,
    pub(crate) operations: Vec<Operation>,
    pub(crate) phase: Phase,
    pub(crate) current: Option<Problem>,
    pub(crate) last_problem: Option<Problem>,
    pub(crate) last_result: Option<bool>,
    pub(crate) attempted: u32,
    pub(crate) correct: u32,
    pub(crate) score: u32,
    pub(crate) time_limit: u32,
    pub(crate) time_remaining: u32,
    pub(crate) timer_running: bool,
    pub(crate) level: LevelState,
    pub(crate) drill: Option<DrillState>,
    pub(crate) breakdown: RewardBreakdown,
    pub(crate) stars_earned: u32,
    pub(crate) ticket: Option<FeedbackTicket>,
    pub(crate) evolution: Option<Evolution>,
    pub(crate) milestones: Vec<Milestone>,
}

impl SessionState {
    pub(crate) fn new(
        mode: GameMode,
        difficulty: Difficulty,
        operations: Vec<Operation>,
        time_limit: u32,
        start_level: u32,
        drill: Option<DrillState>,
    ) -> Self {
        Self {
            mode,
            difficulty,
            operations,
            phase: Phase::Active,
            current: None,
            last_problem: None,
            last_result: None,
            attempted: 0,
            correct: 0,
            score: 0,
            time_limit,
            time_remaining: time_limit,
            timer_running: mode == GameMode::Timed,
            level: LevelState::new(start_level),
            drill,
            breakdown: RewardBreakdown::default(),
            stars_earned: 0,
            ticket: None,
            evolution: None,
            milestones: Vec::new(),
        }
    }

    #[must_use]
    pub fn mode(&self) -> GameMode {
        self.mode
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The problem waiting for an answer.
    #[must_use]
    pub fn current_problem(&self) -> Option<&Problem> {
        self.current.as_ref()
    }

    /// The most recently answered problem and whether it was right.
    #[must_use]
    pub fn last_answer(&self) -> Option<(&Problem, bool)> {
        self.last_problem.as_ref().zip(self.last_result)
    }

    #[must_use]
    pub fn attempted(&self) -> u32 {
        self.attempted
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn time_limit(&self) -> u32 {
        self.time_limit
    }

    #[must_use]
    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    /// Whether ticks currently count down.
    #[must_use]
    pub fn timer_running(&self) -> bool {
        self.timer_running
    }

    #[must_use]
    pub fn level(&self) -> &LevelState {
        &self.level
    }

    #[must_use]
    pub fn drill(&self) -> Option<&DrillState> {
        self.drill.as_ref()
    }

    #[must_use]
    pub fn breakdown(&self) -> RewardBreakdown {
        self.breakdown
    }

    #[must_use]
    pub fn stars_earned(&self) -> u32 {
        self.stars_earned
    }

    #[must_use]
    pub fn pending_ticket(&self) -> Option<FeedbackTicket> {
        self.ticket
    }

    #[must_use]
    pub fn evolution(&self) -> Option<Evolution> {
        self.evolution
    }

    #[must_use]
    pub fn milestones(&self) -> &[Milestone] {
        &self.milestones
    }

    /// Rounded percent correct; 0 before the first attempt.
    #[must_use]
    pub fn accuracy(&self) -> u32 {
        accuracy_percent(self.correct, self.attempted)
    }

    #[must_use]
    pub fn level_progress_percent(&self) -> u32 {
        (self.level.attempts * 100 + LEVEL_TARGET / 2) / LEVEL_TARGET
    }

    fn drill_answered_in_pass(drill: &DrillState, showing: bool) -> usize {
        drill
            .pass_len
            .saturating_sub(drill.pending.len())
            .saturating_sub(usize::from(showing))
    }

    /// Percent of the current drill pass already asked; 0 outside drills.
    #[must_use]
    pub fn drill_progress_percent(&self) -> u32 {
        let Some(drill) = &self.drill else {
            return 0;
        };
        if drill.pass_len == 0 {
            return 0;
        }
        let answered = Self::drill_answered_in_pass(drill, self.current.is_some());
        let percent = (answered * 200 + drill.pass_len) / (drill.pass_len * 2);
        u32::try_from(percent).unwrap_or(100)
    }

    /// Questions left in the current table, counting queued retries.
    #[must_use]
    pub fn drill_questions_remaining(&self) -> usize {
        self.drill.as_ref().map_or(0, |drill| {
            drill.pending.len() + usize::from(self.current.is_some()) + drill.retry.len()
        })
    }

    /// Remaining time as `m:ss`.
    #[must_use]
    pub fn formatted_time(&self) -> String {
        format!(
            "{}:{:02}",
            self.time_remaining / 60,
            self.time_remaining % 60
        )
    }

    /// Visual hint for the current problem.
    #[must_use]
    pub fn hint(&self) -> Option<Hint> {
        self.current.as_ref().map(Hint::for_problem)
    }

    /// Progress through the current level or drill pass. Open-ended modes
    /// have none.
    #[must_use]
    pub fn progress(&self) -> Option<SessionProgress> {
        let is_complete = self.phase == Phase::Ended;
        if let Some(drill) = &self.drill {
            return Some(SessionProgress {
                total: drill.pass_len,
                answered: Self::drill_answered_in_pass(drill, self.current.is_some()),
                remaining: self.drill_questions_remaining(),
                is_complete,
            });
        }
        if self.mode == GameMode::Level {
            let target = LEVEL_TARGET as usize;
            let answered = self.level.attempts as usize;
            return Some(SessionProgress {
                total: target,
                answered,
                remaining: target.saturating_sub(answered),
                is_complete,
            });
        }
        None
    }

    /// Summary of the session so far; final once the phase is `Ended`.
    #[must_use]
    pub fn report(&self) -> SessionReport {
        SessionReport {
            mode: self.mode,
            attempted: self.attempted,
            correct: self.correct,
            accuracy: self.accuracy(),
            score: self.score,
            breakdown: self.breakdown,
            stars_earned: self.stars_earned,
            level: self.level.level,
            table: self.drill.as_ref().map(|d| d.table),
            drill_completed: self.drill.as_ref().is_some_and(|d| d.completed),
            evolution: self.evolution,
            milestones: self.milestones.clone(),
        }
    }
}
