use std::mem;

use rand::Rng;
use rand::rngs::StdRng;

use ezmath_core::ProblemGenerator;
use ezmath_core::model::{GameMode, GameSettings, HighScoreKind, MAX_TABLE, Problem};
use ezmath_core::reward::{
    DRILL_STARS, accuracy_bonus, accuracy_percent, completion_bonus, drill_points, problem_points,
    problem_stars,
};

use super::events::{AnswerOutcome, FeedbackTicket, LevelResult, SessionEvent, SessionReport};
use super::rules::{
    LEVEL_PASS_THRESHOLD, LEVEL_TARGET, TICK_URGENT_SECS, TICK_WARNING_SECS, tier_for_level,
};
use super::state::{DrillState, LevelState, Phase, SessionState};
use crate::ledger::{CurrencyReason, ProfileLedger};

/// Session and progression state machine.
///
/// Owns the current session, the problem generator and the ledger it reports
/// progress to. All time is driven from outside: the caller feeds `tick()`
/// once per second and hands feedback tickets back after their delay.
///
/// Calls that do not apply in the current phase are no-ops.
pub struct SessionEngine<L, R = StdRng> {
    ledger: L,
    generator: ProblemGenerator<R>,
    session: Option<SessionState>,
    generation: u64,
    next_ticket: u64,
    events: Vec<SessionEvent>,
}

impl<L: ProfileLedger> SessionEngine<L, StdRng> {
    #[must_use]
    pub fn new(ledger: L) -> Self {
        Self::with_generator(ledger, ProblemGenerator::from_entropy())
    }

    /// Engine with a deterministic problem sequence.
    #[must_use]
    pub fn seeded(ledger: L, seed: u64) -> Self {
        Self::with_generator(ledger, ProblemGenerator::seeded(seed))
    }
}

impl<L: ProfileLedger, R: Rng> SessionEngine<L, R> {
    #[must_use]
    pub fn with_generator(ledger: L, generator: ProblemGenerator<R>) -> Self {
        Self {
            ledger,
            generator,
            session: None,
            generation: 0,
            next_ticket: 0,
            events: Vec::new(),
        }
    }

    #[must_use]
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    #[must_use]
    pub fn into_ledger(self) -> L {
        self.ledger
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.session.as_ref().map_or(Phase::Idle, |s| s.phase)
    }

    #[must_use]
    pub fn session(&self) -> Option<&SessionState> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn current_problem(&self) -> Option<&Problem> {
        self.session.as_ref()?.current.as_ref()
    }

    /// Take the cues emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        mem::take(&mut self.events)
    }

    //
    // ─── LIFECYCLE ─────────────────────────────────────────────────────────────
    //

    /// Start a new session, replacing any previous one, and show the first
    /// problem.
    pub fn start_game(&mut self, mode: GameMode, settings: GameSettings) {
        let settings = settings.normalized();
        self.generation += 1;

        let (difficulty, operations) = if mode == GameMode::Level {
            tier_for_level(settings.start_level)
        } else {
            (settings.difficulty, settings.operations)
        };
        let drill = mode.drill().map(|kind| {
            let set = self.generator.drill_set(kind, settings.start_table);
            DrillState::new(kind, settings.start_table, set)
        });

        self.session = Some(SessionState::new(
            mode,
            difficulty,
            operations,
            settings.time_limit_secs,
            settings.start_level,
            drill,
        ));
        self.events.push(SessionEvent::Started { mode });
        tracing::info!(
            %mode,
            %difficulty,
            generation = self.generation,
            "session started"
        );
        self.advance();
    }

    pub fn pause_game(&mut self) -> bool {
        match self.session.as_mut() {
            Some(session) if session.phase == Phase::Active => {
                session.phase = Phase::Paused;
                true
            }
            _ => false,
        }
    }

    pub fn resume_game(&mut self) -> bool {
        match self.session.as_mut() {
            Some(session) if session.phase == Phase::Paused => {
                session.phase = Phase::Active;
                true
            }
            _ => false,
        }
    }

    /// End a live session and return to idle. Outstanding tickets go stale.
    pub fn reset(&mut self) -> Option<SessionReport> {
        let report = self.end_game();
        self.session = None;
        self.generation += 1;
        report
    }

    //
    // ─── ANSWERS ───────────────────────────────────────────────────────────────
    //

    /// Grade the raw input against the showing problem.
    ///
    /// Returns `None` and changes nothing when the input is blank, no problem
    /// is waiting for an answer, or the session is not active.
    pub fn submit_answer(&mut self, raw: &str) -> Option<AnswerOutcome> {
        if raw.trim().is_empty() {
            return None;
        }
        let session = self.session.as_mut()?;
        if session.phase != Phase::Active {
            return None;
        }
        let problem = session.current.take()?;

        let correct = problem.check_answer(raw);
        let operation = problem.operation();
        let tier = problem.label().tier();
        session.attempted += 1;
        self.ledger.update_stats(operation, tier, correct);

        let (points, stars) = match (&session.drill, correct) {
            (_, false) => (0, 0),
            (Some(drill), true) => (drill_points(drill.table), DRILL_STARS),
            (None, true) => (
                problem_points(tier, operation),
                problem_stars(tier, operation),
            ),
        };
        if correct {
            session.correct += 1;
            session.score += points;
            session.stars_earned += stars;
            session.breakdown.base += stars;
            self.events.push(SessionEvent::Correct);
        } else {
            if let Some(drill) = session.drill.as_mut() {
                drill.retry.push(problem);
            }
            self.events.push(SessionEvent::Wrong);
        }
        session.last_problem = Some(problem);
        session.last_result = Some(correct);

        let mut outcome = AnswerOutcome {
            correct,
            expected: problem.answer(),
            points,
            stars,
            ticket: None,
            level_result: None,
        };

        if session.mode == GameMode::Level {
            session.level.record(correct);
            if session.level.attempts >= LEVEL_TARGET {
                outcome.level_result = self.check_level_complete();
                return Some(outcome);
            }
        }

        self.next_ticket += 1;
        let ticket = FeedbackTicket::new(self.generation, self.next_ticket, correct);
        session.ticket = Some(ticket);
        outcome.ticket = Some(ticket);
        Some(outcome)
    }

    /// Show the next problem once the feedback delay has passed.
    ///
    /// Returns `false` for a ticket that is stale: issued by an earlier
    /// session, already used, or outliving the end of its session.
    pub fn continue_after_feedback(&mut self, ticket: FeedbackTicket) -> bool {
        let generation = self.generation;
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if ticket.generation != generation
            || session.ticket != Some(ticket)
            || !session.phase.is_live()
        {
            return false;
        }
        session.ticket = None;
        self.advance();
        true
    }

    fn advance(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if !session.phase.is_live() {
            return;
        }
        let Some(drill) = session.drill.as_mut() else {
            session.current = Some(
                self.generator
                    .generate(session.difficulty, &session.operations),
            );
            return;
        };

        if drill.pending.is_empty() && !drill.retry.is_empty() {
            let mut retry = mem::take(&mut drill.retry);
            self.generator.shuffle(&mut retry);
            drill.begin_pass(retry);
        }

        if drill.pending.is_empty() {
            if drill.table >= MAX_TABLE {
                drill.completed = true;
                tracing::info!(kind = ?drill.kind, "drill completed");
                self.events.push(SessionEvent::DrillComplete);
                self.end_game();
                return;
            }
            let finished = drill.table;
            drill.table += 1;
            let set = self.generator.drill_set(drill.kind, drill.table);
            drill.begin_pass(set);
            tracing::info!(kind = ?drill.kind, table = drill.table, "drill table advanced");
            self.events
                .push(SessionEvent::TableComplete { table: finished });
        }

        session.current = drill.pending.pop_front();
    }

    //
    // ─── LEVELS ────────────────────────────────────────────────────────────────
    //

    /// Close the current level once all of its problems were attempted.
    ///
    /// Passing unlocks and enters the next level; failing ends the session.
    /// Returns `None` outside level mode or before the level is full.
    pub fn check_level_complete(&mut self) -> Option<LevelResult> {
        let session = self.session.as_mut()?;
        if session.mode != GameMode::Level
            || !session.phase.is_live()
            || session.level.attempts < LEVEL_TARGET
        {
            return None;
        }

        let level = session.level.level;
        let correct = session.level.correct;
        if correct < LEVEL_PASS_THRESHOLD {
            tracing::info!(level, correct, "level failed");
            self.end_game();
            return Some(LevelResult::Failed { level });
        }

        let next = level.saturating_add(1);
        self.ledger.unlock_level(next);
        session.level = LevelState::new(next);
        (session.difficulty, session.operations) = tier_for_level(next);
        tracing::info!(level = next, difficulty = %session.difficulty, "level passed");
        self.events.push(SessionEvent::LevelUp { level: next });
        self.advance();
        Some(LevelResult::Passed { level: next })
    }

    //
    // ─── TIMER ─────────────────────────────────────────────────────────────────
    //

    /// One second of the timed-mode countdown. Returns the seconds left, or
    /// `None` when no countdown is running or the session is paused.
    pub fn tick(&mut self) -> Option<u32> {
        let session = self.session.as_mut()?;
        if session.phase != Phase::Active || !session.timer_running {
            return None;
        }
        session.time_remaining = session.time_remaining.saturating_sub(1);
        let remaining = session.time_remaining;

        if remaining == 0 {
            self.end_game();
        } else if remaining <= TICK_URGENT_SECS {
            self.events.push(SessionEvent::TickUrgent { remaining });
        } else if remaining <= TICK_WARNING_SECS {
            self.events.push(SessionEvent::Tick { remaining });
        }
        Some(remaining)
    }

    //
    // ─── END ───────────────────────────────────────────────────────────────────
    //

    /// Finish the session and settle rewards with the ledger.
    ///
    /// Only a live session can end; a second call returns `None`.
    pub fn end_game(&mut self) -> Option<SessionReport> {
        let session = self.session.as_mut()?;
        if !session.phase.is_live() {
            return None;
        }
        session.timer_running = false;
        session.ticket = None;
        session.current = None;

        if session.attempted > 0 {
            let accuracy = accuracy_percent(session.correct, session.attempted);
            let passed_level = session.level.correct >= LEVEL_PASS_THRESHOLD;
            session.breakdown.accuracy_bonus = accuracy_bonus(accuracy);
            session.breakdown.completion_bonus =
                completion_bonus(session.mode, session.attempted, passed_level);
            session.stars_earned +=
                session.breakdown.accuracy_bonus + session.breakdown.completion_bonus;

            self.ledger
                .add_currency(session.stars_earned, CurrencyReason::Session);
            self.ledger.add_experience(session.attempted);
            session.evolution = self.ledger.check_evolution();
            session.milestones = self.ledger.check_milestones();
        }

        match session.mode {
            GameMode::Timed => self
                .ledger
                .update_high_score(HighScoreKind::Timed, session.score),
            GameMode::Level => self
                .ledger
                .update_high_score(HighScoreKind::Level, session.level.level),
            _ => {}
        }

        session.phase = Phase::Ended;
        self.events.push(SessionEvent::GameOver);
        tracing::info!(
            mode = %session.mode,
            attempted = session.attempted,
            correct = session.correct,
            score = session.score,
            stars = session.stars_earned,
            "session ended"
        );
        Some(session.report())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile_book::ProfileBook;
    use ezmath_core::model::{Difficulty, Operation};
    use ezmath_core::time::fixed_now;

    fn engine() -> SessionEngine<ProfileBook> {
        let mut book = ProfileBook::default();
        book.create_profile("Tester", "🦊", fixed_now()).unwrap();
        SessionEngine::seeded(book, 42)
    }

    fn answer(engine: &SessionEngine<ProfileBook>) -> String {
        engine.current_problem().unwrap().answer().to_string()
    }

    #[test]
    fn idle_engine_ignores_everything() {
        let mut engine = engine();
        assert_eq!(engine.phase(), Phase::Idle);
        assert!(engine.submit_answer("3").is_none());
        assert!(engine.tick().is_none());
        assert!(!engine.pause_game());
        assert!(engine.end_game().is_none());
        assert!(engine.check_level_complete().is_none());
        assert!(engine.drain_events().is_empty());
    }

    #[test]
    fn paused_session_rejects_answers_and_ticks() {
        let mut engine = engine();
        engine.start_game(GameMode::Timed, GameSettings::default());
        assert!(engine.pause_game());
        assert!(!engine.pause_game());
        let raw = answer(&engine);
        assert!(engine.submit_answer(&raw).is_none());
        assert!(engine.tick().is_none());
        assert!(engine.resume_game());
        assert_eq!(engine.tick(), Some(59));
        assert!(engine.submit_answer(&raw).is_some());
    }

    #[test]
    fn double_submit_is_ignored_until_the_next_problem() {
        let mut engine = engine();
        engine.start_game(GameMode::Practice, GameSettings::default());
        let raw = answer(&engine);
        let outcome = engine.submit_answer(&raw).unwrap();
        assert!(engine.submit_answer(&raw).is_none());
        assert_eq!(engine.session().unwrap().attempted(), 1);
        assert!(engine.continue_after_feedback(outcome.ticket.unwrap()));
        assert!(!engine.continue_after_feedback(outcome.ticket.unwrap()));
        assert!(engine.current_problem().is_some());
    }

    #[test]
    fn level_tier_follows_the_start_level() {
        let mut engine = engine();
        engine.start_game(
            GameMode::Level,
            GameSettings::new(Difficulty::Hard, vec![Operation::Divide]).with_start_level(5),
        );
        let session = engine.session().unwrap();
        assert_eq!(session.difficulty(), Difficulty::Medium);
        assert_eq!(
            session.operations(),
            &[Operation::Add, Operation::Subtract, Operation::Multiply]
        );
        assert_eq!(session.level().level, 5);
    }

    #[test]
    fn starting_again_replaces_the_session() {
        let mut engine = engine();
        engine.start_game(GameMode::Practice, GameSettings::default());
        let raw = answer(&engine);
        let outcome = engine.submit_answer(&raw).unwrap();
        engine.start_game(GameMode::Timed, GameSettings::default().with_time_limit(30));

        let session = engine.session().unwrap();
        assert_eq!(session.attempted(), 0);
        assert_eq!(session.time_remaining(), 30);
        assert_eq!(session.formatted_time(), "0:30");
        assert!(!engine.continue_after_feedback(outcome.ticket.unwrap()));
    }
}
