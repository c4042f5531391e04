use std::future;
use std::io;
use std::time::Duration;

use ezmath_core::model::{GameMode, GameSettings, Hint, PetStage};
use services::{
    AnswerOutcome, FeedbackTicket, LevelResult, Phase, ProfileLedger, SessionEngine, SessionEvent,
    SessionReport,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{Instant, MissedTickBehavior, interval, sleep_until};

/// What the player typed, besides an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Hint,
    Pause,
    Resume,
    Quit,
    Answer,
}

impl Input {
    fn classify(line: &str) -> Self {
        match line.trim().to_ascii_lowercase().as_str() {
            "h" | "hint" | "?" => Self::Hint,
            "p" | "pause" => Self::Pause,
            "r" | "resume" => Self::Resume,
            "q" | "quit" | "exit" => Self::Quit,
            _ => Self::Answer,
        }
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => future::pending::<()>().await,
    }
}

/// Play one session on stdin/stdout until it ends or the player quits.
///
/// Returns the final report, or `None` when the session never started.
pub async fn run_session<L: ProfileLedger>(
    engine: &mut SessionEngine<L>,
    mode: GameMode,
    settings: GameSettings,
) -> io::Result<Option<SessionReport>> {
    println!("Commands: h = hint, p = pause, r = resume, q = quit");
    engine.start_game(mode, settings);
    render_events(engine);
    render_prompt(engine);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;
    let mut feedback: Option<(FeedbackTicket, Instant)> = None;

    while engine.phase().is_live() {
        let timed = engine.session().is_some_and(|s| s.timer_running());
        let deadline = feedback.map(|(_, at)| at);

        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::debug!("stdin closed");
                    break;
                };
                match Input::classify(&line) {
                    Input::Quit => break,
                    Input::Hint => render_hint(engine),
                    Input::Pause => {
                        if engine.pause_game() {
                            println!("⏸  Paused. Type r to resume.");
                        }
                    }
                    Input::Resume => {
                        if engine.resume_game() {
                            println!("▶  Resumed.");
                            render_prompt(engine);
                        }
                    }
                    Input::Answer => {
                        if let Some(outcome) = engine.submit_answer(&line) {
                            render_outcome(&outcome);
                            render_events(engine);
                            match outcome.ticket {
                                Some(ticket) => {
                                    feedback = Some((ticket, Instant::now() + ticket.delay()));
                                }
                                None => render_prompt(engine),
                            }
                        }
                    }
                }
            }
            _ = ticker.tick(), if timed => {
                if engine.tick().is_some() {
                    render_events(engine);
                }
            }
            () = wait_until(deadline) => {
                if let Some((ticket, _)) = feedback.take() {
                    if engine.continue_after_feedback(ticket) {
                        render_events(engine);
                        render_prompt(engine);
                    }
                }
            }
        }
    }

    let report = match engine.end_game() {
        Some(report) => Some(report),
        None => engine.session().map(|s| s.report()),
    };
    render_events(engine);
    if let Some(report) = &report {
        render_report(report);
    }
    engine.reset();
    Ok(report)
}

fn render_prompt<L: ProfileLedger>(engine: &SessionEngine<L>) {
    let Some(session) = engine.session() else {
        return;
    };
    let Some(problem) = session.current_problem() else {
        return;
    };

    let mut status = Vec::new();
    if session.timer_running() {
        status.push(format!("⏱ {}", session.formatted_time()));
    }
    match session.mode() {
        GameMode::Level => status.push(format!("Level {}", session.level().level)),
        GameMode::TimesTable | GameMode::DivisionTable => {
            if let Some(drill) = session.drill() {
                status.push(format!("Table {}", drill.table()));
            }
        }
        GameMode::Practice | GameMode::Timed => {}
    }
    if let Some(progress) = session.progress() {
        status.push(format!("{}/{}", progress.answered + 1, progress.total));
    }
    status.push(format!("Score {}", session.score()));

    println!("[{}]", status.join(" · "));
    println!("  {problem} = ?");
    if session.phase() == Phase::Paused {
        println!("  (paused)");
    }
}

fn render_outcome(outcome: &AnswerOutcome) {
    if outcome.correct {
        println!(
            "✅ Correct! +{} points, +{} ⭐",
            outcome.points, outcome.stars
        );
    } else {
        println!("❌ Not quite. The answer was {}.", outcome.expected);
    }
    match outcome.level_result {
        Some(LevelResult::Failed { level }) => {
            println!("Level {level} needs 8 out of 10. Try again!");
        }
        Some(LevelResult::Passed { .. }) | None => {}
    }
}

fn render_events<L: ProfileLedger>(engine: &mut SessionEngine<L>) {
    for event in engine.drain_events() {
        match event {
            SessionEvent::Started { mode } => println!("▶  {mode} mode"),
            SessionEvent::LevelUp { level } => println!("🎉 Level up! Welcome to level {level}."),
            SessionEvent::TableComplete { table } => {
                println!("📗 Table {table} done! On to {}.", table + 1);
            }
            SessionEvent::DrillComplete => println!("🏆 Every table cleared!"),
            SessionEvent::Tick { remaining } => println!("⏳ {remaining}s left"),
            SessionEvent::TickUrgent { remaining } => println!("⏰ {remaining}!"),
            SessionEvent::GameOver => println!("🏁 Game over"),
            SessionEvent::Correct | SessionEvent::Wrong => {}
        }
    }
}

fn render_hint<L: ProfileLedger>(engine: &SessionEngine<L>) {
    let Some(hint) = engine.session().and_then(|s| s.hint()) else {
        return;
    };
    println!("💡 {}", hint.message());
    println!("   {}", hint.instruction());
    if let Some(picture) = picture(&hint) {
        println!("{picture}");
    }
}

/// Dot picture for hints small enough to draw.
fn picture(hint: &Hint) -> Option<String> {
    let dots = |n: u32| "● ".repeat(n as usize).trim_end().to_owned();
    match *hint {
        Hint::Counting { group1, group2 } => {
            Some(format!("   {}  +  {}", dots(group1), dots(group2)))
        }
        Hint::TakeAway { total, remove } => {
            let kept = "● ".repeat(total.saturating_sub(remove) as usize);
            let gone = "○ ".repeat(remove.min(total) as usize);
            Some(format!("   {}", format!("{kept}{gone}").trim_end()))
        }
        Hint::Array { rows, columns } => Some(
            (0..rows)
                .map(|_| format!("   {}", dots(columns)))
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        Hint::Grouping {
            group_size, groups, ..
        } => Some(
            (0..groups)
                .map(|_| format!("   ( {} )", dots(group_size)))
                .collect::<Vec<_>>()
                .join("\n"),
        ),
        Hint::NumberLine { .. } | Hint::SkipCount { .. } | Hint::ReverseMultiply { .. } => None,
    }
}

fn render_report(report: &SessionReport) {
    println!();
    println!("── {} results ──", report.mode);
    println!(
        "Answered {} · correct {} · accuracy {}%",
        report.attempted, report.correct, report.accuracy
    );
    println!("Score {}", report.score);
    match report.mode {
        GameMode::Level => println!("Reached level {}", report.level),
        GameMode::TimesTable | GameMode::DivisionTable => {
            if report.drill_completed {
                println!("All tables complete!");
            } else if let Some(table) = report.table {
                println!("Stopped at table {table}");
            }
        }
        GameMode::Practice | GameMode::Timed => {}
    }

    let b = report.breakdown;
    println!(
        "Stars +{} (answers {}, accuracy bonus {}, completion bonus {})",
        report.stars_earned, b.base, b.accuracy_bonus, b.completion_bonus
    );
    if let Some(evolution) = report.evolution {
        println!(
            "{} Your pet grew from {} into {}!",
            evolution.to.emoji(),
            evolution.from.name(),
            evolution.to.name()
        );
        println!("   {}", evolution.to.message());
    }
    for milestone in &report.milestones {
        println!(
            "{} {}: +{} ⭐",
            milestone.emoji(),
            milestone.name(),
            milestone.reward()
        );
    }
}

/// One-line pet summary used by the profile listing.
pub fn pet_line(stage: PetStage, xp: u32) -> String {
    format!("{} {} ({xp} xp)", stage.emoji(), stage.name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_commands_before_answers() {
        assert_eq!(Input::classify(" H "), Input::Hint);
        assert_eq!(Input::classify("pause"), Input::Pause);
        assert_eq!(Input::classify("q"), Input::Quit);
        assert_eq!(Input::classify("12"), Input::Answer);
        assert_eq!(Input::classify(""), Input::Answer);
    }

    #[test]
    fn pictures_small_hints_only() {
        let counting = picture(&Hint::Counting {
            group1: 2,
            group2: 3,
        });
        assert_eq!(counting.as_deref(), Some("   ● ●  +  ● ● ●"));

        let take_away = picture(&Hint::TakeAway {
            total: 4,
            remove: 1,
        });
        assert_eq!(take_away.as_deref(), Some("   ● ● ● ○"));

        let array = picture(&Hint::Array {
            rows: 2,
            columns: 3,
        })
        .unwrap();
        assert_eq!(array.lines().count(), 2);

        assert!(
            picture(&Hint::SkipCount {
                base: 7,
                times: 8
            })
            .is_none()
        );
    }
}
