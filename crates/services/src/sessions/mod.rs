mod engine;
mod events;
mod progress;
pub mod rules;
mod state;

// Public API of the session subsystem.
pub use engine::SessionEngine;
pub use events::{AnswerOutcome, FeedbackTicket, LevelResult, SessionEvent, SessionReport};
pub use progress::SessionProgress;
pub use state::{DrillState, LevelState, Phase, SessionState};
