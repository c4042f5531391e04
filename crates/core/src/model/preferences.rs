use super::mode::{GameMode, GameSettings};
use super::problem::{Difficulty, Operation};

/// Last menu selections, remembered between launches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub mode: Option<GameMode>,
    pub difficulty: Difficulty,
    pub operations: Vec<Operation>,
    pub time_limit_secs: u32,
}

impl Default for Preferences {
    fn default() -> Self {
        let settings = GameSettings::default();
        Self {
            mode: None,
            difficulty: settings.difficulty,
            operations: settings.operations,
            time_limit_secs: settings.time_limit_secs,
        }
    }
}

impl Preferences {
    /// Adds the operation if missing, removes it otherwise.
    pub fn toggle_operation(&mut self, operation: Operation) {
        if let Some(idx) = self.operations.iter().position(|op| *op == operation) {
            self.operations.remove(idx);
        } else {
            self.operations.push(operation);
        }
    }

    #[must_use]
    pub fn to_settings(&self) -> GameSettings {
        GameSettings::new(self.difficulty, self.operations.clone())
            .with_time_limit(self.time_limit_secs)
    }
}
