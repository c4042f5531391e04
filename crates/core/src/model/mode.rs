use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::problem::{Difficulty, DrillKind, Operation, ParseEnumError};

/// Highest table reached by the drill modes.
pub const MAX_TABLE: u32 = 12;

const DEFAULT_TIME_LIMIT_SECS: u32 = 60;

/// Play mode, fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    Practice,
    Timed,
    Level,
    TimesTable,
    DivisionTable,
}

impl GameMode {
    pub const ALL: [GameMode; 5] = [
        GameMode::Practice,
        GameMode::Timed,
        GameMode::Level,
        GameMode::TimesTable,
        GameMode::DivisionTable,
    ];

    #[must_use]
    pub fn drill(self) -> Option<DrillKind> {
        match self {
            GameMode::TimesTable => Some(DrillKind::TimesTable),
            GameMode::DivisionTable => Some(DrillKind::DivisionTable),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_drill(self) -> bool {
        self.drill().is_some()
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            GameMode::Practice => "practice",
            GameMode::Timed => "timed",
            GameMode::Level => "level",
            GameMode::TimesTable => "times",
            GameMode::DivisionTable => "division",
        }
    }
}

impl fmt::Display for GameMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameMode {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "practice" => Ok(Self::Practice),
            "timed" => Ok(Self::Timed),
            "level" => Ok(Self::Level),
            "times" | "times_table" | "sifir" => Ok(Self::TimesTable),
            "division" | "division_table" | "bahagi" => Ok(Self::DivisionTable),
            _ => Err(ParseEnumError::new("mode", s)),
        }
    }
}

/// High-score slots kept on a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HighScoreKind {
    /// Best score reached in timed mode.
    Timed,
    /// Highest level reached in level mode.
    Level,
}

/// Settings chosen before a session starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSettings {
    pub difficulty: Difficulty,
    pub operations: Vec<Operation>,
    pub time_limit_secs: u32,
    pub start_level: u32,
    pub start_table: u32,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Easy,
            operations: vec![Operation::Add, Operation::Subtract],
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            start_level: 1,
            start_table: 1,
        }
    }
}

impl GameSettings {
    #[must_use]
    pub fn new(difficulty: Difficulty, operations: impl Into<Vec<Operation>>) -> Self {
        Self {
            difficulty,
            operations: operations.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_time_limit(mut self, secs: u32) -> Self {
        self.time_limit_secs = secs;
        self
    }

    #[must_use]
    pub fn with_start_level(mut self, level: u32) -> Self {
        self.start_level = level;
        self
    }

    #[must_use]
    pub fn with_start_table(mut self, table: u32) -> Self {
        self.start_table = table;
        self
    }

    /// Fills in zero values and an empty operation set, and clamps the table.
    ///
    /// Duplicate operations are kept: they weight the uniform pick.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.operations.is_empty() {
            self.operations = self.difficulty.default_operations().to_vec();
        }
        if self.time_limit_secs == 0 {
            self.time_limit_secs = DEFAULT_TIME_LIMIT_SECS;
        }
        self.start_level = self.start_level.max(1);
        self.start_table = self.start_table.clamp(1, MAX_TABLE);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_missing_values() {
        let settings = GameSettings {
            difficulty: Difficulty::Medium,
            operations: Vec::new(),
            time_limit_secs: 0,
            start_level: 0,
            start_table: 40,
        }
        .normalized();

        assert_eq!(settings.operations, Operation::ALL.to_vec());
        assert_eq!(settings.time_limit_secs, 60);
        assert_eq!(settings.start_level, 1);
        assert_eq!(settings.start_table, MAX_TABLE);
    }

    #[test]
    fn parses_mode_names() {
        assert_eq!("times".parse::<GameMode>().unwrap(), GameMode::TimesTable);
        assert_eq!("bahagi".parse::<GameMode>().unwrap(), GameMode::DivisionTable);
        assert!("arcade".parse::<GameMode>().is_err());
        assert!(GameMode::DivisionTable.is_drill());
        assert!(!GameMode::Timed.is_drill());
    }
}
