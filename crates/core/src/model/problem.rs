use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {raw}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub raw: String,
}

impl ParseEnumError {
    pub(crate) fn new(kind: &'static str, raw: &str) -> Self {
        Self {
            kind,
            raw: raw.to_owned(),
        }
    }
}

//
// ─── OPERATION ─────────────────────────────────────────────────────────────────
//

/// One of the four arithmetic operations a problem can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
    ];

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Operation::Add => "+",
            Operation::Subtract => "-",
            Operation::Multiply => "×",
            Operation::Divide => "÷",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Add => "add",
            Operation::Subtract => "subtract",
            Operation::Multiply => "multiply",
            Operation::Divide => "divide",
        }
    }

    /// Applies the operation. Division is integer division.
    ///
    /// Returns `None` on underflow or a zero divisor.
    #[must_use]
    pub fn apply(self, lhs: u32, rhs: u32) -> Option<u32> {
        match self {
            Operation::Add => lhs.checked_add(rhs),
            Operation::Subtract => lhs.checked_sub(rhs),
            Operation::Multiply => lhs.checked_mul(rhs),
            Operation::Divide => lhs.checked_div(rhs),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "add" | "+" => Ok(Self::Add),
            "subtract" | "sub" | "-" => Ok(Self::Subtract),
            "multiply" | "mul" | "x" | "*" => Ok(Self::Multiply),
            "divide" | "div" | "/" => Ok(Self::Divide),
            _ => Err(ParseEnumError::new("operation", s)),
        }
    }
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

/// Difficulty tier: controls operand ranges and reward multipliers.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Inclusive operand range for addition and subtraction.
    #[must_use]
    pub fn range(self) -> (u32, u32) {
        match self {
            Difficulty::Easy => (1, 10),
            Difficulty::Medium => (1, 50),
            Difficulty::Hard => (1, 100),
        }
    }

    /// Upper bound for both multiplication factors.
    #[must_use]
    pub fn multiply_cap(self) -> u32 {
        match self {
            Difficulty::Easy => 5,
            Difficulty::Medium => 10,
            Difficulty::Hard => 12,
        }
    }

    /// Upper bound for the divisor and the quotient.
    #[must_use]
    pub fn divide_cap(self) -> u32 {
        match self {
            Difficulty::Easy | Difficulty::Medium => 10,
            Difficulty::Hard => 12,
        }
    }

    /// Operations used when a caller does not choose any.
    #[must_use]
    pub fn default_operations(self) -> &'static [Operation] {
        match self {
            Difficulty::Easy => &[Operation::Add, Operation::Subtract],
            Difficulty::Medium | Difficulty::Hard => &Operation::ALL,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy (Ages 5-7)",
            Difficulty::Medium => "Medium (Ages 7-9)",
            Difficulty::Hard => "Hard (Ages 9-12)",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(ParseEnumError::new("difficulty", s)),
        }
    }
}

//
// ─── PROBLEM ───────────────────────────────────────────────────────────────────
//

/// Which drill a fixed-table problem belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrillKind {
    TimesTable,
    DivisionTable,
}

impl DrillKind {
    #[must_use]
    pub fn operation(self) -> Operation {
        match self {
            DrillKind::TimesTable => Operation::Multiply,
            DrillKind::DivisionTable => Operation::Divide,
        }
    }
}

/// Where a problem came from: a difficulty tier or a table drill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemLabel {
    Tier(Difficulty),
    Drill(DrillKind),
}

impl ProblemLabel {
    /// Tier used for reward multipliers and stat tracking. Drills count as medium.
    #[must_use]
    pub fn tier(self) -> Difficulty {
        match self {
            ProblemLabel::Tier(d) => d,
            ProblemLabel::Drill(_) => Difficulty::Medium,
        }
    }
}

/// A single arithmetic problem. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Problem {
    operand1: u32,
    operand2: u32,
    operation: Operation,
    answer: u32,
    label: ProblemLabel,
}

impl Problem {
    /// Builds a problem, computing its answer.
    ///
    /// Returns `None` for subtraction that would go negative and for division
    /// that is not exact (or divides by zero).
    #[must_use]
    pub fn new(
        operand1: u32,
        operand2: u32,
        operation: Operation,
        label: ProblemLabel,
    ) -> Option<Self> {
        if operation == Operation::Divide && (operand2 == 0 || operand1 % operand2 != 0) {
            return None;
        }
        let answer = operation.apply(operand1, operand2)?;
        Some(Self {
            operand1,
            operand2,
            operation,
            answer,
            label,
        })
    }

    /// Builds a problem whose operands the caller already constrained.
    pub(crate) fn generated(
        operand1: u32,
        operand2: u32,
        operation: Operation,
        answer: u32,
        label: ProblemLabel,
    ) -> Self {
        debug_assert_eq!(operation.apply(operand1, operand2), Some(answer));
        Self {
            operand1,
            operand2,
            operation,
            answer,
            label,
        }
    }

    #[must_use]
    pub fn operand1(&self) -> u32 {
        self.operand1
    }

    #[must_use]
    pub fn operand2(&self) -> u32 {
        self.operand2
    }

    #[must_use]
    pub fn operation(&self) -> Operation {
        self.operation
    }

    #[must_use]
    pub fn answer(&self) -> u32 {
        self.answer
    }

    #[must_use]
    pub fn label(&self) -> ProblemLabel {
        self.label
    }

    /// Compares raw user input with the answer.
    ///
    /// Input is trimmed and parsed as an integer; anything unparsable is wrong.
    #[must_use]
    pub fn check_answer(&self, raw: &str) -> bool {
        raw.trim()
            .parse::<i64>()
            .is_ok_and(|value| value == i64::from(self.answer))
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.operand1,
            self.operation.symbol(),
            self.operand2
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier(d: Difficulty) -> ProblemLabel {
        ProblemLabel::Tier(d)
    }

    #[test]
    fn rejects_negative_and_inexact() {
        assert!(Problem::new(3, 5, Operation::Subtract, tier(Difficulty::Easy)).is_none());
        assert!(Problem::new(7, 2, Operation::Divide, tier(Difficulty::Easy)).is_none());
        assert!(Problem::new(7, 0, Operation::Divide, tier(Difficulty::Easy)).is_none());
        let p = Problem::new(42, 6, Operation::Divide, tier(Difficulty::Hard)).unwrap();
        assert_eq!(p.answer(), 7);
    }

    #[test]
    fn check_answer_trims_and_tolerates_garbage() {
        let p = Problem::new(4, 5, Operation::Add, tier(Difficulty::Easy)).unwrap();
        assert!(p.check_answer("9"));
        assert!(p.check_answer(" 9 "));
        assert!(!p.check_answer("10"));
        assert!(!p.check_answer("nine"));
        assert!(!p.check_answer("9abc"));
        assert!(!p.check_answer("2.0"));
        assert!(!p.check_answer("-9"));
        assert!(!p.check_answer(""));
    }

    #[test]
    fn displays_with_symbol() {
        let p = Problem::new(7, 8, Operation::Multiply, ProblemLabel::Drill(DrillKind::TimesTable))
            .unwrap();
        assert_eq!(p.to_string(), "7 × 8");
        assert_eq!(p.label().tier(), Difficulty::Medium);
    }

    #[test]
    fn parses_operation_aliases() {
        assert_eq!("ADD".parse::<Operation>().unwrap(), Operation::Add);
        assert_eq!("x".parse::<Operation>().unwrap(), Operation::Multiply);
        let err = "modulo".parse::<Operation>().unwrap_err();
        assert_eq!(err.kind, "operation");
        assert_eq!("Hard".parse::<Difficulty>().unwrap(), Difficulty::Hard);
    }
}
