use super::problem::{Operation, Problem};

/// Visual hint for a problem, described as data for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hint {
    /// Two groups of dots to count together.
    Counting { group1: u32, group2: u32 },
    /// Dots with some crossed out.
    TakeAway { total: u32, remove: u32 },
    /// Jumps along a number line; `forward` is false for subtraction.
    NumberLine { start: u32, jump: u32, forward: bool },
    /// Rows × columns grid of dots.
    Array { rows: u32, columns: u32 },
    /// Count by `base`, `times` times.
    SkipCount { base: u32, times: u32 },
    /// Share `total` into groups of `group_size`.
    Grouping { total: u32, group_size: u32, groups: u32 },
    /// Division as a missing factor.
    ReverseMultiply { dividend: u32, divisor: u32 },
}

impl Hint {
    #[must_use]
    pub fn for_problem(problem: &Problem) -> Hint {
        let (a, b) = (problem.operand1(), problem.operand2());
        match problem.operation() {
            Operation::Add if a <= 10 && b <= 10 => Hint::Counting {
                group1: a,
                group2: b,
            },
            Operation::Add => Hint::NumberLine {
                start: a,
                jump: b,
                forward: true,
            },
            Operation::Subtract if a <= 12 => Hint::TakeAway {
                total: a,
                remove: b,
            },
            Operation::Subtract => Hint::NumberLine {
                start: a,
                jump: b,
                forward: false,
            },
            Operation::Multiply => {
                let groups = a.min(b);
                let per_group = a.max(b);
                if groups <= 6 && per_group <= 6 {
                    Hint::Array {
                        rows: groups,
                        columns: per_group,
                    }
                } else {
                    Hint::SkipCount {
                        base: per_group,
                        times: groups,
                    }
                }
            }
            Operation::Divide if a <= 24 && b <= 6 => Hint::Grouping {
                total: a,
                group_size: b,
                groups: problem.answer(),
            },
            Operation::Divide => Hint::ReverseMultiply {
                dividend: a,
                divisor: b,
            },
        }
    }

    #[must_use]
    pub fn message(&self) -> String {
        match *self {
            Hint::Counting { group1, group2 } => {
                format!("Count {group1} circles, then add {group2} more!")
            }
            Hint::TakeAway { total, remove } => {
                format!("Start with {total} circles, cross out {remove}")
            }
            Hint::NumberLine {
                start,
                jump,
                forward: true,
            } => format!("Start at {start}, jump forward {jump} spaces"),
            Hint::NumberLine { start, jump, .. } => {
                format!("Start at {start}, jump back {jump} spaces")
            }
            Hint::Array { rows, columns } => {
                format!("{rows} groups with {columns} in each group")
            }
            Hint::SkipCount { base, times } => {
                format!("Skip count by {base}, do it {times} times")
            }
            Hint::Grouping {
                total, group_size, ..
            } => format!("Share {total} items into groups of {group_size}"),
            Hint::ReverseMultiply { dividend, divisor } => {
                format!("What times {divisor} equals {dividend}?")
            }
        }
    }

    #[must_use]
    pub fn instruction(&self) -> String {
        match *self {
            Hint::Counting { .. } => "Count all the circles together".into(),
            Hint::TakeAway { .. } => "How many are left?".into(),
            Hint::NumberLine { .. } => "Where do you land?".into(),
            Hint::Array { .. } => "Count all the dots!".into(),
            Hint::SkipCount { base, .. } => {
                format!("{base}, {}, {}...", base * 2, base * 3)
            }
            Hint::Grouping { .. } => "How many groups can you make?".into(),
            Hint::ReverseMultiply { dividend, divisor } => {
                format!("Think: {divisor} x ? = {dividend}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Difficulty, ProblemLabel};

    fn problem(a: u32, b: u32, op: Operation) -> Problem {
        Problem::new(a, b, op, ProblemLabel::Tier(Difficulty::Hard)).unwrap()
    }

    #[test]
    fn small_operands_get_concrete_pictures() {
        assert_eq!(
            Hint::for_problem(&problem(3, 4, Operation::Add)),
            Hint::Counting {
                group1: 3,
                group2: 4
            }
        );
        assert_eq!(
            Hint::for_problem(&problem(9, 4, Operation::Subtract)),
            Hint::TakeAway { total: 9, remove: 4 }
        );
        assert_eq!(
            Hint::for_problem(&problem(5, 3, Operation::Multiply)),
            Hint::Array { rows: 3, columns: 5 }
        );
        assert_eq!(
            Hint::for_problem(&problem(18, 6, Operation::Divide)),
            Hint::Grouping {
                total: 18,
                group_size: 6,
                groups: 3
            }
        );
    }

    #[test]
    fn large_operands_get_strategies() {
        let hint = Hint::for_problem(&problem(40, 7, Operation::Subtract));
        assert_eq!(hint.message(), "Start at 40, jump back 7 spaces");

        let hint = Hint::for_problem(&problem(3, 9, Operation::Multiply));
        assert_eq!(hint, Hint::SkipCount { base: 9, times: 3 });
        assert_eq!(hint.instruction(), "9, 18, 27...");

        let hint = Hint::for_problem(&problem(84, 7, Operation::Divide));
        assert_eq!(hint.instruction(), "Think: 7 x ? = 84");
    }
}
