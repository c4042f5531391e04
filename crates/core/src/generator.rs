use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};

use crate::model::{Difficulty, DrillKind, MAX_TABLE, Operation, Problem, ProblemLabel};

/// Questions per drill table: n×1 through n×12.
pub const TABLE_SIZE: u32 = 12;

/// Produces arithmetic problems from a difficulty tier and operation set.
///
/// Holds only its random source; every call is independent of the previous one.
#[derive(Debug, Clone)]
pub struct ProblemGenerator<R = StdRng> {
    rng: R,
}

impl ProblemGenerator<StdRng> {
    /// Generator seeded from the operating system.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_os_rng())
    }

    /// Deterministic generator for tests and replays.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> ProblemGenerator<R> {
    #[must_use]
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Generate one problem.
    ///
    /// The operation is picked uniformly from `operations`; an empty slice
    /// falls back to the tier's default operations.
    pub fn generate(&mut self, difficulty: Difficulty, operations: &[Operation]) -> Problem {
        let pool = if operations.is_empty() {
            difficulty.default_operations()
        } else {
            operations
        };
        let operation = pool
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(Operation::Add);
        let label = ProblemLabel::Tier(difficulty);
        let (min, max) = difficulty.range();

        match operation {
            Operation::Add => {
                let a = self.rng.random_range(min..=max);
                let b = self.rng.random_range(min..=max);
                Problem::generated(a, b, operation, a + b, label)
            }
            Operation::Subtract => {
                let a = self.rng.random_range(min..=max);
                let b = self.rng.random_range(min..=a);
                Problem::generated(a, b, operation, a - b, label)
            }
            Operation::Multiply => {
                let cap = difficulty.multiply_cap();
                let a = self.rng.random_range(1..=cap);
                let b = self.rng.random_range(1..=cap);
                Problem::generated(a, b, operation, a * b, label)
            }
            Operation::Divide => {
                let cap = difficulty.divide_cap();
                let divisor = self.rng.random_range(1..=cap);
                let quotient = self.rng.random_range(1..=cap);
                Problem::generated(divisor * quotient, divisor, operation, quotient, label)
            }
        }
    }

    /// The full question set for one drill table, shuffled.
    pub fn drill_set(&mut self, kind: DrillKind, table: u32) -> Vec<Problem> {
        let mut set = table_questions(kind, table);
        self.shuffle(&mut set);
        set
    }

    /// Uniform Fisher–Yates permutation in place.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.rng);
    }
}

/// Unshuffled drill questions for `table` (clamped to 1..=12).
#[must_use]
pub fn table_questions(kind: DrillKind, table: u32) -> Vec<Problem> {
    let n = table.clamp(1, MAX_TABLE);
    let label = ProblemLabel::Drill(kind);
    (1..=TABLE_SIZE)
        .map(|i| match kind {
            DrillKind::TimesTable => Problem::generated(n, i, Operation::Multiply, n * i, label),
            DrillKind::DivisionTable => Problem::generated(n * i, n, Operation::Divide, i, label),
        })
        .collect()
}

/// Parse-and-compare helper mirroring `Problem::check_answer`.
#[must_use]
pub fn check_answer(problem: &Problem, raw: &str) -> bool {
    problem.check_answer(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn never_negative_never_fractional() {
        let mut generator = ProblemGenerator::seeded(7);
        for difficulty in Difficulty::ALL {
            for _ in 0..2_000 {
                let p = generator.generate(difficulty, &Operation::ALL);
                match p.operation() {
                    Operation::Subtract => assert!(p.operand2() <= p.operand1(), "{p}"),
                    Operation::Divide => {
                        assert!(p.operand2() > 0);
                        assert_eq!(p.operand1() % p.operand2(), 0, "{p}");
                        assert_eq!(p.operand1() / p.operand2(), p.answer());
                    }
                    _ => {}
                }
                assert_eq!(p.operation().apply(p.operand1(), p.operand2()), Some(p.answer()));
            }
        }
    }

    #[test]
    fn operands_stay_in_tier_bounds() {
        let mut generator = ProblemGenerator::seeded(11);
        for difficulty in Difficulty::ALL {
            let (min, max) = difficulty.range();
            for _ in 0..1_000 {
                let p = generator.generate(difficulty, &Operation::ALL);
                match p.operation() {
                    Operation::Add | Operation::Subtract => {
                        assert!((min..=max).contains(&p.operand1()));
                        assert!((min..=max).contains(&p.operand2()));
                    }
                    Operation::Multiply => {
                        assert!(p.operand1() <= difficulty.multiply_cap());
                        assert!(p.operand2() <= difficulty.multiply_cap());
                    }
                    Operation::Divide => {
                        assert!(p.operand2() <= difficulty.divide_cap());
                        assert!(p.answer() <= difficulty.divide_cap());
                    }
                }
                assert_eq!(p.label(), ProblemLabel::Tier(difficulty));
            }
        }
    }

    #[test]
    fn checks_exact_answer_only() {
        let mut generator = ProblemGenerator::seeded(3);
        for _ in 0..500 {
            let p = generator.generate(Difficulty::Hard, &Operation::ALL);
            assert!(check_answer(&p, &p.answer().to_string()));
            assert!(!check_answer(&p, &(p.answer() + 1).to_string()));
        }
    }

    #[test]
    fn only_allowed_operations_are_used() {
        let mut generator = ProblemGenerator::seeded(5);
        let seen: HashSet<Operation> = (0..500)
            .map(|_| {
                generator
                    .generate(Difficulty::Medium, &[Operation::Multiply, Operation::Divide])
                    .operation()
            })
            .collect();
        assert_eq!(seen, HashSet::from([Operation::Multiply, Operation::Divide]));
    }

    #[test]
    fn empty_operation_set_uses_tier_defaults() {
        let mut generator = ProblemGenerator::seeded(9);
        for _ in 0..200 {
            let op = generator.generate(Difficulty::Easy, &[]).operation();
            assert!(matches!(op, Operation::Add | Operation::Subtract));
        }
    }

    #[test]
    fn drill_set_is_a_permutation_of_the_table() {
        let mut generator = ProblemGenerator::seeded(21);
        let set = generator.drill_set(DrillKind::TimesTable, 7);
        assert_eq!(set.len(), 12);

        let pairs: HashSet<(u32, u32)> = set.iter().map(|p| (p.operand1(), p.operand2())).collect();
        let expected: HashSet<(u32, u32)> = (1..=12).map(|i| (7, i)).collect();
        assert_eq!(pairs, expected);

        let division = table_questions(DrillKind::DivisionTable, 4);
        assert_eq!((division[2].operand1(), division[2].operand2()), (12, 4));
        assert_eq!(division[2].answer(), 3);
    }
}
