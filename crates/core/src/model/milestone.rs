use super::profile::ProfileStats;

/// Which profile counter a milestone watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MilestoneField {
    TotalProblems,
    BestStreak,
}

impl MilestoneField {
    #[must_use]
    pub fn read(self, stats: &ProfileStats) -> u32 {
        match self {
            MilestoneField::TotalProblems => stats.total_problems,
            MilestoneField::BestStreak => stats.best_streak,
        }
    }
}

/// One-off achievements that pay a star reward the first time they are crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Milestone {
    Problems25,
    Problems50,
    Problems100,
    Problems500,
    Streak10,
    Streak25,
    Streak50,
}

impl Milestone {
    pub const ALL: [Milestone; 7] = [
        Milestone::Problems25,
        Milestone::Problems50,
        Milestone::Problems100,
        Milestone::Problems500,
        Milestone::Streak10,
        Milestone::Streak25,
        Milestone::Streak50,
    ];

    /// Stable key used in persisted records.
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Milestone::Problems25 => "problems25",
            Milestone::Problems50 => "problems50",
            Milestone::Problems100 => "problems100",
            Milestone::Problems500 => "problems500",
            Milestone::Streak10 => "streak10",
            Milestone::Streak25 => "streak25",
            Milestone::Streak50 => "streak50",
        }
    }

    #[must_use]
    pub fn from_id(id: &str) -> Option<Milestone> {
        Self::ALL.into_iter().find(|m| m.id() == id)
    }

    #[must_use]
    pub fn field(self) -> MilestoneField {
        match self {
            Milestone::Problems25
            | Milestone::Problems50
            | Milestone::Problems100
            | Milestone::Problems500 => MilestoneField::TotalProblems,
            Milestone::Streak10 | Milestone::Streak25 | Milestone::Streak50 => {
                MilestoneField::BestStreak
            }
        }
    }

    #[must_use]
    pub fn threshold(self) -> u32 {
        match self {
            Milestone::Problems25 | Milestone::Streak25 => 25,
            Milestone::Problems50 | Milestone::Streak50 => 50,
            Milestone::Problems100 => 100,
            Milestone::Problems500 => 500,
            Milestone::Streak10 => 10,
        }
    }

    /// Stars credited when the milestone is first reached.
    #[must_use]
    pub fn reward(self) -> u32 {
        match self {
            Milestone::Problems25 => 100,
            Milestone::Problems50 => 200,
            Milestone::Problems100 | Milestone::Streak50 => 500,
            Milestone::Problems500 => 1000,
            Milestone::Streak10 => 50,
            Milestone::Streak25 => 150,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Milestone::Problems25 => "First Steps",
            Milestone::Problems50 => "Rising Star",
            Milestone::Problems100 => "Century Club",
            Milestone::Problems500 => "Math Legend",
            Milestone::Streak10 => "On Fire",
            Milestone::Streak25 => "Unstoppable",
            Milestone::Streak50 => "Perfect Machine",
        }
    }

    #[must_use]
    pub fn emoji(self) -> &'static str {
        match self {
            Milestone::Problems25 => "🎉",
            Milestone::Problems50 => "🌟",
            Milestone::Problems100 => "🏆",
            Milestone::Problems500 => "💎",
            Milestone::Streak10 | Milestone::Streak25 | Milestone::Streak50 => "🔥",
        }
    }

    #[must_use]
    pub fn description(self) -> String {
        match self.field() {
            MilestoneField::TotalProblems => format!("{} Problems Solved", self.threshold()),
            MilestoneField::BestStreak => format!("{} Correct in a Row", self.threshold()),
        }
    }

    #[must_use]
    pub fn is_reached(self, stats: &ProfileStats) -> bool {
        self.field().read(stats) >= self.threshold()
    }

    /// Percent of the way to the threshold, capped at 100.
    #[must_use]
    pub fn progress_percent(self, stats: &ProfileStats) -> u32 {
        let value = self.field().read(stats);
        let threshold = self.threshold();
        ((value.saturating_mul(200) + threshold) / (threshold * 2)).min(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_reversible() {
        for milestone in Milestone::ALL {
            assert_eq!(Milestone::from_id(milestone.id()), Some(milestone));
        }
        assert_eq!(Milestone::from_id("problems1000"), None);
    }

    #[test]
    fn reached_and_progress_follow_the_watched_field() {
        let stats = ProfileStats {
            total_problems: 30,
            best_streak: 5,
            ..ProfileStats::default()
        };
        assert!(Milestone::Problems25.is_reached(&stats));
        assert!(!Milestone::Problems50.is_reached(&stats));
        assert!(!Milestone::Streak10.is_reached(&stats));
        assert_eq!(Milestone::Problems50.progress_percent(&stats), 60);
        assert_eq!(Milestone::Streak10.progress_percent(&stats), 50);
        assert_eq!(Milestone::Problems25.progress_percent(&stats), 100);
        assert_eq!(Milestone::Streak25.description(), "25 Correct in a Row");
    }
}
