use serde::{Deserialize, Serialize};

/// Growth stages of the companion pet, unlocked by lifetime problems attempted.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PetStage {
    #[default]
    Egg,
    Baby,
    Kid,
    Teen,
    Adult,
}

impl PetStage {
    pub const ALL: [PetStage; 5] = [
        PetStage::Egg,
        PetStage::Baby,
        PetStage::Kid,
        PetStage::Teen,
        PetStage::Adult,
    ];

    /// Problems needed to reach this stage.
    #[must_use]
    pub fn min_problems(self) -> u32 {
        match self {
            PetStage::Egg => 0,
            PetStage::Baby => 25,
            PetStage::Kid => 100,
            PetStage::Teen => 300,
            PetStage::Adult => 500,
        }
    }

    #[must_use]
    pub fn next(self) -> Option<PetStage> {
        match self {
            PetStage::Egg => Some(PetStage::Baby),
            PetStage::Baby => Some(PetStage::Kid),
            PetStage::Kid => Some(PetStage::Teen),
            PetStage::Teen => Some(PetStage::Adult),
            PetStage::Adult => None,
        }
    }

    /// Stage reached after `problems` attempts.
    #[must_use]
    pub fn for_problems(problems: u32) -> PetStage {
        Self::ALL
            .into_iter()
            .rev()
            .find(|stage| problems >= stage.min_problems())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn index(self) -> u8 {
        match self {
            PetStage::Egg => 0,
            PetStage::Baby => 1,
            PetStage::Kid => 2,
            PetStage::Teen => 3,
            PetStage::Adult => 4,
        }
    }

    #[must_use]
    pub fn from_index(index: u8) -> Option<PetStage> {
        Self::ALL.get(usize::from(index)).copied()
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            PetStage::Egg => "Egg",
            PetStage::Baby => "Baby",
            PetStage::Kid => "Kid",
            PetStage::Teen => "Teen",
            PetStage::Adult => "Adult",
        }
    }

    #[must_use]
    pub fn emoji(self) -> &'static str {
        match self {
            PetStage::Egg => "🥚",
            PetStage::Baby => "🐣",
            PetStage::Kid => "🐤",
            PetStage::Teen => "🐦",
            PetStage::Adult => "🦅",
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            PetStage::Egg => "Your Math Buddy is sleeping!",
            PetStage::Baby => "Your Math Buddy has hatched!",
            PetStage::Kid => "Your Math Buddy is learning!",
            PetStage::Teen => "Your Math Buddy is getting stronger!",
            PetStage::Adult => "Your Math Buddy has fully evolved!",
        }
    }
}

/// A stage change detected after a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evolution {
    pub from: PetStage,
    pub to: PetStage,
}

/// Persisted pet progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PetState {
    pub xp: u32,
    pub stage: PetStage,
}

impl PetState {
    pub fn add_xp(&mut self, amount: u32) {
        self.xp = self.xp.saturating_add(amount);
    }

    /// Moves the pet to the stage its xp has earned, if that is higher.
    pub fn evolve(&mut self) -> Option<Evolution> {
        let earned = PetStage::for_problems(self.xp);
        if earned > self.stage {
            let evolution = Evolution {
                from: self.stage,
                to: earned,
            };
            self.stage = earned;
            Some(evolution)
        } else {
            None
        }
    }

    /// Percent progress through the current xp stage; 100 at the last stage.
    #[must_use]
    pub fn progress_percent(&self) -> u32 {
        let current = PetStage::for_problems(self.xp);
        let Some(next) = current.next() else {
            return 100;
        };
        let span = next.min_problems() - current.min_problems();
        let done = self.xp - current.min_problems();
        (done * 200 + span) / (span * 2)
    }

    /// Problems still needed to reach the next stage; 0 at the last stage.
    #[must_use]
    pub fn problems_to_next(&self) -> u32 {
        PetStage::for_problems(self.xp)
            .next()
            .map_or(0, |next| next.min_problems() - self.xp)
    }
}
