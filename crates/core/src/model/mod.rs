mod hint;
mod ids;
mod milestone;
mod mode;
mod pet;
mod preferences;
mod problem;
mod profile;
pub mod shop;

pub use hint::Hint;
pub use ids::ProfileId;
pub use milestone::{Milestone, MilestoneField};
pub use mode::{GameMode, GameSettings, HighScoreKind, MAX_TABLE};
pub use pet::{Evolution, PetStage, PetState};
pub use preferences::Preferences;
pub use problem::{Difficulty, DrillKind, Operation, ParseEnumError, Problem, ProblemLabel};
pub use profile::{
    AccuracyFilter, Equipped, Profile, ProfileError, ProfileStats, Tally, TallyByDifficulty,
    TallyByOperation, Unlocks,
};
pub use shop::{ShopCategory, ShopItem, SoundPack, Theme};
