use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use super::ids::ProfileId;
use super::milestone::Milestone;
use super::mode::HighScoreKind;
use super::pet::{Evolution, PetState};
use super::problem::{Difficulty, Operation};
use super::shop::ShopCategory;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProfileError {
    #[error("profile name cannot be empty")]
    EmptyName,

    #[error("unknown avatar: {0}")]
    UnknownAvatar(String),

    #[error("{category} item is not unlocked: {id}")]
    NotUnlocked { category: ShopCategory, id: String },

    #[error("not enough stars: need {needed}, have {balance}")]
    InsufficientStars { needed: u32, balance: u32 },

    #[error("invalid persisted profile: {0}")]
    InvalidPersistedState(String),
}

//
// ─── STATS ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub attempted: u32,
    pub correct: u32,
}

impl Tally {
    fn record(&mut self, correct: bool) {
        self.attempted = self.attempted.saturating_add(1);
        if correct {
            self.correct = self.correct.saturating_add(1);
        }
    }

    /// Rounded percent correct; 0 when nothing was attempted.
    #[must_use]
    pub fn accuracy(&self) -> u32 {
        crate::reward::accuracy_percent(self.correct, self.attempted)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TallyByOperation {
    pub add: Tally,
    pub subtract: Tally,
    pub multiply: Tally,
    pub divide: Tally,
}

impl TallyByOperation {
    #[must_use]
    pub fn get(&self, operation: Operation) -> &Tally {
        match operation {
            Operation::Add => &self.add,
            Operation::Subtract => &self.subtract,
            Operation::Multiply => &self.multiply,
            Operation::Divide => &self.divide,
        }
    }

    fn get_mut(&mut self, operation: Operation) -> &mut Tally {
        match operation {
            Operation::Add => &mut self.add,
            Operation::Subtract => &mut self.subtract,
            Operation::Multiply => &mut self.multiply,
            Operation::Divide => &mut self.divide,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TallyByDifficulty {
    pub easy: Tally,
    pub medium: Tally,
    pub hard: Tally,
}

impl TallyByDifficulty {
    #[must_use]
    pub fn get(&self, difficulty: Difficulty) -> &Tally {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Hard => &self.hard,
        }
    }

    fn get_mut(&mut self, difficulty: Difficulty) -> &mut Tally {
        match difficulty {
            Difficulty::Easy => &mut self.easy,
            Difficulty::Medium => &mut self.medium,
            Difficulty::Hard => &mut self.hard,
        }
    }
}

/// Lifetime counters for a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileStats {
    pub total_problems: u32,
    pub correct_answers: u32,
    pub by_operation: TallyByOperation,
    pub by_difficulty: TallyByDifficulty,
    pub high_score_timed: u32,
    pub high_score_level: u32,
    pub current_streak: u32,
    pub best_streak: u32,
    pub levels_unlocked: u32,
    pub stars: u32,
}

impl Default for ProfileStats {
    fn default() -> Self {
        Self {
            total_problems: 0,
            correct_answers: 0,
            by_operation: TallyByOperation::default(),
            by_difficulty: TallyByDifficulty::default(),
            high_score_timed: 0,
            high_score_level: 0,
            current_streak: 0,
            best_streak: 0,
            levels_unlocked: 1,
            stars: 0,
        }
    }
}

impl ProfileStats {
    fn record(&mut self, operation: Operation, difficulty: Difficulty, correct: bool) {
        self.total_problems = self.total_problems.saturating_add(1);
        self.by_operation.get_mut(operation).record(correct);
        self.by_difficulty.get_mut(difficulty).record(correct);

        if correct {
            self.correct_answers = self.correct_answers.saturating_add(1);
            self.current_streak = self.current_streak.saturating_add(1);
            self.best_streak = self.best_streak.max(self.current_streak);
        } else {
            self.current_streak = 0;
        }
    }
}

/// Slice of stats an accuracy figure is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccuracyFilter {
    Overall,
    Operation(Operation),
    Difficulty(Difficulty),
}

//
// ─── COSMETICS ─────────────────────────────────────────────────────────────────
//

/// Shop items owned by a profile, per category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unlocks {
    items: BTreeMap<ShopCategory, BTreeSet<String>>,
}

impl Default for Unlocks {
    fn default() -> Self {
        let items = ShopCategory::ALL
            .into_iter()
            .map(|category| {
                (
                    category,
                    BTreeSet::from([category.default_item().to_owned()]),
                )
            })
            .collect();
        Self { items }
    }
}

impl Unlocks {
    #[must_use]
    pub fn contains(&self, category: ShopCategory, id: &str) -> bool {
        self.items
            .get(&category)
            .is_some_and(|owned| owned.contains(id))
    }

    /// Returns `true` if the item was not owned before.
    pub fn insert(&mut self, category: ShopCategory, id: impl Into<String>) -> bool {
        self.items.entry(category).or_default().insert(id.into())
    }

    pub fn iter(&self, category: ShopCategory) -> impl Iterator<Item = &str> {
        self.items
            .get(&category)
            .into_iter()
            .flat_map(|owned| owned.iter().map(String::as_str))
    }
}

/// Currently selected item per shop category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equipped {
    pub avatar: String,
    pub theme: String,
    pub sound_pack: String,
}

impl Default for Equipped {
    fn default() -> Self {
        Self {
            avatar: ShopCategory::Avatars.default_item().to_owned(),
            theme: ShopCategory::Themes.default_item().to_owned(),
            sound_pack: ShopCategory::SoundPacks.default_item().to_owned(),
        }
    }
}

impl Equipped {
    #[must_use]
    pub fn get(&self, category: ShopCategory) -> &str {
        match category {
            ShopCategory::Avatars => &self.avatar,
            ShopCategory::Themes => &self.theme,
            ShopCategory::SoundPacks => &self.sound_pack,
        }
    }

    fn set(&mut self, category: ShopCategory, id: String) {
        match category {
            ShopCategory::Avatars => self.avatar = id,
            ShopCategory::Themes => self.theme = id,
            ShopCategory::SoundPacks => self.sound_pack = id,
        }
    }
}

//
// ─── PROFILE ───────────────────────────────────────────────────────────────────
//

/// A child's persistent profile: stats, stars, pet, milestones and cosmetics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    id: ProfileId,
    name: String,
    created_at: DateTime<Utc>,
    stats: ProfileStats,
    pet: PetState,
    milestones: BTreeSet<Milestone>,
    unlocks: Unlocks,
    equipped: Equipped,
}

impl Profile {
    /// Create a fresh profile with the chosen avatar owned and equipped.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::EmptyName` if the trimmed name is empty, or
    /// `ProfileError::UnknownAvatar` if the avatar is not in the catalog.
    pub fn new(
        id: ProfileId,
        name: &str,
        avatar: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ProfileError> {
        let name = normalize_name(name)?;
        if ShopCategory::Avatars.find(avatar).is_none() {
            return Err(ProfileError::UnknownAvatar(avatar.to_owned()));
        }

        let mut unlocks = Unlocks::default();
        unlocks.insert(ShopCategory::Avatars, avatar);
        let equipped = Equipped {
            avatar: avatar.to_owned(),
            ..Equipped::default()
        };

        Ok(Self {
            id,
            name,
            created_at,
            stats: ProfileStats::default(),
            pet: PetState::default(),
            milestones: BTreeSet::new(),
            unlocks,
            equipped,
        })
    }

    /// Rehydrate a profile from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::EmptyName` for a blank name and
    /// `ProfileError::InvalidPersistedState` when an equipped item is not owned.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: ProfileId,
        name: &str,
        created_at: DateTime<Utc>,
        stats: ProfileStats,
        pet: PetState,
        milestones: BTreeSet<Milestone>,
        unlocks: Unlocks,
        equipped: Equipped,
    ) -> Result<Self, ProfileError> {
        let name = normalize_name(name)?;
        for category in ShopCategory::ALL {
            let id = equipped.get(category);
            if !unlocks.contains(category, id) {
                return Err(ProfileError::InvalidPersistedState(format!(
                    "equipped {category} item {id} is not unlocked"
                )));
            }
        }
        if stats.correct_answers > stats.total_problems {
            return Err(ProfileError::InvalidPersistedState(
                "more correct answers than problems".into(),
            ));
        }

        Ok(Self {
            id,
            name,
            created_at,
            stats,
            pet,
            milestones,
            unlocks,
            equipped,
        })
    }

    #[must_use]
    pub fn id(&self) -> ProfileId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The equipped avatar.
    #[must_use]
    pub fn avatar(&self) -> &str {
        &self.equipped.avatar
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn stats(&self) -> &ProfileStats {
        &self.stats
    }

    #[must_use]
    pub fn pet(&self) -> &PetState {
        &self.pet
    }

    #[must_use]
    pub fn milestones(&self) -> &BTreeSet<Milestone> {
        &self.milestones
    }

    #[must_use]
    pub fn unlocks(&self) -> &Unlocks {
        &self.unlocks
    }

    #[must_use]
    pub fn equipped(&self) -> &Equipped {
        &self.equipped
    }

    pub fn record_answer(&mut self, operation: Operation, difficulty: Difficulty, correct: bool) {
        self.stats.record(operation, difficulty, correct);
    }

    pub fn add_stars(&mut self, amount: u32) {
        self.stats.stars = self.stats.stars.saturating_add(amount);
    }

    /// Deduct stars from the balance.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::InsufficientStars` if the balance is too low.
    pub fn spend_stars(&mut self, amount: u32) -> Result<(), ProfileError> {
        let balance = self.stats.stars;
        self.stats.stars = balance
            .checked_sub(amount)
            .ok_or(ProfileError::InsufficientStars {
                needed: amount,
                balance,
            })?;
        Ok(())
    }

    pub fn add_pet_xp(&mut self, amount: u32) {
        self.pet.add_xp(amount);
    }

    pub fn evolve_pet(&mut self) -> Option<Evolution> {
        self.pet.evolve()
    }

    /// Marks newly reached milestones and credits their rewards.
    ///
    /// Returns them in catalog order.
    pub fn award_milestones(&mut self) -> Vec<Milestone> {
        let reached: Vec<Milestone> = Milestone::ALL
            .into_iter()
            .filter(|m| !self.milestones.contains(m) && m.is_reached(&self.stats))
            .collect();
        for milestone in &reached {
            self.milestones.insert(*milestone);
            self.add_stars(milestone.reward());
        }
        reached
    }

    pub fn update_high_score(&mut self, kind: HighScoreKind, value: u32) {
        let slot = match kind {
            HighScoreKind::Timed => &mut self.stats.high_score_timed,
            HighScoreKind::Level => &mut self.stats.high_score_level,
        };
        *slot = (*slot).max(value);
    }

    pub fn unlock_level(&mut self, level: u32) {
        self.stats.levels_unlocked = self.stats.levels_unlocked.max(level);
    }

    #[must_use]
    pub fn accuracy(&self, filter: AccuracyFilter) -> u32 {
        match filter {
            AccuracyFilter::Overall => Tally {
                attempted: self.stats.total_problems,
                correct: self.stats.correct_answers,
            }
            .accuracy(),
            AccuracyFilter::Operation(op) => self.stats.by_operation.get(op).accuracy(),
            AccuracyFilter::Difficulty(d) => self.stats.by_difficulty.get(d).accuracy(),
        }
    }

    /// Returns `true` if the item was not owned before.
    pub fn unlock_item(&mut self, category: ShopCategory, id: &str) -> bool {
        self.unlocks.insert(category, id)
    }

    /// Select an owned item.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError::NotUnlocked` if the item is not owned.
    pub fn equip(&mut self, category: ShopCategory, id: &str) -> Result<(), ProfileError> {
        if !self.unlocks.contains(category, id) {
            return Err(ProfileError::NotUnlocked {
                category,
                id: id.to_owned(),
            });
        }
        self.equipped.set(category, id.to_owned());
        Ok(())
    }
}

fn normalize_name(name: &str) -> Result<String, ProfileError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ProfileError::EmptyName);
    }
    Ok(trimmed.to_owned())
}
