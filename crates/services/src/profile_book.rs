use chrono::{DateTime, Utc};
use ezmath_core::model::{
    AccuracyFilter, Difficulty, Evolution, HighScoreKind, Milestone, Operation, Profile, ProfileId,
};

use crate::error::ProfileServiceError;
use crate::ledger::{CurrencyReason, ProfileLedger};
use crate::shop::Shop;

/// All profiles on this device plus the one currently playing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileBook {
    profiles: Vec<Profile>,
    active: Option<ProfileId>,
}

impl ProfileBook {
    /// Build a book from persisted state. An active id that matches no
    /// profile is dropped.
    #[must_use]
    pub fn new(profiles: Vec<Profile>, active: Option<ProfileId>) -> Self {
        let active = active.filter(|id| profiles.iter().any(|p| p.id() == *id));
        Self { profiles, active }
    }

    #[must_use]
    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    #[must_use]
    pub fn has_profiles(&self) -> bool {
        !self.profiles.is_empty()
    }

    #[must_use]
    pub fn active_id(&self) -> Option<ProfileId> {
        self.active
    }

    #[must_use]
    pub fn active(&self) -> Option<&Profile> {
        let id = self.active?;
        self.profiles.iter().find(|p| p.id() == id)
    }

    pub(crate) fn active_mut(&mut self) -> Option<&mut Profile> {
        let id = self.active?;
        self.profiles.iter_mut().find(|p| p.id() == id)
    }

    /// Find a profile by its trimmed name, ignoring case.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&Profile> {
        let name = name.trim();
        self.profiles
            .iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
    }

    /// Create a profile and make it active.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::Profile` when the name is blank or the
    /// avatar is not in the catalog.
    pub fn create_profile(
        &mut self,
        name: &str,
        avatar: &str,
        created_at: DateTime<Utc>,
    ) -> Result<ProfileId, ProfileServiceError> {
        let profile = Profile::new(ProfileId::random(), name, avatar, created_at)?;
        let id = profile.id();
        tracing::info!(profile = %id, name = profile.name(), "created profile");
        self.profiles.push(profile);
        self.active = Some(id);
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns `ProfileServiceError::NotFound` for an unknown id.
    pub fn select_profile(&mut self, id: ProfileId) -> Result<(), ProfileServiceError> {
        if !self.profiles.iter().any(|p| p.id() == id) {
            return Err(ProfileServiceError::NotFound(id));
        }
        self.active = Some(id);
        Ok(())
    }

    /// Remove a profile. Deleting the active one activates the first remaining.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::NotFound` for an unknown id.
    pub fn delete_profile(&mut self, id: ProfileId) -> Result<Profile, ProfileServiceError> {
        let index = self
            .profiles
            .iter()
            .position(|p| p.id() == id)
            .ok_or(ProfileServiceError::NotFound(id))?;
        let removed = self.profiles.remove(index);
        if self.active == Some(id) {
            self.active = self.profiles.first().map(Profile::id);
        }
        tracing::info!(profile = %id, "deleted profile");
        Ok(removed)
    }

    /// Rounded accuracy of the active profile; 0 without one.
    #[must_use]
    pub fn accuracy(&self, filter: AccuracyFilter) -> u32 {
        self.active().map_or(0, |p| p.accuracy(filter))
    }

    /// Shop operations over the active profile.
    pub fn shop(&mut self) -> Shop<'_> {
        Shop::new(self)
    }
}

impl ProfileLedger for ProfileBook {
    fn update_stats(&mut self, operation: Operation, difficulty: Difficulty, correct: bool) {
        if let Some(profile) = self.active_mut() {
            profile.record_answer(operation, difficulty, correct);
        }
    }

    fn add_currency(&mut self, amount: u32, reason: CurrencyReason) {
        if let Some(profile) = self.active_mut() {
            profile.add_stars(amount);
            tracing::debug!(profile = %profile.id(), amount, %reason, "stars credited");
        }
    }

    fn add_experience(&mut self, amount: u32) {
        if let Some(profile) = self.active_mut() {
            profile.add_pet_xp(amount);
        }
    }

    fn check_evolution(&mut self) -> Option<Evolution> {
        let profile = self.active_mut()?;
        let evolution = profile.evolve_pet()?;
        tracing::info!(
            profile = %profile.id(),
            from = evolution.from.name(),
            to = evolution.to.name(),
            "pet evolved"
        );
        Some(evolution)
    }

    fn check_milestones(&mut self) -> Vec<Milestone> {
        let Some(profile) = self.active_mut() else {
            return Vec::new();
        };
        let reached = profile.award_milestones();
        for milestone in &reached {
            tracing::debug!(
                profile = %profile.id(),
                milestone = milestone.id(),
                amount = milestone.reward(),
                reason = %CurrencyReason::Milestone,
                "stars credited"
            );
        }
        reached
    }

    fn update_high_score(&mut self, kind: HighScoreKind, value: u32) {
        if let Some(profile) = self.active_mut() {
            profile.update_high_score(kind, value);
        }
    }

    fn unlock_level(&mut self, level: u32) {
        if let Some(profile) = self.active_mut() {
            profile.unlock_level(level);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ezmath_core::model::PetStage;
    use ezmath_core::time::fixed_now;

    fn book_with(names: &[&str]) -> ProfileBook {
        let mut book = ProfileBook::default();
        for name in names {
            book.create_profile(name, "🦊", fixed_now()).unwrap();
        }
        book
    }

    #[test]
    fn create_makes_profile_active() {
        let mut book = ProfileBook::default();
        assert!(!book.has_profiles());
        let id = book.create_profile("  Sam  ", "🐼", fixed_now()).unwrap();
        assert_eq!(book.active_id(), Some(id));
        assert_eq!(book.active().unwrap().name(), "Sam");
        assert_eq!(book.find_by_name("sam").unwrap().id(), id);
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut book = ProfileBook::default();
        let err = book.create_profile("   ", "🦊", fixed_now()).unwrap_err();
        assert!(matches!(err, ProfileServiceError::Profile(_)));
        assert!(!book.has_profiles());
    }

    #[test]
    fn deleting_active_falls_back_to_first() {
        let mut book = book_with(&["A", "B", "C"]);
        let first = book.profiles()[0].id();
        let last = book.active_id().unwrap();
        book.delete_profile(last).unwrap();
        assert_eq!(book.active_id(), Some(first));

        book.delete_profile(first).unwrap();
        let remaining = book.profiles()[0].id();
        assert_eq!(book.active_id(), Some(remaining));
        book.delete_profile(remaining).unwrap();
        assert_eq!(book.active_id(), None);

        let missing = ProfileId::random();
        assert!(matches!(
            book.delete_profile(missing),
            Err(ProfileServiceError::NotFound(id)) if id == missing
        ));
    }

    #[test]
    fn ledger_commands_are_noops_without_active_profile() {
        let mut book = ProfileBook::default();
        book.update_stats(Operation::Add, Difficulty::Easy, true);
        book.add_currency(100, CurrencyReason::Session);
        book.add_experience(50);
        assert_eq!(book.check_evolution(), None);
        assert!(book.check_milestones().is_empty());
        assert_eq!(book.accuracy(AccuracyFilter::Overall), 0);
    }

    #[test]
    fn ledger_updates_the_active_profile_only() {
        let mut book = book_with(&["A", "B"]);
        let other = book.profiles()[0].id();

        for i in 0..25 {
            book.update_stats(Operation::Add, Difficulty::Easy, i % 5 != 0);
        }
        book.add_experience(25);
        let evolution = book.check_evolution().unwrap();
        assert_eq!((evolution.from, evolution.to), (PetStage::Egg, PetStage::Baby));
        assert_eq!(book.check_evolution(), None);

        assert_eq!(book.check_milestones(), vec![Milestone::Problems25]);
        assert!(book.check_milestones().is_empty());
        assert_eq!(book.active().unwrap().stats().stars, 100);

        book.update_high_score(HighScoreKind::Timed, 90);
        book.update_high_score(HighScoreKind::Timed, 40);
        book.unlock_level(3);
        book.unlock_level(2);
        let stats = book.active().unwrap().stats();
        assert_eq!(stats.high_score_timed, 90);
        assert_eq!(stats.levels_unlocked, 3);
        assert_eq!(book.accuracy(AccuracyFilter::Overall), 80);
        assert_eq!(book.accuracy(AccuracyFilter::Operation(Operation::Add)), 80);
        assert_eq!(book.accuracy(AccuracyFilter::Operation(Operation::Divide)), 0);

        book.select_profile(other).unwrap();
        assert_eq!(book.active().unwrap().stats().total_problems, 0);
    }

    #[test]
    fn stale_active_id_is_dropped() {
        let book = ProfileBook::new(Vec::new(), Some(ProfileId::random()));
        assert_eq!(book.active_id(), None);
    }
}
