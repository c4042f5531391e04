use ezmath_core::model::{ProfileId, ShopCategory};
use storage::repository::Storage;

use crate::Clock;
use crate::error::ProfileServiceError;
use crate::profile_book::ProfileBook;

/// Loads and persists the profile book.
#[derive(Clone)]
pub struct ProfileService {
    clock: Clock,
    storage: Storage,
}

impl ProfileService {
    #[must_use]
    pub fn new(clock: Clock, storage: Storage) -> Self {
        Self { clock, storage }
    }

    /// Load all profiles and the active selection.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::Storage` if records cannot be read or
    /// migrated.
    pub async fn load_book(&self) -> Result<ProfileBook, ProfileServiceError> {
        let profiles = self.storage.load_profiles().await?;
        let active = self.storage.load_active_profile().await?;
        Ok(ProfileBook::new(profiles, active))
    }

    /// Persist all profiles and the active selection.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::Storage` if persistence fails.
    pub async fn save_book(&self, book: &ProfileBook) -> Result<(), ProfileServiceError> {
        self.storage.save_profiles(book.profiles()).await?;
        self.storage.save_active_profile(book.active_id()).await?;
        Ok(())
    }

    /// Create a profile stamped with the service clock and persist the book.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError::Profile` for validation failures and
    /// `ProfileServiceError::Storage` if persistence fails.
    pub async fn create_profile(
        &self,
        book: &mut ProfileBook,
        name: &str,
        avatar: &str,
    ) -> Result<ProfileId, ProfileServiceError> {
        let id = book.create_profile(name, avatar, self.clock.now())?;
        self.save_book(book).await?;
        Ok(id)
    }

    /// Activate the named profile, creating it with the default avatar when
    /// no profile has that name.
    ///
    /// # Errors
    ///
    /// Returns `ProfileServiceError` for validation or persistence failures.
    pub async fn select_or_create(
        &self,
        book: &mut ProfileBook,
        name: &str,
    ) -> Result<ProfileId, ProfileServiceError> {
        if let Some(id) = book.find_by_name(name).map(|p| p.id()) {
            book.select_profile(id)?;
            self.save_book(book).await?;
            return Ok(id);
        }
        self.create_profile(book, name, ShopCategory::Avatars.default_item())
            .await
    }
}
