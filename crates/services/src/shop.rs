use ezmath_core::model::{Profile, ShopCategory, ShopItem};

use crate::error::ShopError;
use crate::profile_book::ProfileBook;

/// Purchases and cosmetics for the active profile.
///
/// Read-only queries answer `false` when no profile is active.
pub struct Shop<'a> {
    book: &'a mut ProfileBook,
}

impl<'a> Shop<'a> {
    pub(crate) fn new(book: &'a mut ProfileBook) -> Self {
        Self { book }
    }

    fn active(&self) -> Option<&Profile> {
        self.book.active()
    }

    #[must_use]
    pub fn balance(&self) -> u32 {
        self.active().map_or(0, |p| p.stats().stars)
    }

    #[must_use]
    pub fn is_unlocked(&self, category: ShopCategory, id: &str) -> bool {
        self.active()
            .is_some_and(|p| p.unlocks().contains(category, id))
    }

    #[must_use]
    pub fn is_equipped(&self, category: ShopCategory, id: &str) -> bool {
        self.active()
            .is_some_and(|p| p.equipped().get(category) == id)
    }

    #[must_use]
    pub fn can_afford(&self, cost: u32) -> bool {
        self.active().is_some_and(|p| p.stats().stars >= cost)
    }

    /// Buy an item at its catalog price.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::NoActiveProfile`, `ShopError::UnknownItem`,
    /// `ShopError::AlreadyUnlocked`, or `ShopError::Profile` wrapping
    /// `InsufficientStars` when the balance is too low.
    pub fn purchase(&mut self, category: ShopCategory, id: &str) -> Result<ShopItem, ShopError> {
        let item = category.find(id).ok_or_else(|| ShopError::UnknownItem {
            category,
            id: id.to_owned(),
        })?;
        let profile = self.book.active_mut().ok_or(ShopError::NoActiveProfile)?;
        if profile.unlocks().contains(category, id) {
            return Err(ShopError::AlreadyUnlocked {
                category,
                id: id.to_owned(),
            });
        }

        profile.spend_stars(item.price)?;
        profile.unlock_item(category, item.id);
        tracing::info!(
            profile = %profile.id(),
            %category,
            item = item.id,
            price = item.price,
            balance = profile.stats().stars,
            "purchased item"
        );
        Ok(item)
    }

    /// Select an owned item.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::NoActiveProfile`, or `ShopError::Profile` wrapping
    /// `NotUnlocked` when the item is not owned.
    pub fn equip(&mut self, category: ShopCategory, id: &str) -> Result<(), ShopError> {
        let profile = self.book.active_mut().ok_or(ShopError::NoActiveProfile)?;
        profile.equip(category, id)?;
        Ok(())
    }
}
