use ezmath_core::model::Preferences;
use storage::repository::Storage;

use crate::error::PreferencesError;

/// Remembers the last menu selections between launches.
#[derive(Clone)]
pub struct PreferencesService {
    storage: Storage,
}

impl PreferencesService {
    #[must_use]
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// # Errors
    ///
    /// Returns `PreferencesError::Storage` if a stored value cannot be read.
    pub async fn load(&self) -> Result<Preferences, PreferencesError> {
        Ok(self.storage.load_preferences().await?)
    }

    /// # Errors
    ///
    /// Returns `PreferencesError::Storage` if persistence fails.
    pub async fn save(&self, preferences: &Preferences) -> Result<(), PreferencesError> {
        self.storage.save_preferences(preferences).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ezmath_core::model::{GameMode, Operation};

    #[tokio::test]
    async fn toggled_operations_persist() {
        let service = PreferencesService::new(Storage::in_memory());
        let mut prefs = service.load().await.unwrap();
        prefs.mode = Some(GameMode::Level);
        prefs.toggle_operation(Operation::Multiply);
        service.save(&prefs).await.unwrap();

        let loaded = service.load().await.unwrap();
        assert_eq!(loaded.mode, Some(GameMode::Level));
        assert_eq!(
            loaded.operations,
            vec![Operation::Add, Operation::Subtract, Operation::Multiply]
        );
    }
}
