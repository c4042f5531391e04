use async_trait::async_trait;
use ezmath_core::model::{Difficulty, GameMode, Operation, Preferences, Profile, ProfileId};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::record::{ProfileRecord, decode_profile};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("migration error: {0}")]
    Migration(String),
}

/// Storage keys. Each holds one JSON document.
pub mod keys {
    pub const PROFILES: &str = "ezmath_profiles";
    pub const ACTIVE_PROFILE: &str = "ezmath_active_profile";
    pub const SELECTED_MODE: &str = "ezmath_selected_mode";
    pub const SELECTED_DIFFICULTY: &str = "ezmath_selected_difficulty";
    pub const SELECTED_OPERATIONS: &str = "ezmath_selected_operations";
    pub const SELECTED_TIME: &str = "ezmath_selected_time";
}

/// Flat string-keyed store of JSON documents.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Insert or replace the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// All stored keys, sorted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    async fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// Simple in-memory store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryRepository {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard.remove(key);
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, StorageError> {
        let guard = self
            .entries
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.keys().cloned().collect())
    }
}

/// Typed access to the persisted game state.
#[derive(Clone)]
pub struct Storage {
    pub entries: Arc<dyn KeyValueStore>,
}

impl Storage {
    #[must_use]
    pub fn new(entries: Arc<dyn KeyValueStore>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryRepository::new()))
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.entries.get(key).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StorageError::Serialization(format!("{key}: {e}")))
    }

    async fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw =
            serde_json::to_string(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.entries.set(key, &raw).await
    }

    /// Load every profile, upgrading old records on the way.
    ///
    /// Upgraded records are written back so the migration runs once. When a
    /// record's legacy id was replaced, the active-profile key is remapped.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the key cannot be read, or if any record
    /// fails to migrate or decode.
    pub async fn load_profiles(&self) -> Result<Vec<Profile>, StorageError> {
        let Some(raw) = self.get_json::<Vec<Value>>(keys::PROFILES).await? else {
            return Ok(Vec::new());
        };

        let mut profiles = Vec::with_capacity(raw.len());
        let mut upgraded = false;
        let mut replaced = Vec::new();
        for value in raw {
            let (profile, migrated) = decode_profile(value)?;
            if migrated.changed() {
                tracing::info!(
                    profile = %profile.id(),
                    from_version = migrated.from_version,
                    "upgraded profile record"
                );
                upgraded = true;
            }
            if let Some(legacy) = migrated.replaced_id {
                replaced.push((legacy, profile.id()));
            }
            profiles.push(profile);
        }

        if upgraded {
            self.save_profiles(&profiles).await?;
        }
        if !replaced.is_empty() {
            let active = self
                .get_json::<Option<String>>(keys::ACTIVE_PROFILE)
                .await?
                .flatten();
            if let Some((_, new_id)) = replaced
                .iter()
                .find(|(legacy, _)| active.as_deref() == Some(legacy.as_str()))
            {
                self.save_active_profile(Some(*new_id)).await?;
            }
        }
        Ok(profiles)
    }

    /// Replace the stored profile list.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the records cannot be serialized or stored.
    pub async fn save_profiles(&self, profiles: &[Profile]) -> Result<(), StorageError> {
        let records: Vec<ProfileRecord> = profiles.iter().map(ProfileRecord::from_profile).collect();
        self.set_json(keys::PROFILES, &records).await
    }

    /// The stored active profile id. Unparsable ids read as `None`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the key cannot be read or is not JSON.
    pub async fn load_active_profile(&self) -> Result<Option<ProfileId>, StorageError> {
        let raw = self
            .get_json::<Option<String>>(keys::ACTIVE_PROFILE)
            .await?
            .flatten();
        Ok(raw.and_then(|id| id.parse().ok()))
    }

    /// Store the active profile id; `None` stores JSON `null`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be stored.
    pub async fn save_active_profile(&self, id: Option<ProfileId>) -> Result<(), StorageError> {
        self.set_json(keys::ACTIVE_PROFILE, &id.map(|id| id.to_string()))
            .await
    }

    /// Last menu selections. Missing keys fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if a key cannot be read or decoded.
    pub async fn load_preferences(&self) -> Result<Preferences, StorageError> {
        let defaults = Preferences::default();
        let mode = self
            .get_json::<Option<GameMode>>(keys::SELECTED_MODE)
            .await?
            .flatten();
        let difficulty: Difficulty = self
            .get_json(keys::SELECTED_DIFFICULTY)
            .await?
            .unwrap_or(defaults.difficulty);
        let operations: Vec<Operation> = self
            .get_json(keys::SELECTED_OPERATIONS)
            .await?
            .unwrap_or(defaults.operations);
        let time_limit_secs: u32 = self
            .get_json(keys::SELECTED_TIME)
            .await?
            .unwrap_or(defaults.time_limit_secs);
        Ok(Preferences {
            mode,
            difficulty,
            operations,
            time_limit_secs,
        })
    }

    /// Store each preference under its own key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if a value cannot be stored.
    pub async fn save_preferences(&self, preferences: &Preferences) -> Result<(), StorageError> {
        self.set_json(keys::SELECTED_MODE, &preferences.mode).await?;
        self.set_json(keys::SELECTED_DIFFICULTY, &preferences.difficulty)
            .await?;
        self.set_json(keys::SELECTED_OPERATIONS, &preferences.operations)
            .await?;
        self.set_json(keys::SELECTED_TIME, &preferences.time_limit_secs)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ezmath_core::model::ShopCategory;
    use ezmath_core::time::fixed_now;
    use serde_json::json;

    fn build_profile(name: &str) -> Profile {
        Profile::new(ProfileId::random(), name, "🦊", fixed_now()).unwrap()
    }

    #[tokio::test]
    async fn round_trips_profiles_and_active_id() {
        let storage = Storage::in_memory();
        assert!(storage.load_profiles().await.unwrap().is_empty());
        assert_eq!(storage.load_active_profile().await.unwrap(), None);

        let mut first = build_profile("Ana");
        first.add_stars(200);
        first.unlock_item(ShopCategory::Themes, "ocean");
        first.equip(ShopCategory::Themes, "ocean").unwrap();
        let second = build_profile("Ben");
        storage
            .save_profiles(&[first.clone(), second.clone()])
            .await
            .unwrap();
        storage.save_active_profile(Some(second.id())).await.unwrap();

        let loaded = storage.load_profiles().await.unwrap();
        assert_eq!(loaded, vec![first, second.clone()]);
        assert_eq!(
            storage.load_active_profile().await.unwrap(),
            Some(second.id())
        );

        storage.save_active_profile(None).await.unwrap();
        assert_eq!(storage.load_active_profile().await.unwrap(), None);
    }

    #[tokio::test]
    async fn preferences_default_then_persist_per_key() {
        let storage = Storage::in_memory();
        assert_eq!(
            storage.load_preferences().await.unwrap(),
            Preferences::default()
        );

        let prefs = Preferences {
            mode: Some(GameMode::Timed),
            difficulty: Difficulty::Hard,
            operations: vec![Operation::Multiply, Operation::Divide],
            time_limit_secs: 120,
        };
        storage.save_preferences(&prefs).await.unwrap();
        assert_eq!(storage.load_preferences().await.unwrap(), prefs);

        let raw = storage.entries.get(keys::SELECTED_OPERATIONS).await.unwrap();
        assert_eq!(raw.as_deref(), Some(r#"["multiply","divide"]"#));
        let raw = storage.entries.get(keys::SELECTED_MODE).await.unwrap();
        assert_eq!(raw.as_deref(), Some(r#""timed""#));
    }

    #[tokio::test]
    async fn migrates_legacy_records_once_and_remaps_active() {
        let storage = Storage::in_memory();
        let legacy = json!([{
            "id": "lq2k3j9x0abc",
            "name": "Kai",
            "avatar": "🐶",
            "createdAt": 1_700_000_000_000_i64,
            "stats": {
                "totalProblems": 0,
                "correctAnswers": 0,
                "byOperation": {
                    "add": { "attempted": 0, "correct": 0 },
                    "subtract": { "attempted": 0, "correct": 0 },
                    "multiply": { "attempted": 0, "correct": 0 },
                    "divide": { "attempted": 0, "correct": 0 }
                },
                "byDifficulty": {
                    "easy": { "attempted": 0, "correct": 0 },
                    "medium": { "attempted": 0, "correct": 0 },
                    "hard": { "attempted": 0, "correct": 0 }
                },
                "highScores": { "timed": 0, "level": 0 },
                "currentStreak": 0,
                "bestStreak": 0,
                "levelsUnlocked": 1
            }
        }]);
        storage
            .entries
            .set(keys::PROFILES, &legacy.to_string())
            .await
            .unwrap();
        storage
            .entries
            .set(keys::ACTIVE_PROFILE, r#""lq2k3j9x0abc""#)
            .await
            .unwrap();

        let loaded = storage.load_profiles().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].avatar(), "🐶");
        assert_eq!(
            storage.load_active_profile().await.unwrap(),
            Some(loaded[0].id())
        );

        let raw = storage.entries.get(keys::PROFILES).await.unwrap().unwrap();
        let stored: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored[0]["schemaVersion"], json!(2));

        let reloaded = storage.load_profiles().await.unwrap();
        assert_eq!(reloaded, loaded);
    }

    #[tokio::test]
    async fn corrupt_json_is_a_serialization_error() {
        let storage = Storage::in_memory();
        storage.entries.set(keys::PROFILES, "{not json").await.unwrap();
        let err = storage.load_profiles().await.unwrap_err();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}
