//! Persisted JSON shapes and their schema migrations.
//!
//! Profiles are stored as a JSON array under a single key. Every record
//! carries `schemaVersion`; records written before the field existed are
//! version 1 and are upgraded before they are decoded into domain types.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use ezmath_core::model::{
    Equipped, Milestone, PetStage, PetState, Profile, ProfileId, ProfileStats, ShopCategory, Tally,
    TallyByDifficulty, TallyByOperation, Unlocks,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::repository::StorageError;

/// Schema version written by this build.
pub const PROFILE_SCHEMA_VERSION: u64 = 2;

//
// ─── RECORDS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TallyRecord {
    pub attempted: u32,
    pub correct: u32,
}

impl From<Tally> for TallyRecord {
    fn from(tally: Tally) -> Self {
        Self {
            attempted: tally.attempted,
            correct: tally.correct,
        }
    }
}

impl From<TallyRecord> for Tally {
    fn from(record: TallyRecord) -> Self {
        Self {
            attempted: record.attempted,
            correct: record.correct,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByOperationRecord {
    pub add: TallyRecord,
    pub subtract: TallyRecord,
    pub multiply: TallyRecord,
    pub divide: TallyRecord,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByDifficultyRecord {
    pub easy: TallyRecord,
    pub medium: TallyRecord,
    pub hard: TallyRecord,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoresRecord {
    pub timed: u32,
    pub level: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsRecord {
    pub total_problems: u32,
    pub correct_answers: u32,
    pub by_operation: ByOperationRecord,
    pub by_difficulty: ByDifficultyRecord,
    pub high_scores: HighScoresRecord,
    pub current_streak: u32,
    pub best_streak: u32,
    pub levels_unlocked: u32,
    pub stars: u32,
}

impl StatsRecord {
    #[must_use]
    pub fn from_stats(stats: &ProfileStats) -> Self {
        let ops = &stats.by_operation;
        let diffs = &stats.by_difficulty;
        Self {
            total_problems: stats.total_problems,
            correct_answers: stats.correct_answers,
            by_operation: ByOperationRecord {
                add: ops.add.into(),
                subtract: ops.subtract.into(),
                multiply: ops.multiply.into(),
                divide: ops.divide.into(),
            },
            by_difficulty: ByDifficultyRecord {
                easy: diffs.easy.into(),
                medium: diffs.medium.into(),
                hard: diffs.hard.into(),
            },
            high_scores: HighScoresRecord {
                timed: stats.high_score_timed,
                level: stats.high_score_level,
            },
            current_streak: stats.current_streak,
            best_streak: stats.best_streak,
            levels_unlocked: stats.levels_unlocked,
            stars: stats.stars,
        }
    }

    #[must_use]
    pub fn into_stats(self) -> ProfileStats {
        let ops = self.by_operation;
        let diffs = self.by_difficulty;
        ProfileStats {
            total_problems: self.total_problems,
            correct_answers: self.correct_answers,
            by_operation: TallyByOperation {
                add: ops.add.into(),
                subtract: ops.subtract.into(),
                multiply: ops.multiply.into(),
                divide: ops.divide.into(),
            },
            by_difficulty: TallyByDifficulty {
                easy: diffs.easy.into(),
                medium: diffs.medium.into(),
                hard: diffs.hard.into(),
            },
            high_score_timed: self.high_scores.timed,
            high_score_level: self.high_scores.level,
            current_streak: self.current_streak,
            best_streak: self.best_streak,
            levels_unlocked: self.levels_unlocked.max(1),
            stars: self.stars,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetRecord {
    pub xp: u32,
    /// Stage index, 0 (egg) through 4 (adult).
    pub stage: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockedItemsRecord {
    pub avatars: Vec<String>,
    pub themes: Vec<String>,
    pub sound_packs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquippedItemsRecord {
    pub avatar: String,
    pub theme: String,
    pub sound_pack: String,
}

/// Persisted shape of a profile at the current schema version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub schema_version: u64,
    pub id: ProfileId,
    pub name: String,
    /// Mirror of the equipped avatar, kept for readers of the old layout.
    pub avatar: String,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
    pub stats: StatsRecord,
    pub pet: PetRecord,
    pub milestones: BTreeMap<String, bool>,
    pub unlocked_items: UnlockedItemsRecord,
    pub equipped_items: EquippedItemsRecord,
}

impl ProfileRecord {
    #[must_use]
    pub fn from_profile(profile: &Profile) -> Self {
        let owned = |category: ShopCategory| {
            profile
                .unlocks()
                .iter(category)
                .map(str::to_owned)
                .collect::<Vec<_>>()
        };
        let equipped = profile.equipped();
        Self {
            schema_version: PROFILE_SCHEMA_VERSION,
            id: profile.id(),
            name: profile.name().to_owned(),
            avatar: equipped.avatar.clone(),
            created_at: profile.created_at().timestamp_millis(),
            stats: StatsRecord::from_stats(profile.stats()),
            pet: PetRecord {
                xp: profile.pet().xp,
                stage: profile.pet().stage.index(),
            },
            milestones: profile
                .milestones()
                .iter()
                .map(|m| (m.id().to_owned(), true))
                .collect(),
            unlocked_items: UnlockedItemsRecord {
                avatars: owned(ShopCategory::Avatars),
                themes: owned(ShopCategory::Themes),
                sound_packs: owned(ShopCategory::SoundPacks),
            },
            equipped_items: EquippedItemsRecord {
                avatar: equipped.avatar.clone(),
                theme: equipped.theme.clone(),
                sound_pack: equipped.sound_pack.clone(),
            },
        }
    }

    /// Convert the record back into a domain `Profile`.
    ///
    /// Unknown milestone keys are dropped.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Serialization` for an out-of-range timestamp or
    /// pet stage, or when the profile fails domain validation.
    pub fn into_profile(self) -> Result<Profile, StorageError> {
        let created_at = DateTime::<Utc>::from_timestamp_millis(self.created_at).ok_or_else(|| {
            StorageError::Serialization(format!("invalid createdAt: {}", self.created_at))
        })?;
        let stage = PetStage::from_index(self.pet.stage).ok_or_else(|| {
            StorageError::Serialization(format!("invalid pet stage: {}", self.pet.stage))
        })?;
        let pet = PetState {
            xp: self.pet.xp,
            stage,
        };

        let milestones: BTreeSet<Milestone> = self
            .milestones
            .iter()
            .filter(|(_, reached)| **reached)
            .filter_map(|(id, _)| Milestone::from_id(id))
            .collect();

        let mut unlocks = Unlocks::default();
        let owned = [
            (ShopCategory::Avatars, self.unlocked_items.avatars),
            (ShopCategory::Themes, self.unlocked_items.themes),
            (ShopCategory::SoundPacks, self.unlocked_items.sound_packs),
        ];
        for (category, ids) in owned {
            for id in ids {
                unlocks.insert(category, id);
            }
        }

        let equipped = Equipped {
            avatar: self.equipped_items.avatar,
            theme: self.equipped_items.theme,
            sound_pack: self.equipped_items.sound_pack,
        };

        Profile::from_persisted(
            self.id,
            &self.name,
            created_at,
            self.stats.into_stats(),
            pet,
            milestones,
            unlocks,
            equipped,
        )
        .map_err(|err| StorageError::Serialization(err.to_string()))
    }
}

//
// ─── MIGRATION ─────────────────────────────────────────────────────────────────
//

/// Result of upgrading one raw record.
#[derive(Debug, Clone, PartialEq)]
pub struct MigratedRecord {
    pub value: Value,
    /// Version the record was stored at.
    pub from_version: u64,
    /// Original id when it had to be replaced.
    pub replaced_id: Option<String>,
}

impl MigratedRecord {
    #[must_use]
    pub fn changed(&self) -> bool {
        self.from_version != PROFILE_SCHEMA_VERSION || self.replaced_id.is_some()
    }
}

/// Upgrade a raw profile record to the current schema version.
///
/// # Errors
///
/// Returns `StorageError::Migration` when the value is not an object, when
/// it was written by a newer schema, or when required v1 fields are missing.
pub fn migrate_profile(value: Value) -> Result<MigratedRecord, StorageError> {
    let Value::Object(mut obj) = value else {
        return Err(StorageError::Migration(
            "profile record is not an object".into(),
        ));
    };

    let from_version = match obj.get("schemaVersion") {
        None | Some(Value::Null) => 1,
        Some(raw) => raw.as_u64().ok_or_else(|| {
            StorageError::Migration(format!("invalid schemaVersion: {raw}"))
        })?,
    };
    if from_version > PROFILE_SCHEMA_VERSION {
        return Err(StorageError::Migration(format!(
            "profile schema version {from_version} is newer than supported {PROFILE_SCHEMA_VERSION}"
        )));
    }

    let replaced_id = replace_legacy_id(&mut obj)?;
    if from_version < 2 {
        migrate_v1_to_v2(&mut obj)?;
    }
    obj.insert("schemaVersion".into(), json!(PROFILE_SCHEMA_VERSION));

    Ok(MigratedRecord {
        value: Value::Object(obj),
        from_version,
        replaced_id,
    })
}

/// Older builds used free-form ids; anything that is not a UUID gets a new one.
fn replace_legacy_id(obj: &mut Map<String, Value>) -> Result<Option<String>, StorageError> {
    let raw = match obj.get("id") {
        Some(Value::String(raw)) => raw.clone(),
        Some(other) => other.to_string(),
        None => return Err(StorageError::Migration("profile record has no id".into())),
    };
    if raw.parse::<ProfileId>().is_ok() {
        return Ok(None);
    }
    obj.insert("id".into(), json!(ProfileId::random().to_string()));
    Ok(Some(raw))
}

// v2 added the star balance, the pet, milestones and shop items.
fn migrate_v1_to_v2(obj: &mut Map<String, Value>) -> Result<(), StorageError> {
    let avatar = obj
        .get("avatar")
        .and_then(Value::as_str)
        .unwrap_or(ShopCategory::Avatars.default_item())
        .to_owned();
    let default_avatar = ShopCategory::Avatars.default_item();
    let default_theme = ShopCategory::Themes.default_item();
    let default_sound = ShopCategory::SoundPacks.default_item();

    let stats = obj
        .get_mut("stats")
        .and_then(Value::as_object_mut)
        .ok_or_else(|| StorageError::Migration("profile record has no stats".into()))?;
    stats.entry("stars").or_insert(json!(0));
    stats.entry("levelsUnlocked").or_insert(json!(1));

    obj.entry("pet").or_insert(json!({ "xp": 0, "stage": 0 }));
    obj.entry("milestones").or_insert(json!({}));
    obj.entry("unlockedItems").or_insert(json!({
        "avatars": [avatar.clone(), default_avatar],
        "themes": [default_theme],
        "soundPacks": [default_sound],
    }));
    obj.entry("equippedItems").or_insert(json!({
        "avatar": avatar.clone(),
        "theme": default_theme,
        "soundPack": default_sound,
    }));
    obj.entry("avatar").or_insert(json!(avatar));
    Ok(())
}

/// Migrate and decode one raw record.
///
/// # Errors
///
/// Propagates migration failures and returns `StorageError::Serialization`
/// when the upgraded record does not match the current shape.
pub fn decode_profile(value: Value) -> Result<(Profile, MigratedRecord), StorageError> {
    let migrated = migrate_profile(value)?;
    let record: ProfileRecord = serde_json::from_value(migrated.value.clone())
        .map_err(|err| StorageError::Serialization(err.to_string()))?;
    let profile = record.into_profile()?;
    Ok((profile, migrated))
}
