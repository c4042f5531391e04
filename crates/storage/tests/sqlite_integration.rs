use ezmath_core::model::{
    Difficulty, GameMode, Milestone, Operation, Preferences, Profile, ProfileId, ShopCategory,
};
use ezmath_core::time::fixed_now;
use storage::repository::{KeyValueStore, Storage, keys};
use storage::sqlite::SqliteKvStore;

#[tokio::test]
async fn sqlite_key_value_roundtrip() {
    let repo = SqliteKvStore::connect("sqlite:file:memdb_kv?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    // Migrations are idempotent.
    repo.migrate().await.expect("migrate twice");

    assert_eq!(repo.get("missing").await.unwrap(), None);
    repo.set("b", "1").await.unwrap();
    repo.set("a", "2").await.unwrap();
    repo.set("b", "3").await.unwrap();
    assert_eq!(repo.get("b").await.unwrap().as_deref(), Some("3"));
    assert_eq!(repo.keys().await.unwrap(), vec!["a".to_string(), "b".to_string()]);

    repo.remove("a").await.unwrap();
    repo.remove("a").await.unwrap();
    assert_eq!(repo.keys().await.unwrap(), vec!["b".to_string()]);
}

#[tokio::test]
async fn sqlite_storage_preserves_profiles_and_preferences() {
    let storage = Storage::sqlite("sqlite:file:memdb_storage?mode=memory&cache=shared")
        .await
        .expect("storage");

    let mut profile = Profile::new(ProfileId::random(), "  Zoe ", "🐰", fixed_now()).unwrap();
    for _ in 0..30 {
        profile.record_answer(Operation::Multiply, Difficulty::Medium, true);
    }
    profile.add_pet_xp(30);
    assert!(profile.evolve_pet().is_some());
    let reached = profile.award_milestones();
    assert_eq!(reached, vec![Milestone::Problems25, Milestone::Streak10, Milestone::Streak25]);
    profile.spend_stars(150).unwrap();
    assert!(profile.unlock_item(ShopCategory::SoundPacks, "arcade"));
    profile.equip(ShopCategory::SoundPacks, "arcade").unwrap();

    storage.save_profiles(&[profile.clone()]).await.unwrap();
    storage.save_active_profile(Some(profile.id())).await.unwrap();

    let prefs = Preferences {
        mode: Some(GameMode::TimesTable),
        difficulty: Difficulty::Medium,
        operations: vec![Operation::Add],
        time_limit_secs: 30,
    };
    storage.save_preferences(&prefs).await.unwrap();

    let loaded = storage.load_profiles().await.unwrap();
    assert_eq!(loaded, vec![profile.clone()]);
    assert_eq!(loaded[0].name(), "Zoe");
    assert_eq!(loaded[0].equipped().sound_pack, "arcade");
    assert_eq!(
        storage.load_active_profile().await.unwrap(),
        Some(profile.id())
    );
    assert_eq!(storage.load_preferences().await.unwrap(), prefs);

    let stored = storage.entries.keys().await.unwrap();
    assert!(stored.contains(&keys::PROFILES.to_string()));
    assert!(stored.contains(&keys::SELECTED_TIME.to_string()));
}
