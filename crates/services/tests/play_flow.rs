use ezmath_core::model::{
    Difficulty, GameMode, GameSettings, Milestone, Operation, Preferences, ShopCategory,
};
use ezmath_core::time::fixed_now;
use services::{AppServices, Clock, SessionEngine};
use storage::repository::Storage;

#[tokio::test]
async fn practice_session_credits_the_active_profile() {
    let storage = Storage::sqlite("sqlite:file:memdb_play_flow?mode=memory&cache=shared")
        .await
        .expect("connect sqlite");
    let services = AppServices::from_storage(storage, Clock::fixed(fixed_now()));
    let profiles = services.profiles();

    let mut book = profiles.load_book().await.expect("load book");
    let id = profiles
        .select_or_create(&mut book, "Mia")
        .await
        .expect("create profile");

    let mut engine = SessionEngine::seeded(&mut book, 17);
    engine.start_game(
        GameMode::Practice,
        GameSettings::new(Difficulty::Easy, vec![Operation::Add]),
    );
    for _ in 0..10 {
        let raw = engine.current_problem().unwrap().answer().to_string();
        let outcome = engine.submit_answer(&raw).unwrap();
        assert!(engine.continue_after_feedback(outcome.ticket.unwrap()));
    }
    let report = engine.end_game().expect("session was live");
    drop(engine);

    // 10 × 5 base, 50 accuracy, 30 completion, then the streak milestone.
    assert_eq!(report.stars_earned, 130);
    assert_eq!(report.milestones, vec![Milestone::Streak10]);

    profiles.save_book(&book).await.expect("save book");
    let mut reloaded = profiles.load_book().await.expect("reload book");
    assert_eq!(reloaded.active_id(), Some(id));

    let profile = reloaded.active().unwrap();
    assert_eq!(profile.stats().total_problems, 10);
    assert_eq!(profile.stats().correct_answers, 10);
    assert_eq!(profile.stats().best_streak, 10);
    assert_eq!(profile.stats().stars, 180);
    assert_eq!(profile.pet().xp, 10);
    assert!(profile.milestones().contains(&Milestone::Streak10));

    let mut shop = reloaded.shop();
    shop.purchase(ShopCategory::Themes, "ocean").expect("affordable");
    shop.equip(ShopCategory::Themes, "ocean").expect("owned");
    assert_eq!(shop.balance(), 30);
    profiles.save_book(&reloaded).await.expect("save purchase");

    let again = profiles.load_book().await.expect("reload purchase");
    assert_eq!(again.active().unwrap().equipped().theme, "ocean");
}

#[tokio::test]
async fn preferences_persist_between_runs() {
    let services = AppServices::in_memory(Clock::fixed(fixed_now()));
    let preferences = services.preferences();
    assert_eq!(preferences.load().await.unwrap(), Preferences::default());

    let mut chosen = Preferences {
        mode: Some(GameMode::DivisionTable),
        difficulty: Difficulty::Hard,
        ..Preferences::default()
    };
    chosen.toggle_operation(Operation::Multiply);
    preferences.save(&chosen).await.unwrap();

    assert_eq!(preferences.load().await.unwrap(), chosen);
}
