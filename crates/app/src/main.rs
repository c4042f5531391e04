mod args;
mod play;

use ezmath_core::model::{
    AccuracyFilter, GameMode, ShopCategory, ShopItem, shop::sound_pack, shop::theme,
};
use services::{AppServices, Clock, ProfileBook, ProfileService, SessionEngine};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::args::{Args, Command, GameArgs, ShopArgs, prepare_sqlite_file, print_usage};

const DEFAULT_PLAYER: &str = "Player";

/// Logs go to stderr so they never interleave with the game on stdout.
fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    if matches!(argv.first().map(String::as_str), Some("--help" | "-h")) {
        print_usage();
        return Ok(());
    }

    let parsed = Args::parse(argv).map_err(|e| {
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup.
    prepare_sqlite_file(&parsed.db_url)?;
    let services = AppServices::new_sqlite(&parsed.db_url, Clock::default_clock()).await?;
    tracing::debug!(db = %parsed.db_url, command = ?parsed.command, "storage ready");

    let profiles = services.profiles();
    let mut book = profiles.load_book().await?;

    match parsed.command {
        Command::Play => {
            activate_profile(&profiles, &mut book, parsed.profile.as_deref()).await?;
            play_game(&services, &mut book, &parsed.game).await?;
            profiles.save_book(&book).await?;
        }
        Command::Profiles => list_profiles(&book),
        Command::Shop => {
            activate_profile(&profiles, &mut book, parsed.profile.as_deref()).await?;
            shop(&mut book, &parsed.shop)?;
            profiles.save_book(&book).await?;
        }
    }
    Ok(())
}

/// Select the named profile, or keep the active one, or create a default.
async fn activate_profile(
    profiles: &ProfileService,
    book: &mut ProfileBook,
    name: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    match name {
        Some(name) => {
            profiles.select_or_create(book, name).await?;
        }
        None if book.active().is_some() => {}
        None => {
            profiles.select_or_create(book, DEFAULT_PLAYER).await?;
        }
    }
    Ok(())
}

async fn play_game(
    services: &AppServices,
    book: &mut ProfileBook,
    game: &GameArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let preferences_service = services.preferences();
    let mut preferences = preferences_service.load().await?;
    game.apply(&mut preferences);
    preferences_service.save(&preferences).await?;

    let mode = preferences.mode.unwrap_or(GameMode::Practice);
    let mut settings = preferences.to_settings();
    if let Some(level) = game.level {
        settings = settings.with_start_level(level);
    } else if mode == GameMode::Level {
        if let Some(profile) = book.active() {
            settings = settings.with_start_level(profile.stats().levels_unlocked);
        }
    }
    if let Some(table) = game.table {
        settings = settings.with_start_table(table);
    }

    if let Some(profile) = book.active() {
        println!(
            "{} {} · ⭐ {} · theme {}",
            profile.avatar(),
            profile.name(),
            profile.stats().stars,
            theme(&profile.equipped().theme).name
        );
    }

    let mut engine = SessionEngine::new(&mut *book);
    play::run_session(&mut engine, mode, settings).await?;
    drop(engine);

    if let Some(profile) = book.active() {
        println!("⭐ Balance: {}", profile.stats().stars);
    }
    Ok(())
}

fn list_profiles(book: &ProfileBook) {
    if !book.has_profiles() {
        println!("No profiles yet. Run `ezmath play --profile <name>` to create one.");
        return;
    }
    for profile in book.profiles() {
        let marker = if book.active_id() == Some(profile.id()) {
            "*"
        } else {
            " "
        };
        let stats = profile.stats();
        println!(
            "{marker} {} {:<16} ⭐ {:>5}  {:>3}% of {:>4}  level {:<3} {}",
            profile.avatar(),
            profile.name(),
            stats.stars,
            profile.accuracy(AccuracyFilter::Overall),
            stats.total_problems,
            stats.levels_unlocked,
            play::pet_line(profile.pet().stage, profile.pet().xp),
        );
    }
}

fn shop(book: &mut ProfileBook, args: &ShopArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = book.shop();
    if let Some(item) = &args.buy {
        let bought = store.purchase(item.category, &item.id)?;
        println!("Bought {} for {} ⭐", bought.name, bought.price);
    }
    if let Some(item) = &args.equip {
        store.equip(item.category, &item.id)?;
        println!("Equipped {}", item.id);
    }

    println!("⭐ Balance: {}", store.balance());
    for category in ShopCategory::ALL {
        println!();
        println!("── {category} ──");
        for item in category.items() {
            let status = if store.is_equipped(category, item.id) {
                "equipped".to_owned()
            } else if store.is_unlocked(category, item.id) {
                "owned".to_owned()
            } else if store.can_afford(item.price) {
                format!("{} ⭐", item.price)
            } else {
                format!("{} ⭐ (locked)", item.price)
            };
            println!("  {:<14} {:<20} {status}", item.id, describe(category, &item));
        }
    }
    Ok(())
}

fn describe(category: ShopCategory, item: &ShopItem) -> String {
    match category {
        ShopCategory::SoundPacks => {
            format!("{}: {}", item.name, sound_pack(item.id).description)
        }
        ShopCategory::Avatars | ShopCategory::Themes => item.name.to_owned(),
    }
}

#[tokio::main]
async fn main() {
    init_logging();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ezmath_core::model::PetStage;
    use ezmath_core::time::fixed_now;

    #[tokio::test]
    async fn activate_profile_prefers_name_then_active_then_default() {
        let services = AppServices::in_memory(Clock::fixed(fixed_now()));
        let profiles = services.profiles();
        let mut book = ProfileBook::default();

        activate_profile(&profiles, &mut book, None).await.unwrap();
        assert_eq!(book.active().unwrap().name(), DEFAULT_PLAYER);

        activate_profile(&profiles, &mut book, Some("Zoe")).await.unwrap();
        activate_profile(&profiles, &mut book, None).await.unwrap();
        assert_eq!(book.active().unwrap().name(), "Zoe");
        assert_eq!(book.profiles().len(), 2);
        assert_eq!(book.active().unwrap().pet().stage, PetStage::Egg);
    }
}
