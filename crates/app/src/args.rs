use std::fmt;
use std::path::{Path, PathBuf};

use ezmath_core::model::{Difficulty, GameMode, Operation, Preferences, ShopCategory};

const DEFAULT_DB_URL: &str = "sqlite://ezmath.sqlite3";

#[derive(Debug)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidValue { flag: &'static str, raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidValue { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Play,
    Profiles,
    Shop,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "profiles" => Some(Self::Profiles),
            "shop" => Some(Self::Shop),
            _ => None,
        }
    }
}

/// Game choices given on the command line. Unset fields fall back to the
/// stored preferences.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct GameArgs {
    pub mode: Option<GameMode>,
    pub difficulty: Option<Difficulty>,
    pub operations: Option<Vec<Operation>>,
    pub time_limit_secs: Option<u32>,
    pub level: Option<u32>,
    pub table: Option<u32>,
}

impl GameArgs {
    /// Overlay the flags onto stored preferences.
    pub fn apply(&self, preferences: &mut Preferences) {
        if let Some(mode) = self.mode {
            preferences.mode = Some(mode);
        }
        if let Some(difficulty) = self.difficulty {
            preferences.difficulty = difficulty;
        }
        if let Some(operations) = &self.operations {
            preferences.operations.clone_from(operations);
        }
        if let Some(secs) = self.time_limit_secs {
            preferences.time_limit_secs = secs;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRef {
    pub category: ShopCategory,
    pub id: String,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct ShopArgs {
    pub buy: Option<ItemRef>,
    pub equip: Option<ItemRef>,
}

#[derive(Debug)]
pub struct Args {
    pub command: Command,
    pub db_url: String,
    pub profile: Option<String>,
    pub game: GameArgs,
    pub shop: ShopArgs,
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  ezmath [play] [--db <sqlite_url>] [--profile <name>] [--mode <mode>]");
    eprintln!("               [--difficulty <easy|medium|hard>] [--ops <add,subtract,...>]");
    eprintln!("               [--time <secs>] [--level <n>] [--table <n>]");
    eprintln!("  ezmath profiles [--db <sqlite_url>]");
    eprintln!("  ezmath shop     [--db <sqlite_url>] [--profile <name>]");
    eprintln!("                  [--buy <category>/<id>] [--equip <category>/<id>]");
    eprintln!();
    eprintln!("Modes: practice, timed, level, times, division");
    eprintln!("Shop categories: avatars, themes, sounds");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!("  game settings come from the last session");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  EZMATH_DB_URL, EZMATH_PROFILE, RUST_LOG");
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_value<T: std::str::FromStr>(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<T, ArgsError> {
    let raw = require_value(args, flag)?;
    raw.parse().map_err(|_| ArgsError::InvalidValue { flag, raw })
}

fn parse_operations(raw: &str) -> Result<Vec<Operation>, ArgsError> {
    let invalid = || ArgsError::InvalidValue {
        flag: "--ops",
        raw: raw.to_owned(),
    };
    let operations = raw
        .split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| part.parse::<Operation>().map_err(|_| invalid()))
        .collect::<Result<Vec<_>, _>>()?;
    if operations.is_empty() {
        return Err(invalid());
    }
    Ok(operations)
}

fn parse_item(raw: String, flag: &'static str) -> Result<ItemRef, ArgsError> {
    let parsed = raw.split_once('/').and_then(|(category, id)| {
        let category = category.parse::<ShopCategory>().ok()?;
        let id = id.trim();
        (!id.is_empty()).then(|| ItemRef {
            category,
            id: id.to_owned(),
        })
    });
    parsed.ok_or(ArgsError::InvalidValue { flag, raw })
}

impl Args {
    /// Parse everything after the program name.
    pub fn parse(argv: Vec<String>) -> Result<Self, ArgsError> {
        Self::parse_with_env(argv, |key| std::env::var(key).ok())
    }

    fn parse_with_env(
        argv: Vec<String>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut args = argv.into_iter().peekable();
        let command = match args.peek().map(String::as_str) {
            None => Command::Play,
            Some(first) if first.starts_with('-') => Command::Play,
            Some(first) => {
                let command = Command::from_arg(first)
                    .ok_or_else(|| ArgsError::UnknownCommand(first.to_owned()))?;
                args.next();
                command
            }
        };

        let mut parsed = Self {
            command,
            db_url: env("EZMATH_DB_URL")
                .filter(|value| !value.trim().is_empty())
                .map_or_else(|| DEFAULT_DB_URL.into(), normalize_sqlite_url),
            profile: env("EZMATH_PROFILE").filter(|value| !value.trim().is_empty()),
            game: GameArgs::default(),
            shop: ShopArgs::default(),
        };

        while let Some(arg) = args.next() {
            let game_flag = command == Command::Play;
            let shop_flag = command == Command::Shop;
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    parsed.db_url = normalize_sqlite_url(value);
                }
                "--profile" if command != Command::Profiles => {
                    let value = require_value(&mut args, "--profile")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidValue {
                            flag: "--profile",
                            raw: value,
                        });
                    }
                    parsed.profile = Some(value);
                }
                "--mode" if game_flag => {
                    parsed.game.mode = Some(parse_value(&mut args, "--mode")?);
                }
                "--difficulty" if game_flag => {
                    parsed.game.difficulty = Some(parse_value(&mut args, "--difficulty")?);
                }
                "--ops" if game_flag => {
                    let value = require_value(&mut args, "--ops")?;
                    parsed.game.operations = Some(parse_operations(&value)?);
                }
                "--time" if game_flag => {
                    parsed.game.time_limit_secs = Some(parse_value(&mut args, "--time")?);
                }
                "--level" if game_flag => {
                    parsed.game.level = Some(parse_value(&mut args, "--level")?);
                }
                "--table" if game_flag => {
                    parsed.game.table = Some(parse_value(&mut args, "--table")?);
                }
                "--buy" if shop_flag => {
                    let value = require_value(&mut args, "--buy")?;
                    parsed.shop.buy = Some(parse_item(value, "--buy")?);
                }
                "--equip" if shop_flag => {
                    let value = require_value(&mut args, "--equip")?;
                    parsed.shop.equip = Some(parse_item(value, "--equip")?);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }
}

pub fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim();
    let path_str = trimmed.strip_prefix("sqlite:").unwrap_or(trimmed);
    let path = Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

/// Create the database file and its directory so the pool can open it.
pub fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    fn parse(items: &[&str]) -> Result<Args, ArgsError> {
        Args::parse_with_env(argv(items), |_| None)
    }

    #[test]
    fn play_is_the_default_command() {
        let args = parse(&[]).unwrap();
        assert_eq!(args.command, Command::Play);
        assert_eq!(args.db_url, DEFAULT_DB_URL);
        assert!(args.profile.is_none());

        let args = parse(&["--mode", "timed", "--time", "90"]).unwrap();
        assert_eq!(args.command, Command::Play);
        assert_eq!(args.game.mode, Some(GameMode::Timed));
        assert_eq!(args.game.time_limit_secs, Some(90));
    }

    #[test]
    fn parses_game_flags() {
        let args = parse(&[
            "play",
            "--profile",
            "Mia",
            "--difficulty",
            "hard",
            "--ops",
            "multiply,divide",
            "--level",
            "4",
            "--table",
            "7",
        ])
        .unwrap();
        assert_eq!(args.profile.as_deref(), Some("Mia"));
        assert_eq!(args.game.difficulty, Some(Difficulty::Hard));
        assert_eq!(
            args.game.operations,
            Some(vec![Operation::Multiply, Operation::Divide])
        );
        assert_eq!(args.game.level, Some(4));
        assert_eq!(args.game.table, Some(7));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            parse(&["dance"]),
            Err(ArgsError::UnknownCommand(_))
        ));
        assert!(matches!(
            parse(&["--time"]),
            Err(ArgsError::MissingValue { flag: "--time" })
        ));
        assert!(matches!(
            parse(&["--ops", ","]),
            Err(ArgsError::InvalidValue { flag: "--ops", .. })
        ));
        assert!(matches!(
            parse(&["--mode", "chess"]),
            Err(ArgsError::InvalidValue { flag: "--mode", .. })
        ));
        assert!(matches!(
            parse(&["profiles", "--mode", "timed"]),
            Err(ArgsError::UnknownArg(_))
        ));
        assert!(matches!(
            parse(&["play", "--buy", "themes/ocean"]),
            Err(ArgsError::UnknownArg(_))
        ));
    }

    #[test]
    fn parses_shop_items() {
        let args = parse(&["shop", "--buy", "themes/ocean", "--equip", "themes/ocean"]).unwrap();
        let expected = ItemRef {
            category: ShopCategory::Themes,
            id: "ocean".into(),
        };
        assert_eq!(args.shop.buy, Some(expected.clone()));
        assert_eq!(args.shop.equip, Some(expected));
        assert!(matches!(
            parse(&["shop", "--buy", "ocean"]),
            Err(ArgsError::InvalidValue { flag: "--buy", .. })
        ));
    }

    #[test]
    fn env_supplies_defaults() {
        let args = Args::parse_with_env(argv(&["profiles"]), |key| match key {
            "EZMATH_DB_URL" => Some("sqlite:///tmp/ez.db".into()),
            "EZMATH_PROFILE" => Some("Kai".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(args.db_url, "sqlite:///tmp/ez.db");
        assert_eq!(args.profile.as_deref(), Some("Kai"));
    }

    #[test]
    fn flags_override_preferences() {
        let mut preferences = Preferences::default();
        let game = GameArgs {
            mode: Some(GameMode::Level),
            operations: Some(vec![Operation::Divide]),
            ..GameArgs::default()
        };
        game.apply(&mut preferences);
        assert_eq!(preferences.mode, Some(GameMode::Level));
        assert_eq!(preferences.operations, vec![Operation::Divide]);
        assert_eq!(preferences.difficulty, Preferences::default().difficulty);
    }

    #[test]
    fn normalizes_relative_paths() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
        let url = normalize_sqlite_url("sqlite:data/ez.db".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/ez.db"));
    }
}
