#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod ledger;
pub mod preferences_service;
pub mod profile_book;
pub mod profile_service;
pub mod sessions;
pub mod shop;

pub use ezmath_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, PreferencesError, ProfileServiceError, ShopError};
pub use ledger::{CurrencyReason, ProfileLedger};
pub use preferences_service::PreferencesService;
pub use profile_book::ProfileBook;
pub use profile_service::ProfileService;
pub use sessions::{
    AnswerOutcome, FeedbackTicket, LevelResult, Phase, SessionEngine, SessionEvent,
    SessionProgress, SessionReport, SessionState,
};
pub use shop::Shop;
