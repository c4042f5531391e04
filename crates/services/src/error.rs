//! Shared error types for the services crate.

use thiserror::Error;

use ezmath_core::model::{ProfileError, ProfileId, ShopCategory};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `ProfileService` and `ProfileBook`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProfileServiceError {
    #[error("profile not found: {0}")]
    NotFound(ProfileId),
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by the shop.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ShopError {
    #[error("no active profile")]
    NoActiveProfile,
    #[error("unknown {category} item: {id}")]
    UnknownItem { category: ShopCategory, id: String },
    #[error("{category} item already unlocked: {id}")]
    AlreadyUnlocked { category: ShopCategory, id: String },
    #[error(transparent)]
    Profile(#[from] ProfileError),
}

/// Errors emitted by `PreferencesService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PreferencesError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
