//! Shared error types for the services crate.

use thiserror::Error;

use drill_core::catalog::CatalogError;
use drill_core::model::DrillSettingsError;
use drill_core::session::DrillError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `SettingsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsServiceError {
    #[error(transparent)]
    Settings(#[from] DrillSettingsError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `CatalogService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogServiceError {
    #[error("selection produced no items")]
    Empty,
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by the drill session runtime.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("drill session has ended")]
    Closed,
    #[error(transparent)]
    Drill(#[from] DrillError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
