//! Persistence for the drill: the speed preference repository (in-memory and
//! `SQLite`) and loaders for item and Pot Odds data files.

#![forbid(unsafe_code)]

pub mod dataset;
pub mod repository;
pub mod sqlite;

pub use repository::{InMemoryRepository, SettingsRepository, Storage, StorageError};
