#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog_service;
pub mod error;
pub mod sessions;
pub mod settings_service;

pub use drill_core::time::Clock;

pub use app_services::AppServices;
pub use catalog_service::{CatalogService, ExercisePlan, ExerciseSelection};
pub use error::{AppServicesError, CatalogServiceError, SessionError, SettingsServiceError};
pub use sessions::{DrillCommand, DrillHandle, DrillProgress, DrillService, DrillView, HistoryRow};
pub use settings_service::SettingsService;
