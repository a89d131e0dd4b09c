use std::path::Path;
use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::catalog_service::CatalogService;
use crate::error::AppServicesError;
use crate::sessions::DrillService;
use crate::settings_service::SettingsService;

/// Assembles the services an app front end needs.
#[derive(Clone)]
pub struct AppServices {
    settings: Arc<SettingsService>,
    catalog: Arc<CatalogService>,
    drills: Arc<DrillService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// `pot_odds_path` is optional; a missing dataset only disables Pot Odds items.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        pot_odds_path: Option<&Path>,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(&storage, clock, pot_odds_path))
    }

    /// Build services over in-memory storage.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(&Storage::in_memory(), clock, None)
    }

    fn from_storage(storage: &Storage, clock: Clock, pot_odds_path: Option<&Path>) -> Self {
        let settings = SettingsService::new(Arc::clone(&storage.settings));
        let catalog = pot_odds_path.map_or_else(CatalogService::default, CatalogService::from_dataset_file);
        let drills = DrillService::new(clock, settings.clone());
        Self {
            settings: Arc::new(settings),
            catalog: Arc::new(catalog),
            drills: Arc::new(drills),
        }
    }

    #[must_use]
    pub fn settings(&self) -> Arc<SettingsService> {
        Arc::clone(&self.settings)
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<CatalogService> {
        Arc::clone(&self.catalog)
    }

    #[must_use]
    pub fn drills(&self) -> Arc<DrillService> {
        Arc::clone(&self.drills)
    }
}
