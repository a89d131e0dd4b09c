use std::sync::Arc;

use async_trait::async_trait;
use drill_core::model::{DrillSettings, FuguesSpeed};
use services::{SettingsService, SettingsServiceError};
use storage::repository::{SettingsRepository, StorageError};

struct BrokenRepository;

#[async_trait]
impl SettingsRepository for BrokenRepository {
    async fn get_settings(&self) -> Result<Option<DrillSettings>, StorageError> {
        Err(StorageError::Connection("database is locked".into()))
    }

    async fn save_settings(&self, _settings: &DrillSettings) -> Result<(), StorageError> {
        Err(StorageError::Connection("database is locked".into()))
    }
}

#[tokio::test]
async fn unreadable_preference_falls_back_to_fastest_tier() {
    let service = SettingsService::new(Arc::new(BrokenRepository));
    assert_eq!(service.fugues_speed().await, FuguesSpeed::H1);
    assert!(matches!(
        service.load().await,
        Err(SettingsServiceError::Storage(StorageError::Connection(_)))
    ));
}

#[tokio::test]
async fn failed_save_is_reported() {
    let service = SettingsService::new(Arc::new(BrokenRepository));
    assert!(service.remember_speed(FuguesSpeed::H2).await.is_err());
}
