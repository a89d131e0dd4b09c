use std::sync::Arc;

use drill_core::model::{DrillSettings, DrillSettingsDraft, FuguesSpeed};
use storage::repository::SettingsRepository;

use crate::error::SettingsServiceError;

/// Reads and writes the "last used speed" preference.
#[derive(Clone)]
pub struct SettingsService {
    repo: Arc<dyn SettingsRepository>,
}

impl SettingsService {
    #[must_use]
    pub fn new(repo: Arc<dyn SettingsRepository>) -> Self {
        Self { repo }
    }

    /// Load persisted settings (or defaults if missing).
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` on storage failures.
    pub async fn load(&self) -> Result<DrillSettings, SettingsServiceError> {
        let settings = self.repo.get_settings().await?;
        Ok(settings.unwrap_or_default())
    }

    /// Speed to use for the next Fugues run. Storage failures fall back to
    /// the fastest tier.
    pub async fn fugues_speed(&self) -> FuguesSpeed {
        match self.load().await {
            Ok(settings) => settings.fugues_speed(),
            Err(err) => {
                tracing::warn!(error = %err, "failed to load speed preference, using default");
                FuguesSpeed::default()
            }
        }
    }

    /// Validate and persist new settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError` if validation or persistence fails.
    pub async fn save(&self, draft: DrillSettingsDraft) -> Result<DrillSettings, SettingsServiceError> {
        let settings = draft.validate()?;
        self.repo.save_settings(&settings).await?;
        tracing::info!(speed = %settings.fugues_speed(), "saved speed preference");
        Ok(settings)
    }

    /// Remember `speed` as the last used tier.
    ///
    /// # Errors
    ///
    /// Returns `SettingsServiceError::Storage` if persistence fails.
    pub async fn remember_speed(&self, speed: FuguesSpeed) -> Result<DrillSettings, SettingsServiceError> {
        self.save(DrillSettingsDraft::with_speed(speed)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::repository::InMemoryRepository;

    #[tokio::test]
    async fn missing_preference_is_fastest_tier() {
        let service = SettingsService::new(Arc::new(InMemoryRepository::new()));
        assert_eq!(service.fugues_speed().await, FuguesSpeed::H1);
    }

    #[tokio::test]
    async fn remembered_speed_is_loaded_back() {
        let service = SettingsService::new(Arc::new(InMemoryRepository::new()));
        service.remember_speed(FuguesSpeed::H4).await.unwrap();
        assert_eq!(service.fugues_speed().await, FuguesSpeed::H4);
    }

    #[tokio::test]
    async fn invalid_draft_is_not_saved() {
        let service = SettingsService::new(Arc::new(InMemoryRepository::new()));
        let draft = DrillSettingsDraft {
            fugues_speed: Some("0H".into()),
        };
        assert!(matches!(
            service.save(draft).await,
            Err(SettingsServiceError::Settings(_))
        ));
        assert_eq!(service.fugues_speed().await, FuguesSpeed::H1);
    }
}
