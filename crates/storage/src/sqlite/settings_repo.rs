use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use crate::repository::{SettingsRepository, StorageError};
use drill_core::model::DrillSettings;

use super::SqliteRepository;

#[async_trait]
impl SettingsRepository for SqliteRepository {
    async fn get_settings(&self) -> Result<Option<DrillSettings>, StorageError> {
        let row = sqlx::query("SELECT fugues_speed FROM drill_settings WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(|err| StorageError::Connection(err.to_string()))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let fugues_speed: Option<String> = row
            .try_get("fugues_speed")
            .map_err(|err| StorageError::Serialization(err.to_string()))?;

        Ok(Some(DrillSettings::from_persisted(fugues_speed.as_deref())))
    }

    async fn save_settings(&self, settings: &DrillSettings) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO drill_settings (id, fugues_speed, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                fugues_speed = excluded.fugues_speed,
                updated_at = excluded.updated_at
            ",
        )
        .bind(1_i64)
        .bind(settings.fugues_speed().id())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|err| StorageError::Connection(err.to_string()))?;

        Ok(())
    }
}
