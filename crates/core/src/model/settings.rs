use thiserror::Error;

use crate::model::FuguesSpeed;

/// Preferences persisted between runs. Only the last used Fugues speed survives a restart.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrillSettings {
    fugues_speed: FuguesSpeed,
}

#[derive(Clone, Debug, Default)]
pub struct DrillSettingsDraft {
    pub fugues_speed: Option<String>,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DrillSettingsError {
    #[error("unknown Fugues speed: {0}")]
    UnknownSpeed(String),
}

impl DrillSettingsDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_speed(speed: FuguesSpeed) -> Self {
        Self {
            fugues_speed: Some(speed.id().to_string()),
        }
    }

    /// Validate user-supplied settings.
    ///
    /// # Errors
    ///
    /// Returns `DrillSettingsError::UnknownSpeed` if a speed id is given but not in the table.
    pub fn validate(self) -> Result<DrillSettings, DrillSettingsError> {
        let fugues_speed = match normalize_optional(self.fugues_speed) {
            None => FuguesSpeed::default(),
            Some(raw) => FuguesSpeed::ALL
                .into_iter()
                .find(|speed| speed.id().eq_ignore_ascii_case(&raw))
                .ok_or(DrillSettingsError::UnknownSpeed(raw))?,
        };
        Ok(DrillSettings { fugues_speed })
    }
}

impl DrillSettings {
    /// Rehydrate from storage. Stored values are never rejected: anything
    /// unreadable resolves to the fastest tier.
    #[must_use]
    pub fn from_persisted(fugues_speed: Option<&str>) -> Self {
        Self {
            fugues_speed: FuguesSpeed::from_id_or_default(fugues_speed),
        }
    }

    #[must_use]
    pub fn fugues_speed(&self) -> FuguesSpeed {
        self.fugues_speed
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}
