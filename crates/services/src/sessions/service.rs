use drill_core::model::{FuguesSpeed, Item, Mode, ModeSet};
use drill_core::session::DrillSession;

use crate::Clock;
use crate::settings_service::SettingsService;

use super::runtime::{DrillHandle, DrillRuntime};

/// Starts drill runs with the persisted speed preference applied.
#[derive(Clone)]
pub struct DrillService {
    clock: Clock,
    settings: SettingsService,
    seed: Option<u64>,
}

impl DrillService {
    #[must_use]
    pub fn new(clock: Clock, settings: SettingsService) -> Self {
        Self {
            clock,
            settings,
            seed: None,
        }
    }

    /// Fix the shuffle seed for reproducible runs.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Start a run over `items` and return its handle.
    ///
    /// The Fugues delay is read from the preference once, here.
    pub async fn start(&self, modes: ModeSet, items: Vec<Item>) -> DrillHandle {
        let speed = if modes.contains(Mode::Fugues) {
            self.settings.fugues_speed().await
        } else {
            FuguesSpeed::default()
        };

        let mut session = DrillSession::new(modes)
            .with_fugues_speed(speed)
            .with_clock(self.clock);
        if let Some(seed) = self.seed {
            session = session.with_seed(seed);
        }
        DrillRuntime::spawn(session, items)
    }
}
