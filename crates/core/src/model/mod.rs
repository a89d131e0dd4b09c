mod history;
mod item;
mod keypad;
mod mode;
mod session;
mod settings;

pub use history::{
    HISTORY_CAPACITY, HistoryEntry, HistoryLedger, MAX_WEIGHT, MIN_WEIGHT, weight_for_rank,
};
pub use item::{AnswerValue, Item, Presented};
pub use keypad::KeypadKey;
pub use mode::{FuguesSpeed, Mode, ModeError, ModeSet};
pub use session::{SessionSummary, SessionSummaryError};
pub use settings::{DrillSettings, DrillSettingsDraft, DrillSettingsError};
