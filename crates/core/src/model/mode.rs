use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModeError {
    #[error("unknown presentation mode: {0}")]
    UnknownMode(String),
}

//
// ─── MODES ─────────────────────────────────────────────────────────────────────
//

/// Presentation transforms applied to a drill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Shuffle the whole sequence before the run.
    Random,
    /// Reverse operand and operator order of each expression when presented.
    Mirror,
    /// Sort expressions by ascending complexity.
    Surges,
    /// Delay the reveal of each question.
    Fugues,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Random, Mode::Mirror, Mode::Surges, Mode::Fugues];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Mode::Random => "RND",
            Mode::Mirror => "MRR",
            Mode::Surges => "SRG",
            Mode::Fugues => "FGS",
        }
    }

    fn bit(self) -> u8 {
        match self {
            Mode::Random => 1,
            Mode::Mirror => 1 << 1,
            Mode::Surges => 1 << 2,
            Mode::Fugues => 1 << 3,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Random => "Random",
            Mode::Mirror => "Mirror",
            Mode::Surges => "Surges",
            Mode::Fugues => "Fugues",
        };
        f.write_str(name)
    }
}

impl FromStr for Mode {
    type Err = ModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Random" | "random" | "RND" => Ok(Mode::Random),
            // "Mirrow" is how some upstream configurations spell it.
            "Mirror" | "mirror" | "Mirrow" | "MRR" => Ok(Mode::Mirror),
            "Surges" | "surges" | "SRG" => Ok(Mode::Surges),
            "Fugues" | "fugues" | "FGS" => Ok(Mode::Fugues),
            other => Err(ModeError::UnknownMode(other.to_string())),
        }
    }
}

/// Set of active modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ModeSet(u8);

impl ModeSet {
    #[must_use]
    pub fn empty() -> Self {
        Self(0)
    }

    #[must_use]
    pub fn with(mut self, mode: Mode) -> Self {
        self.insert(mode);
        self
    }

    #[must_use]
    pub fn without(mut self, mode: Mode) -> Self {
        self.remove(mode);
        self
    }

    pub fn insert(&mut self, mode: Mode) {
        self.0 |= mode.bit();
    }

    pub fn remove(&mut self, mode: Mode) {
        self.0 &= !mode.bit();
    }

    #[must_use]
    pub fn contains(&self, mode: Mode) -> bool {
        self.0 & mode.bit() != 0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Mode> + '_ {
        Mode::ALL.into_iter().filter(|m| self.contains(*m))
    }

    /// Parse a comma or whitespace separated list of mode names.
    ///
    /// # Errors
    ///
    /// Returns `ModeError::UnknownMode` for any unrecognised entry.
    pub fn parse_list(raw: &str) -> Result<Self, ModeError> {
        raw.split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(str::parse::<Mode>)
            .collect()
    }
}

impl FromIterator<Mode> for ModeSet {
    fn from_iter<T: IntoIterator<Item = Mode>>(iter: T) -> Self {
        iter.into_iter().fold(Self::empty(), ModeSet::with)
    }
}

//
// ─── FUGUES SPEED ──────────────────────────────────────────────────────────────
//

/// Reveal delay tiers for Fugues, fastest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FuguesSpeed {
    #[default]
    H1,
    H2,
    H3,
    H4,
    H5,
    H6,
}

impl FuguesSpeed {
    pub const ALL: [FuguesSpeed; 6] = [
        FuguesSpeed::H1,
        FuguesSpeed::H2,
        FuguesSpeed::H3,
        FuguesSpeed::H4,
        FuguesSpeed::H5,
        FuguesSpeed::H6,
    ];

    /// Identifier used by the settings store (`1H` … `6H`).
    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            FuguesSpeed::H1 => "1H",
            FuguesSpeed::H2 => "2H",
            FuguesSpeed::H3 => "3H",
            FuguesSpeed::H4 => "4H",
            FuguesSpeed::H5 => "5H",
            FuguesSpeed::H6 => "6H",
        }
    }

    #[must_use]
    pub fn delay(self) -> Duration {
        let ms = match self {
            FuguesSpeed::H1 => 200,
            FuguesSpeed::H2 => 500,
            FuguesSpeed::H3 => 1_000,
            FuguesSpeed::H4 => 2_000,
            FuguesSpeed::H5 => 5_000,
            FuguesSpeed::H6 => 10_000,
        };
        Duration::from_millis(ms)
    }

    /// Resolve a stored identifier; unknown or missing falls back to the fastest tier.
    #[must_use]
    pub fn from_id_or_default(id: Option<&str>) -> Self {
        id.and_then(|raw| {
            let raw = raw.trim();
            Self::ALL.into_iter().find(|s| s.id().eq_ignore_ascii_case(raw))
        })
        .unwrap_or_default()
    }
}

impl fmt::Display for FuguesSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
