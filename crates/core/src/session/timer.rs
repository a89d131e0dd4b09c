use std::fmt;
use std::time::Duration;

/// Settle window after the input reaches the expected length.
pub const SETTLE_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Fugues reveal of the question and its input.
    Reveal,
    /// Debounced answer check.
    Settle,
}

/// Identifies one scheduled delay.
///
/// A token is only honoured while it is the pending token of the presentation it
/// was issued for; anything else is stale and must be ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken {
    presentation: u64,
    seq: u64,
    kind: TimerKind,
}

impl TimerToken {
    #[must_use]
    pub(crate) fn new(presentation: u64, seq: u64, kind: TimerKind) -> Self {
        Self {
            presentation,
            seq,
            kind,
        }
    }

    #[must_use]
    pub fn presentation(&self) -> u64 {
        self.presentation
    }

    #[must_use]
    pub fn kind(&self) -> TimerKind {
        self.kind
    }
}

impl fmt::Display for TimerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}#{}.{}", self.kind, self.presentation, self.seq)
    }
}

/// Side effects requested by the engine. The engine never sleeps; a driver
/// turns `Schedule` into a timer that later feeds `DrillEvent::TimerFired`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Schedule { token: TimerToken, delay: Duration },
    Cancel(TimerToken),
}
