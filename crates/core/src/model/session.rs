use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionSummaryError {
    #[error("completed_at is before started_at")]
    InvalidTimeRange,

    #[error("first-try correct ({correct}) plus missed ({missed}) exceeds total items ({total})")]
    CountMismatch { total: u32, correct: u32, missed: u32 },
}

/// Pass-through counts for a completed drill run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    started_at: DateTime<Utc>,
    completed_at: DateTime<Utc>,
    total_items: u32,
    first_try_correct: u32,
    missed: u32,
    passes: u32,
}

impl SessionSummary {
    /// # Errors
    ///
    /// Returns `SessionSummaryError::InvalidTimeRange` if `completed_at` is before `started_at`.
    /// Returns `SessionSummaryError::CountMismatch` if the counts exceed the item total.
    pub fn new(
        started_at: DateTime<Utc>,
        completed_at: DateTime<Utc>,
        total_items: u32,
        first_try_correct: u32,
        missed: u32,
        passes: u32,
    ) -> Result<Self, SessionSummaryError> {
        if completed_at < started_at {
            return Err(SessionSummaryError::InvalidTimeRange);
        }
        if first_try_correct.saturating_add(missed) > total_items {
            return Err(SessionSummaryError::CountMismatch {
                total: total_items,
                correct: first_try_correct,
                missed,
            });
        }

        Ok(Self {
            started_at,
            completed_at,
            total_items,
            first_try_correct,
            missed,
            passes,
        })
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    /// Wall time from the first presentation to completion.
    #[must_use]
    pub fn elapsed(&self) -> chrono::Duration {
        self.completed_at - self.started_at
    }

    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.total_items
    }

    /// Items answered correctly the first time they were shown.
    #[must_use]
    pub fn first_try_correct(&self) -> u32 {
        self.first_try_correct
    }

    /// Items that needed at least one retry pass.
    #[must_use]
    pub fn missed(&self) -> u32 {
        self.missed
    }

    #[must_use]
    pub fn passes(&self) -> u32 {
        self.passes
    }
}
