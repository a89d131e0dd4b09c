use drill_core::model::SessionSummary;
use drill_core::session::{DrillSession, Phase, Resolution};

use super::progress::DrillProgress;

/// One line of the answer history.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    /// `"<spaced question> = <typed answer>"`.
    pub text: String,
    pub correct_first_try: bool,
    /// 1.0 for the newest row, fading towards 0.2 for the oldest.
    pub opacity: f64,
}

/// Render snapshot published after every event the runtime handles.
///
/// Plain data only; formatting belongs to whoever draws it.
#[derive(Debug, Clone, PartialEq)]
pub struct DrillView {
    pub phase: Phase,
    /// Blank while a Fugues reveal is pending, `None` when nothing is presented.
    pub question: Option<String>,
    /// `None` while no input surface exists.
    pub input: Option<String>,
    pub marked_wrong: bool,
    pub history: Vec<HistoryRow>,
    pub progress: DrillProgress,
    pub last_resolution: Option<Resolution>,
    pub summary: Option<SessionSummary>,
}

impl DrillView {
    #[must_use]
    pub fn capture(session: &DrillSession) -> Self {
        let history = session
            .history()
            .iter()
            .map(|(entry, weight)| HistoryRow {
                text: entry.text.clone(),
                correct_first_try: entry.was_correct_on_first_try,
                opacity: weight,
            })
            .collect();

        Self {
            phase: session.phase(),
            question: session.question_text().map(str::to_owned),
            input: session.input().map(str::to_owned),
            marked_wrong: session.is_marked_wrong(),
            history,
            progress: DrillProgress::capture(session),
            last_resolution: session.last_resolution().cloned(),
            summary: session.summary().cloned(),
        }
    }

    /// Snapshot of a session that has not started.
    #[must_use]
    pub fn idle() -> Self {
        Self {
            phase: Phase::Idle,
            question: None,
            input: None,
            marked_wrong: false,
            history: Vec::new(),
            progress: DrillProgress::default(),
            last_resolution: None,
            summary: None,
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }
}

impl Default for DrillView {
    fn default() -> Self {
        Self::idle()
    }
}
