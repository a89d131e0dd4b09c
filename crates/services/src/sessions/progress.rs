use drill_core::session::DrillSession;

/// Where the run stands, for a progress line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrillProgress {
    /// Items in the original sequence.
    pub total: usize,
    /// 1-based pass number; pass 1 is the original sequence.
    pub pass: u32,
    /// Items still to be shown in this pass after the current one.
    pub remaining_in_pass: usize,
    /// Items already failed in this pass and waiting for the next one.
    pub queued_for_retry: usize,
    pub is_complete: bool,
}

impl DrillProgress {
    #[must_use]
    pub fn capture(session: &DrillSession) -> Self {
        Self {
            total: session.original_sequence().len(),
            pass: session.pass(),
            remaining_in_pass: session.remaining_in_pass(),
            queued_for_retry: session.retry_queue().len(),
            is_complete: session.is_complete(),
        }
    }
}
