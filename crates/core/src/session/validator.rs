use super::timer::{Effect, SETTLE_DELAY, TimerKind, TimerToken};

/// Result of a settled comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Correct { first_try: bool, value: String },
    Incorrect { first_try: bool, value: String },
}

/// Debounced answer check bound to one presentation's input.
///
/// Input longer than the expected answer is cut back to its length and drops
/// any pending check without scheduling a new one. A comparison is only
/// scheduled when the trimmed input has exactly the expected length, and runs
/// once the settle window passes without further input.
#[derive(Debug, Clone)]
pub struct AnswerValidator {
    presentation: u64,
    expected: String,
    max_len: usize,
    input: String,
    first_try: bool,
    marked_wrong: bool,
    seq: u64,
    pending: Option<(TimerToken, String)>,
}

impl AnswerValidator {
    #[must_use]
    pub fn new(presentation: u64, expected: impl Into<String>) -> Self {
        let expected = expected.into();
        let max_len = expected.chars().count();
        Self {
            presentation,
            expected,
            max_len,
            input: String::new(),
            first_try: true,
            marked_wrong: false,
            seq: 0,
            pending: None,
        }
    }

    #[must_use]
    pub fn expected(&self) -> &str {
        &self.expected
    }

    /// Current contents of the input surface.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    #[must_use]
    pub fn is_first_try(&self) -> bool {
        self.first_try
    }

    /// True once a wrong answer has been submitted for this presentation.
    #[must_use]
    pub fn is_marked_wrong(&self) -> bool {
        self.marked_wrong
    }

    #[must_use]
    pub fn pending(&self) -> Option<TimerToken> {
        self.pending.as_ref().map(|(token, _)| *token)
    }

    /// React to an input change, whatever its source.
    pub fn on_input(&mut self, raw: &str) -> Vec<Effect> {
        let value = raw.trim();
        let len = value.chars().count();

        if len > self.max_len {
            // Overflow never submits; a check armed before it is dropped.
            self.input = value.chars().take(self.max_len).collect();
            return self.cancel_pending().into_iter().collect();
        }

        let mut effects = Vec::new();
        if let Some((token, _)) = self.pending.take() {
            effects.push(Effect::Cancel(token));
        }
        self.input = raw.to_string();

        if len == self.max_len {
            self.seq += 1;
            let token = TimerToken::new(self.presentation, self.seq, TimerKind::Settle);
            self.pending = Some((token, value.to_string()));
            effects.push(Effect::Schedule {
                token,
                delay: SETTLE_DELAY,
            });
        }
        effects
    }

    /// Run the comparison for `token` if it is still the pending check.
    pub fn settle(&mut self, token: TimerToken) -> Option<Verdict> {
        match &self.pending {
            Some((pending, _)) if *pending == token => {}
            _ => return None,
        }
        let (_, value) = self.pending.take()?;
        let first_try = self.first_try;

        if value == self.expected {
            return Some(Verdict::Correct { first_try, value });
        }

        self.first_try = false;
        self.marked_wrong = true;
        self.input.clear();
        Some(Verdict::Incorrect { first_try, value })
    }

    /// Cancel effects for anything still scheduled.
    pub fn cancel_pending(&mut self) -> Option<Effect> {
        self.pending.take().map(|(token, _)| Effect::Cancel(token))
    }
}
