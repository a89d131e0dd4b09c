use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::model::{
    FuguesSpeed, HistoryEntry, HistoryLedger, Item, KeypadKey, Mode, ModeSet, SessionSummary,
};
use crate::time::Clock;
use crate::transform;

use super::timer::{Effect, TimerKind, TimerToken};
use super::validator::{AnswerValidator, Verdict};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DrillError {
    #[error("restart is only available once the drill is complete")]
    NotComplete,
}

//
// ─── EVENTS & PHASES ───────────────────────────────────────────────────────────
//

/// Everything that can drive the session forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrillEvent {
    /// The answer input changed (typed or injected).
    Input(String),
    /// A keypad key was pressed while the answer input has focus.
    Key(KeypadKey),
    /// A delay requested through `Effect::Schedule` elapsed.
    TimerFired(TimerToken),
    /// Repeat a completed drill.
    Restart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Not started, or torn down.
    Idle,
    /// Fugues: question text blank and no input until the reveal fires.
    RevealDelayed,
    Presenting,
    /// Nothing left to present; only `Restart` is accepted.
    Complete,
}

/// What happened to the current presentation after an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Correct { first_try: bool },
    Incorrect { first_try: bool },
}

//
// ─── PRESENTATION ──────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone)]
struct Presentation {
    id: u64,
    item: Item,
    text: String,
    expected: String,
    reveal: Option<TimerToken>,
    validator: Option<AnswerValidator>,
}

impl Presentation {
    fn cancel_all(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if let Some(token) = self.reveal.take() {
            effects.push(Effect::Cancel(token));
        }
        if let Some(cancel) = self.validator.as_mut().and_then(AnswerValidator::cancel_pending) {
            effects.push(cancel);
        }
        effects
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct RunCounts {
    pass: u32,
    first_try_correct: u32,
    missed: u32,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Single drill session: working queue, cursor, retry queue, history and the
/// current presentation.
///
/// The session is driven entirely by [`DrillEvent`]s and answers with
/// [`Effect`]s; it owns no timers itself.
pub struct DrillSession {
    modes: ModeSet,
    fugues_speed: FuguesSpeed,
    clock: Clock,
    rng: StdRng,
    original: Vec<Item>,
    working: Vec<Item>,
    cursor: usize,
    retry: Vec<Item>,
    history: HistoryLedger,
    presentation: Option<Presentation>,
    next_presentation: u64,
    phase: Phase,
    counts: RunCounts,
    started_at: Option<DateTime<Utc>>,
    summary: Option<SessionSummary>,
    last_resolution: Option<Resolution>,
}

impl DrillSession {
    #[must_use]
    pub fn new(modes: ModeSet) -> Self {
        Self {
            modes,
            fugues_speed: FuguesSpeed::default(),
            clock: Clock::system(),
            rng: StdRng::from_rng(&mut rand::rng()),
            original: Vec::new(),
            working: Vec::new(),
            cursor: 0,
            retry: Vec::new(),
            history: HistoryLedger::new(),
            presentation: None,
            next_presentation: 1,
            phase: Phase::Idle,
            counts: RunCounts::default(),
            started_at: None,
            summary: None,
            last_resolution: None,
        }
    }

    #[must_use]
    pub fn with_fugues_speed(mut self, speed: FuguesSpeed) -> Self {
        self.fugues_speed = speed;
        self
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Deterministic shuffles, for tests and replays.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Access to the session clock, so a fixed clock can be stepped.
    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    //
    // ─── TRANSITIONS ───────────────────────────────────────────────────────────
    //

    /// Begin a run over `items` with the session's modes.
    pub fn start(&mut self, items: Vec<Item>) -> Vec<Effect> {
        let mut effects = self.teardown();
        let prepared = transform::prepare(items, self.modes, &mut self.rng);
        effects.extend(self.begin(prepared));
        effects
    }

    /// Repeat a completed run with a fresh shuffle of the previous order.
    ///
    /// # Errors
    ///
    /// Returns `DrillError::NotComplete` unless the session is in `Phase::Complete`.
    pub fn restart(&mut self) -> Result<Vec<Effect>, DrillError> {
        if self.phase != Phase::Complete {
            return Err(DrillError::NotComplete);
        }
        let reshuffled = transform::reshuffle_for_restart(&self.original, &mut self.rng);
        Ok(self.begin(reshuffled))
    }

    /// Apply one event.
    ///
    /// # Errors
    ///
    /// Returns `DrillError::NotComplete` for a `Restart` before completion.
    pub fn handle(&mut self, event: DrillEvent) -> Result<Vec<Effect>, DrillError> {
        self.last_resolution = None;
        match event {
            DrillEvent::Input(raw) => Ok(self.on_input(|_| raw)),
            DrillEvent::Key(key) => Ok(self.on_input(|current| key.apply(current))),
            DrillEvent::TimerFired(token) => Ok(self.on_timer(token)),
            DrillEvent::Restart => self.restart(),
        }
    }

    /// Drop every queue and the current presentation; returns cancels for all
    /// pending timers.
    pub fn teardown(&mut self) -> Vec<Effect> {
        let effects = self.drop_presentation();
        self.original.clear();
        self.working.clear();
        self.retry.clear();
        self.cursor = 0;
        self.history.clear();
        self.counts = RunCounts::default();
        self.started_at = None;
        self.summary = None;
        self.last_resolution = None;
        self.phase = Phase::Idle;
        effects
    }

    fn begin(&mut self, order: Vec<Item>) -> Vec<Effect> {
        let mut effects = self.drop_presentation();
        self.original.clone_from(&order);
        self.working = order;
        self.retry.clear();
        self.cursor = 0;
        self.history.clear();
        self.counts = RunCounts {
            pass: 1,
            ..RunCounts::default()
        };
        self.started_at = Some(self.clock.now());
        self.summary = None;
        effects.extend(self.advance());
        effects
    }

    fn advance(&mut self) -> Vec<Effect> {
        let mut effects = self.drop_presentation();

        while self.cursor >= self.working.len() {
            if self.retry.is_empty() {
                self.complete();
                return effects;
            }
            self.working = std::mem::take(&mut self.retry);
            self.cursor = 0;
            self.counts.pass += 1;
        }

        let item = self.working[self.cursor].clone();
        self.cursor += 1;

        let presented = item.presented(self.modes.contains(Mode::Mirror));
        let id = self.next_presentation;
        self.next_presentation += 1;

        let mut presentation = Presentation {
            id,
            item,
            text: presented.text,
            expected: presented.expected,
            reveal: None,
            validator: None,
        };

        if self.modes.contains(Mode::Fugues) {
            let token = TimerToken::new(id, 0, TimerKind::Reveal);
            presentation.reveal = Some(token);
            effects.push(Effect::Schedule {
                token,
                delay: self.reveal_delay(),
            });
            self.phase = Phase::RevealDelayed;
        } else {
            presentation.validator = Some(AnswerValidator::new(id, presentation.expected.clone()));
            self.phase = Phase::Presenting;
        }

        self.presentation = Some(presentation);
        effects
    }

    fn complete(&mut self) {
        self.phase = Phase::Complete;
        let completed_at = self.clock.now();
        let started_at = self.started_at.unwrap_or(completed_at);
        let total = u32::try_from(self.original.len()).unwrap_or(u32::MAX);
        self.summary = SessionSummary::new(
            started_at,
            completed_at,
            total,
            self.counts.first_try_correct,
            self.counts.missed,
            self.counts.pass,
        )
        .ok();
    }

    fn drop_presentation(&mut self) -> Vec<Effect> {
        self.presentation
            .take()
            .map(|mut p| p.cancel_all())
            .unwrap_or_default()
    }

    fn on_input(&mut self, next_value: impl FnOnce(&str) -> String) -> Vec<Effect> {
        if self.phase != Phase::Presenting {
            return Vec::new();
        }
        let Some(validator) = self
            .presentation
            .as_mut()
            .and_then(|p| p.validator.as_mut())
        else {
            return Vec::new();
        };
        let raw = next_value(validator.input());
        validator.on_input(&raw)
    }

    fn on_timer(&mut self, token: TimerToken) -> Vec<Effect> {
        let Some(presentation) = self.presentation.as_mut() else {
            return Vec::new();
        };
        if presentation.id != token.presentation() {
            return Vec::new();
        }

        match token.kind() {
            TimerKind::Reveal => {
                if presentation.reveal != Some(token) {
                    return Vec::new();
                }
                presentation.reveal = None;
                presentation.validator = Some(AnswerValidator::new(
                    presentation.id,
                    presentation.expected.clone(),
                ));
                self.phase = Phase::Presenting;
                Vec::new()
            }
            TimerKind::Settle => {
                let Some(verdict) = presentation
                    .validator
                    .as_mut()
                    .and_then(|v| v.settle(token))
                else {
                    return Vec::new();
                };
                self.resolve(verdict)
            }
        }
    }

    fn resolve(&mut self, verdict: Verdict) -> Vec<Effect> {
        let Some(presentation) = self.presentation.as_ref() else {
            return Vec::new();
        };
        let first_pass = self.counts.pass == 1;

        match verdict {
            Verdict::Correct { first_try, value } => {
                if first_try {
                    self.history.push(HistoryEntry::new(
                        format!("{} = {value}", presentation.text),
                        true,
                    ));
                    if first_pass {
                        self.counts.first_try_correct += 1;
                    }
                }
                self.last_resolution = Some(Resolution::Correct { first_try });
                self.advance()
            }
            Verdict::Incorrect { first_try, value } => {
                if first_try {
                    self.history.push(HistoryEntry::new(
                        format!("{} = {value}", presentation.text),
                        false,
                    ));
                    self.retry.push(presentation.item.clone());
                    if first_pass {
                        self.counts.missed += 1;
                    }
                }
                self.last_resolution = Some(Resolution::Incorrect { first_try });
                Vec::new()
            }
        }
    }

    //
    // ─── RENDERING HOOKS ───────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn modes(&self) -> ModeSet {
        self.modes
    }

    #[must_use]
    pub fn reveal_delay(&self) -> Duration {
        self.fugues_speed.delay()
    }

    /// Question text; blank while a Fugues reveal is pending.
    #[must_use]
    pub fn question_text(&self) -> Option<&str> {
        match (self.phase, self.presentation.as_ref()) {
            (Phase::RevealDelayed, Some(_)) => Some(""),
            (Phase::Presenting, Some(p)) => Some(&p.text),
            _ => None,
        }
    }

    /// Contents of the answer input, if one exists right now.
    #[must_use]
    pub fn input(&self) -> Option<&str> {
        self.validator().map(AnswerValidator::input)
    }

    /// Whether the current presentation has already received a wrong answer.
    #[must_use]
    pub fn is_marked_wrong(&self) -> bool {
        self.validator().is_some_and(AnswerValidator::is_marked_wrong)
    }

    #[must_use]
    pub fn expected_answer(&self) -> Option<&str> {
        self.presentation.as_ref().map(|p| p.expected.as_str())
    }

    /// The item being presented, in its untransformed form.
    #[must_use]
    pub fn current_item(&self) -> Option<&Item> {
        self.presentation.as_ref().map(|p| &p.item)
    }

    #[must_use]
    pub fn history(&self) -> &HistoryLedger {
        &self.history
    }

    #[must_use]
    pub fn working_queue(&self) -> &[Item] {
        &self.working
    }

    #[must_use]
    pub fn retry_queue(&self) -> &[Item] {
        &self.retry
    }

    #[must_use]
    pub fn original_sequence(&self) -> &[Item] {
        &self.original
    }

    #[must_use]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Items left in the current pass, the presented one excluded.
    #[must_use]
    pub fn remaining_in_pass(&self) -> usize {
        self.working.len().saturating_sub(self.cursor)
    }

    #[must_use]
    pub fn pass(&self) -> u32 {
        self.counts.pass
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    #[must_use]
    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    /// How the last handled event resolved the presentation, if it did.
    #[must_use]
    pub fn last_resolution(&self) -> Option<&Resolution> {
        self.last_resolution.as_ref()
    }

    fn validator(&self) -> Option<&AnswerValidator> {
        self.presentation.as_ref().and_then(|p| p.validator.as_ref())
    }
}

impl fmt::Debug for DrillSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrillSession")
            .field("modes", &self.modes)
            .field("phase", &self.phase)
            .field("working_len", &self.working.len())
            .field("cursor", &self.cursor)
            .field("retry_len", &self.retry.len())
            .field("history_len", &self.history.len())
            .field("pass", &self.counts.pass)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_clock;

    fn session(modes: ModeSet) -> DrillSession {
        DrillSession::new(modes).with_clock(fixed_clock()).with_seed(3)
    }

    fn exprs(list: &[&str]) -> Vec<Item> {
        list.iter().map(|e| Item::expression(*e)).collect()
    }

    fn settle_token(effects: &[Effect]) -> TimerToken {
        effects
            .iter()
            .find_map(|e| match e {
                Effect::Schedule { token, .. } if token.kind() == TimerKind::Settle => Some(*token),
                _ => None,
            })
            .expect("settle scheduled")
    }

    fn answer(s: &mut DrillSession, value: &str) -> Vec<Effect> {
        let effects = s.handle(DrillEvent::Input(value.into())).unwrap();
        let token = settle_token(&effects);
        s.handle(DrillEvent::TimerFired(token)).unwrap()
    }

    #[test]
    fn wrong_then_right_requeues_once() {
        let mut s = session(ModeSet::empty());
        s.start(exprs(&["2+2", "3+3"]));

        assert_eq!(s.question_text(), Some("2 + 2"));
        answer(&mut s, "5");
        assert_eq!(s.question_text(), Some("2 + 2"));
        assert!(s.is_marked_wrong());
        answer(&mut s, "3");
        answer(&mut s, "4");

        assert_eq!(s.question_text(), Some("3 + 3"));
        assert_eq!(s.retry_queue(), exprs(&["2+2"]).as_slice());
        assert_eq!(s.history().len(), 1);

        answer(&mut s, "6");
        assert_eq!(s.pass(), 2);
        assert_eq!(s.working_queue(), exprs(&["2+2"]).as_slice());
        assert!(s.retry_queue().is_empty());
        assert_eq!(s.question_text(), Some("2 + 2"));

        answer(&mut s, "4");
        assert!(s.is_complete());
        let summary = s.summary().unwrap();
        assert_eq!(summary.total_items(), 2);
        assert_eq!(summary.first_try_correct(), 1);
        assert_eq!(summary.missed(), 1);
        assert_eq!(summary.passes(), 2);
    }

    #[test]
    fn history_records_first_attempt_only() {
        let mut s = session(ModeSet::empty());
        s.start(exprs(&["1+1", "2+2"]));
        answer(&mut s, "2");
        answer(&mut s, "5");
        answer(&mut s, "4");

        let entries: Vec<_> = s
            .history()
            .iter()
            .map(|(e, _)| (e.text.clone(), e.was_correct_on_first_try))
            .collect();
        assert_eq!(
            entries,
            vec![
                ("2 + 2 = 5".to_string(), false),
                ("1 + 1 = 2".to_string(), true),
            ]
        );
    }

    #[test]
    fn mirror_validates_against_mirrored_answer() {
        let mut s = session(ModeSet::empty().with(Mode::Mirror));
        s.start(exprs(&["2-3"]));
        assert_eq!(s.question_text(), Some("3 - 2"));
        assert_eq!(s.expected_answer(), Some("1"));

        let effects = s.handle(DrillEvent::Input("-1".into())).unwrap();
        assert!(effects.is_empty(), "overflow must not schedule a check");
        assert_eq!(s.input(), Some("-"));

        answer(&mut s, "1");
        assert!(s.is_complete());
    }

    #[test]
    fn retry_queue_holds_unmirrored_item() {
        let mut s = session(ModeSet::empty().with(Mode::Mirror));
        s.start(exprs(&["5-1", "1+1"]));
        assert_eq!(s.expected_answer(), Some("-4"));
        assert_eq!(s.current_item(), Some(&Item::expression("5-1")));
        answer(&mut s, "-5");
        assert_eq!(s.retry_queue(), exprs(&["5-1"]).as_slice());
    }

    #[test]
    fn invalid_expression_expects_sentinel() {
        let mut s = session(ModeSet::empty());
        s.start(exprs(&["4÷0"]));
        assert_eq!(s.expected_answer(), Some("NaN"));
        answer(&mut s, "NaN");
        assert!(s.is_complete());
    }

    #[test]
    fn fugues_delays_reveal_and_ignores_input() {
        let mut s = session(ModeSet::empty().with(Mode::Fugues)).with_fugues_speed(FuguesSpeed::H3);
        let effects = s.start(exprs(&["1+2"]));
        let (token, delay) = match effects.as_slice() {
            [Effect::Schedule { token, delay }] => (*token, *delay),
            other => panic!("unexpected effects {other:?}"),
        };
        assert_eq!(delay, Duration::from_millis(1_000));
        assert_eq!(s.phase(), Phase::RevealDelayed);
        assert_eq!(s.question_text(), Some(""));
        assert_eq!(s.input(), None);
        assert!(s.handle(DrillEvent::Input("3".into())).unwrap().is_empty());

        s.handle(DrillEvent::TimerFired(token)).unwrap();
        assert_eq!(s.phase(), Phase::Presenting);
        assert_eq!(s.question_text(), Some("1 + 2"));
        assert_eq!(s.input(), Some(""));
    }

    #[test]
    fn overflow_drops_the_pending_check() {
        let mut s = session(ModeSet::empty());
        s.start(exprs(&["6+6", "1+1"]));
        let token = settle_token(&s.handle(DrillEvent::Input("12".into())).unwrap());

        let effects = s.handle(DrillEvent::Input("123".into())).unwrap();
        assert_eq!(effects, vec![Effect::Cancel(token)]);
        assert_eq!(s.input(), Some("12"));
        assert!(s.handle(DrillEvent::TimerFired(token)).unwrap().is_empty());
        assert_eq!(s.question_text(), Some("6 + 6"));

        answer(&mut s, "12");
        assert_eq!(s.question_text(), Some("1 + 1"));
    }

    #[test]
    fn stale_tokens_are_ignored() {
        let mut s = session(ModeSet::empty());
        s.start(exprs(&["1+1", "2+2"]));
        let stale = settle_token(&s.handle(DrillEvent::Input("3".into())).unwrap());
        // Input change supersedes the pending check.
        s.handle(DrillEvent::Input("".into())).unwrap();
        assert!(s.handle(DrillEvent::TimerFired(stale)).unwrap().is_empty());
        assert_eq!(s.question_text(), Some("1 + 1"));

        answer(&mut s, "2");
        // A token from the previous presentation must not touch the new one.
        assert!(s.handle(DrillEvent::TimerFired(stale)).unwrap().is_empty());
        assert_eq!(s.question_text(), Some("2 + 2"));
        assert!(s.history().len() == 1);
    }

    #[test]
    fn teardown_cancels_pending_reveal() {
        let mut s = session(ModeSet::empty().with(Mode::Fugues));
        let effects = s.start(exprs(&["1+1"]));
        let Some(Effect::Schedule { token, .. }) = effects.first().copied() else {
            panic!("reveal expected");
        };
        let torn = s.teardown();
        assert_eq!(torn, vec![Effect::Cancel(token)]);
        assert_eq!(s.phase(), Phase::Idle);
        assert!(s.handle(DrillEvent::TimerFired(token)).unwrap().is_empty());
        assert!(s.working_queue().is_empty());
    }

    #[test]
    fn keypad_keys_edit_the_input() {
        let mut s = session(ModeSet::empty());
        s.start(exprs(&["6+6"]));
        s.handle(DrillEvent::Key(KeypadKey::Char('1'))).unwrap();
        s.handle(DrillEvent::Key(KeypadKey::Char('3'))).unwrap();
        let effects = s.handle(DrillEvent::Key(KeypadKey::Backspace)).unwrap();
        assert!(matches!(effects.as_slice(), [Effect::Cancel(_)]));
        let effects = s.handle(DrillEvent::Key(KeypadKey::Char('2'))).unwrap();
        let token = settle_token(&effects);
        s.handle(DrillEvent::TimerFired(token)).unwrap();
        assert!(s.is_complete());
    }

    #[test]
    fn restart_requires_completion_and_reshuffles() {
        let mut s = session(ModeSet::empty());
        s.start(exprs(&["1+1", "2+2", "3+3"]));
        assert_eq!(s.restart().unwrap_err(), DrillError::NotComplete);

        answer(&mut s, "2");
        answer(&mut s, "4");
        answer(&mut s, "6");
        assert!(s.is_complete());
        let previous = s.original_sequence().to_vec();

        s.handle(DrillEvent::Restart).unwrap();
        assert_eq!(s.phase(), Phase::Presenting);
        assert_ne!(s.original_sequence(), previous.as_slice());
        assert!(s.history().is_empty());
        assert_eq!(s.pass(), 1);
    }

    #[test]
    fn summary_spans_the_run() {
        let mut s = session(ModeSet::empty());
        s.start(exprs(&["1+1"]));
        s.clock_mut().advance(chrono::Duration::seconds(42));
        answer(&mut s, "2");
        let summary = s.summary().unwrap();
        assert_eq!(summary.elapsed(), chrono::Duration::seconds(42));
    }

    #[test]
    fn empty_start_completes_immediately() {
        let mut s = session(ModeSet::empty());
        assert!(s.start(Vec::new()).is_empty());
        assert!(s.is_complete());
        assert_eq!(s.summary().map(SessionSummary::total_items), Some(0));
    }

    #[test]
    fn surges_orders_the_working_queue() {
        let mut s = session(ModeSet::empty().with(Mode::Surges));
        s.start(exprs(&["9×9", "1+1", "3+4"]));
        assert_eq!(s.working_queue(), exprs(&["1+1", "3+4", "9×9"]).as_slice());
        assert_eq!(s.original_sequence(), s.working_queue());
    }
}
