//! Session state machine and per-presentation answer validation.
//!
//! The machine consumes [`DrillEvent`]s and emits [`Effect`]s; timers live in
//! whatever drives it.

mod machine;
mod timer;
mod validator;

pub use machine::{DrillError, DrillEvent, DrillSession, Phase, Resolution};
pub use timer::{Effect, SETTLE_DELAY, TimerKind, TimerToken};
pub use validator::{AnswerValidator, Verdict};
