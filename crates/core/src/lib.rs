//! Core drill engine: expression evaluation, presentation modes, the drill
//! session state machine and the built-in exercise catalog.
//!
//! Nothing here performs I/O or owns a timer. Callers feed
//! [`session::DrillEvent`]s in and execute the returned
//! [`session::Effect`]s.

#![forbid(unsafe_code)]

pub mod catalog;
pub mod eval;
pub mod model;
pub mod session;
pub mod time;
pub mod transform;
