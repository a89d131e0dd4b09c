//! Async driver for a single drill session.

mod progress;
mod runtime;
mod service;
mod view;

pub use progress::DrillProgress;
pub use runtime::{DrillCommand, DrillHandle};
pub use service::DrillService;
pub use view::{DrillView, HistoryRow};
