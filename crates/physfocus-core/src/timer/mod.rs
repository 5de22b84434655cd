mod controller;
mod engine;
mod mode;
mod ticker;

pub use controller::{Alerter, SessionSink, TimerController};
pub use engine::{format_clock, TimerEngine, TimerState};
pub use mode::{DurationConfig, TimerMode, MAX_DURATION_MIN, MIN_DURATION_MIN};
pub use ticker::TickSource;
