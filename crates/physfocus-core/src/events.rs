use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{DurationConfig, TimerMode};

/// Every timer state change produces an Event.
/// The CLI prints them; the controller reacts to `TimerCompleted`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TimerStarted {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        mode: TimerMode,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        mode: TimerMode,
        total_secs: u64,
        at: DateTime<Utc>,
    },
    ModeSwitched {
        mode: TimerMode,
        total_secs: u64,
        at: DateTime<Utc>,
    },
    /// Durations were replaced. `reset_active` is false when the timer was
    /// running and the new value waits for the next switch/reset.
    SettingsApplied {
        durations: DurationConfig,
        reset_active: bool,
        at: DateTime<Utc>,
    },
    /// Countdown reached zero while running.
    TimerCompleted {
        mode: TimerMode,
        duration_min: u32,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        mode: TimerMode,
        running: bool,
        remaining_secs: u64,
        total_secs: u64,
        progress: f64,
        can_edit_settings: bool,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::TimerStarted { at, .. }
            | Event::TimerPaused { at, .. }
            | Event::TimerReset { at, .. }
            | Event::ModeSwitched { at, .. }
            | Event::SettingsApplied { at, .. }
            | Event::TimerCompleted { at, .. }
            | Event::StateSnapshot { at, .. } => *at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completed_event_serializes_with_tag() {
        let event = Event::TimerCompleted {
            mode: TimerMode::ShortBreak,
            duration_min: 5,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "timer_completed");
        assert_eq!(json["mode"], "short_break");
        assert_eq!(json["duration_min"], 5);
    }
}
