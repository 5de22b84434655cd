//! Countdown state machine.
//!
//! The engine is purely reactive: it owns no clock and no thread. Something
//! else (see [`TimerController`](super::TimerController)) calls `tick()` once
//! per second while the timer is running.
//!
//! ## State Transitions
//!
//! ```text
//! Stopped --toggle--> Running --toggle--> Stopped
//! Running --tick (remaining hits 0)--> Stopped   (emits TimerCompleted once)
//! any --switch_mode | reset--> Stopped
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(DurationConfig::default());
//! engine.toggle();
//! // once per second:
//! if let Some(Event::TimerCompleted { .. }) = engine.tick() { /* ... */ }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::mode::{DurationConfig, TimerMode};
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Stopped,
    Running,
}

/// Core timer engine.
///
/// Invariant: `remaining_secs <= total_secs` and `total_secs > 0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerEngine {
    durations: DurationConfig,
    mode: TimerMode,
    /// Full duration of the current countdown, reloaded on switch/reset.
    total_secs: u64,
    remaining_secs: u64,
    running: bool,
}

impl TimerEngine {
    /// Create an engine in `Stopped`, focus mode, full focus duration.
    pub fn new(durations: DurationConfig) -> Self {
        let total_secs = durations.seconds(TimerMode::Focus);
        Self {
            durations,
            mode: TimerMode::Focus,
            total_secs,
            remaining_secs: total_secs,
            running: false,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        if self.running {
            TimerState::Running
        } else {
            TimerState::Stopped
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn total_secs(&self) -> u64 {
        self.total_secs
    }

    pub fn durations(&self) -> &DurationConfig {
        &self.durations
    }

    /// Fraction of the countdown still left, in `[0.0, 1.0]`.
    pub fn progress(&self) -> f64 {
        debug_assert!(self.total_secs > 0, "durations are clamped to at least a minute");
        (self.remaining_secs as f64 / self.total_secs as f64).clamp(0.0, 1.0)
    }

    /// Settings may only be edited while the countdown is stopped.
    pub fn can_edit_settings(&self) -> bool {
        !self.running
    }

    /// `mm:ss` rendering of the remaining time.
    pub fn clock(&self) -> String {
        format_clock(self.remaining_secs)
    }

    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            mode: self.mode,
            running: self.running,
            remaining_secs: self.remaining_secs,
            total_secs: self.total_secs,
            progress: self.progress(),
            can_edit_settings: self.can_edit_settings(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Stop, change mode and load that mode's full duration.
    pub fn switch_mode(&mut self, mode: TimerMode) -> Event {
        self.running = false;
        self.mode = mode;
        self.reload_total();
        Event::ModeSwitched {
            mode,
            total_secs: self.total_secs,
            at: Utc::now(),
        }
    }

    /// Start or pause.
    ///
    /// Starting a countdown that already reached zero reloads the full
    /// duration first, so a finished timer never runs for zero seconds.
    pub fn toggle(&mut self) -> Event {
        if self.running {
            self.running = false;
            return Event::TimerPaused {
                mode: self.mode,
                remaining_secs: self.remaining_secs,
                at: Utc::now(),
            };
        }

        if self.remaining_secs == 0 {
            self.remaining_secs = self.total_secs;
        }
        self.running = true;
        Event::TimerStarted {
            mode: self.mode,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        }
    }

    /// Stop and rewind to the full duration of the current mode. Durations
    /// applied while running take effect here.
    pub fn reset(&mut self) -> Event {
        self.running = false;
        self.reload_total();
        Event::TimerReset {
            mode: self.mode,
            total_secs: self.total_secs,
            at: Utc::now(),
        }
    }

    /// Call once per second. Returns `Some(Event::TimerCompleted)` exactly
    /// once, on the tick that brings the countdown to zero.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.running || self.remaining_secs == 0 {
            return None;
        }

        self.remaining_secs -= 1;
        if self.remaining_secs > 0 {
            return None;
        }

        self.running = false;
        Some(Event::TimerCompleted {
            mode: self.mode,
            duration_min: (self.total_secs / 60) as u32,
            at: Utc::now(),
        })
    }

    /// Replace the duration table. A stopped timer picks the new value up
    /// immediately; a running one keeps its countdown until the next
    /// switch/reset.
    pub fn apply_settings(&mut self, durations: DurationConfig) -> Event {
        self.durations = durations;
        let reset_active = !self.running;
        if reset_active {
            self.reload_total();
        }
        Event::SettingsApplied {
            durations,
            reset_active,
            at: Utc::now(),
        }
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn reload_total(&mut self) {
        self.total_secs = self.durations.seconds(self.mode);
        self.remaining_secs = self.total_secs;
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(DurationConfig::default())
    }
}

/// Format seconds as zero-padded `mm:ss`.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
