//! Wires the [`TimerEngine`] to a tick source and its completion side effects.
//!
//! The controller keeps one invariant the bare engine cannot: the tick
//! source is armed if and only if the engine is running. Every command
//! re-syncs it, and dropping the controller drops the interval.

use tracing::{debug, info, warn};

use super::engine::TimerEngine;
use super::mode::{DurationConfig, TimerMode};
use super::ticker::TickSource;
use crate::error::AlertError;
use crate::events::Event;

/// User-facing side effects of a finished countdown.
pub trait Alerter {
    /// Audible alarm. Fire-and-forget; an error is reported, never fatal.
    fn play_alarm(&mut self) -> Result<(), AlertError>;

    /// Blocking notification the user has to see.
    fn announce(&mut self, message: &str);

    /// Non-blocking notice, e.g. that the alarm could not be played.
    fn warn(&mut self, message: &str);
}

/// Receives `(mode, duration_min)` on natural completion only.
pub trait SessionSink {
    fn session_completed(&mut self, mode: TimerMode, duration_min: u32);
}

impl<F> SessionSink for F
where
    F: FnMut(TimerMode, u32),
{
    fn session_completed(&mut self, mode: TimerMode, duration_min: u32) {
        self(mode, duration_min)
    }
}

pub struct TimerController<A, S> {
    engine: TimerEngine,
    ticks: TickSource,
    alerter: A,
    sink: S,
}

impl<A: Alerter, S: SessionSink> TimerController<A, S> {
    pub fn new(engine: TimerEngine, alerter: A, sink: S) -> Self {
        let mut controller = Self {
            engine,
            ticks: TickSource::every_second(),
            alerter,
            sink,
        };
        controller.sync_ticks();
        controller
    }

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn alerter(&self) -> &A {
        &self.alerter
    }

    pub fn is_ticking(&self) -> bool {
        self.ticks.is_armed()
    }

    pub fn switch_mode(&mut self, mode: TimerMode) -> Event {
        let event = self.engine.switch_mode(mode);
        self.sync_ticks();
        event
    }

    pub fn toggle(&mut self) -> Event {
        let event = self.engine.toggle();
        self.sync_ticks();
        event
    }

    pub fn reset(&mut self) -> Event {
        let event = self.engine.reset();
        self.sync_ticks();
        event
    }

    pub fn apply_settings(&mut self, durations: DurationConfig) -> Event {
        let event = self.engine.apply_settings(durations);
        self.sync_ticks();
        event
    }

    /// Play the alarm on demand, e.g. to check the audio output. A failure
    /// is reported through the alerter's warning channel.
    pub fn test_alarm(&mut self) -> Result<(), AlertError> {
        let outcome = self.alerter.play_alarm();
        if let Err(e) = &outcome {
            self.report_alarm_failure(e);
        }
        outcome
    }

    /// Wait for the next scheduled tick and apply it. Never resolves while
    /// the timer is stopped, so it can sit in a `select!` unconditionally.
    pub async fn next_tick(&mut self) -> Option<Event> {
        self.ticks.tick().await;
        self.handle_tick()
    }

    /// Apply one tick and, on completion, run the side effects in order:
    /// alarm, blocking announcement, session callback.
    pub fn handle_tick(&mut self) -> Option<Event> {
        let event = self.engine.tick();
        self.sync_ticks();

        if let Some(Event::TimerCompleted {
            mode, duration_min, ..
        }) = &event
        {
            self.complete(*mode, *duration_min);
        }
        event
    }

    fn complete(&mut self, mode: TimerMode, duration_min: u32) {
        info!(%mode, duration_min, "countdown completed");

        if let Err(e) = self.alerter.play_alarm() {
            self.report_alarm_failure(&e);
        }
        self.alerter.announce(mode.completion_message());
        self.sink.session_completed(mode, duration_min);
    }

    fn report_alarm_failure(&mut self, error: &AlertError) {
        warn!(%error, "alarm failed");
        self.alerter
            .warn(&format!("Alarm failed to play ({error}). Check your audio output."));
    }

    fn sync_ticks(&mut self) {
        match (self.engine.is_running(), self.ticks.is_armed()) {
            (true, false) => {
                debug!("arming tick source");
                self.ticks.arm();
            }
            (false, true) => {
                debug!("disarming tick source");
                self.ticks.disarm();
            }
            _ => {}
        }
    }
}
