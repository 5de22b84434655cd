use std::time::Duration;

use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Periodic tick source that only exists while armed.
///
/// Disarming drops the underlying interval, so no tick can fire after the
/// timer stops. `tick()` on a disarmed source never resolves, which lets it
/// sit in a `select!` unconditionally.
#[derive(Debug)]
pub struct TickSource {
    period: Duration,
    state: Armed,
}

#[derive(Debug)]
enum Armed {
    No,
    /// Armed at this instant; the interval is built on first poll so arming
    /// works outside a runtime.
    Since(Instant),
    Ticking(Interval),
}

impl TickSource {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            state: Armed::No,
        }
    }

    pub fn every_second() -> Self {
        Self::new(Duration::from_secs(1))
    }

    pub fn is_armed(&self) -> bool {
        !matches!(self.state, Armed::No)
    }

    /// First tick fires one full period after arming.
    pub fn arm(&mut self) {
        if let Armed::No = self.state {
            self.state = Armed::Since(Instant::now());
        }
    }

    pub fn disarm(&mut self) {
        self.state = Armed::No;
    }

    /// Wait for the next tick. Cancel-safe.
    pub async fn tick(&mut self) {
        if let Armed::Since(start) = self.state {
            let mut interval = interval_at(start + self.period, self.period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            self.state = Armed::Ticking(interval);
        }
        match &mut self.state {
            Armed::Ticking(interval) => {
                interval.tick().await;
            }
            _ => std::future::pending::<()>().await,
        }
    }
}
