use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Smallest configurable duration in minutes.
pub const MIN_DURATION_MIN: u32 = 1;
/// Largest configurable duration in minutes.
pub const MAX_DURATION_MIN: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerMode {
    Focus,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    pub const ALL: [TimerMode; 3] = [TimerMode::Focus, TimerMode::ShortBreak, TimerMode::LongBreak];

    /// Short label used by mode selectors.
    pub fn label(&self) -> &'static str {
        match self {
            TimerMode::Focus => "Focus",
            TimerMode::ShortBreak => "Short",
            TimerMode::LongBreak => "Long",
        }
    }

    /// Message shown when a countdown in this mode finishes.
    pub fn completion_message(&self) -> &'static str {
        match self {
            TimerMode::Focus => "Focus session complete!",
            TimerMode::ShortBreak | TimerMode::LongBreak => "Break over!",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimerMode::Focus => "focus",
            TimerMode::ShortBreak => "short_break",
            TimerMode::LongBreak => "long_break",
        }
    }
}

impl fmt::Display for TimerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "focus" | "f" => Ok(TimerMode::Focus),
            "short_break" | "short" | "s" => Ok(TimerMode::ShortBreak),
            "long_break" | "long" | "l" => Ok(TimerMode::LongBreak),
            other => Err(format!("unknown timer mode: {other}")),
        }
    }
}

/// Configured minutes per mode.
///
/// Every value is clamped to `[MIN_DURATION_MIN, MAX_DURATION_MIN]`, so a
/// derived `total_secs` is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawDurations")]
pub struct DurationConfig {
    focus: u32,
    short_break: u32,
    long_break: u32,
}

impl DurationConfig {
    pub fn new(focus: u32, short_break: u32, long_break: u32) -> Self {
        Self {
            focus: clamp_minutes(focus),
            short_break: clamp_minutes(short_break),
            long_break: clamp_minutes(long_break),
        }
    }

    pub fn minutes(&self, mode: TimerMode) -> u32 {
        match mode {
            TimerMode::Focus => self.focus,
            TimerMode::ShortBreak => self.short_break,
            TimerMode::LongBreak => self.long_break,
        }
    }

    pub fn seconds(&self, mode: TimerMode) -> u64 {
        u64::from(self.minutes(mode)) * 60
    }

    /// Copy with one mode's duration replaced.
    pub fn with(mut self, mode: TimerMode, minutes: u32) -> Self {
        let minutes = clamp_minutes(minutes);
        match mode {
            TimerMode::Focus => self.focus = minutes,
            TimerMode::ShortBreak => self.short_break = minutes,
            TimerMode::LongBreak => self.long_break = minutes,
        }
        self
    }
}

impl Default for DurationConfig {
    fn default() -> Self {
        Self::new(25, 5, 15)
    }
}

#[derive(Deserialize)]
struct RawDurations {
    focus: u32,
    short_break: u32,
    long_break: u32,
}

impl From<RawDurations> for DurationConfig {
    fn from(raw: RawDurations) -> Self {
        Self::new(raw.focus, raw.short_break, raw.long_break)
    }
}

fn clamp_minutes(minutes: u32) -> u32 {
    minutes.clamp(MIN_DURATION_MIN, MAX_DURATION_MIN)
}
