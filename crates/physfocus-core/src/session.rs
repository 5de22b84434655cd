//! In-memory, append-only log of completed countdowns.
//!
//! Records live for the process lifetime only. The recorder doubles as the
//! timer's [`SessionSink`], so it is what a controller usually owns.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{SessionSink, TimerMode};

/// One completed, uninterrupted countdown. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudySession {
    pub timestamp: DateTime<Utc>,
    pub mode: TimerMode,
    pub duration_min: u32,
}

/// Focus minutes for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyFocus {
    /// Short weekday name ("Mon", "Tue", ...).
    pub day: String,
    pub minutes: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FocusStats {
    pub total_sessions: usize,
    pub focus_sessions: usize,
    pub total_focus_min: u32,
    pub hours: u32,
    pub minutes: u32,
    /// Up to the last 7 days with focus time, oldest first.
    pub daily: Vec<DailyFocus>,
}

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];
const DAILY_WINDOW: usize = 7;

#[derive(Debug, Default)]
pub struct SessionRecorder {
    sessions: Vec<StudySession>,
}

impl SessionRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a session stamped now.
    pub fn record(&mut self, mode: TimerMode, duration_min: u32) -> &StudySession {
        self.record_at(mode, duration_min, Utc::now())
    }

    pub fn record_at(
        &mut self,
        mode: TimerMode,
        duration_min: u32,
        timestamp: DateTime<Utc>,
    ) -> &StudySession {
        self.sessions.push(StudySession {
            timestamp,
            mode,
            duration_min,
        });
        &self.sessions[self.sessions.len() - 1]
    }

    pub fn sessions(&self) -> &[StudySession] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Aggregate focus time. Break sessions are counted in
    /// `total_sessions` but contribute no minutes.
    pub fn stats(&self) -> FocusStats {
        let mut per_day: BTreeMap<NaiveDate, u32> = BTreeMap::new();
        let mut total_focus_min = 0;
        let mut focus_sessions = 0;

        for session in self.sessions.iter().filter(|s| s.mode == TimerMode::Focus) {
            focus_sessions += 1;
            total_focus_min += session.duration_min;
            *per_day.entry(session.timestamp.date_naive()).or_default() += session.duration_min;
        }

        let mut daily: Vec<DailyFocus> = per_day
            .iter()
            .rev()
            .take(DAILY_WINDOW)
            .rev()
            .map(|(date, minutes)| DailyFocus {
                day: weekday_name(*date).to_string(),
                minutes: *minutes,
            })
            .collect();

        if daily.is_empty() {
            daily = WEEKDAYS
                .iter()
                .map(|day| DailyFocus {
                    day: day.to_string(),
                    minutes: 0,
                })
                .collect();
        }

        FocusStats {
            total_sessions: self.sessions.len(),
            focus_sessions,
            total_focus_min,
            hours: total_focus_min / 60,
            minutes: total_focus_min % 60,
            daily,
        }
    }
}

impl SessionSink for SessionRecorder {
    fn session_completed(&mut self, mode: TimerMode, duration_min: u32) {
        self.record(mode, duration_min);
    }
}

fn weekday_name(date: NaiveDate) -> &'static str {
    WEEKDAYS[date.weekday().num_days_from_monday() as usize]
}
