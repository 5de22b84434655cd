//! # PhysFocus Core Library
//!
//! Core logic for the PhysFocus study companion. The CLI is a thin layer
//! over the same types.
//!
//! ## Architecture
//!
//! - **Timer**: a one-second countdown state machine plus a controller that
//!   owns the tick source and fires completion side effects
//! - **Sessions**: in-memory, append-only log of completed countdowns
//! - **Notes**: scratch text and a to-do list
//! - **Chat**: doubt client over a swappable LLM backend, and the
//!   caller-side session that guards in-flight and stale replies
//! - **Storage**: TOML configuration
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: countdown state machine
//! - [`TimerController`]: engine + tick source + alerts + session callback
//! - [`SessionRecorder`]: completed session log and focus statistics
//! - [`DoubtClient`]: one question in, one displayable reply out
//! - [`Config`]: application configuration

pub mod chat;
pub mod error;
pub mod events;
pub mod notes;
pub mod session;
pub mod storage;
pub mod timer;

pub use chat::{ChatBackend, ChatReply, ChatSession, ChatTurn, DoubtClient, Source};
pub use error::{AlertError, ChatError, ConfigError, SubmitError};
pub use events::Event;
pub use notes::{NotesPanel, TodoItem, TodoList};
pub use session::{FocusStats, SessionRecorder, StudySession};
pub use storage::Config;
pub use timer::{
    Alerter, DurationConfig, SessionSink, TimerController, TimerEngine, TimerMode, TimerState,
};
