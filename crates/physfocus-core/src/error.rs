//! Core error types for physfocus-core.
//!
//! Chat errors never cross the [`DoubtClient`](crate::chat::DoubtClient)
//! boundary; they are converted into a displayable reply via
//! [`ChatError::user_message`].

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// The home/config directory could not be determined
    #[error("Could not determine configuration directory")]
    NoConfigDir,
}

/// Failures of a single doubt/chat round trip.
#[derive(Error, Debug)]
pub enum ChatError {
    /// No API key in config or environment.
    #[error("API key not configured (set {env_var})")]
    MissingApiKey { env_var: String },

    /// Backend rejected the credential (401/403).
    #[error("API key rejected by backend (HTTP {status})")]
    InvalidCredentials { status: u16 },

    /// Backend quota or rate limit exhausted.
    #[error("Rate limited by backend: {0}")]
    RateLimited(String),

    /// Request exceeded the configured deadline.
    #[error("Request timed out after {secs}s")]
    Timeout { secs: u64 },

    /// Network failure or non-2xx response.
    #[error("Transport error{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Transport { status: Option<u16>, message: String },

    /// Response body did not have the expected shape.
    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("{0}")]
    Unknown(String),
}

impl ChatError {
    /// Human-readable text shown in place of an answer.
    pub fn user_message(&self) -> String {
        match self {
            ChatError::MissingApiKey { env_var } => format!(
                "The AI tutor is not configured: set the {env_var} environment variable \
                 (or chat.api_key in config.toml) to your API key."
            ),
            ChatError::InvalidCredentials { .. } => {
                "The AI tutor is not configured correctly: the API key was rejected. \
                 Check your API key."
                    .to_string()
            }
            ChatError::RateLimited(_) => {
                "The AI tutor is busy right now (rate limit or quota reached). \
                 Please try again in a minute."
                    .to_string()
            }
            ChatError::Timeout { .. } => {
                "The AI tutor took too long to respond. Please try again.".to_string()
            }
            ChatError::Transport { .. } => {
                "Connection error. Please check your internet connection.".to_string()
            }
            ChatError::Malformed(_) | ChatError::Unknown(_) => {
                "Something went wrong while asking the AI tutor. Please try again.".to_string()
            }
        }
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ChatError::Malformed(err.to_string())
        } else if err.is_builder() {
            ChatError::Unknown(err.to_string())
        } else {
            ChatError::Transport {
                status: err.status().map(|s| s.as_u16()),
                message: err.to_string(),
            }
        }
    }
}

/// Failure of the audible completion alert. Never fatal.
#[derive(Error, Debug)]
pub enum AlertError {
    #[error("audio output unavailable: {0}")]
    Unavailable(String),

    #[error("audio output failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Rejections raised by a chat session before any request is issued.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("question is empty")]
    Empty,

    #[error("a question is already being answered")]
    Busy,

    #[error("chat session is closed")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_errors_say_not_configured() {
        let missing = ChatError::MissingApiKey {
            env_var: "GEMINI_API_KEY".into(),
        };
        assert!(missing.user_message().contains("not configured"));
        assert!(missing.user_message().contains("GEMINI_API_KEY"));
        assert!(ChatError::InvalidCredentials { status: 401 }
            .user_message()
            .contains("not configured"));
    }

    #[test]
    fn messages_are_distinct_per_category() {
        let messages = [
            ChatError::MissingApiKey { env_var: "K".into() }.user_message(),
            ChatError::RateLimited(String::new()).user_message(),
            ChatError::Timeout { secs: 30 }.user_message(),
            ChatError::Transport {
                status: Some(500),
                message: String::new(),
            }
            .user_message(),
            ChatError::Unknown(String::new()).user_message(),
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in messages.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn transport_display_includes_status() {
        let err = ChatError::Transport {
            status: Some(503),
            message: "unavailable".into(),
        };
        assert_eq!(err.to_string(), "Transport error (HTTP 503): unavailable");

        let err = ChatError::Transport {
            status: None,
            message: "dns".into(),
        };
        assert_eq!(err.to_string(), "Transport error: dns");
    }
}
