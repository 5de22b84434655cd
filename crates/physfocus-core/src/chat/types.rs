use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sender {
    User,
    Ai,
}

/// A citation returned alongside an answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub uri: String,
}

/// One entry of a chat transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub id: Uuid,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Source>,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            sender: Sender::User,
            timestamp: Utc::now(),
            sources: Vec::new(),
        }
    }

    pub fn ai(text: impl Into<String>, sources: Vec<Source>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            sender: Sender::Ai,
            timestamp: Utc::now(),
            sources,
        }
    }
}

/// Result of one doubt round trip. Failures are folded in: `ok == false`
/// means `answer` holds an error message and `sources` is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub answer: String,
    pub sources: Vec<Source>,
    pub ok: bool,
}

impl ChatReply {
    pub fn answered(answer: impl Into<String>, sources: Vec<Source>) -> Self {
        Self {
            answer: answer.into(),
            sources,
            ok: true,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            answer: message.into(),
            sources: Vec::new(),
            ok: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// Provider-neutral message handed to a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTurn {
    pub role: Role,
    pub text: String,
}

impl PromptTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
        }
    }
}

impl From<&ChatTurn> for PromptTurn {
    fn from(turn: &ChatTurn) -> Self {
        let role = match turn.sender {
            Sender::User => Role::User,
            Sender::Ai => Role::Assistant,
        };
        Self {
            role,
            text: turn.text.clone(),
        }
    }
}

/// Raw backend output before placeholder substitution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub citations: Vec<Source>,
}

/// Display helper: drop repeated URIs and keep the first `limit` sources.
pub fn top_sources(sources: &[Source], limit: usize) -> Vec<&Source> {
    let mut seen = std::collections::HashSet::new();
    sources
        .iter()
        .filter(|s| seen.insert(s.uri.as_str()))
        .take(limit)
        .collect()
}
