//! Doubt client: one question in, one displayable reply out.

use std::sync::Arc;
use std::time::Duration;

use indoc::indoc;
use tracing::{debug, warn};

use super::backend::{self, ChatBackend};
use super::types::{ChatReply, ChatTurn, PromptTurn};
use crate::error::ChatError;
use crate::storage::ChatConfig;

pub const SYSTEM_PROMPT: &str = indoc! {"
    You are an expert Physics Tutor for competitive exams (JEE, NEET, AP).
    Provide an EXTREMELY CONCISE, direct answer (max 2-3 sentences).
    Focus strictly on the formula, concept, or definition requested.
    Do not include conversational fillers.

    IMPORTANT FORMATTING RULES:
    1. Do NOT use LaTeX formatting or backslashes.
    2. Use standard Unicode symbols for math (e.g., '×', 'θ', 'π', '≈').
    3. Use simple text representation for powers (e.g. '10^-34', 'x^2').
"};

/// Shown when the backend answers with no text.
pub const EMPTY_ANSWER_PLACEHOLDER: &str = "I couldn't find a specific answer to that.";

pub const DEFAULT_HISTORY_WINDOW: usize = 5;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Built once at startup and cloned into whoever needs to ask.
#[derive(Clone)]
pub struct DoubtClient {
    backend: Arc<dyn ChatBackend>,
    system_prompt: String,
    history_window: usize,
    timeout: Duration,
}

impl DoubtClient {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            backend,
            system_prompt: SYSTEM_PROMPT.to_string(),
            history_window: DEFAULT_HISTORY_WINDOW,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn from_config(config: &ChatConfig) -> Self {
        Self::new(backend::from_config(config))
            .with_history_window(config.history_window)
            .with_timeout(config.timeout())
    }

    pub fn with_history_window(mut self, turns: usize) -> Self {
        self.history_window = turns;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Ask one question. Never fails: errors come back as a reply with
    /// `ok == false` and a message in `answer`.
    ///
    /// `question` is expected trimmed and non-empty; `history` holds the
    /// prior turns, oldest first, without the question itself.
    pub async fn ask(&self, question: &str, history: &[ChatTurn]) -> ChatReply {
        let turns = self.prompt_turns(question, history);
        debug!(
            backend = self.backend.name(),
            turns = turns.len(),
            "sending doubt"
        );

        let outcome = tokio::time::timeout(
            self.timeout,
            self.backend.send_chat_completion(&self.system_prompt, &turns),
        )
        .await
        .unwrap_or_else(|_| {
            Err(ChatError::Timeout {
                secs: self.timeout.as_secs(),
            })
        });

        match outcome {
            Ok(completion) => {
                let answer = if completion.text.trim().is_empty() {
                    EMPTY_ANSWER_PLACEHOLDER.to_string()
                } else {
                    completion.text
                };
                ChatReply::answered(answer, completion.citations)
            }
            Err(e) => {
                warn!(backend = self.backend.name(), error = %e, "doubt request failed");
                ChatReply::failed(e.user_message())
            }
        }
    }

    /// Most recent `history_window` turns followed by the question.
    fn prompt_turns(&self, question: &str, history: &[ChatTurn]) -> Vec<PromptTurn> {
        let start = history.len().saturating_sub(self.history_window);
        history[start..]
            .iter()
            .map(PromptTurn::from)
            .chain(std::iter::once(PromptTurn::user(question)))
            .collect()
    }
}
