//! Doubt solver: LLM-backed question answering with citations.

pub mod backend;
mod client;
pub mod gemini;
pub mod openai;
mod session;
mod types;

pub use backend::ChatBackend;
pub use client::{
    DoubtClient, DEFAULT_HISTORY_WINDOW, DEFAULT_TIMEOUT, EMPTY_ANSWER_PLACEHOLDER, SYSTEM_PROMPT,
};
pub use session::{AskTicket, ChatSession};
pub use types::{
    top_sources, ChatReply, ChatTurn, Completion, PromptTurn, Role, Sender, Source,
};
