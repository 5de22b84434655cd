//! Caller-side chat surface state.
//!
//! A [`ChatSession`] owns the transcript and guards the one outstanding
//! request it allows. Requests are tagged with a generation; once the
//! session restarts or closes, replies carrying an older generation are
//! dropped instead of being applied to a conversation that moved on.

use serde::Serialize;
use tracing::debug;

use super::client::DoubtClient;
use super::types::{ChatReply, ChatTurn};
use crate::error::SubmitError;

/// Everything needed to run a request away from the session.
#[derive(Debug, Clone)]
pub struct AskTicket {
    pub generation: u64,
    pub question: String,
    /// Transcript before the question, oldest first.
    pub history: Vec<ChatTurn>,
}

impl AskTicket {
    /// Run the request this ticket describes.
    pub async fn run(&self, client: &DoubtClient) -> ChatReply {
        client.ask(&self.question, &self.history).await
    }
}

#[derive(Debug, Default, Serialize)]
pub struct ChatSession {
    transcript: Vec<ChatTurn>,
    in_flight: bool,
    generation: u64,
    closed: bool,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an AI greeting in the transcript.
    pub fn with_greeting(text: &str) -> Self {
        let mut session = Self::new();
        session.transcript.push(ChatTurn::ai(text, Vec::new()));
        session
    }

    pub fn transcript(&self) -> &[ChatTurn] {
        &self.transcript
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Accept a question: trim it, append the user turn, and mark a request
    /// as outstanding.
    ///
    /// # Errors
    ///
    /// Rejects blank input, a second question while one is outstanding, and
    /// any input after [`close`](Self::close).
    pub fn begin(&mut self, input: &str) -> Result<AskTicket, SubmitError> {
        if self.closed {
            return Err(SubmitError::Closed);
        }
        let question = input.trim();
        if question.is_empty() {
            return Err(SubmitError::Empty);
        }
        if self.in_flight {
            return Err(SubmitError::Busy);
        }

        let history = self.transcript.clone();
        self.transcript.push(ChatTurn::user(question));
        self.in_flight = true;
        Ok(AskTicket {
            generation: self.generation,
            question: question.to_string(),
            history,
        })
    }

    /// Apply a reply for `generation`. Returns `false` (and changes nothing)
    /// when the reply is stale or the session is closed.
    pub fn finish(&mut self, generation: u64, reply: ChatReply) -> bool {
        if self.closed || generation != self.generation {
            debug!(
                generation,
                current = self.generation,
                closed = self.closed,
                "discarding stale chat reply"
            );
            return false;
        }
        self.transcript.push(ChatTurn::ai(reply.answer, reply.sources));
        self.in_flight = false;
        true
    }

    /// Begin, ask and finish in one go.
    pub async fn ask(&mut self, client: &DoubtClient, input: &str) -> Result<&ChatTurn, SubmitError> {
        let ticket = self.begin(input)?;
        let reply = ticket.run(client).await;
        self.finish(ticket.generation, reply);
        self.transcript.last().ok_or(SubmitError::Closed)
    }

    /// Start a fresh conversation. An outstanding request becomes stale.
    pub fn restart(&mut self) {
        self.generation += 1;
        self.transcript.clear();
        self.in_flight = false;
    }

    /// Tear down: every later reply is discarded and no new question is
    /// accepted.
    pub fn close(&mut self) {
        self.generation += 1;
        self.closed = true;
        self.in_flight = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_trims_and_records_user_turn() {
        let mut chat = ChatSession::with_greeting("Ask me anything.");
        let ticket = chat.begin("  What is g?  ").unwrap();
        assert_eq!(ticket.question, "What is g?");
        assert_eq!(ticket.history.len(), 1);
        assert_eq!(chat.transcript().len(), 2);
        assert!(chat.is_in_flight());
    }

    #[test]
    fn blank_and_overlapping_submissions_are_rejected() {
        let mut chat = ChatSession::new();
        assert_eq!(chat.begin("   ").unwrap_err(), SubmitError::Empty);
        chat.begin("first").unwrap();
        assert_eq!(chat.begin("second").unwrap_err(), SubmitError::Busy);
        assert_eq!(chat.transcript().len(), 1);
    }

    #[test]
    fn finish_appends_ai_turn_and_clears_flag() {
        let mut chat = ChatSession::new();
        let ticket = chat.begin("q").unwrap();
        assert!(chat.finish(ticket.generation, ChatReply::answered("a", vec![])));
        assert!(!chat.is_in_flight());
        assert_eq!(chat.transcript()[1].text, "a");
        assert!(chat.begin("again").is_ok());
    }

    #[test]
    fn stale_reply_after_restart_is_discarded() {
        let mut chat = ChatSession::new();
        let first = chat.begin("old question").unwrap();
        chat.restart();
        let second = chat.begin("new question").unwrap();

        assert!(chat.finish(second.generation, ChatReply::answered("new answer", vec![])));
        assert!(!chat.finish(first.generation, ChatReply::answered("old answer", vec![])));

        let texts: Vec<_> = chat.transcript().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["new question", "new answer"]);
    }

    #[test]
    fn closed_session_discards_and_rejects() {
        let mut chat = ChatSession::new();
        let ticket = chat.begin("q").unwrap();
        chat.close();
        assert!(!chat.finish(ticket.generation, ChatReply::answered("a", vec![])));
        assert_eq!(chat.transcript().len(), 1);
        assert_eq!(chat.begin("q2").unwrap_err(), SubmitError::Closed);
    }
}
