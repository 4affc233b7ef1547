//! Conversation memory: the ordered dialogue history fed back into each
//! query.

use serde::{Deserialize, Serialize};

use crate::generation::Role;

/// One turn of the conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationTurn {
    /// Who spoke: [`Role::User`] or [`Role::Assistant`].
    pub role: Role,
    /// The turn text.
    pub content: String,
    /// Source labels cited by an assistant turn; empty for user turns.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
}

impl ConversationTurn {
    /// A user question.
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into(), sources: Vec::new() }
    }

    /// An assistant answer with its cited sources.
    pub fn assistant(content: impl Into<String>, sources: Vec<String>) -> Self {
        Self { role: Role::Assistant, content: content.into(), sources }
    }
}

/// Append-only conversation history with a sliding-window prompt bound.
///
/// The full history is retained for display; only the last
/// `max_window_turns` turns are fed into a prompt via [`window`].
///
/// [`window`]: ConversationMemory::window
#[derive(Debug, Clone)]
pub struct ConversationMemory {
    turns: Vec<ConversationTurn>,
    max_window_turns: usize,
}

impl ConversationMemory {
    /// Create an empty memory whose prompt window holds at most
    /// `max_window_turns` turns.
    pub fn new(max_window_turns: usize) -> Self {
        Self { turns: Vec::new(), max_window_turns }
    }

    /// Append a turn.
    pub fn push(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    /// The full history, oldest first.
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// The most recent turns, bounded by the configured window.
    pub fn window(&self) -> &[ConversationTurn] {
        let start = self.turns.len().saturating_sub(self.max_window_turns);
        &self.turns[start..]
    }

    /// The number of recorded turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether no turns have been recorded.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Clear all history.
    pub fn reset(&mut self) {
        self.turns.clear();
    }
}
