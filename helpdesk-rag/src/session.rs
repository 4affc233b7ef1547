//! Per-session context passed into every pipeline call.
//!
//! A [`Session`] owns one conversation memory. Sessions are created by the
//! caller and have no process-wide registry; many sessions may question the
//! same pipeline concurrently, each serialized internally so history is
//! never interleaved.

use tokio::sync::{Mutex, MutexGuard};

use crate::error::{HelpdeskError, Result};
use crate::memory::{ConversationMemory, ConversationTurn};

/// A single user's conversation with the assistant.
#[derive(Debug)]
pub struct Session {
    memory: Mutex<ConversationMemory>,
}

impl Session {
    /// Create a session whose prompt window holds at most
    /// `max_history_turns` turns.
    pub fn new(max_history_turns: usize) -> Self {
        Self { memory: Mutex::new(ConversationMemory::new(max_history_turns)) }
    }

    /// Claim exclusive use of the session for one `answer` call.
    ///
    /// Non-blocking: a concurrent claim fails with [`HelpdeskError::Busy`]
    /// rather than interleaving two answers over the same history.
    pub(crate) fn claim(&self) -> Result<MutexGuard<'_, ConversationMemory>> {
        self.memory.try_lock().map_err(|_| HelpdeskError::Busy)
    }

    /// A snapshot of the full conversation history.
    pub async fn history(&self) -> Vec<ConversationTurn> {
        self.memory.lock().await.turns().to_vec()
    }

    /// The number of recorded turns.
    pub async fn turn_count(&self) -> usize {
        self.memory.lock().await.len()
    }

    /// Clear the conversation history.
    pub async fn reset(&self) {
        self.memory.lock().await.reset();
    }
}
