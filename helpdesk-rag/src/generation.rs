//! Chat-model seam: the language-generation capability behind the pipeline.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The author of a chat message or conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Instructions and grounding context.
    System,
    /// The human asking questions.
    User,
    /// The model's replies.
    Assistant,
}

/// A single message in a chat request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    /// Who authored the message.
    pub role: Role,
    /// The message text.
    pub content: String,
}

impl ChatMessage {
    /// A system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    /// A user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    /// An assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// A fully assembled generation request.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// Ordered messages: grounding context, prior turns, then the question.
    pub messages: Vec<ChatMessage>,
    /// Sampling temperature, 0 = deterministic.
    pub temperature: f32,
    /// Maximum output length in tokens.
    pub max_tokens: u32,
}

/// A chat model that completes a conversation.
///
/// The call may take arbitrary wall-clock time; callers treat it as a
/// blocking operation and may cancel it by dropping the future. The
/// pipeline guarantees that a cancelled call leaves conversation memory
/// untouched.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generate a completion for the request.
    async fn generate(&self, request: ChatRequest) -> Result<String>;
}
