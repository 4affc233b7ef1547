//! Configuration for the assistant pipeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{HelpdeskError, Result};

/// Configuration parameters for indexing and answering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssistantConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of chunks retrieved per question.
    pub retrieval_k: usize,
    /// Embedding model identifier.
    pub embedding_model: String,
    /// Chat model identifier.
    pub chat_model: String,
    /// Sampling temperature, 0 = deterministic.
    pub temperature: f32,
    /// Maximum answer length in tokens.
    pub max_tokens: u32,
    /// Storage path for the persisted vector index.
    pub index_path: PathBuf,
    /// Sliding-window bound on the conversation turns fed into each prompt.
    pub max_history_turns: usize,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            retrieval_k: 3,
            embedding_model: "text-embedding-3-small".to_string(),
            chat_model: "gpt-3.5-turbo".to_string(),
            temperature: 0.7,
            max_tokens: 500,
            index_path: PathBuf::from("index/helpdesk.json"),
            max_history_turns: 20,
        }
    }
}

impl AssistantConfig {
    /// Create a new builder for constructing a validated config.
    pub fn builder() -> AssistantConfigBuilder {
        AssistantConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`AssistantConfig`].
#[derive(Debug, Clone, Default)]
pub struct AssistantConfigBuilder {
    config: AssistantConfig,
}

impl AssistantConfigBuilder {
    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of chunks retrieved per question.
    pub fn retrieval_k(mut self, k: usize) -> Self {
        self.config.retrieval_k = k;
        self
    }

    /// Set the embedding model identifier.
    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        self.config.embedding_model = model.into();
        self
    }

    /// Set the chat model identifier.
    pub fn chat_model(mut self, model: impl Into<String>) -> Self {
        self.config.chat_model = model.into();
        self
    }

    /// Set the sampling temperature (0–2).
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = temperature;
        self
    }

    /// Set the maximum answer length in tokens.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    /// Set the storage path for the persisted vector index.
    pub fn index_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.index_path = path.into();
        self
    }

    /// Set the sliding-window bound on prompt history.
    pub fn max_history_turns(mut self, turns: usize) -> Self {
        self.config.max_history_turns = turns;
        self
    }

    /// Build the config, validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`HelpdeskError::Config`] if:
    /// - `chunk_overlap >= chunk_size`
    /// - `retrieval_k == 0`
    /// - `temperature` is outside `0.0..=2.0`
    /// - `max_history_turns == 0`
    pub fn build(self) -> Result<AssistantConfig> {
        let config = self.config;
        if config.chunk_overlap >= config.chunk_size {
            return Err(HelpdeskError::Config(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                config.chunk_overlap, config.chunk_size
            )));
        }
        if config.retrieval_k == 0 {
            return Err(HelpdeskError::Config("retrieval_k must be at least 1".to_string()));
        }
        if !(0.0..=2.0).contains(&config.temperature) {
            return Err(HelpdeskError::Config(format!(
                "temperature ({}) must be between 0 and 2",
                config.temperature
            )));
        }
        if config.max_history_turns == 0 {
            return Err(HelpdeskError::Config("max_history_turns must be at least 1".to_string()));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AssistantConfig::builder().build().unwrap();
        assert_eq!(config, AssistantConfig::default());
    }

    #[test]
    fn overlap_must_be_smaller_than_chunk_size() {
        let err =
            AssistantConfig::builder().chunk_size(10).chunk_overlap(10).build().unwrap_err();
        assert!(matches!(err, HelpdeskError::Config(_)));
    }

    #[test]
    fn retrieval_k_must_be_positive() {
        let err = AssistantConfig::builder().retrieval_k(0).build().unwrap_err();
        assert!(matches!(err, HelpdeskError::Config(_)));
    }

    #[test]
    fn temperature_is_range_checked() {
        let err = AssistantConfig::builder().temperature(2.5).build().unwrap_err();
        assert!(matches!(err, HelpdeskError::Config(_)));
        assert!(AssistantConfig::builder().temperature(0.0).build().is_ok());
    }

    #[test]
    fn history_bound_must_be_positive() {
        let err = AssistantConfig::builder().max_history_turns(0).build().unwrap_err();
        assert!(matches!(err, HelpdeskError::Config(_)));
    }
}
