//! The retrieval-augmented chat pipeline.
//!
//! [`ChatPipeline`] coordinates the whole workflow: build or load the
//! persisted vector index, then answer questions by retrieving the top-K
//! relevant chunks, assembling a grounded prompt together with the
//! session's conversation history, and invoking the chat model.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use helpdesk_rag::{
//!     AssistantConfig, ChatPipeline, OpenAIChatModel, OpenAIEmbeddingProvider,
//!     RecursiveChunker, Session,
//! };
//!
//! let config = AssistantConfig::default();
//! let pipeline = ChatPipeline::builder()
//!     .config(config.clone())
//!     .embedding_provider(Arc::new(OpenAIEmbeddingProvider::from_env()?))
//!     .chat_model(Arc::new(OpenAIChatModel::from_env()?))
//!     .chunker(Arc::new(RecursiveChunker::new(config.chunk_size, config.chunk_overlap)))
//!     .build()?;
//!
//! pipeline.load_or_build("data/technical_docs").await?;
//!
//! let session = Session::new(config.max_history_turns);
//! let answer = pipeline.answer(&session, "How do I reset my API key?").await?;
//! println!("{}\nsources: {:?}", answer.text, answer.sources);
//! ```

use std::path::Path;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::chunking::Chunker;
use crate::config::AssistantConfig;
use crate::document::SearchResult;
use crate::embedding::EmbeddingProvider;
use crate::error::{HelpdeskError, Result};
use crate::generation::{ChatMessage, ChatModel, ChatRequest};
use crate::index::FlatVectorIndex;
use crate::loader;
use crate::memory::ConversationTurn;
use crate::session::Session;
use crate::vectorstore::VectorStore;

/// Instructions prepended to every grounded prompt.
const SYSTEM_PROMPT: &str = "You are a support assistant for a technical documentation corpus. \
     Answer the user's question using only the context excerpts below. \
     If the context does not contain the answer, say you do not know.";

/// A grounded answer with its cited sources.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    /// The generated answer text.
    pub text: String,
    /// Contributing source documents, deduplicated, most relevant first.
    pub sources: Vec<String>,
}

/// Deduplicate sources by document path, preserving descending-relevance
/// order.
fn dedupe_sources(results: &[SearchResult]) -> Vec<String> {
    let mut sources: Vec<String> = Vec::new();
    for result in results {
        let label = result.chunk.source().unwrap_or(&result.chunk.document_id);
        if !sources.iter().any(|s| s == label) {
            sources.push(label.to_string());
        }
    }
    sources
}

/// The retrieval-augmented chat pipeline.
///
/// Holds the shared, read-only index handle; per-user state lives in
/// [`Session`]s passed into [`answer`](ChatPipeline::answer). Rebuilding
/// the index builds a complete new handle and publishes it atomically —
/// in-flight queries keep the handle they started with.
pub struct ChatPipeline {
    config: AssistantConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    chat_model: Arc<dyn ChatModel>,
    chunker: Arc<dyn Chunker>,
    index: RwLock<Option<Arc<dyn VectorStore>>>,
}

impl ChatPipeline {
    /// Create a new [`ChatPipelineBuilder`].
    pub fn builder() -> ChatPipelineBuilder {
        ChatPipelineBuilder::default()
    }

    /// The pipeline configuration.
    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    /// Whether an index has been built or loaded.
    pub async fn is_ready(&self) -> bool {
        self.index.read().await.is_some()
    }

    /// Publish a fully built index, replacing any previous handle.
    async fn publish(&self, index: Arc<dyn VectorStore>) {
        *self.index.write().await = Some(index);
    }

    /// The current index handle.
    async fn current_index(&self) -> Result<Arc<dyn VectorStore>> {
        self.index.read().await.clone().ok_or(HelpdeskError::NotReady)
    }

    /// Build the index from a documents directory: load → chunk → embed →
    /// persist → publish. Returns the number of indexed chunks.
    ///
    /// # Errors
    ///
    /// Returns [`HelpdeskError::NotFound`] if the directory does not exist,
    /// [`HelpdeskError::Embedding`] if embedding fails, or an I/O error if
    /// persistence fails. On error the previous index (if any) stays
    /// published.
    pub async fn build_index(&self, docs_dir: impl AsRef<Path>) -> Result<usize> {
        let documents = loader::load_directory(docs_dir).await?;

        let mut chunks = Vec::new();
        for document in &documents {
            chunks.extend(self.chunker.chunk(document));
        }
        if chunks.is_empty() {
            warn!("corpus produced no chunks; index will be empty");
        }
        info!(documents = documents.len(), chunks = chunks.len(), "chunked corpus");

        let index = FlatVectorIndex::build(chunks, self.embedding_provider.as_ref()).await?;
        index.save(&self.config.index_path).await?;

        let count = index.count().await;
        self.publish(Arc::new(index)).await;
        Ok(count)
    }

    /// Load the persisted index from the configured storage path and
    /// publish it. Returns the number of indexed chunks.
    ///
    /// # Errors
    ///
    /// Returns [`HelpdeskError::IndexNotFound`] when no index has been
    /// persisted yet, or [`HelpdeskError::Index`] when the file exists but
    /// cannot be read back.
    pub async fn load_index(&self) -> Result<usize> {
        let index = FlatVectorIndex::load(&self.config.index_path).await?;
        let count = index.count().await;
        self.publish(Arc::new(index)).await;
        Ok(count)
    }

    /// Load the persisted index, falling back to a fresh build only when no
    /// index exists yet. Any other load failure (e.g. a corrupt file) is
    /// surfaced, not papered over by a rebuild.
    pub async fn load_or_build(&self, docs_dir: impl AsRef<Path>) -> Result<usize> {
        match self.load_index().await {
            Ok(count) => Ok(count),
            Err(HelpdeskError::IndexNotFound { path }) => {
                info!(path = %path.display(), "no persisted index; building from corpus");
                self.build_index(docs_dir).await
            }
            Err(e) => Err(e),
        }
    }

    /// Answer a question within a session.
    ///
    /// Retrieves the top-K chunks for the question, assembles a grounded
    /// prompt with the session's history window, invokes the chat model,
    /// and — only after generation succeeds — appends the new turns to the
    /// session. Dropping the returned future before completion therefore
    /// leaves the conversation history untouched.
    ///
    /// # Errors
    ///
    /// - [`HelpdeskError::Busy`] if the session is already answering
    /// - [`HelpdeskError::NotReady`] if no index has been built or loaded
    /// - [`HelpdeskError::Embedding`] / [`HelpdeskError::Generation`] for
    ///   provider failures, surfaced verbatim
    pub async fn answer(&self, session: &Session, question: &str) -> Result<Answer> {
        let mut memory = session.claim()?;
        let index = self.current_index().await?;

        let query_embedding = self.embedding_provider.embed(question).await?;
        let results = index.search(&query_embedding, self.config.retrieval_k).await?;
        let sources = dedupe_sources(&results);

        let request = self.assemble_request(&results, memory.window(), question);
        let text = self.chat_model.generate(request).await?;

        // History is only touched once generation has succeeded, so a
        // cancelled call never records a partial turn.
        memory.push(ConversationTurn::user(question));
        memory.push(ConversationTurn::assistant(text.clone(), sources.clone()));

        info!(retrieved = results.len(), sources = sources.len(), "answered question");
        Ok(Answer { text, sources })
    }

    /// Assemble the grounded prompt: system context from the retrieved
    /// chunks, the history window, then the new question.
    fn assemble_request(
        &self,
        results: &[SearchResult],
        history: &[ConversationTurn],
        question: &str,
    ) -> ChatRequest {
        let mut system = String::from(SYSTEM_PROMPT);
        for result in results {
            let label = result.chunk.source().unwrap_or(&result.chunk.document_id);
            system.push_str("\n\n[");
            system.push_str(label);
            system.push_str("]\n");
            system.push_str(&result.chunk.text);
        }

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(system));
        messages.extend(
            history.iter().map(|turn| ChatMessage { role: turn.role, content: turn.content.clone() }),
        );
        messages.push(ChatMessage::user(question));

        ChatRequest {
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }
}

/// Builder for constructing a [`ChatPipeline`].
///
/// All fields are required. Call [`build()`](ChatPipelineBuilder::build) to
/// validate and produce the pipeline.
#[derive(Default)]
pub struct ChatPipelineBuilder {
    config: Option<AssistantConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    chat_model: Option<Arc<dyn ChatModel>>,
    chunker: Option<Arc<dyn Chunker>>,
}

impl ChatPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: AssistantConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the chat model.
    pub fn chat_model(mut self, model: Arc<dyn ChatModel>) -> Self {
        self.chat_model = Some(model);
        self
    }

    /// Set the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Build the [`ChatPipeline`], validating that all fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`HelpdeskError::Config`] if any field is missing.
    pub fn build(self) -> Result<ChatPipeline> {
        let config =
            self.config.ok_or_else(|| HelpdeskError::Config("config is required".to_string()))?;
        let embedding_provider = self.embedding_provider.ok_or_else(|| {
            HelpdeskError::Config("embedding_provider is required".to_string())
        })?;
        let chat_model = self
            .chat_model
            .ok_or_else(|| HelpdeskError::Config("chat_model is required".to_string()))?;
        let chunker = self
            .chunker
            .ok_or_else(|| HelpdeskError::Config("chunker is required".to_string()))?;

        Ok(ChatPipeline {
            config,
            embedding_provider,
            chat_model,
            chunker,
            index: RwLock::new(None),
        })
    }
}
