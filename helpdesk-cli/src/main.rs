//! Command-line surface for the Helpdesk assistant.
//!
//! Three subcommands: `index` builds (or rebuilds) the persisted vector
//! index from a documents directory, `ask` answers a single question, and
//! `chat` starts an interactive session with conversation memory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use helpdesk_rag::{
    Answer, AssistantConfig, ChatPipeline, OpenAIChatModel, OpenAIEmbeddingProvider,
    RecursiveChunker, Session,
};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

#[derive(Parser)]
#[command(name = "helpdesk")]
#[command(about = "Retrieval-augmented chat assistant for a technical-document corpus")]
#[command(version)]
struct Cli {
    /// Storage path for the persisted vector index
    #[arg(long, global = true, default_value = "index/helpdesk.json")]
    index_path: PathBuf,

    /// Chat model identifier
    #[arg(long, global = true, default_value = "gpt-3.5-turbo")]
    chat_model: String,

    /// Embedding model identifier
    #[arg(long, global = true, default_value = "text-embedding-3-small")]
    embedding_model: String,

    /// Sampling temperature (0 = deterministic)
    #[arg(long, global = true, default_value_t = 0.7)]
    temperature: f32,

    /// Number of chunks retrieved per question
    #[arg(long, global = true, default_value_t = 3)]
    retrieval_k: usize,

    /// Maximum chunk size in characters
    #[arg(long, global = true, default_value_t = 1000)]
    chunk_size: usize,

    /// Overlap between consecutive chunks in characters
    #[arg(long, global = true, default_value_t = 200)]
    chunk_overlap: usize,

    /// Conversation turns kept in the prompt window
    #[arg(long, global = true, default_value_t = 20)]
    max_history_turns: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build (or rebuild) the persisted index from a documents directory
    Index {
        /// Directory of documents to ingest (txt, md, pdf)
        #[arg(long)]
        docs: PathBuf,
    },
    /// Ask a single question against the persisted index
    Ask {
        /// The question to answer
        question: String,
        /// Build the index from this directory if none is persisted yet
        #[arg(long)]
        docs: Option<PathBuf>,
    },
    /// Start an interactive chat session
    Chat {
        /// Build the index from this directory if none is persisted yet
        #[arg(long)]
        docs: Option<PathBuf>,
    },
}

impl Cli {
    fn config(&self) -> helpdesk_rag::Result<AssistantConfig> {
        AssistantConfig::builder()
            .chunk_size(self.chunk_size)
            .chunk_overlap(self.chunk_overlap)
            .retrieval_k(self.retrieval_k)
            .embedding_model(&self.embedding_model)
            .chat_model(&self.chat_model)
            .temperature(self.temperature)
            .index_path(&self.index_path)
            .max_history_turns(self.max_history_turns)
            .build()
    }
}

fn build_pipeline(config: &AssistantConfig) -> anyhow::Result<ChatPipeline> {
    let embedding_provider = OpenAIEmbeddingProvider::from_env()
        .context("embedding provider needs OPENAI_API_KEY")?
        .with_model(&config.embedding_model, 1536);
    let chat_model = OpenAIChatModel::from_env()
        .context("chat model needs OPENAI_API_KEY")?
        .with_model(&config.chat_model);

    let pipeline = ChatPipeline::builder()
        .config(config.clone())
        .embedding_provider(Arc::new(embedding_provider))
        .chat_model(Arc::new(chat_model))
        .chunker(Arc::new(RecursiveChunker::new(config.chunk_size, config.chunk_overlap)))
        .build()?;

    Ok(pipeline)
}

/// Load the persisted index, building it from `docs` when allowed.
async fn prepare_index(pipeline: &ChatPipeline, docs: Option<&Path>) -> anyhow::Result<()> {
    match docs {
        Some(dir) => {
            pipeline.load_or_build(dir).await?;
        }
        None => {
            pipeline
                .load_index()
                .await
                .context("no usable index; run `helpdesk index --docs <dir>` first")?;
        }
    }
    Ok(())
}

fn print_answer(answer: &Answer) {
    println!("{}", answer.text);
    if !answer.sources.is_empty() {
        println!();
        println!("Sources:");
        for (i, source) in answer.sources.iter().enumerate() {
            println!("  {}. {source}", i + 1);
        }
    }
}

async fn run_chat(pipeline: &ChatPipeline, config: &AssistantConfig) -> anyhow::Result<()> {
    let session = Session::new(config.max_history_turns);
    let mut editor = DefaultEditor::new()?;

    println!("Helpdesk assistant ready. `/reset` clears history, `/quit` exits.");
    loop {
        match editor.readline("you> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(line);

                match line {
                    "/quit" | "/exit" => break,
                    "/reset" => {
                        session.reset().await;
                        println!("History cleared.");
                    }
                    question => match pipeline.answer(&session, question).await {
                        Ok(answer) => print_answer(&answer),
                        Err(err) => eprintln!("error: {err}"),
                    },
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = cli.config()?;
    let pipeline = build_pipeline(&config)?;

    match &cli.command {
        Commands::Index { docs } => {
            let count = pipeline.build_index(docs).await?;
            println!("Indexed {count} chunks into {}", config.index_path.display());
        }
        Commands::Ask { question, docs } => {
            prepare_index(&pipeline, docs.as_deref()).await?;
            let session = Session::new(config.max_history_turns);
            let answer = pipeline.answer(&session, question).await?;
            print_answer(&answer);
        }
        Commands::Chat { docs } => {
            prepare_index(&pipeline, docs.as_deref()).await?;
            run_chat(&pipeline, &config).await?;
        }
    }

    Ok(())
}
