use std::io;
use std::path::Path;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::config::{Config, get_config_dir};
use crate::embeddings::OllamaClient;
use crate::pipeline::{RagPipeline, build_vector_store, load_chunks};
use crate::session::run_session;
use crate::{QaError, Result};

/// Load configuration from the given directory, or the platform default
#[inline]
pub fn load_config(config_dir: Option<&Path>) -> Result<Config> {
    let config_dir = match config_dir {
        Some(dir) => dir.to_path_buf(),
        None => get_config_dir()?,
    };
    debug!("Loading configuration from {}", config_dir.display());

    Config::load(&config_dir).map_err(|e| QaError::Config(format!("{e:#}")))
}

/// Build the answer pipeline and run the interactive session on the console
#[inline]
pub async fn run_qa(config: &Config) -> Result<()> {
    config.validate()?;

    let chunks = load_chunks(config)?;

    println!("Loading embeddings model...");
    let client = OllamaClient::new(&config.ollama)
        .map_err(|e| QaError::Config(format!("{e:#}")))?;
    client
        .health_check()
        .map_err(|e| QaError::Dependency(format!("{e:#}")))?;

    println!("Creating vector store...");
    let spinner = embedding_spinner(chunks.len(), client.embedding_model());
    let store = build_vector_store(&client, &chunks).await;
    spinner.finish_and_clear();
    let store = store?;
    info!(
        "Vector store holds {} chunks",
        store.count_embeddings().await?
    );

    println!("Initializing Ollama LLM...");
    let pipeline = RagPipeline::new(client.clone(), client, store, config.retrieval.top_k);

    let summary = run_session(&pipeline, io::stdin().lock(), io::stdout().lock()).await?;
    info!(
        "Answered {} questions ({} failed)",
        summary.answered, summary.failed
    );

    Ok(())
}

fn embedding_spinner(chunk_count: usize, model: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Embedding {} chunks with {}", chunk_count, model));
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}
