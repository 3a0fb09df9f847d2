// Embeddings module
// Character-window chunking and the Ollama embedding client

pub mod chunking;
pub mod ollama;

use anyhow::Result;

pub use chunking::{ChunkingConfig, TextChunk, split_documents, split_text};
pub use ollama::OllamaClient;

/// Maps text to fixed-length vectors for similarity search
pub trait Embedder {
    /// Embed a batch of chunk texts, one vector per input in input order
    fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single question
    fn embed_query(&self, text: &str) -> Result<Vec<f32>>;
}
