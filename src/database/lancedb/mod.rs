// LanceDB vector database module
// Handles vector storage and similarity search for chunk embeddings


pub mod vector_store;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::embeddings::chunking::TextChunk;

pub use vector_store::{SearchResult, VectorStore};

/// Embedding record stored in LanceDB
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRecord {
    /// Unique identifier for this embedding
    pub id: String,
    /// The vector embedding
    pub vector: Vec<f32>,
    /// Metadata about the chunk this embedding represents
    pub metadata: ChunkMetadata,
}

/// Metadata for a chunk stored alongside its embedding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Position of the chunk across the document set
    pub chunk_index: u32,
    /// Character offset of the chunk within its document
    pub char_offset: u32,
    /// Path of the source document
    pub source: String,
    /// The actual text content of the chunk
    pub content: String,
}

impl EmbeddingRecord {
    /// Pair a chunk with its embedding under a fresh id
    #[inline]
    pub fn from_chunk(chunk: &TextChunk, vector: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            vector,
            metadata: ChunkMetadata {
                chunk_index: u32::try_from(chunk.chunk_index).unwrap_or(u32::MAX),
                char_offset: u32::try_from(chunk.char_offset).unwrap_or(u32::MAX),
                source: chunk.source.display().to_string(),
                content: chunk.text.clone(),
            },
        }
    }
}
