
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Result;
use crate::config::ConfigError;
use crate::document::Document;

/// A bounded slice of document text, the unit of retrieval
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// The chunk text
    pub text: String,
    /// Position of this chunk across the whole document set
    pub chunk_index: usize,
    /// Offset of the first character within the source document, in chars
    pub char_offset: usize,
    /// Document the chunk was cut from
    pub source: PathBuf,
}

/// Configuration for fixed-window chunking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Window length in characters
    pub chunk_size: usize,
    /// Characters shared between adjacent windows
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
        }
    }
}

impl ChunkingConfig {
    /// Distance between the starts of two adjacent windows
    #[inline]
    pub fn stride(&self) -> Result<usize> {
        if self.chunk_size == 0 {
            return Err(ConfigError::InvalidChunkSize(self.chunk_size).into());
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(ConfigError::OverlapTooLarge(self.chunk_overlap, self.chunk_size).into());
        }
        Ok(self.chunk_size - self.chunk_overlap)
    }
}

/// Split every document into overlapping character windows.
///
/// Chunk indices run across the whole set in document order.
#[inline]
pub fn split_documents(documents: &[Document], config: &ChunkingConfig) -> Result<Vec<TextChunk>> {
    let mut chunks = Vec::new();

    for document in documents {
        for (offset, text) in split_text_with_offsets(&document.text, config)? {
            chunks.push(TextChunk {
                text,
                chunk_index: chunks.len(),
                char_offset: offset,
                source: document.source.clone(),
            });
        }
    }

    debug!(
        "Split {} documents into {} chunks (size {}, overlap {})",
        documents.len(),
        chunks.len(),
        config.chunk_size,
        config.chunk_overlap
    );

    Ok(chunks)
}

/// Split text into windows of at most `chunk_size` characters where each
/// window repeats the last `chunk_overlap` characters of the previous one.
/// Boundaries may fall mid-word.
#[inline]
pub fn split_text(text: &str, config: &ChunkingConfig) -> Result<Vec<String>> {
    Ok(split_text_with_offsets(text, config)?
        .into_iter()
        .map(|(_, chunk)| chunk)
        .collect())
}

#[expect(
    clippy::string_slice,
    reason = "every offset comes from char_indices so slices land on char boundaries"
)]
fn split_text_with_offsets(text: &str, config: &ChunkingConfig) -> Result<Vec<(usize, String)>> {
    let stride = config.stride()?;

    if text.is_empty() {
        return Ok(Vec::new());
    }

    // Byte offset of every char start, plus the end of the text
    let boundaries: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let char_count = boundaries.len() - 1;

    let mut windows = Vec::with_capacity(char_count.div_ceil(stride));
    let mut start = 0;
    loop {
        let end = (start + config.chunk_size).min(char_count);
        windows.push((start, text[boundaries[start]..boundaries[end]].to_string()));

        if end == char_count {
            break;
        }
        start += stride;
    }

    Ok(windows)
}
