// Retrieval-augmented answer pipeline
// Startup builds the index once; each question then runs
// retrieve -> join -> render -> generate


use async_trait::async_trait;
use itertools::Itertools;
use tracing::{debug, info};

use crate::config::Config;
use crate::database::lancedb::{EmbeddingRecord, SearchResult, VectorStore};
use crate::document::load_documents;
use crate::embeddings::Embedder;
use crate::embeddings::chunking::{TextChunk, split_documents};
use crate::generation::Generator;
use crate::prompt::PromptTemplate;
use crate::{QaError, Result};

/// Separator placed between retrieved chunk texts
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Anything that can answer a single free-text question
#[async_trait]
pub trait Answerer: Send + Sync {
    async fn answer(&self, question: &str) -> Result<String>;
}

/// Load the configured document and cut it into chunks.
///
/// Fails with [`QaError::MissingDocument`] or [`QaError::EmptyDocumentSet`]
/// before any model is contacted.
#[inline]
pub fn load_chunks(config: &Config) -> Result<Vec<TextChunk>> {
    let path = &config.document.path;
    let documents = load_documents(path)?;
    if documents.is_empty() {
        return Err(QaError::EmptyDocumentSet(path.clone()));
    }

    let chunks = split_documents(&documents, &config.chunking)?;
    if chunks.is_empty() {
        return Err(QaError::EmptyDocumentSet(path.clone()));
    }

    info!("Prepared {} chunks from {}", chunks.len(), path.display());
    Ok(chunks)
}

/// Embed every chunk in one pass and build the vector index over them.
/// Any failure aborts the whole build.
#[inline]
pub async fn build_vector_store<E: Embedder>(
    embedder: &E,
    chunks: &[TextChunk],
) -> Result<VectorStore> {
    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();

    let vectors = embedder
        .embed_documents(&texts)
        .map_err(|e| QaError::Embedding(format!("{e:#}")))?;

    if vectors.len() != chunks.len() {
        return Err(QaError::Embedding(format!(
            "Expected {} embeddings, received {}",
            chunks.len(),
            vectors.len()
        )));
    }

    let records = chunks
        .iter()
        .zip(vectors)
        .map(|(chunk, vector)| EmbeddingRecord::from_chunk(chunk, vector))
        .collect();

    let mut store = VectorStore::ephemeral().await?;
    store.build_index(records).await?;
    Ok(store)
}

/// Join retrieved chunk texts in retrieval order
#[inline]
pub fn format_context(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|r| r.chunk_metadata.content.as_str())
        .join(CONTEXT_SEPARATOR)
}

/// The assembled question-answering chain. Immutable once built.
pub struct RagPipeline<E, G> {
    embedder: E,
    generator: G,
    store: VectorStore,
    template: PromptTemplate,
    top_k: usize,
}

impl<E, G> RagPipeline<E, G>
where
    E: Embedder + Send + Sync,
    G: Generator + Send + Sync,
{
    #[inline]
    pub fn new(embedder: E, generator: G, store: VectorStore, top_k: usize) -> Self {
        Self {
            embedder,
            generator,
            store,
            template: PromptTemplate::default(),
            top_k,
        }
    }

    #[inline]
    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    /// Run the full startup phase: load, chunk, embed and index
    #[inline]
    pub async fn build(config: &Config, embedder: E, generator: G) -> Result<Self> {
        let chunks = load_chunks(config)?;
        let store = build_vector_store(&embedder, &chunks).await?;
        Ok(Self::new(embedder, generator, store, config.retrieval.top_k))
    }

    #[inline]
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Fetch the `top_k` chunks nearest to the question
    #[inline]
    pub async fn retrieve(&self, question: &str) -> Result<Vec<SearchResult>> {
        let query_vector = self
            .embedder
            .embed_query(question)
            .map_err(|e| QaError::Embedding(format!("{e:#}")))?;

        let results = self.store.search_similar(&query_vector, self.top_k).await?;
        debug!("Retrieved {} chunks for question", results.len());
        Ok(results)
    }

    /// Retrieve context for the question and fill the prompt template
    #[inline]
    pub async fn render_prompt(&self, question: &str) -> Result<String> {
        let results = self.retrieve(question).await?;
        let context = format_context(&results);
        Ok(self.template.render(&context, question))
    }
}

#[async_trait]
impl<E, G> Answerer for RagPipeline<E, G>
where
    E: Embedder + Send + Sync,
    G: Generator + Send + Sync,
{
    async fn answer(&self, question: &str) -> Result<String> {
        let prompt = self.render_prompt(question).await?;

        debug!("Invoking {} for answer", self.generator.model_name());
        self.generator
            .generate(&prompt)
            .map_err(|e| QaError::Generation(format!("{e:#}")))
    }
}
