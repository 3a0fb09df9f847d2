#[cfg(test)]
mod tests;

use super::{ChunkMetadata, EmbeddingRecord};
use crate::QaError;
use arrow::array::{
    Array, FixedSizeListArray, Float32Array, RecordBatchIterator, StringArray, UInt32Array,
};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use futures::TryStreamExt;
use lancedb::{
    Connection, Table,
    query::{ExecutableQuery, QueryBase},
};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tracing::{debug, info};

const TABLE_NAME: &str = "chunks";

/// Vector index over document chunks, built once and then only searched
pub struct VectorStore {
    connection: Connection,
    table: Option<Table>,
    vector_dimension: Option<usize>,
    // Keeps a per-run scratch directory alive until the store is dropped
    _scratch: Option<TempDir>,
}

/// Search result from vector similarity search
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub chunk_metadata: ChunkMetadata,
    /// L2 distance to the query vector, smaller is nearer
    pub distance: f32,
}

impl VectorStore {
    /// Open a LanceDB database at the given directory
    ///
    /// # Arguments
    /// * `db_path` - Directory holding the LanceDB files
    ///
    /// # Returns
    /// * `Result<Self, QaError>` - New VectorStore instance or error
    #[inline]
    pub async fn new(db_path: &Path) -> Result<Self, QaError> {
        debug!("Initializing LanceDB at path: {:?}", db_path);

        std::fs::create_dir_all(db_path).map_err(|e| {
            QaError::IndexBuild(format!("Failed to create vector database directory: {}", e))
        })?;

        let uri = format!("file://{}", db_path.display());
        let connection = lancedb::connect(&uri)
            .execute()
            .await
            .map_err(|e| QaError::IndexBuild(format!("Failed to connect to LanceDB: {}", e)))?;

        Ok(Self {
            connection,
            table: None,
            vector_dimension: None,
            _scratch: None,
        })
    }

    /// Open a store in a temporary directory that is removed when the store
    /// is dropped
    #[inline]
    pub async fn ephemeral() -> Result<Self, QaError> {
        let scratch = tempfile::Builder::new()
            .prefix("ambedkar-gpt-index-")
            .tempdir()
            .map_err(|e| {
                QaError::IndexBuild(format!("Failed to create temporary index directory: {}", e))
            })?;

        let mut store = Self::new(scratch.path()).await?;
        store._scratch = Some(scratch);
        Ok(store)
    }

    /// Vector dimension of the built index, if any
    #[inline]
    pub fn vector_dimension(&self) -> Option<usize> {
        self.vector_dimension
    }

    /// Create schema with the specified vector dimension
    fn create_schema(vector_dim: usize) -> Result<Arc<Schema>, QaError> {
        let list_size = i32::try_from(vector_dim).map_err(|_| {
            QaError::IndexBuild(format!("Vector dimension {} is too large", vector_dim))
        })?;

        Ok(Arc::new(Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new(
                "vector",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, false)),
                    list_size,
                ),
                false,
            ),
            Field::new("chunk_index", DataType::UInt32, false),
            Field::new("char_offset", DataType::UInt32, false),
            Field::new("source", DataType::Utf8, false),
            Field::new("content", DataType::Utf8, false),
        ])))
    }

    /// Build the index from every record in one batch
    ///
    /// The index can only be built once; any failure leaves the store unbuilt.
    ///
    /// # Arguments
    /// * `records` - Embedding records for all chunks
    ///
    /// # Returns
    /// * `Result<(), QaError>` - Success or error
    #[inline]
    pub async fn build_index(&mut self, records: Vec<EmbeddingRecord>) -> Result<(), QaError> {
        if self.table.is_some() {
            return Err(QaError::IndexBuild(
                "Vector index has already been built".to_string(),
            ));
        }

        let vector_dim = records
            .first()
            .map(|record| record.vector.len())
            .ok_or_else(|| QaError::IndexBuild("No embeddings to index".to_string()))?;

        if vector_dim == 0 {
            return Err(QaError::IndexBuild("Embeddings are empty".to_string()));
        }

        if let Some(bad) = records.iter().find(|r| r.vector.len() != vector_dim) {
            return Err(QaError::IndexBuild(format!(
                "Inconsistent embedding dimensions: expected {}, chunk {} has {}",
                vector_dim,
                bad.metadata.chunk_index,
                bad.vector.len()
            )));
        }

        debug!(
            "Building vector index from {} embeddings ({} dimensions)",
            records.len(),
            vector_dim
        );

        let record_batch = Self::create_record_batch(&records, vector_dim)?;
        let schema = record_batch.schema();
        let reader = RecordBatchIterator::new(std::iter::once(Ok(record_batch)), schema);

        let table = self
            .connection
            .create_table(TABLE_NAME, reader)
            .execute()
            .await
            .map_err(|e| QaError::IndexBuild(format!("Failed to create table: {}", e)))?;

        self.table = Some(table);
        self.vector_dimension = Some(vector_dim);

        info!("Vector index built with {} embeddings", records.len());
        Ok(())
    }

    /// Create a RecordBatch from embedding records
    fn create_record_batch(
        records: &[EmbeddingRecord],
        vector_dim: usize,
    ) -> Result<RecordBatch, QaError> {
        let len = records.len();

        let mut ids = Vec::with_capacity(len);
        let mut flat_values = Vec::with_capacity(len * vector_dim);
        let mut chunk_indices = Vec::with_capacity(len);
        let mut char_offsets = Vec::with_capacity(len);
        let mut sources = Vec::with_capacity(len);
        let mut contents = Vec::with_capacity(len);

        for record in records {
            ids.push(record.id.as_str());
            flat_values.extend_from_slice(&record.vector);
            chunk_indices.push(record.metadata.chunk_index);
            char_offsets.push(record.metadata.char_offset);
            sources.push(record.metadata.source.as_str());
            contents.push(record.metadata.content.as_str());
        }

        let schema = Self::create_schema(vector_dim)?;

        let values_array = Float32Array::from(flat_values);
        let field = Arc::new(Field::new("item", DataType::Float32, false));
        let list_size = i32::try_from(vector_dim).map_err(|_| {
            QaError::IndexBuild(format!("Vector dimension {} is too large", vector_dim))
        })?;
        let vector_array =
            FixedSizeListArray::try_new(field, list_size, Arc::new(values_array), None).map_err(
                |e| QaError::IndexBuild(format!("Failed to create vector array: {}", e)),
            )?;

        let arrays: Vec<Arc<dyn Array>> = vec![
            Arc::new(StringArray::from(ids)),
            Arc::new(vector_array),
            Arc::new(UInt32Array::from(chunk_indices)),
            Arc::new(UInt32Array::from(char_offsets)),
            Arc::new(StringArray::from(sources)),
            Arc::new(StringArray::from(contents)),
        ];

        RecordBatch::try_new(schema, arrays)
            .map_err(|e| QaError::IndexBuild(format!("Failed to create record batch: {}", e)))
    }

    fn built_table(&self) -> Result<&Table, QaError> {
        self.table
            .as_ref()
            .ok_or_else(|| QaError::Retrieval("Vector index has not been built".to_string()))
    }

    /// Search for the chunks nearest to a query vector
    ///
    /// # Arguments
    /// * `query_vector` - The query vector to search for
    /// * `limit` - Maximum number of results to return
    ///
    /// # Returns
    /// * `Result<Vec<SearchResult>, QaError>` - Results ordered nearest first
    #[inline]
    pub async fn search_similar(
        &self,
        query_vector: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>, QaError> {
        debug!("Searching for similar vectors with limit: {}", limit);

        let table = self.built_table()?;

        if let Some(dim) = self.vector_dimension {
            if query_vector.len() != dim {
                return Err(QaError::Retrieval(format!(
                    "Query vector has {} dimensions, index has {}",
                    query_vector.len(),
                    dim
                )));
            }
        }

        let results = table
            .vector_search(query_vector)
            .map_err(|e| QaError::Retrieval(format!("Failed to create vector search: {}", e)))?
            .column("vector")
            .limit(limit)
            .execute()
            .await
            .map_err(|e| QaError::Retrieval(format!("Failed to execute search: {}", e)))?;

        let mut search_results = Self::parse_search_results_stream(results).await?;
        search_results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        search_results.truncate(limit);

        Ok(search_results)
    }

    /// Parse search results from LanceDB stream into SearchResult structs
    async fn parse_search_results_stream(
        mut results: lancedb::arrow::SendableRecordBatchStream,
    ) -> Result<Vec<SearchResult>, QaError> {
        let mut search_results = Vec::new();

        while let Some(batch_result) = results
            .try_next()
            .await
            .map_err(|e| QaError::Retrieval(format!("Failed to read result stream: {}", e)))?
        {
            search_results.extend(Self::parse_search_batch(&batch_result)?);
        }

        debug!("Parsed {} search results from stream", search_results.len());
        Ok(search_results)
    }

    fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray, QaError> {
        batch
            .column_by_name(name)
            .ok_or_else(|| QaError::Retrieval(format!("Missing {} column", name)))?
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| QaError::Retrieval(format!("Invalid {} column type", name)))
    }

    fn u32_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a UInt32Array, QaError> {
        batch
            .column_by_name(name)
            .ok_or_else(|| QaError::Retrieval(format!("Missing {} column", name)))?
            .as_any()
            .downcast_ref::<UInt32Array>()
            .ok_or_else(|| QaError::Retrieval(format!("Invalid {} column type", name)))
    }

    /// Parse a single record batch from search results
    fn parse_search_batch(batch: &RecordBatch) -> Result<Vec<SearchResult>, QaError> {
        let chunk_indices = Self::u32_column(batch, "chunk_index")?;
        let char_offsets = Self::u32_column(batch, "char_offset")?;
        let sources = Self::string_column(batch, "source")?;
        let contents = Self::string_column(batch, "content")?;

        let distances = batch
            .column_by_name("_distance")
            .and_then(|col| col.as_any().downcast_ref::<Float32Array>());

        let search_results = (0..batch.num_rows())
            .map(|row| {
                let distance =
                    distances.map_or(0.0, |d| if d.is_null(row) { 0.0 } else { d.value(row) });

                SearchResult {
                    chunk_metadata: ChunkMetadata {
                        chunk_index: chunk_indices.value(row),
                        char_offset: char_offsets.value(row),
                        source: sources.value(row).to_string(),
                        content: contents.value(row).to_string(),
                    },
                    distance,
                }
            })
            .collect();

        Ok(search_results)
    }

    /// Get the total number of embeddings stored
    #[inline]
    pub async fn count_embeddings(&self) -> Result<u64, QaError> {
        let Some(table) = self.table.as_ref() else {
            return Ok(0);
        };

        let count = table
            .count_rows(None)
            .await
            .map_err(|e| QaError::Retrieval(format!("Failed to count rows: {}", e)))?;

        Ok(count as u64)
    }
}
