use super::*;

fn create_test_record(index: u32, vector: Vec<f32>) -> EmbeddingRecord {
    EmbeddingRecord {
        id: format!("record_{}", index),
        vector,
        metadata: ChunkMetadata {
            chunk_index: index,
            char_offset: index * 450,
            source: "speech.txt".to_string(),
            content: format!("This is test content for chunk {}", index),
        },
    }
}

fn axis_records() -> Vec<EmbeddingRecord> {
    vec![
        create_test_record(0, vec![1.0, 0.0, 0.0, 0.0]),
        create_test_record(1, vec![0.0, 1.0, 0.0, 0.0]),
        create_test_record(2, vec![0.0, 0.0, 1.0, 0.0]),
        create_test_record(3, vec![0.0, 0.0, 0.0, 1.0]),
        create_test_record(4, vec![0.9, 0.1, 0.0, 0.0]),
    ]
}

#[tokio::test]
async fn ephemeral_store_starts_unbuilt() {
    let store = VectorStore::ephemeral()
        .await
        .expect("should create vector store");

    assert_eq!(store.vector_dimension(), None);
    assert_eq!(
        store
            .count_embeddings()
            .await
            .expect("should count embeddings"),
        0
    );
}

#[tokio::test]
async fn ephemeral_directory_is_removed_on_drop() {
    let store = VectorStore::ephemeral()
        .await
        .expect("should create vector store");
    let scratch = store
        ._scratch
        .as_ref()
        .expect("ephemeral store should own a directory")
        .path()
        .to_path_buf();
    assert!(scratch.exists());

    drop(store);

    assert!(!scratch.exists());
}

#[tokio::test]
async fn build_index_stores_every_record() {
    let mut store = VectorStore::ephemeral()
        .await
        .expect("should create vector store");

    store
        .build_index(axis_records())
        .await
        .expect("should build index");

    assert_eq!(store.vector_dimension(), Some(4));
    assert_eq!(
        store
            .count_embeddings()
            .await
            .expect("should count embeddings"),
        5
    );
}

#[tokio::test]
async fn index_can_only_be_built_once() {
    let mut store = VectorStore::ephemeral()
        .await
        .expect("should create vector store");

    store
        .build_index(axis_records())
        .await
        .expect("should build index");

    let err = store
        .build_index(axis_records())
        .await
        .expect_err("second build should fail");
    assert!(matches!(err, QaError::IndexBuild(_)));
}

#[tokio::test]
async fn empty_build_is_rejected() {
    let mut store = VectorStore::ephemeral()
        .await
        .expect("should create vector store");

    let err = store
        .build_index(Vec::new())
        .await
        .expect_err("empty build should fail");
    assert!(matches!(err, QaError::IndexBuild(_)));
    assert_eq!(store.vector_dimension(), None);
}

#[tokio::test]
async fn inconsistent_dimensions_are_rejected() {
    let mut store = VectorStore::ephemeral()
        .await
        .expect("should create vector store");

    let records = vec![
        create_test_record(0, vec![1.0, 0.0, 0.0]),
        create_test_record(1, vec![1.0, 0.0]),
    ];

    let err = store
        .build_index(records)
        .await
        .expect_err("mismatched dimensions should fail");
    assert!(matches!(err, QaError::IndexBuild(_)));
}

#[tokio::test]
async fn search_returns_nearest_first() {
    let mut store = VectorStore::ephemeral()
        .await
        .expect("should create vector store");
    store
        .build_index(axis_records())
        .await
        .expect("should build index");

    let results = store
        .search_similar(&[1.0, 0.0, 0.0, 0.0], 2)
        .await
        .expect("search should succeed");

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].chunk_metadata.chunk_index, 0);
    assert_eq!(results[1].chunk_metadata.chunk_index, 4);
    assert!(results[0].distance <= results[1].distance);
    assert_eq!(
        results[0].chunk_metadata.content,
        "This is test content for chunk 0"
    );
}

#[tokio::test]
async fn search_limit_larger_than_index() {
    let mut store = VectorStore::ephemeral()
        .await
        .expect("should create vector store");
    store
        .build_index(vec![create_test_record(0, vec![0.5, 0.5])])
        .await
        .expect("should build index");

    let results = store
        .search_similar(&[0.0, 1.0], 4)
        .await
        .expect("search should succeed");

    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn search_before_build_is_retrieval_error() {
    let store = VectorStore::ephemeral()
        .await
        .expect("should create vector store");

    let err = store
        .search_similar(&[1.0, 0.0], 4)
        .await
        .expect_err("search before build should fail");
    assert!(matches!(err, QaError::Retrieval(_)));
}

#[tokio::test]
async fn query_dimension_mismatch_is_retrieval_error() {
    let mut store = VectorStore::ephemeral()
        .await
        .expect("should create vector store");
    store
        .build_index(axis_records())
        .await
        .expect("should build index");

    let err = store
        .search_similar(&[1.0, 0.0], 4)
        .await
        .expect_err("wrong query dimension should fail");
    assert!(matches!(err, QaError::Retrieval(_)));
}
