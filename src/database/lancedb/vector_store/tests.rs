use super::*;
use tempfile::TempDir;

const DIMENSION: usize = 4;

fn test_uri(temp_dir: &TempDir) -> String {
    temp_dir.path().join("vectors").display().to_string()
}

async fn create_test_store(temp_dir: &TempDir) -> VectorStore {
    VectorStore::open(&test_uri(temp_dir), "cooking-test", DIMENSION)
        .await
        .expect("should open vector store")
}

fn create_test_record(text: &str, source: &str, chunk_id: u32, vector: [f32; 4]) -> StoredRecord {
    StoredRecord::new(
        DocumentChunk {
            text: text.to_string(),
            metadata: ChunkMetadata {
                source_type: "pdf".to_string(),
                source_name: source.to_string(),
                page: Some(chunk_id / 2),
                chunk_id,
            },
        },
        vector.to_vec(),
    )
}

fn pantry_records() -> Vec<StoredRecord> {
    vec![
        create_test_record("Boil the pasta in salted water.", "pasta.pdf", 0, [1.0, 0.0, 0.0, 0.0]),
        create_test_record("Frost the cake once cool.", "cakes.pdf", 1, [0.0, 1.0, 0.0, 0.0]),
        create_test_record("Drain the pasta and toss with sauce.", "pasta.pdf", 2, [0.9, 0.1, 0.0, 0.0]),
        create_test_record("Blend the soup until smooth.", "soups.pdf", 3, [0.0, 0.0, 1.0, 0.0]),
    ]
}

#[tokio::test]
async fn vector_store_initialization() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let store = create_test_store(&temp_dir).await;

    assert_eq!(store.index_name(), "cooking-test");
    assert_eq!(store.dimension(), DIMENSION);
    assert_eq!(store.count().await.expect("should count rows"), 0);
}

#[tokio::test]
async fn reopening_is_idempotent() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let store = create_test_store(&temp_dir).await;
    store
        .add_records(&pantry_records())
        .await
        .expect("should store records");

    let reopened = create_test_store(&temp_dir).await;

    assert_eq!(reopened.count().await.expect("should count rows"), 4);
    let tables = reopened.table_names().await.expect("should list tables");
    assert_eq!(tables, vec!["cooking-test".to_string()]);
}

#[tokio::test]
async fn reopening_with_other_dimension_fails() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let _store = create_test_store(&temp_dir).await;

    let result = VectorStore::open(&test_uri(&temp_dir), "cooking-test", 8).await;

    match result {
        Err(AssistantError::DimensionMismatch {
            existing,
            requested,
            ..
        }) => {
            assert_eq!(existing, DIMENSION);
            assert_eq!(requested, 8);
        }
        other => panic!("expected dimension mismatch, got {:?}", other),
    }
}

#[tokio::test]
async fn zero_dimension_is_rejected() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let result = VectorStore::open(&test_uri(&temp_dir), "cooking-test", 0).await;

    assert!(matches!(result, Err(AssistantError::Config(_))));
}

#[tokio::test]
async fn add_records_returns_count() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let store = create_test_store(&temp_dir).await;

    let stored = store
        .add_records(&pantry_records())
        .await
        .expect("should store records");
    let empty = store.add_records(&[]).await.expect("empty add is fine");

    assert_eq!(stored, 4);
    assert_eq!(empty, 0);
    assert_eq!(store.count().await.expect("should count rows"), 4);
}

#[tokio::test]
async fn add_records_rejects_wrong_width() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let store = create_test_store(&temp_dir).await;

    let mut record = create_test_record("Too wide", "bad.pdf", 0, [1.0, 0.0, 0.0, 0.0]);
    record.vector.push(0.5);

    let result = store.add_records(&[record]).await;

    assert!(matches!(
        result,
        Err(AssistantError::DimensionMismatch { requested: 5, .. })
    ));
    assert_eq!(store.count().await.expect("should count rows"), 0);
}

#[tokio::test]
async fn search_orders_by_cosine_distance() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let store = create_test_store(&temp_dir).await;
    store
        .add_records(&pantry_records())
        .await
        .expect("should store records");

    let hits = store
        .search(&[1.0, 0.0, 0.0, 0.0], 2)
        .await
        .expect("search should succeed");

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].chunk.text, "Boil the pasta in salted water.");
    assert_eq!(hits[1].chunk.text, "Drain the pasta and toss with sauce.");
    assert!(hits[0].distance <= hits[1].distance);
    assert!(hits[0].distance.abs() < 1e-4);
}

#[tokio::test]
async fn search_is_scale_invariant() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let store = create_test_store(&temp_dir).await;
    store
        .add_records(&pantry_records())
        .await
        .expect("should store records");

    let hits = store
        .search(&[0.0, 0.0, 25.0, 0.0], 1)
        .await
        .expect("search should succeed");

    assert_eq!(hits[0].chunk.source_name(), "soups.pdf");
}

#[tokio::test]
async fn search_round_trips_metadata() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let store = create_test_store(&temp_dir).await;

    let mut record = create_test_record("Preheat the oven.", "cakes.pdf", 5, [0.0, 0.0, 0.0, 1.0]);
    record.chunk.metadata.page = None;
    store
        .add_records(std::slice::from_ref(&record))
        .await
        .expect("should store record");

    let hits = store
        .search(&[0.0, 0.0, 0.0, 1.0], 5)
        .await
        .expect("search should succeed");

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].chunk, record.chunk);
}

#[tokio::test]
async fn search_returns_at_most_available_records() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let store = create_test_store(&temp_dir).await;
    store
        .add_records(&pantry_records())
        .await
        .expect("should store records");

    let hits = store
        .search(&[0.5, 0.5, 0.5, 0.5], 10)
        .await
        .expect("search should succeed");

    assert_eq!(hits.len(), 4);
}

#[tokio::test]
async fn search_empty_store_or_zero_k_is_empty() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let store = create_test_store(&temp_dir).await;

    let empty = store
        .search(&[1.0, 0.0, 0.0, 0.0], 5)
        .await
        .expect("search should succeed");
    assert!(empty.is_empty());

    store
        .add_records(&pantry_records())
        .await
        .expect("should store records");
    let none = store
        .search(&[1.0, 0.0, 0.0, 0.0], 0)
        .await
        .expect("search should succeed");
    assert!(none.is_empty());
}

#[tokio::test]
async fn search_rejects_wrong_query_width() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let store = create_test_store(&temp_dir).await;

    let result = store.search(&[1.0, 0.0], 3).await;

    assert!(matches!(
        result,
        Err(AssistantError::DimensionMismatch { requested: 2, .. })
    ));
}

#[test]
fn schema_has_nullable_page_and_fixed_vector() {
    let schema = record_schema(384);

    assert_eq!(vector_dimension(&schema), Some(384));
    let page = schema.field_with_name("page").expect("page column");
    assert!(page.is_nullable());
    let text = schema.field_with_name("text").expect("text column");
    assert!(!text.is_nullable());
}
