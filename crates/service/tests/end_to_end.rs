use docvec_service::{
    DocumentService, IngestStatus, Payload, SearchConfig, SearchOutcome, ServiceError,
    UploadedFile,
};
use docvec_text_chunker::{ChunkerConfig, TextChunker};
use docvec_vector_store::{HashingEmbedder, StoreConfig, VectorStore};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use tempfile::TempDir;

const DIM: usize = 128;

async fn service(dir: &TempDir, chunk_size: usize, top_k: Option<usize>) -> DocumentService {
    let store = VectorStore::open(StoreConfig::in_dir(dir.path()), DIM)
        .await
        .expect("open store");
    DocumentService::new(
        Arc::new(store),
        TextChunker::new(ChunkerConfig { chunk_size }).expect("chunker"),
        Arc::new(HashingEmbedder::new(DIM).expect("embedder")),
        SearchConfig { top_k },
    )
    .await
    .expect("service")
}

#[tokio::test]
async fn ingest_document_then_find_exact_chunk() {
    let tmp = TempDir::new().expect("tempdir");
    let service = service(&tmp, 500, None).await;

    let result = service
        .ingest(
            "greeting.json",
            Payload::Json(br#"{"a": "hello world", "b": ["foo", "bar"]}"#.to_vec()),
        )
        .await;
    assert_eq!(result.status, IngestStatus::Success);
    assert_eq!(result.chunks_processed, Some(3));

    let stats = service.stats().await;
    assert_eq!((stats.count, stats.metadata_size), (3, 3));
    let mut file_ids = Vec::new();
    for position in 0..3 {
        let record = service.store().record(position).await.expect("record");
        file_ids.push(record.file_id);
    }
    assert!(file_ids.iter().all(|id| *id == file_ids[0]));

    let SearchOutcome::Hits(hits) = service.search("hello world").await.expect("search") else {
        panic!("store should be ready");
    };
    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0].metadata.chunk, "hello world");
    assert_eq!(hits[0].metadata.source, "greeting.json");
    assert!(hits[0].score.abs() < 1e-6);
}

#[tokio::test]
async fn scalar_json_fails_without_touching_index() {
    let tmp = TempDir::new().expect("tempdir");
    let service = service(&tmp, 500, None).await;

    let result = service.ingest("n.json", Payload::Json(b"42".to_vec())).await;
    assert_eq!(result.status, IngestStatus::Failed);
    assert_eq!(result.error.as_deref(), Some("Expected JSON object or array"));
    assert_eq!(service.stats().await.count, 0);

    let result = service.ingest("bad.json", Payload::Json(b"{oops".to_vec())).await;
    assert_eq!(result.status, IngestStatus::Failed);
    assert_eq!(result.error.as_deref(), Some("Invalid JSON format"));
}

#[tokio::test]
async fn document_without_text_is_skipped() {
    let tmp = TempDir::new().expect("tempdir");
    let service = service(&tmp, 500, None).await;

    let result = service
        .ingest("numbers.json", Payload::Json(br#"{"a": [1, 2, 3]}"#.to_vec()))
        .await;
    assert_eq!(result.status, IngestStatus::Skipped);
    assert_eq!(result.error.as_deref(), Some("No valid text chunks"));
    assert_eq!(service.stats().await.last_file_id, 0);
}

#[tokio::test]
async fn plain_text_payload_is_chunked() {
    let tmp = TempDir::new().expect("tempdir");
    let service = service(&tmp, 4, None).await;

    let result = service
        .ingest("notes.txt", Payload::Text(b"abcdefghij".to_vec()))
        .await;
    assert_eq!(result.chunks_processed, Some(3));

    let result = service
        .ingest("binary.txt", Payload::Text(vec![0xff, 0xfe]))
        .await;
    assert_eq!(result.status, IngestStatus::Failed);
}

#[tokio::test]
async fn search_before_any_data_is_not_ready() {
    let tmp = TempDir::new().expect("tempdir");
    let service = service(&tmp, 500, None).await;
    assert_eq!(
        service.search("anything").await.expect("search"),
        SearchOutcome::NotReady
    );
}

#[tokio::test]
async fn empty_query_is_rejected_once_ready() {
    let tmp = TempDir::new().expect("tempdir");
    let service = service(&tmp, 500, None).await;
    service
        .ingest("a.json", Payload::Json(br#"["some text"]"#.to_vec()))
        .await;
    assert!(matches!(
        service.search("   ").await,
        Err(ServiceError::EmptyQuery)
    ));
}

#[tokio::test]
async fn configured_top_k_limits_results() {
    let tmp = TempDir::new().expect("tempdir");
    let service = service(&tmp, 500, Some(2)).await;
    service
        .ingest(
            "many.json",
            Payload::Json(br#"["one", "two", "three", "four"]"#.to_vec()),
        )
        .await;
    let SearchOutcome::Hits(hits) = service.search("three").await.expect("search") else {
        panic!("store should be ready");
    };
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].metadata.chunk, "three");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn batch_reports_each_file_in_order() {
    let tmp = TempDir::new().expect("tempdir");
    let service = service(&tmp, 500, None).await;

    let report = service
        .ingest_batch(vec![
            UploadedFile::json("good.json", br#"{"title": "alpha", "tags": ["beta"]}"#.to_vec()),
            UploadedFile::json("scalar.json", b"\"just a string\"".to_vec()),
            UploadedFile::json("empty.json", b"{}".to_vec()),
            UploadedFile::text("notes.txt", "gamma delta"),
        ])
        .await
        .expect("batch");

    let statuses: Vec<(&str, IngestStatus)> = report
        .results
        .iter()
        .map(|r| (r.file.as_str(), r.status))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("good.json", IngestStatus::Success),
            ("scalar.json", IngestStatus::Failed),
            ("empty.json", IngestStatus::Skipped),
            ("notes.txt", IngestStatus::Success),
        ]
    );
    assert_eq!(report.total_chunks, 3);
    assert_eq!(
        report.message,
        "Successfully processed 4 files with 3 total chunks"
    );

    let stats = service.stats().await;
    assert_eq!((stats.count, stats.metadata_size), (3, 3));
    assert_eq!(stats.last_file_id, 2);
}

#[tokio::test]
async fn empty_batch_is_rejected() {
    let tmp = TempDir::new().expect("tempdir");
    let service = service(&tmp, 500, None).await;
    assert!(matches!(
        service.ingest_batch(Vec::new()).await,
        Err(ServiceError::NoFiles)
    ));
}
