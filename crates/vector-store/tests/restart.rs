use docvec_vector_store::{
    CorruptPolicy, FileIdPolicy, SourceRecord, StoreConfig, VectorStore, VectorStoreError,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

async fn seed(config: StoreConfig) {
    let store = VectorStore::open(config, 2).await.expect("open");
    for chunk in ["alpha", "beta"] {
        let file_id = store.next_file_id().await;
        store
            .ingest(
                vec![vec![file_id as f32, 0.0]],
                vec![SourceRecord::new(chunk, "seed.json")],
                file_id,
            )
            .await
            .expect("ingest");
    }
    store.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn reopened_store_sees_persisted_records() {
    let tmp = TempDir::new().expect("tempdir");
    seed(StoreConfig::in_dir(tmp.path())).await;

    let store = VectorStore::open(StoreConfig::in_dir(tmp.path()), 2)
        .await
        .expect("reopen");
    assert!(store.is_ready().await);
    let stats = store.stats().await;
    assert_eq!((stats.count, stats.metadata_size), (2, 2));

    let hits = store.query(&[2.0, 0.0], Some(1)).await.expect("query");
    assert_eq!(hits[0].metadata.chunk, "beta");
    assert_eq!(hits[0].score, 0.0);
}

#[tokio::test]
async fn file_ids_reset_by_default() {
    let tmp = TempDir::new().expect("tempdir");
    seed(StoreConfig::in_dir(tmp.path())).await;

    let store = VectorStore::open(StoreConfig::in_dir(tmp.path()), 2)
        .await
        .expect("reopen");
    assert_eq!(store.next_file_id().await, 1);
}

#[tokio::test]
async fn file_ids_resume_when_configured() {
    let tmp = TempDir::new().expect("tempdir");
    seed(StoreConfig::in_dir(tmp.path())).await;

    let config = StoreConfig {
        file_ids: FileIdPolicy::Resume,
        ..StoreConfig::in_dir(tmp.path())
    };
    let store = VectorStore::open(config, 2).await.expect("reopen");
    assert_eq!(store.next_file_id().await, 3);
}

#[tokio::test]
async fn loaded_dimension_wins_over_requested_one() {
    let tmp = TempDir::new().expect("tempdir");
    seed(StoreConfig::in_dir(tmp.path())).await;

    let store = VectorStore::open(StoreConfig::in_dir(tmp.path()), 16)
        .await
        .expect("reopen");
    assert_eq!(store.dimension().await, Some(2));
}

#[tokio::test]
async fn corrupt_metadata_starts_empty_by_default() {
    let tmp = TempDir::new().expect("tempdir");
    seed(StoreConfig::in_dir(tmp.path())).await;
    tokio::fs::write(tmp.path().join("metadata.json"), b"[broken")
        .await
        .expect("corrupt metadata");

    let store = VectorStore::open(StoreConfig::in_dir(tmp.path()), 2)
        .await
        .expect("reopen");
    assert!(!store.is_ready().await);
    assert_eq!(store.stats().await.count, 0);
}

#[tokio::test]
async fn corrupt_metadata_fails_under_strict_policy() {
    let tmp = TempDir::new().expect("tempdir");
    seed(StoreConfig::in_dir(tmp.path())).await;
    tokio::fs::write(tmp.path().join("metadata.json"), b"[broken")
        .await
        .expect("corrupt metadata");

    let config = StoreConfig {
        on_corrupt: CorruptPolicy::Fail,
        ..StoreConfig::in_dir(tmp.path())
    };
    let err = VectorStore::open(config, 2).await.unwrap_err();
    assert!(matches!(err, VectorStoreError::DecodeFailure(_)));
}

#[tokio::test]
async fn opening_over_corrupt_metadata_leaves_files_untouched() {
    let tmp = TempDir::new().expect("tempdir");
    seed(StoreConfig::in_dir(tmp.path())).await;
    let index_path = tmp.path().join("docvec.index");
    let metadata_path = tmp.path().join("metadata.json");
    tokio::fs::write(&metadata_path, b"[broken")
        .await
        .expect("corrupt metadata");
    let index_before = tokio::fs::read(&index_path).await.expect("read index");

    let store = VectorStore::open(StoreConfig::in_dir(tmp.path()), 2)
        .await
        .expect("reopen");
    assert_eq!(store.stats().await.count, 0);
    drop(store);

    assert_eq!(
        tokio::fs::read(&index_path).await.expect("read index"),
        index_before
    );
    assert_eq!(
        tokio::fs::read(&metadata_path).await.expect("read metadata"),
        b"[broken".to_vec()
    );
}

#[tokio::test]
async fn interrupted_first_save_reopens_under_strict_policy() {
    let tmp = TempDir::new().expect("tempdir");
    let config = StoreConfig {
        on_corrupt: CorruptPolicy::Fail,
        ..StoreConfig::in_dir(tmp.path())
    };
    seed(config.clone()).await;
    tokio::fs::remove_file(tmp.path().join("metadata.json"))
        .await
        .expect("remove metadata");

    let store = VectorStore::open(config, 2).await.expect("reopen");
    let stats = store.stats().await;
    assert_eq!(stats.dimension, Some(2));
    assert_eq!((stats.count, stats.metadata_size), (0, 0));
}
