//! # docvec Vector Store
//!
//! Exact nearest-neighbor search over document chunk embeddings, with
//! position-keyed metadata and write-through persistence.
//!
//! ## Architecture
//!
//! ```text
//! (vector, SourceRecord)[]
//!     │
//!     └──> VectorStore (RwLock: index + metadata + file-id counter)
//!            ├─> VectorIndex     append-only, exact squared-L2 search
//!            ├─> MetadataStore   position -> {chunk, source, file_id}
//!            └─> Persistence     DVI1 index file + JSON metadata, atomic writes
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use docvec_vector_store::{SourceRecord, StoreConfig, VectorStore};
//!
//! #[tokio::main]
//! async fn main() -> docvec_vector_store::Result<()> {
//!     let store = VectorStore::open(StoreConfig::in_dir("data"), 3).await?;
//!
//!     let file_id = store.next_file_id().await;
//!     store
//!         .ingest(
//!             vec![vec![0.0, 1.0, 0.0]],
//!             vec![SourceRecord::new("hello world", "greeting.json")],
//!             file_id,
//!         )
//!         .await?;
//!
//!     for hit in store.query(&[0.0, 1.0, 0.0], Some(5)).await? {
//!         println!("{:.3} {}", hit.score, hit.metadata.chunk);
//!     }
//!
//!     store.shutdown().await
//! }
//! ```

mod config;
mod embeddings;
mod error;
mod flat_index;
mod metadata;
mod persistence;
mod store;
mod store_lock;
mod types;

pub use config::{
    CorruptPolicy, EmbeddingConfig, EmbeddingMode, FileIdPolicy, StoreConfig, DEFAULT_DIMENSION,
    DEFAULT_INDEX_FILE, DEFAULT_METADATA_FILE, LOCK_FILE,
};
pub use embeddings::{embedder_from_config, Embedder, HashingEmbedder, StubEmbedder};
pub use error::{Result, VectorStoreError};
pub use flat_index::{squared_l2, VectorIndex};
pub use metadata::MetadataStore;
pub use persistence::{LoadOutcome, PersistedState, Persistence, METADATA_SCHEMA_VERSION};
pub use store::VectorStore;
pub use types::{MetadataRecord, SearchHit, SourceRecord, StoreStats};
