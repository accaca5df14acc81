use crate::config::{CorruptPolicy, FileIdPolicy, StoreConfig};
use crate::error::{Result, VectorStoreError};
use crate::flat_index::VectorIndex;
use crate::metadata::MetadataStore;
use crate::persistence::{LoadOutcome, Persistence, PersistedState};
use crate::store_lock::{acquire_store_lock, StoreLock};
use crate::types::{MetadataRecord, SearchHit, SourceRecord, StoreStats};
use tokio::sync::RwLock;

/// Index, metadata and file-id counter, always mutated together
#[derive(Debug, Default)]
struct StoreState {
    index: VectorIndex,
    metadata: MetadataStore,
    file_counter: u64,
}

/// Owns the vector index, its metadata and persistence as one unit.
///
/// Writers (`ingest`, `next_file_id`, `initialize_if_absent`, `shutdown`) hold
/// the write lock for the whole critical section including the disk write.
/// Readers take the read lock, so `index.len() == metadata.size()` holds for
/// every observer.
///
/// A failed write-through save is logged and the in-memory mutation stands;
/// disk catches up on the next successful save.
#[derive(Debug)]
pub struct VectorStore {
    state: RwLock<StoreState>,
    persistence: Persistence,
    config: StoreConfig,
    _lock: StoreLock,
}

impl VectorStore {
    /// Open the store at `config.data_dir`, reloading persisted state and
    /// creating an empty index of `dimension` when nothing was persisted.
    pub async fn open(config: StoreConfig, dimension: usize) -> Result<Self> {
        config.validate().map_err(VectorStoreError::InvalidConfig)?;
        log::info!("Opening vector store at {}", config.data_dir.display());

        let lock = acquire_store_lock(&config.lock_path()).await?;
        let persistence = Persistence::new(config.index_path(), config.metadata_path());

        let mut persist_new_index = true;
        let state = match persistence.load().await {
            LoadOutcome::Loaded(PersistedState { index, metadata }) => {
                let file_counter = match config.file_ids {
                    FileIdPolicy::Reset => 0,
                    FileIdPolicy::Resume => metadata.max_file_id(),
                };
                StoreState {
                    index,
                    metadata,
                    file_counter,
                }
            }
            LoadOutcome::Empty => StoreState::default(),
            LoadOutcome::Corrupt(reason) => match config.on_corrupt {
                CorruptPolicy::StartEmpty => {
                    log::error!(
                        "Persisted store is unusable, starting empty: {reason}. Files on disk are left untouched until the next write"
                    );
                    persist_new_index = false;
                    StoreState::default()
                }
                CorruptPolicy::Fail => return Err(VectorStoreError::DecodeFailure(reason)),
            },
        };

        let store = Self {
            state: RwLock::new(state),
            persistence,
            config,
            _lock: lock,
        };
        store.create_index(dimension, persist_new_index).await?;
        Ok(store)
    }

    /// Create the index unless one already exists. Returns whether it was created.
    pub async fn initialize_if_absent(&self, dimension: usize) -> Result<bool> {
        self.create_index(dimension, true).await
    }

    async fn create_index(&self, dimension: usize, persist: bool) -> Result<bool> {
        let mut state = self.state.write().await;
        match state.index.create(dimension) {
            Ok(()) => {
                if persist {
                    self.persist(&state).await;
                }
                Ok(true)
            }
            Err(VectorStoreError::AlreadyInitialized { dimension: existing }) => {
                if existing != dimension {
                    log::warn!(
                        "Keeping existing index with dimension {existing}; requested dimension {dimension} is ignored"
                    );
                }
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }

    /// True once the index exists and holds at least one vector
    pub async fn is_ready(&self) -> bool {
        let state = self.state.read().await;
        state.index.is_initialized() && !state.index.is_empty()
    }

    pub async fn dimension(&self) -> Option<usize> {
        self.state.read().await.index.dimension()
    }

    /// Allocate the next file id (the first allocation returns 1)
    pub async fn next_file_id(&self) -> u64 {
        let mut state = self.state.write().await;
        state.file_counter += 1;
        state.file_counter
    }

    /// Append `vectors` and their records as one unit and persist.
    /// Returns the position assigned to the first vector.
    pub async fn ingest(
        &self,
        vectors: Vec<Vec<f32>>,
        records: Vec<SourceRecord>,
        file_id: u64,
    ) -> Result<usize> {
        if vectors.len() != records.len() {
            return Err(VectorStoreError::LengthMismatch {
                vectors: vectors.len(),
                records: records.len(),
            });
        }

        let mut state = self.state.write().await;
        let start = state.index.append(&vectors)?;
        if records.is_empty() {
            return Ok(start);
        }
        for (offset, record) in records.into_iter().enumerate() {
            state.metadata.put(start + offset, record.with_file_id(file_id));
        }
        log::info!("Inserted {} records for file ID {file_id}", vectors.len());

        self.persist(&state).await;
        Ok(start)
    }

    /// Nearest records to `vector`, closest first. `k = None` ranks everything.
    pub async fn query(&self, vector: &[f32], k: Option<usize>) -> Result<Vec<SearchHit>> {
        let state = self.state.read().await;
        if state.index.is_initialized() && state.index.is_empty() {
            log::warn!("Index is empty. No data to search.");
            return Ok(Vec::new());
        }

        let neighbors = state.index.search(vector, k)?;
        let hits: Vec<SearchHit> = neighbors
            .into_iter()
            .filter_map(|(position, distance)| {
                state.metadata.get(position).map(|record| SearchHit {
                    score: distance,
                    metadata: record.clone(),
                })
            })
            .collect();
        log::debug!("Found {} search results", hits.len());
        Ok(hits)
    }

    pub async fn record(&self, position: usize) -> Option<MetadataRecord> {
        self.state.read().await.metadata.get(position).cloned()
    }

    pub async fn stats(&self) -> StoreStats {
        let state = self.state.read().await;
        StoreStats {
            dimension: state.index.dimension(),
            count: state.index.len(),
            metadata_size: state.metadata.size(),
            last_file_id: state.file_counter,
        }
    }

    /// Final flush. Unlike write-through saves, a failure here is returned.
    pub async fn shutdown(&self) -> Result<()> {
        let state = self.state.write().await;
        if !state.index.is_initialized() {
            return Ok(());
        }
        self.persistence.save(&state.index, &state.metadata).await?;
        log::info!("Vector store at {} shut down", self.config.data_dir.display());
        Ok(())
    }

    async fn persist(&self, state: &StoreState) {
        if let Err(err) = self.persistence.save(&state.index, &state.metadata).await {
            log::error!("Failed to persist vector store: {err}");
        }
    }
}
