use crate::config::SearchConfig;
use crate::error::{Result, ServiceError};
use crate::types::{
    BatchIngestReport, FileIngestResult, IngestStatus, Payload, SearchOutcome, UploadedFile,
};
use docvec_text_chunker::{ChunkerError, TextChunker};
use docvec_vector_store::{Embedder, SourceRecord, StoreStats, VectorStore};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Chunk → embed → store pipeline and text search over one shared store.
///
/// Cheap to clone; clones share the same store and embedder.
#[derive(Clone)]
pub struct DocumentService {
    store: Arc<VectorStore>,
    chunker: TextChunker,
    embedder: Arc<dyn Embedder>,
    search: SearchConfig,
}

impl DocumentService {
    pub async fn new(
        store: Arc<VectorStore>,
        chunker: TextChunker,
        embedder: Arc<dyn Embedder>,
        search: SearchConfig,
    ) -> Result<Self> {
        search.validate().map_err(ServiceError::InvalidConfig)?;
        if let Some(dimension) = store.dimension().await {
            if dimension != embedder.dimension() {
                log::warn!(
                    "Embedder '{}' produces {}-dim vectors but the index has dimension {dimension}; ingestion will fail",
                    embedder.model_id(),
                    embedder.dimension()
                );
            }
        }
        Ok(Self {
            store,
            chunker,
            embedder,
            search,
        })
    }

    #[must_use]
    pub fn store(&self) -> &Arc<VectorStore> {
        &self.store
    }

    pub async fn stats(&self) -> StoreStats {
        self.store.stats().await
    }

    /// Ingest one file. Never fails: problems are reported in the result.
    pub async fn ingest(&self, file: &str, payload: Payload) -> FileIngestResult {
        match self.ingest_inner(file, payload).await {
            Ok(chunks) => FileIngestResult::success(file, chunks),
            Err(ServiceError::EmptyInput) => {
                FileIngestResult::skipped(file, ServiceError::EmptyInput.to_string())
            }
            Err(ServiceError::Chunker(ChunkerError::InvalidJson(_))) => {
                FileIngestResult::failed(file, "Invalid JSON format")
            }
            Err(ServiceError::Chunker(ChunkerError::InvalidPayload(msg))) => {
                FileIngestResult::failed(file, msg)
            }
            Err(err) => {
                log::error!("Error processing file {file}: {err}");
                FileIngestResult::failed(file, err.to_string())
            }
        }
    }

    async fn ingest_inner(&self, file: &str, payload: Payload) -> Result<usize> {
        let chunks = match payload {
            Payload::Json(bytes) => self.chunker.chunk_json_bytes(&bytes)?,
            Payload::Text(bytes) => {
                let text = String::from_utf8(bytes).map_err(|_| ServiceError::NotUtf8)?;
                self.chunker.chunk(&text)
            }
        };
        if chunks.is_empty() {
            return Err(ServiceError::EmptyInput);
        }

        let vectors = self.embedder.embed_batch(&chunks).await?;
        let count = chunks.len();
        let records = chunks
            .into_iter()
            .map(|chunk| SourceRecord::new(chunk, file))
            .collect();

        let file_id = self.store.next_file_id().await;
        self.store.ingest(vectors, records, file_id).await?;
        Ok(count)
    }

    /// Ingest every file concurrently. Results keep the input order and one
    /// bad file never affects the others.
    pub async fn ingest_batch(&self, files: Vec<UploadedFile>) -> Result<BatchIngestReport> {
        if files.is_empty() {
            return Err(ServiceError::NoFiles);
        }
        let file_count = files.len();

        let mut join = JoinSet::new();
        for (slot, file) in files.into_iter().enumerate() {
            let service = self.clone();
            join.spawn(async move {
                let result = service.ingest(&file.name, file.payload).await;
                (slot, result)
            });
        }

        let mut slots: Vec<Option<FileIngestResult>> = vec![None; file_count];
        while let Some(joined) = join.join_next().await {
            let (slot, result) = joined.map_err(|err| ServiceError::Join(err.to_string()))?;
            slots[slot] = Some(result);
        }
        let results: Vec<FileIngestResult> = slots.into_iter().flatten().collect();

        let total_chunks = results
            .iter()
            .filter(|r| r.status == IngestStatus::Success)
            .filter_map(|r| r.chunks_processed)
            .sum();
        Ok(BatchIngestReport {
            message: format!(
                "Successfully processed {file_count} files with {total_chunks} total chunks"
            ),
            total_chunks,
            results,
        })
    }

    /// Embed the first chunk of `query` and rank stored chunks against it
    pub async fn search(&self, query: &str) -> Result<SearchOutcome> {
        if !self.store.is_ready().await {
            return Ok(SearchOutcome::NotReady);
        }
        if query.trim().is_empty() {
            return Err(ServiceError::EmptyQuery);
        }
        let first = self
            .chunker
            .chunk(query)
            .into_iter()
            .next()
            .ok_or(ServiceError::EmptyQuery)?;

        let vector = self.embedder.embed(&first).await?;
        log::info!("Query embedding generated successfully.");
        let hits = self.store.query(&vector, self.search.top_k).await?;
        log::info!("Found {} search results", hits.len());
        Ok(SearchOutcome::Hits(hits))
    }
}
