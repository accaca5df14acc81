use serde::{Deserialize, Serialize};

/// Chunk text and origin, before it is tagged with a file id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRecord {
    pub chunk: String,
    pub source: String,
}

impl SourceRecord {
    pub fn new(chunk: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            chunk: chunk.into(),
            source: source.into(),
        }
    }

    #[must_use]
    pub fn with_file_id(self, file_id: u64) -> MetadataRecord {
        MetadataRecord {
            chunk: self.chunk,
            source: self.source,
            file_id,
        }
    }
}

/// Metadata stored for one indexed vector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataRecord {
    pub chunk: String,
    pub source: String,
    pub file_id: u64,
}

/// One joined search result. `score` is the squared L2 distance (lower is closer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub score: f32,
    pub metadata: MetadataRecord,
}

/// Point-in-time view of the store, taken under a single read lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub dimension: Option<usize>,
    pub count: usize,
    pub metadata_size: usize,
    pub last_file_id: u64,
}
