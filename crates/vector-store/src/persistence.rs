//! On-disk format for the vector index and its metadata.
//!
//! Two artifacts are written after every mutation, each atomically
//! (temp file + fsync + rename):
//!
//! - index file: `b"DVI1"`, `u32` dimension, `u64` count, then `count * dimension`
//!   little-endian `f32` values in ordinal order;
//! - metadata file: JSON `{"schema_version": 1, "records": {"<position>": {...}}}`.
//!
//! The index is always written before the metadata, so an interrupted save can
//! only leave the index ahead of the metadata. `load` repairs exactly that case
//! by dropping the trailing vectors that never got their records.

use crate::error::{Result, VectorStoreError};
use crate::flat_index::VectorIndex;
use crate::metadata::MetadataStore;
use crate::types::MetadataRecord;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

const INDEX_MAGIC: &[u8; 4] = b"DVI1";
const INDEX_HEADER_LEN: usize = 16;
pub const METADATA_SCHEMA_VERSION: u32 = 1;

/// Index and metadata as read back from disk
#[derive(Debug, Clone)]
pub struct PersistedState {
    pub index: VectorIndex,
    pub metadata: MetadataStore,
}

/// Result of reading the persisted artifacts
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(PersistedState),
    /// Neither artifact exists yet
    Empty,
    /// Artifacts exist but cannot be used; carries the reason
    Corrupt(String),
}

#[derive(Debug, Clone)]
pub struct Persistence {
    index_path: PathBuf,
    metadata_path: PathBuf,
}

struct RecordsRef<'a>(&'a MetadataStore);

impl Serialize for RecordsRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter())
    }
}

#[derive(Serialize)]
struct PersistedMetadataRef<'a> {
    schema_version: u32,
    records: RecordsRef<'a>,
}

#[derive(Deserialize)]
struct PersistedMetadata {
    schema_version: u32,
    records: BTreeMap<String, MetadataRecord>,
}

impl Persistence {
    pub fn new(index_path: impl Into<PathBuf>, metadata_path: impl Into<PathBuf>) -> Self {
        Self {
            index_path: index_path.into(),
            metadata_path: metadata_path.into(),
        }
    }

    #[must_use]
    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    #[must_use]
    pub fn metadata_path(&self) -> &Path {
        &self.metadata_path
    }

    /// Read both artifacts. Never fails: problems are reported as `Corrupt`.
    pub async fn load(&self) -> LoadOutcome {
        let index_bytes = match read_optional(&self.index_path).await {
            Ok(bytes) => bytes,
            Err(err) => return LoadOutcome::Corrupt(err.to_string()),
        };
        let metadata_bytes = match read_optional(&self.metadata_path).await {
            Ok(bytes) => bytes,
            Err(err) => return LoadOutcome::Corrupt(err.to_string()),
        };

        let (index_bytes, metadata_bytes) = match (index_bytes, metadata_bytes) {
            (None, None) => return LoadOutcome::Empty,
            (None, Some(_)) => {
                return LoadOutcome::Corrupt(format!(
                    "index file {} is missing while metadata exists",
                    self.index_path.display()
                ))
            }
            (Some(index), metadata) => (index, metadata),
        };

        let mut index = match decode_index(&index_bytes) {
            Ok(index) => index,
            Err(err) => return LoadOutcome::Corrupt(err.to_string()),
        };
        // The first save writes the index before any metadata exists.
        let metadata = match metadata_bytes.as_deref().map(decode_metadata) {
            Some(Ok(metadata)) => metadata,
            Some(Err(err)) => return LoadOutcome::Corrupt(err.to_string()),
            None => {
                log::warn!(
                    "Metadata file {} is missing; treating it as empty",
                    self.metadata_path.display()
                );
                MetadataStore::default()
            }
        };

        let count = index.len();
        let size = metadata.size();
        if count > size && metadata.first_gap(size).is_none() {
            log::warn!(
                "Index has {count} vectors but only {size} metadata records; dropping {} vectors from an interrupted save",
                count - size
            );
            index.truncate(size);
        } else if count != size {
            return LoadOutcome::Corrupt(format!(
                "index holds {count} vectors but metadata holds {size} records"
            ));
        } else if let Some(gap) = metadata.first_gap(count) {
            return LoadOutcome::Corrupt(format!("no metadata record for position {gap}"));
        }

        log::info!(
            "Loaded index from {} with dimension {} ({} vectors)",
            self.index_path.display(),
            index.dimension().unwrap_or_default(),
            index.len()
        );
        LoadOutcome::Loaded(PersistedState { index, metadata })
    }

    /// Write both artifacts, index first
    pub async fn save(&self, index: &VectorIndex, metadata: &MetadataStore) -> Result<()> {
        let index_bytes = encode_index(index)?;
        let metadata_bytes = encode_metadata(metadata)?;

        write_atomic(&self.index_path, &index_bytes).await?;
        log::info!("Saved index to {}", self.index_path.display());
        write_atomic(&self.metadata_path, &metadata_bytes).await?;
        log::info!("Saved metadata to {}", self.metadata_path.display());
        Ok(())
    }
}

async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(VectorStoreError::DecodeFailure(format!(
            "read {}: {err}",
            path.display()
        ))),
    }
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let persistence_err =
        |err: std::io::Error| VectorStoreError::PersistenceFailure(format!("{}: {err}", path.display()));

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(persistence_err)?;
        }
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    let mut file = tokio::fs::File::create(&tmp).await.map_err(persistence_err)?;
    file.write_all(bytes).await.map_err(persistence_err)?;
    file.sync_all().await.map_err(persistence_err)?;
    drop(file);
    tokio::fs::rename(&tmp, path).await.map_err(persistence_err)?;
    Ok(())
}

pub(crate) fn encode_index(index: &VectorIndex) -> Result<Vec<u8>> {
    let (dimension, data) = index.as_flat().ok_or(VectorStoreError::NotInitialized)?;
    let dim = u32::try_from(dimension).map_err(|_| {
        VectorStoreError::PersistenceFailure(format!("dimension {dimension} does not fit in u32"))
    })?;
    let count = (data.len() / dimension) as u64;

    let mut out = Vec::with_capacity(INDEX_HEADER_LEN + data.len() * 4);
    out.extend_from_slice(INDEX_MAGIC);
    out.extend_from_slice(&dim.to_le_bytes());
    out.extend_from_slice(&count.to_le_bytes());
    for value in data {
        out.extend_from_slice(&value.to_le_bytes());
    }
    Ok(out)
}

pub(crate) fn decode_index(bytes: &[u8]) -> Result<VectorIndex> {
    let corrupt = |msg: String| VectorStoreError::DecodeFailure(msg);

    if bytes.len() < INDEX_HEADER_LEN || &bytes[0..4] != INDEX_MAGIC {
        return Err(corrupt("index file has no DVI1 header".to_string()));
    }
    let dimension = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;
    let mut count_bytes = [0u8; 8];
    count_bytes.copy_from_slice(&bytes[8..16]);
    let count = usize::try_from(u64::from_le_bytes(count_bytes))
        .map_err(|_| corrupt("index count overflows usize".to_string()))?;

    let expected_len = count
        .checked_mul(dimension)
        .and_then(|values| values.checked_mul(4))
        .and_then(|payload| payload.checked_add(INDEX_HEADER_LEN))
        .ok_or_else(|| corrupt("index header describes an impossible size".to_string()))?;
    if bytes.len() != expected_len {
        return Err(corrupt(format!(
            "index file is {} bytes, expected {expected_len} for {count} x {dimension}",
            bytes.len()
        )));
    }

    let data = bytes[INDEX_HEADER_LEN..]
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    VectorIndex::from_flat(dimension, data)
}

pub(crate) fn encode_metadata(metadata: &MetadataStore) -> Result<Vec<u8>> {
    let persisted = PersistedMetadataRef {
        schema_version: METADATA_SCHEMA_VERSION,
        records: RecordsRef(metadata),
    };
    Ok(serde_json::to_vec(&persisted)?)
}

/// Accepts the versioned layout and the legacy bare `{"<position>": record}` map.
pub(crate) fn decode_metadata(bytes: &[u8]) -> Result<MetadataStore> {
    let value: serde_json::Value = serde_json::from_slice(bytes)
        .map_err(|err| VectorStoreError::DecodeFailure(format!("metadata: {err}")))?;

    let records: BTreeMap<String, MetadataRecord> = if value.get("schema_version").is_some() {
        let persisted: PersistedMetadata = serde_json::from_value(value)
            .map_err(|err| VectorStoreError::DecodeFailure(format!("metadata: {err}")))?;
        if persisted.schema_version != METADATA_SCHEMA_VERSION {
            return Err(VectorStoreError::DecodeFailure(format!(
                "unsupported metadata schema_version {} (expected {METADATA_SCHEMA_VERSION})",
                persisted.schema_version
            )));
        }
        persisted.records
    } else {
        serde_json::from_value(value)
            .map_err(|err| VectorStoreError::DecodeFailure(format!("legacy metadata: {err}")))?
    };

    records
        .into_iter()
        .map(|(key, record)| {
            key.parse::<usize>()
                .map(|position| (position, record))
                .map_err(|_| {
                    VectorStoreError::DecodeFailure(format!("metadata key '{key}' is not a position"))
                })
        })
        .collect()
}
