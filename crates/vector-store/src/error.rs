use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, VectorStoreError>;

#[derive(Error, Debug)]
pub enum VectorStoreError {
    #[error("Index not initialized")]
    NotInitialized,

    #[error("Index already exists (dimension {dimension})")]
    AlreadyInitialized { dimension: usize },

    #[error("Invalid index dimension {0}: must be > 0")]
    InvalidDimension(usize),

    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Got {vectors} vectors but {records} metadata records")]
    LengthMismatch { vectors: usize, records: usize },

    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),

    #[error("Failed to decode persisted store: {0}")]
    DecodeFailure(String),

    #[error("Store directory {} is locked by another process", .0.display())]
    StoreLocked(PathBuf),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
