use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServiceError>;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    Chunker(#[from] docvec_text_chunker::ChunkerError),

    #[error(transparent)]
    Store(#[from] docvec_vector_store::VectorStoreError),

    #[error("Payload is not valid UTF-8 text")]
    NotUtf8,

    #[error("No valid text chunks")]
    EmptyInput,

    #[error("Empty query after processing")]
    EmptyQuery,

    #[error("No files uploaded")]
    NoFiles,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Ingestion task failed: {0}")]
    Join(String),
}
