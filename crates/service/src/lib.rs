//! # docvec Service
//!
//! Per-file ingestion and text search on top of the vector store. This is the
//! surface the HTTP and CLI adapters call; it never exposes the index directly.

mod config;
mod error;
mod service;
mod types;

pub use config::SearchConfig;
pub use error::{Result, ServiceError};
pub use service::DocumentService;
pub use types::{
    BatchIngestReport, FileIngestResult, IngestStatus, Payload, SearchOutcome, UploadedFile,
};
