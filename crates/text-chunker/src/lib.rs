//! # docvec Text Chunker
//!
//! Turns uploaded documents into bounded-size text fragments ready for
//! embedding.
//!
//! ## Pipeline
//!
//! ```text
//! JSON document
//!     │
//!     ├──> Parse (object or array required)
//!     │
//!     ├──> Walk values in document order
//!     │    └─> keep string leaves, ignore numbers/bools/null
//!     │
//!     └──> Fixed-size chunking
//!          └─> at most `chunk_size` characters per fragment
//! ```
//!
//! ## Example
//!
//! ```rust
//! use docvec_text_chunker::{ChunkerConfig, TextChunker};
//!
//! let chunker = TextChunker::new(ChunkerConfig::default()).unwrap();
//! let chunks = chunker
//!     .chunk_json_bytes(br#"{"a": "hello world", "b": ["foo", "bar"]}"#)
//!     .unwrap();
//! assert_eq!(chunks, vec!["hello world", "foo", "bar"]);
//! ```

mod chunker;
mod config;
mod error;

pub use chunker::TextChunker;
pub use config::ChunkerConfig;
pub use error::{ChunkerError, Result};
