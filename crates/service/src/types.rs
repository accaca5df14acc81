use docvec_vector_store::SearchHit;
use serde::{Deserialize, Serialize};

/// Raw document content as received from a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// JSON object or array; every string leaf is chunked
    Json(Vec<u8>),
    /// Plain UTF-8 text, chunked as one string
    Text(Vec<u8>),
}

impl Payload {
    /// Pick the payload kind from an upload's file name and content type.
    /// Anything not clearly plain text is treated as JSON.
    pub fn from_upload(file_name: &str, content_type: Option<&str>, bytes: Vec<u8>) -> Self {
        let is_text_type = content_type
            .map(|ct| ct.trim().to_ascii_lowercase().starts_with("text/plain"))
            .unwrap_or(false);
        let lower = file_name.to_ascii_lowercase();
        let is_text_name = lower.ends_with(".txt") || lower.ends_with(".md");
        if is_text_type || is_text_name {
            Self::Text(bytes)
        } else {
            Self::Json(bytes)
        }
    }
}

/// One file of an ingestion batch
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub payload: Payload,
}

impl UploadedFile {
    pub fn json(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            payload: Payload::Json(bytes.into()),
        }
    }

    pub fn text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            payload: Payload::Text(text.into().into_bytes()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngestStatus {
    Success,
    Skipped,
    Failed,
}

/// Outcome of ingesting one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileIngestResult {
    pub file: String,
    pub status: IngestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunks_processed: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileIngestResult {
    pub fn success(file: impl Into<String>, chunks: usize) -> Self {
        Self {
            file: file.into(),
            status: IngestStatus::Success,
            chunks_processed: Some(chunks),
            error: None,
        }
    }

    pub fn skipped(file: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            status: IngestStatus::Skipped,
            chunks_processed: None,
            error: Some(error.into()),
        }
    }

    pub fn failed(file: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            status: IngestStatus::Failed,
            chunks_processed: None,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchIngestReport {
    pub message: String,
    pub total_chunks: usize,
    pub results: Vec<FileIngestResult>,
}

/// Result of a text query. `NotReady` means no index data yet, which is
/// different from an empty `Hits`.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    NotReady,
    Hits(Vec<SearchHit>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_kind_from_upload() {
        assert!(matches!(
            Payload::from_upload("notes.txt", None, Vec::new()),
            Payload::Text(_)
        ));
        assert!(matches!(
            Payload::from_upload("blob", Some("text/plain; charset=utf-8"), Vec::new()),
            Payload::Text(_)
        ));
        assert!(matches!(
            Payload::from_upload("doc.json", Some("application/json"), Vec::new()),
            Payload::Json(_)
        ));
        assert!(matches!(
            Payload::from_upload("upload", None, Vec::new()),
            Payload::Json(_)
        ));
    }

    #[test]
    fn result_serialization_omits_empty_fields() {
        let value = serde_json::to_value(FileIngestResult::success("a.json", 3)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"file": "a.json", "status": "success", "chunks_processed": 3})
        );

        let value = serde_json::to_value(FileIngestResult::skipped("b.json", "No valid text chunks"))
            .unwrap();
        assert_eq!(
            value,
            serde_json::json!({"file": "b.json", "status": "skipped", "error": "No valid text chunks"})
        );
    }
}
