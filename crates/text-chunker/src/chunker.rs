use crate::config::ChunkerConfig;
use crate::error::{ChunkerError, Result};
use serde_json::Value;

/// Splits documents into fixed-size text fragments
#[derive(Debug, Clone)]
pub struct TextChunker {
    config: ChunkerConfig,
}

impl TextChunker {
    /// Create a chunker, rejecting invalid configuration
    pub fn new(config: ChunkerConfig) -> Result<Self> {
        config.validate().map_err(ChunkerError::invalid_config)?;
        Ok(Self { config })
    }

    /// Split text into consecutive fragments of at most `chunk_size` characters.
    ///
    /// Empty input yields no fragments. Boundaries fall on character
    /// boundaries, never inside a multi-byte sequence.
    #[must_use]
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let size = self.config.chunk_size;
        let mut chunks = Vec::new();
        let mut current = String::new();
        let mut len = 0usize;
        for ch in text.chars() {
            current.push(ch);
            len += 1;
            if len == size {
                chunks.push(std::mem::take(&mut current));
                len = 0;
            }
        }
        if !current.is_empty() {
            chunks.push(current);
        }
        chunks
    }

    /// Recursively collect chunks from every string leaf of a JSON value.
    ///
    /// Object values and array items are visited in document order. Numbers,
    /// booleans and null contribute nothing.
    #[must_use]
    pub fn extract_chunks(&self, value: &Value) -> Vec<String> {
        let mut out = Vec::new();
        self.collect(value, &mut out);
        out
    }

    fn collect(&self, value: &Value, out: &mut Vec<String>) {
        match value {
            Value::Object(map) => {
                for item in map.values() {
                    self.collect(item, out);
                }
            }
            Value::Array(items) => {
                for item in items {
                    self.collect(item, out);
                }
            }
            Value::String(text) => out.extend(self.chunk(text)),
            Value::Null | Value::Bool(_) | Value::Number(_) => {}
        }
    }

    /// Chunk a parsed JSON document. Only objects and arrays are accepted.
    pub fn chunk_json(&self, value: &Value) -> Result<Vec<String>> {
        if !matches!(value, Value::Object(_) | Value::Array(_)) {
            return Err(ChunkerError::invalid_payload(
                "Expected JSON object or array",
            ));
        }
        let chunks = self.extract_chunks(value);
        log::info!("Processed {} text chunks", chunks.len());
        Ok(chunks)
    }

    /// Parse raw bytes as JSON and chunk the result
    pub fn chunk_json_bytes(&self, bytes: &[u8]) -> Result<Vec<String>> {
        let value: Value = serde_json::from_slice(bytes)?;
        self.chunk_json(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn chunker(size: usize) -> TextChunker {
        TextChunker::new(ChunkerConfig { chunk_size: size }).unwrap()
    }

    #[test]
    fn test_chunk_splits_on_size() {
        let chunks = chunker(4).chunk("abcdefghij");
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_chunk_empty_text() {
        assert!(chunker(4).chunk("").is_empty());
    }

    #[test]
    fn test_chunk_counts_characters_not_bytes() {
        let chunks = chunker(2).chunk("héllo");
        assert_eq!(chunks, vec!["hé", "ll", "o"]);
    }

    #[test]
    fn test_extract_nested_strings_in_order() {
        let value = json!({
            "a": "hello world",
            "b": ["foo", {"c": "bar", "n": 3, "t": true, "z": null}],
        });
        let chunks = chunker(500).extract_chunks(&value);
        assert_eq!(chunks, vec!["hello world", "foo", "bar"]);
    }

    #[test]
    fn test_chunk_json_rejects_scalars() {
        let err = chunker(500).chunk_json(&json!("just a string")).unwrap_err();
        assert!(matches!(err, ChunkerError::InvalidPayload(_)));
        assert_eq!(err.to_string(), "Expected JSON object or array");

        assert!(chunker(500).chunk_json(&json!(42)).is_err());
    }

    #[test]
    fn test_chunk_json_bytes_invalid_json() {
        let err = chunker(500).chunk_json_bytes(b"{not json").unwrap_err();
        assert!(matches!(err, ChunkerError::InvalidJson(_)));
    }

    #[test]
    fn test_chunk_json_without_strings_is_empty() {
        let chunks = chunker(500).chunk_json(&json!({"a": 1, "b": [true]})).unwrap();
        assert!(chunks.is_empty());
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        assert!(TextChunker::new(ChunkerConfig { chunk_size: 0 }).is_err());
    }
}
