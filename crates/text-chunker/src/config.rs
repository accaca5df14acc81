use serde::{Deserialize, Serialize};

pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Configuration for text chunking behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ChunkerConfig {
    /// Maximum fragment length in characters (Unicode scalar values)
    pub chunk_size: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl ChunkerConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_size == 0 {
            return Err("chunk_size must be > 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = ChunkerConfig::default();
        assert_eq!(config.chunk_size, 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let config = ChunkerConfig { chunk_size: 0 };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_style_input_uses_defaults() {
        let config: ChunkerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ChunkerConfig::default());
    }
}
