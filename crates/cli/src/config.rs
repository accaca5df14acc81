use anyhow::{Context as AnyhowContext, Result};
use docvec_service::SearchConfig;
use docvec_text_chunker::ChunkerConfig;
use docvec_vector_store::{EmbeddingConfig, StoreConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "docvec.toml";
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";

pub const ENV_DATA_DIR: &str = "DOCVEC_DATA_DIR";
pub const ENV_EMBEDDING_MODE: &str = "DOCVEC_EMBEDDING_MODE";
pub const ENV_DIMENSION: &str = "DOCVEC_DIMENSION";
pub const ENV_CHUNK_SIZE: &str = "DOCVEC_CHUNK_SIZE";
pub const ENV_TOP_K: &str = "DOCVEC_TOP_K";
pub const ENV_BIND: &str = "DOCVEC_BIND";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

impl ServerConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.bind.trim().is_empty() {
            return Err("bind must not be empty".to_string());
        }
        Ok(())
    }
}

/// Fully resolved process configuration.
///
/// Layers, lowest priority first: built-in defaults, the TOML file, `DOCVEC_*`
/// environment variables, then command line flags (applied by the caller).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub chunker: ChunkerConfig,
    pub embedding: EmbeddingConfig,
    pub search: SearchConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load from `path`, or from `docvec.toml` if it exists, then apply the
    /// process environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::from_file(&fallback)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_toml(&raw)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Override fields from `DOCVEC_*` variables. Blank values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(dir) = var(ENV_DATA_DIR) {
            self.store.data_dir = PathBuf::from(dir);
        }
        if let Some(mode) = var(ENV_EMBEDDING_MODE) {
            self.embedding.mode = mode.parse().map_err(anyhow::Error::msg)?;
        }
        if let Some(dimension) = var(ENV_DIMENSION) {
            self.embedding.dimension = parse_number(ENV_DIMENSION, &dimension)?;
        }
        if let Some(size) = var(ENV_CHUNK_SIZE) {
            self.chunker.chunk_size = parse_number(ENV_CHUNK_SIZE, &size)?;
        }
        if let Some(top_k) = var(ENV_TOP_K) {
            self.search.top_k = Some(parse_number(ENV_TOP_K, &top_k)?);
        }
        if let Some(bind) = var(ENV_BIND) {
            self.server.bind = bind;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let sections = [
            ("store", self.store.validate()),
            ("chunker", self.chunker.validate()),
            ("embedding", self.embedding.validate()),
            ("search", self.search.validate()),
            ("server", self.server.validate()),
        ];
        for (section, result) in sections {
            if let Err(message) = result {
                anyhow::bail!("Invalid [{section}] config: {message}");
            }
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn parse_number(key: &str, raw: &str) -> Result<usize> {
    raw.parse()
        .with_context(|| format!("{key} must be a non-negative integer, got '{raw}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use docvec_vector_store::{EmbeddingMode, FileIdPolicy};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn defaults_are_valid() {
        let config = AppConfig::default();
        config.validate().unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:8000");
        assert_eq!(config.chunker.chunk_size, 500);
        assert_eq!(config.search.top_k, None);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [store]
            data_dir = "/var/lib/docvec"
            file_ids = "resume"

            [embedding]
            mode = "stub"
            "#,
        )
        .unwrap();
        assert_eq!(config.store.data_dir, PathBuf::from("/var/lib/docvec"));
        assert_eq!(config.store.file_ids, FileIdPolicy::Resume);
        assert_eq!(config.store.index_file, "docvec.index");
        assert_eq!(config.embedding.mode, EmbeddingMode::Stub);
        assert_eq!(config.embedding.dimension, 384);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(AppConfig::from_toml("[chunker]\nchunk_sise = 10\n").is_err());
        assert!(AppConfig::from_toml("[cache]\nttl = 1\n").is_err());
    }

    #[test]
    fn env_overrides_file_values() {
        let env: HashMap<&str, &str> = [
            (ENV_DATA_DIR, "/tmp/vectors"),
            (ENV_EMBEDDING_MODE, "STUB"),
            (ENV_DIMENSION, "64"),
            (ENV_TOP_K, "5"),
            (ENV_BIND, "  "),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::from_toml("[server]\nbind = \"127.0.0.1:9000\"\n").unwrap();
        config
            .apply_env(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.store.data_dir, PathBuf::from("/tmp/vectors"));
        assert_eq!(config.embedding.mode, EmbeddingMode::Stub);
        assert_eq!(config.embedding.dimension, 64);
        assert_eq!(config.search.top_k, Some(5));
        assert_eq!(config.server.bind, "127.0.0.1:9000");
    }

    #[test]
    fn bad_env_values_are_reported() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env(|key| (key == ENV_CHUNK_SIZE).then(|| "lots".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_CHUNK_SIZE));

        let err = config
            .apply_env(|key| (key == ENV_EMBEDDING_MODE).then(|| "onnx".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("Unsupported embedding mode"));
    }

    #[test]
    fn validation_names_the_section() {
        let mut config = AppConfig::default();
        config.search.top_k = Some(0);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("[search]"));
    }

    #[test]
    fn printed_config_parses_back() {
        let mut config = AppConfig::default();
        config.search.top_k = Some(3);
        let printed = config.to_toml().unwrap();
        assert_eq!(AppConfig::from_toml(&printed).unwrap(), config);
    }
}
