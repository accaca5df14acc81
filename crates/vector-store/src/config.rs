use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_INDEX_FILE: &str = "docvec.index";
pub const DEFAULT_METADATA_FILE: &str = "metadata.json";
pub const LOCK_FILE: &str = "docvec.lock";
pub const DEFAULT_DIMENSION: usize = 384;

/// What to do when persisted artifacts cannot be used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorruptPolicy {
    /// Log the problem and start from an empty store (in-memory state wins)
    #[default]
    StartEmpty,
    /// Refuse to open the store
    Fail,
}

/// How the file-id counter is seeded when a store is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileIdPolicy {
    /// Start at 0 on every open; ids may repeat ones already on disk
    #[default]
    Reset,
    /// Continue after the highest `file_id` found in persisted metadata
    Resume,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    pub index_file: String,
    pub metadata_file: String,
    pub on_corrupt: CorruptPolicy,
    pub file_ids: FileIdPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            index_file: DEFAULT_INDEX_FILE.to_string(),
            metadata_file: DEFAULT_METADATA_FILE.to_string(),
            on_corrupt: CorruptPolicy::default(),
            file_ids: FileIdPolicy::default(),
        }
    }
}

impl StoreConfig {
    /// Defaults rooted at `data_dir`
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn index_path(&self) -> PathBuf {
        self.data_dir.join(&self.index_file)
    }

    #[must_use]
    pub fn metadata_path(&self) -> PathBuf {
        self.data_dir.join(&self.metadata_file)
    }

    #[must_use]
    pub fn lock_path(&self) -> PathBuf {
        self.data_dir.join(LOCK_FILE)
    }

    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [
            ("index_file", &self.index_file),
            ("metadata_file", &self.metadata_file),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{name} must not be empty"));
            }
        }
        if self.index_file == self.metadata_file {
            return Err("index_file and metadata_file must differ".to_string());
        }
        if self.index_file == LOCK_FILE || self.metadata_file == LOCK_FILE {
            return Err(format!("{LOCK_FILE} is reserved"));
        }
        Ok(())
    }
}

/// Local embedding backends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingMode {
    /// Feature-hashed bag of words
    #[default]
    Hashing,
    /// Pseudo-random vector seeded by the text hash
    Stub,
}

impl std::str::FromStr for EmbeddingMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "hashing" => Ok(Self::Hashing),
            "stub" => Ok(Self::Stub),
            other => Err(format!(
                "Unsupported embedding mode '{other}' (expected 'hashing' or 'stub')"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmbeddingConfig {
    pub mode: EmbeddingMode,
    pub dimension: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            mode: EmbeddingMode::default(),
            dimension: DEFAULT_DIMENSION,
        }
    }
}

impl EmbeddingConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.dimension == 0 {
            return Err("dimension must be > 0".to_string());
        }
        Ok(())
    }
}
