use crate::error::{Result, VectorStoreError};
use fs2::FileExt;
use std::path::{Path, PathBuf};

/// Exclusive advisory lock on a store's data directory, held for the store's lifetime
pub(crate) struct StoreLock {
    file: std::fs::File,
    path: PathBuf,
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = self.file.unlock();
    }
}

impl std::fmt::Debug for StoreLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreLock").field("path", &self.path).finish()
    }
}

pub(crate) async fn acquire_store_lock(path: &Path) -> Result<StoreLock> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || -> Result<StoreLock> {
        use std::fs::OpenOptions;

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)?;

        if file.try_lock_exclusive().is_err() {
            let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
            return Err(VectorStoreError::StoreLocked(dir));
        }
        Ok(StoreLock { file, path })
    })
    .await
    .map_err(|err| VectorStoreError::PersistenceFailure(format!("join store lock task: {err}")))?
}
