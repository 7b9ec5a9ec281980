use std::path::{Path, PathBuf};
use std::time::SystemTime;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::BufReader;
use tracing::{info, warn};

use super::error::StorageError;
use super::filename::{generate, validate_flat_filename};
use super::traits::{BoxReader, PLACEHOLDER_ENTRY, UploadStore};

const TEMP_DIR: &str = ".tmp";

/// Filesystem-backed upload store.
///
/// Files live directly under `base_path`; in-flight writes go to
/// `{base_path}/.tmp` and are renamed into place once complete.
pub struct FilesystemUploadStore {
    base_path: PathBuf,
    max_size: u64,
}

impl FilesystemUploadStore {
    /// Create a new filesystem upload store, creating its directories.
    ///
    /// Temp files left by writes that never completed are removed.
    pub async fn new(base_path: PathBuf, max_size: u64) -> Result<Self, StorageError> {
        fs::create_dir_all(&base_path).await?;
        let temp_dir = base_path.join(TEMP_DIR);
        fs::create_dir_all(&temp_dir).await?;
        sweep_temp_dir(&temp_dir).await?;
        Ok(Self {
            base_path,
            max_size,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Resolve a stored filename to its path, rejecting anything that is not flat.
    fn file_path(&self, filename: &str) -> Result<PathBuf, StorageError> {
        let name = validate_flat_filename(filename)
            .map_err(|_| StorageError::InvalidFilename(filename.to_string()))?;
        Ok(self.base_path.join(name))
    }

    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(TEMP_DIR)
            .join(uuid::Uuid::new_v4().to_string())
    }

    fn not_found(filename: &str, err: std::io::Error) -> StorageError {
        if err.kind() == std::io::ErrorKind::NotFound {
            StorageError::NotFound(filename.to_string())
        } else {
            err.into()
        }
    }
}

async fn sweep_temp_dir(temp_dir: &Path) -> Result<(), StorageError> {
    let mut entries = fs::read_dir(temp_dir).await?;
    let mut removed = 0usize;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        match fs::remove_file(entry.path()).await {
            Ok(()) => removed += 1,
            Err(e) => warn!(path = %entry.path().display(), error = %e, "Failed to remove stale temp file"),
        }
    }
    if removed > 0 {
        info!(removed, "Removed stale upload temp files");
    }
    Ok(())
}

#[async_trait]
impl UploadStore for FilesystemUploadStore {
    async fn store(&self, original_name: &str, data: &[u8]) -> Result<String, StorageError> {
        if data.len() as u64 > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: data.len() as u64,
                limit: self.max_size,
            });
        }

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        // Names carry a millisecond timestamp and a random nonce; a clash
        // means two writes landed in the same millisecond with the same nonce.
        let mut filename = generate(original_name);
        while fs::try_exists(self.base_path.join(&filename)).await? {
            filename = generate(original_name);
        }

        if let Err(e) = fs::rename(&temp_path, self.base_path.join(&filename)).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(filename)
    }

    async fn delete(&self, filename: &str) -> Result<bool, StorageError> {
        let path = self.file_path(filename)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self) -> Result<Vec<String>, StorageError> {
        let mut entries = fs::read_dir(&self.base_path).await?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let Ok(name) = entry.file_name().into_string() else {
                continue;
            };
            if name == PLACEHOLDER_ENTRY {
                continue;
            }
            if !entry.file_type().await?.is_file() {
                continue;
            }
            names.push(name);
        }

        names.sort();
        Ok(names)
    }

    async fn open(&self, filename: &str) -> Result<BoxReader, StorageError> {
        let path = self.file_path(filename)?;
        match fs::File::open(&path).await {
            Ok(file) => Ok(Box::new(BufReader::new(file))),
            Err(e) => Err(Self::not_found(filename, e)),
        }
    }

    async fn modified(&self, filename: &str) -> Result<SystemTime, StorageError> {
        let path = self.file_path(filename)?;
        let meta = fs::metadata(&path)
            .await
            .map_err(|e| Self::not_found(filename, e))?;
        Ok(meta.modified()?)
    }
}
