use std::time::SystemTime;

use async_trait::async_trait;
use tokio::io::AsyncRead;
use tracing::{debug, warn};

use super::error::StorageError;

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Reserved entry kept in the upload directory so it survives in version control.
pub const PLACEHOLDER_ENTRY: &str = ".gitkeep";

/// Flat store of user-uploaded media, addressed by generated filename.
#[async_trait]
pub trait UploadStore: Send + Sync {
    /// Persist `data` under a freshly generated name derived from `original_name`.
    ///
    /// Returns the generated filename.
    async fn store(&self, original_name: &str, data: &[u8]) -> Result<String, StorageError>;

    /// Delete a stored file.
    ///
    /// Returns `true` if the file was deleted, `false` if it did not exist.
    async fn delete(&self, filename: &str) -> Result<bool, StorageError>;

    /// Names of all stored files, excluding the placeholder and anything
    /// that is not a regular file.
    async fn list(&self) -> Result<Vec<String>, StorageError>;

    /// Open a stored file for streaming.
    async fn open(&self, filename: &str) -> Result<BoxReader, StorageError>;

    /// Last modification time of a stored file.
    async fn modified(&self, filename: &str) -> Result<SystemTime, StorageError>;

    /// Advisory delete: failures are logged and swallowed.
    ///
    /// Returns `true` only if a file was actually removed.
    async fn discard(&self, filename: &str) -> bool {
        match self.delete(filename).await {
            Ok(true) => {
                debug!(filename, "Removed upload");
                true
            }
            Ok(false) => false,
            Err(e) => {
                warn!(filename, error = %e, "Failed to remove upload");
                false
            }
        }
    }

    /// Advisory delete of every name in `filenames`.
    async fn discard_all(&self, filenames: &[String]) {
        for filename in filenames {
            self.discard(filename).await;
        }
    }
}
