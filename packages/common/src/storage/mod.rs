mod error;
mod traits;

pub mod filename;
pub mod filesystem;

pub use error::StorageError;
pub use filesystem::FilesystemUploadStore;
pub use traits::{BoxReader, PLACEHOLDER_ENTRY, UploadStore};
