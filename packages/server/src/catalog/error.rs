use common::storage::StorageError;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("Media file not found for index {0}")]
    MediaFileNotFound(i64),

    #[error("Media entry {0} needs either an uploaded file or an existing src")]
    MediaSourceRequired(usize),

    #[error("Category '{0}' does not exist")]
    UnknownCategory(String),

    #[error("Slug '{0}' is already in use")]
    SlugTaken(String),

    #[error("Product not found")]
    ProductNotFound,

    #[error("Category not found")]
    CategoryNotFound,

    #[error("Category is still referenced by {0} product(s)")]
    CategoryInUse(u64),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl CatalogError {
    /// Whether the error was caused by the request rather than the server.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            Self::Database(_) | Self::Storage(StorageError::Io(_))
        )
    }
}
