use std::fmt;

/// Errors that can occur during upload store operations.
#[derive(Debug)]
pub enum StorageError {
    /// The requested file was not found.
    NotFound(String),
    /// The filename is not a flat, visible file name.
    InvalidFilename(String),
    /// An I/O error occurred.
    Io(std::io::Error),
    /// The upload exceeds the configured size limit.
    SizeLimitExceeded { actual: u64, limit: u64 },
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(name) => write!(f, "upload not found: {name}"),
            Self::InvalidFilename(name) => write!(f, "invalid upload filename: {name:?}"),
            Self::Io(err) => write!(f, "storage IO error: {err}"),
            Self::SizeLimitExceeded { actual, limit } => {
                write!(f, "upload exceeds size limit ({actual} > {limit} bytes)")
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
