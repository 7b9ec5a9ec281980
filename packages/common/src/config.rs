use std::path::PathBuf;

use serde::Deserialize;

/// Upload store configuration, shared by the server and any offline tooling.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory holding uploaded media. Default: "./data/uploads".
    #[serde(default = "default_uploads_dir")]
    pub uploads_dir: PathBuf,
    /// Public URL prefix the directory is served under. Default: "/uploads".
    #[serde(default = "default_url_prefix")]
    pub url_prefix: String,
    /// Maximum accepted size of a single upload in bytes. Default: 10 MiB.
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
}

fn default_uploads_dir() -> PathBuf {
    PathBuf::from("./data/uploads")
}
fn default_url_prefix() -> String {
    "/uploads".into()
}
fn default_max_file_size() -> u64 {
    10 * 1024 * 1024
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            uploads_dir: default_uploads_dir(),
            url_prefix: default_url_prefix(),
            max_file_size: default_max_file_size(),
        }
    }
}

impl StorageConfig {
    /// URL prefix with exactly one leading and one trailing slash, e.g. `/uploads/`.
    pub fn url_segment(&self) -> String {
        format!("/{}/", self.url_prefix.trim_matches('/'))
    }

    /// Reject settings the store cannot work with.
    ///
    /// A prefix of only slashes would match every rooted path and cut
    /// external media URLs at their first slash.
    pub fn validate(&self) -> Result<(), String> {
        if self.url_prefix.trim().trim_matches('/').is_empty() {
            return Err(format!(
                "storage.url_prefix must name a path segment, got {:?}",
                self.url_prefix
            ));
        }
        if self.max_file_size == 0 {
            return Err("storage.max_file_size must be greater than zero".into());
        }
        Ok(())
    }
}
