//! Generated upload names and flat-name validation.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

/// Base used when nothing survives sanitization.
pub const FALLBACK_BASE: &str = "media";

const MAX_BASE_LEN: usize = 40;
const NONCE_UPPER: u32 = 1_000_000_000;

/// Reasons a name cannot address an entry of the flat upload directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilenameError {
    /// Filename is empty or whitespace-only.
    Empty,
    /// Filename contains path separators (`/` or `\`).
    ContainsPathSeparator,
    /// Filename is a `.` or `..` directory reference.
    PathTraversal,
    /// Filename contains null bytes or other control characters.
    ControlCharacter,
}

impl FilenameError {
    /// Returns a human-readable error message.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Empty => "Filename cannot be empty",
            Self::ContainsPathSeparator => "Invalid filename: path separators are not allowed",
            Self::PathTraversal => "Invalid filename: directory references are not allowed",
            Self::ControlCharacter => "Invalid filename: control characters are not allowed",
        }
    }
}

/// Validates a flat filename (no directory components allowed).
pub fn validate_flat_filename(filename: &str) -> Result<&str, FilenameError> {
    if filename.trim().is_empty() {
        return Err(FilenameError::Empty);
    }

    if filename.chars().any(|c| c.is_control()) {
        return Err(FilenameError::ControlCharacter);
    }

    if filename.contains('/') || filename.contains('\\') {
        return Err(FilenameError::ContainsPathSeparator);
    }

    if filename == "." || filename == ".." {
        return Err(FilenameError::PathTraversal);
    }

    Ok(filename)
}

/// Last path component of `path`, accepting both separator styles.
pub fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Splits a file name into stem and extension (extension keeps its dot).
///
/// A dot that only leads the name does not start an extension, so `.env`
/// has no extension while `photo.JPG` has `.JPG`.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if name[..idx].chars().any(|c| c != '.') => name.split_at(idx),
        _ => (name, ""),
    }
}

/// Keeps `[A-Za-z0-9_-]`, truncated to 40 characters, falling back to `media`.
pub fn sanitize_base(stem: &str) -> String {
    let sanitized: String = stem
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'))
        .take(MAX_BASE_LEN)
        .collect();

    if sanitized.is_empty() {
        FALLBACK_BASE.to_string()
    } else {
        sanitized
    }
}

fn sanitize_extension(ext: &str) -> String {
    let kept: String = ext
        .chars()
        .skip(1)
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();

    if kept.is_empty() {
        String::new()
    } else {
        format!(".{kept}")
    }
}

/// Generates `<sanitizedBase>-<unix_ms>-<random>` followed by the original extension.
pub fn generate(original_name: &str) -> String {
    let unix_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let nonce = rand::rng().random_range(0..=NONCE_UPPER);
    compose(original_name, unix_ms, nonce)
}

fn compose(original_name: &str, unix_ms: u128, nonce: u32) -> String {
    let (stem, ext) = split_extension(basename(original_name));
    format!(
        "{}-{unix_ms}-{nonce}{}",
        sanitize_base(stem),
        sanitize_extension(ext)
    )
}
