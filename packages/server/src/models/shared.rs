use serde::{Deserialize, Deserializer};

use crate::catalog::payload::normalize_text;
use crate::error::AppError;

/// Serde helper for PATCH semantics on nullable fields.
///
/// * JSON field absent  => `None`          (don't update)
/// * JSON field = null  => `Some(None)`    (set to NULL)
/// * JSON field = value => `Some(Some(v))` (set to value)
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

/// Trim a PATCH field; whitespace-only becomes an explicit NULL.
pub fn normalize_nullable(field: Option<Option<String>>) -> Option<Option<String>> {
    field.map(|value| value.as_deref().and_then(normalize_text))
}

/// Trim a field that must not be blank when present.
pub fn non_blank(value: Option<String>, field: &str) -> Result<Option<String>, AppError> {
    match value {
        None => Ok(None),
        Some(text) => normalize_text(&text)
            .map(Some)
            .ok_or_else(|| AppError::MissingRequiredField(format!("Missing required field: {field}"))),
    }
}
