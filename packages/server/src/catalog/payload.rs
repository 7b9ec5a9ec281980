//! Turns a create/update request into a normalized product payload.

use serde::Deserialize;
use serde_json::Value;

use super::error::CatalogError;
use crate::models::shared::{double_option, normalize_nullable};

/// Envelope keys checked, in order, for the product document.
const ENVELOPE_KEYS: [&str; 2] = ["payload", "data"];

/// Product document as received: already parsed, or still JSON-encoded text
/// (multipart form fields always arrive as text).
#[derive(Debug, Clone)]
pub enum RawPayload {
    Parsed(Value),
    Encoded(String),
}

impl RawPayload {
    /// Unwrap a JSON request body.
    ///
    /// The document is read from `payload`, falling back to `data`; a body
    /// carrying neither is taken to be the document itself.
    pub fn from_envelope(body: Value) -> Self {
        if let Value::Object(map) = &body {
            for key in ENVELOPE_KEYS {
                match map.get(key) {
                    Some(Value::String(text)) => return Self::Encoded(text.clone()),
                    Some(Value::Null) | None => continue,
                    Some(value) => return Self::Parsed(value.clone()),
                }
            }
        }
        Self::Parsed(body)
    }

    fn into_document(self) -> Result<ProductDocument, CatalogError> {
        let value = match self {
            Self::Parsed(value) => value,
            Self::Encoded(text) => serde_json::from_str(&text)
                .map_err(|e| CatalogError::InvalidPayload(format!("malformed JSON: {e}")))?,
        };

        if !value.is_object() {
            return Err(CatalogError::InvalidPayload(
                "product payload must be a JSON object".into(),
            ));
        }

        serde_json::from_value(value).map_err(|e| CatalogError::InvalidPayload(e.to_string()))
    }
}

/// A list field given either as an array or as one newline/comma delimited string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ListInput {
    Items(Vec<Value>),
    Delimited(String),
}

impl ListInput {
    /// Trimmed, non-empty entries in input order. Non-string array items are dropped.
    pub fn normalize(self) -> Vec<String> {
        match self {
            Self::Items(items) => items
                .iter()
                .filter_map(Value::as_str)
                .filter_map(normalize_text)
                .collect(),
            Self::Delimited(text) => text.split(['\n', ',']).filter_map(normalize_text).collect(),
        }
    }
}

/// Where a media entry's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// Index into the files uploaded with the same request.
    Upload(i64),
    /// A path or URL already known to the client.
    Existing(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaEntry {
    #[serde(default)]
    pub file_index: Option<i64>,
    #[serde(default)]
    pub src: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
}

impl MediaEntry {
    /// The entry's source; an uploaded file wins over `src`.
    pub fn source(&self) -> Option<MediaSource> {
        if let Some(index) = self.file_index {
            return Some(MediaSource::Upload(index));
        }
        self.src
            .as_deref()
            .and_then(normalize_text)
            .map(MediaSource::Existing)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetEntry {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpecsDocument {
    #[serde(default, deserialize_with = "double_option")]
    designer: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    dimensions: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    light_source: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    lead_time: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    warranty: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    materials: Option<Option<ListInput>>,
    #[serde(default, deserialize_with = "double_option")]
    finish_options: Option<Option<ListInput>>,
    #[serde(default, deserialize_with = "double_option", alias = "customizations")]
    customization: Option<Option<ListInput>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductDocument {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    category_id: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    summary: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    description: Option<Option<String>>,
    #[serde(default)]
    specs: Option<SpecsDocument>,
    #[serde(default, deserialize_with = "double_option")]
    media: Option<Option<Vec<MediaEntry>>>,
    #[serde(default, deserialize_with = "double_option")]
    assets: Option<Option<Vec<AssetEntry>>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedAsset {
    pub kind: String,
    pub url: String,
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Normalized product write.
///
/// Free-text fields use `None` for "absent from the request" and `Some(None)`
/// for "clear". Collections use `None` for "absent" and are otherwise replaced
/// wholesale.
#[derive(Debug, Clone, Default)]
pub struct ProductPayload {
    pub name: String,
    pub slug: String,
    /// Category UUID or slug.
    pub category: String,
    pub summary: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub designer: Option<Option<String>>,
    pub dimensions: Option<Option<String>>,
    pub light_source: Option<Option<String>>,
    pub lead_time: Option<Option<String>>,
    pub warranty: Option<Option<String>>,
    pub materials: Option<Vec<String>>,
    pub finish_options: Option<Vec<String>>,
    pub customizations: Option<Vec<String>>,
    pub media: Option<Vec<MediaEntry>>,
    pub assets: Option<Vec<ResolvedAsset>>,
}

/// A file accepted from the current request and already written to the upload store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub filename: String,
    pub original_name: String,
}

/// A media entry ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMedia {
    pub position: i32,
    pub src: String,
    pub alt: Option<String>,
}

/// Trim; empty after trimming becomes `None`.
pub fn normalize_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn normalize_list(field: Option<Option<ListInput>>) -> Option<Vec<String>> {
    field.map(|value| value.map(ListInput::normalize).unwrap_or_default())
}

fn require(value: Option<String>, field: &'static str) -> Result<String, CatalogError> {
    value
        .as_deref()
        .and_then(normalize_text)
        .ok_or(CatalogError::MissingRequiredField(field))
}

/// Slugs appear in URLs: ASCII letters, digits, `-` and `_` only.
pub fn validate_slug(slug: &str) -> Result<(), CatalogError> {
    if slug.len() > 128
        || !slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
    {
        return Err(CatalogError::Validation(format!(
            "Slug '{slug}' may only contain letters, digits, '-' and '_' (max 128)"
        )));
    }
    Ok(())
}

fn resolve_assets(entries: Vec<AssetEntry>) -> Result<Vec<ResolvedAsset>, CatalogError> {
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let url = entry.url.as_deref().and_then(normalize_text).ok_or_else(|| {
                CatalogError::InvalidPayload(format!("asset {index} is missing its url"))
            })?;
            Ok(ResolvedAsset {
                kind: entry
                    .kind
                    .as_deref()
                    .and_then(normalize_text)
                    .unwrap_or_else(|| "link".into()),
                url,
                title: entry.title.as_deref().and_then(normalize_text),
                description: entry.description.as_deref().and_then(normalize_text),
            })
        })
        .collect()
}

/// Parse and normalize a product document.
pub fn resolve_payload(raw: RawPayload) -> Result<ProductPayload, CatalogError> {
    let doc = raw.into_document()?;

    let name = require(doc.name, "name")?;
    let slug = require(doc.slug, "slug")?;
    let category = require(doc.category_id, "categoryId")?;
    validate_slug(&slug)?;

    let specs = doc.specs.unwrap_or_default();
    let assets = match doc.assets {
        Some(entries) => Some(resolve_assets(entries.unwrap_or_default())?),
        None => None,
    };

    Ok(ProductPayload {
        name,
        slug,
        category,
        summary: normalize_nullable(doc.summary),
        description: normalize_nullable(doc.description),
        designer: normalize_nullable(specs.designer),
        dimensions: normalize_nullable(specs.dimensions),
        light_source: normalize_nullable(specs.light_source),
        lead_time: normalize_nullable(specs.lead_time),
        warranty: normalize_nullable(specs.warranty),
        materials: normalize_list(specs.materials),
        finish_options: normalize_list(specs.finish_options),
        customizations: normalize_list(specs.customization),
        media: doc.media.map(Option::unwrap_or_default),
        assets,
    })
}

/// Cut everything before the first `url_segment` occurrence, so echoed absolute
/// URLs become storage-relative. Idempotent.
pub fn normalize_media_src(src: &str, url_segment: &str) -> String {
    match src.find(url_segment) {
        Some(start) => src[start..].to_string(),
        None => src.to_string(),
    }
}

/// Map media entries onto uploaded files or existing sources.
///
/// Positions follow the entry order. Any unresolvable entry fails the whole batch.
pub fn resolve_media(
    entries: &[MediaEntry],
    uploads: &[UploadedFile],
    url_segment: &str,
) -> Result<Vec<ResolvedMedia>, CatalogError> {
    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let src = match entry.source() {
                Some(MediaSource::Upload(file_index)) => {
                    let file = usize::try_from(file_index)
                        .ok()
                        .and_then(|i| uploads.get(i))
                        .ok_or(CatalogError::MediaFileNotFound(file_index))?;
                    format!("{url_segment}{}", file.filename)
                }
                Some(MediaSource::Existing(src)) => normalize_media_src(&src, url_segment),
                None => return Err(CatalogError::MediaSourceRequired(index)),
            };

            Ok(ResolvedMedia {
                position: index as i32,
                src,
                alt: entry.alt.as_deref().and_then(normalize_text),
            })
        })
        .collect()
}
