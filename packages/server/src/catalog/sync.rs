//! Product write pipeline: resolve, persist, and clean up the request's uploads.
//!
//! Files accepted with a request are already in the upload store when the
//! pipeline starts. If any step fails they are all discarded; on success the
//! ones no media entry ended up referencing are discarded too.

use std::collections::HashSet;

use tracing::warn;

use super::error::CatalogError;
use super::payload::{RawPayload, ResolvedMedia, UploadedFile, resolve_media, resolve_payload};
use super::repository::{CatalogRepository, ProductRecord};

/// One product create/update request after its files have been stored.
#[derive(Debug, Clone)]
pub struct ProductSubmission {
    pub payload: RawPayload,
    pub uploads: Vec<UploadedFile>,
}

pub async fn create_product(
    repo: &CatalogRepository<'_>,
    submission: ProductSubmission,
) -> Result<ProductRecord, CatalogError> {
    let ProductSubmission { payload, uploads } = submission;

    let result: Result<_, CatalogError> = async {
        let payload = resolve_payload(payload)?;
        let media = match &payload.media {
            Some(entries) => resolve_media(entries, &uploads, repo.url_segment())?,
            None => Vec::new(),
        };
        let record = repo.create_product(&payload, &media).await?;
        Ok((record, media))
    }
    .await;

    settle_uploads(repo, &uploads, result).await
}

pub async fn update_product(
    repo: &CatalogRepository<'_>,
    reference: &str,
    submission: ProductSubmission,
) -> Result<ProductRecord, CatalogError> {
    let ProductSubmission { payload, uploads } = submission;

    let result: Result<_, CatalogError> = async {
        repo.ensure_product(reference).await?;
        let payload = resolve_payload(payload)?;
        let media = match &payload.media {
            Some(entries) => Some(resolve_media(entries, &uploads, repo.url_segment())?),
            None => None,
        };
        let record = repo
            .update_product(reference, &payload, media.as_deref())
            .await?;
        Ok((record, media.unwrap_or_default()))
    }
    .await;

    settle_uploads(repo, &uploads, result).await
}

async fn settle_uploads(
    repo: &CatalogRepository<'_>,
    uploads: &[UploadedFile],
    result: Result<(ProductRecord, Vec<ResolvedMedia>), CatalogError>,
) -> Result<ProductRecord, CatalogError> {
    if uploads.is_empty() {
        return result.map(|(record, _)| record);
    }

    match result {
        Ok((record, media)) => {
            let used: HashSet<&str> = media
                .iter()
                .filter_map(|m| repo.stored_filename(&m.src))
                .collect();
            for file in uploads.iter().filter(|f| !used.contains(f.filename.as_str())) {
                warn!(
                    filename = %file.filename,
                    original_name = %file.original_name,
                    "Discarding upload no media entry referenced"
                );
                repo.discard_upload(&file.filename).await;
            }
            Ok(record)
        }
        Err(e) => {
            if e.is_client_error() {
                warn!(error = %e, files = uploads.len(), "Rejected product write, discarding uploads");
            }
            for file in uploads {
                repo.discard_upload(&file.filename).await;
            }
            Err(e)
        }
    }
}
