use axum::Json;
use axum::extract::{DefaultBodyLimit, FromRequest, Multipart, Path, Query, Request, State};
use axum::extract::multipart::MultipartError;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use common::StorageConfig;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::catalog::sync::{self, ProductSubmission};
use crate::catalog::{RawPayload, UploadedFile};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AdminUser;
use crate::extractors::json::AppJson;
use crate::models::product::{ProductListQuery, ProductResponse};
use crate::state::AppState;

/// Multipart fields carrying the product document, in order of preference.
const PAYLOAD_FIELDS: [&str; 2] = ["payload", "data"];
/// Multipart field carrying media files.
const MEDIA_FILES_FIELD: &str = "mediaFiles";
/// Files accepted in one product write.
const MAX_FILES_PER_REQUEST: usize = 20;

#[utoipa::path(
    get,
    path = "/",
    tag = "Products",
    operation_id = "listProducts",
    summary = "List products",
    description = "Returns products ordered by name, each with media ordered by position. `category` limits the list to one category slug; an unknown slug yields an empty list.",
    params(ProductListQuery),
    responses(
        (status = 200, description = "Products", body = Vec<ProductResponse>),
    ),
)]
#[instrument(skip(state, query), fields(category = ?query.category))]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|slug| !slug.is_empty());
    let records = state.catalog().list_products(category).await?;
    Ok(Json(records.into_iter().map(ProductResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Products",
    operation_id = "getProduct",
    summary = "Get a product",
    params(("id" = String, Path, description = "Product UUID or slug")),
    responses(
        (status = 200, description = "Product", body = ProductResponse),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductResponse>, AppError> {
    let record = state.catalog().get_product(&id).await?;
    Ok(Json(record.into()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Products",
    operation_id = "createProduct",
    summary = "Create a product",
    description = "Accepts `multipart/form-data` with a JSON `payload` (or `data`) field and any number of `mediaFiles` file fields, or an `application/json` body. Media entries reference uploaded files by `fileIndex` or carry an existing `src`. Uploaded files are deleted if the request fails.",
    request_body(content = serde_json::Value, description = "Product document, optionally wrapped in `payload` or `data`"),
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Bad payload (INVALID_PAYLOAD, MISSING_REQUIRED_FIELD, MEDIA_FILE_NOT_FOUND, MEDIA_SOURCE_REQUIRED, VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 409, description = "Slug already in use (CONFLICT)", body = ErrorBody),
        (status = 413, description = "Upload too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, request))]
pub async fn create_product(
    _admin: AdminUser,
    State(state): State<AppState>,
    request: Request,
) -> Result<impl IntoResponse, AppError> {
    let submission = read_submission(&state, request).await?;
    let record = sync::create_product(&state.catalog(), submission).await?;
    Ok((StatusCode::CREATED, Json(ProductResponse::from(record))))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Products",
    operation_id = "updateProduct",
    summary = "Update a product",
    description = "Same body as create. Every collection present in the document replaces the stored one; absent collections are left untouched. Stored media dropped from the list are deleted after commit. Also served on PATCH.",
    params(("id" = String, Path, description = "Product UUID or slug")),
    request_body(content = serde_json::Value, description = "Product document, optionally wrapped in `payload` or `data`"),
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Bad payload (INVALID_PAYLOAD, MISSING_REQUIRED_FIELD, MEDIA_FILE_NOT_FOUND, MEDIA_SOURCE_REQUIRED, VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Slug already in use (CONFLICT)", body = ErrorBody),
        (status = 413, description = "Upload too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, request))]
pub async fn update_product(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    request: Request,
) -> Result<Json<ProductResponse>, AppError> {
    let submission = read_submission(&state, request).await?;
    let record = sync::update_product(&state.catalog(), &id, submission).await?;
    Ok(Json(record.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Products",
    operation_id = "deleteProduct",
    summary = "Delete a product",
    description = "Deletes the product and its child rows. Stored media files are left for the orphan cleanup.",
    params(("id" = String, Path, description = "Product UUID or slug")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Product not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin))]
pub async fn delete_product(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.catalog().delete_product(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Body limit layer for product writes: room for a full batch of media files.
pub fn product_body_limit(storage: &StorageConfig) -> DefaultBodyLimit {
    let files = storage
        .max_file_size
        .saturating_mul(MAX_FILES_PER_REQUEST as u64)
        .saturating_add(1024 * 1024);
    DefaultBodyLimit::max(usize::try_from(files).unwrap_or(usize::MAX))
}

fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.trim_start().to_ascii_lowercase().starts_with("multipart/form-data"))
}

async fn read_submission(state: &AppState, request: Request) -> Result<ProductSubmission, AppError> {
    if is_multipart(request.headers()) {
        let multipart = Multipart::from_request(request, state)
            .await
            .map_err(|e| AppError::InvalidPayload(e.body_text()))?;
        return read_multipart(state, multipart).await;
    }

    let AppJson(body) = AppJson::<Value>::from_request(request, state).await?;
    Ok(ProductSubmission {
        payload: RawPayload::from_envelope(body),
        uploads: Vec::new(),
    })
}

/// Collect the product document and store every media file as it streams in.
///
/// If reading fails part way, the files already stored are discarded. A
/// missing document becomes an empty one so the write pipeline reports the
/// first missing field and cleans up the stored files itself.
async fn read_multipart(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<ProductSubmission, AppError> {
    let mut documents: [Option<String>; 2] = [None, None];
    let mut uploads: Vec<UploadedFile> = Vec::new();

    let collected: Result<(), AppError> = async {
        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or_default().to_string();

            if let Some(slot) = PAYLOAD_FIELDS.iter().position(|f| *f == name) {
                documents[slot] = Some(field.text().await.map_err(multipart_error)?);
                continue;
            }

            let is_media = name == MEDIA_FILES_FIELD || name == format!("{MEDIA_FILES_FIELD}[]");
            if !is_media {
                debug!(field = %name, "Ignoring multipart field");
                continue;
            }
            if uploads.len() >= MAX_FILES_PER_REQUEST {
                return Err(AppError::Validation(format!(
                    "At most {MAX_FILES_PER_REQUEST} media files per request"
                )));
            }

            let original_name = field.file_name().unwrap_or("media").to_string();
            let data = field.bytes().await.map_err(multipart_error)?;
            let filename = state.uploads.store(&original_name, &data).await?;
            debug!(%filename, %original_name, size = data.len(), "Stored media upload");
            uploads.push(UploadedFile {
                filename,
                original_name,
            });
        }
        Ok(())
    }
    .await;

    if let Err(e) = collected {
        let stored: Vec<String> = uploads.into_iter().map(|f| f.filename).collect();
        state.uploads.discard_all(&stored).await;
        return Err(e);
    }

    let [payload, data] = documents;
    let payload = match payload.or(data) {
        Some(text) => RawPayload::Encoded(text),
        None => RawPayload::Parsed(Value::Object(Map::new())),
    };

    Ok(ProductSubmission { payload, uploads })
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::InvalidPayload(e.body_text())
    }
}
