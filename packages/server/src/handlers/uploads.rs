use axum::Json;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use common::storage::filename::validate_flat_filename;
use tokio_util::io::ReaderStream;
use tracing::{info, instrument};

use crate::catalog::ReconcileReport;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AdminUser;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/cleanup",
    tag = "Uploads",
    operation_id = "cleanupUploads",
    summary = "Delete orphaned uploads",
    description = "Deletes every stored upload that no product media references and reports what was removed. Running it twice in a row removes nothing the second time.",
    responses(
        (status = 200, description = "Cleanup report", body = ReconcileReport),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin))]
pub async fn cleanup_uploads(
    _admin: AdminUser,
    State(state): State<AppState>,
) -> Result<Json<ReconcileReport>, AppError> {
    let report = state.reconciler().reconcile().await?;
    info!(total_removed = report.total_removed, "Upload cleanup finished");
    Ok(Json(report))
}

/// Stream a stored upload. Served outside the API prefix at `/uploads/{filename}`.
#[instrument(skip(state))]
pub async fn serve_upload(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let name = validate_flat_filename(&filename)
        .map_err(|e| AppError::Validation(e.message().into()))?;
    if name.starts_with('.') {
        return Err(AppError::NotFound(format!("Upload '{name}' not found")));
    }

    let reader = state.uploads.open(name).await?;
    let content_type = mime_guess::from_path(name).first_or_octet_stream();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.as_ref())
        .header(header::CACHE_CONTROL, "public, max-age=86400")
        .body(Body::from_stream(ReaderStream::new(reader)))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}
