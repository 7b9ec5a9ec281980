use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AdminUser;
use crate::extractors::json::AppJson;
use crate::models::category::{CategoryRequest, CategoryResponse};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Categories",
    operation_id = "listCategories",
    summary = "List categories",
    description = "Returns every category ordered by `position`, then name.",
    responses(
        (status = 200, description = "Categories", body = Vec<CategoryResponse>),
    ),
)]
#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryResponse>>, AppError> {
    let records = state.catalog().list_categories().await?;
    Ok(Json(
        records.into_iter().map(CategoryResponse::from).collect(),
    ))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Categories",
    operation_id = "getCategory",
    summary = "Get a category",
    params(("id" = String, Path, description = "Category UUID or slug")),
    responses(
        (status = 200, description = "Category", body = CategoryResponse),
        (status = 404, description = "Category not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CategoryResponse>, AppError> {
    let record = state.catalog().get_category(&id).await?;
    Ok(Json(record.into()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Categories",
    operation_id = "createCategory",
    summary = "Create a category",
    description = "`slug` and `name` are required. `position` defaults to the end of the list.",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Category created", body = CategoryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR, MISSING_REQUIRED_FIELD)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 409, description = "Slug already in use (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, payload), fields(slug = ?payload.slug))]
pub async fn create_category(
    _admin: AdminUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    let record = state
        .catalog()
        .create_category(payload.into_payload()?)
        .await?;
    Ok((StatusCode::CREATED, Json(CategoryResponse::from(record))))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Categories",
    operation_id = "updateCategory",
    summary = "Update a category",
    description = "Absent fields are left untouched. `highlights`, when present, replaces the whole list. Also served on PATCH.",
    params(("id" = String, Path, description = "Category UUID or slug")),
    request_body = CategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = CategoryResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR, MISSING_REQUIRED_FIELD)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Category not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Slug already in use (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin, payload))]
pub async fn update_category(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<CategoryRequest>,
) -> Result<Json<CategoryResponse>, AppError> {
    let record = state
        .catalog()
        .update_category(&id, payload.into_payload()?)
        .await?;
    Ok(Json(record.into()))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Categories",
    operation_id = "deleteCategory",
    summary = "Delete a category",
    description = "With the default `reject` policy a category that still has products is not deleted (409). With `cascade` its products are deleted too.",
    params(("id" = String, Path, description = "Category UUID or slug")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Category not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Category still has products (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _admin))]
pub async fn delete_category(
    _admin: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.catalog().delete_category(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
