use axum::{Json, extract::State};
use sea_orm::*;
use tracing::instrument;

use crate::entity::admin_user;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AdminUser;
use crate::extractors::json::AppJson;
use crate::models::auth::{
    AdminResponse, LoginRequest, LoginResponse, SessionResponse, validate_login_request,
};
use crate::state::AppState;
use crate::utils::{hash, jwt};

#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    operation_id = "login",
    summary = "Admin login",
    description = "Exchanges admin credentials for a bearer token.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Invalid credentials (INVALID_CREDENTIALS)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    validate_login_request(&payload)?;

    let email = payload.email.trim().to_lowercase();

    let admin = admin_user::Entity::find()
        .filter(admin_user::Column::Email.eq(email))
        .one(&state.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let is_valid = hash::verify_password(&payload.password, &admin.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;

    if !is_valid {
        return Err(AppError::InvalidCredentials);
    }

    let auth = &state.config.auth;
    let token = jwt::sign(admin.id, &admin.email, &auth.jwt_secret, auth.token_ttl_secs)
        .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))?;

    Ok(Json(LoginResponse {
        token,
        user: AdminResponse::from(admin),
    }))
}

#[utoipa::path(
    get,
    path = "/session",
    tag = "Auth",
    operation_id = "getSession",
    summary = "Current admin session",
    description = "Returns the admin behind the bearer token. With authentication disabled every caller is an anonymous admin.",
    responses(
        (status = 200, description = "Current session", body = SessionResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, admin), fields(admin_id = ?admin.id))]
pub async fn session(admin: AdminUser, State(state): State<AppState>) -> Json<SessionResponse> {
    Json(SessionResponse {
        id: admin.id,
        email: admin.email,
        auth_enabled: state.config.auth.enabled,
    })
}
