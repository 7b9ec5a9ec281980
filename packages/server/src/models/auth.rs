use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Request body for admin login.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    /// Admin account email.
    #[schema(example = "admin@example.com")]
    pub email: String,
    /// Account password.
    #[schema(example = "s3cure_P@ss!")]
    pub password: String,
}

pub fn validate_login_request(payload: &LoginRequest) -> Result<(), AppError> {
    if payload.email.trim().is_empty() {
        return Err(AppError::Validation("Email must not be empty".into()));
    }
    if payload.password.is_empty() {
        return Err(AppError::Validation("Password must not be empty".into()));
    }
    Ok(())
}

/// Public view of an admin account.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AdminResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "admin@example.com")]
    pub email: String,
}

impl From<crate::entity::admin_user::Model> for AdminResponse {
    fn from(admin: crate::entity::admin_user::Model) -> Self {
        Self {
            id: admin.id,
            email: admin.email,
        }
    }
}

/// Successful login response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    /// Bearer token for `Authorization` headers.
    pub token: String,
    pub user: AdminResponse,
}

/// The admin behind the current request.
#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    /// `null` when authentication is disabled.
    pub id: Option<i32>,
    pub email: Option<String>,
    pub auth_enabled: bool,
}
