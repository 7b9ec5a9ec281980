use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt;

/// Administrator extracted from the `Authorization: Bearer <token>` header.
///
/// Add this as a handler parameter to guard a catalog write. With
/// `auth.enabled = false` every request passes as an anonymous admin.
#[derive(Debug, Clone)]
pub struct AdminUser {
    /// `None` for the anonymous admin.
    pub id: Option<i32>,
    pub email: Option<String>,
}

impl AdminUser {
    fn anonymous() -> Self {
        Self {
            id: None,
            email: None,
        }
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if !state.config.auth.enabled {
            return Ok(AdminUser::anonymous());
        }

        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::TokenMissing)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(AppError::TokenInvalid)?;

        let claims = jwt::verify(token, &state.config.auth.jwt_secret)
            .map_err(|_| AppError::TokenInvalid)?;

        Ok(AdminUser {
            id: Some(claims.uid),
            email: Some(claims.sub),
        })
    }
}
