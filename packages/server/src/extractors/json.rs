use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// A `Json<T>` wrapper whose rejections become structured `AppError` responses.
///
/// Syntax errors map to `INVALID_PAYLOAD`; shape errors map to `VALIDATION_ERROR`.
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| match e {
                JsonRejection::JsonSyntaxError(_) => AppError::InvalidPayload(e.body_text()),
                _ => AppError::Validation(e.body_text()),
            })?;
        Ok(AppJson(value))
    }
}
