use axum::{Json, extract::State, http::StatusCode};
use tracing::{instrument, warn};

use crate::models::health::HealthResponse;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    operation_id = "health",
    summary = "Service health",
    description = "Pings the database. Returns 200 `{status: \"ok\"}` when it answers, otherwise 500 `{status: \"error\"}`.",
    responses(
        (status = 200, description = "Database reachable", body = HealthResponse),
        (status = 500, description = "Database unreachable", body = HealthResponse),
    ),
)]
#[instrument(skip(state))]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match state.db.ping().await {
        Ok(()) => (StatusCode::OK, Json(HealthResponse { status: "ok" })),
        Err(e) => {
            warn!(error = %e, "Database ping failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthResponse { status: "error" }),
            )
        }
    }
}
