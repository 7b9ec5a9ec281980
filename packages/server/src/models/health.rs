use serde::Serialize;

/// Liveness and database reachability.
#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    /// `ok` when the database answered a ping, otherwise `error`.
    #[schema(example = "ok")]
    pub status: &'static str,
}
