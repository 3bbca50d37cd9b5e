use crate::schemas::{AppState, HealthResponse};
use axum::{extract::State, http::StatusCode, response::Json};
use sea_orm::{ConnectionTrait, Statement};
use tracing::{instrument, warn};

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Database unreachable", body = HealthResponse)
    )
)]
#[instrument(skip(state))]
pub async fn health_check(
    State(state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let ping = state
        .db
        .execute(Statement::from_string(
            state.db.get_database_backend(),
            "SELECT 1".to_string(),
        ))
        .await;

    let (status, database) = match ping {
        Ok(_) => (StatusCode::OK, "connected"),
        Err(err) => {
            warn!("Health check database ping failed: {}", err);
            (StatusCode::SERVICE_UNAVAILABLE, "unreachable")
        }
    };

    let response = HealthResponse {
        status: if status == StatusCode::OK {
            "ok".to_string()
        } else {
            "degraded".to_string()
        },
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
    };

    (status, Json(response))
}
