//! Liveness endpoint

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::backend::db::Database;

/// GET /health
///
/// Always 200 without a store. With one, 200 only if the store answers.
pub async fn health(State(db): State<Option<Database>>) -> (StatusCode, Json<Value>) {
    let Some(db) = db else {
        return (
            StatusCode::OK,
            Json(json!({ "status": "ok", "database": "not configured" })),
        );
    };

    match db.ping().await {
        Ok(timestamp) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "database": "connected", "timestamp": timestamp })),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "status": "error", "message": "Failed to query database" })),
            )
        }
    }
}
