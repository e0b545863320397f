use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde_json::json;

use crate::db;
use crate::error::AppError;
use crate::models::LogEntry;
use crate::state::SharedState;
use crate::timestamp;

pub async fn ingest(
    State(state): State<SharedState>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, AppError> {
    let mut entry: LogEntry = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid log entry: {e}")))?;

    entry.timestamp = timestamp::normalize(&entry.timestamp, &state.config.time_zone)
        .map_err(|_| AppError::BadRequest("Invalid timestamp format".to_string()))?;

    let id = db::logs::insert(&state.pool, &entry).await?;

    tracing::info!(
        id,
        system = %entry.system,
        user = %entry.user,
        "Log entry recorded"
    );

    Ok(Json(json!({ "status": "success" })))
}
