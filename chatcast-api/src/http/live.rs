//! Control endpoints for the upstream session.
//!
//! Success responses acknowledge that the operation was accepted; the
//! `connected`/`disconnected` confirmations reach viewers as broadcasts.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::http::{AppResult, AppState};

#[derive(Debug, Deserialize)]
pub struct ConnectRequest {
    #[serde(rename = "streamId", default)]
    pub stream_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AckResponse {
    pub message: String,
}

/// POST /api/live/connect
pub async fn connect(
    State(state): State<AppState>,
    Json(request): Json<ConnectRequest>,
) -> AppResult<Json<AckResponse>> {
    let message = state.coordinator.start_session(&request.stream_id).await?;
    Ok(Json(AckResponse { message }))
}

/// POST /api/live/disconnect
pub async fn disconnect(State(state): State<AppState>) -> AppResult<Json<AckResponse>> {
    let message = state.coordinator.stop_session().await?;
    Ok(Json(AckResponse { message }))
}
