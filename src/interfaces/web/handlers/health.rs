use axum::{Json, extract::State};

use super::super::AppState;

pub async fn health_endpoint(State(state): State<AppState>) -> Json<serde_json::Value> {
    let timestamp_ms = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    Json(serde_json::json!({
        "status": "ok",
        "service": "fudai",
        "timestamp": timestamp_ms,
        "features": {
            "voice": state.config.voice_enabled(),
            "image": state.config.image_enabled(),
            "vision": state.config.vision_enabled(),
        }
    }))
}
