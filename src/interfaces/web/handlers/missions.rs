//! CRUD over the typed state store: wizard missions and the generated-media
//! cache. Writes are last-write-wins, matching the storage semantics the
//! original frontend tolerated.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use super::super::{AppState, error_response};
use crate::core::store::{MediaRecord, Mission};

type ApiResult = Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)>;

fn internal(e: anyhow::Error) -> (StatusCode, Json<serde_json::Value>) {
    error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

pub async fn list_missions(State(state): State<AppState>) -> ApiResult {
    let store = state.store.lock().await;
    let missions = store.list_missions().map_err(internal)?;
    Ok(Json(serde_json::json!({ "missions": missions })))
}

pub async fn put_mission(
    State(state): State<AppState>,
    Json(mission): Json<Mission>,
) -> ApiResult {
    if mission.id.trim().is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "mission id must not be empty",
        ));
    }
    let store = state.store.lock().await;
    store.put_mission(&mission).map_err(internal)?;
    Ok(Json(serde_json::json!({ "mission": mission })))
}

pub async fn get_mission(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let store = state.store.lock().await;
    match store.get_mission(&id).map_err(internal)? {
        Some(mission) => Ok(Json(serde_json::json!({ "mission": mission }))),
        None => Err(error_response(
            StatusCode::NOT_FOUND,
            format!("mission not found: {id}"),
        )),
    }
}

pub async fn delete_mission(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let store = state.store.lock().await;
    if store.delete_mission(&id).map_err(internal)? {
        Ok(Json(serde_json::json!({ "deleted": id })))
    } else {
        Err(error_response(
            StatusCode::NOT_FOUND,
            format!("mission not found: {id}"),
        ))
    }
}

#[derive(Deserialize)]
pub struct NewMediaRecord {
    pub mission_id: String,
    pub kind: String,
    pub url: String,
}

pub async fn list_media(State(state): State<AppState>) -> ApiResult {
    let store = state.store.lock().await;
    let media = store.list_media().map_err(internal)?;
    Ok(Json(serde_json::json!({ "media": media })))
}

pub async fn put_media(
    State(state): State<AppState>,
    Json(payload): Json<NewMediaRecord>,
) -> ApiResult {
    if payload.url.trim().is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "media url must not be empty",
        ));
    }
    let record = MediaRecord {
        id: uuid::Uuid::new_v4().to_string(),
        mission_id: payload.mission_id,
        kind: payload.kind,
        url: payload.url,
        created_at: now_utc(),
    };
    let store = state.store.lock().await;
    store.put_media(&record).map_err(internal)?;
    Ok(Json(serde_json::json!({ "record": record })))
}

pub async fn get_media(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult {
    let store = state.store.lock().await;
    match store.get_media(&id).map_err(internal)? {
        Some(record) => Ok(Json(serde_json::json!({ "record": record }))),
        None => Err(error_response(
            StatusCode::NOT_FOUND,
            format!("media record not found: {id}"),
        )),
    }
}

fn now_utc() -> String {
    // Seconds precision is enough for a cache ordering key.
    let secs = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    secs.to_string()
}
