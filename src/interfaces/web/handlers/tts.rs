//! Fish Audio pass-through. The bearer key never leaves the server; the
//! upstream status, content type and body are relayed unchanged. No retries,
//! no backoff: a failed call surfaces directly to the caller.

use axum::{
    body::Body,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use std::time::Duration;
use tracing::{info, warn};

use super::super::{AppState, error_response};
use crate::core::providers::ProviderRegistry;

const TTS_TIMEOUT: Duration = Duration::from_secs(120);
const MODEL_LIST_TIMEOUT: Duration = Duration::from_secs(30);

fn fish_audio_base() -> String {
    ProviderRegistry::load()
        .get_provider("fish_audio")
        .map(|p| p.base_url.clone())
        .unwrap_or_else(|| "https://api.fish.audio".to_string())
}

/// `POST /v1/tts`: synthesize speech. Request body is forwarded verbatim.
pub async fn tts_endpoint(State(state): State<AppState>, body: Bytes) -> Response {
    let Some(key) = state.config.fish_audio_key.clone() else {
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Fish Audio API key is not configured",
        )
        .into_response();
    };

    info!("proxying TTS request to Fish Audio ({} bytes)", body.len());

    let result = state
        .http
        .post(format!("{}/v1/tts", fish_audio_base()))
        .bearer_auth(key)
        .header(header::CONTENT_TYPE, "application/json")
        .timeout(TTS_TIMEOUT)
        .body(body)
        .send()
        .await;

    relay_upstream(result, "Fish Audio").await
}

/// `GET /model`: list the vendor's voice models.
pub async fn model_list_endpoint(State(state): State<AppState>) -> Response {
    let Some(key) = state.config.fish_audio_key.clone() else {
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Fish Audio API key is not configured",
        )
        .into_response();
    };

    let result = state
        .http
        .get(format!("{}/model", fish_audio_base()))
        .bearer_auth(key)
        .timeout(MODEL_LIST_TIMEOUT)
        .send()
        .await;

    relay_upstream(result, "Fish Audio").await
}

/// Map an upstream reqwest result onto our response: success streams through
/// with the upstream status and content type, timeout becomes 504, any other
/// transport failure 500 with the upstream message attached.
pub(super) async fn relay_upstream(
    result: Result<reqwest::Response, reqwest::Error>,
    vendor: &str,
) -> Response {
    match result {
        Ok(upstream) => {
            let status =
                StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
            info!("{vendor} responded with {status}");

            let mut builder = Response::builder().status(status);
            if let Some(ct) = upstream.headers().get(header::CONTENT_TYPE) {
                builder = builder.header(header::CONTENT_TYPE, ct.clone());
            }
            match builder.body(Body::from_stream(upstream.bytes_stream())) {
                Ok(resp) => resp,
                Err(e) => error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("failed to relay {vendor} response: {e}"),
                )
                .into_response(),
            }
        }
        Err(e) if e.is_timeout() => {
            warn!("{vendor} request timed out");
            error_response(StatusCode::GATEWAY_TIMEOUT, format!("{vendor} timed out"))
                .into_response()
        }
        Err(e) => {
            warn!("{vendor} request failed: {e}");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("{vendor} request failed: {e}"),
            )
            .into_response()
        }
    }
}
