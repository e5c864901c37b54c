//! Signed LiblibAI proxy. Each upstream call carries the vendor's
//! x-access-key / x-timestamp / x-nonce / x-sign header set, computed
//! server-side so the secret key stays out of page code.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::time::Duration;
use tracing::info;

use super::super::{AppState, error_response};
use super::tts::relay_upstream;
use crate::core::providers::ProviderRegistry;
use crate::core::signing;

const TEXT2IMG_URI: &str = "/api/generate/webui/text2img";
const TEXT2IMG_TIMEOUT: Duration = Duration::from_secs(30);
const QUERY_TIMEOUT: Duration = Duration::from_secs(10);

fn liblib_base() -> String {
    ProviderRegistry::load()
        .get_provider("liblib")
        .map(|p| p.base_url.clone())
        .unwrap_or_else(|| "https://api.liblibai.com".to_string())
}

fn liblib_keys(state: &AppState) -> Option<(String, String)> {
    match (
        state.config.liblib_access_key.clone(),
        state.config.liblib_secret_key.clone(),
    ) {
        (Some(ak), Some(sk)) => Some((ak, sk)),
        _ => None,
    }
}

fn signed_request(
    builder: reqwest::RequestBuilder,
    access_key: &str,
    secret_key: &str,
    uri: &str,
) -> reqwest::RequestBuilder {
    let headers = signing::sign_request(access_key, secret_key, uri);
    builder
        .header("x-access-key", headers.access_key)
        .header("x-timestamp", headers.timestamp)
        .header("x-nonce", headers.nonce)
        .header("x-sign", headers.signature)
}

/// `POST /api/liblib/text2img`: submit a generation task; JSON body is
/// forwarded verbatim.
pub async fn text2img_endpoint(
    State(state): State<AppState>,
    Json(payload): Json<serde_json::Value>,
) -> Response {
    let Some((access_key, secret_key)) = liblib_keys(&state) else {
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "LiblibAI keys are not configured",
        )
        .into_response();
    };

    info!(
        "proxying text2img task (template: {})",
        payload
            .get("templateUuid")
            .and_then(|v| v.as_str())
            .unwrap_or("?")
    );

    let builder = state
        .http
        .post(format!("{}{}", liblib_base(), TEXT2IMG_URI))
        .timeout(TEXT2IMG_TIMEOUT)
        .json(&payload);
    let result = signed_request(builder, &access_key, &secret_key, TEXT2IMG_URI)
        .send()
        .await;

    relay_upstream(result, "LiblibAI").await
}

/// `GET /api/liblib/query/{uuid}`: poll a generation task.
pub async fn query_endpoint(State(state): State<AppState>, Path(uuid): Path<String>) -> Response {
    let Some((access_key, secret_key)) = liblib_keys(&state) else {
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "LiblibAI keys are not configured",
        )
        .into_response();
    };

    let uri = format!("/api/www/v1/workflows/run/{uuid}");
    let builder = state
        .http
        .get(format!("{}{}", liblib_base(), uri))
        .timeout(QUERY_TIMEOUT);
    let result = signed_request(builder, &access_key, &secret_key, &uri)
        .send()
        .await;

    relay_upstream(result, "LiblibAI").await
}
