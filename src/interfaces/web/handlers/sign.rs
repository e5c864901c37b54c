use axum::{Json, http::StatusCode};
use serde::Deserialize;

use super::super::error_response;
use crate::core::signing;

#[derive(Deserialize)]
pub struct SignRequest {
    secret: Option<String>,
    message: Option<String>,
}

/// `POST /api/sign-liblib`: compute a URL-safe base64 HMAC-SHA1 signature
/// over an arbitrary message. Kept as a public endpoint so external frontends
/// can sign without holding the vendor secret in page code.
pub async fn sign_liblib_endpoint(
    Json(payload): Json<SignRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    let (secret, message) = match (payload.secret, payload.message) {
        (Some(s), Some(m)) if !s.is_empty() && !m.is_empty() => (s, m),
        _ => {
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                "Missing secret or message",
            ));
        }
    };

    let signature = signing::sign(&secret, &message);
    Ok(Json(serde_json::json!({ "signature": signature })))
}
