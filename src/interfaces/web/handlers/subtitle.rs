use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use super::super::error_response;
use crate::core::subtitle::{self, DEFAULT_MAX_LINE_LEN, format::SubtitleFormat};

fn default_max_length() -> usize {
    DEFAULT_MAX_LINE_LEN
}

#[derive(Deserialize)]
pub struct SubtitleRequest {
    text: String,
    /// Audio duration in seconds.
    duration: f64,
    #[serde(default = "default_max_length")]
    max_length: usize,
    #[serde(default)]
    format: Option<String>,
}

#[derive(Serialize)]
struct SegmentDto {
    index: usize,
    start: f64,
    end: f64,
    text: String,
}

/// `POST /api/subtitle/segments`: timed segments as JSON, for callers that
/// lay the cues out themselves.
pub async fn segments_endpoint(
    Json(payload): Json<SubtitleRequest>,
) -> Json<serde_json::Value> {
    let segments: Vec<SegmentDto> =
        subtitle::generate(&payload.text, payload.duration, payload.max_length.max(1))
            .into_iter()
            .map(|s| SegmentDto {
                index: s.index,
                start: s.start,
                end: s.end,
                text: s.text,
            })
            .collect();
    Json(serde_json::json!({ "segments": segments }))
}

/// `POST /api/subtitle/export`: rendered SRT or WebVTT text. Empty or
/// malformed text yields an empty body, not an error; an unknown format is
/// the caller's mistake and gets a 400.
pub async fn export_endpoint(Json(payload): Json<SubtitleRequest>) -> Response {
    let format = match payload.format.as_deref() {
        None => SubtitleFormat::Srt,
        Some(name) => match SubtitleFormat::parse(name) {
            Some(f) => f,
            None => {
                return error_response(
                    StatusCode::BAD_REQUEST,
                    format!("unknown subtitle format: {name}"),
                )
                .into_response();
            }
        },
    };

    let segments = subtitle::generate(&payload.text, payload.duration, payload.max_length.max(1));
    let body = subtitle::format::render(&segments, format);
    ([(header::CONTENT_TYPE, format.content_type())], body).into_response()
}
