use axum::{
    Router,
    body::Body,
    http::{HeaderValue, Method, Request, header},
    middleware,
    middleware::Next,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use super::AppState;
use super::handlers::{health, image, missions, sign, subtitle, tts};
use crate::core::config::ServerConfig;

/// Development keeps the local Vite origins; production only trusts the
/// env-configured allowlist.
fn build_cors(config: &ServerConfig) -> CorsLayer {
    let dev_defaults = [
        "http://localhost:5173",
        "http://localhost:5174",
        "http://127.0.0.1:5173",
        "http://127.0.0.1:5174",
    ];

    let mut origins: Vec<HeaderValue> = Vec::new();
    if !config.production {
        origins.extend(dev_defaults.iter().filter_map(|o| o.parse().ok()));
    }
    origins.extend(
        config
            .cors_allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok()),
    );

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any)
}

pub fn build_api_router(state: AppState) -> Router {
    let cors = build_cors(&state.config);

    Router::new()
        .route("/api/health", get(health::health_endpoint))
        .route("/api/sign-liblib", post(sign::sign_liblib_endpoint))
        .route("/v1/tts", post(tts::tts_endpoint))
        .route("/model", get(tts::model_list_endpoint))
        .route("/api/liblib/text2img", post(image::text2img_endpoint))
        .route("/api/liblib/query/{uuid}", get(image::query_endpoint))
        .route("/api/subtitle/segments", post(subtitle::segments_endpoint))
        .route("/api/subtitle/export", post(subtitle::export_endpoint))
        .route(
            "/api/missions",
            get(missions::list_missions).post(missions::put_mission),
        )
        .route(
            "/api/missions/{id}",
            get(missions::get_mission).delete(missions::delete_mission),
        )
        .route(
            "/api/media",
            get(missions::list_media).post(missions::put_media),
        )
        .route("/api/media/{id}", get(missions::get_media))
        .route("/api/logs", get(super::sse_logs_endpoint))
        .layer(middleware::from_fn(security_headers))
        .layer(cors)
        .with_state(state)
}

async fn security_headers(req: Request<Body>, next: Next) -> axum::response::Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    response
}
